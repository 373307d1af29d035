//! Signal handling for interrupting long-running commands.
//!
//! Only `batch` runs long enough to need it: on SIGINT or SIGTERM (Ctrl+C on
//! Windows) it stops reading input and reports what it resolved so far.

use tokio::signal;
use tracing::info;

/// Resolves once a termination signal arrives.
///
/// # Returns
///
/// `Ok(())` when a signal is received, or an error if signal handling could
/// not be set up.
pub async fn wait_for_shutdown() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(unix)]
    {
        use signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => (),
            _ = sigterm.recv() => ()
        }
    }

    #[cfg(windows)]
    signal::ctrl_c().await?;

    info!("📡 Received shutdown signal - stopping");
    Ok(())
}
