//! Main application logic and lifecycle management.
//!
//! This module contains the `Application` struct that loads configuration,
//! builds the time zone engine and runs the selected command.

use crate::cli::{Action, CliArgs};
use crate::config::{AppConfig, BoundsSettings};
use crate::logging::display_banner;
use crate::signals::wait_for_shutdown;
use serde_json::json;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{info, warn};
use tzshape::{Coordinate, TimeZoneEngine};

/// Main application struct.
///
/// Holds the merged configuration and the built engine. Building happens in
/// [`Application::new`], so a constructed application is ready to answer.
pub struct Application {
    /// Loaded application configuration
    config: AppConfig,
    /// Immutable lookup engine
    engine: TimeZoneEngine,
    /// Selected subcommand
    action: Action,
    /// Print results as JSON
    json_output: bool,
}

impl Application {
    /// Creates a new application instance.
    ///
    /// # Arguments
    ///
    /// * `args` - Parsed command-line arguments
    ///
    /// # Returns
    ///
    /// A configured `Application` instance ready to run, or an error if the
    /// configuration is invalid or the engine could not be built.
    ///
    /// # Process
    ///
    /// 1. Load configuration from file (creating default if missing)
    /// 2. Apply command-line argument overrides
    /// 3. Validate merged configuration
    /// 4. Build the engine on the blocking thread pool
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let mut config = AppConfig::load_from_file(&args.config_path).await?;
        apply_overrides(&mut config, &args)?;

        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {e}").into());
        } else {
            info!("✅ Configuration loaded and validated successfully");
        }

        display_banner();

        let engine = build_engine(&config).await?;

        Ok(Self {
            config,
            engine,
            action: args.action,
            json_output: args.json_output,
        })
    }

    /// Runs the selected command, writing results to stdout.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        self.log_configuration_summary();

        let stdout = std::io::stdout();
        let mut out = stdout.lock();

        match &self.action {
            Action::Lookup {
                latitude,
                longitude,
                explain,
            } => write_lookup(&self.engine, *latitude, *longitude, *explain, self.json_output, &mut out)?,
            Action::Zones => write_zones(&self.engine, self.json_output, &mut out)?,
            Action::Stats => write_stats(&self.engine, self.json_output, &mut out)?,
            Action::Batch { input } => {
                let reader: Box<dyn AsyncRead + Unpin + Send> = match input {
                    Some(path) => Box::new(tokio::fs::File::open(path).await?),
                    None => Box::new(tokio::io::stdin()),
                };
                let source = input.as_deref().map_or("stdin".into(), Path::to_string_lossy);
                info!("📥 Resolving coordinates from {}", source);

                tokio::select! {
                    summary = process_batch(&self.engine, BufReader::new(reader), self.json_output, &mut out) => {
                        let summary = summary?;
                        info!(
                            "✅ Batch complete: {} resolved, {} without zone, {} invalid",
                            summary.resolved, summary.unmatched, summary.invalid
                        );
                    }
                    signal = wait_for_shutdown() => {
                        signal?;
                        warn!("⚠️ Batch interrupted before the end of input");
                    }
                }
            }
        }

        out.flush()?;
        Ok(())
    }

    fn log_configuration_summary(&self) {
        let stats = self.engine.stats();
        info!(
            "📂 Data: {} | Region: {}",
            self.config.data.path.as_deref().unwrap_or("bundled sample"),
            self.engine.region()
        );
        info!(
            "🗺️ Index: {} zones, {} polygons, built in {} ms",
            stats.zones, stats.polygons, stats.build_millis
        );
    }
}

fn apply_overrides(config: &mut AppConfig, args: &CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(data_path) = &args.data_path {
        config.data.path = Some(data_path.to_string_lossy().to_string());
    }

    if let Some(bounds) = &args.bounds {
        config.bounds = BoundsSettings::parse(bounds).map_err(|e| format!("Invalid --bounds: {e}"))?;
    }

    if let Some(log_level) = &args.log_level {
        config.logging.level = log_level.clone();
    }

    if args.json_logs {
        config.logging.json_format = true;
    }

    Ok(())
}

async fn build_engine(config: &AppConfig) -> Result<TimeZoneEngine, Box<dyn std::error::Error>> {
    let engine_config = config.to_engine_config()?;
    let data_path = config.data_path();

    let engine = tokio::task::spawn_blocking(move || match data_path {
        Some(path) => TimeZoneEngine::from_path(path, &engine_config),
        None => TimeZoneEngine::from_bundled(&engine_config),
    })
    .await??;

    Ok(engine)
}

// ============================================================================
// Command Output
// ============================================================================

fn write_lookup(
    engine: &TimeZoneEngine,
    latitude: f64,
    longitude: f64,
    explain: bool,
    json_output: bool,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let zone = engine.query(latitude, longitude)?;
    let candidates = if explain {
        Some(engine.candidates(latitude, longitude)?)
    } else {
        None
    };

    if json_output {
        let mut value = json!({
            "latitude": latitude,
            "longitude": longitude,
            "zone": zone,
        });
        if let Some(candidates) = &candidates {
            value["candidates"] = json!(candidates);
            value["region"] = json!(engine.region());
        }
        writeln!(out, "{value}")?;
        return Ok(());
    }

    match &zone {
        Some(zone) => writeln!(out, "{zone}")?,
        None => writeln!(out, "none")?,
    }
    if let Some(candidates) = candidates {
        let listed: Vec<&str> = candidates.iter().map(|z| z.as_str()).collect();
        writeln!(out, "candidates: {}", if listed.is_empty() { "-".to_string() } else { listed.join(", ") })?;
        writeln!(out, "region: {}", engine.region())?;
    }
    Ok(())
}

fn write_zones(engine: &TimeZoneEngine, json_output: bool, out: &mut impl Write) -> Result<(), Box<dyn std::error::Error>> {
    let zones = engine.known_zone_ids();
    if json_output {
        writeln!(out, "{}", serde_json::to_string(&zones)?)?;
    } else {
        for zone in zones {
            writeln!(out, "{zone}")?;
        }
    }
    Ok(())
}

fn write_stats(engine: &TimeZoneEngine, json_output: bool, out: &mut impl Write) -> Result<(), Box<dyn std::error::Error>> {
    let stats = engine.stats();
    if json_output {
        let value = json!({ "region": engine.region(), "stats": stats });
        writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        return Ok(());
    }

    writeln!(out, "region:            {}", engine.region())?;
    writeln!(out, "records read:      {}", stats.records_read)?;
    writeln!(out, "records discarded: {}", stats.records_discarded)?;
    writeln!(out, "polygons clipped:  {}", stats.polygons_clipped)?;
    writeln!(out, "polygons:          {}", stats.polygons)?;
    writeln!(out, "zones:             {}", stats.zones)?;
    writeln!(out, "vertices:          {}", stats.vertices)?;
    writeln!(out, "tree depth:        {}", stats.depth)?;
    writeln!(out, "leaf nodes:        {}", stats.leaf_nodes)?;
    writeln!(out, "internal nodes:    {}", stats.internal_nodes)?;
    match stats.bounds {
        Some(bounds) => writeln!(out, "data bounds:       {bounds}")?,
        None => writeln!(out, "data bounds:       -")?,
    }
    writeln!(out, "build time:        {} ms", stats.build_millis)?;
    Ok(())
}

// ============================================================================
// Batch Processing
// ============================================================================

/// Counts reported at the end of a batch run.
#[derive(Debug, Default, PartialEq)]
struct BatchSummary {
    resolved: usize,
    unmatched: usize,
    invalid: usize,
}

/// Parses `lat,lon` or `lat lon`.
fn parse_coordinate(line: &str) -> Result<Coordinate, String> {
    let parts: Vec<&str> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect();

    match parts.as_slice() {
        [lat, lon] => {
            let latitude = lat.parse::<f64>().map_err(|_| format!("'{lat}' is not a latitude"))?;
            let longitude = lon.parse::<f64>().map_err(|_| format!("'{lon}' is not a longitude"))?;
            Ok(Coordinate::new(latitude, longitude))
        }
        _ => Err(format!("expected 'lat,lon' but got '{line}'")),
    }
}

/// Resolves every `lat,lon` line of `reader`.
///
/// Blank lines and lines starting with `#` are skipped. Unparseable lines and
/// out-of-range coordinates are reported in the output and counted, but do
/// not stop the run.
async fn process_batch<R>(
    engine: &TimeZoneEngine,
    reader: R,
    json_output: bool,
    out: &mut impl Write,
) -> Result<BatchSummary, Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = BatchSummary::default();
    let mut lines = reader.lines();
    let mut line_number = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let outcome = parse_coordinate(line)
            .and_then(|point| engine.query_coordinate(point).map(|zone| (point, zone)).map_err(|e| e.to_string()));

        match outcome {
            Ok((point, zone)) => {
                if zone.is_some() {
                    summary.resolved += 1;
                } else {
                    summary.unmatched += 1;
                }
                if json_output {
                    let value = json!({
                        "line": line_number,
                        "latitude": point.latitude,
                        "longitude": point.longitude,
                        "zone": zone,
                    });
                    writeln!(out, "{value}")?;
                } else {
                    let zone = zone.as_ref().map_or("", |z| z.as_str());
                    writeln!(out, "{},{},{}", point.latitude, point.longitude, zone)?;
                }
            }
            Err(message) => {
                summary.invalid += 1;
                warn!("Line {}: {}", line_number, message);
                if json_output {
                    writeln!(out, "{}", json!({ "line": line_number, "error": message }))?;
                } else {
                    writeln!(out, "# line {line_number}: {message}")?;
                }
            }
        }
    }

    Ok(summary)
}
