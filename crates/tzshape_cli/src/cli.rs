//! Command-line interface handling for the tzshape lookup tool.
//!
//! This module provides command-line argument parsing using the `clap`
//! builder API. Global options override settings from the configuration file;
//! the subcommand selects what to do with the built engine.

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::path::PathBuf;

/// What the tool should do once the engine is built.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Resolve one coordinate
    Lookup {
        latitude: f64,
        longitude: f64,
        /// Also list every candidate zone and the index region
        explain: bool,
    },
    /// List every zone present in the index
    Zones,
    /// Resolve `lat,lon` lines from a file, or stdin when `None`
    Batch { input: Option<PathBuf> },
    /// Print index statistics
    Stats,
}

/// Command line arguments parsed from user input.
///
/// Options here override the configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for the dataset path
    pub data_path: Option<PathBuf>,
    /// Optional override for the bounding region, `MIN_LAT,MIN_LON,MAX_LAT,MAX_LON`
    pub bounds: Option<String>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    /// Whether command output is printed as JSON
    pub json_output: bool,
    /// Selected subcommand
    pub action: Action,
}

impl CliArgs {
    /// Parses the process arguments, exiting with usage on error.
    pub fn parse() -> Self {
        Self::try_parse_from(std::env::args_os()).unwrap_or_else(|err| err.exit())
    }

    /// Parses an explicit argument list.
    ///
    /// # Returns
    ///
    /// The parsed arguments, or the clap error describing what was wrong.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Ok(Self::from_matches(&command().try_get_matches_from(args)?))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        let action = match matches.subcommand() {
            Some(("lookup", sub)) => Action::Lookup {
                latitude: sub.get_one::<f64>("latitude").copied().unwrap_or_default(),
                longitude: sub.get_one::<f64>("longitude").copied().unwrap_or_default(),
                explain: sub.get_flag("explain"),
            },
            Some(("zones", _)) => Action::Zones,
            Some(("batch", sub)) => Action::Batch {
                input: sub
                    .get_one::<String>("input")
                    .filter(|path| path.as_str() != "-")
                    .map(PathBuf::from),
            },
            _ => Action::Stats,
        };

        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG)),
            data_path: matches.get_one::<String>("data").map(PathBuf::from),
            bounds: matches.get_one::<String>("bounds").cloned(),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            json_output: matches.get_flag("json"),
            action,
        }
    }
}

/// Configuration file used when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "tzshape.toml";

fn command() -> Command {
    Command::new("tzshape")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Offline time zone lookup by latitude and longitude")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value(DEFAULT_CONFIG)
                .global(true),
        )
        .arg(
            Arg::new("data")
                .short('d')
                .long("data")
                .value_name("FILE")
                .help("Zone boundary dataset (GeoJSON, optionally gzip-compressed)")
                .global(true),
        )
        .arg(
            Arg::new("bounds")
                .long("bounds")
                .value_name("MIN_LAT,MIN_LON,MAX_LAT,MAX_LON")
                .help("Only index zones inside this rectangle")
                .allow_hyphen_values(true)
                .global(true),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)")
                .global(true),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .help("Output logs in JSON format")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print results as JSON")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("lookup")
                .about("Find the zone containing a coordinate")
                .arg(
                    Arg::new("latitude")
                        .value_name("LAT")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("longitude")
                        .value_name("LON")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("explain")
                        .long("explain")
                        .help("Show every candidate zone")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("zones").about("List every zone in the index"))
        .subcommand(
            Command::new("batch")
                .about("Resolve `lat,lon` lines, one result per line")
                .arg(
                    Arg::new("input")
                        .value_name("FILE")
                        .help("Input file; stdin when omitted or `-`"),
                ),
        )
        .subcommand(Command::new("stats").about("Show index statistics"))
}
