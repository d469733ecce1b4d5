//! Command line arguments
//!
//! Every option is optional: unset options fall back to the configuration
//! file, then to built-in defaults.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "bundlekit")]
#[command(about = "In-process bundle and service framework demonstration")]
#[command(version)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "simple", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Color output control: true or false; unset = auto (TTY and NO_COLOR)
    #[arg(short = 'g', long = "color", value_name = "BOOL")]
    pub color: Option<bool>,

    /// Vendor reported in every bundle's headers
    #[arg(long = "vendor", value_name = "NAME")]
    pub vendor: Option<String>,
}

impl Args {
    pub fn parse_from_env() -> Self {
        Self::parse()
    }
}
