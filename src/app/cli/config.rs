//! TOML configuration file parsing and loading
//!
//! ```toml
//! [framework]
//! vendor = "example.org"
//!
//! [logging]
//! level = "debug"
//! format = "ext"
//! file = "bundlekit.log"
//! color = false
//! ```

use crate::app::cli::args::Args;
use crate::core::logging::LogFormat;
use crate::framework::api::{FrameworkError, FrameworkResult, FrameworkSettings};
use serde::Deserialize;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Effective application configuration: file values overlaid with CLI flags
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub framework: FrameworkSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub format: Option<String>,
    pub file: Option<PathBuf>,
    /// Unset means auto-detect
    pub color: Option<bool>,
}

fn config_error(message: String) -> FrameworkError {
    FrameworkError::Config { message }
}

impl AppConfig {
    /// `<config dir>/bundlekit/bundlekit.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bundlekit").join("bundlekit.toml"))
    }

    /// Pick the file to load: an explicit path must exist, the default path
    /// is used only if present
    pub fn locate(config_file: Option<&Path>) -> FrameworkResult<Option<PathBuf>> {
        match config_file {
            Some(path) if path.exists() => Ok(Some(path.to_path_buf())),
            Some(path) => Err(config_error(format!(
                "The specified configuration file does not exist: {}",
                path.display()
            ))),
            None => Ok(Self::default_path().filter(|path| path.exists())),
        }
    }

    /// Load the located configuration file, or defaults if there is none
    pub fn load(config_file: Option<&Path>) -> FrameworkResult<Self> {
        match Self::locate(config_file)? {
            Some(path) => {
                log::debug!("Loading configuration from {}", path.display());
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> FrameworkResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            config_error(format!(
                "Error reading configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            FrameworkError::Config { message } => {
                config_error(format!("{}: {}", path.display(), message))
            }
            other => other,
        })
    }

    pub fn from_toml_str(contents: &str) -> FrameworkResult<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| config_error(format!("Error parsing configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FrameworkResult<()> {
        if self.framework.vendor.trim().is_empty() {
            return Err(config_error("framework.vendor must not be empty".to_string()));
        }
        if let Some(level) = &self.logging.level {
            if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(config_error(format!(
                    "Invalid log level '{}' (expected one of {})",
                    level,
                    LOG_LEVELS.join(", ")
                )));
            }
        }
        if let Some(format) = &self.logging.format {
            format.parse::<LogFormat>().map_err(config_error)?;
        }
        Ok(())
    }

    /// Overlay command line values; CLI always wins over the file
    pub fn apply_args(&mut self, args: &Args) -> FrameworkResult<()> {
        if let Some(vendor) = &args.vendor {
            self.framework.vendor = vendor.clone();
        }
        if let Some(level) = &args.log_level {
            self.logging.level = Some(level.clone());
        }
        if let Some(format) = &args.log_format {
            self.logging.format = Some(format.clone());
        }
        if let Some(file) = &args.log_file {
            // Magic "none" value disables file logging
            self.logging.file = if file.as_os_str().eq_ignore_ascii_case("none") {
                None
            } else {
                Some(file.clone())
            };
        }
        if args.color.is_some() {
            self.logging.color = args.color;
        }
        self.validate()
    }

    pub fn log_format(&self) -> LogFormat {
        self.logging
            .format
            .as_deref()
            .and_then(|format| format.parse().ok())
            .unwrap_or_default()
    }

    /// Whether log output should be colored, consulting the environment
    /// when the configuration leaves it open
    pub fn use_color(&self) -> bool {
        resolve_color(
            self.logging.color,
            std::env::var_os("NO_COLOR").is_some(),
            std::env::var_os("FORCE_COLOR").is_some(),
            std::io::stderr().is_terminal(),
        )
    }
}

/// Explicit setting first, then NO_COLOR, then FORCE_COLOR, then TTY detection
pub(crate) fn resolve_color(
    explicit: Option<bool>,
    no_color: bool,
    force_color: bool,
    is_terminal: bool,
) -> bool {
    match explicit {
        Some(color) => color,
        None if no_color => false,
        None if force_color => true,
        None => is_terminal,
    }
}
