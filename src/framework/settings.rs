//! Framework Settings
//!
//! Registry-wide settings, read from the `[framework]` table of the
//! configuration file.

use crate::framework::constants::DEFAULT_VENDOR;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameworkSettings {
    /// Reported as the `Bundle-Vendor` header of every bundle
    pub vendor: String,
}

impl Default for FrameworkSettings {
    fn default() -> Self {
        Self {
            vendor: DEFAULT_VENDOR.to_string(),
        }
    }
}
