//! Well-known attribute and header names

/// Filter attribute holding the interface name a service was registered under
pub const OBJECT_CLASS: &str = "objectClass";

pub const BUNDLE_NAME: &str = "Bundle-Name";
pub const BUNDLE_VENDOR: &str = "Bundle-Vendor";
pub const BUNDLE_VERSION: &str = "Bundle-Version";

/// Reported as `Bundle-Version`; bundles carry no version information
pub const UNVERSIONED: &str = "N/A";

pub const DEFAULT_VENDOR: &str = "bundlekit";
