//! Build metadata generated by build.rs

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Framework API version from `[package.metadata] framework_api_version`
pub fn api_version() -> u32 {
    FRAMEWORK_API_VERSION.parse().unwrap_or(20261018)
}

/// Build time string from the build script (UTC)
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured by the build script
pub fn git_hash() -> &'static str {
    GIT_HASH
}
