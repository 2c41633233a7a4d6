//! Build metadata and API version accessors shared across app and plugins.
//! Includes the generated version.rs from the build script, providing a
//! single source of truth for the plugin API version.

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Fallback used when the build script could not read the manifest metadata
const DEFAULT_API_VERSION: u32 = 20261001;

/// Parse the API version string from build script into u32.
pub fn get_api_version() -> u32 {
    PLUGIN_API_VERSION.parse().unwrap_or(DEFAULT_API_VERSION)
}

/// Major component (year) of a date-based API version
pub fn api_major(api_version: u32) -> u32 {
    api_version / 10000
}

/// Plugins built against the same API year are compatible with the host
pub fn is_api_compatible(plugin_api_version: u32, system_api_version: u32) -> bool {
    api_major(plugin_api_version) == api_major(system_api_version)
}

/// Build time string from the build script (UTC)
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured by the build script
pub fn git_hash() -> &'static str {
    GIT_HASH
}
