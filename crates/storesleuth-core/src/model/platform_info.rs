/// OS family and release identification.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Version reported when the OS cannot tell us its release.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Platform family plus OS release, e.g. `Android 13` or `iOS 17.0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformInfo {
    pub platform_name: String,
    pub version: String,
}

impl PlatformInfo {
    /// Blank or missing versions become [`UNKNOWN_VERSION`] so the display
    /// string is never just the family name.
    pub fn new(platform_name: impl Into<String>, version: Option<String>) -> Self {
        let version = version
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string());
        Self {
            platform_name: platform_name.into(),
            version,
        }
    }
}

impl fmt::Display for PlatformInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.platform_name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_name_and_version() {
        let info = PlatformInfo::new("Android", Some("13".into()));
        assert_eq!(info.to_string(), "Android 13");
    }

    #[test]
    fn test_missing_version_uses_placeholder() {
        assert_eq!(PlatformInfo::new("iOS", None).to_string(), "iOS unknown");
        assert_eq!(
            PlatformInfo::new("Linux", Some("  \n".into())).version,
            UNKNOWN_VERSION
        );
    }

    #[test]
    fn test_version_is_trimmed() {
        let info = PlatformInfo::new("macOS", Some("14.4.1\n".into()));
        assert_eq!(info.version, "14.4.1");
    }
}
