//! Customer manifest model and HTTP fetch.
//!
//! The manifest is a remotely hosted JSON document describing one customer's
//! branding, identifiers, and payload location. Only the fields this tool
//! consumes are typed; everything else is kept in flattened maps so the
//! document can be re-serialized verbatim into the configured bundle.

use crate::error::{Result, ShellAppError};
use serde::{Deserialize, Serialize};

/// Header carrying the SDK version on manifest requests
pub const SDK_VERSION_HEADER: &str = "Exponent-SDK-Version";
/// Header naming the requesting platform on manifest requests
pub const PLATFORM_HEADER: &str = "Exponent-Platform";

/// One customer's shell app manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// App display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// App version, defaulted to "0.0.0" when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Primary linking scheme
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,

    /// Facebook linking scheme; only used when it starts with "fb"
    #[serde(rename = "facebookScheme", skip_serializing_if = "Option::is_none")]
    pub facebook_scheme: Option<String>,

    /// Default app icon source, shared by every grid cell without an override
    #[serde(rename = "iconUrl", skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,

    /// JS payload preloaded into the bundle
    #[serde(rename = "bundleUrl", skip_serializing_if = "Option::is_none")]
    pub bundle_url: Option<String>,

    /// iOS-specific section
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ios: Option<IosManifest>,

    /// Fields this tool does not consume, preserved for re-serialization
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// iOS-specific manifest section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IosManifest {
    /// CFBundleIdentifier for the configured app
    #[serde(rename = "bundleIdentifier", skip_serializing_if = "Option::is_none")]
    pub bundle_identifier: Option<String>,

    /// Permission descriptions merged into the shell runtime config
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<serde_json::Value>,

    /// Remaining fields, including per-cell `iconUrl{S}x{S}@{R}x` overrides
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Manifest {
    /// App version, falling back to "0.0.0"
    pub fn version_or_default(&self) -> &str {
        self.version.as_deref().unwrap_or("0.0.0")
    }

    /// Bundle identifier from the iOS section, if any
    pub fn bundle_identifier(&self) -> Option<&str> {
        self.ios.as_ref()?.bundle_identifier.as_deref()
    }

    /// Per-cell icon override URL for a manifest key like `iconUrl29x29@2x`
    pub fn icon_override(&self, key: &str) -> Option<&str> {
        self.ios
            .as_ref()?
            .extra
            .get(key)
            .and_then(serde_json::Value::as_str)
    }
}

/// Fetch and parse a manifest, sending SDK-version and platform headers.
///
/// Transport and parse failures are fatal and not retried.
pub async fn fetch_manifest(url: &str, sdk_version: &str) -> Result<Manifest> {
    // Reject malformed URLs before going to the network
    url::Url::parse(url).map_err(|e| ShellAppError::Download {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    log::info!("Fetching manifest from {}", url);
    let response = reqwest::Client::new()
        .get(url)
        .header(SDK_VERSION_HEADER, sdk_version)
        .header(PLATFORM_HEADER, "ios")
        .send()
        .await?
        .error_for_status()?;

    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "name": "Acme App",
        "version": "2.1.0",
        "scheme": "acme",
        "facebookScheme": "fb1234",
        "iconUrl": "https://x/icon.png",
        "bundleUrl": "https://x/app.bundle",
        "sdkVersion": "10.0.0",
        "ios": {
            "bundleIdentifier": "com.acme.app",
            "permissions": {"camera": "Takes photos"},
            "iconUrl29x29@2x": "https://x/icon-small.png"
        }
    }"#;

    #[test]
    fn parses_consumed_fields() {
        let manifest: Manifest = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("Acme App"));
        assert_eq!(manifest.version_or_default(), "2.1.0");
        assert_eq!(manifest.bundle_identifier(), Some("com.acme.app"));
        assert_eq!(
            manifest.icon_override("iconUrl29x29@2x"),
            Some("https://x/icon-small.png")
        );
        assert_eq!(manifest.icon_override("iconUrl40x40@2x"), None);
    }

    #[test]
    fn version_defaults_when_absent() {
        let manifest: Manifest = serde_json::from_str(r#"{"name": "A"}"#).unwrap();
        assert_eq!(manifest.version_or_default(), "0.0.0");
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let manifest: Manifest = serde_json::from_str(SAMPLE).unwrap();
        let value: serde_json::Value = serde_json::from_str(SAMPLE).unwrap();
        let round_tripped: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&manifest).unwrap()).unwrap();
        assert_eq!(round_tripped, value);
    }
}
