//! Third-party SDK key resolution.
//!
//! The effective Fabric API key comes from an ordered provider list: the
//! customer's private config file, then the internal key file, then the
//! template key file. Probing is explicit; the caller passes the candidate
//! key files in, nothing inside this module invents paths.

use crate::error::{Result, ShellAppError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Filename the private config is staged under inside the iOS project tree
pub const STAGED_PRIVATE_CONFIG: &str = "private-shell-app-config.json";

/// Customer-supplied private configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrivateConfig {
    /// Fabric SDK section
    #[serde(default)]
    pub fabric: Option<FabricConfig>,
}

/// Fabric SDK keys
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FabricConfig {
    /// API key override
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
}

/// Built-in key file contents
#[derive(Debug, Deserialize)]
struct KeyFile {
    #[serde(rename = "FABRIC_API_KEY")]
    fabric_api_key: String,
}

/// Resolved key material written into the Info descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretSet {
    /// Effective Fabric API key
    pub fabric_api_key: String,
}

/// Default key file providers, in priority order
pub fn default_key_sources(project_root: &Path) -> Vec<PathBuf> {
    vec![
        project_root.join("__internal__/keys.json"),
        project_root.join("template-files/keys.json"),
    ]
}

/// Load and parse a private config file
pub async fn load_private_config(path: &Path) -> Result<PrivateConfig> {
    let contents = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&contents)?)
}

/// Resolve the effective key set.
///
/// A private-config key wins outright. Otherwise the first readable key
/// file in `sources` supplies the default. Both sources being absent is a
/// configuration error, not silently tolerated.
pub async fn resolve(
    private_config: Option<&PrivateConfig>,
    sources: &[PathBuf],
) -> Result<SecretSet> {
    if let Some(key) = private_override(private_config) {
        return Ok(SecretSet {
            fabric_api_key: key.to_string(),
        });
    }

    for source in sources {
        match tokio::fs::read(source).await {
            Ok(contents) => {
                let keys: KeyFile = serde_json::from_slice(&contents)?;
                log::debug!("Using default API key from {}", source.display());
                return Ok(SecretSet {
                    fabric_api_key: keys.fabric_api_key,
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(ShellAppError::MissingKeyConfiguration {
        sources: sources.to_vec(),
    })
}

/// Private-config key, if present and non-empty
fn private_override(private_config: Option<&PrivateConfig>) -> Option<&str> {
    private_config?
        .fabric
        .as_ref()?
        .api_key
        .as_deref()
        .filter(|key| !key.is_empty())
}

/// Copy the private config file into the iOS project tree.
///
/// Used by the build path so dynamic-macro generation can pick the secrets
/// up. No-op when no file was supplied, with a warning.
pub async fn stage_private_config(file: Option<&Path>, ios_dir: &Path) -> Result<()> {
    let Some(file) = file else {
        log::warn!("No private config file specified.");
        return Ok(());
    };
    crate::utils::fs::copy_file(file, &ios_dir.join(STAGED_PRIVATE_CONFIG)).await
}
