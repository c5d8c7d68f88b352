//! Pure patch functions for the two descriptor documents.
//!
//! Both functions are referentially transparent: same inputs produce the
//! same output tree, independent of the order the two documents are
//! patched in. All IO stays in [`super`].

use crate::error::ManifestError;
use crate::manifest::Manifest;
use crate::secrets::SecretSet;
use plist::{Dictionary, Value};

/// Kit name stamped into the Fabric integration block
const CRASHLYTICS_KIT: &str = "Crashlytics";
/// Launch storyboard every shell app uses
const LAUNCH_STORYBOARD: &str = "LaunchScreenShell";

/// Patch the shell runtime config ("EXShell") descriptor.
///
/// Idempotent: `manifestUrl` is never overwritten once set, and
/// `permissions` is only touched when the manifest supplies one.
pub fn patch_shell_descriptor(
    mut current: Dictionary,
    manifest: &Manifest,
    manifest_url: &str,
) -> Dictionary {
    current.insert("isShell".to_string(), Value::Boolean(true));

    if current.get("manifestUrl").is_none() {
        current.insert(
            "manifestUrl".to_string(),
            Value::String(manifest_url.to_string()),
        );
    }

    if let Some(permissions) = manifest.ios.as_ref().and_then(|ios| ios.permissions.as_ref())
        && let Some(value) = json_to_plist(permissions)
    {
        current.insert("permissions".to_string(), value);
    }

    current
}

/// Patch the app info ("Info") descriptor.
///
/// Captures the template's `CFBundleVersion` as `EXClientVersion` before
/// overwriting it, so a configured shell can always be traced back to the
/// client build it was stamped from. The URL scheme list fully replaces any
/// prior entries, which also drops the template's exp scheme.
pub fn patch_info_descriptor(
    mut current: Dictionary,
    manifest: &Manifest,
    bundle_identifier_arg: Option<&str>,
    secrets: &SecretSet,
) -> Result<Dictionary, ManifestError> {
    let bundle_identifier = manifest
        .bundle_identifier()
        .or(bundle_identifier_arg)
        .ok_or(ManifestError::MissingBundleIdentifier)?;
    let name = manifest.name.as_deref().ok_or(ManifestError::MissingName)?;

    current.insert(
        "CFBundleIdentifier".to_string(),
        Value::String(bundle_identifier.to_string()),
    );
    current.insert("CFBundleName".to_string(), Value::String(name.to_string()));

    let schemes: Vec<Value> = linking_schemes(manifest)
        .into_iter()
        .map(|s| Value::String(s.to_string()))
        .collect();
    let mut url_type = Dictionary::new();
    url_type.insert("CFBundleURLSchemes".to_string(), Value::Array(schemes));
    current.insert(
        "CFBundleURLTypes".to_string(),
        Value::Array(vec![Value::Dictionary(url_type)]),
    );

    current.insert(
        "UILaunchStoryboardName".to_string(),
        Value::String(LAUNCH_STORYBOARD.to_string()),
    );

    // Save the client version the template shipped with, pre-overwrite
    if let Some(client_version) = current.get("CFBundleVersion").cloned() {
        current.insert("EXClientVersion".to_string(), client_version);
    }

    let version = manifest.version_or_default().to_string();
    current.insert(
        "CFBundleShortVersionString".to_string(),
        Value::String(version.clone()),
    );
    current.insert("CFBundleVersion".to_string(), Value::String(version));

    current.insert(
        "Fabric".to_string(),
        Value::Dictionary(fabric_block(secrets)),
    );

    Ok(current)
}

/// Linking schemes: `[scheme?] ++ [facebookScheme?]`, the latter only when
/// it carries the `fb` prefix
fn linking_schemes(manifest: &Manifest) -> Vec<&str> {
    let mut schemes = Vec::new();
    if let Some(scheme) = manifest.scheme.as_deref() {
        schemes.push(scheme);
    }
    if let Some(fb) = manifest.facebook_scheme.as_deref()
        && fb.starts_with("fb")
    {
        schemes.push(fb);
    }
    schemes
}

fn fabric_block(secrets: &SecretSet) -> Dictionary {
    let mut kit = Dictionary::new();
    kit.insert(
        "KitInfo".to_string(),
        Value::Dictionary(Dictionary::new()),
    );
    kit.insert(
        "KitName".to_string(),
        Value::String(CRASHLYTICS_KIT.to_string()),
    );

    let mut fabric = Dictionary::new();
    fabric.insert(
        "APIKey".to_string(),
        Value::String(secrets.fabric_api_key.clone()),
    );
    fabric.insert(
        "Kits".to_string(),
        Value::Array(vec![Value::Dictionary(kit)]),
    );
    fabric
}

/// Map a JSON value onto the plist value space. Nulls have no plist
/// counterpart and are dropped.
fn json_to_plist(value: &serde_json::Value) -> Option<Value> {
    use serde_json::Value as Json;
    match value {
        Json::Null => None,
        Json::Bool(b) => Some(Value::Boolean(*b)),
        Json::Number(n) => n
            .as_i64()
            .map(|i| Value::Integer(i.into()))
            .or_else(|| n.as_f64().map(Value::Real)),
        Json::String(s) => Some(Value::String(s.clone())),
        Json::Array(items) => Some(Value::Array(
            items.iter().filter_map(json_to_plist).collect(),
        )),
        Json::Object(map) => {
            let mut dict = Dictionary::new();
            for (key, item) in map {
                if let Some(converted) = json_to_plist(item) {
                    dict.insert(key.clone(), converted);
                }
            }
            Some(Value::Dictionary(dict))
        }
    }
}
