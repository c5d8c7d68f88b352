//! Command line argument parsing and validation.
//!
//! Raw arguments are parsed with clap and then normalized into
//! [`ShellAppArgs`], a fully-defaulted typed configuration. Every invalid
//! (action, type, configuration) combination is rejected here, before any
//! side effect occurs.

use crate::error::ValidationError;
use clap::Parser;
use std::fmt;
use std::path::PathBuf;

/// White-label iOS shell app configurator and builder
#[derive(Parser, Debug)]
#[command(
    name = "shell-app-builder",
    version,
    about = "Configures and builds white-labelled iOS shell apps",
    long_about = "Builds the generic shell binary with xcodebuild, or configures an existing \
shell archive from a customer manifest: bundle identifier, name, linking schemes, launch \
storyboard, app icon matrix, and preloaded JS payload.

Usage:
  shell-app-builder --action build --type simulator --configuration Debug
  shell-app-builder --action configure --url https://host/manifest --sdk-version 10.0.0 \\
      --archive-path /tmp/build --output /tmp/acme.tar

Exit code 0 = the printed artifact path exists."
)]
pub struct Args {
    /// Action to perform: build (compile the shell binary) or configure
    /// (patch an existing archive, no compilation)
    #[arg(short, long, value_name = "ACTION")]
    pub action: String,

    /// Build type: simulator or archive
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub build_type: Option<String>,

    /// Build configuration: Debug or Release (archive accepts only Release)
    #[arg(short, long, value_name = "CONFIGURATION")]
    pub configuration: Option<String>,

    /// Manifest URL for the shell experience (required for configure)
    #[arg(short, long, value_name = "MANIFEST_URL")]
    pub url: Option<String>,

    /// SDK version sent when requesting the manifest (required for configure)
    #[arg(long, value_name = "SDK_VERSION")]
    pub sdk_version: Option<String>,

    /// Path to the existing archive to configure; its config files are
    /// patched in place (required for configure)
    #[arg(long, value_name = "PATH")]
    pub archive_path: Option<PathBuf>,

    /// Path to a private config file containing e.g. third-party API keys
    #[arg(long, value_name = "PATH")]
    pub private_config_file: Option<PathBuf>,

    /// CFBundleIdentifier fallback when the manifest does not supply one
    #[arg(long, value_name = "IDENTIFIER")]
    pub bundle_identifier: Option<String>,

    /// Destination path for the configured output (tar for simulator,
    /// moved xcarchive for archive)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Root of the native iOS project tree
    #[arg(long, value_name = "PATH", default_value = "../ios")]
    pub project_root: PathBuf,

    /// Show all xcodebuild output
    #[arg(short, long)]
    pub verbose: bool,
}

/// High-level action selected on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Compile the generic shell binary
    Build,
    /// Patch an existing archive, no compilation
    Configure(ConfigureArgs),
}

/// Arguments guaranteed present when action = configure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigureArgs {
    /// Manifest URL for the shell experience
    pub url: String,
    /// SDK version header value for the manifest request
    pub sdk_version: String,
    /// Directory holding the config files to patch
    pub archive_path: PathBuf,
    /// Destination for the packaged output, if any
    pub output: Option<PathBuf>,
}

/// Platform build variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildType {
    /// Debug-friendly simulator-only build
    Simulator,
    /// Distributable signed package
    Archive,
}

impl BuildType {
    /// Name used in build destinations and artifact directories
    pub fn as_str(self) -> &'static str {
        match self {
            BuildType::Simulator => "simulator",
            BuildType::Archive => "archive",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// xcodebuild configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildConfiguration {
    /// Debug configuration
    Debug,
    /// Release configuration
    Release,
}

impl BuildConfiguration {
    /// Name as passed to xcodebuild and used in product paths
    pub fn as_str(self) -> &'static str {
        match self {
            BuildConfiguration::Debug => "Debug",
            BuildConfiguration::Release => "Release",
        }
    }
}

impl fmt::Display for BuildConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated, fully-defaulted invocation configuration
#[derive(Debug, Clone)]
pub struct ShellAppArgs {
    /// Selected action with its required arguments attached
    pub action: Action,
    /// Build variant, defaulted to archive
    pub build_type: BuildType,
    /// Build configuration, defaulted to Release
    pub configuration: BuildConfiguration,
    /// Private config file for third-party keys, if supplied
    pub private_config_file: Option<PathBuf>,
    /// Bundle identifier fallback, if supplied
    pub bundle_identifier: Option<String>,
    /// Root of the native iOS project tree
    pub project_root: PathBuf,
    /// Show all xcodebuild output
    pub verbose: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate and normalize raw arguments.
    ///
    /// Applies defaults (`type = archive`, `configuration = Release`),
    /// checks the (type, configuration) rule table, then the per-action
    /// required fields. No side effects.
    pub fn validate(&self) -> Result<ShellAppArgs, ValidationError> {
        let raw_type = self.build_type.as_deref().unwrap_or("archive");
        let raw_configuration = self.configuration.as_deref().unwrap_or("Release");

        let build_type = match raw_type {
            "simulator" => BuildType::Simulator,
            "archive" => BuildType::Archive,
            other => return Err(ValidationError::UnsupportedBuildType(other.to_string())),
        };

        let configuration = match raw_configuration {
            "Debug" => BuildConfiguration::Debug,
            "Release" => BuildConfiguration::Release,
            other => {
                return Err(ValidationError::UnsupportedConfiguration {
                    build_type: raw_type.to_string(),
                    configuration: other.to_string(),
                });
            }
        };

        // Archives only ship Release; the simulator accepts both.
        if build_type == BuildType::Archive && configuration != BuildConfiguration::Release {
            return Err(ValidationError::UnsupportedConfiguration {
                build_type: raw_type.to_string(),
                configuration: raw_configuration.to_string(),
            });
        }

        let action = match self.action.as_str() {
            "build" => Action::Build,
            "configure" => {
                let url = self
                    .url
                    .clone()
                    .ok_or_else(|| ValidationError::MissingArgument {
                        argument: "url".to_string(),
                    })?;
                let sdk_version =
                    self.sdk_version
                        .clone()
                        .ok_or_else(|| ValidationError::MissingArgument {
                            argument: "sdk-version".to_string(),
                        })?;
                let archive_path =
                    self.archive_path
                        .clone()
                        .ok_or_else(|| ValidationError::MissingArgument {
                            argument: "archive-path".to_string(),
                        })?;
                Action::Configure(ConfigureArgs {
                    url,
                    sdk_version,
                    archive_path,
                    output: self.output.clone(),
                })
            }
            other => return Err(ValidationError::UnsupportedAction(other.to_string())),
        };

        Ok(ShellAppArgs {
            action,
            build_type,
            configuration,
            private_config_file: self.private_config_file.clone(),
            bundle_identifier: self.bundle_identifier.clone(),
            project_root: self.project_root.clone(),
            verbose: self.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(action: &str, build_type: Option<&str>, configuration: Option<&str>) -> Args {
        Args {
            action: action.to_string(),
            build_type: build_type.map(str::to_string),
            configuration: configuration.map(str::to_string),
            url: Some("https://example.com/manifest".to_string()),
            sdk_version: Some("10.0.0".to_string()),
            archive_path: Some(PathBuf::from("/tmp/build")),
            private_config_file: None,
            bundle_identifier: None,
            output: None,
            project_root: PathBuf::from("../ios"),
            verbose: false,
        }
    }

    #[test]
    fn defaults_to_archive_release() {
        let args = raw("build", None, None).validate().unwrap();
        assert_eq!(args.build_type, BuildType::Archive);
        assert_eq!(args.configuration, BuildConfiguration::Release);
        assert!(!args.verbose);
    }

    #[test]
    fn triple_rule_table() {
        // (type, configuration, accepted)
        let cases = [
            ("simulator", "Debug", true),
            ("simulator", "Release", true),
            ("archive", "Release", true),
            ("archive", "Debug", false),
        ];
        for (build_type, configuration, accepted) in cases {
            let result = raw("build", Some(build_type), Some(configuration)).validate();
            assert_eq!(result.is_ok(), accepted, "{build_type}/{configuration}");
            if !accepted {
                assert!(matches!(
                    result.unwrap_err(),
                    ValidationError::UnsupportedConfiguration { .. }
                ));
            }
        }
    }

    #[test]
    fn rejects_unknown_type_and_action() {
        assert!(matches!(
            raw("build", Some("appstore"), None).validate().unwrap_err(),
            ValidationError::UnsupportedBuildType(t) if t == "appstore"
        ));
        assert!(matches!(
            raw("deploy", None, None).validate().unwrap_err(),
            ValidationError::UnsupportedAction(a) if a == "deploy"
        ));
    }

    #[test]
    fn rejects_unknown_configuration() {
        assert!(matches!(
            raw("build", Some("simulator"), Some("Profile"))
                .validate()
                .unwrap_err(),
            ValidationError::UnsupportedConfiguration { .. }
        ));
    }

    #[test]
    fn configure_requires_url_sdk_version_and_archive_path() {
        for missing in ["url", "sdk-version", "archive-path"] {
            let mut args = raw("configure", Some("simulator"), None);
            match missing {
                "url" => args.url = None,
                "sdk-version" => args.sdk_version = None,
                _ => args.archive_path = None,
            }
            match args.validate().unwrap_err() {
                ValidationError::MissingArgument { argument } => assert_eq!(argument, missing),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn build_has_no_extra_requirements() {
        let mut args = raw("build", None, None);
        args.url = None;
        args.sdk_version = None;
        args.archive_path = None;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn configure_keeps_required_fields() {
        let args = raw("configure", Some("archive"), None).validate().unwrap();
        match args.action {
            Action::Configure(c) => {
                assert_eq!(c.url, "https://example.com/manifest");
                assert_eq!(c.sdk_version, "10.0.0");
                assert_eq!(c.archive_path, PathBuf::from("/tmp/build"));
            }
            Action::Build => panic!("expected configure"),
        }
    }
}
