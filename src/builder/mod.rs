//! Shell app pipeline orchestration.
//!
//! One invocation is a strictly sequential pipeline: validate, then either
//! the build path (compile the generic shell binary) or the configure path
//! (patch an existing archive from a manifest). The first unrecovered
//! failure terminates the run. Descriptor backups are only committed after
//! the whole configure path succeeded; a failed run leaves them in place
//! for manual recovery.

pub mod invoke;
pub mod package;

use crate::assets;
use crate::cli::{Action, BuildType, ConfigureArgs, ShellAppArgs};
use crate::descriptor::{self, patch, INFO_DESCRIPTOR, SHELL_DESCRIPTOR};
use crate::error::{ManifestError, Result};
use crate::manifest::{self, Manifest};
use crate::secrets;
use crate::utils::{fs, http, tools};
use std::path::{Path, PathBuf};

/// Build destination stem, relative to the iOS project root
const BUILD_DESTINATION: &str = "../shellAppBase";
/// Canonical per-type/per-configuration artifact directory stem
const ARTIFACT_DESTINATION: &str = "../shellAppBase-builds";

/// Pipeline orchestrator.
///
/// Owns the validated invocation configuration and sequences all side
/// effects for one run.
pub struct ShellAppBuilder {
    args: ShellAppArgs,
}

impl ShellAppBuilder {
    /// Creates a builder from validated arguments.
    pub fn new(args: ShellAppArgs) -> Self {
        Self { args }
    }

    /// Runs the pipeline and returns the final artifact path.
    pub async fn run(&self) -> Result<PathBuf> {
        match &self.args.action {
            Action::Build => self.build().await,
            Action::Configure(configure) => self.configure(configure).await,
        }
    }

    /// Build path: stage secrets, compile, publish the artifact.
    async fn build(&self) -> Result<PathBuf> {
        secrets::stage_private_config(
            self.args.private_config_file.as_deref(),
            &self.args.project_root,
        )
        .await?;

        if !*tools::HAS_XCODEBUILD {
            return Err(anyhow::anyhow!("xcodebuild not found in PATH").into());
        }

        let plan = invoke::build_command(
            self.args.build_type,
            self.args.configuration,
            self.args.verbose,
            &self.args.project_root,
            BUILD_DESTINATION,
        );
        log::info!(
            "Building shell app under {} (type: {}, configuration: {})...",
            plan.build_dest.display(),
            self.args.build_type,
            self.args.configuration
        );
        invoke::run_build(&plan, &self.args.project_root).await?;

        // Canonical artifact directory, fully recreated each run
        let artifact_dir = self.args.project_root.join(format!(
            "{ARTIFACT_DESTINATION}/{}/{}",
            self.args.build_type, self.args.configuration
        ));
        fs::create_dir_all(&artifact_dir, true).await?;

        let source = match self.args.build_type {
            BuildType::Archive => invoke::archive_path(&plan),
            BuildType::Simulator => plan.app_path.clone(),
        };
        let dest = artifact_dir.join(
            source
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("artifact path {source:?} has no file name"))?,
        );
        fs::copy_dir(&source, &dest).await?;

        Ok(plan.app_path)
    }

    /// Configure path: fetch manifest, patch descriptors, materialize
    /// icons, preload the payload, commit backups, package.
    async fn configure(&self, configure: &ConfigureArgs) -> Result<PathBuf> {
        let manifest = manifest::fetch_manifest(&configure.url, &configure.sdk_version).await?;
        self.validate_config_arguments(&manifest, &configure.archive_path)?;

        let config_dir = configure.archive_path.as_path();
        log::info!("Modifying config files under {}...", config_dir.display());

        let private_config = match &self.args.private_config_file {
            Some(path) => Some(secrets::load_private_config(path).await?),
            None => {
                log::warn!("No config file specified.");
                None
            }
        };
        let secret_set = secrets::resolve(
            private_config.as_ref(),
            &secrets::default_key_sources(&self.args.project_root),
        )
        .await?;

        descriptor::modify(config_dir, SHELL_DESCRIPTOR, |current| {
            Ok(patch::patch_shell_descriptor(current, &manifest, &configure.url))
        })
        .await?;

        let bundle_identifier = self.args.bundle_identifier.clone();
        descriptor::modify(config_dir, INFO_DESCRIPTOR, |current| {
            Ok(patch::patch_info_descriptor(
                current,
                &manifest,
                bundle_identifier.as_deref(),
                &secret_set,
            )?)
        })
        .await?;

        self.configure_icons(&manifest, config_dir).await?;
        self.preload_manifest_and_bundle(&manifest, config_dir).await?;

        // Commit: edits are final, the pre-run originals are no longer needed
        log::info!("Cleaning up...");
        descriptor::clean_backup(config_dir, SHELL_DESCRIPTOR, false).await?;
        descriptor::clean_backup(config_dir, INFO_DESCRIPTOR, false).await?;

        self.package_output(&manifest, config_dir, configure).await
    }

    /// Pre-descriptor validation of manifest and argument content.
    fn validate_config_arguments(&self, manifest: &Manifest, config_path: &Path) -> Result<()> {
        if config_path.as_os_str().is_empty() {
            return Err(ManifestError::MissingConfigPath.into());
        }
        if manifest
            .bundle_identifier()
            .or(self.args.bundle_identifier.as_deref())
            .is_none()
        {
            return Err(ManifestError::MissingBundleIdentifier.into());
        }
        if manifest.name.is_none() {
            return Err(ManifestError::MissingName.into());
        }
        Ok(())
    }

    /// Resolve and materialize the icon grid.
    async fn configure_icons(&self, manifest: &Manifest, config_dir: &Path) -> Result<()> {
        let plan = assets::resolve_icon_plan(manifest);
        let app_icon = assets::resolve_app_icon(manifest);

        let needs_resize = plan
            .instructions
            .iter()
            .any(|i| !matches!(i, assets::IconInstruction::Skip { .. }));
        if needs_resize && !*tools::HAS_SIPS {
            return Err(anyhow::anyhow!("sips not found in PATH; cannot derive app icons").into());
        }

        assets::materialize::materialize_icons(&plan, app_icon.as_ref(), config_dir).await
    }

    /// Write the manifest and JS payload into the bundle.
    async fn preload_manifest_and_bundle(
        &self,
        manifest: &Manifest,
        config_dir: &Path,
    ) -> Result<()> {
        let json = serde_json::to_vec(manifest)?;
        tokio::fs::write(config_dir.join("shell-app-manifest.json"), json).await?;

        let bundle_url = manifest
            .bundle_url
            .as_deref()
            .ok_or(ManifestError::MissingField("bundleUrl"))?;
        http::download_to_path(bundle_url, &config_dir.join("shell-app.bundle")).await
    }

    /// Package the configured bundle to the requested output.
    async fn package_output(
        &self,
        manifest: &Manifest,
        config_dir: &Path,
        configure: &ConfigureArgs,
    ) -> Result<PathBuf> {
        let Some(output) = &configure.output else {
            log::warn!(
                "No --output supplied; configured files left under {}",
                config_dir.display()
            );
            return Ok(config_dir.to_path_buf());
        };

        // validate_config_arguments guarantees the name
        let name = manifest.name.as_deref().ok_or(ManifestError::MissingName)?;
        match self.args.build_type {
            BuildType::Simulator => package::package_simulator_app(config_dir, name, output).await,
            BuildType::Archive => package::package_archive(config_dir, output).await,
        }
    }
}
