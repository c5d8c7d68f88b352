//! xcodebuild command construction and execution.
//!
//! The command line and the expected artifact path are both pure functions
//! of (root, destination, type, configuration); the invoker never searches
//! the filesystem to discover what the build produced.

use crate::cli::{BuildConfiguration, BuildType};
use crate::error::{Result, ShellAppError};
use std::path::{Path, PathBuf};

/// Template workspace and scheme the shell binary is built from
const WORKSPACE: &str = "Exponent.xcworkspace";
const SCHEME: &str = "Exponent";

/// A fully constructed build invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    /// Shell command line, run from the iOS project root
    pub command: String,
    /// Derived-data destination for this variant
    pub build_dest: PathBuf,
    /// Where the built .app lands, by convention
    pub app_path: PathBuf,
}

/// Build the xcodebuild command line for a requested variant.
///
/// Archive always uses Release; that is enforced upstream by argument
/// validation and not re-checked here.
pub fn build_command(
    build_type: BuildType,
    configuration: BuildConfiguration,
    verbose: bool,
    ios_root: &Path,
    destination_stem: &str,
) -> BuildPlan {
    let build_dest = ios_root.join(format!("{destination_stem}-{build_type}"));
    let dest = build_dest.display();

    let (mut command, app_path) = match build_type {
        BuildType::Simulator => (
            format!(
                "xcodebuild -workspace {WORKSPACE} -scheme {SCHEME} -sdk iphonesimulator \
                 -configuration {configuration} -arch i386 -derivedDataPath {dest} \
                 CODE_SIGN_IDENTITY=\"\" CODE_SIGNING_REQUIRED=NO SKIP_INSTALL=NO | xcpretty"
            ),
            build_dest.join(format!(
                "Build/Products/{configuration}-iphonesimulator/{SCHEME}.app"
            )),
        ),
        BuildType::Archive => (
            format!(
                "xcodebuild -workspace {WORKSPACE} -scheme {SCHEME} archive \
                 -configuration {configuration} -derivedDataPath {dest} \
                 -archivePath {dest}/{SCHEME}.xcarchive \
                 CODE_SIGN_IDENTITY=\"\" CODE_SIGNING_REQUIRED=NO SKIP_INSTALL=NO | xcpretty"
            ),
            build_dest.join(format!("{SCHEME}.xcarchive/Products/Applications/{SCHEME}.app")),
        ),
    };

    if !verbose {
        command.push_str(" > /dev/null");
    }

    BuildPlan {
        command,
        build_dest,
        app_path,
    }
}

/// The archive directory a build of the given plan produces
pub fn archive_path(plan: &BuildPlan) -> PathBuf {
    plan.build_dest.join(format!("{SCHEME}.xcarchive"))
}

/// Run a build plan from the iOS project root.
///
/// A nonzero exit is fatal and propagated, not retried.
pub async fn run_build(plan: &BuildPlan, ios_root: &Path) -> Result<()> {
    log::debug!("{}", plan.command);

    let status = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(&plan.command)
        .current_dir(ios_root)
        .status()
        .await
        .map_err(|e| ShellAppError::CommandSpawn {
            command: plan.command.clone(),
            source: e,
        })?;

    if !status.success() {
        return Err(ShellAppError::ExternalTool {
            command: plan.command.clone(),
            code: status.code(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulator_debug_follows_the_convention_paths() {
        let plan = build_command(
            BuildType::Simulator,
            BuildConfiguration::Debug,
            false,
            Path::new("../ios"),
            "../shellAppBase",
        );
        assert_eq!(plan.build_dest, Path::new("../ios/../shellAppBase-simulator"));
        assert_eq!(
            plan.app_path,
            Path::new(
                "../ios/../shellAppBase-simulator/Build/Products/Debug-iphonesimulator/Exponent.app"
            )
        );
        assert!(plan.command.contains("-sdk iphonesimulator"));
        assert!(plan.command.contains("-configuration Debug"));
        assert!(plan.command.ends_with("> /dev/null"));
    }

    #[test]
    fn archive_release_builds_an_xcarchive() {
        let plan = build_command(
            BuildType::Archive,
            BuildConfiguration::Release,
            true,
            Path::new("/proj/ios"),
            "../shellAppBase",
        );
        assert!(plan.command.contains("archive -configuration Release"));
        assert!(plan.command.contains("-archivePath"));
        assert!(!plan.command.contains("/dev/null"));
        assert_eq!(
            archive_path(&plan),
            Path::new("/proj/ios/../shellAppBase-archive/Exponent.xcarchive")
        );
        assert_eq!(
            plan.app_path,
            Path::new(
                "/proj/ios/../shellAppBase-archive/Exponent.xcarchive/Products/Applications/Exponent.app"
            )
        );
    }

    #[test]
    fn command_is_deterministic() {
        let a = build_command(
            BuildType::Archive,
            BuildConfiguration::Release,
            false,
            Path::new("../ios"),
            "../shellAppBase",
        );
        let b = build_command(
            BuildType::Archive,
            BuildConfiguration::Release,
            false,
            Path::new("../ios"),
            "../shellAppBase",
        );
        assert_eq!(a, b);
    }
}
