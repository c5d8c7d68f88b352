//! App icon grid resolution.
//!
//! The target platform's icon catalog needs a fixed matrix of (point size,
//! resolution) images. Each cell resolves independently to a per-cell
//! manifest override, the manifest-wide default image, or a skip. This
//! module only computes the plan; execution lives in [`materialize`].

pub mod materialize;

use crate::manifest::Manifest;

/// Icon point sizes required by the catalog
pub const ICON_SIZES: [u32; 3] = [29, 40, 60];
/// Icon resolutions required by the catalog
pub const ICON_RESOLUTIONS: [u32; 2] = [2, 3];
/// Temp filename for the shared default icon download
pub const DEFAULT_ICON_FILENAME: &str = "exp-icon.png";

/// One (size, resolution) combination from the fixed grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconCell {
    /// Point size
    pub size: u32,
    /// Scale factor
    pub resolution: u32,
}

impl IconCell {
    /// The full fixed grid, row-major over sizes then resolutions
    pub fn grid() -> Vec<IconCell> {
        let mut cells = Vec::with_capacity(ICON_SIZES.len() * ICON_RESOLUTIONS.len());
        for &size in &ICON_SIZES {
            for &resolution in &ICON_RESOLUTIONS {
                cells.push(IconCell { size, resolution });
            }
        }
        cells
    }

    /// Qualifier used in filenames and manifest keys, e.g. `29x29@2x`
    pub fn qualifier(&self) -> String {
        format!("{0}x{0}@{1}x", self.size, self.resolution)
    }

    /// Manifest key for a per-cell override, e.g. `iconUrl29x29@2x`
    pub fn manifest_key(&self) -> String {
        format!("iconUrl{}", self.qualifier())
    }

    /// Temp filename for a per-cell override download
    pub fn source_filename(&self) -> String {
        format!("exp-icon{}.png", self.qualifier())
    }

    /// Derived artifact filename, e.g. `AppIcon29x29@2x.png`
    pub fn target_filename(&self) -> String {
        format!("AppIcon{}.png", self.qualifier())
    }

    /// Pixel edge length of the derived artifact
    pub fn pixel_size(&self) -> u32 {
        self.size * self.resolution
    }
}

/// How one grid cell is materialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconInstruction {
    /// Download the cell's own source image, derive the artifact, then
    /// delete the download
    UseOverride {
        /// Grid cell
        cell: IconCell,
        /// Per-cell source image URL
        source_url: String,
    },
    /// Derive the artifact from the shared default download
    UseDefault {
        /// Grid cell
        cell: IconCell,
    },
    /// No image available for this cell; non-fatal, surfaced as a warning
    Skip {
        /// Grid cell
        cell: IconCell,
        /// Warning text naming the missing manifest keys
        reason: String,
    },
}

/// Primary (non-sized) icon download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconDownload {
    /// Source URL
    pub url: String,
    /// Temp filename inside the config directory
    pub filename: String,
}

/// Complete materialization plan for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconPlan {
    /// Per-cell instructions, one per grid cell
    pub instructions: Vec<IconInstruction>,
    /// Whether the shared default download should be deleted after all
    /// cells are processed (true iff at least one cell consumes it)
    pub delete_default_after: bool,
}

/// Resolve the per-cell icon plan from a manifest.
///
/// Per-cell resolution is independent of ordering; the only cross-cell
/// output is `delete_default_after`, computed here from the finished plan
/// rather than during execution.
pub fn resolve_icon_plan(manifest: &Manifest) -> IconPlan {
    let has_default = manifest.icon_url.is_some();

    let instructions: Vec<IconInstruction> = IconCell::grid()
        .into_iter()
        .map(|cell| {
            if let Some(url) = manifest.icon_override(&cell.manifest_key()) {
                IconInstruction::UseOverride {
                    cell,
                    source_url: url.to_string(),
                }
            } else if has_default {
                IconInstruction::UseDefault { cell }
            } else {
                IconInstruction::Skip {
                    reason: format!(
                        "Manifest does not specify ios.{} nor a default iconUrl. \
                         Bundle will use the template logo.",
                        cell.manifest_key()
                    ),
                    cell,
                }
            }
        })
        .collect();

    let delete_default_after = instructions
        .iter()
        .any(|i| matches!(i, IconInstruction::UseDefault { .. }));

    IconPlan {
        instructions,
        delete_default_after,
    }
}

/// Resolve the primary icon download, independent of the grid
pub fn resolve_app_icon(manifest: &Manifest) -> Option<IconDownload> {
    manifest.icon_url.as_ref().map(|url| IconDownload {
        url: url.clone(),
        filename: DEFAULT_ICON_FILENAME.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(json: &str) -> Manifest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn grid_has_six_cells_with_derived_names() {
        let grid = IconCell::grid();
        assert_eq!(grid.len(), 6);

        let cell = IconCell {
            size: 29,
            resolution: 2,
        };
        assert_eq!(cell.manifest_key(), "iconUrl29x29@2x");
        assert_eq!(cell.source_filename(), "exp-icon29x29@2x.png");
        assert_eq!(cell.target_filename(), "AppIcon29x29@2x.png");
        assert_eq!(cell.pixel_size(), 58);
    }

    #[test]
    fn no_sources_means_all_cells_skip() {
        let plan = resolve_icon_plan(&manifest(r#"{"name": "A"}"#));
        assert_eq!(plan.instructions.len(), 6);
        assert!(
            plan.instructions
                .iter()
                .all(|i| matches!(i, IconInstruction::Skip { .. }))
        );
        assert!(!plan.delete_default_after);
        assert_eq!(resolve_app_icon(&manifest(r#"{"name": "A"}"#)), None);
    }

    #[test]
    fn default_only_means_all_cells_use_default() {
        let m = manifest(r#"{"name": "A", "iconUrl": "https://x/icon.png"}"#);
        let plan = resolve_icon_plan(&m);
        assert!(
            plan.instructions
                .iter()
                .all(|i| matches!(i, IconInstruction::UseDefault { .. }))
        );
        assert!(plan.delete_default_after);

        // Exactly one shared download for the default source
        assert_eq!(
            resolve_app_icon(&m),
            Some(IconDownload {
                url: "https://x/icon.png".to_string(),
                filename: "exp-icon.png".to_string(),
            })
        );
    }

    #[test]
    fn single_override_leaves_other_cells_independent() {
        let m = manifest(
            r#"{
                "name": "A",
                "iconUrl": "https://x/icon.png",
                "ios": {"iconUrl29x29@2x": "https://x/small.png"}
            }"#,
        );
        let plan = resolve_icon_plan(&m);

        let overrides: Vec<_> = plan
            .instructions
            .iter()
            .filter_map(|i| match i {
                IconInstruction::UseOverride { cell, source_url } => Some((cell, source_url)),
                _ => None,
            })
            .collect();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].0.qualifier(), "29x29@2x");
        assert_eq!(overrides[0].1, "https://x/small.png");

        let defaults = plan
            .instructions
            .iter()
            .filter(|i| matches!(i, IconInstruction::UseDefault { .. }))
            .count();
        assert_eq!(defaults, 5);
        assert!(plan.delete_default_after);
    }

    #[test]
    fn override_without_default_skips_the_rest() {
        let m = manifest(
            r#"{"name": "A", "ios": {"iconUrl60x60@3x": "https://x/big.png"}}"#,
        );
        let plan = resolve_icon_plan(&m);
        let skips = plan
            .instructions
            .iter()
            .filter(|i| matches!(i, IconInstruction::Skip { .. }))
            .count();
        assert_eq!(skips, 5);
        // No cell consumed a default, nothing to delete afterwards
        assert!(!plan.delete_default_after);
    }
}
