use std::{fs, path::Path};

use anyhow::{Context, Result};
use bunny_hop_session::{SessionConfig, TimingConfig};
use bunny_hop_world::{build_grid, default_levels, validate_levels, Level, WorldConfig};
use serde::Deserialize;

/// Session configuration and level set loaded from a TOML manifest.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Manifest {
    world: WorldConfig,
    timing: TimingConfig,
    levels: Vec<Level>,
}

impl Manifest {
    /// Reads and validates the manifest stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read level manifest at {}", path.display()))?;
        parse_manifest(&contents)
            .with_context(|| format!("invalid level manifest at {}", path.display()))
    }

    /// Splits the manifest into session configuration and levels.
    pub(crate) fn into_parts(self) -> (SessionConfig, Vec<Level>) {
        let config = SessionConfig {
            world: self.world,
            timing: self.timing,
        };
        (config, self.levels)
    }
}

// An empty `[[levels]]` list selects the built-in level set, which must still
// fit the configured grid.
fn parse_manifest(contents: &str) -> Result<Manifest> {
    let mut manifest: Manifest =
        toml::from_str(contents).context("failed to parse level manifest toml contents")?;
    if manifest.levels.is_empty() {
        manifest.levels = default_levels();
    }

    let grid = &manifest.world.grid;
    let cells = build_grid(grid.half_extent, grid.step).len();
    validate_levels(&manifest.levels, cells).context("level data does not fit the grid")?;
    Ok(manifest)
}
