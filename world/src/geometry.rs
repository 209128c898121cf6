use std::collections::{BTreeSet, HashSet};

use bunny_hop_core::Cell;
use serde::Deserialize;

use crate::levels::Level;

/// Convention used to turn a level path entry `[a, b]` into a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathConvention {
    /// Both components come from the z slot: `x = grid[a].z`, `z = grid[b].z`.
    ///
    /// The first grid column enumerates every z coordinate, so indices below
    /// the per-axis sample count address `(column, row)` directly. The
    /// built-in levels are authored this way.
    #[default]
    SharedAxis,
    /// Each component comes from its own slot: `x = grid[a].x`, `z = grid[b].z`.
    PerAxis,
}

impl PathConvention {
    fn resolve(self, grid: &[Cell], entry: [usize; 2]) -> Cell {
        let [first, second] = entry;
        let first = lookup(grid, first);
        let second = lookup(grid, second);
        match self {
            Self::SharedAxis => Cell::from_units(first.units().1, second.units().1),
            Self::PerAxis => Cell::from_units(first.units().0, second.units().1),
        }
    }
}

fn lookup(grid: &[Cell], index: usize) -> Cell {
    match grid.get(index) {
        Some(cell) => *cell,
        None => panic!(
            "level path index {index} is outside the grid of {} cells",
            grid.len()
        ),
    }
}

/// Resolved path and danger cells of a single level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelGeometry {
    path: Vec<Cell>,
    danger: BTreeSet<Cell>,
}

impl LevelGeometry {
    /// Resolves the level against the grid.
    ///
    /// # Panics
    ///
    /// Panics when the level has no path or references a cell outside the
    /// grid. Level data is validated before it reaches the world, so either
    /// case is a programming error.
    #[must_use]
    pub fn resolve(grid: &[Cell], level: &Level, convention: PathConvention) -> Self {
        let path = resolve_path(grid, level, convention);
        assert!(!path.is_empty(), "level path must contain at least one cell");
        let danger = compute_danger(grid, &path);
        Self { path, danger }
    }

    /// Ordered path cells from start to goal.
    #[must_use]
    pub fn path(&self) -> &[Cell] {
        &self.path
    }

    /// Cell the actor starts on.
    #[must_use]
    pub fn start(&self) -> Cell {
        self.path[0]
    }

    /// Cell the actor must reach.
    #[must_use]
    pub fn goal(&self) -> Cell {
        self.path[self.path.len() - 1]
    }

    /// Grid cells that are not part of the path.
    #[must_use]
    pub fn danger(&self) -> &BTreeSet<Cell> {
        &self.danger
    }
}

/// Maps every path entry of the level onto a grid cell.
///
/// # Panics
///
/// Panics when an entry references an index outside the grid.
#[must_use]
pub fn resolve_path(grid: &[Cell], level: &Level, convention: PathConvention) -> Vec<Cell> {
    level
        .path
        .iter()
        .map(|entry| convention.resolve(grid, *entry))
        .collect()
}

/// Returns every grid cell that is not part of the path.
#[must_use]
pub fn compute_danger(grid: &[Cell], path: &[Cell]) -> BTreeSet<Cell> {
    let path: HashSet<Cell> = path.iter().copied().collect();
    grid.iter()
        .copied()
        .filter(|cell| !path.contains(cell))
        .collect()
}
