use serde::Deserialize;

use crate::geometry::PathConvention;

/// Tunable constants that shape the world.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Extent and spacing of the ground grid.
    pub grid: GridConfig,
    /// Convention used to turn level path indices into cells.
    pub path_convention: PathConvention,
    /// Capacity and visual slot layout of the program queue.
    pub queue: QueueConfig,
    /// Per-axis tolerance used when matching the actor against cells.
    pub collision_epsilon: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            path_convention: PathConvention::SharedAxis,
            queue: QueueConfig::default(),
            collision_epsilon: 0.005,
        }
    }
}

/// Extent and spacing of the ground grid.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Distance from the grid centre to its outermost cells along each axis.
    pub half_extent: f64,
    /// Distance between neighbouring cells.
    pub step: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            half_extent: 0.36,
            step: 0.12,
        }
    }
}

/// Capacity and visual slot layout of the program queue.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Maximum number of queued instructions.
    pub capacity: usize,
    /// Slot height the first token is allocated below.
    pub slot_origin: f64,
    /// Height difference between neighbouring token slots.
    pub slot_increment: f64,
    /// Height tokens return to when released.
    pub token_rest_height: f64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            slot_origin: 0.6,
            slot_increment: 0.1,
            token_rest_height: 0.9,
        }
    }
}
