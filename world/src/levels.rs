use bunny_hop_core::Heading;
use serde::Deserialize;
use thiserror::Error;

/// Static description of a single stage.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Level {
    /// Heading the actor faces on the start cell.
    pub facing: Heading,
    /// Ordered grid index pairs from start to goal.
    pub path: Vec<[usize; 2]>,
}

impl Level {
    /// Creates a level from its facing and path index pairs.
    #[must_use]
    pub fn new(facing: Heading, path: Vec<[usize; 2]>) -> Self {
        Self { facing, path }
    }
}

/// Reasons level data may be rejected before it reaches the world.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// The level source contained no levels.
    #[error("level source contains no levels")]
    NoLevels,
    /// A level declared an empty path.
    #[error("level {level} has an empty path")]
    EmptyPath {
        /// Zero-based index of the offending level.
        level: usize,
    },
    /// A path entry referenced a cell outside the grid.
    #[error("level {level} path entry {entry} references index {index} but the grid has {cells} cells")]
    IndexOutOfRange {
        /// Zero-based index of the offending level.
        level: usize,
        /// Zero-based position of the entry within the path.
        entry: usize,
        /// Index that fell outside the grid.
        index: usize,
        /// Number of cells in the grid.
        cells: usize,
    },
}

/// Checks that every level can be resolved against a grid of `cells` cells.
pub fn validate_levels(levels: &[Level], cells: usize) -> Result<(), LevelError> {
    if levels.is_empty() {
        return Err(LevelError::NoLevels);
    }

    for (level_index, level) in levels.iter().enumerate() {
        if level.path.is_empty() {
            return Err(LevelError::EmptyPath { level: level_index });
        }

        for (entry, pair) in level.path.iter().enumerate() {
            if let Some(index) = pair.iter().copied().find(|index| *index >= cells) {
                return Err(LevelError::IndexOutOfRange {
                    level: level_index,
                    entry,
                    index,
                    cells,
                });
            }
        }
    }

    Ok(())
}

/// Built-in level set laid out on the default 7 by 7 grid.
///
/// Paths use [`PathConvention::SharedAxis`](crate::PathConvention::SharedAxis),
/// so each entry reads as `[column, row]`.
#[must_use]
pub fn default_levels() -> Vec<Level> {
    vec![
        Level::new(Heading::East, vec![[1, 3], [2, 3], [3, 3]]),
        Level::new(
            Heading::East,
            vec![[1, 4], [2, 4], [3, 4], [3, 3], [3, 2]],
        ),
        Level::new(
            Heading::North,
            vec![[2, 5], [2, 4], [2, 3], [3, 3], [4, 3], [4, 2], [4, 1]],
        ),
        Level::new(
            Heading::South,
            vec![[1, 1], [1, 2], [2, 2], [3, 2], [3, 3], [3, 4], [4, 4], [5, 4]],
        ),
        Level::new(
            Heading::West,
            vec![[5, 1], [4, 1], [4, 2], [4, 3], [3, 3], [2, 3], [2, 4], [2, 5]],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_levels_are_valid_on_the_default_grid() {
        assert_eq!(validate_levels(&default_levels(), 49), Ok(()));
    }

    #[test]
    fn empty_level_source_is_rejected() {
        assert_eq!(validate_levels(&[], 49), Err(LevelError::NoLevels));
    }

    #[test]
    fn empty_path_is_rejected() {
        let levels = vec![Level::new(Heading::East, Vec::new())];

        assert_eq!(
            validate_levels(&levels, 49),
            Err(LevelError::EmptyPath { level: 0 })
        );
    }

    #[test]
    fn out_of_range_index_is_reported_with_its_location() {
        let levels = vec![
            Level::new(Heading::East, vec![[0, 1]]),
            Level::new(Heading::East, vec![[0, 1], [2, 49]]),
        ];

        assert_eq!(
            validate_levels(&levels, 49),
            Err(LevelError::IndexOutOfRange {
                level: 1,
                entry: 1,
                index: 49,
                cells: 49,
            })
        );
    }
}
