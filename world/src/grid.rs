use bunny_hop_core::Cell;

// Absorbs representation error in `2 * half_extent / step` before truncating.
const SAMPLE_TOLERANCE: f64 = 1e-9;

/// Enumerates every cell of the ground grid.
///
/// The outer loop walks the x axis and the inner loop walks the z axis, both
/// from `-half_extent` to `half_extent` inclusive. Level data indexes into the
/// returned sequence, so the order is part of the contract. Coordinates are
/// derived from the sample index rather than accumulated, which keeps the far
/// edge from dropping out through floating point drift.
#[must_use]
pub fn build_grid(half_extent: f64, step: f64) -> Vec<Cell> {
    let samples = samples_per_axis(half_extent, step);
    let mut cells = Vec::with_capacity(samples * samples);
    for column in 0..samples {
        let x = axis_value(half_extent, step, column);
        for row in 0..samples {
            cells.push(Cell::from_world(x, axis_value(half_extent, step, row)));
        }
    }
    cells
}

/// Number of cells along one axis of the grid.
#[must_use]
pub(crate) fn samples_per_axis(half_extent: f64, step: f64) -> usize {
    if !(step > 0.0) || !(half_extent >= 0.0) {
        return 0;
    }

    let spans = (2.0 * half_extent / step + SAMPLE_TOLERANCE).floor();
    spans as usize + 1
}

fn axis_value(half_extent: f64, step: f64, index: usize) -> f64 {
    -half_extent + step * index as f64
}
