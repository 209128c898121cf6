#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Position judge that decides when the actor reached the goal or a danger cell.

use std::collections::BTreeSet;

use bunny_hop_core::{Cell, Command, Event, Verdict};
use glam::DVec2;
use tracing::trace;

/// Standing observer of actor positions.
///
/// The judge reacts to every position the world reports, whatever the game
/// state; the world discards verdicts outside the running state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionJudge {
    epsilon: f64,
}

impl PositionJudge {
    /// Creates a judge that matches cells within `epsilon` on each axis.
    #[must_use]
    pub const fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Per-axis tolerance used when matching positions against cells.
    #[must_use]
    pub const fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Consumes world events and emits at most one verdict command.
    ///
    /// Positions are judged in event order and the first match ends the batch.
    pub fn handle(
        &self,
        events: &[Event],
        goal: Cell,
        danger: &BTreeSet<Cell>,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            let position = match event {
                Event::ActorStepped { to, .. } => *to,
                Event::ActorObserved { position } => *position,
                _ => continue,
            };

            if let Some((verdict, cell)) = self.judge(position, goal, danger) {
                trace!(?verdict, x = position.x, z = position.y, "position matched");
                out.push(Command::DeclareVerdict { verdict, cell });
                return;
            }
        }
    }

    /// Matches a position against the goal first and the danger cells second.
    #[must_use]
    pub fn judge(
        &self,
        position: DVec2,
        goal: Cell,
        danger: &BTreeSet<Cell>,
    ) -> Option<(Verdict, Cell)> {
        if self.covers(goal, position) {
            return Some((Verdict::ReachedGoal, goal));
        }

        danger
            .iter()
            .find(|cell| self.covers(**cell, position))
            .map(|cell| (Verdict::EnteredDanger, *cell))
    }

    fn covers(&self, cell: Cell, position: DVec2) -> bool {
        within(position.x, cell.x(), self.epsilon) && within(position.y, cell.z(), self.epsilon)
    }
}

/// Interval containment test: `value` lies in `[centre - epsilon, centre + epsilon]`.
#[must_use]
pub fn within(value: f64, centre: f64, epsilon: f64) -> bool {
    (value - (centre + epsilon)) * (value - (centre - epsilon)) <= 0.0
}
