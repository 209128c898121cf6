#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state for Bunny Hop.
//!
//! The world owns the grid, the active level geometry, the program queue, the
//! actor pose, and the game state machine. It is mutated exclusively through
//! [`apply`] and observed through the [`query`] module.

mod config;
mod geometry;
mod grid;
mod levels;
mod program;

use bunny_hop_core::{
    Cell, Command, Event, GameState, Heading, Instruction, Rejection, TokenHandle, Verdict,
};
use glam::DVec2;
use tracing::{debug, info, warn};

pub use config::{GridConfig, QueueConfig, WorldConfig};
pub use geometry::{compute_danger, resolve_path, LevelGeometry, PathConvention};
pub use grid::build_grid;
pub use levels::{default_levels, validate_levels, Level, LevelError};
pub use program::QueuedInstruction;

use program::ProgramQueue;

/// Represents the authoritative Bunny Hop level state.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    levels: Vec<Level>,
    current_level: usize,
    grid: Vec<Cell>,
    geometry: LevelGeometry,
    program: ProgramQueue,
    retired_tokens: Vec<TokenHandle>,
    heading: Heading,
    actor: DVec2,
    state: GameState,
}

impl World {
    /// Creates a world with the built-in level set and default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_levels(default_levels(), WorldConfig::default())
    }

    /// Creates a world over the provided levels, positioned on the first one.
    ///
    /// # Panics
    ///
    /// Panics when the level data cannot be resolved against the configured
    /// grid. Callers loading levels from external sources should run
    /// [`validate_levels`] first.
    #[must_use]
    pub fn with_levels(levels: Vec<Level>, config: WorldConfig) -> Self {
        let grid = build_grid(config.grid.half_extent, config.grid.step);
        if let Err(error) = validate_levels(&levels, grid.len()) {
            panic!("malformed level data: {error}");
        }

        let geometry = LevelGeometry::resolve(&grid, &levels[0], config.path_convention);
        let heading = levels[0].facing;
        let actor = geometry.start().position();
        Self {
            program: ProgramQueue::new(&config.queue),
            config,
            levels,
            current_level: 0,
            grid,
            geometry,
            retired_tokens: Vec::new(),
            heading,
            actor,
            state: GameState::Idle,
        }
    }

    fn load_level(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let previous = self.state;
        let had_program = !self.program.is_empty();

        self.current_level = index;
        self.grid = build_grid(self.config.grid.half_extent, self.config.grid.step);
        self.geometry = LevelGeometry::resolve(
            &self.grid,
            &self.levels[index],
            self.config.path_convention,
        );
        self.heading = self.levels[index].facing;
        self.actor = self.geometry.start().position();
        self.state = GameState::Idle;

        let mut tokens = std::mem::take(&mut self.retired_tokens);
        tokens.extend(self.program.clear());

        info!(
            level = index,
            path = self.geometry.path().len(),
            danger = self.geometry.danger().len(),
            "level loaded"
        );

        if previous != GameState::Idle {
            out_events.push(Event::StateChanged {
                from: previous,
                to: GameState::Idle,
            });
        }
        if had_program {
            out_events.push(Event::ProgramCleared);
        }
        if !tokens.is_empty() {
            out_events.push(Event::TokensReleased { tokens });
        }
        out_events.push(Event::LevelLoaded {
            index,
            facing: self.heading,
            path: self.geometry.path().to_vec(),
        });
    }

    fn transition(&mut self, to: GameState, out_events: &mut Vec<Event>) {
        let from = self.state;
        if from == to {
            return;
        }

        self.state = to;
        debug!(?from, ?to, "state changed");
        out_events.push(Event::StateChanged { from, to });
    }

    // Tokens of a finished program stay on display until the next level load.
    fn retire_program(&mut self, out_events: &mut Vec<Event>) {
        if self.program.is_empty() {
            return;
        }

        let tokens = self.program.clear();
        self.retired_tokens.extend(tokens);
        out_events.push(Event::ProgramCleared);
    }

    fn execute(&mut self, step: usize, instruction: Instruction, out_events: &mut Vec<Event>) {
        match instruction.turn() {
            None => {
                let (dx, dz) = self.heading.forward_delta();
                let from = self.actor;
                let to = from + DVec2::new(f64::from(dx), f64::from(dz)) * self.config.grid.step;
                self.actor = to;
                debug!(step, x = to.x, z = to.y, "actor stepped");
                out_events.push(Event::ActorStepped { from, to });
            }
            Some(turn) => {
                let from = self.heading;
                let to = from.turned(turn);
                self.heading = to;
                debug!(step, ?from, ?to, "actor turned");
                out_events.push(Event::HeadingChanged { from, to, turn });
            }
        }
    }

    fn verdict_matches(&self, verdict: Verdict, cell: Cell) -> bool {
        match verdict {
            Verdict::ReachedGoal => self.geometry.goal() == cell,
            Verdict::EnteredDanger => self.geometry.danger().contains(&cell),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SelectLevel { index } => {
            if index < world.levels.len() {
                world.load_level(index, out_events);
            } else {
                warn!(index, levels = world.levels.len(), "level selection rejected");
                out_events.push(Event::LevelSelectionRejected {
                    index,
                    reason: Rejection::LevelOutOfRange,
                });
            }
        }
        Command::ResetLevel => {
            let index = world.current_level;
            world.load_level(index, out_events);
        }
        Command::AdvanceLevel => {
            let next = world.current_level + 1;
            let index = if next < world.levels.len() { next } else { 0 };
            world.load_level(index, out_events);
        }
        Command::AddInstruction { instruction, token } => {
            let outcome = if world.state == GameState::Idle {
                world.program.push(instruction, token)
            } else {
                Err(Rejection::WrongState)
            };

            match outcome {
                Ok(height) => out_events.push(Event::InstructionAdded {
                    instruction,
                    token,
                    height,
                }),
                Err(reason) => {
                    debug!(?instruction, %reason, "instruction rejected");
                    out_events.push(Event::InstructionRejected {
                        instruction,
                        reason,
                    });
                }
            }
        }
        Command::RemoveLastInstruction => {
            let outcome = if world.state == GameState::Idle {
                world.program.pop()
            } else {
                Err(Rejection::WrongState)
            };

            match outcome {
                Ok(removed) => out_events.push(Event::InstructionRemoved {
                    instruction: removed.instruction,
                    token: removed.token,
                }),
                Err(reason) => {
                    debug!(%reason, "removal rejected");
                    out_events.push(Event::RemovalRejected { reason });
                }
            }
        }
        Command::StartProgram => {
            let rejection = if world.state != GameState::Idle {
                Some(Rejection::WrongState)
            } else if world.program.is_empty() {
                Some(Rejection::Empty)
            } else {
                None
            };

            if let Some(reason) = rejection {
                debug!(%reason, "program start rejected");
                out_events.push(Event::ProgramRejected { reason });
                return;
            }

            let instructions = world.program.instructions();
            info!(instructions = instructions.len(), "program started");
            world.transition(GameState::Running, out_events);
            out_events.push(Event::ProgramStarted { instructions });
        }
        Command::ExecuteInstruction { step, instruction } => {
            if world.state != GameState::Running {
                debug!(step, state = ?world.state, "instruction ignored outside running state");
                return;
            }

            world.execute(step, instruction, out_events);
        }
        Command::ConcludeProgram => {
            if world.state != GameState::Running {
                return;
            }

            info!("program exhausted without a verdict");
            world.retire_program(out_events);
            world.transition(GameState::Unresolved, out_events);
        }
        Command::ReportActorPosition { position } => {
            if world.state != GameState::Running {
                debug!(state = ?world.state, "position report ignored outside running state");
                return;
            }

            world.actor = position;
            out_events.push(Event::ActorObserved { position });
        }
        Command::DeclareVerdict { verdict, cell } => {
            if world.state != GameState::Running {
                debug!(?verdict, state = ?world.state, "verdict ignored outside running state");
                return;
            }
            if !world.verdict_matches(verdict, cell) {
                warn!(?verdict, ?cell, "verdict does not match level geometry");
                return;
            }

            info!(?verdict, "verdict reached");
            world.actor = cell.position();
            out_events.push(Event::ActorSnapped { cell });
            out_events.push(Event::VerdictReached { verdict, cell });
            world.retire_program(out_events);
            world.transition(verdict.state(), out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::collections::BTreeSet;

    use bunny_hop_core::{Cell, GameState, Heading};
    use glam::DVec2;

    use super::{QueuedInstruction, World, WorldConfig};

    /// Provides read-only access to the configuration the world was built with.
    #[must_use]
    pub fn config(world: &World) -> &WorldConfig {
        &world.config
    }

    /// Zero-based index of the active level.
    #[must_use]
    pub fn current_level(world: &World) -> usize {
        world.current_level
    }

    /// Number of levels in the level source.
    #[must_use]
    pub fn level_count(world: &World) -> usize {
        world.levels.len()
    }

    /// Current game state.
    #[must_use]
    pub fn state(world: &World) -> GameState {
        world.state
    }

    /// Current actor heading.
    #[must_use]
    pub fn heading(world: &World) -> Heading {
        world.heading
    }

    /// Last known actor position, `x` on the x axis and `y` on the z axis.
    #[must_use]
    pub fn actor_position(world: &World) -> DVec2 {
        world.actor
    }

    /// Every cell of the ground grid in enumeration order.
    #[must_use]
    pub fn grid(world: &World) -> &[Cell] {
        &world.grid
    }

    /// Ordered path cells of the active level.
    #[must_use]
    pub fn path_cells(world: &World) -> &[Cell] {
        world.geometry.path()
    }

    /// Cell the actor starts the active level on.
    #[must_use]
    pub fn start_cell(world: &World) -> Cell {
        world.geometry.start()
    }

    /// Cell the actor must reach to complete the active level.
    #[must_use]
    pub fn goal_cell(world: &World) -> Cell {
        world.geometry.goal()
    }

    /// Cells of the active level that fail the level when entered.
    #[must_use]
    pub fn danger_cells(world: &World) -> &BTreeSet<Cell> {
        world.geometry.danger()
    }

    /// Instructions currently held by the program queue, in authoring order.
    #[must_use]
    pub fn program(world: &World) -> &[QueuedInstruction] {
        world.program.entries()
    }

    /// Maximum number of instructions the program queue accepts.
    #[must_use]
    pub fn program_capacity(world: &World) -> usize {
        world.program.capacity()
    }

    /// Height the next authored token would be displayed at.
    #[must_use]
    pub fn next_slot_height(world: &World) -> f64 {
        world.program.next_slot_height()
    }

    /// Height released tokens return to.
    #[must_use]
    pub fn token_rest_height(world: &World) -> f64 {
        world.config.queue.token_rest_height
    }

    /// Per-axis tolerance used when matching the actor against cells.
    #[must_use]
    pub fn collision_epsilon(world: &World) -> f64 {
        world.config.collision_epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_world_starts_idle_on_the_first_level() {
        let world = World::new();

        assert_eq!(query::state(&world), GameState::Idle);
        assert_eq!(query::current_level(&world), 0);
        assert_eq!(query::heading(&world), Heading::East);
        assert_eq!(
            query::actor_position(&world),
            query::start_cell(&world).position()
        );
    }

    #[test]
    fn every_built_in_level_partitions_the_grid() {
        let mut world = World::new();
        let mut events = Vec::new();

        for index in 0..query::level_count(&world) {
            apply(&mut world, Command::SelectLevel { index }, &mut events);
            let grid = query::grid(&world);
            let path = query::path_cells(&world);
            let danger = query::danger_cells(&world);

            assert!(path.iter().all(|cell| !danger.contains(cell)), "level {index}");
            assert_eq!(path.len() + danger.len(), grid.len(), "level {index}");
            assert!(
                grid.iter()
                    .all(|cell| danger.contains(cell) || path.contains(cell)),
                "level {index}"
            );
        }
    }

    #[test]
    fn out_of_range_selection_is_rejected() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(&mut world, Command::SelectLevel { index: 99 }, &mut events);

        assert_eq!(
            events,
            vec![Event::LevelSelectionRejected {
                index: 99,
                reason: Rejection::LevelOutOfRange,
            }]
        );
        assert_eq!(query::current_level(&world), 0);
    }

    #[test]
    #[should_panic(expected = "malformed level data")]
    fn malformed_levels_fail_at_construction() {
        let levels = vec![Level::new(Heading::East, vec![[0, 120]])];
        let _ = World::with_levels(levels, WorldConfig::default());
    }
}
