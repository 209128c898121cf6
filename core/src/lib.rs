#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Bunny Hop engine.
//!
//! This crate defines the message surface that connects the session, the
//! authoritative world, and pure systems. The session submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! state, and respond exclusively with new command batches.

use std::f64::consts::{FRAC_PI_2, PI};

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of cell units per world unit. Cells are rounded to four decimals.
pub const CELL_UNITS_PER_WORLD_UNIT: f64 = 10_000.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Loads the level at the provided index, replacing all level-scoped state.
    SelectLevel {
        /// Zero-based index into the level source.
        index: usize,
    },
    /// Reloads the current level, returning to the idle state.
    ResetLevel,
    /// Loads the next level, wrapping to the first one after the last.
    AdvanceLevel,
    /// Appends an authored instruction to the program queue.
    AddInstruction {
        /// Instruction authored by the player.
        instruction: Instruction,
        /// Visual token the presentation layer attached to the instruction.
        token: TokenHandle,
    },
    /// Removes the most recently authored instruction.
    RemoveLastInstruction,
    /// Starts executing the authored program.
    StartProgram,
    /// Applies a single instruction of the running program to the actor.
    ExecuteInstruction {
        /// Position of the instruction within the running program.
        step: usize,
        /// Instruction to apply.
        instruction: Instruction,
    },
    /// Signals that every instruction of the running program was played back.
    ConcludeProgram,
    /// Reports an actor position observed by the presentation layer.
    ///
    /// Ignored outside the running state.
    ReportActorPosition {
        /// Ground-plane position, `x` on the x axis and `y` on the z axis.
        position: DVec2,
    },
    /// Declares that the actor reached a terminal cell.
    DeclareVerdict {
        /// Kind of terminal cell that was reached.
        verdict: Verdict,
        /// Cell the actor was found on.
        cell: Cell,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a level was (re)loaded and its geometry rebuilt.
    LevelLoaded {
        /// Zero-based index of the loaded level.
        index: usize,
        /// Heading the actor faces at the start cell.
        facing: Heading,
        /// Ordered path cells; the first is the start and the last is the goal.
        path: Vec<Cell>,
    },
    /// Hands visual tokens back to the presentation layer.
    TokensReleased {
        /// Tokens that are no longer attached to any instruction.
        tokens: Vec<TokenHandle>,
    },
    /// Confirms that an instruction was appended to the program queue.
    InstructionAdded {
        /// Instruction that was appended.
        instruction: Instruction,
        /// Token attached to the instruction.
        token: TokenHandle,
        /// Height of the visual slot allocated to the token.
        height: f64,
    },
    /// Reports that an instruction could not be appended.
    InstructionRejected {
        /// Instruction that was refused.
        instruction: Instruction,
        /// Specific reason the request failed.
        reason: Rejection,
    },
    /// Confirms that the last instruction was removed from the program queue.
    InstructionRemoved {
        /// Instruction that was removed.
        instruction: Instruction,
        /// Token released by the removal.
        token: TokenHandle,
    },
    /// Reports that the last instruction could not be removed.
    RemovalRejected {
        /// Specific reason the request failed.
        reason: Rejection,
    },
    /// Announces that playback of the authored program began.
    ProgramStarted {
        /// Snapshot of the program that will be played back.
        instructions: Vec<Instruction>,
    },
    /// Reports that the program could not be started.
    ProgramRejected {
        /// Specific reason the request failed.
        reason: Rejection,
    },
    /// Announces that the program queue was emptied.
    ProgramCleared,
    /// Reports that a level selection request was refused.
    LevelSelectionRejected {
        /// Index that was requested.
        index: usize,
        /// Specific reason the request failed.
        reason: Rejection,
    },
    /// Confirms that the actor hopped one cell forward.
    ActorStepped {
        /// Position before the hop.
        from: DVec2,
        /// Position after the hop.
        to: DVec2,
    },
    /// Confirms that an externally reported actor position was recorded.
    ActorObserved {
        /// Reported position.
        position: DVec2,
    },
    /// Confirms that the actor turned in place.
    HeadingChanged {
        /// Heading before the turn.
        from: Heading,
        /// Heading after the turn.
        to: Heading,
        /// Direction of the turn.
        turn: Turn,
    },
    /// Confirms that the actor was snapped exactly onto a cell.
    ActorSnapped {
        /// Cell the actor now occupies.
        cell: Cell,
    },
    /// Announces that the running program reached a terminal cell.
    VerdictReached {
        /// Kind of terminal cell that was reached.
        verdict: Verdict,
        /// Cell the actor was snapped onto.
        cell: Cell,
    },
    /// Announces a game state transition.
    StateChanged {
        /// State before the transition.
        from: GameState,
        /// State after the transition.
        to: GameState,
    },
}

/// Point on the discrete ground grid, rounded to four decimal places.
///
/// Coordinates are stored as integer ten-thousandths so that equality and
/// hashing are exact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    x: i32,
    z: i32,
}

impl Cell {
    /// Creates a cell from world coordinates, rounding both to four decimals.
    #[must_use]
    pub fn from_world(x: f64, z: f64) -> Self {
        Self {
            x: to_units(x),
            z: to_units(z),
        }
    }

    /// Creates a cell from coordinates already expressed in ten-thousandths.
    #[must_use]
    pub const fn from_units(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Coordinate along the x axis in world units.
    #[must_use]
    pub fn x(&self) -> f64 {
        f64::from(self.x) / CELL_UNITS_PER_WORLD_UNIT
    }

    /// Coordinate along the z axis in world units.
    #[must_use]
    pub fn z(&self) -> f64 {
        f64::from(self.z) / CELL_UNITS_PER_WORLD_UNIT
    }

    /// Coordinates in ten-thousandths of a world unit.
    #[must_use]
    pub const fn units(&self) -> (i32, i32) {
        (self.x, self.z)
    }

    /// Ground-plane position of the cell, `x` on the x axis and `y` on the z axis.
    #[must_use]
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x(), self.z())
    }
}

fn to_units(value: f64) -> i32 {
    (value * CELL_UNITS_PER_WORLD_UNIT).round() as i32
}

/// Cardinal facing directions of the player actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heading {
    /// Facing toward decreasing z.
    North,
    /// Facing toward increasing x.
    East,
    /// Facing toward increasing z.
    South,
    /// Facing toward decreasing x.
    West,
}

impl Heading {
    /// Every heading in counter-clockwise order starting from east.
    pub const ALL: [Heading; 4] = [Self::East, Self::North, Self::West, Self::South];

    /// Heading reached by a quarter turn to the left.
    #[must_use]
    pub const fn rotate_left(self) -> Self {
        match self {
            Self::East => Self::North,
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
        }
    }

    /// Heading reached by a quarter turn to the right.
    #[must_use]
    pub const fn rotate_right(self) -> Self {
        match self {
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
            Self::North => Self::East,
        }
    }

    /// Heading reached by applying the provided turn.
    #[must_use]
    pub const fn turned(self, turn: Turn) -> Self {
        match turn {
            Turn::Left => self.rotate_left(),
            Turn::Right => self.rotate_right(),
        }
    }

    /// Signed single-axis step `(dx, dz)` taken by a forward hop.
    #[must_use]
    pub const fn forward_delta(self) -> (i32, i32) {
        match self {
            Self::East => (1, 0),
            Self::West => (-1, 0),
            Self::North => (0, -1),
            Self::South => (0, 1),
        }
    }

    /// Resting rotation of the actor about the vertical axis, in radians.
    #[must_use]
    pub const fn yaw(self) -> f64 {
        match self {
            Self::East => 0.0,
            Self::North => FRAC_PI_2,
            Self::West => PI,
            Self::South => PI + FRAC_PI_2,
        }
    }
}

/// Quarter turn applied by the turning instructions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Turn {
    /// Counter-clockwise quarter turn.
    Left,
    /// Clockwise quarter turn.
    Right,
}

impl Turn {
    /// Signed rotation about the vertical axis applied by the turn, in radians.
    #[must_use]
    pub const fn radians(self) -> f64 {
        match self {
            Self::Left => FRAC_PI_2,
            Self::Right => -FRAC_PI_2,
        }
    }
}

/// Single authored instruction of a player program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instruction {
    /// Hop one cell along the current heading.
    Forward,
    /// Quarter turn to the left.
    TurnLeft,
    /// Quarter turn to the right.
    TurnRight,
}

impl Instruction {
    /// Parses the single-letter program notation (`F`, `L`, `R`).
    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol.to_ascii_uppercase() {
            'F' => Some(Self::Forward),
            'L' => Some(Self::TurnLeft),
            'R' => Some(Self::TurnRight),
            _ => None,
        }
    }

    /// Single-letter program notation of the instruction.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Forward => 'F',
            Self::TurnLeft => 'L',
            Self::TurnRight => 'R',
        }
    }

    /// Turn performed by the instruction, if it is a turning instruction.
    #[must_use]
    pub const fn turn(self) -> Option<Turn> {
        match self {
            Self::Forward => None,
            Self::TurnLeft => Some(Turn::Left),
            Self::TurnRight => Some(Turn::Right),
        }
    }
}

/// Opaque handle of a visual token owned by the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenHandle(u32);

impl TokenHandle {
    /// Creates a new token handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Lifecycle state of the active level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameState {
    /// The player is authoring a program.
    Idle,
    /// The authored program is being played back.
    Running,
    /// The actor reached the goal.
    Complete,
    /// The actor entered a danger cell.
    Failed,
    /// The program ran out without reaching the goal or a danger cell.
    Unresolved,
}

impl GameState {
    /// Reports whether the state requires an explicit player action to leave.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed | Self::Unresolved)
    }

    /// Affordance the primary action offers while in this state.
    #[must_use]
    pub const fn affordance(self) -> Affordance {
        match self {
            Self::Idle | Self::Running => Affordance::Play,
            Self::Complete => Affordance::Next,
            Self::Failed | Self::Unresolved => Affordance::Retry,
        }
    }
}

/// Label of the primary action button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Affordance {
    /// Starts the authored program.
    Play,
    /// Advances to the next level.
    Next,
    /// Retries the current level.
    Retry,
}

impl Affordance {
    /// Name of the button art associated with the affordance.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Play => "btn_play",
            Self::Next => "btn_next",
            Self::Retry => "btn_retry",
        }
    }
}

/// Terminal cell kinds detected by the position judge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// The actor stands on the goal cell.
    ReachedGoal,
    /// The actor stands on a danger cell.
    EnteredDanger,
}

impl Verdict {
    /// State the level transitions into when the verdict is accepted.
    #[must_use]
    pub const fn state(self) -> GameState {
        match self {
            Self::ReachedGoal => GameState::Complete,
            Self::EnteredDanger => GameState::Failed,
        }
    }
}

/// Reasons a request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum Rejection {
    /// The request is only accepted while the level is idle.
    #[error("request is only accepted while the level is idle")]
    WrongState,
    /// The program queue is already full.
    #[error("program queue is full")]
    CapacityExceeded,
    /// The program queue holds no instructions.
    #[error("program queue is empty")]
    Empty,
    /// No level exists at the requested index.
    #[error("no level exists at the requested index")]
    LevelOutOfRange,
}
