#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game controller that wires the world, its systems and a presenter together.
//!
//! A [`GameSession`] owns the authoritative [`World`], the playback and judge
//! systems and the simulated clock. Player input becomes world commands; the
//! session applies them, mirrors the resulting events onto its [`Presenter`],
//! and feeds them to the systems. Follow-up commands are processed depth
//! first, so a verdict produced by a hop lands before the next timer is
//! polled.

mod config;
mod presenter;

use std::collections::VecDeque;
use std::time::Duration;

use bunny_hop_core::{
    Affordance, Command, Event, GameState, Instruction, Rejection, TokenHandle, Verdict,
};
use bunny_hop_system_execution::Execution;
use bunny_hop_system_judge::PositionJudge;
use bunny_hop_system_scheduler::{Scheduler, TimerHandle};
use bunny_hop_world::{self as world, query, Level, World};
use glam::DVec2;
use tracing::{debug, info};

pub use config::{SessionConfig, TimingConfig};
pub use presenter::{Animation, Cue, NullPresenter, Presenter};

/// Discrete player inputs accepted by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Input {
    /// Author a forward hop.
    Forward,
    /// Author a left quarter turn.
    TurnLeft,
    /// Author a right quarter turn.
    TurnRight,
    /// Press the context-dependent primary button.
    PrimaryAction,
    /// Remove the most recently authored instruction.
    RemoveLast,
}

impl Input {
    /// Instruction authored by this input, if any.
    #[must_use]
    pub const fn instruction(self) -> Option<Instruction> {
        match self {
            Self::Forward => Some(Instruction::Forward),
            Self::TurnLeft => Some(Instruction::TurnLeft),
            Self::TurnRight => Some(Instruction::TurnRight),
            Self::PrimaryAction | Self::RemoveLast => None,
        }
    }
}

/// Result of pressing the primary button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimaryOutcome {
    /// A program run was scheduled after the debounce delay.
    RunScheduled,
    /// A run was already pending; the press changed nothing.
    AlreadyScheduled,
    /// The program is running; the press changed nothing.
    Ignored,
    /// The current level was reloaded.
    Retried {
        /// Index of the reloaded level.
        level: usize,
    },
    /// The next level was loaded.
    Advanced {
        /// Index of the loaded level.
        level: usize,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Timer {
    Playback,
    DeferredRun,
    Feedback(GameState),
}

/// Interactive game controller driving a [`Presenter`].
#[derive(Debug)]
pub struct GameSession<P> {
    world: World,
    execution: Execution<Timer>,
    judge: PositionJudge,
    timers: Scheduler<Timer>,
    timing: TimingConfig,
    presenter: P,
    deferred_run: Option<TimerHandle>,
    pending_feedback: Option<TimerHandle>,
    journal: Vec<Event>,
}

impl<P: Presenter> GameSession<P> {
    /// Creates a session with the built-in levels and default configuration.
    #[must_use]
    pub fn with_defaults(presenter: P) -> Self {
        Self::new(world::default_levels(), SessionConfig::default(), presenter)
    }

    /// Creates a session over `levels` and presents the first one.
    ///
    /// # Panics
    ///
    /// Panics when the levels do not resolve against the configured grid; see
    /// [`World::with_levels`].
    #[must_use]
    pub fn new(levels: Vec<Level>, config: SessionConfig, presenter: P) -> Self {
        let world = World::with_levels(levels, config.world);
        let judge = PositionJudge::new(query::collision_epsilon(&world));
        let mut session = Self {
            world,
            execution: Execution::new(config.timing.cadence(), Timer::Playback),
            judge,
            timers: Scheduler::new(),
            timing: config.timing,
            presenter,
            deferred_run: None,
            pending_feedback: None,
            journal: Vec::new(),
        };
        let _ = session.dispatch(Command::ResetLevel);
        session
    }

    /// Routes a discrete player input.
    pub fn input(&mut self, input: Input) -> Result<(), Rejection> {
        match input {
            Input::PrimaryAction => {
                let _ = self.primary_action();
                Ok(())
            }
            Input::RemoveLast => self.remove_last().map(|_| ()),
            Input::Forward | Input::TurnLeft | Input::TurnRight => match input.instruction() {
                Some(instruction) => self.add_instruction(instruction).map(|_| ()),
                None => Ok(()),
            },
        }
    }

    /// Appends an instruction to the program and attaches a fresh token to it.
    pub fn add_instruction(&mut self, instruction: Instruction) -> Result<TokenHandle, Rejection> {
        let token = self.next_token();
        let events = self.dispatch(Command::AddInstruction { instruction, token });
        for event in &events {
            match event {
                Event::InstructionAdded { token, .. } => return Ok(*token),
                Event::InstructionRejected { reason, .. } => return Err(*reason),
                _ => {}
            }
        }
        Err(Rejection::WrongState)
    }

    /// Removes the most recently authored instruction.
    pub fn remove_last(&mut self) -> Result<Instruction, Rejection> {
        self.presenter.cue(Cue::Remove);
        let events = self.dispatch(Command::RemoveLastInstruction);
        for event in &events {
            match event {
                Event::InstructionRemoved { instruction, .. } => return Ok(*instruction),
                Event::RemovalRejected { reason } => return Err(*reason),
                _ => {}
            }
        }
        Err(Rejection::WrongState)
    }

    /// Starts the authored program immediately.
    pub fn run(&mut self) -> Result<(), Rejection> {
        let events = self.dispatch(Command::StartProgram);
        match events.iter().find_map(|event| match event {
            Event::ProgramRejected { reason } => Some(*reason),
            _ => None,
        }) {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    /// Presses the primary button, whose meaning depends on the game state.
    ///
    /// In the idle state the run starts after the debounce delay, so presses
    /// arriving while a run is pending are absorbed.
    pub fn primary_action(&mut self) -> PrimaryOutcome {
        self.presenter.cue(Cue::Click);
        match query::state(&self.world) {
            GameState::Idle => {
                if self.deferred_run.is_some() {
                    debug!("run already pending");
                    return PrimaryOutcome::AlreadyScheduled;
                }
                let handle = self
                    .timers
                    .schedule_once(self.timing.run_debounce(), Timer::DeferredRun);
                self.deferred_run = Some(handle);
                info!(delay_ms = self.timing.run_debounce_ms, "run scheduled");
                PrimaryOutcome::RunScheduled
            }
            GameState::Running => PrimaryOutcome::Ignored,
            GameState::Complete => {
                self.advance();
                PrimaryOutcome::Advanced {
                    level: query::current_level(&self.world),
                }
            }
            GameState::Failed | GameState::Unresolved => {
                self.reset();
                PrimaryOutcome::Retried {
                    level: query::current_level(&self.world),
                }
            }
        }
    }

    /// Reloads the current level.
    pub fn reset(&mut self) {
        let _ = self.dispatch(Command::ResetLevel);
    }

    /// Loads the next level, wrapping after the last one.
    pub fn advance(&mut self) {
        let _ = self.dispatch(Command::AdvanceLevel);
    }

    /// Loads the level at `index`.
    pub fn select_level(&mut self, index: usize) -> Result<(), Rejection> {
        let events = self.dispatch(Command::SelectLevel { index });
        match events.iter().find_map(|event| match event {
            Event::LevelSelectionRejected { reason, .. } => Some(*reason),
            _ => None,
        }) {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    /// Records an actor position observed by the presentation layer.
    ///
    /// Reports are only accepted while a program runs. Later hops start from
    /// the last accepted report, so the settled position must be reported last.
    pub fn report_actor_position(&mut self, position: DVec2) {
        let _ = self.dispatch(Command::ReportActorPosition { position });
    }

    /// Advances the simulated clock, handling every timer that comes due.
    ///
    /// Timers are polled one at a time and each firing is fully processed
    /// before the next is considered, so a firing cancelled by an earlier
    /// one never runs.
    pub fn advance_time(&mut self, dt: Duration) {
        self.timers.advance(dt);
        while let Some(fired) = self.timers.poll() {
            match fired.key {
                Timer::Playback => {
                    let mut commands = Vec::new();
                    self.execution
                        .tick(fired.handle, &mut self.timers, &mut commands);
                    for command in commands {
                        let _ = self.dispatch(command);
                    }
                }
                Timer::DeferredRun => {
                    if self.deferred_run != Some(fired.handle) {
                        continue;
                    }
                    self.deferred_run = None;
                    if query::state(&self.world) == GameState::Idle
                        && !query::program(&self.world).is_empty()
                    {
                        if let Err(reason) = self.run() {
                            debug!(%reason, "deferred run rejected");
                        }
                    } else {
                        debug!("deferred run skipped");
                    }
                }
                Timer::Feedback(state) => {
                    if self.pending_feedback != Some(fired.handle) {
                        continue;
                    }
                    self.pending_feedback = None;
                    self.presenter.feedback(state, state.affordance());
                }
            }
        }
    }

    /// Simulated time elapsed since the session started.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Current game state.
    #[must_use]
    pub fn state(&self) -> GameState {
        query::state(&self.world)
    }

    /// Authoritative world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Presenter driven by the session.
    #[must_use]
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Mutable access to the presenter.
    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Drains every world event recorded since the last call.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.journal)
    }

    fn next_token(&self) -> TokenHandle {
        let queued = query::program(&self.world).len();
        TokenHandle::new(u32::try_from(queued).unwrap_or(u32::MAX))
    }

    fn dispatch(&mut self, command: Command) -> Vec<Event> {
        let mut emitted = Vec::new();
        let mut pending = VecDeque::from([command]);

        while let Some(command) = pending.pop_front() {
            let mut events = Vec::new();
            world::apply(&mut self.world, command, &mut events);
            if events.is_empty() {
                continue;
            }

            self.present(&events);

            let mut follow_up = Vec::new();
            self.execution
                .handle(&events, &mut self.timers, &mut follow_up);
            self.judge.handle(
                &events,
                query::goal_cell(&self.world),
                query::danger_cells(&self.world),
                &mut follow_up,
            );
            for command in follow_up.into_iter().rev() {
                pending.push_front(command);
            }

            emitted.extend(events);
        }

        self.journal.extend(emitted.iter().cloned());
        emitted
    }

    fn present(&mut self, events: &[Event]) {
        let rest_height = query::token_rest_height(&self.world);
        for event in events {
            match event {
                Event::LevelLoaded { facing, path, .. } => {
                    self.cancel_pending();
                    self.presenter.place_platforms(path);
                    if let (Some(start), Some(goal)) = (path.first(), path.last()) {
                        self.presenter.place_goal(*goal);
                        self.presenter.set_goal_visible(true);
                        self.presenter.place_actor(start.position(), facing.yaw());
                        self.presenter.set_actor_visible(true);
                    }
                    self.presenter.feedback(GameState::Idle, Affordance::Play);
                }
                Event::TokensReleased { tokens } => {
                    for token in tokens {
                        self.presenter.hide_token(*token, rest_height);
                    }
                }
                Event::InstructionAdded {
                    instruction,
                    token,
                    height,
                } => {
                    self.presenter.show_token(*token, *instruction, *height);
                    self.presenter.cue(Cue::Click);
                }
                Event::InstructionRemoved { token, .. } => {
                    self.presenter.hide_token(*token, rest_height);
                }
                Event::ActorStepped { from, to } => {
                    self.presenter.step_actor(*from, *to);
                    self.presenter.cue(Cue::Jump);
                }
                Event::HeadingChanged { to, turn, .. } => {
                    self.presenter.turn_actor(*to, *turn);
                }
                Event::ActorSnapped { cell } => {
                    self.presenter.snap_actor(cell.position());
                }
                Event::VerdictReached { verdict, cell } => match verdict {
                    Verdict::ReachedGoal => {
                        self.presenter.set_goal_visible(false);
                        self.presenter.animate(Animation::Celebrate);
                        self.presenter.cue(Cue::Complete);
                    }
                    Verdict::EnteredDanger => {
                        self.presenter.animate(Animation::Fall {
                            position: cell.position(),
                        });
                        self.presenter.set_actor_visible(false);
                        self.presenter.cue(Cue::Drop);
                    }
                },
                Event::StateChanged { to, .. } => match to {
                    GameState::Complete | GameState::Failed => {
                        if let Some(stale) = self.pending_feedback.take() {
                            let _ = self.timers.cancel(stale);
                        }
                        self.pending_feedback = Some(
                            self.timers
                                .schedule_once(self.timing.feedback_delay(), Timer::Feedback(*to)),
                        );
                    }
                    GameState::Unresolved => {
                        self.presenter.feedback(*to, to.affordance());
                        self.presenter.cue(Cue::Fail);
                    }
                    GameState::Idle | GameState::Running => {}
                },
                _ => {}
            }
        }
    }

    fn cancel_pending(&mut self) {
        for handle in [self.deferred_run.take(), self.pending_feedback.take()]
            .into_iter()
            .flatten()
        {
            let _ = self.timers.cancel(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_authoring_inputs_map_to_instructions() {
        assert_eq!(Input::Forward.instruction(), Some(Instruction::Forward));
        assert_eq!(Input::TurnLeft.instruction(), Some(Instruction::TurnLeft));
        assert_eq!(Input::TurnRight.instruction(), Some(Instruction::TurnRight));
        assert_eq!(Input::PrimaryAction.instruction(), None);
        assert_eq!(Input::RemoveLast.instruction(), None);
    }

    #[test]
    fn tokens_follow_queue_length() {
        let mut session = GameSession::with_defaults(NullPresenter);
        assert_eq!(session.next_token(), TokenHandle::new(0));

        let _ = session.add_instruction(Instruction::Forward);
        assert_eq!(session.next_token(), TokenHandle::new(1));

        let _ = session.remove_last();
        assert_eq!(session.next_token(), TokenHandle::new(0));
    }

    #[test]
    fn pending_timers_are_dropped_on_level_load() {
        let mut session = GameSession::with_defaults(NullPresenter);
        let _ = session.add_instruction(Instruction::Forward);
        assert_eq!(session.primary_action(), PrimaryOutcome::RunScheduled);

        session.reset();

        assert!(session.deferred_run.is_none());
        assert_eq!(session.timers.pending(), 0);
        session.advance_time(Duration::from_secs(1));
        assert_eq!(session.state(), GameState::Idle);
    }
}
