#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-cadence playback of authored programs.
//!
//! The execution system plays the first instruction as soon as the world
//! announces [`Event::ProgramStarted`], then arms a repeating timer. Every
//! firing plays the next instruction; once the counter reaches the program
//! length the timer is disarmed and [`Command::ConcludeProgram`] is emitted.
//! Leaving the running state or loading a level disarms the timer early.

use std::time::Duration;

use bunny_hop_core::{Command, Event, GameState, Instruction};
use bunny_hop_system_scheduler::{Scheduler, TimerHandle};
use tracing::debug;

/// Pure system that turns a started program into timed instruction commands.
#[derive(Debug)]
pub struct Execution<K> {
    cadence: Duration,
    tick_key: K,
    program: Vec<Instruction>,
    counter: usize,
    timer: Option<TimerHandle>,
}

impl<K: Clone> Execution<K> {
    /// Creates an idle execution system that arms its timer with `tick_key`.
    #[must_use]
    pub fn new(cadence: Duration, tick_key: K) -> Self {
        Self {
            cadence,
            tick_key,
            program: Vec::new(),
            counter: 0,
            timer: None,
        }
    }

    /// Reports whether a program is currently being played back.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Number of timer firings handled for the current program.
    #[must_use]
    pub fn counter(&self) -> usize {
        self.counter
    }

    /// Consumes world events, arming or disarming playback as required.
    pub fn handle(&mut self, events: &[Event], timers: &mut Scheduler<K>, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::ProgramStarted { instructions } => {
                    self.start(instructions, timers, out);
                }
                Event::StateChanged { to, .. } if *to != GameState::Running => {
                    self.stop(timers);
                }
                Event::LevelLoaded { .. } => self.stop(timers),
                _ => {}
            }
        }
    }

    /// Handles a firing of the playback timer.
    ///
    /// Firings from a handle other than the armed one are ignored.
    pub fn tick(&mut self, fired: TimerHandle, timers: &mut Scheduler<K>, out: &mut Vec<Command>) {
        if self.timer != Some(fired) {
            debug!(handle = fired.get(), "stale playback tick ignored");
            return;
        }

        let step = self.counter + 1;
        if let Some(instruction) = self.program.get(step).copied() {
            out.push(Command::ExecuteInstruction { step, instruction });
        }

        self.counter += 1;
        if self.counter >= self.program.len() {
            debug!(ticks = self.counter, "program exhausted");
            self.stop(timers);
            out.push(Command::ConcludeProgram);
        }
    }

    fn start(
        &mut self,
        instructions: &[Instruction],
        timers: &mut Scheduler<K>,
        out: &mut Vec<Command>,
    ) {
        self.stop(timers);

        let Some(first) = instructions.first().copied() else {
            out.push(Command::ConcludeProgram);
            return;
        };

        self.program = instructions.to_vec();
        self.counter = 0;
        out.push(Command::ExecuteInstruction {
            step: 0,
            instruction: first,
        });
        self.timer = Some(timers.schedule_repeating(self.cadence, self.tick_key.clone()));
        debug!(instructions = self.program.len(), "playback armed");
    }

    fn stop(&mut self, timers: &mut Scheduler<K>) {
        if let Some(handle) = self.timer.take() {
            let _ = timers.cancel(handle);
            debug!(ticks = self.counter, "playback disarmed");
        }
        self.program.clear();
    }
}
