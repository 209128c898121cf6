use bunny_hop_core::{Instruction, Rejection, TokenHandle};

use crate::config::QueueConfig;

/// Instruction held by the program queue together with its visual token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueuedInstruction {
    /// Authored instruction.
    pub instruction: Instruction,
    /// Token the presentation layer attached to the instruction.
    pub token: TokenHandle,
}

/// Bounded, ordered list of authored instructions.
///
/// State gating happens in the world; the queue only enforces capacity and
/// emptiness.
#[derive(Clone, Debug)]
pub(crate) struct ProgramQueue {
    entries: Vec<QueuedInstruction>,
    capacity: usize,
    slot_origin: f64,
    slot_increment: f64,
}

impl ProgramQueue {
    pub(crate) fn new(config: &QueueConfig) -> Self {
        Self {
            entries: Vec::with_capacity(config.capacity),
            capacity: config.capacity,
            slot_origin: config.slot_origin,
            slot_increment: config.slot_increment,
        }
    }

    /// Appends the instruction and returns the slot height allocated to its token.
    pub(crate) fn push(
        &mut self,
        instruction: Instruction,
        token: TokenHandle,
    ) -> Result<f64, Rejection> {
        if self.entries.len() >= self.capacity {
            return Err(Rejection::CapacityExceeded);
        }

        self.entries.push(QueuedInstruction { instruction, token });
        Ok(self.slot_height(self.entries.len()))
    }

    pub(crate) fn pop(&mut self) -> Result<QueuedInstruction, Rejection> {
        self.entries.pop().ok_or(Rejection::Empty)
    }

    /// Empties the queue, handing back the tokens in authoring order.
    pub(crate) fn clear(&mut self) -> Vec<TokenHandle> {
        self.entries.drain(..).map(|entry| entry.token).collect()
    }

    pub(crate) fn instructions(&self) -> Vec<Instruction> {
        self.entries.iter().map(|entry| entry.instruction).collect()
    }

    pub(crate) fn entries(&self) -> &[QueuedInstruction] {
        &self.entries
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Height the next appended token would occupy.
    pub(crate) fn next_slot_height(&self) -> f64 {
        self.slot_height(self.entries.len() + 1)
    }

    // Slot `n` sits `n` increments below the origin; derived rather than
    // accumulated so add/remove cycles never drift.
    fn slot_height(&self, slot: usize) -> f64 {
        self.slot_origin - self.slot_increment * slot as f64
    }
}
