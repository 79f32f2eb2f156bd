//! Arrival-order command queue with deferral.
//!
//! Commands are stamped with a monotonic arrival sequence on receipt.
//! At each tick boundary the whole queue is walked once in arrival
//! order; a command either applies, is rejected (dropped with a log),
//! or is blocked on a missing dependency and retried next tick. Blocked
//! commands keep their stamp, so commands that become applicable on the
//! same tick still apply in their original relative order. A command is
//! applied at most once.

use std::collections::VecDeque;

use tether_core::{BodyId, Command, SeqCommand};

/// What happened when a command was attempted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Applied; leaves the queue.
    Applied,
    /// A dependency does not exist yet; stays queued and is retried
    /// once per tick, indefinitely.
    Blocked,
    /// Invalid or a no-op on an unknown entity; dropped.
    Rejected,
}

/// Stamping and pending storage for the command stream.
#[derive(Default)]
pub struct CommandDispatcher {
    next_seq: u64,
    pending: VecDeque<SeqCommand>,
}

impl CommandDispatcher {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp a newly arrived command and append it to the queue.
    pub fn enqueue(&mut self, command: Command) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push_back(SeqCommand {
            command,
            arrival_seq: seq,
        });
        seq
    }

    /// Number of commands waiting to apply.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Take the whole queue for one tick-boundary pass. The caller
    /// walks it in order and hands back the blocked remainder via
    /// [`CommandDispatcher::restore`].
    pub fn take_pending(&mut self) -> VecDeque<SeqCommand> {
        std::mem::take(&mut self.pending)
    }

    /// Put the blocked remainder of a pass back, ahead of anything that
    /// arrived mid-pass.
    pub fn restore(&mut self, mut blocked: VecDeque<SeqCommand>) {
        blocked.append(&mut self.pending);
        self.pending = blocked;
    }
}

/// Drop every queued command that depends on `body`, so a reused id can
/// never receive a command meant for its previous incarnation. Returns
/// the number purged.
pub fn purge_for_body(queue: &mut VecDeque<SeqCommand>, body: BodyId) -> usize {
    let before = queue.len();
    queue.retain(|cmd| !cmd.command.depends_on_body(body));
    before - queue.len()
}
