//! Coalescing priority queue between request handlers and the dispatcher.
//!
//! The queue holds at most one pending command per `CommandKind`. A newer
//! command of a kind that is already queued replaces the older one in place,
//! so a burst of brightness changes collapses to the last value. `pop` hands
//! out the highest-priority pending command and blocks while nothing is
//! pending.
//!
//! The dispatcher takes commands with `pop_tracked` and reports them with
//! `mark_done`, which lets `wait_idle_timeout` tell when everything pushed so
//! far has been fully handled.

mod command;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

pub use command::{Command, CommandKind};

struct Slots {
    pending: [Option<Command>; CommandKind::COUNT],
    // Taken by `pop_tracked` and not yet reported done
    in_flight: usize,
}

impl Slots {
    fn new() -> Self {
        Self {
            pending: [None, None, None, None],
            in_flight: 0,
        }
    }

    fn insert(&mut self, cmd: Command) -> Option<Command> {
        self.pending[cmd.kind().slot()].replace(cmd)
    }

    fn take_highest(&mut self) -> Option<Command> {
        CommandKind::BY_PRIORITY
            .iter()
            .find_map(|kind| self.pending[kind.slot()].take())
    }

    fn occupied(&self) -> usize {
        self.pending.iter().filter(|slot| slot.is_some()).count()
    }

    fn is_idle(&self) -> bool {
        self.in_flight == 0 && self.occupied() == 0
    }
}

struct Shared {
    slots: Mutex<Slots>,
    added: Condvar,
    idle: Condvar,
}

/// Priority inbox with one slot per command kind.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct CommandQueue {
    shared: Arc<Shared>,
}

impl CommandQueue {
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                slots: Mutex::new(Slots::new()),
                added: Condvar::new(),
                idle: Condvar::new(),
            }),
        }
    }

    /// Queue `cmd`, replacing any pending command of the same kind.
    pub fn push(&self, cmd: Command) {
        let kind = cmd.kind();
        let replaced = {
            let mut slots = self.shared.slots.lock();
            slots.insert(cmd)
        };
        if let Some(old) = replaced {
            log::debug!("Coalesced pending {} command {:?}", kind, old);
        }
        self.shared.added.notify_one();
    }

    /// Take the highest-priority pending command, waiting for one if needed.
    ///
    /// The lock is released while waiting. A wake-up that finds the queue
    /// already drained by another consumer goes back to waiting.
    pub fn pop(&self) -> Command {
        let mut slots = self.shared.slots.lock();
        loop {
            if let Some(cmd) = slots.take_highest() {
                return cmd;
            }
            self.shared.added.wait(&mut slots);
        }
    }

    /// Like `pop`, but the command counts as in flight until `mark_done`.
    pub fn pop_tracked(&self) -> Command {
        let mut slots = self.shared.slots.lock();
        loop {
            if let Some(cmd) = slots.take_highest() {
                slots.in_flight += 1;
                return cmd;
            }
            self.shared.added.wait(&mut slots);
        }
    }

    /// Report a command from `pop_tracked` as fully handled.
    pub fn mark_done(&self) {
        let mut slots = self.shared.slots.lock();
        slots.in_flight = slots.in_flight.saturating_sub(1);
        if slots.is_idle() {
            self.shared.idle.notify_all();
        }
    }

    /// Wait until nothing is pending or in flight.
    ///
    /// Returns `false` if that did not happen within `timeout`.
    pub fn wait_idle_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut slots = self.shared.slots.lock();
        while !slots.is_idle() {
            if self
                .shared
                .idle
                .wait_until(&mut slots, deadline)
                .timed_out()
            {
                return slots.is_idle();
            }
        }
        true
    }

    /// Like `pop`, but gives up after `timeout`.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<Command> {
        let deadline = Instant::now() + timeout;
        let mut slots = self.shared.slots.lock();
        loop {
            if let Some(cmd) = slots.take_highest() {
                return Some(cmd);
            }
            if self
                .shared
                .added
                .wait_until(&mut slots, deadline)
                .timed_out()
            {
                return slots.take_highest();
            }
        }
    }

    /// Take the highest-priority pending command without waiting.
    pub fn try_pop(&self) -> Option<Command> {
        self.shared.slots.lock().take_highest()
    }

    /// Number of occupied slots
    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared.slots.lock().occupied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
