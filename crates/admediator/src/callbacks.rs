//! Pending caller callbacks, at most one load and one show callback per slot.
//!
//! Registration replaces; it never queues. Firing takes the callback out of
//! the registry before invoking it, so the registration is already clear
//! when caller code runs.

use crate::slot::{AdSlotKind, RewardOutcome};

pub type LoadCallback = Box<dyn FnOnce(bool) + Send + 'static>;
pub type ShowCallback = Box<dyn FnOnce(RewardOutcome) + Send + 'static>;
pub type ReadyCallback = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct Pending {
    load: Option<LoadCallback>,
    show: Option<ShowCallback>,
}

#[derive(Default)]
pub struct CallbackRegistry {
    pending: [Pending; 3],
    report_superseded: bool,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a warning whenever a never-fired callback is replaced.
    pub fn with_superseded_warnings(mut self, enabled: bool) -> Self {
        self.report_superseded = enabled;
        self
    }

    /// Returns `true` if an earlier, never-fired callback was dropped.
    pub fn register_load(&mut self, slot: AdSlotKind, callback: LoadCallback) -> bool {
        let superseded = self.pending[slot.index()].load.replace(callback).is_some();
        if superseded {
            self.superseded(slot, "load");
        }
        superseded
    }

    /// Returns `true` if an earlier, never-fired callback was dropped.
    pub fn register_show(&mut self, slot: AdSlotKind, callback: ShowCallback) -> bool {
        let superseded = self.pending[slot.index()].show.replace(callback).is_some();
        if superseded {
            self.superseded(slot, "show");
        }
        superseded
    }

    fn superseded(&self, slot: AdSlotKind, kind: &'static str) {
        if self.report_superseded {
            tracing::warn!(%slot, callback = kind, "Pending callback superseded before it fired");
        }
    }

    /// Returns `true` if a callback was invoked.
    pub fn fire_load(&mut self, slot: AdSlotKind, success: bool) -> bool {
        match self.pending[slot.index()].load.take() {
            Some(callback) => {
                callback(success);
                true
            }
            None => false,
        }
    }

    /// Returns `true` if a callback was invoked.
    pub fn fire_show(&mut self, slot: AdSlotKind, outcome: RewardOutcome) -> bool {
        match self.pending[slot.index()].show.take() {
            Some(callback) => {
                callback(outcome);
                true
            }
            None => false,
        }
    }

    /// Drop every registration without invoking it. Returns how many were
    /// dropped.
    pub fn clear(&mut self) -> usize {
        let mut dropped = 0;
        for pending in &mut self.pending {
            dropped += usize::from(pending.load.take().is_some());
            dropped += usize::from(pending.show.take().is_some());
        }
        dropped
    }

    pub fn has_pending_load(&self, slot: AdSlotKind) -> bool {
        self.pending[slot.index()].load.is_some()
    }

    pub fn has_pending_show(&self, slot: AdSlotKind) -> bool {
        self.pending[slot.index()].show.is_some()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        for slot in AdSlotKind::ALL {
            list.entry(&(
                slot.as_str(),
                self.has_pending_load(slot),
                self.has_pending_show(slot),
            ));
        }
        list.finish()
    }
}
