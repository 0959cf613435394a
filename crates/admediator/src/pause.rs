//! Pause side-channel: freezes game time and audio while a full-screen ad is
//! on screen.

use crate::error::{MediationError, Result};

/// Something that stops and restarts with the game (time scale, audio, AI).
pub trait Pausable: Send {
    fn on_pause(&mut self);
    fn on_resume(&mut self);
}

/// Idempotent suspend/resume fan-out.
///
/// The game clock is a one-per-process collaborator and is always notified
/// first; other members follow in registration order.
#[derive(Default)]
pub struct PauseBridge {
    suspended: bool,
    clock: Option<Box<dyn Pausable>>,
    members: Vec<Box<dyn Pausable>>,
}

impl PauseBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the game clock. A second registration is a fatal error.
    pub fn set_clock(&mut self, clock: Box<dyn Pausable>) -> Result<()> {
        if self.clock.is_some() {
            return Err(MediationError::DuplicateRegistration(
                "pause clock".to_string(),
            ));
        }
        self.clock = Some(clock);
        Ok(())
    }

    pub fn with_clock(mut self, clock: Box<dyn Pausable>) -> Result<Self> {
        self.set_clock(clock)?;
        Ok(self)
    }

    pub fn add_member(&mut self, member: Box<dyn Pausable>) {
        self.members.push(member);
    }

    pub fn with_member(mut self, member: Box<dyn Pausable>) -> Self {
        self.add_member(member);
        self
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Returns `false` when already suspended (nothing was notified).
    pub fn suspend(&mut self) -> bool {
        if self.suspended {
            return false;
        }
        self.suspended = true;
        tracing::debug!(members = self.members.len(), "Suspending game");
        for target in self.clock.iter_mut().chain(self.members.iter_mut()) {
            target.on_pause();
        }
        true
    }

    /// Returns `false` when not suspended (nothing was notified).
    pub fn resume(&mut self) -> bool {
        if !self.suspended {
            return false;
        }
        self.suspended = false;
        tracing::debug!(members = self.members.len(), "Resuming game");
        for target in self.clock.iter_mut().chain(self.members.iter_mut()) {
            target.on_resume();
        }
        true
    }
}

impl std::fmt::Debug for PauseBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PauseBridge")
            .field("suspended", &self.suspended)
            .field("has_clock", &self.clock.is_some())
            .field("members", &self.members.len())
            .finish()
    }
}
