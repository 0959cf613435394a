//! Per-slot ad state tracking.
//!
//! Each `AdSlot` is a small state machine. It never talks to providers, the
//! pause bridge, or callbacks itself; every transition method reports what
//! happened and the mediator performs the side effects.

use serde::{Deserialize, Serialize};

use crate::placement::PlacementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdSlotKind {
    Banner,
    Interstitial,
    Rewarded,
}

impl AdSlotKind {
    pub const ALL: [AdSlotKind; 3] = [Self::Banner, Self::Interstitial, Self::Rewarded];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Banner => "banner",
            Self::Interstitial => "interstitial",
            Self::Rewarded => "rewarded",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Self::Banner => 0,
            Self::Interstitial => 1,
            Self::Rewarded => 2,
        }
    }

    /// Full-screen formats freeze the game while on screen; banners do not.
    pub fn pauses_game(&self) -> bool {
        !matches!(self, Self::Banner)
    }

    pub fn grants_reward(&self) -> bool {
        matches!(self, Self::Rewarded)
    }
}

impl std::fmt::Display for AdSlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdState {
    #[default]
    Unloaded,
    Loading,
    Loaded,
    Showing,
    Closed,
    Failed,
}

impl AdState {
    /// States from which `load()` delegates to the provider.
    pub fn can_load(&self) -> bool {
        matches!(self, Self::Unloaded | Self::Failed | Self::Closed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unloaded => "unloaded",
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Showing => "showing",
            Self::Closed => "closed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for AdState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a show ended, from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardOutcome {
    /// Watched to the end (or no inventory: the player is not penalized).
    FullView,
    /// Closed before the reward was granted.
    PartialView,
}

impl RewardOutcome {
    pub fn is_full_view(&self) -> bool {
        matches!(self, Self::FullView)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadDecision {
    /// Slot moved to Loading; the provider must be asked to load.
    Delegate,
    AlreadyLoading,
    AlreadyLoaded,
    /// On screen; the reload happens after close.
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowDecision {
    /// Slot moved to Showing; the provider must be asked to show.
    Delegate,
    /// Nothing to show. Carries the state the slot was in.
    NoInventory(AdState),
}

/// Result of a provider failure event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureEffect {
    /// Loading → Failed.
    LoadFailed,
    /// Failure while on screen; treated as a close with this outcome.
    ShowAborted(RewardOutcome),
    /// Stale event, nothing changed.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct AdSlot {
    kind: AdSlotKind,
    state: AdState,
    placement: Option<PlacementId>,
    rewarded: bool,
    /// Set by `reset` until the next `begin_load`; the provider object is
    /// gone, so reports still in flight for it are stale.
    released: bool,
}

impl AdSlot {
    pub fn new(kind: AdSlotKind) -> Self {
        Self {
            kind,
            state: AdState::Unloaded,
            placement: None,
            rewarded: false,
            released: false,
        }
    }

    pub fn with_placement(mut self, placement: PlacementId) -> Self {
        self.placement = Some(placement);
        self
    }

    pub fn kind(&self) -> AdSlotKind {
        self.kind
    }

    pub fn state(&self) -> AdState {
        self.state
    }

    pub fn placement(&self) -> Option<&PlacementId> {
        self.placement.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.state == AdState::Loaded
    }

    fn transition(&mut self, next: AdState) {
        tracing::debug!(
            target: "admediator::slot",
            slot = %self.kind,
            from = %self.state,
            to = %next,
            "Slot transition"
        );
        self.state = next;
    }

    pub fn begin_load(&mut self) -> LoadDecision {
        match self.state {
            state if state.can_load() => {
                self.released = false;
                self.transition(AdState::Loading);
                LoadDecision::Delegate
            }
            AdState::Loading => LoadDecision::AlreadyLoading,
            AdState::Loaded => LoadDecision::AlreadyLoaded,
            _ => LoadDecision::Busy,
        }
    }

    pub fn begin_show(&mut self) -> ShowDecision {
        if self.state != AdState::Loaded {
            return ShowDecision::NoInventory(self.state);
        }
        self.rewarded = false;
        self.transition(AdState::Showing);
        ShowDecision::Delegate
    }

    /// Returns `true` if the event changed the slot.
    ///
    /// Some providers cache inventory on their own, so a load report is also
    /// accepted for a slot that never asked (Unloaded) or gave up (Failed).
    /// A slot released by `reset` only accepts one after a new `begin_load`.
    pub fn on_loaded(&mut self) -> bool {
        match self.state {
            AdState::Unloaded if self.released => false,
            AdState::Loading | AdState::Unloaded | AdState::Failed => {
                self.transition(AdState::Loaded);
                true
            }
            _ => false,
        }
    }

    pub fn on_failed(&mut self) -> FailureEffect {
        match self.state {
            AdState::Loading => {
                self.transition(AdState::Failed);
                FailureEffect::LoadFailed
            }
            AdState::Showing => match self.on_closed() {
                Some(outcome) => FailureEffect::ShowAborted(outcome),
                None => FailureEffect::Ignored,
            },
            _ => FailureEffect::Ignored,
        }
    }

    /// No inventory. Only an outstanding load is affected: Loading → Failed.
    pub fn on_unavailable(&mut self) -> bool {
        if self.state != AdState::Loading {
            return false;
        }
        self.transition(AdState::Failed);
        true
    }

    /// Provider confirmed the ad is on screen.
    pub fn on_started(&mut self) -> bool {
        self.state == AdState::Showing
    }

    pub fn on_rewarded(&mut self) -> bool {
        if self.state != AdState::Showing {
            return false;
        }
        self.rewarded = true;
        true
    }

    /// Showing → Closed. The outcome is decided by whether a reward event was
    /// seen during this show.
    pub fn on_closed(&mut self) -> Option<RewardOutcome> {
        if self.state != AdState::Showing {
            return None;
        }
        let outcome = if self.rewarded {
            RewardOutcome::FullView
        } else {
            RewardOutcome::PartialView
        };
        self.rewarded = false;
        self.transition(AdState::Closed);
        Some(outcome)
    }

    /// Provider refused a show we already committed to. Showing → Failed.
    pub fn abort_show(&mut self) -> bool {
        if self.state != AdState::Showing {
            return false;
        }
        self.rewarded = false;
        self.transition(AdState::Failed);
        true
    }

    /// Banner hide: Showing → Loaded.
    pub fn hide(&mut self) -> bool {
        if self.state != AdState::Showing {
            return false;
        }
        self.transition(AdState::Loaded);
        true
    }

    /// Back to Unloaded from any state. Returns the previous state.
    pub fn reset(&mut self) -> AdState {
        let previous = self.state;
        self.rewarded = false;
        self.released = true;
        if previous != AdState::Unloaded {
            self.transition(AdState::Unloaded);
        }
        previous
    }
}
