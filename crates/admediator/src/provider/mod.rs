//! Provider adapters: the seam between the mediator and vendor ad SDKs.
//!
//! Each adapter owns one vendor SDK handle and one [`EventSender`]. Vendor
//! callbacks are translated into [`ProviderEvent`]s and pushed onto that
//! sender; the mediator is the only consumer of the matching receiver.

pub mod admob;
pub mod fallback;
pub mod vungle;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

pub use crate::error::ProviderError;
use crate::placement::PlacementId;
use crate::slot::AdSlotKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Banner, interstitial and rewarded formats keyed by ad unit.
    AdMob,
    /// Placement-based rewarded and interstitial video.
    Vungle,
    /// Offline stand-in backed by a mock presenter.
    Fallback,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdMob => "admob",
            Self::Vungle => "vungle",
            Self::Fallback => "fallback",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admob" => Some(Self::AdMob),
            "vungle" => Some(Self::Vungle),
            "fallback" | "mock" => Some(Self::Fallback),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical provider events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// SDK finished initializing.
    Ready,
    Loaded { slot: AdSlotKind },
    FailedToLoad { slot: AdSlotKind, reason: String },
    /// No inventory for the slot. Fails an outstanding load and is
    /// informational in every other state.
    Unavailable { slot: AdSlotKind },
    /// Ad is on screen.
    Started { slot: AdSlotKind },
    /// Reward granted; always precedes `Closed` for the same show.
    Rewarded { slot: AdSlotKind },
    Closed { slot: AdSlotKind },
}

impl ProviderEvent {
    pub fn slot(&self) -> Option<AdSlotKind> {
        match self {
            Self::Ready => None,
            Self::Loaded { slot }
            | Self::FailedToLoad { slot, .. }
            | Self::Unavailable { slot }
            | Self::Started { slot }
            | Self::Rewarded { slot }
            | Self::Closed { slot } => Some(*slot),
        }
    }
}

/// Producer half of an adapter's event channel.
#[derive(Debug, Clone)]
pub struct EventSender {
    provider: ProviderKind,
    tx: mpsc::UnboundedSender<ProviderEvent>,
}

impl EventSender {
    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    /// Fire-and-forget. Events sent after the mediator is gone are dropped.
    pub fn emit(&self, event: ProviderEvent) {
        tracing::trace!(provider = %self.provider, ?event, "Provider event");
        if self.tx.send(event).is_err() {
            tracing::debug!(provider = %self.provider, "Event receiver dropped, discarding event");
        }
    }
}

pub type EventReceiver = mpsc::UnboundedReceiver<ProviderEvent>;

/// One channel per adapter: one producer (the adapter), one consumer (the mediator).
pub fn event_channel(provider: ProviderKind) -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { provider, tx }, rx)
}

/// Capability interface every ad backend implements.
///
/// All calls return immediately. Outcomes arrive later as events on the
/// sender passed to [`attach`](ProviderAdapter::attach), on any future tick.
pub trait ProviderAdapter: Send {
    fn kind(&self) -> ProviderKind;

    fn supports(&self, slot: AdSlotKind) -> bool;

    /// Subscribe the mediator to this adapter's events. Called once, before
    /// [`initialize`](ProviderAdapter::initialize).
    fn attach(&mut self, events: EventSender);

    /// Start the SDK. `Ready` must eventually be emitted unless this errors.
    fn initialize(
        &mut self,
        app_id: &str,
        placements: &[(AdSlotKind, PlacementId)],
    ) -> Result<(), ProviderError>;

    fn load(&mut self, slot: AdSlotKind, placement: &PlacementId) -> Result<(), ProviderError>;

    fn show(&mut self, slot: AdSlotKind, placement: &PlacementId) -> Result<(), ProviderError>;

    /// The SDK's own view of its inventory. Reported in status snapshots;
    /// slot state stays authoritative for load and show decisions.
    fn is_loaded(&self, slot: AdSlotKind, placement: &PlacementId) -> bool;

    /// Banner only.
    fn hide(&mut self, _slot: AdSlotKind, _placement: &PlacementId) -> Result<(), ProviderError> {
        Ok(())
    }

    /// Banner only. Releases the ad object; a later load starts from scratch.
    fn destroy(&mut self, _slot: AdSlotKind, _placement: &PlacementId) -> Result<(), ProviderError> {
        Ok(())
    }

    /// Backends with no network dependency report every slot as loaded and
    /// need no load round-trip.
    fn always_ready(&self) -> bool {
        false
    }
}

impl<P: ProviderAdapter + ?Sized> ProviderAdapter for Box<P> {
    fn kind(&self) -> ProviderKind {
        (**self).kind()
    }

    fn supports(&self, slot: AdSlotKind) -> bool {
        (**self).supports(slot)
    }

    fn attach(&mut self, events: EventSender) {
        (**self).attach(events)
    }

    fn initialize(
        &mut self,
        app_id: &str,
        placements: &[(AdSlotKind, PlacementId)],
    ) -> Result<(), ProviderError> {
        (**self).initialize(app_id, placements)
    }

    fn load(&mut self, slot: AdSlotKind, placement: &PlacementId) -> Result<(), ProviderError> {
        (**self).load(slot, placement)
    }

    fn show(&mut self, slot: AdSlotKind, placement: &PlacementId) -> Result<(), ProviderError> {
        (**self).show(slot, placement)
    }

    fn is_loaded(&self, slot: AdSlotKind, placement: &PlacementId) -> bool {
        (**self).is_loaded(slot, placement)
    }

    fn hide(&mut self, slot: AdSlotKind, placement: &PlacementId) -> Result<(), ProviderError> {
        (**self).hide(slot, placement)
    }

    fn destroy(&mut self, slot: AdSlotKind, placement: &PlacementId) -> Result<(), ProviderError> {
        (**self).destroy(slot, placement)
    }

    fn always_ready(&self) -> bool {
        (**self).always_ready()
    }
}
