//! Offline stand-in for a real ad: a binary "watched it / skipped it" choice.
//!
//! The presenter only renders the choice. Whatever it renders must end by
//! consuming the [`MockResolution`], which pushes the same canonical events a
//! live provider would (`Rewarded` then `Closed`) onto the fallback adapter's
//! channel.

use uuid::Uuid;

use crate::placement::PlacementId;
use crate::provider::{EventSender, ProviderEvent};
use crate::slot::{AdSlotKind, RewardOutcome};

/// What the presenter is asked to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockAdRequest {
    pub id: Uuid,
    pub slot: AdSlotKind,
    pub placement: PlacementId,
}

impl MockAdRequest {
    pub fn new(slot: AdSlotKind, placement: PlacementId) -> Self {
        Self {
            id: Uuid::new_v4(),
            slot,
            placement,
        }
    }

    /// Button labels in display order.
    pub fn choices(&self) -> [&'static str; 2] {
        ["Complete View", "Partial View"]
    }
}

/// Single-use handle that finishes one mock presentation.
///
/// Dropping it unresolved counts as a full view so the player is never
/// penalized for a presenter that went away.
#[must_use = "an unresolved presentation resolves as a full view on drop"]
pub struct MockResolution {
    id: Uuid,
    slot: AdSlotKind,
    events: Option<EventSender>,
}

impl MockResolution {
    pub(crate) fn new(request: &MockAdRequest, events: EventSender) -> Self {
        Self {
            id: request.id,
            slot: request.slot,
            events: Some(events),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn slot(&self) -> AdSlotKind {
        self.slot
    }

    pub fn full_view(mut self) {
        self.resolve(RewardOutcome::FullView);
    }

    pub fn partial_view(mut self) {
        self.resolve(RewardOutcome::PartialView);
    }

    pub fn resolve_with(mut self, outcome: RewardOutcome) {
        self.resolve(outcome);
    }

    fn resolve(&mut self, outcome: RewardOutcome) {
        let Some(events) = self.events.take() else {
            return;
        };
        tracing::info!(
            target: "admediator::show",
            request = %self.id,
            slot = %self.slot,
            ?outcome,
            "Mock presentation resolved"
        );
        if outcome.is_full_view() && self.slot.grants_reward() {
            events.emit(ProviderEvent::Rewarded { slot: self.slot });
        }
        events.emit(ProviderEvent::Closed { slot: self.slot });
    }
}

impl Drop for MockResolution {
    fn drop(&mut self) {
        if self.events.is_some() {
            tracing::warn!(
                request = %self.id,
                slot = %self.slot,
                "Mock presentation dropped without a choice, resolving as full view"
            );
            self.resolve(RewardOutcome::FullView);
        }
    }
}

impl std::fmt::Debug for MockResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockResolution")
            .field("id", &self.id)
            .field("slot", &self.slot)
            .field("resolved", &self.events.is_none())
            .finish()
    }
}

/// Renders the mock choice. May resolve inline or hold the resolution and
/// finish it later from anywhere.
pub trait MockPresenter: Send {
    fn present(&mut self, request: MockAdRequest, resolution: MockResolution);
}

impl<P: MockPresenter + ?Sized> MockPresenter for Box<P> {
    fn present(&mut self, request: MockAdRequest, resolution: MockResolution) {
        (**self).present(request, resolution)
    }
}

/// Headless presenter that always picks the same answer.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedPresenter {
    choice: RewardOutcome,
}

impl ScriptedPresenter {
    pub fn new(choice: RewardOutcome) -> Self {
        Self { choice }
    }

    pub fn full_view() -> Self {
        Self::new(RewardOutcome::FullView)
    }

    pub fn partial_view() -> Self {
        Self::new(RewardOutcome::PartialView)
    }

    pub fn choice(&self) -> RewardOutcome {
        self.choice
    }
}

impl Default for ScriptedPresenter {
    fn default() -> Self {
        Self::full_view()
    }
}

impl MockPresenter for ScriptedPresenter {
    fn present(&mut self, request: MockAdRequest, resolution: MockResolution) {
        tracing::debug!(request = %request.id, slot = %request.slot, choice = ?self.choice, "Scripted presentation");
        resolution.resolve_with(self.choice);
    }
}
