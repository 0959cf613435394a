//! Offline backend: every slot is always loaded and every show is answered by
//! a [`MockPresenter`].

use super::{EventSender, ProviderAdapter, ProviderError, ProviderEvent, ProviderKind};
use crate::mock::{MockAdRequest, MockPresenter, MockResolution};
use crate::placement::PlacementId;
use crate::slot::AdSlotKind;

pub struct FallbackAdapter<P> {
    presenter: P,
    events: Option<EventSender>,
}

impl<P: MockPresenter> FallbackAdapter<P> {
    pub fn new(presenter: P) -> Self {
        Self {
            presenter,
            events: None,
        }
    }

    /// Placement used when no id is configured for a fallback slot.
    pub fn default_placement(slot: AdSlotKind) -> PlacementId {
        PlacementId::mock(slot)
    }

    fn sender(&self) -> Result<&EventSender, ProviderError> {
        self.events.as_ref().ok_or(ProviderError::NotAttached)
    }
}

impl<P: MockPresenter> ProviderAdapter for FallbackAdapter<P> {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Fallback
    }

    fn supports(&self, _slot: AdSlotKind) -> bool {
        true
    }

    fn attach(&mut self, events: EventSender) {
        self.events = Some(events);
    }

    fn initialize(
        &mut self,
        _app_id: &str,
        _placements: &[(AdSlotKind, PlacementId)],
    ) -> Result<(), ProviderError> {
        self.sender()?.emit(ProviderEvent::Ready);
        Ok(())
    }

    fn load(&mut self, _slot: AdSlotKind, _placement: &PlacementId) -> Result<(), ProviderError> {
        Ok(())
    }

    fn show(&mut self, slot: AdSlotKind, placement: &PlacementId) -> Result<(), ProviderError> {
        let events = self.sender()?.clone();
        if slot == AdSlotKind::Banner {
            tracing::debug!(%placement, "Mock banner shown");
            return Ok(());
        }
        let request = MockAdRequest::new(slot, placement.clone());
        let resolution = MockResolution::new(&request, events.clone());
        events.emit(ProviderEvent::Started { slot });
        self.presenter.present(request, resolution);
        Ok(())
    }

    fn is_loaded(&self, _slot: AdSlotKind, _placement: &PlacementId) -> bool {
        true
    }

    fn always_ready(&self) -> bool {
        true
    }
}
