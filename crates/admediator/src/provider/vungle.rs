//! Adapter for the placement-based video SDK (Vungle).
//!
//! Every placement must be declared at init. The SDK reports availability
//! through playability changes rather than load results, and folds the
//! reward into the finish callback (`completed_view`).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{EventSender, ProviderAdapter, ProviderError, ProviderEvent, ProviderKind};
use crate::placement::PlacementId;
use crate::slot::AdSlotKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VungleCallback {
    Initialized,
    AdPlayable { placement: String, playable: bool },
    AdStarted { placement: String },
    AdFinished { placement: String, completed_view: bool },
    Log(String),
}

pub trait VungleSdk: Send {
    fn set_listener(&mut self, listener: VungleListener);
    fn init(&mut self, app_id: &str, placements: &[String]);
    fn load_ad(&mut self, placement: &str);
    fn play_ad(&mut self, placement: &str);
    fn is_advert_available(&self, placement: &str) -> bool;
}

type PlacementSlots = Arc<Mutex<HashMap<String, AdSlotKind>>>;

/// Handed to the SDK; maps placement-keyed callbacks back to slots.
#[derive(Debug, Clone)]
pub struct VungleListener {
    events: EventSender,
    placements: PlacementSlots,
}

impl VungleListener {
    pub fn on_callback(&self, callback: VungleCallback) {
        let events = {
            let Ok(placements) = self.placements.lock() else {
                tracing::error!(provider = "vungle", "Placement table poisoned, dropping callback");
                return;
            };
            translate(&callback, |placement| placements.get(placement).copied())
        };
        for event in events {
            self.events.emit(event);
        }
    }
}

/// A single vendor callback can expand to several canonical events.
pub fn translate(
    callback: &VungleCallback,
    slot_of: impl Fn(&str) -> Option<AdSlotKind>,
) -> Vec<ProviderEvent> {
    let lookup = |placement: &str| {
        let slot = slot_of(placement);
        if slot.is_none() {
            tracing::warn!(provider = "vungle", placement, "Callback for unknown placement");
        }
        slot
    };

    match callback {
        VungleCallback::Initialized => vec![ProviderEvent::Ready],
        VungleCallback::AdPlayable {
            placement,
            playable: true,
        } => lookup(placement)
            .map(|slot| vec![ProviderEvent::Loaded { slot }])
            .unwrap_or_default(),
        VungleCallback::AdPlayable {
            placement,
            playable: false,
        } => {
            tracing::debug!(provider = "vungle", placement = %placement, "Placement not playable");
            lookup(placement)
                .map(|slot| vec![ProviderEvent::Unavailable { slot }])
                .unwrap_or_default()
        }
        VungleCallback::AdStarted { placement } => lookup(placement)
            .map(|slot| vec![ProviderEvent::Started { slot }])
            .unwrap_or_default(),
        VungleCallback::AdFinished {
            placement,
            completed_view,
        } => {
            let Some(slot) = lookup(placement) else {
                return Vec::new();
            };
            let mut events = Vec::with_capacity(2);
            if *completed_view && slot.grants_reward() {
                events.push(ProviderEvent::Rewarded { slot });
            }
            events.push(ProviderEvent::Closed { slot });
            events
        }
        VungleCallback::Log(message) => {
            tracing::debug!(provider = "vungle", "{}", message);
            Vec::new()
        }
    }
}

pub struct VungleAdapter<S> {
    sdk: S,
    events: Option<EventSender>,
    placements: PlacementSlots,
    init_requested: bool,
}

impl<S: VungleSdk> VungleAdapter<S> {
    pub fn new(sdk: S) -> Self {
        Self {
            sdk,
            events: None,
            placements: Arc::default(),
            init_requested: false,
        }
    }

    pub fn sdk(&self) -> &S {
        &self.sdk
    }

    fn remember(&self, slot: AdSlotKind, placement: &PlacementId) {
        if let Ok(mut placements) = self.placements.lock() {
            placements.insert(placement.to_string(), slot);
        }
    }

    fn check_supported(&self, slot: AdSlotKind) -> Result<(), ProviderError> {
        if self.supports(slot) {
            Ok(())
        } else {
            Err(ProviderError::Unsupported(slot))
        }
    }
}

impl<S: VungleSdk> ProviderAdapter for VungleAdapter<S> {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Vungle
    }

    fn supports(&self, slot: AdSlotKind) -> bool {
        slot != AdSlotKind::Banner
    }

    fn attach(&mut self, events: EventSender) {
        self.sdk.set_listener(VungleListener {
            events: events.clone(),
            placements: Arc::clone(&self.placements),
        });
        self.events = Some(events);
    }

    fn initialize(
        &mut self,
        app_id: &str,
        placements: &[(AdSlotKind, PlacementId)],
    ) -> Result<(), ProviderError> {
        if self.events.is_none() {
            return Err(ProviderError::NotAttached);
        }
        if self.init_requested {
            return Ok(());
        }
        for (slot, placement) in placements {
            self.check_supported(*slot)?;
            self.remember(*slot, placement);
        }
        let ids: Vec<String> = placements.iter().map(|(_, p)| p.to_string()).collect();
        tracing::info!(provider = "vungle", app_id, placements = ?ids, "Initializing SDK");
        self.sdk.init(app_id, &ids);
        self.init_requested = true;
        Ok(())
    }

    fn load(&mut self, slot: AdSlotKind, placement: &PlacementId) -> Result<(), ProviderError> {
        self.check_supported(slot)?;
        if !self.init_requested {
            return Err(ProviderError::NotInitialized);
        }
        self.remember(slot, placement);
        tracing::info!(provider = "vungle", %slot, %placement, "Loading ad");
        self.sdk.load_ad(placement.as_str());
        Ok(())
    }

    fn show(&mut self, slot: AdSlotKind, placement: &PlacementId) -> Result<(), ProviderError> {
        self.check_supported(slot)?;
        if !self.sdk.is_advert_available(placement.as_str()) {
            return Err(ProviderError::Sdk(format!(
                "placement {placement} is not playable"
            )));
        }
        self.remember(slot, placement);
        self.sdk.play_ad(placement.as_str());
        tracing::info!(provider = "vungle", %slot, %placement, "Ad displayed");
        Ok(())
    }

    fn is_loaded(&self, slot: AdSlotKind, placement: &PlacementId) -> bool {
        self.supports(slot) && self.sdk.is_advert_available(placement.as_str())
    }
}
