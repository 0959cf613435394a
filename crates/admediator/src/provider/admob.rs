//! Adapter for the banner/interstitial/rewarded SDK (AdMob).
//!
//! The SDK keeps one ad object per format, keyed by ad unit id at load time.
//! Initialization is synchronous, so `Ready` is emitted as soon as
//! `initialize` returns.

use super::{EventSender, ProviderAdapter, ProviderError, ProviderEvent, ProviderKind};
use crate::placement::PlacementId;
use crate::slot::AdSlotKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdFormat {
    Banner,
    Interstitial,
    RewardedVideo,
}

impl AdFormat {
    pub fn slot(&self) -> AdSlotKind {
        match self {
            Self::Banner => AdSlotKind::Banner,
            Self::Interstitial => AdSlotKind::Interstitial,
            Self::RewardedVideo => AdSlotKind::Rewarded,
        }
    }
}

impl From<AdSlotKind> for AdFormat {
    fn from(slot: AdSlotKind) -> Self {
        match slot {
            AdSlotKind::Banner => Self::Banner,
            AdSlotKind::Interstitial => Self::Interstitial,
            AdSlotKind::Rewarded => Self::RewardedVideo,
        }
    }
}

/// Listener callbacks raised by the SDK.
#[derive(Debug, Clone, PartialEq)]
pub enum AdMobCallback {
    AdLoaded(AdFormat),
    AdFailedToLoad { format: AdFormat, message: String },
    AdOpening(AdFormat),
    AdClosed(AdFormat),
    /// Only raised for rewarded video.
    Rewarded { reward_type: String, amount: f64 },
    AdLeftApplication(AdFormat),
}

/// The slice of the SDK the adapter drives.
pub trait AdMobSdk: Send {
    fn set_listener(&mut self, listener: AdMobListener);
    fn initialize(&mut self, app_id: &str);
    fn load(&mut self, format: AdFormat, unit_id: &str);
    fn is_loaded(&self, format: AdFormat) -> bool;
    fn show(&mut self, format: AdFormat);
    fn hide_banner(&mut self);
    fn destroy_banner(&mut self);
}

/// Handed to the SDK; turns vendor callbacks into canonical events.
#[derive(Debug, Clone)]
pub struct AdMobListener {
    events: EventSender,
}

impl AdMobListener {
    pub fn new(events: EventSender) -> Self {
        Self { events }
    }

    pub fn on_callback(&self, callback: AdMobCallback) {
        match translate(&callback) {
            Some(event) => self.events.emit(event),
            None => tracing::trace!(provider = "admob", ?callback, "Ignoring callback"),
        }
    }
}

pub fn translate(callback: &AdMobCallback) -> Option<ProviderEvent> {
    let event = match callback {
        AdMobCallback::AdLoaded(format) => ProviderEvent::Loaded {
            slot: format.slot(),
        },
        AdMobCallback::AdFailedToLoad { format, message } => ProviderEvent::FailedToLoad {
            slot: format.slot(),
            reason: message.clone(),
        },
        AdMobCallback::AdOpening(format) => ProviderEvent::Started {
            slot: format.slot(),
        },
        AdMobCallback::AdClosed(format) => ProviderEvent::Closed {
            slot: format.slot(),
        },
        AdMobCallback::Rewarded {
            reward_type,
            amount,
        } => {
            tracing::debug!(provider = "admob", %reward_type, amount, "Reward granted");
            ProviderEvent::Rewarded {
                slot: AdSlotKind::Rewarded,
            }
        }
        AdMobCallback::AdLeftApplication(_) => return None,
    };
    Some(event)
}

pub struct AdMobAdapter<S> {
    sdk: S,
    events: Option<EventSender>,
    initialized: bool,
}

impl<S: AdMobSdk> AdMobAdapter<S> {
    pub fn new(sdk: S) -> Self {
        Self {
            sdk,
            events: None,
            initialized: false,
        }
    }

    pub fn sdk(&self) -> &S {
        &self.sdk
    }

    fn ensure_initialized(&self) -> Result<(), ProviderError> {
        if self.initialized {
            Ok(())
        } else {
            Err(ProviderError::NotInitialized)
        }
    }
}

impl<S: AdMobSdk> ProviderAdapter for AdMobAdapter<S> {
    fn kind(&self) -> ProviderKind {
        ProviderKind::AdMob
    }

    fn supports(&self, _slot: AdSlotKind) -> bool {
        true
    }

    fn attach(&mut self, events: EventSender) {
        self.sdk.set_listener(AdMobListener::new(events.clone()));
        self.events = Some(events);
    }

    fn initialize(
        &mut self,
        app_id: &str,
        _placements: &[(AdSlotKind, PlacementId)],
    ) -> Result<(), ProviderError> {
        let events = self.events.as_ref().ok_or(ProviderError::NotAttached)?;
        if !self.initialized {
            tracing::info!(provider = "admob", app_id, "Initializing SDK");
            self.sdk.initialize(app_id);
            self.initialized = true;
        }
        events.emit(ProviderEvent::Ready);
        Ok(())
    }

    fn load(&mut self, slot: AdSlotKind, placement: &PlacementId) -> Result<(), ProviderError> {
        self.ensure_initialized()?;
        tracing::info!(provider = "admob", %slot, %placement, "Loading ad");
        self.sdk.load(slot.into(), placement.as_str());
        Ok(())
    }

    fn show(&mut self, slot: AdSlotKind, _placement: &PlacementId) -> Result<(), ProviderError> {
        self.ensure_initialized()?;
        let format = AdFormat::from(slot);
        if slot != AdSlotKind::Banner && !self.sdk.is_loaded(format) {
            return Err(ProviderError::Sdk(format!("{slot} not loaded")));
        }
        self.sdk.show(format);
        tracing::info!(provider = "admob", %slot, "Ad displayed");
        Ok(())
    }

    fn is_loaded(&self, slot: AdSlotKind, _placement: &PlacementId) -> bool {
        self.initialized && self.sdk.is_loaded(slot.into())
    }

    fn hide(&mut self, slot: AdSlotKind, _placement: &PlacementId) -> Result<(), ProviderError> {
        if slot != AdSlotKind::Banner {
            return Err(ProviderError::Unsupported(slot));
        }
        self.ensure_initialized()?;
        self.sdk.hide_banner();
        Ok(())
    }

    fn destroy(&mut self, slot: AdSlotKind, _placement: &PlacementId) -> Result<(), ProviderError> {
        if slot != AdSlotKind::Banner {
            return Err(ProviderError::Unsupported(slot));
        }
        self.ensure_initialized()?;
        self.sdk.destroy_banner();
        Ok(())
    }
}
