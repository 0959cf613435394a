//! Status snapshot types for the mediator.

use serde::{Deserialize, Serialize};

use crate::config::BackendMode;
use crate::placement::{BuildProfile, PlacementId};
use crate::provider::ProviderKind;
use crate::slot::{AdSlotKind, AdState};

/// Version from Cargo.toml
pub const ADMEDIATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialization progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InitPhase {
    /// `init()` not called yet
    #[default]
    Idle,
    /// Waiting for providers to report ready
    Starting,
    Ready,
}

impl InitPhase {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotStatus {
    pub slot: AdSlotKind,
    pub state: AdState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<PlacementId>,
    /// What the provider SDK itself reports, independent of `state`.
    pub sdk_loaded: bool,
    pub pending_load: bool,
    pub pending_show: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub provider: ProviderKind,
    /// Serves at least one slot in the current mode.
    pub active: bool,
    pub ready: bool,
}

/// Point-in-time view of the mediator, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediatorStatus {
    pub version: String,
    pub mode: BackendMode,
    pub profile: BuildProfile,
    pub init: InitPhase,
    /// When every provider reported ready (RFC 3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_at: Option<String>,
    pub paused: bool,
    pub banner_requested: bool,
    pub slots: Vec<SlotStatus>,
    pub providers: Vec<ProviderStatus>,
}

impl MediatorStatus {
    pub fn slot(&self, slot: AdSlotKind) -> Option<&SlotStatus> {
        self.slots.iter().find(|s| s.slot == slot)
    }

    pub fn is_ready(&self) -> bool {
        self.init.is_ready()
    }
}
