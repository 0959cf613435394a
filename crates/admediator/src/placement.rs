//! Placement ids and the per-provider lookup tables that resolve them.

use serde::{Deserialize, Serialize};

use crate::error::{MediationError, Result};
use crate::provider::ProviderKind;
use crate::slot::AdSlotKind;

/// Provider-specific ad unit identifier. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlacementId(String);

impl PlacementId {
    /// Returns `None` for an empty or whitespace-only id.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    /// Stand-in id for slots served by the offline backend.
    pub(crate) fn mock(slot: AdSlotKind) -> Self {
        Self(format!("mock-{slot}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlacementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Selects production or test ad units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildProfile {
    #[default]
    Debug,
    Release,
}

impl BuildProfile {
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "dev" | "test" => Some(Self::Debug),
            "release" | "production" | "prod" => Some(Self::Release),
            _ => None,
        }
    }
}

/// One optional id per slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotPlacements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interstitial: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewarded: Option<String>,
}

impl SlotPlacements {
    pub fn get(&self, slot: AdSlotKind) -> Option<&str> {
        match slot {
            AdSlotKind::Banner => self.banner.as_deref(),
            AdSlotKind::Interstitial => self.interstitial.as_deref(),
            AdSlotKind::Rewarded => self.rewarded.as_deref(),
        }
    }

    pub fn set(&mut self, slot: AdSlotKind, id: impl Into<String>) {
        let id = Some(id.into());
        match slot {
            AdSlotKind::Banner => self.banner = id,
            AdSlotKind::Interstitial => self.interstitial = id,
            AdSlotKind::Rewarded => self.rewarded = id,
        }
    }
}

/// App id plus production and test ad units for one provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderPlacements {
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub production: SlotPlacements,
    #[serde(default)]
    pub test: SlotPlacements,
}

impl ProviderPlacements {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            ..Self::default()
        }
    }

    /// Google's public sample ad units. Safe to load in any debug build.
    pub fn admob_test_units(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            production: SlotPlacements::default(),
            test: SlotPlacements {
                banner: Some("ca-app-pub-3940256099942544/6300978111".to_string()),
                interstitial: Some("ca-app-pub-3940256099942544/1033173712".to_string()),
                rewarded: Some("ca-app-pub-3940256099942544/5224354917".to_string()),
            },
        }
    }

    pub fn with_production(mut self, slot: AdSlotKind, id: impl Into<String>) -> Self {
        self.production.set(slot, id);
        self
    }

    pub fn with_test(mut self, slot: AdSlotKind, id: impl Into<String>) -> Self {
        self.test.set(slot, id);
        self
    }

    /// Debug builds prefer the test unit and fall back to production; release
    /// builds only ever use production units.
    pub fn resolve(
        &self,
        provider: ProviderKind,
        slot: AdSlotKind,
        profile: BuildProfile,
    ) -> Result<PlacementId> {
        let candidate = match profile {
            BuildProfile::Debug => self
                .test
                .get(slot)
                .filter(|id| !id.trim().is_empty())
                .or_else(|| self.production.get(slot)),
            BuildProfile::Release => self.production.get(slot),
        };

        candidate
            .and_then(PlacementId::new)
            .ok_or(MediationError::MisconfiguredPlacement { provider, slot })
    }
}
