//! Mediator configuration. Fixed once the mediator is built.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{MediationError, Result};
use crate::placement::{BuildProfile, PlacementId, ProviderPlacements};
use crate::provider::ProviderKind;
use crate::slot::AdSlotKind;

pub const ENV_OFFLINE: &str = "ADMEDIATOR_OFFLINE";
pub const ENV_PROFILE: &str = "ADMEDIATOR_PROFILE";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    #[default]
    Live,
    /// Every slot is served by the fallback presenter; live providers are
    /// never touched.
    Offline,
}

impl BackendMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Offline => "offline",
        }
    }
}

/// Which provider serves each slot in live mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRoutes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<ProviderKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interstitial: Option<ProviderKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewarded: Option<ProviderKind>,
}

impl SlotRoutes {
    /// Banner and interstitial from AdMob, rewarded video from Vungle.
    pub fn standard() -> Self {
        Self {
            banner: Some(ProviderKind::AdMob),
            interstitial: Some(ProviderKind::AdMob),
            rewarded: Some(ProviderKind::Vungle),
        }
    }

    pub fn get(&self, slot: AdSlotKind) -> Option<ProviderKind> {
        match slot {
            AdSlotKind::Banner => self.banner,
            AdSlotKind::Interstitial => self.interstitial,
            AdSlotKind::Rewarded => self.rewarded,
        }
    }

    pub fn set(&mut self, slot: AdSlotKind, provider: Option<ProviderKind>) {
        match slot {
            AdSlotKind::Banner => self.banner = provider,
            AdSlotKind::Interstitial => self.interstitial = provider,
            AdSlotKind::Rewarded => self.rewarded = provider,
        }
    }
}

fn default_preload() -> Vec<AdSlotKind> {
    vec![AdSlotKind::Banner]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediatorConfig {
    #[serde(default)]
    pub mode: BackendMode,
    #[serde(default = "BuildProfile::current")]
    pub profile: BuildProfile,
    #[serde(default)]
    pub routes: SlotRoutes,
    #[serde(default)]
    pub providers: BTreeMap<ProviderKind, ProviderPlacements>,
    /// Slots loaded as soon as every provider is ready.
    #[serde(default = "default_preload")]
    pub preload: Vec<AdSlotKind>,
    /// Warn when a pending callback is replaced before it fired.
    #[serde(default)]
    pub warn_on_superseded_callback: bool,
}

impl Default for MediatorConfig {
    fn default() -> Self {
        Self {
            mode: BackendMode::Live,
            profile: BuildProfile::current(),
            routes: SlotRoutes::default(),
            providers: BTreeMap::new(),
            preload: default_preload(),
            warn_on_superseded_callback: false,
        }
    }
}

impl MediatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offline() -> Self {
        Self::default().with_mode(BackendMode::Offline)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_mode(mut self, mode: BackendMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_profile(mut self, profile: BuildProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_route(mut self, slot: AdSlotKind, provider: ProviderKind) -> Self {
        self.routes.set(slot, Some(provider));
        self
    }

    pub fn with_routes(mut self, routes: SlotRoutes) -> Self {
        self.routes = routes;
        self
    }

    pub fn with_provider(mut self, provider: ProviderKind, placements: ProviderPlacements) -> Self {
        self.providers.insert(provider, placements);
        self
    }

    pub fn with_preload(mut self, slots: impl IntoIterator<Item = AdSlotKind>) -> Self {
        self.preload = slots.into_iter().collect();
        self
    }

    pub fn with_superseded_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_superseded_callback = enabled;
        self
    }

    /// Apply `ADMEDIATOR_OFFLINE` and `ADMEDIATOR_PROFILE` from the process
    /// environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = lookup(ENV_OFFLINE) {
            match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.mode = BackendMode::Offline,
                "0" | "false" | "no" | "" => self.mode = BackendMode::Live,
                other => tracing::warn!(key = ENV_OFFLINE, value = other, "Ignoring unrecognized value"),
            }
        }
        if let Some(value) = lookup(ENV_PROFILE) {
            match BuildProfile::parse(&value) {
                Some(profile) => self.profile = profile,
                None => tracing::warn!(key = ENV_PROFILE, value = %value, "Ignoring unrecognized value"),
            }
        }
        self
    }

    pub fn is_offline(&self) -> bool {
        self.mode == BackendMode::Offline
    }

    /// Effective provider for a slot: always the fallback when offline.
    pub fn route(&self, slot: AdSlotKind) -> Option<ProviderKind> {
        if self.is_offline() {
            Some(ProviderKind::Fallback)
        } else {
            self.routes.get(slot)
        }
    }

    pub fn app_id(&self, provider: ProviderKind) -> &str {
        self.providers
            .get(&provider)
            .map(|p| p.app_id.as_str())
            .unwrap_or_default()
    }

    /// Resolve the placement for `slot` on `provider` under the active
    /// profile. The fallback provider accepts a missing table.
    pub fn placement(&self, provider: ProviderKind, slot: AdSlotKind) -> Result<PlacementId> {
        match (provider, self.providers.get(&provider)) {
            (ProviderKind::Fallback, None) => Ok(PlacementId::mock(slot)),
            (ProviderKind::Fallback, Some(table)) => Ok(table
                .resolve(provider, slot, self.profile)
                .unwrap_or_else(|_| PlacementId::mock(slot))),
            (_, Some(table)) => table.resolve(provider, slot, self.profile),
            (_, None) => Err(MediationError::MisconfiguredPlacement { provider, slot }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn empty_json_uses_defaults() {
        let config = MediatorConfig::from_json_str("{}").unwrap();
        assert_eq!(config.mode, BackendMode::Live);
        assert_eq!(config.preload, vec![AdSlotKind::Banner]);
        assert_eq!(config.routes, SlotRoutes::default());
        assert!(!config.warn_on_superseded_callback);
    }

    #[test]
    fn parses_full_config() {
        let config = MediatorConfig::from_json_str(
            r#"{
                "mode": "live",
                "profile": "release",
                "routes": {"banner": "admob", "rewarded": "vungle"},
                "providers": {
                    "admob": {"app_id": "ca-app-pub-1~2", "production": {"banner": "ca-app-pub-1/3"}},
                    "vungle": {"app_id": "v-app", "production": {"rewarded": "DEFAULT04628"}}
                },
                "preload": ["banner", "rewarded"]
            }"#,
        )
        .unwrap();

        assert_eq!(config.route(AdSlotKind::Banner), Some(ProviderKind::AdMob));
        assert_eq!(config.route(AdSlotKind::Interstitial), None);
        assert_eq!(config.app_id(ProviderKind::Vungle), "v-app");
        assert_eq!(
            config
                .placement(ProviderKind::Vungle, AdSlotKind::Rewarded)
                .unwrap()
                .as_str(),
            "DEFAULT04628"
        );
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        let err = MediatorConfig::from_json_str(r#"{"mode": "sideways"}"#).unwrap_err();
        assert!(matches!(err, MediationError::Config(_)));
    }

    #[test]
    fn offline_routes_everything_to_fallback() {
        let config = MediatorConfig::offline().with_routes(SlotRoutes::standard());
        for slot in AdSlotKind::ALL {
            assert_eq!(config.route(slot), Some(ProviderKind::Fallback));
            assert_eq!(
                config.placement(ProviderKind::Fallback, slot).unwrap(),
                PlacementId::mock(slot)
            );
        }
    }

    #[test]
    fn missing_provider_table_is_misconfigured() {
        let config = MediatorConfig::new().with_route(AdSlotKind::Rewarded, ProviderKind::Vungle);
        assert!(matches!(
            config.placement(ProviderKind::Vungle, AdSlotKind::Rewarded),
            Err(MediationError::MisconfiguredPlacement {
                provider: ProviderKind::Vungle,
                slot: AdSlotKind::Rewarded
            })
        ));
    }

    #[test]
    fn env_overrides() {
        let config = MediatorConfig::new()
            .with_profile(BuildProfile::Debug)
            .with_overrides_from(env(&[(ENV_OFFLINE, "true"), (ENV_PROFILE, "release")]));
        assert!(config.is_offline());
        assert_eq!(config.profile, BuildProfile::Release);

        let config = config.with_overrides_from(env(&[(ENV_OFFLINE, "0"), (ENV_PROFILE, "nope")]));
        assert!(!config.is_offline());
        assert_eq!(config.profile, BuildProfile::Release);
    }

    #[test]
    fn serialized_shape() {
        let config = MediatorConfig::new()
            .with_profile(BuildProfile::Release)
            .with_route(AdSlotKind::Rewarded, ProviderKind::Vungle)
            .with_provider(
                ProviderKind::Vungle,
                ProviderPlacements::new("v-app").with_production(AdSlotKind::Rewarded, "DEFAULT04628"),
            )
            .with_preload([AdSlotKind::Rewarded]);

        insta::assert_json_snapshot!(config, @r#"
        {
          "mode": "live",
          "profile": "release",
          "routes": {
            "rewarded": "vungle"
          },
          "providers": {
            "vungle": {
              "app_id": "v-app",
              "production": {
                "rewarded": "DEFAULT04628"
              },
              "test": {}
            }
          },
          "preload": [
            "rewarded"
          ],
          "warn_on_superseded_callback": false
        }
        "#);
    }
}
