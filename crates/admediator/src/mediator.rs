//! AdMediator: the facade game code calls.
//!
//! Owns one [`AdSlot`] per kind, the registered provider adapters, the
//! callback registry and the pause bridge. Routing from slot to provider is
//! fixed at build time. Provider outcomes arrive on per-adapter channels and
//! are applied by [`AdMediator::process_events`] (or by the async service,
//! which takes the receivers and feeds [`AdMediator::handle_event`]).

use uuid::Uuid;

use crate::callbacks::{CallbackRegistry, ReadyCallback, ShowCallback};
use crate::config::MediatorConfig;
use crate::error::{MediationError, ProviderError, Result};
use crate::mock::MockPresenter;
use crate::pause::PauseBridge;
use crate::placement::PlacementId;
use crate::provider::fallback::FallbackAdapter;
use crate::provider::{EventReceiver, ProviderAdapter, ProviderEvent, ProviderKind, event_channel};
use crate::slot::{AdSlot, AdSlotKind, AdState, FailureEffect, LoadDecision, RewardOutcome, ShowDecision};
use crate::status::{ADMEDIATOR_VERSION, InitPhase, MediatorStatus, ProviderStatus, SlotStatus};

struct ProviderEntry {
    adapter: Box<dyn ProviderAdapter>,
    /// Serves at least one slot in the configured mode.
    active: bool,
    ready: bool,
}

impl ProviderEntry {
    fn kind(&self) -> ProviderKind {
        self.adapter.kind()
    }
}

pub struct AdMediatorBuilder {
    config: MediatorConfig,
    providers: Vec<Box<dyn ProviderAdapter>>,
    presenter: Option<Box<dyn MockPresenter>>,
    pause: PauseBridge,
}

impl AdMediatorBuilder {
    /// Register a provider adapter. One adapter per provider kind.
    pub fn provider(mut self, adapter: impl ProviderAdapter + 'static) -> Result<Self> {
        let kind = adapter.kind();
        if self.providers.iter().any(|p| p.kind() == kind) {
            return Err(MediationError::DuplicateRegistration(format!(
                "{kind} provider"
            )));
        }
        self.providers.push(Box::new(adapter));
        Ok(self)
    }

    /// Presenter for the offline fallback backend.
    pub fn presenter(mut self, presenter: impl MockPresenter + 'static) -> Self {
        self.presenter = Some(Box::new(presenter));
        self
    }

    pub fn pause_bridge(mut self, pause: PauseBridge) -> Self {
        self.pause = pause;
        self
    }

    /// Validate routing and placements, then attach every adapter to its
    /// event channel.
    pub fn build(self) -> Result<AdMediator> {
        let Self {
            config,
            mut providers,
            presenter,
            pause,
        } = self;

        let has_fallback = providers.iter().any(|p| p.kind() == ProviderKind::Fallback);
        match presenter {
            Some(_) if has_fallback => {
                return Err(MediationError::DuplicateRegistration(
                    "fallback provider".to_string(),
                ));
            }
            Some(presenter) => providers.push(Box::new(FallbackAdapter::new(presenter))),
            None => {
                let needs_fallback = AdSlotKind::ALL
                    .iter()
                    .any(|slot| config.route(*slot) == Some(ProviderKind::Fallback));
                if needs_fallback && !has_fallback {
                    return Err(MediationError::MissingPresenter);
                }
            }
        }

        let mut slots = AdSlotKind::ALL.map(AdSlot::new);
        let mut routes = [None; 3];
        for slot in AdSlotKind::ALL {
            let Some(kind) = config.route(slot) else {
                tracing::debug!(%slot, "Slot not routed to any provider");
                continue;
            };
            let index = providers
                .iter()
                .position(|p| p.kind() == kind)
                .ok_or(MediationError::ProviderNotRegistered {
                    provider: kind,
                    slot,
                })?;
            if !providers[index].supports(slot) {
                return Err(MediationError::UnsupportedRoute {
                    provider: kind,
                    slot,
                });
            }
            let placement = config.placement(kind, slot)?;
            tracing::debug!(%slot, provider = %kind, %placement, "Slot routed");
            slots[slot.index()] = AdSlot::new(slot).with_placement(placement);
            routes[slot.index()] = Some(index);
        }

        let mut entries = Vec::with_capacity(providers.len());
        let mut receivers = Vec::with_capacity(providers.len());
        for (index, mut adapter) in providers.into_iter().enumerate() {
            let kind = adapter.kind();
            let (tx, rx) = event_channel(kind);
            adapter.attach(tx);
            let active = routes.contains(&Some(index));
            if !active {
                tracing::debug!(provider = %kind, mode = config.mode.as_str(), "Provider registered but serves no slot");
            }
            entries.push(ProviderEntry {
                adapter,
                active,
                ready: false,
            });
            receivers.push((kind, rx));
        }

        let callbacks =
            CallbackRegistry::new().with_superseded_warnings(config.warn_on_superseded_callback);

        Ok(AdMediator {
            config,
            slots,
            routes,
            providers: entries,
            receivers,
            callbacks,
            pause,
            init: InitPhase::Idle,
            on_ready: None,
            ready_at: None,
            deferred: [false; 3],
            show_ids: [None; 3],
            banner_requested: false,
        })
    }
}

pub struct AdMediator {
    config: MediatorConfig,
    slots: [AdSlot; 3],
    /// Index into `providers` per slot.
    routes: [Option<usize>; 3],
    providers: Vec<ProviderEntry>,
    receivers: Vec<(ProviderKind, EventReceiver)>,
    callbacks: CallbackRegistry,
    pause: PauseBridge,
    init: InitPhase,
    on_ready: Option<ReadyCallback>,
    ready_at: Option<String>,
    /// Loads requested before the routed provider was ready.
    deferred: [bool; 3],
    /// Correlates a show with its close in the logs.
    show_ids: [Option<Uuid>; 3],
    banner_requested: bool,
}

impl AdMediator {
    pub fn builder(config: MediatorConfig) -> AdMediatorBuilder {
        AdMediatorBuilder {
            config,
            providers: Vec::new(),
            presenter: None,
            pause: PauseBridge::new(),
        }
    }

    pub fn config(&self) -> &MediatorConfig {
        &self.config
    }

    pub fn state(&self, slot: AdSlotKind) -> AdState {
        self.slots[slot.index()].state()
    }

    pub fn init_phase(&self) -> InitPhase {
        self.init
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_suspended()
    }

    /// Start every active provider. `on_ready` fires once all of them have
    /// reported ready, or immediately in offline mode.
    ///
    /// Calling again while starting replaces `on_ready`; calling after ready
    /// invokes it right away.
    pub fn init(&mut self, on_ready: impl FnOnce() + Send + 'static) -> Result<()> {
        match self.init {
            InitPhase::Ready => {
                on_ready();
                return Ok(());
            }
            InitPhase::Starting => {
                self.on_ready = Some(Box::new(on_ready));
                return Ok(());
            }
            InitPhase::Idle => {}
        }

        self.on_ready = Some(Box::new(on_ready));
        self.init = InitPhase::Starting;
        tracing::info!(mode = self.config.mode.as_str(), "Initializing ad mediation");

        for index in 0..self.providers.len() {
            if let Err(err) = self.initialize_provider(index) {
                self.init = InitPhase::Idle;
                self.on_ready = None;
                return Err(err);
            }
        }

        if self.config.is_offline() || self.all_ready() {
            self.complete_init();
        }
        Ok(())
    }

    fn initialize_provider(&mut self, index: usize) -> Result<()> {
        if !self.providers[index].active {
            return Ok(());
        }
        let kind = self.providers[index].kind();
        let placements: Vec<(AdSlotKind, PlacementId)> = AdSlotKind::ALL
            .into_iter()
            .filter(|slot| self.routes[slot.index()] == Some(index))
            .filter_map(|slot| {
                self.slots[slot.index()]
                    .placement()
                    .map(|placement| (slot, placement.clone()))
            })
            .collect();
        let app_id = self.config.app_id(kind).to_string();

        tracing::info!(provider = %kind, slots = placements.len(), "Initializing provider");
        let entry = &mut self.providers[index];
        entry
            .adapter
            .initialize(&app_id, &placements)
            .map_err(|source| MediationError::ProviderInit {
                provider: kind,
                source,
            })?;
        if entry.adapter.always_ready() {
            entry.ready = true;
        }
        Ok(())
    }

    fn all_ready(&self) -> bool {
        self.providers.iter().filter(|p| p.active).all(|p| p.ready)
    }

    fn complete_init(&mut self) {
        self.init = InitPhase::Ready;
        self.ready_at = Some(chrono::Utc::now().to_rfc3339());
        tracing::info!("Ad mediation ready");

        for slot in self.config.preload.clone() {
            self.load_slot(slot);
        }
        if let Some(on_ready) = self.on_ready.take() {
            on_ready();
        }
    }

    pub fn load_interstitial(&mut self) {
        self.load_slot(AdSlotKind::Interstitial);
    }

    /// Returns `true` when a real interstitial was handed to a provider. A
    /// mock presentation in offline mode reports `false`. Either way
    /// `on_closed` runs exactly once.
    pub fn show_interstitial(&mut self, on_closed: impl FnOnce() + Send + 'static) -> bool {
        let slot = AdSlotKind::Interstitial;
        let mock = self.routes[slot.index()]
            .is_some_and(|index| self.providers[index].kind() == ProviderKind::Fallback);
        let delegated = self.show_slot(slot, Box::new(move |_| on_closed()));
        delegated && !mock
    }

    /// `on_loaded` receives `true` once the ad is loaded, `false` on failure.
    pub fn load_rewarded(&mut self, on_loaded: impl FnOnce(bool) + Send + 'static) {
        self.callbacks
            .register_load(AdSlotKind::Rewarded, Box::new(on_loaded));
        self.load_slot(AdSlotKind::Rewarded);
    }

    /// `on_finished` receives the outcome exactly once. Without inventory it
    /// is a full view and a reload is started.
    pub fn show_rewarded(&mut self, on_finished: impl FnOnce(RewardOutcome) + Send + 'static) {
        self.show_slot(AdSlotKind::Rewarded, Box::new(on_finished));
    }

    pub fn is_rewarded_available(&self) -> bool {
        self.is_loaded(AdSlotKind::Rewarded)
    }

    pub fn is_loaded(&self, slot: AdSlotKind) -> bool {
        match self.routes[slot.index()] {
            Some(index) => {
                self.providers[index].adapter.always_ready() || self.slots[slot.index()].is_loaded()
            }
            None => false,
        }
    }

    /// Show the banner now, or as soon as it finishes loading.
    pub fn show_banner(&mut self) {
        self.banner_requested = true;
        let slot = AdSlotKind::Banner;
        let Some(index) = self.routes[slot.index()] else {
            tracing::warn!(%slot, "No provider routed for banner");
            return;
        };
        match self.slots[slot.index()].state() {
            AdState::Showing => {}
            AdState::Loaded => self.present_banner(index),
            _ => self.load_slot(slot),
        }
    }

    pub fn hide_banner(&mut self) {
        self.banner_requested = false;
        let slot = AdSlotKind::Banner;
        let Some(index) = self.routes[slot.index()] else {
            return;
        };
        if !self.slots[slot.index()].hide() {
            return;
        }
        let result = match self.slots[slot.index()].placement() {
            Some(placement) => self.providers[index].adapter.hide(slot, placement),
            None => Ok(()),
        };
        if let Err(err) = result {
            tracing::warn!(%slot, error = %err, "Provider failed to hide banner");
        }
    }

    /// Release the banner. The next `show_banner` loads a fresh one.
    pub fn destroy_banner(&mut self) {
        self.banner_requested = false;
        let slot = AdSlotKind::Banner;
        self.deferred[slot.index()] = false;
        let Some(index) = self.routes[slot.index()] else {
            return;
        };
        if self.slots[slot.index()].reset() == AdState::Unloaded {
            return;
        }
        let result = match self.slots[slot.index()].placement() {
            Some(placement) => self.providers[index].adapter.destroy(slot, placement),
            None => Ok(()),
        };
        if let Err(err) = result {
            tracing::warn!(%slot, error = %err, "Provider failed to destroy banner");
        }
    }

    fn load_slot(&mut self, slot: AdSlotKind) {
        let i = slot.index();
        let Some(index) = self.routes[i] else {
            tracing::warn!(%slot, "No provider routed for slot, reporting load failure");
            self.callbacks.fire_load(slot, false);
            return;
        };

        match self.slots[i].begin_load() {
            LoadDecision::Delegate => {
                if self.providers[index].adapter.always_ready() {
                    self.slots[i].on_loaded();
                    self.on_slot_loaded(slot);
                } else if !self.providers[index].ready {
                    tracing::debug!(%slot, provider = %self.providers[index].kind(), "Provider not ready, deferring load");
                    self.deferred[i] = true;
                } else {
                    self.issue_load(slot, index);
                }
            }
            LoadDecision::AlreadyLoaded => {
                self.callbacks.fire_load(slot, true);
            }
            decision @ (LoadDecision::AlreadyLoading | LoadDecision::Busy) => {
                tracing::debug!(%slot, ?decision, "Load not issued");
            }
        }
    }

    fn issue_load(&mut self, slot: AdSlotKind, index: usize) {
        let i = slot.index();
        self.deferred[i] = false;
        let result = match self.slots[i].placement() {
            Some(placement) => self.providers[index].adapter.load(slot, placement),
            None => Err(ProviderError::NotInitialized),
        };
        if let Err(err) = result {
            tracing::warn!(%slot, provider = %self.providers[index].kind(), error = %err, "Provider refused load");
            if self.slots[i].on_failed() == FailureEffect::LoadFailed {
                self.callbacks.fire_load(slot, false);
            }
        }
    }

    fn on_slot_loaded(&mut self, slot: AdSlotKind) {
        self.callbacks.fire_load(slot, true);
        if slot == AdSlotKind::Banner
            && self.banner_requested
            && let Some(index) = self.routes[slot.index()]
        {
            self.present_banner(index);
        }
    }

    fn present_banner(&mut self, index: usize) {
        let slot = AdSlotKind::Banner;
        let i = slot.index();
        if self.slots[i].begin_show() != ShowDecision::Delegate {
            return;
        }
        let result = match self.slots[i].placement() {
            Some(placement) => self.providers[index].adapter.show(slot, placement),
            None => Err(ProviderError::NotInitialized),
        };
        if let Err(err) = result {
            tracing::warn!(%slot, error = %err, "Provider refused to show banner");
            self.slots[i].abort_show();
        }
    }

    fn show_slot(&mut self, slot: AdSlotKind, callback: ShowCallback) -> bool {
        let i = slot.index();
        let Some(index) = self.routes[i] else {
            tracing::warn!(%slot, "No provider routed for slot, finishing as full view");
            callback(RewardOutcome::FullView);
            return false;
        };

        if self.providers[index].adapter.always_ready() && self.slots[i].state().can_load() {
            self.load_slot(slot);
        }

        match self.slots[i].begin_show() {
            ShowDecision::Delegate => self.start_show(slot, index, callback),
            ShowDecision::NoInventory(state) => {
                tracing::info!(
                    target: "admediator::show",
                    %slot,
                    %state,
                    "Nothing to show, finishing as full view"
                );
                callback(RewardOutcome::FullView);
                self.load_slot(slot);
                false
            }
        }
    }

    fn start_show(&mut self, slot: AdSlotKind, index: usize, callback: ShowCallback) -> bool {
        let i = slot.index();
        let request = Uuid::new_v4();
        self.show_ids[i] = Some(request);
        self.callbacks.register_show(slot, callback);
        if slot.pauses_game() {
            self.pause.suspend();
        }

        let provider = self.providers[index].kind();
        let result = match self.slots[i].placement() {
            Some(placement) => self.providers[index].adapter.show(slot, placement),
            None => Err(ProviderError::NotInitialized),
        };
        match result {
            Ok(()) => {
                tracing::info!(target: "admediator::show", %request, %slot, %provider, "Show delegated");
                true
            }
            Err(err) => {
                tracing::warn!(
                    target: "admediator::show",
                    %request,
                    %slot,
                    %provider,
                    error = %err,
                    "Provider refused show, finishing as full view"
                );
                self.slots[i].abort_show();
                self.finish_show(slot, RewardOutcome::FullView);
                false
            }
        }
    }

    /// Close path: resume, deliver the outcome, then reload.
    fn finish_show(&mut self, slot: AdSlotKind, outcome: RewardOutcome) {
        let request = self.show_ids[slot.index()].take();
        if slot.pauses_game() {
            if self.fullscreen_showing() {
                tracing::debug!(%slot, "Another full-screen ad is still on screen, staying paused");
            } else {
                self.pause.resume();
            }
        }
        tracing::info!(target: "admediator::show", ?request, %slot, ?outcome, "Show finished");
        self.callbacks.fire_show(slot, outcome);
        self.load_slot(slot);
    }

    fn fullscreen_showing(&self) -> bool {
        self.slots
            .iter()
            .any(|s| s.kind().pauses_game() && s.state() == AdState::Showing)
    }

    /// Drop every pending callback without invoking it. Used when the driver
    /// stops, so nothing keeps waiting on a mediator that will not run again.
    pub fn release_callbacks(&mut self) -> usize {
        let released = self.callbacks.clear() + usize::from(self.on_ready.take().is_some());
        if released > 0 {
            tracing::debug!(released, "Released pending callbacks");
        }
        released
    }

    /// Drain every provider channel until no events remain. Returns the
    /// number of events applied.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let mut batch = Vec::new();
            for (kind, rx) in &mut self.receivers {
                while let Ok(event) = rx.try_recv() {
                    batch.push((*kind, event));
                }
            }
            if batch.is_empty() {
                return handled;
            }
            handled += batch.len();
            for (kind, event) in batch {
                self.handle_event(kind, event);
            }
        }
    }

    /// Hand the provider channels to an external driver. Afterwards
    /// [`process_events`](Self::process_events) finds nothing.
    pub fn take_event_receivers(&mut self) -> Vec<(ProviderKind, EventReceiver)> {
        std::mem::take(&mut self.receivers)
    }

    /// Apply one provider event. Stale events are logged and ignored.
    pub fn handle_event(&mut self, provider: ProviderKind, event: ProviderEvent) {
        tracing::debug!(%provider, ?event, "Handling provider event");
        let Some(index) = self.providers.iter().position(|p| p.kind() == provider) else {
            tracing::warn!(%provider, "Event from unregistered provider, ignoring");
            return;
        };
        if let Some(slot) = event.slot()
            && self.routes[slot.index()] != Some(index)
        {
            tracing::warn!(%provider, %slot, "Event from a provider not serving this slot, ignoring");
            return;
        }

        match event {
            ProviderEvent::Ready => self.on_provider_ready(index),
            ProviderEvent::Loaded { slot } => {
                if self.slots[slot.index()].on_loaded() {
                    self.deferred[slot.index()] = false;
                    self.on_slot_loaded(slot);
                } else {
                    tracing::debug!(%slot, state = %self.state(slot), "Stale load event");
                }
            }
            ProviderEvent::FailedToLoad { slot, reason } => match self.slots[slot.index()].on_failed() {
                FailureEffect::LoadFailed => {
                    tracing::warn!(%slot, %provider, %reason, "Ad failed to load");
                    self.callbacks.fire_load(slot, false);
                }
                FailureEffect::ShowAborted(outcome) => {
                    tracing::warn!(%slot, %provider, %reason, "Ad failed while on screen, treating as closed");
                    self.finish_show(slot, outcome);
                }
                FailureEffect::Ignored => {
                    tracing::debug!(%slot, state = %self.state(slot), "Stale failure event");
                }
            },
            ProviderEvent::Unavailable { slot } => {
                if self.slots[slot.index()].on_unavailable() {
                    tracing::warn!(%slot, %provider, "No inventory, load failed");
                    self.deferred[slot.index()] = false;
                    self.callbacks.fire_load(slot, false);
                } else {
                    tracing::debug!(%slot, state = %self.state(slot), "Inventory unavailable");
                }
            }
            ProviderEvent::Started { slot } => {
                if self.slots[slot.index()].on_started() && slot.pauses_game() {
                    self.pause.suspend();
                }
            }
            ProviderEvent::Rewarded { slot } => {
                if !self.slots[slot.index()].on_rewarded() {
                    tracing::debug!(%slot, state = %self.state(slot), "Stale reward event");
                }
            }
            ProviderEvent::Closed {
                slot: AdSlotKind::Banner,
            } => {
                tracing::debug!("Banner overlay dismissed");
            }
            ProviderEvent::Closed { slot } => match self.slots[slot.index()].on_closed() {
                Some(outcome) => self.finish_show(slot, outcome),
                None => tracing::debug!(%slot, state = %self.state(slot), "Stale close event"),
            },
        }
    }

    fn on_provider_ready(&mut self, index: usize) {
        let kind = self.providers[index].kind();
        if self.providers[index].ready {
            tracing::debug!(provider = %kind, "Duplicate ready event");
            return;
        }
        self.providers[index].ready = true;
        tracing::info!(provider = %kind, "Provider ready");

        if self.init == InitPhase::Starting && self.all_ready() {
            self.complete_init();
        }

        for slot in AdSlotKind::ALL {
            let i = slot.index();
            if self.deferred[i]
                && self.routes[i] == Some(index)
                && self.slots[i].state() == AdState::Loading
            {
                self.issue_load(slot, index);
            }
        }
    }

    pub fn status(&self) -> MediatorStatus {
        let slots = AdSlotKind::ALL
            .into_iter()
            .map(|slot| {
                let route = self.routes[slot.index()];
                SlotStatus {
                    slot,
                    state: self.state(slot),
                    provider: route.map(|index| self.providers[index].kind()),
                    placement: self.slots[slot.index()].placement().cloned(),
                    sdk_loaded: match (route, self.slots[slot.index()].placement()) {
                        (Some(index), Some(placement)) => {
                            self.providers[index].adapter.is_loaded(slot, placement)
                        }
                        _ => false,
                    },
                    pending_load: self.callbacks.has_pending_load(slot),
                    pending_show: self.callbacks.has_pending_show(slot),
                }
            })
            .collect();
        let providers = self
            .providers
            .iter()
            .map(|p| ProviderStatus {
                provider: p.kind(),
                active: p.active,
                ready: p.ready,
            })
            .collect();

        MediatorStatus {
            version: ADMEDIATOR_VERSION.to_string(),
            mode: self.config.mode,
            profile: self.config.profile,
            init: self.init,
            ready_at: self.ready_at.clone(),
            paused: self.pause.is_suspended(),
            banner_requested: self.banner_requested,
            slots,
            providers,
        }
    }
}

impl std::fmt::Debug for AdMediator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdMediator")
            .field("init", &self.init)
            .field("slots", &self.slots)
            .field("callbacks", &self.callbacks)
            .field("pause", &self.pause)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::config::{BackendMode, SlotRoutes};
    use crate::mock::testing::HeldPresenter;
    use crate::mock::ScriptedPresenter;
    use crate::pause::testing::RecordingPausable;
    use crate::placement::{BuildProfile, ProviderPlacements};
    use crate::provider::testing::{Call, RecordingProvider};

    use crate::slot::AdSlotKind::{Banner, Interstitial, Rewarded};

    fn sink<T: Send + 'static>(seen: &Arc<Mutex<Vec<T>>>) -> impl FnOnce(T) + Send + 'static {
        let seen = Arc::clone(seen);
        move |value| seen.lock().unwrap().push(value)
    }

    fn config() -> MediatorConfig {
        MediatorConfig::new()
            .with_profile(BuildProfile::Debug)
            .with_routes(SlotRoutes::standard())
            .with_provider(
                ProviderKind::AdMob,
                ProviderPlacements::admob_test_units("admob-app"),
            )
            .with_provider(
                ProviderKind::Vungle,
                ProviderPlacements::new("vungle-app")
                    .with_production(Interstitial, "INTER01")
                    .with_production(Rewarded, "DEFAULT04628"),
            )
    }

    struct Harness {
        mediator: AdMediator,
        admob: RecordingProvider,
        vungle: RecordingProvider,
        pauses: Arc<Mutex<Vec<String>>>,
    }

    impl Harness {
        fn new(config: MediatorConfig) -> Self {
            let admob = RecordingProvider::new(ProviderKind::AdMob);
            let vungle =
                RecordingProvider::new(ProviderKind::Vungle).supporting(&[Interstitial, Rewarded]);
            let pauses = Arc::new(Mutex::new(Vec::new()));
            let mediator = AdMediator::builder(config)
                .provider(admob.clone())
                .unwrap()
                .provider(vungle.clone())
                .unwrap()
                .pause_bridge(
                    PauseBridge::new()
                        .with_clock(RecordingPausable::new("clock", &pauses))
                        .unwrap(),
                )
                .build()
                .unwrap();
            Self {
                mediator,
                admob,
                vungle,
                pauses,
            }
        }

        fn ready() -> Self {
            let mut harness = Self::new(config());
            harness.mediator.init(|| {}).unwrap();
            harness.admob.emit(ProviderEvent::Ready);
            harness.vungle.emit(ProviderEvent::Ready);
            harness.mediator.process_events();
            harness
        }

        fn emit(&mut self, provider: &RecordingProvider, event: ProviderEvent) {
            provider.emit(event);
            self.mediator.process_events();
        }

        fn pauses(&self) -> Vec<String> {
            self.pauses.lock().unwrap().clone()
        }

        fn loaded_rewarded() -> Self {
            let mut harness = Self::ready();
            harness.mediator.load_rewarded(|_| {});
            let vungle = harness.vungle.clone();
            harness.emit(&vungle, ProviderEvent::Loaded { slot: Rewarded });
            assert!(harness.mediator.is_rewarded_available());
            assert!(harness.mediator.status().slot(Rewarded).unwrap().sdk_loaded);
            harness
        }
    }

    #[test]
    fn init_waits_for_every_provider() {
        let mut h = Harness::new(config());
        let ready = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&ready);
        h.mediator
            .init(move || seen.lock().unwrap().push(()))
            .unwrap();

        assert_eq!(h.mediator.init_phase(), InitPhase::Starting);
        assert_eq!(
            h.admob.calls(),
            vec![Call::Initialize("admob-app".to_string())]
        );

        let admob = h.admob.clone();
        h.emit(&admob, ProviderEvent::Ready);
        assert!(ready.lock().unwrap().is_empty());

        let vungle = h.vungle.clone();
        h.emit(&vungle, ProviderEvent::Ready);
        h.emit(&vungle, ProviderEvent::Ready);
        assert_eq!(ready.lock().unwrap().len(), 1);
        assert!(h.mediator.init_phase().is_ready());

        // banner is preloaded by default
        assert_eq!(h.admob.load_count(Banner), 1);
        assert_eq!(h.mediator.state(Banner), AdState::Loading);
    }

    #[test]
    fn init_after_ready_fires_immediately() {
        let mut h = Harness::ready();
        let fired = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&fired);
        h.mediator.init(move || seen.lock().unwrap().push(())).unwrap();
        assert_eq!(fired.lock().unwrap().len(), 1);
        assert_eq!(h.vungle.calls().len(), 1);
    }

    #[test]
    fn provider_init_failure_is_reported() {
        let mut h = Harness::new(config());
        h.vungle.fail_init();
        let err = h.mediator.init(|| {}).unwrap_err();
        assert!(matches!(
            err,
            MediationError::ProviderInit {
                provider: ProviderKind::Vungle,
                ..
            }
        ));
        assert_eq!(h.mediator.init_phase(), InitPhase::Idle);
    }

    #[test]
    fn load_reaches_loaded() {
        let mut h = Harness::ready();
        let results = Arc::new(Mutex::new(Vec::new()));
        h.mediator.load_rewarded(sink(&results));
        assert_eq!(h.mediator.state(Rewarded), AdState::Loading);
        assert!(!h.mediator.is_rewarded_available());

        let vungle = h.vungle.clone();
        h.emit(&vungle, ProviderEvent::Loaded { slot: Rewarded });
        assert_eq!(h.mediator.state(Rewarded), AdState::Loaded);
        assert!(h.mediator.is_rewarded_available());
        assert_eq!(*results.lock().unwrap(), vec![true]);
    }

    #[test]
    fn repeated_load_issues_one_provider_load() {
        let mut h = Harness::ready();
        h.mediator.load_interstitial();
        h.mediator.load_interstitial();
        assert_eq!(h.admob.load_count(Interstitial), 1);

        let admob = h.admob.clone();
        h.emit(&admob, ProviderEvent::Loaded { slot: Interstitial });
        h.mediator.load_interstitial();
        assert_eq!(h.admob.load_count(Interstitial), 1);

        let results = Arc::new(Mutex::new(Vec::new()));
        h.mediator.load_rewarded(sink(&results));
        h.mediator.load_rewarded(sink(&results));
        assert_eq!(h.vungle.load_count(Rewarded), 1);
    }

    #[test]
    fn load_before_ready_is_deferred() {
        let mut h = Harness::new(config());
        h.mediator.init(|| {}).unwrap();
        h.mediator.load_interstitial();
        assert_eq!(h.mediator.state(Interstitial), AdState::Loading);
        assert_eq!(h.admob.load_count(Interstitial), 0);

        let admob = h.admob.clone();
        h.emit(&admob, ProviderEvent::Ready);
        assert_eq!(h.admob.load_count(Interstitial), 1);
    }

    #[test]
    fn rewarded_full_view() {
        let mut h = Harness::loaded_rewarded();
        let outcomes = Arc::new(Mutex::new(Vec::new()));
        h.mediator.show_rewarded(sink(&outcomes));

        assert_eq!(h.mediator.state(Rewarded), AdState::Showing);
        assert!(h.mediator.is_paused());
        assert_eq!(h.vungle.show_count(Rewarded), 1);

        let vungle = h.vungle.clone();
        h.emit(&vungle, ProviderEvent::Started { slot: Rewarded });
        h.emit(&vungle, ProviderEvent::Rewarded { slot: Rewarded });
        assert!(outcomes.lock().unwrap().is_empty());
        h.emit(&vungle, ProviderEvent::Closed { slot: Rewarded });

        assert_eq!(*outcomes.lock().unwrap(), vec![RewardOutcome::FullView]);
        assert_eq!(h.pauses(), vec!["clock:pause", "clock:resume"]);
        assert_eq!(h.mediator.state(Rewarded), AdState::Loading);
        assert_eq!(h.vungle.load_count(Rewarded), 2);
    }

    #[test]
    fn rewarded_partial_view() {
        let mut h = Harness::loaded_rewarded();
        let outcomes = Arc::new(Mutex::new(Vec::new()));
        h.mediator.show_rewarded(sink(&outcomes));

        let vungle = h.vungle.clone();
        h.emit(&vungle, ProviderEvent::Started { slot: Rewarded });
        h.emit(&vungle, ProviderEvent::Closed { slot: Rewarded });

        assert_eq!(*outcomes.lock().unwrap(), vec![RewardOutcome::PartialView]);
        assert!(!h.mediator.is_paused());
    }

    #[test]
    fn finish_fires_once_despite_repeated_events() {
        let mut h = Harness::loaded_rewarded();
        let outcomes = Arc::new(Mutex::new(Vec::new()));
        h.mediator.show_rewarded(sink(&outcomes));

        let vungle = h.vungle.clone();
        h.emit(&vungle, ProviderEvent::Started { slot: Rewarded });
        h.emit(&vungle, ProviderEvent::Started { slot: Rewarded });
        h.emit(&vungle, ProviderEvent::Rewarded { slot: Rewarded });
        h.emit(&vungle, ProviderEvent::Rewarded { slot: Rewarded });
        h.emit(&vungle, ProviderEvent::Closed { slot: Rewarded });
        h.emit(&vungle, ProviderEvent::Closed { slot: Rewarded });
        h.emit(&vungle, ProviderEvent::Rewarded { slot: Rewarded });

        assert_eq!(*outcomes.lock().unwrap(), vec![RewardOutcome::FullView]);
        assert_eq!(h.pauses(), vec!["clock:pause", "clock:resume"]);
    }

    #[test]
    fn show_without_inventory_fails_open_and_loads_once() {
        let mut h = Harness::ready();
        let outcomes = Arc::new(Mutex::new(Vec::new()));
        h.mediator.show_rewarded(sink(&outcomes));

        assert_eq!(*outcomes.lock().unwrap(), vec![RewardOutcome::FullView]);
        assert_eq!(h.vungle.load_count(Rewarded), 1);
        assert_eq!(h.vungle.show_count(Rewarded), 0);
        assert!(h.pauses().is_empty());
        assert_eq!(h.mediator.state(Rewarded), AdState::Loading);
    }

    #[test]
    fn failed_load_reports_and_retries_on_next_load() {
        let mut h = Harness::ready();
        let results = Arc::new(Mutex::new(Vec::new()));
        h.mediator.load_rewarded(sink(&results));

        let vungle = h.vungle.clone();
        h.emit(
            &vungle,
            ProviderEvent::FailedToLoad {
                slot: Rewarded,
                reason: "no fill".to_string(),
            },
        );
        assert_eq!(*results.lock().unwrap(), vec![false]);
        assert_eq!(h.mediator.state(Rewarded), AdState::Failed);

        h.mediator.load_rewarded(sink(&results));
        assert_eq!(h.vungle.load_count(Rewarded), 2);
    }

    #[test]
    fn refused_load_fails_immediately() {
        let mut h = Harness::ready();
        h.vungle.fail_next_load();
        let results = Arc::new(Mutex::new(Vec::new()));
        h.mediator.load_rewarded(sink(&results));
        assert_eq!(*results.lock().unwrap(), vec![false]);
        assert_eq!(h.mediator.state(Rewarded), AdState::Failed);
    }

    #[test]
    fn refused_show_resumes_and_fails_open() {
        let mut h = Harness::loaded_rewarded();
        h.vungle.fail_next_show();
        let outcomes = Arc::new(Mutex::new(Vec::new()));
        h.mediator.show_rewarded(sink(&outcomes));

        assert_eq!(*outcomes.lock().unwrap(), vec![RewardOutcome::FullView]);
        assert_eq!(h.pauses(), vec!["clock:pause", "clock:resume"]);
        assert_eq!(h.mediator.state(Rewarded), AdState::Loading);
    }

    #[test]
    fn interstitial_closed_notice() {
        let mut h = Harness::ready();
        h.mediator.load_interstitial();
        let admob = h.admob.clone();
        h.emit(&admob, ProviderEvent::Loaded { slot: Interstitial });

        let closed = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&closed);
        assert!(h.mediator.show_interstitial(move || *counter.lock().unwrap() += 1));

        h.emit(&admob, ProviderEvent::Started { slot: Interstitial });
        h.emit(&admob, ProviderEvent::Closed { slot: Interstitial });
        assert_eq!(*closed.lock().unwrap(), 1);
        assert_eq!(h.admob.load_count(Interstitial), 2);
    }

    #[test]
    fn interstitial_failure_while_showing_counts_as_close() {
        let mut h = Harness::ready();
        h.mediator.load_interstitial();
        let admob = h.admob.clone();
        h.emit(&admob, ProviderEvent::Loaded { slot: Interstitial });

        let closed = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&closed);
        h.mediator.show_interstitial(move || *counter.lock().unwrap() += 1);
        h.emit(
            &admob,
            ProviderEvent::FailedToLoad {
                slot: Interstitial,
                reason: "internal error".to_string(),
            },
        );

        assert_eq!(*closed.lock().unwrap(), 1);
        assert!(!h.mediator.is_paused());
        assert_eq!(h.mediator.state(Interstitial), AdState::Loading);
    }

    #[test]
    fn interstitial_without_inventory_still_notifies() {
        let mut h = Harness::ready();
        let closed = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&closed);
        assert!(!h.mediator.show_interstitial(move || *counter.lock().unwrap() += 1));
        assert_eq!(*closed.lock().unwrap(), 1);
        assert_eq!(h.admob.load_count(Interstitial), 1);
    }

    #[test]
    fn second_show_while_on_screen_fails_open() {
        let mut h = Harness::loaded_rewarded();
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(Vec::new()));
        h.mediator.show_rewarded(sink(&first));
        // Second show while on screen fails open without touching the first.
        h.mediator.show_rewarded(sink(&second));
        assert_eq!(*second.lock().unwrap(), vec![RewardOutcome::FullView]);

        let vungle = h.vungle.clone();
        h.emit(&vungle, ProviderEvent::Closed { slot: Rewarded });
        assert_eq!(*first.lock().unwrap(), vec![RewardOutcome::PartialView]);
        assert_eq!(h.vungle.show_count(Rewarded), 1);
    }

    #[test]
    fn overlapping_fullscreen_shows_keep_the_game_paused() {
        let mut h = Harness::loaded_rewarded();
        h.mediator.load_interstitial();
        let admob = h.admob.clone();
        let vungle = h.vungle.clone();
        h.emit(&admob, ProviderEvent::Loaded { slot: Interstitial });

        let outcomes = Arc::new(Mutex::new(Vec::new()));
        h.mediator.show_rewarded(sink(&outcomes));
        assert!(h.mediator.show_interstitial(|| {}));

        h.emit(&admob, ProviderEvent::Closed { slot: Interstitial });
        assert_eq!(h.mediator.state(Rewarded), AdState::Showing);
        assert!(h.mediator.is_paused());
        assert_eq!(h.pauses(), vec!["clock:pause"]);

        h.emit(&vungle, ProviderEvent::Closed { slot: Rewarded });
        assert_eq!(*outcomes.lock().unwrap(), vec![RewardOutcome::PartialView]);
        assert!(!h.mediator.is_paused());
        assert_eq!(h.pauses(), vec!["clock:pause", "clock:resume"]);
    }

    #[test]
    fn rewarded_unavailable_fails_the_load() {
        let mut h = Harness::ready();
        let loads = Arc::new(Mutex::new(Vec::new()));
        h.mediator.load_rewarded(sink(&loads));

        let vungle = h.vungle.clone();
        h.emit(&vungle, ProviderEvent::Unavailable { slot: Rewarded });
        assert_eq!(*loads.lock().unwrap(), vec![false]);
        assert_eq!(h.mediator.state(Rewarded), AdState::Failed);

        h.mediator.load_rewarded(|_| {});
        assert_eq!(h.vungle.load_count(Rewarded), 2);

        // Once loaded, losing playability is informational only.
        h.emit(&vungle, ProviderEvent::Loaded { slot: Rewarded });
        h.emit(&vungle, ProviderEvent::Unavailable { slot: Rewarded });
        assert_eq!(h.mediator.state(Rewarded), AdState::Loaded);
    }

    #[test]
    fn vungle_no_fill_reaches_the_load_callback() {
        use crate::provider::vungle::testing::FakeVungleSdk;
        use crate::provider::vungle::{VungleAdapter, VungleCallback};

        let admob = RecordingProvider::new(ProviderKind::AdMob);
        let sdk = FakeVungleSdk::default();
        let mut mediator = AdMediator::builder(config().with_preload([]))
            .provider(admob.clone())
            .unwrap()
            .provider(VungleAdapter::new(sdk.clone()))
            .unwrap()
            .build()
            .unwrap();
        mediator.init(|| {}).unwrap();
        admob.emit(ProviderEvent::Ready);
        sdk.fire(VungleCallback::Initialized);
        mediator.process_events();
        assert!(mediator.init_phase().is_ready());

        let loads = Arc::new(Mutex::new(Vec::new()));
        mediator.load_rewarded(sink(&loads));
        assert_eq!(sdk.loads(), vec!["DEFAULT04628".to_string()]);

        sdk.fire(VungleCallback::AdPlayable {
            placement: "DEFAULT04628".to_string(),
            playable: false,
        });
        mediator.process_events();
        assert_eq!(*loads.lock().unwrap(), vec![false]);
        assert_eq!(mediator.state(Rewarded), AdState::Failed);

        mediator.load_rewarded(sink(&loads));
        assert_eq!(sdk.loads().len(), 2);
        sdk.fire(VungleCallback::AdPlayable {
            placement: "DEFAULT04628".to_string(),
            playable: true,
        });
        mediator.process_events();
        assert_eq!(*loads.lock().unwrap(), vec![false, true]);
        assert!(mediator.is_rewarded_available());
    }

    #[test]
    fn late_banner_load_after_destroy_is_ignored() {
        let mut h = Harness::ready();
        assert_eq!(h.admob.load_count(Banner), 1);
        h.mediator.destroy_banner();

        let admob = h.admob.clone();
        h.emit(&admob, ProviderEvent::Loaded { slot: Banner });
        assert_eq!(h.mediator.state(Banner), AdState::Unloaded);

        h.mediator.show_banner();
        assert_eq!(h.admob.load_count(Banner), 2);
        assert_eq!(h.admob.show_count(Banner), 0);

        h.emit(&admob, ProviderEvent::Loaded { slot: Banner });
        assert_eq!(h.mediator.state(Banner), AdState::Showing);
        assert_eq!(h.admob.show_count(Banner), 1);
    }

    #[test]
    fn superseded_load_callback_is_dropped() {
        let mut h = Harness::ready();
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(Vec::new()));
        h.mediator.load_rewarded(sink(&first));
        h.mediator.load_rewarded(sink(&second));

        let vungle = h.vungle.clone();
        h.emit(&vungle, ProviderEvent::Loaded { slot: Rewarded });
        assert!(first.lock().unwrap().is_empty());
        assert_eq!(*second.lock().unwrap(), vec![true]);
    }

    #[test]
    fn events_from_other_providers_are_ignored() {
        let mut h = Harness::ready();
        h.mediator.load_rewarded(|_| {});
        let admob = h.admob.clone();
        h.emit(&admob, ProviderEvent::Loaded { slot: Rewarded });
        assert_eq!(h.mediator.state(Rewarded), AdState::Loading);
    }

    #[test]
    fn banner_shows_once_loaded() {
        let mut h = Harness::ready();
        h.mediator.show_banner();
        assert_eq!(h.mediator.state(Banner), AdState::Loading);
        assert_eq!(h.admob.show_count(Banner), 0);

        let admob = h.admob.clone();
        h.emit(&admob, ProviderEvent::Loaded { slot: Banner });
        assert_eq!(h.mediator.state(Banner), AdState::Showing);
        assert_eq!(h.admob.show_count(Banner), 1);
        assert!(h.pauses().is_empty());

        h.mediator.hide_banner();
        assert_eq!(h.mediator.state(Banner), AdState::Loaded);
        h.mediator.show_banner();
        assert_eq!(h.admob.show_count(Banner), 2);

        h.mediator.destroy_banner();
        assert_eq!(h.mediator.state(Banner), AdState::Unloaded);
        assert!(h.admob.calls().contains(&Call::Hide(Banner)));
        assert!(h.admob.calls().contains(&Call::Destroy(Banner)));
    }

    #[test]
    fn hidden_banner_is_not_shown_on_load() {
        let mut h = Harness::ready();
        h.mediator.show_banner();
        h.mediator.hide_banner();
        let admob = h.admob.clone();
        h.emit(&admob, ProviderEvent::Loaded { slot: Banner });
        assert_eq!(h.mediator.state(Banner), AdState::Loaded);
        assert_eq!(h.admob.show_count(Banner), 0);
    }

    #[test]
    fn offline_uses_presenter_and_never_touches_vendors() {
        let presenter = HeldPresenter::default();
        let admob = RecordingProvider::new(ProviderKind::AdMob);
        let mut mediator = AdMediator::builder(config().with_mode(BackendMode::Offline))
            .provider(admob.clone())
            .unwrap()
            .presenter(presenter.clone())
            .build()
            .unwrap();

        let ready = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&ready);
        mediator.init(move || seen.lock().unwrap().push(())).unwrap();
        assert_eq!(ready.lock().unwrap().len(), 1);
        assert!(mediator.is_rewarded_available());

        let outcomes = Arc::new(Mutex::new(Vec::new()));
        mediator.show_rewarded(sink(&outcomes));
        mediator.process_events();
        assert!(mediator.is_paused());
        assert_eq!(presenter.presented(), 1);

        let (request, resolution) = presenter.take();
        assert_eq!(request.slot, Rewarded);
        resolution.partial_view();
        mediator.process_events();

        assert_eq!(*outcomes.lock().unwrap(), vec![RewardOutcome::PartialView]);
        assert!(!mediator.is_paused());
        assert_eq!(mediator.state(Rewarded), AdState::Loaded);
        assert!(admob.calls().is_empty());
    }

    #[test]
    fn offline_scripted_full_view() {
        let mut mediator = AdMediator::builder(MediatorConfig::offline())
            .presenter(ScriptedPresenter::full_view())
            .build()
            .unwrap();
        mediator.init(|| {}).unwrap();

        let outcomes = Arc::new(Mutex::new(Vec::new()));
        mediator.show_rewarded(sink(&outcomes));
        mediator.process_events();
        assert_eq!(*outcomes.lock().unwrap(), vec![RewardOutcome::FullView]);

        let closed = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&closed);
        assert!(!mediator.show_interstitial(move || *counter.lock().unwrap() += 1));
        mediator.process_events();
        assert_eq!(*closed.lock().unwrap(), 1);
    }

    #[test]
    fn unrouted_slot_fails_open() {
        let config = MediatorConfig::new()
            .with_preload([])
            .with_route(Banner, ProviderKind::AdMob)
            .with_provider(
                ProviderKind::AdMob,
                ProviderPlacements::admob_test_units("app"),
            )
            .with_profile(BuildProfile::Debug);
        let mut mediator = AdMediator::builder(config)
            .provider(RecordingProvider::new(ProviderKind::AdMob))
            .unwrap()
            .build()
            .unwrap();

        let loads = Arc::new(Mutex::new(Vec::new()));
        let outcomes = Arc::new(Mutex::new(Vec::new()));
        mediator.load_rewarded(sink(&loads));
        mediator.show_rewarded(sink(&outcomes));
        assert_eq!(*loads.lock().unwrap(), vec![false]);
        assert_eq!(*outcomes.lock().unwrap(), vec![RewardOutcome::FullView]);
        assert!(!mediator.is_rewarded_available());
    }

    #[test]
    fn builder_rejects_bad_setups() {
        let duplicate = AdMediator::builder(config())
            .provider(RecordingProvider::new(ProviderKind::AdMob))
            .unwrap()
            .provider(RecordingProvider::new(ProviderKind::AdMob));
        assert!(matches!(
            duplicate.err(),
            Some(MediationError::DuplicateRegistration(_))
        ));

        let missing = AdMediator::builder(config())
            .provider(RecordingProvider::new(ProviderKind::AdMob))
            .unwrap()
            .build();
        assert!(matches!(
            missing.err(),
            Some(MediationError::ProviderNotRegistered {
                provider: ProviderKind::Vungle,
                slot: Rewarded
            })
        ));

        let unsupported = AdMediator::builder(config().with_route(Banner, ProviderKind::Vungle))
            .provider(RecordingProvider::new(ProviderKind::AdMob))
            .unwrap()
            .provider(RecordingProvider::new(ProviderKind::Vungle).supporting(&[Rewarded]))
            .unwrap()
            .build();
        assert!(matches!(
            unsupported.err(),
            Some(MediationError::UnsupportedRoute {
                provider: ProviderKind::Vungle,
                slot: Banner
            })
        ));

        let no_presenter = AdMediator::builder(MediatorConfig::offline()).build();
        assert!(matches!(
            no_presenter.err(),
            Some(MediationError::MissingPresenter)
        ));
    }

    #[test]
    fn release_build_requires_production_ids() {
        let result = AdMediator::builder(config().with_profile(BuildProfile::Release))
            .provider(RecordingProvider::new(ProviderKind::AdMob))
            .unwrap()
            .provider(RecordingProvider::new(ProviderKind::Vungle))
            .unwrap()
            .build();
        assert!(matches!(
            result.err(),
            Some(MediationError::MisconfiguredPlacement {
                provider: ProviderKind::AdMob,
                slot: Banner
            })
        ));
    }

    #[test]
    fn status_reports_slots_and_providers() {
        let mut h = Harness::loaded_rewarded();
        h.mediator.show_rewarded(|_| {});
        let status = h.mediator.status();

        assert!(status.is_ready());
        assert!(status.ready_at.is_some());
        assert!(status.paused);
        assert_eq!(status.version, ADMEDIATOR_VERSION);
        let rewarded = status.slot(Rewarded).unwrap();
        assert_eq!(rewarded.state, AdState::Showing);
        assert_eq!(rewarded.provider, Some(ProviderKind::Vungle));
        assert!(rewarded.pending_show);
        assert_eq!(
            rewarded.placement.as_ref().map(|p| p.as_str()),
            Some("DEFAULT04628")
        );
        assert!(status.providers.iter().all(|p| p.active && p.ready));
    }
}
