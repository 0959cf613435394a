//! Simulated vendor SDKs with fixed latencies.
//!
//! Callbacks are raised from spawned tokio tasks, the way the real SDKs call
//! back from their own threads.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use admediator::Pausable;
use admediator::provider::admob::{AdFormat, AdMobCallback, AdMobListener, AdMobSdk};
use admediator::provider::vungle::{VungleCallback, VungleListener, VungleSdk};

#[derive(Debug, Clone, Copy)]
pub struct SimBehavior {
    pub latency: Duration,
    /// Loads fail with "no fill" instead of succeeding.
    pub no_fill: bool,
    /// Videos are closed before the reward.
    pub skip_videos: bool,
}

impl Default for SimBehavior {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(500),
            no_fill: false,
            skip_videos: false,
        }
    }
}

pub struct SimAdMob {
    behavior: SimBehavior,
    listener: Option<AdMobListener>,
    loaded: Arc<Mutex<HashSet<AdFormat>>>,
}

impl SimAdMob {
    pub fn new(behavior: SimBehavior) -> Self {
        Self {
            behavior,
            listener: None,
            loaded: Arc::default(),
        }
    }
}

impl AdMobSdk for SimAdMob {
    fn set_listener(&mut self, listener: AdMobListener) {
        self.listener = Some(listener);
    }

    fn initialize(&mut self, app_id: &str) {
        tracing::debug!(app_id, "sim admob: initialize");
    }

    fn load(&mut self, format: AdFormat, unit_id: &str) {
        let Some(listener) = self.listener.clone() else {
            return;
        };
        let loaded = Arc::clone(&self.loaded);
        let behavior = self.behavior;
        tracing::debug!(?format, unit_id, "sim admob: load");
        tokio::spawn(async move {
            tokio::time::sleep(behavior.latency).await;
            if behavior.no_fill {
                listener.on_callback(AdMobCallback::AdFailedToLoad {
                    format,
                    message: "No fill".to_string(),
                });
                return;
            }
            if let Ok(mut loaded) = loaded.lock() {
                loaded.insert(format);
            }
            listener.on_callback(AdMobCallback::AdLoaded(format));
        });
    }

    fn is_loaded(&self, format: AdFormat) -> bool {
        self.loaded
            .lock()
            .map(|loaded| loaded.contains(&format))
            .unwrap_or(false)
    }

    fn show(&mut self, format: AdFormat) {
        if format == AdFormat::Banner {
            println!("[admob] banner on screen");
            return;
        }
        if let Ok(mut loaded) = self.loaded.lock() {
            loaded.remove(&format);
        }
        let Some(listener) = self.listener.clone() else {
            return;
        };
        let behavior = self.behavior;
        tokio::spawn(async move {
            listener.on_callback(AdMobCallback::AdOpening(format));
            println!("[admob] {format:?} playing");
            tokio::time::sleep(behavior.latency * 2).await;
            if format == AdFormat::RewardedVideo && !behavior.skip_videos {
                listener.on_callback(AdMobCallback::Rewarded {
                    reward_type: "coins".to_string(),
                    amount: 10.0,
                });
            }
            listener.on_callback(AdMobCallback::AdClosed(format));
        });
    }

    fn hide_banner(&mut self) {
        println!("[admob] banner hidden");
    }

    fn destroy_banner(&mut self) {
        if let Ok(mut loaded) = self.loaded.lock() {
            loaded.remove(&AdFormat::Banner);
        }
        println!("[admob] banner destroyed");
    }
}

pub struct SimVungle {
    behavior: SimBehavior,
    listener: Option<VungleListener>,
    playable: Arc<Mutex<HashSet<String>>>,
}

impl SimVungle {
    pub fn new(behavior: SimBehavior) -> Self {
        Self {
            behavior,
            listener: None,
            playable: Arc::default(),
        }
    }
}

impl VungleSdk for SimVungle {
    fn set_listener(&mut self, listener: VungleListener) {
        self.listener = Some(listener);
    }

    fn init(&mut self, app_id: &str, placements: &[String]) {
        let Some(listener) = self.listener.clone() else {
            return;
        };
        let latency = self.behavior.latency;
        tracing::debug!(app_id, ?placements, "sim vungle: init");
        tokio::spawn(async move {
            tokio::time::sleep(latency).await;
            listener.on_callback(VungleCallback::Log("SDK initialized".to_string()));
            listener.on_callback(VungleCallback::Initialized);
        });
    }

    fn load_ad(&mut self, placement: &str) {
        let Some(listener) = self.listener.clone() else {
            return;
        };
        let playable = Arc::clone(&self.playable);
        let behavior = self.behavior;
        let placement = placement.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(behavior.latency).await;
            let available = !behavior.no_fill;
            if available && let Ok(mut playable) = playable.lock() {
                playable.insert(placement.clone());
            }
            listener.on_callback(VungleCallback::AdPlayable {
                placement,
                playable: available,
            });
        });
    }

    fn play_ad(&mut self, placement: &str) {
        if let Ok(mut playable) = self.playable.lock() {
            playable.remove(placement);
        }
        let Some(listener) = self.listener.clone() else {
            return;
        };
        let behavior = self.behavior;
        let placement = placement.to_string();
        tokio::spawn(async move {
            listener.on_callback(VungleCallback::AdStarted {
                placement: placement.clone(),
            });
            println!("[vungle] {placement} playing");
            tokio::time::sleep(behavior.latency * 2).await;
            listener.on_callback(VungleCallback::AdFinished {
                placement,
                completed_view: !behavior.skip_videos,
            });
        });
    }

    fn is_advert_available(&self, placement: &str) -> bool {
        self.playable
            .lock()
            .map(|playable| playable.contains(placement))
            .unwrap_or(false)
    }
}

/// Stand-in for the game's time scale.
pub struct ConsoleClock;

impl Pausable for ConsoleClock {
    fn on_pause(&mut self) {
        println!("[game] paused");
    }

    fn on_resume(&mut self) {
        println!("[game] resumed");
    }
}
