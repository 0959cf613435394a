//! admediator: one facade over several ad SDKs for game code.

mod callbacks;
mod error;
mod pause;
mod placement;
mod slot;
mod status;

pub mod config;
pub mod mediator;
pub mod mock;
pub mod provider;
pub mod service;

pub use callbacks::{CallbackRegistry, LoadCallback, ReadyCallback, ShowCallback};
pub use config::{BackendMode, MediatorConfig, SlotRoutes};
pub use error::{MediationError, ProviderError, Result};
pub use mediator::{AdMediator, AdMediatorBuilder};
pub use mock::{MockAdRequest, MockPresenter, MockResolution, ScriptedPresenter};
pub use pause::{Pausable, PauseBridge};
pub use placement::{BuildProfile, PlacementId, ProviderPlacements, SlotPlacements};
pub use provider::{EventSender, ProviderAdapter, ProviderEvent, ProviderKind};
pub use service::{MediatorHandle, ServiceError};
pub use slot::{AdSlot, AdSlotKind, AdState, FailureEffect, LoadDecision, RewardOutcome, ShowDecision};
pub use status::{ADMEDIATOR_VERSION, InitPhase, MediatorStatus, ProviderStatus, SlotStatus};
pub use tokio_util::sync::CancellationToken;
