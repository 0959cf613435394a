use thiserror::Error;

use crate::provider::ProviderKind;
use crate::slot::AdSlotKind;

/// Fatal construction and initialization errors.
///
/// Runtime ad failures never surface here; the mediator absorbs them and
/// reports only load success/failure and reward outcomes to callers.
#[derive(Debug, Error)]
pub enum MediationError {
    #[error("no {slot} placement configured for provider {provider}")]
    MisconfiguredPlacement {
        provider: ProviderKind,
        slot: AdSlotKind,
    },

    #[error("{0} registered twice")]
    DuplicateRegistration(String),

    #[error("{slot} is routed to provider {provider}, which is not registered")]
    ProviderNotRegistered {
        provider: ProviderKind,
        slot: AdSlotKind,
    },

    #[error("provider {provider} does not serve {slot} ads")]
    UnsupportedRoute {
        provider: ProviderKind,
        slot: AdSlotKind,
    },

    #[error("offline mode requires a mock presenter")]
    MissingPresenter,

    #[error("provider {provider} failed to initialize: {source}")]
    ProviderInit {
        provider: ProviderKind,
        #[source]
        source: ProviderError,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Errors reported by provider adapters for a single call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("provider not initialized")]
    NotInitialized,

    #[error("no event sender attached")]
    NotAttached,

    #[error("{0} ads are not supported")]
    Unsupported(AdSlotKind),

    #[error("sdk error: {0}")]
    Sdk(String),
}

pub type Result<T> = std::result::Result<T, MediationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = MediationError::MisconfiguredPlacement {
            provider: ProviderKind::AdMob,
            slot: AdSlotKind::Rewarded,
        };
        assert_eq!(
            err.to_string(),
            "no rewarded placement configured for provider admob"
        );

        let err = MediationError::DuplicateRegistration("pause clock".to_string());
        assert_eq!(err.to_string(), "pause clock registered twice");

        let err = ProviderError::Unsupported(AdSlotKind::Banner);
        assert_eq!(err.to_string(), "banner ads are not supported");
    }
}
