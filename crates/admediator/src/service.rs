//! Async driver: one tokio task owns the mediator.
//!
//! Commands from any number of [`MediatorHandle`]s and events from every
//! provider channel are serialized through a single `select!` loop. Callbacks
//! run inside the loop; a callback that calls back into a handle only queues a
//! command, so re-entry never deadlocks.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::callbacks::{LoadCallback, ShowCallback};
use crate::error::MediationError;
use crate::mediator::AdMediator;
use crate::provider::{ProviderEvent, ProviderKind};
use crate::slot::RewardOutcome;
use crate::status::MediatorStatus;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("mediation service stopped")]
    Stopped,
    #[error("request superseded by a newer one")]
    Superseded,
    #[error(transparent)]
    Mediation(#[from] MediationError),
}

type ReadyReply = oneshot::Sender<Result<oneshot::Receiver<()>, MediationError>>;

enum Command {
    Init(ReadyReply),
    LoadInterstitial,
    ShowInterstitial {
        on_closed: Box<dyn FnOnce() + Send + 'static>,
        shown: Option<oneshot::Sender<bool>>,
    },
    LoadRewarded(LoadCallback),
    ShowRewarded(ShowCallback),
    IsRewardedAvailable(oneshot::Sender<bool>),
    ShowBanner,
    HideBanner,
    DestroyBanner,
    Status(oneshot::Sender<MediatorStatus>),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Init(_) => "init",
            Self::LoadInterstitial => "load_interstitial",
            Self::ShowInterstitial { .. } => "show_interstitial",
            Self::LoadRewarded(_) => "load_rewarded",
            Self::ShowRewarded(_) => "show_rewarded",
            Self::IsRewardedAvailable(_) => "is_rewarded_available",
            Self::ShowBanner => "show_banner",
            Self::HideBanner => "hide_banner",
            Self::DestroyBanner => "destroy_banner",
            Self::Status(_) => "status",
        }
    }
}

/// Cloneable handle to a running mediation service.
#[derive(Clone)]
pub struct MediatorHandle {
    tx: mpsc::UnboundedSender<Command>,
    shutdown: CancellationToken,
}

impl MediatorHandle {
    fn send(&self, command: Command) -> Result<(), ServiceError> {
        self.tx.send(command).map_err(|_| ServiceError::Stopped)
    }

    /// A dropped reply means either the loop is gone or the callback was
    /// replaced by a newer registration.
    fn dropped(&self) -> ServiceError {
        if self.tx.is_closed() {
            ServiceError::Stopped
        } else {
            ServiceError::Superseded
        }
    }

    /// Initialize every provider and wait until all report ready.
    pub async fn init(&self) -> Result<(), ServiceError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Init(reply_tx))?;
        let ready = reply_rx.await.map_err(|_| ServiceError::Stopped)??;
        ready.await.map_err(|_| self.dropped())
    }

    pub fn load_interstitial(&self) -> Result<(), ServiceError> {
        self.send(Command::LoadInterstitial)
    }

    /// Resolves once the interstitial is closed (or immediately without
    /// inventory). Returns whether a provider showed it.
    pub async fn show_interstitial(&self) -> Result<bool, ServiceError> {
        let (shown_tx, shown_rx) = oneshot::channel();
        let (closed_tx, closed_rx) = oneshot::channel();
        self.send(Command::ShowInterstitial {
            on_closed: Box::new(move || {
                let _ = closed_tx.send(());
            }),
            shown: Some(shown_tx),
        })?;
        let shown = shown_rx.await.map_err(|_| ServiceError::Stopped)?;
        closed_rx.await.map_err(|_| self.dropped())?;
        Ok(shown)
    }

    /// Callback form of [`show_interstitial`](Self::show_interstitial). The
    /// callback runs on the service task.
    pub fn show_interstitial_with(
        &self,
        on_closed: impl FnOnce() + Send + 'static,
    ) -> Result<(), ServiceError> {
        self.send(Command::ShowInterstitial {
            on_closed: Box::new(on_closed),
            shown: None,
        })
    }

    pub async fn load_rewarded(&self) -> Result<bool, ServiceError> {
        let (tx, rx) = oneshot::channel();
        self.load_rewarded_with(move |loaded| {
            let _ = tx.send(loaded);
        })?;
        rx.await.map_err(|_| self.dropped())
    }

    pub fn load_rewarded_with(
        &self,
        on_loaded: impl FnOnce(bool) + Send + 'static,
    ) -> Result<(), ServiceError> {
        self.send(Command::LoadRewarded(Box::new(on_loaded)))
    }

    pub async fn show_rewarded(&self) -> Result<RewardOutcome, ServiceError> {
        let (tx, rx) = oneshot::channel();
        self.show_rewarded_with(move |outcome| {
            let _ = tx.send(outcome);
        })?;
        rx.await.map_err(|_| self.dropped())
    }

    pub fn show_rewarded_with(
        &self,
        on_finished: impl FnOnce(RewardOutcome) + Send + 'static,
    ) -> Result<(), ServiceError> {
        self.send(Command::ShowRewarded(Box::new(on_finished)))
    }

    pub async fn is_rewarded_available(&self) -> Result<bool, ServiceError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::IsRewardedAvailable(tx))?;
        rx.await.map_err(|_| ServiceError::Stopped)
    }

    pub fn show_banner(&self) -> Result<(), ServiceError> {
        self.send(Command::ShowBanner)
    }

    pub fn hide_banner(&self) -> Result<(), ServiceError> {
        self.send(Command::HideBanner)
    }

    pub fn destroy_banner(&self) -> Result<(), ServiceError> {
        self.send(Command::DestroyBanner)
    }

    pub async fn status(&self) -> Result<MediatorStatus, ServiceError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Status(tx))?;
        rx.await.map_err(|_| ServiceError::Stopped)
    }

    /// Stop the service loop. Pending requests resolve with
    /// [`ServiceError::Stopped`], even if the caller keeps the mediator
    /// returned by the join handle.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.tx.is_closed()
    }
}

impl std::fmt::Debug for MediatorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediatorHandle")
            .field("stopped", &self.tx.is_closed())
            .field("shutdown_requested", &self.shutdown.is_cancelled())
            .finish()
    }
}

/// Move `mediator` onto a new task. The join handle yields the mediator back
/// once the loop stops (shutdown, or every handle dropped).
pub fn spawn(mediator: AdMediator, shutdown: CancellationToken) -> (MediatorHandle, JoinHandle<AdMediator>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = MediatorHandle {
        tx,
        shutdown: shutdown.clone(),
    };
    let task = tokio::spawn(run_service_loop(mediator, rx, shutdown));
    (handle, task)
}

async fn run_service_loop(
    mut mediator: AdMediator,
    mut commands: mpsc::UnboundedReceiver<Command>,
    shutdown: CancellationToken,
) -> AdMediator {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<(ProviderKind, ProviderEvent)>();

    let mut forwarders = Vec::new();
    for (provider, mut rx) in mediator.take_event_receivers() {
        let tx = event_tx.clone();
        forwarders.push(tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if tx.send((provider, event)).is_err() {
                    break;
                }
            }
            tracing::debug!(%provider, "Provider event forwarder exiting");
        }));
    }
    drop(event_tx);

    tracing::info!(providers = forwarders.len(), "Mediation service started");

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                tracing::info!("Mediation service shutting down");
                break;
            }

            Some((provider, event)) = event_rx.recv() => {
                mediator.handle_event(provider, event);
            }

            command = commands.recv() => match command {
                Some(command) => apply(&mut mediator, command),
                None => {
                    tracing::info!("All mediator handles dropped, stopping service");
                    break;
                }
            },
        }
    }

    commands.close();
    mediator.release_callbacks();
    for forwarder in forwarders {
        forwarder.abort();
    }
    mediator
}

fn apply(mediator: &mut AdMediator, command: Command) {
    tracing::trace!(command = command.name(), "Applying command");
    match command {
        Command::Init(reply) => {
            let (ready_tx, ready_rx) = oneshot::channel();
            let result = mediator
                .init(move || {
                    let _ = ready_tx.send(());
                })
                .map(|()| ready_rx);
            if let Err(err) = &result {
                tracing::error!(error = %err, "Mediator init failed");
            }
            let _ = reply.send(result);
        }
        Command::LoadInterstitial => mediator.load_interstitial(),
        Command::ShowInterstitial { on_closed, shown } => {
            let delegated = mediator.show_interstitial(on_closed);
            if let Some(shown) = shown {
                let _ = shown.send(delegated);
            }
        }
        Command::LoadRewarded(on_loaded) => mediator.load_rewarded(on_loaded),
        Command::ShowRewarded(on_finished) => mediator.show_rewarded(on_finished),
        Command::IsRewardedAvailable(reply) => {
            let _ = reply.send(mediator.is_rewarded_available());
        }
        Command::ShowBanner => mediator.show_banner(),
        Command::HideBanner => mediator.hide_banner(),
        Command::DestroyBanner => mediator.destroy_banner(),
        Command::Status(reply) => {
            let _ = reply.send(mediator.status());
        }
    }
}
