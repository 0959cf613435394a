//! Terminal presenter for offline mode: the answer is typed on stdin.

use std::sync::{Arc, Mutex};

use admediator::{MockAdRequest, MockPresenter, MockResolution, RewardOutcome};

/// Holds at most one open presentation. A second one replaces (and thereby
/// resolves) the first.
#[derive(Clone, Default)]
pub struct PromptPresenter {
    pending: Arc<Mutex<Option<MockResolution>>>,
}

impl PromptPresenter {
    /// Returns `false` when nothing is waiting for an answer.
    pub fn resolve(&self, outcome: RewardOutcome) -> bool {
        let resolution = self.pending.lock().ok().and_then(|mut pending| pending.take());
        match resolution {
            Some(resolution) => {
                resolution.resolve_with(outcome);
                true
            }
            None => false,
        }
    }
}

impl MockPresenter for PromptPresenter {
    fn present(&mut self, request: MockAdRequest, resolution: MockResolution) {
        let [full, partial] = request.choices();
        println!(
            "[mock {}] {} ad at {}: type 'full' ({full}) or 'partial' ({partial})",
            request.id, request.slot, request.placement
        );
        let replaced = match self.pending.lock() {
            Ok(mut pending) => pending.replace(resolution),
            Err(_) => {
                tracing::error!("Prompt state poisoned, resolving immediately");
                Some(resolution)
            }
        };
        drop(replaced);
    }
}
