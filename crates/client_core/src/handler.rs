use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info};

use crate::{error::FetchError, target::OptionListTarget, transport::OptionsSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The option list now holds exactly `count` freshly fetched entries.
    Applied { count: usize },
    /// The server answered with a non-2xx status. The option list is untouched.
    Rejected { status: u16 },
    /// Network, decode or option-list failure. The option list is untouched.
    Failed { reason: String },
    /// A later change started before this response arrived, so the response
    /// was dropped.
    Superseded,
}

impl RefreshOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Refreshes one option list whenever the API-key field is committed.
///
/// Every call to [`handle_change`](Self::handle_change) takes a new generation
/// number. Overlapping calls are not cancelled, but only the newest one may
/// write to the option list; older responses resolve to
/// [`RefreshOutcome::Superseded`].
///
/// The generation check and the write happen under one lock, so a newer call
/// cannot start between them.
pub struct ApiKeyChangeHandler<S, T> {
    source: S,
    target: T,
    latest: Mutex<u64>,
}

impl<S, T> ApiKeyChangeHandler<S, T>
where
    S: OptionsSource,
    T: OptionListTarget,
{
    pub fn new(source: S, target: T) -> Self {
        Self {
            source,
            target,
            latest: Mutex::new(0),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn generation(&self) -> u64 {
        *self.latest()
    }

    // A target that panics mid-write poisons the lock; the counter is still valid.
    fn latest(&self) -> MutexGuard<'_, u64> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_generation(&self) -> u64 {
        let mut latest = self.latest();
        *latest += 1;
        *latest
    }

    pub async fn handle_change(&self, api_key: &str) -> RefreshOutcome {
        let generation = self.next_generation();

        let options = match self.source.fetch_options(api_key).await {
            Ok(options) => options,
            Err(FetchError::Status { status }) => {
                error!(status, generation, "failed to retrieve options");
                return RefreshOutcome::Rejected { status };
            }
            Err(err) => {
                error!(error = %err, generation, "error fetching options");
                return RefreshOutcome::Failed {
                    reason: err.to_string(),
                };
            }
        };

        let latest = self.latest();
        if *latest != generation {
            debug!(
                generation,
                latest = *latest,
                discarded = options.len(),
                "options response superseded by a newer change"
            );
            return RefreshOutcome::Superseded;
        }

        let applied = self.target.replace_options(&options);
        drop(latest);
        if let Err(err) = applied {
            error!(error = %err, generation, "error applying options");
            return RefreshOutcome::Failed {
                reason: err.to_string(),
            };
        }

        info!(count = options.len(), generation, "options applied");
        RefreshOutcome::Applied {
            count: options.len(),
        }
    }
}

#[cfg(test)]
#[path = "tests/handler_tests.rs"]
mod tests;
