//! # Confirmation Tracker
//!
//! Polls the network for the outcome of a submitted transaction hash.
//!
//! ## State Machine
//!
//! ```text
//!  Unseen --(visible)--> Pending --(poll)--> Pending ...
//!    |                      |
//!    | (visible, final)     +--> Successful | Failed
//!    v
//!  Successful | Failed
//! ```
//!
//! - **Visibility phase:** sleep `visibility_delay`, query. Errors and
//!   `None` both mean "not indexed yet". After `visibility_attempts` queries
//!   without a result the outcome is `NotFound`.
//! - **Pending phase:** sleep `pending_delay`, query, until the status is
//!   final or `max_pending_polls` polls ran out (`StillPending`, reported
//!   as `Error::NotFound` by [`ConfirmationOutcome::into_result`]).
//!
//! The tracker never raises for these outcomes and never resubmits.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::provider::NetworkProvider;
use super::retry::Sleeper;
use crate::config::ConfirmationConfig;
use crate::error::{Error, Result};
use crate::model::{TransactionOnNetwork, TransactionStatus};

/// Where a tracked transaction currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    Unseen,
    Pending,
    Successful,
    Failed,
}

impl TxState {
    fn from_status(status: TransactionStatus) -> Self {
        match status {
            TransactionStatus::Pending => TxState::Pending,
            TransactionStatus::Successful => TxState::Successful,
            TransactionStatus::Failed => TxState::Failed,
        }
    }

    pub fn is_final(self) -> bool {
        matches!(self, TxState::Successful | TxState::Failed)
    }
}

/// Terminal result of tracking one hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    Successful { tx: TransactionOnNetwork, polls: u32 },
    Failed { tx: TransactionOnNetwork, polls: u32 },
    /// Never became visible within the visibility budget.
    NotFound { hash: String, attempts: u32 },
    /// Visible but still pending when the pending ceiling was reached.
    StillPending { hash: String, polls: u32 },
}

impl ConfirmationOutcome {
    /// Number of status queries it took to reach this outcome.
    pub fn polls(&self) -> u32 {
        match self {
            Self::Successful { polls, .. }
            | Self::Failed { polls, .. }
            | Self::StillPending { polls, .. } => *polls,
            Self::NotFound { attempts, .. } => *attempts,
        }
    }

    pub fn state(&self) -> TxState {
        match self {
            Self::Successful { .. } => TxState::Successful,
            Self::Failed { .. } => TxState::Failed,
            Self::NotFound { .. } => TxState::Unseen,
            Self::StillPending { .. } => TxState::Pending,
        }
    }

    pub fn is_successful(&self) -> bool {
        matches!(self, Self::Successful { .. })
    }

    /// Converts every non-successful outcome into its error.
    pub fn into_result(self) -> Result<TransactionOnNetwork> {
        match self {
            Self::Successful { tx, .. } => Ok(tx),
            Self::Failed { tx, .. } => Err(Error::TransactionFailed {
                hash: tx.hash,
                status: tx.raw_status,
            }),
            Self::NotFound { hash, attempts } => Err(Error::NotFound { hash, attempts }),
            // Unresolved, not failed: the hash may still settle later.
            Self::StillPending { hash, polls } => Err(Error::NotFound { hash, attempts: polls }),
        }
    }
}

pub struct ConfirmationTracker {
    provider: Arc<dyn NetworkProvider>,
    sleeper: Arc<dyn Sleeper>,
    visibility_attempts: u32,
    visibility_delay: Duration,
    pending_delay: Duration,
    max_pending_polls: u32,
}

impl ConfirmationTracker {
    pub fn new(
        provider: Arc<dyn NetworkProvider>,
        sleeper: Arc<dyn Sleeper>,
        config: &ConfirmationConfig,
    ) -> Self {
        Self {
            provider,
            sleeper,
            visibility_attempts: config.visibility_attempts.max(1),
            visibility_delay: Duration::from_millis(config.visibility_delay_ms),
            pending_delay: Duration::from_millis(config.pending_delay_ms),
            max_pending_polls: config.max_pending_polls,
        }
    }

    /// Tracks `hash` until it reaches a terminal outcome.
    pub async fn await_outcome(&self, hash: &str) -> ConfirmationOutcome {
        let mut polls = 0;

        let mut tx = loop {
            if polls >= self.visibility_attempts {
                warn!("⚠️ Transaction {} not found after {} attempts", hash, polls);
                return ConfirmationOutcome::NotFound {
                    hash: hash.to_string(),
                    attempts: polls,
                };
            }
            self.sleeper.sleep(self.visibility_delay).await;
            polls += 1;
            match self.provider.get_transaction(hash).await {
                Ok(Some(found)) => break found,
                Ok(None) => debug!(
                    "Transaction {} not visible yet ({}/{})",
                    hash, polls, self.visibility_attempts
                ),
                Err(e) => debug!(
                    "Status query for {} failed ({}/{}): {}",
                    hash, polls, self.visibility_attempts, e
                ),
            }
        };
        let mut pending_polls = 0;

        while !TxState::from_status(tx.status).is_final() {
            if pending_polls >= self.max_pending_polls {
                warn!("⚠️ Transaction {} still pending after {} polls, giving up", hash, polls);
                return ConfirmationOutcome::StillPending {
                    hash: hash.to_string(),
                    polls,
                };
            }
            debug!("⏳ Transaction {} pending, checking again in {:?}", hash, self.pending_delay);
            self.sleeper.sleep(self.pending_delay).await;
            polls += 1;
            pending_polls += 1;
            match self.provider.get_transaction(hash).await {
                Ok(Some(updated)) => tx = updated,
                Ok(None) => debug!("Transaction {} temporarily not visible, still pending", hash),
                Err(e) => debug!("Status query for {} failed while pending: {}", hash, e),
            }
        }

        match tx.status {
            TransactionStatus::Successful => {
                info!("✅ Transaction {} successful after {} polls", hash, polls);
                ConfirmationOutcome::Successful { tx, polls }
            }
            _ => {
                warn!("❌ Transaction {} failed with status '{}'", hash, tx.raw_status);
                ConfirmationOutcome::Failed { tx, polls }
            }
        }
    }
}

/// Extracts the identifier of a freshly issued token: the first topic of
/// the `issue` event.
pub fn issued_token_identifier(tx: &TransactionOnNetwork) -> Option<String> {
    tx.find_event("issue")
        .and_then(|event| event.topic_str(0))
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{issue_result, MockProvider, RecordingSleeper};

    fn tracker(provider: Arc<MockProvider>, sleeper: Arc<RecordingSleeper>) -> ConfirmationTracker {
        ConfirmationTracker::new(provider, sleeper, &ConfirmationConfig::default())
    }

    #[tokio::test]
    async fn pending_twice_then_successful_takes_three_polls() {
        let provider = Arc::new(MockProvider::new());
        provider.push_status("h1", Some(TransactionStatus::Pending));
        provider.push_status("h1", Some(TransactionStatus::Pending));
        provider.push_status("h1", Some(TransactionStatus::Successful));
        let sleeper = Arc::new(RecordingSleeper::default());

        let outcome = tracker(provider.clone(), sleeper.clone()).await_outcome("h1").await;

        assert_eq!(outcome.state(), TxState::Successful);
        assert_eq!(outcome.polls(), 3);
        assert_eq!(provider.status_calls(), 3);
        assert_eq!(
            sleeper.recorded(),
            vec![Duration::from_secs(3), Duration::from_secs(5), Duration::from_secs(5)]
        );
    }

    #[tokio::test]
    async fn never_visible_is_not_found() {
        let provider = Arc::new(MockProvider::new());
        let sleeper = Arc::new(RecordingSleeper::default());

        let outcome = tracker(provider.clone(), sleeper.clone()).await_outcome("ghost").await;

        assert!(matches!(outcome, ConfirmationOutcome::NotFound { attempts: 10, .. }));
        assert_eq!(outcome.state(), TxState::Unseen);
        assert_eq!(provider.status_calls(), 10);
        assert_eq!(sleeper.recorded(), vec![Duration::from_secs(3); 10]);
        assert!(matches!(outcome.into_result(), Err(Error::NotFound { attempts: 10, .. })));
    }

    #[tokio::test]
    async fn query_errors_during_visibility_are_tolerated() {
        let provider = Arc::new(MockProvider::new());
        provider.push_status_error("h2");
        provider.push_status("h2", None);
        provider.push_status("h2", Some(TransactionStatus::Successful));

        let outcome = tracker(provider.clone(), Arc::new(RecordingSleeper::default()))
            .await_outcome("h2")
            .await;

        assert!(outcome.is_successful());
        assert_eq!(outcome.polls(), 3);
    }

    #[tokio::test]
    async fn failed_is_distinct_from_not_found() {
        let provider = Arc::new(MockProvider::new());
        provider.push_status("bad", Some(TransactionStatus::Failed));

        let tracker = tracker(provider, Arc::new(RecordingSleeper::default()));
        let outcome = tracker.await_outcome("bad").await;

        assert_eq!(outcome.state(), TxState::Failed);
        assert!(matches!(outcome.into_result(), Err(Error::TransactionFailed { .. })));
    }

    #[tokio::test]
    async fn pending_ceiling_yields_still_pending() {
        let provider = Arc::new(MockProvider::new());
        for _ in 0..10 {
            provider.push_status("slow", Some(TransactionStatus::Pending));
        }
        let config = ConfirmationConfig {
            max_pending_polls: 4,
            ..ConfirmationConfig::default()
        };
        let sleeper = Arc::new(RecordingSleeper::default());
        let tracker = ConfirmationTracker::new(provider.clone(), sleeper, &config);

        let outcome = tracker.await_outcome("slow").await;

        assert!(matches!(outcome, ConfirmationOutcome::StillPending { polls: 5, .. }));
        assert_eq!(outcome.state(), TxState::Pending);
        assert_eq!(provider.status_calls(), 5);
        assert!(matches!(
            outcome.into_result(),
            Err(Error::NotFound { ref hash, attempts: 5 }) if hash == "slow"
        ));
    }

    #[tokio::test]
    async fn pending_never_regresses_to_unseen() {
        let provider = Arc::new(MockProvider::new());
        provider.push_status("h3", Some(TransactionStatus::Pending));
        provider.push_status("h3", None);
        provider.push_status("h3", Some(TransactionStatus::Successful));

        let tracker = tracker(provider, Arc::new(RecordingSleeper::default()));
        let outcome = tracker.await_outcome("h3").await;

        assert!(outcome.is_successful());
        assert_eq!(outcome.polls(), 3);
    }

    #[test]
    fn extracts_issued_identifier_from_issue_event() {
        let tx = issue_result("h", "WINTER-1a2b3c");
        assert_eq!(issued_token_identifier(&tx).as_deref(), Some("WINTER-1a2b3c"));

        let without = TransactionOnNetwork {
            events: Vec::new(),
            ..tx
        };
        assert_eq!(issued_token_identifier(&without), None);
    }
}
