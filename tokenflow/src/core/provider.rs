//! # Network Provider Seam
//!
//! [`NetworkProvider`] decouples the submission pipeline from the concrete
//! gateway client. The production implementation is
//! [`GatewayClient`](super::gateway::GatewayClient); tests drive the
//! pipeline through `testing::MockProvider` (feature `test-utils`).
//!
//! ## Contract
//!
//! - Implementations do not retry. Retry belongs to the submitter and the
//!   confirmation tracker.
//! - `get_transaction` returns `Ok(None)` while the network has not indexed
//!   the hash yet. That is not an error.
//! - Transport failures surface as `Error::NetworkUnavailable`.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{AccountOnNetwork, Address, Transaction, TransactionOnNetwork};

#[async_trait]
pub trait NetworkProvider: Send + Sync {
    /// Current nonce and balance of `address`.
    async fn get_account(&self, address: &Address) -> Result<AccountOnNetwork>;

    /// Sends one signed transaction and returns its hash.
    async fn send_transaction(&self, tx: &Transaction) -> Result<String>;

    /// Sends signed transactions in one request. The call either succeeds as
    /// a whole (returning one hash per accepted transaction, in input order)
    /// or fails as a whole.
    async fn send_transactions(&self, txs: &[Transaction]) -> Result<Vec<String>>;

    /// Status and events of `hash`, or `None` if not yet visible.
    async fn get_transaction(&self, hash: &str) -> Result<Option<TransactionOnNetwork>>;
}
