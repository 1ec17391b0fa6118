//! # Transaction Submitter
//!
//! Signs transactions with sequencer-issued nonces and pushes them to the
//! network, one at a time or in batches.
//!
//! ## Flow
//!
//! 1.  **Sign:** [`TransactionSubmitter::sign`] stamps the next nonce,
//!     computes the canonical signing bytes and attaches the signature. The
//!     nonce is only consumed once signing succeeded, so a signer failure
//!     never leaves a gap.
//!
//! 2.  **Send:** single sends and batch sends both run under the shared
//!     [`RetryPolicy`]. Exhausting it yields `RetryLimitExceeded`.
//!
//! 3.  **Distribute:** [`TransactionSubmitter::submit_all`] splits a signed
//!     stream into batches of `batch_size`, sends them in order, and stops at
//!     the first batch that cannot be delivered. Batches already sent stay
//!     sent; the [`BatchReport`] says how far it got.

use std::sync::Arc;
use tracing::{debug, error, info};

use super::nonce_sequencer::NonceSequencer;
use super::provider::NetworkProvider;
use super::retry::{RetryPolicy, Sleeper};
use crate::config::SubmissionConfig;
use crate::error::{Error, Result};
use crate::model::Transaction;
use crate::wallet::Signer;

/// Outcome of a batched distribution.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub batches_total: usize,
    pub batches_sent: usize,
    pub transactions_sent: usize,
    pub hashes: Vec<String>,
    /// Why the remaining batches were abandoned, if they were.
    pub failure: Option<Error>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none() && self.batches_sent == self.batches_total
    }
}

/// Splits `items` into consecutive batches of at most `batch_size`.
pub fn split_batches<T>(items: &[T], batch_size: usize) -> std::slice::Chunks<'_, T> {
    items.chunks(batch_size.max(1))
}

pub struct TransactionSubmitter {
    provider: Arc<dyn NetworkProvider>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
    batch_size: usize,
}

impl TransactionSubmitter {
    pub fn new(
        provider: Arc<dyn NetworkProvider>,
        sleeper: Arc<dyn Sleeper>,
        config: &SubmissionConfig,
    ) -> Self {
        Self::with_policy(provider, sleeper, config.retry_policy(), config.batch_size)
    }

    pub fn with_policy(
        provider: Arc<dyn NetworkProvider>,
        sleeper: Arc<dyn Sleeper>,
        policy: RetryPolicy,
        batch_size: usize,
    ) -> Self {
        Self {
            provider,
            sleeper,
            policy,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Assigns the sequencer's next nonce to `tx` and signs it.
    pub fn sign(
        mut tx: Transaction,
        sequencer: &mut NonceSequencer,
        signer: &dyn Signer,
    ) -> Result<Transaction> {
        if &tx.sender != sequencer.address() || &tx.sender != signer.address() {
            return Err(Error::Signing(format!(
                "sender {} does not match sequencer {} / signer {}",
                tx.sender,
                sequencer.address(),
                signer.address()
            )));
        }
        tx.nonce = sequencer.peek();
        tx.signature = None;
        let bytes = tx.signing_bytes()?;
        tx.signature = Some(signer.sign(&bytes)?);
        sequencer.current();
        Ok(tx)
    }

    /// Sends one signed transaction, retrying transient failures.
    pub async fn submit(&self, tx: &Transaction) -> Result<String> {
        if !tx.is_signed() {
            return Err(Error::InvalidBatch(format!(
                "transaction with nonce {} is not signed",
                tx.nonce
            )));
        }
        let provider = self.provider.as_ref();
        let operation = format!("send transaction nonce {}", tx.nonce);
        let hash = self
            .policy
            .run(self.sleeper.as_ref(), &operation, move || provider.send_transaction(tx))
            .await?;
        info!("📤 Transaction sent: {}", hash);
        Ok(hash)
    }

    /// Sends one batch as a single request. All transactions must be signed
    /// and share a sender.
    pub async fn submit_batch(&self, batch: &[Transaction]) -> Result<Vec<String>> {
        validate_batch(batch, self.batch_size)?;
        let provider = self.provider.as_ref();
        let operation = format!(
            "send batch of {} (nonces {}..={})",
            batch.len(),
            batch.first().map_or(0, |t| t.nonce),
            batch.last().map_or(0, |t| t.nonce)
        );
        self.policy
            .run(self.sleeper.as_ref(), &operation, move || provider.send_transactions(batch))
            .await
    }

    /// Sends `txs` batch by batch, in order, stopping at the first batch that
    /// fails for good.
    pub async fn submit_all(&self, txs: &[Transaction]) -> BatchReport {
        let mut report = BatchReport {
            batches_total: split_batches(txs, self.batch_size).len(),
            ..BatchReport::default()
        };

        for (index, batch) in split_batches(txs, self.batch_size).enumerate() {
            match self.submit_batch(batch).await {
                Ok(hashes) => {
                    report.batches_sent += 1;
                    report.transactions_sent += batch.len();
                    report.hashes.extend(hashes);
                    info!(
                        "Batch {}/{} sent ({} / {} transactions)",
                        index + 1,
                        report.batches_total,
                        report.transactions_sent,
                        txs.len()
                    );
                }
                Err(e) => {
                    error!(
                        "❌ Batch {}/{} failed: {}. Abandoning remaining batches.",
                        index + 1,
                        report.batches_total,
                        e
                    );
                    report.failure = Some(e);
                    break;
                }
            }
        }

        debug!("Distribution report: {:?}", report);
        report
    }
}

fn validate_batch(batch: &[Transaction], max_size: usize) -> Result<()> {
    let Some(first) = batch.first() else {
        return Err(Error::InvalidBatch("empty batch".into()));
    };
    if batch.len() > max_size {
        return Err(Error::InvalidBatch(format!(
            "{} transactions exceed batch size {}",
            batch.len(),
            max_size
        )));
    }
    if let Some(tx) = batch.iter().find(|t| t.sender != first.sender) {
        return Err(Error::InvalidBatch(format!(
            "batch mixes senders {} and {}",
            first.sender, tx.sender
        )));
    }
    if let Some(tx) = batch.iter().find(|t| !t.is_signed()) {
        return Err(Error::InvalidBatch(format!(
            "transaction with nonce {} is not signed",
            tx.nonce
        )));
    }
    Ok(())
}
