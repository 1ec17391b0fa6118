//! # Test Utilities
//!
//! Scriptable in-memory fakes for the network seams, shared by the unit
//! tests and the integration tests under `tests/`.
//!
//! - [`MockProvider`]: accounts, scripted send failures and per-hash status
//!   queues. Every call is counted.
//! - [`MockPages`]: a page source returning scripted pages in call order.
//! - [`RecordingSleeper`]: returns at once and records every requested delay.

use async_trait::async_trait;
use num_bigint::BigUint;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use crate::core::provider::NetworkProvider;
use crate::core::retry::Sleeper;
use crate::error::{Error, Result};
use crate::fetcher::{PageSource, Pagination};
use crate::model::{
    AccountOnNetwork, Address, Transaction, TransactionEvent, TransactionOnNetwork,
    TransactionStatus,
};
use crate::wallet::Signer;

/// Sleeper that never sleeps.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        self.delays.lock().clone()
    }

    pub fn total(&self) -> Duration {
        self.delays.lock().iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().push(duration);
    }
}

type StatusReply = Result<Option<TransactionOnNetwork>>;

#[derive(Default)]
struct ProviderState {
    accounts: HashMap<Address, AccountOnNetwork>,
    send_failures: u32,
    batch_script: VecDeque<bool>,
    statuses: HashMap<String, VecDeque<StatusReply>>,
    sent: Vec<Transaction>,
    batch_sizes: Vec<usize>,
    send_calls: u32,
    batch_calls: u32,
    status_calls: u32,
}

impl ProviderState {
    /// Records `tx` and moves its sender's on-chain nonce past it.
    fn accept(&mut self, tx: &Transaction) {
        if let Some(account) = self.accounts.get_mut(&tx.sender) {
            account.nonce = account.nonce.max(tx.nonce + 1);
        }
        self.sent.push(tx.clone());
    }
}

/// In-memory [`NetworkProvider`].
///
/// Hashes are deterministic: `{sender}:{nonce}` (see [`MockProvider::hash_for`]).
/// A hash with no scripted status replies `None`, i.e. "not visible yet".
/// Accepted transactions advance the sender's account nonce.
#[derive(Default)]
pub struct MockProvider {
    state: Mutex<ProviderState>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hash_for(tx: &Transaction) -> String {
        format!("{}:{}", tx.sender, tx.nonce)
    }

    pub fn set_account(&self, address: &Address, nonce: u64) {
        self.state.lock().accounts.insert(
            address.clone(),
            AccountOnNetwork {
                address: address.clone(),
                nonce,
                balance: BigUint::from(0u32),
            },
        );
    }

    /// The next `count` single sends fail with `NetworkUnavailable`.
    pub fn fail_sends(&self, count: u32) {
        self.state.lock().send_failures = count;
    }

    /// The next `ok` batch sends succeed, then `failures` fail.
    pub fn fail_batches_after(&self, ok: usize, failures: usize) {
        let mut state = self.state.lock();
        state.batch_script.extend(std::iter::repeat(true).take(ok));
        state.batch_script.extend(std::iter::repeat(false).take(failures));
    }

    /// Queues a reply for the next status query of `hash`. `None` means the
    /// hash is not visible yet.
    pub fn push_status(&self, hash: &str, status: Option<TransactionStatus>) {
        let reply = status.map(|s| status_only(hash, s));
        self.push_reply(hash, Ok(reply));
    }

    /// Queues a complete transaction (with events) as the next reply.
    pub fn push_transaction(&self, tx: TransactionOnNetwork) {
        let hash = tx.hash.clone();
        self.push_reply(&hash, Ok(Some(tx)));
    }

    pub fn push_status_error(&self, hash: &str) {
        self.push_reply(hash, Err(Error::NetworkUnavailable("status endpoint down".into())));
    }

    fn push_reply(&self, hash: &str, reply: StatusReply) {
        self.state.lock().statuses.entry(hash.to_string()).or_default().push_back(reply);
    }

    /// Every transaction accepted so far, in send order.
    pub fn sent(&self) -> Vec<Transaction> {
        self.state.lock().sent.clone()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.state.lock().batch_sizes.clone()
    }

    pub fn send_calls(&self) -> u32 {
        self.state.lock().send_calls
    }

    pub fn batch_calls(&self) -> u32 {
        self.state.lock().batch_calls
    }

    pub fn status_calls(&self) -> u32 {
        self.state.lock().status_calls
    }
}

fn status_only(hash: &str, status: TransactionStatus) -> TransactionOnNetwork {
    let raw = match status {
        TransactionStatus::Pending => "pending",
        TransactionStatus::Successful => "success",
        TransactionStatus::Failed => "fail",
    };
    TransactionOnNetwork {
        hash: hash.to_string(),
        status,
        raw_status: raw.to_string(),
        events: Vec::new(),
    }
}

#[async_trait]
impl NetworkProvider for MockProvider {
    async fn get_account(&self, address: &Address) -> Result<AccountOnNetwork> {
        self.state.lock().accounts.get(address).cloned().ok_or_else(|| Error::Provider {
            status: 404,
            message: format!("account {address} not found"),
        })
    }

    async fn send_transaction(&self, tx: &Transaction) -> Result<String> {
        let mut state = self.state.lock();
        state.send_calls += 1;
        if state.send_failures > 0 {
            state.send_failures -= 1;
            return Err(Error::NetworkUnavailable("connection reset".into()));
        }
        state.accept(tx);
        Ok(Self::hash_for(tx))
    }

    async fn send_transactions(&self, txs: &[Transaction]) -> Result<Vec<String>> {
        let mut state = self.state.lock();
        state.batch_calls += 1;
        if !state.batch_script.pop_front().unwrap_or(true) {
            return Err(Error::Provider {
                status: 503,
                message: "gateway overloaded".into(),
            });
        }
        state.batch_sizes.push(txs.len());
        txs.iter().for_each(|tx| state.accept(tx));
        Ok(txs.iter().map(Self::hash_for).collect())
    }

    async fn get_transaction(&self, hash: &str) -> Result<Option<TransactionOnNetwork>> {
        let mut state = self.state.lock();
        state.status_calls += 1;
        state
            .statuses
            .get_mut(hash)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Ok(None))
    }
}

/// Page source replaying scripted pages in call order, then `None`.
pub struct MockPages<T> {
    replies: Mutex<VecDeque<Result<Option<Vec<T>>>>>,
    requests: Mutex<Vec<Pagination>>,
}

impl<T> MockPages<T> {
    pub fn new(pages: Vec<Vec<T>>) -> Self {
        Self {
            replies: Mutex::new(pages.into_iter().map(|p| Ok(Some(p))).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Makes the next `count` requests fail before the scripted pages resume.
    pub fn fail_next(&self, count: usize) {
        let mut replies = self.replies.lock();
        for _ in 0..count {
            replies.push_front(Err(Error::NetworkUnavailable("page request timed out".into())));
        }
    }

    pub fn requests(&self) -> Vec<Pagination> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl<T: Send> PageSource for MockPages<T> {
    type Item = T;

    fn describe(&self) -> String {
        "mock pages".to_string()
    }

    async fn fetch_page(&self, page: Pagination) -> Result<Option<Vec<T>>> {
        self.requests.lock().push(page);
        self.replies.lock().pop_front().unwrap_or(Ok(None))
    }
}

/// Signer producing a fixed, recognisable signature.
#[derive(Debug, Clone)]
pub struct StaticSigner {
    address: Address,
}

impl StaticSigner {
    pub fn new(address: Address) -> Self {
        Self { address }
    }
}

impl Signer for StaticSigner {
    fn address(&self) -> &Address {
        &self.address
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        let mut signature = vec![0x5a; 64];
        signature[0] = message.len() as u8;
        Ok(signature)
    }
}

/// An unsigned 1-unit ESDT-style transfer from `sender` to `receiver`.
pub fn sample_transfer(sender: &Address, receiver: &Address) -> Transaction {
    Transaction {
        nonce: 0,
        value: BigUint::from(0u32),
        sender: sender.clone(),
        receiver: receiver.clone(),
        gas_price: 1_000_000_000,
        gas_limit: 500_000,
        data: b"ESDTTransfer@57494e544552@01".to_vec(),
        chain_id: "D".to_string(),
        version: 2,
        signature: None,
    }
}

/// A successful issue transaction whose `issue` event names `identifier`.
pub fn issue_result(hash: &str, identifier: &str) -> TransactionOnNetwork {
    TransactionOnNetwork {
        hash: hash.to_string(),
        status: TransactionStatus::Successful,
        raw_status: "success".to_string(),
        events: vec![TransactionEvent {
            identifier: "issue".to_string(),
            address: "erd1qqqqqqqqqqqqqqqpqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqzllls8a5w6u".to_string(),
            topics: vec![identifier.as_bytes().to_vec(), b"WinterIsComing".to_vec()],
        }],
    }
}
