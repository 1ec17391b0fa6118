//! # Gateway Client - Transaction Path to the Network
//!
//! HTTP client for the network gateway (proxy). It implements
//! [`NetworkProvider`] on top of `reqwest`:
//!
//! | Operation           | Endpoint                                   |
//! |---------------------|--------------------------------------------|
//! | account lookup      | `GET  /address/{bech32}`                   |
//! | single send         | `POST /transaction/send`                   |
//! | batch send          | `POST /transaction/send-multiple`          |
//! | status + events     | `GET  /transaction/{hash}?withResults=true`|
//!
//! Every gateway response is wrapped in an envelope
//! `{ "data": ..., "error": "...", "code": "..." }`. Non-2xx statuses become
//! `Error::Provider`; transport failures become `Error::NetworkUnavailable`.
//! A transaction the gateway does not know yet is `Ok(None)`.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::provider::NetworkProvider;
use crate::config::NetworkConfig;
use crate::error::{Error, Result};
use crate::model::{
    AccountOnNetwork, Address, Transaction, TransactionEvent, TransactionOnNetwork,
    TransactionStatus,
};

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    error: String,
}

#[derive(Debug, Deserialize)]
struct AccountData {
    account: GatewayAccount,
}

#[derive(Debug, Deserialize)]
struct GatewayAccount {
    address: String,
    nonce: u64,
    balance: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendData {
    tx_hash: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMultipleData {
    num_of_sent_txs: usize,
    #[serde(default)]
    txs_hashes: BTreeMap<usize, String>,
}

#[derive(Debug, Deserialize)]
struct TransactionData {
    transaction: GatewayTransaction,
}

#[derive(Debug, Deserialize)]
struct GatewayTransaction {
    status: String,
    #[serde(default)]
    logs: Option<GatewayLogs>,
}

#[derive(Debug, Deserialize)]
struct GatewayLogs {
    #[serde(default)]
    events: Vec<GatewayEvent>,
}

#[derive(Debug, Deserialize)]
struct GatewayEvent {
    identifier: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    topics: Option<Vec<Option<String>>>,
}

/// `reqwest`-backed gateway client.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    base_url: String,
    client: Client,
}

impl GatewayClient {
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        let base_url = config.gateway_url.trim_end_matches('/').to_string();
        info!("🌐 Gateway client initialized for {}", base_url);
        Ok(Self { base_url, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Reads a gateway response: non-2xx is a provider error, 2xx must carry
/// `data`.
async fn read_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(Error::Provider {
            status: status.as_u16(),
            message: envelope_error(&body),
        });
    }
    let envelope: Envelope<T> = serde_json::from_str(&body)
        .map_err(|e| Error::InvalidResponse(format!("{e}: {}", truncate(&body))))?;
    envelope
        .data
        .ok_or_else(|| Error::InvalidResponse(format!("response without data: {}", envelope.error)))
}

fn envelope_error(body: &str) -> String {
    serde_json::from_str::<Envelope<serde_json::Value>>(body)
        .ok()
        .map(|e| e.error)
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| truncate(body))
}

fn truncate(body: &str) -> String {
    body.chars().take(200).collect()
}

fn parse_account(account: GatewayAccount) -> Result<AccountOnNetwork> {
    let balance = account
        .balance
        .parse()
        .map_err(|e| {
            Error::InvalidResponse(format!("invalid balance '{}': {e}", account.balance))
        })?;
    Ok(AccountOnNetwork {
        address: Address::new(account.address),
        nonce: account.nonce,
        balance,
    })
}

fn parse_transaction(hash: &str, tx: GatewayTransaction) -> Result<TransactionOnNetwork> {
    let mut events = Vec::new();
    for event in tx.logs.map(|l| l.events).unwrap_or_default() {
        let mut topics = Vec::new();
        for topic in event.topics.unwrap_or_default() {
            let bytes = match topic {
                Some(encoded) => BASE64
                    .decode(&encoded)
                    .map_err(|e| Error::InvalidResponse(format!("bad topic '{encoded}': {e}")))?,
                None => Vec::new(),
            };
            topics.push(bytes);
        }
        events.push(TransactionEvent {
            identifier: event.identifier,
            address: event.address,
            topics,
        });
    }
    Ok(TransactionOnNetwork {
        hash: hash.to_string(),
        status: TransactionStatus::from_raw(&tx.status),
        raw_status: tx.status,
        events,
    })
}

fn collect_hashes(data: SendMultipleData, expected: usize) -> Vec<String> {
    if data.num_of_sent_txs != expected {
        warn!(
            "⚠️ Gateway accepted {}/{} transactions of the batch",
            data.num_of_sent_txs, expected
        );
    }
    data.txs_hashes.into_values().collect()
}

#[async_trait]
impl NetworkProvider for GatewayClient {
    async fn get_account(&self, address: &Address) -> Result<AccountOnNetwork> {
        let response = self.client.get(self.url(&format!("/address/{address}"))).send().await?;
        let data: AccountData = read_envelope(response).await?;
        let account = parse_account(data.account)?;
        debug!("Account {} nonce {}", account.address, account.nonce);
        Ok(account)
    }

    async fn send_transaction(&self, tx: &Transaction) -> Result<String> {
        let response = self
            .client
            .post(self.url("/transaction/send"))
            .json(&tx.to_wire())
            .send()
            .await?;
        let data: SendData = read_envelope(response).await?;
        debug!("📤 Sent transaction {} (nonce {})", data.tx_hash, tx.nonce);
        Ok(data.tx_hash)
    }

    async fn send_transactions(&self, txs: &[Transaction]) -> Result<Vec<String>> {
        let wire: Vec<_> = txs.iter().map(Transaction::to_wire).collect();
        let response = self
            .client
            .post(self.url("/transaction/send-multiple"))
            .json(&wire)
            .send()
            .await?;
        let data: SendMultipleData = read_envelope(response).await?;
        Ok(collect_hashes(data, txs.len()))
    }

    async fn get_transaction(&self, hash: &str) -> Result<Option<TransactionOnNetwork>> {
        let response = self
            .client
            .get(self.url(&format!("/transaction/{hash}")))
            .query(&[("withResults", "true")])
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        match read_envelope::<TransactionData>(response).await {
            Ok(data) => parse_transaction(hash, data.transaction).map(Some),
            Err(Error::Provider { message, .. })
                if message.to_lowercase().contains("not found") =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
