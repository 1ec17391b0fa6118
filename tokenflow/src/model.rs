//! # Data Model
//!
//! Core value types shared by the submission pipeline and the bulk-data
//! engine: account references, transactions and their on-network outcome,
//! and the token holder records that feed the leaderboard.
//!
//! Balances and transfer values are `BigUint`. Token supplies scaled by
//! 10^decimals routinely leave the 64-bit range.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// A bech32 account address. Encoding and validation belong to the keystore
/// side; here it is an opaque, comparable identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(bech32: impl Into<String>) -> Self {
        Self(bech32.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// An account together with the shard its address maps to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountRef {
    pub address: Address,
    pub shard: u32,
}

/// Account state as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountOnNetwork {
    pub address: Address,
    pub nonce: u64,
    pub balance: BigUint,
}

/// A transaction ready to be signed (when `signature` is `None`) or sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub nonce: u64,
    pub value: BigUint,
    pub sender: Address,
    pub receiver: Address,
    pub gas_price: u64,
    pub gas_limit: u64,
    pub data: Vec<u8>,
    pub chain_id: String,
    pub version: u32,
    pub signature: Option<Vec<u8>>,
}

/// JSON shape of a transaction as the gateway expects it.
///
/// Field order matters: the signing payload is this struct serialized
/// without the signature.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTransaction<'a> {
    pub nonce: u64,
    pub value: String,
    pub receiver: &'a str,
    pub sender: &'a str,
    pub gas_price: u64,
    pub gas_limit: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(rename = "chainID")]
    pub chain_id: &'a str,
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl Transaction {
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    pub fn to_wire(&self) -> WireTransaction<'_> {
        WireTransaction {
            nonce: self.nonce,
            value: self.value.to_string(),
            receiver: self.receiver.as_str(),
            sender: self.sender.as_str(),
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            data: (!self.data.is_empty()).then(|| BASE64.encode(&self.data)),
            chain_id: &self.chain_id,
            version: self.version,
            signature: self.signature.as_ref().map(hex::encode),
        }
    }

    /// Canonical bytes covered by the signature: every field except the
    /// signature itself.
    pub fn signing_bytes(&self) -> Result<Vec<u8>> {
        let mut wire = self.to_wire();
        wire.signature = None;
        Ok(serde_json::to_vec(&wire)?)
    }
}

/// Status of a transaction once the network knows about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Pending,
    Successful,
    Failed,
}

impl TransactionStatus {
    /// Maps the gateway's raw status string. Unknown values count as
    /// pending so the tracker keeps polling within its ceiling.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "success" | "executed" => Self::Successful,
            "fail" | "failed" | "invalid" => Self::Failed,
            _ => Self::Pending,
        }
    }
}

/// A log event emitted by a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEvent {
    pub identifier: String,
    pub address: String,
    pub topics: Vec<Vec<u8>>,
}

impl TransactionEvent {
    /// The topic at `index` decoded as UTF-8, if present and valid.
    pub fn topic_str(&self, index: usize) -> Option<String> {
        self.topics
            .get(index)
            .and_then(|t| String::from_utf8(t.clone()).ok())
    }
}

/// A transaction as seen by the network, with its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOnNetwork {
    pub hash: String,
    pub status: TransactionStatus,
    pub raw_status: String,
    pub events: Vec<TransactionEvent>,
}

impl TransactionOnNetwork {
    pub fn find_event(&self, identifier: &str) -> Option<&TransactionEvent> {
        self.events.iter().find(|e| e.identifier == identifier)
    }
}

/// One holder of one token. The leaderboard groups on `token_id` and ranks
/// on `balance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHolder {
    pub token_id: String,
    pub token_name: String,
    pub address: String,
    #[serde(with = "biguint_serde")]
    pub balance: BigUint,
}

/// Serializes a `BigUint` as a decimal string and accepts either a string
/// or a JSON integer on the way back in.
pub mod biguint_serde {
    use num_bigint::BigUint;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => s
                .parse()
                .map_err(|e| D::Error::custom(format!("invalid balance '{s}': {e}"))),
            // Number text is kept verbatim, so balances wider than u64 survive.
            serde_json::Value::Number(n) => {
                let text = n.to_string();
                text.parse().map_err(|_| {
                    D::Error::custom(format!("balance {text} is not a non-negative integer"))
                })
            }
            other => Err(D::Error::custom(format!("unexpected balance value: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx() -> Transaction {
        Transaction {
            nonce: 7,
            value: BigUint::from(0u32),
            sender: Address::new("erd1sender"),
            receiver: Address::new("erd1receiver"),
            gas_price: 1_000_000_000,
            gas_limit: 50_000,
            data: b"hello".to_vec(),
            chain_id: "D".into(),
            version: 2,
            signature: None,
        }
    }

    #[test]
    fn signing_bytes_follow_canonical_field_order() {
        let bytes = sample_tx().signing_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            r#"{"nonce":7,"value":"0","receiver":"erd1receiver","sender":"erd1sender","gasPrice":1000000000,"gasLimit":50000,"data":"aGVsbG8=","chainID":"D","version":2}"#
        );
    }

    #[test]
    fn signing_bytes_ignore_signature_and_empty_data() {
        let mut tx = sample_tx();
        tx.data.clear();
        let unsigned = tx.signing_bytes().unwrap();
        tx.signature = Some(vec![0xAB; 64]);
        assert_eq!(tx.signing_bytes().unwrap(), unsigned);
        assert!(!String::from_utf8(unsigned).unwrap().contains("data"));
    }

    #[test]
    fn wire_form_carries_hex_signature() {
        let mut tx = sample_tx();
        tx.signature = Some(vec![0x01, 0xff]);
        let json = serde_json::to_value(tx.to_wire()).unwrap();
        assert_eq!(json["signature"], "01ff");
        assert_eq!(json["chainID"], "D");
    }

    #[test]
    fn raw_status_mapping() {
        assert_eq!(TransactionStatus::from_raw("success"), TransactionStatus::Successful);
        assert_eq!(TransactionStatus::from_raw("executed"), TransactionStatus::Successful);
        assert_eq!(TransactionStatus::from_raw("fail"), TransactionStatus::Failed);
        assert_eq!(TransactionStatus::from_raw("invalid"), TransactionStatus::Failed);
        assert_eq!(TransactionStatus::from_raw("pending"), TransactionStatus::Pending);
        assert_eq!(TransactionStatus::from_raw("received"), TransactionStatus::Pending);
    }

    #[test]
    fn holder_balance_accepts_string_or_integer() {
        let big: TokenHolder = serde_json::from_str(
            r#"{"token_id":"WINTER-1a2b3c","token_name":"WinterIsComing","address":"erd1a","balance":"123456789012345678901234"}"#,
        )
        .unwrap();
        assert_eq!(big.balance.to_string(), "123456789012345678901234");

        let small: TokenHolder = serde_json::from_str(
            r#"{"token_id":"WINTER-1a2b3c","token_name":"WinterIsComing","address":"erd1a","balance":42}"#,
        )
        .unwrap();
        assert_eq!(small.balance, BigUint::from(42u32));

        let round = serde_json::to_value(&big).unwrap();
        assert_eq!(round["balance"], "123456789012345678901234");
    }

    #[test]
    fn holder_balance_rejects_negative_and_fractional_numbers() {
        for balance in ["-5", "1.5"] {
            let json = format!(
                r#"{{"token_id":"T","token_name":"N","address":"erd1a","balance":{balance}}}"#
            );
            assert!(serde_json::from_str::<TokenHolder>(&json).is_err(), "accepted {balance}");
        }
    }

    #[test]
    fn event_topic_decoding() {
        let event = TransactionEvent {
            identifier: "issue".into(),
            address: "erd1qqq".into(),
            topics: vec![b"WINTER-1a2b3c".to_vec(), vec![0xff, 0xfe]],
        };
        assert_eq!(event.topic_str(0).as_deref(), Some("WINTER-1a2b3c"));
        assert_eq!(event.topic_str(1), None);
        assert_eq!(event.topic_str(2), None);
    }
}
