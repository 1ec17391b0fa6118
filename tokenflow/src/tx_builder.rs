//! # Transaction Builder
//!
//! Constructs the unsigned transactions the workflows send: fungible token
//! issuance, ESDT transfers and smart contract calls. Nonce and signature are
//! filled in later by the submitter.
//!
//! Call data follows the `function@arg@arg` convention with hex-encoded
//! arguments. Numbers are minimal big-endian hex, so zero is the empty
//! string.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::config::{NetworkConfig, TokenConfig};
use crate::error::{Error, Result};
use crate::model::{Address, Transaction};

/// System smart contract that handles ESDT issuance.
pub const ESDT_SYSTEM_CONTRACT: &str = "erd1qqqqqqqqqqqqqqqpqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqzllls8a5w6u";

const GAS_PRICE: u64 = 1_000_000_000;
const MIN_GAS_LIMIT: u64 = 50_000;
const GAS_PER_DATA_BYTE: u64 = 1_500;
const ESDT_TRANSFER_GAS: u64 = 200_000;
const ISSUE_GAS_LIMIT: u64 = 60_000_000;
const TX_VERSION: u32 = 2;

const ISSUE_PROPERTIES: [&str; 6] = [
    "canFreeze",
    "canWipe",
    "canPause",
    "canChangeOwner",
    "canUpgrade",
    "canAddSpecialRoles",
];

/// One argument of a contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArg {
    Str(String),
    Uint(BigUint),
    Raw(Vec<u8>),
}

impl CallArg {
    fn to_hex(&self) -> String {
        match self {
            CallArg::Str(s) => hex::encode(s.as_bytes()),
            CallArg::Uint(n) => encode_uint(n),
            CallArg::Raw(bytes) => hex::encode(bytes),
        }
    }
}

impl From<&str> for CallArg {
    fn from(s: &str) -> Self {
        CallArg::Str(s.to_string())
    }
}

impl From<BigUint> for CallArg {
    fn from(n: BigUint) -> Self {
        CallArg::Uint(n)
    }
}

impl From<u64> for CallArg {
    fn from(n: u64) -> Self {
        CallArg::Uint(BigUint::from(n))
    }
}

/// Minimal big-endian hex of `n`. Zero encodes as `""`.
pub fn encode_uint(n: &BigUint) -> String {
    if n.is_zero() {
        String::new()
    } else {
        hex::encode(n.to_bytes_be())
    }
}

/// `amount * 10^decimals`.
pub fn scale_amount(amount: u64, decimals: u32) -> BigUint {
    BigUint::from(amount) * BigUint::from(10u32).pow(decimals)
}

fn call_data(function: &str, args: &[CallArg]) -> Vec<u8> {
    let mut data = function.to_string();
    for arg in args {
        data.push('@');
        data.push_str(&arg.to_hex());
    }
    data.into_bytes()
}

#[derive(Debug, Clone)]
pub struct TransactionFactory {
    chain_id: String,
    gas_price: u64,
}

impl TransactionFactory {
    pub fn new(chain_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            gas_price: GAS_PRICE,
        }
    }

    pub fn from_config(config: &NetworkConfig) -> Self {
        Self::new(config.chain_id.clone())
    }

    fn unsigned(
        &self,
        sender: &Address,
        receiver: Address,
        value: BigUint,
        data: Vec<u8>,
        gas_limit: u64,
    ) -> Transaction {
        Transaction {
            nonce: 0,
            value,
            sender: sender.clone(),
            receiver,
            gas_price: self.gas_price,
            gas_limit,
            data,
            chain_id: self.chain_id.clone(),
            version: TX_VERSION,
            signature: None,
        }
    }

    /// Issues a fungible token with every management property enabled. The
    /// initial supply is scaled by the token's decimals.
    pub fn issue_fungible(&self, sender: &Address, token: &TokenConfig) -> Result<Transaction> {
        let cost: BigUint = token
            .issue_cost
            .parse()
            .map_err(|e| {
                Error::Config(format!("invalid token.issue_cost '{}': {e}", token.issue_cost))
            })?;

        let mut args = vec![
            CallArg::from(token.name.as_str()),
            CallArg::from(token.ticker.as_str()),
            CallArg::Uint(scale_amount(token.initial_supply, token.decimals)),
            CallArg::Uint(BigUint::from(token.decimals)),
        ];
        for property in ISSUE_PROPERTIES {
            args.push(property.into());
            args.push("true".into());
        }

        Ok(self.unsigned(
            sender,
            Address::new(ESDT_SYSTEM_CONTRACT),
            cost,
            call_data("issue", &args),
            ISSUE_GAS_LIMIT,
        ))
    }

    pub fn esdt_transfer(
        &self,
        sender: &Address,
        receiver: &Address,
        token_id: &str,
        amount: &BigUint,
    ) -> Transaction {
        let data = call_data("ESDTTransfer", &[token_id.into(), CallArg::Uint(amount.clone())]);
        let gas_limit = MIN_GAS_LIMIT + GAS_PER_DATA_BYTE * data.len() as u64 + ESDT_TRANSFER_GAS;
        self.unsigned(sender, receiver.clone(), BigUint::zero(), data, gas_limit)
    }

    pub fn contract_call(
        &self,
        sender: &Address,
        contract: &Address,
        function: &str,
        args: &[CallArg],
        gas_limit: u64,
    ) -> Transaction {
        let data = call_data(function, args);
        self.unsigned(sender, contract.clone(), BigUint::zero(), data, gas_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_str(tx: &Transaction) -> String {
        String::from_utf8(tx.data.clone()).unwrap()
    }

    #[test]
    fn numbers_encode_minimal_big_endian() {
        assert_eq!(encode_uint(&BigUint::zero()), "");
        assert_eq!(encode_uint(&BigUint::from(8u32)), "08");
        assert_eq!(encode_uint(&BigUint::from(256u32)), "0100");
        assert_eq!(scale_amount(100, 8), BigUint::from(10_000_000_000u64));
    }

    #[test]
    fn issue_payload_lists_name_ticker_supply_and_properties() {
        let factory = TransactionFactory::new("D");
        let token = TokenConfig::default();
        let tx = factory.issue_fungible(&Address::new("erd1owner"), &token).unwrap();

        let supply = encode_uint(&scale_amount(token.initial_supply, token.decimals));
        let data = data_str(&tx);
        assert!(data.starts_with(&format!(
            "issue@{}@{}@{}@08@",
            hex::encode("WinterIsComing"),
            hex::encode("WINTER"),
            supply
        )));
        let last_pair = format!("@{}@{}", hex::encode("canAddSpecialRoles"), hex::encode("true"));
        assert!(data.ends_with(&last_pair));
        assert_eq!(data.matches(&hex::encode("true")).count(), 6);
        assert_eq!(tx.receiver.as_str(), ESDT_SYSTEM_CONTRACT);
        assert_eq!(tx.value.to_string(), "50000000000000000");
        assert_eq!(tx.gas_limit, 60_000_000);
        assert!(!tx.is_signed());
    }

    #[test]
    fn bad_issue_cost_is_config_error() {
        let token = TokenConfig {
            issue_cost: "lots".into(),
            ..TokenConfig::default()
        };
        let result =
            TransactionFactory::new("D").issue_fungible(&Address::new("erd1owner"), &token);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn transfer_gas_grows_with_data() {
        let factory = TransactionFactory::new("D");
        let amount = scale_amount(10_000, 8);
        let (sender, receiver) = (Address::new("erd1a"), Address::new("erd1b"));
        let tx = factory.esdt_transfer(&sender, &receiver, "WINTER-1a2b3c", &amount);

        let expected =
            format!("ESDTTransfer@{}@{}", hex::encode("WINTER-1a2b3c"), encode_uint(&amount));
        assert_eq!(data_str(&tx), expected);
        assert_eq!(tx.gas_limit, 50_000 + 1_500 * expected.len() as u64 + 200_000);
        assert!(tx.value.is_zero());
    }

    #[test]
    fn contract_call_encodes_mixed_arguments() {
        let factory = TransactionFactory::new("D");
        let args = [
            CallArg::from("SNOW-1a790f"),
            CallArg::from(scale_amount(100, 8)),
            CallArg::Raw(vec![0, 1]),
        ];
        let (sender, contract) = (Address::new("erd1a"), Address::new("erd1sc"));
        let tx = factory.contract_call(&sender, &contract, "claim_tokens", &args, 10_000_000);

        assert_eq!(
            data_str(&tx),
            format!("claim_tokens@{}@02540be400@0001", hex::encode("SNOW-1a790f"))
        );
        assert_eq!(tx.gas_limit, 10_000_000);
        assert_eq!(tx.chain_id, "D");
    }
}
