//! # Central Configuration Module
//!
//! Defines the configuration for every workflow and every pipeline
//! component. It uses `serde` to deserialize a TOML file into a
//! strongly-typed `Config` struct.
//!
//! ## Core Principles
//!
//! - **Centralization:** All user-configurable parameters are defined in one place.
//! - **Resilience:** The tool runs with a partial or missing config file by
//!   falling back to the observed production values for every parameter.
//! - **Explicit wiring:** `Config` is passed into each component constructor.
//!   There is no global provider or global settings object.

use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf, time::Duration};
use tracing::warn;

use crate::core::retry::RetryPolicy;
use crate::error::{Error, Result};

/// Network endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_chain_id")]
    pub chain_id: String,
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
            gateway_url: default_gateway_url(),
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Transaction submission: batching and send retries.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_submit_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_submit_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_attempts: default_submit_attempts(),
            retry_delay_ms: default_submit_retry_delay_ms(),
        }
    }
}

impl SubmissionConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.retry_delay_ms))
    }
}

/// Confirmation polling.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmationConfig {
    #[serde(default = "default_visibility_attempts")]
    pub visibility_attempts: u32,
    #[serde(default = "default_visibility_delay_ms")]
    pub visibility_delay_ms: u64,
    #[serde(default = "default_pending_delay_ms")]
    pub pending_delay_ms: u64,
    #[serde(default = "default_max_pending_polls")]
    pub max_pending_polls: u32,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            visibility_attempts: default_visibility_attempts(),
            visibility_delay_ms: default_visibility_delay_ms(),
            pending_delay_ms: default_pending_delay_ms(),
            max_pending_polls: default_max_pending_polls(),
        }
    }
}

/// Paged reads against the indexer API.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_transactions_page_size")]
    pub transactions_page_size: usize,
    #[serde(default = "default_collection_page_size")]
    pub collection_page_size: usize,
    #[serde(default = "default_fetch_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_fetch_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            transactions_page_size: default_transactions_page_size(),
            collection_page_size: default_collection_page_size(),
            max_attempts: default_fetch_attempts(),
            retry_delay_ms: default_fetch_retry_delay_ms(),
        }
    }
}

impl FetchConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.retry_delay_ms))
    }
}

/// Parameters of the fungible token issued by the `issue` workflow.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    #[serde(default = "default_token_name")]
    pub name: String,
    #[serde(default = "default_token_ticker")]
    pub ticker: String,
    #[serde(default = "default_initial_supply")]
    pub initial_supply: u64,
    #[serde(default = "default_decimals")]
    pub decimals: u32,
    #[serde(default = "default_tokens_per_account")]
    pub tokens_per_account: u32,
    /// Issue fee in the smallest denomination of the native coin.
    #[serde(default = "default_issue_cost")]
    pub issue_cost: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: default_token_name(),
            ticker: default_token_ticker(),
            initial_supply: default_initial_supply(),
            decimals: default_decimals(),
            tokens_per_account: default_tokens_per_account(),
            issue_cost: default_issue_cost(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferConfig {
    #[serde(default = "default_transfer_amount")]
    pub amount: u64,
    #[serde(default = "default_receivers_count")]
    pub receivers_count: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            amount: default_transfer_amount(),
            receivers_count: default_receivers_count(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClaimConfig {
    #[serde(default = "default_claim_contract")]
    pub contract: String,
    #[serde(default = "default_claim_function")]
    pub function: String,
    #[serde(default = "default_claim_token_id")]
    pub token_id: String,
    #[serde(default = "default_claim_amount")]
    pub amount: u64,
    #[serde(default = "default_decimals")]
    pub decimals: u32,
    #[serde(default = "default_claim_gas_limit")]
    pub gas_limit: u64,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            contract: default_claim_contract(),
            function: default_claim_function(),
            token_id: default_claim_token_id(),
            amount: default_claim_amount(),
            decimals: default_decimals(),
            gas_limit: default_claim_gas_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardConfig {
    #[serde(default = "default_token_ticker")]
    pub token_prefix: String,
    #[serde(default = "default_top_holders")]
    pub top_holders: usize,
    #[serde(default = "default_decimals")]
    pub decimals: u32,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            token_prefix: default_token_ticker(),
            top_holders: default_top_holders(),
            decimals: default_decimals(),
        }
    }
}

/// Where workflows read and write their artifacts.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_wallets_dir")]
    pub wallets_dir: PathBuf,
    #[serde(default = "default_tokens_dir")]
    pub tokens_dir: PathBuf,
    #[serde(default = "default_receivers_file")]
    pub receivers_file: PathBuf,
    #[serde(default = "default_transactions_file")]
    pub transactions_file: PathBuf,
    #[serde(default = "default_holders_cache")]
    pub holders_cache: PathBuf,
    #[serde(default = "default_leaderboard_output")]
    pub leaderboard_output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            wallets_dir: default_wallets_dir(),
            tokens_dir: default_tokens_dir(),
            receivers_file: default_receivers_file(),
            transactions_file: default_transactions_file(),
            holders_cache: default_holders_cache(),
            leaderboard_output: default_leaderboard_output(),
        }
    }
}

/// The main configuration structure for the application.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
    #[serde(default)]
    pub confirmation: ConfirmationConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub token: TokenConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
    #[serde(default)]
    pub claim: ClaimConfig,
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Loads configuration from `path`.
    /// If the file doesn't exist or fails to parse, it returns a default configuration.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse {}: {}. Using default values.", path.display(), e);
                    Config::default()
                }
            },
            Err(_) => {
                warn!("{} not found. Using default values.", path.display());
                Config::default()
            }
        }
    }

    /// Rejects values that would make a component loop forever or do nothing.
    pub fn validate(&self) -> Result<()> {
        if self.submission.batch_size == 0 {
            return Err(Error::Config("submission.batch_size must be at least 1".into()));
        }
        if self.submission.max_attempts == 0 || self.fetch.max_attempts == 0 {
            return Err(Error::Config("max_attempts must be at least 1".into()));
        }
        if self.confirmation.visibility_attempts == 0 {
            return Err(Error::Config("confirmation.visibility_attempts must be at least 1".into()));
        }
        if self.fetch.transactions_page_size == 0 || self.fetch.collection_page_size == 0 {
            return Err(Error::Config("fetch page sizes must be at least 1".into()));
        }
        Ok(())
    }
}

// --- Default value functions for serde ---

fn default_chain_id() -> String { "D".to_string() }
fn default_gateway_url() -> String { "https://devnet-gateway.multiversx.com".to_string() }
fn default_api_url() -> String { "https://devnet-api.multiversx.com".to_string() }
fn default_request_timeout_secs() -> u64 { 30 }

fn default_batch_size() -> usize { 100 }
fn default_submit_attempts() -> u32 { 10 }
fn default_submit_retry_delay_ms() -> u64 { 1_000 }

fn default_visibility_attempts() -> u32 { 10 }
fn default_visibility_delay_ms() -> u64 { 3_000 }
fn default_pending_delay_ms() -> u64 { 5_000 }
fn default_max_pending_polls() -> u32 { 120 }

fn default_transactions_page_size() -> usize { 100 }
fn default_collection_page_size() -> usize { 1_000 }
fn default_fetch_attempts() -> u32 { 3 }
fn default_fetch_retry_delay_ms() -> u64 { 1_000 }

fn default_token_name() -> String { "WinterIsComing".to_string() }
fn default_token_ticker() -> String { "WINTER".to_string() }
fn default_initial_supply() -> u64 { 100_000_000 }
fn default_decimals() -> u32 { 8 }
fn default_tokens_per_account() -> u32 { 1 }
fn default_issue_cost() -> String { "50000000000000000".to_string() }

fn default_transfer_amount() -> u64 { 10_000 }
fn default_receivers_count() -> usize { 1_000 }

fn default_claim_contract() -> String {
    "erd1qqqqqqqqqqqqqpgqc50cgesrvkpurrxkclz4qql7ukg36uxjjpzqayczg3".to_string()
}
fn default_claim_function() -> String { "claim_tokens".to_string() }
fn default_claim_token_id() -> String { "SNOW-1a790f".to_string() }
fn default_claim_amount() -> u64 { 100 }
fn default_claim_gas_limit() -> u64 { 10_000_000 }

fn default_top_holders() -> usize { 5 }

fn default_wallets_dir() -> PathBuf { PathBuf::from("_accounts/json") }
fn default_tokens_dir() -> PathBuf { PathBuf::from("_tokens") }
fn default_receivers_file() -> PathBuf { PathBuf::from("receivers.txt") }
fn default_transactions_file() -> PathBuf { PathBuf::from("transactions.json") }
fn default_holders_cache() -> PathBuf { PathBuf::from("holders_data_cache.json") }
fn default_leaderboard_output() -> PathBuf { PathBuf::from("leaderboard_output.txt") }
