//! # tokenflow
//!
//! Token issuance, batched distribution and holder leaderboards for
//! MultiversX-style networks.
//!
//! Two subsystems carry the weight:
//!
//! - the **transaction pipeline** in [`core`]: nonce sequencing, signing,
//!   batched submission with retry, and confirmation tracking;
//! - the **bulk-data engine**: [`fetcher`] drains paged endpoints, [`cache`]
//!   persists the result, [`leaderboard`] ranks and renders it.
//!
//! [`engine`] wires both into the workflows the `tokenflow` binary runs.

pub mod cache;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod history;
pub mod leaderboard;
pub mod model;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
pub mod tx_builder;
pub mod wallet;

pub use error::{Error, Result};
