//! # Core Transaction Pipeline
//!
//! The components that move a transaction from "built" to "confirmed", plus
//! the network clients underneath them.
//!
//! ## Sub-modules
//!
//! - **`nonce_sequencer`**: per-account, session-scoped nonce issuance.
//! - **`submitter`**: signing, single and batched sends under a retry policy.
//! - **`confirmation`**: the Unseen → Pending → Successful | Failed tracker.
//! - **`retry`**: the shared `RetryPolicy` and the injectable `Sleeper`.
//! - **`provider`**: the `NetworkProvider` seam; **`gateway`** implements it.
//! - **`api`**: paged collections served by the indexer API.

pub mod api;
pub mod confirmation;
pub mod gateway;
pub mod nonce_sequencer;
pub mod provider;
pub mod retry;
pub mod submitter;
