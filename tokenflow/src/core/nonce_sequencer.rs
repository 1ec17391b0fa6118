//! # Nonce Sequencer
//!
//! Hands out consecutive nonces for one account within one session, so a
//! workflow signing hundreds of transactions reads the on-chain nonce once
//! instead of once per transaction.
//!
//! ## Core Concepts
//!
//! - **Seeded from the chain:** construction reads the account's current
//!   nonce. If that read fails, no sequencer exists and no nonce is issued.
//! - **Exclusive ownership:** `current()` takes `&mut self`. Two sequencers
//!   for the same account would issue colliding nonces, so a workflow owns
//!   exactly one per account and never shares it.
//! - **Session scoped:** nothing is persisted. The next run re-reads the chain.

use tracing::{debug, info};

use super::provider::NetworkProvider;
use crate::error::{Error, Result};
use crate::model::Address;

#[derive(Debug)]
pub struct NonceSequencer {
    address: Address,
    next: u64,
    issued: u64,
}

impl NonceSequencer {
    /// Creates a sequencer from an already-read on-chain nonce.
    pub fn new(address: Address, on_chain_nonce: u64) -> Self {
        Self {
            address,
            next: on_chain_nonce,
            issued: 0,
        }
    }

    /// Reads the account's on-chain nonce and seeds a sequencer with it.
    /// Any failure of the read is reported as `NetworkUnavailable`.
    pub async fn for_account(provider: &dyn NetworkProvider, address: &Address) -> Result<Self> {
        let account = provider.get_account(address).await.map_err(|e| match e {
            Error::NetworkUnavailable(_) => e,
            other => {
                Error::NetworkUnavailable(format!("nonce lookup for {address} failed: {other}"))
            }
        })?;
        info!("🎯 Nonce sequencer for {} starts at {}", address, account.nonce);
        Ok(Self::new(address.clone(), account.nonce))
    }

    /// Returns the next unused nonce and advances the counter.
    pub fn current(&mut self) -> u64 {
        let nonce = self.next;
        self.next += 1;
        self.issued += 1;
        debug!("Issued nonce {} for {}", nonce, self.address);
        nonce
    }

    /// The nonce `current()` would return, without consuming it.
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// How many nonces this sequencer has handed out.
    pub fn issued(&self) -> u64 {
        self.issued
    }

    pub fn address(&self) -> &Address {
        &self.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockProvider;

    #[test]
    fn issues_consecutive_nonces_from_seed() {
        let mut seq = NonceSequencer::new(Address::new("erd1owner"), 41);
        let issued: Vec<u64> = (0..5).map(|_| seq.current()).collect();
        assert_eq!(issued, vec![41, 42, 43, 44, 45]);
        assert_eq!(seq.peek(), 46);
        assert_eq!(seq.issued(), 5);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut seq = NonceSequencer::new(Address::new("erd1owner"), 0);
        assert_eq!(seq.peek(), 0);
        assert_eq!(seq.peek(), 0);
        assert_eq!(seq.current(), 0);
        assert_eq!(seq.peek(), 1);
    }

    #[tokio::test]
    async fn seeds_from_network_nonce() {
        let provider = MockProvider::new();
        let owner = Address::new("erd1owner");
        provider.set_account(&owner, 17);

        let mut seq = NonceSequencer::for_account(&provider, &owner).await.unwrap();
        assert_eq!(seq.current(), 17);
        assert_eq!(seq.current(), 18);
        assert_eq!(seq.address(), &owner);
    }

    #[tokio::test]
    async fn failed_lookup_is_network_unavailable() {
        let provider = MockProvider::new();
        let result = NonceSequencer::for_account(&provider, &Address::new("erd1unknown")).await;
        assert!(matches!(result, Err(Error::NetworkUnavailable(_))));
    }
}
