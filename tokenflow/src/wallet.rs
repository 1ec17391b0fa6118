//! # Wallet Manager
//!
//! Loads account key files and signs transaction payloads. It is the single
//! place a secret key is held. Keystore encryption and bech32 derivation live
//! outside this crate. A key file is the plain-JSON adapter at that boundary:
//!
//! ```json
//! { "address": "erd1...", "secret_key": "<64 hex chars>", "shard": 1 }
//! ```

use anyhow::{Context, Result};
use ed25519_dalek::{Signer as _, SigningKey};
use serde::Deserialize;
use std::{fs, path::Path};
use tracing::{info, warn};

use crate::error::Error;
use crate::model::{AccountRef, Address};

/// Anything able to sign on behalf of one address.
pub trait Signer: Send + Sync {
    fn address(&self) -> &Address;

    /// Signs an arbitrary message.
    fn sign(&self, message: &[u8]) -> crate::Result<Vec<u8>>;
}

#[derive(Debug, Deserialize)]
struct KeyFile {
    address: String,
    secret_key: String,
    #[serde(default)]
    shard: u32,
}

pub struct KeyFileWallet {
    account: AccountRef,
    key: SigningKey,
}

impl std::fmt::Debug for KeyFileWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyFileWallet").field("account", &self.account).finish_non_exhaustive()
    }
}

impl KeyFileWallet {
    /// Builds a wallet from raw key material.
    pub fn from_secret(address: Address, shard: u32, secret: &[u8]) -> crate::Result<Self> {
        let bytes: [u8; 32] = secret
            .try_into()
            .map_err(|_| {
                Error::Signing(format!("secret key must be 32 bytes, got {}", secret.len()))
            })?;
        Ok(Self {
            account: AccountRef { address, shard },
            key: SigningKey::from_bytes(&bytes),
        })
    }

    /// Loads a key file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read key file at '{}'", path.display()))?;
        let file: KeyFile = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse key file JSON from '{}'", path.display()))?;
        let secret = hex::decode(file.secret_key.trim())
            .with_context(|| format!("Secret key in '{}' is not hex", path.display()))?;
        let wallet = Self::from_secret(Address::new(file.address), file.shard, &secret)?;
        info!(
            "✅ Wallet loaded: {} (shard {}, public key {})",
            wallet.account.address,
            wallet.account.shard,
            wallet.public_key_hex()
        );
        Ok(wallet)
    }

    pub fn account(&self) -> &AccountRef {
        &self.account
    }

    /// Hex of the ed25519 public key.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.key.verifying_key().to_bytes())
    }
}

impl Signer for KeyFileWallet {
    fn address(&self) -> &Address {
        &self.account.address
    }

    fn sign(&self, message: &[u8]) -> crate::Result<Vec<u8>> {
        Ok(self.key.sign(message).to_bytes().to_vec())
    }
}

/// Loads every `*.json` key file in `dir`, sorted by file name. Unreadable
/// files are skipped with a warning.
pub fn discover_wallets(dir: &Path) -> Result<Vec<KeyFileWallet>> {
    let mut paths: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("Failed to list wallet directory '{}'", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut wallets = Vec::with_capacity(paths.len());
    for path in paths {
        match KeyFileWallet::load(&path) {
            Ok(wallet) => wallets.push(wallet),
            Err(e) => warn!("⚠️ Skipping key file {}: {:#}", path.display(), e),
        }
    }
    Ok(wallets)
}
