// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM wallet backed by an in-process secp256k1 key.

use alloy::signers::{local::PrivateKeySigner, Signer};
use async_trait::async_trait;

use super::wallet::{EvmWallet, WalletError};
use crate::models::EvmAccount;

/// Local-key EVM wallet with an explicit connection toggle.
///
/// A disconnected wallet reports no address and refuses to sign, matching
/// what a wallet-connection library exposes before the user connects.
#[derive(Debug, Clone)]
pub struct LocalEvmWallet {
    signer: PrivateKeySigner,
    connected: bool,
}

impl LocalEvmWallet {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self {
            signer,
            connected: false,
        }
    }

    pub fn random() -> Self {
        Self::new(PrivateKeySigner::random())
    }

    /// Accepts a 32-byte hex key, with or without `0x`.
    pub fn from_hex_key(private_key_hex: &str) -> Result<Self, WalletError> {
        let key_bytes = alloy::hex::decode(private_key_hex.trim())
            .map_err(|e| WalletError::InvalidKey(e.to_string()))?;
        let signer = PrivateKeySigner::from_slice(&key_bytes)
            .map_err(|e| WalletError::InvalidKey(e.to_string()))?;
        Ok(Self::new(signer))
    }

    pub fn connect(&mut self) {
        self.connected = true;
    }

    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    /// EIP-55 checksummed address.
    pub fn address(&self) -> String {
        self.signer.address().to_checksum(None)
    }
}

#[async_trait]
impl EvmWallet for LocalEvmWallet {
    fn account(&self) -> EvmAccount {
        EvmAccount {
            address: self.connected.then(|| self.address()),
            is_connected: self.connected,
        }
    }

    async fn sign_message(&self, message: &str) -> Result<String, WalletError> {
        if !self.connected {
            return Err(WalletError::NotConnected);
        }
        let signature = self
            .signer
            .sign_message(message.as_bytes())
            .await
            .map_err(|e| WalletError::Signing(e.to_string()))?;
        Ok(alloy::hex::encode_prefixed(signature.as_bytes()))
    }
}
