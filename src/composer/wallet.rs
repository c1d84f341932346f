// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet collaborators the composer talks to.
//!
//! Both account systems live outside this crate: Substrate accounts come from
//! injected browser extensions, the EVM account from a wallet-connection
//! library. The composer only needs the calls below.

use async_trait::async_trait;

use crate::models::{EvmAccount, InjectedExtension, SubstrateAccount};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("User rejected the request.")]
    Rejected,

    #[error("wallet is not connected")]
    NotConnected,

    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("{0}")]
    Extension(String),
}

/// Injected Substrate wallet extensions (Polkadot.js and compatible).
#[async_trait]
pub trait SubstrateExtensions: Send + Sync {
    /// Asks every installed extension for access on behalf of `app_name`.
    /// Returns the extensions that granted it; empty when none are installed.
    async fn enable(&self, app_name: &str) -> Result<Vec<InjectedExtension>, WalletError>;

    /// Lists the accounts of all enabled extensions.
    async fn accounts(&self) -> Result<Vec<SubstrateAccount>, WalletError>;
}

/// A connected EVM wallet.
#[async_trait]
pub trait EvmWallet: Send + Sync {
    /// Current connection state. Owned by the wallet, read on demand.
    fn account(&self) -> EvmAccount;

    /// Signs `message` with EIP-191 `personal_sign`. May wait for the user to
    /// approve in the wallet UI.
    async fn sign_message(&self, message: &str) -> Result<String, WalletError>;
}
