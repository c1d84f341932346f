// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Binding Data Models
//!
//! Types shared by the composer and the relay. All wire types use camelCase
//! keys so records produced here can be submitted to the relay unchanged and
//! land in Airtable under the same column names.
//!
//! ## Model Categories
//!
//! - **Binding Record**: the signed Substrate-to-EVM attestation
//! - **Substrate Accounts**: accounts exposed by injected wallet extensions
//! - **EVM Account**: the ambient connection state of the EVM wallet

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Binding Record
// =============================================================================

/// Column names of a binding row, in the order the relay forwards them.
pub const BINDING_FIELDS: [&str; 5] = [
    "substrateAddress",
    "evmAddress",
    "signature",
    "signedMessage",
    "timestamp",
];

/// A Substrate address bound to an EVM address by an EVM signature.
///
/// Only the EVM side signs. `signed_message` embeds `substrate_address`
/// verbatim and that text is the only link between the signature and the
/// Substrate account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BindingRecord {
    /// Address in the Substrate account system.
    pub substrate_address: String,
    /// Address of the EVM account that produced the signature.
    pub evm_address: String,
    /// 0x-prefixed hex signature over `signed_message`.
    pub signature: String,
    /// The exact text that was signed.
    pub signed_message: String,
    /// ISO-8601 creation time.
    pub timestamp: String,
}

impl BindingRecord {
    pub fn new(
        substrate_address: impl Into<String>,
        evm_address: impl Into<String>,
        signature: impl Into<String>,
        signed_message: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            substrate_address: substrate_address.into(),
            evm_address: evm_address.into(),
            signature: signature.into(),
            signed_message: signed_message.into(),
            timestamp: format_timestamp(created_at),
        }
    }
}

/// Formats a time the way browsers print `Date.toISOString()`,
/// e.g. `2026-10-18T09:30:00.000Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// =============================================================================
// Substrate Accounts
// =============================================================================

/// Metadata an extension attaches to an account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountMeta {
    pub name: String,
}

/// An account exposed by an injected Substrate wallet extension.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubstrateAccount {
    pub address: String,
    pub meta: AccountMeta,
}

impl SubstrateAccount {
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            meta: AccountMeta { name: name.into() },
        }
    }

    /// Picker label: the account name and a shortened address,
    /// e.g. `Alice (5Grwva...GKutQY)`.
    pub fn label(&self) -> String {
        let chars: Vec<char> = self.address.chars().collect();
        if chars.len() <= 12 {
            return format!("{} ({})", self.meta.name, self.address);
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 6..].iter().collect();
        format!("{} ({head}...{tail})", self.meta.name)
    }
}

/// An extension that granted the application access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectedExtension {
    pub name: String,
    pub version: String,
}

// =============================================================================
// EVM Account
// =============================================================================

/// Ambient EVM wallet state, as reported by the wallet-connection layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvmAccount {
    pub address: Option<String>,
    pub is_connected: bool,
}
