// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the loaders used at startup.
//! Blank values are treated the same as unset ones.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AIRTABLE_API_KEY` | Airtable personal access token | Required |
//! | `AIRTABLE_BASE_ID` | Airtable base holding the bindings table | Required |
//! | `AIRTABLE_TABLE_NAME` | Table that receives one row per binding | Required |
//! | `AIRTABLE_API_URL` | Airtable API root | `https://api.airtable.com` |
//! | `ALLOWED_ORIGIN` | The one front-end origin allowed to call the relay | Required |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3001` |
//! | `BINDER_RELAY_URL` | Relay base URL used by the composer's relay client | Required for `RelayClient::from_env` |
//! | `WALLETCONNECT_PROJECT_ID` | EVM wallet-connection project identifier | Required for `ComposerConfig` |
//! | `WALLETCONNECT_APP_NAME` | App name shown by EVM wallets | `Address Binder` |
//! | `WALLETCONNECT_CHAIN_IDS` | Comma-separated EVM chain ids offered to wallets | `1,137,10,42161,8453` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;

use axum::http::HeaderValue;
use url::Url;

pub const AIRTABLE_API_KEY_ENV: &str = "AIRTABLE_API_KEY";
pub const AIRTABLE_BASE_ID_ENV: &str = "AIRTABLE_BASE_ID";
pub const AIRTABLE_TABLE_NAME_ENV: &str = "AIRTABLE_TABLE_NAME";
pub const AIRTABLE_API_URL_ENV: &str = "AIRTABLE_API_URL";
pub const ALLOWED_ORIGIN_ENV: &str = "ALLOWED_ORIGIN";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const RELAY_URL_ENV: &str = "BINDER_RELAY_URL";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const WALLETCONNECT_PROJECT_ID_ENV: &str = "WALLETCONNECT_PROJECT_ID";
pub const WALLETCONNECT_APP_NAME_ENV: &str = "WALLETCONNECT_APP_NAME";
pub const WALLETCONNECT_CHAIN_IDS_ENV: &str = "WALLETCONNECT_CHAIN_IDS";

pub const DEFAULT_AIRTABLE_API_URL: &str = "https://api.airtable.com";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";
pub const DEFAULT_WALLETCONNECT_APP_NAME: &str = "Address Binder";
/// Ethereum, Polygon, Optimism, Arbitrum One, Base.
pub const DEFAULT_CHAIN_IDS: [u64; 5] = [1, 137, 10, 42161, 8453];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(String),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: String, reason: String },
}

/// Where bindings are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirtableConfig {
    pub api_url: String,
    pub api_key: String,
    pub base_id: String,
    pub table_name: String,
}

impl AirtableConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url =
            lookup(AIRTABLE_API_URL_ENV).unwrap_or_else(|| DEFAULT_AIRTABLE_API_URL.to_string());
        parse_base_url(AIRTABLE_API_URL_ENV, &api_url)?;

        Ok(Self {
            api_url,
            api_key: required(&lookup, AIRTABLE_API_KEY_ENV)?,
            base_id: required(&lookup, AIRTABLE_BASE_ID_ENV)?,
            table_name: required(&lookup, AIRTABLE_TABLE_NAME_ENV)?,
        })
    }
}

/// Relay server configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind_addr: SocketAddr,
    pub allowed_origin: HeaderValue,
    pub airtable: AirtableConfig,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|e| invalid(PORT_ENV, e))?,
            None => DEFAULT_PORT,
        };
        let bind_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e| invalid(HOST_ENV, e))?;

        let allowed_origin = parse_origin(&required(&lookup, ALLOWED_ORIGIN_ENV)?)?;

        Ok(Self {
            bind_addr,
            allowed_origin,
            airtable: AirtableConfig::from_lookup(&lookup)?,
        })
    }
}

/// EVM wallet-connection settings handed to the wallet collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletConnectConfig {
    pub project_id: String,
    pub app_name: String,
    pub chain_ids: Vec<u64>,
}

impl WalletConnectConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let chain_ids = match lookup(WALLETCONNECT_CHAIN_IDS_ENV) {
            Some(raw) => parse_chain_ids(&raw)?,
            None => DEFAULT_CHAIN_IDS.to_vec(),
        };

        Ok(Self {
            project_id: required(&lookup, WALLETCONNECT_PROJECT_ID_ENV)?,
            app_name: lookup(WALLETCONNECT_APP_NAME_ENV)
                .unwrap_or_else(|| DEFAULT_WALLETCONNECT_APP_NAME.to_string()),
            chain_ids,
        })
    }
}

/// Client-side configuration: where bindings are relayed and how the EVM
/// wallet connects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerConfig {
    pub relay_url: Url,
    pub wallet_connect: WalletConnectConfig,
}

impl ComposerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            relay_url: relay_url(&lookup)?,
            wallet_connect: WalletConnectConfig::from_lookup(&lookup)?,
        })
    }
}

/// Reads and validates `BINDER_RELAY_URL`.
pub(crate) fn relay_url(lookup: impl Fn(&str) -> Option<String>) -> Result<Url, ConfigError> {
    parse_base_url(RELAY_URL_ENV, &required(lookup, RELAY_URL_ENV)?)
}

fn parse_base_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| invalid(name, e))?;
    if url.cannot_be_a_base() {
        return Err(invalid(name, "URL cannot be a base"));
    }
    Ok(url)
}

fn parse_chain_ids(raw: &str) -> Result<Vec<u64>, ConfigError> {
    let chain_ids = raw
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| id.parse::<u64>().map_err(|e| invalid(WALLETCONNECT_CHAIN_IDS_ENV, e)))
        .collect::<Result<Vec<_>, _>>()?;
    if chain_ids.is_empty() {
        return Err(invalid(WALLETCONNECT_CHAIN_IDS_ENV, "no chain ids"));
    }
    Ok(chain_ids)
}

/// Normalizes a front-end URL to the form browsers send in the `Origin`
/// header (`scheme://host[:port]`, no path, no trailing slash).
pub fn parse_origin(raw: &str) -> Result<HeaderValue, ConfigError> {
    let url = Url::parse(raw).map_err(|e| invalid(ALLOWED_ORIGIN_ENV, e))?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(invalid(ALLOWED_ORIGIN_ENV, "URL has no tuple origin"));
    }
    HeaderValue::from_str(&origin.ascii_serialization()).map_err(|e| invalid(ALLOWED_ORIGIN_ENV, e))
}

/// Whether logs should be emitted as JSON lines.
pub fn json_logs() -> bool {
    env_lookup(LOG_FORMAT_ENV)
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

pub(crate) fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn required(
    lookup: impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<String, ConfigError> {
    lookup(name).ok_or_else(|| ConfigError::Missing(name.to_string()))
}

fn invalid(name: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
