// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Client side of the relay: submits finished bindings to `POST /add-binding`.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::{
    config::{self, env_lookup, ComposerConfig, ConfigError},
    models::BindingRecord,
};

#[derive(Debug, thiserror::Error)]
pub enum RelayClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid relay URL: {0}")]
    InvalidUrl(String),

    #[error("relay request failed: {0}")]
    Request(String),

    #[error("relay answered {status}: {body}")]
    Status { status: u16, body: String },
}

/// Destination for generated bindings.
#[async_trait]
pub trait BindingSubmitter: Send + Sync {
    /// Delivers one record and returns the relay's acknowledgment text.
    async fn submit(&self, record: &BindingRecord) -> Result<String, RelayClientError>;
}

#[derive(Debug, Clone)]
pub struct RelayClient {
    endpoint: Url,
    http: Client,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Result<Self, RelayClientError> {
        let mut endpoint =
            Url::parse(base_url).map_err(|e| RelayClientError::InvalidUrl(e.to_string()))?;
        endpoint
            .path_segments_mut()
            .map_err(|_| RelayClientError::InvalidUrl(format!("{base_url} cannot be a base")))?
            .pop_if_empty()
            .push("add-binding");

        let http = Client::builder()
            .build()
            .map_err(|e| RelayClientError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { endpoint, http })
    }

    /// Reads the relay base URL from `BINDER_RELAY_URL`.
    pub fn from_env() -> Result<Self, RelayClientError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_config(config: &ComposerConfig) -> Result<Self, RelayClientError> {
        Self::new(config.relay_url.as_str())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RelayClientError> {
        let base_url = config::relay_url(lookup)?;
        Self::new(base_url.as_str())
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl BindingSubmitter for RelayClient {
    async fn submit(&self, record: &BindingRecord) -> Result<String, RelayClientError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(record)
            .send()
            .await
            .map_err(|e| RelayClientError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RelayClientError::Request(e.to_string()))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(RelayClientError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}
