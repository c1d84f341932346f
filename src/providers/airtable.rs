// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Airtable integration: one binding, one row.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::AirtableConfig,
    store::{RecordStore, StoreError},
};

#[derive(Debug, Clone)]
pub struct AirtableClient {
    table_url: Url,
    api_key: String,
    http: Client,
}

impl AirtableClient {
    /// Builds a client for `{api_url}/v0/{base_id}/{table_name}`.
    ///
    /// No request timeout is set; a hung Airtable call holds only the request
    /// that issued it.
    pub fn new(config: &AirtableConfig) -> Result<Self, StoreError> {
        let table_url = table_url(&config.api_url, &config.base_id, &config.table_name)?;
        let http = Client::builder()
            .build()
            .map_err(|e| StoreError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            table_url,
            api_key: config.api_key.clone(),
            http,
        })
    }

    pub fn table_url(&self) -> &Url {
        &self.table_url
    }
}

#[async_trait]
impl RecordStore for AirtableClient {
    async fn create_row(&self, fields: Map<String, Value>) -> Result<(), StoreError> {
        let payload = json!({ "records": [{ "fields": fields }] });

        let response = self
            .http
            .post(self.table_url.clone())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        // The row exists once Airtable answers 2xx; the body only feeds logs.
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<Value>(&body) {
            Ok(parsed) => {
                let record_id = parsed
                    .pointer("/records/0/id")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown");
                info!(record_id = %record_id, "Airtable row created");
                debug!(response = %parsed, "Airtable create response");
            }
            Err(e) => {
                warn!(error = %e, status = %status, "Airtable row created, response body unreadable");
            }
        }

        Ok(())
    }
}

fn table_url(api_url: &str, base_id: &str, table_name: &str) -> Result<Url, StoreError> {
    let mut url = Url::parse(api_url)
        .map_err(|e| StoreError::Config(format!("invalid Airtable API URL: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| StoreError::Config("Airtable API URL cannot be a base".to_string()))?
        .pop_if_empty()
        .extend(["v0", base_id, table_name]);
    Ok(url)
}
