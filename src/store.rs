// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Row store the relay writes bindings into.
//!
//! The relay does not own any persistence. Every accepted binding becomes one
//! row in an external table through a [`RecordStore`]; the production
//! implementation is [`crate::providers::airtable::AirtableClient`].

use async_trait::async_trait;
use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record store configuration invalid: {0}")]
    Config(String),

    #[error("record store request failed: {0}")]
    Transport(String),

    #[error("record store rejected the row ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Appends rows to an external table.
///
/// Rows are never deduplicated; writing the same fields twice creates two
/// rows.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create_row(&self, fields: Map<String, Value>) -> Result<(), StoreError>;
}
