// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{body::Bytes, extract::State, http::StatusCode};
use serde_json::{Map, Value};
use tracing::info;

use crate::{
    error::RelayError,
    models::{BindingRecord, BINDING_FIELDS},
    state::AppState,
};

/// Plain-text body returned when the row was written.
pub const SAVED_MESSAGE: &str = "Binding saved to Airtable!";

/// Relays one binding to the record store as a new row.
///
/// The body is not validated. The five binding fields are forwarded with
/// whatever JSON values they hold; absent fields are left out and any other
/// keys are dropped.
#[utoipa::path(
    post,
    path = "/add-binding",
    request_body = BindingRecord,
    tag = "Bindings",
    responses(
        (status = 200, description = "Row created", body = String),
        (status = 500, description = "Row could not be created", body = String)
    )
)]
pub async fn add_binding(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, &'static str), RelayError> {
    let fields = binding_fields(&body)?;
    let substrate_address = fields
        .get("substrateAddress")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    state.store.create_row(fields).await?;

    info!(substrate_address = %substrate_address, "Binding relayed");
    Ok((StatusCode::OK, SAVED_MESSAGE))
}

fn binding_fields(body: &[u8]) -> Result<Map<String, Value>, serde_json::Error> {
    let mut payload: Map<String, Value> = serde_json::from_slice(body)?;
    Ok(BINDING_FIELDS
        .iter()
        .filter_map(|field| payload.remove(*field).map(|value| (field.to_string(), value)))
        .collect())
}
