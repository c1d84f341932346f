// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

pub const SERVICE_NAME: &str = "address-binder-relay";

/// What the relay reports about itself.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelayStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    /// The front-end origin whose binding submissions are accepted.
    pub allowed_origin: String,
}

/// Reports that the relay process is up and which front end it serves.
/// Airtable is not contacted.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Relay is up", body = RelayStatus)
    )
)]
pub async fn liveness(State(state): State<AppState>) -> Json<RelayStatus> {
    Json(RelayStatus {
        status: "ok",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        allowed_origin: state
            .allowed_origin
            .to_str()
            .unwrap_or_default()
            .to_string(),
    })
}
