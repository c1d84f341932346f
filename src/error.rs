// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::store::StoreError;

/// Plain-text body returned for every failed submission.
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save binding to Airtable";

/// Any failure while relaying a binding.
///
/// Callers only ever see an undifferentiated `500`; the cause is logged
/// server-side.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("unreadable binding payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        error!(error = %self, "Failed to relay binding");
        (StatusCode::INTERNAL_SERVER_ERROR, SAVE_FAILED_MESSAGE).into_response()
    }
}
