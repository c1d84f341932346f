// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Origin guard for the relay.
//!
//! Browsers enforce CORS on their side, but a CORS layer alone still lets a
//! cross-origin `POST` reach the handler. This middleware stops any request
//! whose `Origin` differs from the configured front-end before the handler
//! runs. Requests without an `Origin` header are not browser cross-origin
//! calls and pass through.

use axum::{
    extract::{Request, State},
    http::{header::ORIGIN, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::state::AppState;

pub const ORIGIN_REJECTED_MESSAGE: &str = "Origin not allowed";

pub async fn require_allowed_origin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(origin) = request.headers().get(ORIGIN) {
        if *origin != state.allowed_origin {
            warn!(
                origin = ?origin,
                path = %request.uri().path(),
                "Rejected request from disallowed origin"
            );
            return (StatusCode::FORBIDDEN, ORIGIN_REJECTED_MESSAGE).into_response();
        }
    }

    next.run(request).await
}
