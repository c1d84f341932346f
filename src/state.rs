// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use axum::http::HeaderValue;

use crate::store::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    /// The single front-end origin allowed to submit bindings.
    pub allowed_origin: HeaderValue,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, allowed_origin: HeaderValue) -> Self {
        Self {
            store,
            allowed_origin,
        }
    }
}
