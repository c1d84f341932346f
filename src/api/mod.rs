// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::{header::CONTENT_TYPE, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{models::BindingRecord, state::AppState};

pub mod bindings;
pub mod health;
pub mod origin;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.allowed_origin.clone())
        .allow_methods([Method::POST])
        .allow_headers([CONTENT_TYPE]);

    let health_routes = Router::new()
        .route("/health/live", get(health::liveness))
        .with_state(state.clone());

    let relay_routes = Router::new()
        .route("/add-binding", post(bindings::add_binding))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            origin::require_allowed_origin,
        ))
        .layer(cors)
        .with_state(state);

    Router::new()
        .merge(health_routes)
        .merge(relay_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    paths(bindings::add_binding, health::liveness),
    components(schemas(BindingRecord, health::RelayStatus)),
    tags(
        (name = "Bindings", description = "Substrate/EVM address binding relay"),
        (name = "Health", description = "Relay status")
    )
)]
struct ApiDoc;
