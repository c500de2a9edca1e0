// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain HTTP handlers.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::server::GatewayState;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Connected client contexts.
    pub clients: usize,
    /// Live streaming sessions.
    pub streams: usize,
}

/// GET /health
///
/// Unauthenticated so process supervisors can poll it.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        clients: state.router.connected_clients(),
        streams: state.router.active_streams(),
    })
}
