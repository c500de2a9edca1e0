// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket bridge between a browser context and the router.
//!
//! Each socket is one client context. Client -> server text frames:
//! ```json
//! {"requestId": 1, "message": {"type": "QUERY_WORDS_STATUS", "words": ["cat"]}}
//! ```
//!
//! Server -> client text frames are serialized `ServerFrame`s:
//! ```json
//! {"frame": "response", "requestId": 1, "response": {"success": true, "data": {...}}}
//! {"frame": "notification", "notification": {"type": "WORD_STATUS_UPDATED", ...}}
//! ```

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use lexis_protocol::ClientFrame;
use lexis_router::MessageRouter;
use serde::Deserialize;
use tracing::{Instrument, debug, info_span, warn};

use crate::server::GatewayState;

/// Query parameters accepted on the upgrade request.
#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    #[serde(default)]
    pub token: Option<String>,
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<GatewayState>,
    Query(params): Query<WsParams>,
    headers: HeaderMap,
) -> Response {
    if !state.auth.authorize(&headers, params.token.as_deref()) {
        warn!("websocket handshake rejected: bad or missing token");
        return StatusCode::UNAUTHORIZED.into_response();
    }
    ws.on_upgrade(move |socket| handle_socket(socket, state.router))
}

/// Bridges one socket to a fresh router connection.
///
/// The writer task forwards router frames to the socket; the read loop parses
/// client frames and feeds the router. When the socket closes the connection
/// is dropped, which deregisters the client and cancels its streams.
async fn handle_socket(socket: WebSocket, router: Arc<MessageRouter>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (client_id, to_router, mut from_router) = router.connect().into_parts();
    let span = info_span!("ws", client_id = %client_id);

    let writer = tokio::spawn(
        async move {
            while let Some(frame) = from_router.recv().await {
                let text = match serde_json::to_string(&frame) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "failed to encode server frame");
                        continue;
                    }
                };
                if ws_sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            let _ = ws_sender.close().await;
        }
        .instrument(span.clone()),
    );

    async {
        while let Some(Ok(msg)) = ws_receiver.next().await {
            match msg {
                Message::Text(text) => {
                    let frame = match parse_frame(text.as_str()) {
                        Some(frame) => frame,
                        None => continue,
                    };
                    if to_router.send(frame).await.is_err() {
                        debug!("router connection closed");
                        break;
                    }
                }
                Message::Close(_) => break,
                // Binary is not part of the protocol; pings are answered by axum.
                _ => {}
            }
        }
    }
    .instrument(span)
    .await;

    drop(to_router);
    router.disconnect(&client_id);
    writer.abort();
}

/// Parses a client frame; frames without a usable `requestId` cannot be
/// answered and are dropped.
fn parse_frame(text: &str) -> Option<ClientFrame> {
    match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) => Some(frame),
        Err(e) => {
            warn!(error = %e, "dropping websocket frame without a parseable requestId");
            None
        }
    }
}
