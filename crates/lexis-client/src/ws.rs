// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket transport to a running gateway.

use futures::{SinkExt, StreamExt};
use lexis_core::LexisError;
use lexis_protocol::{ClientFrame, ServerFrame};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use crate::client::ContentScriptClient;

const FRAME_BUFFER: usize = 64;

impl ContentScriptClient {
    /// Connects to a gateway `/ws` endpoint, e.g.
    /// `ws://127.0.0.1:7878/ws?token=...`.
    ///
    /// Two bridge tasks move frames between the socket and the client's
    /// channels. Dropping the client closes the socket.
    pub async fn connect_ws(url: &str) -> Result<Self, LexisError> {
        let (socket, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| LexisError::Internal(format!("websocket connect failed: {e}")))?;
        let (mut sink, mut stream) = socket.split();

        let (outbound, mut frames) = mpsc::channel::<ClientFrame>(FRAME_BUFFER);
        let (inbound_tx, inbound) = mpsc::channel::<ServerFrame>(FRAME_BUFFER);

        tokio::spawn(async move {
            while let Some(frame) = frames.recv().await {
                let text = match serde_json::to_string(&frame) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "failed to encode client frame");
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    debug!(error = %e, "websocket write failed");
                    return;
                }
            }
            let _ = sink.close().await;
        });

        tokio::spawn(async move {
            while let Some(message) = stream.next().await {
                match message {
                    Ok(Message::Text(text)) => match serde_json::from_str::<ServerFrame>(&text) {
                        Ok(frame) => {
                            if inbound_tx.send(frame).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!(error = %e, "dropping undecodable server frame"),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        debug!(error = %e, "websocket read failed");
                        break;
                    }
                }
            }
        });

        Ok(Self::from_channels(outbound, inbound))
    }
}
