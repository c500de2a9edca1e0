// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client connection lifecycle.
//!
//! `connect` registers a client and spawns a pump that answers each inbound
//! frame on its own task, so a slow lookup never holds up the next request.
//! When the inbound side closes the client is deregistered and its streams
//! are cancelled.

use std::sync::Arc;

use lexis_core::ClientId;
use lexis_protocol::{ClientFrame, ServerFrame};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span};

use crate::registry::ClientHandle;
use crate::router::MessageRouter;

/// The client's end of an in-process connection.
#[derive(Debug)]
pub struct ClientConnection {
    pub id: ClientId,
    /// Frames to the router. Dropping this disconnects the client.
    pub sender: mpsc::Sender<ClientFrame>,
    /// Responses and notifications from the router.
    pub receiver: mpsc::Receiver<ServerFrame>,
}

impl ClientConnection {
    pub fn into_parts(self) -> (ClientId, mpsc::Sender<ClientFrame>, mpsc::Receiver<ServerFrame>) {
        (self.id, self.sender, self.receiver)
    }
}

impl MessageRouter {
    /// Registers a new client context and starts serving it.
    pub fn connect(self: &Arc<Self>) -> ClientConnection {
        let id = ClientId::generate();
        let buffer = self.settings.client_buffer.max(1);
        let (to_router, inbound) = mpsc::channel::<ClientFrame>(buffer);
        let (outbound, to_client) = mpsc::channel::<ServerFrame>(buffer);
        let (notify, notifications) = mpsc::channel::<ServerFrame>(buffer);
        let cancel = self.shutdown.child_token();

        self.clients.register(
            id.clone(),
            ClientHandle {
                outbound: outbound.clone(),
                notify,
                cancel: cancel.clone(),
            },
        );
        info!(client_id = %id, clients = self.clients.len(), "client connected");

        let span = info_span!("client", client_id = %id);
        tokio::spawn(
            forward_notifications(notifications, outbound.clone(), cancel.clone())
                .instrument(span.clone()),
        );
        tokio::spawn(
            Arc::clone(self)
                .pump(id.clone(), inbound, outbound, cancel)
                .instrument(span),
        );

        ClientConnection {
            id,
            sender: to_router,
            receiver: to_client,
        }
    }

    /// Deregisters a client and cancels every stream it owns.
    pub fn disconnect(&self, client: &ClientId) {
        let removed = self.clients.remove(client);
        let cancelled = self.relay.cancel_client(client);
        if removed {
            info!(client_id = %client, cancelled_streams = cancelled, "client disconnected");
        }
    }

    async fn pump(
        self: Arc<Self>,
        client: ClientId,
        mut inbound: mpsc::Receiver<ClientFrame>,
        outbound: mpsc::Sender<ServerFrame>,
        cancel: CancellationToken,
    ) {
        loop {
            let frame = tokio::select! {
                _ = cancel.cancelled() => break,
                frame = inbound.recv() => match frame {
                    Some(frame) => frame,
                    None => break,
                },
            };

            let router = Arc::clone(&self);
            let client = client.clone();
            let outbound = outbound.clone();
            tokio::spawn(
                async move {
                    let request_id = frame.request_id;
                    let response = router.handle(&client, frame.message).await;
                    let reply = ServerFrame::Response {
                        request_id,
                        response,
                    };
                    if outbound.send(reply).await.is_err() {
                        debug!(request_id, "client gone before response");
                    }
                }
                .in_current_span(),
            );
        }
        self.disconnect(&client);
    }
}

/// Moves queued broadcasts onto the client's connection, in order.
async fn forward_notifications(
    mut notifications: mpsc::Receiver<ServerFrame>,
    outbound: mpsc::Sender<ServerFrame>,
    cancel: CancellationToken,
) {
    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => break,
            _ = outbound.closed() => break,
            frame = notifications.recv() => match frame {
                Some(frame) => frame,
                None => break,
            },
        };
        if outbound.send(frame).await.is_err() {
            break;
        }
    }
    debug!("notification forwarder stopped");
}
