// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of live client contexts.

use dashmap::DashMap;
use lexis_core::ClientId;
use lexis_protocol::{Notification, ServerFrame};
use lexis_relay::StreamTarget;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Outbound side of one connected client.
///
/// Broadcasts go through `notify`, a queue of their own that is forwarded
/// into `outbound`, so a busy stream delays them instead of crowding them out.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    pub outbound: mpsc::Sender<ServerFrame>,
    pub notify: mpsc::Sender<ServerFrame>,
    pub cancel: CancellationToken,
}

#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: DashMap<ClientId, ClientHandle>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: ClientId, handle: ClientHandle) {
        self.clients.insert(id, handle);
    }

    /// Removes a client and fires its cancellation token.
    pub fn remove(&self, id: &ClientId) -> bool {
        match self.clients.remove(id) {
            Some((_, handle)) => {
                handle.cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// The client's teardown token, fired when it is removed.
    pub fn cancel_token(&self, id: &ClientId) -> Option<CancellationToken> {
        self.clients.get(id).map(|handle| handle.cancel.clone())
    }

    /// The relay target for a client's streams, if it is still connected.
    pub fn stream_target(&self, id: &ClientId) -> Option<StreamTarget> {
        self.clients.get(id).map(|handle| StreamTarget {
            client: id.clone(),
            outbound: handle.outbound.clone(),
            cancel: handle.cancel.clone(),
        })
    }

    /// Sends `notification` to every client registered right now.
    ///
    /// Iterates a snapshot, so clients joining or leaving mid-broadcast never
    /// hold the map lock. A client whose broadcast queue is full misses this
    /// event; a client whose channel is closed is dropped from the registry.
    pub fn broadcast(&self, notification: &Notification) -> usize {
        let snapshot: Vec<(ClientId, mpsc::Sender<ServerFrame>)> = self
            .clients
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().notify.clone()))
            .collect();

        let mut delivered = 0;
        for (id, notify) in snapshot {
            match notify.try_send(ServerFrame::from(notification.clone())) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(client_id = %id, kind = %notification.kind(), "client queue full, notification dropped");
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(client_id = %id, "dropping closed client from registry");
                    self.remove(&id);
                }
            }
        }
        delivered
    }
}
