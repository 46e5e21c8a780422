//! Connection table and per-client delivery.
//!
//! Every connection gets two outbound lanes:
//! - a reliable, unbounded, in-order lane for discrete events
//! - a lossy latest-value lane for snapshots, where an unsent snapshot is
//!   simply replaced by the next one

use arena_shared::protocol::{ServerMsg, SnapshotMsg};
use std::collections::HashMap;
use tokio::sync::{mpsc, watch};

use crate::state::{Outgoing, Recipient};

/// Sending half, held by the game loop.
#[derive(Debug, Clone)]
pub struct ClientOutbox {
    reliable: mpsc::UnboundedSender<ServerMsg>,
    snapshots: watch::Sender<Option<SnapshotMsg>>,
}

/// Receiving half, held by the connection task.
#[derive(Debug)]
pub struct ClientInbox {
    pub reliable: mpsc::UnboundedReceiver<ServerMsg>,
    pub snapshots: watch::Receiver<Option<SnapshotMsg>>,
}

pub fn client_channel() -> (ClientOutbox, ClientInbox) {
    let (reliable_tx, reliable_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = watch::channel(None);
    (
        ClientOutbox {
            reliable: reliable_tx,
            snapshots: snapshot_tx,
        },
        ClientInbox {
            reliable: reliable_rx,
            snapshots: snapshot_rx,
        },
    )
}

impl ClientOutbox {
    /// Fire-and-forget. A closed connection just drops the message.
    pub fn send(&self, msg: ServerMsg) {
        match msg {
            ServerMsg::Snapshot(snapshot) => {
                let _ = self.snapshots.send(Some(snapshot));
            }
            other => {
                let _ = self.reliable.send(other);
            }
        }
    }
}

/// Open connections keyed by connection id.
pub struct Connections {
    outboxes: HashMap<u32, ClientOutbox>,
    next_id: u32,
}

impl Default for Connections {
    fn default() -> Self {
        Self::new()
    }
}

impl Connections {
    pub fn new() -> Self {
        Self {
            outboxes: HashMap::new(),
            next_id: 1,
        }
    }

    /// Register a new connection and return its id.
    pub fn register(&mut self, outbox: ClientOutbox) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        self.outboxes.insert(id, outbox);
        id
    }

    pub fn remove(&mut self, id: u32) {
        self.outboxes.remove(&id);
    }

    pub fn len(&self) -> usize {
        self.outboxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outboxes.is_empty()
    }

    pub fn deliver(&self, outgoing: Outgoing) {
        match outgoing.to {
            Recipient::Only(id) => match self.outboxes.get(&id) {
                Some(outbox) => outbox.send(outgoing.msg),
                None => tracing::debug!("Dropping message for closed connection {}", id),
            },
            Recipient::All => {
                for outbox in self.outboxes.values() {
                    outbox.send(outgoing.msg.clone());
                }
            }
            Recipient::AllExcept(skip) => {
                for (_, outbox) in self.outboxes.iter().filter(|(id, _)| **id != skip) {
                    outbox.send(outgoing.msg.clone());
                }
            }
        }
    }

    pub fn deliver_all(&self, outgoing: Vec<Outgoing>) {
        for out in outgoing {
            self.deliver(out);
        }
    }
}
