//! Participant connection management for the move relay
//!
//! This module handles the server-side roster of connected participants:
//! - Connection lifecycle (accept, join, disconnect)
//! - Identity assignment with duplicate rejection
//! - Copy-on-read snapshots of broadcast targets
//!
//! The registry is owned by the coordinator and only ever mutated on the
//! coordinator task, so it needs no internal locking.

use log::info;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Errors surfaced to a joining participant.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The requested identity is already active on another connection.
    #[error("player id \"{0}\" is already taken")]
    DuplicateIdentity(String),
}

/// Represents a connected participant
///
/// A participant exists from the moment its connection is accepted. It only
/// becomes a broadcast target once an identity has been accepted via `join`;
/// until then the relay knows the connection but tells it nothing.
#[derive(Debug)]
pub struct Participant {
    /// Unique connection identifier assigned by the network layer
    pub conn_id: u32,
    /// Identity accepted at join time; `None` until the participant joins
    pub identity: Option<String>,
    /// Bounded outbound channel drained by the connection's writer task
    pub sender: mpsc::Sender<Message>,
}

impl Participant {
    /// Creates a participant for a freshly accepted connection
    pub fn new(conn_id: u32, sender: mpsc::Sender<Message>) -> Self {
        Self {
            conn_id,
            identity: None,
            sender,
        }
    }

    /// True once an identity has been accepted for this connection
    pub fn has_joined(&self) -> bool {
        self.identity.is_some()
    }
}

/// Cheap clone of the fields the dispatcher needs for one fan-out.
#[derive(Debug, Clone)]
pub struct ParticipantHandle {
    pub conn_id: u32,
    pub sender: mpsc::Sender<Message>,
}

/// Tracks all participant connections for the session
///
/// The registry is keyed by connection id, with the player-chosen identity
/// carried as metadata. Keying by connection keeps broadcast targeting
/// unambiguous, and the identity check on `join` refuses a name that is
/// already active elsewhere.
pub struct ParticipantRegistry {
    /// Connected participants indexed by their connection id
    participants: HashMap<u32, Participant>,
}

impl ParticipantRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            participants: HashMap::new(),
        }
    }

    /// Records a freshly accepted connection
    ///
    /// The participant starts unjoined and receives no broadcasts until a
    /// join request is accepted for it.
    pub fn insert(&mut self, conn_id: u32, sender: mpsc::Sender<Message>) {
        self.participants
            .insert(conn_id, Participant::new(conn_id, sender));
    }

    /// Accepts an identity for a connection
    ///
    /// Fails with `DuplicateIdentity` if the identity is already active on
    /// another connection. A second join from the same connection renames it.
    /// Joining an unknown connection id is a no-op; the disconnect that made
    /// it unknown is already being handled elsewhere.
    pub fn join(&mut self, conn_id: u32, identity: &str) -> Result<(), RegistryError> {
        let taken = self
            .participants
            .values()
            .any(|p| p.conn_id != conn_id && p.identity.as_deref() == Some(identity));
        if taken {
            return Err(RegistryError::DuplicateIdentity(identity.to_string()));
        }

        if let Some(participant) = self.participants.get_mut(&conn_id) {
            info!("Participant {} joined as \"{}\"", conn_id, identity);
            participant.identity = Some(identity.to_string());
        }

        Ok(())
    }

    /// Removes a participant
    ///
    /// Idempotent: removing an unknown or already-removed connection id is a
    /// no-op, since disconnects can race with broadcast eviction.
    pub fn leave(&mut self, conn_id: u32) {
        if let Some(participant) = self.participants.remove(&conn_id) {
            match participant.identity {
                Some(identity) => info!("Participant {} (\"{}\") left", conn_id, identity),
                None => info!("Participant {} left before joining", conn_id),
            }
        }
    }

    /// Snapshot of all joined participants for one broadcast
    ///
    /// The snapshot is a copy of ids and channel senders, so the dispatcher
    /// can iterate it while joins and leaves mutate the live set.
    pub fn joined(&self) -> Vec<ParticipantHandle> {
        self.participants
            .values()
            .filter(|p| p.has_joined())
            .map(|p| ParticipantHandle {
                conn_id: p.conn_id,
                sender: p.sender.clone(),
            })
            .collect()
    }

    /// Outbound channel for a single connection, for direct replies
    pub fn sender_for(&self, conn_id: u32) -> Option<mpsc::Sender<Message>> {
        self.participants.get(&conn_id).map(|p| p.sender.clone())
    }

    /// Identity of a connection, if it has joined
    pub fn identity_of(&self, conn_id: u32) -> Option<&str> {
        self.participants
            .get(&conn_id)
            .and_then(|p| p.identity.as_deref())
    }

    /// Returns the number of tracked connections, joined or not
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Returns true if no connections are tracked
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
