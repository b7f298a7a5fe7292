//! Session coordination: the single task that owns registry and ledger
//!
//! Connection tasks translate socket traffic into [`SessionEvent`]s and send
//! them over one shared channel. The coordinator drains that channel on a
//! single task, so every `join`/`leave`/`propose`/`clear` is serialized and
//! broadcasts have one well-defined issue order. Handlers are synchronous
//! and never await while holding state.

use crate::broadcast;
use crate::ledger::ProposalLedger;
use crate::registry::{ParticipantRegistry, RegistryError};
use log::{debug, info, warn};
use shared::{ClientMessage, Move, ServerMessage};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Events sent from connection tasks to the coordinator
#[derive(Debug)]
pub enum SessionEvent {
    /// A connection finished its handshake; `sender` is its outbound channel
    Connected {
        conn_id: u32,
        sender: mpsc::Sender<Message>,
    },
    /// A decoded inbound message from a connection
    Inbound {
        conn_id: u32,
        message: ClientMessage,
    },
    /// The connection is gone; may arrive more than once per connection
    Disconnected { conn_id: u32 },
}

/// Orchestrates the proposal/finalize lifecycle for one session
pub struct Coordinator {
    registry: ParticipantRegistry,
    ledger: ProposalLedger,
}

impl Coordinator {
    pub fn new() -> Self {
        Self {
            registry: ParticipantRegistry::new(),
            ledger: ProposalLedger::new(),
        }
    }

    /// Drains the session event channel until every sender is gone.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<SessionEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event);
        }
        info!("Session event channel closed, coordinator stopping");
    }

    /// Applies a single event to the session state.
    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Connected { conn_id, sender } => {
                debug!("Connection {} registered", conn_id);
                self.registry.insert(conn_id, sender);
            }
            SessionEvent::Inbound { conn_id, message } => {
                self.handle_message(conn_id, message);
            }
            SessionEvent::Disconnected { conn_id } => {
                self.registry.leave(conn_id);
            }
        }
    }

    fn handle_message(&mut self, conn_id: u32, message: ClientMessage) {
        match message {
            ClientMessage::JoinGame { player_id } => self.handle_join(conn_id, player_id),
            ClientMessage::ProposeMove { mv } => self.handle_propose(conn_id, mv),
            ClientMessage::FinalizeMove { mv } => self.handle_finalize(conn_id, mv),
        }
    }

    /// Accepts or rejects an identity; the reply goes to the joiner only.
    fn handle_join(&mut self, conn_id: u32, player_id: String) {
        match self.registry.join(conn_id, &player_id) {
            Ok(()) => {
                self.reply(
                    conn_id,
                    &ServerMessage::Joined {
                        message: format!("Welcome, {}!", player_id),
                    },
                );
            }
            Err(err @ RegistryError::DuplicateIdentity(_)) => {
                warn!("Rejected join from connection {}: {}", conn_id, err);
                self.reply(
                    conn_id,
                    &ServerMessage::Rejected {
                        reason: err.to_string(),
                    },
                );
            }
        }
    }

    /// Tallies a proposal and announces the updated count to everyone,
    /// proposer included.
    fn handle_propose(&mut self, conn_id: u32, mv: Move) {
        let count = self.ledger.propose(mv);
        debug!(
            "Connection {} proposed {}, support now {}",
            conn_id, mv, count
        );
        self.announce(&ServerMessage::ProposedMove { mv, count });
    }

    /// Closes the round: empties the ledger and announces the board update.
    ///
    /// The announced move is the one asserted by the finalizer; it is not
    /// checked against the ledger.
    fn handle_finalize(&mut self, conn_id: u32, mv: Move) {
        info!("Connection {} finalized round with {}", conn_id, mv);
        self.ledger.clear();
        self.announce(&ServerMessage::UpdateBoard { mv });
    }

    fn reply(&self, conn_id: u32, message: &ServerMessage) {
        if let Some(sender) = self.registry.sender_for(conn_id) {
            broadcast::send_to(conn_id, &sender, message);
        }
    }

    /// Fans out to all joined participants and evicts dead channels.
    fn announce(&mut self, message: &ServerMessage) {
        for conn_id in broadcast::broadcast(&self.registry.joined(), message) {
            info!("Evicting participant {} with closed channel", conn_id);
            self.registry.leave(conn_id);
        }
    }

    pub fn registry(&self) -> &ParticipantRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &ProposalLedger {
        &self.ledger
    }
}
