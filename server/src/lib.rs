//! # Move Relay Server Library
//!
//! This library implements the authoritative relay for consensus chess: every
//! connected participant may propose a move for the current round, the relay
//! tallies support for each distinct proposal, and a finalize request closes
//! the round and announces the winning move to everyone. The relay is a pure
//! coordination core — it does not validate chess legality, enforce turn
//! order among players, persist history, or authenticate participants.
//!
//! ## Core Responsibilities
//!
//! ### Session Membership
//! Participants connect over WebSocket and register an identity with a join
//! request. The registry tracks each connection for its lifetime, rejects
//! identities that are already active, and absorbs disconnects idempotently
//! so cleanup can race with normal processing.
//!
//! ### Proposal Tallying
//! Proposals for identical moves within a round collapse onto one ledger
//! entry whose support count grows with each submission. Finalizing a round
//! atomically empties the ledger, so a later proposal of the same move starts
//! counting from one again.
//!
//! ### State Broadcasting
//! Every tally update and every finalized move is fanned out to all joined
//! participants. Delivery is per-target isolated: a slow or dead connection
//! costs only its own frames and never stalls the rest of the session.
//!
//! ## Architecture Design
//!
//! ### Single Coordinator Task
//! All registry and ledger mutation happens on one task draining a shared
//! event channel. Connection tasks translate socket traffic into events and
//! never touch shared state directly. This serializes `propose`/`clear`/
//! `join`/`leave`, which is what makes the tally exact (no lost updates) and
//! gives broadcasts a single issue order.
//!
//! ### Bounded Outbound Channels
//! Each connection owns a bounded queue between the coordinator and its
//! writer task. The dispatcher enqueues without blocking, so broadcast
//! fan-out cannot be held hostage by one stalled reader.
//!
//! ## Module Organization
//!
//! ### Registry Module (`registry`)
//! Connection registry: identity assignment on join, idempotent removal,
//! copy-on-read snapshots of broadcast targets.
//!
//! ### Ledger Module (`ledger`)
//! Per-round proposal ledger keyed by canonical move identity.
//!
//! ### Coordinator Module (`coordinator`)
//! The session event loop tying registry, ledger and dispatcher together.
//!
//! ### Broadcast Module (`broadcast`)
//! Serialize-once fan-out with per-participant failure isolation.
//!
//! ### Network Module (`network`)
//! WebSocket accept loop, per-connection reader/writer tasks, and inbound
//! frame decoding. Malformed frames are dropped here so one bad client
//! message can never disturb the session.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::coordinator::Coordinator;
//! use server::network::NetworkServer;
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (event_tx, event_rx) = mpsc::unbounded_channel();
//!
//!     let relay = NetworkServer::bind("127.0.0.1:3001").await?;
//!
//!     tokio::spawn(Coordinator::new().run(event_rx));
//!     relay.run(event_tx).await;
//!
//!     Ok(())
//! }
//! ```

pub mod broadcast;
pub mod coordinator;
pub mod ledger;
pub mod network;
pub mod registry;
