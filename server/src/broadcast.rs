//! Fan-out delivery to joined participants
//!
//! The dispatcher serializes a payload once and enqueues it into every
//! participant's bounded outbound channel. Per-participant failure is
//! handled inside the loop: a full buffer costs that participant one frame,
//! a closed channel marks them for eviction. Neither outcome can abort the
//! fan-out or reach the coordinator as an error.

use crate::registry::ParticipantHandle;
use log::{debug, warn};
use shared::ServerMessage;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_tungstenite::tungstenite::Message;

/// Capacity of each participant's outbound channel. Enqueueing never blocks
/// the coordinator; a participant that stops reading overflows its own
/// buffer and starts missing frames instead of stalling the session.
pub const OUTBOUND_BUFFER: usize = 64;

/// Sends `message` to every participant in the snapshot.
///
/// Returns the connection ids whose channels are closed, for the caller to
/// evict. Delivery order per participant matches issue order: all broadcasts
/// are issued from the single coordinator task and each participant's frames
/// traverse one FIFO channel into one writer task.
pub fn broadcast(targets: &[ParticipantHandle], message: &ServerMessage) -> Vec<u32> {
    let payload = match serde_json::to_string(message) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Failed to encode broadcast payload: {}", e);
            return Vec::new();
        }
    };

    let mut dead = Vec::new();
    for target in targets {
        match target.sender.try_send(Message::Text(payload.clone())) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                debug!(
                    "Outbound buffer full for participant {}, dropping frame",
                    target.conn_id
                );
            }
            Err(TrySendError::Closed(_)) => {
                dead.push(target.conn_id);
            }
        }
    }

    dead
}

/// Sends `message` to a single participant.
///
/// Used for direct replies (`joined`, `rejected`). Failure is logged and
/// dropped; the connection's own disconnect path performs cleanup.
pub fn send_to(conn_id: u32, sender: &mpsc::Sender<Message>, message: &ServerMessage) {
    let payload = match serde_json::to_string(message) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Failed to encode reply payload: {}", e);
            return;
        }
    };

    if let Err(e) = sender.try_send(Message::Text(payload)) {
        debug!("Failed to queue reply for participant {}: {}", conn_id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Move;

    fn handle(conn_id: u32, capacity: usize) -> (ParticipantHandle, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            ParticipantHandle {
                conn_id,
                sender: tx,
            },
            rx,
        )
    }

    fn text_of(message: Message) -> String {
        match message {
            Message::Text(text) => text,
            other => panic!("Expected text frame, got {:?}", other),
        }
    }

    #[test]
    fn test_broadcast_reaches_all_participants() {
        let (h1, mut rx1) = handle(1, 8);
        let (h2, mut rx2) = handle(2, 8);
        let (h3, mut rx3) = handle(3, 8);

        let message = ServerMessage::UpdateBoard {
            mv: Move::new(0, 6, 0, 4),
        };
        let dead = broadcast(&[h1, h2, h3], &message);

        assert!(dead.is_empty());
        let expected = serde_json::to_string(&message).unwrap();
        assert_eq!(text_of(rx1.try_recv().unwrap()), expected);
        assert_eq!(text_of(rx2.try_recv().unwrap()), expected);
        assert_eq!(text_of(rx3.try_recv().unwrap()), expected);
    }

    #[test]
    fn test_closed_channel_does_not_abort_fanout() {
        let (h1, mut rx1) = handle(1, 8);
        let (h2, rx2) = handle(2, 8);
        let (h3, mut rx3) = handle(3, 8);
        drop(rx2);

        let message = ServerMessage::ProposedMove {
            mv: Move::new(0, 6, 0, 4),
            count: 1,
        };
        let dead = broadcast(&[h1, h2, h3], &message);

        assert_eq!(dead, vec![2]);
        assert!(rx1.try_recv().is_ok());
        assert!(rx3.try_recv().is_ok());
    }

    #[test]
    fn test_full_buffer_drops_frame_without_eviction() {
        let (h1, mut rx1) = handle(1, 1);
        h1.sender
            .try_send(Message::Text("backlog".to_string()))
            .unwrap();

        let message = ServerMessage::UpdateBoard {
            mv: Move::new(0, 6, 0, 4),
        };
        let dead = broadcast(&[h1], &message);

        // Not evicted, but the new frame was dropped.
        assert!(dead.is_empty());
        assert_eq!(text_of(rx1.try_recv().unwrap()), "backlog");
        assert!(rx1.try_recv().is_err());
    }

    #[test]
    fn test_broadcast_to_empty_snapshot() {
        let message = ServerMessage::UpdateBoard {
            mv: Move::new(0, 6, 0, 4),
        };
        assert!(broadcast(&[], &message).is_empty());
    }

    #[test]
    fn test_send_to_queues_reply() {
        let (h1, mut rx1) = handle(1, 8);
        let message = ServerMessage::Joined {
            message: "Welcome, p1!".to_string(),
        };

        send_to(h1.conn_id, &h1.sender, &message);

        assert_eq!(
            text_of(rx1.try_recv().unwrap()),
            r#"{"type":"joined","message":"Welcome, p1!"}"#
        );
    }

    #[test]
    fn test_send_to_closed_channel_is_silent() {
        let (h1, rx1) = handle(1, 8);
        drop(rx1);

        let message = ServerMessage::Joined {
            message: "Welcome, p1!".to_string(),
        };
        // Must not panic or propagate an error.
        send_to(h1.conn_id, &h1.sender, &message);
    }
}
