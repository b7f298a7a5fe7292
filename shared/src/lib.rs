use serde::{Deserialize, Serialize};
use std::fmt;

/// Board dimension; coordinates are valid in `[0, BOARD_SIZE)`.
pub const BOARD_SIZE: u8 = 8;

/// A four-coordinate relocation instruction proposed by a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    pub from_x: u8,
    pub from_y: u8,
    pub to_x: u8,
    pub to_y: u8,
}

impl Move {
    pub fn new(from_x: u8, from_y: u8, to_x: u8, to_y: u8) -> Self {
        Self {
            from_x,
            from_y,
            to_x,
            to_y,
        }
    }

    /// True when all four coordinates lie inside `[0, board_size)`.
    ///
    /// The relay itself never rejects out-of-bounds moves; this is the seam
    /// where a deployment can layer validation before tallying.
    pub fn in_bounds(&self, board_size: u8) -> bool {
        self.from_x < board_size
            && self.from_y < board_size
            && self.to_x < board_size
            && self.to_y < board_size
    }

    /// Canonical dedup key for this move.
    pub fn key(&self) -> MoveKey {
        MoveKey([self.from_x, self.from_y, self.to_x, self.to_y])
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})->({},{})",
            self.from_x, self.from_y, self.to_x, self.to_y
        )
    }
}

/// Identity of a move within a round. Two moves share a key iff all four
/// coordinates are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveKey([u8; 4]);

/// Messages sent by participants over their connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    JoinGame {
        #[serde(rename = "playerId")]
        player_id: String,
    },
    ProposeMove {
        #[serde(rename = "move")]
        mv: Move,
    },
    FinalizeMove {
        #[serde(rename = "move")]
        mv: Move,
    },
}

/// Messages broadcast or replied by the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    Joined {
        message: String,
    },
    Rejected {
        reason: String,
    },
    ProposedMove {
        #[serde(rename = "move")]
        mv: Move,
        count: u32,
    },
    UpdateBoard {
        #[serde(rename = "move")]
        mv: Move,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_key_equality() {
        let a = Move::new(0, 6, 0, 4);
        let b = Move::new(0, 6, 0, 4);
        let c = Move::new(0, 6, 0, 5);

        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn test_move_key_distinguishes_direction() {
        // Reversing a move must not collide with the original.
        let forward = Move::new(0, 6, 0, 4);
        let reverse = Move::new(0, 4, 0, 6);
        assert_ne!(forward.key(), reverse.key());
    }

    #[test]
    fn test_in_bounds() {
        assert!(Move::new(0, 0, 7, 7).in_bounds(BOARD_SIZE));
        assert!(!Move::new(0, 0, 8, 7).in_bounds(BOARD_SIZE));
        assert!(!Move::new(8, 0, 0, 0).in_bounds(BOARD_SIZE));
        assert!(Move::new(0, 0, 0, 0).in_bounds(1));
        assert!(!Move::new(0, 1, 0, 0).in_bounds(1));
    }

    #[test]
    fn test_move_display() {
        let mv = Move::new(0, 6, 0, 4);
        assert_eq!(mv.to_string(), "(0,6)->(0,4)");
    }

    #[test]
    fn test_client_message_wire_names() {
        let json = r#"{"type":"joinGame","playerId":"p1"}"#;
        match serde_json::from_str::<ClientMessage>(json).unwrap() {
            ClientMessage::JoinGame { player_id } => assert_eq!(player_id, "p1"),
            other => panic!("Unexpected message: {:?}", other),
        }

        let json = r#"{"type":"proposeMove","move":{"fromX":0,"fromY":6,"toX":0,"toY":4}}"#;
        match serde_json::from_str::<ClientMessage>(json).unwrap() {
            ClientMessage::ProposeMove { mv } => assert_eq!(mv, Move::new(0, 6, 0, 4)),
            other => panic!("Unexpected message: {:?}", other),
        }

        let json = r#"{"type":"finalizeMove","move":{"fromX":4,"fromY":1,"toX":4,"toY":3}}"#;
        match serde_json::from_str::<ClientMessage>(json).unwrap() {
            ClientMessage::FinalizeMove { mv } => assert_eq!(mv, Move::new(4, 1, 4, 3)),
            other => panic!("Unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_server_message_wire_names() {
        let joined = ServerMessage::Joined {
            message: "Welcome, p1!".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&joined).unwrap(),
            r#"{"type":"joined","message":"Welcome, p1!"}"#
        );

        let proposed = ServerMessage::ProposedMove {
            mv: Move::new(0, 6, 0, 4),
            count: 2,
        };
        assert_eq!(
            serde_json::to_string(&proposed).unwrap(),
            r#"{"type":"proposedMove","move":{"fromX":0,"fromY":6,"toX":0,"toY":4},"count":2}"#
        );

        let update = ServerMessage::UpdateBoard {
            mv: Move::new(0, 6, 0, 4),
        };
        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"type":"updateBoard","move":{"fromX":0,"fromY":6,"toX":0,"toY":4}}"#
        );
    }

    #[test]
    fn test_unknown_message_type_fails_to_parse() {
        let json = r#"{"type":"castleKingside","playerId":"p1"}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn test_missing_field_fails_to_parse() {
        let json = r#"{"type":"proposeMove","move":{"fromX":0,"fromY":6,"toX":0}}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }
}
