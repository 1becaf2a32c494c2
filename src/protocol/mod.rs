// src/protocol/mod.rs
//! Agent wire protocol
//!
//! Typed messages carried as JSON payloads inside length-delimited frames.
//! Every move request/reply pair is tagged with the round number it belongs
//! to; the proxy uses the tag to discard stray replies left over from an
//! abandoned (timed-out) request, so a stale reply can never be attributed
//! to a later round.
//!
//! Request/reply shapes:
//!
//! - handshake: `{type: "handshake", team_id}` both ways
//! - moves request: `{type: "moves", round, team_id, state, time_budget_ms}`
//! - moves reply: `{type: "moves", round, team_id, moves, diagnostics?}`

use crate::state::{BotMove, Direction, GameState};
use serde::{Deserialize, Serialize};

/// A single move as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMove {
    pub bot_index: usize,
    pub direction: Direction,
}

impl From<WireMove> for BotMove {
    fn from(m: WireMove) -> Self {
        BotMove::new(m.bot_index, m.direction)
    }
}

impl From<BotMove> for WireMove {
    fn from(m: BotMove) -> Self {
        WireMove {
            bot_index: m.bot_index,
            direction: m.direction,
        }
    }
}

/// Engine-to-agent messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentRequest {
    /// Pre-match identity/capability probe
    Handshake { team_id: String },

    /// Request the team's moves for one round
    Moves {
        round: u32,
        team_id: String,
        state: GameState,
        time_budget_ms: u64,
    },

    /// Courtesy notification that the match is over; no reply expected
    GameOver { round: u32 },
}

/// Agent-to-engine messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentReply {
    /// Identity confirmation; `team_id` must echo the request
    Handshake { team_id: String },

    /// The team's intended moves for the tagged round
    Moves {
        round: u32,
        team_id: String,
        moves: Vec<WireMove>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        diagnostics: Option<String>,
    },
}

impl AgentRequest {
    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn decode(payload: &[u8]) -> serde_json::Result<AgentRequest> {
        serde_json::from_slice(payload)
    }
}

impl AgentReply {
    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn decode(payload: &[u8]) -> serde_json::Result<AgentReply> {
        serde_json::from_slice(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Layout;

    #[test]
    fn test_handshake_round_trip() {
        let req = AgentRequest::Handshake {
            team_id: "blue".into(),
        };
        let decoded = AgentRequest::decode(&req.encode().unwrap()).unwrap();
        assert!(matches!(decoded, AgentRequest::Handshake { team_id } if team_id == "blue"));
    }

    #[test]
    fn test_moves_request_carries_round_and_budget() {
        let layout = Layout::parse("####\n#01#\n####", 1).unwrap();
        let state = GameState::from_layout(&layout);
        let req = AgentRequest::Moves {
            round: 7,
            team_id: "red".into(),
            state,
            time_budget_ms: 1500,
        };
        let value: serde_json::Value = serde_json::from_slice(&req.encode().unwrap()).unwrap();
        assert_eq!(value["type"], "moves");
        assert_eq!(value["round"], 7);
        assert_eq!(value["time_budget_ms"], 1500);
    }

    #[test]
    fn test_reply_diagnostics_optional() {
        let json = r#"{"type":"moves","round":3,"team_id":"blue","moves":[{"bot_index":0,"direction":"EAST"}]}"#;
        let reply = AgentReply::decode(json.as_bytes()).unwrap();
        match reply {
            AgentReply::Moves {
                round,
                moves,
                diagnostics,
                ..
            } => {
                assert_eq!(round, 3);
                assert_eq!(moves[0].direction, Direction::East);
                assert!(diagnostics.is_none());
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_reply_rejected() {
        assert!(AgentReply::decode(b"{\"type\":\"moves\"}").is_err());
        assert!(AgentReply::decode(b"not json at all").is_err());
    }
}
