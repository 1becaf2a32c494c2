// src/agent/mod.rs
//! Agent proxies
//!
//! A proxy presents a synchronous "ask for moves" call to the turn
//! coordinator while hiding the transport, framing, and failure mechanics
//! behind the [`TeamAgent`] trait:
//!
//! - **proxy**: [`WireAgent`], the socket-backed production proxy
//! - **scripted**: [`ScriptedAgent`], an in-process deterministic stub for
//!   driving the coordinator in tests without subprocess spawning
//!
//! Proxy state machine:
//!
//! ```text
//! unconnected → connecting → ready ⇄ awaiting_reply
//!                               ↘ failed (terminal)
//! ```
//!
//! Only `ready` accepts a new request. A timed-out request abandons the
//! in-flight reply and returns the proxy to `ready`; protocol violations
//! and crashes are terminal, and every later call fails fast with
//! `AgentAlreadyFailed` without touching the transport.

pub mod proxy;
pub mod scripted;

pub use proxy::WireAgent;
pub use scripted::{ScriptedAgent, ScriptedBehavior};

use crate::state::{BotMove, GameState};
use crate::utils::errors::Result;
use std::time::Duration;

/// Proxy lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentStatus {
    Unconnected,
    Connecting,
    Ready,
    AwaitingReply,
    Failed,
}

/// Pre-match handshake result for a team
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    Untested,
    Validated,
    Failed,
}

/// A validated set of moves returned by an agent for one round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveSet {
    pub moves: Vec<BotMove>,
    pub diagnostics: Option<String>,
}

/// The capability set the turn coordinator requires of a team's agent.
///
/// Both the socket-backed proxy and the in-process stub satisfy this
/// contract, so match logic can be exercised deterministically in tests.
#[allow(async_fn_in_trait)]
pub trait TeamAgent {
    /// The team's display name, which doubles as its wire identity
    fn team_name(&self) -> &str;

    /// One-time identity handshake before the match starts.
    ///
    /// Failure here prevents the match from starting; the coordinator
    /// reports it as a setup failure rather than a crash.
    async fn validate_team(&mut self, deadline: Duration) -> Result<()>;

    /// Ask the agent for its moves on the round `state.round` describes.
    ///
    /// `budget` is the team's remaining match-wide time budget (advisory,
    /// forwarded on the wire); `deadline` is the hard per-request cap.
    async fn request_moves(
        &mut self,
        state: &GameState,
        budget: Duration,
        deadline: Duration,
    ) -> Result<MoveSet>;

    /// Courtesy notification that the match concluded after `round`.
    ///
    /// Best-effort; no reply is expected and failures are ignored.
    async fn notify_game_over(&mut self, round: u32);
}
