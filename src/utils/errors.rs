// src/utils/errors.rs
//! Engine error taxonomy
//!
//! Errors fall into three tiers with distinct propagation policies:
//!
//! - **Setup-tier** (`Spawn`, `Setup`): the match never starts; the engine
//!   reports a definite outcome in the opponent's favor.
//! - **Round-tier** (`AgentTimeout`, `AgentProtocol`, `AgentCrashed`,
//!   `AgentAlreadyFailed`): recovered inside the turn coordinator by
//!   substituting a forfeit and counting a strike; these never escape the
//!   match loop.
//! - **Fatal-tier** (`Rules`, `Storage`, `Io`, ...): contract violations by
//!   collaborators the engine cannot recover from; propagated to the caller.

use crate::rules::RulesError;
use crate::state::LayoutError;
use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum EngineError {
    /// The agent executable could not be started
    #[error("failed to spawn agent process: {0}")]
    Spawn(String),

    /// Low-level channel failure (socket error, framing corruption)
    #[error("transport error: {0}")]
    Transport(String),

    /// The peer closed the channel
    #[error("channel closed by peer")]
    ChannelClosed,

    /// `receive` deadline elapsed with no complete frame
    #[error("receive deadline elapsed")]
    ReceiveTimeout,

    /// The agent did not produce a valid reply within the round deadline
    #[error("agent '{0}' did not reply within the deadline")]
    AgentTimeout(String),

    /// The agent replied with something that violates the wire schema
    #[error("agent '{team}' protocol violation: {reason}")]
    AgentProtocol { team: String, reason: String },

    /// The agent process or its connection terminated mid-request
    #[error("agent '{team}' crashed: {reason}")]
    AgentCrashed { team: String, reason: String },

    /// The agent previously failed terminally; the transport was not touched
    #[error("agent '{0}' already failed")]
    AgentAlreadyFailed(String),

    /// Pre-match failure (handshake or spawn); the match never starts
    #[error("match setup failed: {0}")]
    Setup(String),

    /// Rules engine contract violation, always fatal
    #[error("rules engine error: {0}")]
    Rules(#[from] RulesError),

    /// Maze layout could not be parsed
    #[error("invalid layout: {0}")]
    Layout(#[from] LayoutError),

    /// Replay re-application produced a state that differs from the record
    #[error("replay divergence at round {0}")]
    ReplayDivergence(u32),

    /// Recorder persistence failure (downgraded to a warning by callers)
    #[error("record storage failed: {0}")]
    Storage(String),

    /// Configuration could not be loaded or deserialized
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Whether this error is a per-round agent fault the coordinator
    /// recovers from (forfeit + strike) rather than a fatal condition.
    pub fn is_agent_fault(&self) -> bool {
        matches!(
            self,
            EngineError::AgentTimeout(_)
                | EngineError::AgentProtocol { .. }
                | EngineError::AgentCrashed { .. }
                | EngineError::AgentAlreadyFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_fault_classification() {
        assert!(EngineError::AgentTimeout("blue".into()).is_agent_fault());
        assert!(EngineError::AgentAlreadyFailed("red".into()).is_agent_fault());
        assert!(!EngineError::Setup("no handshake".into()).is_agent_fault());
        assert!(!EngineError::ChannelClosed.is_agent_fault());
    }

    #[test]
    fn test_display_includes_team() {
        let err = EngineError::AgentProtocol {
            team: "blue".into(),
            reason: "bot index 7 out of range".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("blue"));
        assert!(msg.contains("bot index 7"));
    }
}
