// src/lib.rs
//! Mazeclash Match Engine Library
//!
//! A turn-based, two-team grid game engine whose teams' decision logic
//! runs in independent, possibly untrusted, out-of-process agents. The
//! engine synchronizes an authoritative game loop with those agents while
//! keeping the match deterministic and fully replayable.
//!
//! # Architecture
//!
//! - **transport**: framed message channels with receive timeouts
//! - **protocol**: the typed, round-tagged agent wire protocol
//! - **agent**: proxies presenting a uniform "ask for moves" contract
//! - **supervisor**: agent process lifecycle (spawn, monitor, terminate)
//! - **coordinator**: the authoritative turn loop and failure containment
//! - **recorder**: append-only match log
//! - **replay**: replay persistence and deterministic verification
//! - **rules**: the rules-engine seam and the built-in maze rules
//! - **state**: immutable game state snapshots and layout parsing
//! - **observability**: tracing setup
//! - **utils**: errors and configuration

pub mod agent;
pub mod coordinator;
pub mod observability;
pub mod protocol;
pub mod recorder;
pub mod replay;
pub mod rules;
pub mod state;
pub mod supervisor;
pub mod transport;
pub mod utils;

// Re-export commonly used types
pub use agent::{ScriptedAgent, TeamAgent, WireAgent};
pub use coordinator::{MatchCoordinator, MatchOutcome, MatchSettings, OutcomeReason};
pub use recorder::{MatchRecord, MatchRecorder};
pub use rules::{MazeRules, RulesEngine};
pub use state::{GameState, Layout, TeamId};
pub use utils::config::EngineConfig;
pub use utils::errors::{EngineError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
