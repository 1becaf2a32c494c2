// src/rules/mod.rs
//! Rules engine seam
//!
//! The turn coordinator consumes game rules through the [`RulesEngine`]
//! trait as a pure state-transition function: `(state, team, moves)` in,
//! `(new state, dispositions, game-over, winner)` out. Semantically illegal
//! moves (walking into a wall, leaving the board) are reinterpreted as
//! no-ops and flagged, never treated as errors; a `RulesError` signals a
//! contract violation by the caller and is always fatal.
//!
//! [`MazeRules`] is the built-in implementation: walls block movement,
//! stepping onto food consumes it for a point, and the game ends when the
//! maze runs out of food.

pub mod maze;

pub use maze::MazeRules;

use crate::state::{BotMove, GameState, TeamId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Contract violations by the rules caller; always fatal to the match
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RulesError {
    #[error("expected {expected} moves for team {team}, got {got}")]
    WrongMoveCount {
        team: TeamId,
        expected: usize,
        got: usize,
    },

    #[error("bot index {0} out of range for team {1}")]
    BotIndexOutOfRange(usize, TeamId),

    #[error("duplicate move for bot index {0}")]
    DuplicateBotIndex(usize),

    #[error("apply called on a finished game")]
    GameAlreadyOver,
}

/// How each submitted move was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDisposition {
    /// The move was legal and applied as given
    Applied,

    /// The move was semantically illegal and reinterpreted as a stop
    IllegalAsStop,

    /// The team forfeited; a stop was substituted by the coordinator
    Forfeited,
}

/// Result of applying one team's moves to a state
#[derive(Debug, Clone)]
pub struct RulesOutcome {
    /// The successor state
    pub state: GameState,

    /// One disposition per submitted move, in submission order
    pub dispositions: Vec<MoveDisposition>,

    /// Whether the rules declare the game over
    pub game_over: bool,

    /// Winner if the rules decide one; `None` on a draw or while running
    pub winner: Option<TeamId>,
}

/// Pure state-transition function consumed by the turn coordinator
pub trait RulesEngine {
    /// Apply one team's validated moves to a state, producing a new state.
    ///
    /// Implementations must be deterministic and must never mutate `state`.
    fn apply(
        &self,
        state: &GameState,
        team: TeamId,
        moves: &[BotMove],
    ) -> Result<RulesOutcome, RulesError>;
}
