// src/coordinator/outcome.rs
//! Match phases and final outcomes

use crate::state::TeamId;
use serde::{Deserialize, Serialize};

/// Coordinator state machine; `Finished` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Setup,
    ValidatingTeams,
    Running,
    Finished,
}

/// Why an eliminated team was eliminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EliminationCause {
    /// Strike limit reached
    Strikes,

    /// Per-match time budget exhausted
    BudgetExhausted,
}

/// Reason code distinguishing how the match concluded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeReason {
    /// The rules engine declared the game over
    RulesDecision,

    /// The configured round limit was reached; winner by score comparison
    RoundLimit,

    /// A team was eliminated; the opponent wins by forfeit
    Elimination {
        team: TeamId,
        cause: EliminationCause,
    },

    /// Handshake or spawn failure before any round executed
    SetupFailure { failed: Vec<TeamId> },
}

/// Final result of a match, always carrying a reason code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// `None` on a draw (or a setup failure of both teams)
    pub winner: Option<TeamId>,
    pub reason: OutcomeReason,
    pub rounds_played: u32,
    pub final_scores: [u32; 2],
}

impl MatchOutcome {
    /// Outcome of a match that never started because one or both teams
    /// failed setup (spawn or handshake). With a single failed team the
    /// opponent wins by default; with both failed there is no winner.
    /// No round is ever executed on this path.
    pub fn setup_failure(failed: Vec<TeamId>, final_scores: [u32; 2]) -> Self {
        let winner = (failed.len() == 1).then(|| failed[0].opponent());
        Self {
            winner,
            reason: OutcomeReason::SetupFailure { failed },
            rounds_played: 0,
            final_scores,
        }
    }

    /// Whether this outcome came from gameplay rather than agent failure
    pub fn decided_by_rules(&self) -> bool {
        matches!(
            self.reason,
            OutcomeReason::RulesDecision | OutcomeReason::RoundLimit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_failure_awards_opponent() {
        let outcome = MatchOutcome::setup_failure(vec![TeamId::Blue], [0, 0]);
        assert_eq!(outcome.winner, Some(TeamId::Red));
        assert_eq!(outcome.rounds_played, 0);
        assert_eq!(
            outcome.reason,
            OutcomeReason::SetupFailure {
                failed: vec![TeamId::Blue]
            }
        );
        assert!(!outcome.decided_by_rules());
    }

    #[test]
    fn test_setup_failure_of_both_teams_has_no_winner() {
        let outcome = MatchOutcome::setup_failure(vec![TeamId::Blue, TeamId::Red], [0, 0]);
        assert_eq!(outcome.winner, None);
        assert_eq!(outcome.rounds_played, 0);
    }
}
