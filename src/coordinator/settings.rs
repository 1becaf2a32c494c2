// src/coordinator/settings.rs
//! Match configuration knobs
//!
//! All policies are fixed once at configuration time; nothing here changes
//! mid-match.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Whether both teams act within one round or teams alternate rounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovePolicy {
    /// Teams act in index order within each round; the second team sees
    /// the first team's already-applied moves
    BothPerRound,

    /// One team acts per round, alternating, blue first
    Alternating,
}

/// How strikes accumulate toward elimination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrikePolicy {
    /// Only an unbroken run of faults counts; a valid reply resets it
    Consecutive,

    /// Every fault counts for the whole match
    Cumulative,
}

#[derive(Debug, Clone)]
pub struct MatchSettings {
    /// Hard per-move cap; the effective deadline is
    /// `min(remaining budget, move_timeout)`
    pub move_timeout: Duration,

    /// Handshake deadline, deliberately shorter than a move deadline
    pub handshake_timeout: Duration,

    /// Per-match wall-time budget per team
    pub team_budget: Duration,

    /// Faults at or above this count eliminate the team
    pub strike_limit: u32,

    pub strike_policy: StrikePolicy,

    /// Match concludes by score comparison after this many rounds
    pub round_limit: u32,

    pub move_policy: MovePolicy,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            move_timeout: Duration::from_secs(3),
            handshake_timeout: Duration::from_secs(1),
            team_budget: Duration::from_secs(300),
            strike_limit: 3,
            strike_policy: StrikePolicy::Consecutive,
            round_limit: 300,
            move_policy: MovePolicy::BothPerRound,
        }
    }
}
