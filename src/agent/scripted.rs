// src/agent/scripted.rs
//! In-process scripted agent
//!
//! Satisfies the [`TeamAgent`] contract without a process or socket, so the
//! turn coordinator can be driven deterministically in tests. Behaviors are
//! consumed front to back; once the script is exhausted the agent keeps
//! answering with its default direction for every bot.

use crate::agent::{MoveSet, TeamAgent};
use crate::state::{BotMove, Direction, GameState, TeamId};
use crate::utils::errors::{EngineError, Result};
use std::collections::VecDeque;
use std::time::Duration;

/// One scripted response to a move request
#[derive(Debug, Clone)]
pub enum ScriptedBehavior {
    /// Reply with exactly these moves
    Moves(Vec<BotMove>),

    /// Simulate a request that never gets answered
    Timeout,

    /// Simulate the process/connection dying (terminal)
    Crash,

    /// Simulate an unparseable or schema-violating reply (terminal)
    Garbage,
}

pub struct ScriptedAgent {
    team: TeamId,
    name: String,
    script: VecDeque<ScriptedBehavior>,
    default_direction: Direction,
    refuse_handshake: bool,
    failed: bool,
}

impl ScriptedAgent {
    pub fn new(team: TeamId, name: impl Into<String>) -> Self {
        Self {
            team,
            name: name.into(),
            script: VecDeque::new(),
            default_direction: Direction::Stop,
            refuse_handshake: false,
            failed: false,
        }
    }

    /// Agent that always moves every bot in `direction`
    pub fn always(team: TeamId, name: impl Into<String>, direction: Direction) -> Self {
        let mut agent = Self::new(team, name);
        agent.default_direction = direction;
        agent
    }

    /// Queue a behavior for the next unanswered request
    pub fn push(mut self, behavior: ScriptedBehavior) -> Self {
        self.script.push_back(behavior);
        self
    }

    /// Make the pre-match handshake fail
    pub fn refusing_handshake(mut self) -> Self {
        self.refuse_handshake = true;
        self
    }

    fn default_moves(&self, state: &GameState) -> Vec<BotMove> {
        (0..state.team_bot_count(self.team))
            .map(|i| BotMove::new(i, self.default_direction))
            .collect()
    }
}

impl TeamAgent for ScriptedAgent {
    fn team_name(&self) -> &str {
        &self.name
    }

    async fn validate_team(&mut self, _deadline: Duration) -> Result<()> {
        if self.refuse_handshake {
            self.failed = true;
            return Err(EngineError::AgentProtocol {
                team: self.name.clone(),
                reason: "scripted handshake refusal".into(),
            });
        }
        Ok(())
    }

    async fn request_moves(
        &mut self,
        state: &GameState,
        _budget: Duration,
        _deadline: Duration,
    ) -> Result<MoveSet> {
        if self.failed {
            return Err(EngineError::AgentAlreadyFailed(self.name.clone()));
        }
        match self.script.pop_front() {
            None => Ok(MoveSet {
                moves: self.default_moves(state),
                diagnostics: None,
            }),
            Some(ScriptedBehavior::Moves(moves)) => Ok(MoveSet {
                moves,
                diagnostics: None,
            }),
            Some(ScriptedBehavior::Timeout) => {
                // Timeouts are not terminal; the next request is served
                Err(EngineError::AgentTimeout(self.name.clone()))
            }
            Some(ScriptedBehavior::Crash) => {
                self.failed = true;
                Err(EngineError::AgentCrashed {
                    team: self.name.clone(),
                    reason: "scripted crash".into(),
                })
            }
            Some(ScriptedBehavior::Garbage) => {
                self.failed = true;
                Err(EngineError::AgentProtocol {
                    team: self.name.clone(),
                    reason: "scripted garbage reply".into(),
                })
            }
        }
    }

    async fn notify_game_over(&mut self, _round: u32) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Layout;

    fn state() -> GameState {
        let layout = Layout::parse("####\n#01#\n#..#\n####", 1).unwrap();
        GameState::from_layout(&layout)
    }

    #[tokio::test]
    async fn test_default_moves_cover_roster() {
        let mut agent = ScriptedAgent::always(TeamId::Blue, "blue", Direction::South);
        let moves = agent
            .request_moves(&state(), Duration::from_secs(1), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(moves.moves, vec![BotMove::new(0, Direction::South)]);
    }

    #[tokio::test]
    async fn test_script_consumed_in_order() {
        let mut agent = ScriptedAgent::new(TeamId::Blue, "blue")
            .push(ScriptedBehavior::Timeout)
            .push(ScriptedBehavior::Moves(vec![BotMove::new(0, Direction::East)]));

        let err = agent
            .request_moves(&state(), Duration::from_secs(1), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::AgentTimeout(_)));

        let moves = agent
            .request_moves(&state(), Duration::from_secs(1), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(moves.moves[0].direction, Direction::East);
    }

    #[tokio::test]
    async fn test_crash_is_terminal() {
        let mut agent = ScriptedAgent::new(TeamId::Red, "red").push(ScriptedBehavior::Crash);

        let err = agent
            .request_moves(&state(), Duration::from_secs(1), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::AgentCrashed { .. }));

        let err = agent
            .request_moves(&state(), Duration::from_secs(1), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::AgentAlreadyFailed(_)));
    }

    #[tokio::test]
    async fn test_handshake_refusal() {
        let mut agent = ScriptedAgent::new(TeamId::Red, "red").refusing_handshake();
        let err = agent.validate_team(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, EngineError::AgentProtocol { .. }));
    }
}
