// src/agent/proxy.rs
//! Socket-backed agent proxy
//!
//! Owns one team's message channel, enforces the wire schema, and maps
//! transport conditions onto the agent fault taxonomy. At most one request
//! is ever outstanding; replies are matched against the round tag of the
//! current request and stale tags (leftovers of an abandoned, timed-out
//! request) are discarded without affecting the current round.

use crate::agent::{AgentStatus, MoveSet, TeamAgent, ValidationStatus};
use crate::protocol::{AgentReply, AgentRequest};
use crate::state::{GameState, TeamId};
use crate::transport::MessageChannel;
use crate::utils::errors::{EngineError, Result};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

pub struct WireAgent<T> {
    team: TeamId,
    name: String,
    channel: MessageChannel<T>,
    status: AgentStatus,
    validation: ValidationStatus,
}

impl<T: AsyncRead + AsyncWrite + Unpin> WireAgent<T> {
    /// Wrap an established channel; the proxy starts in `connecting` and
    /// becomes `ready` only after a successful handshake.
    pub fn new(team: TeamId, name: impl Into<String>, channel: MessageChannel<T>) -> Self {
        Self {
            team,
            name: name.into(),
            channel,
            status: AgentStatus::Connecting,
            validation: ValidationStatus::Untested,
        }
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    pub fn validation(&self) -> ValidationStatus {
        self.validation
    }

    /// Enter the terminal failed state
    fn fail(&mut self) {
        self.status = AgentStatus::Failed;
    }

    fn protocol_error(&mut self, reason: impl Into<String>) -> EngineError {
        self.fail();
        EngineError::AgentProtocol {
            team: self.name.clone(),
            reason: reason.into(),
        }
    }

    fn crashed(&mut self, reason: impl Into<String>) -> EngineError {
        self.fail();
        EngineError::AgentCrashed {
            team: self.name.clone(),
            reason: reason.into(),
        }
    }

    /// Send with a deadline. A peer that stops draining its socket can
    /// stall a send indefinitely; a stalled send leaves a partial frame on
    /// the wire, so unlike a receive timeout this is terminal.
    async fn send_within(&mut self, payload: &[u8], deadline: Duration) -> Result<()> {
        match tokio::time::timeout(deadline, self.channel.send(payload)).await {
            Err(_) => {
                warn!(team = %self.name, "Send stalled past the deadline");
                self.fail();
                Err(EngineError::AgentTimeout(self.name.clone()))
            }
            Ok(Err(e)) => Err(self.crashed(format!("send failed: {}", e))),
            Ok(Ok(())) => Ok(()),
        }
    }

    /// Check a decoded moves reply against the current request.
    ///
    /// `Ok(None)` means the reply was a stale leftover to be discarded.
    fn screen_reply(
        &mut self,
        reply: AgentReply,
        round: u32,
        roster: usize,
    ) -> Result<Option<MoveSet>> {
        match reply {
            AgentReply::Handshake { .. } => {
                Err(self.protocol_error("unexpected handshake reply during match"))
            }
            AgentReply::Moves {
                round: reply_round,
                team_id,
                moves,
                diagnostics,
            } => {
                if reply_round < round {
                    debug!(
                        team = %self.name,
                        stale = reply_round,
                        current = round,
                        "Discarding stale reply from an abandoned request"
                    );
                    return Ok(None);
                }
                if reply_round > round {
                    return Err(self.protocol_error(format!(
                        "reply tagged with future round {} (current {})",
                        reply_round, round
                    )));
                }
                if team_id != self.name {
                    return Err(self
                        .protocol_error(format!("reply claims team identity '{}'", team_id)));
                }
                if moves.len() != roster {
                    return Err(self.protocol_error(format!(
                        "expected {} moves, got {}",
                        roster,
                        moves.len()
                    )));
                }
                let mut seen = vec![false; roster];
                for m in &moves {
                    if m.bot_index >= roster {
                        return Err(self
                            .protocol_error(format!("bot index {} out of range", m.bot_index)));
                    }
                    if seen[m.bot_index] {
                        return Err(self
                            .protocol_error(format!("duplicate move for bot {}", m.bot_index)));
                    }
                    seen[m.bot_index] = true;
                }
                Ok(Some(MoveSet {
                    moves: moves.into_iter().map(Into::into).collect(),
                    diagnostics,
                }))
            }
        }
    }

}

impl<T: AsyncRead + AsyncWrite + Unpin> TeamAgent for WireAgent<T> {
    fn team_name(&self) -> &str {
        &self.name
    }

    async fn validate_team(&mut self, deadline: Duration) -> Result<()> {
        if self.status != AgentStatus::Connecting {
            return Err(self.protocol_error("handshake attempted twice"));
        }

        let probe = AgentRequest::Handshake {
            team_id: self.name.clone(),
        };
        if let Err(e) = self.send_within(&probe.encode()?, deadline).await {
            self.validation = ValidationStatus::Failed;
            return Err(e);
        }

        let result = match self.channel.receive(deadline).await {
            Err(EngineError::ReceiveTimeout) => {
                Err(EngineError::AgentTimeout(self.name.clone()))
            }
            Err(EngineError::ChannelClosed) => Err(self.crashed("hung up during handshake")),
            Err(e) => Err(self.crashed(format!("handshake receive failed: {}", e))),
            Ok(payload) => match AgentReply::decode(&payload) {
                Err(e) => Err(self.protocol_error(format!("unparseable handshake: {}", e))),
                Ok(AgentReply::Handshake { team_id }) if team_id == self.name => Ok(()),
                Ok(AgentReply::Handshake { team_id }) => Err(self.protocol_error(format!(
                    "handshake identity mismatch: expected '{}', got '{}'",
                    self.name, team_id
                ))),
                Ok(_) => Err(self.protocol_error("expected a handshake reply")),
            },
        };

        match result {
            Ok(()) => {
                debug!(team = %self.name, "Handshake validated");
                self.status = AgentStatus::Ready;
                self.validation = ValidationStatus::Validated;
                Ok(())
            }
            Err(e) => {
                self.fail();
                self.validation = ValidationStatus::Failed;
                Err(e)
            }
        }
    }

    async fn request_moves(
        &mut self,
        state: &GameState,
        budget: Duration,
        deadline: Duration,
    ) -> Result<MoveSet> {
        if self.status == AgentStatus::Failed {
            return Err(EngineError::AgentAlreadyFailed(self.name.clone()));
        }
        if self.status != AgentStatus::Ready {
            return Err(self.protocol_error(format!(
                "request while proxy is {:?}",
                self.status
            )));
        }

        let round = state.round;
        let roster = state.team_bot_count(self.team);
        let request = AgentRequest::Moves {
            round,
            team_id: self.name.clone(),
            state: state.clone(),
            time_budget_ms: budget.as_millis() as u64,
        };
        let expires = Instant::now() + deadline;
        self.send_within(&request.encode()?, deadline).await?;
        self.status = AgentStatus::AwaitingReply;

        // Stale replies from an earlier abandoned request may arrive first;
        // keep reading until the deadline, discarding anything tagged with
        // an older round.
        loop {
            let remaining = expires.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                self.status = AgentStatus::Ready;
                return Err(EngineError::AgentTimeout(self.name.clone()));
            }
            match self.channel.receive(remaining).await {
                Err(EngineError::ReceiveTimeout) => {
                    // The request is abandoned, not retried; a late reply
                    // will carry this round's tag and be screened out.
                    warn!(team = %self.name, round, "Move request timed out");
                    self.status = AgentStatus::Ready;
                    return Err(EngineError::AgentTimeout(self.name.clone()));
                }
                Err(EngineError::ChannelClosed) => {
                    return Err(self.crashed("hung up while a request was pending"));
                }
                Err(e) => {
                    return Err(self.crashed(format!("receive failed: {}", e)));
                }
                Ok(payload) => {
                    let reply = match AgentReply::decode(&payload) {
                        Ok(reply) => reply,
                        Err(e) => {
                            return Err(self.protocol_error(format!("unparseable reply: {}", e)))
                        }
                    };
                    match self.screen_reply(reply, round, roster)? {
                        Some(move_set) => {
                            self.status = AgentStatus::Ready;
                            return Ok(move_set);
                        }
                        None => continue,
                    }
                }
            }
        }
    }

    /// Courtesy game-over notification; errors are irrelevant at this point
    async fn notify_game_over(&mut self, round: u32) {
        if self.status == AgentStatus::Failed {
            return;
        }
        if let Ok(payload) = (AgentRequest::GameOver { round }).encode() {
            let _ = self.channel.send(&payload).await;
        }
    }
}
