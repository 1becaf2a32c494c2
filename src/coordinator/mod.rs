// src/coordinator/mod.rs
//! Turn coordinator
//!
//! The authoritative match loop. A single control task drives two
//! concurrently-alive but never-concurrently-requested agent proxies: only
//! one `request_moves` is outstanding globally at any instant, so the
//! current `GameState` has exactly one owner and no locks are needed.
//!
//! Per-round agent faults (timeout, protocol violation, crash) are
//! recovered locally: a no-op is substituted, a strike is counted, and the
//! match carries on until the strike limit or time budget eliminates the
//! team. Setup failures and eliminations conclude the match cleanly with a
//! definite winner and reason code; only rules-engine contract violations
//! propagate as errors.

pub mod outcome;
pub mod settings;

pub use outcome::{EliminationCause, MatchOutcome, MatchPhase, OutcomeReason};
pub use settings::{MatchSettings, MovePolicy, StrikePolicy};

use crate::agent::TeamAgent;
use crate::recorder::{AgentFault, MatchRecord, MatchRecorder, RecordReader, RoundEntry, TeamAction};
use crate::rules::{MoveDisposition, RulesEngine};
use crate::state::{BotMove, GameState, TeamId};
use crate::utils::errors::{EngineError, Result};
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Per-team mutable match bookkeeping, owned by the coordinator
struct TeamSlot<A> {
    id: TeamId,
    name: String,
    agent: A,
    strikes: u32,
    consecutive_strikes: u32,
    budget: std::time::Duration,
}

/// What a single team turn means for the rest of the match
enum TurnVerdict {
    Continue,
    GameOver(Option<TeamId>),
    Eliminated(EliminationCause),
}

pub struct MatchCoordinator<A, R> {
    settings: MatchSettings,
    rules: R,
    teams: [TeamSlot<A>; 2],
    state: GameState,
    phase: MatchPhase,
    recorder: MatchRecorder,
}

impl<A: TeamAgent, R: RulesEngine> MatchCoordinator<A, R> {
    pub fn new(settings: MatchSettings, rules: R, initial: GameState, blue: A, red: A) -> Self {
        Self::with_recorder(settings, rules, initial, blue, red, MatchRecorder::new())
    }

    pub fn with_recorder(
        settings: MatchSettings,
        rules: R,
        initial: GameState,
        blue: A,
        red: A,
        recorder: MatchRecorder,
    ) -> Self {
        let budget = settings.team_budget;
        let slot = |id: TeamId, agent: A| TeamSlot {
            id,
            name: agent.team_name().to_string(),
            agent,
            strikes: 0,
            consecutive_strikes: 0,
            budget,
        };
        Self {
            settings,
            rules,
            teams: [slot(TeamId::Blue, blue), slot(TeamId::Red, red)],
            state: initial,
            phase: MatchPhase::Setup,
            recorder,
        }
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Handle for a viewer consuming the record while the match runs
    pub fn reader(&self) -> RecordReader {
        self.recorder.reader()
    }

    /// Run the match to completion.
    ///
    /// Returns the outcome and the finalized record. Errors only surface
    /// for fatal conditions (rules-engine contract violations); every
    /// agent misbehavior resolves into the outcome instead.
    pub async fn run(mut self) -> Result<(MatchOutcome, MatchRecord)> {
        self.phase = MatchPhase::ValidatingTeams;
        info!(match_id = %self.recorder.match_id(), "Validating teams");

        let mut failed: Vec<TeamId> = Vec::new();
        for idx in 0..2 {
            let deadline = self.settings.handshake_timeout;
            let slot = &mut self.teams[idx];
            match slot.agent.validate_team(deadline).await {
                Ok(()) => info!(team = %slot.name, "Team validated"),
                Err(e) => {
                    warn!(team = %slot.name, "Handshake failed: {}", e);
                    failed.push(slot.id);
                }
            }
        }
        if !failed.is_empty() {
            self.phase = MatchPhase::Finished;
            let outcome = MatchOutcome::setup_failure(failed, self.state.scores);
            info!(?outcome.winner, "Match aborted during setup");
            return Ok((outcome, self.recorder.finalize()));
        }

        self.phase = MatchPhase::Running;
        let mut conclusion: Option<(Option<TeamId>, OutcomeReason)> = None;
        let mut rounds_played = 0;

        for round in 1..=self.settings.round_limit {
            self.state.round = round;
            let state_before = self.state.clone();

            let acting: &[usize] = match self.settings.move_policy {
                MovePolicy::BothPerRound => &[0, 1],
                MovePolicy::Alternating if round % 2 == 1 => &[0],
                MovePolicy::Alternating => &[1],
            };

            let mut actions = Vec::with_capacity(acting.len());
            for &idx in acting {
                let (action, verdict) = self.take_turn(idx).await?;
                actions.push(action);
                match verdict {
                    TurnVerdict::Continue => {}
                    TurnVerdict::GameOver(w) => {
                        conclusion = Some((w, OutcomeReason::RulesDecision));
                        break;
                    }
                    TurnVerdict::Eliminated(cause) => {
                        let team = self.teams[idx].id;
                        info!(team = %self.teams[idx].name, ?cause, round, "Team eliminated");
                        conclusion =
                            Some((Some(team.opponent()), OutcomeReason::Elimination { team, cause }));
                        break;
                    }
                }
            }

            self.recorder.append(RoundEntry {
                round,
                state_before,
                actions,
                state_after: self.state.clone(),
                recorded_at: Utc::now(),
            });
            rounds_played = round;

            if conclusion.is_some() {
                break;
            }
        }

        let (winner, reason) = conclusion.unwrap_or_else(|| {
            let winner = match self.state.scores[0].cmp(&self.state.scores[1]) {
                std::cmp::Ordering::Greater => Some(TeamId::Blue),
                std::cmp::Ordering::Less => Some(TeamId::Red),
                std::cmp::Ordering::Equal => None,
            };
            (winner, OutcomeReason::RoundLimit)
        });

        self.phase = MatchPhase::Finished;
        for slot in &mut self.teams {
            slot.agent.notify_game_over(rounds_played).await;
        }

        let outcome = MatchOutcome {
            winner,
            reason,
            rounds_played,
            final_scores: self.state.scores,
        };
        info!(
            winner = ?outcome.winner,
            rounds = rounds_played,
            scores = ?outcome.final_scores,
            "Match finished"
        );
        Ok((outcome, self.recorder.finalize()))
    }

    /// Execute one team's turn within the current round.
    async fn take_turn(&mut self, idx: usize) -> Result<(TeamAction, TurnVerdict)> {
        let team = self.teams[idx].id;
        let roster = self.state.team_bot_count(team);

        if self.teams[idx].budget.is_zero() {
            let action = self.forfeit_action(team, roster, 0, AgentFault::BudgetExhausted)?;
            return Ok((
                action,
                TurnVerdict::Eliminated(EliminationCause::BudgetExhausted),
            ));
        }

        let budget = self.teams[idx].budget;
        let deadline = budget.min(self.settings.move_timeout);
        let start = Instant::now();
        let result = self.teams[idx]
            .agent
            .request_moves(&self.state, budget, deadline)
            .await;
        let elapsed = start.elapsed();
        let elapsed_ms = elapsed.as_millis() as u64;
        self.teams[idx].budget = budget.saturating_sub(elapsed);

        match result {
            Ok(move_set) => {
                if !Self::move_set_valid(roster, &move_set.moves) {
                    warn!(team = %self.teams[idx].name, "Syntactically invalid move set");
                    return self.fault_turn(idx, roster, elapsed_ms, AgentFault::ProtocolViolation);
                }
                if let Some(diag) = &move_set.diagnostics {
                    debug!(team = %self.teams[idx].name, diagnostics = %diag, "Agent diagnostics");
                }
                self.teams[idx].consecutive_strikes = 0;

                let outcome = self.rules.apply(&self.state, team, &move_set.moves)?;
                self.state = outcome.state;
                let action = TeamAction {
                    team,
                    moves: move_set.moves,
                    dispositions: outcome.dispositions,
                    elapsed_ms,
                    fault: None,
                };
                if outcome.game_over {
                    return Ok((action, TurnVerdict::GameOver(outcome.winner)));
                }
                if self.teams[idx].budget.is_zero() {
                    return Ok((
                        action,
                        TurnVerdict::Eliminated(EliminationCause::BudgetExhausted),
                    ));
                }
                Ok((action, TurnVerdict::Continue))
            }
            Err(e) if e.is_agent_fault() => {
                warn!(team = %self.teams[idx].name, "Turn forfeited: {}", e);
                self.fault_turn(idx, roster, elapsed_ms, fault_kind(&e))
            }
            Err(e) => Err(e),
        }
    }

    /// Forfeit the turn, count the strike, and decide whether the team is
    /// eliminated.
    fn fault_turn(
        &mut self,
        idx: usize,
        roster: usize,
        elapsed_ms: u64,
        fault: AgentFault,
    ) -> Result<(TeamAction, TurnVerdict)> {
        let team = self.teams[idx].id;
        {
            let slot = &mut self.teams[idx];
            slot.strikes += 1;
            slot.consecutive_strikes += 1;
        }
        let action = self.forfeit_action(team, roster, elapsed_ms, fault)?;

        let slot = &self.teams[idx];
        let effective = match self.settings.strike_policy {
            StrikePolicy::Consecutive => slot.consecutive_strikes,
            StrikePolicy::Cumulative => slot.strikes,
        };
        if effective >= self.settings.strike_limit {
            return Ok((action, TurnVerdict::Eliminated(EliminationCause::Strikes)));
        }
        if slot.budget.is_zero() {
            return Ok((
                action,
                TurnVerdict::Eliminated(EliminationCause::BudgetExhausted),
            ));
        }
        Ok((action, TurnVerdict::Continue))
    }

    /// Substitute stops for every bot and apply them through the rules so
    /// the record stays uniform across forfeited and played turns.
    fn forfeit_action(
        &mut self,
        team: TeamId,
        roster: usize,
        elapsed_ms: u64,
        fault: AgentFault,
    ) -> Result<TeamAction> {
        let stops: Vec<BotMove> = (0..roster).map(BotMove::stop).collect();
        let outcome = self.rules.apply(&self.state, team, &stops)?;
        self.state = outcome.state;
        Ok(TeamAction {
            team,
            moves: stops,
            dispositions: vec![MoveDisposition::Forfeited; roster],
            elapsed_ms,
            fault: Some(fault),
        })
    }

    /// Syntactic validation only: ownership and shape. Semantic legality
    /// (walls, bounds) is the rules engine's call and is never fatal.
    fn move_set_valid(roster: usize, moves: &[BotMove]) -> bool {
        if moves.len() != roster {
            return false;
        }
        let mut seen = vec![false; roster];
        for m in moves {
            if m.bot_index >= roster || seen[m.bot_index] {
                return false;
            }
            seen[m.bot_index] = true;
        }
        true
    }
}

fn fault_kind(e: &EngineError) -> AgentFault {
    match e {
        EngineError::AgentTimeout(_) => AgentFault::Timeout,
        EngineError::AgentProtocol { .. } => AgentFault::ProtocolViolation,
        EngineError::AgentCrashed { .. } => AgentFault::Crashed,
        EngineError::AgentAlreadyFailed(_) => AgentFault::AlreadyFailed,
        // Callers only reach this for agent faults
        _ => AgentFault::ProtocolViolation,
    }
}
