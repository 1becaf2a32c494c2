// src/main.rs
//! Mazeclash Match Engine
//!
//! Runs one match between two externally-supplied agents: spawns or dials
//! both teams, drives the authoritative turn loop, and persists the replay.

use anyhow::{bail, Context, Result};
use mazeclash_engine::coordinator::{MatchCoordinator, MatchOutcome, OutcomeReason};
use mazeclash_engine::observability::init_tracing;
use mazeclash_engine::recorder::MatchRecorder;
use mazeclash_engine::rules::MazeRules;
use mazeclash_engine::state::{GameState, Layout, TeamId};
use mazeclash_engine::supervisor::AgentProcess;
use mazeclash_engine::transport::{connect_agent, AgentListener, TcpChannel};
use mazeclash_engine::utils::config::{EngineConfig, TeamConfig, TeamEndpoint};
use mazeclash_engine::{replay, WireAgent};
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{info, warn};

/// How long a spawned or remote agent gets to establish its connection
const CONNECT_DEADLINE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    let config = EngineConfig::load()?;
    init_tracing(config.log.json)?;

    info!("Starting mazeclash engine v{}", mazeclash_engine::VERSION);

    let layout_text = match (&config.game.layout, &config.game.layout_path) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("reading layout from {:?}", path))?,
        (None, None) => bail!("configuration provides neither game.layout nor game.layout_path"),
    };
    let layout = Layout::parse(&layout_text, config.game.bots_per_team)?;
    let state = GameState::from_layout(&layout);

    if config.teams.len() != 2 {
        bail!("exactly two teams required, got {}", config.teams.len());
    }

    let (mut processes, agents, setup_failed) = establish_teams(&config.teams).await?;

    if !setup_failed.is_empty() {
        let outcome = MatchOutcome::setup_failure(setup_failed, [0, 0]);
        info!(
            winner = ?outcome.winner,
            reason = ?outcome.reason,
            "Match not started; outcome decided by setup failure"
        );
        shutdown(&mut processes).await;
        return Ok(());
    }

    let mut recorder = MatchRecorder::new();
    if let Some(journal) = &config.replay.journal {
        recorder = recorder.with_sink(journal);
    }

    let mut agents = agents.into_iter();
    let (blue, red) = (
        agents.next().expect("two agents established"),
        agents.next().expect("two agents established"),
    );
    let coordinator = MatchCoordinator::with_recorder(
        config.match_section.settings(),
        MazeRules::new(),
        state,
        blue,
        red,
        recorder,
    );

    let result = coordinator.run().await;
    shutdown(&mut processes).await;
    let (outcome, record) = result?;

    if let Some(path) = &config.replay.output {
        replay::save(&record, path)?;
    }

    match &outcome.reason {
        OutcomeReason::RulesDecision | OutcomeReason::RoundLimit => info!(
            winner = ?outcome.winner,
            scores = ?outcome.final_scores,
            "Match decided by play"
        ),
        reason => info!(winner = ?outcome.winner, ?reason, "Match decided by forfeit"),
    }

    Ok(())
}

/// Establish both agents. Processes are spawned with kill-on-drop, so an
/// early bail-out here still reaps anything already started. A team whose
/// spawn or connection fails lands in the returned failed list; the caller
/// turns a non-empty list into a setup-failure outcome.
async fn establish_teams(
    teams: &[TeamConfig],
) -> Result<(Vec<AgentProcess>, Vec<WireAgent<TcpStream>>, Vec<TeamId>)> {
    let mut processes: Vec<AgentProcess> = Vec::new();
    let mut agents: Vec<WireAgent<TcpStream>> = Vec::new();
    let mut failed: Vec<TeamId> = Vec::new();

    for (index, team) in teams.iter().enumerate() {
        let team_id = TeamId::from_index(index).expect("exactly two teams");
        match establish(team.name.clone(), team.endpoint()?, &mut processes).await {
            Ok(channel) => agents.push(WireAgent::new(team_id, team.name.clone(), channel)),
            Err(e) => {
                warn!(team = %team.name, "Setup failed: {}", e);
                failed.push(team_id);
            }
        }
    }
    Ok((processes, agents, failed))
}

/// Spawn-and-accept or dial, per the team's configured endpoint
async fn establish(
    name: String,
    endpoint: TeamEndpoint,
    processes: &mut Vec<AgentProcess>,
) -> mazeclash_engine::Result<TcpChannel> {
    match endpoint {
        TeamEndpoint::Remote(addr) => connect_agent(addr, CONNECT_DEADLINE).await,
        TeamEndpoint::Spawn { command, args } => {
            let listener = AgentListener::bind().await?;
            let dial_addr = listener.addr().to_string();
            let process = AgentProcess::spawn(name, &command, &args, &dial_addr)?;
            processes.push(process);
            listener.accept(CONNECT_DEADLINE).await
        }
    }
}

/// Escalating termination of every spawned agent, on all exit paths
async fn shutdown(processes: &mut [AgentProcess]) {
    for process in processes {
        if let Err(e) = process.terminate().await {
            warn!("Agent termination failed: {}", e);
        }
    }
}
