// src/utils/config.rs
//! Engine configuration
//!
//! Layered loading: an optional `engine` file (TOML/JSON/YAML, whatever the
//! `config` crate recognizes) overridden by `MAZECLASH_*` environment
//! variables with `__` as the section separator, e.g.
//! `MAZECLASH_MATCH__ROUND_LIMIT=50`.

use crate::coordinator::{MatchSettings, MovePolicy, StrikePolicy};
use crate::utils::errors::{EngineError, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub game: GameSection,

    #[serde(rename = "match", default)]
    pub match_section: MatchSection,

    /// Exactly two entries, blue first
    #[serde(default)]
    pub teams: Vec<TeamConfig>,

    #[serde(default)]
    pub replay: ReplaySection,

    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameSection {
    /// Inline layout text; takes precedence over `layout_path`
    pub layout: Option<String>,

    pub layout_path: Option<PathBuf>,

    pub bots_per_team: usize,
}

impl Default for GameSection {
    fn default() -> Self {
        Self {
            layout: None,
            layout_path: None,
            bots_per_team: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchSection {
    pub move_timeout_ms: u64,
    pub handshake_timeout_ms: u64,
    pub team_budget_ms: u64,
    pub strike_limit: u32,
    pub strike_policy: StrikePolicy,
    pub round_limit: u32,
    pub move_policy: MovePolicy,
}

impl Default for MatchSection {
    fn default() -> Self {
        let defaults = MatchSettings::default();
        Self {
            move_timeout_ms: defaults.move_timeout.as_millis() as u64,
            handshake_timeout_ms: defaults.handshake_timeout.as_millis() as u64,
            team_budget_ms: defaults.team_budget.as_millis() as u64,
            strike_limit: defaults.strike_limit,
            strike_policy: defaults.strike_policy,
            round_limit: defaults.round_limit,
            move_policy: defaults.move_policy,
        }
    }
}

impl MatchSection {
    pub fn settings(&self) -> MatchSettings {
        MatchSettings {
            move_timeout: Duration::from_millis(self.move_timeout_ms),
            handshake_timeout: Duration::from_millis(self.handshake_timeout_ms),
            team_budget: Duration::from_millis(self.team_budget_ms),
            strike_limit: self.strike_limit,
            strike_policy: self.strike_policy,
            round_limit: self.round_limit,
            move_policy: self.move_policy,
        }
    }
}

/// How to reach one team's agent
#[derive(Debug, Clone)]
pub enum TeamEndpoint {
    /// Spawn a local process and let it dial back in
    Spawn { command: String, args: Vec<String> },

    /// Dial an already-running remote agent
    Remote(SocketAddr),
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamConfig {
    pub name: String,

    /// Executable to spawn (bare name or path)
    #[serde(default)]
    pub command: Option<String>,

    #[serde(default)]
    pub args: Vec<String>,

    /// Address of a remotely hosted agent, mutually exclusive with `command`
    #[serde(default)]
    pub address: Option<String>,
}

impl TeamConfig {
    pub fn endpoint(&self) -> Result<TeamEndpoint> {
        match (&self.command, &self.address) {
            (Some(command), None) => Ok(TeamEndpoint::Spawn {
                command: command.clone(),
                args: self.args.clone(),
            }),
            (None, Some(address)) => {
                let addr = address.parse().map_err(|e| {
                    EngineError::Setup(format!(
                        "team '{}' has an invalid address '{}': {}",
                        self.name, address, e
                    ))
                })?;
                Ok(TeamEndpoint::Remote(addr))
            }
            (Some(_), Some(_)) => Err(EngineError::Setup(format!(
                "team '{}' sets both command and address",
                self.name
            ))),
            (None, None) => Err(EngineError::Setup(format!(
                "team '{}' sets neither command nor address",
                self.name
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ReplaySection {
    /// Compressed replay file written once the match finishes
    pub output: Option<PathBuf>,

    /// JSON-lines journal streamed while the match runs
    pub journal: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LogSection {
    pub json: bool,
}

impl EngineConfig {
    /// Load `engine.{toml,json,yaml}` from the working directory (if
    /// present) with `MAZECLASH_*` environment overrides.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("engine").required(false))
            .add_source(config::Environment::with_prefix("MAZECLASH").separator("__"))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load from an explicit file, still honoring environment overrides.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("MAZECLASH").separator("__"))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
