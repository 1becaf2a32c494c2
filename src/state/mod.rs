// src/state/mod.rs
//! Game state snapshots
//!
//! `GameState` is an immutable snapshot of a match instant: board geometry,
//! food, bot positions, scores, and the round counter. New states are
//! produced only by the rules engine; the turn coordinator owns the single
//! current snapshot and nothing else ever mutates it.

pub mod layout;

pub use layout::{Layout, LayoutError};

use serde::{Deserialize, Serialize};

/// One of the two competing teams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamId {
    Blue,
    Red,
}

impl TeamId {
    pub const ALL: [TeamId; 2] = [TeamId::Blue, TeamId::Red];

    /// Index into per-team arrays
    pub fn index(&self) -> usize {
        match self {
            TeamId::Blue => 0,
            TeamId::Red => 1,
        }
    }

    pub fn opponent(&self) -> TeamId {
        match self {
            TeamId::Blue => TeamId::Red,
            TeamId::Red => TeamId::Blue,
        }
    }

    pub fn from_index(index: usize) -> Option<TeamId> {
        match index {
            0 => Some(TeamId::Blue),
            1 => Some(TeamId::Red),
            _ => None,
        }
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamId::Blue => write!(f, "blue"),
            TeamId::Red => write!(f, "red"),
        }
    }
}

/// Discrete move direction; `Stop` is the no-op substituted on forfeits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    North,
    South,
    East,
    West,
    Stop,
}

impl Direction {
    /// Row/column delta of this direction on the grid
    pub fn delta(&self) -> (i64, i64) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::East => (0, 1),
            Direction::West => (0, -1),
            Direction::Stop => (0, 0),
        }
    }
}

/// A single bot's intended move within one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotMove {
    /// Index into the acting team's bot list
    pub bot_index: usize,
    pub direction: Direction,
}

impl BotMove {
    pub fn new(bot_index: usize, direction: Direction) -> Self {
        Self { bot_index, direction }
    }

    /// The forfeit substitute for a bot
    pub fn stop(bot_index: usize) -> Self {
        Self {
            bot_index,
            direction: Direction::Stop,
        }
    }
}

/// Immutable snapshot of the full game state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Board width (columns)
    pub width: usize,

    /// Board height (rows)
    pub height: usize,

    /// Row-major wall mask, `width * height` entries
    pub walls: Vec<bool>,

    /// Row-major food mask, same shape as `walls`
    pub food: Vec<bool>,

    /// Per-team bot positions as (row, col)
    pub bots: [Vec<(usize, usize)>; 2],

    /// Per-team scores
    pub scores: [u32; 2],

    /// Round this snapshot belongs to; 0 before the first round
    pub round: u32,

    pub game_over: bool,
}

impl GameState {
    /// Build the initial state from a parsed layout
    pub fn from_layout(layout: &Layout) -> Self {
        Self {
            width: layout.width,
            height: layout.height,
            walls: layout.walls.clone(),
            food: layout.food.clone(),
            bots: layout.team_positions(),
            scores: [0, 0],
            round: 0,
            game_over: false,
        }
    }

    fn cell(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    pub fn in_bounds(&self, row: i64, col: i64) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.height && (col as usize) < self.width
    }

    pub fn is_wall(&self, row: usize, col: usize) -> bool {
        self.walls[self.cell(row, col)]
    }

    pub fn has_food(&self, row: usize, col: usize) -> bool {
        self.food[self.cell(row, col)]
    }

    pub fn clear_food(&mut self, row: usize, col: usize) {
        let cell = self.cell(row, col);
        self.food[cell] = false;
    }

    pub fn food_remaining(&self) -> usize {
        self.food.iter().filter(|f| **f).count()
    }

    /// Number of bots fielded by a team
    pub fn team_bot_count(&self, team: TeamId) -> usize {
        self.bots[team.index()].len()
    }
}
