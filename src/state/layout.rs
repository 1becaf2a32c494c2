// src/state/layout.rs
//! Maze layout parsing
//!
//! Layouts are small text grids: `#` walls, `.` food, spaces free cells,
//! and digits marking bot start positions. Even digits belong to the blue
//! team, odd digits to the red team, so a two-bots-per-team maze uses
//! `0`..`3`. Leading/trailing whitespace per line is stripped before
//! validation, which lets layouts be embedded in indented string literals.

use crate::state::TeamId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("'{0}' is not a legal layout character")]
    IllegalCharacter(char),

    #[error("bot id '{0}' was specified twice")]
    DuplicateBot(char),

    #[error("layout is missing bot ids: {0:?}")]
    MissingBots(Vec<char>),

    #[error("layout must be rectangular, line {line} has length {got} instead of {expected}")]
    NotRectangular {
        line: usize,
        got: usize,
        expected: usize,
    },

    #[error("layout is empty")]
    Empty,
}

/// A parsed and validated maze layout
#[derive(Debug, Clone)]
pub struct Layout {
    pub width: usize,
    pub height: usize,
    /// Row-major wall mask
    pub walls: Vec<bool>,
    /// Row-major food mask
    pub food: Vec<bool>,
    /// Start positions indexed by global bot id
    pub bot_starts: Vec<(usize, usize)>,
}

impl Layout {
    /// Parse a layout expecting `bots_per_team` bots on each of the two teams.
    pub fn parse(text: &str, bots_per_team: usize) -> Result<Layout, LayoutError> {
        let number_bots = bots_per_team * 2;
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() {
            return Err(LayoutError::Empty);
        }

        let width = lines[0].len();
        for (i, line) in lines.iter().enumerate() {
            if line.len() != width {
                return Err(LayoutError::NotRectangular {
                    line: i,
                    got: line.len(),
                    expected: width,
                });
            }
        }

        let height = lines.len();
        let mut walls = vec![false; width * height];
        let mut food = vec![false; width * height];
        let mut bot_starts = vec![None; number_bots];

        for (row, line) in lines.iter().enumerate() {
            for (col, c) in line.chars().enumerate() {
                let cell = row * width + col;
                match c {
                    '#' => walls[cell] = true,
                    '.' => food[cell] = true,
                    ' ' => {}
                    d if d.is_ascii_digit() => {
                        let id = d as usize - '0' as usize;
                        if id >= number_bots {
                            return Err(LayoutError::IllegalCharacter(d));
                        }
                        if bot_starts[id].is_some() {
                            return Err(LayoutError::DuplicateBot(d));
                        }
                        bot_starts[id] = Some((row, col));
                    }
                    other => return Err(LayoutError::IllegalCharacter(other)),
                }
            }
        }

        let missing: Vec<char> = bot_starts
            .iter()
            .enumerate()
            .filter(|(_, pos)| pos.is_none())
            .map(|(id, _)| char::from_digit(id as u32, 10).unwrap_or('?'))
            .collect();
        if !missing.is_empty() {
            return Err(LayoutError::MissingBots(missing));
        }

        Ok(Layout {
            width,
            height,
            walls,
            food,
            bot_starts: bot_starts.into_iter().flatten().collect(),
        })
    }

    /// Split the global bot id space into per-team position lists.
    /// Even ids are blue, odd ids are red, in ascending id order.
    pub fn team_positions(&self) -> [Vec<(usize, usize)>; 2] {
        let mut teams: [Vec<(usize, usize)>; 2] = [Vec::new(), Vec::new()];
        for (id, pos) in self.bot_starts.iter().enumerate() {
            teams[id % 2].push(*pos);
        }
        teams
    }

    /// Which team a global bot id belongs to
    pub fn team_of(bot_id: usize) -> TeamId {
        if bot_id % 2 == 0 {
            TeamId::Blue
        } else {
            TeamId::Red
        }
    }
}
