// src/rules/maze.rs
//! Built-in maze rules
//!
//! Each bot moves one cell per round. A move into a wall or off the board
//! is reinterpreted as a stop. A bot that lands on a food cell consumes it
//! and scores one point for its team. The game is over once no food
//! remains; the winner is the team with the higher score, or nobody on a
//! tie. Bots may share cells; there is no capture rule.

use crate::rules::{MoveDisposition, RulesEngine, RulesError, RulesOutcome};
use crate::state::{BotMove, GameState, TeamId};

#[derive(Debug, Clone, Copy, Default)]
pub struct MazeRules;

impl MazeRules {
    pub fn new() -> Self {
        Self
    }

    /// Check move list shape against the acting team's roster.
    fn validate(state: &GameState, team: TeamId, moves: &[BotMove]) -> Result<(), RulesError> {
        let roster = state.team_bot_count(team);
        if moves.len() != roster {
            return Err(RulesError::WrongMoveCount {
                team,
                expected: roster,
                got: moves.len(),
            });
        }
        let mut seen = vec![false; roster];
        for m in moves {
            if m.bot_index >= roster {
                return Err(RulesError::BotIndexOutOfRange(m.bot_index, team));
            }
            if seen[m.bot_index] {
                return Err(RulesError::DuplicateBotIndex(m.bot_index));
            }
            seen[m.bot_index] = true;
        }
        Ok(())
    }
}

impl RulesEngine for MazeRules {
    fn apply(
        &self,
        state: &GameState,
        team: TeamId,
        moves: &[BotMove],
    ) -> Result<RulesOutcome, RulesError> {
        if state.game_over {
            return Err(RulesError::GameAlreadyOver);
        }
        Self::validate(state, team, moves)?;

        let mut next = state.clone();
        let mut dispositions = Vec::with_capacity(moves.len());

        for m in moves {
            let (row, col) = next.bots[team.index()][m.bot_index];
            let (dr, dc) = m.direction.delta();
            let (target_row, target_col) = (row as i64 + dr, col as i64 + dc);

            let legal = next.in_bounds(target_row, target_col)
                && !next.is_wall(target_row as usize, target_col as usize);
            if !legal {
                dispositions.push(MoveDisposition::IllegalAsStop);
                continue;
            }

            let (target_row, target_col) = (target_row as usize, target_col as usize);
            next.bots[team.index()][m.bot_index] = (target_row, target_col);
            if next.has_food(target_row, target_col) {
                next.clear_food(target_row, target_col);
                next.scores[team.index()] += 1;
            }
            dispositions.push(MoveDisposition::Applied);
        }

        let game_over = next.food_remaining() == 0;
        next.game_over = game_over;
        let winner = if game_over {
            match next.scores[0].cmp(&next.scores[1]) {
                std::cmp::Ordering::Greater => Some(TeamId::Blue),
                std::cmp::Ordering::Less => Some(TeamId::Red),
                std::cmp::Ordering::Equal => None,
            }
        } else {
            None
        };

        Ok(RulesOutcome {
            state: next,
            dispositions,
            game_over,
            winner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Direction, Layout};

    fn state() -> GameState {
        let layout = Layout::parse(
            "######\n\
             #0 . #\n\
             # .#1#\n\
             ######",
            1,
        )
        .unwrap();
        GameState::from_layout(&layout)
    }

    #[test]
    fn test_legal_move_applies() {
        let rules = MazeRules::new();
        let s = state();
        let outcome = rules
            .apply(&s, TeamId::Blue, &[BotMove::new(0, Direction::East)])
            .unwrap();
        assert_eq!(outcome.dispositions, vec![MoveDisposition::Applied]);
        assert_eq!(outcome.state.bots[0][0], (1, 2));
        // Original snapshot untouched
        assert_eq!(s.bots[0][0], (1, 1));
    }

    #[test]
    fn test_wall_move_becomes_stop() {
        let rules = MazeRules::new();
        let s = state();
        let outcome = rules
            .apply(&s, TeamId::Blue, &[BotMove::new(0, Direction::North)])
            .unwrap();
        assert_eq!(outcome.dispositions, vec![MoveDisposition::IllegalAsStop]);
        assert_eq!(outcome.state.bots[0][0], (1, 1));
        assert!(!outcome.game_over);
    }

    #[test]
    fn test_food_consumption_scores() {
        let rules = MazeRules::new();
        let mut s = state();
        // Walk blue bot onto the food at (1, 3)
        s.bots[0][0] = (1, 2);
        let outcome = rules
            .apply(&s, TeamId::Blue, &[BotMove::new(0, Direction::East)])
            .unwrap();
        assert_eq!(outcome.state.scores[0], 1);
        assert!(!outcome.state.has_food(1, 3));
        assert!(!outcome.game_over);
    }

    #[test]
    fn test_last_food_ends_game() {
        let rules = MazeRules::new();
        let mut s = state();
        s.clear_food(2, 2);
        s.bots[0][0] = (1, 2);
        let outcome = rules
            .apply(&s, TeamId::Blue, &[BotMove::new(0, Direction::East)])
            .unwrap();
        assert!(outcome.game_over);
        assert_eq!(outcome.winner, Some(TeamId::Blue));
    }

    #[test]
    fn test_draw_has_no_winner() {
        let rules = MazeRules::new();
        let mut s = state();
        s.clear_food(2, 2);
        s.bots[0][0] = (1, 2);
        s.scores = [3, 4];
        // Blue eats the last food and draws level at 4:4
        let outcome = rules
            .apply(&s, TeamId::Blue, &[BotMove::new(0, Direction::East)])
            .unwrap();
        assert!(outcome.game_over);
        assert_eq!(outcome.state.scores, [4, 4]);
        assert_eq!(outcome.winner, None);
    }

    #[test]
    fn test_wrong_move_count_is_fatal() {
        let rules = MazeRules::new();
        let s = state();
        let err = rules.apply(&s, TeamId::Blue, &[]).unwrap_err();
        assert_eq!(
            err,
            RulesError::WrongMoveCount {
                team: TeamId::Blue,
                expected: 1,
                got: 0
            }
        );
    }

    #[test]
    fn test_apply_on_finished_game() {
        let rules = MazeRules::new();
        let mut s = state();
        s.game_over = true;
        let err = rules
            .apply(&s, TeamId::Blue, &[BotMove::stop(0)])
            .unwrap_err();
        assert_eq!(err, RulesError::GameAlreadyOver);
    }
}
