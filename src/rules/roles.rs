//! Hidden roles and the game-over check.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::core::{EngineError, EngineErrorKind, EngineResult, PlayerId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Role {
    Lord,
    Loyalist,
    Rebel,
    Renegade,
}

/// Result of a completed game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Draw (no winner).
    Draw,
    /// Multiple winners (a faction).
    Winners(Vec<PlayerId>),
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
            GameResult::Winners(ps) => ps.contains(&player),
            GameResult::Draw => false,
        }
    }
}

/// Role distribution for a table of `player_count`, lord first.
pub fn roles_for(player_count: usize) -> EngineResult<Vec<Role>> {
    use Role::*;
    let roles = match player_count {
        2 => vec![Lord, Rebel],
        3 => vec![Lord, Rebel, Renegade],
        4 => vec![Lord, Loyalist, Rebel, Renegade],
        5 => vec![Lord, Loyalist, Rebel, Rebel, Renegade],
        6 => vec![Lord, Loyalist, Rebel, Rebel, Rebel, Renegade],
        7 => vec![Lord, Loyalist, Loyalist, Rebel, Rebel, Rebel, Renegade],
        8 => vec![Lord, Loyalist, Loyalist, Rebel, Rebel, Rebel, Rebel, Renegade],
        n => {
            return Err(EngineError::new(EngineErrorKind::IllegalAction(format!(
                "no role table for {n} players"
            ))))
        }
    };
    Ok(roles)
}

/// One row of the game-over check.
#[derive(Clone, Copy, Debug)]
pub struct Standing {
    pub player: PlayerId,
    pub role: Option<Role>,
    pub alive: bool,
}

/// Decide whether the game has ended.
///
/// Without roles the last survivor wins. With roles: the lord's death ends
/// the game (a lone surviving renegade wins, otherwise the rebels do); the
/// lord's side wins once no rebel or renegade is alive.
#[must_use]
pub fn check_game_over(standings: &[Standing]) -> Option<GameResult> {
    let alive: Vec<&Standing> = standings.iter().filter(|s| s.alive).collect();

    let Some(lord) = standings.iter().find(|s| s.role == Some(Role::Lord)) else {
        return match alive.as_slice() {
            [] => Some(GameResult::Draw),
            [only] => Some(GameResult::Winner(only.player)),
            _ => None,
        };
    };

    if !lord.alive {
        if let [only] = alive.as_slice() {
            if only.role == Some(Role::Renegade) {
                return Some(GameResult::Winner(only.player));
            }
        }
        let rebels = faction(standings, &[Role::Rebel]);
        return Some(if rebels.is_empty() {
            GameResult::Draw
        } else {
            GameResult::Winners(rebels)
        });
    }

    let enemies_alive = alive
        .iter()
        .any(|s| matches!(s.role, Some(Role::Rebel | Role::Renegade)));
    if enemies_alive {
        None
    } else {
        Some(GameResult::Winners(faction(standings, &[Role::Lord, Role::Loyalist])))
    }
}

fn faction(standings: &[Standing], roles: &[Role]) -> Vec<PlayerId> {
    standings
        .iter()
        .filter(|s| s.role.is_some_and(|r| roles.contains(&r)))
        .map(|s| s.player)
        .collect()
}
