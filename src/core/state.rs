//! Replicated room state.
//!
//! ## RoomSnapshot
//!
//! Read-only public view of a room for synchronization and UI:
//! - Draw and discard stack sizes
//! - Round, current player and phase
//! - Public info for every player
//!
//! Private zone contents never appear in a snapshot; hands are reduced to
//! their size. Roles are hidden except the lord's and those of dead
//! players.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::error::{EngineError, EngineErrorKind, EngineResult};
use super::player::PlayerId;
use crate::cards::RealCardId;
use crate::catalog::CharacterId;
use crate::events::PlayerPhase;
use crate::rules::Role;

/// Public information about one player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub seat: usize,
    pub character: Option<CharacterId>,
    pub role: Option<Role>,
    pub hp: i32,
    pub max_hp: i32,
    pub dead: bool,
    pub turned_over: bool,
    pub hand_size: usize,
    pub equips: Vec<RealCardId>,
    pub judge_area: Vec<RealCardId>,
}

/// Public view of a whole room.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub draw_stack_size: usize,
    pub discard_stack_size: usize,
    /// Round number (starts at 1).
    pub round: u32,
    pub current: PlayerId,
    pub phase: Option<PlayerPhase>,
    /// Players in seat order.
    pub players: Vector<PlayerInfo>,
}

impl RoomSnapshot {
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&PlayerInfo> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn to_bytes(&self) -> EngineResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| EngineError::new(EngineErrorKind::Transport(e.to_string())))
    }

    pub fn from_bytes(bytes: &[u8]) -> EngineResult<Self> {
        bincode::deserialize(bytes).map_err(|e| EngineError::new(EngineErrorKind::Transport(e.to_string())))
    }
}

/// Whether a role may be shown to everyone.
#[must_use]
pub fn role_is_public(role: Option<Role>, dead: bool) -> bool {
    dead || role == Some(Role::Lord)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(id: u8, role: Role) -> PlayerInfo {
        PlayerInfo {
            id: PlayerId::new(id),
            name: format!("p{id}"),
            seat: id as usize,
            character: Some(CharacterId::new(1)),
            role: Some(role),
            hp: 4,
            max_hp: 4,
            dead: false,
            turned_over: false,
            hand_size: 4,
            equips: vec![RealCardId(9)],
            judge_area: Vec::new(),
        }
    }

    #[test]
    fn test_bytes_round_trip() {
        let snapshot = RoomSnapshot {
            draw_stack_size: 30,
            discard_stack_size: 2,
            round: 3,
            current: PlayerId::new(1),
            phase: Some(PlayerPhase::Play),
            players: Vector::from(vec![info(0, Role::Lord), info(1, Role::Rebel)]),
        };
        let bytes = snapshot.to_bytes().unwrap();
        let back = RoomSnapshot::from_bytes(&bytes).unwrap();
        assert_eq!(back, snapshot);
        assert_eq!(back.player(PlayerId::new(1)).unwrap().hand_size, 4);
    }

    #[test]
    fn test_garbage_bytes() {
        assert!(RoomSnapshot::from_bytes(&[1, 2]).is_err());
    }

    #[test]
    fn test_role_visibility() {
        assert!(role_is_public(Some(Role::Lord), false));
        assert!(!role_is_public(Some(Role::Rebel), false));
        assert!(role_is_public(Some(Role::Rebel), true));
    }
}
