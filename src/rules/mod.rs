//! Game rules that sit above the event pipeline.
//!
//! - `roles`: hidden roles per table size and the game-over check
//! - `common`: per-turn usage limits, filter skills and target modes
//!
//! Everything here is a query over a room; rules never mutate state.

pub mod common;
pub mod roles;

pub use common::{can_be_targeted, can_use_card, check_card_use, remaining_uses, resolve_targets, SLASH};
pub use roles::{check_game_over, roles_for, GameResult, Role, Standing};
