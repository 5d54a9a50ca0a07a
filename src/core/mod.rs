//! Core engine types: players, errors, RNG, configuration, snapshots.

pub mod config;
pub mod error;
pub mod player;
pub mod rng;
pub mod state;

pub use config::RoomConfig;
pub use error::{EngineError, EngineErrorKind, EngineResult};
pub use player::{PlayerId, PlayerMap};
pub use rng::{GameRng, GameRngState};
pub use state::{PlayerInfo, RoomSnapshot};
