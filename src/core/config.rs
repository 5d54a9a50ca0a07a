//! Room configuration.
//!
//! Rooms are configured at creation from a [`RoomConfig`]. Every field has a
//! default, so a TOML file only needs the values it overrides:
//!
//! ```
//! use rust_sgs::core::RoomConfig;
//!
//! let config = RoomConfig::from_toml_str("seed = 7\nresponse_timeout_ms = 500").unwrap();
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.initial_hand_size, 4);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::error::{EngineError, EngineErrorKind, EngineResult};

/// Tunables of a single room.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Seed for deck shuffles, seat and role assignment.
    pub seed: u64,

    /// How long to wait for one client decision before applying the default.
    pub response_timeout_ms: u64,

    /// Cards dealt to every player at game start.
    pub initial_hand_size: usize,

    /// Cards drawn in each draw phase.
    pub draw_phase_amount: usize,

    /// Shuffle seats at game start.
    pub shuffle_seats: bool,

    /// Assign hidden roles at game start.
    pub assign_roles: bool,

    /// Upper bound on play actions in one play phase.
    pub max_play_actions: usize,

    /// Rounds after which the game ends in a draw; 0 means unlimited.
    pub max_rounds: u32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            response_timeout_ms: 15_000,
            initial_hand_size: 4,
            draw_phase_amount: 2,
            shuffle_seats: true,
            assign_roles: true,
            max_play_actions: 64,
            max_rounds: 0,
        }
    }
}

impl RoomConfig {
    /// Parse a config from TOML text.
    #[instrument(skip(text))]
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| EngineError::new(EngineErrorKind::Config(e.to_string())))?;
        debug!(?config, "Room config parsed");
        Ok(config)
    }

    /// Timeout for a single awaited client decision.
    #[must_use]
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    /// Set the RNG seed (builder pattern).
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the response timeout (builder pattern).
    #[must_use]
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the initial hand size (builder pattern).
    #[must_use]
    pub fn with_initial_hand_size(mut self, size: usize) -> Self {
        self.initial_hand_size = size;
        self
    }

    /// Cap the number of rounds (builder pattern).
    #[must_use]
    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = rounds;
        self
    }

    /// Keep the roster order as the seat order (builder pattern).
    #[must_use]
    pub fn fixed_seats(mut self) -> Self {
        self.shuffle_seats = false;
        self
    }

    /// Skip role assignment (builder pattern).
    #[must_use]
    pub fn without_roles(mut self) -> Self {
        self.assign_roles = false;
        self
    }
}
