//! Zone system for card locations.
//!
//! ## Key Types
//!
//! - `Zone`: shared stacks, the processing area, and per-player zones
//! - `Area`: a player-owned area independent of its owner
//! - `ZoneManager`: Card location tracking and movement
//! - `ZonePosition` / `StackEnd`: Position specifiers for ordered zones

pub mod manager;

pub use manager::{Area, StackEnd, Zone, ZoneManager, ZonePosition};
