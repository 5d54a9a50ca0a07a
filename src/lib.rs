//! # rust-sgs
//!
//! Authoritative room rules engine for a turn-based multiplayer card game
//! with hidden roles, character skills and shared card zones.
//!
//! ## Design Principles
//!
//! 1. **Everything Is An Event**: every gameplay action walks a fixed,
//!    ordered stage sequence. Skills hook stages; nothing mutates zones
//!    behind the pipeline's back.
//!
//! 2. **One Sequential Flow Per Room**: a room is driven through `&mut`;
//!    the only suspension points are bounded waits on client answers.
//!
//! 3. **Content Is Pluggable**: cards, characters and skills implement a
//!    small set of capability traits and live in a `Catalog` handed to the
//!    room. The engine ships no global registry.
//!
//! ## Architecture
//!
//! - **Staged Pipeline**: `GameProcessor::handle` runs trigger resolution and
//!   then the caller's `StageHandler` at each stage, stopping on termination.
//!
//! - **Trigger Resolution**: candidates are collected in seat order from the
//!   current player, filtered for uniqueness against the skills already
//!   resolving, asked when optional, and isolated when they fail.
//!
//! - **Zone Partition**: every physical card is in exactly one zone. Virtual
//!   cards resolve to physical ones before anything moves.
//!
//! ## Modules
//!
//! - `core`: player ids, errors, RNG, configuration, snapshots
//! - `events`: payloads, control envelopes, stage sequences
//! - `cards`: card ids, definitions, views, virtual cards
//! - `zones`: card locations and stack ends
//! - `skills` / `catalog`: the content contract and registry
//! - `processor` / `triggers`: the staged pipeline and trigger resolution
//! - `room`: authoritative state, movement, verbs, protocols, turn flow
//! - `transport`: the client bridge and reference transports
//! - `rules`: usage limits, targeting and roles
//! - `content`: the standard content pack

pub mod cards;
pub mod catalog;
pub mod content;
pub mod core;
pub mod events;
pub mod processor;
pub mod room;
pub mod rules;
pub mod skills;
pub mod transport;
pub mod triggers;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{
    EngineError, EngineErrorKind, EngineResult, GameRng, GameRngState, PlayerId, PlayerInfo, PlayerMap, RoomConfig,
    RoomSnapshot,
};

pub use crate::cards::{CardDefinition, CardId, CardType, CardView, RealCardId, Suit, TargetMode, VirtualCardId};

pub use crate::catalog::{Catalog, CharacterDefinition, CharacterId};

pub use crate::events::{Event, EventControl, EventKind, GameEvent, Stage};

pub use crate::processor::{GameProcessor, StageHandler};

pub use crate::room::messages::{ClientReply, Notice, PlayAction, Prompt, Response, ServerMessage};
pub use crate::room::{LogEntry, LogLevel, MoveCards, Player, Room, RoomBuilder};

pub use crate::rules::{GameResult, Role};

pub use crate::skills::{
    ActiveSkill, FilterSkill, RulesBreakerSkill, Skill, SkillCapability, SkillType, TransformSkill, TriggerSkill,
    ViewAsSkill,
};

pub use crate::transport::{ChannelTransport, ClientHandle, DecisionSource, LocalTransport, Transport};

pub use crate::zones::{StackEnd, Zone, ZoneManager, ZonePosition};
