//! Transport contract between a room and its clients.
//!
//! The room only needs two things from a transport: deliver a message to one
//! player or to everyone, and yield the next reply of a given player. Socket
//! framing and reconnection belong to implementations.
//!
//! ## Key Types
//!
//! - `Transport`: the contract
//! - `ChannelTransport` / `ClientHandle`: tokio channels, one handle per player
//! - `LocalTransport` / `DecisionSource`: in-process clients answering from a
//!   decision source, recording every message

mod channel;
mod local;

pub use channel::{ChannelTransport, ClientHandle};
pub use local::{DecisionSource, LocalTransport, PassiveDecisions, ScriptedDecisions};

use crate::core::{EngineResult, PlayerId};
use crate::room::messages::{ClientReply, ServerMessage};

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Deliver a message to one player, or to every player when `to` is
    /// `None`.
    fn send(&self, to: Option<PlayerId>, message: ServerMessage) -> EngineResult<()>;

    /// Wait for the next reply from `player`.
    async fn receive(&self, player: PlayerId) -> EngineResult<ClientReply>;
}
