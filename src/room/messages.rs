//! Wire messages between a room and its clients.
//!
//! The room sends [`ServerMessage`]s: a [`Prompt`] addressed to one player
//! under a fresh request id, or a public/private [`Notice`]. Clients answer
//! prompts with a [`ClientReply`] echoing the request id.

use serde::{Deserialize, Serialize};

use crate::cards::{CardId, RealCardId};
use crate::core::state::RoomSnapshot;
use crate::core::PlayerId;
use crate::events::{EventKind, PlayerPhase};
use crate::rules::{GameResult, Role};
use crate::zones::Zone;

use super::player::{FlagKey, FlagValue};

/// Identifier of one outstanding prompt.
pub type RequestId = u64;

/// A decision the room is waiting for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prompt {
    /// Invoke a triggered skill?
    AskForSkillUse { skill: String, event: EventKind },
    /// Use a card by name, e.g. a rescue peach.
    AskForCardUse {
        card_name: String,
        from: Option<PlayerId>,
    },
    /// Play a card by name in response, e.g. a jink against a slash.
    AskForCardResponse {
        card_name: String,
        from: Option<PlayerId>,
    },
    /// Drop exactly `amount` cards.
    AskForCardDrop { amount: usize },
    /// Submit one hand card face down.
    AskForPinDian { from: PlayerId },
    /// Next action of the play phase.
    AskForPlayAction,
}

/// What a client can do in the play phase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayAction {
    UseCard {
        card: CardId,
        targets: Vec<PlayerId>,
    },
    UseSkill {
        skill: String,
        cards: Vec<CardId>,
        targets: Vec<PlayerId>,
    },
    /// Use cards as another card through a view-as skill.
    ViewAs {
        skill: String,
        cards: Vec<CardId>,
        as_card: String,
        targets: Vec<PlayerId>,
    },
    Finish,
}

/// A client's answer to a prompt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    SkillDecision {
        invoke: bool,
        targets: Vec<PlayerId>,
        cards: Vec<CardId>,
    },
    Card(Option<CardId>),
    /// Answer a card prompt with cards viewed as the requested card.
    ViewAs { skill: String, cards: Vec<CardId> },
    Cards(Vec<CardId>),
    PlayAction(PlayAction),
}

impl Response {
    /// Whether this response can answer `prompt`.
    #[must_use]
    pub fn answers(&self, prompt: &Prompt) -> bool {
        match (prompt, self) {
            (Prompt::AskForSkillUse { .. }, Response::SkillDecision { .. }) => true,
            (
                Prompt::AskForCardUse { .. } | Prompt::AskForCardResponse { .. },
                Response::Card(_) | Response::ViewAs { .. },
            ) => true,
            (Prompt::AskForPinDian { .. }, Response::Card(_)) => true,
            (Prompt::AskForCardDrop { .. }, Response::Cards(_)) => true,
            (Prompt::AskForPlayAction, Response::PlayAction(_)) => true,
            _ => false,
        }
    }

    /// The answer that declines `prompt`.
    #[must_use]
    pub fn decline_for(prompt: &Prompt) -> Self {
        match prompt {
            Prompt::AskForSkillUse { .. } => Response::SkillDecision {
                invoke: false,
                targets: Vec::new(),
                cards: Vec::new(),
            },
            Prompt::AskForCardUse { .. } | Prompt::AskForCardResponse { .. } | Prompt::AskForPinDian { .. } => {
                Response::Card(None)
            }
            Prompt::AskForCardDrop { .. } => Response::Cards(Vec::new()),
            Prompt::AskForPlayAction => Response::PlayAction(PlayAction::Finish),
        }
    }

    /// Shorthand for invoking a triggered skill with no choices.
    #[must_use]
    pub fn invoke() -> Self {
        Response::SkillDecision {
            invoke: true,
            targets: Vec::new(),
            cards: Vec::new(),
        }
    }
}

/// A client's reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientReply {
    pub request_id: RequestId,
    pub from: PlayerId,
    pub response: Response,
}

/// Something clients should learn about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    /// Cards moved in view of the recipient.
    CardsMoved {
        cards: Vec<RealCardId>,
        from: Option<Zone>,
        to: Zone,
    },
    /// Cards moved, only the count is public.
    CardsMovedHidden {
        count: usize,
        from: Option<Zone>,
        to: Zone,
    },
    Reshuffled { draw_stack_size: usize },
    CardUsed {
        from: PlayerId,
        card: CardId,
        targets: Vec<PlayerId>,
    },
    CardResponded { from: PlayerId, card: CardId },
    SkillUsed {
        from: PlayerId,
        skill: String,
        targets: Vec<PlayerId>,
    },
    HpChanged { player: PlayerId, hp: i32, max_hp: i32 },
    PhaseChanged { player: PlayerId, phase: PlayerPhase },
    JudgeResult { player: PlayerId, card: CardId },
    PinDianResult {
        winner: Option<PlayerId>,
        cards: Vec<(PlayerId, CardId)>,
    },
    FlagChanged {
        player: PlayerId,
        key: FlagKey,
        value: Option<FlagValue>,
    },
    MarkChanged { player: PlayerId, name: String, value: i32 },
    SkillObtained { player: PlayerId, skill: String },
    SkillLost { player: PlayerId, skill: String },
    TurnedOver { player: PlayerId, turned_over: bool },
    PlayerDied { player: PlayerId, role: Option<Role> },
    Snapshot(RoomSnapshot),
    GameOver(GameResult),
}

/// Message from the room to one or all clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerMessage {
    Request {
        id: RequestId,
        to: PlayerId,
        prompt: Prompt,
    },
    Notice(Notice),
}
