//! Event payloads.
//!
//! A payload carries the data of one gameplay action. Trigger skills and
//! stage handlers may rewrite some of it while the action is in flight
//! (aim targets, the judge card, damage amounts); control information lives
//! in [`EventControl`](super::EventControl) instead.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{CardId, RealCardId};
use crate::core::PlayerId;
use crate::zones::Area;

use super::stage::EventKind;

/// Target list of a card or skill. Most uses have at most a handful.
pub type Targets = SmallVec<[PlayerId; 4]>;

/// Why cards left a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardLostReason {
    CardUse,
    CardResponse,
    ActiveDrop,
    PassiveDrop,
    PlaceToDropStack,
    ActiveMove,
    PassiveMove,
    PinDian,
}

impl CardLostReason {
    /// Losses that are a direct consequence of using or responding with a
    /// card. Other players only learn that a card was played.
    #[must_use]
    pub const fn is_card_play(self) -> bool {
        matches!(self, CardLostReason::CardUse | CardLostReason::CardResponse)
    }
}

/// Why cards arrived in a hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardObtainedReason {
    CardDraw,
    ActivePrey,
    PassiveObtained,
    CardExchange,
}

/// Element of a damage instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageNature {
    #[default]
    Normal,
    Fire,
    Thunder,
}

/// Phases of a player's turn, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerPhase {
    Prepare,
    Judge,
    Draw,
    Play,
    Drop,
    Finish,
}

impl PlayerPhase {
    /// All phases in turn order.
    pub const ALL: [PlayerPhase; 6] = [
        PlayerPhase::Prepare,
        PlayerPhase::Judge,
        PlayerPhase::Draw,
        PlayerPhase::Play,
        PlayerPhase::Drop,
        PlayerPhase::Finish,
    ];
}

/// A card being used, or the effect of a used card on its targets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardUseEvent {
    pub from: PlayerId,
    pub card: CardId,
    pub targets: Targets,
}

impl CardUseEvent {
    pub fn new(from: PlayerId, card: impl Into<CardId>) -> Self {
        Self {
            from,
            card: card.into(),
            targets: Targets::new(),
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: PlayerId) -> Self {
        self.targets.push(target);
        self
    }
}

/// A card played in response to a request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardResponseEvent {
    pub from: PlayerId,
    pub card: CardId,
}

/// Cards dropped to the discard stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDropEvent {
    pub from: PlayerId,
    pub cards: Vec<CardId>,
    pub dropped_by: PlayerId,
}

/// Cards leaving a player's zones.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardLostEvent {
    pub from: PlayerId,
    pub cards: Vec<(RealCardId, Area)>,
    pub reason: CardLostReason,
    pub dropped_by: Option<PlayerId>,
}

/// Drawing from the draw stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawCardEvent {
    pub player: PlayerId,
    pub amount: usize,
    pub asked_by: PlayerId,
}

/// Cards arriving in a hand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObtainCardEvent {
    pub to: PlayerId,
    pub from: Option<PlayerId>,
    pub cards: Vec<RealCardId>,
    pub reason: CardObtainedReason,
}

/// Target selection of a card; skills may redirect or cancel it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AimEvent {
    pub from: PlayerId,
    pub by_card: CardId,
    pub targets: Targets,
}

/// A skill being used, either triggered or activated by its owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillUseEvent {
    pub from: PlayerId,
    pub skill: String,
    pub targets: Targets,
    pub cards: Vec<CardId>,
    pub triggered_on: Option<EventKind>,
}

impl SkillUseEvent {
    pub fn new(from: PlayerId, skill: impl Into<String>) -> Self {
        Self {
            from,
            skill: skill.into(),
            targets: Targets::new(),
            cards: Vec::new(),
            triggered_on: None,
        }
    }
}

/// Outcome of a pin-dian.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinDianResult {
    pub winner: Option<PlayerId>,
    pub cards: Vec<(PlayerId, CardId)>,
}

/// A card-off duel among several players.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinDianEvent {
    pub from: PlayerId,
    pub targets: Targets,
    pub result: Option<PinDianResult>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoseHpEvent {
    pub player: PlayerId,
    pub amount: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageEvent {
    pub from: Option<PlayerId>,
    pub to: PlayerId,
    pub amount: i32,
    pub nature: DamageNature,
    pub card: Option<CardId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverEvent {
    pub to: PlayerId,
    pub by: Option<PlayerId>,
    pub amount: i32,
}

/// A judgement; skills may replace `judge_card` while it resolves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeEvent {
    pub to: PlayerId,
    pub judge_card: CardId,
    pub by_card: Option<CardId>,
    pub by_skill: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseChangeEvent {
    pub player: PlayerId,
    pub from: Option<PlayerPhase>,
    pub to: PlayerPhase,
}

/// Dying or death of a player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDeathEvent {
    pub player: PlayerId,
    pub killed_by: Option<PlayerId>,
}

/// A request for a card by name, before the player is asked. Trigger skills
/// may answer it themselves by filling `answer` and terminating the event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskForCardEvent {
    pub to: PlayerId,
    pub card_name: String,
    pub from: Option<PlayerId>,
    pub answer: Option<CardId>,
}

/// Payload of every event kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    CardUse(CardUseEvent),
    CardEffect(CardUseEvent),
    CardResponse(CardResponseEvent),
    CardDrop(CardDropEvent),
    CardLost(CardLostEvent),
    DrawCard(DrawCardEvent),
    ObtainCard(ObtainCardEvent),
    Aim(AimEvent),
    SkillUse(SkillUseEvent),
    SkillEffect(SkillUseEvent),
    PinDian(PinDianEvent),
    LoseHp(LoseHpEvent),
    Damage(DamageEvent),
    Recover(RecoverEvent),
    Judge(JudgeEvent),
    PhaseChange(PhaseChangeEvent),
    PlayerDying(PlayerDeathEvent),
    PlayerDied(PlayerDeathEvent),
    AskForCardUse(AskForCardEvent),
    AskForCardResponse(AskForCardEvent),
}

impl GameEvent {
    /// The event kind of this payload.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            GameEvent::CardUse(_) => EventKind::CardUse,
            GameEvent::CardEffect(_) => EventKind::CardEffect,
            GameEvent::CardResponse(_) => EventKind::CardResponse,
            GameEvent::CardDrop(_) => EventKind::CardDrop,
            GameEvent::CardLost(_) => EventKind::CardLost,
            GameEvent::DrawCard(_) => EventKind::DrawCard,
            GameEvent::ObtainCard(_) => EventKind::ObtainCard,
            GameEvent::Aim(_) => EventKind::Aim,
            GameEvent::SkillUse(_) => EventKind::SkillUse,
            GameEvent::SkillEffect(_) => EventKind::SkillEffect,
            GameEvent::PinDian(_) => EventKind::PinDian,
            GameEvent::LoseHp(_) => EventKind::LoseHp,
            GameEvent::Damage(_) => EventKind::Damage,
            GameEvent::Recover(_) => EventKind::Recover,
            GameEvent::Judge(_) => EventKind::Judge,
            GameEvent::PhaseChange(_) => EventKind::PhaseChange,
            GameEvent::PlayerDying(_) => EventKind::PlayerDying,
            GameEvent::PlayerDied(_) => EventKind::PlayerDied,
            GameEvent::AskForCardUse(_) => EventKind::AskForCardUse,
            GameEvent::AskForCardResponse(_) => EventKind::AskForCardResponse,
        }
    }

    /// The player an event is "about", used by skills that react to events
    /// concerning their owner.
    #[must_use]
    pub fn subject(&self) -> PlayerId {
        match self {
            GameEvent::CardUse(e) | GameEvent::CardEffect(e) => e.from,
            GameEvent::CardResponse(e) => e.from,
            GameEvent::CardDrop(e) => e.from,
            GameEvent::CardLost(e) => e.from,
            GameEvent::DrawCard(e) => e.player,
            GameEvent::ObtainCard(e) => e.to,
            GameEvent::Aim(e) => e.from,
            GameEvent::SkillUse(e) | GameEvent::SkillEffect(e) => e.from,
            GameEvent::PinDian(e) => e.from,
            GameEvent::LoseHp(e) => e.player,
            GameEvent::Damage(e) => e.to,
            GameEvent::Recover(e) => e.to,
            GameEvent::Judge(e) => e.to,
            GameEvent::PhaseChange(e) => e.player,
            GameEvent::PlayerDying(e) | GameEvent::PlayerDied(e) => e.player,
            GameEvent::AskForCardUse(e) | GameEvent::AskForCardResponse(e) => e.to,
        }
    }
}
