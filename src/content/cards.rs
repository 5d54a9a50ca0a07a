//! Effects of the standard cards.
//!
//! Every printed card names a skill of the same name. Basic cards and
//! tricks carry an [`ActiveSkill`] run once per target; equipment carries
//! the skill it grants while equipped.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::cards::{CardDefinition, CardId, CardType, CardView, EquipType, RealCardId, Suit, TargetMode};
use crate::core::{EngineResult, PlayerId};
use crate::events::{DamageEvent, DamageNature, Event, GameEvent, PlayerPhase, SkillUseEvent, Stage};
use crate::room::Room;
use crate::rules::SLASH;
use crate::skills::{ActiveSkill, RulesBreakerSkill, Skill, SkillCapability, SkillType, TriggerSkill};
use crate::zones::StackEnd;

pub const JINK: &str = "jink";
pub const PEACH: &str = crate::room::actions::RESCUE_CARD;
pub const EX_NIHILO: &str = "ex_nihilo";
pub const SAVAGE_ASSAULT: &str = "savage_assault";
pub const DISMANTLEMENT: &str = "dismantlement";
pub const INDULGENCE: &str = "indulgence";
pub const CROSSBOW: &str = "crossbow";
pub const EIGHT_DIAGRAM: &str = "eight_diagram";

/// Extra slash uses granted by unlimited-slash skills.
pub(crate) const UNLIMITED: u32 = 1000;

/// The printed deck, top of the draw stack first.
const DECK: &[(&str, Suit, u8)] = &[
    (SLASH, Suit::Spade, 7),
    (JINK, Suit::Heart, 2),
    (PEACH, Suit::Heart, 3),
    (SLASH, Suit::Club, 8),
    (DISMANTLEMENT, Suit::Spade, 3),
    (JINK, Suit::Diamond, 2),
    (SLASH, Suit::Heart, 10),
    (EX_NIHILO, Suit::Heart, 7),
    (SLASH, Suit::Spade, 8),
    (PEACH, Suit::Heart, 4),
    (JINK, Suit::Diamond, 3),
    (CROSSBOW, Suit::Club, 1),
    (SLASH, Suit::Club, 9),
    (INDULGENCE, Suit::Spade, 6),
    (JINK, Suit::Diamond, 4),
    (SLASH, Suit::Diamond, 6),
    (SAVAGE_ASSAULT, Suit::Spade, 7),
    (PEACH, Suit::Heart, 6),
    (SLASH, Suit::Spade, 9),
    (EIGHT_DIAGRAM, Suit::Spade, 2),
    (JINK, Suit::Diamond, 5),
    (SLASH, Suit::Club, 10),
    (DISMANTLEMENT, Suit::Club, 3),
    (JINK, Suit::Heart, 13),
    (SLASH, Suit::Heart, 11),
    (EX_NIHILO, Suit::Heart, 8),
    (PEACH, Suit::Heart, 7),
    (SLASH, Suit::Diamond, 7),
    (JINK, Suit::Diamond, 6),
    (INDULGENCE, Suit::Heart, 6),
    (SLASH, Suit::Spade, 10),
    (DISMANTLEMENT, Suit::Spade, 4),
    (JINK, Suit::Diamond, 7),
    (SLASH, Suit::Club, 2),
    (PEACH, Suit::Heart, 8),
    (SAVAGE_ASSAULT, Suit::Club, 7),
    (SLASH, Suit::Diamond, 8),
    (JINK, Suit::Diamond, 8),
    (EIGHT_DIAGRAM, Suit::Club, 2),
    (SLASH, Suit::Club, 11),
    (DISMANTLEMENT, Suit::Club, 4),
    (JINK, Suit::Heart, 2),
    (SLASH, Suit::Spade, 9),
    (PEACH, Suit::Heart, 9),
    (EX_NIHILO, Suit::Heart, 9),
    (SLASH, Suit::Diamond, 9),
    (JINK, Suit::Diamond, 11),
    (CROSSBOW, Suit::Diamond, 1),
    (SLASH, Suit::Club, 5),
    (INDULGENCE, Suit::Club, 6),
    (JINK, Suit::Diamond, 11),
    (SLASH, Suit::Heart, 10),
    (PEACH, Suit::Heart, 12),
    (DISMANTLEMENT, Suit::Heart, 12),
    (SLASH, Suit::Diamond, 10),
    (SAVAGE_ASSAULT, Suit::Spade, 13),
    (JINK, Suit::Heart, 13),
    (SLASH, Suit::Club, 6),
    (PEACH, Suit::Diamond, 12),
    (SLASH, Suit::Diamond, 13),
];

/// Card definitions of the standard deck, ids counting up from 0.
#[must_use]
pub fn deck() -> Vec<CardDefinition> {
    DECK.iter()
        .enumerate()
        .map(|(i, &(name, suit, number))| printed(RealCardId::new(i as u32), name, suit, number))
        .collect()
}

fn printed(id: RealCardId, name: &str, suit: Suit, number: u8) -> CardDefinition {
    let (card_type, target_mode) = match name {
        SLASH => (CardType::Basic, TargetMode::Single),
        DISMANTLEMENT => (CardType::Trick, TargetMode::Single),
        SAVAGE_ASSAULT => (CardType::Trick, TargetMode::Others),
        EX_NIHILO => (CardType::Trick, TargetMode::None),
        INDULGENCE => (CardType::DelayedTrick, TargetMode::Single),
        CROSSBOW => (CardType::Equip(EquipType::Weapon), TargetMode::None),
        EIGHT_DIAGRAM => (CardType::Equip(EquipType::Armor), TargetMode::None),
        _ => (CardType::Basic, TargetMode::None),
    };
    CardDefinition::new(id, name, suit, number, card_type)
        .with_target_mode(target_mode)
        .with_skill(name)
}

/// Skills behind the standard cards.
#[must_use]
pub fn skills() -> Vec<Skill> {
    vec![
        Skill::new(SLASH, SkillCapability::Active(Arc::new(Slash)))
            .with_description("deal 1 damage unless the target responds with a jink"),
        Skill::new(JINK, SkillCapability::Active(Arc::new(Jink))),
        Skill::new(PEACH, SkillCapability::Active(Arc::new(Peach))).with_description("recover 1 hp"),
        Skill::new(EX_NIHILO, SkillCapability::Active(Arc::new(ExNihilo))).with_description("draw 2 cards"),
        Skill::new(SAVAGE_ASSAULT, SkillCapability::Active(Arc::new(SavageAssault)))
            .with_description("every other player responds with a slash or takes 1 damage"),
        Skill::new(DISMANTLEMENT, SkillCapability::Active(Arc::new(Dismantlement)))
            .with_description("drop one card of the target"),
        Skill::new(INDULGENCE, SkillCapability::Active(Arc::new(Indulgence)))
            .with_description("judge: unless hearts, skip the play phase"),
        Skill::new(CROSSBOW, SkillCapability::RulesBreaker(Arc::new(Crossbow)))
            .with_type(SkillType::Compulsory)
            .with_description("no limit on slashes"),
        Skill::new(EIGHT_DIAGRAM, SkillCapability::Trigger(Arc::new(EightDiagram)))
            .unique()
            .with_description("judge when a jink is needed: a red card counts as one"),
    ]
}

/// `(from, target, card)` of a card effect event.
fn effect_target(event: &Event) -> Option<(PlayerId, PlayerId, CardId)> {
    match &event.payload {
        GameEvent::CardEffect(effect) => effect.targets.first().map(|&target| (effect.from, target, effect.card.clone())),
        _ => None,
    }
}

/// One point of normal damage caused by a card.
fn card_damage(from: PlayerId, to: PlayerId, card: CardId) -> DamageEvent {
    DamageEvent {
        from: Some(from),
        to,
        amount: 1,
        nature: DamageNature::Normal,
        card: Some(card),
    }
}

struct Slash;

#[async_trait]
impl ActiveSkill for Slash {
    fn target_range(&self) -> (usize, usize) {
        (1, 1)
    }

    fn target_filter(&self, _room: &Room, user: PlayerId, target: PlayerId) -> bool {
        user != target
    }

    async fn on_effect(&self, room: &mut Room, effect: &mut Event) -> EngineResult<()> {
        let Some((from, to, card)) = effect_target(effect) else {
            return Ok(());
        };
        if room.ask_for_card_response(to, JINK, Some(from)).await?.is_some() {
            debug!(%from, %to, "Slash dodged");
            return Ok(());
        }
        room.damage(card_damage(from, to, card)).await
    }
}

/// Only ever played in response.
struct Jink;

#[async_trait]
impl ActiveSkill for Jink {
    fn can_use(&self, _room: &Room, _user: PlayerId) -> bool {
        false
    }

    async fn on_effect(&self, _room: &mut Room, _effect: &mut Event) -> EngineResult<()> {
        Ok(())
    }
}

struct Peach;

#[async_trait]
impl ActiveSkill for Peach {
    fn can_use(&self, room: &Room, user: PlayerId) -> bool {
        room.player(user).is_wounded()
    }

    async fn on_effect(&self, room: &mut Room, effect: &mut Event) -> EngineResult<()> {
        match effect_target(effect) {
            Some((from, to, _)) => room.recover(to, Some(from), 1).await,
            None => Ok(()),
        }
    }
}

struct ExNihilo;

#[async_trait]
impl ActiveSkill for ExNihilo {
    async fn on_effect(&self, room: &mut Room, effect: &mut Event) -> EngineResult<()> {
        if let Some((_, to, _)) = effect_target(effect) {
            room.draw_cards(to, 2, StackEnd::Top).await?;
        }
        Ok(())
    }
}

struct SavageAssault;

#[async_trait]
impl ActiveSkill for SavageAssault {
    async fn on_effect(&self, room: &mut Room, effect: &mut Event) -> EngineResult<()> {
        let Some((from, to, card)) = effect_target(effect) else {
            return Ok(());
        };
        if room.ask_for_card_response(to, SLASH, Some(from)).await?.is_none() {
            room.damage(card_damage(from, to, card)).await?;
        }
        Ok(())
    }
}

struct Dismantlement;

#[async_trait]
impl ActiveSkill for Dismantlement {
    fn target_range(&self) -> (usize, usize) {
        (1, 1)
    }

    fn target_filter(&self, room: &Room, user: PlayerId, target: PlayerId) -> bool {
        user != target
            && !(room.hand(target).is_empty() && room.equips(target).is_empty() && room.judge_area(target).is_empty())
    }

    async fn on_effect(&self, room: &mut Room, effect: &mut Event) -> EngineResult<()> {
        let Some((from, to, _)) = effect_target(effect) else {
            return Ok(());
        };
        let hand = room.hand(to).len();
        let victim = if hand > 0 {
            let pick = room.rng_mut().gen_range_usize(0..hand);
            room.hand(to).get(pick).copied()
        } else {
            room.equips(to).last().or_else(|| room.judge_area(to).last()).copied()
        };
        match victim {
            Some(card) => room.drop_cards(to, &[card.into()], from).await,
            None => Ok(()),
        }
    }
}

struct Indulgence;

#[async_trait]
impl ActiveSkill for Indulgence {
    fn target_range(&self) -> (usize, usize) {
        (1, 1)
    }

    fn target_filter(&self, room: &Room, user: PlayerId, target: PlayerId) -> bool {
        user != target
            && room
                .judge_area(target)
                .iter()
                .all(|&card| room.catalog().card(card).map_or(true, |def| def.name != INDULGENCE))
    }

    /// Runs in the holder's judge phase.
    async fn on_effect(&self, room: &mut Room, effect: &mut Event) -> EngineResult<()> {
        let Some((_, to, card)) = effect_target(effect) else {
            return Ok(());
        };
        let result = room.judge(to, Some(card), None).await?;
        if result.suit != Suit::Heart {
            debug!(player = %to, "Play phase skipped");
            room.skip_phase(to, PlayerPhase::Play)?;
        }
        Ok(())
    }
}

struct Crossbow;

impl RulesBreakerSkill for Crossbow {
    fn break_card_usable_times(&self, card: &CardView) -> u32 {
        if card.name == SLASH {
            UNLIMITED
        } else {
            0
        }
    }
}

/// Answers a jink request of the wearer with a red judgement.
struct EightDiagram;

#[async_trait]
impl TriggerSkill for EightDiagram {
    fn is_triggerable(&self, event: &Event, stage: Stage) -> bool {
        stage == Stage::Asking
            && matches!(&event.payload, GameEvent::AskForCardResponse(ask) if ask.card_name == JINK && ask.answer.is_none())
    }

    fn can_use(&self, room: &Room, owner: PlayerId, event: &Event) -> bool {
        matches!(&event.payload, GameEvent::AskForCardResponse(ask) if ask.to == owner) && room.player(owner).is_alive()
    }

    async fn on_effect(&self, room: &mut Room, skill_use: &SkillUseEvent, triggered_on: &mut Event) -> EngineResult<()> {
        let owner = skill_use.from;
        let result = room.judge(owner, None, Some(EIGHT_DIAGRAM.to_owned())).await?;
        if !result.suit.is_red() {
            return Ok(());
        }
        let jink = room.virtual_cards.create(JINK, Some(EIGHT_DIAGRAM), Vec::new());
        if let GameEvent::AskForCardResponse(ask) = &mut triggered_on.payload {
            ask.answer = Some(jink);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deck_ids_are_sequential() {
        let deck = deck();
        assert_eq!(deck.len(), DECK.len());
        for (i, card) in deck.iter().enumerate() {
            assert_eq!(card.id, RealCardId::new(i as u32));
            assert_eq!(card.skill.as_deref(), Some(card.name.as_str()));
        }
    }

    #[test]
    fn test_card_kinds() {
        let deck = deck();
        let find = |name: &str| deck.iter().find(|c| c.name == name).cloned().unwrap();

        assert_eq!(find(SLASH).card_type, CardType::Basic);
        assert_eq!(find(SLASH).target_mode, TargetMode::Single);
        assert_eq!(find(SAVAGE_ASSAULT).target_mode, TargetMode::Others);
        assert_eq!(find(INDULGENCE).card_type, CardType::DelayedTrick);
        assert_eq!(find(EIGHT_DIAGRAM).card_type, CardType::Equip(EquipType::Armor));
        assert_eq!(find(PEACH).target_mode, TargetMode::None);
    }

    #[test]
    fn test_every_card_skill_is_provided() {
        let names: Vec<String> = skills().into_iter().map(|s| s.name).collect();
        for card in deck() {
            assert!(names.contains(&card.name), "{} has no skill", card.name);
        }
    }
}
