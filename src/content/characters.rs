//! Standard characters and their skills.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::cards::{CardId, CardView, RealCardId, Suit};
use crate::catalog::{CharacterDefinition, CharacterId, Gender, Nationality};
use crate::core::{EngineResult, PlayerId};
use crate::events::{CardObtainedReason, Event, GameEvent, PlayerPhase, SkillUseEvent, Stage};
use crate::room::Room;
use crate::rules::SLASH;
use crate::skills::{
    ActiveSkill, FilterSkill, RulesBreakerSkill, Skill, SkillCapability, SkillType, TransformSkill, TriggerSkill,
    ViewAsSkill,
};
use crate::zones::StackEnd;

use super::cards::UNLIMITED;

pub const CAOCAO: CharacterId = CharacterId::new(1);
pub const GUANYU: CharacterId = CharacterId::new(2);
pub const ZHANGFEI: CharacterId = CharacterId::new(3);
pub const HUANGGAI: CharacterId = CharacterId::new(4);
pub const XIAOQIAO: CharacterId = CharacterId::new(5);
pub const ZHUGELIANG: CharacterId = CharacterId::new(6);
pub const SUNCE: CharacterId = CharacterId::new(7);
pub const PANGTONG: CharacterId = CharacterId::new(8);
pub const ZHOUYU: CharacterId = CharacterId::new(9);

pub const JIANXIONG: &str = "jianxiong";
pub const JIUYUAN: &str = "jiuyuan";
pub const WUSHENG: &str = "wusheng";
pub const PAOXIAO: &str = "paoxiao";
pub const KUROU: &str = "kurou";
pub const HONGYAN: &str = "hongyan";
pub const KONGCHENG: &str = "kongcheng";
pub const HUNZI: &str = "hunzi";
pub const YINGZI: &str = "yingzi";
pub const NIEPAN: &str = "niepan";

#[must_use]
pub fn characters() -> Vec<CharacterDefinition> {
    vec![
        CharacterDefinition::new(CAOCAO, "caocao", 4)
            .with_nationality(Nationality::Wei)
            .with_skill(JIANXIONG)
            .with_skill(JIUYUAN),
        CharacterDefinition::new(GUANYU, "guanyu", 4)
            .with_nationality(Nationality::Shu)
            .with_skill(WUSHENG),
        CharacterDefinition::new(ZHANGFEI, "zhangfei", 4)
            .with_nationality(Nationality::Shu)
            .with_skill(PAOXIAO),
        CharacterDefinition::new(HUANGGAI, "huanggai", 4)
            .with_nationality(Nationality::Wu)
            .with_skill(KUROU),
        CharacterDefinition::new(XIAOQIAO, "xiaoqiao", 3)
            .with_gender(Gender::Female)
            .with_nationality(Nationality::Wu)
            .with_skill(HONGYAN),
        CharacterDefinition::new(ZHUGELIANG, "zhugeliang", 3)
            .with_nationality(Nationality::Shu)
            .with_skill(KONGCHENG),
        CharacterDefinition::new(SUNCE, "sunce", 4)
            .with_nationality(Nationality::Wu)
            .with_skill(HUNZI),
        CharacterDefinition::new(PANGTONG, "pangtong", 3)
            .with_nationality(Nationality::Shu)
            .with_skill(NIEPAN),
        CharacterDefinition::new(ZHOUYU, "zhouyu", 3)
            .with_nationality(Nationality::Wu)
            .with_skill(YINGZI),
    ]
}

#[must_use]
pub fn skills() -> Vec<Skill> {
    vec![
        Skill::new(JIANXIONG, SkillCapability::Trigger(Arc::new(Jianxiong)))
            .with_description("after taking damage from a card, obtain that card"),
        Skill::new(JIUYUAN, SkillCapability::Trigger(Arc::new(Jiuyuan)))
            .with_type(SkillType::Compulsory)
            .lord_only()
            .with_description("recovery given by another player heals 1 more"),
        Skill::new(WUSHENG, SkillCapability::ViewAs(Arc::new(Wusheng)))
            .with_description("use or play a red card as a slash"),
        Skill::new(PAOXIAO, SkillCapability::RulesBreaker(Arc::new(Paoxiao)))
            .with_type(SkillType::Compulsory)
            .with_description("no limit on slashes"),
        Skill::new(KUROU, SkillCapability::Active(Arc::new(Kurou))).with_description("lose 1 hp, then draw 2 cards"),
        Skill::new(HONGYAN, SkillCapability::Transform(Arc::new(Hongyan)))
            .with_type(SkillType::Compulsory)
            .with_description("spades count as hearts"),
        Skill::new(KONGCHENG, SkillCapability::Filter(Arc::new(Kongcheng)))
            .with_type(SkillType::Compulsory)
            .with_description("cannot be the target of a slash while the hand is empty"),
        Skill::new(HUNZI, SkillCapability::Trigger(Arc::new(Hunzi)))
            .with_type(SkillType::Awaken)
            .with_description("at 1 hp in the prepare phase: lose 1 max hp and gain yingzi"),
        Skill::new(YINGZI, SkillCapability::Trigger(Arc::new(Yingzi))).with_description("draw 1 more card in the draw phase"),
        Skill::new(NIEPAN, SkillCapability::Trigger(Arc::new(Niepan)))
            .with_type(SkillType::Limit)
            .with_description("once per game when dying: drop every card, draw 3 and return to 3 hp"),
    ]
}

/// Obtains the cards that damaged the owner, if they are still in flight.
struct Jianxiong;

impl Jianxiong {
    fn cards_in_flight(room: &Room, event: &Event) -> Vec<RealCardId> {
        let GameEvent::Damage(damage) = &event.payload else {
            return Vec::new();
        };
        let Some(card) = &damage.card else {
            return Vec::new();
        };
        room.virtual_cards()
            .resolve(card)
            .unwrap_or_default()
            .into_iter()
            .filter(|id| room.processing_area().contains(id))
            .collect()
    }
}

#[async_trait]
impl TriggerSkill for Jianxiong {
    fn is_triggerable(&self, event: &Event, stage: Stage) -> bool {
        stage == Stage::Damaged && matches!(&event.payload, GameEvent::Damage(damage) if damage.card.is_some())
    }

    fn can_use(&self, room: &Room, owner: PlayerId, event: &Event) -> bool {
        matches!(&event.payload, GameEvent::Damage(damage) if damage.to == owner)
            && !Self::cards_in_flight(room, event).is_empty()
    }

    async fn on_effect(&self, room: &mut Room, skill_use: &SkillUseEvent, triggered_on: &mut Event) -> EngineResult<()> {
        let cards = Self::cards_in_flight(room, triggered_on);
        room.obtain_cards(skill_use.from, cards, None, CardObtainedReason::PassiveObtained)
            .await
    }
}

struct Jiuyuan;

#[async_trait]
impl TriggerSkill for Jiuyuan {
    fn is_triggerable(&self, event: &Event, stage: Stage) -> bool {
        stage == Stage::BeforeRecover && matches!(event.payload, GameEvent::Recover(_))
    }

    fn can_use(&self, _room: &Room, owner: PlayerId, event: &Event) -> bool {
        matches!(&event.payload, GameEvent::Recover(recover) if recover.to == owner && recover.by.is_some_and(|by| by != owner))
    }

    async fn on_effect(&self, _room: &mut Room, _skill_use: &SkillUseEvent, triggered_on: &mut Event) -> EngineResult<()> {
        if let GameEvent::Recover(recover) = &mut triggered_on.payload {
            recover.amount += 1;
        }
        Ok(())
    }
}

struct Wusheng;

impl ViewAsSkill for Wusheng {
    fn can_view_as(&self) -> Vec<String> {
        vec![SLASH.to_owned()]
    }

    fn card_filter(&self, _room: &Room, _owner: PlayerId, card: &CardView) -> bool {
        card.suit.is_red()
    }
}

struct Paoxiao;

impl RulesBreakerSkill for Paoxiao {
    fn break_card_usable_times(&self, card: &CardView) -> u32 {
        if card.name == SLASH {
            UNLIMITED
        } else {
            0
        }
    }
}

struct Kurou;

#[async_trait]
impl ActiveSkill for Kurou {
    fn can_use(&self, room: &Room, user: PlayerId) -> bool {
        room.player(user).hp > 0
    }

    async fn on_effect(&self, room: &mut Room, effect: &mut Event) -> EngineResult<()> {
        let GameEvent::SkillEffect(skill_use) = &effect.payload else {
            return Ok(());
        };
        let user = skill_use.from;
        room.lose_hp(user, 1).await?;
        if room.player(user).is_alive() {
            room.draw_cards(user, 2, StackEnd::Top).await?;
        }
        Ok(())
    }
}

struct Hongyan;

impl TransformSkill for Hongyan {
    fn can_transform(&self, card: &CardView) -> bool {
        card.suit == Suit::Spade
    }

    fn force_transform(&self, card: &mut CardView) {
        card.suit = Suit::Heart;
    }
}

struct Kongcheng;

impl FilterSkill for Kongcheng {
    fn can_be_targeted(&self, room: &Room, owner: PlayerId, _by: PlayerId, card: &CardView) -> bool {
        !(card.name == SLASH && room.hand(owner).is_empty())
    }
}

/// Awakens once: the mark keeps it from firing again.
struct Hunzi;

#[async_trait]
impl TriggerSkill for Hunzi {
    fn is_triggerable(&self, event: &Event, stage: Stage) -> bool {
        stage == Stage::PhaseChanged
            && matches!(&event.payload, GameEvent::PhaseChange(change) if change.to == PlayerPhase::Prepare)
    }

    fn can_use(&self, room: &Room, owner: PlayerId, event: &Event) -> bool {
        let player = room.player(owner);
        matches!(&event.payload, GameEvent::PhaseChange(change) if change.player == owner)
            && player.hp == 1
            && player.mark(HUNZI) == 0
    }

    async fn on_effect(&self, room: &mut Room, skill_use: &SkillUseEvent, _triggered_on: &mut Event) -> EngineResult<()> {
        let owner = skill_use.from;
        room.set_mark(owner, HUNZI, 1)?;
        room.player_mut(owner).max_hp -= 1;
        room.change_hp(owner, 0);
        info!(%owner, "Awakened");
        room.obtain_skill(owner, YINGZI)
    }
}

struct Yingzi;

#[async_trait]
impl TriggerSkill for Yingzi {
    fn is_triggerable(&self, event: &Event, stage: Stage) -> bool {
        stage == Stage::BeforeDrawCard && matches!(event.payload, GameEvent::DrawCard(_))
    }

    fn can_use(&self, room: &Room, owner: PlayerId, event: &Event) -> bool {
        matches!(&event.payload, GameEvent::DrawCard(draw) if draw.player == owner)
            && room.current() == owner
            && room.phase() == Some(PlayerPhase::Draw)
    }

    async fn on_effect(&self, _room: &mut Room, _skill_use: &SkillUseEvent, triggered_on: &mut Event) -> EngineResult<()> {
        if let GameEvent::DrawCard(draw) = &mut triggered_on.payload {
            draw.amount += 1;
        }
        Ok(())
    }
}

struct Niepan;

#[async_trait]
impl TriggerSkill for Niepan {
    fn is_triggerable(&self, event: &Event, stage: Stage) -> bool {
        stage == Stage::PlayerDying && matches!(event.payload, GameEvent::PlayerDying(_))
    }

    fn can_use(&self, room: &Room, owner: PlayerId, event: &Event) -> bool {
        let player = room.player(owner);
        matches!(&event.payload, GameEvent::PlayerDying(dying) if dying.player == owner)
            && player.hp <= 0
            && player.skill_used_times(NIEPAN) == 0
    }

    async fn on_effect(&self, room: &mut Room, skill_use: &SkillUseEvent, _triggered_on: &mut Event) -> EngineResult<()> {
        let owner = skill_use.from;
        let cards: Vec<CardId> = room
            .hand(owner)
            .iter()
            .chain(room.equips(owner))
            .chain(room.judge_area(owner))
            .copied()
            .map(CardId::from)
            .collect();
        room.drop_cards(owner, &cards, owner).await?;
        if room.player(owner).turned_over {
            room.turn_over(owner)?;
        }
        room.draw_cards(owner, 3, StackEnd::Top).await?;
        let hp = room.player(owner).hp;
        room.change_hp(owner, 3 - hp);
        debug!(%owner, "Reborn");
        Ok(())
    }
}
