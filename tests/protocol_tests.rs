//! Protocol integration tests: judgement, pin-dian, aiming, equipment and
//! virtual cards.

mod common;

use std::sync::Arc;

use rust_sgs::content::characters::{GUANYU, ZHANGFEI};
use rust_sgs::events::{CardLostReason, SkillUseEvent};
use rust_sgs::transport::ScriptedDecisions;
use rust_sgs::{
    CardId, CardView, CharacterId, EngineErrorKind, EngineResult, Event, GameEvent, LocalTransport, MoveCards,
    Notice, PlayerId, Prompt, RealCardId, Response, Room, Skill, SkillCapability, SkillType, Stage, Suit,
    TriggerSkill, ViewAsSkill, Zone,
};

use common::*;

const EVADER: CharacterId = CharacterId::new(100);
const SWAPPER: CharacterId = CharacterId::new(101);
const DUELIST: CharacterId = CharacterId::new(102);

// Standard deck ids used below.
const SLASH_SPADE_7: u32 = 0;
const JINK_HEART_2: u32 = 1;
const PEACH_HEART_3: u32 = 2;
const SLASH_HEART_10: u32 = 6;
const EX_NIHILO_HEART_7: u32 = 7;
const CROSSBOW_CLUB_1: u32 = 11;
const SLASH_CLUB_9: u32 = 12;
const SAVAGE_ASSAULT_SPADE_7: u32 = 16;
const EIGHT_DIAGRAM_SPADE_2: u32 = 19;
const CROSSBOW_DIAMOND_1: u32 = 47;

/// Steps out of the way of any card aimed at its owner.
struct Evade;

#[async_trait::async_trait]
impl TriggerSkill for Evade {
    fn is_triggerable(&self, event: &Event, stage: Stage) -> bool {
        stage == Stage::OnAim && matches!(event.payload, GameEvent::Aim(_))
    }

    fn can_use(&self, _room: &Room, owner: PlayerId, event: &Event) -> bool {
        matches!(&event.payload, GameEvent::Aim(aim) if aim.targets.contains(&owner))
    }

    async fn on_effect(&self, _room: &mut Room, skill_use: &SkillUseEvent, event: &mut Event) -> EngineResult<()> {
        if let GameEvent::Aim(aim) = &mut event.payload {
            aim.targets.retain(|t| *t != skill_use.from);
        }
        Ok(())
    }
}

/// Replaces its owner's judge card with the first card of their hand.
struct Swap;

#[async_trait::async_trait]
impl TriggerSkill for Swap {
    fn is_triggerable(&self, event: &Event, stage: Stage) -> bool {
        stage == Stage::BeforeJudge && matches!(event.payload, GameEvent::Judge(_))
    }

    fn can_use(&self, room: &Room, owner: PlayerId, event: &Event) -> bool {
        matches!(&event.payload, GameEvent::Judge(judge) if judge.to == owner) && !room.hand(owner).is_empty()
    }

    async fn on_effect(&self, room: &mut Room, skill_use: &SkillUseEvent, event: &mut Event) -> EngineResult<()> {
        let owner = skill_use.from;
        let Some(&card) = room.hand(owner).first() else {
            return Ok(());
        };
        let lost = room
            .lose_cards(owner, &[CardId::Real(card)], CardLostReason::PassiveMove, None)
            .await?;
        if let (Some(&card), GameEvent::Judge(judge)) = (lost.first(), &mut event.payload) {
            judge.judge_card = CardId::Real(card);
        }
        Ok(())
    }
}

/// Any two cards as a slash.
struct Duel;

impl ViewAsSkill for Duel {
    fn can_view_as(&self) -> Vec<String> {
        vec!["slash".into()]
    }

    fn card_count(&self) -> usize {
        2
    }

    fn card_filter(&self, _room: &Room, _owner: PlayerId, _card: &CardView) -> bool {
        true
    }
}

fn catalog() -> Arc<rust_sgs::Catalog> {
    catalog_with(
        vec![
            Skill::new("evade", SkillCapability::Trigger(Arc::new(Evade))).with_type(SkillType::Compulsory),
            Skill::new("swap", SkillCapability::Trigger(Arc::new(Swap))).with_type(SkillType::Compulsory),
            Skill::new("duel", SkillCapability::ViewAs(Arc::new(Duel))),
        ],
        vec![
            character(EVADER.raw(), "evader", 4, &["evade"]),
            character(SWAPPER.raw(), "swapper", 4, &["swap"]),
            character(DUELIST.raw(), "duelist", 4, &["duel"]),
        ],
    )
}

fn build(roster: &[CharacterId]) -> (Room, Arc<LocalTransport>) {
    let transport = Arc::new(LocalTransport::passive());
    (room_with(catalog(), transport.clone(), roster), transport)
}

async fn give(room: &mut Room, player: PlayerId, cards: &[u32]) {
    let cards = cards.iter().map(|&id| real(id)).collect();
    room.move_cards(MoveCards::new(cards, Zone::Hand(player))).await.unwrap();
}

fn ids(cards: &[u32]) -> Vec<RealCardId> {
    cards.iter().map(|&id| RealCardId::new(id)).collect()
}

fn discarded(room: &Room, id: u32) -> bool {
    room.discard_stack().contains(&RealCardId::new(id))
}

// === Judgement ===

/// A judge reveals the top card and buries it.
#[tokio::test]
async fn test_judge_reveals_top_card() {
    let (mut room, transport) = build(&[GUANYU, GUANYU]);
    let before = room.draw_stack().len();

    let result = room.judge(p(0), None, None).await.unwrap();

    assert_eq!(result.real_ids, ids(&[SLASH_SPADE_7]));
    assert_eq!(result.suit, Suit::Spade);
    assert_eq!(room.draw_stack().len(), before - 1);
    assert!(discarded(&room, SLASH_SPADE_7));
    assert!(room.processing_area().is_empty());
    assert!(transport
        .notices()
        .iter()
        .any(|n| matches!(n, Notice::JudgeResult { player, .. } if *player == p(0))));
}

/// A replaced judge card decides the result, and both cards are buried.
#[tokio::test]
async fn test_judge_replacement() {
    let (mut room, _) = build(&[SWAPPER, GUANYU]);
    give(&mut room, p(0), &[PEACH_HEART_3]).await;

    let result = room.judge(p(0), None, None).await.unwrap();

    assert_eq!(result.real_ids, ids(&[PEACH_HEART_3]));
    assert_eq!(result.suit, Suit::Heart);
    assert!(discarded(&room, SLASH_SPADE_7));
    assert!(discarded(&room, PEACH_HEART_3));
    assert!(room.hand(p(0)).is_empty());
    assert!(room.deck_is_partitioned());
}

// === Pin-dian ===

/// The higher card wins; every submitted card is buried.
#[tokio::test]
async fn test_pindian_higher_card_wins() {
    let (mut room, _) = build(&[GUANYU, GUANYU]);
    give(&mut room, p(0), &[SLASH_SPADE_7]).await;
    give(&mut room, p(1), &[JINK_HEART_2]).await;

    let result = room.pindian(p(0), vec![p(1)]).await.unwrap();

    assert_eq!(result.winner, Some(p(0)));
    assert_eq!(result.cards, vec![(p(0), real(SLASH_SPADE_7)), (p(1), real(JINK_HEART_2))]);
    assert!(discarded(&room, SLASH_SPADE_7));
    assert!(discarded(&room, JINK_HEART_2));
    assert!(room.processing_area().is_empty());
}

/// Equal numbers give no winner.
#[tokio::test]
async fn test_pindian_tie() {
    let (mut room, _) = build(&[GUANYU, GUANYU]);
    give(&mut room, p(0), &[SLASH_SPADE_7]).await;
    give(&mut room, p(1), &[SAVAGE_ASSAULT_SPADE_7]).await;

    let result = room.pindian(p(0), vec![p(1)]).await.unwrap();
    assert_eq!(result.winner, None);
}

/// Participants pick their card; an unusable answer falls back to the
/// first hand card.
#[tokio::test]
async fn test_pindian_uses_chosen_cards() {
    let decisions = ScriptedDecisions::new()
        .then(p(0), Response::Card(Some(real(SLASH_HEART_10))))
        .then(p(1), Response::Card(Some(real(PEACH_HEART_3))))
        .then(p(2), Response::Card(None));
    let transport = Arc::new(LocalTransport::new(Arc::new(decisions)));
    let mut room = room_with(catalog(), transport.clone(), &[GUANYU, GUANYU, GUANYU]);
    give(&mut room, p(0), &[JINK_HEART_2, SLASH_HEART_10]).await;
    // Peach 3 is not in p1's hand, so p1 submits the ex nihilo.
    give(&mut room, p(1), &[EX_NIHILO_HEART_7]).await;
    give(&mut room, p(2), &[SLASH_CLUB_9]).await;

    let result = room.pindian(p(0), vec![p(1), p(2)]).await.unwrap();

    assert_eq!(result.winner, Some(p(0)));
    assert_eq!(
        result.cards,
        vec![
            (p(0), real(SLASH_HEART_10)),
            (p(1), real(EX_NIHILO_HEART_7)),
            (p(2), real(SLASH_CLUB_9)),
        ]
    );
    assert_eq!(room.hand(p(0)), ids(&[JINK_HEART_2]).as_slice());
    for player in [p(0), p(1), p(2)] {
        assert_eq!(transport.prompts_to(player), vec![Prompt::AskForPinDian { from: p(0) }]);
    }
}

/// Pin-dian needs a target and cards in every hand.
#[tokio::test]
async fn test_pindian_preconditions() {
    let (mut room, _) = build(&[GUANYU, GUANYU]);
    give(&mut room, p(0), &[SLASH_SPADE_7]).await;

    let err = room.pindian(p(0), Vec::new()).await.unwrap_err();
    assert!(matches!(err.kind, EngineErrorKind::IllegalAction(_)));

    let err = room.pindian(p(0), vec![p(1)]).await.unwrap_err();
    assert!(matches!(err.kind, EngineErrorKind::IllegalAction(_)));
    assert_eq!(room.hand(p(0)), ids(&[SLASH_SPADE_7]).as_slice());
}

// === Aiming ===

/// A target removed while aiming is never affected.
#[tokio::test]
async fn test_aim_removes_target() {
    let (mut room, transport) = build(&[GUANYU, EVADER]);
    give(&mut room, p(0), &[SLASH_CLUB_9]).await;

    room.use_card(p(0), real(SLASH_CLUB_9), vec![p(1)]).await.unwrap();

    assert_eq!(room.player(p(1)).hp, 4);
    assert!(transport.prompts_to(p(1)).is_empty());
    assert!(discarded(&room, SLASH_CLUB_9));
}

/// A multi-target card aims at each target on its own.
#[tokio::test]
async fn test_aim_per_target() {
    let (mut room, _) = build(&[GUANYU, EVADER, GUANYU]);
    give(&mut room, p(0), &[SAVAGE_ASSAULT_SPADE_7]).await;

    room.use_card(p(0), real(SAVAGE_ASSAULT_SPADE_7), vec![p(1), p(2)])
        .await
        .unwrap();

    assert_eq!(room.player(p(1)).hp, 4);
    assert_eq!(room.player(p(2)).hp, 3);
    assert!(room.deck_is_partitioned());
}

// === Equipment ===

/// Equipping a second weapon sends the first to the discard stack.
#[tokio::test]
async fn test_equip_replaces_same_type() {
    let (mut room, _) = build(&[ZHANGFEI, GUANYU]);
    give(&mut room, p(0), &[CROSSBOW_CLUB_1, CROSSBOW_DIAMOND_1, EIGHT_DIAGRAM_SPADE_2]).await;

    room.use_card(p(0), real(CROSSBOW_CLUB_1), Vec::new()).await.unwrap();
    room.use_card(p(0), real(EIGHT_DIAGRAM_SPADE_2), Vec::new()).await.unwrap();
    assert_eq!(room.equips(p(0)), ids(&[CROSSBOW_CLUB_1, EIGHT_DIAGRAM_SPADE_2]).as_slice());

    room.use_card(p(0), real(CROSSBOW_DIAMOND_1), Vec::new()).await.unwrap();
    assert_eq!(room.equips(p(0)), ids(&[EIGHT_DIAGRAM_SPADE_2, CROSSBOW_DIAMOND_1]).as_slice());
    assert!(discarded(&room, CROSSBOW_CLUB_1));
    assert!(room.hand(p(0)).is_empty());
    assert!(room.deck_is_partitioned());
}

/// A red judge lets the armour answer a jink request on its own.
#[tokio::test]
async fn test_armour_answers_with_a_virtual_card() {
    let decisions = ScriptedDecisions::new().then(p(1), Response::invoke());
    let transport = Arc::new(LocalTransport::new(Arc::new(decisions)));
    let mut room = room_with(catalog(), transport, &[GUANYU, GUANYU]);
    give(&mut room, p(0), &[SLASH_SPADE_7]).await;
    give(&mut room, p(1), &[EIGHT_DIAGRAM_SPADE_2]).await;
    room.use_card(p(1), real(EIGHT_DIAGRAM_SPADE_2), Vec::new()).await.unwrap();
    // The heart 2 jink is now on top of the draw stack.
    assert_eq!(room.zones().top_card(&Zone::DrawStack), Some(RealCardId::new(JINK_HEART_2)));

    room.use_card(p(0), real(SLASH_SPADE_7), vec![p(1)]).await.unwrap();

    assert_eq!(room.player(p(1)).hp, 4);
    assert!(discarded(&room, JINK_HEART_2));
    assert!(discarded(&room, SLASH_SPADE_7));
    assert!(room.virtual_cards().is_empty());
    assert!(room.deck_is_partitioned());
}

// === Virtual cards ===

/// Using a virtual card moves and buries each of its constituents.
#[tokio::test]
async fn test_virtual_card_buries_constituents() {
    let (mut room, _) = build(&[DUELIST, GUANYU]);
    give(&mut room, p(0), &[EX_NIHILO_HEART_7, SLASH_CLUB_9]).await;

    let slash = room
        .view_as(p(0), "duel", vec![real(EX_NIHILO_HEART_7), real(SLASH_CLUB_9)], "slash")
        .unwrap();
    assert!(slash.is_virtual());
    room.use_card(p(0), slash, vec![p(1)]).await.unwrap();

    assert_eq!(room.player(p(1)).hp, 3);
    assert!(room.hand(p(0)).is_empty());
    assert!(discarded(&room, EX_NIHILO_HEART_7));
    assert!(discarded(&room, SLASH_CLUB_9));
    assert!(room.processing_area().is_empty());
    assert!(room.virtual_cards().is_empty());
    assert!(room.deck_is_partitioned());
}

/// Virtual cards are forgotten once played, and so is every other virtual
/// card built on the cards that went to the discard stack.
#[tokio::test]
async fn test_virtual_cards_are_released_after_use() {
    let (mut room, _) = build(&[GUANYU, GUANYU]);
    give(&mut room, p(0), &[PEACH_HEART_3]).await;

    let mut slashes: Vec<CardId> = (0..20)
        .map(|_| {
            room.view_as(p(0), "wusheng", vec![real(PEACH_HEART_3)], "slash")
                .unwrap()
        })
        .collect();
    assert_eq!(room.virtual_cards().len(), 20);
    let slash = slashes.pop().unwrap();
    let CardId::Virtual(id) = slash.clone() else {
        panic!("wusheng should produce a virtual card");
    };

    room.use_card(p(0), slash, vec![p(1)]).await.unwrap();

    assert_eq!(room.player(p(1)).hp, 3);
    assert!(discarded(&room, PEACH_HEART_3));
    assert!(room.virtual_cards().get(&id).is_none());
    assert!(room.virtual_cards().is_empty());
}

/// A virtual card whose use is refused is released too; its cards stay
/// in hand.
#[tokio::test]
async fn test_refused_virtual_card_is_released() {
    let (mut room, _) = build(&[GUANYU, GUANYU]);
    give(&mut room, p(0), &[SLASH_HEART_10]).await;

    let slash = room
        .view_as(p(0), "wusheng", vec![real(SLASH_HEART_10)], "slash")
        .unwrap();
    let err = room.use_card(p(0), slash, vec![p(9)]).await.unwrap_err();

    assert_eq!(err.kind, EngineErrorKind::UnknownPlayer(p(9)));
    assert!(room.virtual_cards().is_empty());
    assert_eq!(room.hand(p(0)), ids(&[SLASH_HEART_10]).as_slice());
}

/// View-as checks the card count and that every card is held.
#[tokio::test]
async fn test_view_as_validates_cards() {
    let (mut room, _) = build(&[DUELIST, GUANYU]);
    give(&mut room, p(0), &[EX_NIHILO_HEART_7]).await;

    let err = room
        .view_as(p(0), "duel", vec![real(EX_NIHILO_HEART_7)], "slash")
        .unwrap_err();
    assert!(matches!(err.kind, EngineErrorKind::IllegalAction(_)));

    let err = room
        .view_as(p(0), "duel", vec![real(EX_NIHILO_HEART_7), real(SLASH_CLUB_9)], "slash")
        .unwrap_err();
    assert_eq!(
        err.kind,
        EngineErrorKind::CardNotHeld(p(0), RealCardId::new(SLASH_CLUB_9))
    );

    let err = room
        .view_as(p(1), "duel", vec![real(EX_NIHILO_HEART_7), real(SLASH_CLUB_9)], "slash")
        .unwrap_err();
    assert!(matches!(err.kind, EngineErrorKind::IllegalAction(_)));
}
