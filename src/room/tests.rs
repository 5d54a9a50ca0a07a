use std::sync::Arc;

use super::*;
use crate::content::characters::{CAOCAO, GUANYU, JIUYUAN, XIAOQIAO, ZHANGFEI};
use crate::content::standard_catalog;
use crate::rules::Role;
use crate::transport::LocalTransport;
use crate::zones::StackEnd;

fn build(characters: &[CharacterId]) -> (Room, Arc<LocalTransport>) {
    let transport = Arc::new(LocalTransport::passive());
    let mut builder = RoomBuilder::new(RoomConfig::default())
        .with_catalog(Arc::new(standard_catalog().unwrap()))
        .with_transport(transport.clone());
    for (i, &character) in characters.iter().enumerate() {
        builder = builder.with_player(format!("p{i}"), character);
    }
    (builder.build().unwrap(), transport)
}

fn p(id: u8) -> PlayerId {
    PlayerId::new(id)
}

fn card(id: u32) -> RealCardId {
    RealCardId::new(id)
}

#[test]
fn test_build_requires_catalog_and_transport() {
    let err = RoomBuilder::new(RoomConfig::default())
        .with_transport(Arc::new(LocalTransport::passive()))
        .with_player("a", CAOCAO)
        .build()
        .unwrap_err();
    assert!(matches!(err.kind, EngineErrorKind::Config(_)));

    let err = RoomBuilder::new(RoomConfig::default())
        .with_catalog(Arc::new(standard_catalog().unwrap()))
        .with_player("a", CAOCAO)
        .build()
        .unwrap_err();
    assert!(matches!(err.kind, EngineErrorKind::Config(_)));
}

#[test]
fn test_build_rejects_empty_roster() {
    let err = RoomBuilder::new(RoomConfig::default())
        .with_catalog(Arc::new(standard_catalog().unwrap()))
        .with_transport(Arc::new(LocalTransport::passive()))
        .build()
        .unwrap_err();
    assert!(matches!(err.kind, EngineErrorKind::Config(_)));
}

#[test]
fn test_deck_placed_in_catalog_order() {
    let (room, _) = build(&[CAOCAO, GUANYU]);
    let deck = room.catalog().deck().to_vec();

    assert_eq!(room.draw_stack().len(), deck.len());
    // Top of the stack is the last element.
    assert_eq!(room.draw_stack().last(), deck.first());
    assert_eq!(room.zones().peek_draw(2, StackEnd::Top), deck[..2].to_vec());
    assert!(room.deck_is_partitioned());
}

#[test]
fn test_bind_character_copies_stats() {
    let (room, _) = build(&[XIAOQIAO]);
    let player = room.player(p(0));
    assert_eq!(player.hp, 3);
    assert_eq!(player.max_hp, 3);
    assert_eq!(player.character, Some(XIAOQIAO));
}

#[test]
fn test_lord_only_skills_need_the_lord() {
    let (mut room, _) = build(&[CAOCAO, CAOCAO]);
    assert!(!room.player(p(0)).has_skill(JIUYUAN));

    room.player_mut(p(1)).role = Some(Role::Lord);
    room.bind_character(p(1), CAOCAO).unwrap();
    assert!(room.player(p(1)).has_skill(JIUYUAN));
    assert!(!room.player(p(0)).has_skill(JIUYUAN));
}

#[test]
fn test_alive_players_from_wraps_and_skips_dead() {
    let (mut room, _) = build(&[CAOCAO, GUANYU, ZHANGFEI, XIAOQIAO]);
    assert_eq!(room.alive_players_from(p(2)), vec![p(2), p(3), p(0), p(1)]);

    room.player_mut(p(3)).dead = true;
    assert_eq!(room.alive_players_from(p(2)), vec![p(2), p(0), p(1)]);
    assert_eq!(room.alive_players_from(p(3)), vec![p(0), p(1), p(2)]);
}

#[test]
fn test_snapshot_hides_private_state() {
    let (mut room, _) = build(&[CAOCAO, GUANYU, ZHANGFEI]);
    room.player_mut(p(0)).role = Some(Role::Lord);
    room.player_mut(p(1)).role = Some(Role::Rebel);
    room.player_mut(p(2)).role = Some(Role::Renegade);
    room.player_mut(p(2)).dead = true;
    room.zones.move_to_zone(card(0), Zone::Hand(p(1)), ZonePosition::Top);

    let snapshot = room.snapshot();
    assert_eq!(snapshot.player(p(0)).unwrap().role, Some(Role::Lord));
    assert_eq!(snapshot.player(p(1)).unwrap().role, None);
    assert_eq!(snapshot.player(p(2)).unwrap().role, Some(Role::Renegade));
    assert_eq!(snapshot.player(p(1)).unwrap().hand_size, 1);
    assert_eq!(snapshot.draw_stack_size, room.draw_stack().len());
}

#[test]
fn test_transform_applies_to_held_cards_only() {
    let (mut room, _) = build(&[XIAOQIAO, GUANYU]);
    // Card 0 is a spade.
    assert_eq!(room.card_view(&card(0).into()).unwrap().suit, Suit::Spade);

    room.zones.move_to_zone(card(0), Zone::Hand(p(0)), ZonePosition::Top);
    assert_eq!(room.card_view(&card(0).into()).unwrap().suit, Suit::Heart);

    room.zones.move_to_zone(card(0), Zone::Hand(p(1)), ZonePosition::Top);
    assert_eq!(room.card_view(&card(0).into()).unwrap().suit, Suit::Spade);
}

#[test]
fn test_virtual_card_view() {
    let (mut room, _) = build(&[GUANYU]);
    // Card 1 is the heart 2 jink, card 3 the club 8 slash.
    let single = room.virtual_cards.create("slash", Some("wusheng"), vec![card(1).into()]);
    let view = room.card_view(&single).unwrap();
    assert_eq!(view.name, "slash");
    assert_eq!((view.suit, view.number), (Suit::Heart, 2));
    assert_eq!(view.card_type, crate::cards::CardType::Basic);
    assert_eq!(view.real_ids, vec![card(1)]);

    let pair = room.virtual_cards.create("slash", None, vec![card(1).into(), card(3).into()]);
    let view = room.card_view(&pair).unwrap();
    assert_eq!((view.suit, view.number), (Suit::NoSuit, 0));
    assert_eq!(view.real_ids, vec![card(1), card(3)]);
}

#[test]
fn test_unknown_virtual_card_is_a_violation() {
    let (room, _) = build(&[GUANYU]);
    let err = room
        .card_view(&CardId::Virtual(crate::cards::VirtualCardId::new("nope")))
        .unwrap_err();
    assert!(err.is_contract_violation());
}

#[test]
fn test_hidden_flags_reach_only_the_owner() {
    let (mut room, transport) = build(&[CAOCAO, GUANYU]);
    room.set_flag(p(0), FlagKey::hidden("plan"), FlagValue::Bool(true)).unwrap();
    room.set_flag(p(1), FlagKey::skill("count"), FlagValue::Int(2)).unwrap();

    let sent = transport.sent();
    let flag_notices: Vec<_> = sent
        .iter()
        .filter(|(_, m)| matches!(m, ServerMessage::Notice(Notice::FlagChanged { .. })))
        .map(|(to, _)| *to)
        .collect();
    assert_eq!(flag_notices, vec![Some(p(0)), None]);
    assert_eq!(
        room.player(p(0)).flag(&FlagKey::hidden("plan")),
        Some(&FlagValue::Bool(true))
    );
}

#[test]
fn test_obtain_and_lose_skill() {
    let (mut room, _) = build(&[GUANYU]);
    room.obtain_skill(p(0), "paoxiao").unwrap();
    assert!(room.player(p(0)).has_skill("paoxiao"));
    room.lose_skill(p(0), "paoxiao").unwrap();
    assert!(!room.player(p(0)).has_skill("paoxiao"));

    let err = room.obtain_skill(p(0), "no_such_skill").unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::UnknownSkill("no_such_skill".into()));
}

#[tokio::test]
async fn test_unknown_player_is_rejected() {
    let (mut room, transport) = build(&[GUANYU, GUANYU]);
    let ghost = p(7);
    let unknown = EngineErrorKind::UnknownPlayer(ghost);

    assert_eq!(room.set_flag(ghost, FlagKey::skill("x"), FlagValue::Bool(true)).unwrap_err().kind, unknown);
    assert_eq!(room.remove_flag(ghost, &FlagKey::skill("x")).unwrap_err().kind, unknown);
    assert_eq!(room.add_mark(ghost, "rage", 1).unwrap_err().kind, unknown);
    assert_eq!(room.set_mark(ghost, "rage", 1).unwrap_err().kind, unknown);
    assert_eq!(room.turn_over(ghost).unwrap_err().kind, unknown);
    assert_eq!(room.skip_phase(ghost, crate::events::PlayerPhase::Draw).unwrap_err().kind, unknown);
    assert_eq!(room.obtain_skill(ghost, "paoxiao").unwrap_err().kind, unknown);

    assert_eq!(room.ask(ghost, Prompt::AskForPlayAction).await, None);
    assert!(transport.prompts_to(ghost).is_empty());
    assert!(room.log().iter().any(|entry| entry.level == LogLevel::Violation));
    assert!(!transport.notices().iter().any(|n| matches!(
        n,
        Notice::FlagChanged { .. } | Notice::MarkChanged { .. } | Notice::TurnedOver { .. }
    )));
}

#[test]
fn test_report_classifies_errors() {
    let (mut room, _) = build(&[GUANYU]);
    room.report(&EngineError::new(EngineErrorKind::CardNotHeld(p(0), card(5))));
    room.report(&EngineError::new(EngineErrorKind::Transport("closed".into())));

    let levels: Vec<LogLevel> = room.log().iter().map(|e| e.level).collect();
    assert_eq!(levels, vec![LogLevel::Violation, LogLevel::Warning]);
}

#[tokio::test(start_paused = true)]
async fn test_offline_player_gets_default() {
    let (mut room, transport) = build(&[CAOCAO, GUANYU]);
    room.player_mut(p(1)).online = false;

    assert_eq!(room.ask(p(1), Prompt::AskForPlayAction).await, None);
    assert!(transport.prompts_to(p(1)).is_empty());
}

#[tokio::test]
async fn test_ask_returns_the_answer() {
    let (mut room, transport) = build(&[CAOCAO, GUANYU]);
    let answer = room.ask(p(0), Prompt::AskForPlayAction).await;

    assert_eq!(answer, Some(Response::PlayAction(messages::PlayAction::Finish)));
    assert_eq!(transport.prompts_to(p(0)), vec![Prompt::AskForPlayAction]);
}
