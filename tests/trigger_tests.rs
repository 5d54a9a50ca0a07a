//! Trigger resolution integration tests.
//!
//! These tests verify candidate ordering, the uniqueness and exclusion
//! rules, optional skills, and isolation of skills that fail mid-effect.

mod common;

use std::sync::{Arc, Mutex};

use rust_sgs::content::characters::GUANYU;
use rust_sgs::events::{DamageEvent, DamageNature, SkillUseEvent};
use rust_sgs::transport::ScriptedDecisions;
use rust_sgs::{
    CharacterId, EngineError, EngineErrorKind, EngineResult, Event, EventKind, GameEvent, GameProcessor,
    LocalTransport, LogLevel, PlayerId, Prompt, Response, Room, Skill, SkillCapability, SkillType, Stage,
    TriggerSkill,
};

use common::*;

const UNIQUE: CharacterId = CharacterId::new(100);
const ECHO: CharacterId = CharacterId::new(101);
const LEFT: CharacterId = CharacterId::new(102);
const RIGHT: CharacterId = CharacterId::new(103);
const FAULTY: CharacterId = CharacterId::new(104);
const AUDITOR: CharacterId = CharacterId::new(105);
const CAUTIOUS: CharacterId = CharacterId::new(106);
const SABOTEUR: CharacterId = CharacterId::new(107);

fn hit(to: PlayerId) -> DamageEvent {
    DamageEvent {
        from: None,
        to,
        amount: 1,
        nature: DamageNature::Normal,
        card: None,
    }
}

/// Marks the event, then fails.
struct Faulty {
    terminate: bool,
}

#[async_trait::async_trait]
impl TriggerSkill for Faulty {
    fn is_triggerable(&self, _event: &Event, stage: Stage) -> bool {
        stage == Stage::BeforeDamage
    }

    fn can_use(&self, _room: &Room, _owner: PlayerId, _event: &Event) -> bool {
        true
    }

    async fn on_effect(&self, _room: &mut Room, _skill_use: &SkillUseEvent, event: &mut Event) -> EngineResult<()> {
        event.control.add_flag("tampered");
        if self.terminate {
            event.terminate();
        }
        Err(EngineError::new(EngineErrorKind::IllegalAction("faulty skill".into())))
    }
}

/// Notes whether the event it sees carries the `tampered` flag.
struct Auditor {
    seen: Arc<Mutex<Vec<bool>>>,
}

#[async_trait::async_trait]
impl TriggerSkill for Auditor {
    fn is_triggerable(&self, _event: &Event, stage: Stage) -> bool {
        stage == Stage::BeforeDamage
    }

    fn can_use(&self, _room: &Room, _owner: PlayerId, _event: &Event) -> bool {
        true
    }

    async fn on_effect(&self, _room: &mut Room, _skill_use: &SkillUseEvent, event: &mut Event) -> EngineResult<()> {
        self.seen.lock().unwrap().push(event.control.has_flag("tampered"));
        Ok(())
    }
}

struct Fixture {
    journal: Journal,
    audits: Arc<Mutex<Vec<bool>>>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            journal: journal(),
            audits: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn catalog(&self) -> Arc<rust_sgs::Catalog> {
        let at = Stage::BeforeDamage;
        let compulsory = SkillType::Compulsory;
        let skills = vec![
            Recorder::skill("lookout", at, &self.journal).unique(),
            Recorder::skill("echo", at, &self.journal),
            Recorder::skill("left", at, &self.journal).exclusive_with("right"),
            Recorder::skill("right", at, &self.journal),
            Recorder::optional("cautious", at, &self.journal),
            Skill::new("faulty", SkillCapability::Trigger(Arc::new(Faulty { terminate: false }))).with_type(compulsory),
            Skill::new("sabotage", SkillCapability::Trigger(Arc::new(Faulty { terminate: true }))).with_type(compulsory),
            Skill::new(
                "audit",
                SkillCapability::Trigger(Arc::new(Auditor {
                    seen: Arc::clone(&self.audits),
                })),
            )
            .with_type(compulsory),
        ];
        catalog_with(
            skills,
            vec![
                character(UNIQUE.raw(), "unique", 4, &["lookout"]),
                character(ECHO.raw(), "echo", 4, &["echo"]),
                character(LEFT.raw(), "left", 4, &["left"]),
                character(RIGHT.raw(), "right", 4, &["right"]),
                character(FAULTY.raw(), "faulty", 4, &["faulty"]),
                character(AUDITOR.raw(), "auditor", 4, &["audit"]),
                character(CAUTIOUS.raw(), "cautious", 4, &["cautious"]),
                character(SABOTEUR.raw(), "saboteur", 4, &["sabotage"]),
            ],
        )
    }

    fn room(&self, roster: &[CharacterId]) -> Room {
        room_with(self.catalog(), Arc::new(LocalTransport::passive()), roster)
    }
}

/// Two copies of a unique skill: only the first in seat order fires.
#[tokio::test]
async fn test_unique_skill_fires_once() {
    let fixture = Fixture::new();
    let mut room = fixture.room(&[GUANYU, UNIQUE, UNIQUE]);

    room.damage(hit(p(0))).await.unwrap();

    assert_eq!(entries(&fixture.journal), vec![("lookout".to_string(), p(1))]);
}

/// Copies of an ordinary skill all fire, in seat order.
#[tokio::test]
async fn test_shared_skill_fires_for_every_owner() {
    let fixture = Fixture::new();
    let mut room = fixture.room(&[GUANYU, ECHO, ECHO]);

    room.damage(hit(p(0))).await.unwrap();

    let owners: Vec<PlayerId> = entries(&fixture.journal).into_iter().map(|(_, owner)| owner).collect();
    assert_eq!(owners, vec![p(1), p(2)]);
}

/// Candidates are visited from the current player, wrapping around.
#[tokio::test]
async fn test_candidates_start_at_current_player() {
    let fixture = Fixture::new();
    let mut room = fixture.room(&[ECHO, ECHO, ECHO]);
    room.next_turn();
    assert_eq!(room.current(), p(1));

    room.damage(hit(p(0))).await.unwrap();

    let owners: Vec<PlayerId> = entries(&fixture.journal).into_iter().map(|(_, owner)| owner).collect();
    assert_eq!(owners, vec![p(1), p(2), p(0)]);
}

/// A skill excluded by an accepted candidate does not fire.
#[tokio::test]
async fn test_exclusive_skills() {
    let fixture = Fixture::new();
    let mut room = fixture.room(&[GUANYU, LEFT, RIGHT]);

    room.damage(hit(p(0))).await.unwrap();
    assert_eq!(labels(&fixture.journal), vec!["left"]);

    // Seated the other way round, the other one wins.
    let fixture = Fixture::new();
    let mut room = fixture.room(&[GUANYU, RIGHT, LEFT]);
    room.damage(hit(p(0))).await.unwrap();
    assert_eq!(labels(&fixture.journal), vec!["right"]);
}

/// Dead players' skills never fire.
#[tokio::test]
async fn test_dead_owner_does_not_fire() {
    let fixture = Fixture::new();
    let mut room = fixture.room(&[GUANYU, ECHO, ECHO]);
    room.kill(p(1), None).await.unwrap();
    assert!(!room.is_over());

    room.damage(hit(p(0))).await.unwrap();

    assert_eq!(entries(&fixture.journal), vec![("echo".to_string(), p(2))]);
}

/// A failing skill is logged, its flag changes are rolled back, and the
/// skills after it still fire.
#[tokio::test]
async fn test_failing_skill_is_isolated() {
    let fixture = Fixture::new();
    let mut room = fixture.room(&[FAULTY, AUDITOR]);

    room.damage(hit(p(1))).await.unwrap();

    assert_eq!(*fixture.audits.lock().unwrap(), vec![false]);
    assert_eq!(room.player(p(1)).hp, 3);
    assert!(room
        .log()
        .iter()
        .any(|entry| entry.level == LogLevel::Violation && entry.message.contains("faulty")));
}

/// Termination survives the rollback of a failing skill.
#[tokio::test]
async fn test_termination_survives_failure() {
    let fixture = Fixture::new();
    let mut room = fixture.room(&[SABOTEUR, AUDITOR]);

    room.damage(hit(p(1))).await.unwrap();

    assert!(fixture.audits.lock().unwrap().is_empty());
    assert_eq!(room.player(p(1)).hp, 4);
}

/// Optional skills ask their owner first.
#[tokio::test]
async fn test_optional_skill_asks_owner() {
    let fixture = Fixture::new();
    let transport = Arc::new(LocalTransport::passive());
    let mut room = room_with(fixture.catalog(), transport.clone(), &[GUANYU, CAUTIOUS]);

    room.damage(hit(p(0))).await.unwrap();

    assert!(labels(&fixture.journal).is_empty());
    assert_eq!(
        transport.prompts_to(p(1)),
        vec![Prompt::AskForSkillUse {
            skill: "cautious".into(),
            event: EventKind::Damage,
        }]
    );

    let fixture = Fixture::new();
    let decisions = ScriptedDecisions::new().then(p(1), Response::invoke());
    let transport = Arc::new(LocalTransport::new(Arc::new(decisions)));
    let mut room = room_with(fixture.catalog(), transport, &[GUANYU, CAUTIOUS]);

    room.damage(hit(p(0))).await.unwrap();
    assert_eq!(labels(&fixture.journal), vec!["cautious"]);
}

/// Disresponsive events skip optional skills without asking; compulsory
/// skills still fire.
#[tokio::test]
async fn test_disresponsive_event_skips_optional_skills() {
    let fixture = Fixture::new();
    let decisions = ScriptedDecisions::new().then(p(1), Response::invoke());
    let transport = Arc::new(LocalTransport::new(Arc::new(decisions)));
    let mut room = room_with(fixture.catalog(), transport.clone(), &[GUANYU, CAUTIOUS, ECHO]);

    let mut event = Event::new(GameEvent::Damage(hit(p(0))));
    event.control.mark_disresponsive();
    GameProcessor::handle(&mut room, &mut event, None).await.unwrap();

    assert_eq!(labels(&fixture.journal), vec!["echo"]);
    assert!(transport.prompts_to(p(1)).is_empty());
}
