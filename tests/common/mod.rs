//! Fixtures shared by the integration tests.
//!
//! Rooms are built over the standard content pack, optionally extended with
//! test-only skills and characters, and a `LocalTransport` that records
//! every message.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use rust_sgs::content::{cards, characters};
use rust_sgs::events::SkillUseEvent;
use rust_sgs::{
    CardId, Catalog, CharacterDefinition, CharacterId, EngineResult, Event, PlayerId, RealCardId, Room,
    RoomBuilder, RoomConfig, Skill, SkillCapability, SkillType, Stage, TriggerSkill,
};

pub fn p(id: u8) -> PlayerId {
    PlayerId::new(id)
}

pub fn real(id: u32) -> CardId {
    CardId::Real(RealCardId::new(id))
}

/// The standard catalog plus extra skills and characters.
pub fn catalog_with(skills: Vec<Skill>, extra: Vec<CharacterDefinition>) -> Arc<Catalog> {
    let mut catalog = Catalog::new();
    for card in cards::deck() {
        catalog.register_card(card).unwrap();
    }
    for skill in cards::skills().into_iter().chain(characters::skills()).chain(skills) {
        catalog.register_skill(skill).unwrap();
    }
    for character in characters::characters().into_iter().chain(extra) {
        catalog.register_character(character).unwrap();
    }
    catalog.validate().unwrap();
    Arc::new(catalog)
}

/// A room with seats in roster order and no roles.
pub fn room_with(
    catalog: Arc<Catalog>,
    transport: Arc<dyn rust_sgs::Transport>,
    roster: &[CharacterId],
) -> Room {
    room_with_config(RoomConfig::default().fixed_seats().without_roles(), catalog, transport, roster)
}

pub fn room_with_config(
    config: RoomConfig,
    catalog: Arc<Catalog>,
    transport: Arc<dyn rust_sgs::Transport>,
    roster: &[CharacterId],
) -> Room {
    let mut builder = RoomBuilder::new(config)
        .with_catalog(catalog)
        .with_transport(transport);
    for (i, &character) in roster.iter().enumerate() {
        builder = builder.with_player(format!("p{i}"), character);
    }
    builder.build().unwrap()
}

/// Who fired what, in firing order.
pub type Journal = Arc<Mutex<Vec<(String, PlayerId)>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<(String, PlayerId)> {
    journal.lock().unwrap().clone()
}

pub fn labels(journal: &Journal) -> Vec<String> {
    entries(journal).into_iter().map(|(label, _)| label).collect()
}

/// Compulsory trigger that writes `label` to a journal whenever it fires at
/// `stage`.
pub struct Recorder {
    pub stage: Stage,
    pub label: String,
    pub journal: Journal,
}

impl Recorder {
    pub fn skill(name: &str, stage: Stage, journal: &Journal) -> Skill {
        Self::optional(name, stage, journal).with_type(SkillType::Compulsory)
    }

    /// Same recorder, but its owner is asked before it fires.
    pub fn optional(name: &str, stage: Stage, journal: &Journal) -> Skill {
        Skill::new(
            name,
            SkillCapability::Trigger(Arc::new(Recorder {
                stage,
                label: name.to_owned(),
                journal: Arc::clone(journal),
            })),
        )
    }
}

#[async_trait::async_trait]
impl TriggerSkill for Recorder {
    fn is_triggerable(&self, _event: &Event, stage: Stage) -> bool {
        stage == self.stage
    }

    fn can_use(&self, _room: &Room, _owner: PlayerId, _event: &Event) -> bool {
        true
    }

    async fn on_effect(&self, _room: &mut Room, skill_use: &SkillUseEvent, _event: &mut Event) -> EngineResult<()> {
        self.journal.lock().unwrap().push((self.label.clone(), skill_use.from));
        Ok(())
    }
}

/// A test character with the given skills.
pub fn character(id: u32, name: &str, hp: i32, skills: &[&str]) -> CharacterDefinition {
    skills
        .iter()
        .fold(CharacterDefinition::new(CharacterId::new(id), name, hp), |c, s| c.with_skill(*s))
}

/// Route engine traces to the test output; `RUST_LOG` picks the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
