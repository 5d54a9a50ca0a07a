//! Per-player state held by a room.
//!
//! Zone contents live in the room's [`ZoneManager`](crate::zones::ZoneManager);
//! a `Player` carries identity, character binding, skills, the flag/mark
//! store and usage history.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::catalog::{CharacterDefinition, CharacterId, Gender, Nationality};
use crate::core::PlayerId;
use crate::events::PlayerPhase;
use crate::rules::Role;

/// Key of a player flag.
///
/// `Skill` flags belong to a skill's own bookkeeping and are visible to
/// everyone; `Hidden` flags are only sent to their owner.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlagKey {
    Skill(String),
    Hidden(String),
}

impl FlagKey {
    #[must_use]
    pub fn skill(name: impl Into<String>) -> Self {
        FlagKey::Skill(name.into())
    }

    #[must_use]
    pub fn hidden(name: impl Into<String>) -> Self {
        FlagKey::Hidden(name.into())
    }

    #[must_use]
    pub fn is_public(&self) -> bool {
        matches!(self, FlagKey::Skill(_))
    }
}

/// Value of a player flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    Text(String),
    Player(PlayerId),
    Players(Vec<PlayerId>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Position in the seat order.
    pub seat: usize,
    pub role: Option<Role>,
    pub character: Option<CharacterId>,
    pub hp: i32,
    pub max_hp: i32,
    pub gender: Gender,
    pub nationality: Nationality,
    pub dead: bool,
    pub online: bool,
    pub turned_over: bool,
    pub drunk: bool,
    /// Phases of the coming turn that will not run.
    pub skipped_phases: Vec<PlayerPhase>,
    skills: Vec<String>,
    flags: FxHashMap<FlagKey, FlagValue>,
    marks: FxHashMap<String, i32>,
    card_history: FxHashMap<String, u32>,
    skill_history: FxHashMap<String, u32>,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            seat: id.index(),
            role: None,
            character: None,
            hp: 0,
            max_hp: 0,
            gender: Gender::default(),
            nationality: Nationality::default(),
            dead: false,
            online: true,
            turned_over: false,
            drunk: false,
            skipped_phases: Vec::new(),
            skills: Vec::new(),
            flags: FxHashMap::default(),
            marks: FxHashMap::default(),
            card_history: FxHashMap::default(),
            skill_history: FxHashMap::default(),
        }
    }

    /// Copy a character's stats. Skills are granted by the room, which
    /// knows the player's role and the catalog.
    pub fn bind_character(&mut self, character: &CharacterDefinition) {
        self.character = Some(character.id);
        self.max_hp = character.max_hp;
        self.hp = character.max_hp;
        self.gender = character.gender;
        self.nationality = character.nationality;
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    #[must_use]
    pub fn is_wounded(&self) -> bool {
        self.hp < self.max_hp
    }

    /// Own skills in acquisition order (character skills first).
    #[must_use]
    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    #[must_use]
    pub fn has_skill(&self, name: &str) -> bool {
        self.skills.iter().any(|s| s == name)
    }

    /// Returns false if the skill was already owned.
    pub fn add_skill(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.has_skill(&name) {
            return false;
        }
        self.skills.push(name);
        true
    }

    pub fn remove_skill(&mut self, name: &str) -> bool {
        let before = self.skills.len();
        self.skills.retain(|s| s != name);
        self.skills.len() != before
    }

    pub fn set_flag(&mut self, key: FlagKey, value: FlagValue) {
        self.flags.insert(key, value);
    }

    #[must_use]
    pub fn flag(&self, key: &FlagKey) -> Option<&FlagValue> {
        self.flags.get(key)
    }

    pub fn remove_flag(&mut self, key: &FlagKey) -> Option<FlagValue> {
        self.flags.remove(key)
    }

    #[must_use]
    pub fn mark(&self, name: &str) -> i32 {
        self.marks.get(name).copied().unwrap_or(0)
    }

    /// Set a mark; zero removes it.
    pub fn set_mark(&mut self, name: impl Into<String>, value: i32) {
        let name = name.into();
        if value == 0 {
            self.marks.remove(&name);
        } else {
            self.marks.insert(name, value);
        }
    }

    /// Add to a mark and return the new value.
    pub fn add_mark(&mut self, name: impl Into<String>, delta: i32) -> i32 {
        let name = name.into();
        let value = self.mark(&name) + delta;
        self.set_mark(name, value);
        value
    }

    pub fn record_card_use(&mut self, card_name: &str) {
        *self.card_history.entry(card_name.to_owned()).or_default() += 1;
    }

    pub fn record_skill_use(&mut self, skill: &str) {
        *self.skill_history.entry(skill.to_owned()).or_default() += 1;
    }

    #[must_use]
    pub fn card_used_times(&self, card_name: &str) -> u32 {
        self.card_history.get(card_name).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn skill_used_times(&self, skill: &str) -> u32 {
        self.skill_history.get(skill).copied().unwrap_or(0)
    }

    /// Clear per-turn usage counters. Limit skill history survives.
    pub fn reset_history(&mut self, keep_skills: &[String]) {
        self.card_history.clear();
        self.skill_history.retain(|name, _| keep_skills.contains(name));
    }
}
