//! Character definitions.

use serde::{Deserialize, Serialize};

/// Unique identifier for a character definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub u32);

impl CharacterId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Character({})", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    Male,
    Female,
    Neutral,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nationality {
    Wei,
    Shu,
    Wu,
    #[default]
    Qun,
    God,
}

/// Static character data. Binding a character to a player copies hp,
/// gender and nationality and grants the listed skills.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDefinition {
    pub id: CharacterId,
    pub name: String,
    pub max_hp: i32,
    pub gender: Gender,
    pub nationality: Nationality,
    pub skills: Vec<String>,
}

impl CharacterDefinition {
    #[must_use]
    pub fn new(id: CharacterId, name: impl Into<String>, max_hp: i32) -> Self {
        Self {
            id,
            name: name.into(),
            max_hp,
            gender: Gender::default(),
            nationality: Nationality::default(),
            skills: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    #[must_use]
    pub fn with_nationality(mut self, nationality: Nationality) -> Self {
        self.nationality = nationality;
        self
    }

    #[must_use]
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.push(skill.into());
        self
    }
}
