//! Content catalog for definition lookup.
//!
//! The `Catalog` stores every card, character and skill a room can use. It
//! is built once, validated, and handed to rooms behind an `Arc`; there is no
//! process-wide registry.

mod character;

pub use character::{CharacterDefinition, CharacterId, Gender, Nationality};

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, instrument};

use crate::cards::{CardDefinition, RealCardId};
use crate::core::{EngineError, EngineErrorKind, EngineResult};
use crate::skills::Skill;

/// Registry of cards, characters and skills.
///
/// ## Example
///
/// ```
/// use rust_sgs::catalog::{Catalog, CharacterDefinition, CharacterId};
/// use rust_sgs::cards::{CardDefinition, CardType, RealCardId, Suit};
///
/// let mut catalog = Catalog::new();
/// catalog
///     .register_card(CardDefinition::new(RealCardId::new(0), "jink", Suit::Heart, 2, CardType::Basic))
///     .unwrap();
/// catalog
///     .register_character(CharacterDefinition::new(CharacterId::new(1), "soldier", 4))
///     .unwrap();
///
/// assert!(catalog.validate().is_ok());
/// assert_eq!(catalog.card(RealCardId::new(0)).unwrap().name, "jink");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    cards: FxHashMap<RealCardId, CardDefinition>,
    /// Deck in registration order.
    deck: Vec<RealCardId>,
    /// First registered card of each name.
    by_name: FxHashMap<String, RealCardId>,
    characters: FxHashMap<CharacterId, CharacterDefinition>,
    skills: FxHashMap<String, Arc<Skill>>,
}

impl Catalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a physical card. Fails if the id is taken.
    pub fn register_card(&mut self, card: CardDefinition) -> EngineResult<()> {
        if self.cards.contains_key(&card.id) {
            return Err(EngineError::new(EngineErrorKind::InvalidContent(format!(
                "card {} registered twice",
                card.id
            ))));
        }
        self.by_name.entry(card.name.clone()).or_insert(card.id);
        self.deck.push(card.id);
        self.cards.insert(card.id, card);
        Ok(())
    }

    /// Register a character. Fails if the id is taken.
    pub fn register_character(&mut self, character: CharacterDefinition) -> EngineResult<()> {
        if self.characters.contains_key(&character.id) {
            return Err(EngineError::new(EngineErrorKind::InvalidContent(format!(
                "{} registered twice",
                character.id
            ))));
        }
        self.characters.insert(character.id, character);
        Ok(())
    }

    /// Register a skill. Fails if the name is taken.
    pub fn register_skill(&mut self, skill: Skill) -> EngineResult<()> {
        if self.skills.contains_key(&skill.name) {
            return Err(EngineError::new(EngineErrorKind::InvalidContent(format!(
                "skill {} registered twice",
                skill.name
            ))));
        }
        self.skills.insert(skill.name.clone(), Arc::new(skill));
        Ok(())
    }

    /// Check that every skill name referenced by cards, characters and
    /// skills is registered.
    #[instrument(skip(self))]
    pub fn validate(&self) -> EngineResult<()> {
        let dangling = |name: &str, owner: &str| -> EngineResult<()> {
            if self.skills.contains_key(name) {
                Ok(())
            } else {
                Err(EngineError::new(EngineErrorKind::InvalidContent(format!(
                    "{owner} references unknown skill {name}"
                ))))
            }
        };

        for card in self.cards.values() {
            if let Some(skill) = &card.skill {
                dangling(skill, &card.name)?;
            }
        }
        for character in self.characters.values() {
            for skill in &character.skills {
                dangling(skill, &character.name)?;
            }
        }
        for skill in self.skills.values() {
            for other in skill.shadows.iter().chain(&skill.exclusive_with) {
                dangling(other, &skill.name)?;
            }
        }

        debug!(
            cards = self.cards.len(),
            characters = self.characters.len(),
            skills = self.skills.len(),
            "Catalog validated"
        );
        Ok(())
    }

    /// Get a card definition by id.
    pub fn card(&self, id: RealCardId) -> EngineResult<&CardDefinition> {
        self.cards
            .get(&id)
            .ok_or_else(|| EngineError::new(EngineErrorKind::UnknownCard(id.into())))
    }

    /// First card registered under `name`, used as the template of virtual
    /// cards with that name.
    #[must_use]
    pub fn card_by_name(&self, name: &str) -> Option<&CardDefinition> {
        self.by_name.get(name).and_then(|id| self.cards.get(id))
    }

    /// Every physical card, in registration order.
    #[must_use]
    pub fn deck(&self) -> &[RealCardId] {
        &self.deck
    }

    pub fn character(&self, id: CharacterId) -> EngineResult<&CharacterDefinition> {
        self.characters
            .get(&id)
            .ok_or_else(|| EngineError::new(EngineErrorKind::UnknownCharacter(id.raw())))
    }

    pub fn skill(&self, name: &str) -> EngineResult<&Arc<Skill>> {
        self.skills
            .get(name)
            .ok_or_else(|| EngineError::new(EngineErrorKind::UnknownSkill(name.to_owned())))
    }

    #[must_use]
    pub fn contains_skill(&self, name: &str) -> bool {
        self.skills.contains_key(name)
    }

    /// Get the number of registered cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Find cards matching a predicate.
    pub fn find<F>(&self, predicate: F) -> impl Iterator<Item = &CardDefinition>
    where
        F: Fn(&CardDefinition) -> bool,
    {
        self.deck
            .iter()
            .filter_map(|id| self.cards.get(id))
            .filter(move |c| predicate(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardType, CardView, Suit};
    use crate::skills::{RulesBreakerSkill, SkillCapability};

    struct Unlimited;

    impl RulesBreakerSkill for Unlimited {
        fn break_card_usable_times(&self, _card: &CardView) -> u32 {
            u32::MAX
        }
    }

    fn skill(name: &str) -> Skill {
        Skill::new(name, SkillCapability::RulesBreaker(Arc::new(Unlimited)))
    }

    fn card(id: u32, name: &str) -> CardDefinition {
        CardDefinition::new(RealCardId(id), name, Suit::Spade, 1, CardType::Basic)
    }

    #[test]
    fn test_register_and_get() {
        let mut catalog = Catalog::new();
        catalog.register_card(card(1, "slash")).unwrap();
        catalog.register_card(card(2, "slash")).unwrap();

        assert_eq!(catalog.card(RealCardId(2)).unwrap().name, "slash");
        assert_eq!(catalog.card_by_name("slash").unwrap().id, RealCardId(1));
        assert_eq!(catalog.deck(), &[RealCardId(1), RealCardId(2)]);
        assert!(matches!(
            catalog.card(RealCardId(99)).unwrap_err().kind,
            EngineErrorKind::UnknownCard(_)
        ));
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut catalog = Catalog::new();
        catalog.register_card(card(1, "slash")).unwrap();
        assert!(catalog.register_card(card(1, "jink")).is_err());

        catalog.register_skill(skill("crossbow")).unwrap();
        let err = catalog.register_skill(skill("crossbow")).unwrap_err();
        assert!(matches!(err.kind, EngineErrorKind::InvalidContent(_)));

        let hero = CharacterDefinition::new(CharacterId(1), "hero", 4);
        catalog.register_character(hero.clone()).unwrap();
        assert!(catalog.register_character(hero).is_err());
    }

    #[test]
    fn test_validate_dangling_skill() {
        let mut catalog = Catalog::new();
        catalog.register_card(card(1, "crossbow").with_skill("crossbow")).unwrap();
        assert!(catalog.validate().is_err());

        catalog.register_skill(skill("crossbow")).unwrap();
        assert!(catalog.validate().is_ok());

        catalog
            .register_character(CharacterDefinition::new(CharacterId(1), "hero", 4).with_skill("missing"))
            .unwrap();
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_validate_shadow_names() {
        let mut catalog = Catalog::new();
        catalog.register_skill(skill("main").with_shadow("shadow")).unwrap();
        assert!(catalog.validate().is_err());
        catalog.register_skill(skill("shadow")).unwrap();
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_find_with_predicate() {
        let mut catalog = Catalog::new();
        catalog.register_card(card(1, "slash")).unwrap();
        catalog.register_card(card(2, "jink")).unwrap();
        catalog.register_card(card(3, "slash")).unwrap();

        let slashes: Vec<_> = catalog.find(|c| c.name == "slash").map(|c| c.id).collect();
        assert_eq!(slashes, vec![RealCardId(1), RealCardId(3)]);
    }
}
