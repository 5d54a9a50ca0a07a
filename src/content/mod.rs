//! Standard content pack.
//!
//! A small, playable set of cards, characters and skills built only on the
//! public skill contract. Rooms never depend on this module; it is one
//! catalog among many a host could register.
//!
//! ## Key Types
//!
//! - `standard_catalog`: the validated catalog of everything below
//! - `cards`: deck and card effects (slash, jink, peach, tricks, equipment)
//! - `characters`: characters and their skills

pub mod cards;
pub mod characters;

use tracing::instrument;

use crate::catalog::Catalog;
use crate::core::EngineResult;

/// Build and validate the standard catalog.
///
/// ## Example
///
/// ```
/// use rust_sgs::content::{characters, standard_catalog};
///
/// let catalog = standard_catalog().unwrap();
/// assert!(catalog.character(characters::CAOCAO).is_ok());
/// assert!(!catalog.deck().is_empty());
/// ```
#[instrument]
pub fn standard_catalog() -> EngineResult<Catalog> {
    let mut catalog = Catalog::new();
    for card in cards::deck() {
        catalog.register_card(card)?;
    }
    for skill in cards::skills().into_iter().chain(characters::skills()) {
        catalog.register_skill(skill)?;
    }
    for character in characters::characters() {
        catalog.register_character(character)?;
    }
    catalog.validate()?;
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::SkillType;

    #[test]
    fn test_standard_catalog_validates() {
        let catalog = standard_catalog().unwrap();
        assert_eq!(catalog.deck().len(), cards::deck().len());
        for character in characters::characters() {
            assert!(catalog.character(character.id).is_ok());
        }
    }

    #[test]
    fn test_skill_types() {
        let catalog = standard_catalog().unwrap();
        assert_eq!(catalog.skill(characters::HUNZI).unwrap().skill_type, SkillType::Awaken);
        assert_eq!(catalog.skill(characters::NIEPAN).unwrap().skill_type, SkillType::Limit);
        assert!(catalog.skill(characters::JIUYUAN).unwrap().lord_only);
        assert!(catalog.skill(characters::YINGZI).is_ok());
    }
}
