//! Card definitions - static card data.
//!
//! `CardDefinition` holds the immutable printed properties of one physical
//! card: name, suit, number, type and the skill that implements it. The
//! room derives a [`CardView`] on demand, which is what rules and skills
//! look at; a view may differ from the printed card (virtual cards,
//! transform skills of the holder).

use serde::{Deserialize, Serialize};

use super::id::{CardId, RealCardId};

/// Card suit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    #[default]
    NoSuit,
    Spade,
    Heart,
    Club,
    Diamond,
}

impl Suit {
    #[must_use]
    pub const fn is_red(self) -> bool {
        matches!(self, Suit::Heart | Suit::Diamond)
    }

    #[must_use]
    pub const fn is_black(self) -> bool {
        matches!(self, Suit::Spade | Suit::Club)
    }
}

/// Equipment slot. The equip zone holds at most one card per slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipType {
    Weapon,
    Armor,
    DefenseHorse,
    OffenseHorse,
    Precious,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Basic,
    Trick,
    DelayedTrick,
    Equip(EquipType),
}

impl CardType {
    #[must_use]
    pub const fn equip_type(self) -> Option<EquipType> {
        match self {
            CardType::Equip(t) => Some(t),
            _ => None,
        }
    }
}

/// How a card chooses its targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetMode {
    /// No targets (or only the user, e.g. peach, equipment).
    #[default]
    None,
    /// Exactly one chosen target.
    Single,
    /// Every other alive player.
    Others,
    /// Several chosen targets.
    Multiple,
    /// Every alive player.
    Globe,
}

impl TargetMode {
    /// Whether aiming runs once per target instead of once overall.
    #[must_use]
    pub const fn is_multi(self) -> bool {
        matches!(self, TargetMode::Others | TargetMode::Multiple | TargetMode::Globe)
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use rust_sgs::cards::{CardDefinition, CardType, RealCardId, Suit, TargetMode};
///
/// let slash = CardDefinition::new(RealCardId::new(1), "slash", Suit::Spade, 7, CardType::Basic)
///     .with_target_mode(TargetMode::Single)
///     .with_skill("slash");
///
/// assert_eq!(slash.skill.as_deref(), Some("slash"));
/// assert!(!slash.suit.is_red());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: RealCardId,
    pub name: String,
    pub suit: Suit,
    /// Rank, 1 (A) to 13 (K).
    pub number: u8,
    pub card_type: CardType,
    pub target_mode: TargetMode,
    /// Skill implementing the card's effect, and for equipment the skill it
    /// grants while equipped.
    pub skill: Option<String>,
    pub description: String,
}

impl CardDefinition {
    #[must_use]
    pub fn new(id: RealCardId, name: impl Into<String>, suit: Suit, number: u8, card_type: CardType) -> Self {
        Self {
            id,
            name: name.into(),
            suit,
            number,
            card_type,
            target_mode: TargetMode::None,
            skill: None,
            description: String::new(),
        }
    }

    #[must_use]
    pub fn with_target_mode(mut self, mode: TargetMode) -> Self {
        self.target_mode = mode;
        self
    }

    #[must_use]
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skill = Some(skill.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// The card as the rules currently see it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub id: CardId,
    pub name: String,
    pub suit: Suit,
    pub number: u8,
    pub card_type: CardType,
    pub target_mode: TargetMode,
    pub skill: Option<String>,
    /// Physical cards behind this view.
    pub real_ids: Vec<RealCardId>,
}

impl CardView {
    /// View of a printed card.
    #[must_use]
    pub fn of(def: &CardDefinition) -> Self {
        Self {
            id: CardId::Real(def.id),
            name: def.name.clone(),
            suit: def.suit,
            number: def.number,
            card_type: def.card_type,
            target_mode: def.target_mode,
            skill: def.skill.clone(),
            real_ids: vec![def.id],
        }
    }

    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.id.is_virtual()
    }
}
