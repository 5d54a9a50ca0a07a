//! Card identifiers.
//!
//! A [`RealCardId`] names one physical card of the deck. A [`VirtualCardId`]
//! names a composite card (a card "viewed as" another, a transformed card)
//! registered in the room's [`VirtualCards`](super::VirtualCards) table.

use serde::{Deserialize, Serialize};

/// Identifier of one physical card instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RealCardId(pub u32);

impl RealCardId {
    /// Create a new real card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for RealCardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// String key of a virtual card.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VirtualCardId(pub String);

impl VirtualCardId {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VirtualCardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v:{}", self.0)
    }
}

/// Either a real or a virtual card.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CardId {
    Real(RealCardId),
    Virtual(VirtualCardId),
}

impl CardId {
    /// The real id, if this is not a virtual card.
    #[must_use]
    pub fn as_real(&self) -> Option<RealCardId> {
        match self {
            CardId::Real(id) => Some(*id),
            CardId::Virtual(_) => None,
        }
    }

    #[must_use]
    pub fn is_virtual(&self) -> bool {
        matches!(self, CardId::Virtual(_))
    }
}

impl From<RealCardId> for CardId {
    fn from(id: RealCardId) -> Self {
        CardId::Real(id)
    }
}

impl From<VirtualCardId> for CardId {
    fn from(id: VirtualCardId) -> Self {
        CardId::Virtual(id)
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardId::Real(id) => id.fmt(f),
            CardId::Virtual(id) => id.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(CardId::from(RealCardId(7)).to_string(), "#7");
        assert_eq!(CardId::from(VirtualCardId::new("slash:wusheng:0")).to_string(), "v:slash:wusheng:0");
    }

    #[test]
    fn test_as_real() {
        assert_eq!(CardId::Real(RealCardId(3)).as_real(), Some(RealCardId(3)));
        assert_eq!(CardId::Virtual(VirtualCardId::new("x")).as_real(), None);
        assert!(CardId::Virtual(VirtualCardId::new("x")).is_virtual());
    }
}
