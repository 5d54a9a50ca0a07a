//! Virtual cards.
//!
//! A virtual card is a composite built from zero or more card ids, created
//! when a skill lets a player use cards "as" another card. Constituents may
//! themselves be virtual; [`VirtualCards::resolve`] expands recursively down
//! to the physical cards that actually move between zones.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::id::{CardId, RealCardId, VirtualCardId};
use crate::core::{EngineError, EngineErrorKind, EngineResult};

/// One registered virtual card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualCard {
    pub id: VirtualCardId,
    /// Card name this composite is used as.
    pub name: String,
    /// Skill that created it, if any.
    pub skill: Option<String>,
    pub contained: Vec<CardId>,
}

/// Room-scoped table of virtual cards.
#[derive(Clone, Debug, Default)]
pub struct VirtualCards {
    cards: FxHashMap<VirtualCardId, VirtualCard>,
    next_seq: u64,
}

impl VirtualCards {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new virtual card and return its id.
    pub fn create(&mut self, name: impl Into<String>, skill: Option<&str>, contained: Vec<CardId>) -> CardId {
        let name = name.into();
        let key = format!("{}:{}:{}", name, skill.unwrap_or("-"), self.next_seq);
        self.next_seq += 1;
        let id = VirtualCardId::new(key);
        self.cards.insert(
            id.clone(),
            VirtualCard {
                id: id.clone(),
                name,
                skill: skill.map(str::to_owned),
                contained,
            },
        );
        CardId::Virtual(id)
    }

    #[must_use]
    pub fn get(&self, id: &VirtualCardId) -> Option<&VirtualCard> {
        self.cards.get(id)
    }

    /// Drop a virtual card and the virtual cards nested inside it. Real ids
    /// are ignored. Returns how many entries were removed.
    pub fn remove(&mut self, id: &CardId) -> usize {
        let CardId::Virtual(vid) = id else {
            return 0;
        };
        let Some(card) = self.cards.remove(vid) else {
            return 0;
        };
        1 + card.contained.iter().map(|inner| self.remove(inner)).sum::<usize>()
    }

    /// Drop every virtual card built on any of `cards`. Returns how many
    /// entries were removed.
    pub fn remove_containing(&mut self, cards: &[RealCardId]) -> usize {
        let stale: Vec<CardId> = self
            .cards
            .keys()
            .map(|vid| CardId::Virtual(vid.clone()))
            .filter(|id| {
                self.resolve(id)
                    .is_ok_and(|reals| reals.iter().any(|real| cards.contains(real)))
            })
            .collect();
        stale.iter().map(|id| self.remove(id)).sum()
    }

    /// Number of live virtual cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Expand one id to the physical cards behind it.
    pub fn resolve(&self, id: &CardId) -> EngineResult<Vec<RealCardId>> {
        let mut out = Vec::new();
        self.resolve_into(id, &mut out, 0)?;
        Ok(out)
    }

    /// Expand several ids, keeping first occurrence order and dropping
    /// duplicates.
    pub fn resolve_all(&self, ids: &[CardId]) -> EngineResult<Vec<RealCardId>> {
        let mut out = Vec::new();
        for id in ids {
            for real in self.resolve(id)? {
                if !out.contains(&real) {
                    out.push(real);
                }
            }
        }
        Ok(out)
    }

    fn resolve_into(&self, id: &CardId, out: &mut Vec<RealCardId>, depth: usize) -> EngineResult<()> {
        match id {
            CardId::Real(real) => {
                out.push(*real);
                Ok(())
            }
            CardId::Virtual(vid) => {
                // A virtual card can only contain cards created before it, so
                // a chain longer than the table is a cycle.
                if depth > self.cards.len() {
                    return Err(EngineError::new(EngineErrorKind::UnknownVirtualCard(vid.0.clone())));
                }
                let card = self
                    .cards
                    .get(vid)
                    .ok_or_else(|| EngineError::new(EngineErrorKind::UnknownVirtualCard(vid.0.clone())))?;
                for inner in &card.contained {
                    self.resolve_into(inner, out, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}
