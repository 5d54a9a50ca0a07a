//! Zone manager for card locations and movement.
//!
//! The `ZoneManager` tracks where every physical card of a room is and
//! keeps each zone's order. It supports:
//! - Shared stacks (draw, discard) and the processing area
//! - Per-player zones (hand, equip, judge) and named outside buckets
//! - Card lookup by id and per-player search
//! - Folding the discard stack back into the draw stack
//!
//! Every zone is ordered; index 0 is the bottom and the last element is the
//! top. A card is in exactly one zone at a time.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cards::RealCardId;
use crate::core::{EngineError, EngineErrorKind, EngineResult, GameRng, PlayerId};

/// A place a physical card can be.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    DrawStack,
    DiscardStack,
    /// Cards in flight: a used card before burial, a judge card under
    /// evaluation, pin-dian submissions.
    Processing,
    Hand(PlayerId),
    Equip(PlayerId),
    Judge(PlayerId),
    /// Named bucket outside the game owned by a player.
    Outside(PlayerId, String),
}

/// A player-owned area, independent of the owner.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Area {
    Hand,
    Equip,
    Judge,
    Outside(String),
}

impl Zone {
    /// The zone of `area` owned by `player`.
    #[must_use]
    pub fn of(player: PlayerId, area: Area) -> Self {
        match area {
            Area::Hand => Zone::Hand(player),
            Area::Equip => Zone::Equip(player),
            Area::Judge => Zone::Judge(player),
            Area::Outside(name) => Zone::Outside(player, name),
        }
    }

    #[must_use]
    pub fn owner(&self) -> Option<PlayerId> {
        match self {
            Zone::Hand(p) | Zone::Equip(p) | Zone::Judge(p) | Zone::Outside(p, _) => Some(*p),
            Zone::DrawStack | Zone::DiscardStack | Zone::Processing => None,
        }
    }

    #[must_use]
    pub fn area(&self) -> Option<Area> {
        match self {
            Zone::Hand(_) => Some(Area::Hand),
            Zone::Equip(_) => Some(Area::Equip),
            Zone::Judge(_) => Some(Area::Judge),
            Zone::Outside(_, name) => Some(Area::Outside(name.clone())),
            Zone::DrawStack | Zone::DiscardStack | Zone::Processing => None,
        }
    }

    /// Zones every player can see.
    #[must_use]
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Zone::DiscardStack | Zone::Processing | Zone::Equip(_) | Zone::Judge(_)
        )
    }
}

/// Position for inserting a card into a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    /// Add to top of zone (e.g., top of the draw stack).
    Top,
    /// Add to bottom of zone.
    Bottom,
    /// Insert at specific index (0 = bottom).
    Index(usize),
}

/// Which end of a stack to take from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackEnd {
    #[default]
    Top,
    Bottom,
}

impl From<StackEnd> for ZonePosition {
    fn from(end: StackEnd) -> Self {
        match end {
            StackEnd::Top => ZonePosition::Top,
            StackEnd::Bottom => ZonePosition::Bottom,
        }
    }
}

/// Manages card locations across zones.
///
/// ## Usage
///
/// ```
/// use rust_sgs::cards::RealCardId;
/// use rust_sgs::core::PlayerId;
/// use rust_sgs::zones::{Zone, ZoneManager, ZonePosition};
///
/// let mut manager = ZoneManager::new();
/// manager.add_to_zone(RealCardId(10), Zone::DrawStack, ZonePosition::Top).unwrap();
/// manager.add_to_zone(RealCardId(11), Zone::DrawStack, ZonePosition::Top).unwrap();
///
/// let hand = Zone::Hand(PlayerId::new(0));
/// manager.move_to_zone(RealCardId(11), hand.clone(), ZonePosition::Top);
/// assert_eq!(manager.cards_in_zone(&hand), &[RealCardId(11)]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ZoneManager {
    /// Card locations: card -> zone
    locations: FxHashMap<RealCardId, Zone>,

    /// Ordered card lists, bottom first.
    zone_order: FxHashMap<Zone, Vec<RealCardId>>,

    /// Number of times the discard stack was folded into the draw stack.
    reshuffles: u32,
}

impl ZoneManager {
    /// Create a new empty zone manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a card that is not yet tracked.
    pub fn add_to_zone(&mut self, card: RealCardId, zone: Zone, position: ZonePosition) -> EngineResult<()> {
        if self.locations.contains_key(&card) {
            return Err(EngineError::new(EngineErrorKind::InvalidContent(format!(
                "card {card} placed twice"
            ))));
        }
        self.insert_ordered(card, zone.clone(), position);
        self.locations.insert(card, zone);
        Ok(())
    }

    /// Move a card from one zone to another.
    ///
    /// Returns the old zone, or `None` if the card wasn't found.
    pub fn move_to_zone(&mut self, card: RealCardId, new_zone: Zone, position: ZonePosition) -> Option<Zone> {
        let old_zone = self.locations.get(&card).cloned()?;

        if let Some(order) = self.zone_order.get_mut(&old_zone) {
            order.retain(|&c| c != card);
        }
        self.insert_ordered(card, new_zone.clone(), position);
        self.locations.insert(card, new_zone);

        Some(old_zone)
    }

    fn insert_ordered(&mut self, card: RealCardId, zone: Zone, position: ZonePosition) {
        let order = self.zone_order.entry(zone).or_default();
        match position {
            ZonePosition::Top => order.push(card),
            ZonePosition::Bottom => order.insert(0, card),
            ZonePosition::Index(i) => {
                let idx = i.min(order.len());
                order.insert(idx, card);
            }
        }
    }

    /// Get the zone a card is in.
    #[must_use]
    pub fn get_zone(&self, card: RealCardId) -> Option<&Zone> {
        self.locations.get(&card)
    }

    /// Check if a card is in a specific zone.
    #[must_use]
    pub fn is_in_zone(&self, card: RealCardId, zone: &Zone) -> bool {
        self.locations.get(&card) == Some(zone)
    }

    /// Cards in a zone, bottom first.
    #[must_use]
    pub fn cards_in_zone(&self, zone: &Zone) -> &[RealCardId] {
        self.zone_order.get(zone).map_or(&[], |v| v.as_slice())
    }

    /// Get the number of cards in a zone.
    #[must_use]
    pub fn zone_size(&self, zone: &Zone) -> usize {
        self.cards_in_zone(zone).len()
    }

    /// Get the top card of a zone (last in the vec).
    #[must_use]
    pub fn top_card(&self, zone: &Zone) -> Option<RealCardId> {
        self.zone_order.get(zone)?.last().copied()
    }

    /// Peek at up to `n` cards from one end of the draw stack, in the order
    /// they would be drawn.
    #[must_use]
    pub fn peek_draw(&self, n: usize, end: StackEnd) -> Vec<RealCardId> {
        let cards = self.cards_in_zone(&Zone::DrawStack);
        match end {
            StackEnd::Top => cards.iter().rev().take(n).copied().collect(),
            StackEnd::Bottom => cards.iter().take(n).copied().collect(),
        }
    }

    /// Owned area holding `card`, searching hand, then equip, then judge.
    #[must_use]
    pub fn find_in_player(&self, player: PlayerId, card: RealCardId) -> Option<Area> {
        [Area::Hand, Area::Equip, Area::Judge]
            .into_iter()
            .find(|area| self.is_in_zone(card, &Zone::of(player, area.clone())))
    }

    /// Fold the discard stack under the draw stack and shuffle it.
    ///
    /// Returns the number of cards folded in.
    pub fn fold_discard_into_draw(&mut self, rng: &mut GameRng) -> usize {
        let mut discard = self.zone_order.remove(&Zone::DiscardStack).unwrap_or_default();
        if discard.is_empty() {
            return 0;
        }
        rng.shuffle(&mut discard);
        let folded = discard.len();
        for card in &discard {
            self.locations.insert(*card, Zone::DrawStack);
        }
        let draw = self.zone_order.entry(Zone::DrawStack).or_default();
        discard.append(draw);
        *draw = discard;
        self.reshuffles += 1;
        folded
    }

    /// Shuffle a zone.
    pub fn shuffle_zone(&mut self, zone: &Zone, rng: &mut GameRng) {
        if let Some(order) = self.zone_order.get_mut(zone) {
            rng.shuffle(order);
        }
    }

    #[must_use]
    pub fn reshuffle_count(&self) -> u32 {
        self.reshuffles
    }

    /// Get total number of cards tracked.
    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.locations.len()
    }

    /// Check if the manager contains a card.
    #[must_use]
    pub fn contains(&self, card: RealCardId) -> bool {
        self.locations.contains_key(&card)
    }

    /// Whether every card of `deck` is in exactly one zone and nothing
    /// else is tracked.
    #[must_use]
    pub fn is_partition_of(&self, deck: &[RealCardId]) -> bool {
        let listed: usize = self.zone_order.values().map(Vec::len).sum();
        if listed != deck.len() || self.locations.len() != deck.len() {
            return false;
        }
        deck.iter().all(|card| {
            self.locations
                .get(card)
                .is_some_and(|zone| self.cards_in_zone(zone).iter().filter(|c| *c == card).count() == 1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw_stack_of(ids: std::ops::Range<u32>) -> ZoneManager {
        let mut manager = ZoneManager::new();
        for i in ids {
            manager.add_to_zone(RealCardId(i), Zone::DrawStack, ZonePosition::Top).unwrap();
        }
        manager
    }

    #[test]
    fn test_add_and_get() {
        let manager = draw_stack_of(10..12);
        assert_eq!(manager.get_zone(RealCardId(10)), Some(&Zone::DrawStack));
        assert_eq!(manager.get_zone(RealCardId(99)), None);
        assert!(manager.is_in_zone(RealCardId(11), &Zone::DrawStack));
    }

    #[test]
    fn test_ordering() {
        let mut manager = ZoneManager::new();
        let zone = Zone::DiscardStack;
        manager.add_to_zone(RealCardId(10), zone.clone(), ZonePosition::Top).unwrap();
        manager.add_to_zone(RealCardId(11), zone.clone(), ZonePosition::Bottom).unwrap();
        manager.add_to_zone(RealCardId(12), zone.clone(), ZonePosition::Index(1)).unwrap();

        // Order should be: [11, 12, 10] (bottom to top)
        assert_eq!(manager.cards_in_zone(&zone), &[RealCardId(11), RealCardId(12), RealCardId(10)]);
        assert_eq!(manager.top_card(&zone), Some(RealCardId(10)));
    }

    #[test]
    fn test_move_between_zones() {
        let mut manager = draw_stack_of(0..3);
        let hand = Zone::Hand(PlayerId::new(1));

        let old = manager.move_to_zone(RealCardId(2), hand.clone(), ZonePosition::Top);

        assert_eq!(old, Some(Zone::DrawStack));
        assert_eq!(manager.zone_size(&Zone::DrawStack), 2);
        assert_eq!(manager.cards_in_zone(&hand), &[RealCardId(2)]);
        assert_eq!(manager.move_to_zone(RealCardId(99), hand, ZonePosition::Top), None);
    }

    #[test]
    fn test_duplicate_card_rejected() {
        let mut manager = draw_stack_of(0..1);
        let err = manager.add_to_zone(RealCardId(0), Zone::DiscardStack, ZonePosition::Top).unwrap_err();
        assert!(matches!(err.kind, EngineErrorKind::InvalidContent(_)));
    }

    #[test]
    fn test_peek_draw_ends() {
        let manager = draw_stack_of(0..4);
        assert_eq!(manager.peek_draw(2, StackEnd::Top), vec![RealCardId(3), RealCardId(2)]);
        assert_eq!(manager.peek_draw(2, StackEnd::Bottom), vec![RealCardId(0), RealCardId(1)]);
        assert_eq!(manager.peek_draw(10, StackEnd::Top).len(), 4);
    }

    #[test]
    fn test_find_in_player_search_order() {
        let p = PlayerId::new(0);
        let mut manager = draw_stack_of(0..3);
        manager.move_to_zone(RealCardId(0), Zone::Judge(p), ZonePosition::Top);
        manager.move_to_zone(RealCardId(1), Zone::Equip(p), ZonePosition::Top);

        assert_eq!(manager.find_in_player(p, RealCardId(0)), Some(Area::Judge));
        assert_eq!(manager.find_in_player(p, RealCardId(1)), Some(Area::Equip));
        assert_eq!(manager.find_in_player(p, RealCardId(2)), None);
        assert_eq!(manager.find_in_player(PlayerId::new(1), RealCardId(1)), None);
    }

    #[test]
    fn test_fold_discard_into_draw() {
        let mut manager = draw_stack_of(0..6);
        for i in 2..6 {
            manager.move_to_zone(RealCardId(i), Zone::DiscardStack, ZonePosition::Top);
        }
        let mut rng = GameRng::new(1);

        assert_eq!(manager.fold_discard_into_draw(&mut rng), 4);
        assert_eq!(manager.zone_size(&Zone::DrawStack), 6);
        assert_eq!(manager.zone_size(&Zone::DiscardStack), 0);
        assert_eq!(manager.reshuffle_count(), 1);
        // Remaining draw cards stay on top.
        assert_eq!(manager.peek_draw(2, StackEnd::Top), vec![RealCardId(1), RealCardId(0)]);

        assert_eq!(manager.fold_discard_into_draw(&mut rng), 0);
        assert_eq!(manager.reshuffle_count(), 1);
    }

    #[test]
    fn test_partition() {
        let deck: Vec<_> = (0..5).map(RealCardId).collect();
        let mut manager = draw_stack_of(0..5);
        assert!(manager.is_partition_of(&deck));

        manager.move_to_zone(RealCardId(3), Zone::Processing, ZonePosition::Top);
        assert!(manager.is_partition_of(&deck));
        assert!(!manager.is_partition_of(&deck[..4]));
    }

    #[test]
    fn test_zone_ownership() {
        let p = PlayerId::new(2);
        let zone = Zone::of(p, Area::Outside("fields".into()));
        assert_eq!(zone.owner(), Some(p));
        assert_eq!(zone.area(), Some(Area::Outside("fields".into())));
        assert!(!Zone::Hand(p).is_public());
        assert!(Zone::Judge(p).is_public());
        assert_eq!(Zone::DrawStack.owner(), None);
    }
}
