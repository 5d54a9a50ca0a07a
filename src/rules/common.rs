//! Rules every card use is checked against.
//!
//! Usage limits, filter skills and card target modes. These checks run
//! before a play-phase card use enters the pipeline; forced uses (a rescue
//! card while dying, a card a skill plays on someone's behalf) skip them.

use crate::cards::{CardId, CardView, TargetMode};
use crate::core::{EngineError, EngineErrorKind, EngineResult, PlayerId};
use crate::room::Room;

/// The only card limited per turn by default.
pub const SLASH: &str = "slash";

/// How many more times `player` may use `card` this turn, or `None` if the
/// card is unlimited.
#[must_use]
pub fn remaining_uses(room: &Room, player: PlayerId, card: &CardView) -> Option<u32> {
    if card.name != SLASH {
        return None;
    }
    let allowed: u32 = 1 + room
        .effective_skills(player)
        .iter()
        .filter_map(|skill| skill.as_rules_breaker())
        .map(|breaker| breaker.break_card_usable_times(card))
        .sum::<u32>();
    Some(allowed.saturating_sub(room.player(player).card_used_times(&card.name)))
}

/// Whether `player` may use `card` right now, ignoring targets.
#[must_use]
pub fn can_use_card(room: &Room, player: PlayerId, card: &CardView) -> bool {
    if !room.player(player).is_alive() {
        return false;
    }
    if remaining_uses(room, player, card) == Some(0) {
        return false;
    }
    let allowed_by_filters = room
        .effective_skills(player)
        .iter()
        .filter_map(|skill| skill.as_filter())
        .all(|filter| filter.can_use_card(room, player, card));
    if !allowed_by_filters {
        return false;
    }
    match card.skill.as_deref().map(|name| room.catalog().skill(name)) {
        Some(Ok(skill)) => skill.as_active().map_or(true, |active| active.can_use(room, player)),
        Some(Err(_)) => false,
        None => true,
    }
}

/// Whether `target`'s filter skills let `by` target them with `card`.
#[must_use]
pub fn can_be_targeted(room: &Room, target: PlayerId, by: PlayerId, card: &CardView) -> bool {
    room.player(target).is_alive()
        && room
            .effective_skills(target)
            .iter()
            .filter_map(|skill| skill.as_filter())
            .all(|filter| filter.can_be_targeted(room, target, by, card))
}

/// Turn a client's target choice into the card's actual targets.
///
/// `Others` and `Globe` cards ignore the choice and take every eligible
/// alive player in seat order from the user. `Single` and `Multiple` cards
/// validate the choice against the card's target filter and the targets'
/// filter skills.
pub fn resolve_targets(room: &Room, from: PlayerId, card: &CardView, chosen: &[PlayerId]) -> EngineResult<Vec<PlayerId>> {
    let illegal = |reason: String| EngineError::new(EngineErrorKind::IllegalAction(reason));
    let target_filter = |target: PlayerId| -> bool {
        let by_card = match card.skill.as_deref().map(|name| room.catalog().skill(name)) {
            Some(Ok(skill)) => skill
                .as_active()
                .map_or(true, |active| active.target_filter(room, from, target)),
            _ => true,
        };
        by_card && can_be_targeted(room, target, from, card)
    };

    match card.target_mode {
        TargetMode::None => {
            if chosen.is_empty() {
                Ok(Vec::new())
            } else {
                Err(illegal(format!("{} takes no targets", card.name)))
            }
        }
        TargetMode::Others => Ok(room
            .alive_players_from(from)
            .into_iter()
            .filter(|&p| p != from && can_be_targeted(room, p, from, card))
            .collect()),
        TargetMode::Globe => Ok(room
            .alive_players_from(from)
            .into_iter()
            .filter(|&p| can_be_targeted(room, p, from, card))
            .collect()),
        TargetMode::Single | TargetMode::Multiple => {
            let expected_one = card.target_mode == TargetMode::Single;
            if chosen.is_empty() || (expected_one && chosen.len() != 1) {
                return Err(illegal(format!("wrong target count for {}", card.name)));
            }
            let mut targets: Vec<PlayerId> = Vec::with_capacity(chosen.len());
            for &target in chosen {
                room.check_player(target)?;
                if targets.contains(&target) {
                    return Err(illegal(format!("{target} chosen twice")));
                }
                if !target_filter(target) {
                    return Err(illegal(format!("{} cannot target {target}", card.name)));
                }
                targets.push(target);
            }
            Ok(targets)
        }
    }
}

/// Validate a play-phase card use and return its targets.
pub fn check_card_use(room: &Room, from: PlayerId, card: &CardId, chosen: &[PlayerId]) -> EngineResult<Vec<PlayerId>> {
    room.held_cards(from, std::slice::from_ref(card))?;
    let view = room.card_view(card)?;
    if !can_use_card(room, from, &view) {
        return Err(EngineError::new(EngineErrorKind::IllegalAction(format!(
            "{from} cannot use {} now",
            view.name
        ))));
    }
    resolve_targets(room, from, &view, chosen)
}
