//! Capability traits implemented by content.

use crate::cards::CardView;
use crate::core::{EngineResult, PlayerId};
use crate::events::{Event, SkillUseEvent, Stage};
use crate::room::Room;

/// A skill that reacts to in-flight events.
#[async_trait::async_trait]
pub trait TriggerSkill: Send + Sync {
    /// Whether this skill reacts to `event` at `stage`.
    fn is_triggerable(&self, event: &Event, stage: Stage) -> bool;

    /// Whether `owner` currently satisfies the skill's preconditions.
    fn can_use(&self, room: &Room, owner: PlayerId, event: &Event) -> bool;

    /// Fire without asking for this particular event.
    fn is_auto_trigger(&self, _room: &Room, _owner: PlayerId, _event: &Event) -> bool {
        false
    }

    /// Cost paid while the skill is being used. Returning `false` stops the
    /// skill before its effect.
    async fn on_trigger(
        &self,
        _room: &mut Room,
        _skill_use: &SkillUseEvent,
        _triggered_on: &mut Event,
    ) -> EngineResult<bool> {
        Ok(true)
    }

    /// The effect. May rewrite or terminate the triggering event.
    async fn on_effect(
        &self,
        room: &mut Room,
        skill_use: &SkillUseEvent,
        triggered_on: &mut Event,
    ) -> EngineResult<()>;
}

/// A skill used on purpose: card effects and character actives.
#[async_trait::async_trait]
pub trait ActiveSkill: Send + Sync {
    fn can_use(&self, _room: &Room, _user: PlayerId) -> bool {
        true
    }

    /// Inclusive bounds on the number of chosen targets.
    fn target_range(&self) -> (usize, usize) {
        (0, 0)
    }

    fn target_filter(&self, _room: &Room, _user: PlayerId, _target: PlayerId) -> bool {
        false
    }

    /// Inclusive bounds on the number of cards paid.
    fn card_range(&self) -> (usize, usize) {
        (0, 0)
    }

    fn card_filter(&self, _room: &Room, _user: PlayerId, _card: &CardView) -> bool {
        false
    }

    /// Runs once the use is validated, before any target is affected.
    async fn on_use(&self, _room: &mut Room, _event: &mut Event) -> EngineResult<()> {
        Ok(())
    }

    /// Effect on one target (card effects) or the skill effect as a whole.
    async fn on_effect(&self, room: &mut Room, effect: &mut Event) -> EngineResult<()>;

    /// Runs after every target was affected.
    async fn after_effect(&self, _room: &mut Room, _event: &mut Event) -> EngineResult<()> {
        Ok(())
    }
}

/// Forbids uses or targets.
pub trait FilterSkill: Send + Sync {
    /// Whether the owner may use `card`.
    fn can_use_card(&self, _room: &Room, _owner: PlayerId, _card: &CardView) -> bool {
        true
    }

    /// Whether `by` may target the owner with `card`.
    fn can_be_targeted(&self, _room: &Room, _owner: PlayerId, _by: PlayerId, _card: &CardView) -> bool {
        true
    }
}

/// Lets the owner use cards as another card.
pub trait ViewAsSkill: Send + Sync {
    /// Card names this skill can produce.
    fn can_view_as(&self) -> Vec<String>;

    /// Number of cards the composite is built from.
    fn card_count(&self) -> usize {
        1
    }

    fn card_filter(&self, room: &Room, owner: PlayerId, card: &CardView) -> bool;
}

/// Relaxes a rule for the owner.
pub trait RulesBreakerSkill: Send + Sync {
    /// Extra uses of `card` allowed per turn.
    fn break_card_usable_times(&self, card: &CardView) -> u32;
}

/// Changes how the owner's cards are seen.
pub trait TransformSkill: Send + Sync {
    fn can_transform(&self, card: &CardView) -> bool;

    fn force_transform(&self, card: &mut CardView);
}
