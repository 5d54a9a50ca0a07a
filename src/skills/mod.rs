//! Skill contract for pluggable content.
//!
//! A [`Skill`] is a named piece of rules text owned by a character or a card.
//! What it can do is a closed [`SkillCapability`]; how it is invoked is its
//! [`SkillType`]. Content implements one capability trait per skill and
//! registers the result in a [`Catalog`](crate::catalog::Catalog).
//!
//! Skills never touch zones or stacks directly; every effect goes through
//! the room's verbs, which run the staged pipeline.
//!
//! ## Key Types
//!
//! - `Skill`: name, type tag, capability, and uniqueness metadata
//! - `TriggerSkill`: reacts to an in-flight event at a stage
//! - `ActiveSkill`: used on purpose by its owner, including card effects
//! - `FilterSkill` / `RulesBreakerSkill` / `TransformSkill` / `ViewAsSkill`:
//!   passive modifiers consulted by the rules

mod capability;

pub use capability::{
    ActiveSkill, FilterSkill, RulesBreakerSkill, TransformSkill, TriggerSkill, ViewAsSkill,
};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::Display;

/// How a skill is invoked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum SkillType {
    /// The holder decides whether to use it.
    #[default]
    Common,
    /// Fires whenever it can; the holder is never asked.
    Compulsory,
    /// Fires on its own once its condition is met.
    Awaken,
    /// Usable a limited number of times per game.
    Limit,
}

impl SkillType {
    /// Whether a triggered skill of this type fires without asking.
    #[must_use]
    pub const fn fires_automatically(self) -> bool {
        matches!(self, SkillType::Compulsory | SkillType::Awaken)
    }
}

/// What a skill can do.
#[derive(Clone)]
pub enum SkillCapability {
    Trigger(Arc<dyn TriggerSkill>),
    Active(Arc<dyn ActiveSkill>),
    Filter(Arc<dyn FilterSkill>),
    ViewAs(Arc<dyn ViewAsSkill>),
    RulesBreaker(Arc<dyn RulesBreakerSkill>),
    Transform(Arc<dyn TransformSkill>),
}

impl SkillCapability {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SkillCapability::Trigger(_) => "trigger",
            SkillCapability::Active(_) => "active",
            SkillCapability::Filter(_) => "filter",
            SkillCapability::ViewAs(_) => "view-as",
            SkillCapability::RulesBreaker(_) => "rules-breaker",
            SkillCapability::Transform(_) => "transform",
        }
    }
}

impl std::fmt::Debug for SkillCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A registered skill.
///
/// ## Example
///
/// ```ignore
/// let skill = Skill::new("jianxiong", SkillCapability::Trigger(Arc::new(Jianxiong)))
///     .with_description("obtain the card that damaged you");
/// ```
#[derive(Clone, Debug)]
pub struct Skill {
    pub name: String,
    pub description: String,
    pub skill_type: SkillType,
    pub capability: SkillCapability,
    /// Granted only to a lord.
    pub lord_only: bool,
    /// Companion skills bound together with this one.
    pub shadows: Vec<String>,
    /// Skills that may not fire for the same event and stage as this one.
    pub exclusive_with: Vec<String>,
    /// At most one copy of this skill fires for one event and stage.
    pub unique: bool,
}

impl Skill {
    #[must_use]
    pub fn new(name: impl Into<String>, capability: SkillCapability) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            skill_type: SkillType::Common,
            capability,
            lord_only: false,
            shadows: Vec::new(),
            exclusive_with: Vec::new(),
            unique: false,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_type(mut self, skill_type: SkillType) -> Self {
        self.skill_type = skill_type;
        self
    }

    #[must_use]
    pub fn lord_only(mut self) -> Self {
        self.lord_only = true;
        self
    }

    #[must_use]
    pub fn with_shadow(mut self, shadow: impl Into<String>) -> Self {
        self.shadows.push(shadow.into());
        self
    }

    #[must_use]
    pub fn exclusive_with(mut self, other: impl Into<String>) -> Self {
        self.exclusive_with.push(other.into());
        self
    }

    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Whether this skill and `other` may not both fire for one event and
    /// stage. The relation is symmetric.
    #[must_use]
    pub fn conflicts_with(&self, other: &Skill) -> bool {
        if self.name == other.name {
            return self.unique || other.unique;
        }
        self.exclusive_with.contains(&other.name) || other.exclusive_with.contains(&self.name)
    }

    #[must_use]
    pub fn as_trigger(&self) -> Option<&Arc<dyn TriggerSkill>> {
        match &self.capability {
            SkillCapability::Trigger(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_active(&self) -> Option<&Arc<dyn ActiveSkill>> {
        match &self.capability {
            SkillCapability::Active(a) => Some(a),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_filter(&self) -> Option<&Arc<dyn FilterSkill>> {
        match &self.capability {
            SkillCapability::Filter(f) => Some(f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_view_as(&self) -> Option<&Arc<dyn ViewAsSkill>> {
        match &self.capability {
            SkillCapability::ViewAs(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_rules_breaker(&self) -> Option<&Arc<dyn RulesBreakerSkill>> {
        match &self.capability {
            SkillCapability::RulesBreaker(r) => Some(r),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_transform(&self) -> Option<&Arc<dyn TransformSkill>> {
        match &self.capability {
            SkillCapability::Transform(t) => Some(t),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardView;

    struct NoBreak;

    impl RulesBreakerSkill for NoBreak {
        fn break_card_usable_times(&self, _card: &CardView) -> u32 {
            0
        }
    }

    fn breaker(name: &str) -> Skill {
        Skill::new(name, SkillCapability::RulesBreaker(Arc::new(NoBreak)))
    }

    #[test]
    fn test_conflicts_are_symmetric() {
        let a = breaker("a").exclusive_with("b");
        let b = breaker("b");
        assert!(a.conflicts_with(&b));
        assert!(b.conflicts_with(&a));
        assert!(!a.conflicts_with(&breaker("c")));
    }

    #[test]
    fn test_unique_conflicts_with_itself() {
        let plain = breaker("x");
        assert!(!plain.conflicts_with(&plain.clone()));
        let unique = breaker("x").unique();
        assert!(unique.conflicts_with(&plain));
    }

    #[test]
    fn test_auto_fire_types() {
        assert!(SkillType::Compulsory.fires_automatically());
        assert!(SkillType::Awaken.fires_automatically());
        assert!(!SkillType::Limit.fires_automatically());
        assert!(!SkillType::Common.fires_automatically());
    }

    #[test]
    fn test_capability_accessors() {
        let skill = breaker("crossbow").with_type(SkillType::Compulsory);
        assert!(skill.as_rules_breaker().is_some());
        assert!(skill.as_trigger().is_none());
        assert_eq!(format!("{:?}", skill.capability), "rules-breaker");
    }
}
