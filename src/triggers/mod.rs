//! Trigger resolution.
//!
//! At every stage of every event the processor asks this module which
//! trigger skills react. Candidates are collected from alive players in seat
//! order starting at the current player, filtered by the uniqueness rule and
//! each skill's own conditions, then fired one by one. Compulsory and awaken
//! skills fire on their own; others ask their owner first.
//!
//! Firing a skill runs a `SkillUse` event and then a `SkillEffect` event
//! through the processor, so other skills can react to skill use.
//!
//! ## Key Types
//!
//! - `Candidate`: owner and skill eligible at a stage
//! - `ExclusionSet`: mutual exclusion bookkeeping for one pass

mod resolver;
mod uniqueness;

pub use resolver::{collect_candidates, resolve_stage, Candidate};
pub use uniqueness::ExclusionSet;
