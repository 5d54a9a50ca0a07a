//! Mutual exclusion between trigger candidates.

use std::sync::Arc;

use crate::events::EventControl;
use crate::skills::Skill;

/// Skills that block conflicting candidates during one resolution pass.
///
/// Seeded with the skills currently resolving and the skills the event was
/// triggered by; every admitted candidate joins the set.
#[derive(Default)]
pub struct ExclusionSet {
    blockers: Vec<Arc<Skill>>,
}

impl ExclusionSet {
    #[must_use]
    pub fn new(resolving: impl IntoIterator<Item = Arc<Skill>>, triggered_by: impl IntoIterator<Item = Arc<Skill>>) -> Self {
        let mut blockers: Vec<Arc<Skill>> = resolving.into_iter().collect();
        blockers.extend(triggered_by);
        Self { blockers }
    }

    /// Admit `candidate` unless it conflicts with a blocker. Skills named on
    /// the event's `triggered_by` list are always admitted.
    pub fn admit(&mut self, candidate: &Arc<Skill>, control: &EventControl) -> bool {
        let exempt = control.is_triggered_by(&candidate.name);
        if !exempt && self.blockers.iter().any(|b| b.conflicts_with(candidate)) {
            return false;
        }
        self.blockers.push(Arc::clone(candidate));
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blockers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blockers.is_empty()
    }
}
