//! Trigger resolution for one stage of one event.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{debug, info, info_span, Instrument};

use crate::core::{EngineResult, PlayerId};
use crate::events::{Event, GameEvent, SkillUseEvent, Stage};
use crate::processor::{GameProcessor, StageHandler};
use crate::room::messages::{Notice, Prompt, Response};
use crate::room::Room;
use crate::skills::{Skill, TriggerSkill};

use super::uniqueness::ExclusionSet;

/// A skill that may fire at the current stage.
#[derive(Clone)]
pub struct Candidate {
    pub owner: PlayerId,
    pub skill: Arc<Skill>,
}

impl std::fmt::Debug for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate")
            .field("owner", &self.owner)
            .field("skill", &self.skill.name)
            .finish()
    }
}

/// Collect the trigger candidates for `event` at `stage`.
///
/// Alive players are visited in seat order from the current player; each
/// player's equip skills come before their own skills.
#[must_use]
pub fn collect_candidates(room: &Room, event: &Event, stage: Stage) -> Vec<Candidate> {
    let catalog = room.catalog();
    let lookup = |names: &[String]| -> Vec<Arc<Skill>> {
        names.iter().filter_map(|n| catalog.skill(n).ok()).cloned().collect()
    };
    let mut exclusion = ExclusionSet::new(
        lookup(room.resolving_skills.as_slice()),
        lookup(event.control.triggered_by()),
    );

    let mut candidates = Vec::new();
    for owner in room.alive_players_from(room.current()) {
        for skill in room.effective_skills(owner) {
            let Some(trigger) = skill.as_trigger() else {
                continue;
            };
            if !trigger.is_triggerable(event, stage) || !trigger.can_use(room, owner, event) {
                continue;
            }
            if !exclusion.admit(&skill, &event.control) {
                debug!(%owner, skill = %skill.name, %stage, "Candidate excluded");
                continue;
            }
            candidates.push(Candidate { owner, skill });
        }
    }
    candidates
}

/// Resolve the triggers of `event` at `stage`.
///
/// Termination abandons the pass. A skill that fails is reported and the
/// event's control flags are rolled back; the pass then continues.
pub async fn resolve_stage(room: &mut Room, event: &mut Event, stage: Stage) {
    if event.is_terminated() || room.is_over() {
        return;
    }
    let candidates = collect_candidates(room, event, stage);
    if candidates.is_empty() {
        return;
    }
    debug!(kind = %event.kind(), %stage, count = candidates.len(), "Trigger candidates");

    for Candidate { owner, skill } in candidates {
        if event.is_terminated() || room.is_over() {
            break;
        }
        let Some(trigger) = skill.as_trigger().cloned() else {
            continue;
        };
        if !still_applies(room, owner, &skill, &trigger, event, stage) {
            continue;
        }

        let mut skill_use = SkillUseEvent::new(owner, skill.name.clone());
        skill_use.triggered_on = Some(event.kind());

        let automatic = skill.skill_type.fires_automatically() || trigger.is_auto_trigger(room, owner, event);
        if !automatic {
            if event.control.is_disresponsive() {
                continue;
            }
            let prompt = Prompt::AskForSkillUse {
                skill: skill.name.clone(),
                event: event.kind(),
            };
            match room.ask(owner, prompt).await {
                Some(Response::SkillDecision {
                    invoke: true,
                    targets,
                    cards,
                }) => {
                    skill_use.targets = targets.into_iter().collect();
                    skill_use.cards = cards;
                }
                _ => {
                    debug!(%owner, skill = %skill.name, "Declined");
                    continue;
                }
            }
        }

        fire(room, &skill, trigger, skill_use, event).await;
    }
}

fn still_applies(
    room: &Room,
    owner: PlayerId,
    skill: &Skill,
    trigger: &Arc<dyn TriggerSkill>,
    event: &Event,
    stage: Stage,
) -> bool {
    room.player(owner).is_alive()
        && room.effective_skills(owner).iter().any(|s| s.name == skill.name)
        && trigger.is_triggerable(event, stage)
        && trigger.can_use(room, owner, event)
}

async fn fire(
    room: &mut Room,
    skill: &Skill,
    trigger: Arc<dyn TriggerSkill>,
    skill_use: SkillUseEvent,
    triggered_on: &mut Event,
) {
    let owner = skill_use.from;
    let before = triggered_on.control.clone();

    room.resolving_skills.push(skill.name.clone());
    let outcome = run_skill(room, trigger, skill_use, triggered_on)
        .instrument(info_span!("skill", name = %skill.name, %owner))
        .await;
    room.resolving_skills.pop();

    if let Err(error) = outcome {
        room.report_skill_failure(&skill.name, owner, &error);
        triggered_on.control.rollback_to(&before);
    }
}

/// Run the SkillUse pipeline, then SkillEffect unless the use was stopped.
async fn run_skill(
    room: &mut Room,
    trigger: Arc<dyn TriggerSkill>,
    skill_use: SkillUseEvent,
    triggered_on: &mut Event,
) -> EngineResult<()> {
    let mut use_event = Event::new(GameEvent::SkillUse(skill_use));
    let mut using = TriggerUseHandler {
        trigger: Arc::clone(&trigger),
        triggered_on: &mut *triggered_on,
        paid: false,
    };
    GameProcessor::handle(room, &mut use_event, Some(&mut using)).await?;
    if !using.paid || use_event.is_terminated() {
        return Ok(());
    }

    let GameEvent::SkillUse(skill_use) = use_event.payload else {
        return Ok(());
    };
    let mut effect_event = Event::new(GameEvent::SkillEffect(skill_use));
    let mut effecting = TriggerEffectHandler { trigger, triggered_on };
    GameProcessor::handle(room, &mut effect_event, Some(&mut effecting)).await
}

struct TriggerUseHandler<'e> {
    trigger: Arc<dyn TriggerSkill>,
    triggered_on: &'e mut Event,
    paid: bool,
}

impl StageHandler for TriggerUseHandler<'_> {
    fn on_stage<'a>(
        &'a mut self,
        room: &'a mut Room,
        event: &'a mut Event,
        stage: Stage,
    ) -> BoxFuture<'a, EngineResult<bool>> {
        async move {
            if stage != Stage::SkillUsing {
                return Ok(true);
            }
            let GameEvent::SkillUse(skill_use) = &event.payload else {
                return Ok(false);
            };
            info!(owner = %skill_use.from, skill = %skill_use.skill, "Skill used");
            room.player_mut(skill_use.from).record_skill_use(&skill_use.skill);
            room.broadcast(Notice::SkillUsed {
                from: skill_use.from,
                skill: skill_use.skill.clone(),
                targets: skill_use.targets.to_vec(),
            });
            self.paid = self.trigger.on_trigger(room, skill_use, self.triggered_on).await?;
            Ok(self.paid)
        }
        .boxed()
    }
}

struct TriggerEffectHandler<'e> {
    trigger: Arc<dyn TriggerSkill>,
    triggered_on: &'e mut Event,
}

impl StageHandler for TriggerEffectHandler<'_> {
    fn on_stage<'a>(
        &'a mut self,
        room: &'a mut Room,
        event: &'a mut Event,
        stage: Stage,
    ) -> BoxFuture<'a, EngineResult<bool>> {
        async move {
            if stage == Stage::SkillEffecting {
                if let GameEvent::SkillEffect(skill_use) = &event.payload {
                    self.trigger.on_effect(room, skill_use, self.triggered_on).await?;
                }
            }
            Ok(true)
        }
        .boxed()
    }
}
