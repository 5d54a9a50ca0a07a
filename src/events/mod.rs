//! Events: payloads, control envelopes and stage sequences.
//!
//! Every gameplay action is modelled as an [`Event`] that the
//! [`GameProcessor`](crate::processor::GameProcessor) walks through the
//! stages of its [`EventKind`].

pub mod envelope;
pub mod payload;
pub mod stage;

pub use envelope::{Event, EventControl};
pub use payload::{
    AimEvent, AskForCardEvent, CardDropEvent, CardLostEvent, CardLostReason, CardObtainedReason,
    CardResponseEvent, CardUseEvent, DamageEvent, DamageNature, DrawCardEvent, GameEvent,
    JudgeEvent, LoseHpEvent, ObtainCardEvent, PhaseChangeEvent, PinDianEvent, PinDianResult,
    PlayerDeathEvent, PlayerPhase, RecoverEvent, SkillUseEvent, Targets,
};
pub use stage::{EventKind, Stage};
