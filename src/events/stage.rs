//! Event kinds and their fixed stage sequences.
//!
//! Every gameplay action is an event of one [`EventKind`]. Each kind owns an
//! ordered list of [`Stage`]s that the game processor walks through; trigger
//! resolution runs once per stage, before the action's own handler.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Which kind of event an envelope carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum EventKind {
    CardUse,
    CardEffect,
    CardResponse,
    CardDrop,
    CardLost,
    DrawCard,
    ObtainCard,
    Aim,
    SkillUse,
    SkillEffect,
    PinDian,
    LoseHp,
    Damage,
    Recover,
    Judge,
    PhaseChange,
    PlayerDying,
    PlayerDied,
    AskForCardUse,
    AskForCardResponse,
}

/// A named step in an event kind's resolution sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Stage {
    // CardUse
    PreCardUse,
    CardUseAim,
    BeforeCardUseEffect,
    CardUseEffect,
    AfterCardUseEffect,
    CardUseFinished,

    // CardEffect
    PreCardEffect,
    CardEffecting,
    AfterCardEffect,

    // CardResponse
    PreCardResponse,
    CardResponding,
    AfterCardResponse,

    // CardDrop
    BeforeCardDrop,
    CardDropping,
    AfterCardDropped,

    // CardLost
    BeforeCardLose,
    CardLosing,
    AfterCardLost,

    // DrawCard
    BeforeDrawCard,
    CardDrawing,
    AfterDrawCard,

    // ObtainCard
    BeforeObtainCard,
    CardObtaining,
    AfterCardObtained,

    // Aim
    OnAim,
    OnAimed,
    AfterAim,

    // SkillUse
    BeforeSkillUse,
    SkillUsing,
    AfterSkillUse,

    // SkillEffect
    BeforeSkillEffect,
    SkillEffecting,
    AfterSkillEffect,

    // PinDian
    BeforePinDian,
    PinDianEffect,
    AfterPinDian,

    // LoseHp
    BeforeLoseHp,
    LosingHp,
    AfterLostHp,

    // Damage
    BeforeDamage,
    Damaging,
    Damaged,
    AfterDamaged,

    // Recover
    BeforeRecover,
    Recovering,
    AfterRecovered,

    // Judge
    BeforeJudge,
    JudgeEffect,
    AfterJudge,

    // PhaseChange
    BeforePhaseChange,
    PhaseChanged,

    // PlayerDying
    PlayerDying,
    AfterPlayerDying,

    // PlayerDied
    BeforePlayerDied,
    PlayerDied,
    AfterPlayerDied,

    // AskForCardUse / AskForCardResponse
    Asking,
}

impl EventKind {
    /// The fixed, ordered stage sequence of this kind.
    #[must_use]
    pub const fn stages(self) -> &'static [Stage] {
        use Stage::*;
        match self {
            EventKind::CardUse => &[
                PreCardUse,
                CardUseAim,
                BeforeCardUseEffect,
                CardUseEffect,
                AfterCardUseEffect,
                CardUseFinished,
            ],
            EventKind::CardEffect => &[PreCardEffect, CardEffecting, AfterCardEffect],
            EventKind::CardResponse => &[PreCardResponse, CardResponding, AfterCardResponse],
            EventKind::CardDrop => &[BeforeCardDrop, CardDropping, AfterCardDropped],
            EventKind::CardLost => &[BeforeCardLose, CardLosing, AfterCardLost],
            EventKind::DrawCard => &[BeforeDrawCard, CardDrawing, AfterDrawCard],
            EventKind::ObtainCard => &[BeforeObtainCard, CardObtaining, AfterCardObtained],
            EventKind::Aim => &[OnAim, OnAimed, AfterAim],
            EventKind::SkillUse => &[BeforeSkillUse, SkillUsing, AfterSkillUse],
            EventKind::SkillEffect => &[BeforeSkillEffect, SkillEffecting, AfterSkillEffect],
            EventKind::PinDian => &[BeforePinDian, PinDianEffect, AfterPinDian],
            EventKind::LoseHp => &[BeforeLoseHp, LosingHp, AfterLostHp],
            EventKind::Damage => &[BeforeDamage, Damaging, Damaged, AfterDamaged],
            EventKind::Recover => &[BeforeRecover, Recovering, AfterRecovered],
            EventKind::Judge => &[BeforeJudge, JudgeEffect, AfterJudge],
            EventKind::PhaseChange => &[BeforePhaseChange, PhaseChanged],
            EventKind::PlayerDying => &[PlayerDying, AfterPlayerDying],
            EventKind::PlayerDied => &[BeforePlayerDied, PlayerDied, AfterPlayerDied],
            EventKind::AskForCardUse | EventKind::AskForCardResponse => &[Asking],
        }
    }
}
