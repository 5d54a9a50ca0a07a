//! Engine error types.
//!
//! Every failure the engine can surface is an [`EngineError`]: a typed
//! [`EngineErrorKind`] plus the source location that raised it. Contract
//! violations abort the action in flight; the room reports them on its log
//! rather than forwarding them to clients.

use derive_more::{Display, Error};

use crate::cards::{CardId, RealCardId};
use crate::core::PlayerId;

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum EngineErrorKind {
    /// A player was asked to give up a card they do not hold.
    #[display("{_0} does not hold card {_1}")]
    CardNotHeld(PlayerId, RealCardId),

    /// Both the draw stack and the discard stack are empty.
    #[display("draw and discard stacks are both empty")]
    EmptyDeck,

    /// A card id is not part of this room's deck.
    #[display("unknown card {_0}")]
    UnknownCard(CardId),

    /// A virtual card id was never registered in this room.
    #[display("unknown virtual card {_0}")]
    UnknownVirtualCard(String),

    /// A skill name is not in the catalog.
    #[display("unknown skill {_0}")]
    UnknownSkill(String),

    /// A character id is not in the catalog.
    #[display("unknown character {_0}")]
    UnknownCharacter(u32),

    /// A player id is not part of the room.
    #[display("unknown {_0}")]
    UnknownPlayer(PlayerId),

    /// Content registration failed validation.
    #[display("invalid content: {_0}")]
    InvalidContent(String),

    /// An action was requested with arguments the rules do not allow.
    #[display("illegal action: {_0}")]
    IllegalAction(String),

    /// Room configuration could not be parsed.
    #[display("invalid config: {_0}")]
    Config(String),

    /// The transport failed in a way the room cannot recover from.
    #[display("transport: {_0}")]
    Transport(String),
}

/// Engine error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("{} at {}:{}", kind, file, line)]
pub struct EngineError {
    /// What went wrong.
    pub kind: EngineErrorKind,
    /// Line number where the error was raised.
    pub line: u32,
    /// Source file where the error was raised.
    pub file: &'static str,
}

impl EngineError {
    /// Creates a new error with caller location tracking.
    #[track_caller]
    pub fn new(kind: EngineErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Whether this error is a violation of the movement/envelope contract
    /// (as opposed to bad content or a transport failure).
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self.kind,
            EngineErrorKind::CardNotHeld(..)
                | EngineErrorKind::EmptyDeck
                | EngineErrorKind::UnknownCard(_)
                | EngineErrorKind::UnknownVirtualCard(_)
                | EngineErrorKind::UnknownPlayer(_)
                | EngineErrorKind::IllegalAction(_)
        )
    }
}

impl From<EngineErrorKind> for EngineError {
    #[track_caller]
    fn from(kind: EngineErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Result alias used throughout the engine.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_location() {
        let err = EngineError::new(EngineErrorKind::EmptyDeck);
        let text = err.to_string();
        assert!(text.starts_with("draw and discard stacks are both empty at "));
        assert!(text.contains("error.rs"));
    }

    #[test]
    fn test_contract_violation_classification() {
        let held = EngineError::new(EngineErrorKind::CardNotHeld(PlayerId::new(1), RealCardId(3)));
        assert!(held.is_contract_violation());
        assert_eq!(held.kind.to_string(), "Player 1 does not hold card #3");

        let content = EngineError::new(EngineErrorKind::InvalidContent("dup".into()));
        assert!(!content.is_contract_violation());
    }
}
