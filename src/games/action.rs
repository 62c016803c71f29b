//! First-class player actions and their results.
//!
//! Actions are domain events: the console, a test, or any other front end
//! builds them, and the engine decides what they mean for the current board.

use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};

use crate::lesson::GameKind;

/// Memory: turn a card face up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlipCard {
    /// Board index of the card.
    pub card: usize,
}

/// Fill: type into a row's blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnterChar {
    /// Row index.
    pub row: usize,
    /// Raw input; empty clears the row. Only the first character counts.
    pub value: String,
}

/// Match: drop a dragged translation onto a word's zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DropChip {
    /// Target row index.
    pub row: usize,
    /// Dragged translation, if the drag carried one.
    pub payload: Option<String>,
}

/// Any player action, tagged by the game it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, From)]
pub enum PlayerAction {
    /// Memory flip.
    Flip(FlipCard),
    /// Fill input.
    Enter(EnterChar),
    /// Match drop.
    Drop(DropChip),
}

impl PlayerAction {
    /// Memory flip of `card`.
    pub fn flip(card: usize) -> Self {
        FlipCard { card }.into()
    }

    /// Fill input of `value` into `row`.
    pub fn enter(row: usize, value: impl Into<String>) -> Self {
        EnterChar {
            row,
            value: value.into(),
        }
        .into()
    }

    /// Match drop of `payload` onto `row`.
    pub fn drop_chip(row: usize, payload: Option<String>) -> Self {
        DropChip { row, payload }.into()
    }

    /// The game this action is meant for.
    pub fn kind(&self) -> GameKind {
        match self {
            PlayerAction::Flip(_) => GameKind::Memory,
            PlayerAction::Enter(_) => GameKind::Fill,
            PlayerAction::Drop(_) => GameKind::Match,
        }
    }
}

/// What an accepted action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionOutcome {
    /// Nothing changed (locked board, card already up, empty drag).
    Ignored,
    /// Memory: first card of a round is up.
    Selected,
    /// Fill: row cleared back to idle.
    Cleared,
    /// A card pair, row, or zone was resolved.
    Matched,
    /// Wrong guess; feedback is pending on a timer.
    Missed,
    /// The action resolved the last pair. Returned exactly once per session.
    Won,
}

/// Action rejected by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ActionError {
    /// The session is already won.
    #[display("Game is already won")]
    GameOver,

    /// The session was abandoned.
    #[display("Game session was abandoned")]
    Abandoned,

    /// Index outside the board.
    #[display("Index {} is out of range (0..{})", index, len)]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Board size.
        len: usize,
    },

    /// Action for a different game than the one being played.
    #[display("A {} action cannot be played in a {} game", action, game)]
    WrongVariant {
        /// Game the action targets.
        action: GameKind,
        /// Game being played.
        game: GameKind,
    },

    /// Fill row already solved.
    #[display("Row {} is already solved", _0)]
    RowLocked(#[error(not(source))] usize),

    /// Dragged translation is not in the pool.
    #[display("'{}' is not in the translation pool", _0)]
    UnknownChip(#[error(not(source))] String),
}
