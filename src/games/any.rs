//! Tagged dispatch over the three variants.

use rand::Rng;
use serde::Serialize;
use tracing::{instrument, warn};

use super::action::{ActionError, ActionOutcome, PlayerAction};
use super::fill::FillSheet;
use super::matching::MatchBoard;
use super::memory::MemoryBoard;
use super::timers::TimerKey;
use super::variant::{GameVariant, LayoutError, TurnContext};
use crate::lesson::{GameKind, Lesson};

/// A laid-out game of any kind.
#[derive(Debug, Clone, Serialize)]
pub enum AnyGame {
    /// Memory board.
    Memory(MemoryBoard),
    /// Fill sheet.
    Fill(FillSheet),
    /// Match board.
    Match(MatchBoard),
}

impl AnyGame {
    /// Lays out `lesson` as a `kind` game.
    #[instrument(skip(lesson, rng), fields(lesson_id = %lesson.id()))]
    pub fn build<R: Rng + ?Sized>(
        kind: GameKind,
        lesson: &Lesson,
        rng: &mut R,
    ) -> Result<Self, LayoutError> {
        Ok(match kind {
            GameKind::Memory => AnyGame::Memory(MemoryBoard::build_layout(lesson, rng)?),
            GameKind::Fill => AnyGame::Fill(FillSheet::build_layout(lesson, rng)?),
            GameKind::Match => AnyGame::Match(MatchBoard::build_layout(lesson, rng)?),
        })
    }

    /// Which game this is.
    pub fn kind(&self) -> GameKind {
        match self {
            AnyGame::Memory(_) => MemoryBoard::KIND,
            AnyGame::Fill(_) => FillSheet::KIND,
            AnyGame::Match(_) => MatchBoard::KIND,
        }
    }

    /// Routes `action` to the variant, rejecting actions meant for another game.
    pub fn apply_action(
        &mut self,
        action: PlayerAction,
        turn: &mut TurnContext<'_>,
    ) -> Result<ActionOutcome, ActionError> {
        match (self, action) {
            (AnyGame::Memory(board), PlayerAction::Flip(a)) => board.apply_action(a, turn),
            (AnyGame::Fill(sheet), PlayerAction::Enter(a)) => sheet.apply_action(a, turn),
            (AnyGame::Match(board), PlayerAction::Drop(a)) => board.apply_action(a, turn),
            (game, action) => {
                let err = ActionError::WrongVariant {
                    action: action.kind(),
                    game: game.kind(),
                };
                warn!(error = %err, "Rejected action for another game");
                Err(err)
            }
        }
    }

    /// Runs a due delayed callback.
    pub fn on_timer(&mut self, key: &TimerKey) {
        match self {
            AnyGame::Memory(board) => board.on_timer(key),
            AnyGame::Fill(sheet) => sheet.on_timer(key),
            AnyGame::Match(board) => board.on_timer(key),
        }
    }

    /// Whether the board shows every pair resolved.
    pub fn is_won(&self) -> bool {
        match self {
            AnyGame::Memory(board) => board.is_won(),
            AnyGame::Fill(sheet) => sheet.is_won(),
            AnyGame::Match(board) => board.is_won(),
        }
    }
}
