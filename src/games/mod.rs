//! The three vocabulary mini-games and the pieces they share.

mod action;
mod any;
mod fill;
mod matching;
mod memory;
mod progress;
mod timers;
mod variant;

pub use action::{ActionError, ActionOutcome, DropChip, EnterChar, FlipCard, PlayerAction};
pub use any::AnyGame;
pub use fill::{FillRow, FillSheet, RowStatus};
pub use matching::{MatchBoard, MatchRow};
pub use memory::{Card, MemoryBoard};
pub use progress::{GameProgress, Phase};
pub use timers::{TimerKey, TimerQueue};
pub use variant::{GameVariant, LayoutError, TurnContext};
