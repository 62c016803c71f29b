//! Memory: find each word's translation among face-down cards.

use derive_getters::Getters;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{debug, instrument};

use super::action::{ActionError, ActionOutcome, FlipCard};
use super::timers::TimerKey;
use super::variant::{GameVariant, LayoutError, TurnContext};
use crate::lesson::{GameKind, Lesson};

/// One face-down card.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize)]
pub struct Card {
    /// Word or translation shown when face up.
    display_text: String,
    /// Lesson row this card came from; exactly two cards share it.
    pair_key: usize,
    /// Face up.
    is_flipped: bool,
    /// Resolved.
    is_matched: bool,
}

impl Card {
    fn new(display_text: &str, pair_key: usize) -> Self {
        Self {
            display_text: display_text.to_string(),
            pair_key,
            is_flipped: false,
            is_matched: false,
        }
    }
}

/// Memory board: 2N shuffled cards plus the round in progress.
#[derive(Debug, Clone, Getters, Serialize)]
pub struct MemoryBoard {
    cards: Vec<Card>,
    /// Card turned up first in the current round.
    first_selection: Option<usize>,
    /// Set while a mismatched pair waits to turn back down.
    locked: bool,
}

impl MemoryBoard {
    fn unflip(&mut self, index: usize) {
        if let Some(card) = self.cards.get_mut(index) {
            if !card.is_matched {
                card.is_flipped = false;
            }
        }
    }
}

impl GameVariant for MemoryBoard {
    type Action = FlipCard;

    const KIND: GameKind = GameKind::Memory;

    #[instrument(skip_all, fields(lesson_id = %lesson.id(), pairs = lesson.pair_count()))]
    fn build_layout<R: Rng + ?Sized>(lesson: &Lesson, rng: &mut R) -> Result<Self, LayoutError> {
        let mut cards: Vec<Card> = lesson
            .pairs()
            .enumerate()
            .flat_map(|(key, (word, translation))| [Card::new(word, key), Card::new(translation, key)])
            .collect();
        cards.shuffle(rng);
        debug!(cards = cards.len(), "Dealt memory board");
        Ok(Self {
            cards,
            first_selection: None,
            locked: false,
        })
    }

    #[instrument(skip(self, turn), fields(card = action.card))]
    fn apply_action(
        &mut self,
        action: FlipCard,
        turn: &mut TurnContext<'_>,
    ) -> Result<ActionOutcome, ActionError> {
        let index = action.card;
        let len = self.cards.len();
        let card = self
            .cards
            .get(index)
            .ok_or(ActionError::OutOfRange { index, len })?;

        if self.locked || card.is_matched || card.is_flipped {
            debug!(locked = self.locked, "Flip ignored");
            return Ok(ActionOutcome::Ignored);
        }

        turn.progress.begin();
        self.cards[index].is_flipped = true;

        let Some(first) = self.first_selection else {
            self.first_selection = Some(index);
            return Ok(ActionOutcome::Selected);
        };

        turn.progress.record_attempt();

        if self.cards[first].pair_key == self.cards[index].pair_key {
            self.cards[first].is_matched = true;
            self.cards[index].is_matched = true;
            self.first_selection = None;
            turn.progress.record_success();
            debug!(first, second = index, "Pair matched");
            Ok(ActionOutcome::Matched)
        } else {
            self.locked = true;
            turn.timers.schedule(
                TimerKey::Unflip {
                    first,
                    second: index,
                },
                turn.now + turn.timings.memory_unflip(),
            );
            debug!(first, second = index, "Pair mismatched, board locked");
            Ok(ActionOutcome::Missed)
        }
    }

    fn on_timer(&mut self, key: &TimerKey) {
        if let TimerKey::Unflip { first, second } = *key {
            self.unflip(first);
            self.unflip(second);
            self.first_selection = None;
            self.locked = false;
            debug!(first, second, "Mismatched pair turned back down");
        }
    }

    fn is_won(&self) -> bool {
        self.cards.iter().all(|c| c.is_matched)
    }
}
