//! Match: drag each translation from a shuffled pool onto its word.

use std::collections::BTreeSet;

use derive_getters::Getters;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{debug, instrument};

use super::action::{ActionError, ActionOutcome, DropChip};
use super::timers::TimerKey;
use super::variant::{GameVariant, LayoutError, TurnContext};
use crate::lesson::{GameKind, Lesson};

/// A word and the zone its translation must be dropped into.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize)]
pub struct MatchRow {
    word: String,
    translation: String,
    /// Zone filled with the right translation.
    placed: bool,
}

/// Match board: rows in lesson order plus the draggable pool.
///
/// The pool is always a permutation of the translations not yet placed.
#[derive(Debug, Clone, Getters, Serialize)]
pub struct MatchBoard {
    rows: Vec<MatchRow>,
    pool: Vec<String>,
    /// Chips currently showing wrong-drop feedback.
    shaking: BTreeSet<String>,
}

impl MatchBoard {
    /// Whether `chip` is currently shaking.
    pub fn is_shaking(&self, chip: &str) -> bool {
        self.shaking.contains(chip)
    }
}

impl GameVariant for MatchBoard {
    type Action = DropChip;

    const KIND: GameKind = GameKind::Match;

    #[instrument(skip_all, fields(lesson_id = %lesson.id(), pairs = lesson.pair_count()))]
    fn build_layout<R: Rng + ?Sized>(lesson: &Lesson, rng: &mut R) -> Result<Self, LayoutError> {
        let rows: Vec<MatchRow> = lesson
            .pairs()
            .map(|(word, translation)| MatchRow {
                word: word.to_string(),
                translation: translation.to_string(),
                placed: false,
            })
            .collect();
        let mut pool = lesson.translations().clone();
        pool.shuffle(rng);
        debug!(rows = rows.len(), "Built match board");
        Ok(Self {
            rows,
            pool,
            shaking: BTreeSet::new(),
        })
    }

    #[instrument(skip(self, turn), fields(row = action.row))]
    fn apply_action(
        &mut self,
        action: DropChip,
        turn: &mut TurnContext<'_>,
    ) -> Result<ActionOutcome, ActionError> {
        let Some(chip) = action.payload.filter(|p| !p.is_empty()) else {
            debug!("Drop without payload ignored");
            return Ok(ActionOutcome::Ignored);
        };

        let index = action.row;
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or(ActionError::OutOfRange { index, len })?;
        let Some(pool_index) = self.pool.iter().position(|t| *t == chip) else {
            return Err(ActionError::UnknownChip(chip));
        };

        turn.progress.begin();
        turn.progress.record_attempt();

        // A filled zone takes nothing more; dropping on it is a miss.
        if !row.placed && chip == row.translation {
            row.placed = true;
            self.pool.remove(pool_index);
            if !self.pool.contains(&chip) {
                turn.timers.cancel(&TimerKey::Shake(chip.clone()));
                self.shaking.remove(&chip);
            }
            turn.progress.record_success();
            debug!(%chip, "Chip placed");
            Ok(ActionOutcome::Matched)
        } else {
            turn.timers.schedule(
                TimerKey::Shake(chip.clone()),
                turn.now + turn.timings.match_shake(),
            );
            debug!(%chip, "Chip dropped on the wrong zone");
            self.shaking.insert(chip);
            Ok(ActionOutcome::Missed)
        }
    }

    fn on_timer(&mut self, key: &TimerKey) {
        if let TimerKey::Shake(chip) = key {
            self.shaking.remove(chip);
        }
    }

    fn is_won(&self) -> bool {
        self.rows.iter().all(|r| r.placed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timings;
    use crate::games::progress::GameProgress;
    use crate::games::timers::TimerQueue;
    use crate::lesson::LessonId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::{Duration, Instant};

    fn lesson(words: &[&str], translations: &[&str]) -> Lesson {
        Lesson::new(
            LessonId::parse("match").expect("id"),
            "Spanish".to_string(),
            words.iter().map(|s| s.to_string()).collect(),
            translations.iter().map(|s| s.to_string()).collect(),
            GameKind::Match,
            0,
        )
        .expect("valid lesson")
    }

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    struct Harness {
        board: MatchBoard,
        progress: GameProgress,
        timers: TimerQueue<TimerKey>,
        timings: Timings,
        now: Instant,
    }

    impl Harness {
        fn new(words: &[&str], translations: &[&str]) -> Self {
            let mut rng = StdRng::seed_from_u64(3);
            Self {
                board: MatchBoard::build_layout(&lesson(words, translations), &mut rng)
                    .expect("layout"),
                progress: GameProgress::new(words.len()),
                timers: TimerQueue::new(),
                timings: Timings::default(),
                now: Instant::now(),
            }
        }

        fn drop_chip(&mut self, row: usize, chip: Option<&str>) -> Result<ActionOutcome, ActionError> {
            let mut turn = TurnContext {
                progress: &mut self.progress,
                timers: &mut self.timers,
                timings: &self.timings,
                now: self.now,
            };
            self.board.apply_action(
                DropChip {
                    row,
                    payload: chip.map(str::to_string),
                },
                &mut turn,
            )
        }

        fn advance(&mut self, by: Duration) {
            self.now += by;
            for key in self.timers.pop_due(self.now) {
                self.board.on_timer(&key);
            }
        }
    }

    #[test]
    fn test_pool_is_permutation_with_duplicates_kept() {
        let h = Harness::new(&["a", "b", "c"], &["uno", "dos", "uno"]);
        assert_eq!(
            sorted(h.board.pool().clone()),
            sorted(vec!["uno".to_string(), "dos".to_string(), "uno".to_string()])
        );
        let words: Vec<_> = h.board.rows().iter().map(|r| r.word().as_str()).collect();
        assert_eq!(words, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_dog_cat_walkthrough() {
        let mut h = Harness::new(&["dog", "cat"], &["perro", "gato"]);

        assert_eq!(h.drop_chip(0, Some("perro")), Ok(ActionOutcome::Matched));
        assert_eq!(*h.progress.successes(), 1);
        assert_eq!(h.board.pool(), &vec!["gato".to_string()]);

        // Onto the already-filled dog zone: a miss.
        assert_eq!(h.drop_chip(0, Some("gato")), Ok(ActionOutcome::Missed));
        assert_eq!(*h.progress.attempts(), 2);
        assert!(h.board.is_shaking("gato"));
        assert_eq!(h.board.pool(), &vec!["gato".to_string()]);

        assert_eq!(h.drop_chip(1, Some("perro")), Err(ActionError::UnknownChip("perro".to_string())));
        assert_eq!(h.drop_chip(1, Some("gato")), Ok(ActionOutcome::Matched));
        assert!(h.progress.is_won());
        assert!(h.board.pool().is_empty());
        assert_eq!(*h.progress.attempts(), 3);
        assert!(!h.board.is_shaking("gato"));
    }

    #[test]
    fn test_wrong_drop_shakes_then_clears() {
        let mut h = Harness::new(&["dog", "cat"], &["perro", "gato"]);
        assert_eq!(h.drop_chip(0, Some("gato")), Ok(ActionOutcome::Missed));
        assert_eq!(*h.progress.attempts(), 1);
        assert_eq!(*h.progress.successes(), 0);
        assert!(h.board.is_shaking("gato"));
        assert_eq!(h.board.pool().len(), 2);

        h.advance(Duration::from_millis(499));
        assert!(h.board.is_shaking("gato"));
        h.advance(Duration::from_millis(1));
        assert!(!h.board.is_shaking("gato"));
        assert_eq!(h.board.pool().len(), 2);
    }

    #[test]
    fn test_missing_payload_is_silent() {
        let mut h = Harness::new(&["dog"], &["perro"]);
        assert_eq!(h.drop_chip(0, None), Ok(ActionOutcome::Ignored));
        assert_eq!(h.drop_chip(0, Some("")), Ok(ActionOutcome::Ignored));
        assert_eq!(*h.progress.attempts(), 0);
    }

    #[test]
    fn test_duplicate_translation_removed_once() {
        let mut h = Harness::new(&["a", "b"], &["uno", "uno"]);
        assert_eq!(h.drop_chip(1, Some("uno")), Ok(ActionOutcome::Matched));
        assert_eq!(h.board.pool(), &vec!["uno".to_string()]);
        assert_eq!(h.drop_chip(0, Some("uno")), Ok(ActionOutcome::Matched));
        assert!(h.board.pool().is_empty());
        assert!(h.progress.is_won());
    }

    #[test]
    fn test_unknown_chip_is_rejected_without_attempt() {
        let mut h = Harness::new(&["dog"], &["perro"]);
        assert_eq!(
            h.drop_chip(0, Some("chien")),
            Err(ActionError::UnknownChip("chien".to_string()))
        );
        assert_eq!(*h.progress.attempts(), 0);
    }
}
