//! Fill: supply the hidden character of each translation.

use derive_getters::Getters;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, instrument};

use super::action::{ActionError, ActionOutcome, EnterChar};
use super::timers::TimerKey;
use super::variant::{GameVariant, LayoutError, TurnContext};
use crate::lesson::{GameKind, Lesson};

/// State of one fill-in row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RowStatus {
    /// Waiting for input.
    Idle,
    /// Solved; accepts no further input.
    Correct,
    /// Wrong character shown; clears after a delay.
    Incorrect,
}

/// One word with a single hidden character in its translation.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize)]
pub struct FillRow {
    word: String,
    translation: String,
    /// Character (not byte) position hidden in `translation`.
    blank_index: usize,
    current_value: String,
    status: RowStatus,
}

impl FillRow {
    /// The hidden character.
    pub fn expected(&self) -> char {
        // blank_index < char count is established at layout time.
        self.translation
            .chars()
            .nth(self.blank_index)
            .unwrap_or_default()
    }

    /// Translation with the blank replaced by the current value, or `_`.
    pub fn masked(&self) -> String {
        self.translation
            .chars()
            .enumerate()
            .map(|(i, c)| {
                if i != self.blank_index {
                    c.to_string()
                } else if self.status == RowStatus::Correct {
                    c.to_string()
                } else if self.current_value.is_empty() {
                    "_".to_string()
                } else {
                    self.current_value.clone()
                }
            })
            .collect()
    }

    fn reset(&mut self) {
        self.current_value.clear();
        self.status = RowStatus::Idle;
    }
}

/// Fill sheet: one row per lesson pair.
#[derive(Debug, Clone, Getters, Serialize)]
pub struct FillSheet {
    rows: Vec<FillRow>,
}

fn same_letter(input: char, expected: char) -> bool {
    input.to_lowercase().eq(expected.to_lowercase())
}

impl GameVariant for FillSheet {
    type Action = EnterChar;

    const KIND: GameKind = GameKind::Fill;

    #[instrument(skip_all, fields(lesson_id = %lesson.id(), pairs = lesson.pair_count()))]
    fn build_layout<R: Rng + ?Sized>(lesson: &Lesson, rng: &mut R) -> Result<Self, LayoutError> {
        let rows = lesson
            .pairs()
            .enumerate()
            .map(|(row, (word, translation))| {
                let len = translation.chars().count();
                if len == 0 {
                    return Err(LayoutError::EmptyTranslation { row });
                }
                Ok(FillRow {
                    word: word.to_string(),
                    translation: translation.to_string(),
                    blank_index: rng.random_range(0..len),
                    current_value: String::new(),
                    status: RowStatus::Idle,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(rows = rows.len(), "Built fill sheet");
        Ok(Self { rows })
    }

    #[instrument(skip(self, turn), fields(row = action.row))]
    fn apply_action(
        &mut self,
        action: EnterChar,
        turn: &mut TurnContext<'_>,
    ) -> Result<ActionOutcome, ActionError> {
        let index = action.row;
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or(ActionError::OutOfRange { index, len })?;

        if row.status == RowStatus::Correct {
            return Err(ActionError::RowLocked(index));
        }

        // New input supersedes any pending auto-clear for this row.
        turn.timers.cancel(&TimerKey::ResetRow(index));

        let Some(input) = action.value.chars().next() else {
            row.reset();
            return Ok(ActionOutcome::Cleared);
        };
        turn.progress.begin();

        let expected = row.expected();
        if same_letter(input, expected) {
            row.current_value = expected.to_string();
            row.status = RowStatus::Correct;
            turn.progress.record_success();
            debug!("Row solved");
            Ok(ActionOutcome::Matched)
        } else {
            row.current_value = input.to_string();
            row.status = RowStatus::Incorrect;
            turn.progress.record_attempt();
            turn.timers.schedule(
                TimerKey::ResetRow(index),
                turn.now + turn.timings.fill_reset(),
            );
            debug!(%input, "Wrong character");
            Ok(ActionOutcome::Missed)
        }
    }

    fn on_timer(&mut self, key: &TimerKey) {
        if let TimerKey::ResetRow(index) = *key {
            if let Some(row) = self.rows.get_mut(index) {
                if row.status == RowStatus::Incorrect {
                    row.reset();
                    debug!(row = index, "Incorrect row cleared");
                }
            }
        }
    }

    fn is_won(&self) -> bool {
        self.rows.iter().all(|r| r.status == RowStatus::Correct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timings;
    use crate::games::progress::{GameProgress, Phase};
    use crate::games::timers::TimerQueue;
    use crate::lesson::LessonId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::{Duration, Instant};

    fn lesson(words: &[&str], translations: &[&str]) -> Lesson {
        Lesson::new(
            LessonId::parse("fill").expect("id"),
            "Spanish".to_string(),
            words.iter().map(|s| s.to_string()).collect(),
            translations.iter().map(|s| s.to_string()).collect(),
            GameKind::Fill,
            0,
        )
        .expect("valid lesson")
    }

    fn row(word: &str, translation: &str, blank_index: usize) -> FillRow {
        FillRow {
            word: word.to_string(),
            translation: translation.to_string(),
            blank_index,
            current_value: String::new(),
            status: RowStatus::Idle,
        }
    }

    struct Harness {
        sheet: FillSheet,
        progress: GameProgress,
        timers: TimerQueue<TimerKey>,
        timings: Timings,
        now: Instant,
    }

    impl Harness {
        fn new(rows: Vec<FillRow>) -> Self {
            let n = rows.len();
            Self {
                sheet: FillSheet { rows },
                progress: GameProgress::new(n),
                timers: TimerQueue::new(),
                timings: Timings::default(),
                now: Instant::now(),
            }
        }

        fn enter(&mut self, row: usize, value: &str) -> Result<ActionOutcome, ActionError> {
            let mut turn = TurnContext {
                progress: &mut self.progress,
                timers: &mut self.timers,
                timings: &self.timings,
                now: self.now,
            };
            self.sheet.apply_action(
                EnterChar {
                    row,
                    value: value.to_string(),
                },
                &mut turn,
            )
        }

        fn advance(&mut self, by: Duration) {
            self.now += by;
            for key in self.timers.pop_due(self.now) {
                self.sheet.on_timer(&key);
            }
        }
    }

    #[test]
    fn test_blank_index_within_each_translation() {
        let lesson = lesson(&["gato", "perro", "a"], &["cat", "dog", "x"]);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let sheet = FillSheet::build_layout(&lesson, &mut rng).expect("layout");
            for r in sheet.rows() {
                assert!(*r.blank_index() < r.translation().chars().count());
                assert_eq!(*r.status(), RowStatus::Idle);
                assert!(r.current_value().is_empty());
            }
        }
    }

    #[test]
    fn test_empty_translation_cannot_be_laid_out() {
        let lesson = lesson(&["gato", "nada"], &["cat", ""]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            FillSheet::build_layout(&lesson, &mut rng).unwrap_err(),
            LayoutError::EmptyTranslation { row: 1 }
        );
    }

    #[test]
    fn test_correct_char_is_case_insensitive_and_locks_row() {
        let mut h = Harness::new(vec![row("gato", "cat", 1), row("perro", "dog", 0)]);
        assert_eq!(h.enter(0, "A"), Ok(ActionOutcome::Matched));
        assert_eq!(*h.sheet.rows()[0].status(), RowStatus::Correct);
        assert_eq!(h.sheet.rows()[0].masked(), "cat");
        assert_eq!(*h.progress.attempts(), 0);
        assert_eq!(h.enter(0, "x"), Err(ActionError::RowLocked(0)));
        assert_eq!(*h.progress.successes(), 1);
    }

    #[test]
    fn test_wrong_char_counts_attempt_and_clears_after_delay() {
        let mut h = Harness::new(vec![row("gato", "cat", 1)]);
        assert_eq!(h.enter(0, "e"), Ok(ActionOutcome::Missed));
        assert_eq!(*h.progress.attempts(), 1);
        assert_eq!(*h.sheet.rows()[0].status(), RowStatus::Incorrect);
        assert_eq!(h.sheet.rows()[0].masked(), "cet");

        h.advance(Duration::from_millis(999));
        assert_eq!(*h.sheet.rows()[0].status(), RowStatus::Incorrect);
        h.advance(Duration::from_millis(1));
        assert_eq!(*h.sheet.rows()[0].status(), RowStatus::Idle);
        assert_eq!(h.sheet.rows()[0].masked(), "c_t");
        assert_eq!(*h.progress.attempts(), 1);
    }

    #[test]
    fn test_overwrite_before_delay_is_not_stomped() {
        let mut h = Harness::new(vec![row("gato", "cat", 1), row("perro", "dog", 2)]);
        h.enter(0, "e").expect("wrong guess");
        h.advance(Duration::from_millis(600));
        h.enter(0, "o").expect("second wrong guess");
        assert_eq!(*h.progress.attempts(), 2);

        // The first guess's timer would have fired here.
        h.advance(Duration::from_millis(500));
        assert_eq!(*h.sheet.rows()[0].status(), RowStatus::Incorrect);
        assert_eq!(h.sheet.rows()[0].current_value(), "o");

        h.advance(Duration::from_millis(500));
        assert_eq!(*h.sheet.rows()[0].status(), RowStatus::Idle);
    }

    #[test]
    fn test_correct_after_wrong_cancels_pending_clear() {
        let mut h = Harness::new(vec![row("gato", "cat", 1), row("perro", "dog", 2)]);
        h.enter(0, "e").expect("wrong guess");
        h.enter(0, "a").expect("right guess");
        assert!(h.timers.is_empty());
        h.advance(Duration::from_secs(2));
        assert_eq!(*h.sheet.rows()[0].status(), RowStatus::Correct);
    }

    #[test]
    fn test_empty_input_resets_without_attempt() {
        let mut h = Harness::new(vec![row("gato", "cat", 1)]);
        h.enter(0, "e").expect("wrong guess");
        assert_eq!(h.enter(0, ""), Ok(ActionOutcome::Cleared));
        assert_eq!(*h.sheet.rows()[0].status(), RowStatus::Idle);
        assert!(h.timers.is_empty());
        assert_eq!(*h.progress.attempts(), 1);
    }

    #[test]
    fn test_clearing_fresh_sheet_does_not_start_game() {
        let mut h = Harness::new(vec![row("gato", "cat", 1)]);
        assert_eq!(h.enter(0, ""), Ok(ActionOutcome::Cleared));
        assert_eq!(*h.progress.phase(), Phase::Ready);

        assert_eq!(h.enter(0, "e"), Ok(ActionOutcome::Missed));
        assert_eq!(*h.progress.phase(), Phase::Playing);
    }

    #[test]
    fn test_blank_index_counts_characters_not_bytes() {
        let mut h = Harness::new(vec![row("nino", "niño", 2)]);
        assert_eq!(h.sheet.rows()[0].expected(), 'ñ');
        assert_eq!(h.enter(0, "Ñ"), Ok(ActionOutcome::Matched));
        assert!(h.progress.is_won());
    }
}
