use crate::error::MetricsError;
use crate::scoreboard::ScoreBoard;
use std::collections::BTreeMap;

/// Label id excluded from scoring (prompt and padding positions).
pub const IGNORE_INDEX: i64 = -100;

const ACCURACY: &str = "accuracy";

/// Exact-match accuracy over token ids of a causal language model.
///
/// Logits at position `i` predict token `i + 1`, so row predictions are
/// compared shifted: `pred[..n-1]` against `label[1..]`. A sample counts as
/// correct only when every non-ignored label position matches; a sample with
/// no scored positions counts as wrong.
///
/// Library-only: predictions files carry decoded text, not token ids.
///
/// ```rust
/// use vtl_metrics::{IGNORE_INDEX, TokenAccuracy};
///
/// let mut metric = TokenAccuracy::new();
/// metric.update(&[vec![7, 8, 0]], &[vec![IGNORE_INDEX, 7, 8]]).unwrap();
/// metric.update(&[vec![7, 9, 0]], &[vec![IGNORE_INDEX, 7, 8]]).unwrap();
///
/// assert_eq!(metric.dump().unwrap()["accuracy"], 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct TokenAccuracy {
    board: ScoreBoard,
}

impl Default for TokenAccuracy {
    fn default() -> Self {
        Self { board: ScoreBoard::new(&[ACCURACY]) }
    }
}

impl TokenAccuracy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scores one batch of `(predictions, labels)` rows.
    ///
    /// # Errors
    /// Returns [`MetricsError::ShapeMismatch`] if row counts or row lengths differ.
    /// Nothing is recorded for a rejected batch.
    pub fn update(&mut self, preds: &[Vec<i64>], labels: &[Vec<i64>]) -> Result<(), MetricsError> {
        if preds.len() != labels.len() {
            return Err(MetricsError::ShapeMismatch {
                what: "batch",
                left: preds.len(),
                right: labels.len(),
            });
        }
        if let Some((p, l)) = preds.iter().zip(labels).find(|(p, l)| p.len() != l.len()) {
            return Err(MetricsError::ShapeMismatch { what: "sequence", left: p.len(), right: l.len() });
        }

        for (pred, label) in preds.iter().zip(labels) {
            self.board.record(ACCURACY, if sample_matches(pred, label) { 1.0 } else { 0.0 });
        }
        Ok(())
    }

    /// Samples recorded since the last dump.
    #[must_use]
    pub fn samples(&self) -> usize {
        self.board.len(ACCURACY)
    }

    /// Mean accuracy since the last dump; resets the accumulator.
    pub fn dump(&mut self) -> Option<BTreeMap<String, f64>> {
        self.board.dump()
    }
}

fn sample_matches(pred: &[i64], label: &[i64]) -> bool {
    let (Some(pred), Some(label)) = (pred.split_last().map(|(_, init)| init), label.get(1..)) else {
        return false;
    };

    let mut scored = 0_usize;
    for (p, l) in pred.iter().zip(label).filter(|(_, l)| **l != IGNORE_INDEX) {
        if p != l {
            return false;
        }
        scored += 1;
    }
    scored > 0
}
