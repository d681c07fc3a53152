use crate::error::MetricsError;
use crate::scoreboard::ScoreBoard;
use fxhash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeMap;

const METRICS: [&str; 6] = ["accuracy", "macro_precision", "macro_recall", "macro_f1", "weighted_precision", "weighted_f1"];

/// Scores of one labelled batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationScores {
    pub accuracy: f64,
    pub macro_precision: f64,
    pub macro_recall: f64,
    pub macro_f1: f64,
    pub weighted_precision: f64,
    pub weighted_f1: f64,
}

impl ClassificationScores {
    /// Scores `preds` against `labels`.
    ///
    /// Classes are the union of both sides. Precision, recall and F1 are 0
    /// for a class where they are undefined. Weighted averages use the
    /// number of true labels of each class as its weight.
    ///
    /// # Errors
    /// * [`MetricsError::ShapeMismatch`] if the slices differ in length.
    /// * [`MetricsError::Empty`] if there is nothing to score.
    pub fn compute<S: AsRef<str>>(labels: &[S], preds: &[S]) -> Result<Self, MetricsError> {
        if labels.len() != preds.len() {
            return Err(MetricsError::ShapeMismatch { what: "batch", left: preds.len(), right: labels.len() });
        }
        if labels.is_empty() {
            return Err(MetricsError::Empty { what: "batch" });
        }

        let mut classes: FxHashMap<&str, ClassCounts> = FxHashMap::default();
        let mut correct = 0_usize;
        for (label, pred) in labels.iter().map(AsRef::as_ref).zip(preds.iter().map(AsRef::as_ref)) {
            classes.entry(label).or_default().support += 1;
            classes.entry(pred).or_default().predicted += 1;
            if label == pred {
                classes.entry(label).or_default().true_positive += 1;
                correct += 1;
            }
        }

        let class_count = classes.len() as f64;
        let total = labels.len() as f64;
        let mut scores = Self {
            accuracy: correct as f64 / total,
            macro_precision: 0.0,
            macro_recall: 0.0,
            macro_f1: 0.0,
            weighted_precision: 0.0,
            weighted_f1: 0.0,
        };
        for counts in classes.values() {
            let (precision, recall, f1) = counts.ratios();
            let weight = counts.support as f64 / total;
            scores.macro_precision += precision / class_count;
            scores.macro_recall += recall / class_count;
            scores.macro_f1 += f1 / class_count;
            scores.weighted_precision += precision * weight;
            scores.weighted_f1 += f1 * weight;
        }
        Ok(scores)
    }

    fn values(&self) -> [f64; 6] {
        [
            self.accuracy,
            self.macro_precision,
            self.macro_recall,
            self.macro_f1,
            self.weighted_precision,
            self.weighted_f1,
        ]
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct ClassCounts {
    true_positive: usize,
    predicted: usize,
    support: usize,
}

impl ClassCounts {
    fn ratios(self) -> (f64, f64, f64) {
        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        let precision = ratio(self.true_positive, self.predicted);
        let recall = ratio(self.true_positive, self.support);
        let f1 = ratio(2 * self.true_positive, self.predicted + self.support);
        (precision, recall, f1)
    }
}

/// Batch-wise accumulator of [`ClassificationScores`].
#[derive(Debug, Clone)]
pub struct ClassificationMetrics {
    board: ScoreBoard,
}

impl Default for ClassificationMetrics {
    fn default() -> Self {
        Self { board: ScoreBoard::new(&METRICS) }
    }
}

impl ClassificationMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scores one batch and records it.
    ///
    /// # Errors
    /// See [`ClassificationScores::compute`]. Nothing is recorded on error.
    pub fn update<S: AsRef<str>>(&mut self, labels: &[S], preds: &[S]) -> Result<ClassificationScores, MetricsError> {
        let scores = ClassificationScores::compute(labels, preds)?;
        for (name, value) in METRICS.iter().zip(scores.values()) {
            self.board.record(name, value);
        }
        Ok(scores)
    }

    /// Batches recorded since the last dump.
    #[must_use]
    pub fn batches(&self) -> usize {
        self.board.len(METRICS[0])
    }

    /// Per-metric mean over recorded batches; resets the accumulator.
    pub fn dump(&mut self) -> Option<BTreeMap<String, f64>> {
        self.board.dump()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn perfect_predictions() {
        let scores = ClassificationScores::compute(&["a", "b", "a"], &["a", "b", "a"]).unwrap();
        for value in scores.values() {
            assert!(close(value, 1.0));
        }
    }

    #[test]
    fn mixed_predictions() {
        // a: tp=1 pred=1 support=2 -> p=1 r=0.5 f1=2/3
        // b: tp=1 pred=2 support=1 -> p=0.5 r=1 f1=2/3
        let scores = ClassificationScores::compute(&["a", "a", "b"], &["a", "b", "b"]).unwrap();
        assert!(close(scores.accuracy, 2.0 / 3.0));
        assert!(close(scores.macro_precision, 0.75));
        assert!(close(scores.macro_recall, 0.75));
        assert!(close(scores.macro_f1, 2.0 / 3.0));
        assert!(close(scores.weighted_precision, (2.0 * 1.0 + 0.5) / 3.0));
        assert!(close(scores.weighted_f1, 2.0 / 3.0));
    }

    #[test]
    fn classes_only_predicted_count_in_macro_average() {
        // c is never a true label: precision 0, recall undefined -> 0
        let scores = ClassificationScores::compute(&["a", "a"], &["a", "c"]).unwrap();
        assert!(close(scores.macro_recall, 0.25));
        assert!(close(scores.macro_precision, 0.5));
        assert!(close(scores.weighted_precision, 1.0));
    }

    #[test]
    fn rejects_bad_batches() {
        assert!(matches!(
            ClassificationScores::compute(&["a"], &["a", "b"]),
            Err(MetricsError::ShapeMismatch { left: 2, right: 1, .. })
        ));
        assert!(matches!(
            ClassificationScores::compute::<&str>(&[], &[]),
            Err(MetricsError::Empty { .. })
        ));
    }

    #[test]
    fn dump_is_mean_of_batches() {
        let mut metrics = ClassificationMetrics::new();
        metrics.update(&["x", "y"], &["x", "y"]).unwrap();
        metrics.update(&["x", "y"], &["y", "x"]).unwrap();
        assert_eq!(metrics.batches(), 2);

        let dumped = metrics.dump().unwrap();
        assert!(close(dumped["accuracy"], 0.5));
        assert!(close(dumped["macro_f1"], 0.5));
        assert_eq!(dumped.len(), 6);
        assert!(metrics.dump().is_none());
    }
}
