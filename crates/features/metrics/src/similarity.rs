use crate::error::MetricsError;
use crate::scoreboard::ScoreBoard;
use fxhash::{FxHashMap, FxHashSet};
use jieba_rs::Jieba;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

const ROUGE_1: &str = "rouge-1";
const ROUGE_2: &str = "rouge-2";
const ROUGE_L: &str = "rouge-l";
const BLEU_4: &str = "bleu-4";

/// Keeps the F-measure finite when precision and recall are both zero.
const EPSILON: f64 = 1e-8;

/// ROUGE and BLEU between generated text and references.
///
/// ROUGE-1/2/L are computed over words from the `jieba` segmenter, BLEU-4 over
/// characters. Every sample contributes `score * 100` rounded to four places;
/// `dump()` reports the mean of each metric and resets.
pub struct TextSimilarity {
    segmenter: Jieba,
    board: ScoreBoard,
}

impl fmt::Debug for TextSimilarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextSimilarity").field("board", &self.board).finish_non_exhaustive()
    }
}

impl Default for TextSimilarity {
    fn default() -> Self {
        Self { segmenter: Jieba::new(), board: ScoreBoard::new(&[ROUGE_1, ROUGE_2, ROUGE_L, BLEU_4]) }
    }
}

impl TextSimilarity {
    /// Loads the segmenter dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scores one batch of decoded `(labels, preds)`.
    ///
    /// # Errors
    /// Returns [`MetricsError::ShapeMismatch`] if the slices differ in length.
    pub fn update<S: AsRef<str>>(&mut self, labels: &[S], preds: &[S]) -> Result<(), MetricsError> {
        if labels.len() != preds.len() {
            return Err(MetricsError::ShapeMismatch { what: "batch", left: preds.len(), right: labels.len() });
        }

        for (label, pred) in labels.iter().map(AsRef::as_ref).zip(preds.iter().map(AsRef::as_ref)) {
            let hypothesis = self.segment(pred);
            let reference = self.segment(label);

            self.board.record(ROUGE_1, percent(rouge_n(&hypothesis, &reference, 1)));
            self.board.record(ROUGE_2, percent(rouge_n(&hypothesis, &reference, 2)));
            self.board.record(ROUGE_L, percent(rouge_l(&hypothesis, &reference)));

            let pred_chars: Vec<char> = pred.chars().collect();
            let label_chars: Vec<char> = label.chars().collect();
            self.board.record(BLEU_4, percent(bleu4(&label_chars, &pred_chars)));
        }
        Ok(())
    }

    /// Samples recorded since the last dump.
    #[must_use]
    pub fn samples(&self) -> usize {
        self.board.len(BLEU_4)
    }

    /// Per-metric means since the last dump; resets the accumulator.
    pub fn dump(&mut self) -> Option<BTreeMap<String, f64>> {
        self.board.dump()
    }

    /// Words joined by single spaces; whitespace-only pieces are dropped.
    fn segment(&self, text: &str) -> String {
        self.segmenter
            .cut(text, true)
            .into_iter()
            .map(str::trim)
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn percent(score: f64) -> f64 {
    (score * 1_000_000.0).round() / 10_000.0
}

/// Space-separated words grouped into sentences split on `.`.
fn sentences(text: &str) -> Vec<Vec<&str>> {
    text.split('.')
        .map(|sentence| sentence.split_whitespace().collect::<Vec<_>>())
        .filter(|words| !words.is_empty())
        .collect()
}

fn f_measure(overlap: usize, hypothesis: usize, reference: usize) -> f64 {
    if hypothesis == 0 || reference == 0 {
        return 0.0;
    }
    let precision = overlap as f64 / hypothesis as f64;
    let recall = overlap as f64 / reference as f64;
    2.0 * (precision * recall) / (precision + recall + EPSILON)
}

fn distinct_ngrams<'a>(sentences: &[Vec<&'a str>], n: usize) -> FxHashSet<Vec<&'a str>> {
    let words: Vec<&str> = sentences.iter().flatten().copied().collect();
    words.windows(n).map(<[&str]>::to_vec).collect()
}

/// ROUGE-N F-measure over distinct n-grams of space-separated words.
///
/// Returns 0 when either side has no words.
#[must_use]
pub fn rouge_n(hypothesis: &str, reference: &str, n: usize) -> f64 {
    let (hyp, refs) = (sentences(hypothesis), sentences(reference));
    if n == 0 || hyp.is_empty() || refs.is_empty() {
        return 0.0;
    }

    let hyp_grams = distinct_ngrams(&hyp, n);
    let ref_grams = distinct_ngrams(&refs, n);
    let overlap = hyp_grams.intersection(&ref_grams).count();
    f_measure(overlap, hyp_grams.len(), ref_grams.len())
}

/// Summary-level ROUGE-L F-measure.
///
/// For each reference sentence the words of its longest common subsequences
/// with every hypothesis sentence are unioned; precision and recall divide the
/// distinct union size by the distinct word counts of each side.
#[must_use]
pub fn rouge_l(hypothesis: &str, reference: &str) -> f64 {
    let (hyp, refs) = (sentences(hypothesis), sentences(reference));
    if hyp.is_empty() || refs.is_empty() {
        return 0.0;
    }

    let mut union: FxHashSet<&str> = FxHashSet::default();
    for ref_sentence in &refs {
        for hyp_sentence in &hyp {
            union.extend(longest_common_subsequence(ref_sentence, hyp_sentence));
        }
    }

    f_measure(union.len(), distinct_words(&hyp), distinct_words(&refs))
}

fn distinct_words(sentences: &[Vec<&str>]) -> usize {
    sentences.iter().flatten().collect::<FxHashSet<_>>().len()
}

fn longest_common_subsequence<'a>(x: &[&'a str], y: &[&str]) -> Vec<&'a str> {
    let mut table = vec![vec![0_usize; y.len() + 1]; x.len() + 1];
    for i in 1..=x.len() {
        for j in 1..=y.len() {
            table[i][j] = if x[i - 1] == y[j - 1] {
                table[i - 1][j - 1] + 1
            } else {
                table[i - 1][j].max(table[i][j - 1])
            };
        }
    }

    let (mut i, mut j) = (x.len(), y.len());
    let mut common = Vec::with_capacity(table[i][j]);
    while i > 0 && j > 0 {
        if x[i - 1] == y[j - 1] {
            common.push(x[i - 1]);
            i -= 1;
            j -= 1;
        } else if table[i - 1][j] > table[i][j - 1] {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    common.reverse();
    common
}

/// Sentence BLEU-4 with uniform weights against a single reference.
///
/// N-gram orders without a match are smoothed geometrically: the k-th such
/// order counts as `1 / (2^k * hypothesis n-grams)`. No unigram match scores 0.
#[must_use]
pub fn bleu4<T: Eq + Hash>(reference: &[T], hypothesis: &[T]) -> f64 {
    let mut log_sum = 0.0;
    let mut unmatched_orders = 0_i32;
    for n in 1..=4 {
        let (matched, total) = clipped_matches(reference, hypothesis, n);
        if matched == 0 && n == 1 {
            return 0.0;
        }
        let precision = if matched == 0 {
            unmatched_orders += 1;
            1.0 / (2_f64.powi(unmatched_orders) * total.max(1) as f64)
        } else {
            matched as f64 / total as f64
        };
        log_sum += 0.25 * precision.ln();
    }
    brevity_penalty(reference.len(), hypothesis.len()) * log_sum.exp()
}

/// Hypothesis n-grams found in the reference (each capped by its reference
/// count) and the total number of hypothesis n-grams.
fn clipped_matches<T: Eq + Hash>(reference: &[T], hypothesis: &[T], n: usize) -> (usize, usize) {
    let (hyp_counts, ref_counts) = (ngram_counts(hypothesis, n), ngram_counts(reference, n));

    let matched = hyp_counts
        .iter()
        .map(|(gram, hits)| (*hits).min(ref_counts.get(gram).copied().unwrap_or(0)))
        .sum();
    (matched, hyp_counts.values().sum())
}

fn ngram_counts<T: Eq + Hash>(tokens: &[T], n: usize) -> FxHashMap<&[T], usize> {
    let mut counts: FxHashMap<&[T], usize> = FxHashMap::default();
    for gram in tokens.windows(n) {
        *counts.entry(gram).or_default() += 1;
    }
    counts
}

fn brevity_penalty(reference_len: usize, hypothesis_len: usize) -> f64 {
    if hypothesis_len > reference_len {
        1.0
    } else if hypothesis_len == 0 {
        0.0
    } else {
        (1.0 - reference_len as f64 / hypothesis_len as f64).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    #[test]
    fn bleu_of_identical_text_is_one() {
        assert!((bleu4(&chars("abcdef"), &chars("abcdef")) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn bleu_smooths_missing_orders() {
        // p = 3/4, 2/3, 1/2 and a smoothed 1/2 for the unmatched 4-gram
        assert!((percent(bleu4(&chars("abcd"), &chars("abce"))) - 59.4604).abs() < 1e-9);
    }

    #[test]
    fn bleu_penalizes_short_hypotheses() {
        // 3- and 4-grams are absent and smoothed to 1/2 and 1/4; brevity is exp(-1)
        assert!((percent(bleu4(&chars("abcd"), &chars("ab"))) - 21.8742).abs() < 1e-9);
    }

    #[test]
    fn bleu_without_shared_characters_is_zero() {
        assert!(bleu4(&chars("abc"), &chars("xyz")).abs() < f64::EPSILON);
        assert!(bleu4(&chars("abc"), &chars("")).abs() < f64::EPSILON);
    }

    #[test]
    fn rouge_n_counts_distinct_ngrams() {
        assert!((percent(rouge_n("the cat sat", "the cat sat", 1)) - 100.0).abs() < 1e-9);
        assert!((percent(rouge_n("a b", "a c", 1)) - 50.0).abs() < 1e-9);
        assert!(rouge_n("a b", "a c", 2).abs() < f64::EPSILON);
    }

    #[test]
    fn rouge_l_uses_longest_common_subsequence() {
        // LCS = a c d; recall 3/3, precision 3/4
        assert!((percent(rouge_l("a b c d", "a c d")) - 85.7143).abs() < 1e-9);
    }

    #[test]
    fn empty_side_scores_zero() {
        assert!(rouge_n("", "a b", 1).abs() < f64::EPSILON);
        assert!(rouge_l("a b", "  ").abs() < f64::EPSILON);
        assert!(rouge_l(" . ", "a").abs() < f64::EPSILON);
    }

    #[test]
    fn accumulates_and_resets() {
        let mut metric = TextSimilarity::new();
        metric.update(&["the cat sat on the mat"], &["the cat sat on the mat"]).unwrap();
        metric.update(&["the cat sat on the mat"], &[""]).unwrap();
        assert_eq!(metric.samples(), 2);

        let dumped = metric.dump().unwrap();
        for name in [ROUGE_1, ROUGE_2, ROUGE_L, BLEU_4] {
            assert!((dumped[name] - 50.0).abs() < 1e-9, "{name} = {}", dumped[name]);
        }
        assert!(metric.dump().is_none());
    }

    #[test]
    fn mismatched_batch_is_rejected() {
        let mut metric = TextSimilarity::new();
        let err = metric.update(&["a"], &["a", "b"]).unwrap_err();
        assert!(matches!(err, MetricsError::ShapeMismatch { left: 2, right: 1, .. }));
        assert_eq!(metric.samples(), 0);
    }
}
