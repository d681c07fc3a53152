//! # Prediction Metrics
//!
//! Scores what a fine-tuned model generated against its references.
//!
//! * [`TokenAccuracy`]: exact-match accuracy over shifted token ids. It works on
//!   raw logits argmax and label ids, so it is meant for callers embedding the
//!   crate in an evaluation loop; `vtl eval` only sees decoded text.
//! * [`ClassificationMetrics`]: accuracy and macro/weighted precision, recall
//!   and F1 over decoded labels.
//! * [`TextSimilarity`]: ROUGE-1/2/L over segmented words and character BLEU-4.
//! * [`read_predictions`]: loads a `generated_predictions.jsonl` style file.
//!
//! The accumulators collect scores batch by batch and report the mean on
//! `dump()`, which also resets them.

#![allow(clippy::cast_precision_loss)]

mod accuracy;
mod classification;
mod error;
mod predictions;
mod scoreboard;
mod similarity;

pub use crate::accuracy::{IGNORE_INDEX, TokenAccuracy};
pub use crate::classification::{ClassificationMetrics, ClassificationScores};
pub use crate::error::{MetricsError, MetricsErrorExt};
pub use crate::predictions::{PredictionRecord, read_predictions, score_predictions, similarity_scores};
pub use crate::scoreboard::ScoreBoard;
pub use crate::similarity::{TextSimilarity, bleu4, rouge_l, rouge_n};
