use crate::classification::ClassificationScores;
use crate::error::{MetricsError, MetricsErrorExt};
use crate::similarity::TextSimilarity;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// One line of a generated-predictions file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PredictionRecord {
    #[serde(default)]
    pub prompt: Option<String>,
    pub predict: String,
    pub label: String,
}

/// Reads a JSON-lines predictions file. Blank lines are skipped.
///
/// # Errors
/// * [`MetricsError::Io`] if the file cannot be read.
/// * [`MetricsError::Json`] naming the offending line.
pub fn read_predictions(path: impl AsRef<Path>) -> Result<Vec<PredictionRecord>, MetricsError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).context(format!("{}", path.display()))?;

    let records = raw
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<PredictionRecord>(line).context(format!("{} line {}", path.display(), index + 1))
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(path = %path.display(), count = records.len(), "Read predictions");
    Ok(records)
}

/// Scores decoded predictions as one batch, comparing trimmed text.
///
/// # Errors
/// Returns [`MetricsError::Empty`] for an empty slice.
pub fn score_predictions(records: &[PredictionRecord]) -> Result<ClassificationScores, MetricsError> {
    let labels: Vec<&str> = records.iter().map(|r| r.label.trim()).collect();
    let preds: Vec<&str> = records.iter().map(|r| r.predict.trim()).collect();
    ClassificationScores::compute(&labels, &preds)
}

/// ROUGE and BLEU means over the untrimmed prediction text.
///
/// # Errors
/// Returns [`MetricsError::Empty`] for an empty slice.
pub fn similarity_scores(records: &[PredictionRecord]) -> Result<BTreeMap<String, f64>, MetricsError> {
    let labels: Vec<&str> = records.iter().map(|r| r.label.as_str()).collect();
    let preds: Vec<&str> = records.iter().map(|r| r.predict.as_str()).collect();

    let mut metric = TextSimilarity::new();
    metric.update(&labels, &preds)?;
    metric.dump().ok_or(MetricsError::Empty { what: "predictions" })
}
