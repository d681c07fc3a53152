use std::collections::BTreeMap;

/// Per-metric score lists that are averaged and cleared on [`ScoreBoard::dump`].
///
/// Metrics are fed batch by batch; a dump reports the mean of everything
/// recorded since the previous dump.
#[derive(Debug, Clone)]
pub struct ScoreBoard {
    scores: BTreeMap<&'static str, Vec<f64>>,
}

impl ScoreBoard {
    #[must_use]
    pub fn new(metrics: &[&'static str]) -> Self {
        Self { scores: metrics.iter().map(|name| (*name, Vec::new())).collect() }
    }

    /// Appends `value` to `metric`. Unknown metric names are registered on first use.
    pub fn record(&mut self, metric: &'static str, value: f64) {
        self.scores.entry(metric).or_default().push(value);
    }

    /// Number of values recorded for `metric` since the last dump.
    #[must_use]
    pub fn len(&self, metric: &str) -> usize {
        self.scores.get(metric).map_or(0, Vec::len)
    }

    /// Means of every non-empty metric, or `None` when nothing was recorded.
    /// The board is empty afterwards.
    pub fn dump(&mut self) -> Option<BTreeMap<String, f64>> {
        let mut result = BTreeMap::new();
        for (name, values) in &mut self.scores {
            if !values.is_empty() {
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                result.insert((*name).to_owned(), mean);
            }
            values.clear();
        }
        if result.is_empty() { None } else { Some(result) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_averages_and_resets() {
        let mut board = ScoreBoard::new(&["accuracy"]);
        board.record("accuracy", 1.0);
        board.record("accuracy", 0.0);
        board.record("accuracy", 1.0);

        let dumped = board.dump().unwrap();
        assert!((dumped["accuracy"] - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(board.len("accuracy"), 0);
        assert!(board.dump().is_none());
    }
}
