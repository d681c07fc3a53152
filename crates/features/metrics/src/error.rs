use std::borrow::Cow;

#[vtl_derive::vtl_error]
pub enum MetricsError {
    /// Predictions and labels disagree in length.
    #[error("Shape mismatch in {what}: {left} predictions vs {right} labels")]
    ShapeMismatch { what: &'static str, left: usize, right: usize },

    #[error("No samples to score in {what}")]
    Empty { what: &'static str },

    #[error("Failed to read predictions{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Malformed prediction record{}: {source}", format_context(.context))]
    Json { source: serde_json::Error, context: Option<Cow<'static, str>> },
}
