use std::borrow::Cow;
use vtl_derive::vtl_error;

#[vtl_error]
pub enum ReadError {
    #[error("Failed to read{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("No samples to score in {what}")]
    Empty { what: &'static str },
}

fn read() -> Result<String, ReadError> {
    let text = std::fs::read_to_string("/definitely/absent").context("predictions.jsonl")?;
    Ok(text)
}

fn main() {
    let err = read().err().map(|e| e.to_string()).unwrap_or_default();
    assert!(err.starts_with("Failed to read (predictions.jsonl): "));

    let empty = ReadError::Empty { what: "labels" };
    assert_eq!(empty.to_string(), "No samples to score in labels");
}
