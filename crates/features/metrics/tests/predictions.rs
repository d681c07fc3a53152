use std::io::Write;
use tempfile::NamedTempFile;
use vtl_metrics::{MetricsError, read_predictions, score_predictions, similarity_scores};

fn write_lines(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(body.as_bytes()).unwrap();
    file
}

#[test]
fn reads_and_scores_jsonl() {
    let file = write_lines(concat!(
        "{\"prompt\": \"Is the video indoors?\", \"predict\": \"yes \", \"label\": \"yes\"}\n",
        "\n",
        "{\"predict\": \"no\", \"label\": \"yes\"}\n",
    ));

    let records = read_predictions(file.path()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].prompt.as_deref(), Some("Is the video indoors?"));
    assert!(records[1].prompt.is_none());

    let scores = score_predictions(&records).unwrap();
    assert!((scores.accuracy - 0.5).abs() < 1e-9);
}

#[test]
fn malformed_line_is_named() {
    let file = write_lines("{\"predict\": \"a\", \"label\": \"a\"}\n{\"predict\": 1}\n");

    let err = read_predictions(file.path()).unwrap_err();
    assert!(matches!(err, MetricsError::Json { .. }));
    assert!(err.to_string().contains("line 2"), "{err}");
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_predictions(dir.path().join("absent.jsonl")).unwrap_err();
    assert!(matches!(err, MetricsError::Io { context: Some(_), .. }));
}

#[test]
fn empty_file_cannot_be_scored() {
    let file = write_lines("");
    let records = read_predictions(file.path()).unwrap();
    assert!(matches!(score_predictions(&records), Err(MetricsError::Empty { .. })));
}

#[test]
fn similarity_covers_rouge_and_bleu() {
    let file = write_lines(concat!(
        "{\"predict\": \"a man is cooking\", \"label\": \"a man is cooking\"}\n",
        "{\"predict\": \"\", \"label\": \"a man is cooking\"}\n",
    ));

    let records = read_predictions(file.path()).unwrap();
    let scores = similarity_scores(&records).unwrap();

    assert_eq!(scores.keys().map(String::as_str).collect::<Vec<_>>(), ["bleu-4", "rouge-1", "rouge-2", "rouge-l"]);
    for (name, value) in &scores {
        assert!((value - 50.0).abs() < 1e-9, "{name} = {value}");
    }
}

#[test]
fn similarity_needs_records() {
    assert!(matches!(similarity_scores(&[]), Err(MetricsError::Empty { .. })));
}
