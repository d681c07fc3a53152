use std::fs;
use std::time::Duration;
use tempfile::tempdir;
use vtl_logger::{Logger, Rotation};

#[test]
fn file_logging_writes_named_log_file() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let logger = Logger::builder()
        .name("launch")
        .console(false)
        .path(&log_dir)
        .rotation(Rotation::NEVER)
        .init()?;
    assert!(logger.has_file());

    tracing::info!(world_size = 2, nproc_per_node = 4, "resolved topology");

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = log_dir.join("launch.log");
    let contents = fs::read_to_string(&log_file)?;
    assert!(contents.contains("resolved topology"), "log line should be flushed: {contents}");
    assert!(contents.contains("world_size=2"));

    Ok(())
}
