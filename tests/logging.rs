#[test]
fn tracing_installs_once_and_writes_to_log_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log_dir = dir.path().join("logs");

    story_arcs::init_tracing(&log_dir, "debug").expect("first init");
    assert!(log_dir.is_dir());
    assert!(story_arcs::init_tracing(&log_dir, "debug").is_err());

    tracing::info!(component = "test", "logging initialised");
}
