use apiforge::publish::{publish, PublishOutcome};

#[test]
fn test_publish_writes_missing_destination() {
    let dir = tempfile::tempdir().unwrap();
    let staged = dir.path().join("staged/openapi.json");
    std::fs::create_dir_all(staged.parent().unwrap()).unwrap();
    std::fs::write(&staged, b"{\"openapi\":\"3.1.0\"}").unwrap();

    // Destination (and its parent directory) do not exist yet
    let dest = dir.path().join("api/openapi.json");
    let outcome = publish(&staged, &dest).unwrap();

    assert_eq!(outcome, PublishOutcome::Written);
    assert_eq!(
        std::fs::read(&dest).unwrap(),
        std::fs::read(&staged).unwrap()
    );
}

#[test]
fn test_publish_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let staged = dir.path().join("staged.json");
    let dest = dir.path().join("out/dest.json");
    std::fs::write(&staged, b"stable content").unwrap();

    assert_eq!(publish(&staged, &dest).unwrap(), PublishOutcome::Written);
    let mtime_after_write = std::fs::metadata(&dest).unwrap().modified().unwrap();

    // Second call with unchanged staged bytes must not mutate anything
    assert_eq!(publish(&staged, &dest).unwrap(), PublishOutcome::Unchanged);
    assert_eq!(
        std::fs::metadata(&dest).unwrap().modified().unwrap(),
        mtime_after_write,
        "unchanged publish must not touch the destination's mtime"
    );
    assert_eq!(std::fs::read(&dest).unwrap(), b"stable content");
}

#[test]
fn test_publish_overwrites_stale_destination() {
    let dir = tempfile::tempdir().unwrap();
    let staged = dir.path().join("staged.json");
    let dest = dir.path().join("dest.json");
    std::fs::write(&staged, b"new bytes").unwrap();
    std::fs::write(&dest, b"old bytes").unwrap();

    assert_eq!(publish(&staged, &dest).unwrap(), PublishOutcome::Written);
    assert_eq!(std::fs::read(&dest).unwrap(), b"new bytes");
}

#[test]
fn test_publish_missing_staged_file_still_attempts_copy() {
    // An unreadable staged file fingerprints as unique, so the publisher
    // tries to copy rather than silently skipping; the copy itself fails and
    // the error surfaces to the caller.
    let dir = tempfile::tempdir().unwrap();
    let staged = dir.path().join("never-generated.json");
    let dest = dir.path().join("dest.json");
    std::fs::write(&dest, b"existing").unwrap();

    let err = publish(&staged, &dest);
    assert!(err.is_err());
    // Failed copy must not have destroyed the destination
    assert_eq!(std::fs::read(&dest).unwrap(), b"existing");
}

#[test]
fn test_publish_leaves_no_temporaries_behind() {
    let dir = tempfile::tempdir().unwrap();
    let staged = dir.path().join("staged.json");
    let dest = dir.path().join("out/dest.json");
    std::fs::write(&staged, b"content").unwrap();

    publish(&staged, &dest).unwrap();

    let leftovers: Vec<_> = std::fs::read_dir(dest.parent().unwrap())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .filter(|n| n.to_string_lossy().contains("tmp"))
        .collect();
    assert!(leftovers.is_empty(), "found temporaries: {leftovers:?}");
}
