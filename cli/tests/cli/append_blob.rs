use crate::utils::*;
use std::fs;

/// Precondition: The archive does not exist.
/// Action: Run `slipit append-blob` with `--data` and two names.
/// Expectation: Both entries exist with the given content size.
#[test]
fn append_blob_data() {
    let path = archive_path("append_blob_data", "archive.tar.bz2");
    run([
        "append-blob",
        path_str(&path),
        "--data",
        "root:x:0:0::/root:/bin/bash",
        "../../etc/passwd",
        "../../../etc/passwd",
    ])
    .unwrap();
    let entries = provider_of(&path).entries(&path).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "../../etc/passwd");
    assert_eq!(entries[1].name, "../../../etc/passwd");
    assert!(entries.iter().all(|e| e.size == 27));
}

/// Precondition: A file holding the blob content.
/// Action: Run `slipit append-blob` with `--data-file`.
/// Expectation: The entry has the file size.
#[test]
fn append_blob_data_file() {
    let content = archive_path("append_blob_data_file", "content.bin");
    fs::write(&content, [0u8; 1000]).unwrap();
    let path = archive_path("append_blob_data_file", "archive.zip");
    run([
        "append-blob",
        path_str(&path),
        "--data-file",
        path_str(&content),
        "../blob",
    ])
    .unwrap();
    let entries = provider_of(&path).entries(&path).unwrap();
    assert_eq!(entries[0].size, 1000);
}

/// Precondition: None.
/// Action: Run `slipit append-blob` without content or without names.
/// Expectation: Argument parsing fails.
#[test]
fn append_blob_requires_content_and_names() {
    let path = archive_path("append_blob_requires_content_and_names", "archive.tar");
    assert!(run(["append-blob", path_str(&path), "../x"]).is_err());
    assert!(run(["append-blob", path_str(&path), "--data", "x"]).is_err());
    assert!(!path.exists());
}
