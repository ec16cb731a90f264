use crate::utils::*;
use std::fs;

fn source_file(test_name: &str) -> std::path::PathBuf {
    let path = archive_path(test_name, "evil.sh");
    fs::write(&path, "#!/bin/sh\necho pwned\n").unwrap();
    path
}

/// Precondition: The archive does not exist.
/// Action: Run `slipit append` without names.
/// Expectation: The archive is created with one entry at the default depth.
#[test]
fn append_generates_default_name() {
    let source = source_file("append_generates_default_name");
    let path = archive_path("append_generates_default_name", "archive.tar");
    run(["append", path_str(&path), path_str(&source)]).unwrap();
    assert_eq!(entry_names(&path), ["../../../../../../evil.sh"]);
}

/// Precondition: The archive does not exist.
/// Action: Run `slipit append` with payload options.
/// Expectation: One entry per depth with the prefix and separator applied.
#[test]
fn append_with_payload_options() {
    let source = source_file("append_with_payload_options");
    let path = archive_path("append_with_payload_options", "archive.zip");
    run([
        "append",
        path_str(&path),
        path_str(&source),
        "--depth",
        "3",
        "--increment",
        "--separator",
        "\\",
        "--prefix",
        "www/",
    ])
    .unwrap();
    assert_eq!(
        entry_names(&path),
        ["www/..\\evil.sh", "www/..\\..\\evil.sh", "www/..\\..\\..\\evil.sh"]
    );
}

/// Precondition: An archive with one entry exists.
/// Action: Run `slipit append` with explicit names.
/// Expectation: The names are used verbatim after the existing entry.
#[test]
fn append_explicit_names_to_existing_archive() {
    let source = source_file("append_explicit_names_to_existing_archive");
    let path = archive_path("append_explicit_names_to_existing_archive", "archive.tar.gz");
    run(["append-blob", path_str(&path), "--data", "x", "first"]).unwrap();
    run([
        "append",
        path_str(&path),
        path_str(&source),
        "../a/evil.sh",
        "/tmp/evil.sh",
    ])
    .unwrap();
    assert_eq!(entry_names(&path), ["first", "../a/evil.sh", "/tmp/evil.sh"]);
}

/// Precondition: The source file does not exist.
/// Action: Run `slipit append`.
/// Expectation: The command fails.
#[test]
fn append_missing_source() {
    let path = archive_path("append_missing_source", "archive.tar");
    let missing = archive_path("append_missing_source", "missing.txt");
    assert!(run(["append", path_str(&path), path_str(&missing)]).is_err());
}
