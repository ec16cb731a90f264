use crate::utils::*;

/// Precondition: The archive does not exist.
/// Action: Run `slipit create` for every registered extension family.
/// Expectation: An empty, readable archive is created.
#[test]
fn create_empty_archive() {
    for file_name in ["empty.tar", "empty.tgz", "empty.tar.bz2", "empty.docx"] {
        let path = archive_path("create_empty_archive", file_name);
        run(["create", path_str(&path)]).unwrap();
        assert!(path.exists(), "{file_name}");
        assert!(entry_names(&path).is_empty(), "{file_name}");
    }
}

/// Precondition: An archive with entries exists.
/// Action: Run `slipit create` on it.
/// Expectation: The archive is truncated.
#[test]
fn create_truncates() {
    let path = archive_path("create_truncates", "archive.zip");
    run(["append-blob", path_str(&path), "--data", "x", "../x"]).unwrap();
    run(["create", path_str(&path)]).unwrap();
    assert!(entry_names(&path).is_empty());
}

/// Precondition: The archive has an unregistered extension.
/// Action: Run `slipit create` with and without `--format`.
/// Expectation: Fails without a format and succeeds with one.
#[test]
fn create_unknown_extension() {
    let path = archive_path("create_unknown_extension", "archive.bin");
    let err = run(["create", path_str(&path)]).unwrap_err();
    assert!(err.to_string().contains("cannot determine the archive format"));
    assert!(!path.exists());

    run(["--format", "tar-gz", "create", path_str(&path)]).unwrap();
    assert!(path.exists());
}
