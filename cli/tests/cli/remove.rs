use crate::utils::*;

/// Precondition: An archive with `a.txt`, `a.txt.bak` and `dir/a.txt`.
/// Action: Run `slipit remove` with `*.txt`.
/// Expectation: Only `a.txt` is removed.
#[test]
fn remove_glob() {
    let path = archive_path("remove_glob", "archive.tar.gz");
    run([
        "append-blob",
        path_str(&path),
        "--data",
        "x",
        "a.txt",
        "a.txt.bak",
        "dir/a.txt",
    ])
    .unwrap();
    run(["remove", path_str(&path), "*.txt"]).unwrap();
    assert_eq!(entry_names(&path), ["a.txt.bak", "dir/a.txt"]);
}

/// Precondition: An archive exists.
/// Action: Run `slipit remove` with an invalid glob.
/// Expectation: The command fails and the archive keeps its entries.
#[test]
fn remove_invalid_glob() {
    let path = archive_path("remove_invalid_glob", "archive.zip");
    run(["append-blob", path_str(&path), "--data", "x", "../x"]).unwrap();
    assert!(run(["remove", path_str(&path), "[x"]).is_err());
    assert_eq!(entry_names(&path), ["../x"]);
}
