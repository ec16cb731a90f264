use crate::utils::*;
use libslipit::EntryKind;

/// Precondition: The archive does not exist.
/// Action: Run `slipit append-symlink` on a gzip tar.
/// Expectation: Symlink entries with the target are stored.
#[test]
fn append_symlink_tar_gz() {
    let path = archive_path("append_symlink_tar_gz", "archive.tgz");
    run([
        "append-symlink",
        path_str(&path),
        "/etc/shadow",
        "link",
        "../link",
    ])
    .unwrap();
    let entries = provider_of(&path).entries(&path).unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.kind == EntryKind::Symlink));
    assert!(
        entries
            .iter()
            .all(|e| e.link_target.as_deref() == Some("/etc/shadow"))
    );
}

/// Precondition: The archive does not exist.
/// Action: Run `slipit append-symlink` on a zip archive.
/// Expectation: The command fails because zip has no symlink entries.
#[test]
fn append_symlink_zip_is_unsupported() {
    let path = archive_path("append_symlink_zip_is_unsupported", "archive.zip");
    let err = run(["append-symlink", path_str(&path), "/etc/shadow", "../link"]).unwrap_err();
    assert!(format!("{err:#}").contains("zip archives do not support symlink entries"));
}
