use clap::Parser;
use libslipit::{ProviderType, Registry};
use slipit::cli;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Returns a fresh path under the cargo test directory, removing leftovers of earlier runs.
pub fn archive_path(test_name: &str, file_name: &str) -> PathBuf {
    let dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join(test_name);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(file_name);
    if path.exists() {
        fs::remove_file(&path).unwrap();
    }
    path
}

/// Parses `args` as a `slipit` command line and executes it.
pub fn run<I, S>(args: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let args = ["slipit", "--quiet"]
        .into_iter()
        .map(String::from)
        .chain(args.into_iter().map(|s| s.as_ref().to_string()));
    cli::Cli::try_parse_from(args)?.execute()
}

pub fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

pub fn provider_of(path: &Path) -> ProviderType {
    Registry::default().lookup_path(path).unwrap()
}

pub fn entry_names(path: &Path) -> Vec<String> {
    entry_names_as(provider_of(path), path)
}

pub fn entry_names_as(provider: ProviderType, path: &Path) -> Vec<String> {
    provider
        .entries(path)
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect()
}
