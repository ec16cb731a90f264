//! Builds an archive with traversal entries at every depth up to 4 and lists it.
//!
//! ```sh
//! cargo run --example traversal_archive -- out.tar.gz
//! ```
use libslipit::{ArchiveProvider, Registry, TraversalPayload};
use std::{env, io, path::PathBuf};

fn main() -> libslipit::Result<()> {
    let path = env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("traversal.tar"));
    let Some(provider) = Registry::default().lookup_path(&path) else {
        eprintln!("unsupported archive extension: {}", path.display());
        return Ok(());
    };

    let payload = TraversalPayload::new(4).increment(true);
    let mut archive = provider.create(&path)?;
    archive.append_blobs(b"slipped\n", payload.names("tmp/slipit.txt"))?;
    archive.close()?;

    provider.list_archive(&path, io::stdout().lock())
}
