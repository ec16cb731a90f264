//! A library for building and rewriting archives that contain path traversal entries.
//!
//! Archives are handled through one capability interface, [`ArchiveProvider`],
//! with providers for plain tar, gzip or bzip2 compressed tar, and zip. A
//! [`Registry`] resolves the provider for a file extension or MIME type.
//!
//! Entry names are stored exactly as given: `../../etc/passwd` is written as
//! is, which is what makes the produced archives useful for testing whether an
//! extractor guards against zip slip.
//!
//! ```no_run
//! use libslipit::{ArchiveProvider, Registry, TraversalPayload};
//!
//! # fn main() -> libslipit::Result<()> {
//! let registry = Registry::default();
//! let provider = registry.lookup_path("evil.tar.gz").expect("registered");
//! let mut archive = provider.create("evil.tar.gz")?;
//! archive.append_blobs(b"pwned\n", TraversalPayload::new(3).names("tmp/pwned"))?;
//! archive.close()?;
//!
//! provider.clear_archive("evil.tar.gz", "../")?;
//! # Ok(())
//! # }
//! ```
pub(crate) mod compress;
pub(crate) mod entry;
pub(crate) mod error;
pub(crate) mod io;
pub(crate) mod payload;
pub(crate) mod provider;
pub(crate) mod registry;
pub(crate) mod rewrite;

pub use compress::Compression;
pub use entry::{EntryInfo, EntryKind};
pub use error::{Error, Result};
pub use payload::TraversalPayload;
pub use provider::{Archive, ArchiveProvider, CompressedTarProvider, TarProvider, ZipProvider};
pub use registry::{KeySpace, ProviderType, Registry};
pub use rewrite::{MatchCriterion, RewriteReport};
