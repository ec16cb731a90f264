//! Archive capability interface and its format providers.
//!
//! Every provider normalizes one archive format behind [`ArchiveProvider`].
//! Registry driven callers go through [`ProviderType`], whose methods dispatch
//! to the concrete provider and hand back an [`Archive`].

mod compressed_tar;
mod tar;
mod zip;

pub use self::{compressed_tar::CompressedTarProvider, tar::TarProvider, zip::ZipProvider};
use crate::{
    entry::EntryInfo,
    error::{Error, Result},
    registry::ProviderType,
    rewrite::{MatchCriterion, RewriteReport},
};
use std::{
    fs,
    io::{Read, Seek, Write},
    path::Path,
};

/// Capabilities of an archive bound for writing.
///
/// Instances come from `open` (append to an existing archive) or `create`
/// (start an empty one) and must be finished with [`close`](Self::close).
/// Dropping an instance without closing it releases the file but may leave an
/// incomplete archive behind for providers that write in place.
pub trait ArchiveProvider {
    /// The format this instance writes.
    fn provider_type(&self) -> ProviderType;

    /// Copies the file at `source` into a new entry named `archived_name`.
    fn append_file(&mut self, source: &Path, archived_name: &str) -> Result<()>;

    /// Adds `blob` as a regular file entry named `archived_name`.
    fn append_blob(&mut self, blob: &[u8], archived_name: &str) -> Result<()>;

    /// Adds a symlink entry named `archived_name` pointing at `target`.
    fn append_symlink(&mut self, target: &str, archived_name: &str) -> Result<()> {
        let _ = (target, archived_name);
        Err(Error::Unimplemented {
            operation: "append_symlink",
        })
    }

    /// Appends `source` once per archived name, in order.
    ///
    /// Not atomic: on failure the entries appended so far stay in the archive.
    fn append_files<I, S>(&mut self, source: &Path, archived_names: I) -> Result<()>
    where
        Self: Sized,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in archived_names {
            self.append_file(source, name.as_ref())?;
        }
        Ok(())
    }

    /// Appends `blob` once per archived name, in order.
    fn append_blobs<I, S>(&mut self, blob: &[u8], archived_names: I) -> Result<()>
    where
        Self: Sized,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in archived_names {
            self.append_blob(blob, name.as_ref())?;
        }
        Ok(())
    }

    /// Appends a symlink to `target` once per archived name, in order.
    fn append_symlinks<I, S>(&mut self, target: &str, archived_names: I) -> Result<()>
    where
        Self: Sized,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in archived_names {
            self.append_symlink(target, name.as_ref())?;
        }
        Ok(())
    }

    /// Finalizes the archive and releases the underlying file.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// An archive of any registered format, bound for writing.
pub enum Archive {
    Tar(TarProvider),
    CompressedTar(CompressedTarProvider),
    Zip(ZipProvider),
}

impl ArchiveProvider for Archive {
    #[inline]
    fn provider_type(&self) -> ProviderType {
        match self {
            Self::Tar(a) => a.provider_type(),
            Self::CompressedTar(a) => a.provider_type(),
            Self::Zip(a) => a.provider_type(),
        }
    }

    #[inline]
    fn append_file(&mut self, source: &Path, archived_name: &str) -> Result<()> {
        match self {
            Self::Tar(a) => a.append_file(source, archived_name),
            Self::CompressedTar(a) => a.append_file(source, archived_name),
            Self::Zip(a) => a.append_file(source, archived_name),
        }
    }

    #[inline]
    fn append_blob(&mut self, blob: &[u8], archived_name: &str) -> Result<()> {
        match self {
            Self::Tar(a) => a.append_blob(blob, archived_name),
            Self::CompressedTar(a) => a.append_blob(blob, archived_name),
            Self::Zip(a) => a.append_blob(blob, archived_name),
        }
    }

    #[inline]
    fn append_symlink(&mut self, target: &str, archived_name: &str) -> Result<()> {
        match self {
            Self::Tar(a) => a.append_symlink(target, archived_name),
            Self::CompressedTar(a) => a.append_symlink(target, archived_name),
            Self::Zip(a) => a.append_symlink(target, archived_name),
        }
    }

    #[inline]
    fn close(self) -> Result<()> {
        match self {
            Self::Tar(a) => a.close(),
            Self::CompressedTar(a) => a.close(),
            Self::Zip(a) => a.close(),
        }
    }
}

impl ProviderType {
    /// Opens the existing archive at `path` for appending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `path` does not exist, for every format.
    pub fn open(self, path: impl AsRef<Path>) -> Result<Archive> {
        let path = path.as_ref();
        log::debug!("opening {self} archive '{}'", path.display());
        Ok(match self {
            Self::Tar => Archive::Tar(TarProvider::open(path)?),
            Self::CompressedTar(c) => Archive::CompressedTar(CompressedTarProvider::open(path, c)?),
            Self::Zip => Archive::Zip(ZipProvider::open(path)?),
        })
    }

    /// Creates an empty archive at `path`, truncating any existing file.
    pub fn create(self, path: impl AsRef<Path>) -> Result<Archive> {
        let path = path.as_ref();
        log::debug!("creating {self} archive '{}'", path.display());
        Ok(match self {
            Self::Tar => Archive::Tar(TarProvider::create(path)?),
            Self::CompressedTar(c) => {
                Archive::CompressedTar(CompressedTarProvider::create(path, c)?)
            }
            Self::Zip => Archive::Zip(ZipProvider::create(path)?),
        })
    }

    /// Reads the entries of the archive at `path`.
    pub fn entries(self, path: impl AsRef<Path>) -> Result<Vec<EntryInfo>> {
        let path = path.as_ref();
        crate::io::ensure_archive_exists(path)?;
        self.entries_from(fs::File::open(path)?)
    }

    /// Reads the entries of an archive held in `reader`.
    pub fn entries_from<R: Read + Seek>(self, reader: R) -> Result<Vec<EntryInfo>> {
        match self {
            Self::Tar => TarProvider::entries_from(reader),
            Self::CompressedTar(c) => CompressedTarProvider::entries_from(reader, c),
            Self::Zip => ZipProvider::entries_from(reader),
        }
    }

    /// Writes one listing line per entry of the archive at `path` to `out`.
    pub fn list_archive<W: Write>(self, path: impl AsRef<Path>, mut out: W) -> Result<()> {
        for entry in self.entries(path)? {
            writeln!(out, "{entry}")?;
        }
        out.flush().map_err(Error::from)
    }

    /// Removes every entry whose full name matches the glob `pattern`.
    pub fn remove_files(self, path: impl AsRef<Path>, pattern: &str) -> Result<RewriteReport> {
        self.rewrite(path, &MatchCriterion::glob(pattern)?)
    }

    /// Removes every entry whose name contains `payload`.
    pub fn clear_archive(self, path: impl AsRef<Path>, payload: &str) -> Result<RewriteReport> {
        self.rewrite(path, &MatchCriterion::substring(payload))
    }

    /// Rewrites the archive at `path` without the entries matching `criterion`.
    ///
    /// The archive is replaced atomically: on error it is left untouched.
    pub fn rewrite(
        self,
        path: impl AsRef<Path>,
        criterion: &MatchCriterion,
    ) -> Result<RewriteReport> {
        let path = path.as_ref();
        let report = match self {
            Self::Tar => TarProvider::rewrite(path, criterion),
            Self::CompressedTar(c) => CompressedTarProvider::rewrite(path, c, criterion),
            Self::Zip => ZipProvider::rewrite(path, criterion),
        }?;
        log::info!(
            "rewrote '{}': kept {}, removed {}",
            path.display(),
            report.kept,
            report.removed
        );
        Ok(report)
    }
}
