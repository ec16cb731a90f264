use super::{
    ArchiveProvider,
    tar::{TarProvider, read_entry_infos, read_records},
};
use crate::{
    compress::Compression,
    entry::EntryInfo,
    error::Result,
    io::{ArchiveHandle, ensure_archive_exists},
    registry::ProviderType,
    rewrite::{MatchCriterion, RewriteReport},
};
use std::{fs, io::Read, path::Path};

/// Provider for tar archives wrapped in gzip or bzip2.
///
/// A compressed stream cannot be appended to, so `open` decompresses the
/// existing entries and replays them into a fresh stream that replaces the
/// archive on [`close`](ArchiveProvider::close).
pub struct CompressedTarProvider {
    inner: TarProvider,
    compression: Compression,
}

impl CompressedTarProvider {
    pub fn create(path: &Path, compression: Compression) -> Result<Self> {
        Ok(Self {
            inner: TarProvider::with_handle(ArchiveHandle::create(path)?, Some(compression)),
            compression,
        })
    }

    pub fn open(path: &Path, compression: Compression) -> Result<Self> {
        ensure_archive_exists(path)?;
        let records = read_records(fs::File::open(path)?, Some(compression))?;
        let mut inner = TarProvider::with_handle(ArchiveHandle::staged(path)?, Some(compression));
        for record in &records {
            inner.append_record(record)?;
        }
        log::trace!(
            "replayed {} entries of '{}' into a new {compression} stream",
            records.len(),
            path.display()
        );
        Ok(Self { inner, compression })
    }

    #[inline]
    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn entries(path: &Path, compression: Compression) -> Result<Vec<EntryInfo>> {
        ensure_archive_exists(path)?;
        Self::entries_from(fs::File::open(path)?, compression)
    }

    #[inline]
    pub fn entries_from<R: Read>(reader: R, compression: Compression) -> Result<Vec<EntryInfo>> {
        read_entry_infos(reader, Some(compression))
    }

    #[inline]
    pub fn rewrite(
        path: &Path,
        compression: Compression,
        criterion: &MatchCriterion,
    ) -> Result<RewriteReport> {
        TarProvider::rewrite_with(path, Some(compression), criterion)
    }
}

impl ArchiveProvider for CompressedTarProvider {
    #[inline]
    fn provider_type(&self) -> ProviderType {
        ProviderType::CompressedTar(self.compression)
    }

    #[inline]
    fn append_file(&mut self, source: &Path, archived_name: &str) -> Result<()> {
        self.inner.append_file(source, archived_name)
    }

    #[inline]
    fn append_blob(&mut self, blob: &[u8], archived_name: &str) -> Result<()> {
        self.inner.append_blob(blob, archived_name)
    }

    #[inline]
    fn append_symlink(&mut self, target: &str, archived_name: &str) -> Result<()> {
        self.inner.append_symlink(target, archived_name)
    }

    #[inline]
    fn close(self) -> Result<()> {
        self.inner.close()
    }
}
