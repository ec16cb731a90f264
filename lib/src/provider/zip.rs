mod directory;

use self::directory::CentralDirectory;
use super::ArchiveProvider;
use crate::{
    entry::{EntryInfo, EntryKind},
    error::{Error, Result},
    io::{ArchiveHandle, ensure_archive_exists},
    registry::ProviderType,
    rewrite::{MatchCriterion, RewriteReport},
};
use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Timelike, Utc};
use flate2::read::DeflateDecoder;
use std::{
    fs,
    io::{self, Cursor, Read, Seek, SeekFrom, Write},
    path::Path,
};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

const METHOD_STORED: u16 = 0;
const METHOD_DEFLATED: u16 = 8;

/// Provider for zip and zip based containers.
///
/// The central directory is kept record by record, so entries sharing a name
/// are written, listed and rewritten individually. Symlink entries are not
/// supported.
pub struct ZipProvider {
    handle: ArchiveHandle,
    directory: CentralDirectory,
}

impl ZipProvider {
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self {
            handle: ArchiveHandle::create(path)?,
            directory: CentralDirectory::default(),
        })
    }

    /// Opens the zip archive at `path` and positions writes over its central
    /// directory, which is written again on [`close`](ArchiveProvider::close).
    pub fn open(path: &Path) -> Result<Self> {
        ensure_archive_exists(path)?;
        let mut file = fs::File::options().read(true).write(true).open(path)?;
        let directory = CentralDirectory::read(&mut file)?;
        log::trace!(
            "appending to '{}' at offset {}",
            path.display(),
            directory.offset
        );
        file.set_len(directory.offset)?;
        file.seek(SeekFrom::Start(directory.offset))?;
        Ok(Self {
            handle: ArchiveHandle::Direct(file),
            directory,
        })
    }

    pub fn entries(path: &Path) -> Result<Vec<EntryInfo>> {
        ensure_archive_exists(path)?;
        Self::entries_from(fs::File::open(path)?)
    }

    pub fn entries_from<R: Read + Seek>(mut reader: R) -> Result<Vec<EntryInfo>> {
        let directory = CentralDirectory::read(&mut reader)?;
        let mut entries = Vec::with_capacity(directory.records.len());
        for record in &directory.records {
            let kind = if record.is_dir() {
                EntryKind::Directory
            } else if record.is_symlink() {
                EntryKind::Symlink
            } else {
                EntryKind::File
            };
            let mut info = EntryInfo::new(record.name(), kind, record.size());
            info.mode = record.unix_mode();
            info.modified = zip::DateTime::try_from_msdos(record.dos_date(), record.dos_time())
                .ok()
                .and_then(to_chrono);
            if kind == EntryKind::Symlink {
                let data_offset = record.data_offset(&mut reader)?;
                reader.seek(SeekFrom::Start(data_offset))?;
                let mut stored = (&mut reader).take(record.compressed_size());
                let mut target = Vec::new();
                match record.method() {
                    METHOD_STORED => {
                        stored.read_to_end(&mut target)?;
                    }
                    METHOD_DEFLATED => {
                        DeflateDecoder::new(stored).read_to_end(&mut target)?;
                    }
                    method => log::debug!(
                        "not decoding symlink target of '{}': compression method {method}",
                        record.name()
                    ),
                }
                if !target.is_empty() {
                    info.link_target = Some(String::from_utf8_lossy(&target).into_owned());
                }
            }
            entries.push(info);
        }
        Ok(entries)
    }

    /// Rewrites the archive at `path` without the entries matching `criterion`.
    ///
    /// Kept entries are copied byte for byte, without recompression.
    pub fn rewrite(path: &Path, criterion: &MatchCriterion) -> Result<RewriteReport> {
        ensure_archive_exists(path)?;
        let mut source = fs::File::open(path)?;
        let directory = CentralDirectory::read(&mut source)?;
        let mut handle = ArchiveHandle::staged(path)?;
        let mut kept = CentralDirectory {
            comment: directory.comment,
            ..Default::default()
        };
        let mut report = RewriteReport::default();
        for mut record in directory.records {
            if !report.keep(criterion, &record.name()) {
                continue;
            }
            let span = record.local_span(&mut source)?;
            source.seek(SeekFrom::Start(record.local_offset()))?;
            let copied = io::copy(&mut (&mut source).take(span), &mut handle)?;
            if copied != span {
                return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
            }
            record.relocate(kept.offset)?;
            kept.offset += span;
            kept.records.push(record);
        }
        kept.write(&mut handle)?;
        handle.commit()?;
        Ok(report)
    }

    /// Writes one entry built by `build` after the entries already present.
    ///
    /// The entry is encoded by [`ZipWriter`] in memory, then its local record is
    /// copied into the archive and its central record appended to the directory.
    fn append_with(
        &mut self,
        name: &str,
        build: impl FnOnce(&mut ZipWriter<Cursor<Vec<u8>>>) -> zip::result::ZipResult<()>,
    ) -> Result<()> {
        if self.directory.contains(name.as_bytes()) {
            log::warn!("zip archive already contains '{name}', adding another entry with this name");
        }
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        build(&mut writer)?;
        let mut encoded = writer.finish()?;
        let mut record = CentralDirectory::read(&mut encoded)?
            .records
            .pop()
            .ok_or(Error::Zip(zip::result::ZipError::FileNotFound))?;
        let span = record.local_span(&mut encoded)?;
        encoded.seek(SeekFrom::Start(record.local_offset()))?;
        io::copy(&mut encoded.take(span), &mut self.handle)?;
        record.relocate(self.directory.offset)?;
        self.directory.offset += span;
        self.directory.records.push(record);
        Ok(())
    }
}

impl ArchiveProvider for ZipProvider {
    #[inline]
    fn provider_type(&self) -> ProviderType {
        ProviderType::Zip
    }

    fn append_file(&mut self, source: &Path, archived_name: &str) -> Result<()> {
        let meta = fs::metadata(source)?;
        let mut options = SimpleFileOptions::default();
        if let Some(modified) = meta.modified().ok().and_then(from_system_time) {
            options = options.last_modified_time(modified);
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            options = options.unix_permissions(meta.permissions().mode());
        }
        if meta.is_dir() {
            let name = if archived_name.ends_with('/') {
                archived_name.to_owned()
            } else {
                format!("{archived_name}/")
            };
            self.append_with(&name, |w| w.add_directory(name.as_str(), options))?;
        } else {
            let data = fs::read(source)?;
            self.append_with(archived_name, |w| {
                w.start_file(
                    archived_name,
                    options.compression_method(CompressionMethod::Deflated),
                )?;
                w.write_all(&data).map_err(Into::into)
            })?;
        }
        log::debug!("added '{}' as '{archived_name}'", source.display());
        Ok(())
    }

    fn append_blob(&mut self, blob: &[u8], archived_name: &str) -> Result<()> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);
        self.append_with(archived_name, |w| {
            w.start_file(archived_name, options)?;
            w.write_all(blob).map_err(Into::into)
        })?;
        log::debug!("added {} byte blob as '{archived_name}'", blob.len());
        Ok(())
    }

    fn append_symlink(&mut self, _target: &str, _archived_name: &str) -> Result<()> {
        Err(Error::UnsupportedCapability {
            provider: ProviderType::Zip,
            capability: "symlink entries",
        })
    }

    fn close(mut self) -> Result<()> {
        self.directory.write(&mut self.handle)?;
        self.handle.commit()?;
        Ok(())
    }
}

fn from_system_time(time: std::time::SystemTime) -> Option<zip::DateTime> {
    let local = DateTime::<Local>::from(time);
    zip::DateTime::from_date_and_time(
        u16::try_from(local.year()).ok()?,
        local.month() as u8,
        local.day() as u8,
        local.hour() as u8,
        local.minute() as u8,
        local.second() as u8,
    )
    .ok()
}

fn to_chrono(time: zip::DateTime) -> Option<DateTime<Utc>> {
    let naive = NaiveDate::from_ymd_opt(
        i32::from(time.year()),
        u32::from(time.month()),
        u32::from(time.day()),
    )?
    .and_hms_opt(
        u32::from(time.hour()),
        u32::from(time.minute()),
        u32::from(time.second()),
    )?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
}
