use super::ArchiveProvider;
use crate::{
    compress::{Compression, CompressionWriter, DecompressReader},
    entry::{EntryInfo, EntryKind},
    error::Result,
    io::{ArchiveHandle, ensure_archive_exists},
    registry::ProviderType,
    rewrite::{MatchCriterion, RewriteReport},
};
use chrono::DateTime;
use std::{
    fs,
    io::{self, Read, Seek, SeekFrom},
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};
use tar::{Builder, EntryType, Header};

const BLOCK_SIZE: u64 = 512;
const NAME_LEN: usize = 100;
const LINK_NAME_LEN: usize = 100;
const LONG_LINK_NAME: &[u8] = b"././@LongLink";
const PAX_HEADER_NAME: &[u8] = b"././@PaxHeader";

/// Provider for plain tar archives.
///
/// Entry names are written byte for byte. Names longer than the header field
/// are carried in GNU long name records instead of being split into a ustar
/// prefix, so `..` components survive unchanged.
pub struct TarProvider {
    builder: Builder<CompressionWriter<ArchiveHandle>>,
    compression: Option<Compression>,
}

impl TarProvider {
    /// Creates an empty tar archive at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self::with_handle(ArchiveHandle::create(path)?, None))
    }

    /// Opens the tar archive at `path` and positions writes after its last entry.
    pub fn open(path: &Path) -> Result<Self> {
        ensure_archive_exists(path)?;
        let mut file = fs::File::options().read(true).write(true).open(path)?;
        let end = end_of_entries(&file)?;
        log::trace!("appending to '{}' at offset {end}", path.display());
        file.set_len(end)?;
        file.seek(SeekFrom::Start(end))?;
        Ok(Self::with_handle(ArchiveHandle::Direct(file), None))
    }

    pub(crate) fn with_handle(handle: ArchiveHandle, compression: Option<Compression>) -> Self {
        Self {
            builder: Builder::new(CompressionWriter::new(handle, compression)),
            compression,
        }
    }

    /// Reads the entries of the tar archive at `path`.
    pub fn entries(path: &Path) -> Result<Vec<EntryInfo>> {
        ensure_archive_exists(path)?;
        Self::entries_from(fs::File::open(path)?)
    }

    /// Reads the entries of an uncompressed tar stream.
    #[inline]
    pub fn entries_from<R: Read>(reader: R) -> Result<Vec<EntryInfo>> {
        read_entry_infos(reader, None)
    }

    /// Rewrites the archive at `path` without the entries matching `criterion`.
    #[inline]
    pub fn rewrite(path: &Path, criterion: &MatchCriterion) -> Result<RewriteReport> {
        Self::rewrite_with(path, None, criterion)
    }

    pub(crate) fn rewrite_with(
        path: &Path,
        compression: Option<Compression>,
        criterion: &MatchCriterion,
    ) -> Result<RewriteReport> {
        ensure_archive_exists(path)?;
        let records = read_records(fs::File::open(path)?, compression)?;
        let mut archive = Self::with_handle(ArchiveHandle::staged(path)?, compression);
        let mut report = RewriteReport::default();
        for record in &records {
            if report.keep(criterion, &record.name_lossy()) {
                archive.append_record(record)?;
            }
        }
        archive.close()?;
        Ok(report)
    }

    pub(crate) fn append_record(&mut self, record: &TarRecord) -> Result<()> {
        if !record.pax.is_empty() {
            append_pax_header(&mut self.builder, &record.pax)?;
        }
        let mut header = record.header.clone();
        append_entry(
            &mut self.builder,
            &mut header,
            &record.name,
            record.link_name.as_deref(),
            record.data.as_slice(),
        )?;
        Ok(())
    }
}

impl ArchiveProvider for TarProvider {
    #[inline]
    fn provider_type(&self) -> ProviderType {
        match self.compression {
            Some(c) => ProviderType::CompressedTar(c),
            None => ProviderType::Tar,
        }
    }

    fn append_file(&mut self, source: &Path, archived_name: &str) -> Result<()> {
        let meta = fs::symlink_metadata(source)?;
        let mut header = Header::new_gnu();
        header.set_metadata(&meta);
        let file_type = meta.file_type();
        if file_type.is_symlink() {
            let target = fs::read_link(source)?;
            append_entry(
                &mut self.builder,
                &mut header,
                archived_name.as_bytes(),
                Some(target.as_os_str().as_encoded_bytes()),
                io::empty(),
            )?;
        } else if file_type.is_file() {
            let data = fs::read(source)?;
            header.set_size(data.len() as u64);
            append_entry(
                &mut self.builder,
                &mut header,
                archived_name.as_bytes(),
                None,
                data.as_slice(),
            )?;
        } else {
            header.set_size(0);
            append_entry(
                &mut self.builder,
                &mut header,
                archived_name.as_bytes(),
                None,
                io::empty(),
            )?;
        }
        log::debug!("added '{}' as '{archived_name}'", source.display());
        Ok(())
    }

    fn append_blob(&mut self, blob: &[u8], archived_name: &str) -> Result<()> {
        let mut header = fresh_header(EntryType::Regular, 0o644);
        header.set_size(blob.len() as u64);
        append_entry(
            &mut self.builder,
            &mut header,
            archived_name.as_bytes(),
            None,
            blob,
        )?;
        log::debug!("added {} byte blob as '{archived_name}'", blob.len());
        Ok(())
    }

    fn append_symlink(&mut self, target: &str, archived_name: &str) -> Result<()> {
        let mut header = fresh_header(EntryType::Symlink, 0o777);
        append_entry(
            &mut self.builder,
            &mut header,
            archived_name.as_bytes(),
            Some(target.as_bytes()),
            io::empty(),
        )?;
        log::debug!("added symlink '{archived_name}' -> '{target}'");
        Ok(())
    }

    fn close(self) -> Result<()> {
        let writer = self.builder.into_inner()?;
        writer.finish()?.commit()?;
        Ok(())
    }
}

/// A fully buffered tar entry, ready to be written again.
pub(crate) struct TarRecord {
    header: Header,
    name: Vec<u8>,
    link_name: Option<Vec<u8>>,
    /// Local pax extended header records, in stored order.
    pax: Vec<(Vec<u8>, Vec<u8>)>,
    data: Vec<u8>,
}

impl TarRecord {
    #[inline]
    fn name_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }
}

/// Reads every entry of a tar stream into memory.
///
/// Long names and pax paths are resolved into [`TarRecord::name`]. Sparse
/// entries are expanded into regular files. Other pax records are kept as
/// they were, except the ones describing size and sparse layout.
pub(crate) fn read_records<R: Read>(
    reader: R,
    compression: Option<Compression>,
) -> io::Result<Vec<TarRecord>> {
    let mut archive = tar::Archive::new(DecompressReader::new(reader, compression));
    let mut records = Vec::new();
    for entry in archive.entries()? {
        let mut entry = entry?;
        let mut header = entry.header().clone();
        let name = entry.path_bytes().into_owned();
        let link_name = entry.link_name_bytes().map(|l| l.into_owned());
        let mut pax = Vec::new();
        let local_pax = !header.entry_type().is_pax_global_extensions();
        if let Some(extensions) = entry.pax_extensions()?.filter(|_| local_pax) {
            for extension in extensions {
                let extension = extension?;
                let key = extension.key_bytes();
                if key != b"size" && !key.starts_with(b"GNU.sparse.") {
                    pax.push((key.to_vec(), extension.value_bytes().to_vec()));
                }
            }
        }
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        if header.entry_type().is_gnu_sparse() {
            header.set_entry_type(EntryType::Regular);
        }
        header.set_size(data.len() as u64);
        records.push(TarRecord {
            header,
            name,
            link_name,
            pax,
            data,
        });
    }
    Ok(records)
}

pub(crate) fn read_entry_infos<R: Read>(
    reader: R,
    compression: Option<Compression>,
) -> Result<Vec<EntryInfo>> {
    let mut archive = tar::Archive::new(DecompressReader::new(reader, compression));
    let mut entries = Vec::new();
    for entry in archive.entries()? {
        let entry = entry?;
        let header = entry.header();
        let kind = match header.entry_type() {
            EntryType::Regular | EntryType::Continuous | EntryType::GNUSparse => EntryKind::File,
            EntryType::Symlink => EntryKind::Symlink,
            EntryType::Directory => EntryKind::Directory,
            _ => EntryKind::Other,
        };
        let mut info = EntryInfo::new(
            String::from_utf8_lossy(&entry.path_bytes()),
            kind,
            entry.size(),
        );
        info.link_target = entry
            .link_name_bytes()
            .map(|l| String::from_utf8_lossy(&l).into_owned());
        info.mode = header.mode().ok();
        info.modified = header
            .mtime()
            .ok()
            .and_then(|t| DateTime::from_timestamp(i64::try_from(t).ok()?, 0));
        entries.push(info);
    }
    Ok(entries)
}

/// Returns the offset just past the data of the last entry.
fn end_of_entries<R: Read>(reader: R) -> io::Result<u64> {
    let mut archive = tar::Archive::new(reader);
    let mut end = 0;
    for entry in archive.entries()? {
        let entry = entry?;
        let size = entry.header().entry_size()?;
        end = entry.raw_file_position() + size.div_ceil(BLOCK_SIZE) * BLOCK_SIZE;
    }
    Ok(end)
}

fn fresh_header(entry_type: EntryType, mode: u32) -> Header {
    let mut header = Header::new_gnu();
    header.set_entry_type(entry_type);
    header.set_mode(mode);
    header.set_uid(0);
    header.set_gid(0);
    header.set_size(0);
    header.set_mtime(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs()),
    );
    header
}

/// Writes `header` under the raw `name`, emitting GNU long records for
/// values that do not fit their header fields.
fn append_entry<W: io::Write, R: Read>(
    builder: &mut Builder<W>,
    header: &mut Header,
    name: &[u8],
    link_name: Option<&[u8]>,
    data: R,
) -> io::Result<()> {
    if let Some(link_name) = link_name {
        if link_name.len() > LINK_NAME_LEN {
            append_long_record(builder, EntryType::GNULongLink, link_name)?;
        }
        copy_truncated(&mut header.as_old_mut().linkname, link_name);
    }
    if name.len() > NAME_LEN {
        append_long_record(builder, EntryType::GNULongName, name)?;
    }
    copy_truncated(&mut header.as_old_mut().name, name);
    if let Some(ustar) = header.as_ustar_mut() {
        ustar.prefix = [0; 155];
    }
    header.set_cksum();
    builder.append(header, data)
}

fn append_long_record<W: io::Write>(
    builder: &mut Builder<W>,
    entry_type: EntryType,
    value: &[u8],
) -> io::Result<()> {
    let mut header = Header::new_gnu();
    copy_truncated(&mut header.as_old_mut().name, LONG_LINK_NAME);
    header.set_entry_type(entry_type);
    header.set_mode(0o644);
    header.set_uid(0);
    header.set_gid(0);
    header.set_mtime(0);
    header.set_size(value.len() as u64 + 1);
    header.set_cksum();
    builder.append(&header, value.chain(&[0u8][..]))
}

/// Writes a local pax extended header holding `records`.
fn append_pax_header<W: io::Write>(
    builder: &mut Builder<W>,
    records: &[(Vec<u8>, Vec<u8>)],
) -> io::Result<()> {
    let mut data = Vec::new();
    for (key, value) in records {
        // "<len> <key>=<value>\n", where <len> counts its own digits
        let body = key.len() + value.len() + 3;
        let mut len = body + 1;
        while body + len.to_string().len() != len {
            len = body + len.to_string().len();
        }
        data.extend_from_slice(format!("{len} ").as_bytes());
        data.extend_from_slice(key);
        data.push(b'=');
        data.extend_from_slice(value);
        data.push(b'\n');
    }
    let mut header = Header::new_ustar();
    copy_truncated(&mut header.as_old_mut().name, PAX_HEADER_NAME);
    header.set_entry_type(EntryType::XHeader);
    header.set_mode(0o644);
    header.set_uid(0);
    header.set_gid(0);
    header.set_mtime(0);
    header.set_size(data.len() as u64);
    header.set_cksum();
    builder.append(&header, data.as_slice())
}

#[inline]
fn copy_truncated(field: &mut [u8], value: &[u8]) {
    field.fill(0);
    let len = value.len().min(field.len());
    field[..len].copy_from_slice(&value[..len]);
}
