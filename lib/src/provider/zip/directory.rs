//! Central directory records of a zip archive.
//!
//! Layout: `[local header][data][descriptor]... [central directory][zip64 end][locator][end]`.
//! Records are kept in directory order and never keyed by name, so entries
//! sharing a name survive reading and rewriting.

use crate::error::{Error, Result};
use std::{
    borrow::Cow,
    io::{self, Read, Seek, SeekFrom, Write},
};
use zip::result::ZipError;

const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;
const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;
const END_SIGNATURE: u32 = 0x0605_4b50;
const ZIP64_END_SIGNATURE: u32 = 0x0606_4b50;
const ZIP64_LOCATOR_SIGNATURE: u32 = 0x0706_4b50;
const DATA_DESCRIPTOR_SIGNATURE: u32 = 0x0807_4b50;

const LOCAL_HEADER_LEN: u64 = 30;
const CENTRAL_HEADER_LEN: usize = 46;
const END_LEN: usize = 22;
const ZIP64_END_LEN: usize = 56;
const ZIP64_LOCATOR_LEN: usize = 20;
const MAX_COMMENT_LEN: usize = u16::MAX as usize;

const ZIP64_EXTRA_ID: u16 = 0x0001;
const FLAG_DATA_DESCRIPTOR: u16 = 1 << 3;
const ZIP64_VERSION: u16 = 45;

const HOST_DOS: u8 = 0;
const HOST_UNIX: u8 = 3;
const S_IFMT: u32 = 0o170_000;
const S_IFREG: u32 = 0o100_000;
const S_IFDIR: u32 = 0o040_000;
const S_IFLNK: u32 = 0o120_000;

#[inline]
fn invalid(message: &'static str) -> Error {
    ZipError::InvalidArchive(Cow::Borrowed(message)).into()
}

#[inline]
fn le_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

#[inline]
fn le_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

#[inline]
fn le_u64(buf: &[u8], at: usize) -> u64 {
    let mut bytes = [0; 8];
    bytes.copy_from_slice(&buf[at..at + 8]);
    u64::from_le_bytes(bytes)
}

/// Where a record stores the offset of its local header.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum OffsetField {
    Header,
    Zip64Extra(usize),
}

/// One central directory header, kept byte for byte.
#[derive(Clone, Debug)]
pub(crate) struct CentralRecord {
    header: Vec<u8>,
    compressed_size: u64,
    uncompressed_size: u64,
    local_offset: u64,
    offset_field: OffsetField,
    zip64_sizes: bool,
}

impl CentralRecord {
    /// Parses the record at the start of `buf`, returning it with its length.
    fn parse(buf: &[u8]) -> Result<(Self, usize)> {
        if buf.len() < CENTRAL_HEADER_LEN || le_u32(buf, 0) != CENTRAL_HEADER_SIGNATURE {
            return Err(invalid("invalid central directory header"));
        }
        let name_len = usize::from(le_u16(buf, 28));
        let extra_len = usize::from(le_u16(buf, 30));
        let comment_len = usize::from(le_u16(buf, 32));
        let len = CENTRAL_HEADER_LEN + name_len + extra_len + comment_len;
        if buf.len() < len {
            return Err(invalid("central directory header is truncated"));
        }
        let mut record = Self {
            header: buf[..len].to_vec(),
            compressed_size: u64::from(le_u32(buf, 20)),
            uncompressed_size: u64::from(le_u32(buf, 24)),
            local_offset: u64::from(le_u32(buf, 42)),
            offset_field: OffsetField::Header,
            zip64_sizes: false,
        };
        let extra_start = CENTRAL_HEADER_LEN + name_len;
        record.read_zip64_extra(extra_start, extra_start + extra_len)?;
        Ok((record, len))
    }

    /// Replaces saturated 32 bit values with those of the zip64 extra field.
    fn read_zip64_extra(&mut self, mut at: usize, end: usize) -> Result<()> {
        while at + 4 <= end {
            let id = le_u16(&self.header, at);
            let size = usize::from(le_u16(&self.header, at + 2));
            let data = at + 4;
            if data + size > end {
                return Err(invalid("extra field is truncated"));
            }
            if id == ZIP64_EXTRA_ID {
                let mut field = data;
                let mut next = |saturated: bool| -> Result<Option<usize>> {
                    if !saturated {
                        return Ok(None);
                    }
                    if field + 8 > data + size {
                        return Err(invalid("zip64 extra field is truncated"));
                    }
                    field += 8;
                    Ok(Some(field - 8))
                };
                if let Some(at) = next(self.uncompressed_size == u64::from(u32::MAX))? {
                    self.uncompressed_size = le_u64(&self.header, at);
                    self.zip64_sizes = true;
                }
                if let Some(at) = next(self.compressed_size == u64::from(u32::MAX))? {
                    self.compressed_size = le_u64(&self.header, at);
                    self.zip64_sizes = true;
                }
                if let Some(at) = next(self.local_offset == u64::from(u32::MAX))? {
                    self.local_offset = le_u64(&self.header, at);
                    self.offset_field = OffsetField::Zip64Extra(at);
                }
                return Ok(());
            }
            at = data + size;
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn name_bytes(&self) -> &[u8] {
        let len = usize::from(le_u16(&self.header, 28));
        &self.header[CENTRAL_HEADER_LEN..CENTRAL_HEADER_LEN + len]
    }

    #[inline]
    pub(crate) fn name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.name_bytes())
    }

    #[inline]
    pub(crate) fn method(&self) -> u16 {
        le_u16(&self.header, 10)
    }

    #[inline]
    pub(crate) fn dos_time(&self) -> u16 {
        le_u16(&self.header, 12)
    }

    #[inline]
    pub(crate) fn dos_date(&self) -> u16 {
        le_u16(&self.header, 14)
    }

    #[inline]
    pub(crate) fn compressed_size(&self) -> u64 {
        self.compressed_size
    }

    #[inline]
    pub(crate) fn size(&self) -> u64 {
        self.uncompressed_size
    }

    #[inline]
    fn host(&self) -> u8 {
        self.header[5]
    }

    #[inline]
    fn external_attributes(&self) -> u32 {
        le_u32(&self.header, 38)
    }

    /// Unix mode bits, synthesized from the attribute byte for DOS hosts.
    pub(crate) fn unix_mode(&self) -> Option<u32> {
        let attributes = self.external_attributes();
        if attributes == 0 {
            return None;
        }
        let mode = attributes >> 16;
        if mode != 0 {
            return Some(mode);
        }
        match self.host() {
            HOST_UNIX => Some(mode),
            HOST_DOS => {
                let mut mode = if attributes & 0x10 != 0 {
                    S_IFDIR | 0o775
                } else {
                    S_IFREG | 0o664
                };
                if attributes & 0x01 != 0 {
                    mode &= !0o222;
                }
                Some(mode)
            }
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn is_dir(&self) -> bool {
        matches!(self.name_bytes().last(), Some(b'/' | b'\\'))
    }

    #[inline]
    pub(crate) fn is_symlink(&self) -> bool {
        self.unix_mode().is_some_and(|m| m & S_IFMT == S_IFLNK)
    }

    #[inline]
    pub(crate) fn local_offset(&self) -> u64 {
        self.local_offset
    }

    /// Points the record at a local header written at `offset`.
    pub(crate) fn relocate(&mut self, offset: u64) -> Result<()> {
        match self.offset_field {
            OffsetField::Zip64Extra(at) => {
                self.header[at..at + 8].copy_from_slice(&offset.to_le_bytes());
            }
            OffsetField::Header => {
                let offset32 = u32::try_from(offset)
                    .ok()
                    .filter(|o| *o != u32::MAX)
                    .ok_or(Error::Zip(ZipError::UnsupportedArchive(
                        "entry offset exceeds 4 GiB and the entry has no zip64 offset field",
                    )))?;
                self.header[42..46].copy_from_slice(&offset32.to_le_bytes());
            }
        }
        self.local_offset = offset;
        Ok(())
    }

    /// Returns the offset of the entry data, just past its local header.
    pub(crate) fn data_offset<R: Read + Seek>(&self, reader: &mut R) -> Result<u64> {
        let mut local = [0; LOCAL_HEADER_LEN as usize];
        reader.seek(SeekFrom::Start(self.local_offset))?;
        reader.read_exact(&mut local)?;
        if le_u32(&local, 0) != LOCAL_HEADER_SIGNATURE {
            return Err(invalid("invalid local file header"));
        }
        let variable = u64::from(le_u16(&local, 26)) + u64::from(le_u16(&local, 28));
        Ok(self.local_offset + LOCAL_HEADER_LEN + variable)
    }

    /// Length of the local header, data and data descriptor of this entry.
    pub(crate) fn local_span<R: Read + Seek>(&self, reader: &mut R) -> Result<u64> {
        let data_end = self
            .data_offset(reader)?
            .checked_add(self.compressed_size)
            .ok_or_else(|| invalid("entry size overflows"))?;
        let mut span = data_end - self.local_offset;
        if le_u16(&self.header, 8) & FLAG_DATA_DESCRIPTOR != 0 {
            let mut signature = [0; 4];
            reader.seek(SeekFrom::Start(data_end))?;
            reader.read_exact(&mut signature)?;
            if u32::from_le_bytes(signature) == DATA_DESCRIPTOR_SIGNATURE {
                span += 4;
            }
            span += if self.zip64_sizes { 20 } else { 12 };
        }
        Ok(span)
    }
}

/// Every central directory record of an archive, in directory order.
#[derive(Clone, Debug, Default)]
pub(crate) struct CentralDirectory {
    pub(crate) records: Vec<CentralRecord>,
    /// Offset of the first central directory header.
    pub(crate) offset: u64,
    pub(crate) comment: Vec<u8>,
}

impl CentralDirectory {
    pub(crate) fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let end = EndRecord::read(reader)?;
        let file_len = reader.seek(SeekFrom::End(0))?;
        if end.offset.checked_add(end.size).is_none_or(|e| e > file_len) {
            return Err(invalid("central directory lies outside the archive"));
        }
        let size = usize::try_from(end.size).map_err(|_| invalid("central directory is too large"))?;
        let mut buf = vec![0; size];
        reader.seek(SeekFrom::Start(end.offset))?;
        reader.read_exact(&mut buf)?;

        let mut records = Vec::new();
        let mut at = 0;
        while (records.len() as u64) < end.entries {
            let (record, len) = CentralRecord::parse(&buf[at..])?;
            records.push(record);
            at += len;
        }
        Ok(Self {
            records,
            offset: end.offset,
            comment: end.comment,
        })
    }

    #[inline]
    pub(crate) fn contains(&self, name: &[u8]) -> bool {
        self.records.iter().any(|r| r.name_bytes() == name)
    }

    /// Writes the directory followed by its end records, starting at `self.offset`.
    pub(crate) fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let mut size = 0u64;
        for record in &self.records {
            writer.write_all(&record.header)?;
            size += record.header.len() as u64;
        }
        EndRecord {
            entries: self.records.len() as u64,
            size,
            offset: self.offset,
            comment: self.comment.clone(),
        }
        .write(writer, self.offset + size)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct EndRecord {
    entries: u64,
    size: u64,
    offset: u64,
    comment: Vec<u8>,
}

impl EndRecord {
    fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let file_len = reader.seek(SeekFrom::End(0))?;
        let window = file_len.min((END_LEN + MAX_COMMENT_LEN) as u64);
        let window_start = file_len - window;
        let mut tail = vec![0; window as usize];
        reader.seek(SeekFrom::Start(window_start))?;
        reader.read_exact(&mut tail)?;

        let at = (0..=tail.len().saturating_sub(END_LEN))
            .rev()
            .filter(|&at| tail.len() >= at + END_LEN)
            .find(|&at| le_u32(&tail, at) == END_SIGNATURE)
            .ok_or_else(|| invalid("end of central directory not found"))?;
        let comment_len = usize::from(le_u16(&tail, at + 20));
        let comment_end = (at + END_LEN + comment_len).min(tail.len());
        let mut end = Self {
            entries: u64::from(le_u16(&tail, at + 10)),
            size: u64::from(le_u32(&tail, at + 12)),
            offset: u64::from(le_u32(&tail, at + 16)),
            comment: tail[at + END_LEN..comment_end].to_vec(),
        };

        let saturated = end.entries == u64::from(u16::MAX)
            || end.size == u64::from(u32::MAX)
            || end.offset == u64::from(u32::MAX);
        let end_position = window_start + at as u64;
        if saturated && end_position >= ZIP64_LOCATOR_LEN as u64 {
            let mut locator = [0; ZIP64_LOCATOR_LEN];
            reader.seek(SeekFrom::Start(end_position - ZIP64_LOCATOR_LEN as u64))?;
            reader.read_exact(&mut locator)?;
            if le_u32(&locator, 0) == ZIP64_LOCATOR_SIGNATURE {
                let mut zip64 = [0; ZIP64_END_LEN];
                reader.seek(SeekFrom::Start(le_u64(&locator, 8)))?;
                reader.read_exact(&mut zip64)?;
                if le_u32(&zip64, 0) != ZIP64_END_SIGNATURE {
                    return Err(invalid("invalid zip64 end of central directory"));
                }
                end.entries = le_u64(&zip64, 32);
                end.size = le_u64(&zip64, 40);
                end.offset = le_u64(&zip64, 48);
            }
        }
        Ok(end)
    }

    /// Writes the end records at stream position `position`, in zip64 form when a
    /// value does not fit the classic record.
    fn write<W: Write>(&self, writer: &mut W, position: u64) -> io::Result<()> {
        let zip64 = self.entries >= u64::from(u16::MAX)
            || self.size >= u64::from(u32::MAX)
            || self.offset >= u64::from(u32::MAX);
        if zip64 {
            let mut record = Vec::with_capacity(ZIP64_END_LEN + ZIP64_LOCATOR_LEN);
            record.extend_from_slice(&ZIP64_END_SIGNATURE.to_le_bytes());
            record.extend_from_slice(&((ZIP64_END_LEN - 12) as u64).to_le_bytes());
            record.extend_from_slice(&(u16::from(HOST_UNIX) << 8 | ZIP64_VERSION).to_le_bytes());
            record.extend_from_slice(&ZIP64_VERSION.to_le_bytes());
            record.extend_from_slice(&[0; 8]);
            record.extend_from_slice(&self.entries.to_le_bytes());
            record.extend_from_slice(&self.entries.to_le_bytes());
            record.extend_from_slice(&self.size.to_le_bytes());
            record.extend_from_slice(&self.offset.to_le_bytes());
            record.extend_from_slice(&ZIP64_LOCATOR_SIGNATURE.to_le_bytes());
            record.extend_from_slice(&[0; 4]);
            record.extend_from_slice(&position.to_le_bytes());
            record.extend_from_slice(&1u32.to_le_bytes());
            writer.write_all(&record)?;
        }
        let entries = u16::try_from(self.entries).unwrap_or(u16::MAX);
        let size = u32::try_from(self.size).unwrap_or(u32::MAX);
        let offset = u32::try_from(self.offset).unwrap_or(u32::MAX);
        let comment = &self.comment[..self.comment.len().min(MAX_COMMENT_LEN)];

        let mut record = Vec::with_capacity(END_LEN + comment.len());
        record.extend_from_slice(&END_SIGNATURE.to_le_bytes());
        record.extend_from_slice(&[0; 4]);
        record.extend_from_slice(&entries.to_le_bytes());
        record.extend_from_slice(&entries.to_le_bytes());
        record.extend_from_slice(&size.to_le_bytes());
        record.extend_from_slice(&offset.to_le_bytes());
        record.extend_from_slice(&(comment.len() as u16).to_le_bytes());
        record.extend_from_slice(comment);
        writer.write_all(&record)
    }
}
