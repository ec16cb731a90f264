use super::SafeWriter;
use std::{
    fs, io,
    io::{Read, Seek, SeekFrom, Write},
    path::Path,
};

/// File resource exclusively owned by one provider instance.
///
/// A `Direct` handle writes into the archive file itself. A `Staged` handle
/// writes into a temporary sibling that replaces the archive on
/// [`commit`](Self::commit); dropping it uncommitted leaves the archive untouched.
pub(crate) enum ArchiveHandle {
    Direct(fs::File),
    Staged(SafeWriter),
}

impl ArchiveHandle {
    /// Creates or truncates the file at `path`.
    #[inline]
    pub(crate) fn create(path: &Path) -> io::Result<Self> {
        fs::File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map(Self::Direct)
    }

    /// Opens an existing file for reading and writing without truncation.
    #[inline]
    pub(crate) fn update(path: &Path) -> io::Result<Self> {
        fs::File::options()
            .read(true)
            .write(true)
            .open(path)
            .map(Self::Direct)
    }

    /// Stages writes in a temporary file next to `path`.
    #[inline]
    pub(crate) fn staged(path: &Path) -> io::Result<Self> {
        SafeWriter::new(path).map(Self::Staged)
    }

    /// Flushes the handle and, for staged handles, renames the temporary file over the target.
    pub(crate) fn commit(self) -> io::Result<()> {
        match self {
            Self::Direct(mut file) => file.flush(),
            Self::Staged(writer) => writer.persist(),
        }
    }

    #[inline]
    fn file_mut(&mut self) -> &mut fs::File {
        match self {
            Self::Direct(file) => file,
            Self::Staged(writer) => writer.as_file_mut(),
        }
    }
}

impl Read for ArchiveHandle {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file_mut().read(buf)
    }
}

impl Write for ArchiveHandle {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file_mut().write(buf)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.file_mut().flush()
    }
}

impl Seek for ArchiveHandle {
    #[inline]
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file_mut().seek(pos)
    }
}
