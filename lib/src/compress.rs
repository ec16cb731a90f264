use bzip2::{read::MultiBzDecoder, write::BzEncoder};
use flate2::{read::MultiGzDecoder, write::GzEncoder};
use std::{
    fmt::{self, Display, Formatter},
    io::{Read, Result, Write},
};

/// Stream compression applied around a tar archive.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Compression {
    Gzip,
    Bzip2,
}

impl Compression {
    /// Conventional file extension suffix for a tar archive with this compression.
    #[inline]
    pub const fn tar_suffix(self) -> &'static str {
        match self {
            Self::Gzip => "tar.gz",
            Self::Bzip2 => "tar.bz2",
        }
    }

    #[inline]
    pub(crate) fn encoder<W: Write>(self, inner: W) -> CompressionWriter<W> {
        match self {
            Self::Gzip => CompressionWriter::Gzip(GzEncoder::new(
                inner,
                flate2::Compression::default(),
            )),
            Self::Bzip2 => CompressionWriter::Bzip2(BzEncoder::new(
                inner,
                bzip2::Compression::default(),
            )),
        }
    }

    #[inline]
    pub(crate) fn decoder<R: Read>(self, inner: R) -> DecompressReader<R> {
        match self {
            Self::Gzip => DecompressReader::Gzip(MultiGzDecoder::new(inner)),
            Self::Bzip2 => DecompressReader::Bzip2(MultiBzDecoder::new(inner)),
        }
    }
}

impl Display for Compression {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
        })
    }
}

pub(crate) enum CompressionWriter<W: Write> {
    No(W),
    Gzip(GzEncoder<W>),
    Bzip2(BzEncoder<W>),
}

impl<W: Write> CompressionWriter<W> {
    #[inline]
    pub(crate) fn new(inner: W, compression: Option<Compression>) -> Self {
        match compression {
            Some(c) => c.encoder(inner),
            None => Self::No(inner),
        }
    }
}

impl<W: Write> Write for CompressionWriter<W> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        match self {
            Self::No(w) => w.write(buf),
            Self::Gzip(w) => w.write(buf),
            Self::Bzip2(w) => w.write(buf),
        }
    }

    #[inline]
    fn flush(&mut self) -> Result<()> {
        match self {
            Self::No(w) => w.flush(),
            Self::Gzip(w) => w.flush(),
            Self::Bzip2(w) => w.flush(),
        }
    }
}

impl<W: Write> CompressionWriter<W> {
    /// Writes the stream trailer, if any, and returns the inner writer.
    #[inline]
    pub(crate) fn finish(self) -> Result<W> {
        match self {
            Self::No(w) => Ok(w),
            Self::Gzip(w) => w.finish(),
            Self::Bzip2(w) => w.finish(),
        }
    }
}

pub(crate) enum DecompressReader<R: Read> {
    No(R),
    Gzip(MultiGzDecoder<R>),
    Bzip2(MultiBzDecoder<R>),
}

impl<R: Read> DecompressReader<R> {
    #[inline]
    pub(crate) fn new(inner: R, compression: Option<Compression>) -> Self {
        match compression {
            Some(c) => c.decoder(inner),
            None => Self::No(inner),
        }
    }
}

impl<R: Read> Read for DecompressReader<R> {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self {
            Self::No(r) => r.read(buf),
            Self::Gzip(r) => r.read(buf),
            Self::Bzip2(r) => r.read(buf),
        }
    }
}
