use clap::ValueEnum;
use libslipit::{Compression, ProviderType};

/// Archive format forced from the command line.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, ValueEnum)]
pub(crate) enum ArchiveFormat {
    Tar,
    TarGz,
    TarBz2,
    Zip,
}

impl From<ArchiveFormat> for ProviderType {
    #[inline]
    fn from(value: ArchiveFormat) -> Self {
        match value {
            ArchiveFormat::Tar => Self::Tar,
            ArchiveFormat::TarGz => Self::CompressedTar(Compression::Gzip),
            ArchiveFormat::TarBz2 => Self::CompressedTar(Compression::Bzip2),
            ArchiveFormat::Zip => Self::Zip,
        }
    }
}
