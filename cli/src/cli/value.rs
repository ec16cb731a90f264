mod archive_format;
mod log_level;

pub(crate) use archive_format::ArchiveFormat;
pub(crate) use log_level::LogLevel;
