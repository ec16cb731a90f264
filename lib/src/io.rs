mod handle;
mod safe_writer;

pub(crate) use self::handle::ArchiveHandle;
pub(crate) use self::safe_writer::SafeWriter;
use crate::error::{Error, Result};
use std::path::Path;

/// Fails with [`Error::NotFound`] unless `path` names an existing regular file.
#[inline]
pub(crate) fn ensure_archive_exists(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::NotFound(path.to_path_buf()))
    }
}
