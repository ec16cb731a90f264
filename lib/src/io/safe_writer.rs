use std::{
    fs, io,
    path::{Path, PathBuf},
};

const MAX_RETRIES: u32 = 3;

/// Atomic file writer using temp file + rename pattern.
///
/// Creates a temporary file in the same directory as the target path. On
/// [`persist()`](Self::persist) the temp file is renamed over the target, so a
/// rewrite interrupted half way never leaves a truncated archive behind.
///
/// If the `SafeWriter` is dropped without calling `persist()`, the temp file
/// is removed.
pub(crate) struct SafeWriter {
    temp_path: Option<PathBuf>,
    final_path: PathBuf,
    file: fs::File,
}

impl SafeWriter {
    /// Creates a new temp file named `.slipit.{random}` next to `final_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory doesn't exist or temp file creation fails.
    pub(crate) fn new(final_path: impl AsRef<Path>) -> io::Result<Self> {
        let final_path = final_path.as_ref().to_path_buf();
        let parent = match final_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        for _ in 0..MAX_RETRIES {
            let random = rand::random::<u64>();
            let temp_path = parent.join(format!(".slipit.{random:016x}"));

            match fs::File::options()
                .read(true)
                .write(true)
                .create_new(true)
                .open(&temp_path)
            {
                Ok(file) => {
                    log::trace!("staging '{}' in '{}'", final_path.display(), temp_path.display());
                    return Ok(Self {
                        temp_path: Some(temp_path),
                        final_path,
                        file,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("failed to create unique temp file after {MAX_RETRIES} attempts"),
        ))
    }

    /// Returns a mutable reference to the underlying file for writing.
    #[inline]
    pub(crate) fn as_file_mut(&mut self) -> &mut fs::File {
        &mut self.file
    }

    /// Syncs the temp file and renames it to the final path.
    ///
    /// A replaced file passes its permissions on to the new one. On failure,
    /// the temp file is cleaned up automatically via `Drop`.
    pub(crate) fn persist(mut self) -> io::Result<()> {
        match fs::metadata(&self.final_path) {
            Ok(meta) => self.file.set_permissions(meta.permissions())?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        self.file.sync_all()?;
        let Some(temp_path) = self.temp_path.take() else {
            return Ok(());
        };
        if let Err(e) = fs::rename(&temp_path, &self.final_path) {
            self.temp_path = Some(temp_path);
            return Err(e);
        }
        Ok(())
    }
}

impl Drop for SafeWriter {
    fn drop(&mut self) {
        let Some(ref path) = self.temp_path else {
            return;
        };
        if let Err(e) = fs::remove_file(path)
            && e.kind() != io::ErrorKind::NotFound
        {
            log::warn!("Failed to clean up temp file '{}': {}", path.display(), e);
        }
    }
}
