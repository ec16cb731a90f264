use crate::{
    compress::Compression,
    error::{Error, Result},
};
use indexmap::{IndexMap, map::Entry};
use std::{
    fmt::{self, Display, Formatter},
    path::Path,
};

/// Identifies the provider implementation responsible for an archive format.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ProviderType {
    /// Uncompressed tar.
    Tar,
    /// Tar wrapped in a stream compression.
    CompressedTar(Compression),
    /// Zip and zip based containers.
    Zip,
}

impl Display for ProviderType {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tar => f.write_str("tar"),
            Self::CompressedTar(c) => f.write_str(c.tar_suffix()),
            Self::Zip => f.write_str("zip"),
        }
    }
}

/// The two independent key spaces of a [`Registry`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum KeySpace {
    Extension,
    Mime,
}

impl Display for KeySpace {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Extension => "extension",
            Self::Mime => "mime type",
        })
    }
}

const TAR_EXTENSIONS: &[&str] = &[".tar"];
const TAR_MIME_TYPES: &[&str] = &["application/x-tar", "application/tar"];
const GZIP_EXTENSIONS: &[&str] = &[".gz", ".tgz"];
const GZIP_MIME_TYPES: &[&str] = &[
    "application/gzip",
    "application/x-gzip",
    "application/x-gtar",
    "application/x-tgz",
];
const BZIP2_EXTENSIONS: &[&str] = &[".bz2"];
const BZIP2_MIME_TYPES: &[&str] = &["application/x-bzip2"];
const ZIP_EXTENSIONS: &[&str] = &[".zip", ".jar", ".doc", ".docx"];
const ZIP_MIME_TYPES: &[&str] = &[
    "application/zip",
    "multipart/x-zip",
    "application/x-zip-compressed",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Lookup table dispatching a [`ProviderType`] by file extension or MIME type.
///
/// [`Registry::default`] holds the built-in formats; [`Registry::new`] starts empty.
#[derive(Clone, Debug)]
pub struct Registry {
    extensions: IndexMap<String, ProviderType>,
    mime_types: IndexMap<String, ProviderType>,
}

impl Registry {
    /// Creates an empty registry.
    #[inline]
    pub fn new() -> Self {
        Self {
            extensions: IndexMap::new(),
            mime_types: IndexMap::new(),
        }
    }

    /// Creates a registry populated with every built-in format.
    pub fn with_builtin_providers() -> Self {
        let mut registry = Self::new();
        let builtin: [(ProviderType, &[&str], &[&str]); 4] = [
            (ProviderType::Tar, TAR_EXTENSIONS, TAR_MIME_TYPES),
            (
                ProviderType::CompressedTar(Compression::Gzip),
                GZIP_EXTENSIONS,
                GZIP_MIME_TYPES,
            ),
            (
                ProviderType::CompressedTar(Compression::Bzip2),
                BZIP2_EXTENSIONS,
                BZIP2_MIME_TYPES,
            ),
            (ProviderType::Zip, ZIP_EXTENSIONS, ZIP_MIME_TYPES),
        ];
        for (provider, extensions, mime_types) in builtin {
            for ext in extensions {
                registry.extensions.insert((*ext).to_string(), provider);
            }
            for mime in mime_types {
                registry.mime_types.insert((*mime).to_string(), provider);
            }
        }
        registry
    }

    /// Registers `provider` for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateRegistration`] if `key` is already claimed in
    /// `keyspace`. The existing mapping is left unchanged.
    pub fn register(
        &mut self,
        provider: ProviderType,
        key: impl Into<String>,
        keyspace: KeySpace,
    ) -> Result<()> {
        match self.keys_mut(keyspace).entry(key.into()) {
            Entry::Occupied(e) => Err(Error::DuplicateRegistration {
                key: e.key().clone(),
                keyspace,
            }),
            Entry::Vacant(e) => {
                log::trace!("registered {provider} for {keyspace} '{}'", e.key());
                e.insert(provider);
                Ok(())
            }
        }
    }

    /// Returns the provider registered for `key`, matched exactly.
    #[inline]
    pub fn lookup(&self, key: &str, keyspace: KeySpace) -> Option<ProviderType> {
        self.keys(keyspace).get(key).copied()
    }

    /// Resolves a provider from the last extension of `path`.
    pub fn lookup_path(&self, path: impl AsRef<Path>) -> Option<ProviderType> {
        let ext = path.as_ref().extension()?.to_str()?;
        self.lookup(&format!(".{ext}"), KeySpace::Extension)
    }

    /// Iterates the keys of `keyspace` in registration order.
    #[inline]
    pub fn keys_in(&self, keyspace: KeySpace) -> impl Iterator<Item = (&str, ProviderType)> {
        self.keys(keyspace).iter().map(|(k, v)| (k.as_str(), *v))
    }

    #[inline]
    fn keys(&self, keyspace: KeySpace) -> &IndexMap<String, ProviderType> {
        match keyspace {
            KeySpace::Extension => &self.extensions,
            KeySpace::Mime => &self.mime_types,
        }
    }

    #[inline]
    fn keys_mut(&mut self, keyspace: KeySpace) -> &mut IndexMap<String, ProviderType> {
        match keyspace {
            KeySpace::Extension => &mut self.extensions,
            KeySpace::Mime => &mut self.mime_types,
        }
    }
}

impl Default for Registry {
    #[inline]
    fn default() -> Self {
        Self::with_builtin_providers()
    }
}
