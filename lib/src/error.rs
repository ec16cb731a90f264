use crate::registry::{KeySpace, ProviderType};
use std::{io, path::PathBuf};

/// Errors raised by archive providers and the registry.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The archive path does not exist.
    #[error("archive not found: {}", .0.display())]
    NotFound(PathBuf),
    /// A provider was already registered for the key in this keyspace.
    #[error("a provider is already registered for {keyspace} '{key}'")]
    DuplicateRegistration { key: String, keyspace: KeySpace },
    /// The provider has no way to express the requested entry kind.
    #[error("{provider} archives do not support {capability}")]
    UnsupportedCapability {
        provider: ProviderType,
        capability: &'static str,
    },
    /// A capability method was called without a concrete implementation.
    #[error("{operation} is not implemented by this provider")]
    Unimplemented { operation: &'static str },
    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] globset::Error),
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
