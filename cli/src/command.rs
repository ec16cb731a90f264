pub mod append;
pub mod append_blob;
pub mod append_symlink;
pub mod clear;
pub mod create;
pub mod formats;
pub mod list;
pub mod remove;

use crate::cli::GlobalArgs;
use anyhow::Context;
use libslipit::{Archive, ProviderType, Registry};
use std::path::Path;

pub(crate) trait Command {
    fn execute(self, ctx: &GlobalArgs) -> anyhow::Result<()>;
}

#[inline]
fn resolve_provider(ctx: &GlobalArgs, archive: &Path) -> anyhow::Result<ProviderType> {
    let provider = ctx.provider_for(&Registry::default(), archive)?;
    log::debug!("using {provider} provider for '{}'", archive.display());
    Ok(provider)
}

/// Opens `path` for appending, creating the archive when it does not exist yet.
fn open_or_create(provider: ProviderType, path: &Path) -> anyhow::Result<Archive> {
    if path.exists() {
        provider
            .open(path)
            .with_context(|| format!("opening {provider} archive '{}'", path.display()))
    } else {
        log::info!("creating new archive '{}'", path.display());
        provider
            .create(path)
            .with_context(|| format!("creating {provider} archive '{}'", path.display()))
    }
}
