use crate::{
    cli::GlobalArgs,
    command::{Command, resolve_provider},
};
use anyhow::Context;
use clap::{Parser, ValueHint};
use libslipit::ArchiveProvider;
use std::path::PathBuf;

#[derive(Parser, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CreateCommand {
    #[arg(help = "Archive file path", value_hint = ValueHint::FilePath)]
    archive: PathBuf,
}

impl Command for CreateCommand {
    #[inline]
    fn execute(self, ctx: &GlobalArgs) -> anyhow::Result<()> {
        create_archive(self, ctx)
    }
}

fn create_archive(args: CreateCommand, ctx: &GlobalArgs) -> anyhow::Result<()> {
    let provider = resolve_provider(ctx, &args.archive)?;
    provider
        .create(&args.archive)
        .and_then(|archive| archive.close())
        .with_context(|| format!("creating {provider} archive '{}'", args.archive.display()))?;
    log::info!("created empty archive '{}'", args.archive.display());
    Ok(())
}
