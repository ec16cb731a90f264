use crate::{
    cli::GlobalArgs,
    command::{Command, open_or_create, resolve_provider},
};
use anyhow::Context;
use clap::{Parser, ValueHint};
use libslipit::ArchiveProvider;
use std::path::PathBuf;

#[derive(Parser, Clone, Eq, PartialEq, Hash, Debug)]
pub struct AppendSymlinkCommand {
    #[arg(help = "Archive file path", value_hint = ValueHint::FilePath)]
    archive: PathBuf,
    #[arg(help = "Path the symlinks point at")]
    target: String,
    #[arg(required = true, help = "Names of the symlink entries")]
    names: Vec<String>,
}

impl Command for AppendSymlinkCommand {
    #[inline]
    fn execute(self, ctx: &GlobalArgs) -> anyhow::Result<()> {
        append_symlink_to_archive(self, ctx)
    }
}

fn append_symlink_to_archive(args: AppendSymlinkCommand, ctx: &GlobalArgs) -> anyhow::Result<()> {
    let provider = resolve_provider(ctx, &args.archive)?;
    let mut archive = open_or_create(provider, &args.archive)?;
    archive
        .append_symlinks(&args.target, &args.names)
        .with_context(|| format!("adding symlink to '{}'", args.target))?;
    archive
        .close()
        .with_context(|| format!("writing '{}'", args.archive.display()))?;
    log::info!(
        "appended {} symlink(s) to '{}' in '{}'",
        args.names.len(),
        args.target,
        args.archive.display()
    );
    Ok(())
}
