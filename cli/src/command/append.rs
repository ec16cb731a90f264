use crate::{
    cli::{GlobalArgs, PayloadArgs},
    command::{Command, open_or_create, resolve_provider},
};
use anyhow::Context;
use clap::{Parser, ValueHint};
use libslipit::ArchiveProvider;
use std::path::PathBuf;

#[derive(Parser, Clone, Eq, PartialEq, Hash, Debug)]
pub struct AppendCommand {
    #[arg(help = "Archive file path", value_hint = ValueHint::FilePath)]
    archive: PathBuf,
    #[arg(help = "File to add", value_hint = ValueHint::AnyPath)]
    file: PathBuf,
    #[arg(help = "Names to store the file under. Generated from the file name when omitted")]
    names: Vec<String>,
    #[command(flatten)]
    payload: PayloadArgs,
}

impl Command for AppendCommand {
    #[inline]
    fn execute(self, ctx: &GlobalArgs) -> anyhow::Result<()> {
        append_to_archive(self, ctx)
    }
}

fn append_to_archive(args: AppendCommand, ctx: &GlobalArgs) -> anyhow::Result<()> {
    let provider = resolve_provider(ctx, &args.archive)?;
    let names = if args.names.is_empty() {
        let file_name = args
            .file
            .file_name()
            .with_context(|| format!("'{}' has no file name", args.file.display()))?;
        args.payload.payload().names(&file_name.to_string_lossy())
    } else {
        args.names
    };
    let mut archive = open_or_create(provider, &args.archive)?;
    archive
        .append_files(&args.file, &names)
        .with_context(|| format!("adding '{}'", args.file.display()))?;
    archive
        .close()
        .with_context(|| format!("writing '{}'", args.archive.display()))?;
    log::info!(
        "appended '{}' to '{}' under {} name(s)",
        args.file.display(),
        args.archive.display(),
        names.len()
    );
    Ok(())
}
