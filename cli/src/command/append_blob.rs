use crate::{
    cli::GlobalArgs,
    command::{Command, open_or_create, resolve_provider},
};
use anyhow::Context;
use clap::{ArgGroup, Parser, ValueHint};
use libslipit::ArchiveProvider;
use std::{fs, path::PathBuf};

#[derive(Parser, Clone, Eq, PartialEq, Hash, Debug)]
#[command(group(ArgGroup::new("content").args(["data", "data_file"]).required(true)))]
pub struct AppendBlobCommand {
    #[arg(help = "Archive file path", value_hint = ValueHint::FilePath)]
    archive: PathBuf,
    #[arg(long, help = "Entry content")]
    data: Option<String>,
    #[arg(long, help = "Read entry content from the given file", value_hint = ValueHint::FilePath)]
    data_file: Option<PathBuf>,
    #[arg(required = true, help = "Names to store the content under")]
    names: Vec<String>,
}

impl Command for AppendBlobCommand {
    #[inline]
    fn execute(self, ctx: &GlobalArgs) -> anyhow::Result<()> {
        append_blob_to_archive(self, ctx)
    }
}

fn append_blob_to_archive(args: AppendBlobCommand, ctx: &GlobalArgs) -> anyhow::Result<()> {
    let provider = resolve_provider(ctx, &args.archive)?;
    let blob = match (args.data, args.data_file) {
        (Some(data), _) => data.into_bytes(),
        (None, Some(path)) => {
            fs::read(&path).with_context(|| format!("reading '{}'", path.display()))?
        }
        (None, None) => unreachable!("required by ArgGroup"),
    };
    let mut archive = open_or_create(provider, &args.archive)?;
    archive.append_blobs(&blob, &args.names)?;
    archive
        .close()
        .with_context(|| format!("writing '{}'", args.archive.display()))?;
    log::info!(
        "appended {} byte blob to '{}' under {} name(s)",
        blob.len(),
        args.archive.display(),
        args.names.len()
    );
    Ok(())
}
