use crate::{
    cli::GlobalArgs,
    command::{Command, resolve_provider},
};
use anyhow::Context;
use clap::{Parser, ValueHint};
use std::{io, path::PathBuf};

#[derive(Parser, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ListCommand {
    #[arg(help = "Archive file path", value_hint = ValueHint::FilePath)]
    archive: PathBuf,
}

impl Command for ListCommand {
    #[inline]
    fn execute(self, ctx: &GlobalArgs) -> anyhow::Result<()> {
        let provider = resolve_provider(ctx, &self.archive)?;
        provider
            .list_archive(&self.archive, io::stdout().lock())
            .with_context(|| format!("listing '{}'", self.archive.display()))
    }
}
