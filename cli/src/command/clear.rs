use crate::{
    cli::GlobalArgs,
    command::{Command, resolve_provider},
};
use anyhow::Context;
use clap::{Parser, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ClearCommand {
    #[arg(help = "Archive file path", value_hint = ValueHint::FilePath)]
    archive: PathBuf,
    #[arg(
        long,
        default_value = "../",
        help = "Entries whose name contains this string are removed"
    )]
    payload: String,
}

impl Command for ClearCommand {
    #[inline]
    fn execute(self, ctx: &GlobalArgs) -> anyhow::Result<()> {
        let provider = resolve_provider(ctx, &self.archive)?;
        provider
            .clear_archive(&self.archive, &self.payload)
            .with_context(|| format!("clearing '{}'", self.archive.display()))?;
        Ok(())
    }
}
