use crate::{
    cli::GlobalArgs,
    command::{Command, resolve_provider},
};
use anyhow::Context;
use clap::{Parser, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Clone, Eq, PartialEq, Hash, Debug)]
pub struct RemoveCommand {
    #[arg(help = "Archive file path", value_hint = ValueHint::FilePath)]
    archive: PathBuf,
    #[arg(help = "Glob matched against whole entry names. `*` does not cross `/`")]
    pattern: String,
}

impl Command for RemoveCommand {
    #[inline]
    fn execute(self, ctx: &GlobalArgs) -> anyhow::Result<()> {
        let provider = resolve_provider(ctx, &self.archive)?;
        let report = provider
            .remove_files(&self.archive, &self.pattern)
            .with_context(|| {
                format!(
                    "removing '{}' from '{}'",
                    self.pattern,
                    self.archive.display()
                )
            })?;
        if report.removed == 0 {
            log::warn!("no entry matched '{}'", self.pattern);
        }
        Ok(())
    }
}
