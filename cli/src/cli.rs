pub mod value;

use crate::command::{
    Command, append::AppendCommand, append_blob::AppendBlobCommand,
    append_symlink::AppendSymlinkCommand, clear::ClearCommand, create::CreateCommand,
    formats::FormatsCommand, list::ListCommand, remove::RemoveCommand,
};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use libslipit::{KeySpace, ProviderType, Registry, TraversalPayload};
use log::LevelFilter;
use std::{io, path::Path};
use value::{ArchiveFormat, LogLevel};

#[derive(Parser, Clone, Eq, PartialEq, Hash, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version,
    about,
    author,
    arg_required_else_help = true,
)]
pub struct Cli {
    #[command(subcommand)]
    pub commands: Commands,
    #[command(flatten)]
    pub global: GlobalArgs,
}

impl Cli {
    /// Installs a stderr logger at the level selected by the global flags.
    pub fn init_logger(&self) -> Result<(), log::SetLoggerError> {
        fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!("[{}] {}", record.level(), message))
            })
            .level(self.global.level_filter())
            .chain(io::stderr())
            .apply()
    }

    pub fn execute(self) -> anyhow::Result<()> {
        match self.commands {
            Commands::Create(cmd) => cmd.execute(&self.global),
            Commands::Append(cmd) => cmd.execute(&self.global),
            Commands::AppendBlob(cmd) => cmd.execute(&self.global),
            Commands::AppendSymlink(cmd) => cmd.execute(&self.global),
            Commands::List(cmd) => cmd.execute(&self.global),
            Commands::Remove(cmd) => cmd.execute(&self.global),
            Commands::Clear(cmd) => cmd.execute(&self.global),
            Commands::Formats(cmd) => cmd.execute(&self.global),
        }
    }
}

#[derive(Args, Clone, Eq, PartialEq, Hash, Debug)]
pub struct GlobalArgs {
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = LogLevel::default(),
        help = "Minimum level of log messages written to stderr"
    )]
    log_level: LogLevel,
    #[arg(short, long, global = true, help = "Make some output more quiet")]
    quiet: bool,
    #[arg(
        long,
        global = true,
        value_enum,
        help = "Archive format. Takes precedence over --mime and the file extension"
    )]
    format: Option<ArchiveFormat>,
    #[arg(
        long,
        global = true,
        value_name = "TYPE",
        help = "MIME type used to select the archive format"
    )]
    mime: Option<String>,
}

impl GlobalArgs {
    #[inline]
    pub(crate) fn level_filter(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Off
        } else {
            self.log_level.into()
        }
    }

    /// Selects the provider for `archive` from `--format`, then `--mime`, then its extension.
    pub(crate) fn provider_for(
        &self,
        registry: &Registry,
        archive: &Path,
    ) -> anyhow::Result<ProviderType> {
        if let Some(format) = self.format {
            return Ok(format.into());
        }
        if let Some(mime) = &self.mime {
            return registry.lookup(mime, KeySpace::Mime).with_context(|| {
                format!("no archive format is registered for mime type '{mime}'")
            });
        }
        registry.lookup_path(archive).with_context(|| {
            format!(
                "cannot determine the archive format of '{}', use --format or --mime",
                archive.display()
            )
        })
    }
}

#[derive(Subcommand, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Commands {
    #[command(visible_alias = "c", about = "Create an empty archive")]
    Create(CreateCommand),
    #[command(
        visible_alias = "a",
        about = "Append a file under path traversal names, creating the archive if needed"
    )]
    Append(AppendCommand),
    #[command(about = "Append literal content under the given names")]
    AppendBlob(AppendBlobCommand),
    #[command(about = "Append symlink entries pointing at a target")]
    AppendSymlink(AppendSymlinkCommand),
    #[command(visible_alias = "ls", about = "List archive entries")]
    List(ListCommand),
    #[command(visible_alias = "rm", about = "Remove entries whose name matches a glob")]
    Remove(RemoveCommand),
    #[command(about = "Remove entries whose name contains the traversal payload")]
    Clear(ClearCommand),
    #[command(about = "Print the registered file extensions and MIME types")]
    Formats(FormatsCommand),
}

#[derive(Args, Clone, Eq, PartialEq, Hash, Debug)]
pub(crate) struct PayloadArgs {
    #[arg(
        long,
        default_value_t = TraversalPayload::DEFAULT_DEPTH,
        help = "Number of parent directory steps in generated names"
    )]
    depth: usize,
    #[arg(long, help = "Generate one name for every depth from 1 up to --depth")]
    increment: bool,
    #[arg(long, default_value = "/", help = "Separator following each `..`")]
    separator: String,
    #[arg(long, default_value = "", help = "String placed before the traversal sequence")]
    prefix: String,
}

impl PayloadArgs {
    #[inline]
    pub(crate) fn payload(&self) -> TraversalPayload {
        TraversalPayload::new(self.depth)
            .increment(self.increment)
            .separator(self.separator.as_str())
            .prefix(self.prefix.as_str())
    }
}
