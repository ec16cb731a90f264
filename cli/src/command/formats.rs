use crate::{cli::GlobalArgs, command::Command};
use clap::Parser;
use libslipit::{KeySpace, Registry};
use std::io::{self, Write};

#[derive(Parser, Clone, Eq, PartialEq, Hash, Debug)]
pub struct FormatsCommand {}

impl Command for FormatsCommand {
    #[inline]
    fn execute(self, _ctx: &GlobalArgs) -> anyhow::Result<()> {
        print_formats(&Registry::default(), io::stdout().lock())
    }
}

/// Prints one line per keyspace entry, in registration order.
fn print_formats<W: Write>(registry: &Registry, mut out: W) -> anyhow::Result<()> {
    for keyspace in [KeySpace::Extension, KeySpace::Mime] {
        for (key, provider) in registry.keys_in(keyspace) {
            writeln!(out, "{:<9} {:<8} {key}", keyspace.to_string(), provider.to_string())?;
        }
    }
    out.flush()?;
    Ok(())
}
