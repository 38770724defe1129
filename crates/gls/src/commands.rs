mod serve;

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::args::Args;

pub trait Command {
    async fn execute(&self, args: &Args) -> Result<ExitCode>;
}

#[derive(Debug, Subcommand)]
pub enum GlsCommand {
    /// Start the language server on stdio
    Serve(self::serve::Serve),
}

impl Command for GlsCommand {
    async fn execute(&self, args: &Args) -> Result<ExitCode> {
        match self {
            GlsCommand::Serve(serve) => serve.execute(args).await,
        }
    }
}
