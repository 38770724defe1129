use std::process::ExitCode;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use gls_conf::LogLevel;
use gls_conf::Settings;

use crate::args::Args;
use crate::commands::Command;

#[derive(Debug, Parser)]
pub struct Serve {
    /// Log level for the server log, overriding configuration.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Project root used to find configuration and the logs directory.
    /// Defaults to the current directory.
    #[arg(long)]
    pub project_root: Option<Utf8PathBuf>,
}

impl Serve {
    fn project_root(&self) -> Result<Utf8PathBuf> {
        if let Some(root) = &self.project_root {
            return Ok(root.clone());
        }
        let cwd = std::env::current_dir().context("failed to read current directory")?;
        Utf8PathBuf::from_path_buf(cwd)
            .map_err(|path| anyhow::anyhow!("current directory is not UTF-8: {}", path.display()))
    }

    /// `--log-level` wins, then `-q`/`-v`, then configuration.
    fn effective_log_level(&self, args: &Args, configured: LogLevel) -> LogLevel {
        if let Some(level) = self.log_level {
            level
        } else if args.global.quiet {
            LogLevel::Error
        } else if args.global.verbose > 0 {
            LogLevel::Debug
        } else {
            configured
        }
    }
}

impl Command for Serve {
    async fn execute(&self, args: &Args) -> Result<ExitCode> {
        let project_root = self.project_root()?;
        let mut settings = Settings::new(&project_root)
            .with_context(|| format!("failed to load settings for {project_root}"))?;
        settings.log_level = self.effective_log_level(args, settings.log_level);

        gls_server::serve(&settings, &project_root).await?;
        Ok(ExitCode::SUCCESS)
    }
}
