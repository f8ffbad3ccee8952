//! CLI for the SCDL track downloader.

mod commands;
mod fetch;
mod progress;
mod select;

use anyhow::Result;
use clap::{Parser, Subcommand};
use scdl_core::config;
use std::path::PathBuf;

use commands::{run_download, run_list, DownloadArgs};

/// Top-level CLI for the SCDL track downloader.
#[derive(Debug, Parser)]
#[command(name = "scdl")]
#[command(about = "SCDL: download the tracks embedded in SoundCloud pages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// List the tracks found on one or more pages.
    List {
        /// Page URLs to scan.
        #[arg(required = true)]
        urls: Vec<String>,

        /// Keep only the first (main) track of each page.
        #[arg(long)]
        only_main_track: bool,
    },

    /// Download the tracks found on one or more pages.
    Download {
        /// Page URLs to scan.
        #[arg(required = true)]
        urls: Vec<String>,

        /// Destination directory (default: config `download_dir`, else the current directory).
        #[arg(long, short = 'd', value_name = "DIR")]
        dest: Option<PathBuf>,

        /// Download one track fully before starting the next.
        #[arg(long)]
        one_at_a_time: bool,

        /// Keep only the first (main) track of each page.
        #[arg(long)]
        only_main_track: bool,

        /// Only download these tracks, numbered as in `scdl list` (e.g. `1,3-5`).
        #[arg(long, value_name = "LIST")]
        select: Option<String>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::List {
                urls,
                only_main_track,
            } => run_list(&cfg, urls, only_main_track || cfg.only_main_track).await?,
            CliCommand::Download {
                urls,
                dest,
                one_at_a_time,
                only_main_track,
                select,
            } => {
                let dest = match dest.or_else(|| cfg.download_dir.clone()) {
                    Some(d) => d,
                    None => std::env::current_dir()?,
                };
                let args = DownloadArgs {
                    urls,
                    dest,
                    one_at_a_time: one_at_a_time || cfg.one_track_at_a_time,
                    only_main_track: only_main_track || cfg.only_main_track,
                    select,
                };
                run_download(&cfg, args).await?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
