//! `scdl download`: collect tracks from pages and download them.

use anyhow::{bail, Result};
use scdl_core::config::ScdlConfig;
use scdl_core::{
    collect_tracks, BatchReport, CancelToken, Mode, Orchestrator, ProgressSnapshot, Transport,
};
use std::path::PathBuf;

use crate::cli::fetch::CurlPageFetcher;
use crate::cli::progress::{ConsoleSink, ProgressPrinter};
use crate::cli::select::parse_selection;

#[derive(Debug)]
pub struct DownloadArgs {
    pub urls: Vec<String>,
    pub dest: PathBuf,
    pub one_at_a_time: bool,
    pub only_main_track: bool,
    pub select: Option<String>,
}

pub async fn run_download(cfg: &ScdlConfig, args: DownloadArgs) -> Result<()> {
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() && cancel.cancel() {
                eprintln!("\nCancelling, waiting for transfers to stop...");
            }
        });
    }

    let transport = Transport::from_config(cfg);
    let report = tokio::task::spawn_blocking(move || run_batch(transport, args, cancel)).await??;

    let summary = report.summary();
    if report.cancelled {
        bail!("cancelled ({} of {} tracks downloaded)", summary.succeeded, summary.total());
    }
    if !summary.is_complete_success() {
        bail!("{} of {} tracks failed", summary.failed, summary.total());
    }
    Ok(())
}

/// Blocking part: page collection, size probes and the batch itself.
fn run_batch(transport: Transport, args: DownloadArgs, cancel: CancelToken) -> Result<BatchReport> {
    let is_cancelled = || cancel.is_cancelled();

    let fetcher = CurlPageFetcher::new(transport.options().clone());
    let mut tracks = collect_tracks(&fetcher, &args.urls, args.only_main_track, &is_cancelled);
    if is_cancelled() {
        bail!("cancelled before any download started");
    }
    if tracks.is_empty() {
        bail!("no tracks found");
    }
    if let Some(list) = &args.select {
        let picked = parse_selection(list, tracks.len())?;
        tracks = picked.into_iter().map(|i| tracks[i].clone()).collect();
    }

    let orch = Orchestrator::new(transport, Box::new(ConsoleSink));
    orch.prepare_destination(&args.dest)?;
    let units = orch.probe_sizes(&tracks, &is_cancelled);

    let mode = if args.one_at_a_time {
        Mode::Sequential
    } else {
        Mode::Parallel
    };
    let printer = ProgressPrinter::default();
    let progress = |s: ProgressSnapshot| printer.update(s);
    let report = orch.run_with_report(&tracks, &args.dest, units, mode, None, &progress, &is_cancelled);
    printer.finish();
    Ok(report)
}
