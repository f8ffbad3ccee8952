//! `scdl list`: print the tracks found on the given pages.

use anyhow::{bail, Result};
use scdl_core::config::ScdlConfig;
use scdl_core::{collect_tracks, TransportOptions};

use crate::cli::fetch::CurlPageFetcher;

pub async fn run_list(cfg: &ScdlConfig, urls: Vec<String>, only_main_track: bool) -> Result<()> {
    let fetcher = CurlPageFetcher::new(TransportOptions::from_config(cfg));
    let tracks = tokio::task::spawn_blocking(move || {
        collect_tracks(&fetcher, &urls, only_main_track, &|| false)
    })
    .await?;

    if tracks.is_empty() {
        bail!("no tracks found");
    }
    for (i, track) in tracks.iter().enumerate() {
        println!("{:>3}. {}", i + 1, track);
    }
    Ok(())
}
