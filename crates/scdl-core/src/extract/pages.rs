//! Track collection across several pages through a page fetch collaborator.

use anyhow::Result;
use std::collections::HashSet;

use crate::track::TrackRecord;

/// Returns the raw markup of a page. Implemented outside the core (the CLI uses curl).
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> Result<String>;
}

impl<F> PageFetcher for F
where
    F: Fn(&str) -> Result<String>,
{
    fn fetch(&self, url: &str) -> Result<String> {
        self(url)
    }
}

/// Fetches each distinct page in order and extracts its tracks.
///
/// Pages that cannot be fetched are logged and skipped. With `only_main_track`
/// only the first track of each page is kept. Returns an empty list as soon as
/// `cancel` reports true.
pub fn collect_tracks(
    fetcher: &dyn PageFetcher,
    page_urls: &[String],
    only_main_track: bool,
    cancel: &dyn Fn() -> bool,
) -> Vec<TrackRecord> {
    let mut seen = HashSet::new();
    let mut tracks = Vec::new();

    for url in page_urls {
        if !seen.insert(url.as_str()) {
            continue;
        }
        if cancel() {
            return Vec::new();
        }

        tracing::info!(url = %url, "retrieving tracks");
        let markup = match fetcher.fetch(url) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(url = %url, "could not retrieve page: {:#}", e);
                continue;
            }
        };

        if only_main_track {
            tracks.extend(super::extract_main_track(&markup));
        } else {
            tracks.extend(super::extract_tracks(&markup));
        }
    }

    tracks
}
