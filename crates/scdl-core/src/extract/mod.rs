//! Track extraction from raw page markup.
//!
//! The page embeds its track list as JSON inside a script tag. Rather than parse
//! that JSON, three independent patterns are scanned in document order: stream
//! URLs, titles and usernames. When the three sequences line up they are zipped
//! positionally; otherwise only the URLs are kept.

mod pages;
mod unicode;

pub use pages::{collect_tracks, PageFetcher};
pub use unicode::decode_unicode_escapes;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::track::TrackRecord;

/// `"streamUrl":"http://media.soundcloud.com/stream/<id>"`
static STREAM_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""streamUrl":"(?P<url>https?://media\.soundcloud\.com/stream/[^"]+)""#).unwrap()
});

/// `"title":"<title>"` (non-empty).
static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""title":"(?P<title>[^"]+)""#).unwrap());

/// `"username":"<artist>"` (may be empty).
static ARTIST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""username":"(?P<artist>[^"]*)""#).unwrap());

/// Returns the tracks found in `markup`, in document order.
///
/// Never fails: markup without matches yields an empty list, and unbalanced
/// match counts fall back to `Unknown - Unknown` records, one per stream URL.
pub fn extract_tracks(markup: &str) -> Vec<TrackRecord> {
    let urls = media_urls(markup);
    let titles = titles(markup);
    let artists = artists(markup);

    if urls.len() != titles.len() || urls.len() != artists.len() {
        tracing::debug!(
            urls = urls.len(),
            titles = titles.len(),
            artists = artists.len(),
            "field counts differ, keeping stream URLs only"
        );
        return urls.into_iter().map(TrackRecord::unknown).collect();
    }

    urls.into_iter()
        .zip(titles)
        .zip(artists)
        .map(|((url, title), artist)| TrackRecord::new(artist, title, url))
        .collect()
}

/// Like [`extract_tracks`] but keeps only the first (main) track of the page.
pub fn extract_main_track(markup: &str) -> Option<TrackRecord> {
    extract_tracks(markup).into_iter().next()
}

fn media_urls(markup: &str) -> Vec<String> {
    STREAM_URL_RE
        .captures_iter(markup)
        .map(|c| c["url"].to_string())
        .collect()
}

fn titles(markup: &str) -> Vec<String> {
    TITLE_RE
        .captures_iter(markup)
        .map(|c| decode_unicode_escapes(&c["title"]))
        .collect()
}

fn artists(markup: &str) -> Vec<String> {
    ARTIST_RE
        .captures_iter(markup)
        .map(|c| decode_unicode_escapes(&c["artist"]))
        .collect()
}
