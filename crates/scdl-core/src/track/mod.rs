//! Track records extracted from a page.

mod sanitize;

pub use sanitize::{is_legal_file_name, sanitize_file_name, NAME_MAX};

use std::collections::HashSet;

use crate::storage::TEMP_SUFFIX;
use sanitize::truncate_name;

/// Extension appended to every downloaded track.
pub const MEDIA_EXTENSION: &str = ".mp3";

/// Longest stem that still leaves room for the extension and the temp suffix.
const MAX_STEM_BYTES: usize = NAME_MAX - MEDIA_EXTENSION.len() - TEMP_SUFFIX.len();

/// Placeholder used for artist and title when page fields cannot be paired with a stream URL.
pub const UNKNOWN: &str = "Unknown";

/// One song's artist, title and media URL.
///
/// Immutable once built; fields are only readable through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackRecord {
    artist: String,
    title: String,
    media_url: String,
}

impl TrackRecord {
    pub fn new(
        artist: impl Into<String>,
        title: impl Into<String>,
        media_url: impl Into<String>,
    ) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            media_url: media_url.into(),
        }
    }

    /// Record carrying only the media URL (`Unknown - Unknown`).
    pub fn unknown(media_url: impl Into<String>) -> Self {
        Self::new(UNKNOWN, UNKNOWN, media_url)
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn media_url(&self) -> &str {
        &self.media_url
    }

    /// `"<artist> - <title>"`.
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }

    /// Display name with illegal characters removed and the media extension appended.
    ///
    /// Short enough that the `.part` temp name also fits in [`NAME_MAX`].
    pub fn file_name(&self) -> String {
        self.numbered_file_name(1)
    }

    /// `file_name` with ` (n)` before the extension for `n > 1`.
    fn numbered_file_name(&self, n: usize) -> String {
        let suffix = if n > 1 { format!(" ({})", n) } else { String::new() };
        let stem = sanitize_file_name(&self.display_name());
        let stem = truncate_name(&stem, MAX_STEM_BYTES - suffix.len());
        format!("{}{}{}", stem, suffix, MEDIA_EXTENSION)
    }
}

/// One file name per track, distinct within the list (compared case-insensitively).
///
/// The first track keeps its plain name; later tracks with the same name get
/// ` (2)`, ` (3)` and so on.
pub fn unique_file_names(tracks: &[TrackRecord]) -> Vec<String> {
    let mut used = HashSet::new();
    tracks
        .iter()
        .map(|track| {
            let mut n = 1;
            loop {
                let name = track.numbered_file_name(n);
                if used.insert(name.to_lowercase()) {
                    return name;
                }
                n += 1;
            }
        })
        .collect()
}

impl std::fmt::Display for TrackRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}
