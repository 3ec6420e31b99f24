//! Embeddable playlist URLs.

use url::form_urlencoded;

use crate::feed::{video_id, Record};
use crate::{FlockError, Result};

/// Embed endpoint; the first video id is appended as the last path segment.
pub const EMBED_BASE_URL: &str = "http://www.youtube.com/embed/";

/// Player options attached to every playlist URL.
const EMBED_OPTIONS: [(&str, &str); 6] = [
    ("autohide", "0"),
    ("showinfo", "1"),
    ("modestbranding", "1"),
    ("rel", "0"),
    ("enablejsapi", "1"),
    ("version", "3"),
];

/// Build the embed URL playing `records` in order.
///
/// The first video is the embed target and the rest go into the comma-joined
/// `playlist` parameter, which is present but empty for a single video.
/// Records whose URL carries no video id are skipped.
pub fn build_playlist_url(records: &[Record]) -> Result<String> {
    let mut ids = records.iter().filter_map(|record| video_id(&record.url));

    let first = ids
        .next()
        .ok_or_else(|| FlockError::Playlist("no video ids to embed".to_string()))?;
    let playlist = ids.collect::<Vec<_>>().join(",");

    let mut query = form_urlencoded::Serializer::new(String::new());
    query.extend_pairs(EMBED_OPTIONS);
    query.append_pair("playlist", &playlist);

    Ok(format!(
        "{EMBED_BASE_URL}{}?{}",
        urlencoding::encode(&first),
        query.finish()
    ))
}
