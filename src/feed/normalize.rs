//! Link normalization.
//!
//! Candidate links are reduced to the canonical long form
//! `http://www.youtube.com/watch?v=<id>`. Anything that is not a video link
//! on the target platform normalizes to `None`.

use url::{form_urlencoded, Url};

/// Prefix of every canonical video URL.
pub const CANONICAL_WATCH_URL: &str = "http://www.youtube.com/watch?v=";

const LONG_FORM_DOMAIN: &str = "youtube.com";
const SHORT_FORM_DOMAIN: &str = "youtu.be";

fn host_matches(host: &str, domain: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == domain || host.ends_with(&format!(".{domain}"))
}

fn canonical(video_id: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(video_id.as_bytes()).collect();
    format!("{CANONICAL_WATCH_URL}{encoded}")
}

/// Canonical URL for a long-form link (`youtube.com/watch?v=...`).
pub fn normalize_long_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    if !host_matches(url.host_str()?, LONG_FORM_DOMAIN) {
        return None;
    }
    query_video_id(&url).map(|id| canonical(&id))
}

/// Canonical URL for a short-form link (`youtu.be/<id>`).
pub fn normalize_short_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    if !host_matches(url.host_str()?, SHORT_FORM_DOMAIN) {
        return None;
    }
    let id = url.path_segments()?.next()?;
    if id.is_empty() {
        return None;
    }
    Some(canonical(id))
}

/// Canonical URL for any supported video link.
pub fn normalize_url(raw: &str) -> Option<String> {
    normalize_long_url(raw).or_else(|| normalize_short_url(raw))
}

fn query_video_id(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
}

/// Video id of a normalized (or any long-form) URL.
pub fn video_id(url: &str) -> Option<String> {
    Url::parse(url).ok().as_ref().and_then(query_video_id)
}

/// Join a site-relative permalink onto the feed's base URL.
pub fn absolute_permalink(base_url: &str, permalink: &str) -> String {
    if permalink.starts_with("http://") || permalink.starts_with("https://") {
        return permalink.to_string();
    }
    format!("{}{}", base_url.trim_end_matches('/'), permalink)
}

/// Decode HTML entities in feed text.
///
/// Named entities outside the common set are kept verbatim.
pub fn decode_entities(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        result.push_str(&rest[..start]);
        let candidate = &rest[start + 1..];

        let decoded = candidate
            .find(';')
            .filter(|&end| end > 0 && end <= 10)
            .and_then(|end| decode_entity(&candidate[..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                result.push(c);
                rest = &candidate[end + 1..];
            }
            None => {
                result.push('&');
                rest = candidate;
            }
        }
    }
    result.push_str(rest);
    result
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => parse_numeric_entity(entity).and_then(char::from_u32),
    }
}

/// Parse a numeric entity body ("#123" or "#x7B").
fn parse_numeric_entity(entity: &str) -> Option<u32> {
    let digits = entity.strip_prefix('#')?;
    match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => digits.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_url() {
        assert_eq!(
            normalize_short_url("http://youtu.be/wRpHf4X7FNM").as_deref(),
            Some("http://www.youtube.com/watch?v=wRpHf4X7FNM")
        );
    }

    #[test]
    fn test_short_url_rejects_long_form() {
        assert_eq!(
            normalize_short_url("http://www.youtube.com/watch?v=wRpHf4X7FNM"),
            None
        );
    }

    #[test]
    fn test_short_url_rejects_other_domain() {
        assert_eq!(normalize_short_url("http://i.imgur.com/2A2IS5z.jpg"), None);
    }

    #[test]
    fn test_short_url_without_id() {
        assert_eq!(normalize_short_url("http://youtu.be/"), None);
    }

    #[test]
    fn test_long_url() {
        assert_eq!(
            normalize_long_url("http://www.youtube.com/watch?v=wRpHf4X7FNM").as_deref(),
            Some("http://www.youtube.com/watch?v=wRpHf4X7FNM")
        );
    }

    #[test]
    fn test_long_url_drops_extra_parameters() {
        assert_eq!(
            normalize_long_url("https://m.youtube.com/watch?feature=share&v=wRpHf4X7FNM&t=42")
                .as_deref(),
            Some("http://www.youtube.com/watch?v=wRpHf4X7FNM")
        );
    }

    #[test]
    fn test_long_url_without_v() {
        assert_eq!(normalize_long_url("http://www.youtube.com/v/wRpHf4X7FNM"), None);
        assert_eq!(normalize_long_url("http://www.youtube.com/watch?v="), None);
    }

    #[test]
    fn test_long_url_rejects_short_form() {
        assert_eq!(normalize_long_url("http://youtu.be/wRpHf4X7FNM"), None);
    }

    #[test]
    fn test_lookalike_domain_rejected() {
        assert_eq!(
            normalize_url("http://notyoutube.com/watch?v=wRpHf4X7FNM"),
            None
        );
    }

    #[test]
    fn test_normalize_dispatch() {
        assert_eq!(
            normalize_url("http://youtu.be/wRpHf4X7FNM").as_deref(),
            Some("http://www.youtube.com/watch?v=wRpHf4X7FNM")
        );
        assert_eq!(
            normalize_url("http://www.youtube.com/watch?v=wRpHf4X7FNM").as_deref(),
            Some("http://www.youtube.com/watch?v=wRpHf4X7FNM")
        );
        assert_eq!(normalize_url("http://i.imgur.com/2A2IS5z.jpg"), None);
        assert_eq!(normalize_url("not a url"), None);
    }

    #[test]
    fn test_short_and_long_forms_converge() {
        let short = normalize_url("http://youtu.be/eAUaOTLvBIM").unwrap();
        let long = normalize_url("https://youtube.com/watch?v=eAUaOTLvBIM").unwrap();
        assert_eq!(short, long);
        assert_eq!(normalize_url(&short).unwrap(), short);
    }

    #[test]
    fn test_video_id() {
        assert_eq!(
            video_id("http://www.youtube.com/watch?v=wRpHf4X7FNM").as_deref(),
            Some("wRpHf4X7FNM")
        );
        assert_eq!(video_id("http://www.youtube.com/v/wRpHf4X7FNM"), None);
    }

    #[test]
    fn test_absolute_permalink() {
        assert_eq!(
            absolute_permalink("http://www.reddit.com", "/r/futuregarage/comments/abc/x/"),
            "http://www.reddit.com/r/futuregarage/comments/abc/x/"
        );
        assert_eq!(
            absolute_permalink("http://www.reddit.com/", "/r/a/"),
            "http://www.reddit.com/r/a/"
        );
        assert_eq!(
            absolute_permalink("http://www.reddit.com", "https://example.com/p"),
            "https://example.com/p"
        );
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("Drum &amp; Bass"), "Drum & Bass");
        assert_eq!(decode_entities("&lt;3 &quot;live&quot;"), "<3 \"live\"");
        assert_eq!(decode_entities("it&#39;s"), "it's");
        assert_eq!(decode_entities("&#x3042;"), "あ");
    }

    #[test]
    fn test_decode_entities_leaves_unknown_alone() {
        assert_eq!(decode_entities("AT&T"), "AT&T");
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
        assert_eq!(decode_entities("a & b"), "a & b");
        assert_eq!(decode_entities("trailing &"), "trailing &");
    }

    #[test]
    fn test_parse_numeric_entity() {
        assert_eq!(parse_numeric_entity("#65"), Some(65));
        assert_eq!(parse_numeric_entity("#x41"), Some(65));
        assert_eq!(parse_numeric_entity("#X41"), Some(65));
        assert_eq!(parse_numeric_entity("amp"), None);
    }
}
