use url::Url;

/// Converts a watch or short link into an embeddable player URL.
///
/// Returns an empty string when the link is not a recognizable YouTube URL.
pub fn to_embed_url(raw: &str) -> String {
    let Ok(parsed) = Url::parse(raw.trim()) else {
        return String::new();
    };
    let host = parsed.host_str().unwrap_or("").to_lowercase();

    let video_id = if host.contains("youtu.be") {
        parsed.path().trim_start_matches('/').to_string()
    } else if host.contains("youtube.com") {
        parsed
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default()
    } else {
        String::new()
    };

    if video_id.is_empty() {
        return String::new();
    }
    format!("https://www.youtube.com/embed/{}", video_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_watch_links() {
        assert_eq!(
            to_embed_url("https://www.youtube.com/watch?v=abc123&t=10"),
            "https://www.youtube.com/embed/abc123"
        );
    }

    #[test]
    fn converts_short_links() {
        assert_eq!(
            to_embed_url("https://youtu.be/xyz789"),
            "https://www.youtube.com/embed/xyz789"
        );
    }

    #[test]
    fn rejects_other_links() {
        assert_eq!(to_embed_url("https://vimeo.com/123"), "");
        assert_eq!(to_embed_url("https://www.youtube.com/"), "");
        assert_eq!(to_embed_url("not a url"), "");
        assert_eq!(to_embed_url(""), "");
    }
}
