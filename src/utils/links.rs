use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::policy::ALLOWED_LINKS;

static LINK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+").expect("link pattern is valid"));

/// All `http(s)://` links in a text, up to the next whitespace
pub fn extract_links(text: &str) -> Vec<&str> {
    LINK_REGEX.find_iter(text).map(|m| m.as_str()).collect()
}

/// True when the text contains at least one link that is not an exact match
/// for an allow-listed URL
pub fn contains_bad_link(text: &str) -> bool {
    extract_links(text)
        .into_iter()
        .any(|link| !ALLOWED_LINKS.contains(&link))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_clean() {
        assert!(!contains_bad_link("hello everyone, see you at 6"));
        assert!(!contains_bad_link(""));
    }

    #[test]
    fn test_allow_listed_links_are_clean() {
        assert!(!contains_bad_link("join https://t.me/ChatTTMD"));
        assert!(!contains_bad_link(
            "https://t.me/TikTokModDownload and https://t.me/ChatTTMD"
        ));
    }

    #[test]
    fn test_foreign_link_is_bad() {
        assert!(contains_bad_link("free stuff at https://example.com/x"));
        assert!(contains_bad_link("http://spam.io"));
    }

    #[test]
    fn test_one_bad_link_taints_the_message() {
        assert!(contains_bad_link(
            "https://t.me/ChatTTMD but also https://evil.example"
        ));
    }

    #[test]
    fn test_match_is_exact() {
        // scheme and trailing characters are part of the comparison
        assert!(contains_bad_link("http://t.me/ChatTTMD"));
        assert!(contains_bad_link("https://t.me/ChatTTMD/123"));
    }

    #[test]
    fn test_extract_links_stops_at_whitespace() {
        assert_eq!(
            extract_links("a https://a.b/c d http://e.f"),
            vec!["https://a.b/c", "http://e.f"]
        );
    }
}
