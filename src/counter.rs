//! Link counting over raw page content.
//!
//! The count is syntactic: every non-overlapping occurrence of
//! `href="http://` or `href="https://` in the body counts once. The page is
//! never parsed into a DOM, so duplicated, malformed and commented-out
//! anchors are all counted. Matching is case-sensitive.

use regex::bytes::Regex;
use std::sync::LazyLock;

/// Pattern applied to fetched content
pub const LINK_PATTERN: &str = r#"href="(http|https)://"#;

static LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(LINK_PATTERN).expect("link pattern is a valid regex")
});

/// Count absolute hyperlink references in `content`
pub fn count_links(content: &[u8]) -> usize {
    if content.is_empty() {
        return 0;
    }
    LINK_REGEX.find_iter(content).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content() {
        assert_eq!(count_links(b""), 0);
    }

    #[test]
    fn test_no_matches() {
        let html = br#"<html><body><a href="/relative">x</a><a href='https://single.quoted'>y</a></body></html>"#;
        assert_eq!(count_links(html), 0);
    }

    #[test]
    fn test_http_and_https() {
        let html = br#"<a href="https://x.com">x</a><a href="http://y.com">y</a>"#;
        assert_eq!(count_links(html), 2);
    }

    #[test]
    fn test_duplicates_and_comments_are_counted() {
        let html = br#"
            <a href="https://dup.example">a</a>
            <a href="https://dup.example">b</a>
            <!-- <a href="http://hidden.example">c</a> -->
            <link rel="stylesheet" href="https://cdn.example/style.css">
        "#;
        assert_eq!(count_links(html), 4);
    }

    #[test]
    fn test_case_sensitive() {
        let html = br#"<a HREF="https://upper.example">a</a><a href="HTTPS://upper.example">b</a>"#;
        assert_eq!(count_links(html), 0);
    }

    #[test]
    fn test_other_schemes_ignored() {
        let html = br#"<a href="ftp://files.example">a</a><a href="mailto:me@example.com">b</a><a href="httpx://nope">c</a>"#;
        assert_eq!(count_links(html), 0);
    }

    #[test]
    fn test_non_utf8_content() {
        let mut content = vec![0xff, 0xfe, 0x00];
        content.extend_from_slice(br#"<a href="https://bin.example">"#);
        content.push(0xc3);
        assert_eq!(count_links(&content), 1);
    }

    #[test]
    fn test_deterministic() {
        let html = br#"<a href="https://a"></a><a href="http://b"></a><a href="https://c"></a>"#;
        let first = count_links(html);
        for _ in 0..10 {
            assert_eq!(count_links(html), first);
        }
        assert_eq!(first, 3);
    }
}
