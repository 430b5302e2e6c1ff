//! Candidate URL extraction from chat text.
//!
//! The matcher is intentionally loose: it recognizes `scheme://` followed by a
//! run of non-whitespace that ends in one of the configured extensions,
//! optionally followed by a `?query`. No URL validation happens here; a false
//! positive only costs a failed download attempt.

use regex::{Regex, RegexBuilder};

/// Schemes recognized in chat text.
pub const SUPPORTED_SCHEMES: &[&str] = &["http", "https", "ftp"];

/// Builds the pattern source for the given extensions.
///
/// Extensions are regex-escaped, so a configured `c++` or `tar.gz` matches literally.
/// Word boundaries are ASCII-only, so a link glued to non-Latin text is still found.
pub fn build_pattern(extensions: &[String]) -> String {
    let exts = extensions
        .iter()
        .map(|ext| regex::escape(ext))
        .collect::<Vec<_>>()
        .join("|");
    format!(r"(?-u:\b)(https?|ftp)://\S*({exts})(\?\S*)?(?-u:\b)")
}

/// Scans message text for links to files with recognized extensions.
///
/// Built once from the configuration and shared read-only by the pipeline.
#[derive(Debug, Clone)]
pub struct UrlExtractor {
    pattern: Regex,
}

impl UrlExtractor {
    /// Compiles a case-insensitive matcher for the given extensions.
    ///
    /// # Errors
    ///
    /// Returns a `regex::Error` if the compiled pattern exceeds regex size limits.
    pub fn new(extensions: &[String]) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(&build_pattern(extensions))
            .case_insensitive(true)
            .build()?;
        Ok(Self { pattern })
    }

    /// The compiled pattern, for diagnostics.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Returns every matching URL in order of appearance.
    ///
    /// Repeated occurrences of the same URL are returned as separate entries.
    pub fn extract<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.pattern.find_iter(text).map(|m| m.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor(exts: &[&str]) -> UrlExtractor {
        let exts: Vec<String> = exts.iter().map(|s| s.to_string()).collect();
        UrlExtractor::new(&exts).unwrap()
    }

    #[test]
    fn test_no_match_in_plain_text() {
        let ex = extractor(&["mp3"]);
        assert!(ex.extract("nothing to see here").is_empty());
        assert!(ex.extract("").is_empty());
    }

    #[test]
    fn test_single_url_in_sentence() {
        let ex = extractor(&["mp3", "ogg"]);
        let urls = ex.extract("check this out http://example.com/music/song.mp3 nice");
        assert_eq!(urls, vec!["http://example.com/music/song.mp3"]);
    }

    #[test]
    fn test_query_string_included() {
        let ex = extractor(&["mp3"]);
        let urls = ex.extract("http://example.com/song.mp3?x=1 and more");
        assert_eq!(urls, vec!["http://example.com/song.mp3?x=1"]);
    }

    #[test]
    fn test_case_insensitive_scheme_and_extension() {
        let ex = extractor(&["flac"]);
        let urls = ex.extract("HTTPS://Example.com/Track.FLAC");
        assert_eq!(urls, vec!["HTTPS://Example.com/Track.FLAC"]);
    }

    #[test]
    fn test_only_supported_schemes() {
        let ex = extractor(&["mp3"]);
        assert!(ex.extract("gopher://example.com/song.mp3").is_empty());
        assert!(ex.extract("file:///tmp/song.mp3").is_empty());
        assert_eq!(
            ex.extract("ftp://example.com/song.mp3"),
            vec!["ftp://example.com/song.mp3"]
        );
    }

    #[test]
    fn test_unconfigured_extension_ignored() {
        let ex = extractor(&["mp3"]);
        assert!(ex.extract("http://example.com/page.html").is_empty());
    }

    #[test]
    fn test_multiple_urls_in_order_with_duplicates() {
        let ex = extractor(&["mp3", "xm"]);
        let text = "a http://a.com/1.mp3 b https://b.com/2.xm c http://a.com/1.mp3";
        assert_eq!(
            ex.extract(text),
            vec![
                "http://a.com/1.mp3",
                "https://b.com/2.xm",
                "http://a.com/1.mp3"
            ]
        );
    }

    #[test]
    fn test_trailing_punctuation_trimmed_by_word_boundary() {
        let ex = extractor(&["mp3"]);
        assert_eq!(
            ex.extract("grab http://example.com/song.mp3."),
            vec!["http://example.com/song.mp3"]
        );
        assert_eq!(
            ex.extract("(http://example.com/song.mp3)"),
            vec!["http://example.com/song.mp3"]
        );
    }

    #[test]
    fn test_url_adjacent_to_non_ascii_text() {
        let ex = extractor(&["mp3"]);
        assert_eq!(
            ex.extract("新曲http://example.com/song.mp3"),
            vec!["http://example.com/song.mp3"]
        );
        assert_eq!(
            ex.extract("http://example.com/song.mp3です"),
            vec!["http://example.com/song.mp3"]
        );
        assert_eq!(
            ex.extract("écoute http://example.com/chanson.mp3"),
            vec!["http://example.com/chanson.mp3"]
        );
    }

    #[test]
    fn test_extension_is_escaped() {
        let ex = extractor(&["tar.gz"]);
        assert!(ex.extract("http://example.com/archive.tarXgz").is_empty());
        assert_eq!(
            ex.extract("http://example.com/archive.tar.gz"),
            vec!["http://example.com/archive.tar.gz"]
        );
    }

    #[test]
    fn test_build_pattern_shape() {
        let pattern = build_pattern(&["mp3".to_string(), "ogg".to_string()]);
        assert_eq!(
            pattern,
            r"(?-u:\b)(https?|ftp)://\S*(mp3|ogg)(\?\S*)?(?-u:\b)"
        );
    }
}
