//! Download error taxonomy and extractor diagnostic classification.
//!
//! yt-dlp reports failures as free-form text, so classification is
//! substring matching against known upstream messages. The pattern tables
//! below are the single place that matching lives; every known upstream
//! wording has a test fixture so a silent upstream change degrades loudly.

use crate::config::MAX_ERROR_DISPLAY_CHARS;
use crate::utils::truncate_str;
use thiserror::Error;

/// Diagnostic substrings indicating expired or missing authentication
const CREDENTIAL_PATTERNS: &[&str] = &["unreachable", "login", "sign in"];

/// Diagnostic substrings indicating deleted or private content
const UNAVAILABLE_PATTERNS: &[&str] = &["video unavailable"];

/// Errors produced by the extraction and resolution stages
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Extraction needs a fresh cookies file
    #[error("cookies expired or invalid")]
    CredentialsExpired,

    /// Content deleted, private, or otherwise gone
    #[error("content unavailable")]
    ContentUnavailable,

    /// Extractor reported success but the run produced no usable files
    #[error("download completed but no files were found")]
    NoArtifacts,

    /// Extraction exceeded the configured time budget and was killed
    #[error("extraction timed out after {0} seconds")]
    Timeout(u64),

    /// Any other extractor failure, carrying the raw diagnostic
    #[error("download error: {0}")]
    Extractor(String),

    /// The yt-dlp binary could not be launched
    #[error("failed to launch yt-dlp: {0}")]
    Spawn(#[source] std::io::Error),

    /// Filesystem fault while resolving artifacts
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Map free-form extractor diagnostic text to a download error.
///
/// Matching is case-insensitive. Unrecognized text becomes
/// [`DownloadError::Extractor`] with the diagnostic preserved verbatim.
#[must_use]
pub fn classify(diagnostic: &str) -> DownloadError {
    let lower = diagnostic.to_lowercase();
    if CREDENTIAL_PATTERNS.iter().any(|p| lower.contains(p)) {
        DownloadError::CredentialsExpired
    } else if UNAVAILABLE_PATTERNS.iter().any(|p| lower.contains(p)) {
        DownloadError::ContentUnavailable
    } else {
        DownloadError::Extractor(diagnostic.to_string())
    }
}

impl DownloadError {
    /// User-facing HTML message for this failure.
    ///
    /// Raw diagnostics are truncated to [`MAX_ERROR_DISPLAY_CHARS`] and
    /// HTML-escaped before display; the full text is only ever logged.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::CredentialsExpired => "⚠️ <b>Cookies Expired or Invalid</b>\n\n\
                 Please update the <code>COOKIES_CONTENT</code> variable and restart the bot."
                .to_string(),
            Self::ContentUnavailable => "⚠️ <b>Content Unavailable</b>\n\n\
                 The story/video might have been deleted or is private."
                .to_string(),
            Self::NoArtifacts => {
                "❌ Download completed but no files were found.".to_string()
            }
            Self::Timeout(secs) => {
                format!("❌ Download timed out after {secs} seconds. Please try again.")
            }
            Self::Extractor(msg) => {
                let shown = html_escape::encode_text(&truncate_str(msg, MAX_ERROR_DISPLAY_CHARS))
                    .to_string();
                format!("❌ <b>Download Error:</b>\n<code>{shown}...</code>")
            }
            Self::Spawn(_) | Self::Io(_) => {
                "❌ An internal error occurred. Please try again later.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One fixture per known upstream message, so wording changes in yt-dlp
    // show up as test failures instead of silent Generic degradation.

    #[test]
    fn test_sign_in_classifies_as_credentials() {
        let err = classify("ERROR: [Instagram] Sign in to confirm you're not a bot");
        assert!(matches!(err, DownloadError::CredentialsExpired));
    }

    #[test]
    fn test_login_required_classifies_as_credentials() {
        let err = classify("ERROR: [Instagram] abc: login required to access this content");
        assert!(matches!(err, DownloadError::CredentialsExpired));
    }

    #[test]
    fn test_unreachable_classifies_as_credentials() {
        let err = classify("ERROR: This webpage is unreachable");
        assert!(matches!(err, DownloadError::CredentialsExpired));
    }

    #[test]
    fn test_video_unavailable_classifies_as_content_unavailable() {
        let err = classify("ERROR: Video unavailable");
        assert!(matches!(err, DownloadError::ContentUnavailable));
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        assert!(matches!(
            classify("SIGN IN to continue"),
            DownloadError::CredentialsExpired
        ));
        assert!(matches!(
            classify("video UNAVAILABLE"),
            DownloadError::ContentUnavailable
        ));
    }

    #[test]
    fn test_unknown_text_is_generic() {
        let err = classify("ERROR: Unsupported URL: https://example.com");
        match err {
            DownloadError::Extractor(msg) => {
                assert_eq!(msg, "ERROR: Unsupported URL: https://example.com");
            }
            other => panic!("expected Extractor, got {other:?}"),
        }
    }

    #[test]
    fn test_generic_message_is_truncated_for_display() {
        let long = "x".repeat(500);
        let err = classify(&long);
        let shown = err.user_message();
        // Bounded display: 100 chars of diagnostic plus fixed framing
        assert!(shown.contains(&"x".repeat(MAX_ERROR_DISPLAY_CHARS)));
        assert!(!shown.contains(&"x".repeat(MAX_ERROR_DISPLAY_CHARS + 1)));
    }

    #[test]
    fn test_generic_message_is_html_escaped() {
        let err = classify("failed <tag> & co");
        let shown = err.user_message();
        assert!(shown.contains("&lt;tag&gt;"));
        assert!(!shown.contains("<tag>"));
    }

    #[test]
    fn test_credentials_message_mentions_cookies() {
        let msg = DownloadError::CredentialsExpired.user_message();
        assert!(msg.contains("COOKIES_CONTENT"));
    }
}
