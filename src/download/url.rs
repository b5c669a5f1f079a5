//! Instagram link recognition.
//!
//! Classification is substring-based on whitespace-delimited tokens; no URL
//! well-formedness check happens here. Malformed tokens are passed through to
//! the extractor, which rejects them with its own diagnostics.

/// Host substrings that mark a token as an Instagram link
const SUPPORTED_HOSTS: &[&str] = &[
    "instagram.com",
    "www.instagram.com",
    "instagr.am",
    "www.instagr.am",
];

/// Returns true if the text contains a token naming a supported host.
#[must_use]
pub fn is_supported_link(text: &str) -> bool {
    extract_link(text).is_some()
}

/// Returns the first whitespace-delimited token containing a supported host.
#[must_use]
pub fn extract_link(text: &str) -> Option<&str> {
    text.split_whitespace().find(|token| {
        let lower = token.to_lowercase();
        SUPPORTED_HOSTS.iter().any(|host| lower.contains(host))
    })
}
