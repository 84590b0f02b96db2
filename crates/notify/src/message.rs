//! The one message shape this crate sends.

/// A rendered lead notification: subject, HTML body, recipient list.
///
/// Write-only artifact, built once per created lead and sent at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadNotification {
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
    /// Resolved recipient addresses (already trimmed, non-empty).
    pub recipients: Vec<String>,
}

/// Split a comma-separated recipient list, trimming whitespace and dropping
/// empty entries.
#[must_use]
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
