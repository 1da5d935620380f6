use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// RequestKind
// ---------------------------------------------------------------------------

/// Classification of a request's first non-blank line.
///
/// The portal only distinguishes `GET` (serve the configuration form) from
/// `POST` (consume a form submission); everything else is skipped by the
/// session, which keeps reading lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Get,
    Post,
    Other,
}

impl RequestKind {
    /// Classify a request line by its prefix.
    ///
    /// The match is case-sensitive: `get / HTTP/1.1` is [`RequestKind::Other`].
    pub fn classify(line: &str) -> Self {
        if line.starts_with("GET") {
            Self::Get
        } else if line.starts_with("POST") {
            Self::Post
        } else {
            Self::Other
        }
    }

    /// Return the kind as a static string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ProvisioningResult
// ---------------------------------------------------------------------------

/// The values captured from a completed configuration form submission.
///
/// All three fields are trimmed and set together; a partially filled result
/// is never observable. A value exists only for sessions that reached the
/// complete state — sessions that served the form or were dropped by the
/// peer yield no result at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisioningResult {
    /// SSID of the network the node should join.
    pub ssid: String,
    /// Password for that network (may be empty for open networks).
    pub password: String,
    /// IPv4 address of the companion display, as entered.
    pub display_ip: String,
}

impl ProvisioningResult {
    /// Serialize the result to a JSON string.
    ///
    /// When `pretty` is `true` the output is indented for readability.
    pub fn to_json(&self, pretty: bool) -> String {
        let rendered = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        rendered.unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

// ---------------------------------------------------------------------------
// Tests (unit)
// ---------------------------------------------------------------------------
