use std::time::Duration;

use crate::error::PortalError;
use crate::reader::{self, LineReader};
use crate::transport::Connection;

/// Extra raw bytes consumed beyond the declared `Content-Length`.
///
/// The client the original device was written against sends
/// `Accept-Language: en-US` — exactly 22 non-CRLF bytes — between the
/// `Content-Length` header and the body, and the header scan stops at the
/// `Content-Length` line, leaving those bytes unread. The device papers
/// over this by counting them as body. Reproduced literally for wire
/// compatibility; see [`PortalConfig`](crate::PortalConfig) to override.
pub const LENGTH_COMPENSATION: usize = 22;

/// Parse a `Content-Length:` header line into its declared value.
///
/// The prefix match is case-sensitive. Returns `None` for non-matching
/// lines and for matching lines whose remainder does not trim to a
/// non-negative integer — the header scan keeps waiting in both cases.
pub fn parse_content_length(line: &str) -> Option<usize> {
    let rest = line.strip_prefix("Content-Length:")?;
    rest.trim().parse().ok()
}

/// Read header lines until one declares a content length.
///
/// Blocks (polling) until a parsable `Content-Length:` line arrives. There
/// is no fallback: a POST without one holds the session here until the peer
/// disconnects or the deadline expires.
///
/// # Errors
///
/// Propagates [`PortalError`] from the underlying line reads.
pub fn await_declared_length<C: Connection>(
    reader: &mut LineReader,
    conn: &mut C,
    timeout: Option<Duration>,
) -> Result<usize, PortalError> {
    loop {
        let line = reader.next_line(conn, timeout)?;
        if let Some(declared) = parse_content_length(&line) {
            return Ok(declared);
        }
    }
}

/// Consume exactly `adjusted_len` counted bytes of raw body.
///
/// Single-byte polled reads: every byte that is not CR or LF is appended
/// and decrements the remaining count; CR and LF are read and discarded
/// without decrementing. The returned body therefore contains `adjusted_len`
/// characters with all line breaks squeezed out.
///
/// # Errors
///
/// [`PortalError::ConnectionClosed`] if the peer disconnects before the
/// count is satisfied (the partial body is discarded),
/// [`PortalError::DeadlineExpired`] if the per-call deadline passes.
pub fn read_body<C: Connection>(
    conn: &mut C,
    adjusted_len: usize,
    timeout: Option<Duration>,
) -> Result<String, PortalError> {
    let deadline = reader::deadline_after(timeout);
    // Cap the preallocation: the declared length is peer-controlled and
    // must not translate into a giant up-front allocation.
    let mut buf = Vec::with_capacity(adjusted_len.min(65_536));
    let mut remaining = adjusted_len;
    while remaining > 0 {
        let byte = reader::poll_byte(conn, deadline)?;
        if byte != b'\r' && byte != b'\n' {
            buf.push(byte);
            remaining -= 1;
        }
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
