use std::time::{Duration, Instant};

use crate::error::PortalError;
use crate::transport::Connection;

/// Compute the deadline for a polling read, `None` meaning "poll forever".
pub(crate) fn deadline_after(timeout: Option<Duration>) -> Option<Instant> {
    timeout.map(|t| Instant::now() + t)
}

/// Poll the connection until a byte is available.
///
/// # Errors
///
/// [`PortalError::ConnectionClosed`] if the peer disconnects with no byte
/// pending, [`PortalError::DeadlineExpired`] if `deadline` passes first.
pub(crate) fn poll_byte<C: Connection>(
    conn: &mut C,
    deadline: Option<Instant>,
) -> Result<u8, PortalError> {
    loop {
        if conn.byte_available() {
            if let Some(byte) = conn.read_byte() {
                return Ok(byte);
            }
        }
        if !conn.is_connected() {
            return Err(PortalError::ConnectionClosed);
        }
        if let Some(d) = deadline {
            if Instant::now() >= d {
                return Err(PortalError::DeadlineExpired);
            }
        }
    }
}

/// Incremental line reassembly over a polled byte stream.
///
/// The accumulator is owned by the reader, filled one byte per poll, and
/// cleared each time a line is handed out; text is never retained across
/// lines. Carriage returns are discarded wherever they appear, so both
/// `CRLF` and bare `LF` terminate a line identically.
#[derive(Debug, Default)]
pub struct LineReader {
    buf: Vec<u8>,
}

impl LineReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read bytes until a line feed and return the accumulated line.
    ///
    /// A `timeout` of `None` polls indefinitely (the original device
    /// behavior); `Some(t)` arms a fresh deadline for this call.
    ///
    /// # Errors
    ///
    /// [`PortalError::ConnectionClosed`] if the peer disconnects mid-line,
    /// [`PortalError::DeadlineExpired`] if the deadline passes first. The
    /// partial line stays buffered, so a retried call resumes where the
    /// previous one stopped.
    pub fn next_line<C: Connection>(
        &mut self,
        conn: &mut C,
        timeout: Option<Duration>,
    ) -> Result<String, PortalError> {
        let deadline = deadline_after(timeout);
        loop {
            let byte = poll_byte(conn, deadline)?;
            match byte {
                b'\n' => {
                    let line = String::from_utf8_lossy(&self.buf).into_owned();
                    self.buf.clear();
                    return Ok(line);
                }
                b'\r' => {}
                other => self.buf.push(other),
            }
        }
    }
}
