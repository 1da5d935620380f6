use log::debug;
use std::time::Duration;

use crate::body::{self, LENGTH_COMPENSATION};
use crate::error::PortalError;
use crate::form;
use crate::page;
use crate::reader::LineReader;
use crate::transport::Connection;
use crate::types::{ProvisioningResult, RequestKind};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Which form-body decoding algorithm a session applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormDecoding {
    /// The original fixed-position split at the first and last `&`
    /// ([`crate::form::split_ordinal`]). Wire-for-wire compatible, including
    /// its silent mis-splits on malformed bodies.
    #[default]
    Ordinal,
    /// Key-based urlencoded decoding ([`crate::form::decode_generic`]).
    Generic,
}

/// Tunable behavior of a provisioning session.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Deadline applied to each polling read. `None` (the default)
    /// reproduces the original indefinite busy-poll; setting a value makes
    /// a stalled peer surface as [`PortalError::DeadlineExpired`] instead
    /// of hanging the portal.
    pub read_timeout: Option<Duration>,
    /// Raw bytes consumed beyond the declared `Content-Length`
    /// (default: [`LENGTH_COMPENSATION`]).
    pub length_compensation: usize,
    /// Form-body decoding algorithm (default: [`FormDecoding::Ordinal`]).
    pub form_decoding: FormDecoding,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            read_timeout: None,
            length_compensation: LENGTH_COMPENSATION,
            form_decoding: FormDecoding::Ordinal,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Terminal state of a provisioning session.
///
/// A [`ProvisioningResult`] exists if and only if the session completed a
/// POST; the other outcomes carry nothing, so a partial result is not
/// representable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// A GET arrived and the configuration page was served.
    ServedForm,
    /// A POST was fully consumed and parsed.
    Complete(ProvisioningResult),
    /// The peer disconnected before a terminal state was reached.
    Aborted,
}

/// Per-connection state machine driving one request to a terminal state.
///
/// Flow: skip blank and unrecognized lines until the first GET or POST. GET
/// serves the static form and stops. POST scans for `Content-Length`,
/// consumes the adjusted raw body, and hands it to the field parser.
pub struct Session<'a> {
    config: &'a PortalConfig,
    reader: LineReader,
}

impl<'a> Session<'a> {
    pub fn new(config: &'a PortalConfig) -> Self {
        Self {
            config,
            reader: LineReader::new(),
        }
    }

    /// Drive the session over one connection until a terminal state.
    ///
    /// A peer disconnect at any point maps to `Ok(SessionOutcome::Aborted)`
    /// — it is an expected end state, not a failure of the portal.
    ///
    /// # Errors
    ///
    /// [`PortalError::DeadlineExpired`] when a configured read timeout
    /// elapses; never returned with `read_timeout: None`.
    pub fn run<C: Connection>(mut self, conn: &mut C) -> Result<SessionOutcome, PortalError> {
        let timeout = self.config.read_timeout;

        // AWAIT_REQUEST_LINE: first non-blank line that classifies.
        let kind = loop {
            let line = match self.reader.next_line(conn, timeout) {
                Ok(line) => line,
                Err(PortalError::ConnectionClosed) => return Ok(SessionOutcome::Aborted),
                Err(e) => return Err(e),
            };
            if line.is_empty() {
                continue;
            }
            match RequestKind::classify(&line) {
                RequestKind::Other => continue,
                kind => {
                    debug!("request classified as {kind}: {line}");
                    break kind;
                }
            }
        };

        if kind == RequestKind::Get {
            // SERVE_FORM: emit the page, read nothing further.
            page::serve_form(conn);
            debug!("served configuration page");
            return Ok(SessionOutcome::ServedForm);
        }

        // AWAIT_CONTENT_LENGTH.
        let declared = match body::await_declared_length(&mut self.reader, conn, timeout) {
            Ok(declared) => declared,
            Err(PortalError::ConnectionClosed) => return Ok(SessionOutcome::Aborted),
            Err(e) => return Err(e),
        };
        // Saturate rather than overflow: a hostile Content-Length must not
        // crash the portal, it just reads until the peer gives up.
        let adjusted = declared.saturating_add(self.config.length_compensation);
        debug!("consuming body: declared {declared}, adjusted {adjusted}");

        // CONSUME_BODY.
        let form_body = match body::read_body(conn, adjusted, timeout) {
            Ok(form_body) => form_body,
            Err(PortalError::ConnectionClosed) => return Ok(SessionOutcome::Aborted),
            Err(e) => return Err(e),
        };

        // COMPLETE.
        let result = match self.config.form_decoding {
            FormDecoding::Ordinal => form::split_ordinal(&form_body),
            FormDecoding::Generic => form::decode_generic(&form_body),
        };
        debug!(
            "provisioning captured: ssid {:?}, display {}",
            result.ssid, result.display_ip
        );
        Ok(SessionOutcome::Complete(result))
    }
}
