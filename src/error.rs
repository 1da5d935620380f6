use std::fmt;

/// Errors that can interrupt a provisioning session.
///
/// Most of the original protocol's failure modes are deliberately *not*
/// errors: a malformed form body mis-splits silently, and a missing
/// `Content-Length` simply blocks the header scan. Only the two conditions
/// below terminate a read early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalError {
    /// The peer disconnected before the session reached a terminal state.
    ConnectionClosed,
    /// A read deadline elapsed while polling for the next byte.
    ///
    /// Only produced when a timeout is configured; with
    /// `read_timeout: None` the portal polls indefinitely, matching the
    /// original device behavior.
    DeadlineExpired,
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionClosed => write!(f, "connection closed before request completed"),
            Self::DeadlineExpired => write!(f, "read deadline expired while waiting for data"),
        }
    }
}

impl std::error::Error for PortalError {}
