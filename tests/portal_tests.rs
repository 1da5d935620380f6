use std::collections::VecDeque;
use std::time::Duration;

use softap_portal::{
    Connection, FormDecoding, Listener, PortalConfig, PortalError, ProvisioningPortal, Session,
    SessionOutcome, form_response, parse_form_body,
};

// =========================================================================
// Scripted transport doubles
// =========================================================================

/// A connection fed from a fixed byte script. Once the script drains the
/// connection reports closed, unless `hold_open` models a silent peer that
/// stays connected without sending anything.
struct ScriptedConnection {
    incoming: VecDeque<u8>,
    written: Vec<u8>,
    hold_open: bool,
    closed: bool,
}

impl ScriptedConnection {
    fn new(script: &[u8]) -> Self {
        Self {
            incoming: script.iter().copied().collect(),
            written: Vec::new(),
            hold_open: false,
            closed: false,
        }
    }

    fn silent() -> Self {
        let mut conn = Self::new(b"");
        conn.hold_open = true;
        conn
    }
}

impl Connection for ScriptedConnection {
    fn byte_available(&mut self) -> bool {
        !self.closed && !self.incoming.is_empty()
    }

    fn read_byte(&mut self) -> Option<u8> {
        if self.closed {
            None
        } else {
            self.incoming.pop_front()
        }
    }

    fn is_connected(&self) -> bool {
        !self.closed && (self.hold_open || !self.incoming.is_empty())
    }

    fn write_all(&mut self, data: &[u8]) {
        self.written.extend_from_slice(data);
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// A listener handing out a fixed sequence of scripted connections.
struct ScriptedListener {
    queue: VecDeque<ScriptedConnection>,
}

impl ScriptedListener {
    fn new(conns: Vec<ScriptedConnection>) -> Self {
        Self {
            queue: conns.into(),
        }
    }
}

impl Listener for ScriptedListener {
    type Conn = ScriptedConnection;

    fn poll_accept(&mut self) -> Option<ScriptedConnection> {
        self.queue.pop_front()
    }
}

fn run_session(conn: &mut ScriptedConnection) -> Result<SessionOutcome, PortalError> {
    run_session_with(conn, &PortalConfig::default())
}

fn run_session_with(
    conn: &mut ScriptedConnection,
    config: &PortalConfig,
) -> Result<SessionOutcome, PortalError> {
    Session::new(config).run(conn)
}

// =========================================================================
// GET: serving the configuration page
// =========================================================================

#[test]
fn get_serves_the_form_and_yields_no_result() {
    let mut conn = ScriptedConnection::new(
        b"GET / HTTP/1.1\r\nHost: 192.168.4.1\r\nAccept: text/html\r\n\r\n",
    );
    let outcome = run_session(&mut conn).expect("session should terminate");
    assert_eq!(outcome, SessionOutcome::ServedForm);
    assert_eq!(conn.written, form_response().as_bytes());
}

#[test]
fn get_stops_reading_after_the_request_line() {
    let mut conn =
        ScriptedConnection::new(b"GET / HTTP/1.1\r\nHost: 192.168.4.1\r\nAccept: text/html\r\n\r\n");
    run_session(&mut conn).expect("session should terminate");
    // Everything after the first line is left on the wire.
    assert!(!conn.incoming.is_empty());
}

#[test]
fn served_page_is_byte_identical_across_connections() {
    let mut first = ScriptedConnection::new(b"GET / HTTP/1.1\r\n");
    let mut second = ScriptedConnection::new(b"GET /anything?x=1 HTTP/1.1\r\n");
    run_session(&mut first).expect("first session");
    run_session(&mut second).expect("second session");
    assert_eq!(first.written, second.written);
}

#[test]
fn blank_and_unrecognized_lines_are_skipped() {
    let mut conn =
        ScriptedConnection::new(b"\r\nOPTIONS / HTTP/1.1\r\nX-Noise: 1\r\nGET / HTTP/1.1\r\n");
    let outcome = run_session(&mut conn).expect("session should terminate");
    assert_eq!(outcome, SessionOutcome::ServedForm);
}

#[test]
fn lowercase_method_is_not_classified() {
    // Case-sensitive classifier: "get" is skipped, the later GET matches.
    let mut conn = ScriptedConnection::new(b"get / HTTP/1.1\r\nGET / HTTP/1.1\r\n");
    let outcome = run_session(&mut conn).expect("session should terminate");
    assert_eq!(outcome, SessionOutcome::ServedForm);
}

#[test]
fn bare_lf_lines_parse_like_crlf() {
    let mut conn = ScriptedConnection::new(b"GET / HTTP/1.1\n");
    let outcome = run_session(&mut conn).expect("session should terminate");
    assert_eq!(outcome, SessionOutcome::ServedForm);
}

// =========================================================================
// POST: body extraction and field parsing
// =========================================================================

#[test]
fn browser_style_post_round_trips_all_three_fields() {
    // The wire flow the device was written against: the header scan stops
    // at Content-Length, so the Accept-Language header (22 non-CRLF bytes,
    // the origin of the compensation constant) is consumed as body and the
    // ordinal split still recovers the values.
    let body = "ssid=My+Home&password=secret&ipaddress=192.168.1.5";
    assert_eq!(body.len(), 50);
    let request = format!(
        "POST \\ HTTP/1.1\r\n\
         Host: 192.168.4.1\r\n\
         Content-Length: 50\r\n\
         Accept-Language: en-US\r\n\
         \r\n\
         {body}"
    );
    let mut conn = ScriptedConnection::new(request.as_bytes());
    let outcome = run_session(&mut conn).expect("session should terminate");
    match outcome {
        SessionOutcome::Complete(result) => {
            assert_eq!(result.ssid, "My Home");
            assert_eq!(result.password, "secret");
            assert_eq!(result.display_ip, "192.168.1.5");
        }
        other => panic!("expected Complete, got {other:?}"),
    }
}

#[test]
fn declared_length_ten_consumes_thirty_two_counted_bytes() {
    // 21 filler characters (no '&' or '=') followed by the form data make
    // up the 10 + 22 counted bytes; the split lands on the trailing fields.
    let filler = "ACCEPTLANGUAGEPADDING";
    assert_eq!(filler.len(), 21);
    let request = format!(
        "POST / HTTP/1.1\r\nContent-Length: 10\r\n{filler}\r\na=1&b=2&c=3"
    );
    let mut conn = ScriptedConnection::new(request.as_bytes());
    let outcome = run_session(&mut conn).expect("session should terminate");
    match outcome {
        SessionOutcome::Complete(result) => {
            assert_eq!(result.ssid, "1");
            assert_eq!(result.password, "2");
            assert_eq!(result.display_ip, "3");
        }
        other => panic!("expected Complete, got {other:?}"),
    }
}

#[test]
fn zero_declared_length_still_consumes_the_compensation_bytes() {
    // Content-Length: 0 must still pull exactly 22 counted bytes before
    // parsing. The trailing CRLF and the extra bytes stay unread.
    let request = b"POST / HTTP/1.1\r\nContent-Length: 0\r\nAccept-Language: en-US\r\nXYZ";
    let mut conn = ScriptedConnection::new(request);
    let outcome = run_session(&mut conn).expect("session should terminate");
    assert!(matches!(outcome, SessionOutcome::Complete(_)));
    assert_eq!(conn.incoming.len(), "\r\nXYZ".len());
}

#[test]
fn crlf_bytes_inside_the_body_do_not_count() {
    let config = PortalConfig {
        length_compensation: 0,
        ..PortalConfig::default()
    };
    // 11 counted bytes arrive split across several wire lines.
    let request = b"POST / HTTP/1.1\r\nContent-Length: 11\r\na=1\r\n&b=2\r\n&c=3\r\n";
    let mut conn = ScriptedConnection::new(request);
    let outcome = run_session_with(&mut conn, &config).expect("session should terminate");
    match outcome {
        SessionOutcome::Complete(result) => {
            assert_eq!(result.ssid, "1");
            assert_eq!(result.password, "2");
            assert_eq!(result.display_ip, "3");
        }
        other => panic!("expected Complete, got {other:?}"),
    }
}

#[test]
fn unparsable_content_length_keeps_scanning() {
    let config = PortalConfig {
        length_compensation: 0,
        ..PortalConfig::default()
    };
    let request =
        b"POST / HTTP/1.1\r\nContent-Length: soon\r\nContent-Length: 11\r\na=1&b=2&c=3";
    let mut conn = ScriptedConnection::new(request);
    let outcome = run_session_with(&mut conn, &config).expect("session should terminate");
    assert!(matches!(outcome, SessionOutcome::Complete(_)));
}

#[test]
fn generic_decoding_mode_looks_fields_up_by_key() {
    let config = PortalConfig {
        length_compensation: 0,
        form_decoding: FormDecoding::Generic,
        ..PortalConfig::default()
    };
    let body = "ipaddress=10.0.0.9&ssid=My+Home&password=p%26w";
    let request = format!(
        "POST / HTTP/1.1\r\nContent-Length: {}\r\n{body}",
        body.len()
    );
    let mut conn = ScriptedConnection::new(request.as_bytes());
    let outcome = run_session_with(&mut conn, &config).expect("session should terminate");
    match outcome {
        SessionOutcome::Complete(result) => {
            assert_eq!(result.ssid, "My Home");
            assert_eq!(result.password, "p&w");
            assert_eq!(result.display_ip, "10.0.0.9");
        }
        other => panic!("expected Complete, got {other:?}"),
    }
}

#[test]
fn plus_in_password_survives_ordinal_decoding() {
    let result = parse_form_body("ssid=My+Home&password=a+b+c&ipaddress=1.2.3.4");
    assert_eq!(result.ssid, "My Home");
    assert_eq!(result.password, "a+b+c");
}

// =========================================================================
// Aborts and deadlines
// =========================================================================

#[test]
fn disconnect_before_request_line_aborts() {
    let mut conn = ScriptedConnection::new(b"GET / HT");
    let outcome = run_session(&mut conn).expect("session should terminate");
    assert_eq!(outcome, SessionOutcome::Aborted);
    assert!(conn.written.is_empty());
}

#[test]
fn disconnect_while_awaiting_content_length_aborts() {
    let mut conn = ScriptedConnection::new(b"POST / HTTP/1.1\r\nHost: 192.168.4.1\r\n");
    let outcome = run_session(&mut conn).expect("session should terminate");
    assert_eq!(outcome, SessionOutcome::Aborted);
}

#[test]
fn disconnect_mid_body_aborts_with_no_result() {
    // Declared 10 + 22 compensation, but only a handful of body bytes arrive.
    let mut conn =
        ScriptedConnection::new(b"POST / HTTP/1.1\r\nContent-Length: 10\r\nshort");
    let outcome = run_session(&mut conn).expect("session should terminate");
    assert_eq!(outcome, SessionOutcome::Aborted);
}

#[test]
fn absurd_declared_length_degrades_to_an_abort() {
    // A hostile peer can declare any length it likes, up to usize::MAX.
    // The adjusted count must saturate instead of overflowing, and the
    // body reader must not preallocate on the peer's say-so; the session
    // just reads until the connection drains and aborts.
    let request = format!(
        "POST / HTTP/1.1\r\nContent-Length: {}\r\nonly-a-few-bytes",
        usize::MAX
    );
    let mut conn = ScriptedConnection::new(request.as_bytes());
    let outcome = run_session(&mut conn).expect("session should terminate");
    assert_eq!(outcome, SessionOutcome::Aborted);

    // Large but non-saturating values take the same path.
    let request = b"POST / HTTP/1.1\r\nContent-Length: 999999999999\r\nshort";
    let mut conn = ScriptedConnection::new(request);
    let outcome = run_session(&mut conn).expect("session should terminate");
    assert_eq!(outcome, SessionOutcome::Aborted);
}

#[test]
fn silent_peer_expires_the_read_deadline() {
    let config = PortalConfig {
        read_timeout: Some(Duration::from_millis(10)),
        ..PortalConfig::default()
    };
    let mut conn = ScriptedConnection::silent();
    let err = run_session_with(&mut conn, &config).expect_err("should time out");
    assert_eq!(err, PortalError::DeadlineExpired);
}

#[test]
fn without_timeout_disconnect_is_the_only_way_out() {
    // A drained, non-held connection reports closed; the session must not
    // spin forever waiting for more data.
    let mut conn = ScriptedConnection::new(b"POST / HTTP/1.1\r\n");
    let outcome = run_session(&mut conn).expect("session should terminate");
    assert_eq!(outcome, SessionOutcome::Aborted);
}

// =========================================================================
// Service accept loop
// =========================================================================

#[test]
fn service_loops_until_a_session_completes() {
    let get_conn = ScriptedConnection::new(b"GET / HTTP/1.1\r\n");
    let dropped_conn = ScriptedConnection::new(b"POST / HTTP/1.1\r\nContent-Length: 10\r\nsh");
    let body = "ssid=My+Home&password=secret&ipaddress=192.168.1.5";
    let good = format!(
        "POST \\ HTTP/1.1\r\nContent-Length: 50\r\nAccept-Language: en-US\r\n\r\n{body}"
    );
    let good_conn = ScriptedConnection::new(good.as_bytes());

    let listener = ScriptedListener::new(vec![get_conn, dropped_conn, good_conn]);
    let result = ProvisioningPortal::new(listener, PortalConfig::default()).run();
    assert_eq!(result.ssid, "My Home");
    assert_eq!(result.password, "secret");
    assert_eq!(result.display_ip, "192.168.1.5");
}

#[test]
fn service_drops_stalled_peers_and_keeps_accepting() {
    let config = PortalConfig {
        read_timeout: Some(Duration::from_millis(10)),
        length_compensation: 0,
        ..PortalConfig::default()
    };

    let stalled = ScriptedConnection::silent();
    let good = ScriptedConnection::new(
        b"POST / HTTP/1.1\r\nContent-Length: 11\r\na=1&b=2&c=3",
    );
    let listener = ScriptedListener::new(vec![stalled, good]);
    let result = ProvisioningPortal::new(listener, config).run();
    assert_eq!(result.ssid, "1");
    assert_eq!(result.display_ip, "3");
}
