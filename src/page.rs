use crate::transport::Connection;

/// The static configuration page, byte-for-byte as the original device
/// prints it: no whitespace between fragments, two-space field indents, and
/// a submit target of a single backslash. That `action="\"` is almost
/// certainly a typo for `/`, but deployed clients were provisioned against
/// it, so it is kept as-is.
pub const FORM_PAGE: &str = concat!(
    "<html>",
    "<body>",
    "<h2>IoT Weather Station Setup</h2><br/>",
    "<form action=\"\\\" method=\"POST\">",
    "  SSID: <input name=\"ssid\" type=\"text\" maxlength=\"25\" placeholder=\"Enter SSID\" required><br/>",
    "  Password: <input name=\"password\" type=\"password\" maxlength=\"25\" placeholder=\"Enter SSID Password\"><br/>",
    "  Display IP Address: <input name=\"ipaddress\" type=\"text\" maxlength=\"15\" placeholder=\"Enter Display IP Address\" pattern=\"\\d{1,3}\\.\\d{1,3}\\.\\d{1,3}\\.\\d{1,3}\" required><br/>",
    "  <input type=\"submit\" value=\"Submit\">",
    "</form>",
    "</body>",
    "</html>",
);

/// Status line and headers preceding the page. The original emits these via
/// `println`, hence CRLF terminators and no space after the header colon.
const RESPONSE_HEAD: &str = "HTTP/1.1 200 OK\r\nContent-type:text/html\r\n\r\n";

/// The complete HTTP response served on GET: head, page, trailing blank line.
pub fn form_response() -> String {
    let mut out = String::with_capacity(RESPONSE_HEAD.len() + FORM_PAGE.len() + 2);
    out.push_str(RESPONSE_HEAD);
    out.push_str(FORM_PAGE);
    out.push_str("\r\n");
    out
}

/// Write the configuration page response to the peer.
///
/// Nothing further is read from the connection afterwards; the remainder of
/// the request, if any, is discarded with the connection.
pub fn serve_form<C: Connection>(conn: &mut C) {
    conn.write_all(form_response().as_bytes());
}
