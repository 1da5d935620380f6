use crate::types::ProvisioningResult;

// ---------------------------------------------------------------------------
// Ordinal (wire-compatible) splitting
// ---------------------------------------------------------------------------

/// Split a form body into a result using the original ordinal algorithm.
///
/// The body is assumed to hold exactly two `&` separators around three
/// `key=value` fields in the fixed order ssid, password, ipaddress: field 1
/// ends at the first `&`, field 3 starts at the last `&`, field 2 is
/// whatever lies between. Nothing is validated — with fewer separators the
/// indices degrade silently (no `&` leaves field 1 holding the whole body
/// and the others empty) and the result simply carries the wrong contents.
///
/// Each value is the substring after its field's first `=`, or the whole
/// field when there is none. Only the ssid has `+` decoded to spaces; the
/// password and address are merely trimmed. That asymmetry is observed
/// behavior and kept (a password containing `+` goes through verbatim).
pub fn split_ordinal(body: &str) -> ProvisioningResult {
    let n1 = body.find('&').unwrap_or(body.len());
    let n2 = body.rfind('&').unwrap_or(body.len());

    let first = &body[..n1];
    let middle = if n1 < n2 { &body[n1 + 1..n2] } else { "" };
    let third = if n2 < body.len() { &body[n2 + 1..] } else { "" };

    let ssid = value_after_eq(first).replace('+', " ");
    ProvisioningResult {
        ssid: ssid.trim().to_owned(),
        password: value_after_eq(middle).trim().to_owned(),
        display_ip: value_after_eq(third).trim().to_owned(),
    }
}

/// The substring after the field's first `=`, or the whole field without one.
fn value_after_eq(field: &str) -> &str {
    match field.find('=') {
        Some(i) => &field[i + 1..],
        None => field,
    }
}

/// Parse a complete single-line form body in one call.
///
/// Convenience wrapper around [`split_ordinal`], the wire-compatible
/// algorithm. For a tolerant decoder see [`decode_generic`].
pub fn parse_form_body(body: &str) -> ProvisioningResult {
    split_ordinal(body)
}

// ---------------------------------------------------------------------------
// Generic urlencoded decoding
// ---------------------------------------------------------------------------

/// Decode a urlencoded body into `(key, value)` pairs.
///
/// Fields are split on `&`, each at its first `=` (a field without `=`
/// becomes a key with an empty value). `+` and `%XX` escapes are decoded in
/// both keys and values; a malformed escape is passed through literally.
pub fn decode_pairs(body: &str) -> Vec<(String, String)> {
    body.split('&')
        .filter(|field| !field.is_empty())
        .map(|field| match field.split_once('=') {
            Some((key, value)) => (percent_decode(key), percent_decode(value)),
            None => (percent_decode(field), String::new()),
        })
        .collect()
}

/// Build a result from a urlencoded body by key lookup.
///
/// Uses [`decode_pairs`], taking the `ssid`, `password` and `ipaddress`
/// keys in any order; a missing key yields an empty string. All values are
/// trimmed. This is the clean alternative to [`split_ordinal`] for callers
/// that do not need wire-for-wire equivalence with the original device.
pub fn decode_generic(body: &str) -> ProvisioningResult {
    let pairs = decode_pairs(body);
    let lookup = |name: &str| {
        pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.trim().to_owned())
            .unwrap_or_default()
    };
    ProvisioningResult {
        ssid: lookup("ssid"),
        password: lookup("password"),
        display_ip: lookup("ipaddress"),
    }
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                match (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi * 16 + lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests (unit)
// ---------------------------------------------------------------------------
