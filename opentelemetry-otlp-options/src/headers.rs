//! Parsing of the `k1=v1,k2=v2` header lists accepted by
//! `OTEL_EXPORTER_OTLP_HEADERS` and its signal specific variants.

use http::{HeaderMap, HeaderName, HeaderValue};
use std::str::FromStr;

/// Parse a comma separated list of `key=value` pairs.
///
/// Pairs without a `=`, with an empty key or with an empty value are skipped.
/// Values are percent-decoded; a value that fails to decode is kept verbatim.
pub(crate) fn parse_header_string(value: &str) -> impl Iterator<Item = (&str, String)> {
    value
        .split_terminator(',')
        .map(str::trim)
        .filter_map(parse_header_key_value_string)
}

/// Percent-decode `value`. Returns `None` for a truncated or non-hex escape
/// and for escapes that do not decode to UTF-8.
pub(crate) fn url_decode(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3)?;
            if !escape.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
            let escape = std::str::from_utf8(escape).ok()?;
            decoded.push(u8::from_str_radix(escape, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}

fn parse_header_key_value_string(key_value_string: &str) -> Option<(&str, String)> {
    key_value_string
        .split_once('=')
        .map(|(key, value)| {
            (
                key.trim(),
                url_decode(value.trim()).unwrap_or(value.trim().to_string()),
            )
        })
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
}

/// Merge the parsed `input` into `headers`, replacing existing entries with
/// the same name. Pairs that are not valid HTTP header names or values are
/// dropped.
pub(crate) fn add_header_from_string(input: &str, headers: &mut HeaderMap) {
    for (key, value) in parse_header_string(input) {
        if let (Ok(name), Ok(value)) = (HeaderName::from_str(key), HeaderValue::from_str(&value))
        {
            headers.insert(name, value);
        }
    }
}

/// default user-agent header
pub(crate) fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        http::header::USER_AGENT,
        HeaderValue::from_static(concat!(
            "OTel-OTLP-Exporter-Rust/",
            env!("CARGO_PKG_VERSION")
        )),
    );
    headers
}
