//! The form strategy: strict URL-encoded decoding into a key space.
//!
//! The parser is strict on purpose: a `%` not followed by two hex digits
//! is an error, not a literal, because silently passing mangled input into
//! typed fields hides client bugs. `+` decodes to a space, per the
//! `application/x-www-form-urlencoded` convention.

use clasp_core::{bind_key_space, validate, Bindable, Error, ErrorKind, Errors, KeySpace};

use crate::request::Request;

/// Bind a form request: the query string always contributes, and the body
/// contributes too on body-bearing methods. A parse failure short-circuits
/// with the record untouched by the failed input.
pub fn bind_form<T: Bindable>(target: &mut T, req: &Request) -> Errors {
    let mut space = KeySpace::new();
    if let Err(err) = parse_encoded(req.query(), &mut space) {
        return Errors::one(err);
    }
    if req.method().allows_body() && !req.body().is_empty() {
        let body = match std::str::from_utf8(req.body()) {
            Ok(body) => body,
            Err(_) => {
                return Errors::one(Error::global(
                    ErrorKind::Deserialization,
                    "invalid UTF-8 in form body",
                ))
            }
        };
        if let Err(err) = parse_encoded(body, &mut space) {
            return Errors::one(err);
        }
    }
    let mut errors = bind_key_space(target, &space);
    errors.extend(validate(target));
    errors
}

/// Decode one `key=value&key=value` run into the key space. Empty pairs
/// (from `&&` or a trailing `&`) are skipped; a pair without `=` is a key
/// with an empty value.
pub(crate) fn parse_encoded(input: &str, space: &mut KeySpace) -> Result<(), Error> {
    for pair in input.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(raw_key)?;
        let value = decode_component(raw_value)?;
        space.add_value(key, value);
    }
    Ok(())
}

/// Percent-decode a single key or value.
fn decode_component(raw: &str) -> Result<String, Error> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                let hi = bytes.get(i + 1).and_then(|b| hex_digit(*b));
                let lo = bytes.get(i + 2).and_then(|b| hex_digit(*b));
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                    }
                    _ => {
                        // Report the broken escape as received, truncated
                        // to the three bytes the escape should have spanned.
                        let end = (i + 3).min(bytes.len());
                        let snippet = String::from_utf8_lossy(&bytes[i..end]);
                        return Err(Error::global(
                            ErrorKind::Deserialization,
                            format!("invalid URL escape \"{snippet}\""),
                        ));
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|_| {
        Error::global(ErrorKind::Deserialization, "invalid UTF-8 in form value")
    })
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(raw: &str) -> Result<String, Error> {
        decode_component(raw)
    }

    #[test]
    fn plain_pairs() {
        let mut space = KeySpace::new();
        parse_encoded("a=1&b=two&a=3", &mut space).unwrap();
        assert_eq!(space.values("a").unwrap(), ["1", "3"]);
        assert_eq!(space.values("b").unwrap(), ["two"]);
    }

    #[test]
    fn escapes_and_plus() {
        assert_eq!(decode("hello+world").unwrap(), "hello world");
        assert_eq!(decode("a%20b%2Fc").unwrap(), "a b/c");
        assert_eq!(decode("100%25").unwrap(), "100%");
        // Lowercase hex is fine.
        assert_eq!(decode("%c3%a9").unwrap(), "é");
    }

    #[test]
    fn broken_escape_reports_its_text() {
        let err = decode("%2").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Deserialization);
        assert_eq!(err.message, "invalid URL escape \"%2\"");

        let err = decode("%zz").unwrap_err();
        assert_eq!(err.message, "invalid URL escape \"%zz\"");

        let err = decode("%").unwrap_err();
        assert_eq!(err.message, "invalid URL escape \"%\"");
    }

    #[test]
    fn empty_and_flag_pairs() {
        let mut space = KeySpace::new();
        parse_encoded("a=&&flag&b=1&", &mut space).unwrap();
        assert_eq!(space.values("a").unwrap(), [""]);
        assert_eq!(space.values("flag").unwrap(), [""]);
        assert_eq!(space.values("b").unwrap(), ["1"]);
    }

    #[test]
    fn invalid_utf8_rejected() {
        let err = decode("%ff%fe").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Deserialization);
        assert_eq!(err.message, "invalid UTF-8 in form value");
    }
}
