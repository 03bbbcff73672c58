//! Content negotiation: picking the decode strategy for a request.
//!
//! Selection is a pure function of the method and the Content-Type value,
//! so it is trivially testable without a request in hand. Matching is by
//! substring, which tolerates parameters (`; charset=utf-8`,
//! `; boundary=...`) and vendor prefixes without parsing the media type.

use clasp_core::{Error, ErrorKind};

use crate::request::Method;

/// The four decode strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Form,
    Multipart,
    Json,
    Xml,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Form => "form",
            Strategy::Multipart => "multipart",
            Strategy::Json => "json",
            Strategy::Xml => "xml",
        }
    }
}

/// Pick the strategy for a method/Content-Type pair.
///
/// A request with no body and no Content-Type still binds as a form, from
/// the query string alone. Everything else must declare a recognizable
/// type: an empty header on a body-bearing request is `Empty
/// Content-Type`, an unrecognized one is `Unsupported Content-Type`, both
/// classified `ContentType`.
pub fn select(method: Method, content_type: &str) -> Result<Strategy, Error> {
    if content_type.is_empty() {
        if method.allows_body() {
            return Err(Error::global(ErrorKind::ContentType, "Empty Content-Type"));
        }
        return Ok(Strategy::Form);
    }
    if content_type.contains("multipart/form-data") {
        Ok(Strategy::Multipart)
    } else if content_type.contains("form-urlencoded") {
        Ok(Strategy::Form)
    } else if content_type.contains("json") {
        Ok(Strategy::Json)
    } else if content_type.contains("xml") {
        Ok(Strategy::Xml)
    } else {
        Err(Error::global(
            ErrorKind::ContentType,
            "Unsupported Content-Type",
        ))
    }
}
