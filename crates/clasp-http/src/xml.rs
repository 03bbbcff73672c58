//! The XML strategy: whole-body decode via quick-xml's serde front end.

use clasp_core::{validate, Bindable, Error, ErrorKind, Errors};
use serde::de::DeserializeOwned;

use crate::request::Request;

/// Bind an XML request, with the same empty-body policy as JSON: no body
/// means a default record that still gets validated.
pub fn bind_xml<T: Bindable + DeserializeOwned>(target: &mut T, req: &Request) -> Errors {
    if !req.body().is_empty() {
        let body = match std::str::from_utf8(req.body()) {
            Ok(body) => body,
            Err(_) => {
                return Errors::one(Error::global(
                    ErrorKind::Deserialization,
                    "invalid UTF-8 in XML body",
                ))
            }
        };
        match quick_xml::de::from_str::<T>(body) {
            Ok(decoded) => *target = decoded,
            Err(err) => {
                return Errors::one(Error::global(ErrorKind::Deserialization, err.to_string()))
            }
        }
    }
    validate(target)
}
