//! The JSON strategy: whole-body decode via serde, then validation.

use clasp_core::{validate, Bindable, Error, ErrorKind, Errors};
use serde::de::DeserializeOwned;

use crate::request::Request;

/// Bind a JSON request. An empty body is not an error: the record stays
/// at its defaults and the validator still runs, so `Required` fields
/// report the same way they would for an empty form.
pub fn bind_json<T: Bindable + DeserializeOwned>(target: &mut T, req: &Request) -> Errors {
    if !req.body().is_empty() {
        match serde_json::from_slice::<T>(req.body()) {
            Ok(decoded) => *target = decoded,
            Err(err) => {
                return Errors::one(Error::global(ErrorKind::Deserialization, err.to_string()))
            }
        }
    }
    validate(target)
}
