//! Mapping error collections onto HTTP responses.

use clasp_core::{ErrorKind, Errors};

/// Content-Type for serialized error payloads.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// The status code for an error collection: 200 when empty, otherwise the
/// first error decides -- an unparseable body is the client's fault (400),
/// a type nobody can decode is 415, and everything else is a semantically
/// invalid but well-formed request (422).
pub fn error_status(errors: &Errors) -> u16 {
    match errors.first() {
        None => 200,
        Some(err) => match err.kind {
            ErrorKind::Deserialization => 400,
            ErrorKind::ContentType => 415,
            _ => 422,
        },
    }
}

/// The JSON payload for an error collection.
pub fn error_body(errors: &Errors) -> String {
    serde_json::to_string(errors).unwrap_or_else(|_| "[]".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clasp_core::Error;

    #[test]
    fn status_mapping() {
        assert_eq!(error_status(&Errors::new()), 200);
        assert_eq!(
            error_status(&Errors::one(Error::global(
                ErrorKind::Deserialization,
                "invalid URL escape \"%2\""
            ))),
            400
        );
        assert_eq!(
            error_status(&Errors::one(Error::global(
                ErrorKind::ContentType,
                "Unsupported Content-Type"
            ))),
            415
        );
        assert_eq!(
            error_status(&Errors::one(Error::field(
                "title",
                ErrorKind::Required,
                "Required"
            ))),
            422
        );
    }

    #[test]
    fn body_is_structured_json() {
        let mut errors = Errors::new();
        errors.add_field("title", ErrorKind::Required, "Required");
        errors.add_global(ErrorKind::Deserialization, "boom");
        assert_eq!(
            error_body(&errors),
            "[{\"field\":\"title\",\"classification\":\"RequiredError\",\"message\":\"Required\"},\
             {\"classification\":\"DeserializationError\",\"message\":\"boom\"}]"
        );
    }
}
