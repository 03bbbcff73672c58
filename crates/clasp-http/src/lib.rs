//! clasp-http -- HTTP request binding over `clasp-core`.
//!
//! The flow: [`bind`] inspects the request's method and Content-Type,
//! picks one of the four decode strategies, turns the request into either
//! a flat key space (form, multipart) or a direct serde decode (JSON,
//! XML), maps it into the caller's record, and runs the validator. The
//! result is always the same ordered error collection; [`error_status`]
//! and [`error_body`] turn it into an HTTP response.
//!
//! The request model is transport-neutral: any server stack that can hand
//! over a method, a header value, a query string, and body bytes can use
//! this crate directly.

pub mod bind;
pub mod form;
pub mod json;
pub mod multipart;
pub mod negotiate;
pub mod request;
pub mod respond;
pub mod xml;

pub use bind::{bind, max_memory, set_max_memory};
pub use form::bind_form;
pub use json::bind_json;
pub use multipart::bind_multipart;
pub use negotiate::{select, Strategy};
pub use request::{Method, Request};
pub use respond::{error_body, error_status, JSON_CONTENT_TYPE};
pub use xml::bind_xml;

pub use clasp_core::{Error, ErrorKind, Errors};
