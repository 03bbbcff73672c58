//! clasp-core -- the schema-driven value-mapping engine.
//!
//! This crate turns flat, path-addressed key spaces (the shape of form and
//! multipart submissions) into typed Rust records, then runs declarative
//! validation over the result. The pieces:
//!
//! - [`keyspace`]: the flat key space of dotted/indexed paths to textual
//!   values and file attachments.
//! - [`schema`]: constant field descriptor tables plus the [`schema!`]
//!   macro that generates them, standing in for runtime reflection.
//! - [`coerce`]: textual-to-typed scalar coercion with the form blank
//!   policy (empty string means the kind's zero value).
//! - [`mapper`]: the recursive walk that populates a record from a key
//!   space, collecting per-field errors without aborting.
//! - [`validate`]: the rule pass ([`Rule`]) plus per-record custom hooks.
//! - [`error`]: the classified, ordered error collection shared by every
//!   pass.
//!
//! Transport concerns (content negotiation, body parsing, HTTP status
//! mapping) live in the companion `clasp-http` crate; this crate never
//! sees a request.

pub mod coerce;
pub mod error;
pub mod keyspace;
pub mod mapper;
pub mod schema;
pub mod validate;

pub use error::{Error, ErrorKind, Errors};
pub use keyspace::{FileHandle, KeySpace};
pub use mapper::bind_key_space;
pub use schema::{Access, BindNode, Bindable, Field};
pub use validate::{validate, validate_list, Rule};
