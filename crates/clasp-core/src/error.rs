//! Binding and validation error types.
//!
//! Errors are collected during mapping and validation rather than aborting
//! immediately: a coercion failure on one field never blocks sibling fields
//! from binding, so a single pass can surface the complete set of problems.
//! The collection's order matches depth-first field-visitation order, which
//! lets callers map entries straight onto per-field UI feedback.

use std::fmt;

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

/// Classification of a binding or validation error.
///
/// The classification is part of the wire contract: `as_str` yields the
/// stable tag (`"RequiredError"`, `"ContentTypeError"`, ...) that error
/// payloads carry. `Custom` lets per-record validation hooks introduce
/// their own tags without widening this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request's Content-Type is empty or unsupported.
    ContentType,
    /// The request body could not be parsed at all.
    Deserialization,
    /// A value could not be coerced to an integer kind.
    IntegerType,
    /// A value could not be coerced to a boolean.
    BooleanType,
    /// A value could not be coerced to a float kind.
    FloatType,
    /// A `Required` field was left at its kind's zero value.
    Required,
    /// A string contained characters outside `[0-9A-Za-z-_]`.
    AlphaDash,
    /// A string contained characters outside `[0-9A-Za-z-_.]`.
    AlphaDashDot,
    /// A string or collection was shorter than the declared minimum.
    MinSize,
    /// A string or collection was longer than the declared maximum.
    MaxSize,
    /// A string did not look like an email address.
    Email,
    /// A string did not look like an http(s) URL.
    Url,
    /// An integer fell outside the declared range.
    Range,
    /// A value was not a member of the declared set.
    In,
    /// A value was a member of the declared exclusion set.
    NotIn,
    /// A string did not contain the declared substring.
    Include,
    /// A string contained the declared forbidden substring.
    Exclude,
    /// A `Default` fallback could not be applied.
    Default,
    /// A classification supplied by a custom validation hook.
    Custom(&'static str),
}

impl ErrorKind {
    /// The stable wire tag for this classification.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ContentType => "ContentTypeError",
            ErrorKind::Deserialization => "DeserializationError",
            ErrorKind::IntegerType => "IntegerTypeError",
            ErrorKind::BooleanType => "BooleanTypeError",
            ErrorKind::FloatType => "FloatTypeError",
            ErrorKind::Required => "RequiredError",
            ErrorKind::AlphaDash => "AlphaDashError",
            ErrorKind::AlphaDashDot => "AlphaDashDotError",
            ErrorKind::MinSize => "MinSizeError",
            ErrorKind::MaxSize => "MaxSizeError",
            ErrorKind::Email => "EmailError",
            ErrorKind::Url => "UrlError",
            ErrorKind::Range => "RangeError",
            ErrorKind::In => "InError",
            ErrorKind::NotIn => "NotInError",
            ErrorKind::Include => "IncludeError",
            ErrorKind::Exclude => "ExcludeError",
            ErrorKind::Default => "DefaultError",
            ErrorKind::Custom(tag) => tag,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single binding or validation error.
///
/// `field` is the dotted/indexed path of the offending field in the flat
/// key space (`author.name`, `readers.0.name`); bind-level errors such as
/// content-type or parse failures carry no path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Error {
    /// Dotted path of the offending field; `None` for bind-level errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Error classification, serialized as its wire tag.
    #[serde(rename = "classification")]
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
}

impl Error {
    /// Create a bind-level error with no field path.
    pub fn global(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            field: None,
            kind,
            message: message.into(),
        }
    }

    /// Create an error attached to a field path.
    pub fn field(path: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            field: Some(path.into()),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(path) => write!(f, "{}: {} ({})", path, self.message, self.kind),
            None => write!(f, "{} ({})", self.message, self.kind),
        }
    }
}

impl std::error::Error for Error {}

/// An ordered collection of binding/validation errors.
///
/// Empty means full success. Order matches depth-first field-visitation
/// order, so the first entry is always the earliest-declared offender.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Errors(Vec<Error>);

impl Errors {
    /// An empty collection.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// A collection holding exactly one error.
    pub fn one(error: Error) -> Self {
        Self(vec![error])
    }

    /// Append an error.
    pub fn push(&mut self, error: Error) {
        self.0.push(error);
    }

    /// Append a bind-level error with no field path.
    pub fn add_global(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.0.push(Error::global(kind, message));
    }

    /// Append an error attached to a field path.
    pub fn add_field(
        &mut self,
        path: impl Into<String>,
        kind: ErrorKind,
        message: impl Into<String>,
    ) {
        self.0.push(Error::field(path, kind, message));
    }

    /// Append every error from another collection, preserving order.
    pub fn extend(&mut self, other: Errors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn first(&self) -> Option<&Error> {
        self.0.first()
    }

    pub fn get(&self, index: usize) -> Option<&Error> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Error> {
        self.0.iter()
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for Errors {}

impl Serialize for Errors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for error in &self.0 {
            seq.serialize_element(error)?;
        }
        seq.end()
    }
}

impl IntoIterator for Errors {
    type Item = Error;
    type IntoIter = std::vec::IntoIter<Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Errors {
    type Item = &'a Error;
    type IntoIter = std::slice::Iter<'a, Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Error> for Errors {
    fn from(error: Error) -> Self {
        Errors::one(error)
    }
}
