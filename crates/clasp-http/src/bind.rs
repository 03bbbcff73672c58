//! The dispatcher: negotiate a strategy and run it.

use std::sync::atomic::{AtomicUsize, Ordering};

use clasp_core::{Bindable, Errors};
use serde::de::DeserializeOwned;

use crate::form::bind_form;
use crate::json::bind_json;
use crate::multipart::bind_multipart;
use crate::negotiate::{select, Strategy};
use crate::request::Request;
use crate::xml::bind_xml;

/// Bind a request to a record: pick the strategy from the method and
/// Content-Type, decode, map, validate. Returns the accumulated error
/// collection; empty means the record is fully bound and valid.
pub fn bind<T: Bindable + DeserializeOwned>(target: &mut T, req: &Request) -> Errors {
    let strategy = match select(req.method(), req.content_type()) {
        Ok(strategy) => strategy,
        Err(err) => return Errors::one(err),
    };
    match strategy {
        Strategy::Form => bind_form(target, req),
        Strategy::Multipart => bind_multipart(target, req),
        Strategy::Json => bind_json(target, req),
        Strategy::Xml => bind_xml(target, req),
    }
}

const DEFAULT_MAX_MEMORY: usize = 16 * 1024 * 1024;

// Effectively read-only during request handling; set once at startup.
static MAX_MEMORY: AtomicUsize = AtomicUsize::new(DEFAULT_MAX_MEMORY);

/// Set the process-wide ceiling on file bytes a multipart bind keeps in
/// memory before spilling to temp storage. Default 16 MiB.
pub fn set_max_memory(bytes: usize) {
    MAX_MEMORY.store(bytes, Ordering::Relaxed);
}

/// The current multipart in-memory ceiling.
pub fn max_memory() -> usize {
    MAX_MEMORY.load(Ordering::Relaxed)
}
