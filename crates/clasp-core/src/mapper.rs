//! The path-addressed recursive field mapper.
//!
//! Walks a record's descriptor table against a flat key space, resolving
//! nested, embedded, optional, collection, and file addressing. Coercion
//! failures are collected per field and never stop the walk: partial
//! population stands, so callers can see exactly which subset of fields
//! bound successfully.

use crate::error::Errors;
use crate::keyspace::KeySpace;
use crate::schema::{Access, Bindable, BindNode};

/// Populate `target` from the key space, returning the accumulated error
/// collection (empty on full success). The target is mutated in place;
/// fields nothing addresses are left untouched.
pub fn bind_key_space<T: Bindable>(target: &mut T, space: &KeySpace) -> Errors {
    let mut errors = Errors::new();
    target.bind_fields("", space, &mut errors);
    errors
}

impl<T: Bindable> BindNode for T {
    fn bind_fields(&mut self, prefix: &str, space: &KeySpace, errors: &mut Errors) {
        for field in T::schema() {
            match field.access {
                Access::Scalar(slot) => {
                    let key = format!("{prefix}{}", field.name);
                    // Only the first value feeds a single scalar.
                    if let Some(first) = space.values(&key).and_then(<[String]>::first) {
                        if let Err(err) = slot(self).coerce_from(first) {
                            errors.add_field(key, err.kind, err.message);
                        }
                    }
                }
                Access::ScalarList(slot) => {
                    let key = format!("{prefix}{}", field.name);
                    match space.values(&key) {
                        Some(values) if !values.is_empty() => {
                            let list = slot(self);
                            list.clear();
                            for raw in values {
                                // A failed element keeps its position as
                                // the kind's zero value.
                                if let Err(err) = list.append(raw) {
                                    errors.add_field(key.clone(), err.kind, err.message);
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Access::File(slot) => {
                    let key = format!("{prefix}{}", field.name);
                    if let Some(first) = space.files(&key).and_then(|files| files.first()) {
                        *slot(self) = Some(first.clone());
                    }
                }
                Access::FileList(slot) => {
                    let key = format!("{prefix}{}", field.name);
                    match space.files(&key) {
                        Some(files) if !files.is_empty() => {
                            *slot(self) = files.to_vec();
                        }
                        _ => {}
                    }
                }
                Access::Embedded(node) => {
                    node(self).bind_fields(prefix, space, errors);
                }
                Access::OptEmbedded {
                    materialize, clear, ..
                } => {
                    // Bind into a fresh zero-valued record; if nothing
                    // bound into it, discard the allocation so an absent
                    // optional substructure stays absent.
                    let still_zero = {
                        let inner = materialize(self);
                        inner.bind_fields(prefix, space, errors);
                        inner.is_zero()
                    };
                    if still_zero {
                        clear(self);
                    }
                }
                Access::Record(node) => {
                    let child = format!("{prefix}{}.", field.name);
                    node(self).bind_fields(&child, space, errors);
                }
                Access::OptRecord { materialize, .. } => {
                    let child = format!("{prefix}{}.", field.name);
                    // Materialize only if something addresses it; this is
                    // what distinguishes "omitted" from "sent empty".
                    if space.has_prefix(&child) {
                        materialize(self).bind_fields(&child, space, errors);
                    }
                }
                Access::RecordList { grow, at, .. } => {
                    let key = format!("{prefix}{}", field.name);
                    let size = space.list_len(&key);
                    if size > 0 {
                        grow(self, size);
                    }
                    for index in 0..size {
                        let child = format!("{key}.{index}.");
                        at(self, index).bind_fields(&child, space, errors);
                    }
                }
            }
        }
    }

    fn validate_fields(&mut self, path: &str, errors: &mut Errors) {
        crate::validate::walk_record(self, path, errors);
    }

    fn is_zero(&mut self) -> bool {
        for field in T::schema() {
            if !access_is_zero(self, field.access) {
                return false;
            }
        }
        true
    }
}

/// Whether a single field holds its kind's zero value. Shared between the
/// embedded-discard rule and the validator's `Required` check.
pub(crate) fn access_is_zero<T: Bindable>(target: &mut T, access: Access<T>) -> bool {
    match access {
        Access::Scalar(slot) => slot(target).is_zero(),
        Access::ScalarList(slot) => slot(target).is_empty(),
        Access::File(slot) => slot(target).is_none(),
        Access::FileList(slot) => slot(target).is_empty(),
        Access::Embedded(node) | Access::Record(node) => node(target).is_zero(),
        Access::OptEmbedded { get, .. } | Access::OptRecord { get, .. } => get(target).is_none(),
        Access::RecordList { len, .. } => len(target) == 0,
    }
}
