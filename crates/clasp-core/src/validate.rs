//! Declarative validation: a second recursive pass over a populated record.
//!
//! Rules are a closed set of structured variants attached to field
//! descriptors; free-form rule text is deliberately not supported. Rules
//! are evaluated per field in declaration order, short-circuiting on the
//! first violation for that field (later fields are still visited). After
//! a record's own fields, its custom `validate` hook runs once.
//!
//! The pattern checks are shallow syntactic screens, not RFC validation:
//! enough to reject obvious garbage before application logic sees it.
//! Nested paths use the same wire-name addressing as the mapper, so a
//! mapping error and a validation error for one field carry one path.

use crate::error::{ErrorKind, Errors};
use crate::mapper::access_is_zero;
use crate::schema::{Access, Bindable, Field};

/// A single declarative validation rule.
///
/// Rules that do not fit a field's kind are skipped, not failed: `Range`
/// applies to integer views, character-class and substring rules to
/// string views, size rules to strings (rune count) and collections
/// (length), `Required` and `Default` to everything that has a zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    /// Fails when the field holds its kind's zero value.
    Required,
    /// The string may only contain `[0-9A-Za-z-_]`.
    AlphaDash,
    /// The string may only contain `[0-9A-Za-z-_.]`.
    AlphaDashDot,
    /// Minimum string rune count or collection length.
    MinSize(usize),
    /// Maximum string rune count or collection length.
    MaxSize(usize),
    /// The string must look like an email address.
    Email,
    /// The string must look like an http(s) URL; empty input is exempt.
    Url,
    /// The integer must lie in the inclusive range.
    Range(i64, i64),
    /// The rendered value must be a member of the set.
    In(&'static [&'static str]),
    /// The rendered value must not be a member of the set.
    NotIn(&'static [&'static str]),
    /// The string must contain the substring.
    Include(&'static str),
    /// The string must not contain the substring.
    Exclude(&'static str),
    /// Assign the fallback (coerced) when the field is at its zero value.
    /// Applies to scalar fields only; skipped elsewhere.
    Default(&'static str),
}

/// Validate a single record, returning the accumulated errors.
pub fn validate<T: Bindable>(target: &mut T) -> Errors {
    let mut errors = Errors::new();
    walk_record(target, "", &mut errors);
    errors
}

/// Validate each element of a collection independently; error paths are
/// prefixed with the element's numeric index (`0.name`, `1.name`, ...).
pub fn validate_list<T: Bindable>(items: &mut [T]) -> Errors {
    let mut errors = Errors::new();
    for (index, item) in items.iter_mut().enumerate() {
        walk_record(item, &format!("{index}."), &mut errors);
    }
    errors
}

/// One record's pass: structural recursion first, then the field's own
/// rules, then the record's custom hook.
pub(crate) fn walk_record<T: Bindable>(target: &mut T, path: &str, errors: &mut Errors) {
    for field in T::schema() {
        match field.access {
            Access::Embedded(node) => {
                node(target).validate_fields(path, errors);
            }
            Access::OptEmbedded { get, .. } => {
                if let Some(inner) = get(target) {
                    inner.validate_fields(path, errors);
                }
            }
            Access::Record(node) => {
                let child = format!("{path}{}.", field.name);
                node(target).validate_fields(&child, errors);
            }
            Access::OptRecord { get, .. } => {
                if let Some(inner) = get(target) {
                    let child = format!("{path}{}.", field.name);
                    inner.validate_fields(&child, errors);
                }
            }
            Access::RecordList { len, at_opt, .. } => {
                for index in 0..len(target) {
                    if let Some(inner) = at_opt(target, index) {
                        let child = format!("{path}{}.{index}.", field.name);
                        inner.validate_fields(&child, errors);
                    }
                }
            }
            _ => {}
        }
        apply_rules(target, field, path, errors);
    }
    target.validate(errors);
}

fn apply_rules<T: Bindable>(target: &mut T, field: &Field<T>, path: &str, errors: &mut Errors) {
    if field.rules.is_empty() {
        return;
    }
    let full = format!("{path}{}", field.name);
    for rule in field.rules {
        let violation = match *rule {
            Rule::Required => {
                if access_is_zero(target, field.access) {
                    Some((ErrorKind::Required, "Required"))
                } else {
                    None
                }
            }
            Rule::AlphaDash => str_view(target, field).and_then(|s| {
                if alpha_dash(&s) {
                    None
                } else {
                    Some((ErrorKind::AlphaDash, "AlphaDash"))
                }
            }),
            Rule::AlphaDashDot => str_view(target, field).and_then(|s| {
                if alpha_dash_dot(&s) {
                    None
                } else {
                    Some((ErrorKind::AlphaDashDot, "AlphaDashDot"))
                }
            }),
            Rule::MinSize(min) => size_view(target, field).and_then(|n| {
                if n < min {
                    Some((ErrorKind::MinSize, "MinSize"))
                } else {
                    None
                }
            }),
            Rule::MaxSize(max) => size_view(target, field).and_then(|n| {
                if n > max {
                    Some((ErrorKind::MaxSize, "MaxSize"))
                } else {
                    None
                }
            }),
            Rule::Email => str_view(target, field).and_then(|s| {
                if looks_like_email(&s) {
                    None
                } else {
                    Some((ErrorKind::Email, "Email"))
                }
            }),
            Rule::Url => str_view(target, field).and_then(|s| {
                // Blank means "not provided"; only a non-empty value has
                // to look like a URL.
                if s.is_empty() || looks_like_url(&s) {
                    None
                } else {
                    Some((ErrorKind::Url, "Url"))
                }
            }),
            Rule::Range(low, high) => int_view(target, field).and_then(|v| {
                if v < low || v > high {
                    Some((ErrorKind::Range, "Range"))
                } else {
                    None
                }
            }),
            Rule::In(set) => text_view(target, field).and_then(|s| {
                if set.contains(&s.as_str()) {
                    None
                } else {
                    Some((ErrorKind::In, "In"))
                }
            }),
            Rule::NotIn(set) => text_view(target, field).and_then(|s| {
                if set.contains(&s.as_str()) {
                    Some((ErrorKind::NotIn, "NotIn"))
                } else {
                    None
                }
            }),
            Rule::Include(needle) => str_view(target, field).and_then(|s| {
                if s.contains(needle) {
                    None
                } else {
                    Some((ErrorKind::Include, "Include"))
                }
            }),
            Rule::Exclude(needle) => str_view(target, field).and_then(|s| {
                if s.contains(needle) {
                    Some((ErrorKind::Exclude, "Exclude"))
                } else {
                    None
                }
            }),
            Rule::Default(fallback) => {
                if let Access::Scalar(slot) = field.access {
                    let scalar = slot(target);
                    if scalar.is_zero() {
                        if let Err(err) = scalar.coerce_from(fallback) {
                            Some((err.kind, err.message))
                        } else {
                            None
                        }
                    } else {
                        None
                    }
                } else {
                    None
                }
            }
        };
        if let Some((kind, message)) = violation {
            errors.add_field(full, kind, message);
            return;
        }
    }
}

/// The field's string value, if it is a string scalar.
fn str_view<T: Bindable>(target: &mut T, field: &Field<T>) -> Option<String> {
    if let Access::Scalar(slot) = field.access {
        if let crate::coerce::View::Str(s) = slot(target).view() {
            return Some(s.to_owned());
        }
    }
    None
}

/// The field's value rendered as form text, for set-membership rules.
fn text_view<T: Bindable>(target: &mut T, field: &Field<T>) -> Option<String> {
    if let Access::Scalar(slot) = field.access {
        return Some(slot(target).view().to_string());
    }
    None
}

/// The field's integer value, if it has one.
fn int_view<T: Bindable>(target: &mut T, field: &Field<T>) -> Option<i64> {
    if let Access::Scalar(slot) = field.access {
        return match slot(target).view() {
            crate::coerce::View::Int(v) => Some(v),
            crate::coerce::View::Uint(v) => i64::try_from(v).ok(),
            _ => None,
        };
    }
    None
}

/// The field's size: rune count for strings, element count for
/// collections.
fn size_view<T: Bindable>(target: &mut T, field: &Field<T>) -> Option<usize> {
    match field.access {
        Access::Scalar(slot) => match slot(target).view() {
            crate::coerce::View::Str(s) => Some(s.chars().count()),
            _ => None,
        },
        Access::ScalarList(slot) => Some(slot(target).len()),
        Access::FileList(slot) => Some(slot(target).len()),
        Access::RecordList { len, .. } => Some(len(target)),
        _ => None,
    }
}

fn alpha_dash(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn alpha_dash_dot(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

/// Shallow email screen: one `@`, a non-empty local part of plausible
/// characters, and a dotted domain of alphanumeric/hyphen labels.
fn looks_like_email(s: &str) -> bool {
    let (local, domain) = match s.split_once('@') {
        Some(parts) => parts,
        None => return false,
    };
    if local.is_empty() || local.contains('@') {
        return false;
    }
    let local_ok = local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~-.".contains(c));
    if !local_ok {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && label
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

/// Shallow URL screen: an http(s) scheme and a dotted host.
fn looks_like_url(s: &str) -> bool {
    let rest = match s
        .strip_prefix("http://")
        .or_else(|| s.strip_prefix("https://"))
    {
        Some(rest) => rest,
        None => return false,
    };
    let host = rest.split(['/', '?', '#']).next().unwrap_or("");
    let labels: Vec<&str> = host.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && label
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_classes() {
        assert!(alpha_dash("abc-123_X"));
        assert!(!alpha_dash("a.b"));
        assert!(alpha_dash_dot("a.b-c_1"));
        assert!(!alpha_dash_dot("a b"));
    }

    #[test]
    fn email_screen() {
        assert!(looks_like_email("test@example.com"));
        assert!(looks_like_email("first.last+tag@sub.example.org"));
        assert!(!looks_like_email("not-an-email"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("a@nodots"));
        assert!(!looks_like_email(""));
    }

    #[test]
    fn url_screen() {
        assert!(looks_like_url("http://example.com"));
        assert!(looks_like_url("https://example.com/path?q=1"));
        assert!(!looks_like_url("ftp://example.com"));
        assert!(!looks_like_url("http://nodots"));
        assert!(!looks_like_url("example.com"));
    }
}
