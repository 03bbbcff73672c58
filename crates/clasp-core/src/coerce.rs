//! Scalar coercion: textual values into typed field slots.
//!
//! The blank policy is deliberate: an empty string coerces to the target
//! kind's zero value (0, 0.0, false) with no error, because an HTML form
//! submits empty inputs rather than omitting them. The string kind takes
//! the empty string as-is. Booleans additionally accept the literal `"on"`
//! (the checkbox convention) before standard `true`/`false` parsing.
//!
//! Coercion failures report a classified error and leave the slot at its
//! zero value; they never abort the caller's pass over sibling fields.

use std::fmt;

use crate::error::ErrorKind;

/// Coarse classification of a scalar slot, used for error reporting and
/// rule applicability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Int,
    Uint,
    Bool,
    Float,
    Str,
}

/// A failed coercion: the classification plus the fixed message for the
/// slot's kind and bit width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoerceError {
    pub kind: ErrorKind,
    pub message: &'static str,
}

impl CoerceError {
    const INTEGER: Self = Self {
        kind: ErrorKind::IntegerType,
        message: "Value could not be parsed as integer",
    };
    const UNSIGNED: Self = Self {
        kind: ErrorKind::IntegerType,
        message: "Value could not be parsed as unsigned integer",
    };
    const BOOLEAN: Self = Self {
        kind: ErrorKind::BooleanType,
        message: "Value could not be parsed as boolean",
    };
    const FLOAT32: Self = Self {
        kind: ErrorKind::FloatType,
        message: "Value could not be parsed as 32-bit float",
    };
    const FLOAT64: Self = Self {
        kind: ErrorKind::FloatType,
        message: "Value could not be parsed as 64-bit float",
    };
}

/// A read-side projection of a scalar slot, used by the validator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View<'a> {
    Str(&'a str),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Str(s) => f.write_str(s),
            View::Int(v) => write!(f, "{}", v),
            View::Uint(v) => write!(f, "{}", v),
            View::Float(v) => write!(f, "{}", v),
            View::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// A typed scalar slot that textual values coerce into.
///
/// Object-safe on purpose: field descriptor tables store monomorphic
/// accessor fns returning `&mut dyn Scalar`, so the mapper and validator
/// walk records without knowing concrete field types.
pub trait Scalar {
    /// Coerce a raw textual value into this slot. On failure the slot is
    /// left at its zero value and a classified error is returned.
    fn coerce_from(&mut self, raw: &str) -> Result<(), CoerceError>;

    /// A read-only view of the current value.
    fn view(&self) -> View<'_>;

    /// The slot's classification.
    fn kind(&self) -> ScalarKind;

    /// Whether the slot holds its kind's zero value.
    fn is_zero(&self) -> bool;
}

macro_rules! signed_scalar {
    ($($ty:ty),*) => { $(
        impl Scalar for $ty {
            fn coerce_from(&mut self, raw: &str) -> Result<(), CoerceError> {
                if raw.is_empty() {
                    *self = 0;
                    return Ok(());
                }
                match raw.parse::<$ty>() {
                    Ok(v) => {
                        *self = v;
                        Ok(())
                    }
                    Err(_) => Err(CoerceError::INTEGER),
                }
            }

            fn view(&self) -> View<'_> {
                View::Int(*self as i64)
            }

            fn kind(&self) -> ScalarKind {
                ScalarKind::Int
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }
        }
    )* };
}

macro_rules! unsigned_scalar {
    ($($ty:ty),*) => { $(
        impl Scalar for $ty {
            fn coerce_from(&mut self, raw: &str) -> Result<(), CoerceError> {
                if raw.is_empty() {
                    *self = 0;
                    return Ok(());
                }
                match raw.parse::<$ty>() {
                    Ok(v) => {
                        *self = v;
                        Ok(())
                    }
                    Err(_) => Err(CoerceError::UNSIGNED),
                }
            }

            fn view(&self) -> View<'_> {
                View::Uint(*self as u64)
            }

            fn kind(&self) -> ScalarKind {
                ScalarKind::Uint
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }
        }
    )* };
}

macro_rules! float_scalar {
    ($($ty:ty => $err:ident),*) => { $(
        impl Scalar for $ty {
            fn coerce_from(&mut self, raw: &str) -> Result<(), CoerceError> {
                if raw.is_empty() {
                    *self = 0.0;
                    return Ok(());
                }
                match raw.parse::<$ty>() {
                    Ok(v) => {
                        *self = v;
                        Ok(())
                    }
                    Err(_) => Err(CoerceError::$err),
                }
            }

            fn view(&self) -> View<'_> {
                View::Float(*self as f64)
            }

            fn kind(&self) -> ScalarKind {
                ScalarKind::Float
            }

            fn is_zero(&self) -> bool {
                *self == 0.0
            }
        }
    )* };
}

signed_scalar!(i8, i16, i32, i64);
unsigned_scalar!(u8, u16, u32, u64);
float_scalar!(f32 => FLOAT32, f64 => FLOAT64);

impl Scalar for bool {
    fn coerce_from(&mut self, raw: &str) -> Result<(), CoerceError> {
        // HTML checkboxes submit "on" when checked.
        if raw == "on" {
            *self = true;
            return Ok(());
        }
        if raw.is_empty() {
            *self = false;
            return Ok(());
        }
        match raw.parse::<bool>() {
            Ok(v) => {
                *self = v;
                Ok(())
            }
            Err(_) => Err(CoerceError::BOOLEAN),
        }
    }

    fn view(&self) -> View<'_> {
        View::Bool(*self)
    }

    fn kind(&self) -> ScalarKind {
        ScalarKind::Bool
    }

    fn is_zero(&self) -> bool {
        !*self
    }
}

impl Scalar for String {
    fn coerce_from(&mut self, raw: &str) -> Result<(), CoerceError> {
        raw.clone_into(self);
        Ok(())
    }

    fn view(&self) -> View<'_> {
        View::Str(self)
    }

    fn kind(&self) -> ScalarKind {
        ScalarKind::Str
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

/// A homogeneous collection of scalar slots.
///
/// `append` coerces one element; on failure the element still occupies its
/// position (at the kind's zero value) so the collection keeps the same
/// length as the incoming value list.
pub trait ScalarList {
    /// Drop all elements.
    fn clear(&mut self);

    /// Coerce and append one element. A failed element is appended as the
    /// kind's zero value and the error is returned.
    fn append(&mut self, raw: &str) -> Result<(), CoerceError>;

    /// Current element count.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element classification.
    fn kind(&self) -> ScalarKind;
}

impl<S: Scalar + Default> ScalarList for Vec<S> {
    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn append(&mut self, raw: &str) -> Result<(), CoerceError> {
        let mut slot = S::default();
        let result = slot.coerce_from(raw);
        self.push(slot);
        result
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn kind(&self) -> ScalarKind {
        S::default().kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coerce<S: Scalar + Default>(raw: &str) -> Result<S, CoerceError> {
        let mut slot = S::default();
        slot.coerce_from(raw)?;
        Ok(slot)
    }

    #[test]
    fn blank_means_zero() {
        assert_eq!(coerce::<i32>("").unwrap(), 0);
        assert_eq!(coerce::<u64>("").unwrap(), 0);
        assert_eq!(coerce::<f64>("").unwrap(), 0.0);
        assert!(!coerce::<bool>("").unwrap());
        assert_eq!(coerce::<String>("").unwrap(), "");
    }

    #[test]
    fn numeric_parsing() {
        assert_eq!(coerce::<i8>("-8").unwrap(), -8);
        assert_eq!(coerce::<i64>("-64").unwrap(), -64);
        assert_eq!(coerce::<u16>("16").unwrap(), 16);
        assert_eq!(coerce::<f32>("32.3232").unwrap(), 32.3232);
        assert_eq!(coerce::<f64>("-64.6464646464").unwrap(), -64.6464646464);
    }

    #[test]
    fn numeric_failures_are_classified() {
        let err = coerce::<i32>("asdf").unwrap_err();
        assert_eq!(err.kind, ErrorKind::IntegerType);
        assert_eq!(err.message, "Value could not be parsed as integer");

        let err = coerce::<u32>("-1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::IntegerType);
        assert_eq!(err.message, "Value could not be parsed as unsigned integer");

        let err = coerce::<f32>("asdf").unwrap_err();
        assert_eq!(err.kind, ErrorKind::FloatType);
        assert_eq!(err.message, "Value could not be parsed as 32-bit float");

        let err = coerce::<f64>("asdf").unwrap_err();
        assert_eq!(err.message, "Value could not be parsed as 64-bit float");
    }

    #[test]
    fn checkbox_on_is_true() {
        assert!(coerce::<bool>("on").unwrap());
        assert!(coerce::<bool>("true").unwrap());
        assert!(!coerce::<bool>("false").unwrap());
        let err = coerce::<bool>("asdf").unwrap_err();
        assert_eq!(err.kind, ErrorKind::BooleanType);
    }

    #[test]
    fn failed_list_element_keeps_position() {
        let mut list: Vec<i32> = Vec::new();
        assert!(ScalarList::append(&mut list, "4").is_ok());
        assert!(ScalarList::append(&mut list, "bad").is_err());
        assert!(ScalarList::append(&mut list, "5").is_ok());
        assert_eq!(list, vec![4, 0, 5]);
    }

    #[test]
    fn views_render_like_form_values() {
        assert_eq!(View::Str("abc").to_string(), "abc");
        assert_eq!(View::Int(-3).to_string(), "-3");
        assert_eq!(View::Bool(true).to_string(), "true");
    }
}
