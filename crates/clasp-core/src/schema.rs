//! Field descriptor tables: the compile-time replacement for reflection.
//!
//! Each bindable record type carries a constant table of [`Field`]
//! descriptors (wire name, validation rules, typed accessor). The mapper
//! and validator walk these tables through the object-safe [`BindNode`]
//! seam, so the recursive passes are written once, generically, and the
//! per-type cost is a static array built at compile time.
//!
//! Tables are normally declared with the [`schema!`](crate::schema!) macro,
//! which generates the `Bindable` impl the way a derive would, without a
//! proc-macro crate.

use crate::coerce::{Scalar, ScalarList};
use crate::error::Errors;
use crate::keyspace::{FileHandle, KeySpace};
use crate::validate::Rule;

/// Accessor returning a field's scalar slot.
pub type ScalarFn<T> = for<'a> fn(&'a mut T) -> &'a mut dyn Scalar;
/// Accessor returning a field's scalar collection.
pub type ScalarListFn<T> = for<'a> fn(&'a mut T) -> &'a mut dyn ScalarList;
/// Accessor returning a field's optional file slot.
pub type FileFn<T> = for<'a> fn(&'a mut T) -> &'a mut Option<FileHandle>;
/// Accessor returning a field's file collection.
pub type FileListFn<T> = for<'a> fn(&'a mut T) -> &'a mut Vec<FileHandle>;
/// Accessor returning a nested record as a bind node.
pub type NodeFn<T> = for<'a> fn(&'a mut T) -> &'a mut dyn BindNode;
/// Accessor returning a nested record only if it is present.
pub type OptNodeFn<T> = for<'a> fn(&'a mut T) -> Option<&'a mut dyn BindNode>;

/// How a field is reached and what shape it has.
///
/// This is the closed set of field kinds the mapper understands; every
/// variant holds monomorphic accessor fns so the whole table can live in
/// a `const`.
pub enum Access<T> {
    /// A single typed scalar (`i32`, `String`, `bool`, ...).
    Scalar(ScalarFn<T>),
    /// A homogeneous collection of scalars (`Vec<i32>`, `Vec<String>`).
    ScalarList(ScalarListFn<T>),
    /// A single optional file attachment.
    File(FileFn<T>),
    /// A collection of file attachments.
    FileList(FileListFn<T>),
    /// An embedded record: its fields are addressed as if they were the
    /// parent's own (no extra path segment).
    Embedded(NodeFn<T>),
    /// An optional embedded record: replaced by a fresh zero-valued
    /// record for the mapping pass, then discarded again if nothing
    /// bound into it. Prior contents do not survive.
    OptEmbedded {
        materialize: NodeFn<T>,
        get: OptNodeFn<T>,
        clear: fn(&mut T),
    },
    /// A plain nested record, addressed under `name.`; always recursed
    /// into, even when no key matches.
    Record(NodeFn<T>),
    /// An optional nested record, materialized only if some key carries
    /// its `name.` prefix; otherwise it remains unset.
    OptRecord {
        materialize: NodeFn<T>,
        get: OptNodeFn<T>,
    },
    /// A collection of records (or optional records), addressed under
    /// `name.<index>.`; grown, never shrunk, to one past the highest
    /// addressed index.
    RecordList {
        grow: fn(&mut T, usize),
        len: fn(&T) -> usize,
        at: for<'a> fn(&'a mut T, usize) -> &'a mut dyn BindNode,
        at_opt: for<'a> fn(&'a mut T, usize) -> Option<&'a mut dyn BindNode>,
    },
}

impl<T> Clone for Access<T> {
    fn clone(&self) -> Self {
        *self
    }
}

// Every variant holds only fn pointers.
impl<T> Copy for Access<T> {}

/// One field descriptor: the wire name it is addressed by, the validation
/// rules attached to it, and its typed accessor.
pub struct Field<T> {
    /// The external key for this field (explicit tag, or the field
    /// identifier by default). Path prefixes are prepended during the
    /// recursive walk.
    pub name: &'static str,
    /// Declarative validation rules, evaluated in order with per-field
    /// short-circuit on the first violation.
    pub rules: &'static [Rule],
    /// How to reach the field.
    pub access: Access<T>,
}

impl<T> Field<T> {
    pub const fn new(name: &'static str, rules: &'static [Rule], access: Access<T>) -> Self {
        Self {
            name,
            rules,
            access,
        }
    }
}

/// A record type that can be populated from a flat key space.
///
/// Implementations are normally generated by [`schema!`](crate::schema!).
/// Overriding `validate` is the custom-validation capability: it runs once
/// per record instance after the built-in rules for that record's fields.
pub trait Bindable: Default + 'static {
    /// The constant field descriptor table for this type.
    fn schema() -> &'static [Field<Self>]
    where
        Self: Sized;

    /// Custom cross-field validation hook. The default does nothing.
    fn validate(&self, errors: &mut Errors) {
        let _ = errors;
    }
}

/// Object-safe recursion seam over bindable records.
///
/// Blanket-implemented for every [`Bindable`]; the descriptor tables store
/// accessors returning `&mut dyn BindNode` so nested records of different
/// concrete types can be walked by one generic pass.
pub trait BindNode {
    /// Populate this record's fields from the key space, accumulating
    /// errors; `prefix` is the dotted path accumulated so far.
    fn bind_fields(&mut self, prefix: &str, space: &KeySpace, errors: &mut Errors);

    /// Apply this record's validation rules, accumulating errors; `path`
    /// is the dotted path accumulated so far.
    fn validate_fields(&mut self, path: &str, errors: &mut Errors);

    /// Whether every field holds its zero value. Drives the
    /// optional-embedded discard rule and the `Required` rule on record
    /// fields.
    fn is_zero(&mut self) -> bool;
}

/// Declare the binding schema for a record type.
///
/// Generates the [`Bindable`] impl: a constant field table plus an
/// optional custom validation hook. Field forms:
///
/// ```ignore
/// clasp_core::schema! {
///     BlogPost {
///         embed post;                              // embedded record
///         scalar id = "id", rules [Rule::Required];
///         scalar_list ratings = "rating";
///         record author;                           // nested, wire name "author"
///         opt_record coauthor;                     // materialized only if addressed
///         record_list readers;
///         opt_record_list contributors;            // Vec<Option<Person>>
///         file header_image = "headerImage";
///         file_list pictures = "picture";
///     }
///     validate(post, errors) { ... }               // optional hook
/// }
/// ```
///
/// The wire name defaults to the field identifier; `= "name"` overrides.
/// Fields not listed are invisible to binding and validation.
#[macro_export]
macro_rules! schema {
    (
        $ty:ident {
            $( $kind:ident $field:ident $(= $wire:literal)? $(, rules [ $($rule:expr),* $(,)? ])? ; )*
        }
        $( validate($self_:ident, $errors:ident) $hook:block )?
    ) => {
        impl $crate::Bindable for $ty {
            fn schema() -> &'static [$crate::Field<Self>] {
                const FIELDS: &[$crate::Field<$ty>] = &[
                    $(
                        $crate::schema!(@field $ty, $kind, $field,
                            $crate::schema!(@wire $field $(= $wire)?),
                            &[ $( $( $rule ),* )? ])
                    ),*
                ];
                FIELDS
            }

            $(
                fn validate(&self, errors: &mut $crate::Errors) {
                    let $self_ = self;
                    let $errors = errors;
                    $hook
                }
            )?
        }
    };

    (@wire $field:ident) => {
        stringify!($field)
    };
    (@wire $field:ident = $wire:tt) => {
        $wire
    };

    (@field $ty:ident, scalar, $field:ident, $wire:expr, $rules:expr) => {{
        fn access(r: &mut $ty) -> &mut dyn $crate::coerce::Scalar {
            &mut r.$field
        }
        $crate::Field::new($wire, $rules, $crate::Access::Scalar(access))
    }};

    (@field $ty:ident, scalar_list, $field:ident, $wire:expr, $rules:expr) => {{
        fn access(r: &mut $ty) -> &mut dyn $crate::coerce::ScalarList {
            &mut r.$field
        }
        $crate::Field::new($wire, $rules, $crate::Access::ScalarList(access))
    }};

    (@field $ty:ident, file, $field:ident, $wire:expr, $rules:expr) => {{
        fn access(r: &mut $ty) -> &mut Option<$crate::FileHandle> {
            &mut r.$field
        }
        $crate::Field::new($wire, $rules, $crate::Access::File(access))
    }};

    (@field $ty:ident, file_list, $field:ident, $wire:expr, $rules:expr) => {{
        fn access(r: &mut $ty) -> &mut Vec<$crate::FileHandle> {
            &mut r.$field
        }
        $crate::Field::new($wire, $rules, $crate::Access::FileList(access))
    }};

    (@field $ty:ident, embed, $field:ident, $wire:expr, $rules:expr) => {{
        fn access(r: &mut $ty) -> &mut dyn $crate::BindNode {
            &mut r.$field
        }
        $crate::Field::new($wire, $rules, $crate::Access::Embedded(access))
    }};

    (@field $ty:ident, opt_embed, $field:ident, $wire:expr, $rules:expr) => {{
        // A fresh record every pass: stale contents must not survive a
        // rebind, and must not block the discard-if-zero rule.
        fn materialize(r: &mut $ty) -> &mut dyn $crate::BindNode {
            r.$field.insert(Default::default())
        }
        fn get(r: &mut $ty) -> Option<&mut dyn $crate::BindNode> {
            match r.$field {
                Some(ref mut inner) => Some(inner),
                None => None,
            }
        }
        fn clear(r: &mut $ty) {
            r.$field = None;
        }
        $crate::Field::new(
            $wire,
            $rules,
            $crate::Access::OptEmbedded {
                materialize,
                get,
                clear,
            },
        )
    }};

    (@field $ty:ident, record, $field:ident, $wire:expr, $rules:expr) => {{
        fn access(r: &mut $ty) -> &mut dyn $crate::BindNode {
            &mut r.$field
        }
        $crate::Field::new($wire, $rules, $crate::Access::Record(access))
    }};

    (@field $ty:ident, opt_record, $field:ident, $wire:expr, $rules:expr) => {{
        fn materialize(r: &mut $ty) -> &mut dyn $crate::BindNode {
            r.$field.get_or_insert_with(Default::default)
        }
        fn get(r: &mut $ty) -> Option<&mut dyn $crate::BindNode> {
            match r.$field {
                Some(ref mut inner) => Some(inner),
                None => None,
            }
        }
        $crate::Field::new(
            $wire,
            $rules,
            $crate::Access::OptRecord { materialize, get },
        )
    }};

    (@field $ty:ident, record_list, $field:ident, $wire:expr, $rules:expr) => {{
        fn grow(r: &mut $ty, size: usize) {
            if r.$field.len() < size {
                r.$field.resize_with(size, Default::default);
            }
        }
        fn len(r: &$ty) -> usize {
            r.$field.len()
        }
        fn at(r: &mut $ty, index: usize) -> &mut dyn $crate::BindNode {
            &mut r.$field[index]
        }
        fn at_opt(r: &mut $ty, index: usize) -> Option<&mut dyn $crate::BindNode> {
            Some(&mut r.$field[index])
        }
        $crate::Field::new(
            $wire,
            $rules,
            $crate::Access::RecordList {
                grow,
                len,
                at,
                at_opt,
            },
        )
    }};

    (@field $ty:ident, opt_record_list, $field:ident, $wire:expr, $rules:expr) => {{
        fn grow(r: &mut $ty, size: usize) {
            if r.$field.len() < size {
                r.$field.resize_with(size, Default::default);
            }
        }
        fn len(r: &$ty) -> usize {
            r.$field.len()
        }
        fn at(r: &mut $ty, index: usize) -> &mut dyn $crate::BindNode {
            r.$field[index].get_or_insert_with(Default::default)
        }
        fn at_opt(r: &mut $ty, index: usize) -> Option<&mut dyn $crate::BindNode> {
            match r.$field[index] {
                Some(ref mut inner) => Some(inner),
                None => None,
            }
        }
        $crate::Field::new(
            $wire,
            $rules,
            $crate::Access::RecordList {
                grow,
                len,
                at,
                at_opt,
            },
        )
    }};
}
