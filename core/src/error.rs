//! Error taxonomy. One `thiserror` enum per fallible boundary, composed into
//! a single crate-level [`Error`] for callers that don't care which stage
//! failed.

use thiserror::Error;

/// Failures raised while compiling a [`crate::compiler::StructBuilder`] into
/// a [`crate::compiler::CompiledStruct`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("cannot derive from final struct `{0}`")]
    Inheritance(String),

    #[error("field `{0}` already exists and AllowOverride is not set")]
    Override(String),

    #[error("field `{0}` is protected and cannot be overridden")]
    UnoverridableField(String),

    #[error("field `{name}` overrides type {base_type:?} with incompatible type {new_type:?}")]
    UnsafeOverride {
        name: String,
        base_type: crate::types::Type,
        new_type: crate::types::Type,
    },

    #[error("struct is marked FixedSize but the compiled layout is dynamically sized")]
    Size,

    #[error("field name must not be empty")]
    EmptyName,

    #[error("more than one alignment mode (Align1/2/4/8, AlignAuto, NoAlignment) is set")]
    ConflictingAlignment,
}

/// Failure raised by [`crate::codec::Instance::set`] when a value does not
/// satisfy the field type's [`crate::types::Type::accepts`] check.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssignError {
    #[error("struct has no field named `{0}`")]
    UnknownField(String),

    #[error("value does not match the declared type of field `{field}`: {ty:?}")]
    TypeMismatch {
        field: String,
        ty: crate::types::Type,
    },
}

/// A type-local encode failure, without field-name context. Raised by
/// [`crate::types::Type::encode`]; [`crate::codec`] attaches the field name
/// when it re-raises this as an [`EncodeError`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeError {
    #[error("value does not match the declared field type")]
    NotAccepted,

    #[error("expected {expected} element(s)/bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Failures while serializing an [`crate::codec::Instance`] to bytes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("field `{0}` has no value set")]
    Uninitialized(String),

    #[error("field `{field}`: {source}")]
    InvalidValue {
        field: String,
        #[source]
        source: TypeError,
    },
}

/// Failures while parsing bytes into an [`crate::codec::Instance`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("unexpected end of input: needed {needed} byte(s), had {available}")]
    UnexpectedEnd { needed: usize, available: usize },

    #[error("length prefix {0} is negative")]
    NegativeLength(i32),

    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,
}

/// Crate-wide error, for callers who want a single `Result<T, Error>` at the
/// outer boundary while internals keep precise per-stage error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Assign(#[from] AssignError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
