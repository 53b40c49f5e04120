// SPDX-License-Identifier: MIT

//! `cstruct` compiles declarative struct layouts — named, typed fields plus a
//! set of layout flags, optionally inheriting from another compiled struct —
//! into an immutable byte layout, and encodes/decodes values of that layout
//! to and from a compact binary representation with C-like memory semantics:
//! explicit alignment, padding, field reordering, and inheritance-style field
//! composition.
//!
//! Four pieces, built bottom-up:
//!
//! - [`types`] — the closed [`types::Type`] catalog: primitives, strings,
//!   arrays, opaque pointers, padding, and compiled structs themselves.
//! - [`field`] / [`flags`] — a single field's resolved layout ([`field::FieldInfo`])
//!   and the per-struct/per-field policy bitsets ([`flags::LayoutFlags`],
//!   [`flags::FieldFlags`]).
//! - [`compiler`] — [`compiler::StructBuilder`], the fluent entry point that
//!   resolves inheritance, overrides, reordering and alignment into a
//!   [`compiler::CompiledStruct`].
//! - [`codec`] — [`codec::Instance`], a value of a compiled struct type, with
//!   `to_bytes`/`from_bytes`.
//!
//! See the `cstruct_derive` crate for a `#[derive(BinStruct)]` convenience
//! layer built on top of [`compiler::StructBuilder`].

pub mod codec;
pub mod compiler;
pub mod cursor;
pub mod error;
pub mod field;
pub mod flags;
pub mod types;
pub mod value;

pub use codec::Instance;
pub use compiler::{CompiledStruct, StructBuilder};
pub use cursor::Cursor;
pub use error::{AssignError, CompileError, DecodeError, EncodeError, Error, TypeError};
pub use field::FieldInfo;
pub use flags::{FieldFlags, LayoutFlags};
pub use types::{Size, Type};
pub use value::Value;
