//! The type registry: a closed, structurally-comparable set of field-type
//! descriptors, each carrying alignment, size, and an encode/decode/accepts
//! contract.
//!
//! Types are plain values rather than trait objects (mirroring the teacher's
//! closed `Format`/`FormatChar` enum), so that `TypeSafeOverride` can compare
//! two field types with ordinary structural equality instead of identity.

use std::sync::Arc;

use crate::compiler::CompiledStruct;
use crate::cursor::Cursor;
use crate::error::{DecodeError, TypeError};
use crate::value::Value;

/// The size of an encoded value: either a compile-time constant, or
/// [`Size::Dynamic`] when the encoding depends on the value itself (variable
/// strings/arrays, or any struct containing one).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Size {
    Fixed(usize),
    Dynamic,
}

impl Size {
    pub fn is_dynamic(self) -> bool {
        matches!(self, Size::Dynamic)
    }

    pub fn fixed(self) -> Option<usize> {
        match self {
            Size::Fixed(n) => Some(n),
            Size::Dynamic => None,
        }
    }
}

/// A field type descriptor.
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// A single opaque byte.
    Char,
    /// An opaque machine-word address. Decoding never dereferences it.
    AnyPtr,
    /// Synthetic, compiler-inserted filler. Not user-addressable.
    Padding(usize),
    FixedString(usize),
    VarString,
    FixedArray(Box<Type>, usize),
    VarArray(Box<Type>),
    /// An opaque pointer to a value of `E`. Decodes to the address, not `E`.
    Ptr(Box<Type>),
    /// An opaque reference to a value of `E`. Decodes to the address, not `E`.
    Ref(Box<Type>),
    Struct(Arc<CompiledStruct>),
}

impl Type {
    pub fn array(element: Type, len: usize) -> Type {
        Type::FixedArray(Box::new(element), len)
    }

    pub fn var_array(element: Type) -> Type {
        Type::VarArray(Box::new(element))
    }

    pub fn ptr(element: Type) -> Type {
        Type::Ptr(Box::new(element))
    }

    pub fn reference(element: Type) -> Type {
        Type::Ref(Box::new(element))
    }

    pub fn size(&self) -> Size {
        match self {
            Type::I8 | Type::U8 | Type::Char => Size::Fixed(1),
            Type::I16 | Type::U16 => Size::Fixed(2),
            Type::I32 | Type::U32 | Type::F32 => Size::Fixed(4),
            Type::I64 | Type::U64 | Type::F64 => Size::Fixed(8),
            Type::AnyPtr | Type::Ptr(_) | Type::Ref(_) => Size::Fixed(8),
            Type::Padding(k) => Size::Fixed(*k),
            Type::FixedString(k) => Size::Fixed(*k),
            Type::VarString => Size::Dynamic,
            Type::FixedArray(elem, len) => match elem.size() {
                Size::Fixed(n) => Size::Fixed(n * len),
                Size::Dynamic => Size::Dynamic,
            },
            Type::VarArray(_) => Size::Dynamic,
            Type::Struct(cs) => cs.size,
        }
    }

    pub fn alignment(&self) -> usize {
        match self {
            Type::I8 | Type::U8 | Type::Char => 1,
            Type::I16 | Type::U16 => 2,
            Type::I32 | Type::U32 | Type::F32 => 4,
            Type::I64 | Type::U64 | Type::F64 => 8,
            Type::AnyPtr | Type::Ptr(_) | Type::Ref(_) => 4,
            Type::Padding(_) | Type::FixedString(_) | Type::VarString => 1,
            Type::FixedArray(elem, _) | Type::VarArray(elem) => elem.alignment(),
            Type::Struct(cs) => cs.alignment,
        }
    }

    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Type::I8 | Type::I16 | Type::I32 | Type::I64 => value.as_i64().is_some(),
            Type::U8 | Type::U16 | Type::U32 | Type::U64 | Type::AnyPtr => {
                value.as_u64().is_some()
            }
            Type::F32 | Type::F64 => value.as_f64().is_some(),
            Type::Char => matches!(value, Value::Byte(_)),
            Type::Padding(_) => true,
            Type::FixedString(k) => matches!(value, Value::Text(s) if s.len() == *k),
            Type::VarString => matches!(value, Value::Text(_)),
            Type::FixedArray(elem, len) => {
                matches!(value, Value::Seq(items) if items.len() == *len && items.iter().all(|v| elem.accepts(v)))
            }
            Type::VarArray(elem) => {
                matches!(value, Value::Seq(items) if items.iter().all(|v| elem.accepts(v)))
            }
            Type::Ptr(_) | Type::Ref(_) => value.as_u64().is_some(),
            Type::Struct(cs) => matches!(value, Value::Struct(inst) if inst.ty().name == cs.name),
        }
    }

    /// Encode `value` and append the bytes to `out`. The caller (the codec)
    /// is responsible for attaching field-name context to any error.
    pub fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), TypeError> {
        if !self.accepts(value) {
            return Err(TypeError::NotAccepted);
        }
        match self {
            Type::I8 => out.push(value.as_i64().unwrap() as i8 as u8),
            Type::U8 => out.push(value.as_u64().unwrap() as u8),
            Type::Char => {
                let Value::Byte(b) = value else {
                    unreachable!("accepts() already checked this is a Value::Byte")
                };
                out.push(*b);
            }
            Type::I16 => out.extend_from_slice(&(value.as_i64().unwrap() as i16).to_le_bytes()),
            Type::U16 => out.extend_from_slice(&(value.as_u64().unwrap() as u16).to_le_bytes()),
            Type::I32 => out.extend_from_slice(&(value.as_i64().unwrap() as i32).to_le_bytes()),
            Type::U32 => out.extend_from_slice(&(value.as_u64().unwrap() as u32).to_le_bytes()),
            Type::I64 => out.extend_from_slice(&value.as_i64().unwrap().to_le_bytes()),
            Type::U64 | Type::AnyPtr => {
                out.extend_from_slice(&value.as_u64().unwrap().to_le_bytes())
            }
            Type::F32 => out.extend_from_slice(&(value.as_f64().unwrap() as f32).to_le_bytes()),
            Type::F64 => out.extend_from_slice(&value.as_f64().unwrap().to_le_bytes()),
            Type::Padding(k) => out.extend(std::iter::repeat(0u8).take(*k)),
            Type::FixedString(k) => {
                let text = value.as_text().unwrap();
                if text.len() != *k {
                    return Err(TypeError::LengthMismatch {
                        expected: *k,
                        actual: text.len(),
                    });
                }
                out.extend_from_slice(text.as_bytes());
            }
            Type::VarString => {
                let text = value.as_text().unwrap();
                let len = i32::try_from(text.len()).map_err(|_| TypeError::LengthMismatch {
                    expected: i32::MAX as usize,
                    actual: text.len(),
                })?;
                out.extend_from_slice(&len.to_le_bytes());
                out.extend_from_slice(text.as_bytes());
            }
            Type::FixedArray(elem, len) => {
                let items = value.as_seq().unwrap();
                if items.len() != *len {
                    return Err(TypeError::LengthMismatch {
                        expected: *len,
                        actual: items.len(),
                    });
                }
                for item in items {
                    elem.encode(item, out)?;
                }
            }
            Type::VarArray(elem) => {
                let items = value.as_seq().unwrap();
                let len = i32::try_from(items.len()).map_err(|_| TypeError::LengthMismatch {
                    expected: i32::MAX as usize,
                    actual: items.len(),
                })?;
                out.extend_from_slice(&len.to_le_bytes());
                for item in items {
                    elem.encode(item, out)?;
                }
            }
            Type::Ptr(_) | Type::Ref(_) => {
                out.extend_from_slice(&value.as_u64().unwrap().to_le_bytes())
            }
            Type::Struct(_) => {
                let Value::Struct(inst) = value else {
                    unreachable!("accepts() already checked this is a Value::Struct")
                };
                let bytes = crate::codec::encode_fields(inst).map_err(|_| TypeError::NotAccepted)?;
                out.extend_from_slice(&bytes);
            }
        }
        Ok(())
    }

    pub fn decode(&self, cursor: &mut Cursor<'_>) -> Result<Value, DecodeError> {
        match self {
            Type::I8 => Ok(Value::Int(i8::from_le_bytes(cursor.take_array()?) as i64)),
            Type::U8 => Ok(Value::UInt(u8::from_le_bytes(cursor.take_array()?) as u64)),
            Type::Char => Ok(Value::Byte(u8::from_le_bytes(cursor.take_array()?))),
            Type::I16 => Ok(Value::Int(i16::from_le_bytes(cursor.take_array()?) as i64)),
            Type::U16 => Ok(Value::UInt(u16::from_le_bytes(cursor.take_array()?) as u64)),
            Type::I32 => Ok(Value::Int(i32::from_le_bytes(cursor.take_array()?) as i64)),
            Type::U32 => Ok(Value::UInt(u32::from_le_bytes(cursor.take_array()?) as u64)),
            Type::I64 => Ok(Value::Int(i64::from_le_bytes(cursor.take_array()?))),
            Type::U64 | Type::AnyPtr => {
                Ok(Value::UInt(u64::from_le_bytes(cursor.take_array()?)))
            }
            Type::F32 => Ok(Value::Float(f32::from_le_bytes(cursor.take_array()?) as f64)),
            Type::F64 => Ok(Value::Float(f64::from_le_bytes(cursor.take_array()?))),
            Type::Padding(k) => {
                cursor.take(*k)?;
                Ok(Value::Seq(Vec::new()))
            }
            Type::FixedString(k) => {
                let bytes = cursor.take(*k)?;
                let text = std::str::from_utf8(bytes)
                    .map_err(|_| DecodeError::InvalidUtf8)?
                    .to_owned();
                Ok(Value::Text(text))
            }
            Type::VarString => {
                let len = read_len(cursor)?;
                let bytes = cursor.take(len)?;
                let text = std::str::from_utf8(bytes)
                    .map_err(|_| DecodeError::InvalidUtf8)?
                    .to_owned();
                Ok(Value::Text(text))
            }
            Type::FixedArray(elem, len) => {
                let items = (0..*len)
                    .map(|_| elem.decode(cursor))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Seq(items))
            }
            Type::VarArray(elem) => {
                let len = read_len(cursor)?;
                let items = (0..len)
                    .map(|_| elem.decode(cursor))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Seq(items))
            }
            Type::Ptr(_) | Type::Ref(_) => {
                Ok(Value::UInt(u64::from_le_bytes(cursor.take_array()?)))
            }
            Type::Struct(cs) => {
                let inst = crate::codec::decode_fields(Arc::clone(cs), cursor)?;
                Ok(Value::Struct(inst))
            }
        }
    }
}

fn read_len(cursor: &mut Cursor<'_>) -> Result<usize, DecodeError> {
    let raw = i32::from_le_bytes(cursor.take_array()?);
    if raw < 0 {
        return Err(DecodeError::NegativeLength(raw));
    }
    Ok(raw as usize)
}
