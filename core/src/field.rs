//! A single field's compiled layout information.

use crate::flags::FieldFlags;
use crate::types::Type;

/// One field of a [`crate::compiler::CompiledStruct`], with its type, byte
/// offset, and override policy already resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldInfo {
    pub name: String,
    pub ty: Type,
    pub offset: usize,
    pub flags: FieldFlags,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        FieldInfo {
            name: name.into(),
            ty,
            offset: 0,
            flags: FieldFlags::empty(),
        }
    }

    pub fn protected(self) -> Self {
        FieldInfo {
            flags: self.flags | FieldFlags::PROTECTED,
            ..self
        }
    }

    pub fn is_protected(&self) -> bool {
        self.flags.contains(FieldFlags::PROTECTED)
    }

    /// Synthetic padding fields are generated by the compiler, not declared
    /// by a user, and are excluded from the codec's name-based value map.
    pub fn is_padding(&self) -> bool {
        self.name.starts_with(PADDING_PREFIX)
    }
}

pub(crate) const PADDING_PREFIX: &str = "__padding_";
