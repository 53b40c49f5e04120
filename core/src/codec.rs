//! The struct codec: reads/writes an [`Instance`] by walking its compiled
//! field list in order.

use std::collections::HashMap;
use std::sync::Arc;

use log::trace;

use crate::compiler::CompiledStruct;
use crate::cursor::Cursor;
use crate::error::{AssignError, DecodeError, EncodeError};
use crate::value::Value;

/// A value of a compiled struct type: the compiled layout plus a name→value
/// map for its user-visible fields. Synthetic padding fields carry no entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    ty: Arc<CompiledStruct>,
    values: HashMap<String, Value>,
}

impl Instance {
    pub fn new(ty: Arc<CompiledStruct>) -> Self {
        Instance {
            ty,
            values: HashMap::new(),
        }
    }

    pub fn ty(&self) -> &Arc<CompiledStruct> {
        &self.ty
    }

    /// Set a field's value, after checking it against the field's declared
    /// type with [`crate::types::Type::accepts`].
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), AssignError> {
        let value = value.into();
        let field = self
            .ty
            .field(name)
            .ok_or_else(|| AssignError::UnknownField(name.to_owned()))?;
        if !field.ty.accepts(&value) {
            return Err(AssignError::TypeMismatch {
                field: name.to_owned(),
                ty: field.ty.clone(),
            });
        }
        self.values.insert(name.to_owned(), value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        encode_fields(self)
    }

    pub fn from_bytes(ty: Arc<CompiledStruct>, buf: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = Cursor::new(buf);
        decode_fields(ty, &mut cursor)
    }
}

/// Encode every compiled field of `instance` in order. Used directly by
/// [`Instance::to_bytes`] and indirectly by [`crate::types::Type::encode`]
/// when a struct value is nested inside another struct.
pub(crate) fn encode_fields(instance: &Instance) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    for field in &instance.ty.fields {
        if field.is_padding() {
            field
                .ty
                .encode(&Value::Seq(Vec::new()), &mut out)
                .expect("padding encode never fails");
            continue;
        }
        let value = instance
            .values
            .get(&field.name)
            .ok_or_else(|| EncodeError::Uninitialized(field.name.clone()))?;
        trace!("encoding field `{}` at offset {}", field.name, field.offset);
        field
            .ty
            .encode(value, &mut out)
            .map_err(|source| EncodeError::InvalidValue {
                field: field.name.clone(),
                source,
            })?;
    }
    Ok(out)
}

/// Decode every compiled field of `ty` from `cursor`, in order, producing a
/// new [`Instance`]. Used directly by [`Instance::from_bytes`] and
/// indirectly by [`crate::types::Type::decode`] for nested structs.
pub(crate) fn decode_fields(
    ty: Arc<CompiledStruct>,
    cursor: &mut Cursor<'_>,
) -> Result<Instance, DecodeError> {
    let mut instance = Instance::new(Arc::clone(&ty));
    for field in &ty.fields {
        let value = field.ty.decode(cursor)?;
        if field.is_padding() {
            continue;
        }
        instance.values.insert(field.name.clone(), value);
    }
    Ok(instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::StructBuilder;
    use crate::flags::LayoutFlags;
    use crate::types::Type;

    #[test]
    fn basic_record_round_trip_scenario_1() {
        let person = StructBuilder::new("Person")
            .flags(LayoutFlags::NO_ALIGNMENT)
            .field("name", Type::VarString)
            .field("age", Type::I8)
            .build()
            .unwrap();

        let mut p = Instance::new(Arc::clone(&person));
        p.set("name", "John Doe").unwrap();
        p.set("age", 42i8).unwrap();

        let bytes = p.to_bytes().unwrap();
        assert_eq!(bytes.len(), 13);
        assert_eq!(&bytes[0..4], &8i32.to_le_bytes());
        assert_eq!(&bytes[4..12], b"John Doe");
        assert_eq!(bytes[12], 42);

        let decoded = Instance::from_bytes(person, &bytes).unwrap();
        assert_eq!(decoded, p);
    }

    #[test]
    fn inheritance_round_trip_scenario_2() {
        let person = StructBuilder::new("Person")
            .flags(LayoutFlags::NO_ALIGNMENT)
            .field("name", Type::VarString)
            .field("age", Type::I8)
            .build()
            .unwrap();
        let employee = StructBuilder::new("Employee")
            .flags(LayoutFlags::NO_ALIGNMENT)
            .base(Arc::clone(&person))
            .field("salary", Type::F64)
            .build()
            .unwrap();

        let mut e = Instance::new(Arc::clone(&employee));
        e.set("name", "John Doe").unwrap();
        e.set("age", 42i8).unwrap();
        e.set("salary", 123.45f64).unwrap();

        let bytes = e.to_bytes().unwrap();
        let mut p = Instance::new(person);
        p.set("name", "John Doe").unwrap();
        p.set("age", 42i8).unwrap();
        let person_bytes = p.to_bytes().unwrap();
        assert_eq!(&bytes[0..13], person_bytes.as_slice());

        let decoded = Instance::from_bytes(employee, &bytes).unwrap();
        assert_eq!(decoded, e);
    }

    #[test]
    fn uninitialized_field_fails_to_encode() {
        let person = StructBuilder::new("Person")
            .field("name", Type::VarString)
            .field("age", Type::I8)
            .build()
            .unwrap();
        let p = Instance::new(person);
        assert!(matches!(
            p.to_bytes(),
            Err(EncodeError::Uninitialized(ref f)) if f == "name"
        ));
    }

    #[test]
    fn set_rejects_wrong_type() {
        let person = StructBuilder::new("Person")
            .field("age", Type::I8)
            .build()
            .unwrap();
        let mut p = Instance::new(person);
        let err = p.set("age", "not a number").unwrap_err();
        assert!(matches!(err, AssignError::TypeMismatch { .. }));
    }

    #[test]
    fn set_rejects_unknown_field() {
        let person = StructBuilder::new("Person")
            .field("age", Type::I8)
            .build()
            .unwrap();
        let mut p = Instance::new(person);
        assert_eq!(
            p.set("nickname", "Bob").unwrap_err(),
            AssignError::UnknownField("nickname".to_owned())
        );
    }

    #[test]
    fn decode_rejects_truncated_input() {
        let person = StructBuilder::new("Person")
            .field("age", Type::I32)
            .build()
            .unwrap();
        let err = Instance::from_bytes(person, &[0u8; 2]).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedEnd { .. }));
    }

    #[test]
    fn char_field_round_trips_and_rejects_integers() {
        let ty = StructBuilder::new("WithChar")
            .field("c", Type::Char)
            .build()
            .unwrap();

        let mut inst = Instance::new(Arc::clone(&ty));
        inst.set("c", Value::Byte(b'x')).unwrap();
        let bytes = inst.to_bytes().unwrap();
        let decoded = Instance::from_bytes(ty.clone(), &bytes).unwrap();
        assert_eq!(decoded, inst);

        let mut inst2 = Instance::new(ty);
        assert!(matches!(
            inst2.set("c", 42u8),
            Err(AssignError::TypeMismatch { .. })
        ));
    }
}
