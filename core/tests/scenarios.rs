use std::sync::Arc;

use cstruct::{CompiledStruct, Instance, LayoutFlags, StructBuilder, Type};

fn person() -> Arc<CompiledStruct> {
    StructBuilder::new("Person")
        .flags(LayoutFlags::NO_ALIGNMENT)
        .field("name", Type::VarString)
        .field("age", Type::I8)
        .build()
        .unwrap()
}

#[test]
fn basic_record_scenario_1() {
    let ty = person();
    let mut p = Instance::new(Arc::clone(&ty));
    p.set("name", "John Doe").unwrap();
    p.set("age", 42i8).unwrap();

    let bytes = p.to_bytes().unwrap();
    assert_eq!(bytes.len(), 13);

    let roundtripped = Instance::from_bytes(ty, &bytes).unwrap();
    assert_eq!(roundtripped, p);
}

#[test]
fn employee_extends_person_scenario_2() {
    let base = person();
    let employee = StructBuilder::new("Employee")
        .flags(LayoutFlags::NO_ALIGNMENT)
        .base(Arc::clone(&base))
        .field("salary", Type::F64)
        .build()
        .unwrap();

    let mut e = Instance::new(Arc::clone(&employee));
    e.set("name", "John Doe").unwrap();
    e.set("age", 42i8).unwrap();
    e.set("salary", 123.45f64).unwrap();

    let bytes = e.to_bytes().unwrap();
    let decoded = Instance::from_bytes(employee, &bytes).unwrap();
    assert_eq!(decoded, e);
}

#[test]
fn align_auto_scenario_4() {
    let ty = StructBuilder::new("Record")
        .flags(LayoutFlags::ALIGN_AUTO)
        .field("name", Type::FixedString(10))
        .field("age", Type::I8)
        .field("salary", Type::F64)
        .build()
        .unwrap();

    assert_eq!(ty.field("name").unwrap().offset, 0);
    assert_eq!(ty.field("age").unwrap().offset, 10);
    assert_eq!(ty.field("salary").unwrap().offset, 16);
    assert_eq!(ty.size.fixed(), Some(24));
}

#[test]
fn reorder_fields_scenario_5() {
    let ty = StructBuilder::new("Record")
        .flags(LayoutFlags::REORDER_FIELDS | LayoutFlags::NO_ALIGNMENT)
        .field("name", Type::FixedString(10))
        .field("age", Type::I8)
        .field("salary", Type::F64)
        .build()
        .unwrap();

    assert_eq!(ty.field("name").unwrap().offset, 0);
    assert_eq!(ty.field("salary").unwrap().offset, 10);
    assert_eq!(ty.field("age").unwrap().offset, 18);
    assert_eq!(ty.size.fixed(), Some(19));
}

#[test]
fn fixed_size_enforcement_scenario_8() {
    let err = StructBuilder::new("Record")
        .flags(LayoutFlags::default() | LayoutFlags::FIXED_SIZE)
        .field("name", Type::VarString)
        .build()
        .unwrap_err();
    assert!(matches!(err, cstruct::CompileError::Size));
}

#[test]
fn nested_struct_round_trips() {
    let inner = StructBuilder::new("Point")
        .flags(LayoutFlags::NO_ALIGNMENT)
        .field("x", Type::I32)
        .field("y", Type::I32)
        .build()
        .unwrap();
    let outer = StructBuilder::new("Line")
        .flags(LayoutFlags::NO_ALIGNMENT)
        .field("start", Type::Struct(Arc::clone(&inner)))
        .field("end", Type::Struct(Arc::clone(&inner)))
        .build()
        .unwrap();

    let mut start = Instance::new(Arc::clone(&inner));
    start.set("x", 1i32).unwrap();
    start.set("y", 2i32).unwrap();
    let mut end = Instance::new(inner);
    end.set("x", 3i32).unwrap();
    end.set("y", 4i32).unwrap();

    let mut line = Instance::new(Arc::clone(&outer));
    line.set("start", start).unwrap();
    line.set("end", end).unwrap();

    let bytes = line.to_bytes().unwrap();
    assert_eq!(bytes.len(), 16);
    let decoded = Instance::from_bytes(outer, &bytes).unwrap();
    assert_eq!(decoded, line);
}

#[test]
fn var_array_of_i32_round_trips() {
    let ty = StructBuilder::new("Bag")
        .flags(LayoutFlags::NO_ALIGNMENT)
        .field("items", Type::var_array(Type::I32))
        .build()
        .unwrap();

    let mut b = Instance::new(Arc::clone(&ty));
    b.set("items", Vec::from([1i32, 2, 3])).unwrap();
    let bytes = b.to_bytes().unwrap();
    assert_eq!(bytes.len(), 4 + 3 * 4);

    let decoded = Instance::from_bytes(ty, &bytes).unwrap();
    assert_eq!(decoded, b);
}
