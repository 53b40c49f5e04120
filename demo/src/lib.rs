//! Worked example: a `Person` record and an `Employee` that extends it,
//! matching the layouts used throughout the test suite.

use cstruct::{Instance, Type};
use cstruct_derive::BinStruct;

#[derive(BinStruct)]
#[layout(flags = "NO_ALIGNMENT")]
#[field(name = "name", ty = "Type::VarString")]
#[field(name = "age", ty = "Type::I8")]
pub struct Person(Instance);

#[derive(BinStruct)]
#[layout(flags = "NO_ALIGNMENT", base = "Person")]
#[field(name = "salary", ty = "Type::F64")]
pub struct Employee(Instance);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn person_round_trips() {
        let _ = env_logger::try_init();

        let mut p = Person::new();
        p.set_name("John Doe").unwrap();
        p.set_age(42i8).unwrap();

        let bytes = p.to_bytes().unwrap();
        assert_eq!(bytes.len(), 13);

        let back = Person::from_bytes(&bytes).unwrap();
        assert_eq!(back.name().unwrap().as_text(), Some("John Doe"));
        assert_eq!(back.age().unwrap().as_i64(), Some(42));
    }

    #[test]
    fn employee_extends_person() {
        let mut e = Employee::new();
        e.set_name("John Doe").unwrap();
        e.set_age(42i8).unwrap();
        e.set_salary(123.45).unwrap();

        let bytes = e.to_bytes().unwrap();
        let back = Employee::from_bytes(&bytes).unwrap();
        assert_eq!(back.salary().unwrap().as_f64(), Some(123.45));
    }
}
