use anyhow::Result;
use padlang_eval::error::error_kind;
use padlang_eval::{ErrorKind, Type, Value};

#[test]
fn test_value_type_of() {
    assert_eq!(Value::Bool(true).type_of(), Type::Bool);
    assert_eq!(Value::Int(3).type_of(), Type::Int);
    assert_eq!(Value::string("a").type_of(), Type::String);
    assert_eq!(Value::string_array(["a", "b"]).type_of(), Type::array_of(Type::String));
    assert_eq!(Value::Array(vec![]).type_of(), Type::array_of(Type::Unknown));
}

#[test]
fn test_value_accessors() -> Result<()> {
    assert!(Value::Bool(true).as_bool()?);
    assert_eq!(Value::Int(42).as_int()?, 42);
    assert_eq!(Value::string("hello").as_str()?, "hello");
    assert_eq!(
        Value::string_array(["jane", "john"]).as_string_vec()?,
        vec!["jane".to_string(), "john".to_string()]
    );
    Ok(())
}

#[test]
fn test_value_accessor_mismatch() {
    let err = Value::Int(1).as_str().unwrap_err();
    assert_eq!(error_kind(&err), ErrorKind::Runtime);
    assert_eq!(err.to_string(), "expected String value, found Int");

    let err = Value::Array(vec![Value::Int(1)]).as_string_vec().unwrap_err();
    assert_eq!(err.to_string(), "expected String value, found Int");
}

#[test]
fn test_value_display() {
    assert_eq!(Value::Bool(false).to_string(), "false");
    assert_eq!(Value::string("a\"b").to_string(), r#""a\"b""#);
    assert_eq!(
        Value::Array(vec![Value::Int(1), Value::string("x")]).to_string(),
        r#"[1, "x"]"#
    );
}

#[test]
fn test_type_unify() {
    let unknown_array = Type::array_of(Type::Unknown);
    let string_array = Type::array_of(Type::String);

    assert_eq!(unknown_array.unify(&string_array), Some(string_array.clone()));
    assert_eq!(Type::Int.unify(&Type::Int), Some(Type::Int));
    assert_eq!(Type::Int.unify(&Type::String), None);
    assert_eq!(string_array.unify(&Type::array_of(Type::Int)), None);
    assert_eq!(Type::array_of(Type::array_of(Type::Int)).to_string(), "Array<Array<Int>>");
}

#[test]
fn test_value_equality_is_structural() {
    assert_eq!(Value::string_array(["a"]), Value::Array(vec![Value::string("a")]));
    assert_ne!(Value::string_array(["a", "b"]), Value::string_array(["b", "a"]));
    assert_eq!(Value::from(3i64), Value::Int(3));
    assert_eq!(Value::from("x"), Value::string("x"));
}
