//! Validation Case Tests
//!
//! End-to-end cases over JSON schemas:
//! - accepted documents and their coerced output
//! - rejected documents and their error trees
//! - list error trees

use okschema::schema::{
    EngineConfig, Enumeration, ErrorCode, Options, Schema, SchemaLoader, SchemaNode, TypeTag,
    ValidationCode, ValidatorError,
};
use okschema::helpers::AppValidationCode;
use okschema::{validate, Value};
use serde_json::{json, Value as Json};

// =============================================================================
// Helper Functions
// =============================================================================

fn loader() -> SchemaLoader {
    let mut loader = SchemaLoader::new();
    let registry = loader.registry_mut();

    registry.register_fn("double", |v| match v {
        Value::Int(i) => Ok(Value::Int(i * 2)),
        _ => Err(ValidatorError::fatal(ValidationCode::BadType)),
    });
    registry.register_fn("increment", |v| match v {
        Value::Int(i) => Ok(Value::Int(i + 1)),
        _ => Err(ValidatorError::fatal(ValidationCode::BadType)),
    });
    registry.register_fn("sum_lteq_12", |v| {
        let mut map = v.as_map().cloned().unwrap_or_default();
        let a = map.get("a").and_then(Value::as_int).unwrap_or(0);
        let b = map.get("b").and_then(Value::as_int).unwrap_or(0);
        if a + b > 12 {
            return Err(ValidatorError::fatal(ValidationCode::OutOfBounds));
        }
        map.insert("sum".to_string(), Value::Int(a + b));
        Ok(Value::Map(map))
    });
    registry.register_fn("sum_only", |v| {
        let a = v.get("a").and_then(Value::as_int).unwrap_or(0);
        let b = v.get("b").and_then(Value::as_int).unwrap_or(0);
        Ok(Value::Int(a + b))
    });
    registry.register_fn("bad_value", |_| {
        Err(ValidatorError::fatal(AppValidationCode::BadValue))
    });
    registry.register_fn("soft_1", |_| {
        Err(ValidatorError::recoverable_with(AppValidationCode::BadValue, 1))
    });
    registry.register_fn("soft_5", |_| {
        Err(ValidatorError::recoverable_with(AppValidationCode::BadValue, 5))
    });

    loader
}

fn compile(schema: Json) -> Schema {
    loader().compile(&schema).unwrap()
}

fn check_ok(schema: Json, data: Json, expected: Json) {
    let compiled = compile(schema.clone());
    match validate(&compiled, &Value::from(&data), EngineConfig::default()) {
        Ok(out) => assert_eq!(out.to_json(), expected, "schema {}", schema),
        Err(e) => panic!("schema {} rejected {}: {}", schema, data, e),
    }
}

fn check_same(schema: Json, data: Json) {
    check_ok(schema, data.clone(), data);
}

fn check_bad(schema: Json, data: Json, expected: Json) {
    let compiled = compile(schema.clone());
    match validate(&compiled, &Value::from(&data), EngineConfig::default()) {
        Ok(out) => panic!("schema {} accepted {} as {}", schema, data, out),
        Err(e) => assert_eq!(e.errors().to_json(), expected, "schema {}", schema),
    }
}

// =============================================================================
// Accepted Documents
// =============================================================================

#[test]
fn test_scalars() {
    check_same(json!("int"), json!(12));
    check_same(json!("string"), json!("aaa"));
    check_same(json!("float"), json!(121.12));
    check_same(json!("bool"), json!(false));
    check_same(json!({"@t": "int"}), json!(12));
    check_same(json!({"@t": "bool"}), json!(true));
    check_ok(json!("decimal"), json!("121.1222222"), json!("121.1222222"));
}

#[test]
fn test_float_from_string_needs_casting() {
    let schema = compile(json!("float"));
    let lenient = validate(&schema, &Value::from("121.12"), EngineConfig::lenient()).unwrap();
    assert_eq!(lenient, Value::Float(121.12));

    let err = validate(&schema, &Value::from("121.12"), EngineConfig::default()).unwrap_err();
    assert_eq!(err.errors().to_json(), json!({"code": 1}));
}

#[test]
fn test_validator_chains_transform_values() {
    check_ok(
        json!({
            "a": {"@t": "int", "@val": ["double", "increment"]},
            "b": {"ba": {"@t": "int", "@lteq": 15, "@val": "increment"}},
            "c": "int"
        }),
        json!({"a": 12, "b": {"ba": 15}, "c": 0}),
        json!({"a": 25, "b": {"ba": 16}, "c": 0}),
    );
}

#[test]
fn test_string_and_decimal_fields() {
    check_ok(
        json!({"a": "string", "b": "decimal"}),
        json!({"a": "123123", "b": "12.12"}),
        json!({"a": "123123", "b": "12.12"}),
    );
    check_same(json!({"a": {"@t": "string", "@lteq": 7}}), json!({"a": "123123"}));
}

#[test]
fn test_wide_numbers_keep_their_value() {
    check_same(json!("int"), json!(18446744073709551615u64));
    check_same(
        json!({"@t": "int", "@gt": 9223372036854775807i64}),
        json!(9223372036854775808u64),
    );

    let fraction = "0.12345678901234567890123456789012345";
    check_same(json!("decimal"), json!(fraction));
    check_same(json!("decimal"), json!("79228162514264337593543950336"));

    let schema = compile(json!({"d": {"@t": "decimal", "@gt": 0}}));
    let out = validate(&schema, &Value::from(json!({"d": "1e-40"})), EngineConfig::default())
        .unwrap();
    assert!(matches!(out.get("d"), Some(Value::Decimal(d)) if d.is_finite()));
}

#[test]
fn test_whole_object_validators() {
    check_ok(
        json!({"a": "int", "b": "int", "@val": "sum_only"}),
        json!({"a": 10, "b": 2}),
        json!(12),
    );
    check_ok(
        json!({"a": "int", "b": "int", "@val": "sum_lteq_12"}),
        json!({"a": 10, "b": 2}),
        json!({"a": 10, "b": 2, "sum": 12}),
    );
}

#[test]
fn test_lists() {
    check_same(json!(["int"]), json!([1, 2, 3]));
    check_same(json!([{"@t": "int", "@lt": 4}]), json!([1, 2, 3]));
    check_same(
        json!({"m": [{
            "a": {"@t": "int", "@lt": 4},
            "b": {"@t": "int", "@lt": 5},
            "c": "str"
        }]}),
        json!({"m": [{"a": 1, "b": 2, "c": "x"}, {"a": 1, "b": 2, "c": "y"}]}),
    );
    check_same(json!([["int"]]), json!([[1, 1, 2]]));
}

#[test]
fn test_empty_lists() {
    check_same(json!({"a": ["int"]}), json!({"a": []}));
    check_same(json!(["int"]), json!([]));
}

#[test]
fn test_optional_lists() {
    check_same(json!({"a": ["int", {"@optional": true}]}), json!({}));
    check_same(json!({"a": [{"@t": "int"}, {"@optional": true}]}), json!({}));
    check_same(json!({"a": [{"@t": "int"}, {"@optional": true}]}), json!({"a": []}));
    check_same(json!({"a": [{"@t": "int"}, {"@optional": true}]}), json!({"a": [1, 3]}));
}

#[test]
fn test_blank_strings() {
    check_same(json!({"a": {"@t": "str", "@blank": true}}), json!({"a": ""}));
}

#[test]
fn test_dates() {
    check_ok(
        json!({"a": {"@t": "str", "@val": "date"}}),
        json!({"a": "2018-03-12"}),
        json!({"a": "2018-03-12"}),
    );
    check_ok(
        json!({"a": {"@t": "str", "@val": "datetime"}}),
        json!({"a": "2018-03-28T10:29:32.358Z"}),
        json!({"a": "2018-03-28T10:29:32.358000"}),
    );

    let schema = compile(json!({"a": {"@t": "str", "@val": "date"}}));
    let out = validate(
        &schema,
        &Value::from(&json!({"a": "2018-03-12"})),
        EngineConfig::default(),
    )
    .unwrap();
    assert!(matches!(out.get("a"), Some(Value::Date(_))));
}

#[test]
fn test_extra_fields_are_ignored() {
    check_ok(
        json!({"a": "int", "b": {"x": "int"}}),
        json!({"a": 10, "b": {"x": 5, "y": "21212"}, "extra_c": [], "extra_d": "ooops"}),
        json!({"a": 10, "b": {"x": 5}}),
    );
    check_ok(
        json!({"a": "int", "b": "int"}),
        json!({"a": 10, "b": 20, "c": 30}),
        json!({"a": 10, "b": 20}),
    );
}

#[test]
fn test_optional_and_default() {
    check_ok(
        json!({"a": "int", "b": {"@t": "int", "@optional": true}}),
        json!({"a": 10}),
        json!({"a": 10}),
    );
    check_ok(
        json!({"a": "int", "b": {"@t": "int", "@optional": true, "@default": 5}}),
        json!({"a": 10}),
        json!({"a": 10, "b": 5}),
    );
}

#[test]
fn test_membership() {
    check_same(json!({"a": {"@t": "int", "@in": [1, 2, 3]}}), json!({"a": 1}));
}

#[test]
fn test_membership_from_enumeration() {
    struct Grade;

    impl Enumeration for Grade {
        fn values() -> Vec<Value> {
            vec![Value::Int(1), Value::Int(2)]
        }
    }

    let schema = Schema::new(SchemaNode::object().field(
        "a",
        SchemaNode::scalar_with(TypeTag::Int, Options::new().one_of_enum::<Grade>()),
    ))
    .unwrap();

    let ok = validate(&schema, &Value::from(&json!({"a": 1})), EngineConfig::default());
    assert_eq!(ok.unwrap().to_json(), json!({"a": 1}));

    let err = validate(&schema, &Value::from(&json!({"a": 3})), EngineConfig::default());
    assert_eq!(err.unwrap_err().errors().to_json(), json!({"a": {"code": 2}}));
}

#[test]
fn test_regexp_with_helper_format() {
    let schema = json!({"id": {"@t": "string", "@regexp": okschema::helpers::FMT_UUID}});
    check_same(schema.clone(), json!({"id": "67e55044-10b1-426f-9247-bb680e5fe0c8"}));
    check_bad(schema, json!({"id": "nope"}), json!({"id": {"code": 6}}));
}

// =============================================================================
// Rejected Documents
// =============================================================================

#[test]
fn test_failing_validator() {
    check_bad(
        json!({"@t": "string", "@val": "bad_value"}),
        json!("abc"),
        json!({"code": 50}),
    );
    check_bad(
        json!({"a": {"@t": "string", "@val": "bad_value"}}),
        json!({"a": "abc"}),
        json!({"a": {"code": 50}}),
    );
}

#[test]
fn test_missing_fields_and_constraint_errors() {
    check_bad(
        json!({
            "a": {"@t": "string", "@val": "bad_value"},
            "b": {"@t": "string"},
            "sub1": {"c": {"@t": "int", "@lt": 10, "@gt": 5}},
            "sub2": {"c": "int"}
        }),
        json!({"a": "abc", "sub1": {"c": 3}}),
        json!({
            "a": {"code": 50},
            "b": {"code": 4},
            "sub1": {"c": {"code": 9, "details": 5}},
            "sub2": {"code": 4}
        }),
    );
}

#[test]
fn test_missing_document() {
    let schema = compile(json!("int"));
    let err = okschema::schema::Engine::default()
        .validate_supplied(&schema, None)
        .unwrap_err();
    assert_eq!(err.errors().to_json(), json!({"code": 4}));
}

#[test]
fn test_whole_object_validator_failure_is_a_leaf() {
    check_bad(
        json!({"a": "int", "b": "int", "@val": "sum_lteq_12"}),
        json!({"a": 10, "b": 3}),
        json!({"code": 5}),
    );
}

#[test]
fn test_recoverable_validators_collect_many_errors() {
    check_bad(
        json!({"a": {"b": {"@t": "int", "@val": ["soft_1", "soft_5"]}}}),
        json!({"a": {"b": 12}}),
        json!({"a": {"b": {"code": 8, "details": [
            {"code": 50, "details": 1},
            {"code": 50, "details": 5}
        ]}}}),
    );
    check_bad(
        json!({"b": {"@t": "int", "@val": ["soft_1", "soft_5", "bad_value"]}}),
        json!({"b": 12}),
        json!({"b": {"code": 8, "details": [
            {"code": 50, "details": 1},
            {"code": 50, "details": 5},
            {"code": 50}
        ]}}),
    );
}

#[test]
fn test_single_soft_failure_in_sequence_is_not_wrapped() {
    check_bad(
        json!({"b": {"@t": "int", "@val": ["soft_5", "increment"]}}),
        json!({"b": 12}),
        json!({"b": {"code": 50, "details": 5}}),
    );
}

#[test]
fn test_blank_string_rejected() {
    check_bad(
        json!({"a": {"@t": "str"}}),
        json!({"a": ""}),
        json!({"a": {"code": 9, "details": 0}}),
    );
}

#[test]
fn test_null_and_missing() {
    check_bad(
        json!({"b": {"@t": "int", "@null": false}}),
        json!({"b": null}),
        json!({"b": {"code": 3}}),
    );
    check_bad(json!({"b": "int"}), json!({}), json!({"b": {"code": 4}}));
}

#[test]
fn test_totally_bad_types() {
    check_bad(json!({"b": "int"}), json!([]), json!({"code": 1}));
    check_bad(json!(["int"]), json!({"a": 12}), json!({"code": 1}));
    check_bad(json!("int"), json!("123"), json!({"code": 1}));
}

#[test]
fn test_garbage_input() {
    check_bad(
        json!({"a": {"b": "int"}}),
        json!({"dadas": {}, "12": "2222", "null": "121"}),
        json!({"a": {"code": 4}}),
    );
}

#[test]
fn test_infinite_decimal() {
    check_bad(
        json!({"d": "decimal"}),
        json!({"d": "Infinity"}),
        json!({"d": {"code": 1, "details": "infinite decimal"}}),
    );

    let schema = compile(json!({"d": "decimal"}));
    let config = EngineConfig::new(false, true, false);
    let out = validate(&schema, &Value::from(&json!({"d": "-inf"})), config).unwrap();
    assert_eq!(out.to_json(), json!({"d": "-Infinity"}));
}

#[test]
fn test_application_codes_are_open() {
    let schema = Schema::new(SchemaNode::scalar_with(
        TypeTag::Int,
        Options::new().val(okschema::schema::Validator::new("custom", |_| {
            Err(ValidatorError::fatal(ErrorCode::new(777)))
        })),
    ))
    .unwrap();

    let err = validate(&schema, &Value::Int(1), EngineConfig::default()).unwrap_err();
    assert_eq!(err.errors().to_json(), json!({"code": 777}));
}

// =============================================================================
// List Error Trees
// =============================================================================

#[test]
fn test_bad_list_items() {
    check_bad(
        json!(["int"]),
        json!([1, 2, "x"]),
        json!([null, null, {"code": 1}]),
    );
    check_bad(
        json!([{"@t": "int", "@lt": 4}]),
        json!([1, 7, 6]),
        json!([null, {"code": 11, "details": 4}, {"code": 11, "details": 4}]),
    );
}

#[test]
fn test_bad_objects_in_list() {
    check_bad(
        json!({"m": [{
            "a": {"@t": "int", "@lt": 4},
            "b": {"@t": "int", "@lt": 5},
            "c": "str"
        }]}),
        json!({"m": [{"a": 1, "b": 7, "c": 12}, {"a": -1, "b": 10, "c": "y"}]}),
        json!({"m": [
            {"b": {"code": 11, "details": 5}, "c": {"code": 1}},
            {"b": {"code": 11, "details": 5}}
        ]}),
    );
}

#[test]
fn test_list_failing_as_a_whole() {
    check_bad(
        json!({"li": [{"@t": "str"}]}),
        json!({"li": 12}),
        json!({"li": {"code": 1}}),
    );
    check_bad(
        json!({"li": [{"@t": "str"}]}),
        json!({}),
        json!({"li": {"code": 4}}),
    );
    check_bad(json!({"a": ["int"]}), json!({}), json!({"a": {"code": 4}}));
}
