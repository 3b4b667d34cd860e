//! 清洗器性质测试：幂等、严格 JSON 往返、环检测

use bloom::core::strict_json;
use bloom::report::{sanitize, sanitize_json, DynValue, CIRCULAR_SENTINEL};
use proptest::prelude::*;
use serde_json::{json, Value};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        prop::num::f64::NORMAL.prop_map(|f| json!(f)),
        "[a-zA-Z0-9 _\\-]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn arb_dyn() -> impl Strategy<Value = DynValue> {
    let leaf = prop_oneof![
        Just(DynValue::Undefined),
        Just(DynValue::Null),
        any::<bool>().prop_map(DynValue::Bool),
        any::<i64>().prop_map(DynValue::Integer),
        any::<f64>().prop_map(DynValue::Number),
        Just(DynValue::Number(f64::NAN)),
        Just(DynValue::Number(f64::INFINITY)),
        "[a-z]{1,8}".prop_map(DynValue::Function),
        "[a-z ]{0,8}".prop_map(DynValue::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(DynValue::array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..6).prop_map(DynValue::object),
        ]
    })
}

proptest! {
    #[test]
    fn sanitize_is_idempotent(v in arb_json()) {
        let once = sanitize_json(&v);
        prop_assert_eq!(sanitize_json(&once), once);
    }

    #[test]
    fn plain_json_passes_through_unchanged(v in arb_json()) {
        prop_assert_eq!(sanitize_json(&v), v);
    }

    #[test]
    fn sanitized_output_round_trips(v in arb_dyn()) {
        let out = sanitize(&v);
        let text = serde_json::to_string(&out).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(&back, &out);
        prop_assert!(strict_json(&out).is_ok());
        prop_assert_eq!(sanitize_json(&out), out);
    }

    #[test]
    fn self_reference_is_replaced_and_siblings_kept(
        key in "[a-z]{1,6}",
        siblings in prop::collection::btree_map("[A-Z]{1,6}", any::<i64>(), 0..5),
    ) {
        let obj = DynValue::object(
            siblings.iter().map(|(k, v)| (k.clone(), DynValue::Integer(*v))),
        );
        obj.insert(key.clone(), obj.clone());
        let out = sanitize(&obj);
        prop_assert_eq!(&out[key.as_str()], &json!(CIRCULAR_SENTINEL));
        for (k, v) in &siblings {
            prop_assert_eq!(&out[k.as_str()], &json!(*v));
        }
    }
}
