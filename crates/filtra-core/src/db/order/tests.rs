use crate::{
    config::FilterConfig,
    db::{
        order::{Comparator, NullsOrder, OrderDirection, OrderField, OrderSpec, Ranked, parse_order_by},
        predicate::ValidateError,
        source::Document,
    },
    test_fixtures::{USER, user},
    types::Float64,
    value::Value,
};
use proptest::prelude::*;
use serde_json::json;
use std::cmp::Ordering;

fn comparator(spec: &OrderSpec) -> Comparator {
    Comparator::compile(&USER, spec, &FilterConfig::default()).unwrap()
}

fn names(docs: &[Document]) -> Vec<&str> {
    docs.iter()
        .filter_map(|doc| doc.get("name").and_then(Value::as_text))
        .collect()
}

fn scored(n: u128, name: &str, score: Option<f64>) -> Document {
    let doc = user(n, name, 30, "UK");
    match score.and_then(Float64::try_new) {
        Some(score) => doc.with("score", score),
        None => doc,
    }
}

#[test]
fn later_keys_break_ties() {
    let records = vec![
        user(1, "Ada", 30, "UK"),
        user(2, "Bob", 20, "US"),
        user(3, "Cy", 30, "FI"),
    ];
    let spec = OrderSpec::new().desc("age").asc("country");

    let sorted = comparator(&spec).sort(records);
    assert_eq!(names(&sorted), vec!["Cy", "Ada", "Bob"]);
}

#[test]
fn full_ties_keep_input_order() {
    let records = vec![
        user(3, "Cy", 30, "UK"),
        user(1, "Ada", 30, "UK"),
        user(2, "Bob", 30, "UK"),
    ];

    let sorted = comparator(&OrderSpec::new().asc("age")).sort(records);
    assert_eq!(names(&sorted), vec!["Cy", "Ada", "Bob"]);
}

#[test]
fn position_decides_between_equal_records() {
    let cmp = comparator(&OrderSpec::new().asc("age"));
    let left = Ranked {
        position: 0,
        record: user(1, "Ada", 30, "UK"),
    };
    let right = Ranked {
        position: 1,
        record: user(2, "Bob", 30, "UK"),
    };

    assert_eq!(cmp.compare_records(&left.record, &right.record), Ordering::Equal);
    assert_eq!(cmp.compare(&left, &right), Ordering::Less);
    assert_eq!(cmp.compare(&right, &left), Ordering::Greater);
}

#[test]
fn empty_spec_is_identity() {
    let records = vec![user(2, "Bob", 1, "US"), user(1, "Ada", 2, "UK")];

    let sorted = comparator(&OrderSpec::new()).sort(records);
    assert_eq!(names(&sorted), vec!["Bob", "Ada"]);
}

#[test]
fn nulls_are_smallest_by_default() {
    let records = vec![
        scored(1, "Ada", Some(2.0)),
        scored(2, "Bob", None),
        scored(3, "Cy", Some(1.0)),
    ];

    let asc = comparator(&OrderSpec::new().asc("score")).sort(records.clone());
    assert_eq!(names(&asc), vec!["Bob", "Cy", "Ada"]);

    let desc = comparator(&OrderSpec::new().desc("score")).sort(records);
    assert_eq!(names(&desc), vec!["Ada", "Cy", "Bob"]);
}

#[test]
fn explicit_nulls_placement_is_absolute() {
    let records = vec![
        scored(1, "Ada", Some(2.0)),
        scored(2, "Bob", None),
        scored(3, "Cy", Some(1.0)),
    ];
    let spec = OrderSpec::new().then(OrderField::desc("score").nulls(NullsOrder::First));

    let sorted = comparator(&spec).sort(records);
    assert_eq!(names(&sorted), vec!["Bob", "Ada", "Cy"]);
}

#[test]
fn configured_nulls_apply_to_ascending() {
    let config = FilterConfig {
        nulls: NullsOrder::Last,
        ..FilterConfig::default()
    };
    let records = vec![scored(1, "Ada", None), scored(2, "Bob", Some(1.0))];

    let cmp = Comparator::compile(&USER, &OrderSpec::new().asc("score"), &config).unwrap();
    assert_eq!(names(&cmp.sort(records)), vec!["Bob", "Ada"]);
}

#[test]
fn invalid_keys_are_rejected() {
    let config = FilterConfig::default();

    let list = Comparator::compile(&USER, &OrderSpec::new().asc("tags"), &config).unwrap_err();
    assert_eq!(
        list,
        ValidateError::NotOrderable {
            field: "tags".to_string()
        }
    );

    let unknown = Comparator::compile(&USER, &OrderSpec::new().asc("nope"), &config).unwrap_err();
    assert!(matches!(unknown, ValidateError::UnknownField { .. }));
}

#[test]
fn order_documents() {
    let single = parse_order_by(&json!({ "age": "desc" })).unwrap();
    assert_eq!(single, OrderSpec::new().desc("age"));

    let many = parse_order_by(&json!([
        { "age": "asc" },
        { "score": { "sort": "desc", "nulls": "last" } },
    ]))
    .unwrap();
    assert_eq!(
        many,
        OrderSpec::new()
            .asc("age")
            .then(OrderField::desc("score").nulls(NullsOrder::Last))
    );
    assert_eq!(many.fields[1].direction, OrderDirection::Desc);
}

#[test]
fn malformed_order_documents() {
    for doc in [
        json!("age"),
        json!({ "age": "sideways" }),
        json!({ "age": "asc", "name": "desc" }),
        json!({}),
        json!({ "score": { "nulls": "middle" } }),
        json!([1]),
    ] {
        assert!(
            matches!(parse_order_by(&doc), Err(ValidateError::Malformed { .. })),
            "{doc} should be malformed"
        );
    }

    assert!(matches!(
        parse_order_by(&json!({ "age": { "direction": "asc" } })),
        Err(ValidateError::UnknownOperator { .. })
    ));
}

///
/// Properties
///

fn arb_record() -> impl Strategy<Value = Document> {
    (
        1_u128..1000,
        0_i64..5,
        prop::sample::select(vec!["UK", "US"]),
        prop::option::of(0.0_f64..3.0),
    )
        .prop_map(|(n, age, country, score)| {
            let doc = user(n, "x", age, country);
            match score.and_then(Float64::try_new) {
                Some(score) => doc.with("score", score),
                None => doc,
            }
        })
}

fn arb_spec() -> impl Strategy<Value = OrderSpec> {
    let field = prop::sample::select(vec!["age", "country", "score", "createdAt"]);
    let direction = prop_oneof![Just(OrderDirection::Asc), Just(OrderDirection::Desc)];
    let nulls = prop::option::of(prop_oneof![Just(NullsOrder::First), Just(NullsOrder::Last)]);

    prop::collection::vec((field, direction, nulls), 0..3).prop_map(|keys| {
        keys.into_iter()
            .map(|(field, direction, nulls)| OrderField {
                field: field.to_string(),
                direction,
                nulls,
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn ranked_comparison_is_a_total_order(
        spec in arb_spec(),
        records in prop::collection::vec(arb_record(), 3),
    ) {
        let cmp = comparator(&spec);
        let ranked = records
            .into_iter()
            .enumerate()
            .map(|(position, record)| Ranked { position, record })
            .collect::<Vec<_>>();
        let (a, b, c) = (&ranked[0], &ranked[1], &ranked[2]);

        prop_assert_eq!(cmp.compare(a, b), cmp.compare(b, a).reverse());
        prop_assert_eq!(cmp.compare(a, a), Ordering::Equal);
        if cmp.compare(a, b) != Ordering::Greater && cmp.compare(b, c) != Ordering::Greater {
            prop_assert_ne!(cmp.compare(a, c), Ordering::Greater);
        }
    }

    #[test]
    fn sorting_is_idempotent(
        spec in arb_spec(),
        records in prop::collection::vec(arb_record(), 0..12),
    ) {
        let cmp = comparator(&spec);
        let once = cmp.sort(records);
        let twice = cmp.sort(once.clone());

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn sorted_output_respects_the_comparator(
        spec in arb_spec(),
        records in prop::collection::vec(arb_record(), 0..12),
    ) {
        let cmp = comparator(&spec);
        let sorted = cmp.sort(records);

        for pair in sorted.windows(2) {
            prop_assert_ne!(cmp.compare_records(&pair[0], &pair[1]), Ordering::Greater);
        }
    }
}
