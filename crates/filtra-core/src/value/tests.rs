use crate::{
    types::{Date, Timestamp, Ulid},
    value::{TextMode, TextOp, Value, canonical_cmp, fold_text, strict_order_cmp, text_matches},
};
use std::cmp::Ordering;

// ---- helpers -----------------------------------------------------------

fn v_f(x: f64) -> Value {
    Value::float(x).expect("finite f64")
}
fn v_i(x: i64) -> Value {
    Value::Int(x)
}
fn v_txt(s: &str) -> Value {
    Value::Text(s.to_string())
}

// ---- canonical order ---------------------------------------------------

#[test]
fn canonical_rank_orders_families() {
    let ordered = [
        Value::Null,
        Value::Bool(false),
        v_i(-5),
        v_txt("a"),
        Value::Date(Date::new_checked(2024, 1, 1).unwrap()),
        Value::Timestamp(Timestamp::EPOCH),
        Value::Id(Ulid::from(1_u128)),
        Value::Enum("Active".to_string()),
        Value::List(vec![]),
    ];

    for pair in ordered.windows(2) {
        assert_eq!(
            canonical_cmp(&pair[0], &pair[1]),
            Ordering::Less,
            "{:?} should sort before {:?}",
            pair[0],
            pair[1],
        );
    }
}

#[test]
fn canonical_numeric_mixes_int_and_float() {
    assert_eq!(canonical_cmp(&v_i(1), &v_f(1.5)), Ordering::Less);
    assert_eq!(canonical_cmp(&v_f(2.5), &v_i(2)), Ordering::Greater);
}

#[test]
fn canonical_numeric_tie_is_consistent_with_eq() {
    let int = v_i(3);
    let float = v_f(3.0);

    assert_ne!(int, float);
    assert_eq!(canonical_cmp(&int, &float), Ordering::Less);
    assert_eq!(canonical_cmp(&float, &int), Ordering::Greater);
}

#[test]
fn canonical_list_is_lexicographic_then_length() {
    let short = Value::list([1, 2]);
    let long = Value::list([1, 2, 0]);
    let bigger = Value::list([1, 3]);

    assert_eq!(canonical_cmp(&short, &long), Ordering::Less);
    assert_eq!(canonical_cmp(&long, &bigger), Ordering::Less);
}

// ---- strict order ------------------------------------------------------

#[test]
fn strict_order_rejects_mixed_families() {
    assert_eq!(strict_order_cmp(&v_i(1), &v_txt("1")), None);
    assert_eq!(strict_order_cmp(&Value::Null, &Value::Null), None);
    assert_eq!(strict_order_cmp(&Value::list([1]), &Value::list([1])), None);
}

#[test]
fn strict_order_widens_numeric() {
    assert_eq!(strict_order_cmp(&v_i(2), &v_f(2.0)), Some(Ordering::Equal));
    assert_eq!(strict_order_cmp(&v_f(-0.5), &v_i(0)), Some(Ordering::Less));
}

#[test]
fn strict_order_text_is_bytewise() {
    assert_eq!(
        strict_order_cmp(&v_txt("Zebra"), &v_txt("apple")),
        Some(Ordering::Less)
    );
}

// ---- text --------------------------------------------------------------

#[test]
fn text_modes_are_explicit() {
    assert_eq!(TextMode::from_document("default"), Some(TextMode::Cs));
    assert_eq!(TextMode::from_document("insensitive"), Some(TextMode::Ci));
    assert_eq!(TextMode::from_document("locale"), None);
}

#[test]
fn text_matches_case_insensitive_with_folded_needle() {
    let needle = fold_text("Cat", TextMode::Ci);

    assert!(text_matches("concatenate", TextOp::Contains, &needle, TextMode::Ci));
    assert!(text_matches("CATALOG", TextOp::StartsWith, &needle, TextMode::Ci));
    assert!(!text_matches("concatenate", TextOp::Contains, "Cat", TextMode::Cs));
}

#[test]
fn text_matches_suffix() {
    assert!(text_matches("report.pdf", TextOp::EndsWith, ".pdf", TextMode::Cs));
    assert!(!text_matches("report.PDF", TextOp::EndsWith, ".pdf", TextMode::Cs));
}

// ---- conversions -------------------------------------------------------

#[test]
fn option_none_converts_to_null() {
    let value: Value = Option::<i64>::None.into();
    assert!(value.is_null());
}

#[test]
fn list_contains_uses_exact_equality() {
    let list = Value::list(["a", "b"]);

    assert!(list.list_contains(&v_txt("a")));
    assert!(!list.list_contains(&v_txt("A")));
}

#[test]
fn serializes_to_plain_json() {
    let value = Value::List(vec![
        Value::Null,
        v_i(1),
        v_txt("x"),
        Value::Timestamp(Timestamp::EPOCH),
    ]);
    let json = serde_json::to_string(&value).expect("serialize");

    assert_eq!(json, r#"[null,1,"x","1970-01-01T00:00:00Z"]"#);
}
