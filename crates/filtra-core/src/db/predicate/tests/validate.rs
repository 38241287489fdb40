use super::compile_for;
use crate::{
    config::FilterConfig,
    db::{
        filter::{Filter, parse_where},
        predicate::{ValidateError, compile},
    },
    obs::MetricsEvent,
    test_fixtures::{COMMENT, POST, USER, capture_events, fixture_registry, user},
    value::Value,
};
use serde_json::json;

fn reject(entity: &'static crate::model::EntityModel, filter: Filter) -> ValidateError {
    compile_for(entity, &filter).unwrap_err()
}

#[test]
fn unknown_field_is_rejected() {
    let err = reject(&USER, Filter::field("shoeSize").equals(42).into());

    assert_eq!(
        err,
        ValidateError::UnknownField {
            entity: "User".to_string(),
            field: "shoeSize".to_string(),
        }
    );
}

#[test]
fn unknown_relation_is_rejected() {
    let err = reject(&USER, Filter::some("friends", Filter::default()));

    assert!(matches!(err, ValidateError::UnknownRelation { .. }));
}

#[test]
fn nested_filter_is_validated_against_the_target() {
    // `age` exists on User, not on Post
    let err = reject(
        &USER,
        Filter::some("posts", Filter::field("age").gt(3).into()),
    );

    assert_eq!(
        err,
        ValidateError::UnknownField {
            entity: "Post".to_string(),
            field: "age".to_string(),
        }
    );
}

#[test]
fn literal_type_mismatch_is_rejected() {
    for filter in [
        Filter::field("age").equals("thirty"),
        Filter::field("age").gt(true),
        Filter::field("createdAt").lt("yesterday"),
        Filter::field("id").equals("not-an-id"),
        Filter::field("role").equals("OWNER"),
        Filter::field("tags").has(3),
    ] {
        let err = reject(&USER, filter.into());
        assert!(
            matches!(err, ValidateError::InvalidLiteral { .. }),
            "unexpected {err:?}"
        );
    }
}

#[test]
fn operator_type_mismatch_is_rejected() {
    let cases: Vec<Filter> = vec![
        Filter::field("age").contains("3").into(),
        Filter::field("role").lt("ADMIN").into(),
        Filter::field("tags").in_(["a"]).into(),
        Filter::field("tags").gt("a").into(),
        Filter::field("name").has("a").into(),
        Filter::field("name").is_empty(true).into(),
        Filter::field("age").is_set(true).into(),
        Filter::field("age").equals(3).insensitive().into(),
    ];

    for filter in cases {
        let err = reject(&USER, filter);
        assert!(
            matches!(err, ValidateError::InvalidOperator { .. }),
            "unexpected {err:?}"
        );
    }
}

#[test]
fn null_on_required_field_is_rejected() {
    let err = reject(&USER, Filter::field("age").is_null().into());

    assert_eq!(
        err,
        ValidateError::NotNullable {
            field: "age".to_string()
        }
    );
}

#[test]
fn null_inside_in_is_rejected() {
    let err = reject(
        &USER,
        Filter::field("score").in_([Value::Null, Value::Int(1)]).into(),
    );

    assert!(matches!(err, ValidateError::InvalidLiteral { .. }));
}

#[test]
fn relation_operator_must_fit_cardinality() {
    let to_one = reject(&COMMENT, Filter::some("post", Filter::default()));
    let to_many = reject(&POST, Filter::is("comments", None));

    assert!(matches!(
        to_one,
        ValidateError::InvalidRelationOperator {
            cardinality: "to-one",
            ..
        }
    ));
    assert!(matches!(
        to_many,
        ValidateError::InvalidRelationOperator {
            cardinality: "to-many",
            ..
        }
    ));
}

#[test]
fn depth_limit_is_enforced() {
    let config = FilterConfig {
        max_depth: 3,
        ..FilterConfig::default()
    };
    let leaf: Filter = Filter::field("age").gt(1).into();
    let deep = !(!(!leaf.clone()));

    let err = compile(&fixture_registry(), &USER, &deep, &config).unwrap_err();
    assert_eq!(err, ValidateError::DepthExceeded { depth: 4, max: 3 });
    assert!(compile(&fixture_registry(), &USER, &!(!leaf), &config).is_ok());
}

#[test]
fn depth_limit_covers_field_level_not() {
    let mut doc = json!({ "equals": "Ada" });
    for _ in 0..40 {
        doc = json!({ "not": doc });
    }
    let filter = parse_where(&fixture_registry(), &USER, &json!({ "name": doc })).unwrap();

    let err = compile(&fixture_registry(), &USER, &filter, &FilterConfig::default()).unwrap_err();
    assert_eq!(err, ValidateError::DepthExceeded { depth: 41, max: 32 });
}

#[test]
fn insensitive_mode_stays_with_its_own_field() {
    let filter = parse_where(
        &fixture_registry(),
        &USER,
        &json!({ "name": { "equals": "Ada" }, "country": { "equals": "uk", "mode": "insensitive" } }),
    )
    .unwrap();
    let predicate = compile_for(&USER, &filter).unwrap();

    assert!(predicate.matches(&user(9, "Ada", 30, "UK")));
    assert!(!predicate.matches(&user(9, "ADA", 30, "UK")));
}

#[test]
fn list_literal_limit_is_enforced() {
    let config = FilterConfig {
        max_list_literal_len: 2,
        ..FilterConfig::default()
    };
    let filter: Filter = Filter::field("age").in_([1, 2, 3]).into();

    let err = compile(&fixture_registry(), &USER, &filter, &config).unwrap_err();
    assert!(matches!(
        err,
        ValidateError::ListLiteralTooLong { len: 3, max: 2, .. }
    ));
}

#[test]
fn rejections_and_compilations_are_reported() {
    let registry = fixture_registry();
    let config = FilterConfig::default();
    let good: Filter = Filter::field("age").gt(1).into();
    let bad: Filter = Filter::field("nope").gt(1).into();

    let (_, events) = capture_events(|| {
        let _ = compile(&registry, &USER, &good, &config);
        let _ = compile(&registry, &USER, &bad, &config);
    });

    assert_eq!(
        events,
        vec![
            MetricsEvent::FilterCompiled { entity: "User" },
            MetricsEvent::FilterRejected { entity: "User" },
        ]
    );
}

#[test]
fn documents_compile_like_builders() {
    let registry = fixture_registry();
    let doc = parse_where(
        &registry,
        &USER,
        &json!({
            "age": { "gte": 18 },
            "country": "UK",
            "name": { "contains": "a", "mode": "insensitive" },
        }),
    )
    .unwrap();

    let predicate = compile_for(&USER, &doc).unwrap();
    assert_eq!(predicate.referenced_fields(), vec!["age", "country", "name"]);
}

#[test]
fn document_literal_errors_surface_at_compile() {
    let registry = fixture_registry();
    let doc = parse_where(&registry, &USER, &json!({ "age": { "lt": "old" } })).unwrap();

    assert!(matches!(
        compile_for(&USER, &doc),
        Err(ValidateError::InvalidLiteral { .. })
    ));
}
