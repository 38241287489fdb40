use crate::{
    db::{
        predicate::ValidateError,
        projection::{CompiledProjection, ProjectedRelation, Projection, parse_projection},
    },
    obs::MetricsEvent,
    test_fixtures::{USER, capture_events, fixture_registry, fixture_source, user},
    traits::NoRelations,
    value::Value,
};
use serde_json::json;

fn compiled(projection: &Projection) -> CompiledProjection {
    CompiledProjection::compile(&fixture_registry(), &USER, projection).unwrap()
}

#[test]
fn select_keeps_only_named_fields() {
    let projection = compiled(&Projection::select(["name", "age"]));
    let row = projection.project(&user(1, "Ada", 36, "UK"), &NoRelations);

    assert_eq!(projection.field_names(), vec!["name", "age"]);
    assert_eq!(row.get("name"), Some(&Value::from("Ada")));
    assert_eq!(row.get("age"), Some(&Value::Int(36)));
    assert!(row.get("country").is_none());
    assert!(row.relations.is_empty());
}

#[test]
fn omit_drops_named_fields() {
    let projection = compiled(&Projection::omit(["email", "tags"]));
    let names = projection.field_names();

    assert!(!names.contains(&"email"));
    assert!(!names.contains(&"tags"));
    assert!(names.contains(&"name"));
}

#[test]
fn unset_fields_project_as_null() {
    let row = compiled(&Projection::all()).project(&user(1, "Ada", 36, "UK"), &NoRelations);

    assert_eq!(row.get("nickname"), Some(&Value::Null));
    assert_eq!(row.fields.len(), USER.fields.len());
}

#[test]
fn included_relations_are_materialized() {
    let source = fixture_source();
    let projection = compiled(
        &Projection::select(["name"])
            .include("posts", Projection::select(["title"]))
            .include("profile", Projection::all()),
    );
    let ada = &source.collection("User").unwrap()[0];
    let grace = &source.collection("User").unwrap()[1];

    let row = projection.project(ada, &source);
    let Some(ProjectedRelation::Many(posts)) = row.relation("posts") else {
        panic!("posts should be a list");
    };
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].get("title"), Some(&Value::from("Concatenate strings")));
    assert_eq!(row.relation("profile").map(ProjectedRelation::len), Some(1));

    let row = projection.project(grace, &source);
    assert_eq!(row.relation("profile"), Some(&ProjectedRelation::One(None)));
    assert!(row.relation("posts").is_some_and(ProjectedRelation::is_empty));
}

#[test]
fn unresolvable_relations_project_empty() {
    let projection = compiled(&Projection::all().include("posts", Projection::all()));

    let (row, events) = capture_events(|| projection.project(&user(1, "Ada", 36, "UK"), &NoRelations));

    assert!(row.relation("posts").is_some_and(ProjectedRelation::is_empty));
    assert_eq!(
        events,
        vec![MetricsEvent::RelationUnresolved {
            entity: "User",
            relation: "posts"
        }]
    );
}

#[test]
fn projected_records_serialize_flat() {
    let source = fixture_source();
    let projection = compiled(
        &Projection::select(["name"]).include("profile", Projection::select(["bio"])),
    );
    let row = projection.project(&source.collection("User").unwrap()[0], &source);

    assert_eq!(
        serde_json::to_value(&row).unwrap(),
        json!({ "name": "Ada", "profile": { "bio": "mathematician" } })
    );
}

#[test]
fn invalid_projections_are_rejected() {
    let registry = fixture_registry();

    let empty = CompiledProjection::compile(&registry, &USER, &Projection::select(Vec::<String>::new()));
    assert!(matches!(empty, Err(ValidateError::InvalidProjection { .. })));

    let unknown = CompiledProjection::compile(&registry, &USER, &Projection::select(["shoe"]));
    assert!(matches!(unknown, Err(ValidateError::UnknownField { .. })));

    let relation = CompiledProjection::compile(
        &registry,
        &USER,
        &Projection::all().include("friends", Projection::all()),
    );
    assert!(matches!(relation, Err(ValidateError::UnknownRelation { .. })));
}

#[test]
fn projection_documents() {
    let registry = fixture_registry();
    let select = json!({
        "name": true,
        "age": false,
        "posts": { "select": { "title": true } },
    });

    let projection = parse_projection(&registry, &USER, Some(&select), None, None).unwrap();
    assert_eq!(
        projection,
        Projection::select(["name"]).include("posts", Projection::select(["title"]))
    );

    let include = json!({ "profile": true, "posts": false });
    let omit = json!({ "email": true });
    let projection = parse_projection(&registry, &USER, None, Some(&include), Some(&omit)).unwrap();
    assert_eq!(
        projection,
        Projection::omit(["email"]).include("profile", Projection::all())
    );
}

#[test]
fn conflicting_projection_documents() {
    let registry = fixture_registry();
    let select = json!({ "name": true });
    let other = json!({ "email": true });

    for (include, omit) in [(None, Some(&other)), (Some(&other), None)] {
        let err = parse_projection(&registry, &USER, Some(&select), include, omit).unwrap_err();
        assert!(matches!(err, ValidateError::InvalidProjection { .. }));
    }

    let bad_nested = json!({ "posts": { "where": {} } });
    assert!(matches!(
        parse_projection(&registry, &USER, Some(&bad_nested), None, None),
        Err(ValidateError::Malformed { .. })
    ));

    let scalar_include = json!({ "name": true });
    assert!(matches!(
        parse_projection(&registry, &USER, None, Some(&scalar_include), None),
        Err(ValidateError::UnknownRelation { .. })
    ));
}
