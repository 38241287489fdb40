use filtra::prelude::*;
use proptest::prelude::*;
use serde_json::json;

static ITEM: EntityModel = EntityModel {
    name: "Item",
    primary_key: "id",
    fields: &[
        FieldModel::new("id", FieldKind::Id),
        FieldModel::new("n", FieldKind::Int),
    ],
    relations: &[],
};

fn client() -> Client {
    let registry = SchemaRegistry::from_models([&ITEM]).unwrap();

    Client::new(registry, FilterConfig::default()).unwrap()
}

fn source(values: &[i64]) -> MemorySource {
    let mut source = MemorySource::new();
    source.extend(
        "Item",
        values.iter().zip(1_u128..).map(|(n, id)| {
            Document::new().with("id", Ulid(id)).with("n", *n)
        }),
    );

    source
}

fn ns(rows: &[ProjectedRecord]) -> Vec<i64> {
    rows.iter()
        .filter_map(|row| match row.get("n") {
            Some(Value::Int(n)) => Some(*n),
            _ => None,
        })
        .collect()
}

proptest! {
    #[test]
    fn count_matches_a_manual_filter(values in prop::collection::vec(-50_i64..50, 0..40), k in -60_i64..60) {
        let client = client();
        let items = client.repository("Item").unwrap();

        let counted = items
            .count_json(&json!({ "where": { "n": { "gte": k } } }))
            .unwrap()
            .execute(&source(&values))
            .unwrap();

        prop_assert_eq!(counted, values.iter().filter(|n| **n >= k).count());
    }

    #[test]
    fn not_document_is_the_complement(values in prop::collection::vec(-50_i64..50, 0..40), k in -60_i64..60) {
        let client = client();
        let items = client.repository("Item").unwrap();
        let source = source(&values);
        let count = |doc: serde_json::Value| items.count_json(&doc).unwrap().execute(&source).unwrap();

        let kept = count(json!({ "where": { "n": { "lt": k } } }));
        let negated = count(json!({ "where": { "NOT": { "n": { "lt": k } } } }));

        prop_assert_eq!(kept + negated, values.len());
    }

    #[test]
    fn ordered_pages_are_sorted_prefixes(values in prop::collection::vec(-50_i64..50, 0..40), take in 1_i64..10) {
        let client = client();
        let items = client.repository("Item").unwrap();

        let rows = items
            .find_many_json(&json!({ "orderBy": { "n": "asc" }, "take": take }))
            .unwrap()
            .execute(&source(&values))
            .unwrap();

        let mut sorted = values.clone();
        sorted.sort_unstable();
        sorted.truncate(usize::try_from(take).unwrap());
        prop_assert_eq!(ns(&rows), sorted);
    }
}
