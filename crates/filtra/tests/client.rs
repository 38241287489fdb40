use filtra::{ErrorClass, ErrorOrigin, prelude::*};
use serde_json::json;

static BOOK: EntityModel = EntityModel {
    name: "Book",
    primary_key: "id",
    fields: &[
        FieldModel::new("id", FieldKind::Id),
        FieldModel::new("title", FieldKind::Text),
        FieldModel::new("pages", FieldKind::Int),
        FieldModel::new("publishedAt", FieldKind::Timestamp),
        FieldModel::new("shelfId", FieldKind::Id).nullable(),
    ],
    relations: &[
        RelationModel::one("shelf", "Shelf", "shelfId", "id"),
        RelationModel::many("notes", "Note", "id", "bookId"),
    ],
};

static SHELF: EntityModel = EntityModel {
    name: "Shelf",
    primary_key: "id",
    fields: &[
        FieldModel::new("id", FieldKind::Id),
        FieldModel::new("label", FieldKind::Text).unique(),
    ],
    relations: &[RelationModel::many("books", "Book", "id", "shelfId")],
};

static NOTE: EntityModel = EntityModel {
    name: "Note",
    primary_key: "id",
    fields: &[
        FieldModel::new("id", FieldKind::Id),
        FieldModel::new("bookId", FieldKind::Id),
        FieldModel::new("spoiler", FieldKind::Bool),
    ],
    relations: &[],
};

struct Book;

impl EntityKind for Book {
    const MODEL: &'static EntityModel = &BOOK;
}

fn client() -> Client {
    let registry = SchemaRegistry::from_models([&BOOK, &SHELF, &NOTE]).unwrap();

    Client::new(registry, FilterConfig::default()).unwrap()
}

fn book(n: u128, title: &str, pages: i64, shelf: Option<u128>) -> Document {
    Document::new()
        .with("id", Ulid(n))
        .with("title", title)
        .with("pages", pages)
        .with("publishedAt", Timestamp::from_millis(i64::try_from(n).unwrap()))
        .with("shelfId", shelf.map(Ulid))
}

fn library() -> MemorySource {
    let mut source = MemorySource::new();
    source.extend(
        "Book",
        [
            book(1, "Catch-22", 453, Some(100)),
            book(2, "Dune", 412, Some(100)),
            book(3, "Educated", 334, None),
            book(4, "The Catcher in the Rye", 277, Some(101)),
        ],
    );
    source.extend(
        "Shelf",
        [
            Document::new().with("id", Ulid(100)).with("label", "fiction"),
            Document::new().with("id", Ulid(101)).with("label", "classics"),
        ],
    );
    source.extend(
        "Note",
        [Document::new()
            .with("id", Ulid(200))
            .with("bookId", Ulid(2))
            .with("spoiler", true)],
    );

    source
}

fn titles(rows: &[ProjectedRecord]) -> Vec<String> {
    rows.iter()
        .filter_map(|row| row.get("title").and_then(Value::as_text).map(str::to_string))
        .collect()
}

#[test]
fn find_many_from_a_json_document() {
    let client = client();
    let books = client.repository_for::<Book>().unwrap();

    let spec = books
        .find_many_json(&json!({
            "where": {
                "title": { "contains": "cat", "mode": "insensitive" },
                "pages": { "gt": 300 },
            },
            "orderBy": { "pages": "desc" },
        }))
        .unwrap();

    assert_eq!(titles(&spec.execute(&library()).unwrap()), vec!["Catch-22"]);
}

#[test]
fn relation_filters_through_the_client() {
    let client = client();
    let books = client.repository("Book").unwrap();
    let source = library();

    let no_spoilers = books
        .find_many_json(&json!({ "where": { "notes": { "none": { "spoiler": true } } } }))
        .unwrap();
    assert_eq!(
        titles(&no_spoilers.execute(&source).unwrap()),
        vec!["Catch-22", "Educated", "The Catcher in the Rye"]
    );

    let shelved = books
        .find_many_json(&json!({ "where": { "shelf": { "is": { "label": "classics" } } } }))
        .unwrap();
    assert_eq!(
        titles(&shelved.execute(&source).unwrap()),
        vec!["The Catcher in the Rye"]
    );

    let unshelved = books
        .find_many_json(&json!({ "where": { "shelf": { "is": null } } }))
        .unwrap();
    assert_eq!(titles(&unshelved.execute(&source).unwrap()), vec!["Educated"]);
}

#[test]
fn typed_queries_page_with_a_cursor() {
    let client = client();
    let books = client.repository_for::<Book>().unwrap();
    let query = FindMany::new()
        .order(OrderSpec::new().asc("publishedAt"))
        .window(Window::new().cursor(Cursor::by("id", Ulid(2))).take(2))
        .projection(Projection::select(["title"]));

    let rows = books.find_many(&query).unwrap().execute(&library()).unwrap();

    assert_eq!(titles(&rows), vec!["Dune", "Educated"]);
    assert_eq!(
        serde_json::to_value(&rows).unwrap(),
        json!([{ "title": "Dune" }, { "title": "Educated" }])
    );
}

#[test]
fn include_nested_relations() {
    let client = client();
    let shelves = client.repository("Shelf").unwrap();

    let spec = shelves
        .find_unique_json(&json!({
            "where": { "label": "fiction" },
            "include": { "books": { "select": { "title": true } } },
        }))
        .unwrap();
    let row = spec.execute(&library()).unwrap().unwrap();

    assert_eq!(
        serde_json::to_value(&row).unwrap(),
        json!({
            "id": Ulid(100).to_string(),
            "label": "fiction",
            "books": [{ "title": "Catch-22" }, { "title": "Dune" }],
        })
    );
}

#[test]
fn count_aggregate_and_group_by() {
    let client = client();
    let books = client.repository("Book").unwrap();
    let source = library();

    let count = books
        .count_json(&json!({ "where": { "pages": { "lt": 400 } } }))
        .unwrap();
    assert_eq!(count.execute(&source).unwrap(), 2);

    let stats = books
        .aggregate_json(&json!({ "_sum": { "pages": true }, "_max": { "title": true } }))
        .unwrap()
        .execute(&source)
        .unwrap();
    assert_eq!(
        serde_json::to_value(&stats).unwrap(),
        json!({ "_max": { "title": "The Catcher in the Rye" }, "_sum": { "pages": 1476 } })
    );

    let groups = books
        .group_by_json(&json!({ "by": ["shelfId"], "_count": { "_all": true } }))
        .unwrap()
        .execute(&source)
        .unwrap();
    let counts = groups
        .iter()
        .map(|row| row.values.count.as_ref().and_then(|c| c.all))
        .collect::<Vec<_>>();
    assert_eq!(counts, vec![Some(1), Some(2), Some(1)]);
}

#[test]
fn errors_are_classified() {
    let client = client();
    let books = client.repository("Book").unwrap();

    let unknown = books
        .find_many_json(&json!({ "where": { "isbn": "x" } }))
        .unwrap_err();
    assert_eq!(unknown.class, ErrorClass::Validation);
    assert_eq!(unknown.origin, ErrorOrigin::Compile);

    let mismatch = books
        .find_many_json(&json!({ "where": { "pages": { "contains": "1" } } }))
        .unwrap_err();
    assert!(mismatch.is_validation());

    let missing = books
        .find_many_json(&json!({ "cursor": { "id": Ulid(999).to_string() }, "take": 1 }))
        .unwrap()
        .execute(&library())
        .unwrap_err();
    assert!(missing.is_not_found());
    assert_eq!(missing.origin, ErrorOrigin::Window);

    assert!(client.repository("Magazine").is_err());
}

#[test]
fn limits_come_from_toml() {
    let config = FilterConfig::from_toml_str("max_take = 2\nnulls = \"last\"\n").unwrap();
    let registry = SchemaRegistry::from_models([&BOOK, &SHELF, &NOTE]).unwrap();
    let client = Client::new(registry, config).unwrap();
    let books = client.repository("Book").unwrap();

    let err = books.find_many_json(&json!({ "take": 3 })).unwrap_err();
    assert!(err.is_validation());

    let rows = books
        .find_many(
            &FindMany::new()
                .order(OrderSpec::new().asc("shelfId"))
                .window(Window::new().take(-1)),
        )
        .unwrap()
        .execute(&library())
        .unwrap();
    assert_eq!(titles(&rows), vec!["Educated"]);
}
