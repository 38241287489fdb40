//! Static models and record builders shared by unit tests.

use crate::{
    db::source::{Document, MemorySource},
    model::{EntityModel, FieldKind, FieldModel, RelationModel, SchemaRegistry},
    obs::{MetricsEvent, MetricsSink, with_metrics_sink},
    types::{Timestamp, Ulid},
    value::Value,
};
use std::{cell::RefCell, rc::Rc};

pub static ROLES: &[&str] = &["ADMIN", "MEMBER"];

pub static USER: EntityModel = EntityModel {
    name: "User",
    primary_key: "id",
    fields: &[
        FieldModel::new("id", FieldKind::Id),
        FieldModel::new("email", FieldKind::Text).unique(),
        FieldModel::new("name", FieldKind::Text),
        FieldModel::new("age", FieldKind::Int),
        FieldModel::new("country", FieldKind::Text),
        FieldModel::new("score", FieldKind::Float).nullable(),
        FieldModel::new("role", FieldKind::Enum(ROLES)),
        FieldModel::new("tags", FieldKind::List(&FieldKind::Text)),
        FieldModel::new("createdAt", FieldKind::Timestamp),
        FieldModel::new("birthday", FieldKind::Date).nullable(),
        FieldModel::new("nickname", FieldKind::Text).nullable(),
    ],
    relations: &[
        RelationModel::many("posts", "Post", "id", "authorId"),
        RelationModel::many("comments", "Comment", "id", "authorId"),
        RelationModel::one("profile", "Profile", "id", "userId"),
    ],
};

pub static POST: EntityModel = EntityModel {
    name: "Post",
    primary_key: "id",
    fields: &[
        FieldModel::new("id", FieldKind::Id),
        FieldModel::new("title", FieldKind::Text),
        FieldModel::new("authorId", FieldKind::Id),
        FieldModel::new("published", FieldKind::Bool),
        FieldModel::new("createdAt", FieldKind::Timestamp),
        FieldModel::new("views", FieldKind::Int),
        FieldModel::new("rating", FieldKind::Float).nullable(),
    ],
    relations: &[
        RelationModel::one("author", "User", "authorId", "id"),
        RelationModel::many("comments", "Comment", "id", "postId"),
    ],
};

pub static COMMENT: EntityModel = EntityModel {
    name: "Comment",
    primary_key: "id",
    fields: &[
        FieldModel::new("id", FieldKind::Id),
        FieldModel::new("postId", FieldKind::Id),
        FieldModel::new("authorId", FieldKind::Id),
        FieldModel::new("body", FieldKind::Text),
        FieldModel::new("flagged", FieldKind::Bool),
    ],
    relations: &[
        RelationModel::one("post", "Post", "postId", "id"),
        RelationModel::one("author", "User", "authorId", "id"),
    ],
};

pub static PROFILE: EntityModel = EntityModel {
    name: "Profile",
    primary_key: "id",
    fields: &[
        FieldModel::new("id", FieldKind::Id),
        FieldModel::new("userId", FieldKind::Id).unique(),
        FieldModel::new("bio", FieldKind::Text).nullable(),
    ],
    relations: &[RelationModel::one("user", "User", "userId", "id")],
};

pub fn fixture_registry() -> SchemaRegistry {
    SchemaRegistry::from_models([&USER, &POST, &COMMENT, &PROFILE])
        .expect("fixture models should register")
}

/// Deterministic id; small numbers keep test output readable.
pub const fn id(n: u128) -> Ulid {
    Ulid(n)
}

pub fn user(n: u128, name: &str, age: i64, country: &str) -> Document {
    Document::new()
        .with("id", id(n))
        .with("email", format!("{}@example.com", name.to_lowercase()))
        .with("name", name)
        .with("age", age)
        .with("country", country)
        .with("role", Value::Enum("MEMBER".to_string()))
        .with("tags", Value::List(Vec::new()))
        .with("createdAt", Timestamp::from_millis(i64::try_from(n).unwrap_or(0)))
}

pub fn post(n: u128, author: u128, title: &str, created_at: i64) -> Document {
    Document::new()
        .with("id", id(n))
        .with("title", title)
        .with("authorId", id(author))
        .with("published", true)
        .with("createdAt", Timestamp::from_millis(created_at))
        .with("views", 0_i64)
}

pub fn comment(n: u128, post: u128, author: u128, flagged: bool) -> Document {
    Document::new()
        .with("id", id(n))
        .with("postId", id(post))
        .with("authorId", id(author))
        .with("body", "text")
        .with("flagged", flagged)
}

/// Three users, two posts by user 1, comments on the first post.
pub fn fixture_source() -> MemorySource {
    let mut source = MemorySource::new()
        .with_collection("User")
        .with_collection("Post")
        .with_collection("Comment")
        .with_collection("Profile");

    source.extend(
        "User",
        [
            user(1, "Ada", 36, "UK"),
            user(2, "Grace", 17, "US"),
            user(3, "Linus", 25, "FI"),
        ],
    );
    source.extend(
        "Post",
        [
            post(10, 1, "Concatenate strings", 100),
            post(11, 1, "CATALOG of things", 200),
        ],
    );
    source.extend(
        "Comment",
        [comment(20, 10, 2, false), comment(21, 10, 3, true)],
    );
    source.insert(
        "Profile",
        Document::new()
            .with("id", id(30))
            .with("userId", id(1))
            .with("bio", "mathematician"),
    );

    source
}

///
/// EventLog
/// Sink that keeps every event it sees, in order.
///

#[derive(Default)]
pub struct EventLog {
    events: RefCell<Vec<MetricsEvent>>,
}

impl MetricsSink for EventLog {
    fn record(&self, event: MetricsEvent) {
        self.events.borrow_mut().push(event);
    }
}

/// Run `f` with an `EventLog` installed and return its result plus the events.
pub fn capture_events<T>(f: impl FnOnce() -> T) -> (T, Vec<MetricsEvent>) {
    let log = Rc::new(EventLog::default());
    let out = with_metrics_sink(log.clone(), f);
    let events = log.events.borrow().clone();

    (out, events)
}
