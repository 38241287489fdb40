use crate::{
    db::predicate::compile::{
        Check, FieldNode, Node, OrderOp, Predicate, RelationCheck, RelationNode,
    },
    model::{EntityModel, FieldKind},
    obs::sink::{self, MetricsEvent},
    traits::{FieldPresence, NoRelations, Record, RelationResolver},
    value::{TextMode, Value, canonical_cmp, fold_text, numeric_cmp, strict_order_cmp, text_matches},
};
use std::{borrow::Cow, cmp::Ordering};

impl Predicate {
    /// Test one record. Total: never fails once compiled.
    ///
    /// `AND` stops at the first false child, `OR` at the first true child.
    /// Relations the resolver cannot supply are treated as empty.
    pub fn evaluate<R, Res>(&self, record: &R, resolver: &Res) -> bool
    where
        R: Record,
        Res: RelationResolver<R> + ?Sized,
    {
        eval_node(&self.root, self.entity, record, resolver)
    }

    /// Test one record without relation traversal.
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        self.evaluate(record, &NoRelations)
    }
}

fn eval_node<R, Res>(node: &Node, entity: &EntityModel, record: &R, resolver: &Res) -> bool
where
    R: Record,
    Res: RelationResolver<R> + ?Sized,
{
    match node {
        Node::True => true,
        Node::False => false,
        Node::And(children) => children
            .iter()
            .all(|child| eval_node(child, entity, record, resolver)),
        Node::Or(children) => children
            .iter()
            .any(|child| eval_node(child, entity, record, resolver)),
        Node::Not(children) => !children
            .iter()
            .any(|child| eval_node(child, entity, record, resolver)),
        Node::Field(field) => eval_field(field, record),
        Node::Relation(relation) => eval_relation(relation, entity, record, resolver),
    }
}

///
/// Field checks
///

fn eval_field<R: Record>(node: &FieldNode, record: &R) -> bool {
    let presence = record.field(node.field.name);

    node.checks
        .iter()
        .all(|check| eval_check(check, &presence, &node.field.kind))
}

fn eval_check(check: &Check, presence: &FieldPresence<'_>, kind: &FieldKind) -> bool {
    let Some(actual) = presence.non_null() else {
        return eval_absent(check, presence, kind);
    };

    match check {
        Check::IsNull => false,
        Check::IsSet(set) => *set,
        Check::Eq { value, mode } => value_eq(&fold(actual, *mode), value),
        Check::ListEq(expected) => actual.as_list().is_some_and(|items| {
            items.len() == expected.len()
                && items.iter().zip(expected).all(|(a, b)| value_eq(a, b))
        }),
        Check::Not(inner) => !inner.iter().all(|c| eval_check(c, presence, kind)),
        Check::Member {
            values,
            negated,
            mode,
        } => {
            let actual = widen(fold(actual, *mode), kind);
            let found = values
                .binary_search_by(|probe| canonical_cmp(probe, &actual))
                .is_ok();

            found != *negated
        }
        Check::Order { op, value, mode } => {
            strict_order_cmp(&fold(actual, *mode), value).is_some_and(|ord| op.holds(ord))
        }
        Check::Text { op, needle, mode } => actual
            .as_text()
            .is_some_and(|text| text_matches(text, *op, needle, *mode)),
        Check::Has(value) => list_has(actual, value),
        Check::HasEvery(values) => values.iter().all(|v| list_has(actual, v)),
        Check::HasSome(values) => values.iter().any(|v| list_has(actual, v)),
        Check::IsEmpty(empty) => actual
            .as_list()
            .is_some_and(|items| items.is_empty() == *empty),
    }
}

// Null and unset fields satisfy only the explicit absence checks.
fn eval_absent(check: &Check, presence: &FieldPresence<'_>, kind: &FieldKind) -> bool {
    match check {
        Check::IsNull => true,
        Check::IsSet(set) => matches!(presence, FieldPresence::Present(_)) == *set,
        Check::Not(inner) if check.tests_absence() => {
            !inner.iter().all(|c| eval_check(c, presence, kind))
        }
        _ => false,
    }
}

impl OrderOp {
    const fn holds(self, ord: Ordering) -> bool {
        match self {
            Self::Lt => matches!(ord, Ordering::Less),
            Self::Lte => !matches!(ord, Ordering::Greater),
            Self::Gt => matches!(ord, Ordering::Greater),
            Self::Gte => !matches!(ord, Ordering::Less),
        }
    }
}

// Numbers compare by magnitude so an Int stored in a Float field still matches.
fn value_eq(left: &Value, right: &Value) -> bool {
    if left.is_numeric() && right.is_numeric() {
        return numeric_cmp(left, right) == Some(Ordering::Equal);
    }

    left == right
}

fn list_has(list: &Value, needle: &Value) -> bool {
    list.as_list()
        .is_some_and(|items| items.iter().any(|item| value_eq(item, needle)))
}

fn fold(value: &Value, mode: TextMode) -> Cow<'_, Value> {
    match (value, mode) {
        (Value::Text(text), TextMode::Ci) => {
            Cow::Owned(Value::Text(fold_text(text, mode).into_owned()))
        }
        _ => Cow::Borrowed(value),
    }
}

// Member literals for Float fields are lowered to Float.
#[allow(clippy::cast_precision_loss)]
fn widen<'a>(value: Cow<'a, Value>, kind: &FieldKind) -> Cow<'a, Value> {
    let widened = match (&*value, kind) {
        (Value::Int(n), FieldKind::Float) => Value::float(*n as f64),
        _ => None,
    };

    widened.map_or(value, Cow::Owned)
}

///
/// Relation checks
///

fn eval_relation<R, Res>(
    node: &RelationNode,
    entity: &EntityModel,
    record: &R,
    resolver: &Res,
) -> bool
where
    R: Record,
    Res: RelationResolver<R> + ?Sized,
{
    let related = match resolver.resolve(entity, record, node.relation) {
        Ok(related) => related,
        Err(err) => {
            tracing::warn!(
                entity = entity.name,
                relation = node.relation.name,
                error = %err,
                "relation unresolved; treating as empty"
            );
            sink::record(MetricsEvent::RelationUnresolved {
                entity: entity.name,
                relation: node.relation.name,
            });

            Vec::new()
        }
    };
    let holds = |nested: &Node, related: &R| eval_node(nested, node.target, related, resolver);

    match &node.check {
        RelationCheck::Some(nested) => related.iter().any(|r| holds(nested, r)),
        RelationCheck::Every(nested) => related.iter().all(|r| holds(nested, r)),
        RelationCheck::None(nested) => !related.iter().any(|r| holds(nested, r)),
        RelationCheck::Is(None) => related.is_empty(),
        RelationCheck::Is(Some(nested)) => related.first().is_some_and(|r| holds(nested, r)),
        RelationCheck::IsNot(None) => !related.is_empty(),
        RelationCheck::IsNot(Some(nested)) => {
            related.first().is_none_or(|r| !holds(nested, r))
        }
    }
}
