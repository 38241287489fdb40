use crate::{
    config::FilterConfig,
    db::{
        filter::{Condition, FieldFilter, Filter, RelationFilter, RelationOp},
        predicate::{ValidateError, literal::lower_literal},
    },
    model::{EntityModel, FieldKind, FieldModel, RelationModel, SchemaRegistry},
    obs::sink::{self, MetricsEvent},
    value::{TextMode, TextOp, Value, canonical_cmp, fold_text},
};
use std::collections::BTreeSet;

///
/// Predicate
///
/// Filter compiled against one entity model. Immutable after construction
/// and free of interior mutability, so one predicate can be shared across
/// threads and evaluated against any number of records.
///

#[derive(Clone, Debug)]
pub struct Predicate {
    pub(super) entity: &'static EntityModel,
    pub(super) root: Node,
}

///
/// Node
///
/// Validated filter tree with field and relation names resolved to models.
///

#[derive(Clone, Debug)]
pub(super) enum Node {
    True,
    False,
    And(Vec<Self>),
    Or(Vec<Self>),
    /// Holds when no child holds.
    Not(Vec<Self>),
    Field(FieldNode),
    Relation(RelationNode),
}

#[derive(Clone, Debug)]
pub(super) struct FieldNode {
    pub(super) field: &'static FieldModel,
    pub(super) checks: Vec<Check>,
}

///
/// Check
///
/// One lowered operator. Text literals under `TextMode::Ci` are folded
/// here once so evaluation only folds the record side.
///

#[derive(Clone, Debug)]
pub(super) enum Check {
    IsNull,
    Eq { value: Value, mode: TextMode },
    ListEq(Vec<Value>),
    Not(Vec<Self>),
    /// Sorted and deduplicated under the canonical order.
    Member {
        values: Vec<Value>,
        negated: bool,
        mode: TextMode,
    },
    Order {
        op: OrderOp,
        value: Value,
        mode: TextMode,
    },
    Text {
        op: TextOp,
        needle: String,
        mode: TextMode,
    },
    IsSet(bool),
    Has(Value),
    HasEvery(Vec<Value>),
    HasSome(Vec<Value>),
    IsEmpty(bool),
}

impl Check {
    /// Whether this check can hold on a null or unset field.
    pub(super) fn tests_absence(&self) -> bool {
        match self {
            Self::IsNull | Self::IsSet(_) => true,
            Self::Not(inner) => inner.iter().any(Self::tests_absence),
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum OrderOp {
    Lt,
    Lte,
    Gt,
    Gte,
}

#[derive(Clone, Debug)]
pub(super) struct RelationNode {
    pub(super) relation: &'static RelationModel,
    pub(super) target: &'static EntityModel,
    pub(super) check: RelationCheck,
}

#[derive(Clone, Debug)]
pub(super) enum RelationCheck {
    Some(Box<Node>),
    Every(Box<Node>),
    None(Box<Node>),
    Is(Option<Box<Node>>),
    IsNot(Option<Box<Node>>),
}

impl Predicate {
    /// Predicate that accepts every record of `entity`.
    #[must_use]
    pub const fn always(entity: &'static EntityModel) -> Self {
        Self {
            entity,
            root: Node::True,
        }
    }

    #[must_use]
    pub const fn entity(&self) -> &'static EntityModel {
        self.entity
    }

    #[must_use]
    pub const fn is_always_true(&self) -> bool {
        matches!(self.root, Node::True)
    }

    /// Fields of the root entity this predicate reads, sorted and deduplicated.
    /// Relation local keys are included; fields read on related records are not.
    #[must_use]
    pub fn referenced_fields(&self) -> Vec<&'static str> {
        let mut fields = BTreeSet::new();
        collect_fields(&self.root, &mut fields);

        fields.into_iter().collect()
    }
}

// Recursively gather field references from one compiled node.
fn collect_fields(node: &Node, fields: &mut BTreeSet<&'static str>) {
    match node {
        Node::True | Node::False => {}
        Node::And(children) | Node::Or(children) | Node::Not(children) => {
            for child in children {
                collect_fields(child, fields);
            }
        }
        Node::Field(field) => {
            fields.insert(field.field.name);
        }
        Node::Relation(rel) => {
            fields.insert(rel.relation.local_field);
        }
    }
}

/// Validate `filter` against `entity` and lower it into a `Predicate`.
///
/// Unknown fields, relations and operators, literals that do not fit the
/// declared field type, and limit violations are rejected here so that
/// evaluation never fails.
pub fn compile(
    registry: &SchemaRegistry,
    entity: &'static EntityModel,
    filter: &Filter,
    config: &FilterConfig,
) -> Result<Predicate, ValidateError> {
    let root = lower(registry, entity, filter, config).inspect_err(|err| {
        tracing::debug!(entity = entity.name, error = %err, "filter rejected");
        sink::record(MetricsEvent::FilterRejected {
            entity: entity.name,
        });
    })?;
    sink::record(MetricsEvent::FilterCompiled {
        entity: entity.name,
    });

    tracing::debug!(
        entity = entity.name,
        depth = filter.depth(),
        "compiled filter predicate"
    );

    Ok(Predicate { entity, root })
}

fn lower(
    registry: &SchemaRegistry,
    entity: &'static EntityModel,
    filter: &Filter,
    config: &FilterConfig,
) -> Result<Node, ValidateError> {
    let depth = filter.depth();
    if depth > config.max_depth {
        return Err(ValidateError::DepthExceeded {
            depth,
            max: config.max_depth,
        });
    }

    Compiler { registry, config }.node(entity, filter)
}

///
/// Compiler
///

struct Compiler<'a> {
    registry: &'a SchemaRegistry,
    config: &'a FilterConfig,
}

impl Compiler<'_> {
    fn node(&self, entity: &'static EntityModel, filter: &Filter) -> Result<Node, ValidateError> {
        match filter {
            Filter::And(children) if children.is_empty() => Ok(Node::True),
            Filter::Or(children) if children.is_empty() => Ok(Node::False),
            Filter::Not(children) if children.is_empty() => Ok(Node::True),
            Filter::And(children) => Ok(Node::And(self.nodes(entity, children)?)),
            Filter::Or(children) => Ok(Node::Or(self.nodes(entity, children)?)),
            Filter::Not(children) => Ok(Node::Not(self.nodes(entity, children)?)),
            Filter::Field(field) => self.field(entity, field),
            Filter::Relation(relation) => self.relation(entity, relation),
        }
    }

    fn nodes(
        &self,
        entity: &'static EntityModel,
        children: &[Filter],
    ) -> Result<Vec<Node>, ValidateError> {
        children
            .iter()
            .map(|child| self.node(entity, child))
            .collect()
    }

    fn field(
        &self,
        entity: &'static EntityModel,
        filter: &FieldFilter,
    ) -> Result<Node, ValidateError> {
        let field = entity
            .field(&filter.field)
            .ok_or_else(|| ValidateError::unknown_field(entity.name, &filter.field))?;

        if filter.mode == TextMode::Ci && !field.kind.is_text() {
            return Err(ValidateError::invalid_operator(
                field.name,
                "mode: insensitive",
                field.kind,
            ));
        }

        let checks = filter
            .conditions
            .iter()
            .map(|condition| self.check(field, condition, filter.mode))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Node::Field(FieldNode { field, checks }))
    }

    fn relation(
        &self,
        entity: &'static EntityModel,
        filter: &RelationFilter,
    ) -> Result<Node, ValidateError> {
        let relation =
            entity
                .relation(&filter.relation)
                .ok_or_else(|| ValidateError::UnknownRelation {
                    entity: entity.name.to_string(),
                    relation: filter.relation.clone(),
                })?;
        let target =
            self.registry
                .get(relation.target)
                .ok_or_else(|| ValidateError::UnknownEntity {
                    entity: relation.target.to_string(),
                })?;

        if filter.op.is_to_many() != relation.is_many() {
            return Err(ValidateError::InvalidRelationOperator {
                relation: relation.name.to_string(),
                op: filter.op.name().to_string(),
                cardinality: if relation.is_many() {
                    "to-many"
                } else {
                    "to-one"
                },
            });
        }

        let nested = |f: &Filter| self.node(target, f).map(Box::new);
        let check = match &filter.op {
            RelationOp::Some(f) => RelationCheck::Some(nested(f)?),
            RelationOp::Every(f) => RelationCheck::Every(nested(f)?),
            RelationOp::None(f) => RelationCheck::None(nested(f)?),
            RelationOp::Is(f) => RelationCheck::Is(f.as_deref().map(nested).transpose()?),
            RelationOp::IsNot(f) => RelationCheck::IsNot(f.as_deref().map(nested).transpose()?),
        };

        Ok(Node::Relation(RelationNode {
            relation,
            target,
            check,
        }))
    }

    #[allow(clippy::too_many_lines)]
    fn check(
        &self,
        field: &FieldModel,
        condition: &Condition,
        mode: TextMode,
    ) -> Result<Check, ValidateError> {
        let name = field.name;
        let kind = &field.kind;
        let op = condition.name();

        match condition {
            Condition::Equals(Value::Null) => {
                if field.nullable {
                    Ok(Check::IsNull)
                } else {
                    Err(ValidateError::NotNullable {
                        field: name.to_string(),
                    })
                }
            }
            Condition::Equals(value) => match lower_literal(name, kind, value.clone())? {
                Value::List(items) if kind.is_list() => Ok(Check::ListEq(items)),
                value => Ok(Check::Eq {
                    value: fold_value(value, mode),
                    mode,
                }),
            },
            Condition::Not(inner) => inner
                .iter()
                .map(|condition| self.check(field, condition, mode))
                .collect::<Result<Vec<_>, _>>()
                .map(Check::Not),
            Condition::In(values) | Condition::NotIn(values) => {
                require_scalar(field, op)?;
                let values = self.literal_set(name, kind, values, mode)?;

                Ok(Check::Member {
                    values,
                    negated: matches!(condition, Condition::NotIn(_)),
                    mode,
                })
            }
            Condition::Lt(value)
            | Condition::Lte(value)
            | Condition::Gt(value)
            | Condition::Gte(value) => {
                if !supports_ordering(kind) {
                    return Err(ValidateError::invalid_operator(name, op, kind));
                }
                let value = fold_value(lower_literal(name, kind, value.clone())?, mode);
                let op = match condition {
                    Condition::Lt(_) => OrderOp::Lt,
                    Condition::Lte(_) => OrderOp::Lte,
                    Condition::Gt(_) => OrderOp::Gt,
                    _ => OrderOp::Gte,
                };

                Ok(Check::Order { op, value, mode })
            }
            Condition::Contains(needle)
            | Condition::StartsWith(needle)
            | Condition::EndsWith(needle) => {
                if !kind.is_text() {
                    return Err(ValidateError::invalid_operator(name, op, kind));
                }
                let text_op = match condition {
                    Condition::Contains(_) => TextOp::Contains,
                    Condition::StartsWith(_) => TextOp::StartsWith,
                    _ => TextOp::EndsWith,
                };

                Ok(Check::Text {
                    op: text_op,
                    needle: fold_text(needle, mode).into_owned(),
                    mode,
                })
            }
            Condition::IsSet(set) => {
                if field.nullable {
                    Ok(Check::IsSet(*set))
                } else {
                    Err(ValidateError::invalid_operator(name, op, kind))
                }
            }
            Condition::Has(value) => {
                let element = require_list(field, op)?;
                Ok(Check::Has(lower_literal(name, element, value.clone())?))
            }
            Condition::HasEvery(values) => {
                let element = require_list(field, op)?;
                Ok(Check::HasEvery(self.literal_set(
                    name,
                    element,
                    values,
                    TextMode::Cs,
                )?))
            }
            Condition::HasSome(values) => {
                let element = require_list(field, op)?;
                Ok(Check::HasSome(self.literal_set(
                    name,
                    element,
                    values,
                    TextMode::Cs,
                )?))
            }
            Condition::IsEmpty(empty) => {
                require_list(field, op)?;
                Ok(Check::IsEmpty(*empty))
            }
        }
    }

    // Lower, fold, sort and deduplicate a list literal.
    fn literal_set(
        &self,
        field: &str,
        kind: &FieldKind,
        values: &[Value],
        mode: TextMode,
    ) -> Result<Vec<Value>, ValidateError> {
        if values.len() > self.config.max_list_literal_len {
            return Err(ValidateError::ListLiteralTooLong {
                field: field.to_string(),
                len: values.len(),
                max: self.config.max_list_literal_len,
            });
        }

        let mut lowered = values
            .iter()
            .map(|value| lower_literal(field, kind, value.clone()).map(|v| fold_value(v, mode)))
            .collect::<Result<Vec<_>, _>>()?;
        lowered.sort_by(canonical_cmp);
        lowered.dedup();

        Ok(lowered)
    }
}

// Booleans, enums and lists have no ordering operators.
const fn supports_ordering(kind: &FieldKind) -> bool {
    matches!(
        kind,
        FieldKind::Int
            | FieldKind::Float
            | FieldKind::Text
            | FieldKind::Date
            | FieldKind::Timestamp
            | FieldKind::Id
    )
}

fn require_scalar(field: &FieldModel, op: &str) -> Result<(), ValidateError> {
    if field.kind.is_list() {
        Err(ValidateError::invalid_operator(field.name, op, field.kind))
    } else {
        Ok(())
    }
}

fn require_list(field: &FieldModel, op: &str) -> Result<&'static FieldKind, ValidateError> {
    field
        .kind
        .element()
        .ok_or_else(|| ValidateError::invalid_operator(field.name, op, field.kind))
}

fn fold_value(value: Value, mode: TextMode) -> Value {
    match (value, mode) {
        (Value::Text(text), TextMode::Ci) => Value::Text(text.to_lowercase()),
        (value, _) => value,
    }
}
