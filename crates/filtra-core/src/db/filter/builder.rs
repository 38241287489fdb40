use crate::{
    db::filter::{Condition, FieldFilter},
    value::{TextMode, Value},
};

// Chainable operator constructors; each call appends one condition.
impl FieldFilter {
    fn push(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    #[must_use]
    pub fn equals(self, value: impl Into<Value>) -> Self {
        self.push(Condition::Equals(value.into()))
    }

    #[must_use]
    pub fn is_null(self) -> Self {
        self.push(Condition::Equals(Value::Null))
    }

    #[must_use]
    pub fn is_not_null(self) -> Self {
        self.push(Condition::Not(vec![Condition::Equals(Value::Null)]))
    }

    #[must_use]
    pub fn not(self, value: impl Into<Value>) -> Self {
        self.push(Condition::Not(vec![Condition::Equals(value.into())]))
    }

    #[must_use]
    pub fn not_matching(self, conditions: Vec<Condition>) -> Self {
        self.push(Condition::Not(conditions))
    }

    #[must_use]
    pub fn in_<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push(Condition::In(values.into_iter().map(Into::into).collect()))
    }

    #[must_use]
    pub fn not_in<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push(Condition::NotIn(values.into_iter().map(Into::into).collect()))
    }

    #[must_use]
    pub fn lt(self, value: impl Into<Value>) -> Self {
        self.push(Condition::Lt(value.into()))
    }

    #[must_use]
    pub fn lte(self, value: impl Into<Value>) -> Self {
        self.push(Condition::Lte(value.into()))
    }

    #[must_use]
    pub fn gt(self, value: impl Into<Value>) -> Self {
        self.push(Condition::Gt(value.into()))
    }

    #[must_use]
    pub fn gte(self, value: impl Into<Value>) -> Self {
        self.push(Condition::Gte(value.into()))
    }

    #[must_use]
    pub fn contains(self, needle: impl Into<String>) -> Self {
        self.push(Condition::Contains(needle.into()))
    }

    #[must_use]
    pub fn starts_with(self, prefix: impl Into<String>) -> Self {
        self.push(Condition::StartsWith(prefix.into()))
    }

    #[must_use]
    pub fn ends_with(self, suffix: impl Into<String>) -> Self {
        self.push(Condition::EndsWith(suffix.into()))
    }

    #[must_use]
    pub fn is_set(self, set: bool) -> Self {
        self.push(Condition::IsSet(set))
    }

    #[must_use]
    pub fn has(self, value: impl Into<Value>) -> Self {
        self.push(Condition::Has(value.into()))
    }

    #[must_use]
    pub fn has_every<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push(Condition::HasEvery(
            values.into_iter().map(Into::into).collect(),
        ))
    }

    #[must_use]
    pub fn has_some<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push(Condition::HasSome(
            values.into_iter().map(Into::into).collect(),
        ))
    }

    #[must_use]
    pub fn is_empty(self, empty: bool) -> Self {
        self.push(Condition::IsEmpty(empty))
    }

    /// Compare text case-insensitively.
    #[must_use]
    pub fn insensitive(mut self) -> Self {
        self.mode = TextMode::Ci;
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: TextMode) -> Self {
        self.mode = mode;
        self
    }
}
