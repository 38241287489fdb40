use crate::{
    config::FilterConfig,
    db::{
        filter::{Filter, parse_where},
        order::{Comparator, OrderSpec},
        predicate::{Predicate, compile},
        query::{
            Aggregate, AggregateSpec, Count, CountSpec, FindMany, FindManySpec, FindUnique,
            FindUniqueSpec, GroupBy, GroupBySpec,
        },
        window::{PageWindow, Window},
    },
    error::Error,
    model::{EntityModel, SchemaRegistry},
    traits::EntityKind,
};
use serde_json::Value as Json;

///
/// Client
///
/// Schema registry plus limits. Hands out per-entity repositories; holds
/// no mutable state, so one client can serve any number of callers.
///

#[derive(Clone, Debug)]
pub struct Client {
    registry: SchemaRegistry,
    config: FilterConfig,
}

impl Client {
    pub fn new(registry: SchemaRegistry, config: FilterConfig) -> Result<Self, Error> {
        config.validate()?;
        registry.validate_relations()?;

        Ok(Self { registry, config })
    }

    #[must_use]
    pub const fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Repository for the entity registered under `name`.
    pub fn repository(&self, name: &str) -> Result<Repository<'_>, Error> {
        let entity = self
            .registry
            .get(name)
            .ok_or_else(|| Error::unknown_entity(name))?;

        Ok(Repository {
            client: self,
            entity,
        })
    }

    /// Repository for a statically typed entity.
    pub fn repository_for<E: EntityKind>(&self) -> Result<Repository<'_>, Error> {
        self.repository(E::MODEL.name)
    }
}

///
/// Repository
///
/// Query entry points for one entity. Every method only compiles; the
/// returned spec runs when `execute` is called with a source.
///

#[derive(Clone, Copy, Debug)]
pub struct Repository<'a> {
    client: &'a Client,
    entity: &'static EntityModel,
}

impl Repository<'_> {
    #[must_use]
    pub const fn entity(&self) -> &'static EntityModel {
        self.entity
    }

    // ---------------------------------------------------------------------
    // Building blocks
    // ---------------------------------------------------------------------

    pub fn compile(&self, filter: &Filter) -> Result<Predicate, Error> {
        Ok(compile(
            &self.client.registry,
            self.entity,
            filter,
            &self.client.config,
        )?)
    }

    /// Compile a JSON `where` document.
    pub fn compile_where(&self, json: &Json) -> Result<Predicate, Error> {
        let filter = parse_where(&self.client.registry, self.entity, json)?;

        self.compile(&filter)
    }

    pub fn comparator(&self, order: &OrderSpec) -> Result<Comparator, Error> {
        Ok(Comparator::compile(self.entity, order, &self.client.config)?)
    }

    pub fn window(&self, window: &Window) -> Result<PageWindow, Error> {
        Ok(PageWindow::compile(self.entity, window, &self.client.config)?)
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn find_many(&self, query: &FindMany) -> Result<FindManySpec, Error> {
        Ok(FindManySpec::compile(
            &self.client.registry,
            self.entity,
            query,
            &self.client.config,
        )?)
    }

    pub fn find_many_json(&self, json: &Json) -> Result<FindManySpec, Error> {
        let query = FindMany::from_json(&self.client.registry, self.entity, json)?;

        self.find_many(&query)
    }

    pub fn find_first(&self, query: &FindMany) -> Result<FindManySpec, Error> {
        Ok(FindManySpec::compile_first(
            &self.client.registry,
            self.entity,
            query,
            &self.client.config,
        )?)
    }

    pub fn find_first_json(&self, json: &Json) -> Result<FindManySpec, Error> {
        let query = FindMany::from_json(&self.client.registry, self.entity, json)?;

        self.find_first(&query)
    }

    pub fn find_unique(&self, query: &FindUnique) -> Result<FindUniqueSpec, Error> {
        Ok(FindUniqueSpec::compile(
            &self.client.registry,
            self.entity,
            query,
        )?)
    }

    pub fn find_unique_json(&self, json: &Json) -> Result<FindUniqueSpec, Error> {
        let query = FindUnique::from_json(&self.client.registry, self.entity, json)?;

        self.find_unique(&query)
    }

    pub fn count(&self, query: &Count) -> Result<CountSpec, Error> {
        Ok(CountSpec::compile(
            &self.client.registry,
            self.entity,
            query,
            &self.client.config,
        )?)
    }

    pub fn count_json(&self, json: &Json) -> Result<CountSpec, Error> {
        let query = Count::from_json(&self.client.registry, self.entity, json)?;

        self.count(&query)
    }

    pub fn aggregate(&self, query: &Aggregate) -> Result<AggregateSpec, Error> {
        Ok(AggregateSpec::compile(
            &self.client.registry,
            self.entity,
            query,
            &self.client.config,
        )?)
    }

    pub fn aggregate_json(&self, json: &Json) -> Result<AggregateSpec, Error> {
        let query = Aggregate::from_json(&self.client.registry, self.entity, json)?;

        self.aggregate(&query)
    }

    pub fn group_by(&self, query: &GroupBy) -> Result<GroupBySpec, Error> {
        Ok(GroupBySpec::compile(
            &self.client.registry,
            self.entity,
            query,
            &self.client.config,
        )?)
    }

    pub fn group_by_json(&self, json: &Json) -> Result<GroupBySpec, Error> {
        let query = GroupBy::from_json(&self.client.registry, self.entity, json)?;

        self.group_by(&query)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{ErrorClass, ErrorOrigin},
        test_fixtures::{USER, fixture_registry, fixture_source},
    };
    use serde_json::json;

    struct UserKind;

    impl EntityKind for UserKind {
        const MODEL: &'static EntityModel = &USER;
    }

    fn client() -> Client {
        Client::new(fixture_registry(), FilterConfig::default()).unwrap()
    }

    #[test]
    fn repository_by_name_and_by_kind_agree() {
        let client = client();

        let by_name = client.repository("User").unwrap();
        let by_kind = client.repository_for::<UserKind>().unwrap();

        assert_eq!(by_name.entity().name, by_kind.entity().name);
    }

    #[test]
    fn unknown_repository_is_a_validation_error() {
        let err = client().repository("Nope").unwrap_err();

        assert_eq!(err.class, ErrorClass::Validation);
        assert_eq!(err.origin, ErrorOrigin::Compile);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = FilterConfig {
            max_take: 0,
            ..FilterConfig::default()
        };

        let err = Client::new(fixture_registry(), config).unwrap_err();
        assert_eq!(err.origin, ErrorOrigin::Config);
    }

    #[test]
    fn json_find_many_compiles_and_executes() {
        let client = client();
        let users = client.repository("User").unwrap();

        let spec = users
            .find_many_json(&json!({
                "where": { "age": { "gte": 18 } },
                "orderBy": { "name": "desc" },
                "select": { "name": true },
            }))
            .unwrap();
        let rows = spec.execute(&fixture_source()).unwrap();

        let names = rows
            .iter()
            .map(|row| row.get("name").cloned())
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![Some("Linus".into()), Some("Ada".into())],
        );
        assert!(rows[0].get("age").is_none());
    }

    #[test]
    fn compile_where_reports_unknown_field() {
        let users = client();
        let users = users.repository("User").unwrap();

        let err = users.compile_where(&json!({ "shoeSize": 42 })).unwrap_err();
        assert!(err.is_validation());
        assert!(err.message.contains("shoeSize"));
    }
}
