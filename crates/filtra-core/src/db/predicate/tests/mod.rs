mod validate;

use crate::{
    config::FilterConfig,
    db::{
        filter::Filter,
        predicate::{Predicate, ValidateError, compile},
        source::{Document, MemorySource},
    },
    model::EntityModel,
    test_fixtures::fixture_registry,
};

fn compile_for(entity: &'static EntityModel, filter: &Filter) -> Result<Predicate, ValidateError> {
    compile(&fixture_registry(), entity, filter, &FilterConfig::default())
}

/// Records of `entity` in `source` accepted by `predicate`.
fn matching<'a>(predicate: &Predicate, source: &'a MemorySource, entity: &str) -> Vec<&'a Document> {
    source
        .collection(entity)
        .unwrap_or_default()
        .iter()
        .filter(|doc| predicate.evaluate(*doc, source))
        .collect()
}

fn names(docs: &[&Document]) -> Vec<String> {
    docs.iter()
        .filter_map(|doc| doc.get("name").or_else(|| doc.get("title")))
        .filter_map(|value| value.as_text().map(str::to_string))
        .collect()
}
