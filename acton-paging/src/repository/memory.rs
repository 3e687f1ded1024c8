//! In-memory find-and-count store over JSON rows
//!
//! [`MemoryStore`] holds named models as lists of JSON objects plus the
//! associations between them. [`MemoryModel`] evaluates a [`FindOptions`]
//! record against one model the way a relational ORM would: filter, join
//! included models, count, order, slice, project.
//!
//! Supported where-clause operators are those of [`FilterOperator`], plus the
//! top-level combinators `$and`, `$or` (arrays of conditions) and `$not`
//! (one condition). Any other top-level `$` key is rejected. Ordering
//! is stable; in ascending order `null` sorts first, then booleans, numbers
//! and strings.
//!
//! # Example
//!
//! ```rust
//! use acton_paging::paging::PagingBuilder;
//! use acton_paging::repository::MemoryStore;
//! use serde_json::json;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = MemoryStore::new();
//! store
//!     .define("Task", (1..=7).map(|id| json!({"id": id, "name": format!("Task {id}")})))
//!     .await;
//!
//! let mut paging = PagingBuilder::new(store.model("Task"));
//! paging.set_page(2).set_size(5);
//!
//! let envelope = paging.execute().await.unwrap();
//! assert_eq!(envelope.total_items, 7);
//! assert_eq!(envelope.rows.len(), 2);
//! assert_eq!(envelope.total_pages, 2);
//! # });
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Number, Value};
use tokio::sync::RwLock;

use super::error::{RepositoryError, RepositoryOperation};
use super::pagination::{FilterOperator, OrderDirection};
use super::traits::{FetchResult, FindAndCount, FindOptions, RepositoryResult};
use crate::paging::{leaves, Condition, IncludeSpec, OrderSpec, Projection};

/// Column joined against foreign keys
const PRIMARY_KEY: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssociationKind {
    /// Source rows own many target rows through `target.foreign_key`
    HasMany,
    /// Source rows point at one target row through `source.foreign_key`
    BelongsTo,
}

#[derive(Debug, Clone)]
struct Association {
    source: String,
    target: String,
    kind: AssociationKind,
    foreign_key: String,
    alias: String,
}

#[derive(Debug, Default)]
struct State {
    models: HashMap<String, Vec<Value>>,
    associations: Vec<Association>,
}

impl State {
    fn rows(&self, model: &str) -> RepositoryResult<&[Value]> {
        self.models
            .get(model)
            .map(Vec::as_slice)
            .ok_or_else(|| RepositoryError::unknown_model(model))
    }

    fn association(&self, source: &str, target: &str) -> RepositoryResult<&Association> {
        self.associations
            .iter()
            .find(|a| a.source == source && a.target == target)
            .ok_or_else(|| {
                RepositoryError::invalid_query(
                    RepositoryOperation::Include,
                    format!("`{target}` is not associated to `{source}`"),
                )
                .with_model(target)
            })
    }

    /// Attach every included model to `row`; `false` drops the row
    fn attach(&self, model: &str, row: &mut Value, includes: &[&IncludeSpec]) -> RepositoryResult<bool> {
        for spec in includes {
            let association = self.association(model, &spec.model)?;
            let targets = self.rows(&spec.model)?;
            let nested = leaves(&spec.include);
            let projection = Projection::from(spec.attributes.clone());
            let keep_keys = self.attached_keys(&spec.model, &nested)?;

            let attached = match association.kind {
                AssociationKind::HasMany => {
                    let key = field(row, PRIMARY_KEY);
                    let mut children = Vec::new();
                    if !key.is_null() {
                        for target in targets {
                            if !values_equal(field(target, &association.foreign_key), key) {
                                continue;
                            }
                            let mut child = target.clone();
                            if self.attach(&spec.model, &mut child, &nested)? {
                                children.push(project(child, &projection, &keep_keys));
                            }
                        }
                    }
                    if spec.required && children.is_empty() {
                        return Ok(false);
                    }
                    Value::Array(children)
                }
                AssociationKind::BelongsTo => {
                    let key = field(row, &association.foreign_key);
                    let mut parent = None;
                    if !key.is_null() {
                        if let Some(target) = targets.iter().find(|t| values_equal(field(t, PRIMARY_KEY), key)) {
                            let mut target = target.clone();
                            if self.attach(&spec.model, &mut target, &nested)? {
                                parent = Some(project(target, &projection, &keep_keys));
                            }
                        }
                    }
                    match parent {
                        Some(parent) => parent,
                        None if spec.required => return Ok(false),
                        None => Value::Null,
                    }
                }
            };

            if let Value::Object(object) = row {
                object.insert(alias_for(association, spec), attached);
            }
        }
        Ok(true)
    }

    /// Keys the includes attach to a `model` row; these survive projection
    fn attached_keys(&self, model: &str, includes: &[&IncludeSpec]) -> RepositoryResult<Vec<String>> {
        includes
            .iter()
            .map(|spec| {
                self.association(model, &spec.model)
                    .map(|association| alias_for(association, spec))
            })
            .collect()
    }
}

/// Shared in-memory data store
///
/// Cloning is cheap; clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or replace) a model and its rows
    pub async fn define(&self, model: impl Into<String>, rows: impl IntoIterator<Item = Value>) {
        let model = model.into();
        let rows: Vec<Value> = rows.into_iter().collect();
        tracing::debug!(model = %model, rows = rows.len(), "Defining in-memory model");
        self.state.write().await.models.insert(model, rows);
    }

    /// Append a row to a model, defining the model if needed
    pub async fn insert(&self, model: &str, row: Value) {
        self.state
            .write()
            .await
            .models
            .entry(model.to_string())
            .or_default()
            .push(row);
    }

    /// Declare that each `parent` row owns the `child` rows whose
    /// `foreign_key` equals the parent's `id`
    ///
    /// Included children are attached under `"{child}s"` unless the include
    /// names an alias.
    pub async fn has_many(&self, parent: &str, child: &str, foreign_key: &str) {
        self.associate(parent, child, AssociationKind::HasMany, foreign_key, format!("{child}s"))
            .await;
    }

    /// Declare that each `child` row points at the `parent` row whose `id`
    /// equals the child's `foreign_key`
    ///
    /// The included parent is attached under `"{parent}"` unless the include
    /// names an alias.
    pub async fn belongs_to(&self, child: &str, parent: &str, foreign_key: &str) {
        self.associate(child, parent, AssociationKind::BelongsTo, foreign_key, parent.to_string())
            .await;
    }

    async fn associate(
        &self,
        source: &str,
        target: &str,
        kind: AssociationKind,
        foreign_key: &str,
        alias: String,
    ) {
        let mut state = self.state.write().await;
        state
            .associations
            .retain(|a| !(a.source == source && a.target == target));
        state.associations.push(Association {
            source: source.to_string(),
            target: target.to_string(),
            kind,
            foreign_key: foreign_key.to_string(),
            alias,
        });
    }

    /// Handle to one model; the model only needs to exist when queried
    pub fn model(&self, name: impl Into<String>) -> MemoryModel {
        MemoryModel {
            name: name.into(),
            state: Arc::clone(&self.state),
        }
    }
}

/// One model of a [`MemoryStore`]
#[derive(Debug, Clone)]
pub struct MemoryModel {
    name: String,
    state: Arc<RwLock<State>>,
}

impl MemoryModel {
    /// Model name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FindAndCount<Value> for MemoryModel {
    async fn find_and_count_all(&self, options: &FindOptions) -> RepositoryResult<FetchResult<Value>> {
        let state = self.state.read().await;
        let includes = leaves(&options.include);

        let mut matched = Vec::new();
        for row in state.rows(&self.name)? {
            if let Some(condition) = &options.where_clause {
                if !matches(row, condition).map_err(|e| e.with_model(self.name.as_str()))? {
                    continue;
                }
            }
            let mut row = row.clone();
            if state.attach(&self.name, &mut row, &includes)? {
                matched.push(row);
            }
        }

        let count = matched.len() as u64;
        if let Some(order) = &options.order {
            sort_rows(&mut matched, order);
        }

        let keep_keys = state.attached_keys(&self.name, &includes)?;
        let rows: Vec<Value> = matched
            .into_iter()
            .skip(usize::try_from(options.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(options.limit).unwrap_or(usize::MAX))
            .map(|row| project(row, &options.attributes, &keep_keys))
            .collect();

        tracing::debug!(model = %self.name, count, returned = rows.len(), "find_and_count_all");
        Ok(FetchResult::new(rows, count))
    }
}

fn alias_for(association: &Association, spec: &IncludeSpec) -> String {
    spec.alias.clone().unwrap_or_else(|| association.alias.clone())
}

fn field<'a>(row: &'a Value, name: &str) -> &'a Value {
    row.get(name).unwrap_or(&Value::Null)
}

fn project(row: Value, projection: &Projection, keep: &[String]) -> Value {
    match row {
        Value::Object(object) => Value::Object(
            object
                .into_iter()
                .filter(|(key, _)| projection.includes(key) || keep.contains(key))
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}

fn matches(row: &Value, condition: &Condition) -> RepositoryResult<bool> {
    for (name, constraint) in condition.iter() {
        if name.starts_with('$') {
            if !matches_logical(row, name, constraint)? {
                return Ok(false);
            }
            continue;
        }

        let value = field(row, name);
        let satisfied = match constraint {
            Value::Object(ops) if !ops.is_empty() && ops.keys().all(|k| k.starts_with('$')) => {
                let mut all = true;
                for (key, operand) in ops {
                    let operator = FilterOperator::from_key(key).ok_or_else(|| {
                        RepositoryError::invalid_query(
                            RepositoryOperation::Filter,
                            format!("unsupported operator `{key}` on `{name}`"),
                        )
                    })?;
                    all &= evaluate(operator, value, operand, name)?;
                }
                all
            }
            expected => values_equal(value, expected),
        };
        if !satisfied {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Top-level `$and`, `$or` and `$not` combinators
fn matches_logical(row: &Value, key: &str, operand: &Value) -> RepositoryResult<bool> {
    let invalid = |message: String| RepositoryError::invalid_query(RepositoryOperation::Filter, message);
    let branches = || -> RepositoryResult<Vec<Condition>> {
        operand
            .as_array()
            .ok_or_else(|| invalid(format!("`{key}` expects an array of conditions")))?
            .iter()
            .map(|branch| {
                Condition::from_value(branch)
                    .map_err(|_| invalid(format!("`{key}` expects an array of conditions")))
            })
            .collect()
    };

    match key {
        "$and" => {
            for branch in branches()? {
                if !matches(row, &branch)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        "$or" => {
            for branch in branches()? {
                if matches(row, &branch)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        "$not" => {
            let inner = Condition::from_value(operand)
                .map_err(|_| invalid("`$not` expects a condition object".to_string()))?;
            Ok(!matches(row, &inner)?)
        }
        other => Err(invalid(format!("unsupported operator `{other}`"))),
    }
}

fn evaluate(operator: FilterOperator, value: &Value, operand: &Value, name: &str) -> RepositoryResult<bool> {
    let invalid = |expected: &str| {
        RepositoryError::invalid_query(
            RepositoryOperation::Filter,
            format!("`{}` on `{name}` expects {expected}", operator.key()),
        )
    };

    Ok(match operator {
        FilterOperator::Equal => values_equal(value, operand),
        FilterOperator::NotEqual => !values_equal(value, operand),
        FilterOperator::GreaterThan => compare_scalars(value, operand) == Some(Ordering::Greater),
        FilterOperator::GreaterThanOrEqual => {
            matches!(compare_scalars(value, operand), Some(Ordering::Greater | Ordering::Equal))
        }
        FilterOperator::LessThan => compare_scalars(value, operand) == Some(Ordering::Less),
        FilterOperator::LessThanOrEqual => {
            matches!(compare_scalars(value, operand), Some(Ordering::Less | Ordering::Equal))
        }
        FilterOperator::Like => {
            let pattern = operand.as_str().ok_or_else(|| invalid("a string pattern"))?;
            value.as_str().is_some_and(|text| like(pattern, text))
        }
        FilterOperator::In => operand
            .as_array()
            .ok_or_else(|| invalid("an array of values"))?
            .iter()
            .any(|candidate| values_equal(value, candidate)),
        FilterOperator::Is => match operand {
            Value::Null => value.is_null(),
            Value::Bool(expected) => value.as_bool() == Some(*expected),
            _ => return Err(invalid("null or a boolean")),
        },
    })
}

/// Equality with numbers compared by value (`1` equals `1.0`)
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y) == Some(Ordering::Equal),
        _ => a == b,
    }
}

/// Integers compare exactly; floats fall back to `f64`
fn compare_numbers(x: &Number, y: &Number) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
        return Some(x.cmp(&y));
    }
    x.as_f64()?.partial_cmp(&y.as_f64()?)
}

/// Ordering between two numbers or two strings; anything else is incomparable
fn compare_scalars(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order used for sorting
fn sort_key_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(_), Value::Number(_)) | (Value::String(_), Value::String(_)) => {
            compare_scalars(a, b).unwrap_or(Ordering::Equal)
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn sort_rows(rows: &mut [Value], order: &OrderSpec) {
    rows.sort_by(|a, b| {
        order
            .iter()
            .map(|item| {
                let ordering = sort_key_cmp(field(a, &item.column), field(b, &item.column));
                match item.direction {
                    OrderDirection::Ascending => ordering,
                    OrderDirection::Descending => ordering.reverse(),
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

/// SQL `LIKE`: `%` matches any run of characters, `_` exactly one
fn like(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    // matched[j]: pattern prefix processed so far matches text[..j]
    let mut matched = vec![false; text.len() + 1];
    matched[0] = true;
    for p in &pattern {
        let mut next = vec![false; text.len() + 1];
        match p {
            '%' => {
                let mut any = false;
                for j in 0..=text.len() {
                    any |= matched[j];
                    next[j] = any;
                }
            }
            '_' => {
                for j in 1..=text.len() {
                    next[j] = matched[j - 1];
                }
            }
            c => {
                for j in 1..=text.len() {
                    next[j] = matched[j - 1] && text[j - 1] == *c;
                }
            }
        }
        matched = next;
    }
    matched[text.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::{Include, PagingBuilder, PagingError, TransformError};
    use crate::repository::RepositoryErrorKind;
    use serde_json::json;

    /// Ten `TestModel` rows owned by two of ten `RELModel` rows
    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .define(
                "TestModel",
                (1..=10).map(|id| {
                    json!({"id": id, "name": format!("Test {id}"), "rel_id": if id <= 6 { 1 } else { 2 }})
                }),
            )
            .await;
        store
            .define(
                "RELModel",
                (1..=10).map(|id| json!({"id": id, "name": format!("REL {id}")})),
            )
            .await;
        store.has_many("RELModel", "TestModel", "rel_id").await;
        store.belongs_to("TestModel", "RELModel", "rel_id").await;
        store
    }

    fn names(rows: &[Value]) -> Vec<&str> {
        rows.iter().filter_map(|r| r["name"].as_str()).collect()
    }

    #[test]
    fn test_like() {
        assert!(like("Test%", "Test 10"));
        assert!(like("%1%", "Test 10"));
        assert!(like("Test _", "Test 1"));
        assert!(!like("Test _", "Test 10"));
        assert!(like("%", ""));
        assert!(!like("_", ""));
        assert!(like("T%t%1", "Test 1"));
    }

    #[test]
    fn test_sort_key_order() {
        let mut values = vec![json!("b"), json!(2), Value::Null, json!(true), json!(1.5), json!("a")];
        values.sort_by(sort_key_cmp);
        assert_eq!(values, vec![Value::Null, json!(true), json!(1.5), json!(2), json!("a"), json!("b")]);
    }

    #[test]
    fn test_operators() {
        let row = json!({"age": 30, "name": "Ada", "active": true, "gone": null});
        let check = |condition: Condition| matches(&row, &condition).unwrap();

        assert!(check(Condition::eq("age", 30.0)));
        assert!(check(Condition::new().with_op("age", FilterOperator::NotEqual, 31)));
        assert!(check(Condition::new().with_op("age", FilterOperator::GreaterThan, 29)));
        assert!(!check(Condition::new().with_op("age", FilterOperator::LessThan, 30)));
        assert!(check(
            Condition::new()
                .with_op("age", FilterOperator::GreaterThanOrEqual, 30)
                .with_op("age", FilterOperator::LessThanOrEqual, 30)
        ));
        assert!(check(Condition::new().with_op("name", FilterOperator::Like, "A%")));
        assert!(check(Condition::new().with_op("age", FilterOperator::In, json!([1, 30]))));
        assert!(check(Condition::new().with_op("gone", FilterOperator::Is, Value::Null)));
        assert!(check(Condition::new().with_op("missing", FilterOperator::Is, Value::Null)));
        assert!(check(Condition::new().with_op("active", FilterOperator::Is, true)));
        assert!(!check(Condition::new().with_op("name", FilterOperator::GreaterThan, 3)));
        assert!(check(Condition::new()));
    }

    #[test]
    fn test_bad_operators_are_invalid_queries() {
        let row = json!({"age": 30});
        for condition in [
            json!({"age": {"$between": [1, 2]}}),
            json!({"age": {"$in": 30}}),
            json!({"age": {"$like": 3}}),
            json!({"age": {"$is": "yes"}}),
        ] {
            let condition = Condition::from_value(&condition).unwrap();
            let error = matches(&row, &condition).unwrap_err();
            assert_eq!(error.kind, RepositoryErrorKind::InvalidQuery);
            assert_eq!(error.operation, RepositoryOperation::Filter);
        }
    }

    #[test]
    fn test_logical_combinators() {
        let row = json!({"name": "Test 2", "rel_id": 1});
        let check = |condition: Value| matches(&row, &Condition::from_value(&condition).unwrap()).unwrap();

        assert!(check(json!({"$or": [{"name": "Test 1"}, {"name": "Test 2"}]})));
        assert!(!check(json!({"$or": [{"name": "Test 1"}, {"name": "Test 3"}]})));
        assert!(check(json!({"$and": [{"name": "Test 2"}, {"rel_id": {"$lt": 2}}]})));
        assert!(!check(json!({"$and": [{"name": "Test 2"}, {"rel_id": 2}]})));
        assert!(check(json!({"$not": {"name": "Test 1"}})));
        assert!(!check(json!({"$or": []})));
        assert!(check(json!({"$and": []})));
        assert!(check(json!({"rel_id": 1, "$or": [{"name": "Test 2"}]})));
    }

    #[test]
    fn test_unknown_or_malformed_top_level_operators_are_rejected() {
        let row = json!({"name": "Test 2"});
        for condition in [
            json!({"$xor": [{"name": "Test 2"}]}),
            json!({"$or": {"name": "Test 2"}}),
            json!({"$or": ["Test 2"]}),
            json!({"$not": ["Test 2"]}),
        ] {
            let condition = Condition::from_value(&condition).unwrap();
            let error = matches(&row, &condition).unwrap_err();
            assert_eq!(error.kind, RepositoryErrorKind::InvalidQuery);
            assert_eq!(error.operation, RepositoryOperation::Filter);
        }
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        let row = json!({"id": 9_007_199_254_740_993_u64});
        assert!(matches(&row, &Condition::eq("id", 9_007_199_254_740_993_u64)).unwrap());
        assert!(!matches(&row, &Condition::eq("id", 9_007_199_254_740_992_u64)).unwrap());
        assert!(matches(
            &row,
            &Condition::new().with_op("id", FilterOperator::GreaterThan, 9_007_199_254_740_992_u64)
        )
        .unwrap());
        assert!(matches(&json!({"n": -1}), &Condition::new().with_op("n", FilterOperator::LessThan, u64::MAX)).unwrap());
        assert!(matches(&json!({"n": 2}), &Condition::eq("n", 2.0)).unwrap());
    }

    #[tokio::test]
    async fn test_paging_with_or_condition() {
        let store = seeded_store().await;
        let mut paging = PagingBuilder::new(store.model("TestModel"));
        paging
            .set_condition_value(&json!({"$or": [{"name": "Test 1"}, {"name": "Test 2"}]}))
            .unwrap();

        let envelope = paging.execute().await.unwrap();
        assert_eq!(envelope.total_items, 2);
        assert_eq!(names(&envelope.rows), ["Test 1", "Test 2"]);
    }

    #[tokio::test]
    async fn test_large_ids_do_not_collide() {
        let store = MemoryStore::new();
        store
            .define(
                "Big",
                [
                    json!({"id": 9_007_199_254_740_993_u64}),
                    json!({"id": 9_007_199_254_740_992_u64}),
                ],
            )
            .await;
        let options = FindOptions {
            where_clause: Some(Condition::eq("id", 9_007_199_254_740_993_u64)),
            ..FindOptions::default()
        };
        let result = store.model("Big").find_and_count_all(&options).await.unwrap();
        assert_eq!(result.count, 1);
    }

    #[test]
    fn test_object_without_operators_is_equality() {
        let row = json!({"meta": {"a": 1}});
        assert!(matches(&row, &Condition::eq("meta", json!({"a": 1}))).unwrap());
    }

    #[tokio::test]
    async fn test_count_ignores_limit() {
        let store = seeded_store().await;
        let options = FindOptions {
            limit: 3,
            offset: 8,
            ..FindOptions::default()
        };
        let result = store.model("TestModel").find_and_count_all(&options).await.unwrap();
        assert_eq!(result.count, 10);
        assert_eq!(names(&result.rows), ["Test 9", "Test 10"]);
    }

    #[tokio::test]
    async fn test_unknown_model() {
        let store = seeded_store().await;
        let error = store
            .model("Nope")
            .find_and_count_all(&FindOptions::default())
            .await
            .unwrap_err();
        assert_eq!(error.kind, RepositoryErrorKind::UnknownModel);
        assert_eq!(error.model.as_deref(), Some("Nope"));
    }

    #[tokio::test]
    async fn test_projection() {
        let store = seeded_store().await;
        let options = FindOptions {
            attributes: Projection::Only(vec!["name".into()]),
            ..FindOptions::default()
        };
        let result = store.model("TestModel").find_and_count_all(&options).await.unwrap();
        assert_eq!(result.rows[0], json!({"name": "Test 1"}));

        let options = FindOptions {
            attributes: Projection::All {
                exclude: vec!["rel_id".into()],
            },
            ..FindOptions::default()
        };
        let result = store.model("TestModel").find_and_count_all(&options).await.unwrap();
        assert_eq!(result.rows[0], json!({"id": 1, "name": "Test 1"}));
    }

    #[tokio::test]
    async fn test_multi_column_order_is_stable() {
        let store = MemoryStore::new();
        store
            .define(
                "Row",
                [
                    json!({"id": 1, "group": "b", "rank": 2}),
                    json!({"id": 2, "group": "a", "rank": 2}),
                    json!({"id": 3, "group": "a", "rank": 1}),
                    json!({"id": 4, "group": null, "rank": 9}),
                    json!({"id": 5, "group": "a", "rank": 1}),
                ],
            )
            .await;
        let options = FindOptions {
            order: Some(OrderSpec::new().asc("group").desc("rank")),
            ..FindOptions::default()
        };
        let result = store.model("Row").find_and_count_all(&options).await.unwrap();
        let ids: Vec<_> = result.rows.iter().map(|r| r["id"].as_u64().unwrap()).collect();
        assert_eq!(ids, [4, 2, 3, 5, 1]);
    }

    #[tokio::test]
    async fn test_has_many_include() {
        let store = seeded_store().await;
        let options = FindOptions {
            include: vec![Include::model("TestModel")],
            ..FindOptions::default()
        };
        let result = store.model("RELModel").find_and_count_all(&options).await.unwrap();
        assert_eq!(result.count, 10);
        assert_eq!(result.rows[0]["TestModels"].as_array().unwrap().len(), 6);
        assert_eq!(result.rows[2]["TestModels"], json!([]));
    }

    #[tokio::test]
    async fn test_required_include_filters_parents() {
        let store = seeded_store().await;
        let options = FindOptions {
            include: vec![IncludeSpec::new("TestModel")
                .alias("tests")
                .attributes(["name"])
                .required(true)
                .into()],
            ..FindOptions::default()
        };
        let result = store.model("RELModel").find_and_count_all(&options).await.unwrap();
        assert_eq!(result.count, 2);
        assert_eq!(result.rows[1]["tests"][0], json!({"name": "Test 7"}));
    }

    #[tokio::test]
    async fn test_belongs_to_include_and_alias_survives_projection() {
        let store = seeded_store().await;
        let options = FindOptions {
            attributes: Projection::Only(vec!["name".into()]),
            include: vec![IncludeSpec::new("RELModel").alias("owner").attributes(["name"]).into()],
            limit: 10,
            ..FindOptions::default()
        };
        let result = store.model("TestModel").find_and_count_all(&options).await.unwrap();
        assert_eq!(
            result.rows[6],
            json!({"name": "Test 7", "owner": {"name": "REL 2"}})
        );
    }

    #[tokio::test]
    async fn test_nested_include() {
        let store = seeded_store().await;
        let options = FindOptions {
            limit: 1,
            include: vec![IncludeSpec::new("TestModel")
                .include(IncludeSpec::new("RELModel").alias("back").into())
                .into()],
            ..FindOptions::default()
        };
        let result = store.model("RELModel").find_and_count_all(&options).await.unwrap();
        assert_eq!(result.rows[0]["TestModels"][0]["back"]["name"], "REL 1");
    }

    #[tokio::test]
    async fn test_unassociated_include() {
        let store = seeded_store().await;
        store.define("Other", []).await;
        let options = FindOptions {
            include: vec![Include::model("Other")],
            ..FindOptions::default()
        };
        let error = store.model("TestModel").find_and_count_all(&options).await.unwrap_err();
        assert_eq!(error.kind, RepositoryErrorKind::InvalidQuery);
        assert_eq!(error.operation, RepositoryOperation::Include);
    }

    #[tokio::test]
    async fn test_insert_is_visible_to_models() {
        let store = MemoryStore::new();
        let model = store.model("Late");
        store.insert("Late", json!({"id": 1})).await;
        let result = model.find_and_count_all(&FindOptions::default()).await.unwrap();
        assert_eq!(result.count, 1);
        assert_eq!(model.name(), "Late");
    }

    // End-to-end paging against the seeded store

    #[tokio::test]
    async fn test_paging_first_page() {
        let store = seeded_store().await;
        let mut paging = PagingBuilder::new(store.model("TestModel"));
        paging.set_page(1).set_size(5);

        let envelope = paging.execute().await.unwrap();
        assert_eq!(envelope.total_items, 10);
        assert_eq!(envelope.rows.len(), 5);
        assert_eq!(envelope.total_pages, 2);
        assert_eq!(envelope.current_page, 1);
        assert_eq!(envelope.size, 5);
    }

    #[tokio::test]
    async fn test_paging_with_condition() {
        let store = seeded_store().await;
        let mut paging = PagingBuilder::new(store.model("TestModel"));
        paging.set_condition_value(&json!({"name": "Test 1"})).unwrap();

        let envelope = paging.execute().await.unwrap();
        assert_eq!(envelope.total_items, 1);
        assert_eq!(envelope.rows.len(), 1);
        assert_eq!(envelope.rows[0]["name"], "Test 1");
        assert_eq!(envelope.total_pages, 1);
    }

    #[tokio::test]
    async fn test_paging_descending_order() {
        let store = seeded_store().await;
        let mut paging = PagingBuilder::new(store.model("TestModel"));
        paging.set_order_by_value(&json!([["name", "DESC"]])).unwrap();

        let envelope = paging.execute().await.unwrap();
        assert_eq!(envelope.rows[0]["name"], "Test 9");
    }

    #[tokio::test]
    async fn test_paging_attributes() {
        let store = seeded_store().await;
        let mut paging = PagingBuilder::new(store.model("TestModel"));
        paging.set_attributes(["id"]);

        let envelope = paging.execute().await.unwrap();
        assert!(envelope.rows.iter().all(|row| row.as_object().unwrap().len() == 1));
    }

    #[tokio::test]
    async fn test_paging_associations() {
        let store = seeded_store().await;
        let mut paging = PagingBuilder::new(store.model("RELModel"));
        paging.set_associations_value(&json!([{"model": "TestModel"}])).unwrap();

        let envelope = paging.execute().await.unwrap();
        let counts: HashMap<u64, usize> = envelope
            .rows
            .iter()
            .map(|row| {
                (
                    row["id"].as_u64().unwrap(),
                    row["TestModels"].as_array().unwrap().len(),
                )
            })
            .collect();
        assert_eq!(counts, HashMap::from([(1, 6), (2, 4), (3, 0), (4, 0), (5, 0)]));
    }

    #[tokio::test]
    async fn test_paging_transform_marks_rows() {
        let store = seeded_store().await;
        let mut paging = PagingBuilder::new(store.model("TestModel"));
        paging.set_data_transform_fn(|mut result: FetchResult<Value>| {
            for row in &mut result.rows {
                row["transformed"] = Value::Bool(true);
            }
            Ok(result)
        });

        let envelope = paging.execute().await.unwrap();
        assert!(envelope.rows.iter().all(|row| row["transformed"] == true));
    }

    #[tokio::test]
    async fn test_paging_errors_propagate() {
        let store = seeded_store().await;
        let paging = PagingBuilder::new(store.model("Missing"));
        let error = paging.execute().await.unwrap_err();
        assert_eq!(error.as_fetch().map(|e| e.kind), Some(RepositoryErrorKind::UnknownModel));

        let mut paging = PagingBuilder::new(store.model("TestModel"));
        paging.set_data_transform_fn(|_| Err(TransformError::new("Transform error")));
        let error = paging.execute().await.unwrap_err();
        assert!(matches!(error, PagingError::Transform(_)));
        assert_eq!(error.to_string(), "Transform error");
    }

    #[tokio::test]
    async fn test_paging_past_last_page() {
        let store = seeded_store().await;
        let mut paging = PagingBuilder::new(store.model("TestModel"));
        paging.set_page(9);

        let envelope = paging.execute().await.unwrap();
        assert!(envelope.rows.is_empty());
        assert_eq!(envelope.total_items, 10);
        assert_eq!(envelope.current_page, 9);
    }
}
