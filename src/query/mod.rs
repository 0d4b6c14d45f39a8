//! Search-query construction.
//!
//! A search is an ordered list of [`ComparisonExpression`]s. Each expression
//! pairs one [`ComparisonOperator`] with one [`Operand`] and joins the pairs
//! with a single [`LogicalOperator`]. Without field ids the operands are
//! compared against the entity's declared index tuple; with field ids each
//! operand is compared against the field named at the same position.
//!
//! ```
//! use roguedb_client::query::{ComparisonExpression, ComparisonOperator, LogicalOperator, MatchMode, Operand};
//!
//! # fn main() -> roguedb_client::Result<()> {
//! // Test.attribute1 < 1 AND Test.attribute2 != 10
//! let expression = ComparisonExpression::builder(LogicalOperator::And)
//!     .compare_field(ComparisonOperator::Lesser, 1, Operand::of("rogue.services.Test").with("attribute1", 1))
//!     .compare_field(ComparisonOperator::NotEqual, 2, Operand::of("rogue.services.Test").with("attribute2", 10))
//!     .build()?;
//!
//! assert_eq!(expression.mode(), MatchMode::FieldScoped);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{Error, Result};

/// Positional assembly of streamed search results.
pub mod results;

pub use results::{SearchBatch, SearchResults};

/// Prefix of the type URL identifying an operand's schema type.
pub const TYPE_URL_PREFIX: &str = "type.googleapis.com/";

const TYPE_KEY: &str = "@type";

/// Connective joining the comparisons of one expression.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogicalOperator {
    /// Every comparison must hold.
    #[default]
    And,
    /// At least one comparison must hold.
    Or,
}

/// Comparison applied between a stored value and one operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonOperator {
    /// `>=`
    GreaterEqual,
    /// `<=`
    LesserEqual,
    /// `>`
    Greater,
    /// `<`
    Lesser,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
}

/// How operands are matched against a stored entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatchMode {
    /// Operands compare against the declared composite index, in order.
    IndexTuple,
    /// Operand *i* compares against the field id at position *i*.
    FieldScoped,
}

/// A typed record used as a comparison operand or a mutation message.
///
/// Serializes to the JSON form of a packed `Any`: an `@type` entry holding
/// the type URL, followed by the attribute values inline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Operand {
    #[serde(rename = "@type", with = "type_url")]
    type_name: String,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

impl Operand {
    /// Creates an operand of the fully-qualified schema type `type_name`
    /// (`package.Message`) with no attributes set.
    ///
    /// A leading `type.googleapis.com/` is accepted and stripped.
    pub fn of(type_name: impl Into<String>) -> Self {
        Self::new(type_name, Map::new())
    }

    /// Creates an operand from an existing attribute map.
    pub fn new(type_name: impl Into<String>, attributes: Map<String, Value>) -> Self {
        let type_name = type_name.into();
        let type_name = match type_name.strip_prefix(TYPE_URL_PREFIX) {
            Some(name) => name.to_string(),
            None => type_name,
        };
        Self {
            type_name,
            attributes,
        }
    }

    /// Sets one attribute, replacing any previous value.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Fully-qualified schema type name, e.g. `rogue.services.Test`.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Type URL as carried in `@type` and `Any.type_url`.
    pub fn type_url(&self) -> String {
        format!("{TYPE_URL_PREFIX}{}", self.type_name)
    }

    /// All attribute values set on this operand.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Value of a single attribute.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.type_name.is_empty() {
            return Err(Error::MalformedQuery(
                "Operand has no schema type name".to_string(),
            ));
        }

        if self.type_name.contains('/') {
            return Err(Error::MalformedQuery(format!(
                "Type name '{}' is neither a message name nor a {TYPE_URL_PREFIX} URL",
                self.type_name
            )));
        }

        if self.attributes.contains_key(TYPE_KEY) {
            return Err(Error::MalformedQuery(format!(
                "Attribute '{TYPE_KEY}' is reserved for the type URL"
            )));
        }

        Ok(())
    }
}

mod type_url {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TYPE_URL_PREFIX;

    pub fn serialize<S: Serializer>(type_name: &str, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{TYPE_URL_PREFIX}{type_name}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let url = String::deserialize(deserializer)?;
        let name = url.strip_prefix(TYPE_URL_PREFIX).unwrap_or(&url);
        if name.is_empty() || name.contains('/') {
            return Err(serde::de::Error::custom(format!(
                "type URL '{url}' is not {TYPE_URL_PREFIX}<message name>"
            )));
        }
        Ok(name.to_string())
    }
}

/// One validated query clause.
///
/// Constructed only through [`build_expression`] or
/// [`ComparisonExpression::builder`], so the operator, field, and operand
/// counts always agree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BasicWire", into = "BasicWire")]
pub struct ComparisonExpression {
    logical_operator: LogicalOperator,
    comparisons: Vec<ComparisonOperator>,
    fields: Vec<u32>,
    operands: Vec<Operand>,
    mode: MatchMode,
}

impl ComparisonExpression {
    /// Starts an expression joined by `logical_operator`.
    pub fn builder(logical_operator: LogicalOperator) -> ExpressionBuilder {
        ExpressionBuilder {
            logical_operator,
            comparisons: Vec::new(),
            fields: Vec::new(),
            operands: Vec::new(),
        }
    }

    /// Connective joining the comparisons.
    pub fn logical_operator(&self) -> LogicalOperator {
        self.logical_operator
    }

    /// Comparison operators, one per operand.
    pub fn comparisons(&self) -> &[ComparisonOperator] {
        &self.comparisons
    }

    /// Field ids; empty in index-tuple mode.
    pub fn fields(&self) -> &[u32] {
        &self.fields
    }

    /// Operands in comparison order.
    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    /// Matching mode chosen at construction.
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Number of comparisons in the clause.
    pub fn len(&self) -> usize {
        self.comparisons.len()
    }

    /// Always false for a constructed expression.
    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }
}

/// Incremental construction of a [`ComparisonExpression`].
///
/// Mixing [`compare`](Self::compare) and
/// [`compare_field`](Self::compare_field) in one expression leaves the field
/// list shorter than the operand list, which [`build`](Self::build) rejects.
#[derive(Clone, Debug)]
pub struct ExpressionBuilder {
    logical_operator: LogicalOperator,
    comparisons: Vec<ComparisonOperator>,
    fields: Vec<u32>,
    operands: Vec<Operand>,
}

impl ExpressionBuilder {
    /// Appends an index-tuple comparison.
    #[must_use]
    pub fn compare(mut self, comparison: ComparisonOperator, operand: Operand) -> Self {
        self.comparisons.push(comparison);
        self.operands.push(operand);
        self
    }

    /// Appends a comparison against the field with id `field`.
    #[must_use]
    pub fn compare_field(mut self, comparison: ComparisonOperator, field: u32, operand: Operand) -> Self {
        self.comparisons.push(comparison);
        self.fields.push(field);
        self.operands.push(operand);
        self
    }

    /// Validates and finishes the expression.
    ///
    /// # Errors
    /// See [`build_expression`].
    pub fn build(self) -> Result<ComparisonExpression> {
        build_expression(self.logical_operator, self.comparisons, self.operands, self.fields)
    }
}

/// Builds a validated expression.
///
/// An empty `fields` selects [`MatchMode::IndexTuple`]; otherwise the
/// expression is [`MatchMode::FieldScoped`] and `fields[i]` names the field
/// compared with `operands[i]`.
///
/// # Errors
/// Returns [`Error::MalformedQuery`] if the expression has no comparisons, if
/// the operator and operand counts differ, if a non-empty field list differs
/// in length from the operands, or if an operand has no type name.
pub fn build_expression(
    logical_operator: LogicalOperator,
    comparisons: Vec<ComparisonOperator>,
    operands: Vec<Operand>,
    fields: Vec<u32>,
) -> Result<ComparisonExpression> {
    if comparisons.is_empty() {
        return Err(Error::MalformedQuery(
            "Expression needs at least one comparison".to_string(),
        ));
    }

    if comparisons.len() != operands.len() {
        return Err(Error::MalformedQuery(format!(
            "{} comparison operators for {} operands",
            comparisons.len(),
            operands.len()
        )));
    }

    if !fields.is_empty() && fields.len() != operands.len() {
        return Err(Error::MalformedQuery(format!(
            "{} fields for {} operands",
            fields.len(),
            operands.len()
        )));
    }

    for operand in &operands {
        operand.validate()?;
    }

    let mode = if fields.is_empty() {
        MatchMode::IndexTuple
    } else {
        MatchMode::FieldScoped
    };

    debug!(comparisons = comparisons.len(), ?mode, "Built comparison expression");

    Ok(ComparisonExpression {
        logical_operator,
        comparisons,
        fields,
        operands,
        mode,
    })
}

#[derive(Clone, Serialize, Deserialize)]
struct BasicWire {
    #[serde(default)]
    logical_operator: LogicalOperator,
    comparisons: Vec<ComparisonOperator>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    fields: Vec<u32>,
    operands: Vec<Operand>,
}

impl TryFrom<BasicWire> for ComparisonExpression {
    type Error = Error;

    fn try_from(wire: BasicWire) -> Result<Self> {
        build_expression(wire.logical_operator, wire.comparisons, wire.operands, wire.fields)
    }
}

impl From<ComparisonExpression> for BasicWire {
    fn from(expression: ComparisonExpression) -> Self {
        Self {
            logical_operator: expression.logical_operator,
            comparisons: expression.comparisons,
            fields: expression.fields,
            operands: expression.operands,
        }
    }
}

/// An ordered search request.
///
/// Result batches from the service name the position of the query they
/// answer, so the order of [`Query::expressions`] is part of the contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QueryWire", into = "QueryWire")]
pub struct Query {
    api_key: String,
    expressions: Vec<ComparisonExpression>,
}

impl Query {
    /// API key sent with the search.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Expressions in query-position order.
    pub fn expressions(&self) -> &[ComparisonExpression] {
        &self.expressions
    }

    /// Expression at query position `index`.
    pub fn get(&self, index: usize) -> Option<&ComparisonExpression> {
        self.expressions.get(index)
    }

    /// Number of queries.
    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    /// Always false for a composed query.
    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    /// Empty result collector sized for this query.
    pub fn collector<T>(&self) -> SearchResults<T> {
        SearchResults::new(self.expressions.len())
    }
}

/// Wraps expressions into a search, keeping the caller's order.
///
/// # Errors
/// - [`Error::InvalidArgument`] if `api_key` is empty.
/// - [`Error::MalformedQuery`] if there are no expressions.
pub fn compose_query(
    api_key: impl Into<String>,
    expressions: impl IntoIterator<Item = ComparisonExpression>,
) -> Result<Query> {
    let api_key = api_key.into();
    if api_key.is_empty() {
        return Err(Error::InvalidArgument("API key cannot be empty".to_string()));
    }

    let expressions: Vec<_> = expressions.into_iter().collect();
    if expressions.is_empty() {
        return Err(Error::MalformedQuery(
            "Search needs at least one query".to_string(),
        ));
    }

    debug!(queries = expressions.len(), "Composed search query");

    Ok(Query {
        api_key,
        expressions,
    })
}

#[derive(Clone, Serialize, Deserialize)]
struct QueryWire {
    api_key: String,
    queries: Vec<ExpressionWire>,
}

#[derive(Clone, Serialize, Deserialize)]
struct ExpressionWire {
    basic: ComparisonExpression,
}

impl TryFrom<QueryWire> for Query {
    type Error = Error;

    fn try_from(wire: QueryWire) -> Result<Self> {
        compose_query(wire.api_key, wire.queries.into_iter().map(|q| q.basic))
    }
}

impl From<Query> for QueryWire {
    fn from(query: Query) -> Self {
        Self {
            api_key: query.api_key,
            queries: query
                .expressions
                .into_iter()
                .map(|basic| ExpressionWire { basic })
                .collect(),
        }
    }
}
