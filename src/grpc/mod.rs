//! Protobuf glue for the gRPC surface.
//!
//! Converts validated requests into `rogue.services` messages and streamed
//! responses back into [`SearchBatch`]es. Operands travel as
//! `google.protobuf.Any`; turning an [`Operand`] into the encoded bytes of its
//! schema type is delegated to an [`OperandEncoder`], since the message types
//! are generated from the caller's own `.proto` files.

use prost_types::Any;

use crate::mutation::Mutation;
use crate::query::{
    ComparisonExpression, ComparisonOperator, LogicalOperator, Operand, Query, SearchBatch,
};
use crate::schema::SchemaSet;
use crate::Result;

/// Bearer-credential attachment for tonic clients.
pub mod interceptor;
/// Wire messages.
#[allow(missing_docs)]
pub mod proto;

pub use interceptor::BearerInterceptor;

/// Encodes an operand as the protobuf bytes of its schema type.
pub trait OperandEncoder {
    /// Returns the encoded message for `operand`.
    ///
    /// # Errors
    /// Implementations report operands they cannot encode, typically as
    /// [`crate::Error::MalformedQuery`].
    fn encode(&self, operand: &Operand) -> Result<Vec<u8>>;
}

impl<F> OperandEncoder for F
where
    F: Fn(&Operand) -> Result<Vec<u8>>,
{
    fn encode(&self, operand: &Operand) -> Result<Vec<u8>> {
        self(operand)
    }
}

/// Packs an operand into an `Any` under its type URL.
pub fn pack<E: OperandEncoder + ?Sized>(operand: &Operand, encoder: &E) -> Result<Any> {
    Ok(Any {
        type_url: operand.type_url(),
        value: encoder.encode(operand)?,
    })
}

impl From<LogicalOperator> for proto::LogicalOperator {
    fn from(operator: LogicalOperator) -> Self {
        match operator {
            LogicalOperator::And => Self::And,
            LogicalOperator::Or => Self::Or,
        }
    }
}

impl From<ComparisonOperator> for proto::ComparisonOperator {
    fn from(operator: ComparisonOperator) -> Self {
        match operator {
            ComparisonOperator::GreaterEqual => Self::GreaterEqual,
            ComparisonOperator::LesserEqual => Self::LesserEqual,
            ComparisonOperator::Greater => Self::Greater,
            ComparisonOperator::Lesser => Self::Lesser,
            ComparisonOperator::Equal => Self::Equal,
            ComparisonOperator::NotEqual => Self::NotEqual,
        }
    }
}

/// Converts one expression to its `Basic` message.
///
/// # Errors
/// Propagates encoder failures.
pub fn basic<E: OperandEncoder + ?Sized>(
    expression: &ComparisonExpression,
    encoder: &E,
) -> Result<proto::Basic> {
    Ok(proto::Basic {
        logical_operator: proto::LogicalOperator::from(expression.logical_operator()) as i32,
        comparisons: expression
            .comparisons()
            .iter()
            .map(|&c| proto::ComparisonOperator::from(c) as i32)
            .collect(),
        fields: expression.fields().to_vec(),
        operands: expression
            .operands()
            .iter()
            .map(|operand| pack(operand, encoder))
            .collect::<Result<_>>()?,
    })
}

/// Converts a query to a `Search` message, keeping query positions.
///
/// # Errors
/// Propagates encoder failures.
pub fn search_request<E: OperandEncoder + ?Sized>(query: &Query, encoder: &E) -> Result<proto::Search> {
    let queries = query
        .expressions()
        .iter()
        .map(|expression| -> Result<proto::Expression> {
            Ok(proto::Expression {
                kind: Some(proto::expression::Kind::Basic(basic(expression, encoder)?)),
            })
        })
        .collect::<Result<_>>()?;

    Ok(proto::Search {
        api_key: query.api_key().to_string(),
        queries,
    })
}

/// Converts a mutation to its `Insert`, `Update`, or `Remove` body.
///
/// # Errors
/// Propagates encoder failures.
pub fn mutation_request<E: OperandEncoder + ?Sized>(
    mutation: &Mutation,
    encoder: &E,
) -> Result<proto::MutationRequest> {
    Ok(proto::MutationRequest {
        api_key: mutation.api_key().to_string(),
        messages: mutation
            .messages()
            .iter()
            .map(|message| pack(message, encoder))
            .collect::<Result<_>>()?,
    })
}

impl From<&SchemaSet> for proto::Subscribe {
    fn from(set: &SchemaSet) -> Self {
        Self {
            api_key: set.api_key().to_string(),
            schemas: set.schemas().to_vec(),
        }
    }
}

impl From<proto::Response> for SearchBatch<Any> {
    fn from(response: proto::Response) -> Self {
        Self {
            results: response
                .results
                .into_iter()
                .map(|(index, list)| (index, list.messages))
                .collect(),
            finished: response.finished,
        }
    }
}
