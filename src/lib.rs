//! # RogueDB client core
//!
//! Building blocks for talking to a RogueDB deployment over gRPC or REST:
//!
//! - **Credentials**: load a [`ServiceAccount`] and [`issue`] short-lived
//!   RS256 bearer tokens for it.
//! - **Queries**: build validated [`ComparisonExpression`]s, compose them into
//!   an ordered [`Query`], and collect streamed results by query position
//!   with [`SearchResults`].
//! - **Writes and schemas**: [`build_mutation`] for insert, update, and
//!   remove; [`build_subscription`] for full-replacement schema changes.
//! - **Wire forms**: JSON request assembly in [`rest`] and protobuf messages
//!   plus a tonic bearer interceptor in `grpc` (feature `grpc`).
//!
//! Every builder is a synchronous, pure function. Sending requests, retrying,
//! and refreshing expired tokens are left to the caller.
//!
//! ## Example
//!
//! ```no_run
//! use roguedb_client::query::{ComparisonOperator, LogicalOperator, Operand};
//! use roguedb_client::rest::RestRequest;
//! use roguedb_client::{compose_query, issue, ComparisonExpression, ServiceAccount, DEFAULT_TTL_SECONDS};
//!
//! # fn main() -> roguedb_client::Result<()> {
//! let account = ServiceAccount::from_file("service_account.json")?;
//! let token = issue(&account, DEFAULT_TTL_SECONDS)?;
//!
//! // Test.attribute1 >= 1 AND Test.attribute1 <= 10
//! let expression = ComparisonExpression::builder(LogicalOperator::And)
//!     .compare(ComparisonOperator::GreaterEqual, Operand::of("rogue.services.Test").with("attribute1", 1))
//!     .compare(ComparisonOperator::LesserEqual, Operand::of("rogue.services.Test").with("attribute1", 10))
//!     .build()?;
//! let query = compose_query("YOUR_API_KEY", [expression])?;
//!
//! let request = RestRequest::search("https://c-example.roguedb.dev", &token, &query)?;
//! println!("{} {}", request.method, request.url);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Client configuration loading.
pub mod config;
/// Service accounts and bearer tokens.
pub mod credentials;
/// Error types.
pub mod error;
/// Insert, update, and remove requests.
pub mod mutation;
/// Search expressions and result collection.
pub mod query;
/// REST request assembly.
pub mod rest;
/// Schema subscriptions and schema-file discovery.
pub mod schema;

#[cfg(feature = "grpc")]
/// Protobuf messages and gRPC credential attachment.
pub mod grpc;

pub use config::ClientConfig;
pub use credentials::{audience_for, issue, Claims, ServiceAccount, SignedToken, DEFAULT_TTL_SECONDS};
pub use error::{Error, Result};
pub use mutation::{build_mutation, Mutation, MutationKind};
pub use query::{
    build_expression, compose_query, ComparisonExpression, ComparisonOperator, LogicalOperator,
    MatchMode, Operand, Query, SearchBatch, SearchResults,
};
pub use schema::{build_subscription, list_files, SchemaSet};
