//! Protobuf messages of the `rogue.services` API.
//!
//! Field numbers follow the service's published `queries.proto`.

use std::collections::HashMap;

/// Body shared by `Insert`, `Update`, and `Remove`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MutationRequest {
    #[prost(string, tag = "1")]
    pub api_key: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub messages: ::prost::alloc::vec::Vec<::prost_types::Any>,
}

/// `rogue.services.Insert`
pub type Insert = MutationRequest;
/// `rogue.services.Update`
pub type Update = MutationRequest;
/// `rogue.services.Remove`
pub type Remove = MutationRequest;

/// `rogue.services.Search`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Search {
    #[prost(string, tag = "1")]
    pub api_key: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub queries: ::prost::alloc::vec::Vec<Expression>,
}

/// `rogue.services.Expression`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Expression {
    #[prost(oneof = "expression::Kind", tags = "1")]
    pub kind: ::core::option::Option<expression::Kind>,
}

/// Nested types of [`Expression`].
pub mod expression {
    /// Expression variants.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Kind {
        #[prost(message, tag = "1")]
        Basic(super::Basic),
    }
}

/// `rogue.services.Basic`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Basic {
    #[prost(enumeration = "LogicalOperator", tag = "1")]
    pub logical_operator: i32,
    #[prost(enumeration = "ComparisonOperator", repeated, tag = "2")]
    pub comparisons: ::prost::alloc::vec::Vec<i32>,
    #[prost(uint32, repeated, tag = "3")]
    pub fields: ::prost::alloc::vec::Vec<u32>,
    #[prost(message, repeated, tag = "4")]
    pub operands: ::prost::alloc::vec::Vec<::prost_types::Any>,
}

/// `rogue.services.Subscribe`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Subscribe {
    #[prost(string, tag = "1")]
    pub api_key: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "2")]
    pub schemas: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

/// `rogue.services.Messages`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Messages {
    #[prost(message, repeated, tag = "1")]
    pub messages: ::prost::alloc::vec::Vec<::prost_types::Any>,
}

/// `rogue.services.Response`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Response {
    #[prost(map = "uint32, message", tag = "1")]
    pub results: HashMap<u32, Messages>,
    #[prost(uint32, repeated, tag = "2")]
    pub finished: ::prost::alloc::vec::Vec<u32>,
}

/// `rogue.services.LogicalOperator`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum LogicalOperator {
    And = 0,
    Or = 1,
}

/// `rogue.services.ComparisonOperator`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ComparisonOperator {
    GreaterEqual = 0,
    LesserEqual = 1,
    Greater = 2,
    Lesser = 3,
    Equal = 4,
    NotEqual = 5,
}
