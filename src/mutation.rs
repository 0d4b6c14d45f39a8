//! Insert, update, and remove requests.
//!
//! All three share one shape: an API key and a list of typed messages. The
//! service answers with a status only.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::query::Operand;
use crate::{Error, Result};

/// Which write the request performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    /// Store new entities.
    Insert,
    /// Replace stored entities matched by index.
    Update,
    /// Delete stored entities matched by index.
    Remove,
}

impl MutationKind {
    /// Lowercase name used in REST paths and RPC names.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Remove => "remove",
        }
    }
}

impl std::str::FromStr for MutationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "insert" => Ok(Self::Insert),
            "update" => Ok(Self::Update),
            "remove" => Ok(Self::Remove),
            other => Err(Error::InvalidArgument(format!(
                "Unknown mutation kind '{other}'"
            ))),
        }
    }
}

/// A validated write request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Mutation {
    #[serde(skip)]
    kind: MutationKind,
    api_key: String,
    messages: Vec<Operand>,
}

impl Mutation {
    /// Write performed.
    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    /// API key sent with the request.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Messages to write, in request order.
    pub fn messages(&self) -> &[Operand] {
        &self.messages
    }
}

/// Builds an insert, update, or remove request.
///
/// # Errors
/// - [`Error::InvalidArgument`] if `api_key` is empty.
/// - [`Error::MalformedQuery`] if there are no messages or a message has no
///   type name.
pub fn build_mutation(
    kind: MutationKind,
    api_key: impl Into<String>,
    messages: impl IntoIterator<Item = Operand>,
) -> Result<Mutation> {
    let api_key = api_key.into();
    if api_key.is_empty() {
        return Err(Error::InvalidArgument("API key cannot be empty".to_string()));
    }

    let messages: Vec<_> = messages.into_iter().collect();
    if messages.is_empty() {
        return Err(Error::MalformedQuery(format!(
            "{} needs at least one message",
            kind.as_str()
        )));
    }

    for message in &messages {
        message.validate()?;
    }

    debug!(kind = kind.as_str(), messages = messages.len(), "Built mutation");

    Ok(Mutation {
        kind,
        api_key,
        messages,
    })
}
