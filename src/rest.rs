//! JSON request assembly for the REST surface.
//!
//! Requests are produced as plain values (method, URL, headers, body) for
//! whichever HTTP client the caller uses; nothing here performs I/O.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::credentials::SignedToken;
use crate::mutation::{Mutation, MutationKind};
use crate::query::{Operand, Query, SearchBatch};
use crate::schema::SchemaSet;
use crate::Result;

/// HTTP method of a REST endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Uppercase method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// REST endpoints exposed by a RogueDB deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `POST /rest/insert`
    Insert,
    /// `PATCH /rest/update`
    Update,
    /// `DELETE /rest/remove`
    Remove,
    /// `GET /rest/search`
    Search,
    /// `POST /rest/subscribe`
    Subscribe,
}

impl Endpoint {
    /// Method the endpoint expects.
    pub fn method(self) -> Method {
        match self {
            Self::Insert | Self::Subscribe => Method::Post,
            Self::Update => Method::Patch,
            Self::Remove => Method::Delete,
            Self::Search => Method::Get,
        }
    }

    /// Path below the deployment's base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::Insert => "/rest/insert",
            Self::Update => "/rest/update",
            Self::Remove => "/rest/remove",
            Self::Search => "/rest/search",
            Self::Subscribe => "/rest/subscribe",
        }
    }
}

impl From<MutationKind> for Endpoint {
    fn from(kind: MutationKind) -> Self {
        match kind {
            MutationKind::Insert => Self::Insert,
            MutationKind::Update => Self::Update,
            MutationKind::Remove => Self::Remove,
        }
    }
}

/// A fully assembled REST call, ready to hand to an HTTP client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// JSON body.
    pub body: String,
}

impl RestRequest {
    /// Assembles a call to `endpoint` carrying `body` as JSON.
    ///
    /// `base_url` is the scheme and host, e.g. `https://c-example.roguedb.dev`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Json`] if the body cannot be serialized.
    pub fn new<B: Serialize>(
        base_url: &str,
        endpoint: Endpoint,
        token: &SignedToken,
        body: &B,
    ) -> Result<Self> {
        Ok(Self {
            method: endpoint.method(),
            url: format!("{}{}", base_url.trim_end_matches('/'), endpoint.path()),
            headers: vec![
                ("Authorization".to_string(), token.bearer()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body: serde_json::to_string(body)?,
        })
    }

    /// Insert, update, or remove call, routed by the mutation's kind.
    pub fn mutation(base_url: &str, token: &SignedToken, mutation: &Mutation) -> Result<Self> {
        Self::new(base_url, mutation.kind().into(), token, mutation)
    }

    /// Search call.
    pub fn search(base_url: &str, token: &SignedToken, query: &Query) -> Result<Self> {
        Self::new(base_url, Endpoint::Search, token, query)
    }

    /// Schema subscription call.
    pub fn subscribe(base_url: &str, token: &SignedToken, schemas: &SchemaSet) -> Result<Self> {
        Self::new(base_url, Endpoint::Subscribe, token, schemas)
    }

    /// Value of the header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Messages returned for one query position.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageList {
    /// Result messages.
    #[serde(default)]
    pub messages: Vec<Operand>,
}

/// JSON body of a search response.
///
/// `results` is keyed by the zero-based position of the query the messages
/// answer; `finished` lists positions that completed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Partial results by query position.
    #[serde(default)]
    pub results: BTreeMap<u32, MessageList>,
    /// Query positions that finished processing.
    #[serde(default)]
    pub finished: Vec<u32>,
}

impl SearchResponse {
    /// Parses a search response body.
    ///
    /// # Errors
    /// Returns [`crate::Error::Json`] if the body is not a search response.
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }
}

impl From<SearchResponse> for SearchBatch<Operand> {
    fn from(response: SearchResponse) -> Self {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_map_to_methods() {
        assert_eq!(Endpoint::Insert.method(), Method::Post);
        assert_eq!(Endpoint::Update.method(), Method::Patch);
        assert_eq!(Endpoint::Remove.method(), Method::Delete);
        assert_eq!(Endpoint::Search.method(), Method::Get);
        assert_eq!(Endpoint::Subscribe.method(), Method::Post);
        assert_eq!(Endpoint::from(MutationKind::Remove).path(), "/rest/remove");
    }

    #[test]
    fn parses_search_response() {
        let body = r#"{
            "results": {
                "1": { "messages": [{ "@type": "type.googleapis.com/rogue.services.Test", "attribute1": 4 }] }
            },
            "finished": [0, 1]
        }"#;

        let batch: SearchBatch<Operand> = SearchResponse::from_json(body).unwrap().into();
        assert_eq!(batch.finished, vec![0, 1]);
        assert_eq!(batch.results[&1][0].attribute("attribute1"), Some(&serde_json::json!(4)));
        assert!(!batch.results.contains_key(&0));
    }

    #[test]
    fn empty_response_defaults() {
        let response = SearchResponse::from_json("{}").unwrap();
        assert!(response.results.is_empty());
        assert!(response.finished.is_empty());
    }
}
