//! Service-account credentials and bearer-token issuance.
//!
//! A [`ServiceAccount`] is the parsed form of the `service_account.json` file
//! delivered with a RogueDB purchase. It is loaded once and handed to
//! [`issue`] whenever a fresh [`SignedToken`] is needed.

use std::fmt;
use std::path::Path;

use jsonwebtoken::{Algorithm, EncodingKey};
use serde::Deserialize;
use tracing::debug;

use crate::{Error, Result};

/// Bearer-token construction.
pub mod issuer;

pub use issuer::{audience_for, issue, issue_at, Claims, SignedToken, DEFAULT_TTL_SECONDS};

/// Identity used to sign bearer tokens.
///
/// All three fields are required and non-empty, and `private_key` must be a
/// PEM-encoded RSA private key (PKCS#1 or PKCS#8).
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "ServiceAccountWire")]
pub struct ServiceAccount {
    client_email: String,
    private_key: String,
    key_id: String,
}

#[derive(Deserialize)]
struct ServiceAccountWire {
    client_email: String,
    private_key: String,
    private_key_id: String,
}

impl TryFrom<ServiceAccountWire> for ServiceAccount {
    type Error = Error;

    fn try_from(wire: ServiceAccountWire) -> Result<Self> {
        Self::new(wire.client_email, wire.private_key, wire.private_key_id)
    }
}

impl ServiceAccount {
    /// Creates a service account after checking every field.
    ///
    /// # Errors
    /// Returns [`Error::InvalidCredential`] if a field is empty, the email has
    /// no local part, or the key is not a parseable RSA key.
    pub fn new(
        client_email: impl Into<String>,
        private_key: impl Into<String>,
        key_id: impl Into<String>,
    ) -> Result<Self> {
        let account = Self {
            client_email: client_email.into(),
            private_key: private_key.into(),
            key_id: key_id.into(),
        };
        account.validate()?;
        Ok(account)
    }

    /// Parses the JSON service-account descriptor.
    ///
    /// Only `client_email`, `private_key`, and `private_key_id` are read; the
    /// remaining fields of the descriptor are ignored.
    ///
    /// # Errors
    /// Returns [`Error::InvalidCredential`] if the document is not a
    /// descriptor or fails validation.
    pub fn from_json(json: &str) -> Result<Self> {
        let wire: ServiceAccountWire = serde_json::from_str(json)
            .map_err(|e| Error::InvalidCredential(format!("Malformed service account: {e}")))?;
        Self::try_from(wire)
    }

    /// Reads and parses a service-account descriptor from disk.
    ///
    /// # Errors
    /// Returns [`Error::Io`] if the file cannot be read, otherwise the errors
    /// of [`ServiceAccount::from_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let account = Self::from_json(&json)?;
        debug!(path = %path.display(), client_email = %account.client_email, "Loaded service account");
        Ok(account)
    }

    /// Email of the account; used as both issuer and subject.
    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    /// Identifier of the signing key, sent as the token header `kid`.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Part of the email before the first `@`.
    pub fn local_part(&self) -> &str {
        self.client_email
            .split_once('@')
            .map_or(self.client_email.as_str(), |(local, _)| local)
    }

    pub(crate) fn encoding_key(&self) -> Result<EncodingKey> {
        EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| Error::InvalidCredential(format!("Private key is not a valid RSA key: {e}")))
    }

    fn validate(&self) -> Result<()> {
        if self.client_email.is_empty() {
            return Err(Error::InvalidCredential("client_email cannot be empty".to_string()));
        }

        match self.client_email.split_once('@') {
            Some((local, _)) if !local.is_empty() => {}
            _ => {
                return Err(Error::InvalidCredential(format!(
                    "client_email '{}' has no local part",
                    self.client_email
                )))
            }
        }

        if self.private_key.is_empty() {
            return Err(Error::InvalidCredential("private_key cannot be empty".to_string()));
        }

        if self.key_id.is_empty() {
            return Err(Error::InvalidCredential("private_key_id cannot be empty".to_string()));
        }

        // from_rsa_pem only checks the PEM envelope.
        let key = self.encoding_key()?;
        jsonwebtoken::crypto::sign(b"roguedb-key-probe", &key, Algorithm::RS256)
            .map(|_| ())
            .map_err(|e| Error::InvalidCredential(format!("Private key cannot sign: {e}")))
    }
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("key_id", &self.key_id)
            .finish()
    }
}
