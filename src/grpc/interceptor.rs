use tonic::metadata::AsciiMetadataValue;
use tonic::service::Interceptor;
use tonic::{Request, Status};

use crate::credentials::SignedToken;
use crate::{Error, Result};

/// Metadata key carrying the bearer credential.
pub const AUTHORIZATION: &str = "authorization";

/// Adds `authorization: Bearer <jwt>` to every outgoing request.
///
/// Holds one token for its whole life; build a new interceptor (and client)
/// after reissuing an expired token.
#[derive(Clone, Debug)]
pub struct BearerInterceptor {
    value: AsciiMetadataValue,
}

impl BearerInterceptor {
    /// Creates an interceptor for `token`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidCredential`] if the token is not valid
    /// metadata text.
    pub fn new(token: &SignedToken) -> Result<Self> {
        let value = token
            .bearer()
            .parse()
            .map_err(|e| Error::InvalidCredential(format!("Token is not valid metadata: {e}")))?;
        Ok(Self { value })
    }

    /// Attaches the credential to a single request.
    pub fn authorize<T>(&self, request: &mut Request<T>) {
        request
            .metadata_mut()
            .insert(AUTHORIZATION, self.value.clone());
    }
}

impl Interceptor for BearerInterceptor {
    fn call(&mut self, mut request: Request<()>) -> std::result::Result<Request<()>, Status> {
        self.authorize(&mut request);
        Ok(request)
    }
}
