use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, Algorithm, Header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ServiceAccount;
use crate::{Error, Result};

/// Token lifetime used when the caller has no preference (one hour).
pub const DEFAULT_TTL_SECONDS: i64 = 3600;

const AUDIENCE_SUFFIX: &str = ".roguedb.dev";

/// Registered claims carried in the token payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issued at (seconds since epoch).
    pub iat: u64,
    /// Expiration time (seconds since epoch).
    pub exp: u64,
    /// Issuer, the service-account email.
    pub iss: String,
    /// Subject, the service-account email.
    pub sub: String,
    /// Audience, `<local part>.roguedb.dev`.
    pub aud: String,
}

/// A signed RS256 bearer token and the claims it was built from.
///
/// Tokens are never refreshed in place: once [`SignedToken::is_expired_at`]
/// reports true the caller issues a new one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedToken {
    token: String,
    claims: Claims,
    key_id: String,
}

impl SignedToken {
    /// Compact JWS serialization (`header.payload.signature`).
    pub fn as_str(&self) -> &str {
        &self.token
    }

    /// Claims signed into the payload.
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Key id placed in the token header.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Base64url-encoded RS256 signature segment.
    pub fn signature(&self) -> &str {
        self.token.rsplit('.').next().unwrap_or_default()
    }

    /// Seconds since epoch at which the token was issued.
    pub fn issued_at(&self) -> u64 {
        self.claims.iat
    }

    /// Seconds since epoch after which the token is rejected.
    pub fn expires_at(&self) -> u64 {
        self.claims.exp
    }

    /// Whether the token is no longer valid at `now` (seconds since epoch).
    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.claims.exp
    }

    /// Value for an `Authorization` header or `authorization` metadata entry.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Audience a RogueDB deployment expects for tokens signed by `client_email`.
///
/// ```
/// assert_eq!(roguedb_client::audience_for("svc@proj.iam"), "svc.roguedb.dev");
/// ```
pub fn audience_for(client_email: &str) -> String {
    let local = client_email
        .split_once('@')
        .map_or(client_email, |(local, _)| local);
    format!("{local}{AUDIENCE_SUFFIX}")
}

/// Issues a token valid for `ttl_seconds` from now.
///
/// # Errors
/// - [`Error::InvalidArgument`] if `ttl_seconds <= 0`.
/// - [`Error::InvalidArgument`] if the system clock reads before 1970.
/// - [`Error::InvalidCredential`] if the account key cannot sign.
pub fn issue(account: &ServiceAccount, ttl_seconds: i64) -> Result<SignedToken> {
    issue_at(account, ttl_seconds, unix_seconds(SystemTime::now())?)
}

fn unix_seconds(time: SystemTime) -> Result<u64> {
    time.duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .map_err(|e| Error::InvalidArgument(format!("System clock is before UNIX_EPOCH: {e}")))
}

/// Issues a token as if the current time were `issued_at` (seconds since epoch).
///
/// # Errors
/// Same as [`issue`]; additionally [`Error::InvalidArgument`] if the expiry
/// would overflow.
pub fn issue_at(account: &ServiceAccount, ttl_seconds: i64, issued_at: u64) -> Result<SignedToken> {
    if ttl_seconds <= 0 {
        return Err(Error::InvalidArgument(format!(
            "Token TTL must be positive, got {ttl_seconds}"
        )));
    }

    let expires_at = issued_at
        .checked_add(ttl_seconds.unsigned_abs())
        .ok_or_else(|| Error::InvalidArgument("Token expiry overflows".to_string()))?;

    let claims = Claims {
        iat: issued_at,
        exp: expires_at,
        iss: account.client_email().to_string(),
        sub: account.client_email().to_string(),
        aud: audience_for(account.client_email()),
    };

    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(account.key_id().to_string());

    let key = account.encoding_key()?;
    let token = encode(&header, &claims, &key)
        .map_err(|e| Error::InvalidCredential(format!("Signing failed: {e}")))?;

    debug!(
        iss = %claims.iss,
        aud = %claims.aud,
        exp = claims.exp,
        "Issued bearer token"
    );

    Ok(SignedToken {
        token,
        claims,
        key_id: account.key_id().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = include_str!("../../tests/fixtures/test_rsa.pem");

    fn account() -> ServiceAccount {
        ServiceAccount::new("svc@proj.iam", TEST_KEY, "kid-1").unwrap()
    }

    #[test]
    fn claims_follow_account() {
        let token = issue_at(&account(), 3600, 1_700_000_000).unwrap();
        let claims = token.claims();

        assert_eq!(claims.iat, 1_700_000_000);
        assert_eq!(claims.exp, 1_700_003_600);
        assert_eq!(claims.iss, "svc@proj.iam");
        assert_eq!(claims.sub, "svc@proj.iam");
        assert_eq!(claims.aud, "svc.roguedb.dev");
        assert_eq!(token.key_id(), "kid-1");
    }

    #[test]
    fn token_has_three_segments() {
        let token = issue(&account(), DEFAULT_TTL_SECONDS).unwrap();
        assert_eq!(token.as_str().split('.').count(), 3);
        assert!(!token.signature().is_empty());
        assert!(token.bearer().starts_with("Bearer ey"));
    }

    #[test]
    fn rejects_non_positive_ttl() {
        assert!(matches!(issue(&account(), 0), Err(Error::InvalidArgument(_))));
        assert!(matches!(issue(&account(), -5), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn clock_before_epoch_is_an_error() {
        let before = UNIX_EPOCH.checked_sub(std::time::Duration::from_secs(1)).unwrap();
        assert!(matches!(unix_seconds(before), Err(Error::InvalidArgument(_))));
        assert_eq!(
            unix_seconds(UNIX_EPOCH + std::time::Duration::from_secs(42)).unwrap(),
            42
        );
    }

    #[test]
    fn rejects_overflowing_expiry() {
        let result = issue_at(&account(), 10, u64::MAX - 1);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn expiry_boundary() {
        let token = issue_at(&account(), 60, 1000).unwrap();
        assert!(!token.is_expired_at(1059));
        assert!(token.is_expired_at(1060));
    }

    #[test]
    fn audience_uses_first_at_sign() {
        assert_eq!(audience_for("a@b@c"), "a.roguedb.dev");
    }
}
