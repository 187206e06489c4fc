//! Bearer-token issuance and verification.
//!
//! Tokens are stateless HS256 JWTs: three dot-separated base64url segments
//! signed with a shared secret. There is no server-side token store and no
//! revocation list; a token is valid until its expiry as long as the
//! signature verifies.

use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::models::Principal;
use crate::auth::roles::Role;
use crate::config::AuthConfig;
use crate::errors::{AuthErrorType, Error, Result};

/// Immutable signing configuration: set once at process start, shared
/// read-only for the lifetime of the service.
#[derive(Debug, Clone)]
pub struct SigningConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl: Duration,
}

impl From<&AuthConfig> for SigningConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            issuer: config.jwt_issuer.clone(),
            ttl: config.token_ttl(),
        }
    }
}

/// Claims carried in every token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// Subject: the principal's identity
    pub sub: String,
    /// Issued-at, unix seconds
    pub iat: u64,
    /// Expires-at, unix seconds
    pub exp: u64,
    /// Display name at time of issuance
    pub name: String,
    /// Role snapshot at time of issuance, canonical uppercase
    pub roles: Vec<String>,
}

/// Issues and verifies signed bearer tokens.
///
/// Both operations are pure and CPU-bound; the service holds only the derived
/// keys and is freely shareable across requests without locking.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl: Duration,
}

impl TokenService {
    pub fn new(config: &SigningConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        // Expiry is checked by hand after decode: a token whose `exp` equals
        // the current second must already count as expired, which is stricter
        // than the library's own exp validation.
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            ttl: config.ttl,
        }
    }

    /// Mint a signed token for the given principal.
    ///
    /// Deterministic for identical inputs apart from `iat`/`exp`. Side-effect
    /// free: nothing is stored server-side.
    pub fn create_token(&self, principal: &Principal) -> Result<String> {
        let now = unix_now();
        let claims = Claims {
            iss: self.issuer.clone(),
            sub: principal.identity.clone(),
            iat: now,
            exp: now + self.ttl.as_secs(),
            name: principal.name.clone(),
            roles: principal.role_names(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| Error::internal(format!("Failed to sign token: {}", err)))
    }

    /// Verify a token string and reconstruct the principal it encodes.
    ///
    /// Ordering is a deliberate invariant: the structural check and signature
    /// verification happen before any claim is trusted, so a forged or
    /// tampered payload never reaches claim-parsing logic. Only after the
    /// signature holds is `exp` compared against the server clock, and only
    /// then are claims decoded into a [`Principal`].
    pub fn verify_token(&self, token: &str) -> Result<Principal> {
        if token.split('.').count() != 3 {
            return Err(Error::auth(
                "malformed token: expected three segments",
                AuthErrorType::MalformedToken,
            ));
        }

        // jsonwebtoken verifies the HMAC against the raw message before
        // deserializing the payload, which preserves the ordering above.
        let data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|err| {
                match err.kind() {
                    ErrorKind::InvalidSignature | ErrorKind::Crypto(_) => {
                        Error::auth("token signature does not verify", AuthErrorType::BadSignature)
                    }
                    ErrorKind::ExpiredSignature => {
                        Error::auth("token has expired", AuthErrorType::ExpiredToken)
                    }
                    _ => Error::auth(
                        format!("malformed token: {}", err),
                        AuthErrorType::MalformedToken,
                    ),
                }
            })?;

        // Closed interval on the expired side: exp == now is already expired,
        // so there is no ambiguous boundary second.
        if data.claims.exp <= unix_now() {
            return Err(Error::auth("token has expired", AuthErrorType::ExpiredToken));
        }

        principal_from_claims(data.claims)
    }
}

fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

fn principal_from_claims(claims: Claims) -> Result<Principal> {
    let mut roles = Vec::with_capacity(claims.roles.len());
    for raw in &claims.roles {
        match Role::from_str(raw) {
            Ok(role) => roles.push(role),
            Err(err) => {
                // A verified signature with an out-of-vocabulary role means
                // the token predates a vocabulary change or was minted by a
                // misconfigured peer; reject rather than silently default.
                warn!(role = %raw, "verified token carries unknown role");
                return Err(Error::auth(
                    format!("malformed token: {}", err),
                    AuthErrorType::MalformedToken,
                ));
            }
        }
    }
    Ok(Principal::new(claims.sub, claims.name, roles))
}
