//! Bearer token authorization.
//!
//! Three steps, each with its own failure mode (see [`AuthError`]):
//! 1. [`extract_bearer_token`] pulls the credential out of the `Authorization` header.
//! 2. [`TokenVerifier::verify`] checks the token's RS256 signature against the identity provider's published keys,
//!    then its expiry, audience and issuer.
//! 3. [`check_permissions`] confirms that the verified claims grant the permission a route requires.
//!
//! The [`crate::middleware::PermissionGuardFactory`] middleware chains these together.
use std::sync::Arc;

use actix_web::{dev::Payload, http::header, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, Ready};
use jsonwebtoken::{
    decode,
    decode_header,
    errors::{Error as JwtError, ErrorKind},
    jwk::{Jwk, JwkSet},
    Algorithm,
    DecodingKey,
    Validation,
};
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
    jwks::KeySetProvider,
};

pub const PERMISSIONS_CLAIM: &str = "permissions";

//-------------------------------------------------  ClaimSet  ---------------------------------------------------------
/// The decoded payload of a verified token. It only lives as long as the request that carried the token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.0.get(claim)
    }

    pub fn subject(&self) -> Option<&str> {
        self.get("sub").and_then(Value::as_str)
    }
}

/// Handlers behind the permission guard can take the verified claims as an argument.
impl FromRequest for ClaimSet {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<ClaimSet>().cloned().ok_or_else(|| {
            warn!("No verified claims found in request extensions. Is the route missing its permission guard?");
            ServerError::ConfigurationError("Route is not protected".into())
        });
        ready(claims)
    }
}

//-------------------------------------------------  Header  -----------------------------------------------------------
/// Extracts the credential from an `Authorization: Bearer <token>` header value. The scheme is case-insensitive.
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.map(str::trim).filter(|h| !h.is_empty()).ok_or(AuthError::HeaderMissing)?;
    let parts = header.split_whitespace().collect::<Vec<&str>>();
    if !parts[0].eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MissingBearerScheme);
    }
    match parts.as_slice() {
        [_] => Err(AuthError::MissingToken),
        [_, token] => Ok(*token),
        _ => Err(AuthError::MalformedHeader),
    }
}

//-------------------------------------------------  Permissions  ------------------------------------------------------
/// Confirms that `claims` grant `required`. An empty requirement is always satisfied.
///
/// A token without a `permissions` claim at all is rejected differently (`invalid_claims`) from one whose
/// permissions simply don't include `required` (`unauthorized`).
pub fn check_permissions(required: &str, claims: &ClaimSet) -> Result<(), AuthError> {
    if required.is_empty() {
        return Ok(());
    }
    let permissions = claims.get(PERMISSIONS_CLAIM).ok_or(AuthError::MissingPermissions)?;
    let permissions = permissions.as_array().ok_or(AuthError::MalformedPermissions)?;
    if permissions.iter().any(|p| p.as_str() == Some(required)) {
        Ok(())
    } else {
        debug!("🔐️ {:?} lacks the '{required}' permission", claims.subject());
        Err(AuthError::Unauthorized(required.to_string()))
    }
}

//-------------------------------------------------  TokenVerifier  ----------------------------------------------------
pub struct TokenVerifier {
    keys: Arc<dyn KeySetProvider>,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(keys: Arc<dyn KeySetProvider>, config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);
        validation.leeway = 0;
        Self { keys, validation }
    }

    /// Verifies `token` and returns its claims.
    ///
    /// The only side effect is the key set lookup. Given a fixed key set and clock, the outcome is deterministic.
    pub async fn verify(&self, token: &str) -> Result<ClaimSet, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;
        let jwk = self.find_key(&kid).await?;
        let key = DecodingKey::from_jwk(&jwk)
            .map_err(|e| AuthError::KeySetUnavailable(format!("Key {kid} cannot be used for verification. {e}")))?;
        let data = decode::<Map<String, Value>>(token, &key, &self.validation).map_err(map_jwt_error)?;
        trace!("🔐️ Token verified with key {kid}");
        Ok(ClaimSet(data.claims))
    }

    async fn find_key(&self, kid: &str) -> Result<Jwk, AuthError> {
        let keys = self.keys.key_set().await?;
        if let Some(jwk) = find_jwk(&keys, kid) {
            return Ok(jwk);
        }
        debug!("🔐️ Key {kid} is not in the current key set. Refreshing.");
        let keys = self.keys.refresh().await?;
        find_jwk(&keys, kid).ok_or_else(|| AuthError::KeyNotFound(kid.to_string()))
    }
}

fn find_jwk(keys: &JwkSet, kid: &str) -> Option<Jwk> {
    keys.keys.iter().find(|k| k.common.key_id.as_deref() == Some(kid)).cloned()
}

fn map_jwt_error(e: JwtError) -> AuthError {
    match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer => AuthError::InvalidClaims(e.to_string()),
        ErrorKind::MissingRequiredClaim(claim) if claim == "aud" || claim == "iss" => {
            AuthError::InvalidClaims(e.to_string())
        },
        _ => AuthError::InvalidToken(e.to_string()),
    }
}

/// Runs the whole pipeline for a single request: header extraction, verification, then the permission check.
pub async fn authorize(req: &HttpRequest, verifier: &TokenVerifier, required: &str) -> Result<ClaimSet, AuthError> {
    let header = match req.headers().get(header::AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| AuthError::MalformedHeader)?),
        None => None,
    };
    let token = extract_bearer_token(header)?;
    let claims = verifier.verify(token).await?;
    check_permissions(required, &claims)?;
    Ok(claims)
}
