use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use chrono::Duration;
use futures::{future::BoxFuture, FutureExt};
use jsonwebtoken::{encode, jwk::JwkSet, EncodingKey, Header};
use serde_json::{json, Map, Value};

use super::helpers::*;
use crate::{
    auth::{check_permissions, extract_bearer_token, ClaimSet, TokenVerifier},
    errors::AuthError,
    jwks::KeySetProvider,
};

#[test]
fn bearer_header_extraction() {
    assert_eq!(extract_bearer_token(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    assert_eq!(extract_bearer_token(Some("bearer abc")).unwrap(), "abc");
    assert!(matches!(extract_bearer_token(None), Err(AuthError::HeaderMissing)));
    assert!(matches!(extract_bearer_token(Some("   ")), Err(AuthError::HeaderMissing)));
    assert!(matches!(extract_bearer_token(Some("Basic dXNlcjpwYXNz")), Err(AuthError::MissingBearerScheme)));
    assert!(matches!(extract_bearer_token(Some("Bearer")), Err(AuthError::MissingToken)));
    assert!(matches!(extract_bearer_token(Some("Bearer a b")), Err(AuthError::MalformedHeader)));
}

fn claim_set(value: Value) -> ClaimSet {
    let Value::Object(map) = value else { panic!("not an object") };
    ClaimSet::new(map)
}

#[test]
fn permission_checks() {
    let claims = claim_set(json!({ "permissions": ["get:drinks-detail", "post:drinks"] }));
    assert!(check_permissions("post:drinks", &claims).is_ok());
    assert!(check_permissions("", &claims).is_ok());
    let err = check_permissions("delete:drinks", &claims).unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized(_)));
    assert_eq!(err.code(), "unauthorized");
    assert_eq!(err.status_code().as_u16(), 403);

    let err = check_permissions("post:drinks", &ClaimSet::new(Map::new())).unwrap_err();
    assert!(matches!(err, AuthError::MissingPermissions));
    assert_eq!(err.code(), "invalid_claims");
    assert_eq!(err.status_code().as_u16(), 400);

    let err = check_permissions("post:drinks", &claim_set(json!({ "permissions": "post:drinks" }))).unwrap_err();
    assert!(matches!(err, AuthError::MalformedPermissions));
}

#[actix_web::test]
async fn valid_token_yields_claims() {
    let verifier = test_verifier();
    let claims = verifier.verify(&token_with(&["get:drinks-detail"])).await.expect("Token should verify");
    assert_eq!(claims.subject(), Some("auth0|barista"));
    assert_eq!(claims.get("permissions"), Some(&json!(["get:drinks-detail"])));
}

#[actix_web::test]
async fn expired_token() {
    let token = issue_token(Some(KEY_A_ID), KEY_A_PEM, &claims(&[], Duration::seconds(-5)));
    let err = test_verifier().verify(&token).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenExpired));
    assert_eq!(err.code(), "token_expired");
    assert_eq!(err.status_code().as_u16(), 401);
}

#[actix_web::test]
async fn wrong_audience_or_issuer() {
    let verifier = test_verifier();
    let mut c = claims(&[], Duration::hours(1));
    c["aud"] = json!("tea");
    let err = verifier.verify(&issue_token(Some(KEY_A_ID), KEY_A_PEM, &c)).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidClaims(_)), "{err:?}");

    let mut c = claims(&[], Duration::hours(1));
    c["iss"] = json!("https://evil.example.com/");
    let err = verifier.verify(&issue_token(Some(KEY_A_ID), KEY_A_PEM, &c)).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidClaims(_)), "{err:?}");
    assert_eq!(err.status_code().as_u16(), 401);
}

#[actix_web::test]
async fn token_without_key_id() {
    let token = issue_token(None, KEY_A_PEM, &claims(&[], Duration::hours(1)));
    let err = test_verifier().verify(&token).await.unwrap_err();
    assert!(matches!(err, AuthError::MissingKeyId));
    assert_eq!(err.code(), "invalid_header");
}

#[actix_web::test]
async fn token_for_unknown_key() {
    let token = issue_token(Some("someone-else"), KEY_A_PEM, &claims(&[], Duration::hours(1)));
    let err = test_verifier().verify(&token).await.unwrap_err();
    assert!(matches!(err, AuthError::KeyNotFound(ref kid) if kid == "someone-else"));
    assert_eq!(err.status_code().as_u16(), 400);
}

#[actix_web::test]
async fn forged_signature() {
    // Signed with key B but claims to be key A
    let token = issue_token(Some(KEY_A_ID), KEY_B_PEM, &claims(&["delete:drinks"], Duration::hours(1)));
    let err = test_verifier().verify(&token).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken(_)), "{err:?}");
    assert_eq!(err.code(), "invalid_token");
}

#[actix_web::test]
async fn symmetric_algorithm_is_rejected() {
    let mut header = Header::new(jsonwebtoken::Algorithm::HS256);
    header.kid = Some(KEY_A_ID.to_string());
    let token =
        encode(&header, &claims(&["delete:drinks"], Duration::hours(1)), &EncodingKey::from_secret(b"secret")).unwrap();
    let err = test_verifier().verify(&token).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken(_)), "{err:?}");
}

#[actix_web::test]
async fn garbage_token() {
    let err = test_verifier().verify("not-a-jwt").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken(_)));
    assert_eq!(err.status_code().as_u16(), 400);
}

/// Serves the old key set until it is asked to refresh.
struct RotatingKeys {
    refreshes: AtomicUsize,
}

impl KeySetProvider for RotatingKeys {
    fn key_set(&self) -> BoxFuture<'_, Result<JwkSet, AuthError>> {
        let keys = if self.refreshes.load(Ordering::SeqCst) == 0 { test_key_set() } else { rotated_key_set() };
        futures::future::ready(Ok(keys)).boxed()
    }

    fn refresh(&self) -> BoxFuture<'_, Result<JwkSet, AuthError>> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        futures::future::ready(Ok(rotated_key_set())).boxed()
    }
}

#[actix_web::test]
async fn unknown_key_triggers_a_refresh() {
    let keys = Arc::new(RotatingKeys { refreshes: AtomicUsize::new(0) });
    let verifier = TokenVerifier::new(keys.clone(), &auth_config());
    let token = issue_token(Some(KEY_B_ID), KEY_B_PEM, &claims(&["post:drinks"], Duration::hours(1)));
    let claims = verifier.verify(&token).await.expect("Token should verify after a refresh");
    assert_eq!(claims.subject(), Some("auth0|barista"));
    assert_eq!(keys.refreshes.load(Ordering::SeqCst), 1);
    // Known keys don't cost a refresh
    verifier.verify(&token_with(&[])).await.expect("Token should verify");
    assert_eq!(keys.refreshes.load(Ordering::SeqCst), 1);
}
