use std::sync::Arc;

use actix_web::{http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, jwk::JwkSet, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

use crate::{
    auth::TokenVerifier,
    config::AuthConfig,
    helpers::{json_config, path_config},
    routes::not_found,
};

// Test-only signing keys. DO NOT re-use these keys anywhere.
pub const KEY_A_PEM: &str = include_str!("keys/key_a.pem");
pub const KEY_B_PEM: &str = include_str!("keys/key_b.pem");
pub const KEY_A_ID: &str = "test-key-a";
pub const KEY_B_ID: &str = "test-key-b";

const KEY_A_MODULUS: &str = "qzZW-aDz0rcsKCzW0UQdupuujAHjXZ3QMQCKj9LW483zhf1_Pro-JAuWJhb1hrY781eBcLSyufjaCAVvrzmZbgfLrlisqfhhWjFnCXlFbKGZXVxh-8zMpzH_69zbDMu2OnmvxDPxNp6wWeOfTly_LtBz1y8o1mtSATny0gONHk1_EXhvzjmbihhk1JqUz2RDx61QTe7kl03cybIZGjhRIhkCH272FGPjw90PPH4VGpfyUtLUlGQsjYrZvaSwKvENVS2cLedepr-Mcp5zegNekXpvHwwJdg3SrcspjTyR4VSraAeFww1_fTQFRODKbJNs9k8NKJ_t7bPmwp0ROdXAJQ";
const KEY_B_MODULUS: &str = "sJIqIoD73lpxEGTpgvRhcL9cV0ufdC9rsomQr9qAiQApR-nuSP-SuFqtbq-D6BFKiav_NkyE8aBcUxcHx_W5kqudvEtTEAGN3483HVEoqxGhk4ZfwpHzbO9IU8Ig5SdnQYf6m4VC0VEif6jbZpy9BHa-YSSvAIRr63Fg4OJ7Q_pEnv7gO3VvNAEG_y-mXUxrf_5ax0ZuqxL6wa7v7wWxZkA6pr7eFr6QzUJST6yC6QBNFrSpfMIBtQ5FCGmHfrQ48sZyPMjrfSW1iJ7soGoeQD9A8owC6FRcs_WJsbjn3O9ZcsYDgOdbMJqCpwZEplMWR5lfkdlAGgVvCeLLYPLb-Q";

pub fn auth_config() -> AuthConfig {
    AuthConfig::for_domain("test.example.com", "coffee")
}

fn jwk(kid: &str, modulus: &str) -> Value {
    json!({ "kty": "RSA", "kid": kid, "use": "sig", "alg": "RS256", "n": modulus, "e": "AQAB" })
}

/// The published key set of the test identity provider. Only key A is in it.
pub fn test_key_set() -> JwkSet {
    serde_json::from_value(json!({ "keys": [jwk(KEY_A_ID, KEY_A_MODULUS)] })).unwrap()
}

/// The key set after the provider rotated key B in.
pub fn rotated_key_set() -> JwkSet {
    serde_json::from_value(json!({ "keys": [jwk(KEY_A_ID, KEY_A_MODULUS), jwk(KEY_B_ID, KEY_B_MODULUS)] })).unwrap()
}

pub fn test_verifier() -> TokenVerifier {
    TokenVerifier::new(Arc::new(test_key_set()), &auth_config())
}

/// A valid claim set for the test provider, expiring `expires_in` from now (negative values are in the past).
pub fn claims(permissions: &[&str], expires_in: Duration) -> Value {
    let exp = (Utc::now() + expires_in).timestamp();
    json!({
        "iss": "https://test.example.com/",
        "sub": "auth0|barista",
        "aud": "coffee",
        "iat": Utc::now().timestamp(),
        "exp": exp,
        "permissions": permissions,
    })
}

/// Signs `claims` with the RSA key in `pem`, naming `kid` in the header.
pub fn issue_token(kid: Option<&str>, pem: &str, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(String::from);
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("Invalid test key");
    encode(&header, claims, &key).expect("Failed to sign token")
}

/// A token signed by key A that expires in an hour.
pub fn token_with(permissions: &[&str]) -> String {
    issue_token(Some(KEY_A_ID), KEY_A_PEM, &claims(permissions, Duration::hours(1)))
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// Sends `req` to an app wired up like the real server, except for whatever `configure` registers.
pub async fn send_request<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new()
        .app_data(web::Data::new(test_verifier()))
        .app_data(json_config())
        .app_data(path_config())
        .configure(configure)
        .default_service(web::to(not_found));
    let service = test::init_service(app).await;
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    (status, String::from_utf8_lossy(&body).into_owned())
}
