use std::{
    net::TcpListener,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use actix_web::{dev::ServerHandle, web, App, HttpResponse, HttpServer};

use super::helpers::*;
use crate::{
    auth::TokenVerifier,
    config::AuthConfig,
    errors::AuthError,
    jwks::{KeySetProvider, RemoteJwks},
};

struct KeyServer {
    url: String,
    hits: Arc<AtomicUsize>,
    handle: ServerHandle,
}

impl KeyServer {
    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    fn config(&self, ttl: Duration, retries: u32) -> AuthConfig {
        let mut config = auth_config();
        config.jwks_url = self.url.clone();
        config.jwks_cache_ttl = ttl;
        config.jwks_timeout = Duration::from_secs(2);
        config.jwks_retries = retries;
        config
    }
}

/// Starts a local identity provider that publishes the rotated key set, or fails every request if `healthy` is false.
fn start_key_server(healthy: bool) -> KeyServer {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let server = HttpServer::new(move || {
        let counter = counter.clone();
        App::new().route(
            "/.well-known/jwks.json",
            web::get().to(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    if healthy {
                        HttpResponse::Ok().json(rotated_key_set())
                    } else {
                        HttpResponse::InternalServerError().finish()
                    }
                }
            }),
        )
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("Could not bind key server");
    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_web::rt::spawn(server);
    KeyServer { url: format!("http://{addr}/.well-known/jwks.json"), hits, handle }
}

#[actix_web::test]
async fn key_set_is_cached() {
    let _ = env_logger::try_init().ok();
    let server = start_key_server(true);
    let jwks = RemoteJwks::new(&server.config(Duration::from_secs(300), 1)).unwrap();
    let keys = jwks.key_set().await.expect("Could not fetch keys");
    assert_eq!(keys.keys.len(), 2);
    assert!(keys.find(KEY_B_ID).is_some());
    jwks.key_set().await.expect("Could not fetch keys");
    assert_eq!(server.hits(), 1);
    // A refresh right after a fetch is served from cache
    jwks.refresh().await.expect("Could not refresh keys");
    assert_eq!(server.hits(), 1);
    server.handle.stop(true).await;
}

#[actix_web::test]
async fn zero_ttl_disables_caching() {
    let _ = env_logger::try_init().ok();
    let server = start_key_server(true);
    let jwks = RemoteJwks::new(&server.config(Duration::ZERO, 0)).unwrap();
    jwks.key_set().await.expect("Could not fetch keys");
    jwks.key_set().await.expect("Could not fetch keys");
    jwks.refresh().await.expect("Could not refresh keys");
    assert_eq!(server.hits(), 3);
    server.handle.stop(true).await;
}

#[actix_web::test]
async fn failing_key_server_is_retried_then_fails_closed() {
    let _ = env_logger::try_init().ok();
    let server = start_key_server(false);
    let jwks = RemoteJwks::new(&server.config(Duration::from_secs(300), 1)).unwrap();
    let err = jwks.key_set().await.unwrap_err();
    assert!(matches!(err, AuthError::KeySetUnavailable(_)), "{err:?}");
    assert_eq!(err.code(), "invalid_header");
    assert_eq!(err.status_code().as_u16(), 401);
    assert_eq!(server.hits(), 2);
    server.handle.stop(true).await;
}

#[actix_web::test]
async fn unreachable_key_server() {
    let _ = env_logger::try_init().ok();
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let mut config = auth_config();
    config.jwks_url = format!("http://127.0.0.1:{port}/.well-known/jwks.json");
    config.jwks_retries = 0;
    let jwks = RemoteJwks::new(&config).unwrap();
    let err = jwks.key_set().await.unwrap_err();
    assert!(matches!(err, AuthError::KeySetUnavailable(_)), "{err:?}");
}

#[actix_web::test]
async fn tokens_verify_against_remote_keys() {
    let _ = env_logger::try_init().ok();
    let server = start_key_server(true);
    let config = server.config(Duration::from_secs(300), 1);
    let verifier = TokenVerifier::new(Arc::new(RemoteJwks::new(&config).unwrap()), &config);
    let token = issue_token(Some(KEY_B_ID), KEY_B_PEM, &claims(&["patch:drinks"], chrono::Duration::hours(1)));
    let claims = verifier.verify(&token).await.expect("Token should verify");
    assert_eq!(claims.subject(), Some("auth0|barista"));
    verifier.verify(&token_with(&[])).await.expect("Token should verify");
    assert_eq!(server.hits(), 1);
    server.handle.stop(true).await;
}
