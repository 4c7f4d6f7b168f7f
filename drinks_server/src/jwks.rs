//! Retrieval of the identity provider's public signing keys (JSON Web Key Set).
//!
//! [`RemoteJwks`] fetches the key set over HTTP with a bounded timeout and a short retry, and keeps it for a
//! configurable time so that not every request costs a network round trip. Any fetch failure fails closed: the caller
//! gets an [`AuthError::KeySetUnavailable`] and the request is rejected.
//!
//! A plain [`JwkSet`] is also a [`KeySetProvider`], which is handy when the keys are known up front.
use std::time::{Duration, Instant};

use futures::{
    future::{self, BoxFuture},
    FutureExt,
};
use jsonwebtoken::jwk::JwkSet;
use log::*;
use reqwest::Client;
use tokio::sync::RwLock;

use crate::{config::AuthConfig, errors::AuthError};

const RETRY_DELAY: Duration = Duration::from_millis(250);
/// A forced refresh is skipped if the cached set is younger than this, so unknown key ids can't be used to hammer the
/// identity provider.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

pub trait KeySetProvider: Send + Sync {
    /// Returns the current key set, from cache if possible.
    fn key_set(&self) -> BoxFuture<'_, Result<JwkSet, AuthError>>;

    /// Called when a token names a key that is not in the current set, e.g. after the provider rotated its keys.
    fn refresh(&self) -> BoxFuture<'_, Result<JwkSet, AuthError>> {
        self.key_set()
    }
}

impl KeySetProvider for JwkSet {
    fn key_set(&self) -> BoxFuture<'_, Result<JwkSet, AuthError>> {
        future::ready(Ok(self.clone())).boxed()
    }
}

struct CachedKeySet {
    keys: JwkSet,
    fetched_at: Instant,
}

pub struct RemoteJwks {
    url: String,
    client: Client,
    cache_ttl: Duration,
    retries: u32,
    cache: RwLock<Option<CachedKeySet>>,
}

impl RemoteJwks {
    pub fn new(config: &AuthConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.jwks_timeout).build()?;
        Ok(Self {
            url: config.jwks_url.clone(),
            client,
            cache_ttl: config.jwks_cache_ttl,
            retries: config.jwks_retries,
            cache: RwLock::new(None),
        })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn cached(&self, max_age: Duration) -> Option<JwkSet> {
        let cache = self.cache.read().await;
        cache.as_ref().filter(|entry| entry.fetched_at.elapsed() < max_age).map(|entry| entry.keys.clone())
    }

    async fn fetch_and_cache(&self) -> Result<JwkSet, AuthError> {
        let keys = self.fetch_with_retry().await?;
        if !self.cache_ttl.is_zero() {
            let mut cache = self.cache.write().await;
            *cache = Some(CachedKeySet { keys: keys.clone(), fetched_at: Instant::now() });
        }
        Ok(keys)
    }

    async fn fetch_with_retry(&self) -> Result<JwkSet, AuthError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once().await {
                Ok(keys) => {
                    debug!("🔑️ Fetched {} signing keys from {}", keys.keys.len(), self.url);
                    return Ok(keys);
                },
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    warn!("🔑️ Could not fetch signing keys from {} (attempt {attempt}). {e}. Retrying.", self.url);
                    tokio::time::sleep(RETRY_DELAY).await;
                },
                Err(e) => {
                    error!("🔑️ Giving up fetching signing keys from {}. {e}", self.url);
                    return Err(AuthError::KeySetUnavailable(e));
                },
            }
        }
    }

    async fn fetch_once(&self) -> Result<JwkSet, String> {
        let response = self.client.get(&self.url).send().await.map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("HTTP {} from JWKS endpoint", response.status()));
        }
        response.json::<JwkSet>().await.map_err(|e| format!("Invalid key set document. {e}"))
    }
}

impl KeySetProvider for RemoteJwks {
    fn key_set(&self) -> BoxFuture<'_, Result<JwkSet, AuthError>> {
        async move {
            if let Some(keys) = self.cached(self.cache_ttl).await {
                trace!("🔑️ Using cached signing keys");
                return Ok(keys);
            }
            self.fetch_and_cache().await
        }
        .boxed()
    }

    fn refresh(&self) -> BoxFuture<'_, Result<JwkSet, AuthError>> {
        async move {
            if let Some(keys) = self.cached(MIN_REFRESH_INTERVAL.min(self.cache_ttl)).await {
                debug!("🔑️ Signing keys were refreshed recently. Not fetching them again.");
                return Ok(keys);
            }
            self.fetch_and_cache().await
        }
        .boxed()
    }
}
