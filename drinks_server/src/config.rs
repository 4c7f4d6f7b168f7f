use std::{env, str::FromStr, time::Duration};

use log::*;

const DEFAULT_DRINKS_HOST: &str = "127.0.0.1";
const DEFAULT_DRINKS_PORT: u16 = 5000;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/drinks.db";
const DEFAULT_AUTH_DOMAIN: &str = "dev-os34dp82.us.auth0.com";
const DEFAULT_API_AUDIENCE: &str = "coffee";
const DEFAULT_JWKS_CACHE_TTL: Duration = Duration::from_secs(300);
const DEFAULT_JWKS_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_JWKS_RETRIES: u32 = 1;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// If true, every stored recipe is deleted on startup and replaced by a single seed recipe. **DANGER**
    pub reset_database: bool,
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DRINKS_HOST.to_string(),
            port: DEFAULT_DRINKS_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            reset_database: false,
            auth: AuthConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("DRINKS_HOST").ok().unwrap_or_else(|| DEFAULT_DRINKS_HOST.into());
        let port = parse_env("DRINKS_PORT", DEFAULT_DRINKS_PORT);
        let database_url = env::var("DRINKS_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ DRINKS_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.into()
        });
        let reset_database = env::var("DRINKS_RESET_DATABASE").map(|s| &s == "1" || &s == "true").unwrap_or(false);
        if reset_database {
            warn!("🚨️ DRINKS_RESET_DATABASE is set. All stored recipes will be deleted on startup. 🚨️");
        }
        let auth = AuthConfig::from_env_or_default();
        Self { host, port, database_url, reset_database, auth }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The identity provider's domain, e.g. "my-tenant.us.auth0.com"
    pub domain: String,
    /// Tokens must carry exactly this audience.
    pub audience: String,
    /// Tokens must carry exactly this issuer. Derived from `domain` unless set explicitly.
    pub issuer: String,
    /// Where the identity provider publishes its public signing keys.
    pub jwks_url: String,
    /// How long a fetched key set is reused before it is fetched again. Keep this well below the provider's key
    /// rotation window. A zero duration disables caching.
    pub jwks_cache_ttl: Duration,
    /// Upper bound on a single key set fetch.
    pub jwks_timeout: Duration,
    /// Number of extra attempts after a failed key set fetch.
    pub jwks_retries: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::for_domain(DEFAULT_AUTH_DOMAIN, DEFAULT_API_AUDIENCE)
    }
}

impl AuthConfig {
    /// Builds a configuration using the well-known issuer and JWKS locations for `domain`.
    pub fn for_domain(domain: &str, audience: &str) -> Self {
        Self {
            domain: domain.to_string(),
            audience: audience.to_string(),
            issuer: format!("https://{domain}/"),
            jwks_url: format!("https://{domain}/.well-known/jwks.json"),
            jwks_cache_ttl: DEFAULT_JWKS_CACHE_TTL,
            jwks_timeout: DEFAULT_JWKS_TIMEOUT,
            jwks_retries: DEFAULT_JWKS_RETRIES,
        }
    }

    pub fn from_env_or_default() -> Self {
        let domain = env::var("DRINKS_AUTH_DOMAIN").ok().unwrap_or_else(|| {
            warn!("🪛️ DRINKS_AUTH_DOMAIN is not set. Using the default, {DEFAULT_AUTH_DOMAIN}.");
            DEFAULT_AUTH_DOMAIN.into()
        });
        let audience = env::var("DRINKS_API_AUDIENCE").ok().unwrap_or_else(|| {
            warn!("🪛️ DRINKS_API_AUDIENCE is not set. Using the default, {DEFAULT_API_AUDIENCE}.");
            DEFAULT_API_AUDIENCE.into()
        });
        let mut config = Self::for_domain(&domain, &audience);
        if let Ok(issuer) = env::var("DRINKS_ISSUER") {
            config.issuer = issuer;
        }
        if let Ok(url) = env::var("DRINKS_JWKS_URL") {
            config.jwks_url = url;
        }
        config.jwks_cache_ttl = Duration::from_secs(parse_env("DRINKS_JWKS_CACHE_TTL", DEFAULT_JWKS_CACHE_TTL.as_secs()));
        config.jwks_timeout = Duration::from_secs(parse_env("DRINKS_JWKS_TIMEOUT", DEFAULT_JWKS_TIMEOUT.as_secs()));
        config.jwks_retries = parse_env("DRINKS_JWKS_RETRIES", DEFAULT_JWKS_RETRIES);
        info!("🪛️ Tokens must be issued by {} for audience '{}'", config.issuer, config.audience);
        info!("🪛️ Signing keys will be fetched from {}", config.jwks_url);
        config
    }
}

/// Reads and parses an environment variable, falling back to `default` (with a log message) if it is missing or
/// invalid.
fn parse_env<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(s) => s.parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => {
            debug!("🪛️ {name} is not set. Using the default value of {default}.");
            default
        },
    }
}
