use std::env;

/// Thirty days, the lifetime of a sign-in.
pub const DEFAULT_SESSION_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

/// Process configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    pub mongo_uri: Option<String>,
    pub mongo_database: String,
    pub jwt_secret: String,
    pub session_max_age_secs: u64,
    pub redis_url: Option<String>,
    pub oauth_bridge_secret: Option<String>,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_backend = match lookup("STORE_BACKEND").as_deref() {
            None | Some("mongo") => StoreBackend::Mongo,
            Some("memory") => StoreBackend::Memory,
            Some(other) => return Err(format!("STORE_BACKEND `{}` is not supported", other)),
        };

        let mongo_uri = lookup("MONGO_URI").filter(|uri| !uri.is_empty());
        if store_backend == StoreBackend::Mongo && mongo_uri.is_none() {
            return Err("MONGO_URI is required".to_string());
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "localhost".to_string()),
            port: lookup("PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse()
                .map_err(|_| "PORT must be a valid number")?,
            store_backend,
            mongo_uri,
            mongo_database: lookup("MONGO_DATABASE").unwrap_or_else(|| "forum_db".to_string()),
            jwt_secret: lookup("JWT_SECRET").ok_or("JWT_SECRET is required")?,
            session_max_age_secs: match lookup("SESSION_MAX_AGE_SECS") {
                Some(v) => v
                    .parse()
                    .map_err(|_| "SESSION_MAX_AGE_SECS must be a valid number")?,
                None => DEFAULT_SESSION_MAX_AGE_SECS,
            },
            redis_url: lookup("REDIS_URL").filter(|url| !url.is_empty()),
            oauth_bridge_secret: lookup("OAUTH_BRIDGE_SECRET").filter(|s| !s.is_empty()),
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 0,
            store_backend: StoreBackend::Memory,
            mongo_uri: None,
            mongo_database: "forum_test".to_string(),
            jwt_secret: "test-secret".to_string(),
            session_max_age_secs: 3600,
            redis_url: None,
            oauth_bridge_secret: Some("bridge".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn mongo_backend_requires_uri() {
        let err = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "s")])).unwrap_err();
        assert_eq!(err, "MONGO_URI is required");
    }

    #[test]
    fn memory_backend_needs_no_uri() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("STORE_BACKEND", "memory"),
            ("JWT_SECRET", "s"),
        ]))
        .unwrap();

        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.port, 8000);
        assert_eq!(config.session_max_age_secs, DEFAULT_SESSION_MAX_AGE_SECS);
        assert_eq!(config.mongo_database, "forum_db");
    }

    #[test]
    fn rejects_bad_port() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("STORE_BACKEND", "memory"),
            ("JWT_SECRET", "s"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert_eq!(err, "PORT must be a valid number");
    }
}
