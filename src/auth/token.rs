use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::AuthError;

const TOKEN_FILE: &str = "token.json";

/// An OAuth2 access credential, as persisted to the cache file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Token {
    /// Checks if the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Trait for anything that can yield a token.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Yields a token, acquiring one if necessary.
    async fn token(&self) -> Result<Token, AuthError>;
}

/// Wraps a token source with a JSON file cache.
///
/// A missing cache file delegates to the inner source and persists the
/// result. A file that exists but cannot be read or decoded is a hard
/// failure, not treated as absent. A cached token is returned without
/// checking its expiry: staleness is the wrapped source's concern.
pub struct CachingTokenSource<S> {
    inner: S,
    path: PathBuf,
}

impl<S: TokenSource> CachingTokenSource<S> {
    /// Caches `inner` at an explicit file path.
    pub fn new(inner: S, path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            path: path.into(),
        }
    }

    /// Caches `inner` at `token.json` under the user config directory,
    /// namespaced by `app_name`.
    pub fn in_config_dir(inner: S, app_name: &str) -> Result<Self, AuthError> {
        let dir = dirs::config_dir()
            .ok_or(AuthError::NoConfigDir)?
            .join(app_name);
        std::fs::create_dir_all(&dir).map_err(AuthError::CacheWrite)?;
        Ok(Self::new(inner, dir.join(TOKEN_FILE)))
    }

    fn read_cache(&self) -> Result<Option<Token>, AuthError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::CacheRead(err)),
        };
        let token = serde_json::from_str(&data).map_err(AuthError::CacheDecode)?;
        Ok(Some(token))
    }

    fn write_cache(&self, token: &Token) -> Result<(), AuthError> {
        let data = serde_json::to_string(token).map_err(AuthError::CacheEncode)?;
        std::fs::write(&self.path, data).map_err(AuthError::CacheWrite)
    }
}

#[async_trait]
impl<S: TokenSource> TokenSource for CachingTokenSource<S> {
    async fn token(&self) -> Result<Token, AuthError> {
        if let Some(token) = self.read_cache()? {
            tracing::debug!(path = %self.path.display(), "using cached token");
            return Ok(token);
        }

        let token = self.inner.token().await?;
        self.write_cache(&token)?;
        tracing::info!(path = %self.path.display(), "token cached");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn make_token(access: &str) -> Token {
        Token {
            access_token: access.to_string(),
            token_type: "bearer".to_string(),
            refresh_token: Some("refresh_456".to_string()),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    /// Source that counts how often it is asked for a token.
    struct CountingSource {
        token: Token,
        calls: AtomicUsize,
    }

    impl CountingSource {
        fn new(token: Token) -> Self {
            Self {
                token,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenSource for CountingSource {
        async fn token(&self) -> Result<Token, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.token.clone())
        }
    }

    // === Token tests ===

    #[test]
    fn token_is_expired_when_past_expiry() {
        let mut token = make_token("t");
        token.expires_at = Utc::now() - Duration::hours(1);
        assert!(token.is_expired());

        token.expires_at = Utc::now() + Duration::hours(1);
        assert!(!token.is_expired());
    }

    #[test]
    fn token_serialization_round_trip() {
        let token = make_token("access_123");
        let json = serde_json::to_string(&token).unwrap();
        let back: Token = serde_json::from_str(&json).unwrap();

        assert_eq!(back, token);
    }

    // === CachingTokenSource tests ===

    #[tokio::test]
    async fn missing_cache_delegates_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        let source = CountingSource::new(make_token("fresh"));
        let caching = CachingTokenSource::new(source, path.clone());

        let token = caching.token().await.unwrap();

        assert_eq!(token.access_token, "fresh");
        assert_eq!(caching.inner.calls(), 1);
        assert!(path.exists());

        let persisted: Token =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(persisted, token);
    }

    #[tokio::test]
    async fn cached_token_is_served_without_invoking_inner_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        let cached = make_token("cached");
        std::fs::write(&path, serde_json::to_string(&cached).unwrap()).unwrap();

        let source = CountingSource::new(make_token("fresh"));
        let caching = CachingTokenSource::new(source, path);

        let first = caching.token().await.unwrap();
        let second = caching.token().await.unwrap();

        assert_eq!(first, cached);
        assert_eq!(second, cached);
        assert_eq!(caching.inner.calls(), 0);
    }

    #[tokio::test]
    async fn expired_cached_token_is_still_served() {
        // Staleness belongs to the wrapped source, not the cache layer.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        let mut cached = make_token("stale");
        cached.expires_at = Utc::now() - Duration::hours(1);
        std::fs::write(&path, serde_json::to_string(&cached).unwrap()).unwrap();

        let source = CountingSource::new(make_token("fresh"));
        let caching = CachingTokenSource::new(source, path);

        let token = caching.token().await.unwrap();

        assert_eq!(token.access_token, "stale");
        assert_eq!(caching.inner.calls(), 0);
    }

    #[tokio::test]
    async fn corrupt_cache_is_a_hard_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "{ not json").unwrap();

        let source = CountingSource::new(make_token("fresh"));
        let caching = CachingTokenSource::new(source, path);

        let result = caching.token().await;

        assert!(matches!(result, Err(AuthError::CacheDecode(_))));
        assert_eq!(caching.inner.calls(), 0);
    }

    #[tokio::test]
    async fn unwritable_cache_path_is_a_write_failure() {
        // The parent directory does not exist, so persisting must fail on
        // the write side of the taxonomy, not as a decode error.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("token.json");
        let source = CountingSource::new(make_token("fresh"));
        let caching = CachingTokenSource::new(source, path);

        let result = caching.token().await;

        assert!(matches!(result, Err(AuthError::CacheWrite(_))));
        assert_eq!(caching.inner.calls(), 1);
    }

    #[tokio::test]
    async fn populated_cache_overwrites_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");

        let first = CachingTokenSource::new(CountingSource::new(make_token("one")), path.clone());
        first.token().await.unwrap();

        std::fs::remove_file(&path).unwrap();

        let second = CachingTokenSource::new(CountingSource::new(make_token("two")), path.clone());
        let token = second.token().await.unwrap();

        assert_eq!(token.access_token, "two");
        let persisted: Token =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(persisted.access_token, "two");
    }
}
