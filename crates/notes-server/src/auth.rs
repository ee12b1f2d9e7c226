//! Bearer token verification against the identity provider's JWKS.
//!
//! Tokens are asymmetrically signed JWTs. The verifier resolves the signing
//! key by the token's `kid` header from a local cache of the provider's JSON
//! Web Key Set. An unknown `kid` triggers a refetch of the whole set (at most
//! once per cooldown after a successful fetch), which is how rotated keys are
//! picked up.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use notes_core::UserId;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use crate::config::AuthConfig;
use crate::error::ApiError;

/// Verified token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (subject).
    pub sub: UserId,
    /// Audience the token was issued for.
    pub aud: Audience,
    /// Expiration time (unix timestamp).
    pub exp: u64,
    #[serde(default)]
    pub email: Option<String>,
    /// Provider role, e.g. "authenticated".
    #[serde(default)]
    pub role: Option<String>,
}

/// The `aud` claim may be a single string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Many(Vec<String>),
}

/// Why a token was rejected.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token header has no key id")]
    MissingKeyId,

    #[error("Token algorithm {0:?} is not accepted")]
    UnsupportedAlgorithm(Algorithm),

    #[error("No signing key found for key id {0:?}")]
    UnknownKey(String),

    #[error("Unable to fetch JWKS to verify token")]
    JwksUnavailable(String),

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token audience")]
    InvalidAudience,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Malformed token: {0}")]
    Malformed(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

/// Upper bound on one JWKS request.
const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Verifies bearer tokens, caching the provider's public keys by key id.
pub struct TokenVerifier {
    jwks_url: String,
    audience: String,
    algorithms: Vec<Algorithm>,
    refresh_cooldown: Duration,
    http: reqwest::Client,
    keys: RwLock<HashMap<String, DecodingKey>>,
    /// Held for the duration of a refetch; records the last successful one.
    refresh: Mutex<Option<Instant>>,
}

impl TokenVerifier {
    /// Create a verifier with an empty key cache.
    ///
    /// Keys are fetched lazily on the first token.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            jwks_url: config.jwks_url.clone(),
            audience: config.audience.clone(),
            algorithms: config.algorithms.clone(),
            refresh_cooldown: config.refresh_cooldown,
            http: reqwest::Client::new(),
            keys: RwLock::new(HashMap::new()),
            refresh: Mutex::new(None),
        }
    }

    /// Create a verifier whose cache starts out holding `keys`.
    pub fn with_keys(config: &AuthConfig, keys: &JwkSet) -> Self {
        let verifier = Self::new(config);
        Self {
            keys: RwLock::new(decoding_keys(keys)),
            ..verifier
        }
    }

    /// Verify `token` and return its claims.
    ///
    /// Fails when the signing key cannot be resolved, the signature does not
    /// match, the token has expired or was issued for another audience.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::Malformed(e.to_string()))?;

        if !self.algorithms.contains(&header.alg) {
            return Err(AuthError::UnsupportedAlgorithm(header.alg));
        }
        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;
        let key = self.key_for(&kid).await?;

        let mut validation = Validation::new(header.alg);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "sub", "aud"]);

        let data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidAudience => AuthError::InvalidAudience,
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            _ => AuthError::Malformed(e.to_string()),
        })?;

        Ok(data.claims)
    }

    /// Number of keys currently cached.
    pub async fn cached_key_count(&self) -> usize {
        self.keys.read().await.len()
    }

    async fn cached_key(&self, kid: &str) -> Option<DecodingKey> {
        self.keys.read().await.get(kid).cloned()
    }

    /// Resolve `kid`, refetching the key set when it is not cached.
    ///
    /// Only one refetch runs at a time. The key map is never locked across
    /// the HTTP request, so tokens with cached keys keep verifying while a
    /// refetch is pending.
    async fn key_for(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(key) = self.cached_key(kid).await {
            return Ok(key);
        }

        let mut last_fetch = self.refresh.lock().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some(key) = self.cached_key(kid).await {
            return Ok(key);
        }
        if last_fetch.is_some_and(|at| at.elapsed() < self.refresh_cooldown) {
            return Err(AuthError::UnknownKey(kid.to_string()));
        }

        let fetched = decoding_keys(&self.fetch_jwks().await?);
        *last_fetch = Some(Instant::now());
        tracing::info!(keys = fetched.len(), "Refreshed JWKS");

        let key = fetched.get(kid).cloned();
        *self.keys.write().await = fetched;
        key.ok_or_else(|| AuthError::UnknownKey(kid.to_string()))
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        let unavailable = |e: reqwest::Error| {
            tracing::warn!(error = %e, url = %self.jwks_url, "JWKS fetch failed");
            AuthError::JwksUnavailable(e.to_string())
        };

        self.http
            .get(&self.jwks_url)
            .timeout(JWKS_FETCH_TIMEOUT)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(unavailable)?
            .json::<JwkSet>()
            .await
            .map_err(unavailable)
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("jwks_url", &self.jwks_url)
            .field("audience", &self.audience)
            .field("algorithms", &self.algorithms)
            .finish_non_exhaustive()
    }
}

/// Usable keys of `set` by key id. Keys without an id or with parameters
/// the decoder does not understand are skipped.
fn decoding_keys(set: &JwkSet) -> HashMap<String, DecodingKey> {
    set.keys
        .iter()
        .filter_map(|jwk| {
            let kid = jwk.common.key_id.clone()?;
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => Some((kid, key)),
                Err(e) => {
                    tracing::warn!(kid = %kid, error = %e, "Skipping unusable JWK");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        JwksEndpoint, OTHER_KEY, TEST_KEY, TokenSpec, UNREACHABLE_JWKS, auth_config, jwk_set,
        mint_token, serve_jwks, serve_jwks_endpoint,
    };
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use uuid::Uuid;

    fn verifier() -> TokenVerifier {
        TokenVerifier::with_keys(&auth_config(UNREACHABLE_JWKS), &jwk_set(&[TEST_KEY]))
    }

    #[tokio::test]
    async fn test_valid_token() {
        let user = Uuid::new_v4();
        let token = mint_token(&TokenSpec::valid(user));

        let claims = verifier().verify(&token).await.unwrap();
        assert_eq!(claims.sub, UserId::from_uuid(user));
        assert_eq!(claims.aud, Audience::Single("authenticated".to_string()));
        assert_eq!(claims.role.as_deref(), Some("authenticated"));
    }

    #[tokio::test]
    async fn test_expired_token() {
        let spec = TokenSpec {
            exp_offset_secs: -3600,
            ..TokenSpec::valid(Uuid::new_v4())
        };
        let err = verifier().verify(&mint_token(&spec)).await.unwrap_err();
        assert!(matches!(err, AuthError::Expired));
    }

    #[tokio::test]
    async fn test_wrong_audience() {
        let spec = TokenSpec {
            audience: json!("anon"),
            ..TokenSpec::valid(Uuid::new_v4())
        };
        let err = verifier().verify(&mint_token(&spec)).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidAudience));
    }

    #[tokio::test]
    async fn test_audience_list_containing_expected() {
        let spec = TokenSpec {
            audience: json!(["anon", "authenticated"]),
            ..TokenSpec::valid(Uuid::new_v4())
        };
        let claims = verifier().verify(&mint_token(&spec)).await.unwrap();
        assert_eq!(
            claims.aud,
            Audience::Many(vec!["anon".to_string(), "authenticated".to_string()])
        );
    }

    #[tokio::test]
    async fn test_audience_list_without_expected() {
        let spec = TokenSpec {
            audience: json!(["anon", "service_role"]),
            ..TokenSpec::valid(Uuid::new_v4())
        };
        let err = verifier().verify(&mint_token(&spec)).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidAudience));
    }

    #[tokio::test]
    async fn test_signature_from_other_key() {
        // Signed by OTHER_KEY's private half but claiming TEST_KEY's kid.
        let spec = TokenSpec {
            signing_key: OTHER_KEY,
            kid: Some(TEST_KEY.kid.to_string()),
            ..TokenSpec::valid(Uuid::new_v4())
        };
        let err = verifier().verify(&mint_token(&spec)).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidSignature));
    }

    #[tokio::test]
    async fn test_missing_kid() {
        let spec = TokenSpec {
            omit_kid: true,
            ..TokenSpec::valid(Uuid::new_v4())
        };
        let err = verifier().verify(&mint_token(&spec)).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingKeyId));
    }

    #[tokio::test]
    async fn test_malformed_token() {
        let err = verifier().verify("not.a.jwt").await.unwrap_err();
        assert!(matches!(err, AuthError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_algorithm_not_in_allow_list() {
        let mut config = auth_config(UNREACHABLE_JWKS);
        config.algorithms = vec![Algorithm::RS256];
        let verifier = TokenVerifier::with_keys(&config, &jwk_set(&[TEST_KEY]));

        let token = mint_token(&TokenSpec::valid(Uuid::new_v4()));
        let err = verifier.verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::UnsupportedAlgorithm(Algorithm::EdDSA)));
    }

    #[tokio::test]
    async fn test_unknown_kid_with_unreachable_jwks() {
        let spec = TokenSpec {
            signing_key: OTHER_KEY,
            ..TokenSpec::valid(Uuid::new_v4())
        };
        let err = verifier().verify(&mint_token(&spec)).await.unwrap_err();
        assert!(matches!(err, AuthError::JwksUnavailable(_)));
    }

    #[tokio::test]
    async fn test_keys_fetched_lazily() {
        let (url, _jwks) = serve_jwks(jwk_set(&[TEST_KEY])).await;
        let verifier = TokenVerifier::new(&auth_config(&url));
        assert_eq!(verifier.cached_key_count().await, 0);

        let token = mint_token(&TokenSpec::valid(Uuid::new_v4()));
        verifier.verify(&token).await.unwrap();
        assert_eq!(verifier.cached_key_count().await, 1);
    }

    #[tokio::test]
    async fn test_rotation_refetches_on_unknown_kid() {
        let (url, jwks) = serve_jwks(jwk_set(&[TEST_KEY])).await;
        let verifier = TokenVerifier::with_keys(&auth_config(&url), &jwk_set(&[TEST_KEY]));

        // The provider rotates to a new key.
        *jwks.keys.write().await = jwk_set(&[TEST_KEY, OTHER_KEY]);

        let spec = TokenSpec {
            signing_key: OTHER_KEY,
            ..TokenSpec::valid(Uuid::new_v4())
        };
        verifier.verify(&mint_token(&spec)).await.unwrap();
        assert_eq!(verifier.cached_key_count().await, 2);
    }

    #[tokio::test]
    async fn test_refetch_throttled_by_cooldown() {
        let (url, jwks) = serve_jwks(jwk_set(&[TEST_KEY])).await;
        let mut config = auth_config(&url);
        config.refresh_cooldown = Duration::from_secs(3600);
        let verifier = TokenVerifier::new(&config);

        // First token populates the cache.
        verifier
            .verify(&mint_token(&TokenSpec::valid(Uuid::new_v4())))
            .await
            .unwrap();

        *jwks.keys.write().await = jwk_set(&[TEST_KEY, OTHER_KEY]);
        let spec = TokenSpec {
            signing_key: OTHER_KEY,
            ..TokenSpec::valid(Uuid::new_v4())
        };
        let err = verifier.verify(&mint_token(&spec)).await.unwrap_err();
        assert!(matches!(err, AuthError::UnknownKey(_)));
    }

    #[tokio::test]
    async fn test_failed_fetch_does_not_start_cooldown() {
        let endpoint = JwksEndpoint::new(jwk_set(&[TEST_KEY]));
        endpoint.available.store(false, Ordering::SeqCst);
        let (url, jwks) = serve_jwks_endpoint(endpoint).await;
        let mut config = auth_config(&url);
        config.refresh_cooldown = Duration::from_secs(3600);
        let verifier = TokenVerifier::new(&config);

        let token = mint_token(&TokenSpec::valid(Uuid::new_v4()));
        let err = verifier.verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::JwksUnavailable(_)));

        // The provider recovers well inside the cooldown window.
        jwks.available.store(true, Ordering::SeqCst);
        verifier.verify(&token).await.unwrap();
        assert_eq!(verifier.cached_key_count().await, 1);
    }

    #[tokio::test]
    async fn test_cached_key_verifies_while_refetch_pending() {
        let endpoint = JwksEndpoint {
            delay: Duration::from_secs(2),
            ..JwksEndpoint::new(jwk_set(&[TEST_KEY, OTHER_KEY]))
        };
        let (url, _jwks) = serve_jwks_endpoint(endpoint).await;
        let verifier = Arc::new(TokenVerifier::with_keys(
            &auth_config(&url),
            &jwk_set(&[TEST_KEY]),
        ));

        // An unknown kid starts a slow refetch.
        let rotated = mint_token(&TokenSpec {
            signing_key: OTHER_KEY,
            ..TokenSpec::valid(Uuid::new_v4())
        });
        let pending = tokio::spawn({
            let verifier = verifier.clone();
            async move { verifier.verify(&rotated).await }
        });
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!pending.is_finished());

        let token = mint_token(&TokenSpec::valid(Uuid::new_v4()));
        let claims = tokio::time::timeout(Duration::from_secs(1), verifier.verify(&token))
            .await
            .expect("cached key blocked behind the refetch")
            .unwrap();
        assert_eq!(claims.aud, Audience::Single("authenticated".to_string()));

        pending.await.unwrap().unwrap();
        assert_eq!(verifier.cached_key_count().await, 2);
    }
}
