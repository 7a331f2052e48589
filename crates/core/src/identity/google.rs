//! Google ID-token verification.
//!
//! Tokens are RS256-signed by Google. The published key set is fetched over HTTPS and reused
//! for [`GOOGLE_KEYS_TTL_SECS`]; the issuer must be one of [`GOOGLE_ISSUERS`] and the audience
//! must be the configured OAuth client id.

use crate::constants::{GOOGLE_CERTS_URL, GOOGLE_ISSUERS, GOOGLE_KEYS_TTL_SECS};
use crate::{CoreError, CoreResult};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;

/// What a verified Google ID token tells us about the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleIdentity {
    pub subject: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

#[derive(Debug)]
struct CachedKeys {
    keys: JwkSet,
    fetched_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct GoogleTokenVerifier {
    client_id: String,
    certs_url: String,
    http: reqwest::Client,
    cache: RwLock<Option<CachedKeys>>,
}

impl GoogleTokenVerifier {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            certs_url: GOOGLE_CERTS_URL.to_string(),
            http: reqwest::Client::new(),
            cache: RwLock::new(None),
        }
    }

    /// A verifier that starts with `keys` already cached.
    pub fn with_keys(client_id: impl Into<String>, keys: JwkSet) -> Self {
        Self {
            cache: RwLock::new(Some(CachedKeys {
                keys,
                fetched_at: Utc::now(),
            })),
            ..Self::new(client_id)
        }
    }

    /// Verifies `id_token` and returns the identity it asserts.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Unauthorized`] if the token is malformed, signed with an unknown key, or
    ///   fails signature, issuer, audience or expiry checks.
    /// - [`CoreError::GoogleKeys`] if Google's key set cannot be fetched.
    pub async fn verify(&self, id_token: &str) -> CoreResult<GoogleIdentity> {
        let rejected = || CoreError::Unauthorized("invalid Google token".into());

        let header = decode_header(id_token).map_err(|_| rejected())?;
        if header.alg != Algorithm::RS256 {
            return Err(rejected());
        }
        let kid = header.kid.ok_or_else(rejected)?;

        let keys = self.current_keys().await?;
        let jwk = keys.find(&kid).ok_or_else(rejected)?;
        let key = DecodingKey::from_jwk(jwk).map_err(|_| rejected())?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.set_issuer(GOOGLE_ISSUERS);

        let claims = decode::<GoogleClaims>(id_token, &key, &validation)
            .map_err(|e| {
                tracing::debug!("Google token rejected: {}", e);
                rejected()
            })?
            .claims;

        Ok(GoogleIdentity {
            subject: claims.sub,
            email: claims.email.map(|e| e.trim().to_lowercase()),
            email_verified: claims.email_verified.unwrap_or(false),
            name: claims.name,
            picture: claims.picture,
        })
    }

    async fn current_keys(&self) -> CoreResult<JwkSet> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if Utc::now() - cached.fetched_at < Duration::seconds(GOOGLE_KEYS_TTL_SECS) {
                    return Ok(cached.keys.clone());
                }
            }
        }

        let mut cache = self.cache.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some(cached) = cache.as_ref() {
            if Utc::now() - cached.fetched_at < Duration::seconds(GOOGLE_KEYS_TTL_SECS) {
                return Ok(cached.keys.clone());
            }
        }

        tracing::info!("fetching Google signing keys");
        let keys: JwkSet = self
            .http
            .get(&self.certs_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(CoreError::GoogleKeys)?
            .json()
            .await
            .map_err(CoreError::GoogleKeys)?;

        *cache = Some(CachedKeys {
            keys: keys.clone(),
            fetched_at: Utc::now(),
        });
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    fn unsigned_token(header: &str, payload: &str) -> String {
        format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload),
            URL_SAFE_NO_PAD.encode("sig")
        )
    }

    fn verifier() -> GoogleTokenVerifier {
        GoogleTokenVerifier::with_keys("client-123", JwkSet { keys: Vec::new() })
    }

    const TEST_KEY_PEM: &str = include_str!("../../test-data/google_test_key.pem");
    const TEST_JWKS: &str = include_str!("../../test-data/google_test_jwks.json");

    fn keyed_verifier() -> GoogleTokenVerifier {
        let keys: JwkSet = serde_json::from_str(TEST_JWKS).expect("test key set should parse");
        GoogleTokenVerifier::with_keys("client-123", keys)
    }

    fn signed_token(aud: &str, iss: &str) -> String {
        let mut header = jsonwebtoken::Header::new(Algorithm::RS256);
        header.kid = Some("test-key-1".into());
        let claims = serde_json::json!({
            "sub": "google-sub-1",
            "aud": aud,
            "iss": iss,
            "exp": Utc::now().timestamp() + 600,
            "email": "Ada@Example.com",
            "email_verified": true,
            "name": "Ada Lovelace",
        });
        let key = jsonwebtoken::EncodingKey::from_rsa_pem(TEST_KEY_PEM.as_bytes())
            .expect("test key should load");
        jsonwebtoken::encode(&header, &claims, &key).expect("token should sign")
    }

    #[tokio::test]
    async fn test_malformed_token_is_unauthorized() {
        let err = verifier().verify("garbage").await.unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_non_rs256_token_is_unauthorized() {
        let token = unsigned_token(r#"{"alg":"HS256","typ":"JWT","kid":"k1"}"#, r#"{"sub":"1"}"#);
        let err = verifier().verify(&token).await.unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_unknown_key_id_is_unauthorized() {
        let token = unsigned_token(r#"{"alg":"RS256","typ":"JWT","kid":"k1"}"#, r#"{"sub":"1"}"#);
        let err = verifier().verify(&token).await.unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_signed_token_is_accepted() {
        let identity = keyed_verifier()
            .verify(&signed_token("client-123", "https://accounts.google.com"))
            .await
            .expect("token should verify");
        assert_eq!(identity.subject, "google-sub-1");
        assert_eq!(identity.email.as_deref(), Some("ada@example.com"));
        assert!(identity.email_verified);
        assert_eq!(identity.name.as_deref(), Some("Ada Lovelace"));

        keyed_verifier()
            .verify(&signed_token("client-123", "accounts.google.com"))
            .await
            .expect("bare issuer form should verify");
    }

    #[tokio::test]
    async fn test_wrong_audience_is_unauthorized() {
        let err = keyed_verifier()
            .verify(&signed_token("other-client", "https://accounts.google.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_foreign_issuer_is_unauthorized() {
        let err = keyed_verifier()
            .verify(&signed_token("client-123", "evil.example"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Unauthorized(_)));
    }
}
