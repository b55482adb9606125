//! Bearer-token verification against an external identity provider's JWKS.
//!
//! The key set is fetched once at startup and held for the process lifetime;
//! cache refresh and key rotation are the identity provider's concern.

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims decoded from a verified access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerClaims {
    /// Subject (user ID), kept for audit logging.
    pub sub: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify a bearer token's signature and expiry, returning its claims.
    async fn verify(&self, token: &str) -> Result<CallerClaims, anyhow::Error>;
}

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kty: String,
    #[serde(default)]
    kid: Option<String>,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

/// Verifies RS256 tokens against keys fetched from a JWKS URL.
pub struct JwksVerifier {
    keys: Vec<(Option<String>, DecodingKey)>,
}

impl JwksVerifier {
    /// Fetch the key set from the identity provider and build decoding keys.
    pub async fn fetch(jwks_url: &str) -> Result<Self, anyhow::Error> {
        let set: JwkSet = reqwest::Client::new()
            .get(jwks_url)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to fetch JWKS from {}: {}", jwks_url, e))?
            .error_for_status()
            .map_err(|e| anyhow::anyhow!("JWKS endpoint returned error: {}", e))?
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse JWKS: {}", e))?;

        let mut keys = Vec::new();
        for jwk in set.keys {
            if jwk.kty != "RSA" {
                continue;
            }
            let (n, e) = match (&jwk.n, &jwk.e) {
                (Some(n), Some(e)) => (n, e),
                _ => continue,
            };
            let key = DecodingKey::from_rsa_components(n, e)
                .map_err(|e| anyhow::anyhow!("Invalid RSA key in JWKS: {}", e))?;
            keys.push((jwk.kid, key));
        }

        if keys.is_empty() {
            anyhow::bail!("JWKS at {} contains no usable RSA keys", jwks_url);
        }

        tracing::info!(key_count = keys.len(), "JWKS verifier initialized");

        Ok(Self { keys })
    }

    fn key_for(&self, kid: Option<&str>) -> Result<&DecodingKey, anyhow::Error> {
        match kid {
            Some(kid) => self
                .keys
                .iter()
                .find(|(k, _)| k.as_deref() == Some(kid))
                .map(|(_, key)| key)
                .ok_or_else(|| anyhow::anyhow!("No JWKS key matches kid {}", kid)),
            // Tokens without a kid are only verifiable against a single-key set.
            None if self.keys.len() == 1 => Ok(&self.keys[0].1),
            None => Err(anyhow::anyhow!("Token header has no kid")),
        }
    }
}

#[async_trait]
impl TokenVerifier for JwksVerifier {
    async fn verify(&self, token: &str) -> Result<CallerClaims, anyhow::Error> {
        let header =
            decode_header(token).map_err(|e| anyhow::anyhow!("Malformed token: {}", e))?;
        let key = self.key_for(header.kid.as_deref())?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;
        validation.validate_aud = false;

        let token_data = decode::<CallerClaims>(token, key, &validation)
            .map_err(|e| anyhow::anyhow!("Invalid access token: {}", e))?;

        Ok(token_data.claims)
    }
}

/// Verifier accepting exactly one pre-shared token, for tests.
pub struct StaticTokenVerifier {
    token: String,
    subject: String,
}

impl StaticTokenVerifier {
    pub fn new(token: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            subject: subject.into(),
        }
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<CallerClaims, anyhow::Error> {
        if token == self.token {
            Ok(CallerClaims {
                sub: self.subject.clone(),
                exp: i64::MAX,
            })
        } else {
            Err(anyhow::anyhow!("Invalid access token"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_verifier_accepts_configured_token() {
        let verifier = StaticTokenVerifier::new("secret-token", "user_123");

        let claims = verifier
            .verify("secret-token")
            .await
            .expect("token should verify");
        assert_eq!(claims.sub, "user_123");
    }

    #[tokio::test]
    async fn static_verifier_rejects_other_tokens() {
        let verifier = StaticTokenVerifier::new("secret-token", "user_123");

        assert!(verifier.verify("wrong-token").await.is_err());
        assert!(verifier.verify("").await.is_err());
    }
}
