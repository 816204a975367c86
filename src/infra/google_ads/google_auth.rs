// =============================================================================
// GOOGLE OAUTH2 ACCESS TOKENS
// =============================================================================
//
// The Google Ads API accepts a bearer token from either of two credential
// kinds, both configured in `google-ads.yaml`:
//
// 1. **Service account** (`json_key_file_path`):
//    - A signed JWT is exchanged for an access token (jwt-bearer grant)
//    - `impersonated_email` adds a `sub` claim for domain-wide delegation
//
// 2. **Installed-app OAuth** (`client_id`, `client_secret`, `refresh_token`):
//    - The refresh token from `authorize` is exchanged for an access token
//
// Tokens are cached and refreshed shortly before they expire.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::core::campaign::AdsError;

/// OAuth scope for the Google Ads API.
pub const ADWORDS_SCOPE: &str = "https://www.googleapis.com/auth/adwords";

/// Google's token endpoint, used when a credential does not name one.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Refresh this long before the reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(300);

/// Something that can hand out a bearer token for API calls.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, AdsError>;
}

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// Cached access token with expiration.
struct CachedToken {
    token: String,
    expires_at: SystemTime,
}

/// Shared cache logic for both credential kinds.
#[derive(Clone, Default)]
struct TokenCache {
    inner: Arc<RwLock<Option<CachedToken>>>,
}

impl TokenCache {
    async fn get(&self) -> Option<String> {
        let cached = self.inner.read().await;
        cached
            .as_ref()
            .filter(|t| t.expires_at > SystemTime::now() + EXPIRY_MARGIN)
            .map(|t| t.token.clone())
    }

    async fn put(&self, response: &TokenResponse) {
        let mut cached = self.inner.write().await;
        *cached = Some(CachedToken {
            token: response.access_token.clone(),
            expires_at: SystemTime::now() + Duration::from_secs(response.expires_in),
        });
    }
}

/// Posts a token request form and decodes the answer.
async fn exchange(
    client: &Client,
    token_uri: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse, AdsError> {
    let response = client
        .post(token_uri)
        .form(form)
        .send()
        .await
        .map_err(super::google_ads_client::transport_error)?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(AdsError::Auth(format!(
            "token exchange failed ({}): {}",
            status, text
        )));
    }

    response
        .json()
        .await
        .map_err(|e| AdsError::Auth(format!("malformed token response: {}", e)))
}

// =============================================================================
// SERVICE ACCOUNT
// =============================================================================

/// Service account credentials from the JSON key file.
#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountCredentials {
    client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// JWT claims for the jwt-bearer grant.
#[derive(Debug, Serialize)]
struct JwtClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: u64,
    exp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
}

pub struct ServiceAccountAuth {
    credentials: ServiceAccountCredentials,
    impersonated_email: Option<String>,
    client: Client,
    cache: TokenCache,
}

impl ServiceAccountAuth {
    pub async fn from_file(
        path: &Path,
        impersonated_email: Option<String>,
        client: Client,
    ) -> Result<Self, AdsError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            AdsError::Config(format!(
                "cannot read service account key {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content, impersonated_email, client)
    }

    pub fn from_json(
        json: &str,
        impersonated_email: Option<String>,
        client: Client,
    ) -> Result<Self, AdsError> {
        let credentials: ServiceAccountCredentials = serde_json::from_str(json)
            .map_err(|e| AdsError::Config(format!("invalid service account key: {}", e)))?;
        Ok(Self {
            credentials,
            impersonated_email,
            client,
            cache: TokenCache::default(),
        })
    }

    fn claims(&self, now: u64) -> JwtClaims {
        JwtClaims {
            iss: self.credentials.client_email.clone(),
            scope: ADWORDS_SCOPE.to_string(),
            aud: self.credentials.token_uri.clone(),
            iat: now,
            exp: now + 3600,
            sub: self.impersonated_email.clone(),
        }
    }

    async fn fetch_new_token(&self) -> Result<TokenResponse, AdsError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AdsError::Auth(e.to_string()))?
            .as_secs();

        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())
            .map_err(|e| AdsError::Config(format!("invalid private key: {}", e)))?;
        let jwt = encode(&Header::new(Algorithm::RS256), &self.claims(now), &key)
            .map_err(|e| AdsError::Auth(format!("failed to sign assertion: {}", e)))?;

        exchange(
            &self.client,
            &self.credentials.token_uri,
            &[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", &jwt),
            ],
        )
        .await
    }
}

#[async_trait]
impl TokenSource for ServiceAccountAuth {
    async fn access_token(&self) -> Result<String, AdsError> {
        if let Some(token) = self.cache.get().await {
            return Ok(token);
        }

        tracing::debug!(
            "Requesting access token for service account {}",
            self.credentials.client_email
        );
        let response = self.fetch_new_token().await?;
        self.cache.put(&response).await;
        Ok(response.access_token)
    }
}

// =============================================================================
// REFRESH TOKEN (INSTALLED APP)
// =============================================================================

pub struct RefreshTokenAuth {
    client_id: String,
    client_secret: String,
    refresh_token: String,
    client: Client,
    cache: TokenCache,
}

impl RefreshTokenAuth {
    pub fn new(
        client_id: String,
        client_secret: String,
        refresh_token: String,
        client: Client,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            refresh_token,
            client,
            cache: TokenCache::default(),
        }
    }
}

#[async_trait]
impl TokenSource for RefreshTokenAuth {
    async fn access_token(&self) -> Result<String, AdsError> {
        if let Some(token) = self.cache.get().await {
            return Ok(token);
        }

        let response = exchange(
            &self.client,
            DEFAULT_TOKEN_URI,
            &[
                ("grant_type", "refresh_token"),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
                ("refresh_token", &self.refresh_token),
            ],
        )
        .await?;
        self.cache.put(&response).await;
        Ok(response.access_token)
    }
}
