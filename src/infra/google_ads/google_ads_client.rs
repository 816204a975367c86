// =============================================================================
// GOOGLE ADS REST CLIENT
// =============================================================================
//
// Implements the core `AdsApi` trait over the Google Ads REST interface:
//
//   POST {base}/customers/{customer_id}/{collection}:mutate
//   POST {base}/geoTargetConstants:suggest
//
// Every call carries a bearer token, the `developer-token` header and, when
// configured, `login-customer-id` (required when acting through a manager
// account). Proxy and timeout come from `google-ads.yaml`.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Proxy, Response};
use serde::Deserialize;

use super::google_auth::{RefreshTokenAuth, ServiceAccountAuth, TokenSource};
use crate::core::campaign::{
    AdsApi, AdsError, ApiErrorDetail, CustomerId, GeoSuggestRequest, GeoTargetSuggestion,
    MutateRequest,
};
use crate::core::config::AdsConfig;

/// API version this client speaks.
pub const API_VERSION: &str = "v19";

const API_HOST: &str = "https://googleads.googleapis.com";

pub struct GoogleAdsClient {
    client: Client,
    base_url: String,
    developer_token: String,
    login_customer_id: Option<String>,
    auth: Box<dyn TokenSource>,
}

impl GoogleAdsClient {
    /// Builds a client from `google-ads.yaml`. Relative key paths resolve
    /// against `config_path`'s directory.
    pub async fn from_config(config: &AdsConfig, config_path: &Path) -> Result<Self, AdsError> {
        if config.developer_token_missing() {
            return Err(AdsError::Config(
                "developer_token is not set in the config file".to_string(),
            ));
        }

        let client = build_http_client(config)?;

        let key_path = config.resolved_key_path(config_path);
        let auth: Box<dyn TokenSource> = if let Some(key_path) = key_path {
            tracing::debug!("Using service account key {}", key_path.display());
            Box::new(
                ServiceAccountAuth::from_file(
                    &key_path,
                    config.impersonated_email.clone(),
                    client.clone(),
                )
                .await?,
            )
        } else if config.has_oauth_credentials() {
            tracing::debug!("Using installed-app OAuth credentials");
            Box::new(RefreshTokenAuth::new(
                config.client_id.clone().unwrap_or_default(),
                config.client_secret.clone().unwrap_or_default(),
                config.refresh_token.clone().unwrap_or_default(),
                client.clone(),
            ))
        } else {
            return Err(AdsError::Config(
                "no credentials configured: set json_key_file_path or client_id/client_secret/refresh_token"
                    .to_string(),
            ));
        };

        Ok(Self::with_token_source(
            client,
            config.developer_token.clone(),
            config.login_customer_id_digits(),
            auth,
        ))
    }

    pub fn with_token_source(
        client: Client,
        developer_token: String,
        login_customer_id: Option<String>,
        auth: Box<dyn TokenSource>,
    ) -> Self {
        Self {
            client,
            base_url: format!("{}/{}", API_HOST, API_VERSION),
            developer_token,
            login_customer_id,
            auth,
        }
    }

    async fn headers(&self) -> Result<HeaderMap, AdsError> {
        let token = self.auth.access_token().await?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| AdsError::Auth(e.to_string()))?,
        );
        headers.insert(
            "developer-token",
            HeaderValue::from_str(&self.developer_token)
                .map_err(|e| AdsError::Config(format!("invalid developer token: {}", e)))?,
        );
        if let Some(login) = &self.login_customer_id {
            headers.insert(
                "login-customer-id",
                HeaderValue::from_str(login)
                    .map_err(|e| AdsError::Config(format!("invalid login customer id: {}", e)))?,
            );
        }
        Ok(headers)
    }

    async fn post(&self, url: &str, body: &serde_json::Value) -> Result<Response, AdsError> {
        let headers = self.headers().await?;
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let header_request_id = response
            .headers()
            .get("request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response.text().await.map_err(transport_error)?;
        Err(parse_failure(status.as_u16(), header_request_id, &text))
    }
}

fn build_http_client(config: &AdsConfig) -> Result<Client, AdsError> {
    let mut builder = Client::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(Duration::from_millis(timeout));
    }
    if let Some(proxy) = config.proxy.as_deref().filter(|p| !p.is_empty()) {
        let proxy = Proxy::all(proxy)
            .map_err(|e| AdsError::Config(format!("invalid proxy '{}': {}", proxy, e)))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| AdsError::Config(format!("failed to build HTTP client: {}", e)))
}

/// Maps reqwest failures onto the connection/timeout classes the retry loop understands.
pub fn transport_error(err: reqwest::Error) -> AdsError {
    if err.is_timeout() {
        AdsError::Timeout(err.to_string())
    } else if err.is_connect() {
        AdsError::Connection(err.to_string())
    } else {
        AdsError::Response(err.to_string())
    }
}

#[async_trait]
impl AdsApi for GoogleAdsClient {
    async fn mutate(
        &self,
        customer_id: &CustomerId,
        request: MutateRequest,
    ) -> Result<Vec<String>, AdsError> {
        let url = format!(
            "{}/customers/{}/{}:mutate",
            self.base_url,
            customer_id,
            request.collection()
        );
        let body = request
            .to_body()
            .map_err(|e| AdsError::Response(format!("failed to encode request: {}", e)))?;

        let response: MutateResponse = self
            .post(&url, &body)
            .await?
            .json()
            .await
            .map_err(transport_error)?;

        Ok(response
            .results
            .into_iter()
            .map(|r| r.resource_name)
            .collect())
    }

    async fn suggest_geo_targets(
        &self,
        request: &GeoSuggestRequest,
    ) -> Result<Vec<GeoTargetSuggestion>, AdsError> {
        let url = format!("{}/geoTargetConstants:suggest", self.base_url);
        let body = serde_json::json!({
            "locale": request.locale,
            "countryCode": request.country_code,
            "locationNames": { "names": request.location_names },
        });

        let response: SuggestResponse = self
            .post(&url, &body)
            .await?
            .json()
            .await
            .map_err(transport_error)?;

        Ok(response
            .geo_target_constant_suggestions
            .into_iter()
            .filter_map(ApiSuggestion::into_suggestion)
            .collect())
    }
}

// =============================================================================
// RESPONSE STRUCTURES
// =============================================================================

#[derive(Debug, Deserialize)]
struct MutateResponse {
    #[serde(default)]
    results: Vec<MutateResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MutateResult {
    resource_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestResponse {
    #[serde(default)]
    geo_target_constant_suggestions: Vec<ApiSuggestion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSuggestion {
    locale: Option<String>,
    /// int64 fields arrive as JSON strings.
    reach: Option<serde_json::Value>,
    search_term: Option<String>,
    geo_target_constant: Option<ApiGeoTargetConstant>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiGeoTargetConstant {
    resource_name: String,
}

impl ApiSuggestion {
    fn into_suggestion(self) -> Option<GeoTargetSuggestion> {
        let reach = match &self.reach {
            Some(serde_json::Value::String(s)) => s.parse().unwrap_or_default(),
            Some(serde_json::Value::Number(n)) => n.as_i64().unwrap_or_default(),
            _ => 0,
        };
        Some(GeoTargetSuggestion {
            resource_name: self.geo_target_constant?.resource_name,
            locale: self.locale.unwrap_or_default(),
            reach,
            search_term: self.search_term.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiStatus,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<ApiFailure>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiFailure {
    #[serde(default)]
    errors: Vec<ApiError>,
    request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiError {
    #[serde(default)]
    message: String,
    location: Option<ApiErrorLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorLocation {
    #[serde(default)]
    field_path_elements: Vec<ApiFieldPathElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiFieldPathElement {
    field_name: String,
}

/// Decodes a Google Ads failure body. Bodies that are not the standard
/// envelope are kept verbatim in the message.
fn parse_failure(http_status: u16, header_request_id: Option<String>, body: &str) -> AdsError {
    let envelope = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope,
        Err(_) => {
            return AdsError::Api {
                request_id: header_request_id.unwrap_or_else(|| "unknown".to_string()),
                status: http_status.to_string(),
                message: body.trim().to_string(),
                errors: Vec::new(),
            }
        }
    };

    let mut request_id = header_request_id;
    let mut errors = Vec::new();
    for failure in envelope.error.details {
        if request_id.is_none() {
            request_id = failure.request_id;
        }
        for error in failure.errors {
            errors.push(ApiErrorDetail {
                message: error.message,
                field_path: error
                    .location
                    .map(|l| {
                        l.field_path_elements
                            .into_iter()
                            .map(|e| e.field_name)
                            .collect()
                    })
                    .unwrap_or_default(),
            });
        }
    }

    AdsError::Api {
        request_id: request_id.unwrap_or_else(|| "unknown".to_string()),
        status: if envelope.error.status.is_empty() {
            http_status.to_string()
        } else {
            envelope.error.status
        },
        message: envelope.error.message,
        errors,
    }
}
