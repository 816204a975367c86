// =============================================================================
// INSTALLED-APP OAUTH FLOW
// =============================================================================
//
// Obtains a refresh token for the Google Ads API with a desktop OAuth client.
//
// **Setup:**
// 1. Google Cloud Console > "APIs & Services" > "Credentials"
// 2. "Create Credentials" > "OAuth client ID" > Application type "Desktop app"
// 3. Download the JSON and save it as `client_secrets.json`
//
// **Flow:**
// - A loopback listener is bound on `localhost:<port>`
// - The user opens the printed consent URL and signs in
// - Google redirects back with `?code=...&state=...`
// - The code is exchanged for tokens; `access_type=offline` plus
//   `prompt=consent` makes Google return a refresh token every time

use std::path::Path;

use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use url::Url;

use crate::infra::google_ads::google_auth::{ADWORDS_SCOPE, DEFAULT_TOKEN_URI};

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";

const NOT_FOUND_RESPONSE: &[u8] =
    b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("OAuth client secrets file '{0}' does not exist. Download it from the Google Cloud Console.")]
    SecretsNotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid client secrets file: {0}")]
    InvalidSecrets(String),
    #[error("authorization was denied: {0}")]
    Denied(String),
    #[error("state parameter mismatch, possible CSRF")]
    StateMismatch,
    #[error("token exchange failed: {0}")]
    TokenExchange(String),
    #[error("Google did not return a refresh token")]
    NoRefreshToken,
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

/// The `installed` section of a downloaded OAuth client file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ClientSecrets {
    pub fn from_json(json: &str) -> Result<Self, OAuthError> {
        let file: ClientSecretsFile =
            serde_json::from_str(json).map_err(|e| OAuthError::InvalidSecrets(e.to_string()))?;
        file.installed.or(file.web).ok_or_else(|| {
            OAuthError::InvalidSecrets("expected an 'installed' client section".to_string())
        })
    }
}

/// Query parameters Google appends to the redirect.
#[derive(Debug, Default, PartialEq)]
pub struct RedirectParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Parses the request line of the redirect, e.g. `GET /?code=..&state=.. HTTP/1.1`.
pub fn parse_redirect_request(request_line: &str) -> Option<RedirectParams> {
    let mut parts = request_line.split_whitespace();
    if parts.next()? != "GET" {
        return None;
    }
    let target = parts.next()?;
    let url = Url::parse(&format!("http://localhost{}", target)).ok()?;

    let mut params = RedirectParams::default();
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => params.code = Some(value.into_owned()),
            "state" => params.state = Some(value.into_owned()),
            "error" => params.error = Some(value.into_owned()),
            _ => {}
        }
    }

    if params.code.is_none() && params.error.is_none() {
        return None;
    }
    Some(params)
}

/// Tokens returned by a successful code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

pub struct InstalledAppFlow {
    secrets: ClientSecrets,
    client: Client,
}

impl InstalledAppFlow {
    pub fn new(secrets: ClientSecrets) -> Self {
        Self {
            secrets,
            client: Client::new(),
        }
    }

    pub async fn from_file(path: &Path) -> Result<Self, OAuthError> {
        if !path.exists() {
            return Err(OAuthError::SecretsNotFound(path.display().to_string()));
        }
        let text = tokio::fs::read_to_string(path).await?;
        Ok(Self::new(ClientSecrets::from_json(&text)?))
    }

    pub fn secrets(&self) -> &ClientSecrets {
        &self.secrets
    }

    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> Result<Url, OAuthError> {
        let mut url = Url::parse(&self.secrets.auth_uri)
            .map_err(|e| OAuthError::InvalidSecrets(format!("bad auth_uri: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.secrets.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", ADWORDS_SCOPE)
            .append_pair("state", state)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");
        Ok(url)
    }

    /// Runs the whole browser round trip and returns the refresh token.
    pub async fn run_local_server(&self, port: u16) -> Result<String, OAuthError> {
        let listener = TcpListener::bind(("127.0.0.1", port)).await?;
        let redirect_uri = format!("http://localhost:{}/", port);
        let state: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(30)
            .map(char::from)
            .collect();

        let auth_url = self.authorization_url(&redirect_uri, &state)?;
        println!("\n{}", "=".repeat(80));
        println!("Open the following URL in your browser to authorize access to Google Ads:");
        println!("\n{}\n", auth_url);
        println!("Sign in with the Google account that manages the Ads account.");
        println!("{}\n", "=".repeat(80));

        let params = self.wait_for_redirect(&listener).await?;
        if let Some(error) = params.error {
            return Err(OAuthError::Denied(error));
        }
        if params.state.as_deref() != Some(state.as_str()) {
            return Err(OAuthError::StateMismatch);
        }
        let code = params
            .code
            .ok_or_else(|| OAuthError::Denied("no authorization code".to_string()))?;

        let tokens = self.exchange_code(&code, &redirect_uri).await?;
        tokens.refresh_token.ok_or(OAuthError::NoRefreshToken)
    }

    /// Accepts connections until one carries the OAuth redirect.
    async fn wait_for_redirect(
        &self,
        listener: &TcpListener,
    ) -> Result<RedirectParams, OAuthError> {
        loop {
            let (mut stream, peer) = listener.accept().await?;
            let (reader, mut writer) = stream.split();
            let mut request_line = String::new();
            BufReader::new(reader).read_line(&mut request_line).await?;

            match parse_redirect_request(&request_line) {
                Some(params) => {
                    let body = if params.error.is_some() {
                        "Authorization failed. You can close this window."
                    } else {
                        "Authorization complete. You can close this window and return to the terminal."
                    };
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    writer.write_all(response.as_bytes()).await?;
                    return Ok(params);
                }
                None => {
                    tracing::debug!(
                        "Ignoring unrelated request from {}: {}",
                        peer,
                        request_line.trim()
                    );
                    writer.write_all(NOT_FOUND_RESPONSE).await?;
                }
            }
        }
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<OAuthTokens, OAuthError> {
        let response = self
            .client
            .post(&self.secrets.token_uri)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.secrets.client_id.as_str()),
                ("client_secret", self.secrets.client_secret.as_str()),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| OAuthError::TokenExchange(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(OAuthError::TokenExchange(format!("{}: {}", status, text)));
        }

        response
            .json()
            .await
            .map_err(|e| OAuthError::TokenExchange(e.to_string()))
    }
}
