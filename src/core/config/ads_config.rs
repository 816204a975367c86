use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Placeholder written for a developer token that still has to be filled in.
pub const DEVELOPER_TOKEN_PLACEHOLDER: &str = "YOUR-DEVELOPER-TOKEN";
pub const CLIENT_ID_PLACEHOLDER: &str = "YOUR-CLIENT-ID";
pub const CLIENT_SECRET_PLACEHOLDER: &str = "YOUR-CLIENT-SECRET";
pub const REFRESH_TOKEN_PLACEHOLDER: &str = "YOUR-REFRESH-TOKEN";

/// Request timeout (milliseconds) forced before each campaign run.
pub const NETWORK_TIMEOUT_MS: u64 = 60_000;

/// The `google-ads.yaml` settings file.
///
/// Keys we don't know about are carried in `extra` so rewriting the file
/// never drops them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdsConfig {
    #[serde(default)]
    pub developer_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_key_file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impersonated_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_proto_plus: Option<bool>,
    /// Milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl AdsConfig {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Sets the proxy (when given) and the network timeout used for the run.
    pub fn apply_network_overrides(&mut self, proxy: Option<&str>) {
        if let Some(proxy) = proxy {
            self.proxy = Some(proxy.to_string());
            tracing::info!("Added proxy setting: {}", proxy);
        }
        self.timeout = Some(NETWORK_TIMEOUT_MS);
    }

    /// `login_customer_id` without dashes, if one is set.
    pub fn login_customer_id_digits(&self) -> Option<String> {
        self.login_customer_id
            .as_deref()
            .map(|id| id.replace('-', ""))
            .filter(|id| !id.is_empty())
    }

    /// Resolves `json_key_file_path` against the directory holding the config file.
    pub fn resolved_key_path(&self, config_path: &Path) -> Option<PathBuf> {
        let key = Path::new(self.json_key_file_path.as_deref()?);
        if key.is_absolute() {
            return Some(key.to_path_buf());
        }
        let base = config_path.parent().unwrap_or_else(|| Path::new(""));
        Some(base.join(key))
    }

    pub fn has_oauth_credentials(&self) -> bool {
        let usable = |v: &Option<String>, placeholder: &str| {
            v.as_deref().map_or(false, |s| !s.is_empty() && s != placeholder)
        };
        usable(&self.client_id, CLIENT_ID_PLACEHOLDER)
            && usable(&self.client_secret, CLIENT_SECRET_PLACEHOLDER)
            && usable(&self.refresh_token, REFRESH_TOKEN_PLACEHOLDER)
    }

    pub fn developer_token_missing(&self) -> bool {
        self.developer_token.is_empty() || self.developer_token == DEVELOPER_TOKEN_PLACEHOLDER
    }
}

/// Template used by the OAuth helper when no config file exists yet.
pub fn oauth_template() -> String {
    format!(
        "# Google Ads API OAuth configuration\n\
         \n\
         developer_token: \"{}\"\n\
         client_id: \"{}\"\n\
         client_secret: \"{}\"\n\
         refresh_token: \"{}\"\n\
         use_proto_plus: true\n",
        DEVELOPER_TOKEN_PLACEHOLDER,
        CLIENT_ID_PLACEHOLDER,
        CLIENT_SECRET_PLACEHOLDER,
        REFRESH_TOKEN_PLACEHOLDER
    )
}

/// Fills the OAuth placeholders in raw config text. Everything else is left as-is.
pub fn substitute_oauth_placeholders(
    text: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> String {
    text.replace(CLIENT_ID_PLACEHOLDER, client_id)
        .replace(CLIENT_SECRET_PLACEHOLDER, client_secret)
        .replace(REFRESH_TOKEN_PLACEHOLDER, refresh_token)
}

/// Inputs for the service-account config file.
#[derive(Debug, Clone)]
pub struct ServiceAccountSettings<'a> {
    pub developer_token: Option<&'a str>,
    pub customer_id: &'a str,
    pub key_file_path: &'a str,
    pub generated_at: chrono::NaiveDateTime,
}

/// Renders the commented config file the service-account helper writes.
pub fn render_service_account_config(settings: &ServiceAccountSettings<'_>) -> String {
    let developer_token = settings
        .developer_token
        .filter(|t| !t.is_empty())
        .unwrap_or(DEVELOPER_TOKEN_PLACEHOLDER);

    format!(
        r#"# Google Ads API service account configuration
# Generated by search_ads_creator service-account on {generated}

# Developer token - issued after registering the app in the Google Ads API Center
developer_token: "{token}"

# Customer ID (no dashes)
login_customer_id: "{customer}"

# Path to the service account key file
json_key_file_path: "{key}"

# API settings
use_proto_plus: true
timeout: 3600
login_timezone: "America/New_York"
"#,
        generated = settings.generated_at.format("%Y-%m-%d %H:%M:%S"),
        token = yaml_escape(developer_token),
        customer = settings.customer_id.replace('-', ""),
        key = yaml_escape(settings.key_file_path),
    )
}

fn yaml_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Resolves `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> Vec<Component<'_>> {
    let mut parts: Vec<Component> = Vec::new();
    for part in path.components() {
        match part {
            Component::CurDir => {}
            Component::ParentDir => {
                let last = parts.last().copied();
                match last {
                    Some(Component::Normal(_)) => {
                        parts.pop();
                    }
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                    _ => parts.push(part),
                }
            }
            other => parts.push(other),
        }
    }
    parts
}

/// Path of `target` relative to `base`, walking up with `..` where needed.
/// Both paths should be absolute; mismatched roots return `target` unchanged.
pub fn relative_path(target: &Path, base: &Path) -> PathBuf {
    let target_parts = normalize(target);
    let base_parts = normalize(base);

    let common = target_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    if common == 0 {
        return target.to_path_buf();
    }

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &target_parts[common..] {
        relative.push(part.as_os_str());
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    relative
}
