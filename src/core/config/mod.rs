pub mod ads_config;
pub mod config_store;
pub mod service_account_key;

pub use ads_config::{
    oauth_template, relative_path, render_service_account_config, substitute_oauth_placeholders,
    AdsConfig, ServiceAccountSettings, DEVELOPER_TOKEN_PLACEHOLDER,
};
pub use config_store::{ConfigError, ConfigStore};
pub use service_account_key::{KeyFileError, ServiceAccountKey};
