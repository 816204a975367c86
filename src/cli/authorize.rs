// `authorize`: runs the installed-app OAuth flow and writes the resulting
// credentials into `google-ads.yaml`.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::core::config::{
    oauth_template, substitute_oauth_placeholders, ConfigError, ConfigStore,
};
use crate::infra::config::YamlConfigStore;
use crate::infra::oauth::InstalledAppFlow;

#[derive(Debug, Clone, Args)]
pub struct AuthorizeArgs {
    /// OAuth client secrets JSON downloaded from the Google Cloud Console
    #[arg(long, env = "GOOGLE_ADS_CLIENT_SECRETS", default_value = "client_secrets.json")]
    pub client_secrets: PathBuf,

    /// Local port for the OAuth redirect
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
}

pub async fn run(args: &AuthorizeArgs, config_path: &Path) -> anyhow::Result<()> {
    let flow = InstalledAppFlow::from_file(&args.client_secrets).await?;
    let refresh_token = flow.run_local_server(args.port).await?;
    let secrets = flow.secrets();

    let rule = "=".repeat(80);
    println!("\n{}", rule);
    println!("Authorization succeeded. Your OAuth credentials:");
    println!("{}", rule);
    println!("Client ID: {}", secrets.client_id);
    println!("Client secret: {}", secrets.client_secret);
    println!("Refresh token: {}", refresh_token);
    println!("{}", rule);

    let store = YamlConfigStore::new(config_path);
    let created = write_credentials(
        &store,
        &secrets.client_id,
        &secrets.client_secret,
        &refresh_token,
    )
    .await?;

    if created {
        println!("\nCreated config file from template: {}", config_path.display());
    } else {
        println!("\nUpdated config file: {}", config_path.display());
    }
    println!("Remember to add your developer token to this file by hand.");
    Ok(())
}

/// Fills the OAuth placeholders in the config file, starting from the
/// template when the file doesn't exist yet. Returns true if it was created.
pub async fn write_credentials<S: ConfigStore>(
    store: &S,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<bool, ConfigError> {
    let created = !store.exists();
    let text = if created {
        oauth_template()
    } else {
        store.read_raw().await?
    };

    let updated = substitute_oauth_placeholders(&text, client_id, client_secret, refresh_token);
    store.write_raw(&updated).await?;
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AdsConfig;

    #[tokio::test]
    async fn test_creates_config_from_template() {
        let dir = tempfile::tempdir().unwrap();
        let store = YamlConfigStore::new(dir.path().join("google-ads.yaml"));

        let created = write_credentials(&store, "id-1", "secret-1", "refresh-1")
            .await
            .unwrap();
        assert!(created);

        let config = AdsConfig::from_yaml(&store.read_raw().await.unwrap()).unwrap();
        assert_eq!(config.client_id.as_deref(), Some("id-1"));
        assert_eq!(config.client_secret.as_deref(), Some("secret-1"));
        assert_eq!(config.refresh_token.as_deref(), Some("refresh-1"));
        assert!(config.developer_token_missing());
    }

    #[tokio::test]
    async fn test_existing_config_keeps_everything_else() {
        let dir = tempfile::tempdir().unwrap();
        let store = YamlConfigStore::new(dir.path().join("google-ads.yaml"));
        store
            .write_raw(
                "# mine\ndeveloper_token: \"dev\"\nclient_id: \"YOUR-CLIENT-ID\"\n\
                 client_secret: \"YOUR-CLIENT-SECRET\"\nrefresh_token: \"YOUR-REFRESH-TOKEN\"\n",
            )
            .await
            .unwrap();

        let created = write_credentials(&store, "id-2", "secret-2", "refresh-2")
            .await
            .unwrap();
        assert!(!created);

        let text = store.read_raw().await.unwrap();
        assert!(text.starts_with("# mine\ndeveloper_token: \"dev\"\n"));
        assert!(text.contains("client_id: \"id-2\""));
        assert!(text.contains("refresh_token: \"refresh-2\""));
        assert!(!text.contains("YOUR-"));
    }

    #[tokio::test]
    async fn test_missing_client_secrets_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = AuthorizeArgs {
            client_secrets: dir.path().join("client_secrets.json"),
            port: 0,
        };

        assert!(run(&args, &dir.path().join("google-ads.yaml")).await.is_err());
        assert!(!dir.path().join("google-ads.yaml").exists());
    }
}
