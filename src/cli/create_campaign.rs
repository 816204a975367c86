// `create-campaign`: the main workflow.
//
// Loads `google-ads.yaml`, forces the network settings for this run, then
// builds a client and runs the create sequence under the retry policy. When
// connection failures outlast the retries the user may fall back to the
// offline simulation; the run still counts as failed.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Args;

use crate::core::campaign::{
    log_mock_run, AdsApi, AdsError, CampaignOutcome, CampaignPlan, CampaignService, CustomerId,
};
use crate::core::config::ConfigStore;
use crate::core::retry::{RetryError, RetryPolicy};
use crate::infra::config::YamlConfigStore;
use crate::infra::google_ads::GoogleAdsClient;

#[derive(Debug, Clone, Args)]
pub struct CreateCampaignArgs {
    /// Google Ads customer ID (dashes optional)
    #[arg(short = 'c', long, env = "GOOGLE_ADS_CUSTOMER_ID", default_value = "278-639-3017")]
    pub customer_id: String,

    /// Name of the customizer attribute to create
    #[arg(short = 'n', long, default_value = "BelkSalePrice")]
    pub customizer_attribute_name: String,

    /// Don't create a customizer attribute
    #[arg(long)]
    pub no_customizer: bool,

    /// HTTP proxy, e.g. http://host:port
    #[arg(long, env = "GOOGLE_ADS_PROXY")]
    pub proxy: Option<String>,

    /// Simulate the run without contacting the API
    #[arg(long)]
    pub mock: bool,

    /// Retries after a connection failure
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// Seconds to wait between retries
    #[arg(long, default_value_t = 5)]
    pub retry_interval: u64,

    /// YAML file replacing the built-in campaign plan
    #[arg(long, env = "GOOGLE_ADS_PLAN")]
    pub plan: Option<PathBuf>,

    /// Never ask about falling back to mock mode
    #[arg(long)]
    pub no_prompt: bool,
}

impl CreateCampaignArgs {
    fn customizer(&self) -> Option<&str> {
        if self.no_customizer || self.customizer_attribute_name.is_empty() {
            None
        } else {
            Some(self.customizer_attribute_name.as_str())
        }
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries, Duration::from_secs(self.retry_interval))
    }

    pub fn log_file_name(&self) -> &'static str {
        if self.mock {
            "ad_creation_mock_log.txt"
        } else {
            "ad_creation_log.txt"
        }
    }
}

pub async fn run(
    args: &CreateCampaignArgs,
    config_path: &Path,
    confirm: impl FnOnce() -> bool,
) -> anyhow::Result<()> {
    let customer_id: CustomerId = args.customer_id.parse()?;
    let plan = load_plan(args.plan.as_deref()).await?;

    if args.mock {
        log_mock_run(&customer_id, args.customizer(), &plan);
        return Ok(());
    }

    let store = YamlConfigStore::new(config_path);
    if !store.exists() {
        tracing::error!("Config file does not exist: {}", config_path.display());
        tracing::error!("Run `service-account` or `authorize` first to create it");
        bail!("missing config file {}", config_path.display());
    }

    let mut config = store.load().await?;
    config.apply_network_overrides(args.proxy.as_deref());
    store.save(&config).await?;
    tracing::info!("Updated network settings in {}", config_path.display());

    let config = &config;
    let result = execute(
        &args.retry_policy(),
        move || async move {
            tracing::info!("Using config file: {}", config_path.display());
            let client = GoogleAdsClient::from_config(config, config_path).await?;
            tracing::info!("Loaded Google Ads client");
            Ok(client)
        },
        &plan,
        &customer_id,
        args.customizer(),
    )
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(RetryError::Fatal(err)) => {
            log_ads_error(&err);
            Err(err.into())
        }
        Err(RetryError::Exhausted { attempts, last }) => {
            log_ads_error(&last);
            tracing::error!("Network connection failed after {} attempt(s)", attempts);
            if !args.no_prompt && confirm() {
                log_mock_run(&customer_id, args.customizer(), &plan);
            }
            bail!("could not reach the Google Ads API: {}", last)
        }
    }
}

async fn load_plan(path: Option<&Path>) -> anyhow::Result<CampaignPlan> {
    let Some(path) = path else {
        return Ok(CampaignPlan::default());
    };
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read plan {}", path.display()))?;
    CampaignPlan::from_yaml(&text).with_context(|| format!("invalid plan {}", path.display()))
}

/// Connects and runs the full create sequence, retrying transient failures.
/// A fresh client is built for every attempt.
pub async fn execute<A, F, Fut>(
    policy: &RetryPolicy,
    mut connect: F,
    plan: &CampaignPlan,
    customer_id: &CustomerId,
    customizer: Option<&str>,
) -> Result<CampaignOutcome, RetryError<AdsError>>
where
    A: AdsApi,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<A, AdsError>>,
{
    policy
        .run(move |attempt| {
            let connecting = connect();
            async move {
                tracing::debug!("Attempt {}", attempt);
                let api = connecting.await?;
                CampaignService::new(api, plan.clone())
                    .create(customer_id, customizer)
                    .await
            }
        })
        .await
}

fn log_ads_error(err: &AdsError) {
    match err {
        AdsError::Api {
            request_id,
            status,
            errors,
            message,
        } => {
            tracing::error!(
                "Request ID \"{}\" failed with status \"{}\" and includes the following errors:",
                request_id,
                status
            );
            if errors.is_empty() {
                tracing::error!("Error message \"{}\"", message);
            }
            for error in errors {
                tracing::error!("Error message \"{}\"", error.message);
                for field in &error.field_path {
                    tracing::error!("\t\tOn field: {}", field);
                }
            }
        }
        other => tracing::error!("Error: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::campaign::{GeoSuggestRequest, GeoTargetSuggestion, MutateRequest};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Fails every mutate with the given error text; counts calls.
    struct FlakyApi {
        error: fn() -> AdsError,
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl AdsApi for FlakyApi {
        async fn mutate(
            &self,
            _customer_id: &CustomerId,
            _request: MutateRequest,
        ) -> Result<Vec<String>, AdsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err((self.error)())
        }

        async fn suggest_geo_targets(
            &self,
            _request: &GeoSuggestRequest,
        ) -> Result<Vec<GeoTargetSuggestion>, AdsError> {
            Ok(Vec::new())
        }
    }

    fn customer() -> CustomerId {
        "278-639-3017".parse().unwrap()
    }

    fn policy(retries: u32) -> RetryPolicy {
        RetryPolicy::new(retries, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_connection_failures_are_attempted_retries_plus_one_times() {
        let connects = AtomicU32::new(0);
        let calls = Arc::new(AtomicU32::new(0));

        let result = execute(
            &policy(3),
            || {
                connects.fetch_add(1, Ordering::SeqCst);
                let calls = Arc::clone(&calls);
                async move {
                    Ok(FlakyApi {
                        error: || AdsError::Connection("connection refused".into()),
                        calls,
                    })
                }
            },
            &CampaignPlan::default(),
            &customer(),
            None,
        )
        .await;

        assert!(matches!(result, Err(RetryError::Exhausted { attempts: 4, .. })));
        assert_eq!(connects.load(Ordering::SeqCst), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_api_rejection_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));

        let result = execute(
            &policy(3),
            || {
                let calls = Arc::clone(&calls);
                async move {
                    Ok(FlakyApi {
                        error: || AdsError::Api {
                            request_id: "r".into(),
                            status: "PERMISSION_DENIED".into(),
                            message: "The caller does not have permission".into(),
                            errors: vec![],
                        },
                        calls,
                    })
                }
            },
            &CampaignPlan::default(),
            &customer(),
            Some("BelkSalePrice"),
        )
        .await;

        assert!(matches!(result, Err(RetryError::Fatal(AdsError::Api { .. }))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_client_setup_failure_is_fatal() {
        let connects = AtomicU32::new(0);

        let result = execute(
            &policy(3),
            || {
                connects.fetch_add(1, Ordering::SeqCst);
                async {
                    Err::<FlakyApi, _>(AdsError::Config("developer_token is not set".into()))
                }
            },
            &CampaignPlan::default(),
            &customer(),
            None,
        )
        .await;

        assert!(matches!(result, Err(RetryError::Fatal(AdsError::Config(_)))));
        assert_eq!(connects.load(Ordering::SeqCst), 1);
    }

    fn args(mock: bool) -> CreateCampaignArgs {
        CreateCampaignArgs {
            customer_id: "278-639-3017".to_string(),
            customizer_attribute_name: "BelkSalePrice".to_string(),
            no_customizer: false,
            proxy: None,
            mock,
            retries: 0,
            retry_interval: 0,
            plan: None,
            no_prompt: true,
        }
    }

    #[tokio::test]
    async fn test_mock_run_needs_no_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("google-ads.yaml");

        run(&args(true), &config, || panic!("no prompt in mock mode"))
            .await
            .unwrap();
        assert!(!config.exists());
    }

    #[tokio::test]
    async fn test_missing_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("google-ads.yaml");

        assert!(run(&args(false), &config, || false).await.is_err());
    }

    #[tokio::test]
    async fn test_run_applies_network_overrides_before_connecting() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("google-ads.yaml");
        // No credentials, so client setup fails fatally after the rewrite.
        std::fs::write(&config, "developer_token: \"dev\"\ntimeout: 3600\n").unwrap();

        let mut with_proxy = args(false);
        with_proxy.proxy = Some("http://127.0.0.1:7890".to_string());
        assert!(run(&with_proxy, &config, || false).await.is_err());

        let saved = YamlConfigStore::new(&config).load().await.unwrap();
        assert_eq!(saved.timeout, Some(60_000));
        assert_eq!(saved.proxy.as_deref(), Some("http://127.0.0.1:7890"));
    }

    /// OAuth credentials behind a proxy nobody listens on, so every token
    /// request is refused.
    fn unreachable_setup(dir: &Path) -> (PathBuf, CreateCampaignArgs) {
        let config = dir.join("google-ads.yaml");
        std::fs::write(
            &config,
            "developer_token: \"dev\"\nclient_id: \"id\"\n\
             client_secret: \"secret\"\nrefresh_token: \"refresh\"\n",
        )
        .unwrap();

        let mut unreachable = args(false);
        unreachable.proxy = Some("http://127.0.0.1:1".to_string());
        unreachable.retries = 2;
        (config, unreachable)
    }

    #[tokio::test]
    async fn test_exhausted_retries_offer_mock_and_still_fail() {
        let dir = tempfile::tempdir().unwrap();
        let (config, mut unreachable) = unreachable_setup(dir.path());
        unreachable.no_prompt = false;

        let asked = AtomicU32::new(0);
        let result = run(&unreachable, &config, || {
            asked.fetch_add(1, Ordering::SeqCst);
            true
        })
        .await;

        assert_eq!(asked.load(Ordering::SeqCst), 1);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("could not reach the Google Ads API"), "got {}", err);
    }

    #[tokio::test]
    async fn test_no_prompt_skips_the_question() {
        let dir = tempfile::tempdir().unwrap();
        let (config, unreachable) = unreachable_setup(dir.path());
        assert!(unreachable.no_prompt);

        let result = run(&unreachable, &config, || panic!("prompted despite --no-prompt")).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_invalid_customer_id_fails_early() {
        let mut bad = args(true);
        bad.customer_id = "12-34".to_string();
        assert!(run(&bad, Path::new("unused.yaml"), || false).await.is_err());
    }

    #[test]
    fn test_log_file_name_follows_mode() {
        assert_eq!(args(true).log_file_name(), "ad_creation_mock_log.txt");
        assert_eq!(args(false).log_file_name(), "ad_creation_log.txt");
    }

    #[test]
    fn test_no_customizer() {
        let mut a = args(false);
        assert_eq!(a.customizer(), Some("BelkSalePrice"));
        a.no_customizer = true;
        assert_eq!(a.customizer(), None);
    }
}
