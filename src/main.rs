// Entry point of the search ads creator.
//
// **Architecture Overview:**
// - `core/` = Campaign plan, API seam, config and retry logic (no I/O)
// - `infra/` = Implementations of core traits (Google Ads REST, OAuth, YAML file)
// - `cli/` = Subcommands, run logs and prompts
//
// This file's job is to:
// 1. Load `.env` and parse the command line
// 2. Open the run log for the chosen command and install tracing
// 3. Dispatch and map the outcome to an exit code

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "cli/cli_layer.rs"]
mod cli;
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::cli::authorize::AuthorizeArgs;
use crate::cli::create_campaign::CreateCampaignArgs;
use crate::cli::run_log::{init_tracing, RunLog};
use crate::cli::service_account::ServiceAccountArgs;
use crate::cli::{authorize, create_campaign, prompt, service_account};

#[derive(Debug, Parser)]
#[command(name = "search_ads_creator", version, about = "Create Google Ads search campaigns")]
struct Cli {
    /// Path to google-ads.yaml
    #[arg(long, global = true, env = "GOOGLE_ADS_CONFIG", default_value = "google-ads.yaml")]
    config: PathBuf,

    /// Directory for run logs
    #[arg(long, global = true, env = "GOOGLE_ADS_LOG_DIR", default_value = ".")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the search campaign, ad group, ad, keywords and targeting
    CreateCampaign(CreateCampaignArgs),
    /// Validate a service account key and write google-ads.yaml for it
    ServiceAccount(ServiceAccountArgs),
    /// Obtain an OAuth refresh token and store it in google-ads.yaml
    Authorize(AuthorizeArgs),
}

impl Command {
    /// Run log file name and header for commands that keep one.
    fn run_log(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Command::CreateCampaign(args) if args.mock => {
                Some((args.log_file_name(), "Starting search ad creation log (mock mode)"))
            }
            Command::CreateCampaign(args) => {
                Some((args.log_file_name(), "Starting search ad creation log"))
            }
            Command::ServiceAccount(_) => {
                Some((service_account::LOG_FILE_NAME, service_account::LOG_TITLE))
            }
            Command::Authorize(_) => None,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file (if it exists) before clap
    // reads its env fallbacks.
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let run_log = match cli.command.run_log() {
        Some((file_name, title)) => match RunLog::start(&cli.log_dir, file_name, title) {
            Ok(log) => Some(log),
            Err(e) => {
                eprintln!("Could not open run log {}: {}", file_name, e);
                None
            }
        },
        None => None,
    };
    let log_path = run_log.as_ref().map(|log| log.path().to_path_buf());
    init_tracing(run_log);

    let result = match &cli.command {
        Command::CreateCampaign(args) => {
            create_campaign::run(args, &cli.config, || {
                prompt::confirm("Network connection failed. Use mock mode?")
            })
            .await
        }
        Command::ServiceAccount(args) => service_account::run(args, &cli.config).await,
        Command::Authorize(args) => authorize::run(args, &cli.config).await,
    };

    if let Some(path) = log_path {
        tracing::info!("Log written to {}", path.display());
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn env_of(subcommand: &str, arg: &str) -> Option<String> {
        let cli = Cli::command();
        let sub = cli.find_subcommand(subcommand)?;
        let arg = sub.get_arguments().find(|a| a.get_id() == arg)?;
        arg.get_env().map(|e| e.to_string_lossy().into_owned())
    }

    #[test]
    fn test_path_options_have_env_fallbacks() {
        assert_eq!(env_of("create-campaign", "plan").as_deref(), Some("GOOGLE_ADS_PLAN"));
        assert_eq!(
            env_of("service-account", "key_file").as_deref(),
            Some("GOOGLE_ADS_KEY_FILE")
        );
        assert_eq!(
            env_of("authorize", "client_secrets").as_deref(),
            Some("GOOGLE_ADS_CLIENT_SECRETS")
        );

        let cli = Cli::command();
        let global_env: Vec<_> = cli
            .get_arguments()
            .filter_map(|a| a.get_env())
            .map(|e| e.to_string_lossy().into_owned())
            .collect();
        assert!(global_env.contains(&"GOOGLE_ADS_CONFIG".to_string()));
        assert!(global_env.contains(&"GOOGLE_ADS_LOG_DIR".to_string()));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
