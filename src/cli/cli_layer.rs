// CLI layer - one module per subcommand plus the shared terminal helpers.

#[path = "authorize.rs"]
pub mod authorize;

#[path = "create_campaign.rs"]
pub mod create_campaign;

#[path = "prompt.rs"]
pub mod prompt;

#[path = "run_log.rs"]
pub mod run_log;

#[path = "service_account.rs"]
pub mod service_account;
