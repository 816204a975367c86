// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "campaign/mod.rs"]
pub mod campaign;

#[path = "config/mod.rs"]
pub mod config;

#[path = "retry/retry_policy.rs"]
pub mod retry;
