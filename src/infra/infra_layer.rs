// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "google_ads/mod.rs"]
pub mod google_ads;

#[path = "oauth/installed_app_flow.rs"]
pub mod oauth;

#[path = "config/yaml_store.rs"]
pub mod config;
