// Google Ads infra layer.
// - `google_auth.rs` turns configured credentials into bearer tokens.
// - `google_ads_client.rs` talks to the Google Ads REST API.

#[path = "google_auth.rs"]
pub mod google_auth;

#[path = "google_ads_client.rs"]
pub mod google_ads_client;

pub use google_ads_client::GoogleAdsClient;
