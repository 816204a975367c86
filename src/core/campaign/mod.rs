pub mod ads_api;
pub mod campaign_models;
pub mod campaign_service;
pub mod mock_campaign;

pub use ads_api::{
    AdsApi, AdsError, ApiErrorDetail, CustomerId, GeoSuggestRequest, GeoTargetSuggestion,
    MutateRequest,
};
pub use campaign_models::CampaignPlan;
pub use campaign_service::{CampaignOutcome, CampaignService};
pub use mock_campaign::log_mock_run;
