use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use super::campaign_models::{
    AdGroup, AdGroupAd, AdGroupCriterion, Campaign, CampaignBudget, CampaignCriterion,
    CustomerCustomizer, CustomizerAttribute,
};
use crate::core::retry::Transient;

/// One entry of a failed API call, with the field path it points at.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiErrorDetail {
    pub message: String,
    pub field_path: Vec<String>,
}

/// Errors surfaced by an advertising API backend.
#[derive(Debug, Error)]
pub enum AdsError {
    #[error("failed to connect: {0}")]
    Connection(String),
    #[error("request timeout: {0}")]
    Timeout(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("request {request_id} failed with status {status}: {message}")]
    Api {
        request_id: String,
        status: String,
        message: String,
        errors: Vec<ApiErrorDetail>,
    },
    #[error("invalid client configuration: {0}")]
    Config(String),
    #[error("unexpected API response: {0}")]
    Response(String),
}

impl Transient for AdsError {
    fn is_transient(&self) -> bool {
        match self {
            AdsError::Connection(_) | AdsError::Timeout(_) => true,
            other => crate::core::retry::looks_transient(&other.to_string()),
        }
    }
}

/// A Google Ads customer id, stored as ten digits without dashes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CustomerId {
    type Err = AdsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.trim().chars().filter(|c| *c != '-').collect();
        if digits.len() != 10 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(AdsError::Config(format!(
                "customer id '{}' must be 10 digits (dashes allowed)",
                s
            )));
        }
        Ok(Self(digits))
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A batch of resources to create in one mutate call.
#[derive(Debug, Clone)]
pub enum MutateRequest {
    CustomizerAttributes(Vec<CustomizerAttribute>),
    CustomerCustomizers(Vec<CustomerCustomizer>),
    CampaignBudgets(Vec<CampaignBudget>),
    Campaigns(Vec<Campaign>),
    AdGroups(Vec<AdGroup>),
    AdGroupAds(Vec<AdGroupAd>),
    AdGroupCriteria(Vec<AdGroupCriterion>),
    CampaignCriteria(Vec<CampaignCriterion>),
}

impl MutateRequest {
    /// The REST collection the batch is posted to (`customers/{id}/<collection>:mutate`).
    pub fn collection(&self) -> &'static str {
        match self {
            MutateRequest::CustomizerAttributes(_) => "customizerAttributes",
            MutateRequest::CustomerCustomizers(_) => "customerCustomizers",
            MutateRequest::CampaignBudgets(_) => "campaignBudgets",
            MutateRequest::Campaigns(_) => "campaigns",
            MutateRequest::AdGroups(_) => "adGroups",
            MutateRequest::AdGroupAds(_) => "adGroupAds",
            MutateRequest::AdGroupCriteria(_) => "adGroupCriteria",
            MutateRequest::CampaignCriteria(_) => "campaignCriteria",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            MutateRequest::CustomizerAttributes(v) => v.len(),
            MutateRequest::CustomerCustomizers(v) => v.len(),
            MutateRequest::CampaignBudgets(v) => v.len(),
            MutateRequest::Campaigns(v) => v.len(),
            MutateRequest::AdGroups(v) => v.len(),
            MutateRequest::AdGroupAds(v) => v.len(),
            MutateRequest::AdGroupCriteria(v) => v.len(),
            MutateRequest::CampaignCriteria(v) => v.len(),
        }
    }

    /// Request body: `{"operations": [{"create": ...}, ...]}`.
    pub fn to_body(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            MutateRequest::CustomizerAttributes(v) => create_operations(v),
            MutateRequest::CustomerCustomizers(v) => create_operations(v),
            MutateRequest::CampaignBudgets(v) => create_operations(v),
            MutateRequest::Campaigns(v) => create_operations(v),
            MutateRequest::AdGroups(v) => create_operations(v),
            MutateRequest::AdGroupAds(v) => create_operations(v),
            MutateRequest::AdGroupCriteria(v) => create_operations(v),
            MutateRequest::CampaignCriteria(v) => create_operations(v),
        }
    }
}

fn create_operations<T: Serialize>(items: &[T]) -> Result<serde_json::Value, serde_json::Error> {
    let mut operations = Vec::with_capacity(items.len());
    for item in items {
        operations.push(serde_json::json!({ "create": serde_json::to_value(item)? }));
    }
    Ok(serde_json::json!({ "operations": operations }))
}

/// Location-name lookup for geo targeting.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoSuggestRequest {
    pub locale: String,
    pub country_code: String,
    pub location_names: Vec<String>,
}

/// A geo target constant matched for one of the requested names.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoTargetSuggestion {
    pub resource_name: String,
    pub locale: String,
    pub reach: i64,
    pub search_term: String,
}

/// The advertising API surface the campaign workflow depends on.
#[async_trait]
pub trait AdsApi: Send + Sync {
    /// Creates every resource in the batch and returns their resource names in order.
    async fn mutate(
        &self,
        customer_id: &CustomerId,
        request: MutateRequest,
    ) -> Result<Vec<String>, AdsError>;

    async fn suggest_geo_targets(
        &self,
        request: &GeoSuggestRequest,
    ) -> Result<Vec<GeoTargetSuggestion>, AdsError>;
}
