use super::ads_api::{AdsApi, AdsError, CustomerId, GeoSuggestRequest, MutateRequest};
use super::campaign_models::{CampaignCriterion, CampaignPlan, LocationInfo};

/// Resource names created by one full run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignOutcome {
    pub customizer_attribute: Option<String>,
    pub customer_customizer: Option<String>,
    pub budget: String,
    pub campaign: String,
    pub ad_group: String,
    pub ads: Vec<String>,
    pub keywords: Vec<String>,
    pub campaign_criteria: Vec<String>,
}

/// Drives the fixed create sequence: budget, campaign, ad group, ad, keywords, geo targets.
pub struct CampaignService<A: AdsApi> {
    api: A,
    plan: CampaignPlan,
}

impl<A: AdsApi> CampaignService<A> {
    pub fn new(api: A, plan: CampaignPlan) -> Self {
        Self { api, plan }
    }

    pub async fn create(
        &self,
        customer_id: &CustomerId,
        customizer_attribute_name: Option<&str>,
    ) -> Result<CampaignOutcome, AdsError> {
        tracing::info!("Creating ads for customer ID {}", customer_id);

        let mut outcome = CampaignOutcome::default();

        if let Some(name) = customizer_attribute_name {
            let attribute = self.create_customizer_attribute(customer_id, name).await?;
            let link = self.link_customizer_to_customer(customer_id, &attribute).await?;
            outcome.customizer_attribute = Some(attribute);
            outcome.customer_customizer = Some(link);
        }

        outcome.budget = self.create_campaign_budget(customer_id).await?;
        tracing::info!("Created budget: {}", outcome.budget);

        outcome.campaign = self.create_campaign(customer_id, &outcome.budget).await?;
        tracing::info!("Created campaign: {}", outcome.campaign);

        outcome.ad_group = self.create_ad_group(customer_id, &outcome.campaign).await?;
        tracing::info!("Created ad group: {}", outcome.ad_group);

        outcome.ads = self
            .create_ad_group_ad(customer_id, &outcome.ad_group, customizer_attribute_name)
            .await?;
        outcome.keywords = self.add_keywords(customer_id, &outcome.ad_group).await?;
        outcome.campaign_criteria = self.add_geo_targeting(customer_id, &outcome.campaign).await?;

        tracing::info!("Ad creation complete");
        Ok(outcome)
    }

    async fn create_one(
        &self,
        customer_id: &CustomerId,
        request: MutateRequest,
    ) -> Result<String, AdsError> {
        let collection = request.collection();
        self.api
            .mutate(customer_id, request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AdsError::Response(format!("no result returned for {}", collection)))
    }

    async fn create_customizer_attribute(
        &self,
        customer_id: &CustomerId,
        name: &str,
    ) -> Result<String, AdsError> {
        let attribute = self.plan.customizer_attribute(name);
        let resource = self
            .create_one(customer_id, MutateRequest::CustomizerAttributes(vec![attribute]))
            .await?;
        tracing::info!("Added customizer attribute with resource name '{}'", resource);
        Ok(resource)
    }

    async fn link_customizer_to_customer(
        &self,
        customer_id: &CustomerId,
        attribute_resource: &str,
    ) -> Result<String, AdsError> {
        let customizer = self.plan.customer_customizer(attribute_resource);
        let resource = self
            .create_one(customer_id, MutateRequest::CustomerCustomizers(vec![customizer]))
            .await?;
        tracing::info!(
            "Added customizer attribute to customer with resource name '{}'",
            resource
        );
        Ok(resource)
    }

    async fn create_campaign_budget(&self, customer_id: &CustomerId) -> Result<String, AdsError> {
        self.create_one(
            customer_id,
            MutateRequest::CampaignBudgets(vec![self.plan.budget()]),
        )
        .await
    }

    async fn create_campaign(
        &self,
        customer_id: &CustomerId,
        budget_resource: &str,
    ) -> Result<String, AdsError> {
        self.create_one(
            customer_id,
            MutateRequest::Campaigns(vec![self.plan.campaign(budget_resource)]),
        )
        .await
    }

    async fn create_ad_group(
        &self,
        customer_id: &CustomerId,
        campaign_resource: &str,
    ) -> Result<String, AdsError> {
        self.create_one(
            customer_id,
            MutateRequest::AdGroups(vec![self.plan.ad_group(campaign_resource)]),
        )
        .await
    }

    async fn create_ad_group_ad(
        &self,
        customer_id: &CustomerId,
        ad_group_resource: &str,
        customizer_attribute_name: Option<&str>,
    ) -> Result<Vec<String>, AdsError> {
        let ad = self
            .plan
            .ad_group_ad(ad_group_resource, customizer_attribute_name);
        let results = self
            .api
            .mutate(customer_id, MutateRequest::AdGroupAds(vec![ad]))
            .await?;

        for resource in &results {
            tracing::info!("Created responsive search ad with resource name \"{}\"", resource);
        }
        Ok(results)
    }

    async fn add_keywords(
        &self,
        customer_id: &CustomerId,
        ad_group_resource: &str,
    ) -> Result<Vec<String>, AdsError> {
        let request = MutateRequest::AdGroupCriteria(self.plan.keyword_criteria(ad_group_resource));
        let count = request.len();
        let results = self.api.mutate(customer_id, request).await?;

        tracing::info!("Added {} keywords", count);
        for resource in &results {
            tracing::info!("Created keyword {}", resource);
        }
        Ok(results)
    }

    async fn add_geo_targeting(
        &self,
        customer_id: &CustomerId,
        campaign_resource: &str,
    ) -> Result<Vec<String>, AdsError> {
        let request = GeoSuggestRequest {
            locale: self.plan.locale.clone(),
            country_code: self.plan.country_code.clone(),
            location_names: self.plan.locations.clone(),
        };
        let suggestions = self.api.suggest_geo_targets(&request).await?;

        let mut criteria = Vec::with_capacity(suggestions.len());
        for suggestion in &suggestions {
            tracing::info!(
                "Geo target constant {} found in locale ({}) with reach ({}) for search term ({}).",
                suggestion.resource_name,
                suggestion.locale,
                suggestion.reach,
                suggestion.search_term
            );
            criteria.push(CampaignCriterion {
                campaign: campaign_resource.to_string(),
                location: LocationInfo {
                    geo_target_constant: suggestion.resource_name.clone(),
                },
            });
        }

        if criteria.is_empty() {
            tracing::warn!("No geo target constants matched {:?}", self.plan.locations);
            return Ok(Vec::new());
        }

        let results = self
            .api
            .mutate(customer_id, MutateRequest::CampaignCriteria(criteria))
            .await?;
        for resource in &results {
            tracing::info!("Added campaign criterion \"{}\"", resource);
        }
        Ok(results)
    }
}
