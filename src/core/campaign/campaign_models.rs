use serde::{Deserialize, Serialize};

/// Landing page for every ad in the campaign.
pub const FINAL_URL: &str = "https://www.belk.com/?cm_mmc=AFL-Ebates+Performance+Marketing%2C+Inc.+dba+Rakuten+Rewards-11602495-SKUcategory-&cjevent=abd6d59307ed11f0824a010e0a1cb825&click_id=abd6d59307ed11f0824a010e0a1cb825&cjdata=MXxOfDB8WXwxNzQ2NjI1NzgyMDEx&ogmap=AFF%7CRTN%7C46157%7CSTND%7CMULTI%7CSITEWIDE%7C%7C%7C%7C";

/// Value the customer-level customizer substitutes into the ad at serve time.
pub const CUSTOMIZER_VALUE: &str = "Up to 70% OFF";

// =============================================================================
// VENDOR RESOURCES
// =============================================================================
//
// These mirror the JSON shape of the Google Ads REST resources we create.
// Only the fields we set are modelled; everything is camelCase on the wire.

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomizerAttribute {
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomizerValue {
    #[serde(rename = "type")]
    pub value_type: String,
    pub string_value: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCustomizer {
    pub customizer_attribute: String,
    pub value: CustomizerValue,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CampaignBudget {
    pub name: String,
    pub delivery_method: String,
    pub amount_micros: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TargetSpend {
    pub target_spend_micros: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSettings {
    pub target_google_search: bool,
    pub target_search_network: bool,
    pub target_partner_search_network: bool,
    pub target_content_network: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub name: String,
    pub advertising_channel_type: String,
    pub status: String,
    pub target_spend: TargetSpend,
    pub campaign_budget: String,
    pub network_settings: NetworkSettings,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdGroup {
    pub name: String,
    pub status: String,
    pub campaign: String,
    #[serde(rename = "type")]
    pub ad_group_type: String,
    pub cpc_bid_micros: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdTextAsset {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_field: Option<String>,
}

impl AdTextAsset {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pinned_field: None,
        }
    }

    pub fn pinned(text: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pinned_field: Some(field.into()),
        }
    }

    /// Text asset whose content is filled by a customizer attribute at serve time.
    pub fn with_customizer(attribute_name: &str) -> Self {
        Self::new(format!("Shop Now: {{CUSTOMIZER.{}}}", attribute_name))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponsiveSearchAd {
    pub headlines: Vec<AdTextAsset>,
    pub descriptions: Vec<AdTextAsset>,
    pub path1: String,
    pub path2: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ad {
    pub final_urls: Vec<String>,
    pub responsive_search_ad: ResponsiveSearchAd,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdGroupAd {
    pub status: String,
    pub ad_group: String,
    pub ad: Ad,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeywordMatchType {
    Exact,
    Phrase,
    Broad,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KeywordInfo {
    pub text: String,
    pub match_type: KeywordMatchType,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdGroupCriterion {
    pub ad_group: String,
    pub status: String,
    pub keyword: KeywordInfo,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationInfo {
    pub geo_target_constant: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CampaignCriterion {
    pub campaign: String,
    pub location: LocationInfo,
}

// =============================================================================
// CAMPAIGN PLAN
// =============================================================================

/// One keyword to add to the ad group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordSpec {
    pub text: String,
    pub match_type: KeywordMatchType,
}

impl KeywordSpec {
    fn new(text: &str, match_type: KeywordMatchType) -> Self {
        Self {
            text: text.to_string(),
            match_type,
        }
    }
}

/// Everything advertiser-specific about the campaign we create.
///
/// The built-in plan is [`CampaignPlan::default`]. A YAML file with the same
/// field names can replace it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CampaignPlan {
    pub budget_name_prefix: String,
    pub budget_amount_micros: i64,
    pub campaign_name_prefix: String,
    pub network_settings: NetworkSettings,
    pub ad_group_name_prefix: String,
    pub cpc_bid_micros: i64,
    pub final_url: String,
    /// The first headline is pinned to `HEADLINE_1`.
    pub headlines: Vec<String>,
    pub descriptions: Vec<String>,
    pub path1: String,
    pub path2: String,
    pub keywords: Vec<KeywordSpec>,
    pub locations: Vec<String>,
    pub locale: String,
    pub country_code: String,
    pub customizer_value: String,
}

impl Default for CampaignPlan {
    fn default() -> Self {
        Self {
            budget_name_prefix: "Belk Campaign Budget".to_string(),
            budget_amount_micros: 1_000_000,
            campaign_name_prefix: "Belk.com Fashion Campaign".to_string(),
            network_settings: NetworkSettings {
                target_google_search: true,
                target_search_network: true,
                target_partner_search_network: false,
                target_content_network: true,
            },
            ad_group_name_prefix: "Belk Fashion Deals".to_string(),
            cpc_bid_micros: 2_000_000,
            final_url: FINAL_URL.to_string(),
            headlines: vec![
                "Shop Belk.com Fashion Deals".to_string(),
                "Up to 70% Off Designer Brands".to_string(),
                "Free Shipping on Orders $49+".to_string(),
            ],
            descriptions: vec![
                "Shop the latest fashion trends, homeware & beauty at Belk.com. Find amazing deals today!".to_string(),
                "Belk.com - Discover designer clothing, shoes, accessories & more. Shop now!".to_string(),
            ],
            path1: "fashion".to_string(),
            path2: "deals".to_string(),
            keywords: vec![
                KeywordSpec::new("belk department store", KeywordMatchType::Exact),
                KeywordSpec::new("belk online shopping", KeywordMatchType::Phrase),
                KeywordSpec::new("clothing deals belk", KeywordMatchType::Broad),
                KeywordSpec::new("belk coupon codes", KeywordMatchType::Broad),
                KeywordSpec::new("belk designer clothes", KeywordMatchType::Broad),
                KeywordSpec::new("belk online store", KeywordMatchType::Broad),
                KeywordSpec::new("belk home decor", KeywordMatchType::Broad),
                KeywordSpec::new("belk shoes sale", KeywordMatchType::Broad),
            ],
            locations: vec![
                "New York".to_string(),
                "Los Angeles".to_string(),
                "Chicago".to_string(),
            ],
            locale: "en".to_string(),
            country_code: "US".to_string(),
            customizer_value: CUSTOMIZER_VALUE.to_string(),
        }
    }
}

impl CampaignPlan {
    /// Parses a plan from YAML. Missing fields fall back to the built-in plan.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn budget(&self) -> CampaignBudget {
        CampaignBudget {
            name: unique_name(&self.budget_name_prefix),
            delivery_method: "STANDARD".to_string(),
            amount_micros: self.budget_amount_micros,
        }
    }

    /// New campaigns start `PAUSED` so nothing serves before targeting is attached.
    pub fn campaign(&self, budget_resource: &str) -> Campaign {
        Campaign {
            name: unique_name(&self.campaign_name_prefix),
            advertising_channel_type: "SEARCH".to_string(),
            status: "PAUSED".to_string(),
            target_spend: TargetSpend {
                target_spend_micros: 0,
            },
            campaign_budget: budget_resource.to_string(),
            network_settings: self.network_settings.clone(),
        }
    }

    pub fn ad_group(&self, campaign_resource: &str) -> AdGroup {
        AdGroup {
            name: unique_name(&self.ad_group_name_prefix),
            status: "ENABLED".to_string(),
            campaign: campaign_resource.to_string(),
            ad_group_type: "SEARCH_STANDARD".to_string(),
            cpc_bid_micros: self.cpc_bid_micros,
        }
    }

    /// Descriptions as submitted. With a customizer attribute the second slot
    /// becomes the customizer placeholder.
    pub fn description_assets(&self, customizer_attribute: Option<&str>) -> Vec<AdTextAsset> {
        let mut assets: Vec<AdTextAsset> = self
            .descriptions
            .iter()
            .map(|d| AdTextAsset::new(d.as_str()))
            .collect();

        if let Some(name) = customizer_attribute {
            let customized = AdTextAsset::with_customizer(name);
            if assets.len() >= 2 {
                assets[1] = customized;
            } else {
                assets.push(customized);
            }
        }

        assets
    }

    pub fn headline_assets(&self) -> Vec<AdTextAsset> {
        self.headlines
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if i == 0 {
                    AdTextAsset::pinned(h.as_str(), "HEADLINE_1")
                } else {
                    AdTextAsset::new(h.as_str())
                }
            })
            .collect()
    }

    pub fn ad_group_ad(
        &self,
        ad_group_resource: &str,
        customizer_attribute: Option<&str>,
    ) -> AdGroupAd {
        AdGroupAd {
            status: "ENABLED".to_string(),
            ad_group: ad_group_resource.to_string(),
            ad: Ad {
                final_urls: vec![self.final_url.clone()],
                responsive_search_ad: ResponsiveSearchAd {
                    headlines: self.headline_assets(),
                    descriptions: self.description_assets(customizer_attribute),
                    path1: self.path1.clone(),
                    path2: self.path2.clone(),
                },
            },
        }
    }

    pub fn keyword_criteria(&self, ad_group_resource: &str) -> Vec<AdGroupCriterion> {
        self.keywords
            .iter()
            .map(|k| AdGroupCriterion {
                ad_group: ad_group_resource.to_string(),
                status: "ENABLED".to_string(),
                keyword: KeywordInfo {
                    text: k.text.clone(),
                    match_type: k.match_type,
                },
            })
            .collect()
    }

    pub fn customizer_attribute(&self, name: &str) -> CustomizerAttribute {
        CustomizerAttribute {
            name: name.to_string(),
            attribute_type: "PRICE".to_string(),
        }
    }

    pub fn customer_customizer(&self, attribute_resource: &str) -> CustomerCustomizer {
        CustomerCustomizer {
            customizer_attribute: attribute_resource.to_string(),
            value: CustomizerValue {
                value_type: "PRICE".to_string(),
                string_value: self.customizer_value.clone(),
            },
        }
    }

    /// The display path shown under the headline, e.g. `belk.com/fashion/deals`.
    pub fn display_path(&self) -> String {
        let host = url::Url::parse(&self.final_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
            .unwrap_or_default();
        format!("{}/{}/{}", host, self.path1, self.path2)
    }
}

fn unique_name(prefix: &str) -> String {
    format!("{} {}", prefix, uuid::Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_serializes_in_camel_case() {
        let plan = CampaignPlan::default();
        let json = serde_json::to_value(plan.budget()).unwrap();

        assert_eq!(json["deliveryMethod"], "STANDARD");
        assert_eq!(json["amountMicros"], 1_000_000);
        assert!(json["name"]
            .as_str()
            .unwrap()
            .starts_with("Belk Campaign Budget "));
    }

    #[test]
    fn test_campaign_is_paused_search_with_network_settings() {
        let plan = CampaignPlan::default();
        let json = serde_json::to_value(plan.campaign("customers/1/campaignBudgets/2")).unwrap();

        assert_eq!(json["status"], "PAUSED");
        assert_eq!(json["advertisingChannelType"], "SEARCH");
        assert_eq!(json["campaignBudget"], "customers/1/campaignBudgets/2");
        assert_eq!(json["targetSpend"]["targetSpendMicros"], 0);
        assert_eq!(json["networkSettings"]["targetPartnerSearchNetwork"], false);
        assert_eq!(json["networkSettings"]["targetContentNetwork"], true);
    }

    #[test]
    fn test_only_first_headline_is_pinned() {
        let headlines = CampaignPlan::default().headline_assets();
        assert_eq!(headlines.len(), 3);
        assert_eq!(headlines[0].pinned_field.as_deref(), Some("HEADLINE_1"));
        assert!(headlines[1..].iter().all(|h| h.pinned_field.is_none()));

        let json = serde_json::to_value(&headlines[1]).unwrap();
        assert!(json.get("pinnedField").is_none());
    }

    #[test]
    fn test_customizer_replaces_second_description() {
        let plan = CampaignPlan::default();
        let plain = plan.description_assets(None);
        let customized = plan.description_assets(Some("BelkSalePrice"));

        assert_eq!(plain[1].text, plan.descriptions[1]);
        assert_eq!(customized[0].text, plan.descriptions[0]);
        assert_eq!(customized[1].text, "Shop Now: {CUSTOMIZER.BelkSalePrice}");
    }

    #[test]
    fn test_keywords_keep_match_types() {
        let criteria = CampaignPlan::default().keyword_criteria("customers/1/adGroups/3");
        assert_eq!(criteria.len(), 8);
        assert_eq!(criteria[0].keyword.match_type, KeywordMatchType::Exact);
        assert_eq!(criteria[1].keyword.match_type, KeywordMatchType::Phrase);
        assert!(criteria[2..]
            .iter()
            .all(|c| c.keyword.match_type == KeywordMatchType::Broad));

        let json = serde_json::to_value(&criteria[1]).unwrap();
        assert_eq!(json["keyword"]["matchType"], "PHRASE");
        assert_eq!(json["adGroup"], "customers/1/adGroups/3");
    }

    #[test]
    fn test_display_path() {
        assert_eq!(CampaignPlan::default().display_path(), "belk.com/fashion/deals");
    }

    #[test]
    fn test_partial_plan_yaml_keeps_defaults() {
        let plan = CampaignPlan::from_yaml("locations: [\"Boston\"]\ncpc_bid_micros: 500000\n").unwrap();
        assert_eq!(plan.locations, vec!["Boston".to_string()]);
        assert_eq!(plan.cpc_bid_micros, 500_000);
        assert_eq!(plan.keywords.len(), 8);
    }
}
