use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::tier::Tier;
use crate::spec::lenient;

pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_BILLING_CYCLE: &str = "monthly";
pub const DEFAULT_WORKING_DAYS_PER_WEEK: u32 = 5;
pub const DEFAULT_DESTINATION_NAME: &str = "Agentic IT Service";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelinePolicy {
    #[serde(deserialize_with = "lenient::whole")]
    pub working_days_per_week: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assumption_notes: Option<String>,
    #[serde(deserialize_with = "lenient::whole")]
    pub parallel_sources: u32,
    #[serde(deserialize_with = "lenient::whole")]
    pub buffer_days: u32,
}

impl Default for TimelinePolicy {
    fn default() -> Self {
        Self {
            working_days_per_week: DEFAULT_WORKING_DAYS_PER_WEEK,
            assumption_notes: None,
            parallel_sources: 1,
            buffer_days: 0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPrice {
    #[serde(default, serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "lenient::whole")]
    pub impl_days: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_model: Option<String>,
    #[serde(default)]
    pub tiers: BTreeMap<Tier, TierPrice>,
}

impl SourceSpec {
    pub fn tier(&self, tier: Tier) -> Option<&TierPrice> {
        self.tiers.get(&tier)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiddlewareCost {
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub fixed: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub per_source: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiddlewareOption {
    pub name: String,
    #[serde(default)]
    pub cost: MiddlewareCost,
    #[serde(default, deserialize_with = "lenient::whole")]
    pub provision_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequiredService {
    pub name: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub fixed_price: Decimal,
    #[serde(deserialize_with = "lenient::whole")]
    pub base_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Default for RequiredService {
    fn default() -> Self {
        Self {
            name: DEFAULT_DESTINATION_NAME.to_string(),
            fixed_price: Decimal::ZERO,
            base_days: 0,
            notes: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addon {
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "lenient::whole")]
    pub extra_days: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Destination {
    pub required: RequiredService,
    pub addons: Vec<Addon>,
}

impl Destination {
    pub fn addon(&self, name: &str) -> Option<&Addon> {
        self.addons.iter().find(|addon| addon.name == name)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LegacyMiddleware {
    #[serde(default)]
    pub options: Vec<MiddlewareOption>,
}

/// Wire shape of a specification document. Accepts both the canonical keys
/// and the layer-numbered keys written by earlier versions of the tool.
#[derive(Debug, Deserialize)]
pub struct SpecDocument {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_billing_cycle")]
    pub billing_cycle: String,
    #[serde(default)]
    pub timeline_policy: TimelinePolicy,
    pub sources: Option<Vec<SourceSpec>>,
    pub layer1_itsm_sources: Option<Vec<SourceSpec>>,
    pub middleware_options: Option<Vec<MiddlewareOption>>,
    pub layer2_azure: Option<LegacyMiddleware>,
    pub destination: Option<Destination>,
    pub layer3_target: Option<Destination>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_billing_cycle() -> String {
    DEFAULT_BILLING_CYCLE.to_string()
}
