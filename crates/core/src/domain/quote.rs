use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::tier::Tier;
use crate::errors::QuoteDiagnostic;

/// What one layer contributes to the quote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerCost {
    pub cost: Decimal,
    pub business_days: u32,
}

impl LayerCost {
    pub const ZERO: LayerCost = LayerCost { cost: Decimal::ZERO, business_days: 0 };

    pub fn new(cost: Decimal, business_days: u32) -> Self {
        Self { cost, business_days }
    }
}

/// Audit row for the chosen source: qualitative criteria next to the numbers
/// used for pricing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDetail {
    pub source: String,
    pub tier: Tier,
    pub volumetrics: String,
    pub customization: String,
    pub timeline_text: String,
    pub weeks_max: u32,
    pub price: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceQuote {
    pub rows: Vec<SourceDetail>,
    pub layer: LayerCost,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiddlewareQuote {
    pub option: Option<String>,
    pub layer: LayerCost,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonLine {
    pub name: String,
    pub price: Decimal,
    pub extra_days: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationQuote {
    pub target: String,
    pub fixed: LayerCost,
    pub addons: Vec<AddonLine>,
    pub addons_cost: Decimal,
    pub addons_days: u32,
}

impl DestinationQuote {
    pub fn addon_names(&self) -> Vec<String> {
        self.addons.iter().map(|line| line.name.clone()).collect()
    }

    pub fn business_days(&self) -> u32 {
        self.fixed.business_days.saturating_add(self.addons_days)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub currency: String,
    pub billing_cycle: String,
    pub working_days_per_week: u32,
    pub source: SourceQuote,
    pub middleware: MiddlewareQuote,
    pub destination: DestinationQuote,
    pub buffer_days: u32,
    pub grand_total_cost: Decimal,
    pub total_business_days: u32,
    pub approx_calendar_days: u32,
    pub start_date: NaiveDate,
    pub finish_date: NaiveDate,
    pub diagnostics: Vec<QuoteDiagnostic>,
}

impl QuoteResult {
    pub fn configuration_errors(&self) -> impl Iterator<Item = &QuoteDiagnostic> {
        self.diagnostics.iter().filter(|diagnostic| diagnostic.is_configuration_error())
    }
}
