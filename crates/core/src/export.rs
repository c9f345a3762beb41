//! Downloadable quote document.
//!
//! The key layout is consumed by other tools and must stay field-for-field
//! stable, including the spreadsheet-style source row headers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::quote::{QuoteResult, SourceDetail};
use crate::errors::ApplicationError;

pub const DEFAULT_EXPORT_FILE_NAME: &str = "quote_timeline.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteExport {
    pub currency: String,
    pub billing_cycle: String,
    pub selections: ExportSelections,
    pub totals: ExportTotals,
    pub timeline: ExportTimeline,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSelections {
    pub source: Vec<ExportSourceRow>,
    pub middleware: Option<String>,
    pub destination: ExportDestination,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSourceRow {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Priority")]
    pub priority: String,
    #[serde(rename = "Volumetrics")]
    pub volumetrics: String,
    #[serde(rename = "Customization & Logic")]
    pub customization: String,
    #[serde(rename = "Timeline (weeks)_max")]
    pub weeks_max: u32,
    #[serde(rename = "Price (USD)", with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDestination {
    pub target: String,
    pub addons: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTotals {
    #[serde(with = "rust_decimal::serde::float")]
    pub source: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub middleware: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub destination_fixed: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub addons: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub grand_total: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTimeline {
    pub source_weeks_upper_bound_used: bool,
    pub total_business_days: u32,
    pub approx_calendar_days: u32,
    pub start_date: NaiveDate,
    pub finish_date: NaiveDate,
}

impl From<&SourceDetail> for ExportSourceRow {
    fn from(detail: &SourceDetail) -> Self {
        Self {
            source: detail.source.clone(),
            priority: detail.tier.title().to_string(),
            volumetrics: detail.volumetrics.clone(),
            customization: detail.customization.clone(),
            weeks_max: detail.weeks_max,
            price: detail.price,
        }
    }
}

impl From<&QuoteResult> for QuoteExport {
    fn from(quote: &QuoteResult) -> Self {
        Self {
            currency: quote.currency.clone(),
            billing_cycle: quote.billing_cycle.clone(),
            selections: ExportSelections {
                source: quote.source.rows.iter().map(ExportSourceRow::from).collect(),
                middleware: quote.middleware.option.clone(),
                destination: ExportDestination {
                    target: quote.destination.target.clone(),
                    addons: quote.destination.addon_names(),
                },
            },
            totals: ExportTotals {
                source: quote.source.layer.cost,
                middleware: quote.middleware.layer.cost,
                destination_fixed: quote.destination.fixed.cost,
                addons: quote.destination.addons_cost,
                grand_total: quote.grand_total_cost,
            },
            timeline: ExportTimeline {
                source_weeks_upper_bound_used: true,
                total_business_days: quote.total_business_days,
                approx_calendar_days: quote.approx_calendar_days,
                start_date: quote.start_date,
                finish_date: quote.finish_date,
            },
        }
    }
}

impl QuoteExport {
    pub fn to_json(&self, pretty: bool) -> Result<String, ApplicationError> {
        let rendered =
            if pretty { serde_json::to_string_pretty(self) } else { serde_json::to_string(self) };
        rendered.map_err(|error| ApplicationError::Export(error.to_string()))
    }

    pub fn from_json(raw: &str) -> Result<Self, ApplicationError> {
        serde_json::from_str(raw).map_err(|error| ApplicationError::Export(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use serde_json::Value;

    use super::QuoteExport;
    use crate::cpq::compute_quote;
    use crate::domain::selection::Selection;
    use crate::domain::tier::Tier;
    use crate::spec::{Specification, MAX_QUOTE_TOTAL};

    fn export() -> QuoteExport {
        let selection = Selection::new(NaiveDate::from_ymd_opt(2025, 1, 15).expect("valid date"))
            .with_source("ServiceNow", Tier::Medium)
            .with_middleware("Managed Azure (provided by us)")
            .with_addons(["Enhanced SLA (24x7)", "Data Retention (12 months)"]);
        QuoteExport::from(&compute_quote(&Specification::builtin(), &selection))
    }

    #[test]
    fn document_has_stable_key_layout() {
        let raw = export().to_json(true).expect("serializes");
        let value: Value = serde_json::from_str(&raw).expect("valid json");

        assert_eq!(value["currency"], "USD");
        assert_eq!(value["billing_cycle"], "monthly");
        assert_eq!(value["selections"]["middleware"], "Managed Azure (provided by us)");
        assert_eq!(value["selections"]["destination"]["target"], "Agentic IT Service");
        assert_eq!(value["selections"]["destination"]["addons"][1], "Data Retention (12 months)");

        let row = &value["selections"]["source"][0];
        assert_eq!(row["Source"], "ServiceNow");
        assert_eq!(row["Priority"], "Medium");
        assert_eq!(row["Timeline (weeks)_max"], 5);
        assert_eq!(row["Price (USD)"], 200.0);
        assert!(row["Customization & Logic"].as_str().is_some_and(|text| !text.is_empty()));

        assert_eq!(value["totals"]["source"], 200.0);
        assert_eq!(value["totals"]["middleware"], 290.0);
        assert_eq!(value["totals"]["destination_fixed"], 400.0);
        assert_eq!(value["totals"]["addons"], 320.0);
        assert_eq!(value["totals"]["grand_total"], 1210.0);

        assert_eq!(value["timeline"]["source_weeks_upper_bound_used"], true);
        assert_eq!(value["timeline"]["total_business_days"], 35);
        assert_eq!(value["timeline"]["approx_calendar_days"], 49);
        assert_eq!(value["timeline"]["start_date"], "2025-01-15");
        assert_eq!(value["timeline"]["finish_date"], "2025-03-05");
    }

    #[test]
    fn top_level_keys_keep_document_order() {
        let raw = export().to_json(false).expect("serializes");
        let keys =
            ["\"currency\"", "\"billing_cycle\"", "\"selections\"", "\"totals\"", "\"timeline\""];
        let positions: Vec<usize> =
            keys.iter().map(|key| raw.find(key).expect("key present")).collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "{raw}");
    }

    #[test]
    fn grand_total_survives_round_trip() {
        let original = export();
        let raw = original.to_json(true).expect("serializes");
        let reread = QuoteExport::from_json(&raw).expect("parses");

        assert_eq!(reread.totals.grand_total, original.totals.grand_total);
        assert_eq!(reread.totals.grand_total, Decimal::new(1210, 0));
    }

    fn reread(spec: &Specification, selection: &Selection) -> (QuoteExport, QuoteExport) {
        let original = QuoteExport::from(&compute_quote(spec, selection));
        let raw = original.to_json(false).expect("serializes");
        (original, QuoteExport::from_json(&raw).expect("parses"))
    }

    #[test]
    fn largest_accepted_total_survives_round_trip() {
        let spec = Specification::from_json(
            r#"{
                "sources": [{"name": "A", "tiers": {"high": {"price": 9999999999000}}}],
                "middleware_options": [{"name": "M", "cost": {"fixed": 900, "per_source": 99.49}}],
                "destination": {
                    "required": {"fixed_price": 0.5},
                    "addons": [{"name": "X", "price": 0}]
                }
            }"#,
        )
        .expect("boundary spec parses");
        let selection = Selection::new(NaiveDate::from_ymd_opt(2025, 1, 15).expect("valid date"))
            .with_source("A", Tier::High)
            .with_middleware("M")
            .with_addon("X");

        let (original, reread) = reread(&spec, &selection);
        assert_eq!(original.totals.grand_total, MAX_QUOTE_TOTAL);
        assert_eq!(reread.totals, original.totals);
        assert_eq!(reread.selections.source[0].price, Decimal::new(9_999_999_999_000, 0));
    }

    #[test]
    fn cent_amounts_survive_round_trip() {
        let spec = Specification::from_json(
            r#"{"destination": {"addons": [
                {"name": "X", "price": 0.1},
                {"name": "Y", "price": 0.2}
            ]}}"#,
        )
        .expect("spec parses");
        let selection = Selection::new(NaiveDate::from_ymd_opt(2025, 1, 15).expect("valid date"))
            .with_addons(["X", "Y"]);

        let (original, reread) = reread(&spec, &selection);
        assert_eq!(reread.totals, original.totals);
        assert_eq!(reread.totals.addons, Decimal::new(3, 1));
        assert_eq!(reread.totals.grand_total, Decimal::new(3, 1));
    }

    #[test]
    fn empty_quote_exports_null_middleware_and_no_rows() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 15).expect("valid date");
        let quote = compute_quote(&Specification::default(), &Selection::new(today));
        let value: serde_json::Value =
            serde_json::from_str(&QuoteExport::from(&quote).to_json(false).expect("serializes"))
                .expect("valid json");

        assert!(value["selections"]["middleware"].is_null());
        assert_eq!(value["selections"]["source"].as_array().map(Vec::len), Some(0));
        assert_eq!(value["totals"]["grand_total"], 0.0);
    }
}
