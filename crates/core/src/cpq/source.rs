use crate::cpq::LayerOutcome;
use crate::domain::quote::{LayerCost, SourceDetail, SourceQuote};
use crate::domain::selection::SourceChoice;
use crate::errors::QuoteDiagnostic;
use crate::spec::Specification;

pub trait SourceLayer: Send + Sync {
    fn price(
        &self,
        spec: &Specification,
        choice: Option<&SourceChoice>,
        working_days_per_week: u32,
    ) -> LayerOutcome<SourceQuote>;
}

#[derive(Default)]
pub struct DeterministicSourceLayer;

impl SourceLayer for DeterministicSourceLayer {
    fn price(
        &self,
        spec: &Specification,
        choice: Option<&SourceChoice>,
        working_days_per_week: u32,
    ) -> LayerOutcome<SourceQuote> {
        price_source(spec, choice, working_days_per_week)
    }
}

/// Prices the chosen source. The timeline always uses the upper bound of the
/// tier's week range.
pub fn price_source(
    spec: &Specification,
    choice: Option<&SourceChoice>,
    working_days_per_week: u32,
) -> LayerOutcome<SourceQuote> {
    let Some(choice) = choice else {
        return LayerOutcome::clean(SourceQuote::default());
    };

    let mut diagnostics = Vec::new();

    let criteria = spec.criteria().get(choice.tier);
    if criteria.is_none() {
        diagnostics.push(QuoteDiagnostic::MissingCriteria { tier: choice.tier });
    }
    let weeks_max = criteria.map_or(0, |criteria| criteria.weeks_max);
    let business_days = weeks_max.saturating_mul(working_days_per_week);

    let price = match spec.source(&choice.name) {
        None => {
            diagnostics.push(QuoteDiagnostic::MissingSource { name: choice.name.clone() });
            None
        }
        Some(source) => {
            let entry = source.tier(choice.tier);
            if entry.is_none() {
                diagnostics.push(QuoteDiagnostic::MissingTier {
                    name: choice.name.clone(),
                    tier: choice.tier,
                });
            }
            entry.map(|entry| entry.price)
        }
    }
    .unwrap_or_default();

    let row = SourceDetail {
        source: choice.name.clone(),
        tier: choice.tier,
        volumetrics: criteria.map(|c| c.volumetrics.clone()).unwrap_or_default(),
        customization: criteria.map(|c| c.customization.clone()).unwrap_or_default(),
        timeline_text: criteria.map(|c| c.timeline_text.clone()).unwrap_or_default(),
        weeks_max,
        price,
    };

    tracing::debug!(
        event_name = "quote.layer.source",
        source = %choice.name,
        tier = %choice.tier,
        weeks_max,
        business_days,
        price = %price,
        "source layer priced"
    );

    LayerOutcome {
        value: SourceQuote { rows: vec![row], layer: LayerCost::new(price, business_days) },
        diagnostics,
    }
}
