use rust_decimal::Decimal;

use crate::cpq::LayerOutcome;
use crate::domain::quote::{AddonLine, DestinationQuote, LayerCost};
use crate::errors::{Layer, QuoteDiagnostic};
use crate::spec::Specification;

pub trait DestinationLayer: Send + Sync {
    fn price(&self, spec: &Specification, addons: &[String]) -> LayerOutcome<DestinationQuote>;
}

#[derive(Default)]
pub struct DeterministicDestinationLayer;

impl DestinationLayer for DeterministicDestinationLayer {
    fn price(&self, spec: &Specification, addons: &[String]) -> LayerOutcome<DestinationQuote> {
        price_destination(spec, addons)
    }
}

/// The destination service is always included. Add-ons are independent flat
/// charges applied in selection order.
pub fn price_destination(
    spec: &Specification,
    addons: &[String],
) -> LayerOutcome<DestinationQuote> {
    let destination = spec.destination();
    let required = &destination.required;

    let mut diagnostics = Vec::new();
    let mut lines = Vec::with_capacity(addons.len());
    let mut addons_cost = Decimal::ZERO;
    let mut addons_days: u32 = 0;
    let mut overflowed = false;

    for name in addons {
        let Some(addon) = destination.addon(name) else {
            diagnostics.push(QuoteDiagnostic::MissingAddon { name: name.clone() });
            continue;
        };
        addons_cost = match addons_cost.checked_add(addon.price) {
            Some(total) => total,
            None => {
                if !overflowed {
                    diagnostics.push(QuoteDiagnostic::AmountOverflow { layer: Layer::Destination });
                    overflowed = true;
                }
                Decimal::MAX
            }
        };
        addons_days = addons_days.saturating_add(addon.extra_days);
        lines.push(AddonLine {
            name: addon.name.clone(),
            price: addon.price,
            extra_days: addon.extra_days,
        });
    }

    let quote = DestinationQuote {
        target: required.name.clone(),
        fixed: LayerCost::new(required.fixed_price, required.base_days),
        addons: lines,
        addons_cost,
        addons_days,
    };

    tracing::debug!(
        event_name = "quote.layer.destination",
        target = %quote.target,
        addon_count = quote.addons.len(),
        addons_cost = %quote.addons_cost,
        business_days = quote.business_days(),
        "destination layer priced"
    );

    LayerOutcome { value: quote, diagnostics }
}
