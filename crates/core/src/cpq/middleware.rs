use rust_decimal::Decimal;

use crate::cpq::LayerOutcome;
use crate::domain::quote::{LayerCost, MiddlewareQuote};
use crate::errors::{Layer, QuoteDiagnostic};
use crate::spec::{MiddlewareOption, Specification};

pub trait MiddlewareLayer: Send + Sync {
    fn price(
        &self,
        spec: &Specification,
        chosen: Option<&str>,
        num_sources: u32,
    ) -> LayerOutcome<MiddlewareQuote>;
}

#[derive(Default)]
pub struct DeterministicMiddlewareLayer;

impl MiddlewareLayer for DeterministicMiddlewareLayer {
    fn price(
        &self,
        spec: &Specification,
        chosen: Option<&str>,
        num_sources: u32,
    ) -> LayerOutcome<MiddlewareQuote> {
        price_middleware(spec, chosen, num_sources)
    }
}

/// Prices the provisioning option. With nothing chosen the first option in
/// the specification is used.
pub fn price_middleware(
    spec: &Specification,
    chosen: Option<&str>,
    num_sources: u32,
) -> LayerOutcome<MiddlewareQuote> {
    let Some(first) = spec.middleware_options().first() else {
        return LayerOutcome::with_diagnostics(
            MiddlewareQuote::default(),
            vec![QuoteDiagnostic::NoMiddlewareOptions],
        );
    };

    let option = match chosen {
        None => first,
        Some(name) => match spec.middleware_option(name) {
            Some(option) => option,
            None => {
                return LayerOutcome::with_diagnostics(
                    MiddlewareQuote::default(),
                    vec![QuoteDiagnostic::MissingMiddleware { name: name.to_string() }],
                );
            }
        },
    };

    let mut diagnostics = Vec::new();
    let cost = option_total(option, num_sources).unwrap_or_else(|| {
        diagnostics.push(QuoteDiagnostic::AmountOverflow { layer: Layer::Middleware });
        Decimal::MAX
    });
    let layer = LayerCost::new(cost, option.provision_days);

    tracing::debug!(
        event_name = "quote.layer.middleware",
        option = %option.name,
        num_sources,
        cost = %layer.cost,
        business_days = layer.business_days,
        "middleware layer priced"
    );

    LayerOutcome::with_diagnostics(
        MiddlewareQuote { option: Some(option.name.clone()), layer },
        diagnostics,
    )
}

/// `fixed + per_source * max(num_sources, 1)`, or `None` on overflow.
pub fn option_total(option: &MiddlewareOption, num_sources: u32) -> Option<Decimal> {
    option
        .cost
        .per_source
        .checked_mul(Decimal::from(num_sources.max(1)))
        .and_then(|per_source| option.cost.fixed.checked_add(per_source))
}
