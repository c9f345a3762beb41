pub mod destination;
pub mod middleware;
pub mod source;
pub mod timeline;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::{business_days_to_calendar_days, project_finish_date};
use crate::domain::quote::QuoteResult;
use crate::domain::selection::Selection;
use crate::errors::{Layer, QuoteDiagnostic};
use crate::spec::Specification;

use self::{
    destination::{DestinationLayer, DeterministicDestinationLayer},
    middleware::{DeterministicMiddlewareLayer, MiddlewareLayer},
    source::{DeterministicSourceLayer, SourceLayer},
    timeline::{total_business_days, SourceScheduling, TimelineParts},
};

/// A layer's result plus whatever had to be defaulted to produce it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerOutcome<T> {
    pub value: T,
    pub diagnostics: Vec<QuoteDiagnostic>,
}

impl<T> LayerOutcome<T> {
    pub fn clean(value: T) -> Self {
        Self { value, diagnostics: Vec::new() }
    }

    pub fn with_diagnostics(value: T, diagnostics: Vec<QuoteDiagnostic>) -> Self {
        Self { value, diagnostics }
    }
}

pub trait QuoteRuntime: Send + Sync {
    fn compute(&self, spec: &Specification, selection: &Selection) -> QuoteResult;
}

pub struct DeterministicQuoteRuntime<S, M, D> {
    source_layer: S,
    middleware_layer: M,
    destination_layer: D,
    scheduling: SourceScheduling,
}

impl<S, M, D> DeterministicQuoteRuntime<S, M, D> {
    pub fn new(source_layer: S, middleware_layer: M, destination_layer: D) -> Self {
        Self {
            source_layer,
            middleware_layer,
            destination_layer,
            scheduling: SourceScheduling::default(),
        }
    }

    pub fn with_scheduling(mut self, scheduling: SourceScheduling) -> Self {
        self.scheduling = scheduling;
        self
    }

    pub fn scheduling(&self) -> SourceScheduling {
        self.scheduling
    }
}

impl Default
    for DeterministicQuoteRuntime<
        DeterministicSourceLayer,
        DeterministicMiddlewareLayer,
        DeterministicDestinationLayer,
    >
{
    fn default() -> Self {
        Self::new(
            DeterministicSourceLayer,
            DeterministicMiddlewareLayer,
            DeterministicDestinationLayer,
        )
    }
}

impl<S, M, D> QuoteRuntime for DeterministicQuoteRuntime<S, M, D>
where
    S: SourceLayer,
    M: MiddlewareLayer,
    D: DestinationLayer,
{
    fn compute(&self, spec: &Specification, selection: &Selection) -> QuoteResult {
        let working_days_per_week = spec.working_days_per_week();

        let source =
            self.source_layer.price(spec, selection.source.as_ref(), working_days_per_week);
        let num_sources = u32::try_from(source.value.rows.len()).unwrap_or(u32::MAX);
        let middleware =
            self.middleware_layer.price(spec, selection.middleware.as_deref(), num_sources);
        let destination = self.destination_layer.price(spec, &selection.addons);

        let grand_total = checked_total([
            source.value.layer.cost,
            middleware.value.layer.cost,
            destination.value.fixed.cost,
            destination.value.addons_cost,
        ]);

        let total_business_days = total_business_days(
            TimelineParts {
                source_days: source.value.layer.business_days,
                middleware_days: middleware.value.layer.business_days,
                destination_days: destination.value.business_days(),
                buffer_days: spec.buffer_days(),
            },
            self.scheduling,
            spec.parallel_sources(),
        );
        let approx_calendar_days =
            business_days_to_calendar_days(total_business_days, working_days_per_week);
        let finish_date =
            project_finish_date(selection.today, total_business_days, working_days_per_week);

        let mut diagnostics: Vec<QuoteDiagnostic> = source
            .diagnostics
            .into_iter()
            .chain(middleware.diagnostics)
            .chain(destination.diagnostics)
            .collect();
        let grand_total_cost = grand_total.unwrap_or_else(|| {
            diagnostics.push(QuoteDiagnostic::AmountOverflow { layer: Layer::Total });
            Decimal::MAX
        });
        for diagnostic in &diagnostics {
            tracing::warn!(
                event_name = "quote.diagnostic",
                layer = ?diagnostic.layer(),
                configuration_error = diagnostic.is_configuration_error(),
                "{diagnostic}"
            );
        }

        tracing::info!(
            event_name = "quote.computed",
            grand_total = %grand_total_cost,
            total_business_days,
            approx_calendar_days,
            scheduling = %self.scheduling,
            finish_date = %finish_date,
            "quote computed"
        );

        QuoteResult {
            currency: spec.currency().to_string(),
            billing_cycle: spec.billing_cycle().to_string(),
            working_days_per_week,
            source: source.value,
            middleware: middleware.value,
            destination: destination.value,
            buffer_days: spec.buffer_days(),
            grand_total_cost,
            total_business_days,
            approx_calendar_days,
            start_date: selection.today,
            finish_date,
            diagnostics,
        }
    }
}

/// Exact sum of the layer amounts, or `None` when it leaves the `Decimal` range.
fn checked_total(amounts: [Decimal; 4]) -> Option<Decimal> {
    amounts.into_iter().try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
}

/// Computes a quote with the default layers and sequential source scheduling.
pub fn compute_quote(spec: &Specification, selection: &Selection) -> QuoteResult {
    DeterministicQuoteRuntime::default().compute(spec, selection)
}
