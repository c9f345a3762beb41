pub mod calendar;
pub mod config;
pub mod cpq;
pub mod domain;
pub mod errors;
pub mod export;
pub mod render;
pub mod spec;

pub use cpq::timeline::SourceScheduling;
pub use cpq::{compute_quote, DeterministicQuoteRuntime, QuoteRuntime};
pub use domain::quote::{LayerCost, QuoteResult};
pub use domain::selection::{Selection, SourceChoice, TierPlacements};
pub use domain::tier::Tier;
pub use errors::{ApplicationError, DomainError, QuoteDiagnostic, SpecParseError};
pub use export::QuoteExport;
pub use spec::Specification;
