use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::tier::Tier;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown tier `{0}` (expected low|medium|high)")]
    UnknownTier(String),
    #[error("unknown source scheduling `{0}` (expected sequential|parallel)")]
    UnknownScheduling(String),
}

/// Raised when a specification document cannot be accepted. Callers keep
/// their last-known-good specification and surface the message as a warning.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SpecParseError {
    #[error("JSON parse error: {0}")]
    Syntax(String),
    #[error("invalid specification: {0}")]
    Invalid(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Specification,
    Source,
    Middleware,
    Destination,
    Total,
}

impl Layer {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Specification => "specification",
            Self::Source => "source",
            Self::Middleware => "middleware",
            Self::Destination => "destination",
            Self::Total => "total",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-fatal findings gathered while computing a quote. Most mean a
/// contribution was defaulted to zero.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuoteDiagnostic {
    #[error("source `{name}` is not defined in the specification")]
    MissingSource { name: String },
    #[error("source `{name}` has no `{tier}` tier")]
    MissingTier { name: String, tier: Tier },
    #[error("no complexity criteria defined for tier `{tier}`")]
    MissingCriteria { tier: Tier },
    #[error("middleware option `{name}` is not defined in the specification")]
    MissingMiddleware { name: String },
    #[error("add-on `{name}` is not defined in the specification")]
    MissingAddon { name: String },
    #[error("no middleware options defined in the specification")]
    NoMiddlewareOptions,
    #[error("specification rejected, quoting with the builtin specification: {reason}")]
    SpecificationRejected { reason: String },
    #[error("{layer} amount exceeds the largest representable value and was capped")]
    AmountOverflow { layer: Layer },
}

impl QuoteDiagnostic {
    pub fn layer(&self) -> Layer {
        match self {
            Self::SpecificationRejected { .. } => Layer::Specification,
            Self::MissingSource { .. }
            | Self::MissingTier { .. }
            | Self::MissingCriteria { .. } => Layer::Source,
            Self::MissingMiddleware { .. } | Self::NoMiddlewareOptions => Layer::Middleware,
            Self::MissingAddon { .. } => Layer::Destination,
            Self::AmountOverflow { layer } => *layer,
        }
    }

    /// Configuration problems are shown to the user; missing references are
    /// expected while a specification is being edited.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::NoMiddlewareOptions
                | Self::SpecificationRejected { .. }
                | Self::AmountOverflow { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Specification(#[from] SpecParseError),
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error("invalid input: {0}")]
    Input(String),
    #[error("export failure: {0}")]
    Export(String),
}

impl ApplicationError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(_) | Self::Input(_) => "invalid_input",
            Self::Specification(_) => "spec_validation",
            Self::Configuration(_) => "config_validation",
            Self::Export(_) => "export",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Domain(_) | Self::Input(_) => 1,
            Self::Configuration(_) => 2,
            Self::Specification(_) => 3,
            Self::Export(_) => 4,
        }
    }
}
