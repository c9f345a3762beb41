use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// How source onboarding days combine with the rest of the timeline.
///
/// `Sequential` sums source days as they are and leaves the specification's
/// `parallel_sources` unused. `Parallel` divides the source days by
/// `parallel_sources`, rounding up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceScheduling {
    #[default]
    Sequential,
    Parallel,
}

impl SourceScheduling {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
        }
    }
}

impl fmt::Display for SourceScheduling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceScheduling {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "parallel" => Ok(Self::Parallel),
            _ => Err(DomainError::UnknownScheduling(value.trim().to_string())),
        }
    }
}

/// Business days contributed by each layer, before aggregation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimelineParts {
    pub source_days: u32,
    pub middleware_days: u32,
    pub destination_days: u32,
    pub buffer_days: u32,
}

/// `ceil(source_days / parallel_sources)` with a floor of one lane.
pub fn parallel_onboarding_days(source_days: u32, parallel_sources: u32) -> u32 {
    source_days.div_ceil(parallel_sources.max(1))
}

pub fn total_business_days(
    parts: TimelineParts,
    scheduling: SourceScheduling,
    parallel_sources: u32,
) -> u32 {
    let source_days = match scheduling {
        SourceScheduling::Sequential => parts.source_days,
        SourceScheduling::Parallel => parallel_onboarding_days(parts.source_days, parallel_sources),
    };

    source_days
        .saturating_add(parts.middleware_days)
        .saturating_add(parts.destination_days)
        .saturating_add(parts.buffer_days)
}
