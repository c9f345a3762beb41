use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::tier::Tier;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceChoice {
    pub name: String,
    pub tier: Tier,
}

/// User choices for one computation pass. Owned by the caller; the engine
/// only borrows it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub source: Option<SourceChoice>,
    pub middleware: Option<String>,
    pub addons: Vec<String>,
    pub today: NaiveDate,
}

impl Selection {
    pub fn new(today: NaiveDate) -> Self {
        Self { source: None, middleware: None, addons: Vec::new(), today }
    }

    pub fn with_source(mut self, name: impl Into<String>, tier: Tier) -> Self {
        self.source = Some(SourceChoice { name: name.into(), tier });
        self
    }

    pub fn with_middleware(mut self, name: impl Into<String>) -> Self {
        self.middleware = Some(name.into());
        self
    }

    pub fn with_addon(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.addons.contains(&name) {
            self.addons.push(name);
        }
        self
    }

    pub fn with_addons<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(self, |selection, name| selection.with_addon(name))
    }
}

/// Sources dropped into the three priority buckets, in display order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPlacements {
    pub low: Vec<String>,
    pub medium: Vec<String>,
    pub high: Vec<String>,
}

impl TierPlacements {
    pub fn bucket(&self, tier: Tier) -> &[String] {
        match tier {
            Tier::Low => &self.low,
            Tier::Medium => &self.medium,
            Tier::High => &self.high,
        }
    }

    pub fn place(&mut self, tier: Tier, name: impl Into<String>) {
        let bucket = match tier {
            Tier::Low => &mut self.low,
            Tier::Medium => &mut self.medium,
            Tier::High => &mut self.high,
        };
        bucket.push(name.into());
    }

    /// The first item of the first non-empty bucket wins; every other
    /// placement is ignored.
    pub fn first_placement(&self) -> Option<SourceChoice> {
        Tier::ALL.into_iter().find_map(|tier| {
            self.bucket(tier).first().map(|name| SourceChoice { name: name.clone(), tier })
        })
    }
}

/// When several middleware options are dropped into the chosen slot the first
/// one is used.
pub fn first_chosen<S: AsRef<str>>(names: &[S]) -> Option<String> {
    names.first().map(|name| name.as_ref().to_string())
}
