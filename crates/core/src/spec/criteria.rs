use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::tier::Tier;
use crate::spec::lenient;

/// Qualitative description of a tier plus its week range.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityCriteria {
    #[serde(default)]
    pub volumetrics: String,
    #[serde(default)]
    pub customization: String,
    #[serde(default)]
    pub timeline_text: String,
    #[serde(default, deserialize_with = "lenient::whole")]
    pub weeks_min: u32,
    #[serde(default, deserialize_with = "lenient::whole")]
    pub weeks_max: u32,
}

/// Reference table joined with sources by tier key. It is not part of the
/// editable specification document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CriteriaTable {
    entries: BTreeMap<Tier, ComplexityCriteria>,
}

impl CriteriaTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn standard() -> Self {
        let mut table = Self::empty();
        table.insert(
            Tier::Low,
            ComplexityCriteria {
                volumetrics: "<500K records total (Incident, Problem, CR, SR)".to_string(),
                customization: "Standard ITSM Objects Only (Incident, Problem, Change, SR).\n\
                                Minimal custom fields (<10%).\n\
                                Simple 1:1 mapping.\n\
                                No CMDB or Knowledge migration."
                    .to_string(),
                timeline_text: "2-3 weeks post prerequisite validation".to_string(),
                weeks_min: 2,
                weeks_max: 3,
            },
        );
        table.insert(
            Tier::Medium,
            ComplexityCriteria {
                volumetrics: "<2.5M records total (Incident, Problem, CR, SR)".to_string(),
                customization: "Standard + Custom Objects (Knowledge Articles, limited CMDB).\n\
                                Moderate custom fields (10-20%).\n\
                                Basic lookups and conditional data cleansing required."
                    .to_string(),
                timeline_text: "3-5 weeks post prerequisite validation".to_string(),
                weeks_min: 3,
                weeks_max: 5,
            },
        );
        table.insert(
            Tier::High,
            ComplexityCriteria {
                volumetrics: "> 2.5M records (including deep archival data).".to_string(),
                customization: "Deep Customization (>20% custom fields, full CMDB migration with \
                                complex relationship mapping).\n\
                                Advanced transformation with external enrichment or custom \
                                business logic."
                    .to_string(),
                timeline_text: "5-7 weeks post prerequisite validation".to_string(),
                weeks_min: 5,
                weeks_max: 7,
            },
        );
        table
    }

    pub fn insert(&mut self, tier: Tier, criteria: ComplexityCriteria) {
        self.entries.insert(tier, criteria);
    }

    pub fn remove(&mut self, tier: Tier) -> Option<ComplexityCriteria> {
        self.entries.remove(&tier)
    }

    pub fn get(&self, tier: Tier) -> Option<&ComplexityCriteria> {
        self.entries.get(&tier)
    }

    /// Upper bound of the tier's week range, 0 when the tier has no entry.
    pub fn weeks_max(&self, tier: Tier) -> u32 {
        self.get(tier).map_or(0, |criteria| criteria.weeks_max)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tier, &ComplexityCriteria)> {
        self.entries.iter().map(|(tier, criteria)| (*tier, criteria))
    }
}
