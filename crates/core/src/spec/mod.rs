//! Pricing and timeline specification.
//!
//! A specification is parsed once from user-editable JSON and then treated as
//! read-only. Every accessor is total: absent sections read as defaulted,
//! zero-valued structures so an incomplete document still prices.

pub mod criteria;
pub mod lenient;
pub mod model;

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{ApplicationError, SpecParseError};

pub use self::criteria::{ComplexityCriteria, CriteriaTable};
pub use self::model::{
    Addon, Destination, MiddlewareCost, MiddlewareOption, RequiredService, SourceSpec,
    TierPrice, TimelinePolicy,
};
use self::model::{SpecDocument, DEFAULT_BILLING_CYCLE, DEFAULT_CURRENCY};

/// The document shipped with the tool, used when no specification file is
/// configured.
pub const BUILTIN_SPEC: &str = include_str!("builtin.json");

/// Amounts are priced in whole cents.
pub const MONEY_SCALE: u32 = 2;

/// Largest quote a document may produce, 9,999,999,999,999.99. Combined with
/// [`MONEY_SCALE`] every total stays within 15 significant digits, so it is
/// carried exactly by a JSON number.
pub const MAX_QUOTE_TOTAL: Decimal =
    Decimal::from_parts(0xA4C6_7FFF, 0x0003_8D7E, 0, false, MONEY_SCALE);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SpecDocument")]
pub struct Specification {
    currency: String,
    billing_cycle: String,
    timeline_policy: TimelinePolicy,
    sources: Vec<SourceSpec>,
    middleware_options: Vec<MiddlewareOption>,
    destination: Destination,
    #[serde(skip)]
    criteria: CriteriaTable,
}

impl Default for Specification {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            billing_cycle: DEFAULT_BILLING_CYCLE.to_string(),
            timeline_policy: TimelinePolicy::default(),
            sources: Vec::new(),
            middleware_options: Vec::new(),
            destination: Destination::default(),
            criteria: CriteriaTable::standard(),
        }
    }
}

/// Parses `raw`, returning `fallback` unchanged alongside the error when the
/// document cannot be accepted.
pub fn parse(raw: &str, fallback: &Specification) -> (Specification, Option<SpecParseError>) {
    match Specification::from_json(raw) {
        Ok(spec) => (spec, None),
        Err(error) => {
            tracing::warn!(
                event_name = "spec.parse.fallback",
                error = %error,
                "specification rejected; keeping previous specification"
            );
            (fallback.clone(), Some(error))
        }
    }
}

/// Reads a specification file, or the builtin document when `path` is unset.
pub fn load(path: Option<&Path>) -> Result<Specification, ApplicationError> {
    let Some(path) = path else {
        return Ok(Specification::builtin());
    };

    let spec = Specification::from_json(&read_document(path)?)?;
    log_loaded(path, &spec);
    Ok(spec)
}

/// Like [`load`], but a file that reads yet cannot be accepted yields the
/// builtin document together with the parse error. Only an unreadable file
/// fails.
pub fn load_or_builtin(
    path: Option<&Path>,
) -> Result<(Specification, Option<SpecParseError>), ApplicationError> {
    let Some(path) = path else {
        return Ok((Specification::builtin(), None));
    };

    let (spec, error) = parse(&read_document(path)?, &Specification::builtin());
    if error.is_none() {
        log_loaded(path, &spec);
    }
    Ok((spec, error))
}

fn read_document(path: &Path) -> Result<String, ApplicationError> {
    fs::read_to_string(path).map_err(|error| {
        ApplicationError::Input(format!(
            "could not read specification `{}`: {error}",
            path.display()
        ))
    })
}

fn log_loaded(path: &Path, spec: &Specification) {
    tracing::debug!(
        event_name = "spec.loaded",
        path = %path.display(),
        sources = spec.sources().len(),
        middleware_options = spec.middleware_options().len(),
        "specification loaded"
    );
}

impl Specification {
    pub fn from_json(raw: &str) -> Result<Self, SpecParseError> {
        let document: SpecDocument =
            serde_json::from_str(raw).map_err(|error| SpecParseError::Syntax(error.to_string()))?;
        Self::try_from(document)
    }

    /// The shipped default document. Falls back to an empty specification if
    /// the embedded document were ever to stop parsing.
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_SPEC).unwrap_or_default()
    }

    pub fn with_criteria(mut self, criteria: CriteriaTable) -> Self {
        self.criteria = criteria;
        self
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn billing_cycle(&self) -> &str {
        &self.billing_cycle
    }

    pub fn timeline_policy(&self) -> &TimelinePolicy {
        &self.timeline_policy
    }

    pub fn working_days_per_week(&self) -> u32 {
        self.timeline_policy.working_days_per_week
    }

    pub fn parallel_sources(&self) -> u32 {
        self.timeline_policy.parallel_sources.max(1)
    }

    pub fn buffer_days(&self) -> u32 {
        self.timeline_policy.buffer_days
    }

    pub fn sources(&self) -> &[SourceSpec] {
        &self.sources
    }

    pub fn source(&self, name: &str) -> Option<&SourceSpec> {
        self.sources.iter().find(|source| source.name == name)
    }

    pub fn middleware_options(&self) -> &[MiddlewareOption] {
        &self.middleware_options
    }

    pub fn middleware_option(&self, name: &str) -> Option<&MiddlewareOption> {
        self.middleware_options.iter().find(|option| option.name == name)
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn criteria(&self) -> &CriteriaTable {
        &self.criteria
    }

    pub fn to_json_pretty(&self) -> Result<String, SpecParseError> {
        serde_json::to_string_pretty(self)
            .map_err(|error| SpecParseError::Invalid(error.to_string()))
    }
}

impl TryFrom<SpecDocument> for Specification {
    type Error = SpecParseError;

    fn try_from(document: SpecDocument) -> Result<Self, Self::Error> {
        let spec = Self {
            currency: document.currency,
            billing_cycle: document.billing_cycle,
            timeline_policy: document.timeline_policy,
            sources: document.sources.or(document.layer1_itsm_sources).unwrap_or_default(),
            middleware_options: document
                .middleware_options
                .or_else(|| document.layer2_azure.map(|legacy| legacy.options))
                .unwrap_or_default(),
            destination: document.destination.or(document.layer3_target).unwrap_or_default(),
            criteria: CriteriaTable::standard(),
        };

        let problems = spec.validation_problems();
        if problems.is_empty() {
            Ok(spec)
        } else {
            Err(SpecParseError::Invalid(problems.join("; ")))
        }
    }
}

impl Specification {
    fn validation_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        check_unique("source", self.sources.iter().map(|s| s.name.as_str()), &mut problems);
        check_unique(
            "middleware option",
            self.middleware_options.iter().map(|o| o.name.as_str()),
            &mut problems,
        );
        check_unique(
            "add-on",
            self.destination.addons.iter().map(|a| a.name.as_str()),
            &mut problems,
        );

        for source in &self.sources {
            for (tier, entry) in &source.tiers {
                check_amount(
                    &format!("sources[{}].tiers.{tier}.price", source.name),
                    entry.price,
                    &mut problems,
                );
            }
        }
        for option in &self.middleware_options {
            check_amount(
                &format!("middleware_options[{}].cost.fixed", option.name),
                option.cost.fixed,
                &mut problems,
            );
            check_amount(
                &format!("middleware_options[{}].cost.per_source", option.name),
                option.cost.per_source,
                &mut problems,
            );
        }
        check_amount(
            "destination.required.fixed_price",
            self.destination.required.fixed_price,
            &mut problems,
        );
        for addon in &self.destination.addons {
            check_amount(
                &format!("destination.addons[{}].price", addon.name),
                addon.price,
                &mut problems,
            );
        }

        match self.worst_case_total() {
            Some(total) if total <= MAX_QUOTE_TOTAL => {}
            _ => problems.push(format!(
                "the most expensive selection would exceed the maximum quote total of \
                 {MAX_QUOTE_TOTAL}"
            )),
        }

        problems
    }

    /// Dearest tier, dearest single-source middleware option, the destination
    /// and every add-on together. `None` when the sum leaves the `Decimal` range.
    fn worst_case_total(&self) -> Option<Decimal> {
        let source = self
            .sources
            .iter()
            .flat_map(|source| source.tiers.values())
            .map(|entry| entry.price)
            .max()
            .unwrap_or(Decimal::ZERO);
        let middleware = self
            .middleware_options
            .iter()
            .map(|option| option.cost.fixed.checked_add(option.cost.per_source))
            .try_fold(Decimal::ZERO, |dearest, total| total.map(|total| dearest.max(total)))?;
        let addons = self
            .destination
            .addons
            .iter()
            .try_fold(Decimal::ZERO, |sum, addon| sum.checked_add(addon.price))?;

        [middleware, self.destination.required.fixed_price, addons]
            .into_iter()
            .try_fold(source, |sum, amount| sum.checked_add(amount))
    }
}

fn check_unique<'a>(
    kind: &str,
    names: impl Iterator<Item = &'a str>,
    problems: &mut Vec<String>,
) {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            problems.push(format!("duplicate {kind} name `{name}`"));
        }
    }
}

fn check_amount(path: &str, value: Decimal, problems: &mut Vec<String>) {
    if value < Decimal::ZERO {
        problems.push(format!("{path} must not be negative"));
    }
    if value.normalize().scale() > MONEY_SCALE {
        problems.push(format!("{path} must have at most {MONEY_SCALE} decimal places"));
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{load, load_or_builtin, parse, Specification, BUILTIN_SPEC, MAX_QUOTE_TOTAL};
    use crate::domain::tier::Tier;
    use crate::errors::SpecParseError;

    #[test]
    fn builtin_document_parses() {
        let spec = Specification::from_json(BUILTIN_SPEC).expect("builtin spec parses");
        assert_eq!(spec.sources().len(), 3);
        assert_eq!(spec.middleware_options().len(), 2);
        assert_eq!(spec.destination().addons.len(), 4);
        assert_eq!(spec.parallel_sources(), 2);
        assert_eq!(spec.buffer_days(), 2);
        assert_eq!(Specification::builtin(), spec);
    }

    #[test]
    fn empty_object_defaults_every_accessor() {
        let spec = Specification::from_json("{}").expect("empty spec parses");
        assert_eq!(spec.currency(), "USD");
        assert_eq!(spec.billing_cycle(), "monthly");
        assert_eq!(spec.working_days_per_week(), 5);
        assert_eq!(spec.parallel_sources(), 1);
        assert_eq!(spec.buffer_days(), 0);
        assert!(spec.sources().is_empty());
        assert!(spec.middleware_options().is_empty());
        assert_eq!(spec.destination().required.name, "Agentic IT Service");
        assert_eq!(spec.destination().required.fixed_price, Decimal::ZERO);
        assert_eq!(spec, Specification::default());
    }

    #[test]
    fn malformed_text_returns_fallback_and_error() {
        let fallback = Specification::builtin();
        let (spec, error) = parse("{ not json", &fallback);

        assert_eq!(spec, fallback);
        assert!(matches!(
            error,
            Some(SpecParseError::Syntax(ref message)) if !message.is_empty()
        ));
        let message = error.map(|e| e.to_string()).unwrap_or_default();
        assert!(message.starts_with("JSON parse error:"), "{message}");
    }

    #[test]
    fn valid_text_replaces_fallback() {
        let fallback = Specification::builtin();
        let (spec, error) = parse(r#"{"currency": "EUR"}"#, &fallback);

        assert!(error.is_none());
        assert_eq!(spec.currency(), "EUR");
        assert!(spec.sources().is_empty());
    }

    #[test]
    fn legacy_layer_keys_are_accepted() {
        let raw = r#"{
            "layer1_itsm_sources": [{"name": "Jira", "tiers": {"low": {"price": 50}}}],
            "layer2_azure": {"options": [{"name": "Shared", "cost": {"fixed": 10}}]},
            "layer3_target": {"required": {"fixed_price": 99, "base_days": 2}}
        }"#;
        let spec = Specification::from_json(raw).expect("legacy spec parses");

        assert_eq!(
            spec.source("Jira").and_then(|s| s.tier(Tier::Low)).map(|t| t.price),
            Some(Decimal::new(50, 0))
        );
        assert_eq!(
            spec.middleware_option("Shared").map(|o| o.cost.per_source),
            Some(Decimal::ZERO)
        );
        assert_eq!(spec.destination().required.name, "Agentic IT Service");
        assert_eq!(spec.destination().required.base_days, 2);
    }

    #[test]
    fn canonical_keys_win_over_legacy_keys() {
        let raw = r#"{
            "sources": [{"name": "New"}],
            "layer1_itsm_sources": [{"name": "Old"}]
        }"#;
        let spec = Specification::from_json(raw).expect("spec parses");
        assert!(spec.source("New").is_some());
        assert!(spec.source("Old").is_none());
    }

    #[test]
    fn integer_fields_are_coerced() {
        let raw = r#"{"timeline_policy": {"working_days_per_week": "6", "buffer_days": 2.0}}"#;
        let spec = Specification::from_json(raw).expect("spec parses");
        assert_eq!(spec.working_days_per_week(), 6);
        assert_eq!(spec.buffer_days(), 2);
    }

    #[test]
    fn zero_parallel_sources_reads_as_one() {
        let spec = Specification::from_json(r#"{"timeline_policy": {"parallel_sources": 0}}"#)
            .expect("spec parses");
        assert_eq!(spec.parallel_sources(), 1);
    }

    #[test]
    fn duplicate_names_and_negative_prices_are_rejected() {
        let raw = r#"{
            "sources": [{"name": "A"}, {"name": "A"}],
            "destination": {"addons": [{"name": "X", "price": -5}]}
        }"#;
        let error = Specification::from_json(raw).expect_err("invalid spec");
        let message = error.to_string();
        assert!(message.contains("duplicate source name `A`"), "{message}");
        assert!(
            message.contains("destination.addons[X].price must not be negative"),
            "{message}"
        );
    }

    #[test]
    fn addon_prices_that_overflow_together_are_rejected() {
        let raw = r#"{"destination": {"addons": [
            {"name": "A", "price": 50000000000000000000000000000},
            {"name": "B", "price": 50000000000000000000000000000}
        ]}}"#;
        let error = Specification::from_json(raw).expect_err("overflowing spec");
        let message = error.to_string();
        assert!(message.contains("exceed the maximum quote total"), "{message}");
    }

    #[test]
    fn amounts_beyond_exact_json_numbers_are_rejected() {
        let raw = r#"{"destination": {"required": {"fixed_price": 9007199254740993}}}"#;
        let message = Specification::from_json(raw).expect_err("too large").to_string();
        assert!(
            message.contains("exceed the maximum quote total of 9999999999999.99"),
            "{message}"
        );

        let raw = r#"{"sources": [{"name": "A", "tiers": {"low": {"price": "10.005"}}}]}"#;
        let message = Specification::from_json(raw).expect_err("sub-cent price").to_string();
        assert!(
            message.contains("sources[A].tiers.low.price must have at most 2 decimal places"),
            "{message}"
        );
    }

    #[test]
    fn worst_case_total_may_reach_the_maximum() {
        let raw = r#"{
            "sources": [{"name": "A", "tiers": {
                "low": {"price": 1},
                "high": {"price": 9999999999000}
            }}],
            "middleware_options": [{"name": "M", "cost": {"fixed": 900, "per_source": 99.49}}],
            "destination": {
                "required": {"fixed_price": 0.5},
                "addons": [{"name": "X", "price": 0}]
            }
        }"#;
        let spec = Specification::from_json(raw).expect("boundary spec parses");
        assert_eq!(spec.worst_case_total(), Some(MAX_QUOTE_TOTAL));
        assert_eq!(MAX_QUOTE_TOTAL.to_string(), "9999999999999.99");
    }

    #[test]
    fn unknown_tier_key_is_a_parse_error() {
        let raw = r#"{"sources": [{"name": "A", "tiers": {"urgent": {"price": 1}}}]}"#;
        assert!(matches!(Specification::from_json(raw), Err(SpecParseError::Syntax(_))));
    }

    #[test]
    fn load_without_path_uses_builtin_document() {
        let spec = load(None).expect("builtin loads");
        assert_eq!(spec, Specification::builtin());
    }

    #[test]
    fn load_reports_missing_and_invalid_files() {
        let dir = tempfile::TempDir::new().expect("temp dir");

        let missing =
            load(Some(dir.path().join("absent.json").as_path())).expect_err("missing file");
        assert_eq!(missing.error_class(), "invalid_input");

        let path = dir.path().join("spec.json");
        std::fs::write(&path, "{ nope").expect("write spec");
        let invalid = load(Some(path.as_path())).expect_err("invalid file");
        assert_eq!(invalid.error_class(), "spec_validation");

        std::fs::write(&path, r#"{"currency": "GBP"}"#).expect("write spec");
        assert_eq!(load(Some(path.as_path())).expect("valid file").currency(), "GBP");
    }

    #[test]
    fn load_or_builtin_falls_back_on_rejected_documents() {
        let dir = tempfile::TempDir::new().expect("temp dir");

        let missing = load_or_builtin(Some(dir.path().join("absent.json").as_path()))
            .expect_err("missing file");
        assert_eq!(missing.error_class(), "invalid_input");

        let path = dir.path().join("spec.json");
        std::fs::write(&path, "{ \"sources\": [").expect("write spec");
        let (spec, error) = load_or_builtin(Some(path.as_path())).expect("readable file");
        assert_eq!(spec, Specification::builtin());
        assert!(matches!(error, Some(SpecParseError::Syntax(_))));

        std::fs::write(&path, r#"{"currency": "GBP"}"#).expect("write spec");
        let (spec, error) = load_or_builtin(Some(path.as_path())).expect("valid file");
        assert_eq!(spec.currency(), "GBP");
        assert!(error.is_none());

        assert_eq!(load_or_builtin(None).expect("builtin"), (Specification::builtin(), None));
    }

    #[test]
    fn canonical_serialization_reparses_to_same_spec() {
        let spec = Specification::builtin();
        let raw = spec.to_json_pretty().expect("serializes");
        assert_eq!(Specification::from_json(&raw).expect("reparses"), spec);
    }
}
