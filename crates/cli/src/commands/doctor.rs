use chrono::Local;
use layerquote_core::config::{AppConfig, LoadOptions};
use layerquote_core::cpq::{DeterministicQuoteRuntime, QuoteRuntime};
use layerquote_core::domain::selection::Selection;
use layerquote_core::spec::{self as pricing_spec, Specification};
use serde::Serialize;

use crate::commands::spec::{summarize, warnings};
use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Fail { 2 } else { 0 };

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                concat!(
                    "{{\"overall_status\":\"fail\",",
                    "\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}"
                ),
                escape_json(&error.to_string())
            )
        });
        return CommandResult { exit_code, output };
    }

    CommandResult { exit_code, output: render_human(&report) }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            match check_specification(&config) {
                Ok((check, spec)) => {
                    checks.push(check);
                    checks.push(check_sample_quote(&config, &spec));
                }
                Err(check) => {
                    checks.push(check);
                    checks.push(skipped("sample_quote", "specification did not load"));
                }
            }
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("specification", "configuration did not load"));
            checks.push(skipped("sample_quote", "configuration did not load"));
        }
    }

    let overall_status = if checks.iter().any(|check| check.status == CheckStatus::Fail) {
        CheckStatus::Fail
    } else if checks.iter().any(|check| check.status == CheckStatus::Warn) {
        CheckStatus::Warn
    } else {
        CheckStatus::Pass
    };
    let summary = match overall_status {
        CheckStatus::Pass => "doctor: all readiness checks passed",
        CheckStatus::Warn => "doctor: readiness checks passed with warnings",
        _ => "doctor: one or more readiness checks failed",
    }
    .to_string();

    DoctorReport { overall_status, summary, checks }
}

fn check_specification(config: &AppConfig) -> Result<(DoctorCheck, Specification), DoctorCheck> {
    let origin = config
        .spec
        .path
        .as_deref()
        .map(|path| format!("`{}`", path.display()))
        .unwrap_or_else(|| "builtin".to_string());

    match pricing_spec::load(config.spec.path.as_deref()) {
        Ok(spec) => {
            let gaps = warnings(&spec);
            let (status, details) = if gaps.is_empty() {
                (CheckStatus::Pass, format!("{origin}: {}", summarize(&spec)))
            } else {
                (CheckStatus::Warn, format!("{origin}: {}", gaps.join("; ")))
            };
            Ok((DoctorCheck { name: "specification", status, details }, spec))
        }
        Err(error) => Err(DoctorCheck {
            name: "specification",
            status: CheckStatus::Fail,
            details: format!("{origin}: {error}"),
        }),
    }
}

/// Prices the first tier of the first source with default choices.
fn check_sample_quote(config: &AppConfig, spec: &Specification) -> DoctorCheck {
    let mut selection = Selection::new(Local::now().date_naive());
    if let Some(source) = spec.sources().first() {
        if let Some(tier) = source.tiers.keys().next() {
            selection = selection.with_source(source.name.clone(), *tier);
        }
    }

    let runtime =
        DeterministicQuoteRuntime::default().with_scheduling(config.timeline.source_scheduling);
    let quote = runtime.compute(spec, &selection);
    let configuration_errors: Vec<String> =
        quote.configuration_errors().map(ToString::to_string).collect();

    if configuration_errors.is_empty() {
        DoctorCheck {
            name: "sample_quote",
            status: CheckStatus::Pass,
            details: format!(
                "total {} {}, {} business days ({} scheduling)",
                quote.grand_total_cost,
                quote.currency,
                quote.total_business_days,
                config.timeline.source_scheduling
            ),
        }
    } else {
        DoctorCheck {
            name: "sample_quote",
            status: CheckStatus::Warn,
            details: configuration_errors.join("; "),
        }
    }
}

fn skipped(name: &'static str, reason: &str) -> DoctorCheck {
    DoctorCheck {
        name,
        status: CheckStatus::Skipped,
        details: format!("skipped because {reason}"),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
