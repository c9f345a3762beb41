use std::path::{Path, PathBuf};

use layerquote_core::config::{AppConfig, LoadOptions};
use layerquote_core::errors::ApplicationError;
use layerquote_core::spec::{self as pricing_spec, Specification, BUILTIN_SPEC};

use crate::commands::CommandResult;

pub fn validate(path: Option<&Path>) -> CommandResult {
    let target = match resolve_target(path) {
        Ok(target) => target,
        Err(error) => return CommandResult::from_error("spec validate", &error),
    };

    let spec = match pricing_spec::load(target.as_deref()) {
        Ok(spec) => spec,
        Err(error) => return CommandResult::from_error("spec validate", &error),
    };

    let label = target
        .as_deref()
        .map(|path| format!("`{}`", path.display()))
        .unwrap_or_else(|| "builtin specification".to_string());
    let mut message = format!("{label} is valid: {}", summarize(&spec));
    for warning in warnings(&spec) {
        message.push_str("; warning: ");
        message.push_str(&warning);
    }

    CommandResult::success("spec validate", message)
}

pub fn print_default() -> CommandResult {
    CommandResult::text(BUILTIN_SPEC.trim_end())
}

fn resolve_target(path: Option<&Path>) -> Result<Option<PathBuf>, ApplicationError> {
    if let Some(path) = path {
        return Ok(Some(path.to_path_buf()));
    }

    let config = AppConfig::load(LoadOptions::default())
        .map_err(|error| ApplicationError::Configuration(error.to_string()))?;
    Ok(config.spec.path)
}

pub(crate) fn summarize(spec: &Specification) -> String {
    format!(
        "{} source(s), {} middleware option(s), {} add-on(s), currency {}",
        spec.sources().len(),
        spec.middleware_options().len(),
        spec.destination().addons.len(),
        spec.currency()
    )
}

/// Problems that still price, but that a quote will surface to the user.
pub(crate) fn warnings(spec: &Specification) -> Vec<String> {
    let mut warnings = Vec::new();
    if spec.middleware_options().is_empty() {
        warnings.push("no middleware options defined".to_string());
    }
    for source in spec.sources() {
        if source.tiers.is_empty() {
            warnings.push(format!("source `{}` defines no tiers", source.name));
        }
    }
    if spec.working_days_per_week() == 0 {
        warnings.push("timeline_policy.working_days_per_week is 0".to_string());
    }
    warnings
}
