pub mod config;
pub mod doctor;
pub mod export;
pub mod quote;
pub mod spec;

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Args;
use layerquote_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use layerquote_core::cpq::timeline::SourceScheduling;
use layerquote_core::domain::selection::{first_chosen, Selection, SourceChoice, TierPlacements};
use layerquote_core::errors::{ApplicationError, SpecParseError};
use layerquote_core::spec::{self as pricing_spec, Specification};
use layerquote_core::Tier;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(command, error.error_class(), error.to_string(), error.exit_code())
    }

    pub fn text(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            concat!(
                "{{\"command\":\"unknown\",\"status\":\"error\",",
                "\"error_class\":\"serialization\",\"message\":\"{}\"}}"
            ),
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Selection flags shared by `quote` and `export`.
#[derive(Debug, Clone, Default, Args)]
pub struct SelectionArgs {
    #[arg(long, help = "Source system to onboard")]
    pub source: Option<String>,
    #[arg(long, help = "Priority tier for the source: low|medium|high")]
    pub tier: Option<Tier>,
    #[arg(
        long,
        value_name = "TIER=NAME",
        value_parser = parse_placement,
        help = "Place a source in a tier bucket; the first placement in low, medium, high order \
                wins"
    )]
    pub place: Vec<SourceChoice>,
    #[arg(long, help = "Middleware option; repeated values keep the first")]
    pub middleware: Vec<String>,
    #[arg(long, help = "Destination add-on; may be repeated")]
    pub addon: Vec<String>,
    #[arg(long, value_name = "YYYY-MM-DD", help = "Project start date (defaults to today)")]
    pub today: Option<NaiveDate>,
    #[arg(long, value_name = "PATH", help = "Pricing specification file")]
    pub spec: Option<PathBuf>,
    #[arg(long, help = "Source scheduling: sequential|parallel")]
    pub scheduling: Option<SourceScheduling>,
}

impl SelectionArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            spec_path: self.spec.clone(),
            source_scheduling: self.scheduling,
            ..ConfigOverrides::default()
        }
    }

    pub fn to_selection(&self) -> Result<Selection, ApplicationError> {
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let mut selection = Selection::new(today);

        if self.source.is_some() && !self.place.is_empty() {
            return Err(ApplicationError::Input(
                "--source and --place cannot be combined".to_string(),
            ));
        }

        let choice = match (&self.source, self.tier) {
            (Some(source), Some(tier)) => Some(SourceChoice { name: source.clone(), tier }),
            (Some(source), None) => {
                return Err(ApplicationError::Input(format!(
                    "source `{source}` needs a priority tier (--tier low|medium|high)"
                )));
            }
            (None, Some(_)) => {
                return Err(ApplicationError::Input("--tier requires --source".to_string()));
            }
            (None, None) => self.placements().first_placement(),
        };
        if let Some(choice) = choice {
            selection = selection.with_source(choice.name, choice.tier);
        }

        if let Some(middleware) = first_chosen(&self.middleware) {
            selection = selection.with_middleware(middleware);
        }

        Ok(selection.with_addons(self.addon.iter().cloned()))
    }

    fn placements(&self) -> TierPlacements {
        let mut placements = TierPlacements::default();
        for choice in &self.place {
            placements.place(choice.tier, choice.name.clone());
        }
        if self.place.len() > 1 {
            tracing::debug!(
                event_name = "selection.placements.ignored",
                ignored = self.place.len() - 1,
                "only one source is priced; extra placements are ignored"
            );
        }
        placements
    }
}

fn parse_placement(value: &str) -> Result<SourceChoice, String> {
    let (tier, name) = value
        .split_once('=')
        .ok_or_else(|| format!("expected TIER=NAME, got `{value}`"))?;
    let tier = tier.parse::<Tier>().map_err(|error| error.to_string())?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("placement `{value}` is missing a source name"));
    }
    Ok(SourceChoice { name: name.to_string(), tier })
}

/// Configuration plus the specification it points at. A configured file that
/// was read but rejected leaves the builtin document in `spec` and the reason
/// in `spec_error`.
pub(crate) struct Workspace {
    pub config: AppConfig,
    pub spec: Specification,
    pub spec_error: Option<SpecParseError>,
}

pub(crate) fn load_workspace(overrides: ConfigOverrides) -> Result<Workspace, ApplicationError> {
    let config = AppConfig::load(LoadOptions { overrides, ..LoadOptions::default() })
        .map_err(|error| ApplicationError::Configuration(error.to_string()))?;
    let (spec, spec_error) = pricing_spec::load_or_builtin(config.spec.path.as_deref())?;
    Ok(Workspace { config, spec, spec_error })
}
