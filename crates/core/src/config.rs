use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cpq::timeline::SourceScheduling;
use crate::export::DEFAULT_EXPORT_FILE_NAME;

pub const CONFIG_FILE_NAME: &str = "layerquote.toml";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub spec: SpecConfig,
    pub timeline: TimelineConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecConfig {
    /// Pricing specification document. The builtin document is used when unset.
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TimelineConfig {
    pub source_scheduling: SourceScheduling,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportConfig {
    pub file_name: String,
    pub pretty: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub spec_path: Option<PathBuf>,
    pub source_scheduling: Option<SourceScheduling>,
    pub export_file_name: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            spec: SpecConfig::default(),
            timeline: TimelineConfig::default(),
            export: ExportConfig { file_name: DEFAULT_EXPORT_FILE_NAME.to_string(), pretty: true },
            logging: LoggingConfig { level: "warn".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(spec) = patch.spec {
            if let Some(path) = spec.path {
                self.spec.path = Some(path);
            }
        }

        if let Some(timeline) = patch.timeline {
            if let Some(source_scheduling) = timeline.source_scheduling {
                self.timeline.source_scheduling = source_scheduling;
            }
        }

        if let Some(export) = patch.export {
            if let Some(file_name) = export.file_name {
                self.export.file_name = file_name;
            }
            if let Some(pretty) = export.pretty {
                self.export.pretty = pretty;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("LAYERQUOTE_SPEC_PATH") {
            self.spec.path = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("LAYERQUOTE_TIMELINE_SOURCE_SCHEDULING") {
            self.timeline.source_scheduling = value.parse().map_err(|_| {
                ConfigError::InvalidEnvOverride {
                    key: "LAYERQUOTE_TIMELINE_SOURCE_SCHEDULING".to_string(),
                    value: value.clone(),
                }
            })?;
        }

        if let Some(value) = read_env("LAYERQUOTE_EXPORT_FILE_NAME") {
            self.export.file_name = value;
        }
        if let Some(value) = read_env("LAYERQUOTE_EXPORT_PRETTY") {
            self.export.pretty = parse_bool("LAYERQUOTE_EXPORT_PRETTY", &value)?;
        }

        let log_level =
            read_env("LAYERQUOTE_LOGGING_LEVEL").or_else(|| read_env("LAYERQUOTE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("LAYERQUOTE_LOGGING_FORMAT").or_else(|| read_env("LAYERQUOTE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(spec_path) = overrides.spec_path {
            self.spec.path = Some(spec_path);
        }
        if let Some(source_scheduling) = overrides.source_scheduling {
            self.timeline.source_scheduling = source_scheduling;
        }
        if let Some(export_file_name) = overrides.export_file_name {
            self.export.file_name = export_file_name;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_spec(&self.spec)?;
        validate_export(&self.export)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    default_config_paths().into_iter().find(|path| path.exists())
}

pub fn default_config_paths() -> [PathBuf; 2] {
    [PathBuf::from(CONFIG_FILE_NAME), Path::new("config").join(CONFIG_FILE_NAME)]
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_spec(spec: &SpecConfig) -> Result<(), ConfigError> {
    if let Some(path) = &spec.path {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "spec.path must not be empty (remove it to use the builtin specification)"
                    .to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_export(export: &ExportConfig) -> Result<(), ConfigError> {
    let file_name = export.file_name.trim();
    if file_name.is_empty() {
        return Err(ConfigError::Validation("export.file_name must not be empty".to_string()));
    }
    if !file_name.to_ascii_lowercase().ends_with(".json") {
        return Err(ConfigError::Validation(format!(
            "export.file_name must end with `.json` (got `{file_name}`)"
        )));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    spec: Option<SpecPatch>,
    timeline: Option<TimelinePatch>,
    export: Option<ExportPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct SpecPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct TimelinePatch {
    source_scheduling: Option<SourceScheduling>,
}

#[derive(Debug, Default, Deserialize)]
struct ExportPatch {
    file_name: Option<String>,
    pretty: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
    use crate::cpq::timeline::SourceScheduling;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const ALL_VARS: &[&str] = &[
        "LAYERQUOTE_SPEC_PATH",
        "LAYERQUOTE_TIMELINE_SOURCE_SCHEDULING",
        "LAYERQUOTE_EXPORT_FILE_NAME",
        "LAYERQUOTE_EXPORT_PRETTY",
        "LAYERQUOTE_LOGGING_LEVEL",
        "LAYERQUOTE_LOG_LEVEL",
        "LAYERQUOTE_LOGGING_FORMAT",
        "LAYERQUOTE_LOG_FORMAT",
        "TEST_LAYERQUOTE_SPEC_DIR",
    ];

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_validate_without_a_file() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let config = AppConfig::load(LoadOptions {
            config_path: Some(dir.path().join("absent.toml")),
            ..LoadOptions::default()
        })
        .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config == AppConfig::default(), "missing optional file should yield defaults")?;
        ensure(config.spec.path.is_none(), "builtin spec is the default")?;
        ensure(
            config.timeline.source_scheduling == SourceScheduling::Sequential,
            "sequential scheduling is the default",
        )?;
        ensure(config.export.file_name == "quote_timeline.json", "default export file name")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);
        env::set_var("TEST_LAYERQUOTE_SPEC_DIR", "/srv/pricing");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("layerquote.toml");
            fs::write(
                &path,
                r#"
[spec]
path = "${TEST_LAYERQUOTE_SPEC_DIR}/spec.json"

[timeline]
source_scheduling = "parallel"

[export]
pretty = false
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.spec.path == Some(PathBuf::from("/srv/pricing/spec.json")),
                "spec path should be interpolated from environment",
            )?;
            ensure(
                config.timeline.source_scheduling == SourceScheduling::Parallel,
                "scheduling should be read from file",
            )?;
            ensure(!config.export.pretty, "pretty flag should be read from file")
        })();

        clear_vars(ALL_VARS);
        result
    }

    #[test]
    fn missing_interpolation_variable_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("layerquote.toml");
        fs::write(&path, "[spec]\npath = \"${TEST_LAYERQUOTE_SPEC_DIR}/x.json\"\n")
            .map_err(|err| err.to_string())?;

        let error =
            match AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
            {
                Ok(_) => return Err("expected interpolation failure".to_string()),
                Err(error) => error,
            };
        ensure(
            matches!(
                error,
                ConfigError::MissingEnvInterpolation { ref var }
                    if var == "TEST_LAYERQUOTE_SPEC_DIR"
            ),
            "interpolation failure should name the variable",
        )
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);
        env::set_var("LAYERQUOTE_LOG_LEVEL", "debug");
        env::set_var("LAYERQUOTE_LOG_FORMAT", "json");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "debug", "log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Json),
                "json logging format should be set from env var",
            )
        })();

        clear_vars(ALL_VARS);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);
        env::set_var("LAYERQUOTE_SPEC_PATH", "from-env.json");
        env::set_var("LAYERQUOTE_TIMELINE_SOURCE_SCHEDULING", "parallel");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("layerquote.toml");
            fs::write(
                &path,
                r#"
[spec]
path = "from-file.json"

[export]
file_name = "from-file.json"

[logging]
level = "info"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    source_scheduling: Some(SourceScheduling::Sequential),
                    log_level: Some("error".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.spec.path == Some(PathBuf::from("from-env.json")),
                "env spec path should win over file",
            )?;
            ensure(
                config.timeline.source_scheduling == SourceScheduling::Sequential,
                "override scheduling should win over env",
            )?;
            ensure(config.export.file_name == "from-file.json", "file export name should apply")?;
            ensure(config.logging.level == "error", "overridden log level should be error")
        })();

        clear_vars(ALL_VARS);
        result
    }

    #[test]
    fn invalid_scheduling_env_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);
        env::set_var("LAYERQUOTE_TIMELINE_SOURCE_SCHEDULING", "staggered");

        let result = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => Err("expected invalid scheduling to fail".to_string()),
            Err(error) => ensure(
                matches!(
                    error,
                    ConfigError::InvalidEnvOverride { ref key, .. }
                        if key == "LAYERQUOTE_TIMELINE_SOURCE_SCHEDULING"
                ),
                "error should name the scheduling variable",
            ),
        };

        clear_vars(ALL_VARS);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);
        env::set_var("LAYERQUOTE_EXPORT_FILE_NAME", "quote.csv");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("export.file_name")
            );
            ensure(has_message, "validation failure should mention export.file_name")
        })();

        clear_vars(ALL_VARS);
        result
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let missing = dir.path().join("layerquote.toml");
        let result = AppConfig::load(LoadOptions {
            config_path: Some(missing),
            require_file: true,
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "missing required file should fail",
        )
    }
}
