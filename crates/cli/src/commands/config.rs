use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use layerquote_core::config::{default_config_paths, AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source_of = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let spec_path = config
        .spec
        .path
        .as_deref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<builtin>".to_string());

    let lines = [
        "effective config (source precedence: env > file > default):".to_string(),
        render_line("spec.path", &spec_path, source_of("spec.path", &["LAYERQUOTE_SPEC_PATH"])),
        render_line(
            "timeline.source_scheduling",
            config.timeline.source_scheduling.as_str(),
            source_of(
                "timeline.source_scheduling",
                &["LAYERQUOTE_TIMELINE_SOURCE_SCHEDULING"],
            ),
        ),
        render_line(
            "export.file_name",
            &config.export.file_name,
            source_of("export.file_name", &["LAYERQUOTE_EXPORT_FILE_NAME"]),
        ),
        render_line(
            "export.pretty",
            &config.export.pretty.to_string(),
            source_of("export.pretty", &["LAYERQUOTE_EXPORT_PRETTY"]),
        ),
        render_line(
            "logging.level",
            &config.logging.level,
            source_of("logging.level", &["LAYERQUOTE_LOGGING_LEVEL", "LAYERQUOTE_LOG_LEVEL"]),
        ),
        render_line(
            "logging.format",
            &format!("{:?}", config.logging.format).to_ascii_lowercase(),
            source_of("logging.format", &["LAYERQUOTE_LOGGING_FORMAT", "LAYERQUOTE_LOG_FORMAT"]),
        ),
    ];

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    default_config_paths().into_iter().find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
