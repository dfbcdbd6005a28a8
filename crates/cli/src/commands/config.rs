use std::env;
use std::fs;
use std::path::Path;

use cellquote_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

use crate::commands::CommandResult;

pub fn run(load: LoadOptions) -> CommandResult {
    let config_file_path = resolve_config_path(load.config_path.as_deref());
    let config = match AppConfig::load(load) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            )
        }
    };

    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "pricing.table_path",
        &config.pricing.table_path.display().to_string(),
        source("pricing.table_path", &["CELLQUOTE_PRICING_TABLE_PATH"]),
    ));
    lines.push(render_line(
        "pricing.default_currency",
        &config.pricing.default_currency,
        source("pricing.default_currency", &["CELLQUOTE_PRICING_DEFAULT_CURRENCY"]),
    ));
    lines.push(render_line(
        "pricing.strict_currency",
        &config.pricing.strict_currency.to_string(),
        source("pricing.strict_currency", &["CELLQUOTE_PRICING_STRICT_CURRENCY"]),
    ));

    lines.push(render_line(
        "currencies.base",
        &config.currencies.base,
        source("currencies.base", &["CELLQUOTE_CURRENCIES_BASE"]),
    ));
    let rates = config
        .currencies
        .rates
        .iter()
        .map(|(code, rate)| format!("{code}={rate}"))
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(render_line(
        "currencies.rates",
        &rates,
        source("currencies.rates", &["CELLQUOTE_CURRENCIES_RATES"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["CELLQUOTE_LOGGING_LEVEL", "CELLQUOTE_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format).to_ascii_lowercase(),
        source("logging.format", &["CELLQUOTE_LOGGING_FORMAT", "CELLQUOTE_LOG_FORMAT"]),
    ));

    CommandResult::output(lines.join("\n"))
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<toml::Table>().ok().map(Value::Table)
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    let env_key = env_keys
        .iter()
        .find(|key| env::var(key).is_ok_and(|value| !value.trim().is_empty()));
    if let Some(env_key) = env_key {
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
