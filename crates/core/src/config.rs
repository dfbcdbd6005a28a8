use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cpq::currency::{CurrencyTable, BASE_CURRENCY};

pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["cellquote.toml", "config/cellquote.toml"];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub pricing: PricingConfig,
    pub currencies: CurrencyConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct PricingConfig {
    pub table_path: PathBuf,
    pub default_currency: String,
    pub strict_currency: bool,
}

#[derive(Clone, Debug)]
pub struct CurrencyConfig {
    pub base: String,
    /// Multipliers applied to base-currency prices. The base itself is implied at 1.
    pub rates: BTreeMap<String, Decimal>,
}

#[derive(Clone, Debug)]
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
    pub table_path: Option<PathBuf>,
    pub default_currency: Option<String>,
    pub strict_currency: Option<bool>,
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
        let defaults = CurrencyTable::default();
        Self {
            pricing: PricingConfig {
                table_path: PathBuf::from("prices.csv"),
                default_currency: BASE_CURRENCY.to_string(),
                strict_currency: false,
            },
            currencies: CurrencyConfig {
                base: defaults.base().to_string(),
                rates: defaults
                    .codes()
                    .filter(|code| *code != defaults.base())
                    .filter_map(|code| defaults.rate(code).map(|rate| (code.to_string(), rate)))
                    .collect(),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
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
            config.apply_patch(patch)?;
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_CANDIDATES[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// The currency table quotes are scaled with.
    pub fn currency_table(&self) -> CurrencyTable {
        CurrencyTable::new(
            self.currencies.base.clone(),
            self.currencies.rates.iter().map(|(code, rate)| (code.clone(), *rate)),
        )
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(pricing) = patch.pricing {
            if let Some(table_path) = pricing.table_path {
                self.pricing.table_path = table_path;
            }
            if let Some(default_currency) = pricing.default_currency {
                self.pricing.default_currency = default_currency;
            }
            if let Some(strict_currency) = pricing.strict_currency {
                self.pricing.strict_currency = strict_currency;
            }
        }

        if let Some(currencies) = patch.currencies {
            if let Some(base) = currencies.base {
                self.currencies.base = base;
            }
            if let Some(rates) = currencies.rates {
                self.currencies.rates = rates
                    .into_iter()
                    .map(|(code, rate)| {
                        let rate = rate.to_decimal(&code)?;
                        Ok((code.trim().to_ascii_uppercase(), rate))
                    })
                    .collect::<Result<_, ConfigError>>()?;
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

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("CELLQUOTE_PRICING_TABLE_PATH") {
            self.pricing.table_path = PathBuf::from(value);
        }
        if let Some(value) = read_env("CELLQUOTE_PRICING_DEFAULT_CURRENCY") {
            self.pricing.default_currency = value;
        }
        if let Some(value) = read_env("CELLQUOTE_PRICING_STRICT_CURRENCY") {
            self.pricing.strict_currency = parse_bool("CELLQUOTE_PRICING_STRICT_CURRENCY", &value)?;
        }

        if let Some(value) = read_env("CELLQUOTE_CURRENCIES_BASE") {
            self.currencies.base = value;
        }
        if let Some(value) = read_env("CELLQUOTE_CURRENCIES_RATES") {
            self.currencies.rates = parse_rates("CELLQUOTE_CURRENCIES_RATES", &value)?;
        }

        let log_level =
            read_env("CELLQUOTE_LOGGING_LEVEL").or_else(|| read_env("CELLQUOTE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("CELLQUOTE_LOGGING_FORMAT").or_else(|| read_env("CELLQUOTE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(table_path) = overrides.table_path {
            self.pricing.table_path = table_path;
        }
        if let Some(default_currency) = overrides.default_currency {
            self.pricing.default_currency = default_currency;
        }
        if let Some(strict_currency) = overrides.strict_currency {
            self.pricing.strict_currency = strict_currency;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_pricing(&self.pricing, &self.currencies)?;
        validate_currencies(&self.currencies)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// An explicit path is used only if it exists; otherwise the first existing candidate.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|path| path.exists())
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

fn validate_pricing(
    pricing: &PricingConfig,
    currencies: &CurrencyConfig,
) -> Result<(), ConfigError> {
    if pricing.table_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("pricing.table_path must not be empty".to_string()));
    }

    let code = pricing.default_currency.trim().to_ascii_uppercase();
    if code.is_empty() {
        return Err(ConfigError::Validation(
            "pricing.default_currency must not be empty".to_string(),
        ));
    }

    let known = code == currencies.base.trim().to_ascii_uppercase()
        || currencies.rates.contains_key(&code);
    if pricing.strict_currency && !known {
        return Err(ConfigError::Validation(format!(
            "pricing.default_currency `{code}` has no rate under [currencies.rates] and \
             pricing.strict_currency is enabled"
        )));
    }

    Ok(())
}

fn validate_currencies(currencies: &CurrencyConfig) -> Result<(), ConfigError> {
    let base = currencies.base.trim().to_ascii_uppercase();
    if base.is_empty() {
        return Err(ConfigError::Validation("currencies.base must not be empty".to_string()));
    }

    if let Some(rate) = currencies.rates.get(&base) {
        if *rate != Decimal::ONE {
            return Err(ConfigError::Validation(format!(
                "currencies.rates.{base} must be 1 because {base} is the base currency"
            )));
        }
    }

    if let Some((code, _)) = currencies.rates.iter().find(|(_, rate)| **rate <= Decimal::ZERO) {
        return Err(ConfigError::Validation(format!(
            "currencies.rates.{code} must be greater than zero"
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
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// `CAD=1.36,EUR=0.92`
fn parse_rates(key: &str, value: &str) -> Result<BTreeMap<String, Decimal>, ConfigError> {
    let invalid =
        || ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() };

    value
        .split(',')
        .filter(|pair| !pair.trim().is_empty())
        .map(|pair| {
            let (code, rate) = pair.split_once('=').ok_or_else(invalid)?;
            let rate = Decimal::from_str(rate.trim()).map_err(|_| invalid())?;
            Ok((code.trim().to_ascii_uppercase(), rate))
        })
        .collect()
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    pricing: Option<PricingPatch>,
    currencies: Option<CurrencyPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    table_path: Option<PathBuf>,
    default_currency: Option<String>,
    strict_currency: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct CurrencyPatch {
    base: Option<String>,
    rates: Option<BTreeMap<String, RateValue>>,
}

/// TOML floats are accepted for convenience; quoted strings keep exact decimals.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RateValue {
    Number(f64),
    Text(String),
}

impl RateValue {
    fn to_decimal(&self, code: &str) -> Result<Decimal, ConfigError> {
        let raw = match self {
            Self::Number(value) => value.to_string(),
            Self::Text(value) => value.trim().to_string(),
        };
        Decimal::from_str(&raw).map_err(|_| {
            ConfigError::Validation(format!("currencies.rates.{code} `{raw}` is not a number"))
        })
    }
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

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

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

    fn write_config(dir: &TempDir, body: &str) -> Result<PathBuf, String> {
        let path = dir.path().join("cellquote.toml");
        fs::write(&path, body).map_err(|err| err.to_string())?;
        Ok(path)
    }

    #[test]
    fn defaults_carry_reference_currencies() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;
        let table = config.currency_table();

        ensure(config.pricing.default_currency == "USD", "default currency should be USD")?;
        ensure(!config.pricing.strict_currency, "strict currency should default to off")?;
        ensure(table.rate("usd") == Some(Decimal::ONE), "base currency rate should be 1")?;
        ensure(table.rate("CAD") == Some(Decimal::new(136, 2)), "CAD should default to 1.36")?;
        ensure(table.rate("EUR") == Some(Decimal::new(92, 2)), "EUR should default to 0.92")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation_and_rate_values() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_CELLQUOTE_PRICE_DIR", "/srv/rates");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(
                &dir,
                r#"
[pricing]
table_path = "${TEST_CELLQUOTE_PRICE_DIR}/prices.csv"

[currencies.rates]
cad = 1.35
GBP = "0.79"
"#,
            )?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.pricing.table_path == PathBuf::from("/srv/rates/prices.csv"),
                "table path should interpolate the environment",
            )?;
            ensure(
                config.currencies.rates.get("CAD") == Some(&Decimal::new(135, 2)),
                "float rates should parse exactly and upper-case the code",
            )?;
            ensure(
                config.currencies.rates.get("GBP") == Some(&Decimal::new(79, 2)),
                "string rates should parse",
            )?;
            ensure(
                !config.currencies.rates.contains_key("EUR"),
                "a rates table replaces the defaults",
            )
        })();

        clear_vars(&["TEST_CELLQUOTE_PRICE_DIR"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("CELLQUOTE_LOG_LEVEL", "warn");
        env::set_var("CELLQUOTE_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )
        })();

        clear_vars(&["CELLQUOTE_LOG_LEVEL", "CELLQUOTE_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("CELLQUOTE_PRICING_DEFAULT_CURRENCY", "CAD");
        env::set_var("CELLQUOTE_CURRENCIES_RATES", "CAD=1.4, EUR=0.9");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(
                &dir,
                r#"
[pricing]
table_path = "from-file.csv"
default_currency = "EUR"

[logging]
level = "warn"
"#,
            )?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    table_path: Some(PathBuf::from("from-override.csv")),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.pricing.table_path == PathBuf::from("from-override.csv"),
                "override table path should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.pricing.default_currency == "CAD",
                "env default currency should win over file",
            )?;
            ensure(
                config.currencies.rates.get("CAD") == Some(&Decimal::new(14, 1)),
                "env rates should replace defaults",
            )
        })();

        clear_vars(&["CELLQUOTE_PRICING_DEFAULT_CURRENCY", "CELLQUOTE_CURRENCIES_RATES"]);
        result
    }

    #[test]
    fn invalid_env_override_is_reported_with_key() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("CELLQUOTE_PRICING_STRICT_CURRENCY", "sometimes");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected override failure but load succeeded".to_string()),
                Err(error) => error,
            };
            ensure(
                matches!(
                    error,
                    ConfigError::InvalidEnvOverride { ref key, .. }
                        if key == "CELLQUOTE_PRICING_STRICT_CURRENCY"
                ),
                "failure should name the offending variable",
            )
        })();

        clear_vars(&["CELLQUOTE_PRICING_STRICT_CURRENCY"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let cases = [
            ("[currencies.rates]\nUSD = 1.1\n", "currencies.rates.USD"),
            ("[currencies.rates]\nEUR = 0\n", "currencies.rates.EUR"),
            ("[pricing]\ndefault_currency = \"JPY\"\nstrict_currency = true\n", "JPY"),
            ("[logging]\nlevel = \"loud\"\n", "logging.level"),
        ];

        for (body, expected) in cases {
            let path = write_config(&dir, body)?;
            let error = match AppConfig::load(LoadOptions {
                config_path: Some(path),
                ..LoadOptions::default()
            }) {
                Ok(_) => return Err(format!("expected validation failure for `{expected}`")),
                Err(error) => error,
            };
            let has_message =
                matches!(error, ConfigError::Validation(ref message) if message.contains(expected));
            if !has_message {
                return Err(format!("validation failure should mention `{expected}`: {error}"));
            }
        }

        Ok(())
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let missing = dir.path().join("nope.toml");

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
