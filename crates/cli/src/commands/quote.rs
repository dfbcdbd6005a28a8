use std::fs;
use std::path::{Path, PathBuf};

use cellquote_core::config::LoadOptions;
use cellquote_core::cpq::price_table::PriceTable;
use cellquote_core::cpq::{DeterministicQuoteRuntime, QuoteEvaluationInput, QuoteRuntime};
use cellquote_core::domain::quote::QuoteRequestDraft;
use cellquote_core::errors::{ApplicationError, DomainError};
use tracing::{info, warn};

use crate::commands::{load_config, CommandResult};
use crate::render::{self, OutputFormat, QuoteDocument};

#[derive(Clone, Debug, Default)]
pub struct QuoteOptions {
    pub request: PathBuf,
    pub prices: Option<PathBuf>,
    pub currency: Option<String>,
    pub strict_currency: bool,
    pub format: OutputFormat,
    /// A file, or an existing directory that receives `{stem}_breakdown.{ext}`.
    pub out: Option<PathBuf>,
}

pub fn run(load: LoadOptions, options: QuoteOptions) -> CommandResult {
    match execute(load, options) {
        Ok(result) => result,
        Err(error) => {
            warn!(
                event_name = "cli.quote.failed",
                error_class = error.error_class(),
                error = %error,
                "quote command failed"
            );
            CommandResult::from_error("quote", &error)
        }
    }
}

fn execute(
    mut load: LoadOptions,
    options: QuoteOptions,
) -> Result<CommandResult, ApplicationError> {
    if let Some(prices) = options.prices.clone() {
        load.overrides.table_path = Some(prices);
    }
    if options.strict_currency {
        load.overrides.strict_currency = Some(true);
    }
    let config = load_config(load)?;

    let draft = read_request(&options.request)?;
    let build = draft.build();
    let request = build.request;
    for warning in &build.warnings {
        warn!(
            event_name = "quote.build.warning",
            quote_id = %request.id.0,
            code = warning.code(),
            "{warning}"
        );
    }

    let prices = PriceTable::from_csv_path(&config.pricing.table_path)
        .map_err(|error| ApplicationError::PriceTable(error.to_string()))?;
    info!(
        event_name = "quote.price_table.loaded",
        path = %config.pricing.table_path.display(),
        entries = prices.len(),
        "price table loaded"
    );

    // Flag, then request file, then configured default.
    let code = options
        .currency
        .clone()
        .or_else(|| request.currency.clone())
        .unwrap_or_else(|| config.pricing.default_currency.clone());
    let currencies = config.currency_table();
    let currency = if config.pricing.strict_currency {
        currencies.select_strict(&code).map_err(DomainError::from)?
    } else {
        currencies.select(&code)
    };

    let runtime = DeterministicQuoteRuntime::default();
    let evaluation = runtime
        .evaluate_quote(QuoteEvaluationInput {
            request: &request,
            prices: &prices,
            currency: &currency,
        })
        .map_err(DomainError::from)?;

    for warning in &evaluation.constraints.warnings {
        warn!(
            event_name = "quote.constraint.warning",
            quote_id = %request.id.0,
            code = %warning.code,
            "{}",
            warning.message
        );
    }

    let Some(breakdown) = evaluation.breakdown else {
        let reasons = evaluation
            .constraints
            .violations
            .iter()
            .map(|violation| violation.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(DomainError::InvalidRequest(reasons).into());
    };

    for diagnostic in &breakdown.diagnostics {
        warn!(
            event_name = "quote.pricing.diagnostic",
            quote_id = %request.id.0,
            code = diagnostic.code(),
            "{diagnostic}"
        );
    }
    info!(
        event_name = "quote.priced",
        quote_id = %request.id.0,
        currency = %breakdown.currency,
        items = breakdown.items.len(),
        total = %breakdown.total,
        "quote priced"
    );

    let document = QuoteDocument::new(
        &request,
        &breakdown,
        &build.warnings,
        &evaluation.constraints.warnings,
    );
    let rendered = match options.format {
        OutputFormat::Json => render::render_json(&document)
            .map_err(|error| ApplicationError::Output(error.to_string()))?,
        OutputFormat::Table => render::render_table(&document),
        OutputFormat::Csv => render::render_csv(&breakdown)
            .map_err(|error| ApplicationError::Output(error.to_string()))?,
    };

    let Some(out) = options.out else {
        return Ok(CommandResult::output(rendered));
    };

    let target = if out.is_dir() {
        out.join(format!(
            "{}_breakdown.{}",
            request.metadata.export_stem(),
            options.format.extension()
        ))
    } else {
        out
    };
    fs::write(&target, rendered).map_err(|error| {
        ApplicationError::Output(format!("could not write `{}`: {error}", target.display()))
    })?;
    info!(event_name = "quote.exported", path = %target.display(), "breakdown written");

    Ok(CommandResult::success(
        "quote",
        format!(
            "{} priced at {}; breakdown written to {}",
            request.id.0,
            render::format_money(&breakdown.currency, breakdown.total),
            target.display()
        ),
    ))
}

/// `.json` files are read as JSON, anything else as TOML.
fn read_request(path: &Path) -> Result<QuoteRequestDraft, ApplicationError> {
    let raw = fs::read_to_string(path).map_err(|error| {
        DomainError::MalformedRequest(format!("could not read `{}`: {error}", path.display()))
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let draft = if is_json {
        QuoteRequestDraft::from_json_str(&raw)?
    } else {
        QuoteRequestDraft::from_toml_str(&raw)?
    };

    Ok(draft)
}
