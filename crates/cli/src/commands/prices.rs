use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use cellquote_core::config::LoadOptions;
use cellquote_core::cpq::catalog::{audit_price_table, MissingKeyEffect, PriceTableAudit};
use cellquote_core::cpq::price_table::PriceTable;
use cellquote_core::errors::ApplicationError;
use serde::Serialize;
use tracing::{info, warn};

use crate::commands::{load_config, CommandResult};

/// Exit code when the table loads but leaves catalog items unpriced.
pub const INCOMPLETE_EXIT_CODE: u8 = 1;

#[derive(Debug, Serialize)]
struct CoverageReport<'a> {
    command: &'static str,
    status: &'static str,
    path: String,
    entries: usize,
    #[serde(flatten)]
    audit: &'a PriceTableAudit,
}

pub fn check(load: LoadOptions, prices: Option<PathBuf>, json_output: bool) -> CommandResult {
    let table_path = match resolve_table_path(load, prices) {
        Ok(path) => path,
        Err(error) => return CommandResult::from_error("prices.check", &error),
    };

    let table = match PriceTable::from_csv_path(&table_path) {
        Ok(table) => table,
        Err(error) => {
            let error = ApplicationError::PriceTable(error.to_string());
            return CommandResult::from_error("prices.check", &error);
        }
    };

    let audit = audit_price_table(&table);
    for finding in audit.gaps() {
        warn!(
            event_name = "prices.check.gap",
            price_key = %finding.price_key,
            item = %finding.item,
            "catalog item is not priced"
        );
    }
    info!(
        event_name = "prices.check.completed",
        path = %table_path.display(),
        checked = audit.checked,
        gaps = audit.gaps().count(),
        "price table audited"
    );

    let exit_code = if audit.is_complete() { 0 } else { INCOMPLETE_EXIT_CODE };
    let output = if json_output {
        let report = CoverageReport {
            command: "prices.check",
            status: if audit.is_complete() { "complete" } else { "incomplete" },
            path: table_path.display().to_string(),
            entries: table.len(),
            audit: &audit,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(output) => output,
            Err(error) => {
                let error = ApplicationError::Output(error.to_string());
                return CommandResult::from_error("prices.check", &error);
            }
        }
    } else {
        render_human(&table_path, table.len(), &audit)
    };

    CommandResult { exit_code, output }
}

pub fn init(out: &Path, force: bool) -> CommandResult {
    if out.exists() && !force {
        let error = ApplicationError::Output(format!(
            "`{}` already exists; pass --force to overwrite",
            out.display()
        ));
        return CommandResult::from_error("prices.init", &error);
    }

    let reference = PriceTable::reference();
    if let Err(error) = write_reference(out, &reference) {
        let error = ApplicationError::Output(format!("{error:#}"));
        return CommandResult::from_error("prices.init", &error);
    }

    info!(event_name = "prices.init.written", path = %out.display(), "reference rate card written");
    CommandResult::success(
        "prices.init",
        format!("wrote {} reference prices to {}", reference.len(), out.display()),
    )
}

fn write_reference(out: &Path, reference: &PriceTable) -> anyhow::Result<()> {
    let file =
        File::create(out).with_context(|| format!("could not create `{}`", out.display()))?;
    reference.write_csv(file).with_context(|| format!("could not write `{}`", out.display()))?;
    Ok(())
}

fn resolve_table_path(
    load: LoadOptions,
    prices: Option<PathBuf>,
) -> Result<PathBuf, ApplicationError> {
    if let Some(path) = prices {
        return Ok(path);
    }
    Ok(load_config(load)?.pricing.table_path)
}

fn render_human(path: &Path, entries: usize, audit: &PriceTableAudit) -> String {
    let mut lines = Vec::new();
    let gaps = audit.gaps().count();
    if gaps == 0 {
        lines.push(format!(
            "prices: `{}` covers all {} catalog keys ({entries} entries)",
            path.display(),
            audit.checked
        ));
    } else {
        lines.push(format!(
            "prices: `{}` is missing {gaps} of {} catalog keys ({entries} entries)",
            path.display(),
            audit.checked
        ));
    }

    for finding in &audit.findings {
        let effect = match &finding.effect {
            MissingKeyEffect::ZeroPrice => "priced at zero".to_string(),
            MissingKeyEffect::Skipped => "left off the quote".to_string(),
            MissingKeyEffect::DefaultPrice(price) => format!("default unit price {price} used"),
            MissingKeyEffect::LegacyKey(key) => format!("legacy key `{key}` used"),
        };
        let marker = if matches!(finding.effect, MissingKeyEffect::LegacyKey(_)) {
            "note"
        } else {
            "gap"
        };
        lines.push(format!("- [{marker}] {} `{}`: {effect}", finding.item, finding.price_key));
    }

    for key in &audit.unreferenced_keys {
        lines.push(format!("- [unused] `{key}` is not referenced by the catalog"));
    }

    lines.join("\n")
}
