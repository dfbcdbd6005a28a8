use cellquote_core::config::{AppConfig, LoadOptions};
use cellquote_core::cpq::catalog::audit_price_table;
use cellquote_core::cpq::price_table::PriceTable;
use serde::Serialize;

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

pub fn run(load: LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(load);
    let exit_code = if report.overall_status == CheckStatus::Fail { 1 } else { 0 };

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return CommandResult { exit_code, output };
    }

    CommandResult { exit_code, output: render_human(&report) }
}

fn build_report(load: LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(load) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_currency(&config));
            match load_price_table(&config) {
                Ok((check, table)) => {
                    checks.push(check);
                    checks.push(check_coverage(&table));
                }
                Err(check) => {
                    checks.push(check);
                    checks.push(skipped("price_coverage", "price table did not load"));
                }
            }
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("default_currency", "configuration did not load"));
            checks.push(skipped("price_table", "configuration did not load"));
            checks.push(skipped("price_coverage", "configuration did not load"));
        }
    }

    let any_fail = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let any_warn = checks.iter().any(|check| check.status == CheckStatus::Warn);
    let (overall_status, summary) = if any_fail {
        (CheckStatus::Fail, "doctor: one or more readiness checks failed")
    } else if any_warn {
        (CheckStatus::Warn, "doctor: ready, with warnings")
    } else {
        (CheckStatus::Pass, "doctor: all readiness checks passed")
    };

    DoctorReport { overall_status, summary: summary.to_string(), checks }
}

fn check_currency(config: &AppConfig) -> DoctorCheck {
    let selection = config.currency_table().select(&config.pricing.default_currency);
    if selection.supported {
        DoctorCheck {
            name: "default_currency",
            status: CheckStatus::Pass,
            details: format!("{} at multiplier {}", selection.code, selection.multiplier),
        }
    } else {
        DoctorCheck {
            name: "default_currency",
            status: CheckStatus::Warn,
            details: format!(
                "{} has no configured rate; quotes pass base-currency amounts through",
                selection.code
            ),
        }
    }
}

fn load_price_table(config: &AppConfig) -> Result<(DoctorCheck, PriceTable), DoctorCheck> {
    let path = &config.pricing.table_path;
    match PriceTable::from_csv_path(path) {
        Ok(table) => Ok((
            DoctorCheck {
                name: "price_table",
                status: CheckStatus::Pass,
                details: format!("loaded {} entries from `{}`", table.len(), path.display()),
            },
            table,
        )),
        Err(error) => Err(DoctorCheck {
            name: "price_table",
            status: CheckStatus::Fail,
            details: error.to_string(),
        }),
    }
}

fn check_coverage(table: &PriceTable) -> DoctorCheck {
    let audit = audit_price_table(table);
    let gaps = audit.gaps().map(|finding| finding.price_key.as_str()).collect::<Vec<_>>();
    if gaps.is_empty() {
        DoctorCheck {
            name: "price_coverage",
            status: CheckStatus::Pass,
            details: format!("all {} catalog keys priced", audit.checked),
        }
    } else {
        DoctorCheck {
            name: "price_coverage",
            status: CheckStatus::Warn,
            details: format!("unpriced catalog keys: {}", gaps.join(", ")),
        }
    }
}

fn skipped(name: &'static str, reason: &str) -> DoctorCheck {
    DoctorCheck { name, status: CheckStatus::Skipped, details: format!("skipped because {reason}") }
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
