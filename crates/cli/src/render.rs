//! Presentation of a priced breakdown. Rounding to whole currency units happens only here.

use cellquote_core::cpq::constraints::ConstraintViolation;
use cellquote_core::cpq::pricing::{Breakdown, LineItem, PricingDiagnostic};
use cellquote_core::domain::configuration::BuildWarning;
use cellquote_core::domain::quote::{QuoteRequest, TechnicalDetails, TimelinePhase};
use clap::ValueEnum;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

pub const CSV_HEADERS: [&str; 5] = ["Component", "Description", "Unit Price", "Qty", "Subtotal"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Table => "txt",
            Self::Csv => "csv",
        }
    }
}

/// `USD 15,000`
pub fn format_money(currency: &str, amount: Decimal) -> String {
    format!("{currency} {}", format_whole(amount))
}

/// Rounds half to even and groups thousands with commas.
pub fn format_whole(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[derive(Debug, Serialize)]
pub struct QuoteDocument<'a> {
    pub quote_id: &'a str,
    pub client_name: Option<&'a str>,
    pub currency: &'a str,
    pub multiplier: Decimal,
    pub items: &'a [LineItem],
    pub total: Decimal,
    pub total_display: String,
    pub diagnostics: &'a [PricingDiagnostic],
    pub build_warnings: &'a [BuildWarning],
    pub constraint_warnings: &'a [ConstraintViolation],
    #[serde(skip_serializing_if = "no_technical_details")]
    pub technical: &'a TechnicalDetails,
    #[serde(skip_serializing_if = "no_timeline")]
    pub timeline: &'a [TimelinePhase],
}

fn no_technical_details(details: &&TechnicalDetails) -> bool {
    details.is_empty()
}

fn no_timeline(phases: &&[TimelinePhase]) -> bool {
    phases.is_empty()
}

impl<'a> QuoteDocument<'a> {
    pub fn new(
        request: &'a QuoteRequest,
        breakdown: &'a Breakdown,
        build_warnings: &'a [BuildWarning],
        constraint_warnings: &'a [ConstraintViolation],
    ) -> Self {
        Self {
            quote_id: &request.id.0,
            client_name: request.metadata.client_name.as_deref(),
            currency: &breakdown.currency,
            multiplier: breakdown.multiplier,
            items: &breakdown.items,
            total: breakdown.total,
            total_display: format_money(&breakdown.currency, breakdown.total),
            diagnostics: &breakdown.diagnostics,
            build_warnings,
            constraint_warnings,
            technical: &request.metadata.technical,
            timeline: &request.metadata.timeline,
        }
    }
}

pub fn render_json(document: &QuoteDocument<'_>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(document)
}

pub fn render_table(document: &QuoteDocument<'_>) -> String {
    let rows = document
        .items
        .iter()
        .map(|item| {
            [
                item.component.clone(),
                item.description.clone(),
                format_whole(item.unit_price),
                item.quantity.to_string(),
                format_whole(item.subtotal),
            ]
        })
        .collect::<Vec<_>>();

    let mut widths = CSV_HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render_row = |cells: [&str; 5]| {
        let [component, description, unit_price, qty, subtotal] = cells;
        format!(
            "{component:<w0$}  {description:<w1$}  {unit_price:>w2$}  {qty:>w3$}  {subtotal:>w4$}",
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
            w3 = widths[3],
            w4 = widths[4],
        )
        .trim_end()
        .to_string()
    };

    let mut lines = vec![format!("Quote {} ({})", document.quote_id, document.currency)];
    lines.push(render_row(CSV_HEADERS));
    lines.push(widths.iter().map(|width| "-".repeat(*width)).collect::<Vec<_>>().join("  "));
    for row in &rows {
        lines.push(render_row([
            row[0].as_str(),
            row[1].as_str(),
            row[2].as_str(),
            row[3].as_str(),
            row[4].as_str(),
        ]));
    }
    lines.push(String::new());
    lines.push(format!("Total Estimated Price: {}", document.total_display));

    let technical = document.technical.entries();
    if !technical.is_empty() {
        lines.push(String::new());
        lines.push("Technical Details:".to_string());
        lines.extend(technical.into_iter().map(|(label, value)| format!("- {label}: {value}")));
    }

    if !document.timeline.is_empty() {
        lines.push(String::new());
        lines.push("Project Timeline:".to_string());
        lines.extend(
            document
                .timeline
                .iter()
                .map(|phase| format!("- {}: {}", phase.phase, phase.duration)),
        );
    }

    let notes = document
        .build_warnings
        .iter()
        .map(ToString::to_string)
        .chain(document.constraint_warnings.iter().map(|warning| warning.message.clone()))
        .chain(document.diagnostics.iter().map(ToString::to_string))
        .collect::<Vec<_>>();
    if !notes.is_empty() {
        lines.push(String::new());
        lines.push("Notes:".to_string());
        lines.extend(notes.into_iter().map(|note| format!("- {note}")));
    }

    lines.join("\n")
}

/// Line items with unrounded amounts, one row per item.
pub fn render_csv(breakdown: &Breakdown) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;
    for item in &breakdown.items {
        let unit_price = item.unit_price.normalize().to_string();
        let quantity = item.quantity.to_string();
        let subtotal = item.subtotal.normalize().to_string();
        writer.write_record([
            item.component.as_str(),
            item.description.as_str(),
            unit_price.as_str(),
            quantity.as_str(),
            subtotal.as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|error| csv::Error::from(error.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
