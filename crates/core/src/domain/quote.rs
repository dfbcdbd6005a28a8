use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::configuration::{BuildWarning, Configuration, ConfigurationDraft};
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteId(pub String);

impl QuoteId {
    pub fn generate() -> Self {
        Self(format!("Q-{}", Uuid::new_v4().simple()))
    }
}

/// Opaque request metadata. Pricing never reads these fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteMetadata {
    pub quote_name: Option<String>,
    pub client_name: Option<String>,
    pub client_company: Option<String>,
    pub salesperson: Option<String>,
    pub site_location: Option<String>,
    pub quote_date: Option<NaiveDate>,
    pub value_proposition: Option<String>,
    pub application_overview: Option<String>,
    pub materials: Vec<String>,
    pub technical: TechnicalDetails,
    pub timeline: Vec<TimelinePhase>,
}

/// Site and throughput figures quoted alongside the price. Free text where the form is.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalDetails {
    pub belt_speed: Option<String>,
    pub pick_rate: Option<String>,
    pub max_object_weight_kg: Option<Decimal>,
    pub input_power_kva: Option<Decimal>,
    pub avg_consumption_kw: Option<Decimal>,
    pub air_consumption_lpm: Option<u64>,
    pub shipping_distance: Option<String>,
}

impl TechnicalDetails {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Display label and value for every field that is set, in form order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let text = |value: &Option<String>| {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
        };
        [
            ("Belt Speed", text(&self.belt_speed)),
            ("Pick Rate", text(&self.pick_rate)),
            ("Maximum Object Weight (kg)", self.max_object_weight_kg.map(|v| v.to_string())),
            ("Input Power (kVA)", self.input_power_kva.map(|v| v.to_string())),
            ("Average Power Consumption (kW)", self.avg_consumption_kw.map(|v| v.to_string())),
            ("Total Air Consumption (L/min)", self.air_consumption_lpm.map(|v| v.to_string())),
            ("Shipping Distance", text(&self.shipping_distance)),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.map(|value| (label, value)))
        .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePhase {
    pub phase: String,
    pub duration: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuoteRequest {
    pub id: QuoteId,
    pub currency: Option<String>,
    pub metadata: QuoteMetadata,
    pub configuration: Configuration,
}

/// Request file shape accepted by the CLI, in TOML or JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteRequestDraft {
    pub id: Option<String>,
    pub currency: Option<String>,
    pub metadata: QuoteMetadata,
    pub configuration: ConfigurationDraft,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuoteRequestBuild {
    pub request: QuoteRequest,
    pub warnings: Vec<BuildWarning>,
}

impl QuoteRequestDraft {
    pub fn from_toml_str(raw: &str) -> Result<Self, DomainError> {
        toml::from_str(raw).map_err(|error| DomainError::MalformedRequest(error.to_string()))
    }

    pub fn from_json_str(raw: &str) -> Result<Self, DomainError> {
        serde_json::from_str(raw).map_err(|error| DomainError::MalformedRequest(error.to_string()))
    }

    pub fn build(self) -> QuoteRequestBuild {
        let build = self.configuration.build();
        let id = self
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .map(QuoteId)
            .unwrap_or_else(QuoteId::generate);
        let currency =
            self.currency.map(|code| code.trim().to_string()).filter(|code| !code.is_empty());

        QuoteRequestBuild {
            request: QuoteRequest {
                id,
                currency,
                metadata: self.metadata,
                configuration: build.configuration,
            },
            warnings: build.warnings,
        }
    }
}

impl QuoteMetadata {
    /// Base file name used when a breakdown is exported, e.g. `Acme_Quote_20261019`.
    pub fn export_stem(&self) -> String {
        let client = self
            .client_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                name.chars()
                    .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' { ch } else { '_' })
                    .collect::<String>()
            })
            .unwrap_or_else(|| "WR".to_string());

        match self.quote_date {
            Some(date) => format!("{client}_Quote_{}", date.format("%Y%m%d")),
            None => format!("{client}_Quote"),
        }
    }
}
