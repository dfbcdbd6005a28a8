use thiserror::Error;

use crate::cpq::pricing::PricingError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error("malformed quote request: {0}")]
    MalformedRequest(String),
    #[error("quote request failed validation: {0}")]
    InvalidRequest(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("price table unavailable: {0}")]
    PriceTable(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error("output failure: {0}")]
    Output(String),
}

impl ApplicationError {
    /// Stable machine-readable class reported in command payloads.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::Pricing(_)) => "pricing",
            Self::Domain(DomainError::MalformedRequest(_)) => "request_parse",
            Self::Domain(DomainError::InvalidRequest(_)) => "request_validation",
            Self::PriceTable(_) => "price_table",
            Self::Configuration(_) => "config_validation",
            Self::Output(_) => "output",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::PriceTable(_) => 3,
            Self::Domain(DomainError::MalformedRequest(_))
            | Self::Domain(DomainError::InvalidRequest(_)) => 4,
            Self::Domain(DomainError::Pricing(_)) => 5,
            Self::Output(_) => 6,
        }
    }
}
