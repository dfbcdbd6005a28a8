use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cpq::pricing::PricingError;

pub const BASE_CURRENCY: &str = "USD";

/// Multipliers relative to the base currency. Codes are stored upper-case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrencyTable {
    base: String,
    rates: BTreeMap<String, Decimal>,
}

impl Default for CurrencyTable {
    fn default() -> Self {
        Self::new(
            BASE_CURRENCY,
            [
                ("CAD".to_string(), Decimal::new(136, 2)),
                ("EUR".to_string(), Decimal::new(92, 2)),
            ],
        )
    }
}

/// The currency a breakdown is expressed in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencySelection {
    pub code: String,
    pub multiplier: Decimal,
    /// False when the code was not in the table and passed through at 1.0.
    pub supported: bool,
}

impl CurrencyTable {
    /// The base currency is always present with a multiplier of 1.
    pub fn new(
        base: impl Into<String>,
        rates: impl IntoIterator<Item = (String, Decimal)>,
    ) -> Self {
        let base = normalize_code(&base.into());
        let mut rates = rates
            .into_iter()
            .map(|(code, rate)| (normalize_code(&code), rate))
            .collect::<BTreeMap<_, _>>();
        rates.insert(base.clone(), Decimal::ONE);
        Self { base, rates }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Amounts left in the table's base currency.
    pub fn base_selection(&self) -> CurrencySelection {
        CurrencySelection { code: self.base.clone(), multiplier: Decimal::ONE, supported: true }
    }

    pub fn rate(&self, code: &str) -> Option<Decimal> {
        self.rates.get(&normalize_code(code)).copied()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }

    /// Unlisted codes pass through with multiplier 1.0.
    pub fn select(&self, code: &str) -> CurrencySelection {
        let code = normalize_code(code);
        match self.rates.get(&code) {
            Some(rate) => CurrencySelection { code, multiplier: *rate, supported: true },
            None => CurrencySelection { code, multiplier: Decimal::ONE, supported: false },
        }
    }

    pub fn select_strict(&self, code: &str) -> Result<CurrencySelection, PricingError> {
        let selection = self.select(code);
        if selection.supported {
            return Ok(selection);
        }

        Err(PricingError::UnsupportedCurrency {
            code: selection.code,
            supported: self.codes().collect::<Vec<_>>().join("|"),
        })
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::CurrencyTable;
    use crate::cpq::pricing::PricingError;

    #[test]
    fn default_table_carries_base_and_two_foreign_rates() {
        let table = CurrencyTable::default();
        assert_eq!(table.base(), "USD");
        assert_eq!(table.codes().collect::<Vec<_>>(), vec!["CAD", "EUR", "USD"]);
        assert_eq!(table.rate("cad"), Some(Decimal::new(136, 2)));
    }

    #[test]
    fn unsupported_code_passes_through_at_one() {
        let selection = CurrencyTable::default().select(" gbp ");
        assert_eq!(selection.code, "GBP");
        assert_eq!(selection.multiplier, Decimal::ONE);
        assert!(!selection.supported);
    }

    #[test]
    fn strict_selection_rejects_unsupported_code() {
        let error = CurrencyTable::default().select_strict("GBP").expect_err("GBP is not listed");
        assert_eq!(
            error,
            PricingError::UnsupportedCurrency {
                code: "GBP".to_string(),
                supported: "CAD|EUR|USD".to_string(),
            }
        );
    }

    #[test]
    fn base_selection_follows_the_configured_base() {
        let table = CurrencyTable::new("cad", [("USD".to_string(), Decimal::new(74, 2))]);
        let selection = table.base_selection();
        assert_eq!(selection.code, "CAD");
        assert_eq!(selection.multiplier, Decimal::ONE);
        assert!(selection.supported);
        assert_eq!(CurrencyTable::default().base_selection().code, "USD");
    }

    #[test]
    fn base_rate_cannot_be_overridden() {
        let table = CurrencyTable::new("usd", [("USD".to_string(), Decimal::new(2, 0))]);
        assert_eq!(table.rate("USD"), Some(Decimal::ONE));
    }
}
