use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unit prices in the base currency, keyed by item key.
///
/// Loaded once per session and read-only afterwards. Keys are case-sensitive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PriceTable {
    prices: BTreeMap<String, Decimal>,
}

#[derive(Debug, Error)]
pub enum PriceTableError {
    #[error("could not open price table `{path}`: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("malformed price table: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: item key is empty")]
    EmptyKey { line: u64 },
    #[error("line {line}: unit price `{value}` for `{key}` is not a decimal number")]
    InvalidPrice { line: u64, key: String, value: String },
    #[error("line {line}: unit price for `{key}` is negative")]
    NegativePrice { line: u64, key: String },
    #[error("line {line}: item key `{key}` appears more than once")]
    DuplicateKey { line: u64, key: String },
}

#[derive(Debug, Deserialize, Serialize)]
struct PriceRow {
    item_key: String,
    unit_price: String,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Decimal> {
        self.prices.get(key).copied()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.prices.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.prices.iter().map(|(key, price)| (key.as_str(), *price))
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, PriceTableError> {
        let file = File::open(path)
            .map_err(|source| PriceTableError::Open { path: path.to_path_buf(), source })?;
        Self::from_csv_reader(file)
    }

    /// Reads `item_key,unit_price` rows after a header line.
    pub fn from_csv_reader<R: io::Read>(reader: R) -> Result<Self, PriceTableError> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = reader.headers()?.clone();
        let mut prices = BTreeMap::new();

        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|position| position.line()).unwrap_or_default();
            let row: PriceRow = record.deserialize(Some(&headers))?;

            if row.item_key.is_empty() {
                return Err(PriceTableError::EmptyKey { line });
            }

            let price = Decimal::from_str(&row.unit_price).map_err(|_| {
                PriceTableError::InvalidPrice {
                    line,
                    key: row.item_key.clone(),
                    value: row.unit_price.clone(),
                }
            })?;
            if price < Decimal::ZERO {
                return Err(PriceTableError::NegativePrice { line, key: row.item_key });
            }

            if prices.contains_key(&row.item_key) {
                return Err(PriceTableError::DuplicateKey { line, key: row.item_key });
            }
            prices.insert(row.item_key, price);
        }

        Ok(Self { prices })
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), PriceTableError> {
        let mut writer = csv::Writer::from_writer(writer);
        for (key, price) in &self.prices {
            writer.serialize(PriceRow { item_key: key.clone(), unit_price: price.to_string() })?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Rate card shipped with the tool, used to seed a new price file.
    pub fn reference() -> Self {
        [
            ("robot_arm", 45_000),
            ("robot_arm_m20id25", 52_000),
            ("base_standard", 3_500),
            ("base_elevated", 5_500),
            ("VentuR", 6_000),
            ("PinchR", 6_000),
            ("BagR", 6_000),
            ("hypervision_scanner", 12_000),
            ("vision_rgb_camera", 1_500),
            ("vision_3d_camera", 4_500),
            ("conveyor", 8_000),
            ("ai_training", 15_000),
            ("software_license", 5_000),
            ("fat", 4_000),
            ("try_and_buy_arm", 90_000),
            ("installation", 30_000),
            ("infrastructure_electrical", 4_000),
            ("infrastructure_air", 3_500),
            ("infrastructure_internet", 1_500),
            ("security_perimeter", 2_500),
            ("pe_stamp", 2_000),
            ("sat", 6_000),
            ("modification_small", 5_000),
            ("modification_medium", 15_000),
            ("modification_large", 30_000),
            ("warranty", 8_000),
            ("warranty_extended", 20_000),
            ("shipping_truck", 4_500),
            ("shipping_boat_container", 11_000),
        ]
        .into_iter()
        .map(|(key, price)| (key.to_string(), Decimal::from(price)))
        .collect()
    }
}

impl FromIterator<(String, Decimal)> for PriceTable {
    fn from_iter<I: IntoIterator<Item = (String, Decimal)>>(iter: I) -> Self {
        Self { prices: iter.into_iter().collect() }
    }
}
