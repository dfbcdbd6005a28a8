//! Hand-maintained mapping from configuration choices to price-table keys and the
//! wording printed on breakdown lines.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cpq::price_table::PriceTable;
use crate::domain::configuration::{AddOn, ModificationScope, ShippingMethod, WarrantyOption};
use crate::domain::variant::{ArmModel, BaseModel, GripperModel, Variant, VisionModel};

pub const WARRANTY_STANDARD_KEY: &str = "warranty_standard";
pub const WARRANTY_LEGACY_KEY: &str = "warranty";
pub const WARRANTY_EXTENDED_KEY: &str = "warranty_extended";

/// Unit price used when a shipping method is unknown or its key is not priced.
pub fn default_shipping_unit_price() -> Decimal {
    Decimal::from(11_000)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddOnEntry {
    pub add_on: AddOn,
    pub price_key: &'static str,
    pub component: &'static str,
    pub description: &'static str,
}

pub fn add_on_entry(add_on: AddOn) -> AddOnEntry {
    let (price_key, component, description) = match add_on {
        AddOn::Conveyor => ("conveyor", "Conveyor", "Belt conveyor"),
        AddOn::AiTraining => ("ai_training", "AI Custom Training", "Trash / PCBs / UBCs"),
        AddOn::SoftwareLicense => ("software_license", "Software License", "Perpetual"),
        AddOn::Fat => ("fat", "Factory Pre-Assembly (FAT)", "Pre-assembly and testing"),
        AddOn::TryAndBuy => ("try_and_buy_arm", "Try & Buy Second Arm", "Deferred Payment"),
        AddOn::Installation => {
            ("installation", "Installation by WR", "Full on-site implementation")
        }
        AddOn::InfrastructureElectrical => (
            "infrastructure_electrical",
            "Infrastructure - Electrical",
            "Power hookup by WR",
        ),
        AddOn::InfrastructureAir => {
            ("infrastructure_air", "Infrastructure - Compressed Air", "Air hookup by WR")
        }
        AddOn::InfrastructureInternet => {
            ("infrastructure_internet", "Infrastructure - Internet", "Network setup by WR")
        }
        AddOn::SecurityPerimeter => {
            ("security_perimeter", "Security Perimeter", "Robot safety fencing")
        }
        AddOn::PeStamp => ("pe_stamp", "PE Stamp", "Professional engineer review"),
        AddOn::Sat => ("sat", "Site Acceptance Test (SAT)", "Final performance check"),
    };

    AddOnEntry { add_on, price_key, component, description }
}

pub fn modification_price_key(scope: ModificationScope) -> String {
    format!("modification_{}", scope.as_str())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WarrantyEntry {
    pub price_key: &'static str,
    pub legacy_key: Option<&'static str>,
    pub component: &'static str,
    pub description: &'static str,
}

pub fn warranty_entry(option: WarrantyOption) -> Option<WarrantyEntry> {
    match option {
        WarrantyOption::None => None,
        WarrantyOption::Standard => Some(WarrantyEntry {
            price_key: WARRANTY_STANDARD_KEY,
            legacy_key: Some(WARRANTY_LEGACY_KEY),
            component: "Warranty (1 year)",
            description: "Parts + labor coverage",
        }),
        WarrantyOption::Extended => Some(WarrantyEntry {
            price_key: WARRANTY_EXTENDED_KEY,
            legacy_key: None,
            component: "Extended Warranty (3 years)",
            description: "Parts + labor coverage",
        }),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShippingEntry {
    pub price_key: Option<&'static str>,
    pub unit: &'static str,
}

pub fn shipping_entry(method: &ShippingMethod) -> ShippingEntry {
    match method {
        ShippingMethod::Truck => ShippingEntry { price_key: Some("shipping_truck"), unit: "truck" },
        ShippingMethod::Boat => {
            ShippingEntry { price_key: Some("shipping_boat_container"), unit: "container" }
        }
        ShippingMethod::Other(_) => ShippingEntry { price_key: None, unit: "shipment" },
    }
}

/// What the resolver does when a catalog key is missing from the price table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MissingKeyEffect {
    ZeroPrice,
    Skipped,
    DefaultPrice(Decimal),
    LegacyKey(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFinding {
    pub price_key: String,
    pub item: String,
    pub effect: MissingKeyEffect,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTableAudit {
    pub checked: usize,
    pub findings: Vec<AuditFinding>,
    /// Priced keys no catalog entry refers to. May be verbatim keys for unmapped labels.
    pub unreferenced_keys: Vec<String>,
}

impl PriceTableAudit {
    /// A table is complete when no quote would silently drop, zero or default an item.
    pub fn is_complete(&self) -> bool {
        self.gaps().next().is_none()
    }

    pub fn gaps(&self) -> impl Iterator<Item = &AuditFinding> {
        self.findings
            .iter()
            .filter(|finding| !matches!(finding.effect, MissingKeyEffect::LegacyKey(_)))
    }
}

/// Checks every catalog key against a price table.
pub fn audit_price_table(prices: &PriceTable) -> PriceTableAudit {
    let mut referenced = BTreeSet::new();
    let mut findings = Vec::new();
    let mut checked = 0;

    let mut check = |key: &str, item: String, effect: MissingKeyEffect| {
        checked += 1;
        referenced.insert(key.to_string());
        if !prices.contains_key(key) {
            findings.push(AuditFinding { price_key: key.to_string(), item, effect });
        }
    };

    audit_variants::<ArmModel>(&mut check);
    audit_variants::<BaseModel>(&mut check);
    audit_variants::<GripperModel>(&mut check);
    audit_variants::<VisionModel>(&mut check);

    for add_on in AddOn::ALL {
        let entry = add_on_entry(add_on);
        check(entry.price_key, entry.component.to_string(), MissingKeyEffect::Skipped);
    }

    for scope in [ModificationScope::Small, ModificationScope::Medium, ModificationScope::Large] {
        check(
            &modification_price_key(scope),
            format!("Modification Scope: {}", scope.label()),
            MissingKeyEffect::Skipped,
        );
    }

    for method in [ShippingMethod::Truck, ShippingMethod::Boat] {
        if let Some(key) = shipping_entry(&method).price_key {
            check(
                key,
                format!("Shipping: {}", method.label()),
                MissingKeyEffect::DefaultPrice(default_shipping_unit_price()),
            );
        }
    }

    for option in [WarrantyOption::Standard, WarrantyOption::Extended] {
        let Some(entry) = warranty_entry(option) else {
            continue;
        };
        let effect = match entry.legacy_key {
            Some(legacy) if prices.contains_key(legacy) => {
                MissingKeyEffect::LegacyKey(legacy.to_string())
            }
            _ => MissingKeyEffect::ZeroPrice,
        };
        check(entry.price_key, entry.component.to_string(), effect);
    }
    referenced.insert(WARRANTY_LEGACY_KEY.to_string());

    let unreferenced_keys = prices
        .iter()
        .map(|(key, _)| key)
        .filter(|key| !referenced.contains(*key))
        .map(str::to_string)
        .collect();

    PriceTableAudit { checked, findings, unreferenced_keys }
}

fn audit_variants<V: Variant>(check: &mut impl FnMut(&str, String, MissingKeyEffect)) {
    for variant in V::known() {
        check(
            variant.price_key(),
            format!("{}: {}", V::CATEGORY.component(), variant.label()),
            MissingKeyEffect::ZeroPrice,
        );
    }
}
