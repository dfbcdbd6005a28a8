use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cpq::catalog::{
    add_on_entry, default_shipping_unit_price, modification_price_key, shipping_entry,
    warranty_entry,
};
use crate::cpq::currency::CurrencySelection;
use crate::cpq::price_table::PriceTable;
use crate::domain::configuration::{AddOn, Configuration, VariantSelection};
use crate::domain::variant::Variant;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub component: String,
    pub description: String,
    pub unit_price: Decimal,
    pub quantity: u64,
    pub subtotal: Decimal,
}

impl LineItem {
    fn new(
        component: impl Into<String>,
        description: impl Into<String>,
        unit_price: Decimal,
        quantity: u64,
    ) -> Result<Self, PricingError> {
        let component = component.into();
        let subtotal = unit_price
            .checked_mul(Decimal::from(quantity))
            .ok_or_else(|| PricingError::AmountOverflow { component: component.clone() })?;

        Ok(Self { component, description: description.into(), unit_price, quantity, subtotal })
    }
}

/// Irregularities absorbed while pricing. They never fail a quote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum PricingDiagnostic {
    /// A variant had no price and was added at zero cost.
    MissingPrice { component: String, variant: String, price_key: String },
    /// A selected add-on had no price and was left off the breakdown.
    SkippedAddOn { component: String, price_key: String },
    LegacyPriceKey { component: String, price_key: String, legacy_key: String },
    DefaultShippingPrice { method: String, unit_price: Decimal },
    UnsupportedCurrency { currency: String },
}

impl PricingDiagnostic {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingPrice { .. } => "missing_price",
            Self::SkippedAddOn { .. } => "skipped_add_on",
            Self::LegacyPriceKey { .. } => "legacy_price_key",
            Self::DefaultShippingPrice { .. } => "default_shipping_price",
            Self::UnsupportedCurrency { .. } => "unsupported_currency",
        }
    }
}

impl std::fmt::Display for PricingDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingPrice { component, variant, price_key } => write!(
                f,
                "{component} `{variant}` has no price under `{price_key}`; priced at zero"
            ),
            Self::SkippedAddOn { component, price_key } => {
                write!(f, "{component} is selected but `{price_key}` is not priced; line omitted")
            }
            Self::LegacyPriceKey { component, price_key, legacy_key } => write!(
                f,
                "{component} priced from legacy key `{legacy_key}` (`{price_key}` absent)"
            ),
            Self::DefaultShippingPrice { method, unit_price } => {
                write!(f, "shipping by {method} uses the default unit price {unit_price}")
            }
            Self::UnsupportedCurrency { currency } => write!(
                f,
                "currency `{currency}` is not supported; base currency values passed through"
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub currency: String,
    pub multiplier: Decimal,
    pub items: Vec<LineItem>,
    pub total: Decimal,
    pub diagnostics: Vec<PricingDiagnostic>,
}

impl Breakdown {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items_for<'a>(&'a self, component: &'a str) -> impl Iterator<Item = &'a LineItem> {
        self.items.iter().filter(move |item| item.component == component)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("negative quantity {quantity} for {category} `{variant}`")]
    NegativeQuantity { category: String, variant: String, quantity: i64 },
    #[error("unsupported currency `{code}` (expected one of {supported})")]
    UnsupportedCurrency { code: String, supported: String },
    #[error("amount for {component} exceeds the representable range")]
    AmountOverflow { component: String },
}

pub trait PricingResolver: Send + Sync {
    fn resolve(
        &self,
        configuration: &Configuration,
        prices: &PriceTable,
        currency: &CurrencySelection,
    ) -> Result<Breakdown, PricingError>;
}

#[derive(Default)]
pub struct DeterministicPricingResolver;

impl PricingResolver for DeterministicPricingResolver {
    fn resolve(
        &self,
        configuration: &Configuration,
        prices: &PriceTable,
        currency: &CurrencySelection,
    ) -> Result<Breakdown, PricingError> {
        resolve(configuration, prices, currency)
    }
}

/// Prices a configuration into an ordered breakdown.
///
/// Lines are built in base currency: add-ons, modification scope, arms, bases, grippers,
/// vision systems, shipping, warranty. The currency multiplier is applied once over the
/// finished lines and the total is the sum of the scaled subtotals, unrounded.
pub fn resolve(
    configuration: &Configuration,
    prices: &PriceTable,
    currency: &CurrencySelection,
) -> Result<Breakdown, PricingError> {
    reject_negative_quantities(configuration)?;

    let mut lines = Lines::default();
    price_add_ons(configuration, prices, &mut lines)?;
    price_variants(&configuration.robot_arms, prices, &mut lines)?;
    price_variants(&configuration.bases, prices, &mut lines)?;
    price_variants(&configuration.grippers, prices, &mut lines)?;
    price_variants(&configuration.vision_systems, prices, &mut lines)?;
    price_shipping(configuration, prices, &mut lines)?;
    price_warranty(configuration, prices, &mut lines)?;

    if !currency.supported {
        lines
            .diagnostics
            .push(PricingDiagnostic::UnsupportedCurrency { currency: currency.code.clone() });
    }

    lines.finish(currency)
}

#[derive(Default)]
struct Lines {
    items: Vec<LineItem>,
    diagnostics: Vec<PricingDiagnostic>,
}

impl Lines {
    /// Scales every line by the currency multiplier and sums the scaled subtotals.
    fn finish(self, currency: &CurrencySelection) -> Result<Breakdown, PricingError> {
        let multiplier = currency.multiplier;
        let mut items = Vec::with_capacity(self.items.len());
        let mut total = Decimal::ZERO;

        for item in self.items {
            let overflow = || PricingError::AmountOverflow { component: item.component.clone() };
            let unit_price = item.unit_price.checked_mul(multiplier).ok_or_else(overflow)?;
            let subtotal = item.subtotal.checked_mul(multiplier).ok_or_else(overflow)?;
            total = total.checked_add(subtotal).ok_or_else(overflow)?;
            items.push(LineItem { unit_price, subtotal, ..item });
        }

        Ok(Breakdown {
            currency: currency.code.clone(),
            multiplier,
            items,
            total,
            diagnostics: self.diagnostics,
        })
    }
}

fn reject_negative_quantities(configuration: &Configuration) -> Result<(), PricingError> {
    check_selection(&configuration.robot_arms)?;
    check_selection(&configuration.bases)?;
    check_selection(&configuration.grippers)?;
    check_selection(&configuration.vision_systems)?;

    if let Some(shipping) = &configuration.shipping {
        if shipping.quantity < 0 {
            return Err(PricingError::NegativeQuantity {
                category: "shipping".to_string(),
                variant: shipping.method.label().to_string(),
                quantity: shipping.quantity,
            });
        }
    }

    Ok(())
}

fn check_selection<V: Variant>(selection: &VariantSelection<V>) -> Result<(), PricingError> {
    match selection.entries().iter().find(|entry| entry.quantity < 0) {
        Some(entry) => Err(PricingError::NegativeQuantity {
            category: V::CATEGORY.as_str().to_string(),
            variant: entry.variant.label().to_string(),
            quantity: entry.quantity,
        }),
        None => Ok(()),
    }
}

fn price_add_ons(
    configuration: &Configuration,
    prices: &PriceTable,
    lines: &mut Lines,
) -> Result<(), PricingError> {
    for add_on in &configuration.add_ons {
        let entry = add_on_entry(*add_on);
        let Some(unit_price) = prices.get(entry.price_key) else {
            lines.diagnostics.push(PricingDiagnostic::SkippedAddOn {
                component: entry.component.to_string(),
                price_key: entry.price_key.to_string(),
            });
            continue;
        };

        let description = match (add_on, configuration.conveyor_size_in.as_deref()) {
            (AddOn::Conveyor, Some(size)) => format!("{size} inch belt"),
            _ => entry.description.to_string(),
        };
        lines.items.push(LineItem::new(entry.component, description, unit_price, 1)?);
    }

    if let Some(scope) = configuration.modification_scope {
        let price_key = modification_price_key(scope);
        match prices.get(&price_key) {
            Some(unit_price) => lines.items.push(LineItem::new(
                "Modification Scope",
                scope.label(),
                unit_price,
                1,
            )?),
            None => lines.diagnostics.push(PricingDiagnostic::SkippedAddOn {
                component: "Modification Scope".to_string(),
                price_key,
            }),
        }
    }

    Ok(())
}

fn price_variants<V: Variant>(
    selection: &VariantSelection<V>,
    prices: &PriceTable,
    lines: &mut Lines,
) -> Result<(), PricingError> {
    let component = V::CATEGORY.component();
    for entry in selection.entries().iter().filter(|entry| entry.quantity > 0) {
        let price_key = entry.variant.price_key();
        let unit_price = prices.get(price_key).unwrap_or_else(|| {
            lines.diagnostics.push(PricingDiagnostic::MissingPrice {
                component: component.to_string(),
                variant: entry.variant.label().to_string(),
                price_key: price_key.to_string(),
            });
            Decimal::ZERO
        });

        lines.items.push(LineItem::new(
            component,
            entry.variant.label(),
            unit_price,
            entry.quantity.unsigned_abs(),
        )?);
    }

    Ok(())
}

fn price_shipping(
    configuration: &Configuration,
    prices: &PriceTable,
    lines: &mut Lines,
) -> Result<(), PricingError> {
    let Some(shipping) = configuration.shipping.as_ref().filter(|shipping| shipping.quantity > 0)
    else {
        return Ok(());
    };

    let entry = shipping_entry(&shipping.method);
    let unit_price = match entry.price_key.and_then(|key| prices.get(key)) {
        Some(price) => price,
        None => {
            let fallback = default_shipping_unit_price();
            lines.diagnostics.push(PricingDiagnostic::DefaultShippingPrice {
                method: shipping.method.label().to_string(),
                unit_price: fallback,
            });
            fallback
        }
    };

    let quantity = shipping.quantity.unsigned_abs();
    let plural = if quantity == 1 { "" } else { "s" };
    lines.items.push(LineItem::new(
        "Shipping",
        format!("{} freight, {quantity} {}{plural}", shipping.method.label(), entry.unit),
        unit_price,
        quantity,
    )?);

    Ok(())
}

fn price_warranty(
    configuration: &Configuration,
    prices: &PriceTable,
    lines: &mut Lines,
) -> Result<(), PricingError> {
    let Some(entry) = warranty_entry(configuration.warranty) else {
        return Ok(());
    };

    let unit_price = match prices.get(entry.price_key) {
        Some(price) => price,
        None => match entry.legacy_key.and_then(|key| prices.get(key).map(|price| (key, price))) {
            Some((legacy_key, price)) => {
                lines.diagnostics.push(PricingDiagnostic::LegacyPriceKey {
                    component: entry.component.to_string(),
                    price_key: entry.price_key.to_string(),
                    legacy_key: legacy_key.to_string(),
                });
                price
            }
            None => {
                lines.diagnostics.push(PricingDiagnostic::MissingPrice {
                    component: entry.component.to_string(),
                    variant: entry.description.to_string(),
                    price_key: entry.price_key.to_string(),
                });
                Decimal::ZERO
            }
        },
    };

    lines.items.push(LineItem::new(entry.component, entry.description, unit_price, 1)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{resolve, Breakdown, LineItem, PricingDiagnostic, PricingError};
    use crate::cpq::currency::{CurrencySelection, CurrencyTable};
    use crate::cpq::price_table::PriceTable;
    use crate::domain::configuration::{
        AddOn, Configuration, ModificationScope, Shipping, ShippingMethod, VariantSelection,
        WarrantyOption,
    };
    use crate::domain::variant::{ArmModel, BaseModel, GripperModel, Variant, VisionModel};

    fn table(entries: &[(&str, i64)]) -> PriceTable {
        entries.iter().map(|(key, price)| (key.to_string(), Decimal::from(*price))).collect()
    }

    fn base() -> CurrencySelection {
        CurrencyTable::default().base_selection()
    }

    fn full_configuration() -> Configuration {
        Configuration {
            robot_arms: VariantSelection::new().with(ArmModel::FanucLrMate200Id, 2),
            bases: VariantSelection::new().with(BaseModel::Standard, 2),
            grippers: VariantSelection::new()
                .with(GripperModel::VentuR, 1)
                .with(GripperModel::PinchR, 1),
            vision_systems: VariantSelection::new().with(VisionModel::Hypervision, 1),
            modification_scope: Some(ModificationScope::Medium),
            shipping: Some(Shipping { method: ShippingMethod::Truck, quantity: 1 }),
            warranty: WarrantyOption::Standard,
            conveyor_size_in: Some("36".to_string()),
            ..Configuration::default()
        }
        .with_add_on(AddOn::Conveyor)
        .with_add_on(AddOn::AiTraining)
        .with_add_on(AddOn::Sat)
    }

    #[test]
    fn flat_add_on_produces_single_line() {
        let prices = table(&[("ai_training", 15_000)]);
        let configuration = Configuration::default().with_add_on(AddOn::AiTraining);

        let breakdown = resolve(&configuration, &prices, &base()).expect("pricing succeeds");

        assert_eq!(
            breakdown.items,
            vec![LineItem {
                component: "AI Custom Training".to_string(),
                description: "Trash / PCBs / UBCs".to_string(),
                unit_price: Decimal::from(15_000),
                quantity: 1,
                subtotal: Decimal::from(15_000),
            }]
        );
        assert_eq!(breakdown.total, Decimal::from(15_000));
        assert!(breakdown.diagnostics.is_empty());
    }

    #[test]
    fn multi_variant_gripper_prices_each_variant() {
        let prices = table(&[("VentuR", 500), ("BagR", 300)]);
        let configuration = Configuration {
            grippers: VariantSelection::new()
                .with(GripperModel::from_label("VentuR"), 2)
                .with(GripperModel::BagR, 1),
            ..Configuration::default()
        };

        let breakdown = resolve(&configuration, &prices, &base()).expect("pricing succeeds");
        let subtotals =
            breakdown.items_for("Gripper").map(|item| item.subtotal).collect::<Vec<_>>();

        assert_eq!(subtotals, vec![Decimal::from(1_000), Decimal::from(300)]);
        assert_eq!(breakdown.total, Decimal::from(1_300));
    }

    #[test]
    fn boat_shipping_falls_back_to_default_unit_price() {
        let configuration = Configuration {
            shipping: Some(Shipping { method: ShippingMethod::Boat, quantity: 3 }),
            ..Configuration::default()
        };

        let breakdown =
            resolve(&configuration, &PriceTable::new(), &base()).expect("pricing succeeds");

        let shipping = &breakdown.items[0];
        assert_eq!(shipping.component, "Shipping");
        assert_eq!(shipping.description, "Boat freight, 3 containers");
        assert_eq!(shipping.unit_price, Decimal::from(11_000));
        assert_eq!(shipping.quantity, 3);
        assert_eq!(shipping.subtotal, Decimal::from(33_000));
        assert_eq!(
            breakdown.diagnostics,
            vec![PricingDiagnostic::DefaultShippingPrice {
                method: "Boat".to_string(),
                unit_price: Decimal::from(11_000),
            }]
        );
    }

    #[test]
    fn unknown_shipping_method_uses_default_even_when_methods_are_priced() {
        let prices = table(&[("shipping_truck", 4_500), ("shipping_boat_container", 9_000)]);
        let configuration = Configuration {
            shipping: Some(Shipping {
                method: ShippingMethod::Other("Rail".to_string()),
                quantity: 1,
            }),
            ..Configuration::default()
        };

        let breakdown = resolve(&configuration, &prices, &base()).expect("pricing succeeds");
        assert_eq!(breakdown.total, Decimal::from(11_000));
        assert_eq!(breakdown.items[0].description, "Rail freight, 1 shipment");
    }

    #[test]
    fn unsupported_currency_passes_base_values_through() {
        let prices = PriceTable::reference();
        let configuration = full_configuration();
        let gbp = CurrencyTable::default().select("GBP");

        let in_base = resolve(&configuration, &prices, &base()).expect("base pricing");
        let in_gbp = resolve(&configuration, &prices, &gbp).expect("gbp pricing");

        assert_eq!(in_gbp.currency, "GBP");
        assert_eq!(in_gbp.multiplier, Decimal::ONE);
        assert_eq!(in_gbp.items, in_base.items);
        assert_eq!(in_gbp.total, in_base.total);
        assert_eq!(
            in_gbp.diagnostics.last(),
            Some(&PricingDiagnostic::UnsupportedCurrency { currency: "GBP".to_string() })
        );
    }

    #[test]
    fn currency_scaling_is_linear_over_lines_and_total() {
        let prices = PriceTable::reference();
        let configuration = full_configuration();
        let cad = CurrencyTable::default().select("CAD");

        let in_base = resolve(&configuration, &prices, &base()).expect("base pricing");
        let in_cad = resolve(&configuration, &prices, &cad).expect("cad pricing");

        assert_eq!(in_cad.multiplier, Decimal::new(136, 2));
        assert_eq!(in_cad.items.len(), in_base.items.len());
        for (scaled, original) in in_cad.items.iter().zip(&in_base.items) {
            assert_eq!(scaled.unit_price, original.unit_price * in_cad.multiplier);
            assert_eq!(scaled.subtotal, original.subtotal * in_cad.multiplier);
            assert_eq!(scaled.quantity, original.quantity);
        }
        assert_eq!(in_cad.total, in_base.total * in_cad.multiplier);
    }

    #[test]
    fn missing_variant_price_fails_open_at_zero() {
        let prices = table(&[("VentuR", 500)]);
        let configuration = Configuration {
            grippers: VariantSelection::new()
                .with(GripperModel::VentuR, 1)
                .with(GripperModel::Other("SoftGrip".to_string()), 2),
            ..Configuration::default()
        };

        let breakdown = resolve(&configuration, &prices, &base()).expect("pricing succeeds");

        let soft_grip = &breakdown.items[1];
        assert_eq!(soft_grip.description, "SoftGrip");
        assert_eq!(soft_grip.unit_price, Decimal::ZERO);
        assert_eq!(soft_grip.subtotal, Decimal::ZERO);
        assert_eq!(soft_grip.quantity, 2);
        assert_eq!(breakdown.total, Decimal::from(500));
        assert_eq!(
            breakdown.diagnostics,
            vec![PricingDiagnostic::MissingPrice {
                component: "Gripper".to_string(),
                variant: "SoftGrip".to_string(),
                price_key: "SoftGrip".to_string(),
            }]
        );
    }

    #[test]
    fn unpriced_add_on_is_left_off_with_diagnostic() {
        let configuration = Configuration {
            modification_scope: Some(ModificationScope::Large),
            ..Configuration::default()
        }
        .with_add_on(AddOn::PeStamp);

        let breakdown =
            resolve(&configuration, &PriceTable::new(), &base()).expect("pricing succeeds");

        assert!(breakdown.is_empty());
        assert_eq!(breakdown.total, Decimal::ZERO);
        let codes = breakdown.diagnostics.iter().map(PricingDiagnostic::code).collect::<Vec<_>>();
        assert_eq!(codes, vec!["skipped_add_on", "skipped_add_on"]);
    }

    #[test]
    fn standard_warranty_prefers_primary_then_legacy_then_zero() {
        let configuration =
            Configuration { warranty: WarrantyOption::Standard, ..Configuration::default() };

        let primary = resolve(
            &configuration,
            &table(&[("warranty_standard", 9_000), ("warranty", 8_000)]),
            &base(),
        )
        .expect("primary");
        assert_eq!(primary.total, Decimal::from(9_000));
        assert!(primary.diagnostics.is_empty());

        let legacy =
            resolve(&configuration, &table(&[("warranty", 8_000)]), &base()).expect("legacy");
        assert_eq!(legacy.total, Decimal::from(8_000));
        assert_eq!(legacy.diagnostics[0].code(), "legacy_price_key");

        let missing = resolve(&configuration, &PriceTable::new(), &base()).expect("missing");
        assert_eq!(missing.items.len(), 1);
        assert_eq!(missing.items[0].component, "Warranty (1 year)");
        assert_eq!(missing.total, Decimal::ZERO);
        assert_eq!(missing.diagnostics[0].code(), "missing_price");
    }

    #[test]
    fn extended_warranty_uses_its_own_key_or_a_zero_line() {
        let configuration =
            Configuration { warranty: WarrantyOption::Extended, ..Configuration::default() };

        let priced = resolve(
            &configuration,
            &table(&[("warranty_extended", 21_000), ("warranty_standard", 9_000)]),
            &base(),
        )
        .expect("priced");
        assert_eq!(priced.items.len(), 1);
        assert_eq!(priced.items[0].component, "Extended Warranty (3 years)");
        assert_eq!(priced.total, Decimal::from(21_000));
        assert!(priced.diagnostics.is_empty());

        let without_extended = table(&[("warranty_standard", 9_000), ("warranty", 8_000)]);
        let missing = resolve(&configuration, &without_extended, &base()).expect("missing");
        assert_eq!(missing.items.len(), 1);
        assert_eq!(missing.items[0].component, "Extended Warranty (3 years)");
        assert_eq!(missing.items[0].unit_price, Decimal::ZERO);
        assert_eq!(missing.total, Decimal::ZERO);
        assert_eq!(
            missing.diagnostics,
            vec![PricingDiagnostic::MissingPrice {
                component: "Extended Warranty (3 years)".to_string(),
                variant: "Parts + labor coverage".to_string(),
                price_key: "warranty_extended".to_string(),
            }]
        );
    }

    #[test]
    fn amounts_beyond_decimal_range_are_an_error() {
        let huge = Decimal::from(1_000_000_000_000_000_000_i64) * Decimal::from(10_000);
        let prices: PriceTable = [("VentuR".to_string(), huge)].into_iter().collect();
        let configuration = Configuration {
            grippers: VariantSelection::new().with(GripperModel::VentuR, 10_000_000),
            ..Configuration::default()
        };

        let error = resolve(&configuration, &prices, &base()).expect_err("subtotal overflows");
        assert_eq!(error, PricingError::AmountOverflow { component: "Gripper".to_string() });

        let at_limit: PriceTable =
            [("ai_training".to_string(), Decimal::MAX)].into_iter().collect();
        let configuration = Configuration::default().with_add_on(AddOn::AiTraining);
        let cad = CurrencyTable::default().select("CAD");

        assert!(resolve(&configuration, &at_limit, &base()).is_ok());
        assert_eq!(
            resolve(&configuration, &at_limit, &cad),
            Err(PricingError::AmountOverflow { component: "AI Custom Training".to_string() })
        );
    }

    #[test]
    fn no_warranty_and_zero_quantities_produce_no_lines() {
        let configuration = Configuration {
            robot_arms: VariantSelection::new().with(ArmModel::FanucM20Id25, 0),
            shipping: Some(Shipping { method: ShippingMethod::Truck, quantity: 0 }),
            warranty: WarrantyOption::None,
            ..Configuration::default()
        };

        let breakdown =
            resolve(&configuration, &PriceTable::reference(), &base()).expect("pricing succeeds");
        assert!(breakdown.is_empty());
        assert!(breakdown.diagnostics.is_empty());
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let configuration = Configuration {
            bases: VariantSelection::new().with(BaseModel::Elevated, -1),
            ..Configuration::default()
        };

        let error = resolve(&configuration, &PriceTable::reference(), &base())
            .expect_err("negative quantity must fail");
        assert_eq!(
            error,
            PricingError::NegativeQuantity {
                category: "base".to_string(),
                variant: "Elevated Base".to_string(),
                quantity: -1,
            }
        );

        let shipping = Configuration {
            shipping: Some(Shipping { method: ShippingMethod::Boat, quantity: -2 }),
            ..Configuration::default()
        };
        assert!(matches!(
            resolve(&shipping, &PriceTable::reference(), &base()),
            Err(PricingError::NegativeQuantity { .. })
        ));
    }

    #[test]
    fn line_order_follows_rule_sequence() {
        let breakdown = resolve(&full_configuration(), &PriceTable::reference(), &base())
            .expect("pricing succeeds");
        let components =
            breakdown.items.iter().map(|item| item.component.as_str()).collect::<Vec<_>>();

        assert_eq!(
            components,
            vec![
                "Conveyor",
                "AI Custom Training",
                "Site Acceptance Test (SAT)",
                "Modification Scope",
                "Robot Arm",
                "Robot Base",
                "Gripper",
                "Gripper",
                "Vision System",
                "Shipping",
                "Warranty (1 year)",
            ]
        );
        assert_eq!(breakdown.items[0].description, "36 inch belt");
    }

    #[test]
    fn resolution_is_deterministic_and_leaves_inputs_untouched() {
        let prices = PriceTable::reference();
        let configuration = full_configuration();
        let prices_before = prices.clone();
        let configuration_before = configuration.clone();
        let eur = CurrencyTable::default().select("EUR");

        let first: Breakdown = resolve(&configuration, &prices, &eur).expect("first run");
        let second: Breakdown = resolve(&configuration, &prices, &eur).expect("second run");

        assert_eq!(first, second);
        assert_eq!(prices, prices_before);
        assert_eq!(configuration, configuration_before);
    }
}
