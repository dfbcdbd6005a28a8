use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::variant::{
    ArmModel, BaseModel, GripperModel, Variant, VariantCategory, VisionModel,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantQuantity<V> {
    pub variant: V,
    pub quantity: i64,
}

/// Variant → quantity mapping for one category, kept in insertion order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantSelection<V> {
    entries: Vec<VariantQuantity<V>>,
}

impl<V> Default for VariantSelection<V> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<V: Variant> VariantSelection<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, variant: V, quantity: i64) -> Self {
        self.set(variant, quantity);
        self
    }

    /// Sets the quantity for a variant, replacing any previous quantity in place.
    pub fn set(&mut self, variant: V, quantity: i64) {
        match self.entries.iter_mut().find(|entry| entry.variant == variant) {
            Some(entry) => entry.quantity = quantity,
            None => self.entries.push(VariantQuantity { variant, quantity }),
        }
    }

    /// Adds to the quantity already held for a variant, saturating at the `i64` bounds.
    /// A negative quantity on either side is kept as is so it is still rejected later.
    pub fn add(&mut self, variant: V, quantity: i64) {
        match self.entries.iter_mut().find(|entry| entry.variant == variant) {
            Some(entry) if entry.quantity < 0 || quantity < 0 => {
                entry.quantity = entry.quantity.min(quantity)
            }
            Some(entry) => entry.quantity = entry.quantity.saturating_add(quantity),
            None => self.entries.push(VariantQuantity { variant, quantity }),
        }
    }

    pub fn contains(&self, variant: &V) -> bool {
        self.entries.iter().any(|entry| &entry.variant == variant)
    }

    pub fn entries(&self) -> &[VariantQuantity<V>] {
        &self.entries
    }

    pub fn quantity_of(&self, variant: &V) -> i64 {
        self.entries
            .iter()
            .find(|entry| &entry.variant == variant)
            .map(|entry| entry.quantity)
            .unwrap_or(0)
    }

    /// Summed in `i128`, so any number of `i64` quantities fits.
    pub fn total_quantity(&self) -> i128 {
        self.entries.iter().map(|entry| i128::from(entry.quantity)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Variant> FromIterator<(V, i64)> for VariantSelection<V> {
    fn from_iter<I: IntoIterator<Item = (V, i64)>>(iter: I) -> Self {
        let mut selection = Self::new();
        for (variant, quantity) in iter {
            selection.set(variant, quantity);
        }
        selection
    }
}

/// Flat add-ons. Declaration order is the order lines appear on a breakdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOn {
    Conveyor,
    AiTraining,
    SoftwareLicense,
    Fat,
    TryAndBuy,
    Installation,
    InfrastructureElectrical,
    InfrastructureAir,
    InfrastructureInternet,
    SecurityPerimeter,
    PeStamp,
    Sat,
}

impl AddOn {
    pub const ALL: [AddOn; 12] = [
        AddOn::Conveyor,
        AddOn::AiTraining,
        AddOn::SoftwareLicense,
        AddOn::Fat,
        AddOn::TryAndBuy,
        AddOn::Installation,
        AddOn::InfrastructureElectrical,
        AddOn::InfrastructureAir,
        AddOn::InfrastructureInternet,
        AddOn::SecurityPerimeter,
        AddOn::PeStamp,
        AddOn::Sat,
    ];

    pub fn config_name(&self) -> &'static str {
        match self {
            Self::Conveyor => "conveyor",
            Self::AiTraining => "ai_training",
            Self::SoftwareLicense => "software_license",
            Self::Fat => "fat",
            Self::TryAndBuy => "try_and_buy",
            Self::Installation => "installation",
            Self::InfrastructureElectrical => "infrastructure_electrical",
            Self::InfrastructureAir => "infrastructure_air",
            Self::InfrastructureInternet => "infrastructure_internet",
            Self::SecurityPerimeter => "security_perimeter",
            Self::PeStamp => "pe_stamp",
            Self::Sat => "sat",
        }
    }

    pub fn from_config_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|add_on| add_on.config_name() == name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModificationScope {
    #[serde(alias = "Small")]
    Small,
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "Large")]
    Large,
}

impl ModificationScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarrantyOption {
    #[default]
    #[serde(alias = "None")]
    None,
    #[serde(alias = "Standard")]
    Standard,
    #[serde(alias = "Extended")]
    Extended,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShippingMethod {
    Truck,
    Boat,
    Other(String),
}

impl ShippingMethod {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "truck" => Self::Truck,
            "boat" | "container" => Self::Boat,
            _ => Self::Other(label.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Truck => "Truck",
            Self::Boat => "Boat",
            Self::Other(label) => label,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shipping {
    pub method: ShippingMethod,
    /// Trucks for truck freight, containers for boat freight.
    pub quantity: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Configuration {
    pub robot_arms: VariantSelection<ArmModel>,
    pub bases: VariantSelection<BaseModel>,
    pub grippers: VariantSelection<GripperModel>,
    pub vision_systems: VariantSelection<VisionModel>,
    pub add_ons: BTreeSet<AddOn>,
    pub conveyor_size_in: Option<String>,
    pub modification_scope: Option<ModificationScope>,
    pub shipping: Option<Shipping>,
    pub warranty: WarrantyOption,
}

impl Configuration {
    pub fn with_add_on(mut self, add_on: AddOn) -> Self {
        self.add_ons.insert(add_on);
        self
    }

    pub fn includes(&self, add_on: AddOn) -> bool {
        self.add_ons.contains(&add_on)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum BuildWarning {
    UnmappedVariant { category: VariantCategory, label: String },
    MergedVariantLabel { category: VariantCategory, label: String, variant: String },
    UnknownAddOn { name: String },
    UnknownShippingMethod { method: String },
}

impl BuildWarning {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnmappedVariant { .. } => "unmapped_variant",
            Self::MergedVariantLabel { .. } => "merged_variant_label",
            Self::UnknownAddOn { .. } => "unknown_add_on",
            Self::UnknownShippingMethod { .. } => "unknown_shipping_method",
        }
    }
}

impl std::fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnmappedVariant { category, label } => write!(
                f,
                "{category} `{label}` is not in the catalog; its label is used as the price key"
            ),
            Self::MergedVariantLabel { category, label, variant } => write!(
                f,
                "{category} `{label}` is another label for `{variant}`; quantities were added"
            ),
            Self::UnknownAddOn { name } => {
                write!(f, "add-on `{name}` is not recognised and was ignored")
            }
            Self::UnknownShippingMethod { method } => write!(
                f,
                "shipping method `{method}` is not recognised; the default unit price applies"
            ),
        }
    }
}

/// Loosely typed configuration as it arrives from a form or a request file.
///
/// Category maps are keyed by human-readable label. Maps deserialize in key order, so
/// lines built from a draft are sorted by label within each category. Labels that name
/// the same variant are merged into one line.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigurationDraft {
    pub robot_arms: BTreeMap<String, i64>,
    pub bases: BTreeMap<String, i64>,
    pub grippers: BTreeMap<String, i64>,
    pub vision_systems: BTreeMap<String, i64>,
    pub add_ons: BTreeMap<String, bool>,
    pub conveyor_size_in: Option<String>,
    pub modification_scope: Option<ModificationScope>,
    pub shipping: Option<ShippingDraft>,
    pub warranty: WarrantyOption,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingDraft {
    pub method: String,
    #[serde(default = "default_shipping_quantity")]
    pub quantity: i64,
}

fn default_shipping_quantity() -> i64 {
    1
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConfigurationBuild {
    pub configuration: Configuration,
    pub warnings: Vec<BuildWarning>,
}

impl ConfigurationDraft {
    pub fn build(self) -> ConfigurationBuild {
        let mut warnings = Vec::new();

        let robot_arms = build_selection::<ArmModel>(self.robot_arms, &mut warnings);
        let bases = build_selection::<BaseModel>(self.bases, &mut warnings);
        let grippers = build_selection::<GripperModel>(self.grippers, &mut warnings);
        let vision_systems = build_selection::<VisionModel>(self.vision_systems, &mut warnings);

        let mut add_ons = BTreeSet::new();
        for (name, enabled) in self.add_ons {
            match AddOn::from_config_name(&name) {
                Some(add_on) => {
                    if enabled {
                        add_ons.insert(add_on);
                    }
                }
                None => warnings.push(BuildWarning::UnknownAddOn { name }),
            }
        }

        let shipping = self.shipping.map(|draft| {
            let method = ShippingMethod::from_label(&draft.method);
            if let ShippingMethod::Other(label) = &method {
                warnings.push(BuildWarning::UnknownShippingMethod { method: label.clone() });
            }
            Shipping { method, quantity: draft.quantity }
        });

        let conveyor_size_in =
            self.conveyor_size_in.map(|size| size.trim().to_string()).filter(|s| !s.is_empty());

        ConfigurationBuild {
            configuration: Configuration {
                robot_arms,
                bases,
                grippers,
                vision_systems,
                add_ons,
                conveyor_size_in,
                modification_scope: self.modification_scope,
                shipping,
                warranty: self.warranty,
            },
            warnings,
        }
    }
}

fn build_selection<V: Variant>(
    raw: BTreeMap<String, i64>,
    warnings: &mut Vec<BuildWarning>,
) -> VariantSelection<V> {
    let mut selection = VariantSelection::new();
    for (label, quantity) in raw {
        let variant = V::from_label(&label);
        if !variant.is_mapped() {
            warnings.push(BuildWarning::UnmappedVariant {
                category: V::CATEGORY,
                label: variant.label().to_string(),
            });
        }
        if selection.contains(&variant) {
            warnings.push(BuildWarning::MergedVariantLabel {
                category: V::CATEGORY,
                label: label.clone(),
                variant: variant.label().to_string(),
            });
        }
        selection.add(variant, quantity);
    }
    selection
}
