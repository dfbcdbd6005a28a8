//! Selectable sub-types for the multi-variant categories of a cell configuration.
//!
//! Every category is a closed enum with an `Other` escape hatch. Known models carry a
//! fixed price-table key; an `Other` label is used verbatim as its lookup key and is
//! reported as unmapped when the configuration is built.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantCategory {
    RobotArm,
    Base,
    Gripper,
    VisionSystem,
}

impl VariantCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RobotArm => "robot_arm",
            Self::Base => "base",
            Self::Gripper => "gripper",
            Self::VisionSystem => "vision_system",
        }
    }

    /// Component name printed on breakdown lines.
    pub fn component(&self) -> &'static str {
        match self {
            Self::RobotArm => "Robot Arm",
            Self::Base => "Robot Base",
            Self::Gripper => "Gripper",
            Self::VisionSystem => "Vision System",
        }
    }
}

impl std::fmt::Display for VariantCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait Variant: Clone + std::fmt::Debug + PartialEq {
    const CATEGORY: VariantCategory;

    /// Every mapped model, in catalog order.
    fn known() -> Vec<Self>;

    /// Parses a human-readable label. Unknown labels become the `Other` variant.
    fn from_label(label: &str) -> Self;

    fn label(&self) -> &str;

    fn price_key(&self) -> &str;

    fn is_mapped(&self) -> bool;
}

fn normalize(label: &str) -> String {
    label.trim().to_ascii_lowercase()
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArmModel {
    FanucLrMate200Id,
    FanucM20Id25,
    Other(String),
}

impl Variant for ArmModel {
    const CATEGORY: VariantCategory = VariantCategory::RobotArm;

    fn known() -> Vec<Self> {
        vec![Self::FanucLrMate200Id, Self::FanucM20Id25]
    }

    fn from_label(label: &str) -> Self {
        match normalize(label).as_str() {
            "fanuc lr-mate 200id" | "lr-mate 200id" => Self::FanucLrMate200Id,
            "fanuc m-20id/25" | "m-20id/25" => Self::FanucM20Id25,
            _ => Self::Other(label.trim().to_string()),
        }
    }

    fn label(&self) -> &str {
        match self {
            Self::FanucLrMate200Id => "Fanuc LR-Mate 200ID",
            Self::FanucM20Id25 => "Fanuc M-20iD/25",
            Self::Other(label) => label,
        }
    }

    fn price_key(&self) -> &str {
        match self {
            // Single-arm rate card predates the M-20iD; its key stayed generic.
            Self::FanucLrMate200Id => "robot_arm",
            Self::FanucM20Id25 => "robot_arm_m20id25",
            Self::Other(label) => label,
        }
    }

    fn is_mapped(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BaseModel {
    Standard,
    Elevated,
    Other(String),
}

impl Variant for BaseModel {
    const CATEGORY: VariantCategory = VariantCategory::Base;

    fn known() -> Vec<Self> {
        vec![Self::Standard, Self::Elevated]
    }

    fn from_label(label: &str) -> Self {
        match normalize(label).as_str() {
            "standard base" | "standard" => Self::Standard,
            "elevated base" | "elevated" => Self::Elevated,
            _ => Self::Other(label.trim().to_string()),
        }
    }

    fn label(&self) -> &str {
        match self {
            Self::Standard => "Standard Base",
            Self::Elevated => "Elevated Base",
            Self::Other(label) => label,
        }
    }

    fn price_key(&self) -> &str {
        match self {
            Self::Standard => "base_standard",
            Self::Elevated => "base_elevated",
            Self::Other(label) => label,
        }
    }

    fn is_mapped(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GripperModel {
    VentuR,
    PinchR,
    BagR,
    Other(String),
}

impl Variant for GripperModel {
    const CATEGORY: VariantCategory = VariantCategory::Gripper;

    fn known() -> Vec<Self> {
        vec![Self::VentuR, Self::PinchR, Self::BagR]
    }

    fn from_label(label: &str) -> Self {
        match normalize(label).as_str() {
            "ventur (suction)" | "ventur" => Self::VentuR,
            "pinchr" => Self::PinchR,
            "bagr" => Self::BagR,
            _ => Self::Other(label.trim().to_string()),
        }
    }

    fn label(&self) -> &str {
        match self {
            Self::VentuR => "VentuR (suction)",
            Self::PinchR => "PinchR",
            Self::BagR => "BagR",
            Self::Other(label) => label,
        }
    }

    fn price_key(&self) -> &str {
        match self {
            Self::VentuR => "VentuR",
            Self::PinchR => "PinchR",
            Self::BagR => "BagR",
            Self::Other(label) => label,
        }
    }

    fn is_mapped(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum VisionModel {
    Hypervision,
    RgbCamera,
    Camera3d,
    Other(String),
}

impl Variant for VisionModel {
    const CATEGORY: VariantCategory = VariantCategory::VisionSystem;

    fn known() -> Vec<Self> {
        vec![Self::Hypervision, Self::RgbCamera, Self::Camera3d]
    }

    fn from_label(label: &str) -> Self {
        match normalize(label).as_str() {
            "hypervision scanner" | "hypervision" => Self::Hypervision,
            "rgb camera" => Self::RgbCamera,
            "3d camera" => Self::Camera3d,
            _ => Self::Other(label.trim().to_string()),
        }
    }

    fn label(&self) -> &str {
        match self {
            Self::Hypervision => "Hypervision Scanner",
            Self::RgbCamera => "RGB Camera",
            Self::Camera3d => "3D Camera",
            Self::Other(label) => label,
        }
    }

    fn price_key(&self) -> &str {
        match self {
            Self::Hypervision => "hypervision_scanner",
            Self::RgbCamera => "vision_rgb_camera",
            Self::Camera3d => "vision_3d_camera",
            Self::Other(label) => label,
        }
    }

    fn is_mapped(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

#[cfg(test)]
mod tests {
    use super::{ArmModel, GripperModel, Variant, VisionModel};

    #[test]
    fn labels_and_aliases_resolve_case_insensitively() {
        assert_eq!(GripperModel::from_label("VentuR (suction)"), GripperModel::VentuR);
        assert_eq!(GripperModel::from_label("  ventur "), GripperModel::VentuR);
        assert_eq!(ArmModel::from_label("FANUC LR-Mate 200iD"), ArmModel::FanucLrMate200Id);
        assert_eq!(VisionModel::from_label("3d camera"), VisionModel::Camera3d);
    }

    #[test]
    fn unknown_label_is_used_verbatim_as_price_key() {
        let gripper = GripperModel::from_label(" SoftGrip X ");
        assert_eq!(gripper, GripperModel::Other("SoftGrip X".to_string()));
        assert_eq!(gripper.price_key(), "SoftGrip X");
        assert!(!gripper.is_mapped());
    }

    #[test]
    fn every_known_variant_round_trips_through_its_label() {
        for arm in ArmModel::known() {
            assert_eq!(ArmModel::from_label(arm.label()), arm);
            assert!(arm.is_mapped());
        }
        for gripper in GripperModel::known() {
            assert_eq!(GripperModel::from_label(gripper.label()), gripper);
        }
        for vision in VisionModel::known() {
            assert_eq!(VisionModel::from_label(vision.label()), vision);
        }
    }
}
