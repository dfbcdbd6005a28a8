use serde::{Deserialize, Serialize};

use crate::domain::configuration::{Configuration, VariantSelection};
use crate::domain::quote::QuoteRequest;
use crate::domain::variant::Variant;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    pub code: String,
    pub message: String,
    pub suggestion: Option<String>,
}

/// Violations block a quote; warnings are reported and the quote proceeds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintResult {
    pub valid: bool,
    pub violations: Vec<ConstraintViolation>,
    pub warnings: Vec<ConstraintViolation>,
}

impl Default for ConstraintResult {
    fn default() -> Self {
        Self { valid: true, violations: Vec::new(), warnings: Vec::new() }
    }
}

impl ConstraintResult {
    fn violation(&mut self, code: &str, message: String, suggestion: &str) {
        self.valid = false;
        self.violations.push(ConstraintViolation {
            code: code.to_string(),
            message,
            suggestion: Some(suggestion.to_string()),
        });
    }

    fn warning(&mut self, code: &str, message: String, suggestion: &str) {
        self.warnings.push(ConstraintViolation {
            code: code.to_string(),
            message,
            suggestion: Some(suggestion.to_string()),
        });
    }
}

pub trait ConstraintEngine: Send + Sync {
    fn validate(&self, request: &QuoteRequest) -> ConstraintResult;
}

#[derive(Default)]
pub struct DeterministicConstraintEngine;

impl ConstraintEngine for DeterministicConstraintEngine {
    fn validate(&self, request: &QuoteRequest) -> ConstraintResult {
        validate_request(request)
    }
}

/// Required request fields plus the configuration checks of [`check_consistency`].
pub fn validate_request(request: &QuoteRequest) -> ConstraintResult {
    let mut result = check_consistency(&request.configuration);
    let metadata = &request.metadata;

    let client_missing =
        metadata.client_name.as_deref().map(|name| name.trim().is_empty()).unwrap_or(true);
    if client_missing {
        result.violation(
            "MISSING_CLIENT_NAME",
            "Quote request is missing the client name".to_string(),
            "Set metadata.client_name",
        );
    }

    if metadata.quote_date.is_none() {
        result.violation(
            "MISSING_QUOTE_DATE",
            "Quote request is missing the quote date".to_string(),
            "Set metadata.quote_date as YYYY-MM-DD",
        );
    }

    result
}

/// Negative quantities are violations; the arm/base/gripper balance is a soft check.
pub fn check_consistency(configuration: &Configuration) -> ConstraintResult {
    let mut result = ConstraintResult::default();

    negative_quantities(&configuration.robot_arms, &mut result);
    negative_quantities(&configuration.bases, &mut result);
    negative_quantities(&configuration.grippers, &mut result);
    negative_quantities(&configuration.vision_systems, &mut result);

    if let Some(shipping) = &configuration.shipping {
        if shipping.quantity < 0 {
            result.violation(
                "NEGATIVE_QUANTITY",
                format!(
                    "Shipping by {} has negative quantity {}",
                    shipping.method.label(),
                    shipping.quantity
                ),
                "Use zero or a positive number of trucks or containers",
            );
        }
    }

    let arms = configuration.robot_arms.total_quantity();
    let bases = configuration.bases.total_quantity();
    let grippers = configuration.grippers.total_quantity();

    if arms == 0 {
        result.warning(
            "NO_ROBOT_ARMS",
            "Configuration does not include any robot arms".to_string(),
            "Select at least one robot arm",
        );
    }

    if arms != bases {
        result.warning(
            "ARM_BASE_MISMATCH",
            format!("{arms} robot arm(s) configured but {bases} base(s)"),
            "Each robot arm normally sits on its own base",
        );
    }

    if arms != grippers {
        result.warning(
            "ARM_GRIPPER_MISMATCH",
            format!("{arms} robot arm(s) configured but {grippers} gripper(s)"),
            "Each robot arm normally carries one gripper",
        );
    }

    result
}

fn negative_quantities<V: Variant>(selection: &VariantSelection<V>, result: &mut ConstraintResult) {
    for entry in selection.entries().iter().filter(|entry| entry.quantity < 0) {
        result.violation(
            "NEGATIVE_QUANTITY",
            format!(
                "{} `{}` has negative quantity {}",
                V::CATEGORY.component(),
                entry.variant.label(),
                entry.quantity
            ),
            "Use zero or a positive integer quantity",
        );
    }
}
