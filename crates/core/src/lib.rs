pub mod config;
pub mod cpq;
pub mod domain;
pub mod errors;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use cpq::catalog::{audit_price_table, AuditFinding, MissingKeyEffect, PriceTableAudit};
pub use cpq::constraints::{
    check_consistency, validate_request, ConstraintEngine, ConstraintResult, ConstraintViolation,
    DeterministicConstraintEngine,
};
pub use cpq::currency::{CurrencySelection, CurrencyTable, BASE_CURRENCY};
pub use cpq::price_table::{PriceTable, PriceTableError};
pub use cpq::pricing::{
    resolve, Breakdown, DeterministicPricingResolver, LineItem, PricingDiagnostic, PricingError,
    PricingResolver,
};
pub use cpq::{DeterministicQuoteRuntime, QuoteEvaluation, QuoteEvaluationInput, QuoteRuntime};
pub use domain::configuration::{
    AddOn, BuildWarning, Configuration, ConfigurationDraft, ModificationScope, Shipping,
    ShippingMethod, VariantSelection, WarrantyOption,
};
pub use domain::quote::{
    QuoteId, QuoteMetadata, QuoteRequest, QuoteRequestDraft, TechnicalDetails, TimelinePhase,
};
pub use domain::variant::{ArmModel, BaseModel, GripperModel, Variant, VisionModel};
pub use errors::{ApplicationError, DomainError};
