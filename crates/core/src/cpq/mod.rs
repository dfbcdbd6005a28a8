pub mod catalog;
pub mod constraints;
pub mod currency;
pub mod price_table;
pub mod pricing;

use serde::{Deserialize, Serialize};

use crate::domain::quote::QuoteRequest;

use self::{
    constraints::{ConstraintEngine, ConstraintResult, DeterministicConstraintEngine},
    currency::CurrencySelection,
    price_table::PriceTable,
    pricing::{Breakdown, DeterministicPricingResolver, PricingError, PricingResolver},
};

#[derive(Clone, Debug)]
pub struct QuoteEvaluationInput<'a> {
    pub request: &'a QuoteRequest,
    pub prices: &'a PriceTable,
    pub currency: &'a CurrencySelection,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteEvaluation {
    pub constraints: ConstraintResult,
    /// Absent when constraint violations block pricing.
    pub breakdown: Option<Breakdown>,
}

pub trait QuoteRuntime: Send + Sync {
    fn evaluate_quote(&self, input: QuoteEvaluationInput<'_>)
        -> Result<QuoteEvaluation, PricingError>;
}

pub struct DeterministicQuoteRuntime<C, P> {
    constraint_engine: C,
    pricing_resolver: P,
}

impl<C, P> DeterministicQuoteRuntime<C, P> {
    pub fn new(constraint_engine: C, pricing_resolver: P) -> Self {
        Self { constraint_engine, pricing_resolver }
    }
}

impl Default
    for DeterministicQuoteRuntime<DeterministicConstraintEngine, DeterministicPricingResolver>
{
    fn default() -> Self {
        Self::new(DeterministicConstraintEngine, DeterministicPricingResolver)
    }
}

impl<C, P> QuoteRuntime for DeterministicQuoteRuntime<C, P>
where
    C: ConstraintEngine,
    P: PricingResolver,
{
    fn evaluate_quote(
        &self,
        input: QuoteEvaluationInput<'_>,
    ) -> Result<QuoteEvaluation, PricingError> {
        let constraints = self.constraint_engine.validate(input.request);
        if !constraints.valid {
            return Ok(QuoteEvaluation { constraints, breakdown: None });
        }

        let breakdown = self.pricing_resolver.resolve(
            &input.request.configuration,
            input.prices,
            input.currency,
        )?;

        Ok(QuoteEvaluation { constraints, breakdown: Some(breakdown) })
    }
}
