//! # Calculation Pipeline
//!
//! An ordered chain of stages run against one [`CalculationContext`].
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Stage Chain (fixed order)                          │
//! │                                                                         │
//! │  1 CodeValidity ─► 2 ExpiryWindow ─► 3 UsageLimit ─► 4 MinimumBasket    │
//! │        │                 │                │                │            │
//! │  5 SpecificUser ─► 6 SpecificGroup ─► 7 FirstTimeBuyer ─► 8 Apply       │
//! │        │                 │                │                             │
//! │        ▼                 ▼                ▼                             │
//! │   violation? ── yes ──► set_invalid(msg), return WITHOUT calling next   │
//! │        │                                                                │
//! │        no ──► next.run(context)                                         │
//! │                                                                         │
//! │  States per call: running ──► terminated(valid | invalid)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A stage that receives an already-invalid context forwards it untouched.
//! Only the last stage, [`ApplyDiscountCalculation`], changes money.

pub mod apply;
pub mod checks;
pub mod context;

pub use apply::ApplyDiscountCalculation;
pub use checks::{
    CheckExpiryDate, CheckFirstTimeBuyer, CheckMinimumBasketValue, CheckSpecificGroup,
    CheckSpecificUser, ValidateDiscountCode, ValidateUsageLimit,
};
pub use context::CalculationContext;

use tracing::trace;

// =============================================================================
// Stage Contract
// =============================================================================

/// One link in the chain.
///
/// ## Contract
/// - `context.should_skip()` → return `next.run(context)` without inspecting
///   candidates
/// - violation found → `context.set_invalid(..)` and return `context` without
///   calling `next`
/// - otherwise → return `next.run(context)`
pub trait Stage: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Processes the context and decides whether the chain continues.
    fn handle<'c>(&self, context: CalculationContext<'c>, next: Next<'_>) -> CalculationContext<'c>;
}

/// The rest of the chain after the current stage.
#[derive(Clone, Copy)]
pub struct Next<'s> {
    stages: &'s [Box<dyn Stage>],
}

impl<'s> Next<'s> {
    /// Runs the remaining stages. With none left, returns the context as is.
    pub fn run<'c>(self, context: CalculationContext<'c>) -> CalculationContext<'c> {
        match self.stages.split_first() {
            Some((stage, rest)) => {
                trace!(stage = stage.name(), valid = context.is_valid(), "Entering stage");
                stage.handle(context, Next { stages: rest })
            }
            None => context,
        }
    }
}

// =============================================================================
// Runner
// =============================================================================

/// Composes an ordered list of stages into one callable chain.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use discount_core::money::Money;
/// use discount_core::pipeline::{CalculationContext, PipelineRunner};
/// use discount_core::types::{Cart, Customer};
///
/// let cart = Cart::with_total(Money::from_cents(5000));
/// let customer = Customer::new("1");
/// let context = CalculationContext::new(&cart, &customer, &[], Utc::now());
///
/// let result = PipelineRunner::standard().run(context).into_result();
/// assert!(result.is_valid);
/// assert_eq!(result.final_total, Money::from_cents(5000));
/// ```
pub struct PipelineRunner {
    stages: Vec<Box<dyn Stage>>,
}

impl PipelineRunner {
    /// Creates a runner over the given stages, run in the given order.
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        PipelineRunner { stages }
    }

    /// The fixed eight-stage chain used by the calculator.
    pub fn standard() -> Self {
        PipelineRunner::new(vec![
            Box::new(ValidateDiscountCode),
            Box::new(CheckExpiryDate),
            Box::new(ValidateUsageLimit),
            Box::new(CheckMinimumBasketValue),
            Box::new(CheckSpecificUser),
            Box::new(CheckSpecificGroup),
            Box::new(CheckFirstTimeBuyer),
            Box::new(ApplyDiscountCalculation),
        ])
    }

    /// Runs the whole chain over `context`.
    pub fn run<'c>(&self, context: CalculationContext<'c>) -> CalculationContext<'c> {
        Next {
            stages: &self.stages,
        }
        .run(context)
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

impl Default for PipelineRunner {
    fn default() -> Self {
        PipelineRunner::standard()
    }
}

impl std::fmt::Debug for PipelineRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineRunner")
            .field("stages", &self.stage_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{Cart, Customer};
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Invalidates unconditionally.
    struct Reject;

    impl Stage for Reject {
        fn name(&self) -> &'static str {
            "reject"
        }

        fn handle<'c>(&self, mut context: CalculationContext<'c>, next: Next<'_>) -> CalculationContext<'c> {
            if context.should_skip() {
                return next.run(context);
            }
            context.set_invalid("rejected");
            context
        }
    }

    /// Counts how often it runs, then continues.
    struct Counter(Arc<AtomicUsize>);

    impl Stage for Counter {
        fn name(&self) -> &'static str {
            "counter"
        }

        fn handle<'c>(&self, context: CalculationContext<'c>, next: Next<'_>) -> CalculationContext<'c> {
            self.0.fetch_add(1, Ordering::SeqCst);
            next.run(context)
        }
    }

    #[test]
    fn test_standard_order() {
        assert_eq!(
            PipelineRunner::standard().stage_names(),
            vec![
                "validate_discount_code",
                "check_expiry_date",
                "validate_usage_limit",
                "check_minimum_basket_value",
                "check_specific_user",
                "check_specific_group",
                "check_first_time_buyer",
                "apply_discount_calculation",
            ]
        );
    }

    #[test]
    fn test_short_circuit_skips_later_stages() {
        let hits = Arc::new(AtomicUsize::new(0));
        let runner = PipelineRunner::new(vec![
            Box::new(Counter(hits.clone())),
            Box::new(Reject),
            Box::new(Counter(hits.clone())),
        ]);

        let cart = Cart::with_total(Money::from_cents(100));
        let customer = Customer::new("1");
        let ctx = runner.run(CalculationContext::new(&cart, &customer, &[], Utc::now()));

        assert!(!ctx.is_valid());
        assert_eq!(ctx.error_message(), Some("rejected"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_runner_returns_context() {
        let cart = Cart::with_total(Money::from_cents(100));
        let customer = Customer::new("1");
        let ctx = PipelineRunner::new(Vec::new())
            .run(CalculationContext::new(&cart, &customer, &[], Utc::now()));

        assert!(ctx.is_valid());
        assert_eq!(ctx.remaining_amount(), Money::from_cents(100));
    }
}
