//! # Discount Calculator
//!
//! Public entry point. Resolves codes through a [`CodeRepository`], builds a
//! [`CalculationContext`] and runs the stage chain over it.
//!
//! ## Calculate Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  calculate(request)                                                     │
//! │     │                                                                   │
//! │     ├── validate_request ──────────────► Err(Validation)                │
//! │     │                                                                   │
//! │     ├── repository.find_codes_by_name ─► Err(Repository)                │
//! │     │                                                                   │
//! │     ├── reorder to submission order, split off unknown codes            │
//! │     │                                                                   │
//! │     ├── [enforce_combination_rules] codes_can_combine? ── no ──┐        │
//! │     │                                                          │        │
//! │     ├── PipelineRunner::run(context)                           │        │
//! │     │                                                          ▼        │
//! │     └── Ok(DiscountCalculationResult { is_valid, error_message, .. })   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `get_maximum_discount` replaces the submitted codes with every eligible
//! stored code and follows the same path from the pipeline onwards.
//!
//! ## Concurrency
//! The calculator holds no per-call state. One instance can serve any number
//! of concurrent calls; each call owns its own context.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::CalculatorConfig;
use crate::error::CoreResult;
use crate::pipeline::{CalculationContext, PipelineRunner};
use crate::repository::CodeRepository;
use crate::types::{CalculationRequest, DiscountCalculationResult, PromotionCode};
use crate::validation::{validate_cart_and_customer, validate_codes, validate_request};

/// Metadata key listing submitted codes that were dropped because no record
/// matched them (only when unknown codes are not rejected).
pub const UNRESOLVED_CODES_KEY: &str = "unresolved_codes";

/// Applies promotion codes to carts.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use discount_core::calculator::DiscountCalculator;
/// use discount_core::money::{DiscountValue, Money};
/// use discount_core::repository::InMemoryCodeRepository;
/// use discount_core::types::{CalculationRequest, Cart, Customer, DiscountType, PromotionCode};
///
/// # tokio_test_block(async {
/// let repository = InMemoryCodeRepository::with_codes([PromotionCode::new(
///     1,
///     "PERCENT20",
///     DiscountType::Percentage,
///     DiscountValue::from_whole(20),
/// )]);
/// let calculator = DiscountCalculator::new(Arc::new(repository));
///
/// let request = CalculationRequest::new(
///     Cart::with_total(Money::from_cents(15300)),
///     Customer::new("1"),
///     ["PERCENT20"],
/// );
/// let result = calculator.calculate(&request).await.unwrap();
///
/// assert!(result.is_valid);
/// assert_eq!(result.total_discount, Money::from_cents(3060));
/// assert_eq!(result.final_total, Money::from_cents(12240));
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f);
/// # }
/// ```
pub struct DiscountCalculator {
    repository: Arc<dyn CodeRepository>,
    pipeline: PipelineRunner,
    config: CalculatorConfig,
}

impl DiscountCalculator {
    /// Creates a calculator with the standard stage chain and default config.
    pub fn new(repository: Arc<dyn CodeRepository>) -> Self {
        DiscountCalculator {
            repository,
            pipeline: PipelineRunner::standard(),
            config: CalculatorConfig::default(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: CalculatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the stage chain.
    pub fn with_pipeline(mut self, pipeline: PipelineRunner) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    // =========================================================================
    // Public Operations
    // =========================================================================

    /// Applies the submitted codes, in submission order, to the cart.
    ///
    /// ## Errors
    /// - `CoreError::Validation` for a structurally invalid request
    /// - `CoreError::Repository` when codes cannot be resolved
    ///
    /// Every business-rule rejection comes back as `Ok` with
    /// `is_valid == false`.
    pub async fn calculate(
        &self,
        request: &CalculationRequest,
    ) -> CoreResult<DiscountCalculationResult> {
        self.calculate_at(request, Utc::now()).await
    }

    /// [`DiscountCalculator::calculate`] evaluated at a fixed instant.
    ///
    /// Two calls with the same request, the same stored codes and the same
    /// `now` produce equal results.
    pub async fn calculate_at(
        &self,
        request: &CalculationRequest,
        now: DateTime<Utc>,
    ) -> CoreResult<DiscountCalculationResult> {
        validate_request(request, &self.config)?;

        let found = if request.discount_codes.is_empty() {
            Vec::new()
        } else {
            self.repository
                .find_codes_by_name(&request.discount_codes)
                .await?
        };

        let (candidates, unresolved) = order_by_submission(&request.discount_codes, found);
        debug!(
            requested = request.discount_codes.len(),
            resolved = candidates.len(),
            unresolved = unresolved.len(),
            "Resolved discount codes"
        );

        Ok(self.evaluate(request, &candidates, &unresolved, now))
    }

    /// Applies every currently eligible stored code together.
    ///
    /// `request.discount_codes` is ignored. This is the union of all eligible
    /// codes, not a search for the best subset: one exclusive or restricted
    /// code can invalidate the whole result.
    pub async fn get_maximum_discount(
        &self,
        request: &CalculationRequest,
    ) -> CoreResult<DiscountCalculationResult> {
        self.get_maximum_discount_at(request, Utc::now()).await
    }

    /// [`DiscountCalculator::get_maximum_discount`] evaluated at a fixed instant.
    pub async fn get_maximum_discount_at(
        &self,
        request: &CalculationRequest,
        now: DateTime<Utc>,
    ) -> CoreResult<DiscountCalculationResult> {
        validate_cart_and_customer(request)?;

        let eligible = self.repository.find_eligible_codes(now).await?;
        debug!(eligible = eligible.len(), "Loaded eligible discount codes");

        Ok(self.evaluate(request, &eligible, &[], now))
    }

    /// Returns false when any of the named codes is exclusive or not
    /// combinable. Names with no stored record are ignored.
    pub async fn validate_combination(&self, codes: &[String]) -> CoreResult<bool> {
        validate_codes(codes, self.config.max_codes_per_request)?;
        let found = self.repository.find_codes_by_name(codes).await?;
        Ok(codes_can_combine(&found))
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Runs the chain over already-resolved candidates.
    fn evaluate(
        &self,
        request: &CalculationRequest,
        candidates: &[PromotionCode],
        unresolved: &[String],
        now: DateTime<Utc>,
    ) -> DiscountCalculationResult {
        let mut metadata = request.metadata.clone();
        let rejected_unknown: &[String] = if self.config.reject_unknown_codes {
            unresolved
        } else {
            if !unresolved.is_empty() {
                metadata.insert(
                    UNRESOLVED_CODES_KEY.to_string(),
                    serde_json::Value::from(unresolved.to_vec()),
                );
            }
            &[]
        };

        let mut context = CalculationContext::new(&request.cart, &request.customer, candidates, now)
            .with_unresolved_codes(rejected_unknown)
            .with_metadata(metadata);

        if self.config.enforce_combination_rules
            && rejected_unknown.is_empty()
            && candidates.len() > 1
            && !codes_can_combine(candidates)
        {
            context.set_invalid(combination_message(candidates));
        }

        let result = self.pipeline.run(context).into_result();

        info!(
            candidates = candidates.len(),
            applied = result.applied_discounts.len(),
            total = result.original_cart.total.cents(),
            total_discount = result.total_discount.cents(),
            final_total = result.final_total.cents(),
            is_valid = result.is_valid,
            "Discount calculation complete"
        );

        result
    }
}

impl std::fmt::Debug for DiscountCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscountCalculator")
            .field("pipeline", &self.pipeline)
            .field("config", &self.config)
            .finish()
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// True unless some code is exclusive or marked as not combinable.
pub fn codes_can_combine(codes: &[PromotionCode]) -> bool {
    codes
        .iter()
        .all(|code| !code.is_exclusive && code.can_be_combined)
}

/// Puts found records in the order their names were submitted and returns
/// the submitted names that matched nothing.
fn order_by_submission(
    submitted: &[String],
    mut found: Vec<PromotionCode>,
) -> (Vec<PromotionCode>, Vec<String>) {
    let mut ordered = Vec::with_capacity(found.len());
    let mut unresolved = Vec::new();

    for name in submitted {
        match found.iter().position(|code| code.code == *name) {
            Some(index) => ordered.push(found.swap_remove(index)),
            None => unresolved.push(name.clone()),
        }
    }

    (ordered, unresolved)
}

fn combination_message(codes: &[PromotionCode]) -> String {
    let names = codes
        .iter()
        .map(|code| format!("'{}'", code.code))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Discount codes {} cannot be combined.", names)
}

// =============================================================================
// Unit Tests
// =============================================================================
