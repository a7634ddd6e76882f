//! Per-calculation mutable state threaded through the stages.

use chrono::{DateTime, Utc};

use crate::money::Money;
use crate::types::{AppliedDiscount, Cart, Customer, DiscountCalculationResult, Metadata, PromotionCode};

/// State for one `calculate` call.
///
/// Created by the calculator, owned by that call, consumed into a
/// [`DiscountCalculationResult`] at the end. Never shared between calls.
///
/// ## Invariants
/// - once `is_valid` is false, `remaining_amount`, `total_discount` and
///   `applied_discounts` no longer change
/// - `error_message` keeps the first message set
/// - `total_discount + remaining_amount == cart.total`
#[derive(Debug, Clone)]
pub struct CalculationContext<'a> {
    cart: &'a Cart,
    customer: &'a Customer,
    discount_codes: &'a [PromotionCode],
    unresolved_codes: &'a [String],
    now: DateTime<Utc>,

    remaining_amount: Money,
    applied_discounts: Vec<AppliedDiscount>,
    total_discount: Money,
    is_valid: bool,
    error_message: Option<String>,
    metadata: Metadata,
}

impl<'a> CalculationContext<'a> {
    /// Creates a fresh context; `remaining_amount` starts at `cart.total`.
    pub fn new(
        cart: &'a Cart,
        customer: &'a Customer,
        discount_codes: &'a [PromotionCode],
        now: DateTime<Utc>,
    ) -> Self {
        CalculationContext {
            cart,
            customer,
            discount_codes,
            unresolved_codes: &[],
            now,
            remaining_amount: cart.total,
            applied_discounts: Vec::new(),
            total_discount: Money::zero(),
            is_valid: true,
            error_message: None,
            metadata: Metadata::new(),
        }
    }

    /// Attaches submitted codes that matched no stored record, for the
    /// code-validity stage to reject.
    pub fn with_unresolved_codes(mut self, unresolved: &'a [String]) -> Self {
        self.unresolved_codes = unresolved;
        self
    }

    /// Attaches result metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    // -------------------------------------------------------------------------
    // Inputs
    // -------------------------------------------------------------------------

    pub fn cart(&self) -> &'a Cart {
        self.cart
    }

    pub fn customer(&self) -> &'a Customer {
        self.customer
    }

    /// Candidate codes in submission order.
    pub fn discount_codes(&self) -> &'a [PromotionCode] {
        self.discount_codes
    }

    pub fn unresolved_codes(&self) -> &'a [String] {
        self.unresolved_codes
    }

    /// The instant every time-based check in this calculation uses.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    // -------------------------------------------------------------------------
    // Running state
    // -------------------------------------------------------------------------

    pub fn remaining_amount(&self) -> Money {
        self.remaining_amount
    }

    pub fn total_discount(&self) -> Money {
        self.total_discount
    }

    pub fn applied_discounts(&self) -> &[AppliedDiscount] {
        &self.applied_discounts
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// True when a previous stage already invalidated the calculation.
    #[inline]
    pub fn should_skip(&self) -> bool {
        !self.is_valid
    }

    /// Records a discount: appends it and moves `amount` from the remaining
    /// amount to the total discount.
    ///
    /// No clamping happens here; the caller keeps `amount` within
    /// `remaining_amount`.
    pub fn add_applied_discount(&mut self, code: &PromotionCode, amount: Money) {
        debug_assert!(self.is_valid, "discount applied to an invalidated calculation");
        debug_assert!(amount <= self.remaining_amount, "discount exceeds remaining amount");

        self.applied_discounts.push(AppliedDiscount {
            discount_code: code.clone(),
            amount,
            applied_at: self.now,
        });
        self.total_discount += amount;
        self.remaining_amount -= amount;
    }

    /// Marks the calculation invalid. Only the first message is kept.
    pub fn set_invalid(&mut self, message: impl Into<String>) {
        if self.is_valid {
            self.is_valid = false;
            self.error_message = Some(message.into());
        }
    }

    /// `cart.total - total_discount`.
    pub fn final_total(&self) -> Money {
        self.cart.total - self.total_discount
    }

    /// Projects the finished context into the caller-facing result.
    pub fn into_result(self) -> DiscountCalculationResult {
        let final_total = self.final_total();
        DiscountCalculationResult {
            original_cart: self.cart.clone(),
            applied_discounts: self.applied_discounts,
            total_discount: self.total_discount,
            final_total,
            is_valid: self.is_valid,
            error_message: self.error_message,
            metadata: self.metadata,
        }
    }
}
