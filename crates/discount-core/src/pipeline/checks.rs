//! # Validation Stages
//!
//! Stages 1–7. Each walks the candidates in submission order and stops at
//! the first code that violates its rule; only that one message surfaces.
//!
//! | # | Stage                     | Rejects when                                  |
//! |---|---------------------------|-----------------------------------------------|
//! | 1 | `ValidateDiscountCode`    | code unknown, or derived status ≠ active       |
//! | 2 | `CheckExpiryDate`         | not started yet, or past `expires_at`          |
//! | 3 | `ValidateUsageLimit`      | limit set and `usage_count >= usage_limit`     |
//! | 4 | `CheckMinimumBasketValue` | `cart.total` below `minimum_basket_value`      |
//! | 5 | `CheckSpecificUser`       | `specific_user` and customer not allowed       |
//! | 6 | `CheckSpecificGroup`      | `specific_group` and no allowed group matches  |
//! | 7 | `CheckFirstTimeBuyer`     | `first_time_buyer` and customer is returning   |

use tracing::debug;

use super::{CalculationContext, Next, Stage};
use crate::types::{DiscountType, PromotionCode};

/// Timestamp format used in window messages.
const MESSAGE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Shared body of the validation stages: skip when already invalid, else
/// find the first violating candidate and either short-circuit or continue.
fn check_each<'c, F>(
    stage: &'static str,
    mut context: CalculationContext<'c>,
    next: Next<'_>,
    violation: F,
) -> CalculationContext<'c>
where
    F: Fn(&PromotionCode, &CalculationContext<'c>) -> Option<String>,
{
    if context.should_skip() {
        return next.run(context);
    }

    let found = context
        .discount_codes()
        .iter()
        .find_map(|code| violation(code, &context).map(|message| (code, message)));

    match found {
        Some((code, message)) => {
            debug!(stage, code = %code.code, reason = %message, "Stage rejected code");
            context.set_invalid(message);
            context
        }
        None => next.run(context),
    }
}

// =============================================================================
// 1. Code Validity
// =============================================================================

/// Rejects unknown codes and codes whose derived status is not `active`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateDiscountCode;

impl Stage for ValidateDiscountCode {
    fn name(&self) -> &'static str {
        "validate_discount_code"
    }

    fn handle<'c>(&self, mut context: CalculationContext<'c>, next: Next<'_>) -> CalculationContext<'c> {
        if context.should_skip() {
            return next.run(context);
        }

        if let Some(unknown) = context.unresolved_codes().first() {
            debug!(stage = self.name(), code = %unknown, "Submitted code not found");
            context.set_invalid(format!("Discount code '{}' was not found.", unknown));
            return context;
        }

        check_each(self.name(), context, next, |code, ctx| {
            let status = code.status_at(ctx.now());
            (!code.is_valid_at(ctx.now())).then(|| {
                format!(
                    "Discount code '{}' is not valid: it {}.",
                    code.code,
                    status.describe()
                )
            })
        })
    }
}

// =============================================================================
// 2. Expiry Window
// =============================================================================

/// Rejects codes outside their activation window.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckExpiryDate;

impl Stage for CheckExpiryDate {
    fn name(&self) -> &'static str {
        "check_expiry_date"
    }

    fn handle<'c>(&self, context: CalculationContext<'c>, next: Next<'_>) -> CalculationContext<'c> {
        check_each(self.name(), context, next, |code, ctx| {
            let now = ctx.now();
            if let Some(starts_at) = code.starts_at.filter(|_| code.is_scheduled_at(now)) {
                return Some(format!(
                    "Discount code '{}' is scheduled to start at {}.",
                    code.code,
                    starts_at.format(MESSAGE_TIME_FORMAT)
                ));
            }
            if let Some(expires_at) = code.expires_at.filter(|_| code.is_expired_at(now)) {
                return Some(format!(
                    "Discount code '{}' has expired on {}.",
                    code.code,
                    expires_at.format(MESSAGE_TIME_FORMAT)
                ));
            }
            None
        })
    }
}

// =============================================================================
// 3. Usage Limit
// =============================================================================

/// Rejects codes that have used up their redemptions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateUsageLimit;

impl Stage for ValidateUsageLimit {
    fn name(&self) -> &'static str {
        "validate_usage_limit"
    }

    fn handle<'c>(&self, context: CalculationContext<'c>, next: Next<'_>) -> CalculationContext<'c> {
        check_each(self.name(), context, next, |code, _| {
            code.effective_usage_limit()
                .filter(|limit| code.usage_count >= *limit)
                .map(|limit| {
                    format!(
                        "Discount code '{}' has reached its usage limit of {}.",
                        code.code, limit
                    )
                })
        })
    }
}

// =============================================================================
// 4. Minimum Basket
// =============================================================================

/// Rejects codes whose minimum basket value exceeds the cart total.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckMinimumBasketValue;

impl Stage for CheckMinimumBasketValue {
    fn name(&self) -> &'static str {
        "check_minimum_basket_value"
    }

    fn handle<'c>(&self, context: CalculationContext<'c>, next: Next<'_>) -> CalculationContext<'c> {
        check_each(self.name(), context, next, |code, ctx| {
            code.effective_minimum_basket()
                .filter(|minimum| ctx.cart().total < *minimum)
                .map(|minimum| {
                    format!(
                        "Discount code '{}' requires a minimum basket value of {}.",
                        code.code, minimum
                    )
                })
        })
    }
}

// =============================================================================
// 5–7. Customer Restrictions
// =============================================================================

/// Rejects `specific_user` codes for customers not in `allowed_users`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckSpecificUser;

impl Stage for CheckSpecificUser {
    fn name(&self) -> &'static str {
        "check_specific_user"
    }

    fn handle<'c>(&self, context: CalculationContext<'c>, next: Next<'_>) -> CalculationContext<'c> {
        check_each(self.name(), context, next, |code, ctx| {
            let restricted = code.discount_type == DiscountType::SpecificUser;
            (restricted && !code.conditions.allows_user(&ctx.customer().id))
                .then(|| format!("Discount code '{}' is not valid for this user.", code.code))
        })
    }
}

/// Rejects `specific_group` codes when none of the customer's groups is allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckSpecificGroup;

impl Stage for CheckSpecificGroup {
    fn name(&self) -> &'static str {
        "check_specific_group"
    }

    fn handle<'c>(&self, context: CalculationContext<'c>, next: Next<'_>) -> CalculationContext<'c> {
        check_each(self.name(), context, next, |code, ctx| {
            let restricted = code.discount_type == DiscountType::SpecificGroup;
            (restricted && !code.conditions.allows_any_group(&ctx.customer().groups)).then(|| {
                format!(
                    "Discount code '{}' is not valid for your user group.",
                    code.code
                )
            })
        })
    }
}

/// Rejects `first_time_buyer` codes for returning customers.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckFirstTimeBuyer;

impl Stage for CheckFirstTimeBuyer {
    fn name(&self) -> &'static str {
        "check_first_time_buyer"
    }

    fn handle<'c>(&self, context: CalculationContext<'c>, next: Next<'_>) -> CalculationContext<'c> {
        check_each(self.name(), context, next, |code, ctx| {
            let restricted = code.discount_type == DiscountType::FirstTimeBuyer;
            (restricted && !ctx.customer().is_first_time_buyer).then(|| {
                format!(
                    "Discount code '{}' is only valid for first-time buyers.",
                    code.code
                )
            })
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::{DiscountValue, Money};
    use crate::pipeline::PipelineRunner;
    use crate::types::{Cart, Customer, ExternalId};
    use chrono::{Duration, TimeZone, Utc};
    use rstest::rstest;

    fn code(name: &str, discount_type: DiscountType) -> PromotionCode {
        PromotionCode::new(1, name, discount_type, DiscountValue::from_whole(10))
    }

    /// Runs a single stage over `codes` and returns (is_valid, message).
    fn run_stage(
        stage: impl Stage + 'static,
        codes: &[PromotionCode],
        cart: &Cart,
        customer: &Customer,
    ) -> (bool, Option<String>) {
        let runner = PipelineRunner::new(vec![Box::new(stage)]);
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        let ctx = runner.run(CalculationContext::new(cart, customer, codes, now));
        (ctx.is_valid(), ctx.error_message().map(str::to_string))
    }

    fn cart() -> Cart {
        Cart::with_total(Money::from_cents(15300))
    }

    #[test]
    fn test_validity_reports_unknown_code_first() {
        let cart = cart();
        let customer = Customer::new("1");
        let unresolved = vec!["NOPE".to_string()];
        let codes = [code("OK", DiscountType::Percentage)];
        let ctx = CalculationContext::new(&cart, &customer, &codes, Utc::now())
            .with_unresolved_codes(&unresolved);

        let ctx = PipelineRunner::new(vec![Box::new(ValidateDiscountCode)]).run(ctx);

        assert_eq!(ctx.error_message(), Some("Discount code 'NOPE' was not found."));
    }

    #[rstest]
    #[case::inactive(false, None, "is not valid: it is inactive")]
    #[case::expired(true, Some(-1), "is not valid: it has expired")]
    #[case::scheduled(true, Some(1), "is not valid: it has not started yet")]
    fn test_validity_names_status(
        #[case] active: bool,
        #[case] window_days: Option<i64>,
        #[case] expected: &str,
    ) {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        let mut c = code("SUMMER", DiscountType::Percentage);
        c.is_active = active;
        match window_days {
            Some(d) if d < 0 => c.expires_at = Some(now + Duration::days(d)),
            Some(d) => c.starts_at = Some(now + Duration::days(d)),
            None => {}
        }

        let (valid, message) = run_stage(ValidateDiscountCode, &[c], &cart(), &Customer::new("1"));

        assert!(!valid);
        assert!(message.unwrap().contains(expected));
    }

    #[test]
    fn test_validity_reports_depleted_as_usage_limit() {
        let mut c = code("LIMITED", DiscountType::Percentage);
        c.usage_limit = Some(1);
        c.usage_count = 1;

        let (valid, message) = run_stage(ValidateDiscountCode, &[c], &cart(), &Customer::new("1"));

        assert!(!valid);
        assert!(message.unwrap().contains("usage limit"));
    }

    #[test]
    fn test_expiry_messages() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();

        let mut expired = code("OLD", DiscountType::Percentage);
        expired.expires_at = Some(now - Duration::days(1));
        let (valid, message) = run_stage(CheckExpiryDate, &[expired], &cart(), &Customer::new("1"));
        assert!(!valid);
        assert_eq!(
            message.as_deref(),
            Some("Discount code 'OLD' has expired on 2026-05-31 12:00:00.")
        );

        let mut future = code("SOON", DiscountType::Percentage);
        future.starts_at = Some(now + Duration::hours(1));
        let (valid, message) = run_stage(CheckExpiryDate, &[future], &cart(), &Customer::new("1"));
        assert!(!valid);
        assert_eq!(
            message.as_deref(),
            Some("Discount code 'SOON' is scheduled to start at 2026-06-01 13:00:00.")
        );
    }

    #[test]
    fn test_usage_limit_message() {
        let mut c = code("LIMITED", DiscountType::Percentage);
        c.usage_limit = Some(100);
        c.usage_count = 100;

        let (valid, message) = run_stage(ValidateUsageLimit, &[c], &cart(), &Customer::new("1"));

        assert!(!valid);
        assert_eq!(
            message.as_deref(),
            Some("Discount code 'LIMITED' has reached its usage limit of 100.")
        );
    }

    #[rstest]
    #[case(20000, false)]
    #[case(15300, true)]
    #[case(0, true)]
    fn test_minimum_basket(#[case] minimum_cents: i64, #[case] expect_valid: bool) {
        let mut c = code("BIGSPEND", DiscountType::Percentage);
        c.minimum_basket_value = Some(Money::from_cents(minimum_cents));

        let (valid, message) = run_stage(CheckMinimumBasketValue, &[c], &cart(), &Customer::new("1"));

        assert_eq!(valid, expect_valid);
        if !expect_valid {
            assert!(message.unwrap().contains("requires a minimum basket value of $200.00"));
        }
    }

    #[test]
    fn test_specific_user() {
        let mut c = code("USER123", DiscountType::SpecificUser);
        c.conditions.allowed_users = vec![ExternalId::from("123")];

        let (valid, message) = run_stage(CheckSpecificUser, &[c.clone()], &cart(), &Customer::new("456"));
        assert!(!valid);
        assert!(message.unwrap().contains("not valid for this user"));

        let (valid, _) = run_stage(CheckSpecificUser, &[c], &cart(), &Customer::new("123"));
        assert!(valid);
    }

    #[test]
    fn test_specific_group() {
        let mut c = code("VIPONLY", DiscountType::SpecificGroup);
        c.conditions.allowed_groups = vec!["vip".to_string()];

        let standard = Customer::new("1").with_groups(["standard"]);
        let (valid, message) = run_stage(CheckSpecificGroup, &[c.clone()], &cart(), &standard);
        assert!(!valid);
        assert!(message.unwrap().contains("not valid for your user group"));

        let vip = Customer::new("1").with_groups(["standard", "vip"]);
        let (valid, _) = run_stage(CheckSpecificGroup, &[c], &cart(), &vip);
        assert!(valid);
    }

    #[test]
    fn test_first_time_buyer() {
        let c = code("WELCOME", DiscountType::FirstTimeBuyer);

        let (valid, message) = run_stage(CheckFirstTimeBuyer, &[c.clone()], &cart(), &Customer::new("1"));
        assert!(!valid);
        assert!(message.unwrap().contains("only valid for first-time buyers"));

        let newcomer = Customer::new("1").first_time_buyer();
        let (valid, _) = run_stage(CheckFirstTimeBuyer, &[c], &cart(), &newcomer);
        assert!(valid);
    }

    #[test]
    fn test_restriction_stages_ignore_other_types() {
        let c = code("PLAIN", DiscountType::Percentage);
        let customer = Customer::new("999");

        assert!(run_stage(CheckSpecificUser, &[c.clone()], &cart(), &customer).0);
        assert!(run_stage(CheckSpecificGroup, &[c.clone()], &cart(), &customer).0);
        assert!(run_stage(CheckFirstTimeBuyer, &[c], &cart(), &customer).0);
    }

    #[test]
    fn test_first_violating_candidate_wins() {
        let mut a = code("A", DiscountType::Percentage);
        a.minimum_basket_value = Some(Money::from_cents(50000));
        let mut b = code("B", DiscountType::Percentage);
        b.minimum_basket_value = Some(Money::from_cents(90000));

        let (_, message) = run_stage(CheckMinimumBasketValue, &[a, b], &cart(), &Customer::new("1"));

        assert!(message.unwrap().starts_with("Discount code 'A'"));
    }

    #[test]
    fn test_invalid_context_is_forwarded_untouched() {
        let cart = cart();
        let customer = Customer::new("1");
        let c = code("WELCOME", DiscountType::FirstTimeBuyer);
        let codes = [c];
        let mut ctx = CalculationContext::new(&cart, &customer, &codes, Utc::now());
        ctx.set_invalid("earlier failure");

        let ctx = PipelineRunner::new(vec![Box::new(CheckFirstTimeBuyer)]).run(ctx);

        assert_eq!(ctx.error_message(), Some("earlier failure"));
    }
}
