//! # Discount Application
//!
//! Stage 8, the only stage that moves money.
//!
//! ```text
//! remaining = cart.total
//! for code in candidates (submission order):
//!     amount    = rule(code.type)(code, remaining)   ◄── sees remaining AFTER
//!     remaining = remaining - amount                      earlier codes
//! ```
//!
//! $100 with two 10% codes ends at $81, not $80.

use tracing::debug;

use super::{CalculationContext, Next, Stage};
use crate::money::Money;
use crate::types::{DiscountType, PromotionCode};

/// Computes one code's amount against the current remaining amount.
type AmountRule = fn(&PromotionCode, Money) -> Money;

/// Types with an amount rule. Anything not listed contributes zero.
const AMOUNT_RULES: &[(DiscountType, AmountRule)] = &[
    (DiscountType::Percentage, percentage),
    (DiscountType::FixedAmount, fixed_amount),
    (DiscountType::PercentageWithCap, percentage_with_cap),
];

fn percentage(code: &PromotionCode, remaining: Money) -> Money {
    remaining.percentage(code.value.as_bps()).min(remaining)
}

fn fixed_amount(code: &PromotionCode, remaining: Money) -> Money {
    code.value.as_money().min(remaining)
}

/// Percentage clamped to a cap: `conditions.max_discount` when present,
/// otherwise `value` read a second time as money.
fn percentage_with_cap(code: &PromotionCode, remaining: Money) -> Money {
    let cap = code
        .conditions
        .max_discount
        .unwrap_or_else(|| code.value.as_money());
    percentage(code, remaining).min(cap)
}

/// Amount `code` takes off `remaining`, kept within `0..=remaining`.
pub fn discount_amount(code: &PromotionCode, remaining: Money) -> Money {
    let amount = AMOUNT_RULES
        .iter()
        .find(|(t, _)| *t == code.discount_type)
        .map(|(_, rule)| rule(code, remaining))
        .unwrap_or_else(Money::zero);

    amount.max(Money::zero()).min(remaining.max(Money::zero()))
}

/// Applies every candidate in order against the shrinking remainder.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyDiscountCalculation;

impl Stage for ApplyDiscountCalculation {
    fn name(&self) -> &'static str {
        "apply_discount_calculation"
    }

    fn handle<'c>(&self, mut context: CalculationContext<'c>, next: Next<'_>) -> CalculationContext<'c> {
        if context.should_skip() {
            return next.run(context);
        }

        for code in context.discount_codes() {
            let amount = discount_amount(code, context.remaining_amount());
            debug!(
                code = %code.code,
                discount_type = %code.discount_type,
                amount = amount.cents(),
                remaining = context.remaining_amount().cents(),
                "Applying discount"
            );
            context.add_applied_discount(code, amount);
        }

        next.run(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::DiscountValue;
    use crate::pipeline::PipelineRunner;
    use crate::types::{Cart, Customer};
    use chrono::Utc;
    use proptest::prelude::*;
    use rstest::rstest;

    fn code(discount_type: DiscountType, hundredths: i64) -> PromotionCode {
        PromotionCode::new(1, "C", discount_type, DiscountValue::from_hundredths(hundredths))
    }

    fn apply(total: i64, codes: &[PromotionCode]) -> (Money, Money, usize) {
        let cart = Cart::with_total(Money::from_cents(total));
        let customer = Customer::new("1");
        let ctx = PipelineRunner::new(vec![Box::new(ApplyDiscountCalculation)])
            .run(CalculationContext::new(&cart, &customer, codes, Utc::now()));
        (ctx.total_discount(), ctx.final_total(), ctx.applied_discounts().len())
    }

    #[rstest]
    #[case::percentage(DiscountType::Percentage, 2000, 15300, 3060)]
    #[case::fixed(DiscountType::FixedAmount, 1000, 15300, 1000)]
    #[case::fixed_over_total(DiscountType::FixedAmount, 5000, 1500, 1500)]
    #[case::full_percentage(DiscountType::Percentage, 15000, 1000, 1000)]
    #[case::cap_binds(DiscountType::PercentageWithCap, 2000, 15300, 2000)]
    #[case::cap_loose(DiscountType::PercentageWithCap, 2000, 5000, 1000)]
    #[case::unimplemented(DiscountType::Bogo, 2000, 15300, 0)]
    #[case::restriction_only(DiscountType::FirstTimeBuyer, 2000, 15300, 0)]
    fn test_amount_rules(
        #[case] discount_type: DiscountType,
        #[case] value: i64,
        #[case] remaining: i64,
        #[case] expected: i64,
    ) {
        let amount = discount_amount(&code(discount_type, value), Money::from_cents(remaining));
        assert_eq!(amount, Money::from_cents(expected));
    }

    #[test]
    fn test_dedicated_cap_wins_over_value() {
        let mut capped = code(DiscountType::PercentageWithCap, 2000);
        capped.conditions.max_discount = Some(Money::from_cents(500));

        assert_eq!(
            discount_amount(&capped, Money::from_cents(15300)),
            Money::from_cents(500)
        );
    }

    #[test]
    fn test_negative_value_contributes_nothing() {
        let amount = discount_amount(&code(DiscountType::FixedAmount, -500), Money::from_cents(1000));
        assert_eq!(amount, Money::zero());
    }

    #[test]
    fn test_sequential_stacking() {
        let ten = code(DiscountType::Percentage, 1000);
        let (discount, final_total, applied) = apply(10000, &[ten.clone(), ten]);

        assert_eq!(discount, Money::from_cents(1900));
        assert_eq!(final_total, Money::from_cents(8100));
        assert_eq!(applied, 2);
    }

    #[test]
    fn test_zero_amount_codes_are_still_recorded() {
        let (discount, _, applied) = apply(10000, &[code(DiscountType::Shipping, 500)]);
        assert_eq!(discount, Money::zero());
        assert_eq!(applied, 1);
    }

    proptest! {
        #[test]
        fn prop_final_total_never_negative(
            total in 0i64..10_000_000,
            values in proptest::collection::vec((0usize..3, 0i64..20_000), 0..6),
        ) {
            let types = [DiscountType::Percentage, DiscountType::FixedAmount, DiscountType::PercentageWithCap];
            let codes: Vec<_> = values.iter().map(|(t, v)| code(types[*t], *v)).collect();

            let (discount, final_total, _) = apply(total, &codes);

            prop_assert!(final_total >= Money::zero());
            prop_assert!(discount <= Money::from_cents(total));
            prop_assert_eq!(discount + final_total, Money::from_cents(total));
        }
    }
}
