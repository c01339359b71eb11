//! Payment breakdown for an explicit calculate request.
//!
//! Builds on a [`SplitState`] already derived for the same inputs:
//!
//! ```text
//! total  = calc_split_amount * (1 + rate% * count / 100)
//! other  = floor(total / count / unit) * unit
//! first  = floor(total - other * (count - 1))
//! bonus  = other + bonus_amount            (only when bonus_amount > 0)
//! ```
//!
//! The first installment absorbs whatever the rounding of the recurring
//! installments left over.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Money;
use crate::policy::PlanPolicy;
use crate::split::{PlanInputs, SplitState};

/// Why no payment plan was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    /// The financed amount after bonus deduction is under the minimum.
    AmountTooLow,
    /// The payment amounts do not fit in a `Decimal`.
    AmountOutOfRange,
}

/// Advisory attached to a plan that was still produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanWarning {
    /// Bonus payments cover more than the allowed share of the split amount.
    BonusExceedsHalf,
}

/// Payment amounts of a financing plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPlan {
    /// Installment count the plan was computed for.
    pub installment_count: u32,
    /// Financed amount including interest, before any rounding.
    pub total_payment_with_interest: Money,
    /// First installment, carrying the rounding remainder.
    pub first_payment: Money,
    /// Every installment after the first.
    pub other_payment: Money,
    /// Installment due at a bonus occurrence, when a bonus amount is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus_payment: Option<Money>,
}

/// Outcome of a calculate request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PaymentPlanResult {
    /// No price entered; nothing was computed.
    MissingPrice,
    /// A price is set but no plan can be offered.
    Blocked { reason: BlockReason },
    /// A plan, possibly flagged with a warning.
    Plan {
        plan: PaymentPlan,
        #[serde(skip_serializing_if = "Option::is_none")]
        warning: Option<PlanWarning>,
    },
}

impl PaymentPlanResult {
    /// The plan, if one was produced.
    pub fn plan(&self) -> Option<&PaymentPlan> {
        match self {
            PaymentPlanResult::Plan { plan, .. } => Some(plan),
            _ => None,
        }
    }

    /// The advisory attached to the plan, if any.
    pub fn warning(&self) -> Option<PlanWarning> {
        match self {
            PaymentPlanResult::Plan { warning, .. } => *warning,
            _ => None,
        }
    }
}

/// Computes the payment breakdown for `inputs` given their derived `split`.
///
/// The installment count is taken from `split.selected_installment_count`,
/// which is always one of the counts the split amount allows. A count of zero
/// is treated as a single installment.
pub fn compute_payment_plan(
    inputs: &PlanInputs,
    split: &SplitState,
    policy: &PlanPolicy,
) -> PaymentPlanResult {
    if inputs.price <= Decimal::ZERO {
        return PaymentPlanResult::MissingPrice;
    }

    if split.calc_split_amount < policy.minimum_split_amount {
        return PaymentPlanResult::Blocked {
            reason: BlockReason::AmountTooLow,
        };
    }

    // A ratio large enough to overflow can never be exceeded.
    let warning = split
        .base_split_amount
        .checked_mul(policy.bonus_warning_ratio)
        .is_some_and(|limit| split.total_bonus_deduction > limit)
        .then_some(PlanWarning::BonusExceedsHalf);

    let installment_count = split.selected_installment_count.max(1);
    let Some((total_payment_with_interest, first_payment, other_payment)) =
        installment_amounts(split.calc_split_amount, installment_count, inputs, policy)
    else {
        return PaymentPlanResult::Blocked {
            reason: BlockReason::AmountOutOfRange,
        };
    };

    let bonus_payment = if inputs.bonus_amount > Decimal::ZERO {
        match other_payment.checked_add(inputs.bonus_amount) {
            Some(bonus_payment) => Some(bonus_payment),
            None => {
                return PaymentPlanResult::Blocked {
                    reason: BlockReason::AmountOutOfRange,
                };
            }
        }
    } else {
        None
    };

    PaymentPlanResult::Plan {
        plan: PaymentPlan {
            installment_count,
            total_payment_with_interest,
            first_payment,
            other_payment,
            bonus_payment,
        },
        warning,
    }
}

/// Returns `(total, first, other)`, or `None` if any step overflows.
fn installment_amounts(
    calc_split_amount: Money,
    installment_count: u32,
    inputs: &PlanInputs,
    policy: &PlanPolicy,
) -> Option<(Money, Money, Money)> {
    let count = Decimal::from(installment_count);

    let interest_factor = inputs
        .interest_rate_percent
        .checked_mul(count)?
        .checked_div(Decimal::ONE_HUNDRED)?
        .checked_add(Decimal::ONE)?;
    let total_payment_with_interest = calc_split_amount.checked_mul(interest_factor)?;

    let other_payment = total_payment_with_interest
        .checked_div(count.checked_mul(policy.rounding_unit)?)?
        .floor()
        .checked_mul(policy.rounding_unit)?;
    let first_payment = total_payment_with_interest
        .checked_sub(other_payment.checked_mul(count - Decimal::ONE)?)?
        .floor();

    Some((total_payment_with_interest, first_payment, other_payment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::derive_split_state;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn run(inputs: &PlanInputs) -> (SplitState, PaymentPlanResult) {
        let policy = PlanPolicy::default();
        let split = derive_split_state(inputs, &policy);
        let result = compute_payment_plan(inputs, &split, &policy);
        (split, result)
    }

    #[test]
    fn test_plan_without_interest_or_bonus() {
        let inputs = PlanInputs {
            price: dec!(1_000_000),
            ..PlanInputs::default()
        };

        let (split, result) = run(&inputs);

        assert_eq!(split.available_installment_options, vec![24, 36, 48, 60]);
        let plan = result.plan().unwrap();
        assert_eq!(plan.total_payment_with_interest, dec!(1000000));
        assert_eq!(plan.other_payment, dec!(41600));
        assert_eq!(plan.first_payment, dec!(43200));
        assert_eq!(plan.bonus_payment, None);
        assert_eq!(result.warning(), None);
    }

    #[test]
    fn test_low_amount_is_blocked() {
        let inputs = PlanInputs {
            price: dec!(200_000),
            ..PlanInputs::default()
        };

        let (split, result) = run(&inputs);

        assert_eq!(split.available_installment_options, vec![24]);
        assert_eq!(
            result,
            PaymentPlanResult::Blocked {
                reason: BlockReason::AmountTooLow
            }
        );
        assert!(result.plan().is_none());
    }

    #[test]
    fn test_moderate_bonus_has_no_warning() {
        let inputs = PlanInputs {
            price: dec!(600_000),
            bonus_amount: dec!(50_000),
            ..PlanInputs::default()
        };

        let (split, result) = run(&inputs);

        assert_eq!(split.total_bonus_deduction, dec!(200000));
        assert_eq!(split.calc_split_amount, dec!(400000));
        assert_eq!(result.warning(), None);

        let plan = result.plan().unwrap();
        // 400,000 / 24 = 16,666.67 -> 16,600; 400,000 - 16,600 * 23 = 18,200
        assert_eq!(plan.other_payment, dec!(16600));
        assert_eq!(plan.first_payment, dec!(18200));
        assert_eq!(plan.bonus_payment, Some(dec!(66600)));
    }

    #[test]
    fn test_bonus_beyond_split_is_blocked() {
        let inputs = PlanInputs {
            price: dec!(600_000),
            bonus_amount: dec!(200_000),
            ..PlanInputs::default()
        };

        let (split, result) = run(&inputs);

        assert_eq!(split.calc_split_amount, dec!(0));
        assert_eq!(
            result,
            PaymentPlanResult::Blocked {
                reason: BlockReason::AmountTooLow
            }
        );
    }

    #[test]
    fn test_heavy_bonus_warns_but_still_plans() {
        // 1,000,000 split, 4 bonuses of 150,000 = 600,000 > 500,000
        let inputs = PlanInputs {
            price: dec!(1_000_000),
            bonus_amount: dec!(150_000),
            ..PlanInputs::default()
        };

        let (split, result) = run(&inputs);

        assert_eq!(split.calc_split_amount, dec!(400000));
        assert_eq!(result.warning(), Some(PlanWarning::BonusExceedsHalf));
        let plan = result.plan().unwrap();
        assert_eq!(plan.other_payment, dec!(16600));
        assert_eq!(plan.bonus_payment, Some(dec!(166600)));
    }

    #[test]
    fn test_bonus_exactly_half_does_not_warn() {
        // 4 bonuses of 125,000 = 500,000 = half of 1,000,000
        let inputs = PlanInputs {
            price: dec!(1_000_000),
            bonus_amount: dec!(125_000),
            ..PlanInputs::default()
        };

        let (_, result) = run(&inputs);

        assert!(result.plan().is_some());
        assert_eq!(result.warning(), None);
    }

    #[test]
    fn test_missing_price() {
        let inputs = PlanInputs {
            deposit: dec!(100_000),
            ..PlanInputs::default()
        };

        let (split, result) = run(&inputs);

        assert!(split.is_empty());
        assert_eq!(result, PaymentPlanResult::MissingPrice);
    }

    #[test]
    fn test_interest_is_applied_per_installment() {
        // 1,000,000 * (1 + 1.5 * 36 / 100) = 1,540,000
        let inputs = PlanInputs {
            price: dec!(1_000_000),
            installment_count: 36,
            interest_rate_percent: dec!(1.5),
            ..PlanInputs::default()
        };

        let (_, result) = run(&inputs);
        let plan = result.plan().unwrap();

        assert_eq!(plan.installment_count, 36);
        assert_eq!(plan.total_payment_with_interest, dec!(1540000));
        // 1,540,000 / 36 = 42,777.78 -> 42,700; 1,540,000 - 42,700 * 35 = 45,500
        assert_eq!(plan.other_payment, dec!(42700));
        assert_eq!(plan.first_payment, dec!(45500));
    }

    #[test]
    fn test_plan_uses_selection_after_derivation() {
        // 60 is not offered for 700,000, so the plan runs on 24.
        let inputs = PlanInputs {
            price: dec!(700_000),
            installment_count: 60,
            ..PlanInputs::default()
        };

        let (split, result) = run(&inputs);

        assert_eq!(split.selected_installment_count, 24);
        assert_eq!(result.plan().unwrap().installment_count, 24);
    }

    #[test]
    fn test_zero_count_is_treated_as_one() {
        let policy = PlanPolicy::default();
        let inputs = PlanInputs {
            price: dec!(500_000),
            ..PlanInputs::default()
        };
        let split = SplitState {
            base_split_amount: dec!(500_000),
            calc_split_amount: dec!(500_000),
            total_bonus_deduction: dec!(0),
            available_installment_options: vec![24],
            selected_installment_count: 0,
        };

        let result = compute_payment_plan(&inputs, &split, &policy);
        let plan = result.plan().unwrap();

        assert_eq!(plan.installment_count, 1);
        assert_eq!(plan.other_payment, dec!(500000));
        assert_eq!(plan.first_payment, dec!(500000));
    }

    #[rstest]
    #[case(dec!(1_000_000), dec!(0), dec!(0), 24, dec!(0))]
    #[case(dec!(1_234_567), dec!(34_567), dec!(0), 60, dec!(0.9))]
    #[case(dec!(987_654), dec!(0), dec!(12_345), 48, dec!(2.25))]
    #[case(dec!(750_001), dec!(1), dec!(0), 36, dec!(1))]
    #[case(dec!(5_555_555.55), dec!(0), dec!(0), 60, dec!(0.33))]
    fn test_plan_reconstructs_total(
        #[case] price: Decimal,
        #[case] deposit: Decimal,
        #[case] bonus: Decimal,
        #[case] count: u32,
        #[case] rate: Decimal,
    ) {
        let inputs = PlanInputs {
            price,
            deposit,
            bonus_amount: bonus,
            installment_count: count,
            interest_rate_percent: rate,
        };

        let (_, result) = run(&inputs);
        let plan = result.plan().unwrap();
        let n = Decimal::from(plan.installment_count);
        let floored_total = plan.total_payment_with_interest.floor();

        assert_eq!(plan.installment_count, count);
        assert_eq!(plan.other_payment % dec!(100), dec!(0));
        assert_eq!(
            plan.first_payment + plan.other_payment * (n - dec!(1)),
            floored_total
        );
        assert!(plan.first_payment >= plan.other_payment);
        assert!(plan.first_payment - plan.other_payment < n * dec!(100));
    }

    #[test]
    fn test_total_beyond_range_is_blocked() {
        // 70,000,000,000,000,000,000,000,000,000 * 4.6 leaves Decimal range.
        let inputs = PlanInputs {
            price: dec!(70_000_000_000_000_000_000_000_000_000),
            interest_rate_percent: dec!(15),
            ..PlanInputs::default()
        };

        let (split, result) = run(&inputs);

        assert_eq!(split.available_installment_options, vec![24, 36, 48, 60]);
        assert_eq!(
            result,
            PaymentPlanResult::Blocked {
                reason: BlockReason::AmountOutOfRange
            }
        );
    }

    #[test]
    fn test_largest_amount_without_interest_still_plans() {
        let inputs = PlanInputs {
            price: Decimal::MAX,
            ..PlanInputs::default()
        };

        let (_, result) = run(&inputs);
        let plan = result.plan().unwrap();

        assert_eq!(plan.total_payment_with_interest, Decimal::MAX);
        assert_eq!(plan.other_payment % dec!(100), dec!(0));
        assert_eq!(
            plan.first_payment + plan.other_payment * dec!(23),
            Decimal::MAX.floor()
        );
    }

    #[test]
    fn test_huge_rate_is_blocked() {
        let inputs = PlanInputs {
            price: dec!(1_000_000),
            interest_rate_percent: Decimal::MAX,
            ..PlanInputs::default()
        };

        let (_, result) = run(&inputs);

        assert_eq!(
            result,
            PaymentPlanResult::Blocked {
                reason: BlockReason::AmountOutOfRange
            }
        );
    }

    #[test]
    fn test_huge_warning_ratio_never_warns() {
        let policy = PlanPolicy {
            bonus_warning_ratio: Decimal::MAX,
            ..PlanPolicy::default()
        };
        let inputs = PlanInputs {
            price: dec!(1_000_000),
            bonus_amount: dec!(150_000),
            ..PlanInputs::default()
        };
        let split = derive_split_state(&inputs, &policy);

        let result = compute_payment_plan(&inputs, &split, &policy);

        assert!(result.plan().is_some());
        assert_eq!(result.warning(), None);
    }

    #[test]
    fn test_result_serialization_tags() {
        let blocked = PaymentPlanResult::Blocked {
            reason: BlockReason::AmountTooLow,
        };
        let json = serde_json::to_value(&blocked).unwrap();
        assert_eq!(json["status"], "blocked");
        assert_eq!(json["reason"], "amount_too_low");

        let missing = serde_json::to_value(PaymentPlanResult::MissingPrice).unwrap();
        assert_eq!(missing["status"], "missing_price");
    }
}
