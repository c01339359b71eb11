//! Split amount derivation.
//!
//! Runs on every field change: works out how much of the price is financed,
//! how much of it the bonus payments cover, and which installment counts the
//! financed amount qualifies for.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::policy::{DEFAULT_INSTALLMENT_COUNT, INSTALLMENT_MENU, PlanPolicy, bonus_occurrences};
use crate::{Money, Rate};

/// Current values of the financing form, already parsed to numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanInputs {
    /// Product price. Zero means the field is empty.
    pub price: Money,
    /// Upfront payment.
    pub deposit: Money,
    /// Extra amount paid at each bonus occurrence.
    pub bonus_amount: Money,
    /// Installment count currently selected on the form.
    pub installment_count: u32,
    /// Interest rate as a percentage (e.g., 1.5 for 1.5%), applied per installment.
    pub interest_rate_percent: Rate,
}

impl Default for PlanInputs {
    fn default() -> Self {
        Self {
            price: Decimal::ZERO,
            deposit: Decimal::ZERO,
            bonus_amount: Decimal::ZERO,
            installment_count: DEFAULT_INSTALLMENT_COUNT,
            interest_rate_percent: Decimal::ZERO,
        }
    }
}

/// Derived amounts and installment choices for one set of inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitState {
    /// `price - deposit`, floored at zero.
    pub base_split_amount: Money,
    /// Split amount left for the regular installments once bonuses are taken out.
    pub calc_split_amount: Money,
    /// Bonus amount times the number of bonus occurrences.
    pub total_bonus_deduction: Money,
    /// Installment counts the form may offer. Empty when no price is set.
    pub available_installment_options: Vec<u32>,
    /// Selection after the derivation, always one of the options when any exist.
    pub selected_installment_count: u32,
}

impl SplitState {
    /// State for a form without a price: nothing to split, selection untouched.
    pub fn empty(selected_installment_count: u32) -> Self {
        Self {
            base_split_amount: Decimal::ZERO,
            calc_split_amount: Decimal::ZERO,
            total_bonus_deduction: Decimal::ZERO,
            available_installment_options: Vec::new(),
            selected_installment_count,
        }
    }

    /// True when no price was given and no split amount should be shown.
    pub fn is_empty(&self) -> bool {
        self.available_installment_options.is_empty()
    }
}

/// Derives the split state from the form inputs.
///
/// The bonus deduction uses `inputs.installment_count`, the count selected
/// before this derivation. If that count is no longer offered the selection
/// falls back to the lowest available option.
pub fn derive_split_state(inputs: &PlanInputs, policy: &PlanPolicy) -> SplitState {
    if inputs.price <= Decimal::ZERO {
        return SplitState::empty(inputs.installment_count);
    }

    let deposit = inputs.deposit.max(Decimal::ZERO);
    let bonus_amount = inputs.bonus_amount.max(Decimal::ZERO);

    let base_split_amount = (inputs.price - deposit).max(Decimal::ZERO);
    // Saturates: a bonus total beyond range leaves nothing to split anyway.
    let total_bonus_deduction = bonus_amount
        .checked_mul(Decimal::from(bonus_occurrences(inputs.installment_count)))
        .unwrap_or(Decimal::MAX);
    let calc_split_amount = (base_split_amount - total_bonus_deduction).max(Decimal::ZERO);

    let options = available_installment_options(base_split_amount, calc_split_amount, policy);
    let selected_installment_count = select_installment(&options, inputs.installment_count);

    SplitState {
        base_split_amount,
        calc_split_amount,
        total_bonus_deduction,
        available_installment_options: options,
        selected_installment_count,
    }
}

/// Installment counts allowed for the given split amounts.
///
/// The first branch looks at the amount after bonus deduction, the tier
/// branches at the amount before it. First match wins.
pub fn available_installment_options(
    base_split_amount: Money,
    calc_split_amount: Money,
    policy: &PlanPolicy,
) -> Vec<u32> {
    if calc_split_amount < policy.minimum_split_amount {
        vec![24]
    } else if base_split_amount >= policy.minimum_split_amount
        && base_split_amount < policy.standard_tier_floor
    {
        vec![24]
    } else if base_split_amount >= policy.standard_tier_floor
        && base_split_amount < policy.extended_tier_floor
    {
        INSTALLMENT_MENU[..3].to_vec()
    } else if base_split_amount >= policy.extended_tier_floor {
        INSTALLMENT_MENU.to_vec()
    } else {
        vec![24]
    }
}

fn select_installment(options: &[u32], previous: u32) -> u32 {
    if options.contains(&previous) {
        previous
    } else {
        options.first().copied().unwrap_or(DEFAULT_INSTALLMENT_COUNT)
    }
}
