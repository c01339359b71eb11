//! Stateful shell around the calculation core.
//!
//! [`FormSession`] plays the part of the financing form: it keeps the raw
//! text of each field, the rendered installment list and the current
//! selection, and turns every trigger (field changed, calculate, clear) into
//! a call to the pure core followed by a fresh [`FormView`].

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{PlanError, PlanResult};
use crate::plan::{BlockReason, PaymentPlan, PaymentPlanResult, PlanWarning, compute_payment_plan};
use crate::policy::{DEFAULT_INSTALLMENT_COUNT, PlanPolicy};
use crate::split::{PlanInputs, SplitState, derive_split_state};
use crate::{Money, Rate};

/// Shown when a calculation is requested without a price.
pub const MISSING_PRICE_NOTICE: &str = "Please enter the product price.";
/// Shown next to a plan whose bonus payments exceed the warning ratio.
pub const BONUS_EXCEEDS_HALF_WARNING: &str = "Bonus payments exceed half of the split amount.";
/// Shown when the payment amounts are too large to compute.
pub const AMOUNT_OUT_OF_RANGE_WARNING: &str = "Amounts are too large to calculate a plan.";

/// Text inputs of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Product price.
    Price,
    /// Upfront payment.
    Deposit,
    /// Amount paid at each bonus occurrence.
    BonusAmount,
}

/// Everything the form displays after a trigger.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormView {
    /// Formatted split amount, empty when no price is set.
    pub split_amount: String,
    /// Installment counts rendered in the selector.
    pub installment_options: Vec<u32>,
    /// Installment count currently selected.
    pub selected_installment: u32,
    /// Formatted first installment.
    pub first_payment: String,
    /// Formatted recurring installment.
    pub other_payment: String,
    /// Formatted installment due at a bonus occurrence, empty when none.
    pub bonus_payment: String,
    /// Advisory or blocking message from the last calculation.
    pub warning: String,
    /// Required-field notice, shown instead of calculating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    /// Whether the first payment is shown highlighted.
    pub highlight_first_payment: bool,
    /// Whether the recurring payment is shown highlighted.
    pub highlight_other_payment: bool,
    /// Whether the bonus payment is shown highlighted.
    pub highlight_bonus_payment: bool,
}

impl FormView {
    fn cleared() -> Self {
        Self {
            installment_options: vec![DEFAULT_INSTALLMENT_COUNT],
            selected_installment: DEFAULT_INSTALLMENT_COUNT,
            ..Self::default()
        }
    }

    fn clear_payments(&mut self) {
        self.first_payment.clear();
        self.other_payment.clear();
        self.bonus_payment.clear();
        self.highlight_first_payment = false;
        self.highlight_other_payment = false;
        self.highlight_bonus_payment = false;
    }

    fn show_plan(&mut self, plan: &PaymentPlan) {
        self.first_payment = format_amount(plan.first_payment);
        self.other_payment = format_amount(plan.other_payment);
        self.highlight_first_payment = true;
        self.highlight_other_payment = true;

        match plan.bonus_payment {
            Some(bonus_payment) => {
                self.bonus_payment = format_amount(bonus_payment);
                self.highlight_bonus_payment = true;
            }
            None => {
                self.bonus_payment.clear();
                self.highlight_bonus_payment = false;
            }
        }
    }
}

/// One financing form and the state carried between its triggers.
#[derive(Debug, Clone)]
pub struct FormSession {
    policy: PlanPolicy,
    price: String,
    deposit: String,
    bonus_amount: String,
    interest_rate_percent: Rate,
    view: FormView,
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new(PlanPolicy::default())
    }
}

impl FormSession {
    /// Creates a cleared form using `policy`.
    pub fn new(policy: PlanPolicy) -> Self {
        Self {
            policy,
            price: String::new(),
            deposit: String::new(),
            bonus_amount: String::new(),
            interest_rate_percent: Decimal::ZERO,
            view: FormView::cleared(),
        }
    }

    /// Thresholds the form calculates with.
    pub fn policy(&self) -> &PlanPolicy {
        &self.policy
    }

    /// What the form currently displays.
    pub fn view(&self) -> &FormView {
        &self.view
    }

    /// Numeric inputs as the core sees them right now.
    pub fn inputs(&self) -> PlanInputs {
        PlanInputs {
            price: parse_amount(&self.price),
            deposit: parse_amount(&self.deposit),
            bonus_amount: parse_amount(&self.bonus_amount),
            installment_count: self.view.selected_installment,
            interest_rate_percent: self.interest_rate_percent,
        }
    }

    /// Price field changed.
    pub fn set_price(&mut self, text: &str) -> &FormView {
        self.set_field(Field::Price, text)
    }

    /// Deposit field changed.
    pub fn set_deposit(&mut self, text: &str) -> &FormView {
        self.set_field(Field::Deposit, text)
    }

    /// Bonus amount field changed.
    pub fn set_bonus_amount(&mut self, text: &str) -> &FormView {
        self.set_field(Field::BonusAmount, text)
    }

    /// Stores the raw text of a field and re-derives the split state.
    pub fn set_field(&mut self, field: Field, text: &str) -> &FormView {
        let slot = match field {
            Field::Price => &mut self.price,
            Field::Deposit => &mut self.deposit,
            Field::BonusAmount => &mut self.bonus_amount,
        };
        *slot = text.to_string();
        debug!(?field, text, "field changed");

        self.refresh_split();
        &self.view
    }

    /// Changes the installment selection.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidField`] if `count` is not in the list
    /// currently offered.
    pub fn select_installment(&mut self, count: u32) -> PlanResult<&FormView> {
        if !self.view.installment_options.contains(&count) {
            return Err(PlanError::InvalidField {
                field: "installment".to_string(),
                reason: format!(
                    "{} is not offered (available: {:?})",
                    count, self.view.installment_options
                ),
            });
        }
        self.view.selected_installment = count;
        debug!(count, "installment selected");

        self.refresh_split();
        Ok(&self.view)
    }

    /// Changes the interest rate selector. Negative rates count as 0%.
    pub fn select_interest_rate(&mut self, rate: Rate) -> &FormView {
        self.interest_rate_percent = rate.max(Decimal::ZERO);
        debug!(rate = %self.interest_rate_percent, "interest rate selected");

        self.refresh_split();
        &self.view
    }

    /// Runs the full calculation and renders its outcome.
    pub fn calculate(&mut self) -> &FormView {
        let inputs = self.inputs();
        if inputs.price <= Decimal::ZERO {
            warn!("calculation requested without a price");
            self.view.notice = Some(MISSING_PRICE_NOTICE.to_string());
            return &self.view;
        }

        let split = self.refresh_split();
        let result = compute_payment_plan(&inputs, &split, &self.policy);

        match result {
            PaymentPlanResult::MissingPrice => {
                self.view.notice = Some(MISSING_PRICE_NOTICE.to_string());
            }
            PaymentPlanResult::Blocked { reason } => {
                warn!(
                    ?reason,
                    calc_split_amount = %split.calc_split_amount,
                    "payment plan blocked"
                );
                self.view.warning = match reason {
                    BlockReason::AmountTooLow => amount_too_low_warning(&self.policy),
                    BlockReason::AmountOutOfRange => AMOUNT_OUT_OF_RANGE_WARNING.to_string(),
                };
                self.view.clear_payments();
            }
            PaymentPlanResult::Plan { plan, warning } => {
                info!(
                    installment_count = plan.installment_count,
                    first_payment = %plan.first_payment,
                    other_payment = %plan.other_payment,
                    "payment plan computed"
                );
                self.view.warning = match warning {
                    Some(PlanWarning::BonusExceedsHalf) => {
                        warn!(
                            total_bonus_deduction = %split.total_bonus_deduction,
                            base_split_amount = %split.base_split_amount,
                            "bonus exceeds half of split amount"
                        );
                        BONUS_EXCEEDS_HALF_WARNING.to_string()
                    }
                    None => String::new(),
                };
                self.view.show_plan(&plan);
            }
        }

        &self.view
    }

    /// Resets every field, the installment list and all messages.
    pub fn clear(&mut self) -> &FormView {
        self.price.clear();
        self.deposit.clear();
        self.bonus_amount.clear();
        self.interest_rate_percent = Decimal::ZERO;
        self.view = FormView::cleared();
        debug!("form cleared");

        &self.view
    }

    // Reads the carried selection, derives, and writes the selection back.
    fn refresh_split(&mut self) -> SplitState {
        let split = derive_split_state(&self.inputs(), &self.policy);
        self.view.notice = None;

        if split.is_empty() {
            // Without a price the rendered list stays as it was.
            self.view.split_amount.clear();
        } else {
            self.view.split_amount = format_amount(split.base_split_amount);
            self.view.installment_options = split.available_installment_options.clone();
            self.view.selected_installment = split.selected_installment_count;
        }

        debug!(
            base_split_amount = %split.base_split_amount,
            calc_split_amount = %split.calc_split_amount,
            selected = split.selected_installment_count,
            "split state derived"
        );
        split
    }
}

fn amount_too_low_warning(policy: &PlanPolicy) -> String {
    format!(
        "Split amount is below {}. Only 24 installments are available.",
        format_amount(policy.minimum_split_amount)
    )
}

/// Reads a form amount, ignoring thousands separators and whitespace.
///
/// Empty or unreadable text reads as zero, and so do negative numbers.
/// Numbers too large for a `Decimal` read as [`Decimal::MAX`].
pub fn parse_amount(text: &str) -> Money {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Decimal::ZERO;
    }

    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .or_else(|_| cleaned.parse::<f64>().map(saturate))
        .unwrap_or(Decimal::ZERO)
        .max(Decimal::ZERO)
}

// Only reached for text `Decimal` rejects, so a finite number of at least one
// is beyond range and anything smaller is below its precision.
fn saturate(value: f64) -> Decimal {
    if value.is_finite() && value >= 1.0 {
        Decimal::MAX
    } else {
        Decimal::ZERO
    }
}

/// Formats an amount with `,` thousands separators and at most three
/// fractional digits.
pub fn format_amount(amount: Money) -> String {
    let rounded = amount.round_dp(3).normalize();
    let text = rounded.abs().to_string();
    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        grouped.push('-');
    }
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    grouped
}
