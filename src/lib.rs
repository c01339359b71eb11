//! `installment_plan` is a Rust library for calculating installment payment plans
//! on retail financing forms.
//!
//! Given a product price, a deposit, a bonus payment amount, an installment count
//! and an interest rate, it works out:
//! - **Split amount**: the part of the price financed in installments, with and
//!   without the amount covered by bonus payments.
//! - **Installment options**: which of the 24/36/48/60 installment plans the
//!   financed amount qualifies for.
//! - **Payment plan**: the first payment, the recurring payment (rounded down to
//!   a multiple of 100) and the payment due at each bonus occurrence.
//!
//! ## Usage
//!
//! Add `installment_plan` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! installment_plan = "0.1.0"
//! rust_decimal = "1.39.0"
//! rust_decimal_macros = "1.39.0"
//! ```
//!
//! Then derive the split state and compute the plan from it:
//!
//! ```rust
//! use installment_plan::{
//!     compute_payment_plan, derive_split_state, PaymentPlanResult, PlanInputs, PlanPolicy,
//! };
//! use rust_decimal_macros::dec;
//!
//! fn main() {
//!     let policy = PlanPolicy::default();
//!     let inputs = PlanInputs {
//!         price: dec!(1_000_000),
//!         deposit: dec!(0),
//!         bonus_amount: dec!(0),
//!         installment_count: 24,
//!         interest_rate_percent: dec!(0),
//!     };
//!
//!     let split = derive_split_state(&inputs, &policy);
//!     println!("Options: {:?}", split.available_installment_options);
//!
//!     match compute_payment_plan(&inputs, &split, &policy) {
//!         PaymentPlanResult::Plan { plan, warning } => {
//!             println!("First Payment: {}", plan.first_payment);
//!             println!("Other Payment: {}", plan.other_payment);
//!             if let Some(warning) = warning {
//!                 println!("Warning: {:?}", warning);
//!             }
//!         }
//!         PaymentPlanResult::Blocked { reason } => eprintln!("Blocked: {:?}", reason),
//!         PaymentPlanResult::MissingPrice => eprintln!("Price is required"),
//!     }
//! }
//! ```
//!
//! For form-style use, where fields arrive as text with thousands separators,
//! see [`FormSession`].

pub mod error;
pub mod form;
pub mod plan;
pub mod policy;
pub mod split;

use rust_decimal::Decimal;

pub use error::{PlanError, PlanResult};
pub use form::{Field, FormSession, FormView, format_amount, parse_amount};
pub use plan::{BlockReason, PaymentPlan, PaymentPlanResult, PlanWarning, compute_payment_plan};
pub use policy::{INSTALLMENT_MENU, PlanPolicy, bonus_occurrences};
pub use split::{PlanInputs, SplitState, available_installment_options, derive_split_state};

/// Money amounts, in the currency's whole units.
pub type Money = Decimal;

/// Interest rates, as percentages.
pub type Rate = Decimal;
