//! Threshold configuration for installment eligibility and rounding.
//!
//! The defaults are the figures used by the retail financing form. A policy
//! can be loaded from TOML; any field left out keeps its default:
//!
//! ```toml
//! minimum_split_amount = "300000"
//! standard_tier_floor = "500000"
//! extended_tier_floor = "1000000"
//! bonus_warning_ratio = "0.5"
//! rounding_unit = "100"
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::Money;
use crate::error::{PlanError, PlanResult};

/// Installment counts offered by the form, in ascending order.
pub const INSTALLMENT_MENU: [u32; 4] = [24, 36, 48, 60];

/// Installment count selected when nothing else applies.
pub const DEFAULT_INSTALLMENT_COUNT: u32 = 24;

/// Number of bonus payments falling inside a plan of `installment_count`
/// months (two bonus seasons per year). Counts outside the menu have none.
pub fn bonus_occurrences(installment_count: u32) -> u32 {
    match installment_count {
        24 => 4,
        36 => 6,
        48 => 8,
        60 => 10,
        _ => 0,
    }
}

/// Thresholds driving which installment counts are offered and how the
/// recurring payment is rounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanPolicy {
    /// Below this financed amount no plan is produced and only 24 is offered.
    pub minimum_split_amount: Money,
    /// From this split amount 36 and 48 installments become available.
    pub standard_tier_floor: Money,
    /// From this split amount 60 installments become available.
    pub extended_tier_floor: Money,
    /// Share of the split amount the bonus total may reach before warning.
    pub bonus_warning_ratio: Decimal,
    /// Recurring payments are rounded down to a multiple of this.
    pub rounding_unit: Money,
}

impl Default for PlanPolicy {
    fn default() -> Self {
        Self {
            minimum_split_amount: dec!(300_000),
            standard_tier_floor: dec!(500_000),
            extended_tier_floor: dec!(1_000_000),
            bonus_warning_ratio: dec!(0.5),
            rounding_unit: dec!(100),
        }
    }
}

impl PlanPolicy {
    /// Parses and validates a policy from TOML text.
    pub fn from_toml_str(content: &str) -> PlanResult<Self> {
        let policy: PlanPolicy = toml::from_str(content)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Reads a policy file.
    pub fn load(path: impl AsRef<Path>) -> PlanResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| PlanError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Checks that the tiers ascend and the rounding unit is usable.
    pub fn validate(&self) -> PlanResult<()> {
        if self.rounding_unit <= Decimal::ZERO {
            return Err(invalid("rounding_unit", "must be greater than zero"));
        }
        if self.minimum_split_amount.is_sign_negative() {
            return Err(invalid("minimum_split_amount", "must not be negative"));
        }
        if self.minimum_split_amount > self.standard_tier_floor {
            return Err(invalid(
                "standard_tier_floor",
                "must not be below minimum_split_amount",
            ));
        }
        if self.standard_tier_floor > self.extended_tier_floor {
            return Err(invalid(
                "extended_tier_floor",
                "must not be below standard_tier_floor",
            ));
        }
        if self.bonus_warning_ratio.is_sign_negative() {
            return Err(invalid("bonus_warning_ratio", "must not be negative"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> PlanError {
    PlanError::InvalidPolicy {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
