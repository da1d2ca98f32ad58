use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::SyndicateError;
use crate::SyndicateResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Percentages as entered on the deal record (8.0 = 8%). Not money, so f64.
pub type Percent = f64;

/// Multiples (e.g., 1.8x exit multiple, 2.1x equity multiple)
pub type Multiple = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// Decimal places every allocated cash amount is rounded to.
pub const MONEY_DP: u32 = 2;

/// Round a cash amount to cents, midpoint away from zero.
pub fn round_money(amount: Money) -> Money {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a validated percentage to a decimal fraction (8.0 -> 0.08).
pub fn pct_to_fraction(field: &str, pct: Percent) -> SyndicateResult<Decimal> {
    let value = Decimal::from_f64(pct).ok_or_else(|| SyndicateError::InvalidEconomics {
        field: field.into(),
        reason: format!("{pct} cannot be represented as a decimal"),
    })?;
    Ok(value / Decimal::ONE_HUNDRED)
}

/// Capital class receiving distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapitalClass {
    /// General Partner (sponsor)
    Gp,
    /// Limited Partners as one aggregate pool
    Lp,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit_cents".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_midpoint_away_from_zero() {
        assert_eq!(round_money(dec!(51520.946)), dec!(51520.95));
        assert_eq!(round_money(dec!(0.005)), dec!(0.01));
        assert_eq!(round_money(dec!(422395.26912)), dec!(422395.27));
    }

    #[test]
    fn test_pct_to_fraction() {
        assert_eq!(pct_to_fraction("x", 8.0).unwrap(), dec!(0.08));
        assert_eq!(pct_to_fraction("x", 12.5).unwrap(), dec!(0.125));
        assert_eq!(pct_to_fraction("x", 0.0).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_pct_to_fraction_rejects_nan() {
        let err = pct_to_fraction("gp_equity_pct", f64::NAN).unwrap_err();
        assert_eq!(err.field(), Some("gp_equity_pct"));
    }
}
