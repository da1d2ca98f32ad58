//! Tiered distribution waterfall for a syndicated real-estate deal.
//!
//! Exit proceeds flow through return of capital, the LP preferred return,
//! a GP catch-up and a residual promote split, in that order. The returns
//! calculator then turns the GP and LP totals into multiples and annualized
//! returns.

pub mod allocator;
pub mod economics;
pub mod returns;

use log::warn;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::*;
use crate::SyndicateResult;

pub use allocator::{allocate, Allocation, Tier, TierResult};
pub use economics::{DealEconomics, ValidatedEconomics, WaterfallKind};
pub use returns::{annualized_return_pct, summarize, ReturnsSummary};

/// Tier-by-tier allocation plus the returns summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallOutcome {
    /// Executed tiers in execution order
    pub tiers: Vec<TierResult>,
    pub summary: ReturnsSummary,
}

/// Validate deal economics, run the waterfall and summarize returns.
///
/// Fails only on invalid economics, and always before any tier runs.
pub fn calculate_waterfall(
    economics: &DealEconomics,
) -> SyndicateResult<ComputationOutput<WaterfallOutcome>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let econ = economics.validate()?;
    let outcome = run_waterfall(&econ)?;
    let summary = &outcome.summary;

    if summary.total_proceeds < summary.total_equity {
        warnings.push(format!(
            "Exit proceeds of {} do not return contributed equity of {}; no profit tiers paid",
            summary.total_proceeds, summary.total_equity
        ));
    }
    for (class, label) in [(CapitalClass::Gp, "GP"), (CapitalClass::Lp, "LP")] {
        if !summary.metrics_defined(class) {
            warnings.push(format!(
                "{label} investment is zero; {label} multiple and IRR are undefined and reported as 0"
            ));
        }
    }
    for w in &warnings {
        warn!("{w}");
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Syndication Waterfall (ROC, Preferred Return, GP Catch-Up, Residual Split)",
        &serde_json::json!({
            "total_equity": economics.total_equity.to_string(),
            "exit_multiple": econ.exit_multiple.to_string(),
            "hold_period_years": econ.hold_period_years.to_string(),
            "waterfall_kind": econ.waterfall_kind,
            "preferred_return_pct": econ.preferred_return_pct,
            "gp_promote_pct": econ.gp_promote_pct,
            "catch_up_rate_pct": econ.catch_up_rate_pct,
            "preferred_return_sizing": "compound (1 + r)^t - 1",
            "catch_up_basis": "GP return-of-capital share",
        }),
        warnings,
        elapsed,
        outcome,
    ))
}

/// Allocation and summary for already-validated economics, without the
/// envelope. Used where many deals are evaluated in a loop.
pub fn run_waterfall(econ: &ValidatedEconomics) -> SyndicateResult<WaterfallOutcome> {
    let alloc = allocate(econ)?;
    let summary = summarize(econ, &alloc)?;
    Ok(WaterfallOutcome {
        tiers: alloc.tiers,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_envelope_carries_methodology_and_assumptions() {
        let deal = DealEconomics::with_equity(dec!(1000000));
        let out = calculate_waterfall(&deal).unwrap();
        assert!(out.methodology.contains("Waterfall"));
        assert_eq!(out.assumptions["waterfall_kind"], "catchup");
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_underwater_deal_warns() {
        let mut deal = DealEconomics::with_equity(dec!(1000000));
        deal.exit_multiple = dec!(0.75);
        let out = calculate_waterfall(&deal).unwrap();
        assert_eq!(out.result.summary.profit, dec!(-250000));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_zero_equity_warns_for_both_classes() {
        let deal = DealEconomics::with_equity(Decimal::ZERO);
        let out = calculate_waterfall(&deal).unwrap();
        assert_eq!(out.warnings.len(), 2);
        assert!(out.result.tiers.iter().all(|t| t.total_allocated.is_zero()));
    }

    #[test]
    fn test_invalid_economics_fail_before_allocation() {
        let mut deal = DealEconomics::with_equity(dec!(1000000));
        deal.hold_period_years = Some(dec!(-2));
        assert!(calculate_waterfall(&deal).is_err());
    }
}
