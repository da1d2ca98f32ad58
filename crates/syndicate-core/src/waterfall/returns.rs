use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::SyndicateError;
use crate::types::*;
use crate::waterfall::allocator::Allocation;
use crate::waterfall::economics::ValidatedEconomics;
use crate::SyndicateResult;

/// Deal-level totals and per-class return metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnsSummary {
    pub total_proceeds: Money,
    pub total_equity: Money,
    /// Proceeds less contributed equity (negative on a loss)
    pub profit: Money,
    pub gp_total: Money,
    pub lp_total: Money,
    pub gp_investment: Money,
    pub lp_investment: Money,
    /// GP equity multiple; 0 when the GP contributed nothing
    pub gp_multiple: Multiple,
    /// LP equity multiple; 0 when LPs contributed nothing
    pub lp_multiple: Multiple,
    /// Annualized GP return in percent, from the multiple and hold period
    pub gp_irr: Decimal,
    /// Annualized LP return in percent, from the multiple and hold period
    pub lp_irr: Decimal,
    pub hold_period_years: Years,
    /// False when the GP had no investment and its 0 metrics mean "undefined"
    pub gp_metrics_defined: bool,
    /// False when LPs had no investment and their 0 metrics mean "undefined"
    pub lp_metrics_defined: bool,
}

impl ReturnsSummary {
    pub fn metrics_defined(&self, class: CapitalClass) -> bool {
        match class {
            CapitalClass::Gp => self.gp_metrics_defined,
            CapitalClass::Lp => self.lp_metrics_defined,
        }
    }
}

/// Derive multiples and IRRs for GP and LP from an allocation.
pub fn summarize(econ: &ValidatedEconomics, alloc: &Allocation) -> SyndicateResult<ReturnsSummary> {
    let gp_investment = round_money(econ.total_equity * econ.gp_equity);
    let lp_investment = econ.total_equity - gp_investment;
    let hold = econ.hold_period_years;

    let (gp_multiple, gp_irr) = class_returns(alloc.gp_total, gp_investment, hold)?;
    let (lp_multiple, lp_irr) = class_returns(alloc.lp_total, lp_investment, hold)?;

    Ok(ReturnsSummary {
        total_proceeds: alloc.total_proceeds,
        total_equity: econ.total_equity,
        profit: alloc.total_proceeds - econ.total_equity,
        gp_total: alloc.gp_total,
        lp_total: alloc.lp_total,
        gp_investment,
        lp_investment,
        gp_multiple,
        lp_multiple,
        gp_irr,
        lp_irr,
        hold_period_years: hold,
        gp_metrics_defined: gp_investment > Decimal::ZERO,
        lp_metrics_defined: lp_investment > Decimal::ZERO,
    })
}

/// Multiple and annualized return for one capital class.
///
/// Zero investment yields (0, 0) by convention rather than a division error.
fn class_returns(
    received: Money,
    invested: Money,
    hold: Years,
) -> SyndicateResult<(Multiple, Decimal)> {
    if invested <= Decimal::ZERO {
        return Ok((Decimal::ZERO, Decimal::ZERO));
    }
    let multiple = received
        .checked_div(invested)
        .ok_or_else(|| SyndicateError::DivisionByZero {
            context: format!("equity multiple of {received} on {invested}"),
        })?;
    let irr = annualized_return_pct(multiple, hold)?;
    Ok((multiple, irr))
}

/// Single-cash-flow IRR: all capital in at year 0, all cash back at `hold`.
///
/// Equivalent to the compound annual growth rate of the multiple,
/// `(multiple^(1/hold) - 1) x 100`. Intermediate distributions are not
/// modelled.
pub fn annualized_return_pct(multiple: Multiple, hold: Years) -> SyndicateResult<Decimal> {
    if hold <= Decimal::ZERO {
        return Err(SyndicateError::DivisionByZero {
            context: "annualized return exponent 1/hold_period_years".into(),
        });
    }
    if multiple.is_zero() {
        return Ok(dec!(-100));
    }
    if multiple == Decimal::ONE {
        return Ok(Decimal::ZERO);
    }

    let growth = if hold == Decimal::ONE {
        multiple
    } else {
        multiple
            .checked_powd(Decimal::ONE / hold)
            .ok_or_else(|| SyndicateError::DivisionByZero {
                context: format!("annualized return of {multiple}x over {hold} years"),
            })?
    };
    (growth - Decimal::ONE)
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or_else(|| SyndicateError::DivisionByZero {
            context: format!("annualized return of {multiple}x over {hold} years"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waterfall::allocator::allocate;
    use crate::waterfall::economics::{DealEconomics, WaterfallKind};

    #[test]
    fn test_unit_multiple_has_zero_irr() {
        assert_eq!(annualized_return_pct(dec!(1), dec!(5)).unwrap(), Decimal::ZERO);
        assert_eq!(annualized_return_pct(dec!(1.00), dec!(7.5)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_one_year_hold_irr_is_simple_gain() {
        assert_eq!(annualized_return_pct(dec!(1.35), dec!(1)).unwrap(), dec!(35));
        assert_eq!(annualized_return_pct(dec!(0.8), dec!(1)).unwrap(), dec!(-20));
    }

    #[test]
    fn test_two_x_over_five_years() {
        // 2^(1/5) = 1.148698...
        let irr = annualized_return_pct(dec!(2), dec!(5)).unwrap();
        assert!((irr - dec!(14.8698)).abs() < dec!(0.001), "got {irr}");
    }

    #[test]
    fn test_total_loss_is_minus_hundred() {
        assert_eq!(annualized_return_pct(Decimal::ZERO, dec!(5)).unwrap(), dec!(-100));
    }

    #[test]
    fn test_zero_hold_never_reaches_exponent() {
        assert!(matches!(
            annualized_return_pct(dec!(2), Decimal::ZERO),
            Err(SyndicateError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_zero_gp_equity_is_degenerate() {
        let mut deal = DealEconomics::with_equity(dec!(1000000));
        deal.gp_equity_pct = 0.0;
        deal.waterfall_kind = WaterfallKind::Simple;
        let econ = deal.validate().unwrap();
        let alloc = allocate(&econ).unwrap();
        let summary = summarize(&econ, &alloc).unwrap();

        assert_eq!(summary.gp_investment, Decimal::ZERO);
        assert_eq!(summary.gp_multiple, Decimal::ZERO);
        assert_eq!(summary.gp_irr, Decimal::ZERO);
        assert!(!summary.metrics_defined(CapitalClass::Gp));
        assert!(summary.metrics_defined(CapitalClass::Lp));
        // GP still earns its promote with no capital in
        assert_eq!(summary.gp_total, dec!(160000));
    }

    #[test]
    fn test_investments_split_by_subtraction() {
        let mut deal = DealEconomics::with_equity(dec!(1000.01));
        deal.gp_equity_pct = 33.0;
        let econ = deal.validate().unwrap();
        let alloc = allocate(&econ).unwrap();
        let summary = summarize(&econ, &alloc).unwrap();
        assert_eq!(summary.gp_investment + summary.lp_investment, dec!(1000.01));
    }
}
