use log::debug;
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use crate::error::SyndicateError;
use crate::types::*;
use crate::waterfall::economics::ValidatedEconomics;
use crate::SyndicateResult;

// ---------------------------------------------------------------------------
// Tier types
// ---------------------------------------------------------------------------

/// Distribution tiers in their fixed priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Contributed capital back to GP and LP pro-rata
    ReturnOfCapital,
    /// Hurdle paid entirely to LPs
    PreferredReturn,
    /// Accelerated GP share until the promote target is reached
    GpCatchUp,
    /// Everything left, split by the promote
    ResidualSplit,
}

impl Tier {
    pub const ORDER: [Tier; 4] = [
        Tier::ReturnOfCapital,
        Tier::PreferredReturn,
        Tier::GpCatchUp,
        Tier::ResidualSplit,
    ];

    /// 1-based position in the waterfall, independent of skipped tiers.
    pub fn index(self) -> u8 {
        match self {
            Tier::ReturnOfCapital => 1,
            Tier::PreferredReturn => 2,
            Tier::GpCatchUp => 3,
            Tier::ResidualSplit => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tier::ReturnOfCapital => "Return of Capital",
            Tier::PreferredReturn => "Preferred Return",
            Tier::GpCatchUp => "GP Catch-Up",
            Tier::ResidualSplit => "Residual Split",
        }
    }
}

/// Cash allocated by one executed tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierResult {
    /// Fixed 1-based tier position
    pub tier_index: u8,
    pub tier: Tier,
    pub name: String,
    /// Total cash this tier distributed
    pub total_allocated: Money,
    pub gp_share: Money,
    pub lp_share: Money,
    /// Distributable cash left after this tier
    pub remaining_after: Money,
    pub description: String,
}

impl TierResult {
    fn new(
        tier: Tier,
        gp_share: Money,
        lp_share: Money,
        remaining_after: Money,
        description: String,
    ) -> Self {
        TierResult {
            tier_index: tier.index(),
            tier,
            name: tier.name().to_string(),
            total_allocated: gp_share + lp_share,
            gp_share,
            lp_share,
            remaining_after,
            description,
        }
    }
}

/// Everything the allocator produced for one deal.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub total_proceeds: Money,
    pub tiers: Vec<TierResult>,
    pub gp_total: Money,
    pub lp_total: Money,
}

impl Allocation {
    pub fn tier(&self, tier: Tier) -> Option<&TierResult> {
        self.tiers.iter().find(|t| t.tier == tier)
    }
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

/// Walk the waterfall tiers in order and allocate the exit proceeds.
///
/// `remaining` is threaded through each step explicitly; a tier only ever
/// sees the cash the tiers before it left behind. Amounts are rounded to
/// cents as they are allocated, so the tiers always sum to the proceeds.
pub fn allocate(econ: &ValidatedEconomics) -> SyndicateResult<Allocation> {
    let total_proceeds = round_money(
        econ.total_equity
            .checked_mul(econ.exit_multiple)
            .ok_or_else(|| overflow("total_equity", "Exit proceeds"))?,
    );
    let mut remaining = total_proceeds;
    let mut tiers: Vec<TierResult> = Vec::with_capacity(Tier::ORDER.len());

    let (roc, after_roc) = return_of_capital(econ, remaining)?;
    let roc_to_gp = roc.gp_share;
    remaining = after_roc;
    tiers.push(roc);

    if econ.waterfall_kind.has_preferred_return() && econ.preferred_return > Decimal::ZERO {
        let (pref, after_pref) = preferred_return(econ, remaining)?;
        remaining = after_pref;
        tiers.push(pref);
    }

    if econ.waterfall_kind.has_catch_up() && remaining > Decimal::ZERO {
        if let Some((catch_up, after_catch_up)) =
            gp_catch_up(econ, total_proceeds, roc_to_gp, remaining)?
        {
            remaining = after_catch_up;
            tiers.push(catch_up);
        }
    }

    if remaining > Decimal::ZERO {
        let (residual, after_residual) = residual_split(econ, remaining)?;
        remaining = after_residual;
        tiers.push(residual);
    }

    debug_assert!(remaining.is_zero());

    for t in &tiers {
        debug!(
            "tier {} {}: allocated {} (gp {}, lp {}), remaining {}",
            t.tier_index, t.name, t.total_allocated, t.gp_share, t.lp_share, t.remaining_after
        );
    }

    let gp_total: Money = tiers.iter().map(|t| t.gp_share).sum();
    let lp_total: Money = tiers.iter().map(|t| t.lp_share).sum();

    Ok(Allocation {
        total_proceeds,
        tiers,
        gp_total,
        lp_total,
    })
}

/// Tier 1: capital back pro-rata by equity share.
fn return_of_capital(
    econ: &ValidatedEconomics,
    remaining: Money,
) -> SyndicateResult<(TierResult, Money)> {
    let amount = remaining.min(econ.total_equity);
    let to_gp = round_money(
        amount
            .checked_mul(econ.gp_equity)
            .ok_or_else(|| overflow("gp_equity_pct", "Return of capital"))?,
    );
    let to_lp = amount - to_gp;
    let remaining = remaining - amount;
    Ok((
        TierResult::new(
            Tier::ReturnOfCapital,
            to_gp,
            to_lp,
            remaining,
            "Initial investment returned pro-rata".to_string(),
        ),
        remaining,
    ))
}

/// Tier 2: LP hurdle.
///
/// The pool is sized with compound growth, `(1 + r)^t - 1`, even though the
/// hurdle is described to investors as a non-compounding annual rate.
fn preferred_return(
    econ: &ValidatedEconomics,
    remaining: Money,
) -> SyndicateResult<(TierResult, Money)> {
    let lp_equity = econ
        .total_equity
        .checked_mul(econ.lp_equity)
        .ok_or_else(|| overflow("lp_equity_pct", "LP equity"))?;
    let growth = (Decimal::ONE + econ.preferred_return)
        .checked_powd(econ.hold_period_years)
        .ok_or_else(|| {
            SyndicateError::economics(
                "hold_period_years",
                "Preferred return growth overflows over this hold period",
            )
        })?;
    let pref_pool = round_money(
        lp_equity
            .checked_mul(growth - Decimal::ONE)
            .ok_or_else(|| overflow("preferred_return_pct", "Preferred return pool"))?,
    );
    let amount = remaining.min(pref_pool).max(Decimal::ZERO);
    let remaining = remaining - amount;
    Ok((
        TierResult::new(
            Tier::PreferredReturn,
            Decimal::ZERO,
            amount,
            remaining,
            format!("{}% hurdle to LPs", econ.preferred_return_pct),
        ),
        remaining,
    ))
}

/// Tier 3: GP catch-up.
///
/// The GP's deficit is measured against its Tier 1 capital share only, not
/// against everything it has received so far. Returns `None` when the GP has
/// no shortfall or the catch-up rate is zero; the tier is then omitted.
fn gp_catch_up(
    econ: &ValidatedEconomics,
    total_proceeds: Money,
    roc_to_gp: Money,
    remaining: Money,
) -> SyndicateResult<Option<(TierResult, Money)>> {
    let profit = total_proceeds - econ.total_equity;
    let target_gp_profit = profit
        .checked_mul(econ.gp_promote)
        .ok_or_else(|| overflow("gp_promote_pct", "GP promote target"))?;
    let gp_shortfall = (target_gp_profit - roc_to_gp).max(Decimal::ZERO);

    if gp_shortfall <= Decimal::ZERO || econ.catch_up_rate <= Decimal::ZERO {
        return Ok(None);
    }

    // a tiny rate blows the pool up past the decimal range
    let catch_up_pool = round_money(
        gp_shortfall
            .checked_div(econ.catch_up_rate)
            .ok_or_else(|| overflow("catch_up_rate_pct", "Catch-up pool"))?,
    );
    let amount = remaining.min(catch_up_pool);
    let to_gp = round_money(
        amount
            .checked_mul(econ.catch_up_rate)
            .ok_or_else(|| overflow("catch_up_rate_pct", "Catch-up GP share"))?,
    );
    let to_lp = amount - to_gp;
    let remaining = remaining - amount;
    Ok(Some((
        TierResult::new(
            Tier::GpCatchUp,
            to_gp,
            to_lp,
            remaining,
            format!("{}% to GP", econ.catch_up_rate_pct),
        ),
        remaining,
    )))
}

/// Tier 4: whatever is left, split by the promote.
fn residual_split(
    econ: &ValidatedEconomics,
    remaining: Money,
) -> SyndicateResult<(TierResult, Money)> {
    let to_gp = round_money(
        remaining
            .checked_mul(econ.gp_promote)
            .ok_or_else(|| overflow("gp_promote_pct", "Residual GP share"))?,
    );
    let to_lp = remaining - to_gp;
    Ok((
        TierResult::new(
            Tier::ResidualSplit,
            to_gp,
            to_lp,
            Decimal::ZERO,
            format!(
                "{}/{} GP/LP split",
                econ.gp_promote_pct,
                100.0 - econ.gp_promote_pct
            ),
        ),
        Decimal::ZERO,
    ))
}

fn overflow(field: &str, what: &str) -> SyndicateError {
    SyndicateError::economics(field, format!("{what} overflows the decimal range"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waterfall::economics::{DealEconomics, WaterfallKind};
    use rust_decimal_macros::dec;

    fn deal(kind: WaterfallKind, exit_multiple: Multiple) -> ValidatedEconomics {
        DealEconomics {
            total_equity: dec!(1000000),
            gp_equity_pct: 10.0,
            lp_equity_pct: Some(90.0),
            preferred_return_pct: 8.0,
            gp_promote_pct: 20.0,
            catch_up_rate_pct: 50.0,
            exit_multiple,
            hold_period_years: Some(dec!(5)),
            hold_dates: None,
            waterfall_kind: kind,
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_tier_order_is_fixed() {
        let indices: Vec<u8> = Tier::ORDER.iter().map(|t| t.index()).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
        assert!(Tier::ReturnOfCapital < Tier::ResidualSplit);
    }

    #[test]
    fn test_return_of_capital_split_sums_exactly() {
        let mut econ = deal(WaterfallKind::Simple, dec!(1.8));
        econ.gp_equity = dec!(0.333333);
        let (roc, remaining) = return_of_capital(&econ, dec!(1800000)).unwrap();
        assert_eq!(roc.total_allocated, dec!(1000000));
        assert_eq!(roc.gp_share, dec!(333333.00));
        assert_eq!(roc.gp_share + roc.lp_share, dec!(1000000));
        assert_eq!(remaining, dec!(800000));
    }

    #[test]
    fn test_return_of_capital_partial_when_underwater() {
        let econ = deal(WaterfallKind::PrefWithCatchUp, dec!(0.6));
        let alloc = allocate(&econ).unwrap();
        assert_eq!(alloc.total_proceeds, dec!(600000));
        let roc = alloc.tier(Tier::ReturnOfCapital).unwrap();
        assert_eq!(roc.total_allocated, dec!(600000));
        assert_eq!(roc.gp_share, dec!(60000));
        assert_eq!(roc.lp_share, dec!(540000));
        // Pref tier still runs, with nothing to pay
        let pref = alloc.tier(Tier::PreferredReturn).unwrap();
        assert_eq!(pref.total_allocated, Decimal::ZERO);
        assert!(alloc.tier(Tier::GpCatchUp).is_none());
        assert!(alloc.tier(Tier::ResidualSplit).is_none());
    }

    #[test]
    fn test_preferred_return_pool() {
        let econ = deal(WaterfallKind::PrefOnly, dec!(1.8));
        let (pref, remaining) = preferred_return(&econ, dec!(800000)).unwrap();
        // 900,000 x (1.08^5 - 1) = 422,395.26912
        assert_eq!(pref.total_allocated, dec!(422395.27));
        assert_eq!(pref.gp_share, Decimal::ZERO);
        assert_eq!(pref.lp_share, dec!(422395.27));
        assert_eq!(remaining, dec!(377604.73));
        assert_eq!(pref.description, "8% hurdle to LPs");
    }

    #[test]
    fn test_preferred_return_capped_by_remaining() {
        let econ = deal(WaterfallKind::PrefOnly, dec!(1.8));
        let (pref, remaining) = preferred_return(&econ, dec!(100000)).unwrap();
        assert_eq!(pref.total_allocated, dec!(100000));
        assert_eq!(remaining, Decimal::ZERO);
    }

    #[test]
    fn test_catch_up_against_roc_share_only() {
        let econ = deal(WaterfallKind::PrefWithCatchUp, dec!(1.8));
        // profit 800,000 x 20% = 160,000 target; GP got 100,000 in tier 1
        let (catch_up, remaining) =
            gp_catch_up(&econ, dec!(1800000), dec!(100000), dec!(377604.73))
                .unwrap()
                .unwrap();
        assert_eq!(catch_up.total_allocated, dec!(120000));
        assert_eq!(catch_up.gp_share, dec!(60000));
        assert_eq!(catch_up.lp_share, dec!(60000));
        assert_eq!(remaining, dec!(257604.73));
        assert_eq!(catch_up.description, "50% to GP");
    }

    #[test]
    fn test_catch_up_skipped_without_shortfall() {
        let econ = deal(WaterfallKind::PrefWithCatchUp, dec!(1.8));
        // GP tier-1 share already exceeds the promote target
        assert!(gp_catch_up(&econ, dec!(1800000), dec!(200000), dec!(100))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_catch_up_skipped_with_zero_rate() {
        let mut econ = deal(WaterfallKind::PrefWithCatchUp, dec!(1.8));
        econ.catch_up_rate = Decimal::ZERO;
        assert!(gp_catch_up(&econ, dec!(1800000), dec!(100000), dec!(377604.73))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_full_rate_catch_up_pays_gp_only() {
        let mut econ = deal(WaterfallKind::PrefWithCatchUp, dec!(1.8));
        econ.catch_up_rate = Decimal::ONE;
        let (catch_up, _) =
            gp_catch_up(&econ, dec!(1800000), dec!(100000), dec!(377604.73))
                .unwrap()
                .unwrap();
        assert_eq!(catch_up.total_allocated, dec!(60000));
        assert_eq!(catch_up.gp_share, dec!(60000));
        assert_eq!(catch_up.lp_share, Decimal::ZERO);
    }

    #[test]
    fn test_residual_split() {
        let econ = deal(WaterfallKind::Simple, dec!(1.8));
        let (residual, remaining) = residual_split(&econ, dec!(257604.73)).unwrap();
        assert_eq!(residual.gp_share, dec!(51520.95));
        assert_eq!(residual.lp_share, dec!(206083.78));
        assert_eq!(remaining, Decimal::ZERO);
        assert_eq!(residual.description, "20/80 GP/LP split");
    }

    #[test]
    fn test_simple_waterfall_skips_pref_and_catch_up() {
        let alloc = allocate(&deal(WaterfallKind::Simple, dec!(1.8))).unwrap();
        let kinds: Vec<Tier> = alloc.tiers.iter().map(|t| t.tier).collect();
        assert_eq!(kinds, vec![Tier::ReturnOfCapital, Tier::ResidualSplit]);
        assert_eq!(alloc.gp_total, dec!(260000));
        assert_eq!(alloc.lp_total, dec!(1540000));
    }

    #[test]
    fn test_zero_pref_rate_skips_pref_tier() {
        let mut econ = deal(WaterfallKind::PrefOnly, dec!(1.8));
        econ.preferred_return = Decimal::ZERO;
        let alloc = allocate(&econ).unwrap();
        assert!(alloc.tier(Tier::PreferredReturn).is_none());
    }

    #[test]
    fn test_totals_match_proceeds() {
        for kind in [
            WaterfallKind::Simple,
            WaterfallKind::PrefOnly,
            WaterfallKind::PrefWithCatchUp,
        ] {
            let alloc = allocate(&deal(kind, dec!(2.37))).unwrap();
            let allocated: Money = alloc.tiers.iter().map(|t| t.total_allocated).sum();
            assert_eq!(allocated, alloc.total_proceeds);
            assert_eq!(alloc.gp_total + alloc.lp_total, alloc.total_proceeds);
        }
    }

    #[test]
    fn test_oversized_pref_pool_is_rejected() {
        let mut econ = deal(WaterfallKind::PrefOnly, dec!(1.8));
        econ.preferred_return = Decimal::ONE;
        econ.hold_period_years = dec!(80);
        // 900,000 x (2^80 - 1) does not fit in a Decimal
        let err = preferred_return(&econ, dec!(800000)).unwrap_err();
        assert!(matches!(err, SyndicateError::InvalidEconomics { .. }));
    }

    #[test]
    fn test_tiny_catch_up_rate_overflow_is_rejected() {
        let mut econ = deal(WaterfallKind::PrefWithCatchUp, dec!(1.8));
        econ.catch_up_rate = Decimal::new(1, 28);
        let err = gp_catch_up(&econ, dec!(1800000), dec!(100000), dec!(377604.73)).unwrap_err();
        assert_eq!(err.field(), Some("catch_up_rate_pct"));
    }
}
