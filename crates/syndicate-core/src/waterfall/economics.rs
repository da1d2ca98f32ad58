use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::SyndicateError;
use crate::types::*;
use crate::SyndicateResult;

const DEFAULT_GP_EQUITY_PCT: Percent = 10.0;
const DEFAULT_PREFERRED_RETURN_PCT: Percent = 8.0;
const DEFAULT_GP_PROMOTE_PCT: Percent = 20.0;
const DEFAULT_CATCH_UP_RATE_PCT: Percent = 50.0;
const DEFAULT_EXIT_MULTIPLE: Multiple = dec!(1.8);
const DEFAULT_HOLD_PERIOD_YEARS: Years = dec!(5);
const DAYS_PER_YEAR: Decimal = dec!(365.25);
const EQUITY_SPLIT_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Which tiers of the waterfall are active for a deal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaterfallKind {
    /// Return of capital, then straight promote split
    #[serde(rename = "simple")]
    Simple,
    /// Return of capital, preferred return, promote split
    #[serde(rename = "pref")]
    PrefOnly,
    /// Return of capital, preferred return, GP catch-up, promote split
    #[default]
    #[serde(rename = "catchup")]
    PrefWithCatchUp,
}

impl WaterfallKind {
    pub fn has_preferred_return(self) -> bool {
        !matches!(self, WaterfallKind::Simple)
    }

    pub fn has_catch_up(self) -> bool {
        matches!(self, WaterfallKind::PrefWithCatchUp)
    }
}

/// Capital structure and exit assumptions of one deal.
///
/// Every field except `total_equity` has the default the deal analyzer
/// pre-fills, so a JSON deal record only needs the raise amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealEconomics {
    /// Total capital raised, GP and LP combined
    pub total_equity: Money,
    /// GP share of contributed equity, in percent
    #[serde(default = "default_gp_equity_pct")]
    pub gp_equity_pct: Percent,
    /// LP share of contributed equity, in percent (defaults to 100 - GP)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lp_equity_pct: Option<Percent>,
    /// Annual LP hurdle rate, in percent
    #[serde(default = "default_preferred_return_pct")]
    pub preferred_return_pct: Percent,
    /// GP share of profit above return of capital, in percent
    #[serde(default = "default_gp_promote_pct")]
    pub gp_promote_pct: Percent,
    /// Share of catch-up tier cash paid to the GP, in percent
    #[serde(default = "default_catch_up_rate_pct")]
    pub catch_up_rate_pct: Percent,
    /// Total proceeds divided by total equity at exit
    #[serde(default = "default_exit_multiple")]
    pub exit_multiple: Multiple,
    /// Years between contribution and exit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold_period_years: Option<Years>,
    /// Acquisition and exit dates, used when `hold_period_years` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold_dates: Option<(NaiveDate, NaiveDate)>,
    #[serde(default)]
    pub waterfall_kind: WaterfallKind,
}

fn default_gp_equity_pct() -> Percent {
    DEFAULT_GP_EQUITY_PCT
}

fn default_preferred_return_pct() -> Percent {
    DEFAULT_PREFERRED_RETURN_PCT
}

fn default_gp_promote_pct() -> Percent {
    DEFAULT_GP_PROMOTE_PCT
}

fn default_catch_up_rate_pct() -> Percent {
    DEFAULT_CATCH_UP_RATE_PCT
}

fn default_exit_multiple() -> Multiple {
    DEFAULT_EXIT_MULTIPLE
}

impl DealEconomics {
    /// A deal with the analyzer defaults for everything but the raise.
    pub fn with_equity(total_equity: Money) -> Self {
        DealEconomics {
            total_equity,
            gp_equity_pct: DEFAULT_GP_EQUITY_PCT,
            lp_equity_pct: None,
            preferred_return_pct: DEFAULT_PREFERRED_RETURN_PCT,
            gp_promote_pct: DEFAULT_GP_PROMOTE_PCT,
            catch_up_rate_pct: DEFAULT_CATCH_UP_RATE_PCT,
            exit_multiple: DEFAULT_EXIT_MULTIPLE,
            hold_period_years: None,
            hold_dates: None,
            waterfall_kind: WaterfallKind::default(),
        }
    }

    /// Check every field and resolve defaults into decimal fractions.
    ///
    /// Nothing is clamped: any out-of-range value is reported with the
    /// field it came from so the deal record can be corrected.
    pub fn validate(&self) -> SyndicateResult<ValidatedEconomics> {
        if self.total_equity < Decimal::ZERO {
            return Err(SyndicateError::economics(
                "total_equity",
                "Total equity cannot be negative",
            ));
        }

        share_pct("gp_equity_pct", self.gp_equity_pct)?;
        let lp_equity_pct = match self.lp_equity_pct {
            Some(lp) => {
                share_pct("lp_equity_pct", lp)?;
                if (self.gp_equity_pct + lp - 100.0).abs() > EQUITY_SPLIT_TOLERANCE {
                    return Err(SyndicateError::economics(
                        "lp_equity_pct",
                        format!(
                            "GP and LP equity must sum to 100% (got {} + {lp})",
                            self.gp_equity_pct
                        ),
                    ));
                }
                lp
            }
            None => 100.0 - self.gp_equity_pct,
        };

        if !self.preferred_return_pct.is_finite() || self.preferred_return_pct < 0.0 {
            return Err(SyndicateError::economics(
                "preferred_return_pct",
                format!(
                    "Preferred return must be a finite, non-negative percentage (got {})",
                    self.preferred_return_pct
                ),
            ));
        }
        share_pct("gp_promote_pct", self.gp_promote_pct)?;
        share_pct("catch_up_rate_pct", self.catch_up_rate_pct)?;

        if self.exit_multiple <= Decimal::ZERO {
            return Err(SyndicateError::economics(
                "exit_multiple",
                "Exit multiple must be positive",
            ));
        }

        let hold_period_years = self.resolve_hold_period()?;

        Ok(ValidatedEconomics {
            total_equity: self.total_equity,
            gp_equity: pct_to_fraction("gp_equity_pct", self.gp_equity_pct)?,
            lp_equity: pct_to_fraction("lp_equity_pct", lp_equity_pct)?,
            preferred_return: pct_to_fraction("preferred_return_pct", self.preferred_return_pct)?,
            gp_promote: pct_to_fraction("gp_promote_pct", self.gp_promote_pct)?,
            catch_up_rate: pct_to_fraction("catch_up_rate_pct", self.catch_up_rate_pct)?,
            exit_multiple: self.exit_multiple,
            hold_period_years,
            waterfall_kind: self.waterfall_kind,
            preferred_return_pct: self.preferred_return_pct,
            gp_promote_pct: self.gp_promote_pct,
            catch_up_rate_pct: self.catch_up_rate_pct,
        })
    }

    fn resolve_hold_period(&self) -> SyndicateResult<Years> {
        let years = if let Some(years) = self.hold_period_years {
            years
        } else if let Some((acquired, exited)) = self.hold_dates {
            let days = (exited - acquired).num_days();
            if days <= 0 {
                return Err(SyndicateError::economics(
                    "hold_dates",
                    "Exit date must be after acquisition date",
                ));
            }
            Decimal::from(days) / DAYS_PER_YEAR
        } else {
            DEFAULT_HOLD_PERIOD_YEARS
        };

        if years <= Decimal::ZERO {
            return Err(SyndicateError::economics(
                "hold_period_years",
                "Hold period must be positive",
            ));
        }
        Ok(years)
    }
}

/// A percentage that divides a whole: finite and within [0, 100].
fn share_pct(field: &str, pct: Percent) -> SyndicateResult<()> {
    if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
        return Err(SyndicateError::economics(
            field,
            format!("Must be a finite percentage between 0 and 100 (got {pct})"),
        ));
    }
    Ok(())
}

/// Deal economics after validation, with percentages as decimal fractions.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEconomics {
    pub total_equity: Money,
    pub gp_equity: Decimal,
    pub lp_equity: Decimal,
    pub preferred_return: Decimal,
    pub gp_promote: Decimal,
    pub catch_up_rate: Decimal,
    pub exit_multiple: Multiple,
    pub hold_period_years: Years,
    pub waterfall_kind: WaterfallKind,
    /// As entered, for tier descriptions
    pub preferred_return_pct: Percent,
    pub gp_promote_pct: Percent,
    pub catch_up_rate_pct: Percent,
}
