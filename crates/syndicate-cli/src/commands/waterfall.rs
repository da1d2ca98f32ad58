use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use syndicate_core::waterfall::{self, DealEconomics, WaterfallKind};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    /// Return of capital, then promote split
    Simple,
    /// Adds the LP preferred return
    Pref,
    /// Adds the preferred return and a GP catch-up
    Catchup,
}

impl From<KindArg> for WaterfallKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Simple => WaterfallKind::Simple,
            KindArg::Pref => WaterfallKind::PrefOnly,
            KindArg::Catchup => WaterfallKind::PrefWithCatchUp,
        }
    }
}

/// Deal economics given as individual flags
#[derive(Args)]
pub struct DealArgs {
    /// Total equity raised, GP and LP combined
    #[arg(long)]
    pub total_equity: Option<Decimal>,

    /// GP share of equity, in percent [default: 10]
    #[arg(long)]
    pub gp_equity_pct: Option<f64>,

    /// LP share of equity, in percent [default: 100 - GP]
    #[arg(long)]
    pub lp_equity_pct: Option<f64>,

    /// Annual LP preferred return, in percent [default: 8]
    #[arg(long)]
    pub pref_pct: Option<f64>,

    /// GP promote above return of capital, in percent [default: 20]
    #[arg(long)]
    pub promote_pct: Option<f64>,

    /// Share of catch-up cash paid to the GP, in percent [default: 50]
    #[arg(long)]
    pub catch_up_pct: Option<f64>,

    /// Exit proceeds as a multiple of total equity [default: 1.8]
    #[arg(long)]
    pub exit_multiple: Option<Decimal>,

    /// Hold period in years [default: 5]
    #[arg(long)]
    pub hold_years: Option<Decimal>,

    /// Waterfall structure [default: catchup]
    #[arg(long, value_enum)]
    pub kind: Option<KindArg>,
}

impl DealArgs {
    /// Build deal economics from flags, keeping defaults for anything unset.
    pub fn to_economics(&self) -> Result<DealEconomics, Box<dyn std::error::Error>> {
        let total_equity = self
            .total_equity
            .ok_or("--total-equity is required (or provide --input)")?;

        let mut deal = DealEconomics::with_equity(total_equity);
        if let Some(v) = self.gp_equity_pct {
            deal.gp_equity_pct = v;
        }
        deal.lp_equity_pct = self.lp_equity_pct;
        if let Some(v) = self.pref_pct {
            deal.preferred_return_pct = v;
        }
        if let Some(v) = self.promote_pct {
            deal.gp_promote_pct = v;
        }
        if let Some(v) = self.catch_up_pct {
            deal.catch_up_rate_pct = v;
        }
        if let Some(v) = self.exit_multiple {
            deal.exit_multiple = v;
        }
        deal.hold_period_years = self.hold_years;
        if let Some(kind) = self.kind {
            deal.waterfall_kind = kind.into();
        }
        Ok(deal)
    }
}

/// Arguments for the waterfall distribution
#[derive(Args)]
pub struct WaterfallArgs {
    /// Path to JSON deal file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub deal: DealArgs,
}

pub fn run_waterfall(args: WaterfallArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let deal: DealEconomics = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        args.deal.to_economics()?
    };

    let result = waterfall::calculate_waterfall(&deal)?;
    Ok(serde_json::to_value(result)?)
}
