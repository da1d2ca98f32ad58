use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use syndicate_core::sensitivity::{self, SensitivityInput, SensitivityMetric, SweepRange};

use crate::commands::waterfall::DealArgs;
use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MetricArg {
    LpIrr,
    GpIrr,
    LpMultiple,
    GpMultiple,
    LpTotal,
    GpTotal,
}

impl From<MetricArg> for SensitivityMetric {
    fn from(metric: MetricArg) -> Self {
        match metric {
            MetricArg::LpIrr => SensitivityMetric::LpIrr,
            MetricArg::GpIrr => SensitivityMetric::GpIrr,
            MetricArg::LpMultiple => SensitivityMetric::LpMultiple,
            MetricArg::GpMultiple => SensitivityMetric::GpMultiple,
            MetricArg::LpTotal => SensitivityMetric::LpTotal,
            MetricArg::GpTotal => SensitivityMetric::GpTotal,
        }
    }
}

/// Arguments for the exit multiple x hold period grid
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to JSON sensitivity input (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub deal: DealArgs,

    /// Exit multiple sweep as min,max,step
    #[arg(long, value_delimiter = ',', default_value = "1.2,2.4,0.2")]
    pub exit_sweep: Vec<Decimal>,

    /// Hold period sweep in years as min,max,step
    #[arg(long, value_delimiter = ',', default_value = "3,7,1")]
    pub hold_sweep: Vec<Decimal>,

    /// Output metric for each cell
    #[arg(long, value_enum, default_value = "lp-irr")]
    pub metric: MetricArg,
}

fn to_range(flag: &str, values: &[Decimal]) -> Result<SweepRange, Box<dyn std::error::Error>> {
    match values {
        [min, max, step] => Ok(SweepRange {
            min: *min,
            max: *max,
            step: *step,
        }),
        _ => Err(format!("{flag} expects exactly three values: min,max,step").into()),
    }
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sens_input: SensitivityInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        SensitivityInput {
            deal: args.deal.to_economics()?,
            exit_multiples: to_range("--exit-sweep", &args.exit_sweep)?,
            hold_periods: to_range("--hold-sweep", &args.hold_sweep)?,
            metric: args.metric.into(),
        }
    };

    let result = sensitivity::calculate_sensitivity(&sens_input)?;
    Ok(serde_json::to_value(result)?)
}
