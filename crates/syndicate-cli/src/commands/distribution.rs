use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use syndicate_core::distribution::{self, DistributionRequest};

use crate::input;

/// Arguments for a pro-rata investor distribution
#[derive(Args)]
pub struct DistributeArgs {
    /// Path to JSON distribution request
    #[arg(long)]
    pub input: Option<String>,

    /// Override the request's total amount
    #[arg(long)]
    pub total_amount: Option<Decimal>,
}

pub fn run_distribute(args: DistributeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut request: DistributionRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for distribution".into());
    };

    if let Some(amount) = args.total_amount {
        request.total_amount = amount;
    }

    let result = distribution::distribute_pro_rata(&request)?;
    Ok(serde_json::to_value(result)?)
}
