use chrono::NaiveDate;
use log::debug;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

use crate::error::SyndicateError;
use crate::types::*;
use crate::SyndicateResult;

const OWNERSHIP_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// A batch of cash to pay out to a deal's investors by ownership.
///
/// This is a flat pro-rata split of an amount already decided on; it does
/// not run the tiered waterfall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<String>,
    /// Cash to distribute across all positions
    pub total_amount: Money,
    #[serde(default = "default_distribution_type")]
    pub distribution_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution_date: Option<NaiveDate>,
    /// Calendar quarter, 1-4
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarter: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    pub positions: Vec<InvestorPosition>,
}

fn default_distribution_type() -> String {
    "Cash Distribution".to_string()
}

/// One investor's stake in the deal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestorPosition {
    pub investment_id: String,
    pub investor_id: String,
    /// Share of the deal owned, in percent
    pub ownership_pct: Percent,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
}

/// Payout owed to one investor position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionRecord {
    pub investment_id: String,
    pub investor_id: String,
    pub ownership_pct: Percent,
    pub amount: Money,
    pub status: PayoutStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionBatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<String>,
    pub distribution_type: String,
    /// e.g. "Q3 2026" when quarter and year are known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution_date: Option<NaiveDate>,
    pub total_amount: Money,
    pub records: Vec<DistributionRecord>,
    pub total_distributed: Money,
    pub total_ownership_pct: Percent,
    /// Cash not claimed by any position
    pub unallocated: Money,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Split `total_amount` across positions by ownership percentage.
pub fn distribute_pro_rata(
    request: &DistributionRequest,
) -> SyndicateResult<ComputationOutput<DistributionBatch>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_request(request)?;

    let total_ownership_pct: Percent = request.positions.iter().map(|p| p.ownership_pct).sum();
    if total_ownership_pct > 100.0 + OWNERSHIP_TOLERANCE {
        return Err(SyndicateError::input(
            "positions",
            format!("Ownership percentages sum to {total_ownership_pct}%, above 100%"),
        ));
    }
    if total_ownership_pct < 100.0 - OWNERSHIP_TOLERANCE {
        warnings.push(format!(
            "Ownership percentages sum to {total_ownership_pct}%; the remainder stays unallocated"
        ));
    }

    let mut records = Vec::with_capacity(request.positions.len());
    for position in &request.positions {
        let fraction = ownership_fraction(position)?;
        let amount = round_money(request.total_amount * fraction);
        debug!(
            "investment {} ({}%): {}",
            position.investment_id, position.ownership_pct, amount
        );
        records.push(DistributionRecord {
            investment_id: position.investment_id.clone(),
            investor_id: position.investor_id.clone(),
            ownership_pct: position.ownership_pct,
            amount,
            status: PayoutStatus::Pending,
        });
    }

    let total_distributed: Money = records.iter().map(|r| r.amount).sum();
    let unallocated = request.total_amount - total_distributed;

    let period = match (request.quarter, request.year) {
        (Some(q), Some(y)) => Some(format!("Q{q} {y}")),
        (None, Some(y)) => Some(y.to_string()),
        _ => None,
    };

    let batch = DistributionBatch {
        deal_id: request.deal_id.clone(),
        distribution_type: request.distribution_type.clone(),
        period,
        distribution_date: request.distribution_date,
        total_amount: request.total_amount,
        records,
        total_distributed,
        total_ownership_pct,
        unallocated,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Pro-Rata Distribution by Ownership",
        &serde_json::json!({
            "total_amount": request.total_amount.to_string(),
            "num_positions": request.positions.len(),
            "distribution_type": request.distribution_type,
        }),
        warnings,
        elapsed,
        batch,
    ))
}

fn validate_request(request: &DistributionRequest) -> SyndicateResult<()> {
    if request.total_amount < Decimal::ZERO {
        return Err(SyndicateError::input(
            "total_amount",
            "Distribution amount cannot be negative",
        ));
    }
    if request.positions.is_empty() {
        return Err(SyndicateError::input(
            "positions",
            "At least one investor position is required",
        ));
    }
    if let Some(q) = request.quarter {
        if !(1..=4).contains(&q) {
            return Err(SyndicateError::input(
                "quarter",
                format!("Quarter must be between 1 and 4 (got {q})"),
            ));
        }
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for position in &request.positions {
        if !seen.insert(position.investment_id.as_str()) {
            return Err(SyndicateError::input(
                "positions",
                format!("Duplicate investment_id '{}'", position.investment_id),
            ));
        }
        let pct = position.ownership_pct;
        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            return Err(SyndicateError::input(
                "ownership_pct",
                format!(
                    "Ownership for investment '{}' must be between 0 and 100 (got {pct})",
                    position.investment_id
                ),
            ));
        }
    }
    Ok(())
}

fn ownership_fraction(position: &InvestorPosition) -> SyndicateResult<Decimal> {
    let pct = Decimal::from_f64(position.ownership_pct).ok_or_else(|| {
        SyndicateError::input(
            "ownership_pct",
            format!("{} cannot be represented as a decimal", position.ownership_pct),
        )
    })?;
    Ok(pct / Decimal::ONE_HUNDRED)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
