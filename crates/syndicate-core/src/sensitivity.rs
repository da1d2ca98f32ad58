use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::SyndicateError;
use crate::types::*;
use crate::waterfall::{run_waterfall, DealEconomics, ReturnsSummary};
use crate::SyndicateResult;

const MAX_SWEEP_POINTS: usize = 200;

/// A min..=max sweep with a fixed step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepRange {
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

/// Output metric read from each grid cell's returns summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityMetric {
    #[default]
    LpIrr,
    GpIrr,
    LpMultiple,
    GpMultiple,
    LpTotal,
    GpTotal,
}

impl SensitivityMetric {
    fn read(self, summary: &ReturnsSummary) -> Decimal {
        match self {
            SensitivityMetric::LpIrr => summary.lp_irr,
            SensitivityMetric::GpIrr => summary.gp_irr,
            SensitivityMetric::LpMultiple => summary.lp_multiple,
            SensitivityMetric::GpMultiple => summary.gp_multiple,
            SensitivityMetric::LpTotal => summary.lp_total,
            SensitivityMetric::GpTotal => summary.gp_total,
        }
    }
}

/// Input for an exit-multiple x hold-period sensitivity grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityInput {
    /// Base deal; its exit multiple and hold period are overridden per cell
    pub deal: DealEconomics,
    pub exit_multiples: SweepRange,
    pub hold_periods: SweepRange,
    #[serde(default)]
    pub metric: SensitivityMetric,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub metric: SensitivityMetric,
    pub exit_multiple_values: Vec<Multiple>,
    pub hold_period_values: Vec<Years>,
    /// matrix[i][j] = metric at exit_multiple_values[i], hold_period_values[j]
    pub matrix: Vec<Vec<Decimal>>,
    /// Metric for the base deal itself
    pub base_case_value: Decimal,
    /// Grid cell (row, col) closest to the base deal
    pub base_case_position: (usize, usize),
}

/// Generate the sweep values from min to max with step, always ending on max.
fn generate_sweep_values(field: &str, range: &SweepRange) -> SyndicateResult<Vec<Decimal>> {
    if range.step <= Decimal::ZERO {
        return Err(SyndicateError::input(field, "Step must be positive"));
    }
    if range.min > range.max {
        return Err(SyndicateError::input(field, "Min must be <= max"));
    }

    let too_many = || {
        SyndicateError::input(
            field,
            format!("Sweep exceeds {MAX_SWEEP_POINTS} points; use a larger step"),
        )
    };

    let mut values = Vec::new();
    let mut current = range.min;
    while current <= range.max {
        if values.len() == MAX_SWEEP_POINTS {
            return Err(too_many());
        }
        values.push(current);
        current = current
            .checked_add(range.step)
            .ok_or_else(|| SyndicateError::input(field, "Sweep overflows the decimal range"))?;
    }
    if let Some(&last) = values.last() {
        if last < range.max {
            values.push(range.max);
        }
    }
    // the trailing max can push a full sweep one past the cap
    if values.len() > MAX_SWEEP_POINTS {
        return Err(too_many());
    }

    Ok(values)
}

/// Find the closest index to a target value in a sorted list.
fn closest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| (**v - target).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Run the waterfall across a grid of exit multiples and hold periods.
///
/// A cell whose economics fail validation records a warning and 0; the
/// base deal itself must be valid.
pub fn calculate_sensitivity(
    input: &SensitivityInput,
) -> SyndicateResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let base = input.deal.validate()?;
    let base_case_value = input.metric.read(&run_waterfall(&base)?.summary);

    let multiples = generate_sweep_values("exit_multiples", &input.exit_multiples)?;
    let holds = generate_sweep_values("hold_periods", &input.hold_periods)?;

    let mut matrix = Vec::with_capacity(multiples.len());
    for multiple in &multiples {
        let mut row = Vec::with_capacity(holds.len());
        for hold in &holds {
            let mut deal = input.deal.clone();
            deal.exit_multiple = *multiple;
            deal.hold_period_years = Some(*hold);
            let cell = deal
                .validate()
                .and_then(|econ| run_waterfall(&econ))
                .map(|outcome| input.metric.read(&outcome.summary));
            match cell {
                Ok(val) => row.push(val),
                Err(e) => {
                    warnings.push(format!(
                        "Evaluation failed at ({multiple}x, {hold}y): {e}"
                    ));
                    row.push(Decimal::ZERO);
                }
            }
        }
        matrix.push(row);
    }

    let base_row = closest_index(&multiples, base.exit_multiple);
    let base_col = closest_index(&holds, base.hold_period_years);

    let output = SensitivityOutput {
        metric: input.metric,
        exit_multiple_values: multiples,
        hold_period_values: holds,
        matrix,
        base_case_value,
        base_case_position: (base_row, base_col),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Waterfall Sensitivity: Exit Multiple x Hold Period",
        &serde_json::json!({
            "metric": input.metric,
            "base_exit_multiple": base.exit_multiple.to_string(),
            "base_hold_period_years": base.hold_period_years.to_string(),
            "waterfall_kind": base.waterfall_kind,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input(metric: SensitivityMetric) -> SensitivityInput {
        SensitivityInput {
            deal: DealEconomics::with_equity(dec!(1000000)),
            exit_multiples: SweepRange {
                min: dec!(1.0),
                max: dec!(2.0),
                step: dec!(0.4),
            },
            hold_periods: SweepRange {
                min: dec!(3),
                max: dec!(7),
                step: dec!(2),
            },
            metric,
        }
    }

    #[test]
    fn test_sweep_includes_max() {
        let values = generate_sweep_values(
            "x",
            &SweepRange {
                min: dec!(1.0),
                max: dec!(2.0),
                step: dec!(0.4),
            },
        )
        .unwrap();
        assert_eq!(values, vec![dec!(1.0), dec!(1.4), dec!(1.8), dec!(2.0)]);
    }

    #[test]
    fn test_bad_step_rejected() {
        let range = SweepRange {
            min: dec!(1),
            max: dec!(2),
            step: Decimal::ZERO,
        };
        assert!(generate_sweep_values("exit_multiples", &range).is_err());
    }

    #[test]
    fn test_oversized_sweep_rejected() {
        let range = SweepRange {
            min: dec!(0),
            max: dec!(1000),
            step: dec!(0.01),
        };
        assert!(generate_sweep_values("hold_periods", &range).is_err());
    }

    #[test]
    fn test_grid_shape_and_base_case() {
        let out = calculate_sensitivity(&input(SensitivityMetric::LpIrr)).unwrap();
        let res = &out.result;
        assert_eq!(res.matrix.len(), 4);
        assert!(res.matrix.iter().all(|row| row.len() == 3));
        // base deal: 1.8x over 5 years
        assert_eq!(res.base_case_position, (2, 1));
        assert_eq!(res.matrix[2][1], res.base_case_value);
    }

    #[test]
    fn test_break_even_row_has_zero_irr() {
        let out = calculate_sensitivity(&input(SensitivityMetric::LpIrr)).unwrap();
        // 1.0x exit returns capital only
        assert!(out.result.matrix[0].iter().all(|v| v.is_zero()));
    }

    #[test]
    fn test_irr_falls_with_longer_hold() {
        let out = calculate_sensitivity(&input(SensitivityMetric::GpIrr)).unwrap();
        let row = &out.result.matrix[3];
        assert!(row[0] > row[1] && row[1] > row[2]);
    }

    #[test]
    fn test_trailing_max_counts_toward_cap() {
        // 200 stepped points plus the off-step max
        let range = SweepRange {
            min: dec!(0.01),
            max: dec!(2.005),
            step: dec!(0.01),
        };
        assert!(generate_sweep_values("exit_multiples", &range).is_err());

        let at_cap = SweepRange {
            min: dec!(0.01),
            max: dec!(2.00),
            step: dec!(0.01),
        };
        assert_eq!(generate_sweep_values("exit_multiples", &at_cap).unwrap().len(), 200);
    }

    #[test]
    fn test_overflowing_cell_becomes_warning() {
        let mut sens = input(SensitivityMetric::LpIrr);
        sens.deal.preferred_return_pct = 100.0;
        sens.deal.hold_period_years = Some(dec!(5));
        sens.hold_periods = SweepRange {
            min: dec!(5),
            max: dec!(80),
            step: dec!(75),
        };
        let out = calculate_sensitivity(&sens).unwrap();
        // 80-year column overflows the pref pool on every row
        assert_eq!(out.warnings.len(), 4);
        assert!(out.result.matrix.iter().all(|row| row[1].is_zero()));
        assert!(out.result.matrix.iter().all(|row| row.len() == 2));
    }
}
