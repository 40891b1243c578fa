//! Indirect and net induced effects of the visitors' spending.
//!
//! For every spending category r:
//!
//! ```text
//! indirect_r    = PNL * daily_value_r * stay_days
//! induced_net_r = indirect_r * multiplier_r - indirect_r
//! ```

use log::{debug, info, warn};
use std::collections::BTreeMap;

use crate::config::*;

// Undefined values become zero. Returns the value and whether it was replaced.
fn defined_or_zero(x: Option<f64>) -> (f64, bool) {
    match x {
        Some(v) if v.is_finite() => (v, false),
        _ => (0.0, true),
    }
}

fn selected(statistics: &BTreeMap<Expense, VariableStatistics>, expense: Expense) -> Option<f64> {
    statistics.get(&expense).map(|s| s.selected_value())
}

/// Computes the effects from the population estimate and the statistics of
/// the non-local respondents.
///
/// Arguments:
/// * `statistics` the statistics of each expenditure variable. Absent
///   variables are undefined.
/// * `pnl` the estimated number of non-local visitors
/// * `multipliers` the general multiplier and its per-category overrides
/// * `policy` the treatment of undefined values
pub fn compute_effects(
    statistics: &BTreeMap<Expense, VariableStatistics>,
    pnl: f64,
    multipliers: &CategoryMultipliers,
    policy: MissingValuePolicy,
) -> EffectReport {
    let (stay_days, stay_imputed) = defined_or_zero(selected(statistics, Expense::StayNights));
    if stay_imputed {
        warn!("compute_effects: the stay duration is undefined, using 0 days");
    }

    let mut breakdown: Vec<EffectBreakdownRow> = Vec::new();
    for category in EffectCategory::SPENDING {
        let expense = match category.expense() {
            Some(e) => e,
            None => continue,
        };
        let (daily_value, value_imputed) = defined_or_zero(selected(statistics, expense));
        let imputed = value_imputed || stay_imputed;
        if imputed && policy == MissingValuePolicy::ExcludeCategory {
            warn!(
                "compute_effects: {} excluded: undefined daily value or stay duration",
                category.label()
            );
            continue;
        }
        if value_imputed {
            warn!(
                "compute_effects: the daily value of {} is undefined, using 0",
                category.label()
            );
        }
        let indirect = pnl * daily_value * stay_days;
        let multiplier = multipliers.for_category(category);
        let induced_net = indirect * multiplier - indirect;
        debug!(
            "compute_effects: {}: {} x {} x {} = {}, multiplier {} -> induced {}",
            category.label(),
            pnl,
            daily_value,
            stay_days,
            indirect,
            multiplier,
            induced_net
        );
        breakdown.push(EffectBreakdownRow {
            category,
            daily_value,
            indirect,
            induced_net,
            imputed,
        });
    }

    let total = EffectBreakdownRow {
        category: EffectCategory::Total,
        daily_value: breakdown.iter().map(|r| r.daily_value).sum(),
        indirect: breakdown.iter().map(|r| r.indirect).sum(),
        induced_net: breakdown.iter().map(|r| r.induced_net).sum(),
        imputed: breakdown.iter().any(|r| r.imputed),
    };

    let summary = EffectSummary {
        pnl,
        stay_days,
        general_multiplier: multipliers.general,
        lodging_multiplier: multipliers.for_category(EffectCategory::Lodging),
        food_multiplier: multipliers.for_category(EffectCategory::Food),
        transport_multiplier: multipliers.for_category(EffectCategory::Transport),
        indirect_total: total.indirect,
        induced_net_total: total.induced_net,
    };
    info!(
        "compute_effects: indirect total {:.2}, induced net total {:.2}",
        summary.indirect_total, summary.induced_net_total
    );
    breakdown.push(total);

    EffectReport { summary, breakdown }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(mean: f64, median: f64, recommendation: Recommendation) -> VariableStatistics {
        VariableStatistics {
            n: 10,
            tested_n: 10,
            mean,
            median,
            p_value: 0.5,
            recommendation,
        }
    }

    fn reference_statistics() -> BTreeMap<Expense, VariableStatistics> {
        let mut s = BTreeMap::new();
        s.insert(Expense::Lodging, stat(100.0, 80.0, Recommendation::Mean));
        s.insert(Expense::Food, stat(50.0, 40.0, Recommendation::Median));
        s.insert(Expense::Transport, stat(20.0, 30.0, Recommendation::Mean));
        s.insert(Expense::StayNights, stat(3.0, 2.0, Recommendation::Median));
        s
    }

    fn row(report: &EffectReport, category: EffectCategory) -> &EffectBreakdownRow {
        report
            .breakdown
            .iter()
            .find(|r| r.category == category)
            .unwrap()
    }

    #[test]
    fn per_category_effects() {
        let multipliers = CategoryMultipliers {
            general: 1.5,
            lodging: Some(2.0),
            food: None,
            transport: None,
        };
        let report = compute_effects(
            &reference_statistics(),
            1000.0,
            &multipliers,
            MissingValuePolicy::ZeroFill,
        );
        assert_eq!(report.breakdown.len(), 4);
        let lodging = row(&report, EffectCategory::Lodging);
        assert_eq!(lodging.daily_value, 100.0);
        assert_eq!(lodging.indirect, 1000.0 * 100.0 * 2.0);
        assert_eq!(lodging.induced_net, 200000.0);
        let food = row(&report, EffectCategory::Food);
        assert_eq!(food.daily_value, 40.0);
        assert_eq!(food.indirect, 80000.0);
        assert_eq!(food.induced_net, 40000.0);
        let transport = row(&report, EffectCategory::Transport);
        assert_eq!(transport.indirect, 40000.0);

        let total = row(&report, EffectCategory::Total);
        assert_eq!(total.daily_value, 160.0);
        assert_eq!(total.indirect, 320000.0);
        assert_eq!(total.induced_net, 200000.0 + 40000.0 + 20000.0);
        assert!(!total.imputed);

        assert_eq!(report.summary.stay_days, 2.0);
        assert_eq!(report.summary.lodging_multiplier, 2.0);
        assert_eq!(report.summary.food_multiplier, 1.5);
        assert_eq!(report.summary.indirect_total, total.indirect);
        assert_eq!(report.summary.induced_net_total, total.induced_net);
    }

    #[test]
    fn unit_multipliers_induce_nothing() {
        let report = compute_effects(
            &reference_statistics(),
            1234.5,
            &CategoryMultipliers::uniform(1.0),
            MissingValuePolicy::ZeroFill,
        );
        for r in report.breakdown.iter() {
            assert_eq!(r.induced_net, 0.0);
        }
        assert_eq!(report.summary.induced_net_total, 0.0);
    }

    #[test]
    fn missing_values_are_zero_filled() {
        let mut statistics = reference_statistics();
        statistics.remove(&Expense::Transport);
        statistics.insert(
            Expense::Food,
            VariableStatistics {
                n: 2,
                tested_n: 0,
                mean: f64::NAN,
                median: f64::NAN,
                p_value: f64::NAN,
                recommendation: Recommendation::InsufficientData,
            },
        );
        let report = compute_effects(
            &statistics,
            10.0,
            &CategoryMultipliers::uniform(2.0),
            MissingValuePolicy::ZeroFill,
        );
        assert_eq!(report.breakdown.len(), 4);
        let food = row(&report, EffectCategory::Food);
        assert_eq!(food.daily_value, 0.0);
        assert_eq!(food.indirect, 0.0);
        assert!(food.imputed);
        assert!(row(&report, EffectCategory::Transport).imputed);
        assert!(!row(&report, EffectCategory::Lodging).imputed);
        assert_eq!(report.summary.indirect_total, 10.0 * 100.0 * 2.0);
    }

    #[test]
    fn missing_values_can_be_excluded() {
        let mut statistics = reference_statistics();
        statistics.remove(&Expense::Transport);
        let report = compute_effects(
            &statistics,
            10.0,
            &CategoryMultipliers::uniform(2.0),
            MissingValuePolicy::ExcludeCategory,
        );
        let categories: Vec<EffectCategory> = report.breakdown.iter().map(|r| r.category).collect();
        assert_eq!(
            categories,
            vec![
                EffectCategory::Lodging,
                EffectCategory::Food,
                EffectCategory::Total
            ]
        );

        statistics.remove(&Expense::StayNights);
        let report = compute_effects(
            &statistics,
            10.0,
            &CategoryMultipliers::uniform(2.0),
            MissingValuePolicy::ExcludeCategory,
        );
        assert_eq!(report.breakdown.len(), 1);
        assert_eq!(report.summary.indirect_total, 0.0);
    }
}
