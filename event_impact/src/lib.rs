/*!
Estimation of the economic impact of religious-tourism events.

The estimation runs in four stages, each one producing a new immutable value:

1. [`population::estimate_population`] estimates the number of non-local
   visitors (PNL) from the residency and travel motive answers of a survey and
   the capacity of the events.
2. [`distribution::evaluate_columns`] describes the spending of the non-local
   respondents and picks, for every variable, the mean or the median depending
   on a normality test.
3. [`effects::compute_effects`] turns the PNL and the selected daily spending
   into indirect and net induced effects per category.
4. [`sectors::aggregate_sectors`] joins the direct effect of each economic
   sector with its multiplier and reports the total effect.

[`run_impact_analysis`] chains the four stages.
*/

mod config;

pub mod builder;
pub mod columns;
pub mod distribution;
pub mod effects;
pub mod manual;
pub mod population;
pub mod sectors;
pub mod survey;
pub mod table;

use log::info;
use std::collections::BTreeMap;

pub use crate::config::*;
pub use crate::effects::compute_effects;
pub use crate::population::{estimate_population, motive_counts, PopulationEstimate};
pub use crate::sectors::{aggregate_sectors, DirectEffect, SectorMultiplier, SectorReport, SectorRow};
pub use crate::survey::{CapacityRecord, SurveyRecord};

/// The datasets of one analysis, already read and validated.
#[derive(PartialEq, Debug, Clone)]
pub struct ImpactInputs {
    pub survey: Vec<SurveyRecord>,
    pub capacity: Vec<CapacityRecord>,
    pub direct: Vec<DirectEffect>,
    pub multipliers: Vec<SectorMultiplier>,
}

/// The outcome of all the stages of an analysis.
#[derive(PartialEq, Debug, Clone)]
pub struct ImpactReport {
    pub population: PopulationEstimate,
    /// Statistics of the spending of the non-local respondents.
    pub statistics: BTreeMap<Expense, VariableStatistics>,
    pub effects: EffectReport,
    pub sectors: SectorReport,
}

/// Runs the estimation pipeline on one set of datasets.
///
/// Arguments:
/// * `inputs` the survey, capacity, direct effect and multiplier datasets
/// * `settings` the parameters of every stage
pub fn run_impact_analysis(
    inputs: &ImpactInputs,
    settings: &PipelineSettings,
) -> Result<ImpactReport, ImpactError> {
    info!(
        "run_impact_analysis: {} respondents, {} capacity rows, {} sectors, {} multipliers",
        inputs.survey.len(),
        inputs.capacity.len(),
        inputs.direct.len(),
        inputs.multipliers.len()
    );
    let population = estimate_population(&inputs.survey, &inputs.capacity, &settings.estimator)?;

    let statistics = distribution::evaluate_columns(
        &population.non_local,
        &Expense::ALL,
        settings.selection_mode,
    );
    for (e, s) in statistics.iter() {
        info!(
            "run_impact_analysis: {:?}: n={} mean={:.2} median={:.2} p={:.4} -> {}",
            e,
            s.n,
            s.mean,
            s.median,
            s.p_value,
            s.recommendation.label()
        );
    }

    let effects = compute_effects(
        &statistics,
        population.pnl,
        &settings.multipliers,
        settings.missing_values,
    );
    let sectors = aggregate_sectors(&inputs.direct, &inputs.multipliers, &effects.summary);

    Ok(ImpactReport {
        population,
        statistics,
        effects,
        sectors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn inputs() -> ImpactInputs {
        let mut b = Builder::new();
        for i in 0..6 {
            b.add_respondent("si", Some("trabajo"), &[(Expense::Lodging, 999.0)]);
            let nights = 2.0 + (i % 3) as f64;
            b.add_respondent(
                "no",
                Some(DEFAULT_PREFERRED_MOTIVE),
                &[
                    (Expense::Lodging, 100.0 + 10.0 * i as f64),
                    (Expense::Food, 50.0),
                    (Expense::StayNights, nights),
                ],
            );
        }
        b.add_capacity("Procesión", Some(1000.0)).unwrap();
        ImpactInputs {
            survey: b.survey().to_vec(),
            capacity: b.capacity().to_vec(),
            direct: vec![DirectEffect {
                sector: "hoteles".to_string(),
                value: 5000.0,
            }],
            multipliers: vec![SectorMultiplier {
                sector: "hoteles".to_string(),
                multiplier: 1.4,
            }],
        }
    }

    #[test]
    fn full_pipeline() {
        init_logger();
        let settings = PipelineSettings {
            selection_mode: SelectionMode::ForceMedian,
            multipliers: CategoryMultipliers::uniform(1.5),
            ..PipelineSettings::default()
        };
        let report = run_impact_analysis(&inputs(), &settings).unwrap();
        assert_eq!(report.population.pnl, 500.0);
        // Only the non-local answers are described.
        let lodging = report.statistics[&Expense::Lodging];
        assert_eq!(lodging.n, 6);
        assert_eq!(lodging.median, 125.0);
        assert_eq!(report.statistics[&Expense::StayNights].median, 3.0);
        assert_eq!(
            report.statistics[&Expense::Transport].recommendation,
            Recommendation::InsufficientData
        );

        let indirect = 500.0 * (125.0 + 50.0) * 3.0;
        assert_eq!(report.effects.summary.indirect_total, indirect);
        assert_eq!(report.effects.summary.induced_net_total, indirect * 0.5);
        assert_eq!(
            report.sectors.total_effect,
            5000.0 + indirect + indirect * 0.5
        );
        assert_eq!(report.sectors.rows.len(), 1);
    }

    #[test]
    fn pipeline_is_deterministic() {
        let settings = PipelineSettings::default();
        let a = run_impact_analysis(&inputs(), &settings).unwrap();
        let b = run_impact_analysis(&inputs(), &settings).unwrap();
        assert_eq!(
            a.effects.summary.indirect_total.to_bits(),
            b.effects.summary.indirect_total.to_bits()
        );
        assert_eq!(a.population, b.population);
    }

    #[test]
    fn pipeline_stops_on_invalid_survey() {
        let mut i = inputs();
        i.survey.clear();
        let res = run_impact_analysis(&i, &PipelineSettings::default());
        assert!(matches!(res, Err(ImpactError::Validation(_))));
    }
}
