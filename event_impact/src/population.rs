//! Estimation of the number of non-local visitors attributable to an event (PNL).

use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};

use crate::config::*;
use crate::survey::{potential_capacity, CapacityRecord, SurveyRecord};

/// The outcome of the population estimation. Immutable once created.
#[derive(PartialEq, Debug, Clone)]
pub struct PopulationEstimate {
    /// Estimated number of non-local visitors.
    pub pnl: f64,
    pub potential_capacity: f64,
    /// Respondents with a recognized residency answer.
    pub total_valid: usize,
    pub non_local_total: usize,
    pub primary_motive: String,
    pub primary_count: usize,
    /// Share of non-local respondents among the valid ones.
    pub tourism_proportion: f64,
    /// The weighting factor (ponderador).
    pub weighting: f64,
    pub weight_primary: f64,
    pub weight_others: f64,
    /// The primary weight after correction, equal to `weight_primary` if no correction happened.
    pub effective_primary_weight: f64,
    pub num_categories: usize,
    pub more_than_two_categories: bool,
    /// Fraction of non-local respondents with another motive than the primary one.
    pub correction_factor: f64,
    pub correction_applied: bool,
    /// The non-local respondents, used for the expenditure statistics.
    pub non_local: Vec<SurveyRecord>,
}

/// The motives given by the non-local respondents, with their counts.
/// Most frequent first, ties in order of first appearance.
pub fn motive_counts(survey: &[SurveyRecord]) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for r in survey.iter().filter(|r| r.is_non_local()) {
        let c = counts.entry(r.motive.clone()).or_insert(0);
        if *c == 0 {
            order.push(r.motive.clone());
        }
        *c += 1;
    }
    let mut res: Vec<(String, usize)> = order
        .into_iter()
        .map(|m| {
            let c = counts.get(&m).cloned().unwrap_or(0);
            (m, c)
        })
        .collect();
    // Stable sort: ties keep the order of appearance.
    res.sort_by(|a, b| b.1.cmp(&a.1));
    res
}

fn choose_primary_motive(non_local: &[SurveyRecord], params: &EstimatorParams) -> String {
    if let Some(m) = params.primary_motive.as_deref() {
        return crate::survey::normalize_motive(Some(m));
    }
    let preferred = crate::survey::normalize_motive(Some(params.preferred_motive.as_str()));
    let counts = motive_counts(non_local);
    if counts.iter().any(|(m, _)| *m == preferred) {
        preferred
    } else if let Some((m, _)) = counts.first() {
        m.clone()
    } else {
        NO_RESPONSE.to_string()
    }
}

/// Computes the estimated population of non-local visitors.
///
/// Arguments:
/// * `survey` all the respondents of the survey
/// * `capacity` the events or venues to account for
/// * `params` the motive weights and correction policy
pub fn estimate_population(
    survey: &[SurveyRecord],
    capacity: &[CapacityRecord],
    params: &EstimatorParams,
) -> Result<PopulationEstimate, ImpactError> {
    let valid: Vec<&SurveyRecord> = survey.iter().filter(|r| r.is_valid()).collect();
    let total_valid = valid.len();
    debug!(
        "estimate_population: {} respondents, {} valid",
        survey.len(),
        total_valid
    );
    if total_valid == 0 {
        return Err(ImpactError::Validation(
            "no valid respondent (yes/no) in the residency column".to_string(),
        ));
    }

    let potential_capacity = potential_capacity(capacity);

    let non_local: Vec<SurveyRecord> = valid
        .iter()
        .filter(|r| r.is_non_local())
        .map(|r| (*r).clone())
        .collect();
    let non_local_total = non_local.len();

    if non_local_total == 0 {
        warn!("estimate_population: no non-local respondent, the estimate is zero");
        return Ok(PopulationEstimate {
            pnl: 0.0,
            potential_capacity,
            total_valid,
            non_local_total: 0,
            primary_motive: choose_primary_motive(&non_local, params),
            primary_count: 0,
            tourism_proportion: 0.0,
            weighting: 0.0,
            weight_primary: params.weight_primary,
            weight_others: params.weight_others,
            effective_primary_weight: params.weight_primary,
            num_categories: 0,
            more_than_two_categories: false,
            correction_factor: 0.0,
            correction_applied: false,
            non_local,
        });
    }

    let primary_motive = choose_primary_motive(&non_local, params);
    let primary_count = non_local
        .iter()
        .filter(|r| r.motive == primary_motive)
        .count();
    let others_count = non_local_total - primary_count;

    let tourism_proportion = non_local_total as f64 / total_valid as f64;
    let frac_primary = primary_count as f64 / non_local_total as f64;
    let frac_others = others_count as f64 / non_local_total as f64;

    let num_categories = non_local
        .iter()
        .map(|r| r.motive.as_str())
        .collect::<HashSet<&str>>()
        .len();
    let more_than_two_categories = num_categories > 2;
    let correction_applied = more_than_two_categories && params.correction;

    let effective_primary_weight = if correction_applied {
        params.weight_primary - frac_others
    } else {
        params.weight_primary
    };
    let weighting = effective_primary_weight * frac_primary + params.weight_others * frac_others;
    let pnl = potential_capacity * tourism_proportion * weighting;

    info!(
        "estimate_population: capacity {} x proportion {:.4} ({}/{}) x weighting {:.4} = PNL {:.2}",
        potential_capacity, tourism_proportion, non_local_total, total_valid, weighting, pnl
    );
    debug!(
        "estimate_population: primary motive {:?}: {} of {}, {} categories, correction applied: {}",
        primary_motive, primary_count, non_local_total, num_categories, correction_applied
    );

    Ok(PopulationEstimate {
        pnl,
        potential_capacity,
        total_valid,
        non_local_total,
        primary_motive,
        primary_count,
        tourism_proportion,
        weighting,
        weight_primary: params.weight_primary,
        weight_others: params.weight_others,
        effective_primary_weight,
        num_categories,
        more_than_two_categories,
        correction_factor: frac_others,
        correction_applied,
        non_local,
    })
}
