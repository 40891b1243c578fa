pub use crate::config::*;
use crate::survey::{CapacityRecord, SurveyRecord};

/// A builder for assembling a survey and its capacity figures without going
/// through a spreadsheet.
///
/// ```
/// use event_impact::builder::Builder;
/// use event_impact::{estimate_population, EstimatorParams, Expense, ImpactError};
///
/// let mut builder = Builder::new();
/// builder.add_respondent("No", Some("attending the religious events"), &[(Expense::Lodging, 80000.0)]);
/// builder.add_respondent("Sí", None, &[]);
/// builder.add_capacity("Procession", Some(2000.0))?;
///
/// let estimate = estimate_population(builder.survey(), builder.capacity(), &EstimatorParams::default())?;
/// assert_eq!(estimate.pnl, 1000.0);
///
/// # Ok::<(), ImpactError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    _survey: Vec<SurveyRecord>,
    _capacity: Vec<CapacityRecord>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    /// Adds a respondent.
    ///
    /// residency: the raw answer to the residency question (`sí`, `si`, `no`, or anything else).
    pub fn add_respondent(
        &mut self,
        residency: &str,
        motive: Option<&str>,
        expenses: &[(Expense, f64)],
    ) {
        let mut record = SurveyRecord::new(residency, motive);
        for (e, v) in expenses {
            record = record.with_expense(*e, Some(*v));
        }
        self._survey.push(record);
    }

    /// Adds an event or venue. Fails on negative capacities.
    pub fn add_capacity(&mut self, event: &str, capacity: Option<f64>) -> Result<(), ImpactError> {
        self._capacity.push(CapacityRecord::new(event, capacity)?);
        Ok(())
    }

    pub fn survey(&self) -> &[SurveyRecord] {
        &self._survey
    }

    pub fn capacity(&self) -> &[CapacityRecord] {
        &self._capacity
    }
}
