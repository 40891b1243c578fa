use log::{debug, warn};
use std::collections::BTreeMap;

use crate::columns::ColumnMapping;
use crate::config::*;
use crate::table::Table;

/// The columns of a survey table used by the estimation.
#[derive(PartialEq, Debug, Clone)]
pub struct SurveyColumns {
    pub residency: String,
    pub motive: String,
    pub expenses: ColumnMapping,
}

/// One respondent of the visitor survey, after normalization.
#[derive(PartialEq, Debug, Clone)]
pub struct SurveyRecord {
    pub residency: Residency,
    /// Trimmed and lowercased. Blank answers are `NO_RESPONSE`.
    pub motive: String,
    expenses: BTreeMap<Expense, f64>,
}

impl SurveyRecord {
    pub fn new(residency_answer: &str, motive: Option<&str>) -> SurveyRecord {
        SurveyRecord {
            residency: parse_residency(residency_answer),
            motive: normalize_motive(motive),
            expenses: BTreeMap::new(),
        }
    }

    /// Records a value for an expenditure variable. Non-finite values are ignored.
    pub fn with_expense(mut self, expense: Expense, value: Option<f64>) -> SurveyRecord {
        match value.filter(|v| v.is_finite()) {
            Some(v) => {
                self.expenses.insert(expense, v);
            }
            None => {
                self.expenses.remove(&expense);
            }
        }
        self
    }

    pub fn expense(&self, expense: Expense) -> Option<f64> {
        self.expenses.get(&expense).cloned()
    }

    pub fn is_valid(&self) -> bool {
        self.residency != Residency::Unrecognized
    }

    pub fn is_non_local(&self) -> bool {
        self.residency == Residency::NonLocal
    }

    /// Reads all the respondents of a survey table.
    ///
    /// The residency and motive columns are required. Expenditure columns
    /// that are not mapped, or not present in the table, are treated as absent.
    pub fn from_table(table: &Table, columns: &SurveyColumns) -> Result<Vec<SurveyRecord>, ImpactError> {
        let residency_idx = table.column_index(&columns.residency).ok_or_else(|| {
            ImpactError::Validation(format!(
                "residency column not found: '{}'",
                columns.residency
            ))
        })?;
        let motive_idx = table.column_index(&columns.motive).ok_or_else(|| {
            ImpactError::Validation(format!("motive column not found: '{}'", columns.motive))
        })?;

        let mut expense_idxs: Vec<(Expense, usize)> = Vec::new();
        for expense in Expense::ALL {
            match columns.expenses.column(expense) {
                Some(name) => match table.column_index(name) {
                    Some(idx) => expense_idxs.push((expense, idx)),
                    None => warn!(
                        "from_table: column '{}' for {:?} is not in the survey, treating it as absent",
                        name, expense
                    ),
                },
                None => debug!("from_table: no column for {:?}", expense),
            }
        }

        let mut res: Vec<SurveyRecord> = Vec::new();
        for row in 0..table.len() {
            let motive_cell = table.cell(row, motive_idx);
            let motive = if motive_cell.is_empty() {
                None
            } else {
                Some(motive_cell.as_text())
            };
            let mut record = SurveyRecord::new(&table.cell(row, residency_idx).as_text(), motive.as_deref());
            for (expense, idx) in expense_idxs.iter() {
                record = record.with_expense(*expense, table.cell(row, *idx).as_number());
            }
            res.push(record);
        }
        debug!("from_table: read {} respondents", res.len());
        Ok(res)
    }
}

/// Yes / no answers, compared case- and whitespace-insensitively.
pub fn parse_residency(answer: &str) -> Residency {
    match answer.trim().to_lowercase().as_str() {
        "sí" | "si" => Residency::Local,
        "no" => Residency::NonLocal,
        _ => Residency::Unrecognized,
    }
}

pub fn normalize_motive(motive: Option<&str>) -> String {
    match motive.map(|m| m.trim()) {
        Some(m) if !m.is_empty() => m.to_lowercase(),
        _ => NO_RESPONSE.to_string(),
    }
}

/// One event or venue with its potential attendance.
#[derive(PartialEq, Debug, Clone)]
pub struct CapacityRecord {
    pub event: String,
    /// None when the value is missing or not numeric. Counted as zero.
    pub capacity: Option<f64>,
}

impl CapacityRecord {
    pub fn new(event: &str, capacity: Option<f64>) -> Result<CapacityRecord, ImpactError> {
        match capacity {
            Some(c) if c < 0.0 => Err(ImpactError::Validation(format!(
                "negative capacity {} for event '{}'",
                c, event
            ))),
            _ => Ok(CapacityRecord {
                event: event.to_string(),
                capacity: capacity.filter(|c| c.is_finite()),
            }),
        }
    }

    /// Reads a capacity table. The event column is optional.
    pub fn from_table(
        table: &Table,
        event_column: &str,
        capacity_column: &str,
    ) -> Result<Vec<CapacityRecord>, ImpactError> {
        let capacity_idx = table.column_index(capacity_column).ok_or_else(|| {
            ImpactError::Schema(format!(
                "the capacity table must have the column '{}'",
                capacity_column
            ))
        })?;
        let event_idx = table.column_index(event_column);
        if event_idx.is_none() {
            warn!(
                "CapacityRecord::from_table: no event column '{}'",
                event_column
            );
        }
        (0..table.len())
            .map(|row| {
                let event = event_idx
                    .map(|idx| table.cell(row, idx).as_text())
                    .unwrap_or_default();
                CapacityRecord::new(event.trim(), table.cell(row, capacity_idx).as_number())
            })
            .collect()
    }
}

/// Sum of the capacities, missing values counting as zero.
pub fn potential_capacity(records: &[CapacityRecord]) -> f64 {
    records.iter().map(|r| r.capacity.unwrap_or(0.0)).sum()
}

/// The rows of one event.
pub fn filter_event(records: &[CapacityRecord], event: &str) -> Vec<CapacityRecord> {
    let event = event.trim();
    records.iter().filter(|r| r.event == event).cloned().collect()
}

/// The distinct events, in order of appearance.
pub fn events(records: &[CapacityRecord]) -> Vec<String> {
    let mut res: Vec<String> = Vec::new();
    for r in records.iter() {
        if !res.contains(&r.event) {
            res.push(r.event.clone());
        }
    }
    res
}
