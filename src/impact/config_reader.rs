use crate::impact::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_CAPACITY_COLUMN: &str = "Potential capacity";
pub const DEFAULT_EVENT_COLUMN: &str = "Event";
pub const DEFAULT_RESIDENCY_COLUMN: &str = "¿Reside en la ciudad de Cartagena de Indias?";
pub const DEFAULT_MOTIVE_COLUMN: &str = "¿Cuál fue el motivo de su viaje a la ciudad de Cartagena?";
pub const DEFAULT_SECTOR_COLUMN: &str = "Code";
pub const DEFAULT_DIRECT_VALUE_COLUMN: &str = "Sales";
pub const DEFAULT_MULTIPLIER_COLUMN: &str = "Multiplier";

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct InputFiles {
    pub survey: Option<String>,
    pub capacity: Option<String>,
    #[serde(rename = "directEffect")]
    pub direct_effect: Option<String>,
    pub multipliers: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct SurveyColumnsConfig {
    pub residency: Option<String>,
    pub motive: Option<String>,
    /// Explicit spending columns, keyed by `eventSpend`, `stayNights`, `lodging`, `food`, `transport`.
    pub expenses: Option<BTreeMap<String, String>>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct CapacityColumnsConfig {
    pub event: Option<String>,
    pub capacity: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct SectorColumnsConfig {
    #[serde(rename = "directKey")]
    pub direct_key: Option<String>,
    #[serde(rename = "directValue")]
    pub direct_value: Option<String>,
    #[serde(rename = "multiplierKey")]
    pub multiplier_key: Option<String>,
    pub multiplier: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct EstimatorConfig {
    #[serde(rename = "primaryMotive")]
    pub primary_motive: Option<String>,
    #[serde(rename = "preferredMotive")]
    pub preferred_motive: Option<String>,
    #[serde(rename = "weightPrimary")]
    pub weight_primary: Option<f64>,
    #[serde(rename = "weightOthers")]
    pub weight_others: Option<f64>,
    pub correction: Option<bool>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct StatisticsConfig {
    pub mode: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct MultipliersConfig {
    pub general: Option<f64>,
    pub lodging: Option<f64>,
    pub food: Option<f64>,
    pub transport: Option<f64>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct ImpactConfig {
    #[serde(default)]
    pub inputs: InputFiles,
    #[serde(rename = "surveyColumns", default)]
    pub survey_columns: SurveyColumnsConfig,
    #[serde(rename = "matchThreshold")]
    pub match_threshold: Option<f64>,
    #[serde(rename = "capacityColumns", default)]
    pub capacity_columns: CapacityColumnsConfig,
    pub event: Option<String>,
    #[serde(rename = "sectorColumns", default)]
    pub sector_columns: SectorColumnsConfig,
    #[serde(default)]
    pub estimator: EstimatorConfig,
    #[serde(default)]
    pub statistics: StatisticsConfig,
    #[serde(default)]
    pub multipliers: MultipliersConfig,
    #[serde(rename = "missingValues")]
    pub missing_values: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    /// Divisor of the amounts in the exports, 1000000 for millions.
    pub scale: Option<f64>,
}

impl ImpactConfig {
    pub fn residency_column(&self) -> String {
        self.survey_columns
            .residency
            .clone()
            .unwrap_or_else(|| DEFAULT_RESIDENCY_COLUMN.to_string())
    }

    pub fn motive_column(&self) -> String {
        self.survey_columns
            .motive
            .clone()
            .unwrap_or_else(|| DEFAULT_MOTIVE_COLUMN.to_string())
    }

    /// The explicit spending columns.
    pub fn explicit_expenses(&self) -> ImpactCliResult<BTreeMap<Expense, String>> {
        let mut res = BTreeMap::new();
        if let Some(m) = &self.survey_columns.expenses {
            for (k, v) in m.iter() {
                let e = Expense::from_key(k).context(UnknownExpenseSnafu { key: k.clone() })?;
                res.insert(e, v.clone());
            }
        }
        Ok(res)
    }

    pub fn selection_mode(&self) -> ImpactCliResult<SelectionMode> {
        parse_selection_mode(self.statistics.mode.as_deref().unwrap_or("automatic"))
    }

    pub fn missing_value_policy(&self) -> ImpactCliResult<MissingValuePolicy> {
        match self.missing_values.as_deref() {
            None | Some("zeroFill") => Ok(MissingValuePolicy::ZeroFill),
            Some("excludeCategory") => Ok(MissingValuePolicy::ExcludeCategory),
            Some(x) => whatever!("unknown missing values policy: {}", x),
        }
    }

    pub fn scale(&self) -> ImpactCliResult<f64> {
        match self.scale {
            None => Ok(1.0),
            Some(x) if x.is_finite() && x > 0.0 => Ok(x),
            Some(x) => whatever!("the scale must be a positive number, got {}", x),
        }
    }

    pub fn estimator_params(&self) -> EstimatorParams {
        let defaults = EstimatorParams::default();
        EstimatorParams {
            primary_motive: self.estimator.primary_motive.clone(),
            preferred_motive: self
                .estimator
                .preferred_motive
                .clone()
                .unwrap_or(defaults.preferred_motive),
            weight_primary: self
                .estimator
                .weight_primary
                .unwrap_or(defaults.weight_primary),
            weight_others: self
                .estimator
                .weight_others
                .unwrap_or(defaults.weight_others),
            correction: self.estimator.correction.unwrap_or(defaults.correction),
        }
    }

    pub fn category_multipliers(&self) -> CategoryMultipliers {
        CategoryMultipliers {
            general: self.multipliers.general.unwrap_or(1.0),
            lodging: self.multipliers.lodging,
            food: self.multipliers.food,
            transport: self.multipliers.transport,
        }
    }
}

pub fn parse_selection_mode(s: &str) -> ImpactCliResult<SelectionMode> {
    match s {
        "automatic" => Ok(SelectionMode::Automatic),
        "mean" => Ok(SelectionMode::ForceMean),
        "median" => Ok(SelectionMode::ForceMedian),
        x => whatever!("unknown statistics mode: {} (automatic, mean or median)", x),
    }
}

pub fn read_config(path: &str) -> ImpactCliResult<ImpactConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ImpactConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

/// Reads a reference report.
pub fn read_summary(path: &str) -> ImpactCliResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
