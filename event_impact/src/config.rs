// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The expenditure variables collected in a visitor survey.
///
/// The daily expenses (lodging, food, transport) are multiplied by the stay
/// duration to obtain the indirect effect. The event spend is only reported.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Expense {
    EventSpend,
    StayNights,
    Lodging,
    Food,
    Transport,
}

impl Expense {
    pub const ALL: [Expense; 5] = [
        Expense::EventSpend,
        Expense::StayNights,
        Expense::Lodging,
        Expense::Food,
        Expense::Transport,
    ];

    /// The short label used in reports and configuration files.
    pub fn key(&self) -> &'static str {
        match self {
            Expense::EventSpend => "eventSpend",
            Expense::StayNights => "stayNights",
            Expense::Lodging => "lodging",
            Expense::Food => "food",
            Expense::Transport => "transport",
        }
    }

    pub fn from_key(key: &str) -> Option<Expense> {
        Expense::ALL.iter().find(|e| e.key() == key).cloned()
    }

    /// The question asked in the reference survey for this variable.
    /// Survey headers are matched approximately against these labels.
    pub fn canonical_label(&self) -> &'static str {
        match self {
            Expense::EventSpend => "¿Cuánto ha gastado aproximadamente en actividades relacionadas con LOS EVENTOS RELIGIOSOS DE SEMANA SANTA EN CARTAGENA (souvenirs, artesanías, libros, etc.)?",
            Expense::StayNights => "¿Cuántos días estará en la ciudad de Cartagena?",
            Expense::Lodging => "¿Cuánto está gastando gasto diariamente en alojamiento? (Por persona):",
            Expense::Food => "En promedio ¿Cuánto ha sido su gasto diario en alimentación y bebidas durante su estadía en la ciudad?",
            Expense::Transport => "En promedio ¿Cuánto ha sido su gasto diario en transporte durante su estadía en la ciudad?",
        }
    }
}

/// The answer to the residency question of the survey.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Residency {
    /// The respondent lives in the city hosting the event.
    Local,
    /// The respondent travelled to the event.
    NonLocal,
    /// Anything else than yes or no. These respondents are not counted.
    Unrecognized,
}

// ******** Output data structures *********

/// Which central statistic should be used downstream for a variable.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Recommendation {
    Mean,
    Median,
    /// Fewer than 3 valid observations.
    InsufficientData,
}

impl Recommendation {
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::Mean => "mean",
            Recommendation::Median => "median",
            Recommendation::InsufficientData => "insufficient-data",
        }
    }
}

/// Descriptive statistics of one expenditure variable.
///
/// Undefined values (too few observations, failed test) are NaN.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct VariableStatistics {
    /// Number of valid observations.
    pub n: usize,
    /// Number of observations that went through the normality test.
    pub tested_n: usize,
    pub mean: f64,
    pub median: f64,
    /// p-value of the Shapiro-Wilk test.
    pub p_value: f64,
    pub recommendation: Recommendation,
}

impl VariableStatistics {
    /// The statistic chosen by the recommendation. The median is used for
    /// everything that is not explicitly the mean.
    pub fn selected_value(&self) -> f64 {
        match self.recommendation {
            Recommendation::Mean => self.mean,
            _ => self.median,
        }
    }
}

/// The categories of the indirect effect breakdown.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum EffectCategory {
    Lodging,
    Food,
    Transport,
    Total,
}

impl EffectCategory {
    pub const SPENDING: [EffectCategory; 3] = [
        EffectCategory::Lodging,
        EffectCategory::Food,
        EffectCategory::Transport,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EffectCategory::Lodging => "lodging",
            EffectCategory::Food => "food",
            EffectCategory::Transport => "transport",
            EffectCategory::Total => "total",
        }
    }

    /// The survey variable holding the daily expense of this category.
    pub fn expense(&self) -> Option<Expense> {
        match self {
            EffectCategory::Lodging => Some(Expense::Lodging),
            EffectCategory::Food => Some(Expense::Food),
            EffectCategory::Transport => Some(Expense::Transport),
            EffectCategory::Total => None,
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct EffectBreakdownRow {
    pub category: EffectCategory,
    /// The daily expense per visitor used in the computation.
    pub daily_value: f64,
    pub indirect: f64,
    pub induced_net: f64,
    /// True if the daily value or the stay duration was undefined and replaced by zero.
    pub imputed: bool,
}

#[derive(PartialEq, Debug, Clone)]
pub struct EffectSummary {
    pub pnl: f64,
    pub stay_days: f64,
    pub general_multiplier: f64,
    pub lodging_multiplier: f64,
    pub food_multiplier: f64,
    pub transport_multiplier: f64,
    pub indirect_total: f64,
    pub induced_net_total: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct EffectReport {
    pub summary: EffectSummary,
    /// One row per spending category, followed by the total row.
    pub breakdown: Vec<EffectBreakdownRow>,
}

/// Errors that prevent a computation from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ImpactError {
    /// The content of a dataset cannot be used: missing required column,
    /// no valid respondent, malformed required value.
    Validation(String),
    /// A dataset lacks a column that is structurally required to join or
    /// aggregate it.
    Schema(String),
}

impl Error for ImpactError {}

impl Display for ImpactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImpactError::Validation(msg) => write!(f, "validation error: {}", msg),
            ImpactError::Schema(msg) => write!(f, "schema error: {}", msg),
        }
    }
}

// ********* Configuration **********

/// How the central statistic of each variable is chosen.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SelectionMode {
    /// Mean when the sample looks normal (Shapiro-Wilk p-value above 0.05), median otherwise.
    Automatic,
    ForceMean,
    ForceMedian,
}

/// What to do with a spending category whose statistic is undefined
/// (missing column, too few answers).
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum MissingValuePolicy {
    /// Replace the undefined value by zero. The category stays in the breakdown.
    /// This biases the effects downward when the data is incomplete.
    ZeroFill,
    /// Drop the category from the breakdown and the totals.
    ExcludeCategory,
}

/// The motive that counts as coming for the event, when none is selected.
pub const DEFAULT_PREFERRED_MOTIVE: &str = "attending the religious events";

/// The motive assigned to respondents who left the question blank.
pub const NO_RESPONSE: &str = "no response";

#[derive(PartialEq, Debug, Clone)]
pub struct EstimatorParams {
    /// The motive weighted with `weight_primary`. If not provided, it is
    /// inferred from the answers (see `preferred_motive`).
    pub primary_motive: Option<String>,
    /// The motive picked first when the primary motive is inferred.
    pub preferred_motive: String,
    pub weight_primary: f64,
    pub weight_others: f64,
    /// Reduce the primary weight by the fraction of other motives when more
    /// than two motive categories are present.
    pub correction: bool,
}

impl Default for EstimatorParams {
    fn default() -> Self {
        EstimatorParams {
            primary_motive: None,
            preferred_motive: DEFAULT_PREFERRED_MOTIVE.to_string(),
            weight_primary: 1.0,
            weight_others: 0.5,
            correction: false,
        }
    }
}

/// The multipliers applied to the indirect effect of each category.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct CategoryMultipliers {
    pub general: f64,
    pub lodging: Option<f64>,
    pub food: Option<f64>,
    pub transport: Option<f64>,
}

impl CategoryMultipliers {
    pub const NEUTRAL: CategoryMultipliers = CategoryMultipliers {
        general: 1.0,
        lodging: None,
        food: None,
        transport: None,
    };

    pub fn uniform(general: f64) -> CategoryMultipliers {
        CategoryMultipliers {
            general,
            ..CategoryMultipliers::NEUTRAL
        }
    }

    /// The multiplier of a category: its override if any, the general one otherwise.
    pub fn for_category(&self, category: EffectCategory) -> f64 {
        let specific = match category {
            EffectCategory::Lodging => self.lodging,
            EffectCategory::Food => self.food,
            EffectCategory::Transport => self.transport,
            EffectCategory::Total => None,
        };
        specific.unwrap_or(self.general)
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct PipelineSettings {
    pub estimator: EstimatorParams,
    pub selection_mode: SelectionMode,
    pub multipliers: CategoryMultipliers,
    pub missing_values: MissingValuePolicy,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        PipelineSettings {
            estimator: EstimatorParams::default(),
            selection_mode: SelectionMode::Automatic,
            multipliers: CategoryMultipliers::NEUTRAL,
            missing_values: MissingValuePolicy::ZeroFill,
        }
    }
}
