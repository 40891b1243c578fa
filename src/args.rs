use clap::Parser;

/// Estimates the economic impact of a religious-tourism event from a visitor survey,
/// the capacity of the events and the multipliers of the economic sectors.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the analysis: input files, column names and parameters.
    /// Relative input paths are resolved against the directory of this file. The other flags override it.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The visitor survey (xlsx or csv).
    #[clap(short, long, value_parser)]
    pub survey: Option<String>,

    /// (file path) The potential capacity of the events (xlsx or csv).
    #[clap(long, value_parser)]
    pub capacity: Option<String>,

    /// (file path) The direct economic effect of each sector (xlsx or csv).
    #[clap(long, value_parser)]
    pub direct: Option<String>,

    /// (file path) The intraregional multiplier of each sector (xlsx or csv).
    #[clap(long, value_parser)]
    pub multipliers: Option<String>,

    /// (optional) Only count the capacity of this event.
    #[clap(long, value_parser)]
    pub event: Option<String>,

    /// (optional) The travel motive weighted as coming for the event. By default, the
    /// preferred motive if present, otherwise the most frequent one.
    #[clap(long, value_parser)]
    pub primary_motive: Option<String>,

    /// (default 1.0) The weight of the respondents with the primary motive.
    #[clap(long, value_parser)]
    pub weight_primary: Option<f64>,

    /// (default 0.5) The weight of the respondents with any other motive.
    #[clap(long, value_parser)]
    pub weight_others: Option<f64>,

    /// If passed as an argument, applies the correction factor when more than two motives are present.
    #[clap(long, takes_value = false)]
    pub correction: bool,

    /// (automatic, mean or median) How the central statistic of the spending is chosen.
    #[clap(long, value_parser)]
    pub stats_mode: Option<String>,

    /// (default 1.0) The multiplier applied to all the spending categories.
    #[clap(long, value_parser)]
    pub multiplier: Option<f64>,

    /// If passed as an argument, undefined spending values remove the category instead of counting as zero.
    #[clap(long, takes_value = false)]
    pub exclude_missing: bool,

    /// If passed as an argument, prints the travel motives of the non-local respondents and stops.
    #[clap(long, takes_value = false)]
    pub list_motives: bool,

    /// (file path, 'stdout' or empty) If specified, the report will be written in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (directory, optional) If specified, the breakdown and the sector table are written there as CSV files.
    #[clap(long, value_parser)]
    pub csv: Option<String>,

    /// (default 1) The amounts of the effects and sectors are divided by this value in the
    /// report and the CSV exports. Use 1000000 to report millions.
    #[clap(long, value_parser)]
    pub scale: Option<f64>,

    /// (file path) A reference report in JSON format. If provided, eventimpact will
    /// check that the computed report matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// When using Excel files, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
