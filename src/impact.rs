use log::{debug, info, warn};

use event_impact::columns::{resolve_columns, DEFAULT_MATCH_THRESHOLD};
use event_impact::sectors::{read_direct_effects, read_multipliers};
use event_impact::survey::{events, filter_event, SurveyColumns};
use event_impact::table::{Cell, Table};
use event_impact::*;
use snafu::{prelude::*, Snafu};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::impact::config_reader::*;
use crate::impact::io_common::{read_table, resolve_path};
use crate::impact::report::{build_report_js, format_motives, write_csv_exports};

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;
pub mod report;

#[derive(Debug, Snafu)]
pub enum ImpactCliError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet named {name}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display("The workbook {path} is empty"))]
    EmptyExcel { path: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Error writing CSV file {path}"))]
    CsvWrite { source: csv::Error, path: String },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Unsupported input file {path} (extension {extension:?}): use xlsx or csv"))]
    UnsupportedInput { path: String, extension: String },
    #[snafu(display("Unknown spending variable {key:?} (eventSpend, stayNights, lodging, food, transport)"))]
    UnknownExpense { key: String },
    #[snafu(display("Missing input: the {name} dataset must be provided on the command line or in the configuration"))]
    MissingInput { name: String },
    #[snafu(display("{source}"))]
    Analysis { source: ImpactError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ImpactCliResult<T> = Result<T, ImpactCliError>;

// The flags of the command line take precedence over the configuration file.
fn apply_overrides(config: &mut ImpactConfig, args: &Args) {
    if args.event.is_some() {
        config.event = args.event.clone();
    }
    if args.primary_motive.is_some() {
        config.estimator.primary_motive = args.primary_motive.clone();
    }
    if args.weight_primary.is_some() {
        config.estimator.weight_primary = args.weight_primary;
    }
    if args.weight_others.is_some() {
        config.estimator.weight_others = args.weight_others;
    }
    if args.correction {
        config.estimator.correction = Some(true);
    }
    if args.stats_mode.is_some() {
        config.statistics.mode = args.stats_mode.clone();
    }
    if args.multiplier.is_some() {
        config.multipliers.general = args.multiplier;
    }
    if args.exclude_missing {
        config.missing_values = Some("excludeCategory".to_string());
    }
    if args.scale.is_some() {
        config.scale = args.scale;
    }
    if args.excel_worksheet_name.is_some() {
        config.excel_worksheet_name = args.excel_worksheet_name.clone();
    }
}

fn input_path(
    arg: &Option<String>,
    configured: &Option<String>,
    root: Option<&Path>,
    name: &str,
) -> ImpactCliResult<String> {
    match (arg, configured) {
        (Some(p), _) => Ok(p.clone()),
        (None, Some(p)) => Ok(resolve_path(root, p)),
        (None, None) => MissingInputSnafu { name }.fail(),
    }
}

fn read_survey(
    path: &str,
    config: &ImpactConfig,
) -> ImpactCliResult<(Vec<SurveyRecord>, SurveyColumns)> {
    let table = read_table(path, config.excel_worksheet_name.as_deref())?;
    let explicit = config.explicit_expenses()?;
    let threshold = config.match_threshold.unwrap_or(DEFAULT_MATCH_THRESHOLD);
    let expenses = resolve_columns(table.header(), &explicit, threshold);
    for m in expenses.matches.iter() {
        info!(
            "column {:?}: {:?} (score {:.3}{})",
            m.expense.key(),
            m.matched,
            m.score,
            if m.explicit { ", explicit" } else { "" }
        );
    }
    let columns = SurveyColumns {
        residency: config.residency_column(),
        motive: config.motive_column(),
        expenses,
    };
    let records = SurveyRecord::from_table(&table, &columns).context(AnalysisSnafu {})?;
    Ok((records, columns))
}

fn read_capacity(path: &str, config: &ImpactConfig) -> ImpactCliResult<Vec<CapacityRecord>> {
    let table = read_table(path, config.excel_worksheet_name.as_deref())?;
    let event_col = config
        .capacity_columns
        .event
        .clone()
        .unwrap_or_else(|| DEFAULT_EVENT_COLUMN.to_string());
    let capacity_col = config
        .capacity_columns
        .capacity
        .clone()
        .unwrap_or_else(|| DEFAULT_CAPACITY_COLUMN.to_string());
    let records =
        CapacityRecord::from_table(&table, &event_col, &capacity_col).context(AnalysisSnafu {})?;
    match &config.event {
        None => Ok(records),
        Some(event) => {
            let selected = filter_event(&records, event);
            if selected.is_empty() {
                whatever!(
                    "Unknown event {:?}. Available events: {:?}",
                    event,
                    events(&records)
                )
            }
            debug!(
                "read_capacity: {} of {} rows for event {:?}",
                selected.len(),
                records.len(),
                event
            );
            Ok(selected)
        }
    }
}

fn write_output(out: Option<&str>, contents: &str) -> ImpactCliResult<()> {
    match out {
        None | Some("stdout") => {
            println!("{}", contents);
            Ok(())
        }
        Some("") => Ok(()),
        Some(path) => {
            fs::write(path, contents).context(WritingOutputSnafu { path })?;
            info!("Report written to {}", path);
            Ok(())
        }
    }
}

pub fn run_analysis(args: &Args) -> ImpactCliResult<()> {
    let (mut config, root): (ImpactConfig, Option<PathBuf>) = match &args.config {
        Some(p) => (
            read_config(p)?,
            Path::new(p).parent().map(|x| x.to_path_buf()),
        ),
        None => (ImpactConfig::default(), None),
    };
    apply_overrides(&mut config, args);
    let root = root.as_deref();
    info!("config: {:?}", config);

    let survey_p = input_path(&args.survey, &config.inputs.survey, root, "survey")?;
    let (survey, columns) = read_survey(&survey_p, &config)?;
    info!("Read {} respondents", survey.len());

    if args.list_motives {
        print!("{}", format_motives(&motive_counts(&survey)));
        return Ok(());
    }

    let capacity_p = input_path(&args.capacity, &config.inputs.capacity, root, "capacity")?;
    let capacity = read_capacity(&capacity_p, &config)?;

    let sector_cols = &config.sector_columns;
    let direct_p = input_path(&args.direct, &config.inputs.direct_effect, root, "direct effect")?;
    let direct_table = read_table(&direct_p, config.excel_worksheet_name.as_deref())?;
    let direct = read_direct_effects(
        &direct_table,
        sector_cols.direct_key.as_deref().unwrap_or(DEFAULT_SECTOR_COLUMN),
        sector_cols
            .direct_value
            .as_deref()
            .unwrap_or(DEFAULT_DIRECT_VALUE_COLUMN),
    )
    .context(AnalysisSnafu {})?;

    let multipliers_p = input_path(&args.multipliers, &config.inputs.multipliers, root, "multipliers")?;
    let multipliers_table = read_table(&multipliers_p, config.excel_worksheet_name.as_deref())?;
    let multipliers = read_multipliers(
        &multipliers_table,
        sector_cols
            .multiplier_key
            .as_deref()
            .unwrap_or(DEFAULT_SECTOR_COLUMN),
        sector_cols
            .multiplier
            .as_deref()
            .unwrap_or(DEFAULT_MULTIPLIER_COLUMN),
    )
    .context(AnalysisSnafu {})?;

    let settings = PipelineSettings {
        estimator: config.estimator_params(),
        selection_mode: config.selection_mode()?,
        multipliers: config.category_multipliers(),
        missing_values: config.missing_value_policy()?,
    };
    let scale = config.scale()?;
    debug!("run_analysis: settings: {:?} scale: {}", settings, scale);

    let inputs = ImpactInputs {
        survey,
        capacity,
        direct,
        multipliers,
    };
    let report = run_impact_analysis(&inputs, &settings).context(AnalysisSnafu {})?;
    info!(
        "PNL: {:.2} indirect: {:.2} induced (net): {:.2} total: {:.2}",
        report.population.pnl,
        report.effects.summary.indirect_total,
        report.effects.summary.induced_net_total,
        report.sectors.total_effect
    );

    let result_js = build_report_js(&report, &columns.expenses, config.event.as_deref(), scale);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    write_output(args.out.as_deref(), &pretty_js_stats)?;

    if let Some(dir) = &args.csv {
        write_csv_exports(dir, &report, scale)?;
    }

    // The reference report, if provided for comparison
    if let Some(reference_p) = &args.reference {
        let summary_ref = read_summary(reference_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference report");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated report and reference report")
        }
        info!("The report matches the reference {}", reference_p);
    }

    Ok(())
}
