// Rendering of the results: JSON report, CSV exports and motive listing.

use std::path::{Path, PathBuf};

use event_impact::columns::ColumnMapping;

use crate::impact::*;

fn population_js(p: &PopulationEstimate) -> JSValue {
    json!({
        "pnl": p.pnl,
        "potentialCapacity": p.potential_capacity,
        "validRespondents": p.total_valid,
        "nonLocalRespondents": p.non_local_total,
        "primaryMotive": p.primary_motive,
        "primaryCount": p.primary_count,
        "tourismProportion": p.tourism_proportion,
        "weighting": p.weighting,
        "weightPrimary": p.weight_primary,
        "weightOthers": p.weight_others,
        "effectivePrimaryWeight": p.effective_primary_weight,
        "motiveCategories": p.num_categories,
        "moreThanTwoCategories": p.more_than_two_categories,
        "correctionFactor": p.correction_factor,
        "correctionApplied": p.correction_applied,
    })
}

// Undefined values (NaN) are written as null.
fn statistics_js(statistics: &BTreeMap<Expense, VariableStatistics>) -> JSValue {
    let mut m: JSMap<String, JSValue> = JSMap::new();
    for (e, s) in statistics.iter() {
        m.insert(
            e.key().to_string(),
            json!({
                "n": s.n,
                "testedN": s.tested_n,
                "mean": s.mean,
                "median": s.median,
                "pValue": s.p_value,
                "recommendation": s.recommendation.label(),
            }),
        );
    }
    JSValue::Object(m)
}

fn columns_js(columns: &ColumnMapping) -> Vec<JSValue> {
    columns
        .matches
        .iter()
        .map(|m| {
            json!({
                "variable": m.expense.key(),
                "canonicalLabel": m.canonical_label,
                "matched": m.matched,
                "score": m.score,
                "explicit": m.explicit,
            })
        })
        .collect()
}

fn effects_js(effects: &EffectReport, scale: f64) -> JSValue {
    let s = &effects.summary;
    let breakdown: Vec<JSValue> = effects
        .breakdown
        .iter()
        .map(|r| {
            json!({
                "category": r.category.label(),
                "dailyValue": r.daily_value,
                "indirect": r.indirect / scale,
                "inducedNet": r.induced_net / scale,
                "imputed": r.imputed,
            })
        })
        .collect();
    json!({
        "summary": {
            "pnl": s.pnl,
            "stayDays": s.stay_days,
            "generalMultiplier": s.general_multiplier,
            "lodgingMultiplier": s.lodging_multiplier,
            "foodMultiplier": s.food_multiplier,
            "transportMultiplier": s.transport_multiplier,
            "indirectTotal": s.indirect_total / scale,
            "inducedNetTotal": s.induced_net_total / scale,
        },
        "breakdown": breakdown,
    })
}

fn sectors_js(sectors: &SectorReport, scale: f64) -> JSValue {
    let rows: Vec<JSValue> = sectors
        .rows
        .iter()
        .map(|r| {
            json!({
                "sector": r.sector,
                "multiplier": r.multiplier,
                "direct": r.direct / scale,
                "indirect": r.indirect / scale,
                "inducedNet": r.induced_net / scale,
                "total": r.total / scale,
                "directPct": r.direct_pct,
                "indirectPct": r.indirect_pct,
                "inducedPct": r.induced_pct,
                "sharePct": r.share_pct,
            })
        })
        .collect();
    json!({
        "rows": rows,
        "directTotal": sectors.direct_total / scale,
        "indirectTotal": sectors.indirect_total / scale,
        "inducedNetTotal": sectors.induced_net_total / scale,
        "totalEffect": sectors.total_effect / scale,
        "unallocated": sectors.unallocated / scale,
    })
}

/// The full report of one analysis.
///
/// The effect amounts are divided by `scale` (1e6 reports millions). PNL,
/// statistics, daily values and percentages are not scaled.
pub fn build_report_js(
    report: &ImpactReport,
    columns: &ColumnMapping,
    event: Option<&str>,
    scale: f64,
) -> JSValue {
    json!({
        "event": event,
        "scale": scale,
        "population": population_js(&report.population),
        "columns": columns_js(columns),
        "statistics": statistics_js(&report.statistics),
        "effects": effects_js(&report.effects, scale),
        "sectors": sectors_js(&report.sectors, scale),
    })
}

pub fn format_motives(counts: &[(String, usize)]) -> String {
    let total: usize = counts.iter().map(|(_, c)| c).sum();
    let mut res = String::new();
    for (motive, count) in counts.iter() {
        let pct = if total > 0 {
            100.0 * (*count as f64) / (total as f64)
        } else {
            0.0
        };
        res.push_str(format!("{:>6} {:>6.2}%  {}\n", count, pct, motive).as_str());
    }
    res
}

fn open_writer(path: &Path) -> ImpactCliResult<csv::Writer<fs::File>> {
    let path_s = path.display().to_string();
    csv::Writer::from_path(path).context(CsvWriteSnafu { path: path_s })
}

fn finish(mut wtr: csv::Writer<fs::File>, path: &Path) -> ImpactCliResult<()> {
    wtr.flush().context(WritingOutputSnafu {
        path: path.display().to_string(),
    })
}

fn fmt_value(x: f64) -> String {
    if x.is_finite() {
        x.to_string()
    } else {
        "".to_string()
    }
}

pub fn write_breakdown_csv(path: &Path, effects: &EffectReport, scale: f64) -> ImpactCliResult<()> {
    let path_s = path.display().to_string();
    let mut wtr = open_writer(path)?;
    wtr.write_record(["category", "daily_value", "indirect", "induced_net", "imputed"])
        .context(CsvWriteSnafu { path: &path_s })?;
    for r in effects.breakdown.iter() {
        wtr.write_record([
            r.category.label().to_string(),
            fmt_value(r.daily_value),
            fmt_value(r.indirect / scale),
            fmt_value(r.induced_net / scale),
            r.imputed.to_string(),
        ])
        .context(CsvWriteSnafu { path: &path_s })?;
    }
    finish(wtr, path)
}

pub fn write_sectors_csv(path: &Path, sectors: &SectorReport, scale: f64) -> ImpactCliResult<()> {
    let path_s = path.display().to_string();
    let mut wtr = open_writer(path)?;
    wtr.write_record([
        "sector",
        "multiplier",
        "direct",
        "indirect",
        "induced_net",
        "total",
        "direct_pct",
        "indirect_pct",
        "induced_pct",
        "share_pct",
    ])
    .context(CsvWriteSnafu { path: &path_s })?;
    for r in sectors.rows.iter() {
        wtr.write_record([
            r.sector.clone(),
            fmt_value(r.multiplier),
            fmt_value(r.direct / scale),
            fmt_value(r.indirect / scale),
            fmt_value(r.induced_net / scale),
            fmt_value(r.total / scale),
            fmt_value(r.direct_pct),
            fmt_value(r.indirect_pct),
            fmt_value(r.induced_pct),
            fmt_value(r.share_pct),
        ])
        .context(CsvWriteSnafu { path: &path_s })?;
    }
    finish(wtr, path)
}

/// Writes `breakdown.csv` and `sectors.csv` in the given directory.
pub fn write_csv_exports(dir: &str, report: &ImpactReport, scale: f64) -> ImpactCliResult<()> {
    fs::create_dir_all(dir).context(WritingOutputSnafu { path: dir })?;
    let breakdown_p: PathBuf = [dir, "breakdown.csv"].iter().collect();
    write_breakdown_csv(breakdown_p.as_path(), &report.effects, scale)?;
    let sectors_p: PathBuf = [dir, "sectors.csv"].iter().collect();
    write_sectors_csv(sectors_p.as_path(), &report.sectors, scale)?;
    info!("CSV exports written to {}", dir);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_impact::builder::Builder;

    fn report() -> ImpactReport {
        let mut b = Builder::new();
        for i in 0..4 {
            b.add_respondent(
                "No",
                Some("Venir a los eventos religiosos"),
                &[
                    (Expense::Lodging, 100.0 + i as f64),
                    (Expense::StayNights, 2.0),
                ],
            );
            b.add_respondent("Sí", Some("Trabajo"), &[]);
        }
        b.add_capacity("Procesión", Some(400.0)).unwrap();
        let inputs = ImpactInputs {
            survey: b.survey().to_vec(),
            capacity: b.capacity().to_vec(),
            direct: vec![
                DirectEffect {
                    sector: "55".to_string(),
                    value: 300.0,
                },
                DirectEffect {
                    sector: "56".to_string(),
                    value: 100.0,
                },
            ],
            multipliers: vec![
                SectorMultiplier {
                    sector: "55".to_string(),
                    multiplier: 1.3,
                },
                SectorMultiplier {
                    sector: "56".to_string(),
                    multiplier: 1.1,
                },
            ],
        };
        let settings = PipelineSettings {
            selection_mode: SelectionMode::ForceMean,
            ..PipelineSettings::default()
        };
        run_impact_analysis(&inputs, &settings).unwrap()
    }

    #[test]
    fn report_js() {
        let r = report();
        let js = build_report_js(&r, &ColumnMapping::default(), Some("Procesión"), 1.0);
        assert_eq!(js["event"], json!("Procesión"));
        assert_eq!(js["population"]["nonLocalRespondents"], json!(4));
        assert_eq!(js["population"]["pnl"], json!(r.population.pnl));
        assert_eq!(js["statistics"]["lodging"]["recommendation"], json!("mean"));
        // Undefined statistics are null.
        assert_eq!(js["statistics"]["food"]["mean"], JSValue::Null);
        assert_eq!(
            js["statistics"]["food"]["recommendation"],
            json!("insufficient-data")
        );
        let breakdown = js["effects"]["breakdown"].as_array().unwrap();
        assert_eq!(breakdown.len(), 4);
        assert_eq!(breakdown[3]["category"], json!("total"));
        assert_eq!(js["sectors"]["rows"].as_array().unwrap().len(), 2);
        assert_eq!(js["sectors"]["rows"][0]["directPct"], json!(75.0));
        assert_eq!(js["sectors"]["rows"][1]["directPct"], json!(25.0));
        assert_eq!(js["sectors"]["unallocated"], json!(0.0));
    }

    #[test]
    fn amounts_in_millions() {
        let r = report();
        let js = build_report_js(&r, &ColumnMapping::default(), None, 1e6);
        assert_eq!(js["scale"], json!(1e6));
        assert_eq!(
            js["sectors"]["totalEffect"],
            json!(r.sectors.total_effect / 1e6)
        );
        assert_eq!(js["sectors"]["rows"][0]["direct"], json!(300.0 / 1e6));
        // Percentages and visitors are not scaled.
        assert_eq!(js["sectors"]["rows"][0]["directPct"], json!(75.0));
        assert_eq!(js["population"]["pnl"], json!(r.population.pnl));
        assert_eq!(
            js["effects"]["summary"]["indirectTotal"],
            json!(r.effects.summary.indirect_total / 1e6)
        );
    }

    #[test]
    fn motives_listing() {
        let counts = vec![("venir".to_string(), 3), ("trabajo".to_string(), 1)];
        let s = format_motives(&counts);
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("75.00%"));
        assert!(lines[0].ends_with("venir"));
        assert_eq!(format_motives(&[]), "");
    }

    #[test]
    fn csv_exports() {
        let r = report();
        let dir: PathBuf = [std::env::temp_dir(), PathBuf::from("eventimpact_report_csv")]
            .iter()
            .collect();
        let dir_s = dir.display().to_string();
        write_csv_exports(&dir_s, &r, 1.0).unwrap();

        let breakdown = fs::read_to_string(dir.join("breakdown.csv")).unwrap();
        let lines: Vec<&str> = breakdown.lines().collect();
        assert_eq!(lines[0], "category,daily_value,indirect,induced_net,imputed");
        assert_eq!(lines.len(), 5);
        assert!(lines[4].starts_with("total,"));

        let sectors = fs::read_to_string(dir.join("sectors.csv")).unwrap();
        let lines: Vec<&str> = sectors.lines().collect();
        assert_eq!(
            lines[0],
            "sector,multiplier,direct,indirect,induced_net,total,direct_pct,indirect_pct,induced_pct,share_pct"
        );
        assert!(lines[1].starts_with("55,1.3,300,"));
        let fields: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(fields[6], "75");
    }

    #[test]
    fn scaled_csv_exports() {
        let r = report();
        let dir: PathBuf = [std::env::temp_dir(), PathBuf::from("eventimpact_report_csv_scaled")]
            .iter()
            .collect();
        write_csv_exports(&dir.display().to_string(), &r, 100.0).unwrap();
        let sectors = fs::read_to_string(dir.join("sectors.csv")).unwrap();
        let lines: Vec<&str> = sectors.lines().collect();
        assert!(lines[1].starts_with("55,1.3,3,"));
        assert!(lines[2].starts_with("56,1.1,1,"));
    }
}
