//! Sector-level reporting: direct effects joined with the intraregional multipliers.

use log::{debug, info, warn};
use std::collections::HashMap;

use crate::config::*;
use crate::table::Table;

/// The direct economic effect (EED) recorded for one sector.
#[derive(PartialEq, Debug, Clone)]
pub struct DirectEffect {
    pub sector: String,
    pub value: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct SectorMultiplier {
    /// Sector code or name. Unique within a dataset.
    pub sector: String,
    pub multiplier: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct SectorRow {
    pub sector: String,
    pub multiplier: f64,
    pub direct: f64,
    pub indirect: f64,
    pub induced_net: f64,
    pub total: f64,
    /// Shares of this sector in the column totals, in percent. Zero when the
    /// column total is zero.
    pub direct_pct: f64,
    pub indirect_pct: f64,
    pub induced_pct: f64,
    /// Share of this sector in the total effect, in percent.
    pub share_pct: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct SectorReport {
    pub rows: Vec<SectorRow>,
    pub direct_total: f64,
    pub indirect_total: f64,
    pub induced_net_total: f64,
    pub total_effect: f64,
    /// Indirect and induced effects attached to no sector. Only non-zero when
    /// no sector was joined. The row totals plus this amount make the total effect.
    pub unallocated: f64,
}

fn sector_key(table: &Table, row: usize, idx: usize) -> String {
    table.cell(row, idx).as_key()
}

fn required_column(table: &Table, name: &str, dataset: &str) -> Result<usize, ImpactError> {
    table.column_index(name).ok_or_else(|| {
        ImpactError::Schema(format!(
            "the {} dataset must have the column '{}'",
            dataset, name
        ))
    })
}

/// Reads the direct effects. Non-numeric values count as zero.
pub fn read_direct_effects(
    table: &Table,
    key_column: &str,
    value_column: &str,
) -> Result<Vec<DirectEffect>, ImpactError> {
    let key_idx = required_column(table, key_column, "direct effect")?;
    let value_idx = required_column(table, value_column, "direct effect")?;
    let mut res: Vec<DirectEffect> = Vec::new();
    for row in 0..table.len() {
        let sector = sector_key(table, row, key_idx);
        if sector.is_empty() {
            continue;
        }
        let value = match table.cell(row, value_idx).as_number() {
            Some(v) => v,
            None => {
                warn!(
                    "read_direct_effects: sector {:?}: non-numeric value {:?}, counted as 0",
                    sector,
                    table.cell(row, value_idx)
                );
                0.0
            }
        };
        res.push(DirectEffect { sector, value });
    }
    Ok(res)
}

/// Reads the sector multipliers. Every sector must appear once with a numeric multiplier.
pub fn read_multipliers(
    table: &Table,
    key_column: &str,
    multiplier_column: &str,
) -> Result<Vec<SectorMultiplier>, ImpactError> {
    let key_idx = required_column(table, key_column, "multiplier")?;
    let mult_idx = required_column(table, multiplier_column, "multiplier")?;
    let mut res: Vec<SectorMultiplier> = Vec::new();
    for row in 0..table.len() {
        let sector = sector_key(table, row, key_idx);
        if sector.is_empty() {
            continue;
        }
        let multiplier = table.cell(row, mult_idx).as_number().ok_or_else(|| {
            ImpactError::Validation(format!(
                "sector {}: the multiplier is not a number: {:?}",
                sector,
                table.cell(row, mult_idx)
            ))
        })?;
        if res.iter().any(|m| m.sector == sector) {
            return Err(ImpactError::Validation(format!(
                "sector {} appears more than once in the multipliers",
                sector
            )));
        }
        res.push(SectorMultiplier { sector, multiplier });
    }
    Ok(res)
}

/// Joins the direct effects with the multipliers and spreads the indirect and
/// induced totals over the sectors.
///
/// Sectors absent from either dataset are dropped. The indirect and induced
/// totals are allocated to the remaining sectors in proportion to their
/// direct effect. When the direct effects cannot be used as weights (zero
/// total, negative values), the totals are split evenly.
pub fn aggregate_sectors(
    direct: &[DirectEffect],
    multipliers: &[SectorMultiplier],
    effects: &EffectSummary,
) -> SectorReport {
    let by_sector: HashMap<&str, f64> = multipliers
        .iter()
        .map(|m| (m.sector.as_str(), m.multiplier))
        .collect();

    let joined: Vec<(&DirectEffect, f64)> = direct
        .iter()
        .filter_map(|d| match by_sector.get(d.sector.as_str()) {
            Some(m) => Some((d, *m)),
            None => {
                debug!(
                    "aggregate_sectors: sector {:?} has no multiplier, dropped",
                    d.sector
                );
                None
            }
        })
        .collect();
    if joined.len() < direct.len() {
        warn!(
            "aggregate_sectors: {} of {} sectors without multiplier",
            direct.len() - joined.len(),
            direct.len()
        );
    }

    let direct_total: f64 = joined.iter().map(|(d, _)| d.value).sum();
    let indirect_total = effects.indirect_total;
    let induced_net_total = effects.induced_net_total;
    let total_effect = direct_total + indirect_total + induced_net_total;

    let proportional = direct_total > 0.0 && joined.iter().all(|(d, _)| d.value >= 0.0);
    if !proportional && !joined.is_empty() {
        warn!(
            "aggregate_sectors: direct effects unusable as weights (total {:.2}), splitting evenly",
            direct_total
        );
    }
    let weight = |value: f64| -> f64 {
        if proportional {
            value / direct_total
        } else {
            1.0 / joined.len() as f64
        }
    };

    let mut rows: Vec<SectorRow> = joined
        .iter()
        .map(|(d, multiplier)| {
            let w = weight(d.value);
            let indirect = indirect_total * w;
            let induced_net = induced_net_total * w;
            SectorRow {
                sector: d.sector.clone(),
                multiplier: *multiplier,
                direct: d.value,
                indirect,
                induced_net,
                total: d.value + indirect + induced_net,
                direct_pct: 0.0,
                indirect_pct: 0.0,
                induced_pct: 0.0,
                share_pct: 0.0,
            }
        })
        .collect();
    for r in rows.iter_mut() {
        r.direct_pct = percentage(r.direct, direct_total);
        r.indirect_pct = percentage(r.indirect, indirect_total);
        r.induced_pct = percentage(r.induced_net, induced_net_total);
        r.share_pct = percentage(r.total, total_effect);
    }

    let unallocated = if rows.is_empty() {
        indirect_total + induced_net_total
    } else {
        0.0
    };
    if unallocated != 0.0 {
        warn!(
            "aggregate_sectors: no sector joined, {:.2} left unallocated",
            unallocated
        );
    }

    info!(
        "aggregate_sectors: {} sectors, direct {:.2} + indirect {:.2} + induced {:.2} = {:.2}",
        rows.len(),
        direct_total,
        indirect_total,
        induced_net_total,
        total_effect
    );

    SectorReport {
        rows,
        direct_total,
        indirect_total,
        induced_net_total,
        total_effect,
        unallocated,
    }
}

fn percentage(part: f64, total: f64) -> f64 {
    if total != 0.0 {
        100.0 * part / total
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn summary(indirect: f64, induced: f64) -> EffectSummary {
        EffectSummary {
            pnl: 100.0,
            stay_days: 2.0,
            general_multiplier: 1.5,
            lodging_multiplier: 1.5,
            food_multiplier: 1.5,
            transport_multiplier: 1.5,
            indirect_total: indirect,
            induced_net_total: induced,
        }
    }

    fn direct_table() -> Table {
        Table::new(
            vec!["Codigo".to_string(), "Ventas".to_string()],
            vec![
                vec![Cell::Number(101.0), Cell::Number(300.0)],
                vec![Cell::from("102"), Cell::Number(100.0)],
                vec![Cell::from("999"), Cell::Number(50.0)],
            ],
        )
    }

    fn multiplier_table() -> Table {
        Table::new(
            vec!["Codigo".to_string(), "Multiplicador".to_string()],
            vec![
                vec![Cell::from("101"), Cell::Number(1.8)],
                vec![Cell::Number(102.0), Cell::from("1.2")],
                vec![Cell::from("103"), Cell::Number(1.1)],
            ],
        )
    }

    #[test]
    fn inner_join_and_allocation() {
        let direct = read_direct_effects(&direct_table(), "Codigo", "Ventas").unwrap();
        let mult = read_multipliers(&multiplier_table(), "Codigo", "Multiplicador").unwrap();
        let report = aggregate_sectors(&direct, &mult, &summary(1000.0, 400.0));

        let sectors: Vec<&str> = report.rows.iter().map(|r| r.sector.as_str()).collect();
        assert_eq!(sectors, vec!["101", "102"]);
        assert_eq!(report.direct_total, 400.0);
        assert_eq!(report.total_effect, 400.0 + 1000.0 + 400.0);

        let r101 = &report.rows[0];
        assert_eq!(r101.multiplier, 1.8);
        assert_eq!(r101.indirect, 750.0);
        assert_eq!(r101.induced_net, 300.0);
        assert_eq!(r101.total, 1350.0);
        assert!((r101.share_pct - 75.0).abs() < 1e-9);
        assert_eq!(r101.direct_pct, 75.0);
        assert_eq!(r101.indirect_pct, 75.0);
        assert_eq!(r101.induced_pct, 75.0);
        let pct: f64 = report.rows.iter().map(|r| r.direct_pct).sum();
        assert!((pct - 100.0).abs() < 1e-9);
        assert_eq!(report.unallocated, 0.0);
        let sum: f64 = report.rows.iter().map(|r| r.total).sum();
        assert!((sum - report.total_effect).abs() < 1e-9);
    }

    #[test]
    fn missing_multiplier_columns() {
        let res = read_multipliers(&multiplier_table(), "Nombre", "Multiplicador");
        assert!(matches!(res, Err(ImpactError::Schema(_))));
        let res = read_multipliers(&multiplier_table(), "Codigo", "Multiplier");
        assert!(matches!(res, Err(ImpactError::Schema(_))));
        let res = read_direct_effects(&direct_table(), "Codigo", "Sales");
        assert!(matches!(res, Err(ImpactError::Schema(_))));
    }

    #[test]
    fn duplicate_sectors_are_rejected() {
        let table = Table::new(
            vec!["Codigo".to_string(), "Multiplicador".to_string()],
            vec![
                vec![Cell::from("101"), Cell::Number(1.8)],
                vec![Cell::Number(101.0), Cell::Number(1.2)],
            ],
        );
        let res = read_multipliers(&table, "Codigo", "Multiplicador");
        assert!(matches!(res, Err(ImpactError::Validation(_))));
    }

    #[test]
    fn no_direct_effect() {
        let mult = read_multipliers(&multiplier_table(), "Codigo", "Multiplicador").unwrap();
        let direct = vec![DirectEffect {
            sector: "101".to_string(),
            value: 0.0,
        }];
        let report = aggregate_sectors(&direct, &mult, &summary(10.0, 5.0));
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].indirect, 10.0);
        assert_eq!(report.rows[0].induced_net, 5.0);
        assert_eq!(report.rows[0].total, report.total_effect);
        assert_eq!(report.rows[0].share_pct, 100.0);
        assert_eq!(report.rows[0].direct_pct, 0.0);
        assert_eq!(report.total_effect, 15.0);
    }

    #[test]
    fn negative_direct_effects_split_evenly() {
        let mult = read_multipliers(&multiplier_table(), "Codigo", "Multiplicador").unwrap();
        let direct = vec![
            DirectEffect {
                sector: "101".to_string(),
                value: 30.0,
            },
            DirectEffect {
                sector: "102".to_string(),
                value: -10.0,
            },
        ];
        let report = aggregate_sectors(&direct, &mult, &summary(100.0, 50.0));
        assert_eq!(report.rows[0].indirect, 50.0);
        assert_eq!(report.rows[1].indirect, 50.0);
        assert_eq!(report.rows[1].induced_net, 25.0);
        let sum: f64 = report.rows.iter().map(|r| r.total).sum();
        assert!((sum - report.total_effect).abs() < 1e-9);
    }

    #[test]
    fn nothing_joined_is_unallocated() {
        let direct = vec![DirectEffect {
            sector: "999".to_string(),
            value: 20.0,
        }];
        let mult = read_multipliers(&multiplier_table(), "Codigo", "Multiplicador").unwrap();
        let report = aggregate_sectors(&direct, &mult, &summary(10.0, 5.0));
        assert!(report.rows.is_empty());
        assert_eq!(report.direct_total, 0.0);
        assert_eq!(report.unallocated, 15.0);
        assert_eq!(report.total_effect, 15.0);
    }

    #[test]
    fn decimal_text_codes_join_numeric_codes() {
        let direct_table = Table::new(
            vec!["Codigo".to_string(), "Ventas".to_string()],
            vec![vec![Cell::from(" 101.0 "), Cell::Number(300.0)]],
        );
        let direct = read_direct_effects(&direct_table, "Codigo", "Ventas").unwrap();
        assert_eq!(direct[0].sector, "101");
        let mult = read_multipliers(&multiplier_table(), "Codigo", "Multiplicador").unwrap();
        let report = aggregate_sectors(&direct, &mult, &summary(10.0, 5.0));
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].multiplier, 1.8);
    }
}
