// Primitives for reading CSV files.

use crate::impact::*;

pub fn read_csv_table(path: &str) -> ImpactCliResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let header: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu { lineno: 1_usize })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    debug!("read_csv_table: header: {:?}", header);

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is the first line.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let cells: Vec<Cell> = line
            .iter()
            .map(|s| {
                if s.trim().is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(s.to_string())
                }
            })
            .collect();
        if cells.iter().all(|c| c.is_empty()) {
            debug!("read_csv_table: skipping blank line {}", lineno);
            continue;
        }
        rows.push(cells);
    }
    Ok(Table::new(header, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_fixture(name: &str, contents: &str) -> String {
        let p: PathBuf = [std::env::temp_dir(), PathBuf::from(name)].iter().collect();
        fs::write(&p, contents).unwrap();
        p.display().to_string()
    }

    #[test]
    fn read_simple_table() {
        let path = write_fixture(
            "eventimpact_io_csv_simple.csv",
            "Event, Potential capacity\nProcesión,1200\nVigilia,\n,,\nMisa,\"3,5\"\n",
        );
        let table = read_csv_table(&path).unwrap();
        assert_eq!(table.header(), &["Event", "Potential capacity"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.cell(0, 1).as_number(), Some(1200.0));
        assert!(table.cell(1, 1).is_empty());
        assert_eq!(table.cell(2, 0).as_text(), "Misa");
        // Decimal commas are not numbers.
        assert_eq!(table.cell(2, 1).as_number(), None);
    }

    #[test]
    fn short_lines_are_padded() {
        let path = write_fixture("eventimpact_io_csv_short.csv", "Code,Sales,Name\n55,100\n");
        let table = read_csv_table(&path).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.cell(0, 2).is_empty());
    }

    #[test]
    fn missing_file() {
        let res = read_csv_table("/nonexistent/eventimpact/aforo.csv");
        assert!(matches!(res, Err(ImpactCliError::CsvOpen { .. })));
    }
}
