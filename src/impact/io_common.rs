use std::path::{Path, PathBuf};

use crate::impact::{io_csv::read_csv_table, io_excel::read_excel_table, *};

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Resolves an input path against the directory of the configuration file.
pub fn resolve_path(root: Option<&Path>, path: &str) -> String {
    match root {
        Some(r) if Path::new(path).is_relative() => {
            let p: PathBuf = [r, Path::new(path)].iter().collect();
            p.as_path().display().to_string()
        }
        _ => path.to_string(),
    }
}

/// Reads a dataset, choosing the reader from the extension of the file.
pub fn read_table(path: &str, excel_worksheet_name: Option<&str>) -> ImpactCliResult<Table> {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    info!("Attempting to read {:?}", simplify_file_name(path));
    let table = match extension.as_deref() {
        Some("xlsx") | Some("xlsm") | Some("xls") | Some("ods") => {
            read_excel_table(path, excel_worksheet_name)?
        }
        Some("csv") | Some("txt") => read_csv_table(path)?,
        x => {
            return UnsupportedInputSnafu {
                path,
                extension: x.unwrap_or("").to_string(),
            }
            .fail()
        }
    };
    debug!(
        "read_table: {}: {} columns, {} rows",
        path,
        table.header().len(),
        table.len()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths() {
        assert_eq!(simplify_file_name("/data/encuesta.xlsx"), "encuesta.xlsx");
        assert_eq!(
            resolve_path(Some(Path::new("/data")), "aforo.csv"),
            "/data/aforo.csv"
        );
        assert_eq!(resolve_path(Some(Path::new("/data")), "/tmp/a.csv"), "/tmp/a.csv");
        assert_eq!(resolve_path(None, "a.csv"), "a.csv");
    }

    #[test]
    fn unsupported_extension() {
        let res = read_table("/tmp/survey.json", None);
        assert!(matches!(res, Err(ImpactCliError::UnsupportedInput { .. })));
    }
}
