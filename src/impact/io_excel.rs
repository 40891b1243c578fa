// Primitives for reading Excel workbooks.

use calamine::{open_workbook_auto, DataType, Range, Reader};

use crate::impact::*;

pub fn read_excel_table(path: &str, worksheet_name: Option<&str>) -> ImpactCliResult<Table> {
    let wrange = get_range(path, worksheet_name)?;
    let mut rows = wrange.rows();
    let header: Vec<String> = rows
        .next()
        .context(EmptyExcelSnafu { path })?
        .iter()
        .map(|c| read_cell(c).as_text().trim().to_string())
        .collect();
    debug!("read_excel_table: header: {:?}", header);

    let mut res: Vec<Vec<Cell>> = Vec::new();
    for row in rows {
        let cells: Vec<Cell> = row.iter().map(read_cell).collect();
        // Trailing blank lines of a sheet.
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        res.push(cells);
    }
    Ok(Table::new(header, res))
}

fn read_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Int(i) => Cell::Number(*i as f64),
        DataType::Float(f) => Cell::Number(*f),
        DataType::String(s) => Cell::Text(s.clone()),
        DataType::Bool(b) => Cell::Text(b.to_string()),
        DataType::Empty => Cell::Empty,
        // Dates and error cells carry no usable value for the analysis.
        _ => Cell::Empty,
    }
}

fn get_range(path: &str, worksheet_name: Option<&str>) -> ImpactCliResult<Range<DataType>> {
    debug!(
        "read_excel_table: path: {:?} worksheet: {:?}",
        path, worksheet_name
    );
    let mut workbook = open_workbook_auto(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(name) = worksheet_name {
        return workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { path, name })?
            .context(OpeningExcelSnafu { path });
    }
    let all_worksheets = workbook.worksheets();
    match all_worksheets.as_slice() {
        [] => EmptyExcelSnafu { path }.fail(),
        [(name, wrange)] => {
            debug!("read_excel_table: using worksheet {:?}", name);
            Ok(wrange.clone())
        }
        [(name, wrange), ..] => {
            warn!(
                "read_excel_table: {} has {} worksheets, using the first one ({:?})",
                path,
                all_worksheets.len(),
                name
            );
            Ok(wrange.clone())
        }
    }
}
