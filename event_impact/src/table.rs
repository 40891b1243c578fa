//! A minimal in-memory table, as produced by the spreadsheet and CSV readers.

/// The content of one cell.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Numeric coercion: numbers are kept, text is parsed after trimming.
    /// Everything that cannot be read as a finite number is missing.
    pub fn as_number(&self) -> Option<f64> {
        let x = match self {
            Cell::Empty => None,
            Cell::Number(x) => Some(*x),
            Cell::Text(s) => s.trim().parse::<f64>().ok(),
        };
        x.filter(|v| v.is_finite())
    }

    /// The textual form of the cell. Integral numbers are written without
    /// decimals so that a sector code stored as a float still reads `101`.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => "".to_string(),
            Cell::Number(x) if x.fract() == 0.0 && x.abs() < 1e15 => format!("{}", *x as i64),
            Cell::Number(x) => x.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }

    /// The cell as a join key. Numeric text is read as a number first, so
    /// that `"101.0"`, `"101"` and `101` give the same key.
    pub fn as_key(&self) -> String {
        match self.as_number() {
            Some(x) => Cell::Number(x).as_text(),
            None => self.as_text().trim().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(x: f64) -> Self {
        Cell::Number(x)
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

#[derive(PartialEq, Debug, Clone, Default)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(header: Vec<String>, rows: Vec<Vec<Cell>>) -> Table {
        Table { header, rows }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column. Names are compared after trimming.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.header.iter().position(|h| h.trim() == name)
    }

    /// A cell of a row. Rows shorter than the header are padded with empty cells.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// All the cells of a column, or None if the column does not exist.
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(name)?;
        Some((0..self.rows.len()).map(|r| self.cell(r, idx)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_coercion() {
        assert_eq!(Cell::Number(3.5).as_number(), Some(3.5));
        assert_eq!(Cell::from(" 120000 ").as_number(), Some(120000.0));
        assert_eq!(Cell::from("12,000").as_number(), None);
        assert_eq!(Cell::from("n/a").as_number(), None);
        assert_eq!(Cell::Empty.as_number(), None);
        assert_eq!(Cell::Number(f64::NAN).as_number(), None);
    }

    #[test]
    fn integral_numbers_read_as_codes() {
        assert_eq!(Cell::Number(101.0).as_text(), "101");
        assert_eq!(Cell::Number(1.25).as_text(), "1.25");
        assert_eq!(Cell::from("101.0").as_key(), "101");
        assert_eq!(Cell::from(" 101 ").as_key(), "101");
        assert_eq!(Cell::Number(101.0).as_key(), "101");
        assert_eq!(Cell::from(" Hoteles ").as_key(), "Hoteles");
    }

    #[test]
    fn short_rows_are_padded() {
        let t = Table::new(
            vec!["a".to_string(), " b ".to_string()],
            vec![vec![Cell::from("x")], vec![Cell::from("y"), Cell::Number(2.0)]],
        );
        let col = t.column("b").unwrap();
        assert_eq!(col, vec![&Cell::Empty, &Cell::Number(2.0)]);
        assert!(t.column("c").is_none());
        assert_eq!(t.len(), 2);
    }
}
