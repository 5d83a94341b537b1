// In-memory columnar frame.
//
// The small slice of a data-frame engine this crate needs: CSV import,
// categorical/numeric type coercion, missing-value fill, and cell access for
// whole-column derivations. Cells are optional; `None` models an absent (NA)
// value throughout.

use std::io::Read;
use std::path::Path;

use tracing::info;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("column mismatch in {path}: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        path: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("unknown column `{0}`")]
    UnknownColumn(String),
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// A single column: categorical text or numeric, with absent cells as `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Categorical(Vec<Option<String>>),
    Numeric(Vec<Option<f64>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Categorical(cells) => cells.len(),
            Column::Numeric(cells) => cells.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, Column::Categorical(_))
    }

    /// Numeric rendering of the column. Already-numeric columns are returned
    /// unchanged; categorical cells that do not parse become absent.
    pub fn to_numeric(&self) -> Column {
        match self {
            Column::Numeric(_) => self.clone(),
            Column::Categorical(cells) => Column::Numeric(
                cells
                    .iter()
                    .map(|cell| cell.as_deref().and_then(parse_number))
                    .collect(),
            ),
        }
    }

    /// Categorical rendering of the column. Already-categorical columns are
    /// returned unchanged; whole numbers are formatted without a fraction.
    pub fn to_categorical(&self) -> Column {
        match self {
            Column::Categorical(_) => self.clone(),
            Column::Numeric(cells) => Column::Categorical(
                cells
                    .iter()
                    .map(|cell| cell.map(format_number))
                    .collect(),
            ),
        }
    }

    /// Replace absent cells with zero (numeric) or `"0"` (categorical).
    pub fn fill_missing_zero(&mut self) {
        match self {
            Column::Numeric(cells) => {
                for cell in cells.iter_mut() {
                    if cell.is_none() {
                        *cell = Some(0.0);
                    }
                }
            }
            Column::Categorical(cells) => {
                for cell in cells.iter_mut() {
                    if cell.is_none() {
                        *cell = Some("0".to_string());
                    }
                }
            }
        }
    }

    /// Owned numeric cells, coercing categorical text on the way out.
    pub fn numeric_cells(&self) -> Vec<Option<f64>> {
        match self.to_numeric() {
            Column::Numeric(cells) => cells,
            Column::Categorical(_) => unreachable!("to_numeric returns Numeric"),
        }
    }

    /// Owned text cells, formatting numeric values on the way out.
    pub fn text_cells(&self) -> Vec<Option<String>> {
        match self.to_categorical() {
            Column::Categorical(cells) => cells,
            Column::Numeric(_) => unreachable!("to_categorical returns Categorical"),
        }
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// Named columns over player-game rows. Column order follows the CSV header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    names: Vec<String>,
    cols: Vec<Column>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_rows(&self) -> usize {
        self.cols.first().map_or(0, Column::len)
    }

    pub fn n_cols(&self) -> usize {
        self.cols.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index_of(name).map(|i| &self.cols[i])
    }

    /// Like [`column`](Self::column) but missing columns are an error.
    pub fn require(&self, name: &str) -> Result<&Column, FrameError> {
        self.column(name)
            .ok_or_else(|| FrameError::UnknownColumn(name.to_string()))
    }

    /// Replace an existing column or append a new one. The column must match
    /// the frame's row count.
    pub fn set_column(&mut self, name: &str, col: Column) {
        assert!(
            self.cols.is_empty() || col.len() == self.n_rows(),
            "column `{name}` has {} rows, frame has {}",
            col.len(),
            self.n_rows()
        );
        match self.index_of(name) {
            Some(i) => self.cols[i] = col,
            None => {
                self.names.push(name.to_string());
                self.cols.push(col);
            }
        }
    }

    /// Coerce a column to categorical or numeric. A no-op when the column is
    /// already of the requested type or does not exist.
    pub fn coerce(&mut self, name: &str, categorical: bool) {
        let Some(i) = self.index_of(name) else {
            return;
        };
        let col = &self.cols[i];
        if col.is_categorical() != categorical {
            self.cols[i] = if categorical {
                col.to_categorical()
            } else {
                col.to_numeric()
            };
        }
    }

    /// Fill absent cells of one column with zero. Returns false when the
    /// column does not exist.
    pub fn fill_missing_zero(&mut self, name: &str) -> bool {
        match self.index_of(name) {
            Some(i) => {
                self.cols[i].fill_missing_zero();
                true
            }
            None => false,
        }
    }

    /// Append another frame's rows. Callers must have verified that the
    /// column names match (see `loader::load_game_logs`).
    pub fn append(&mut self, other: Frame) {
        debug_assert_eq!(self.names, other.names);
        for (dst, src) in self.cols.iter_mut().zip(other.cols) {
            match (dst, src) {
                (Column::Categorical(d), Column::Categorical(s)) => d.extend(s),
                (Column::Numeric(d), Column::Numeric(s)) => d.extend(s),
                (dst, src) => {
                    // Mixed types only arise if one side was coerced early;
                    // fold the incoming rows into the destination's type.
                    match dst {
                        Column::Categorical(d) => match src.to_categorical() {
                            Column::Categorical(s) => d.extend(s),
                            Column::Numeric(_) => unreachable!(),
                        },
                        Column::Numeric(d) => match src.to_numeric() {
                            Column::Numeric(s) => d.extend(s),
                            Column::Categorical(_) => unreachable!(),
                        },
                    }
                }
            }
        }
    }

    /// Read a frame from CSV. Every column starts categorical; empty and
    /// `NA` fields become absent cells.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Frame, csv::Error> {
        let mut reader = csv::Reader::from_reader(rdr);
        let names: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
        for record in reader.records() {
            let record = record?;
            for (i, field) in record.iter().enumerate() {
                cells[i].push(parse_cell(field));
            }
        }

        Ok(Frame {
            names,
            cols: cells.into_iter().map(Column::Categorical).collect(),
        })
    }

    /// Read a frame from a CSV file on disk.
    pub fn from_path(path: &Path) -> Result<Frame, FrameError> {
        let file = std::fs::File::open(path).map_err(|e| FrameError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let frame = Frame::from_reader(file).map_err(|e| FrameError::Csv {
            path: path.display().to_string(),
            source: e,
        })?;
        info!(path = %path.display(), rows = frame.n_rows(), "game log imported");
        Ok(frame)
    }
}

fn parse_cell(field: &str) -> Option<String> {
    let trimmed = field.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("na") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> Frame {
        let csv_data = "\
Name,Minutes,Stat line
Jrue Holiday,34,12pt 5rb 3as
Kevin Durant,38,30pt 7rb
Bench Guy,,";
        Frame::from_reader(csv_data.as_bytes()).unwrap()
    }

    // -- CSV import --

    #[test]
    fn import_reads_headers_and_rows() {
        let frame = sample_frame();
        assert_eq!(frame.n_rows(), 3);
        assert_eq!(frame.n_cols(), 3);
        assert_eq!(frame.column_names(), ["Name", "Minutes", "Stat line"]);
    }

    #[test]
    fn empty_and_na_fields_become_absent() {
        let csv_data = "\
Name,Minutes
A,12
B,
C,NA";
        let frame = Frame::from_reader(csv_data.as_bytes()).unwrap();
        let minutes = frame.column("Minutes").unwrap();
        assert_eq!(
            *minutes,
            Column::Categorical(vec![Some("12".into()), None, None])
        );
    }

    #[test]
    fn ragged_row_is_a_csv_error() {
        let csv_data = "\
Name,Minutes
A,12,extra";
        assert!(Frame::from_reader(csv_data.as_bytes()).is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Frame::from_path(Path::new("/nonexistent/rotoguru-2026-01-01.csv")).unwrap_err();
        assert!(matches!(err, FrameError::Io { .. }));
    }

    // -- Coercion --

    #[test]
    fn numeric_coercion_parses_and_nulls_garbage() {
        let mut frame = sample_frame();
        frame.coerce("Minutes", false);
        assert_eq!(
            *frame.column("Minutes").unwrap(),
            Column::Numeric(vec![Some(34.0), Some(38.0), None])
        );
    }

    #[test]
    fn coercion_is_idempotent() {
        let mut frame = sample_frame();
        frame.coerce("Minutes", false);
        let once = frame.clone();
        frame.coerce("Minutes", false);
        assert_eq!(frame, once);
    }

    #[test]
    fn categorical_coercion_formats_whole_numbers() {
        let col = Column::Numeric(vec![Some(34.0), Some(1.5), None]);
        assert_eq!(
            col.to_categorical(),
            Column::Categorical(vec![Some("34".into()), Some("1.5".into()), None])
        );
    }

    #[test]
    fn coerce_unknown_column_is_a_noop() {
        let mut frame = sample_frame();
        let before = frame.clone();
        frame.coerce("No Such Column", false);
        assert_eq!(frame, before);
    }

    // -- Missing-value fill --

    #[test]
    fn fill_missing_zero_numeric_and_categorical() {
        let mut numeric = Column::Numeric(vec![Some(3.0), None]);
        numeric.fill_missing_zero();
        assert_eq!(numeric, Column::Numeric(vec![Some(3.0), Some(0.0)]));

        let mut cat = Column::Categorical(vec![Some("Yes".into()), None]);
        cat.fill_missing_zero();
        assert_eq!(
            cat,
            Column::Categorical(vec![Some("Yes".into()), Some("0".into())])
        );
    }

    #[test]
    fn fill_missing_zero_reports_absent_column() {
        let mut frame = sample_frame();
        assert!(frame.fill_missing_zero("Minutes"));
        assert!(!frame.fill_missing_zero("Points"));
    }

    // -- set_column / append --

    #[test]
    fn set_column_replaces_or_appends() {
        let mut frame = sample_frame();
        frame.set_column("Points", Column::Numeric(vec![Some(12.0), Some(30.0), None]));
        assert_eq!(frame.n_cols(), 4);
        frame.set_column("Points", Column::Numeric(vec![Some(1.0), Some(2.0), Some(3.0)]));
        assert_eq!(frame.n_cols(), 4);
        assert_eq!(
            *frame.column("Points").unwrap(),
            Column::Numeric(vec![Some(1.0), Some(2.0), Some(3.0)])
        );
    }

    #[test]
    fn append_concatenates_rows() {
        let mut a = sample_frame();
        let b = sample_frame();
        a.append(b);
        assert_eq!(a.n_rows(), 6);
        assert_eq!(a.n_cols(), 3);
    }

    #[test]
    fn require_unknown_column_errors() {
        let frame = sample_frame();
        let err = frame.require("Fan Points").unwrap_err();
        assert!(matches!(err, FrameError::UnknownColumn(name) if name == "Fan Points"));
    }
}
