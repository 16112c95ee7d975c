use std::fmt;

// ---------------------------------------------------------------------------
// Document – the cleaned lines of one export file
// ---------------------------------------------------------------------------

/// One input file as an ordered list of trimmed, non-empty lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// File name the lines came from (used to tag errors and outputs).
    pub name: String,
    lines: Vec<String>,
}

impl Document {
    /// Build a document from raw text: every line is trimmed and blank
    /// lines are dropped. `\r\n`, `\n` and a bare `\r` all end a line.
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        let lines = text
            .split(['\r', '\n'])
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        Document {
            name: name.into(),
            lines,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// File name without its extension, used as the title of outputs.
    pub fn stem(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Markers – section positions found by the locator
// ---------------------------------------------------------------------------

/// The fixed substrings that delimit sections of an export file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    SampleName,
    MwAveragesStart,
    MwAveragesEnd,
    SliceTableStart,
}

impl Marker {
    pub const ALL: [Marker; 4] = [
        Marker::SampleName,
        Marker::MwAveragesStart,
        Marker::MwAveragesEnd,
        Marker::SliceTableStart,
    ];

    pub fn pattern(self) -> &'static str {
        match self {
            Marker::SampleName => "Sample Name",
            Marker::MwAveragesStart => "<MW_Averages>",
            Marker::MwAveragesEnd => "</MW_Averages>",
            Marker::SliceTableStart => "<Slice_Table>",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pattern())
    }
}

/// First-occurrence line indices of each marker.
///
/// A marker that was never seen reads as index 0 through the accessors.
/// This is permissive on purpose and can slice unrelated lines when a file
/// lacks `<MW_Averages>`; use [`Markers::missing`] to detect it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markers {
    pub sample_name_line: Option<usize>,
    pub mw_averages_start: Option<usize>,
    pub mw_averages_end: Option<usize>,
    pub slice_table_start: Option<usize>,
}

impl Markers {
    pub fn get(&self, marker: Marker) -> Option<usize> {
        match marker {
            Marker::SampleName => self.sample_name_line,
            Marker::MwAveragesStart => self.mw_averages_start,
            Marker::MwAveragesEnd => self.mw_averages_end,
            Marker::SliceTableStart => self.slice_table_start,
        }
    }

    pub fn mw_start(&self) -> usize {
        self.mw_averages_start.unwrap_or(0)
    }

    pub fn mw_end(&self) -> usize {
        self.mw_averages_end.unwrap_or(0)
    }

    pub fn slice_start(&self) -> usize {
        self.slice_table_start.unwrap_or(0)
    }

    /// Markers that were not found in the document.
    pub fn missing(&self) -> Vec<Marker> {
        Marker::ALL
            .into_iter()
            .filter(|m| self.get(*m).is_none())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// MwAverageRow – one line of the MW averages table
// ---------------------------------------------------------------------------

/// Column labels of an exported MW-average row, sample name first.
pub const MW_AVERAGE_COLUMNS: [&str; 8] =
    ["Samplename", "Mp", "Mn", "Mw", "Mz", "Mz+1", "Mv", "PD"];

/// Summary statistics of one peak, kept as the raw strings of the export.
#[derive(Debug, Clone, PartialEq)]
pub struct MwAverageRow {
    pub sample_name: String,
    pub fields: Vec<String>,
}

impl MwAverageRow {
    /// Field by export column label (`"Mn"`, `"PD"`, ...); `None` if the
    /// label is unknown or the row is short.
    pub fn field(&self, label: &str) -> Option<&str> {
        let idx = MW_AVERAGE_COLUMNS[1..].iter().position(|c| *c == label)?;
        self.fields.get(idx).map(String::as_str)
    }

    pub fn mn(&self) -> Option<&str> {
        self.field("Mn")
    }

    pub fn mw(&self) -> Option<&str> {
        self.field("Mw")
    }

    pub fn pd(&self) -> Option<&str> {
        self.field("PD")
    }

    /// Sample name followed by every field, as written to CSV.
    pub fn to_record(&self) -> Vec<&str> {
        std::iter::once(self.sample_name.as_str())
            .chain(self.fields.iter().map(String::as_str))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// PeakMatrix – detector slices of one peak
// ---------------------------------------------------------------------------

/// Column holding the normalized peak-area fraction of a slice.
pub const COL_NORM: usize = 2;
/// Column holding the molecular weight of a slice.
pub const COL_MW: usize = 4;
/// Columns plotted as x / y in overlay mode.
pub const COL_OVERLAY_X: usize = 5;
pub const COL_OVERLAY_Y: usize = 6;

/// Row-major numeric table; every row has the same number of columns.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakMatrix {
    columns: usize,
    values: Vec<f64>,
}

impl PeakMatrix {
    /// Build from rows that must all have `columns` entries.
    pub fn from_rows(columns: usize, rows: Vec<Vec<f64>>) -> Self {
        let mut values = Vec::with_capacity(rows.len() * columns);
        for row in rows {
            debug_assert_eq!(row.len(), columns);
            values.extend(row);
        }
        PeakMatrix { columns, values }
    }

    pub fn rows(&self) -> usize {
        if self.columns == 0 {
            0
        } else {
            self.values.len() / self.columns
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.columns..(i + 1) * self.columns]
    }

    /// Copy of column `c`, or `None` if the matrix is narrower.
    pub fn column(&self, c: usize) -> Option<Vec<f64>> {
        if c >= self.columns {
            return None;
        }
        Some((0..self.rows()).map(|r| self.values[r * self.columns + c]).collect())
    }

    /// Pairs `(row[x], row[y])` for every slice.
    pub fn xy(&self, x: usize, y: usize) -> Option<Vec<[f64; 2]>> {
        if x >= self.columns || y >= self.columns {
            return None;
        }
        Some((0..self.rows()).map(|r| [self.row(r)[x], self.row(r)[y]]).collect())
    }
}

/// All peaks of one file, in the order they appear.
pub type PeakSet = Vec<PeakMatrix>;

// ---------------------------------------------------------------------------
// SampleFile – the parsed result of one document
// ---------------------------------------------------------------------------

/// Immutable result of parsing one export file.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleFile {
    pub file_name: String,
    pub sample_name: String,
    pub markers: Markers,
    pub averages: Vec<MwAverageRow>,
    pub peaks: PeakSet,
}

impl SampleFile {
    /// Number of peaks reported by the MW averages table.
    pub fn peak_count(&self) -> usize {
        self.averages.len()
    }

    /// File name without extension.
    pub fn stem(&self) -> &str {
        self.file_name.split('.').next().unwrap_or(&self.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_drops_blank_lines_and_trims() {
        let doc = Document::from_text("a.rst", "  first \r\n\n\t\nsecond\t\n");
        assert_eq!(doc.lines(), &["first".to_string(), "second".to_string()]);
        assert_eq!(doc.stem(), "a");
    }

    #[test]
    fn carriage_return_only_text_is_split() {
        let doc = Document::from_text("cr.rst", "Sample Name\tPS\r<MW_Averages>\r\rrow\r\nlast");
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.lines()[1], "<MW_Averages>");
        assert_eq!(doc.lines()[3], "last");
    }

    #[test]
    fn missing_markers_default_to_zero() {
        let markers = Markers {
            mw_averages_end: Some(7),
            ..Default::default()
        };
        assert_eq!(markers.mw_start(), 0);
        assert_eq!(markers.mw_end(), 7);
        assert_eq!(
            markers.missing(),
            vec![Marker::SampleName, Marker::MwAveragesStart, Marker::SliceTableStart]
        );
    }

    #[test]
    fn average_row_accessors_follow_export_columns() {
        let row = MwAverageRow {
            sample_name: "PE-1".into(),
            fields: ["100", "200", "300", "400", "500", "600", "1.5"]
                .map(String::from)
                .to_vec(),
        };
        assert_eq!(row.mn(), Some("200"));
        assert_eq!(row.mw(), Some("300"));
        assert_eq!(row.pd(), Some("1.5"));
        assert_eq!(row.field("Samplename"), None);
        assert_eq!(row.to_record()[0], "PE-1");
    }

    #[test]
    fn matrix_columns_and_pairs() {
        let m = PeakMatrix::from_rows(3, vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        assert_eq!(m.rows(), 2);
        assert_eq!(m.column(1), Some(vec![2.0, 5.0]));
        assert_eq!(m.column(3), None);
        assert_eq!(m.xy(0, 2), Some(vec![[1.0, 3.0], [4.0, 6.0]]));
    }
}
