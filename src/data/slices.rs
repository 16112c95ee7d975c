use log::debug;

use super::model::{PeakMatrix, PeakSet};
use crate::error::{AnalysisError, AnalysisResult};

/// Closing tag of the slice table.
pub const SLICE_TABLE_END: &str = "</Slice_Table>";

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

/// How a single slice-table line is treated, given the current buffer size.
#[derive(Debug, Clone, PartialEq)]
pub enum SliceLine<'a> {
    /// `</Slice_Table>`: flush the open peak and stop.
    End,
    /// Contains `Peak` while more than one row is buffered: flush the open peak.
    Boundary,
    /// Column header (contains `RT`).
    Header,
    /// First field contains `-2`: an artifact row.
    Sentinel,
    /// Anything else is buffered as a candidate slice row.
    Row(Vec<&'a str>),
}

/// Split on tabs, dropping one trailing empty field left by a trailing tab.
pub fn split_fields(line: &str) -> Vec<&str> {
    let mut fields: Vec<&str> = line.split('\t').collect();
    if fields.len() > 1 && fields.last() == Some(&"") {
        fields.pop();
    }
    fields
}

pub fn classify(line: &str, buffered: usize) -> SliceLine<'_> {
    if line == SLICE_TABLE_END {
        return SliceLine::End;
    }
    if line.contains("Peak") && buffered > 1 {
        return SliceLine::Boundary;
    }
    if line.contains("RT") {
        return SliceLine::Header;
    }
    let fields = split_fields(line);
    if fields.first().is_some_and(|f| f.contains("-2")) {
        return SliceLine::Sentinel;
    }
    SliceLine::Row(fields)
}

// ---------------------------------------------------------------------------
// Per-peak collector
// ---------------------------------------------------------------------------

/// Outcome of closing the buffer at a boundary.
#[derive(Debug, PartialEq)]
pub enum Flush<'a> {
    /// Rows after the first one, ready for numeric conversion.
    Emit(Vec<Vec<&'a str>>),
    /// The buffer held at most one row; the peak is discarded.
    Drop(usize),
}

/// Accumulates candidate rows of the peak currently being read.
#[derive(Debug, Default)]
pub struct PeakCollector<'a> {
    rows: Vec<Vec<&'a str>>,
}

impl<'a> PeakCollector<'a> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, fields: Vec<&'a str>) {
        self.rows.push(fields);
    }

    /// Close the current peak. The first buffered row is the boundary
    /// marker itself and never reaches the matrix.
    pub fn flush(&mut self) -> Flush<'a> {
        let mut rows = std::mem::take(&mut self.rows);
        if rows.len() <= 1 {
            return Flush::Drop(rows.len());
        }
        rows.remove(0);
        Flush::Emit(rows)
    }
}

// ---------------------------------------------------------------------------
// Slice table parser
// ---------------------------------------------------------------------------

/// Parse every peak of the slice table.
///
/// `lines` are the lines following `<Slice_Table>`. Parsing stops at
/// `</Slice_Table>`; a table without its closing tag emits only the peaks
/// closed by a later `Peak` line.
pub fn parse_peaks<S: AsRef<str>>(file: &str, lines: &[S]) -> AnalysisResult<PeakSet> {
    let mut peaks = PeakSet::new();
    let mut collector = PeakCollector::default();

    for line in lines {
        let line = line.as_ref();
        let kind = classify(line, collector.len());
        let done = kind == SliceLine::End;
        match kind {
            SliceLine::End | SliceLine::Boundary => match collector.flush() {
                Flush::Emit(rows) => {
                    let ordinal = peaks.len() + 1;
                    peaks.push(to_matrix(file, ordinal, &rows)?);
                }
                Flush::Drop(n) => debug!("{file}: dropped peak buffer with {n} row(s)"),
            },
            SliceLine::Header | SliceLine::Sentinel => {}
            SliceLine::Row(fields) => collector.push(fields),
        }
        if done {
            break;
        }
    }

    Ok(peaks)
}

/// Convert buffered string rows to a numeric matrix. `peak` is 1-based.
fn to_matrix(file: &str, peak: usize, rows: &[Vec<&str>]) -> AnalysisResult<PeakMatrix> {
    let columns = rows.first().map_or(0, Vec::len);
    let mut values = Vec::with_capacity(rows.len());

    for (row_no, row) in rows.iter().enumerate() {
        if row.len() != columns {
            return Err(AnalysisError::RaggedPeak {
                file: file.to_string(),
                peak,
                row: row_no + 1,
                expected: columns,
                found: row.len(),
            });
        }
        let parsed = row
            .iter()
            .map(|tok| {
                tok.trim()
                    .parse::<f64>()
                    .map_err(|_| AnalysisError::NumericParse {
                        file: file.to_string(),
                        peak,
                        row: row_no + 1,
                        token: tok.to_string(),
                    })
            })
            .collect::<AnalysisResult<Vec<f64>>>()?;
        values.push(parsed);
    }

    Ok(PeakMatrix::from_rows(columns, values))
}
