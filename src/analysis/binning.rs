use std::fmt;

use crate::data::model::{PeakSet, COL_MW, COL_NORM};
use crate::error::{AnalysisError, AnalysisResult};

/// Peak height of the normalized display curve.
pub const CURVE_HEIGHT: f64 = 50.0;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One bar of the distribution histogram.
///
/// `position` is the left edge of the bar, drawn edge-aligned on a log axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub position: f64,
    pub width: f64,
    pub percent: f64,
}

/// Binned distribution of one sample plus its display curve.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    /// Active edges, ascending.
    pub edges: Vec<f64>,
    /// Cumulative area percentage per bin, `edges.len() - 1` entries.
    pub bins: Vec<f64>,
    pub bars: Vec<Bar>,
    /// `(mw, normalized area)` points scaled so the maximum is [`CURVE_HEIGHT`].
    pub curve: Vec<[f64; 2]>,
}

impl Distribution {
    /// Rows of the segment table: range label and formatted percentage.
    pub fn table(&self) -> Vec<SegmentRow> {
        segment_table(&self.edges, &self.bins)
    }
}

// ---------------------------------------------------------------------------
// Binner
// ---------------------------------------------------------------------------

/// Bins molecular-weight slices into the configured segments.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionBinner {
    edges: Vec<f64>,
    bar_width: f64,
}

impl DistributionBinner {
    /// `edges` are re-sorted; fewer than two edges produce no bins.
    pub fn new(edges: &[f64], bar_width: f64) -> Self {
        let mut edges = edges.to_vec();
        edges.sort_by(f64::total_cmp);
        DistributionBinner { edges, bar_width }
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// `100 · Σ norm[j]` for every `mw[j]` strictly inside each bin.
    /// A value sitting exactly on an edge belongs to neither neighbour.
    pub fn bin_percentages(&self, mw: &[f64], norm: &[f64]) -> Vec<f64> {
        self.edges
            .windows(2)
            .map(|w| {
                let (lo, hi) = (w[0], w[1]);
                let sum: f64 = mw
                    .iter()
                    .zip(norm)
                    .filter(|&(&m, _)| lo < m && m < hi)
                    .map(|(_, &n)| n)
                    .sum();
                sum * 100.0
            })
            .collect()
    }

    /// Bar placement: a quarter of the way from the lower to the upper
    /// edge, with width proportional to the position.
    pub fn bars(&self, bins: &[f64]) -> Vec<Bar> {
        self.edges
            .windows(2)
            .zip(bins)
            .map(|(w, &percent)| {
                let position = 0.75 * w[0] + 0.25 * w[1];
                Bar {
                    position,
                    width: position * self.bar_width,
                    percent,
                }
            })
            .collect()
    }

    /// Bin the slices of every peak of one file.
    pub fn bin(&self, file: &str, peaks: &PeakSet) -> AnalysisResult<Distribution> {
        let (mw, norm) = flatten(file, peaks)?;
        let curve = normalized_curve(file, &mw, &norm)?;
        let bins = self.bin_percentages(&mw, &norm);
        let bars = self.bars(&bins);
        Ok(Distribution {
            edges: self.edges.clone(),
            bins,
            bars,
            curve,
        })
    }
}

/// Concatenate the MW and normalized-area columns of all peaks.
pub fn flatten(file: &str, peaks: &PeakSet) -> AnalysisResult<(Vec<f64>, Vec<f64>)> {
    let mut mw = Vec::new();
    let mut norm = Vec::new();
    for (i, peak) in peaks.iter().enumerate() {
        let missing = |column| AnalysisError::MissingColumn {
            file: file.to_string(),
            peak: i + 1,
            column,
        };
        mw.extend(peak.column(COL_MW).ok_or_else(|| missing(COL_MW))?);
        norm.extend(peak.column(COL_NORM).ok_or_else(|| missing(COL_NORM))?);
    }
    Ok((mw, norm))
}

/// Scale `norm` so its maximum becomes [`CURVE_HEIGHT`].
///
/// A zero (or absent) maximum is reported instead of dividing by it.
pub fn normalized_curve(file: &str, mw: &[f64], norm: &[f64]) -> AnalysisResult<Vec<[f64; 2]>> {
    let max = norm.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if norm.is_empty() || max == 0.0 || !max.is_finite() {
        return Err(AnalysisError::EmptyDistribution {
            file: file.to_string(),
        });
    }
    Ok(mw
        .iter()
        .zip(norm)
        .map(|(&m, &n)| [m, n * CURVE_HEIGHT / max])
        .collect())
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Order-of-magnitude label of an edge value.
///
/// The exponent is the digit count of the integer part minus one, not a
/// true `log10`: `99999` renders as `10.0 × 10^4`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderLabel {
    pub mantissa: f64,
    pub exponent: u32,
}

pub fn order_label(value: f64) -> OrderLabel {
    let digits = (value.trunc().abs() as u64).to_string().len() as u32;
    let exponent = digits - 1;
    OrderLabel {
        mantissa: value / 10f64.powi(exponent as i32),
        exponent,
    }
}

impl fmt::Display for OrderLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} × 10^{}", self.mantissa, self.exponent)
    }
}

/// One row of the segment table.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRow {
    pub range: String,
    pub percent: String,
}

/// Table rows for `bins` over `edges`. The outermost edges are treated as
/// open bounds: the first row reads `< x`, the last `> y`.
///
/// There is one row per bin, `edges.len() - 1` in total, so the first and
/// last bins keep their own rows. Older exports of this table skipped the
/// outermost edges and wrote one row fewer.
pub fn segment_table(edges: &[f64], bins: &[f64]) -> Vec<SegmentRow> {
    let n = bins.len().min(edges.len().saturating_sub(1));
    (0..n)
        .map(|i| {
            let range = if i == 0 && n > 1 {
                format!("< {}", order_label(edges[1]))
            } else if i == n - 1 && n > 1 {
                format!("> {}", order_label(edges[i]))
            } else {
                format!("{} ~ {}", order_label(edges[i]), order_label(edges[i + 1]))
            };
            SegmentRow {
                range,
                percent: format!("{:.2}%", bins[i]),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::PeakMatrix;

    fn peak(rows: &[(f64, f64)]) -> PeakMatrix {
        // Columns: rt, height, norm, log, mw, x, y
        PeakMatrix::from_rows(
            7,
            rows.iter()
                .map(|&(mw, norm)| vec![0.0, 0.0, norm, mw.log10(), mw, mw.log10(), norm])
                .collect(),
        )
    }

    #[test]
    fn reference_bins() {
        let binner = DistributionBinner::new(&[0.0, 10_000.0, 100_000.0], 1.2);
        let bins = binner.bin_percentages(&[5_000.0, 50_000.0], &[0.1, 0.2]);
        assert_eq!(bins.len(), 2);
        assert!((bins[0] - 10.0).abs() < 1e-9);
        assert!((bins[1] - 20.0).abs() < 1e-9);
    }

    #[test]
    fn value_on_an_edge_falls_in_no_bin() {
        let binner = DistributionBinner::new(&[0.0, 10_000.0, 100_000.0], 1.2);
        assert_eq!(binner.bin_percentages(&[10_000.0], &[0.5]), vec![0.0, 0.0]);
    }

    #[test]
    fn edges_are_resorted() {
        let binner = DistributionBinner::new(&[100_000.0, 0.0, 10_000.0], 1.0);
        assert_eq!(binner.edges(), &[0.0, 10_000.0, 100_000.0]);
    }

    #[test]
    fn mass_is_conserved_inside_the_edges() {
        let edges = [0.0, 5_000.0, 10_000.0, 50_000.0, 100_000.0];
        let mw = [100.0, 5_000.0, 7_500.0, 20_000.0, 99_999.0, 100_000.0, 200_000.0];
        let norm = [0.05, 0.10, 0.15, 0.20, 0.25, 0.15, 0.10];
        let binner = DistributionBinner::new(&edges, 1.2);
        let total: f64 = binner.bin_percentages(&mw, &norm).iter().map(|b| b / 100.0).sum();
        // 5_000 sits on an interior edge, 100_000 on the max edge, 200_000 beyond it.
        let expected = 0.05 + 0.15 + 0.20 + 0.25;
        assert!((total - expected).abs() < 1e-12);
    }

    #[test]
    fn bars_lean_toward_lower_edge() {
        let binner = DistributionBinner::new(&[0.0, 10_000.0, 100_000.0], 1.2);
        let bars = binner.bars(&[1.0, 2.0]);
        assert_eq!(bars[0].position, 2_500.0);
        assert_eq!(bars[1].position, 32_500.0);
        assert!((bars[1].width - 39_000.0).abs() < 1e-9);
        assert_eq!(bars[1].percent, 2.0);
    }

    #[test]
    fn binning_is_idempotent() {
        let peaks = vec![peak(&[(2_000.0, 0.2), (20_000.0, 0.5)]), peak(&[(300_000.0, 0.3)])];
        let binner = DistributionBinner::new(&[0.0, 10_000.0, 100_000.0, 1e6], 1.2);
        let first = binner.bin("a.rst", &peaks).unwrap();
        let second = binner.bin("a.rst", &peaks).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.bins.len(), 3);
        assert!((first.bins[2] - 30.0).abs() < 1e-9);
    }

    #[test]
    fn curve_peaks_at_fifty() {
        let curve = normalized_curve("a", &[1.0, 2.0, 3.0], &[0.1, 0.4, 0.2]).unwrap();
        assert_eq!(curve[1][0], 2.0);
        assert!((curve[1][1] - 50.0).abs() < 1e-12);
        assert!((curve[0][1] - 12.5).abs() < 1e-12);
    }

    #[test]
    fn zero_maximum_is_an_empty_distribution() {
        let err = normalized_curve("z.rst", &[1.0, 2.0], &[0.0, 0.0]).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyDistribution { .. }));
        let binner = DistributionBinner::new(&[0.0, 1.0], 1.0);
        assert!(binner.bin("z.rst", &Vec::new()).is_err());
    }

    #[test]
    fn narrow_peak_reports_missing_column() {
        let peaks = vec![PeakMatrix::from_rows(3, vec![vec![1.0, 2.0, 3.0]])];
        let binner = DistributionBinner::new(&[0.0, 1.0], 1.0);
        assert!(matches!(
            binner.bin("n.rst", &peaks),
            Err(AnalysisError::MissingColumn { peak: 1, column: 4, .. })
        ));
    }

    #[test]
    fn labels_use_digit_count_exponent() {
        let l = order_label(100_000.0);
        assert_eq!(l.exponent, 5);
        assert_eq!(l.mantissa, 1.0);

        let l = order_label(5_000.0);
        assert_eq!(l.exponent, 3);
        assert_eq!(l.mantissa, 5.0);
        assert_eq!(l.to_string(), "5.0 × 10^3");

        assert_eq!(order_label(0.0).to_string(), "0.0 × 10^0");
        assert_eq!(order_label(50_000_000.0).to_string(), "5.0 × 10^7");
        assert_eq!(order_label(99_999.0).to_string(), "10.0 × 10^4");
    }

    #[test]
    fn segment_table_has_one_row_per_bin() {
        let edges = [0.0, 5_000.0, 10_000.0, 50_000.0, 100_000.0];
        let bins = [5.0, 10.0, 20.0, 65.0];
        let rows = segment_table(&edges, &bins);
        assert_eq!(rows.len(), edges.len() - 1);
        assert_eq!(rows[0].range, "< 5.0 × 10^3");
        assert_eq!(rows[3].range, "> 5.0 × 10^4");
        assert_eq!(rows[3].percent, "65.00%");
    }

    #[test]
    fn segment_table_rows() {
        let edges = [0.0, 5_000.0, 10_000.0, 50_000.0];
        let rows = segment_table(&edges, &[1.0, 2.5, 3.333]);
        let ranges: Vec<&str> = rows.iter().map(|r| r.range.as_str()).collect();
        assert_eq!(
            ranges,
            vec!["< 5.0 × 10^3", "5.0 × 10^3 ~ 1.0 × 10^4", "> 1.0 × 10^4"]
        );
        assert_eq!(rows[2].percent, "3.33%");
    }
}
