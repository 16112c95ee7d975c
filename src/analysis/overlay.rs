use palette::Srgb;

use crate::color::Palette;
use crate::data::model::{MwAverageRow, PeakSet, SampleFile, COL_OVERLAY_X, COL_OVERLAY_Y};

// ---------------------------------------------------------------------------
// Aggregated samples
// ---------------------------------------------------------------------------

/// Everything collected for one sample name across the batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleEntry {
    pub name: String,
    pub averages: Vec<MwAverageRow>,
    pub peaks: PeakSet,
}

/// One curve of the overlay plot.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayCurve {
    pub sample: String,
    pub sample_index: usize,
    pub color: Srgb<u8>,
    pub points: Vec<[f64; 2]>,
}

/// Flat export table of one sample: its MW rows and the (x, y) pairs of
/// each of its peaks.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTable {
    pub name: String,
    pub averages: Vec<MwAverageRow>,
    pub peaks: Vec<Vec<[f64; 2]>>,
}

/// Merges parsed files by sample name, keeping first-seen order.
///
/// A sample name seen again in a later file has that file's rows and peaks
/// appended to the existing entry.
#[derive(Debug, Clone, Default)]
pub struct SampleAggregator {
    samples: Vec<SampleEntry>,
}

impl SampleAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, file: SampleFile) {
        let entry = match self.samples.iter().position(|s| s.name == file.sample_name) {
            Some(i) => &mut self.samples[i],
            None => {
                self.samples.push(SampleEntry {
                    name: file.sample_name.clone(),
                    ..Default::default()
                });
                let last = self.samples.len() - 1;
                &mut self.samples[last]
            }
        };
        entry.averages.extend(file.averages);
        entry.peaks.extend(file.peaks);
    }

    pub fn samples(&self) -> &[SampleEntry] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// One curve per peak, coloured by sample index. Peaks too narrow to
    /// hold the overlay columns are skipped.
    pub fn overlay(&self, palette: &Palette) -> Vec<OverlayCurve> {
        self.samples
            .iter()
            .enumerate()
            .flat_map(|(idx, sample)| {
                let color = palette.color_for(idx);
                sample.peaks.iter().filter_map(move |peak| {
                    Some(OverlayCurve {
                        sample: sample.name.clone(),
                        sample_index: idx,
                        color,
                        points: peak.xy(COL_OVERLAY_X, COL_OVERLAY_Y)?,
                    })
                })
            })
            .collect()
    }

    /// All MW-average rows in sample order.
    pub fn average_rows(&self) -> Vec<&MwAverageRow> {
        self.samples.iter().flat_map(|s| s.averages.iter()).collect()
    }

    /// One logical table per sample, in insertion order.
    pub fn export_tables(&self) -> Vec<SampleTable> {
        self.samples
            .iter()
            .map(|s| SampleTable {
                name: s.name.clone(),
                averages: s.averages.clone(),
                peaks: s
                    .peaks
                    .iter()
                    .filter_map(|p| p.xy(COL_OVERLAY_X, COL_OVERLAY_Y))
                    .collect(),
            })
            .collect()
    }
}
