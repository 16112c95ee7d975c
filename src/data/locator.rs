use super::model::{Marker, Markers};

// ---------------------------------------------------------------------------
// Section locator
// ---------------------------------------------------------------------------

/// What the locator is looking for next. Markers are expected in file
/// order; once a later marker is seen, earlier ones are no longer searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seek {
    Sample,
    MwStart,
    MwEnd,
    SliceStart,
    Done,
}

impl Seek {
    fn pending(self) -> &'static [Marker] {
        match self {
            Seek::Sample => &[
                Marker::SampleName,
                Marker::MwAveragesStart,
                Marker::MwAveragesEnd,
                Marker::SliceTableStart,
            ],
            Seek::MwStart => &[
                Marker::MwAveragesStart,
                Marker::MwAveragesEnd,
                Marker::SliceTableStart,
            ],
            Seek::MwEnd => &[Marker::MwAveragesEnd, Marker::SliceTableStart],
            Seek::SliceStart => &[Marker::SliceTableStart],
            Seek::Done => &[],
        }
    }

    fn after(marker: Marker) -> Seek {
        match marker {
            Marker::SampleName => Seek::MwStart,
            Marker::MwAveragesStart => Seek::MwEnd,
            Marker::MwAveragesEnd => Seek::SliceStart,
            Marker::SliceTableStart => Seek::Done,
        }
    }
}

/// Result of one locator pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Located {
    pub markers: Markers,
    /// First tab field after the `Sample Name` label, empty when absent.
    pub sample_name: String,
}

/// Scan `lines` once, stopping at the first `<Slice_Table>`.
///
/// Never fails: a marker that is not found stays `None` in [`Markers`].
pub fn locate<S: AsRef<str>>(lines: &[S]) -> Located {
    let mut located = Located::default();
    let mut state = Seek::Sample;

    for (pos, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        let Some(&hit) = state
            .pending()
            .iter()
            .find(|m| line.contains(m.pattern()))
        else {
            continue;
        };

        match hit {
            Marker::SampleName => {
                located.markers.sample_name_line = Some(pos);
                located.sample_name = line.split('\t').nth(1).unwrap_or("").to_string();
            }
            Marker::MwAveragesStart => located.markers.mw_averages_start = Some(pos),
            Marker::MwAveragesEnd => located.markers.mw_averages_end = Some(pos),
            Marker::SliceTableStart => located.markers.slice_table_start = Some(pos),
        }
        state = Seek::after(hit);
        if state == Seek::Done {
            break;
        }
    }

    located
}
