use super::model::{Markers, MwAverageRow};

/// Lines between `<MW_Averages>` and the first data row (the tag itself
/// plus two header rows).
pub const MW_HEADER_OFFSET: usize = 3;

/// Extract the MW-average rows located by `markers`.
///
/// Takes lines `[start + 3, end)`; an empty or inverted range yields no
/// rows. The leading row index of each line is dropped and the remaining
/// fields are kept verbatim.
pub fn extract_averages<S: AsRef<str>>(
    lines: &[S],
    markers: &Markers,
    sample_name: &str,
) -> Vec<MwAverageRow> {
    let start = markers.mw_start() + MW_HEADER_OFFSET;
    let end = markers.mw_end().min(lines.len());
    if start >= end {
        return Vec::new();
    }

    lines[start..end]
        .iter()
        .map(|line| MwAverageRow {
            sample_name: sample_name.to_string(),
            fields: line
                .as_ref()
                .split('\t')
                .skip(1)
                .map(str::to_string)
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers(start: usize, end: usize) -> Markers {
        Markers {
            mw_averages_start: Some(start),
            mw_averages_end: Some(end),
            ..Default::default()
        }
    }

    #[test]
    fn skips_tag_and_headers_and_row_index() {
        let lines = [
            "<MW_Averages>",
            "Peak\tMp\tMn",
            "(g/mol)",
            "1\t1000\t900",
            "2\t5000\tabc",
            "</MW_Averages>",
        ];
        let rows = extract_averages(&lines, &markers(0, 5), "S1");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sample_name, "S1");
        assert_eq!(rows[0].fields, vec!["1000", "900"]);
        // No numeric validation at this stage.
        assert_eq!(rows[1].fields, vec!["5000", "abc"]);
    }

    #[test]
    fn header_only_table_has_no_rows() {
        let lines = ["<MW_Averages>", "h1", "h2", "</MW_Averages>"];
        assert!(extract_averages(&lines, &markers(0, 3), "S").is_empty());
    }

    #[test]
    fn missing_markers_give_empty_range() {
        let lines = ["a", "b", "c", "d", "e"];
        assert!(extract_averages(&lines, &Markers::default(), "S").is_empty());
    }

    #[test]
    fn missing_start_slices_from_the_top() {
        // Known permissive behaviour: only the end tag was found.
        let lines = ["a", "b", "c", "9\tstray", "</MW_Averages>"];
        let m = Markers {
            mw_averages_end: Some(4),
            ..Default::default()
        };
        let rows = extract_averages(&lines, &m, "S");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fields, vec!["stray"]);
    }
}
