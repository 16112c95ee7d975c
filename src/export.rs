use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::analysis::batch::FileDistribution;
use crate::analysis::overlay::{SampleAggregator, SampleTable};
use crate::data::model::{MwAverageRow, MW_AVERAGE_COLUMNS};

// ---------------------------------------------------------------------------
// CSV writers
// ---------------------------------------------------------------------------

/// MW-average rows under the `Samplename, Mp, Mn, ...` header. Rows keep
/// however many fields the export had.
pub fn write_mw_averages<W: Write>(out: W, rows: &[&MwAverageRow]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(out);
    writer.write_record(MW_AVERAGE_COLUMNS)?;
    for row in rows {
        writer.write_record(row.to_record())?;
    }
    writer.flush().context("flushing MW averages")?;
    Ok(())
}

/// Overlay points of one sample, one row per slice.
pub fn write_sample_table<W: Write>(out: W, table: &SampleTable) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["peak", "x", "y"])?;
    for (i, peak) in table.peaks.iter().enumerate() {
        for [x, y] in peak {
            writer.write_record([(i + 1).to_string(), x.to_string(), y.to_string()])?;
        }
    }
    writer.flush().context("flushing sample table")?;
    Ok(())
}

/// Segment table of one distribution.
pub fn write_distribution<W: Write>(out: W, result: &FileDistribution) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["Mw", "Percent"])?;
    for row in result.distribution.table() {
        writer.write_record([row.range, row.percent])?;
    }
    writer.flush().context("flushing distribution table")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// File layout
// ---------------------------------------------------------------------------

/// Replace characters that are awkward in file names.
pub fn file_stem_for(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}

fn create(path: &Path) -> Result<std::fs::File> {
    std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))
}

/// Write `<name>.csv` with all MW averages and `<name>_<sample>.csv` per
/// sample into `dir`. Returns the written paths.
pub fn export_overlay(dir: &Path, name: &str, samples: &SampleAggregator) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let stem = file_stem_for(name);
    let mut written = Vec::new();

    let summary = dir.join(format!("{stem}.csv"));
    write_mw_averages(create(&summary)?, &samples.average_rows())
        .with_context(|| format!("writing {}", summary.display()))?;
    written.push(summary);

    for table in samples.export_tables() {
        let path = dir.join(format!("{stem}_{}.csv", file_stem_for(&table.name)));
        write_sample_table(create(&path)?, &table)
            .with_context(|| format!("writing {}", path.display()))?;
        written.push(path);
    }

    log::info!("exported {} overlay tables to {}", written.len(), dir.display());
    Ok(written)
}

/// Write `<title>.csv` with the segment table of each distribution.
pub fn export_distributions(dir: &Path, results: &[FileDistribution]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    results
        .iter()
        .map(|r| {
            let path = dir.join(format!("{}.csv", file_stem_for(&r.title)));
            write_distribution(create(&path)?, r)
                .with_context(|| format!("writing {}", path.display()))?;
            Ok(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::binning::DistributionBinner;

    fn row(name: &str, fields: &[&str]) -> MwAverageRow {
        MwAverageRow {
            sample_name: name.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn averages_csv_has_header_and_rows() {
        let a = row("PE", &["1", "2", "3", "4", "5", "6", "1.5"]);
        let b = row("PP", &["7", "8"]);
        let mut buf = Vec::new();
        write_mw_averages(&mut buf, &[&a, &b]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Samplename,Mp,Mn,Mw,Mz,Mz+1,Mv,PD");
        assert_eq!(lines[1], "PE,1,2,3,4,5,6,1.5");
        assert_eq!(lines[2], "PP,7,8");
    }

    #[test]
    fn sample_table_numbers_peaks() {
        let table = SampleTable {
            name: "S".into(),
            averages: Vec::new(),
            peaks: vec![vec![[1.0, 2.0]], vec![[3.5, 4.0]]],
        };
        let mut buf = Vec::new();
        write_sample_table(&mut buf, &table).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "peak,x,y\n1,1,2\n2,3.5,4\n");
    }

    #[test]
    fn distribution_csv_uses_segment_labels() {
        let binner = DistributionBinner::new(&[0.0, 10_000.0, 100_000.0], 1.2);
        let bins = binner.bin_percentages(&[5_000.0, 50_000.0], &[0.25, 0.75]);
        let result = FileDistribution {
            file_name: "a.rst".into(),
            title: "a".into(),
            sample_name: "A".into(),
            averages: Vec::new(),
            distribution: crate::analysis::binning::Distribution {
                edges: binner.edges().to_vec(),
                bars: binner.bars(&bins),
                bins,
                curve: Vec::new(),
            },
        };
        let mut buf = Vec::new();
        write_distribution(&mut buf, &result).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "Mw,Percent\n< 1.0 × 10^4,25.00%\n> 1.0 × 10^4,75.00%\n");
    }

    #[test]
    fn stems_are_sanitized() {
        assert_eq!(file_stem_for("PE 100/a"), "PE_100_a");
        assert_eq!(file_stem_for(""), "unnamed");
    }
}
