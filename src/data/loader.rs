use std::io::ErrorKind;
use std::path::Path;

use log::debug;

use super::averages::extract_averages;
use super::locator::locate;
use super::model::{Document, SampleFile};
use super::slices::parse_peaks;
use crate::error::{AnalysisError, AnalysisResult};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read and parse one export file.
pub fn load_file(path: &Path) -> AnalysisResult<SampleFile> {
    let doc = read_document(path)?;
    parse_document(&doc)
}

/// Read an export file as single-byte ASCII text.
///
/// Missing files and non-ASCII content are reported as their own error
/// kinds so the batch loop can tell them apart.
pub fn read_document(path: &Path) -> AnalysisResult<Document> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AnalysisError::NotFound {
            path: path.to_path_buf(),
        },
        _ => AnalysisError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    if let Some(offset) = bytes.iter().position(|b| !b.is_ascii()) {
        return Err(AnalysisError::Encoding {
            path: path.to_path_buf(),
            offset,
            byte: bytes[offset],
        });
    }
    // ASCII is always valid UTF-8.
    let text = String::from_utf8_lossy(&bytes);

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Document::from_text(name, &text))
}

/// Parse a document into its MW averages and peak matrices.
///
/// Pure: the result depends only on `doc`, so consecutive files can never
/// leak rows into each other.
pub fn parse_document(doc: &Document) -> AnalysisResult<SampleFile> {
    let lines = doc.lines();
    let located = locate(lines);

    let missing = located.markers.missing();
    if !missing.is_empty() {
        debug!("{}: markers not found: {missing:?}", doc.name);
    }

    let averages = extract_averages(lines, &located.markers, &located.sample_name);

    let peaks = match located.markers.slice_table_start {
        Some(start) => parse_peaks(&doc.name, &lines[start + 1..])?,
        None => Vec::new(),
    };

    debug!(
        "{}: sample '{}', {} MW rows, {} peaks",
        doc.name,
        located.sample_name,
        averages.len(),
        peaks.len()
    );

    Ok(SampleFile {
        file_name: doc.name.clone(),
        sample_name: located.sample_name,
        markers: located.markers,
        averages,
        peaks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\
Sample Name\tPP-7\t
Injection\t1

<MW_Averages>
Peak\tMp\tMn\tMw\tMz\tMz+1\tMv\tPD
\t(g/mol)
1\t1000\t900\t1100\t1300\t1500\t1050\t1.22
</MW_Averages>
<Slice_Table>
Peak 1
RT (min)\tHeight\tNorm\tLog\tMW\tX\tY\t
10.0\t5\t0.25\t3.0\t1000\t3.0\t0.1\t
10.5\t6\t0.50\t3.3\t2000\t3.3\t0.4\t
11.0\t4\t0.25\t3.6\t4000\t3.6\t0.2\t
</Slice_Table>
";

    #[test]
    fn parses_full_document() {
        let doc = Document::from_text("pp7.rst", EXPORT);
        let parsed = parse_document(&doc).unwrap();
        assert_eq!(parsed.sample_name, "PP-7");
        assert_eq!(parsed.peak_count(), 1);
        assert_eq!(parsed.averages[0].mw(), Some("1100"));
        assert_eq!(parsed.peaks.len(), 1);
        // "Peak 1" opens the buffer and is discarded; all three slices stay.
        assert_eq!(parsed.peaks[0].rows(), 3);
        assert_eq!(parsed.peaks[0].column(4), Some(vec![1000.0, 2000.0, 4000.0]));
        assert!(parsed.markers.missing().is_empty());
    }

    #[test]
    fn document_without_slice_table_has_no_peaks() {
        let text = EXPORT.replace("<Slice_Table>", "<Other>");
        let parsed = parse_document(&Document::from_text("x.rst", &text)).unwrap();
        assert!(parsed.peaks.is_empty());
        assert_eq!(parsed.averages.len(), 1);
    }

    #[test]
    fn non_ascii_byte_is_an_encoding_error() {
        let path = std::env::temp_dir()
            .join(format!("rusty_gpc_latin1_{}.rst", std::process::id()));
        std::fs::write(&path, b"Sample Name\tCaf\xe9\n<MW_Averages>\n").unwrap();
        let result = read_document(&path);
        std::fs::remove_file(&path).unwrap();
        match result {
            Err(AnalysisError::Encoding { offset, byte, .. }) => {
                assert_eq!(offset, 15);
                assert_eq!(byte, 0xe9);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_file(Path::new("/definitely/not/here.rst")).unwrap_err();
        assert!(matches!(err, AnalysisError::NotFound { .. }));
    }
}
