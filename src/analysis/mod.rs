/// Analysis layer: binning a single sample and merging many samples.
///
/// ```text
///   SampleFile ──► binning  ──► Distribution (bars, curve, table)   mode A
///   SampleFile ──► overlay  ──► SampleAggregator (curves, tables)   mode B
///                  batch    ──► drives either mode over a file list
/// ```

pub mod batch;
pub mod binning;
pub mod overlay;
