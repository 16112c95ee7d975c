/// Data layer: export-file model, section location and parsing.
///
/// Architecture:
/// ```text
///  *.rst export (ASCII text)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read bytes → Document (trimmed, non-empty lines)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ locator   │  one pass → Markers + sample name
///   └──────────┘
///        │
///        ├──────────────────┐
///        ▼                  ▼
///   ┌──────────┐      ┌──────────┐
///   │ averages  │      │  slices   │  boundary heuristics → PeakSet
///   └──────────┘      └──────────┘
///        │                  │
///        └────────┬─────────┘
///                 ▼
///           SampleFile
/// ```

pub mod averages;
pub mod loader;
pub mod locator;
pub mod model;
pub mod slices;
