use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use palette::Srgb;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::color::Palette;

pub const DEFAULT_BAR_COLOR: &str = "#002FA7";
pub const DEFAULT_MW_COLOR: &str = "#FF6A07";
pub const DEFAULT_SETTING_NAME: &str = "defaultSetting.ini";

/// Default molecular-weight bin boundaries.
pub const DEFAULT_EDGES: [u64; 10] = [
    0, 5_000, 10_000, 50_000, 100_000, 500_000, 1_000_000, 5_000_000, 10_000_000, 50_000_000,
];

// ---------------------------------------------------------------------------
// Segment edges
// ---------------------------------------------------------------------------

/// User-editable bin boundaries plus the subset currently selected for
/// binning. Both lists are kept sorted ascending without duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentEdges {
    edges: Vec<u64>,
    selected: Vec<u64>,
}

impl Default for SegmentEdges {
    fn default() -> Self {
        SegmentEdges::new(DEFAULT_EDGES.to_vec())
    }
}

impl SegmentEdges {
    /// All given edges, all selected.
    pub fn new(mut edges: Vec<u64>) -> Self {
        edges.sort_unstable();
        edges.dedup();
        SegmentEdges {
            selected: edges.clone(),
            edges,
        }
    }

    pub fn all(&self) -> &[u64] {
        &self.edges
    }

    pub fn selected(&self) -> &[u64] {
        &self.selected
    }

    pub fn is_selected(&self, edge: u64) -> bool {
        self.selected.binary_search(&edge).is_ok()
    }

    /// Insert a new edge in sorted position and select it.
    pub fn add_edge(&mut self, edge: u64) {
        insert_sorted(&mut self.edges, edge);
        insert_sorted(&mut self.selected, edge);
    }

    /// Replace the selection; values that are not known edges are ignored.
    pub fn select(&mut self, edges: &[u64]) {
        let mut selected: Vec<u64> = edges
            .iter()
            .copied()
            .filter(|e| self.edges.binary_search(e).is_ok())
            .collect();
        selected.sort_unstable();
        selected.dedup();
        self.selected = selected;
    }

    /// Flip the selection state of one known edge.
    pub fn toggle(&mut self, edge: u64) {
        match self.selected.binary_search(&edge) {
            Ok(i) => {
                self.selected.remove(i);
            }
            Err(i) if self.edges.binary_search(&edge).is_ok() => self.selected.insert(i, edge),
            Err(_) => {}
        }
    }

    /// Selected edges as floats, ready for binning.
    pub fn active(&self) -> Vec<f64> {
        self.selected.iter().map(|&e| e as f64).collect()
    }
}

fn insert_sorted(v: &mut Vec<u64>, value: u64) {
    if let Err(i) = v.binary_search(&value) {
        v.insert(i, value);
    }
}

// ---------------------------------------------------------------------------
// Plot settings document
// ---------------------------------------------------------------------------

/// Styling and binning settings, stored as JSON.
///
/// Older settings files used camelCase keys; those are accepted on read and
/// the snake_case names are always written. See [`LEGACY_KEYS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSettings {
    #[serde(rename = "segmentpos")]
    pub segment_edges: Vec<u64>,
    pub bar_color: String,
    pub mw_color: String,
    pub transparent_back: bool,
    pub bar_width: f64,
    pub line_width: f64,
    pub axis_width: f64,
    pub title_font_size: f64,
    pub axis_font_size: f64,
    pub draw_bar: bool,
    pub draw_mw: bool,
    pub draw_table: bool,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            segment_edges: DEFAULT_EDGES.to_vec(),
            bar_color: DEFAULT_BAR_COLOR.to_string(),
            mw_color: DEFAULT_MW_COLOR.to_string(),
            transparent_back: true,
            bar_width: 1.2,
            line_width: 1.0,
            axis_width: 1.0,
            title_font_size: 20.0,
            axis_font_size: 14.0,
            draw_bar: true,
            draw_mw: true,
            draw_table: true,
        }
    }
}

/// `(current, legacy)` key pairs. When a document carries both spellings
/// the current one wins.
pub const LEGACY_KEYS: [(&str, &str); 11] = [
    ("bar_color", "barColor"),
    ("mw_color", "MwColor"),
    ("transparent_back", "transparentBack"),
    ("bar_width", "barWidth"),
    ("line_width", "lineWidth"),
    ("axis_width", "axisWidth"),
    ("title_font_size", "titleFontSize"),
    ("axis_font_size", "axisFontSize"),
    ("draw_bar", "drawBar"),
    ("draw_mw", "drawMw"),
    ("draw_table", "drawTable"),
];

impl PlotSettings {
    pub fn from_json(text: &str) -> Result<Self> {
        let mut map: Map<String, Value> =
            serde_json::from_str(text).context("parsing settings JSON")?;
        for (current, legacy) in LEGACY_KEYS {
            if let Some(value) = map.remove(legacy) {
                map.entry(current).or_insert(value);
            }
        }
        serde_json::from_value(Value::Object(map)).context("reading settings fields")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        Self::from_json(text.trim()).with_context(|| format!("in {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).context("serializing settings")?;
        std::fs::write(path, text).with_context(|| format!("writing settings {}", path.display()))
    }

    pub fn bar_rgb(&self) -> Srgb<u8> {
        parse_hex(&self.bar_color, DEFAULT_BAR_COLOR)
    }

    pub fn mw_rgb(&self) -> Srgb<u8> {
        parse_hex(&self.mw_color, DEFAULT_MW_COLOR)
    }

    /// Segment edges described by these settings, all selected.
    pub fn edges(&self) -> SegmentEdges {
        SegmentEdges::new(self.segment_edges.clone())
    }
}

fn parse_hex(value: &str, fallback: &str) -> Srgb<u8> {
    Srgb::<u8>::from_str(value)
        .or_else(|_| Srgb::<u8>::from_str(fallback))
        .unwrap_or_else(|_| Srgb::new(0, 0, 0))
}

// ---------------------------------------------------------------------------
// Analysis configuration
// ---------------------------------------------------------------------------

/// Everything the binner and aggregator need, passed in explicitly.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub edges: SegmentEdges,
    pub settings: PlotSettings,
    pub palette: Palette,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig::from_settings(PlotSettings::default())
    }
}

impl AnalysisConfig {
    pub fn from_settings(settings: PlotSettings) -> Self {
        Self {
            edges: settings.edges(),
            settings,
            palette: Palette::default(),
        }
    }

    /// Settings with the current edge selection written back, ready to save.
    pub fn to_settings(&self) -> PlotSettings {
        PlotSettings {
            segment_edges: self.edges.selected().to_vec(),
            ..self.settings.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_edges_span_zero_to_fifty_million() {
        let edges = SegmentEdges::default();
        assert_eq!(edges.all().len(), 10);
        assert_eq!(edges.all().first(), Some(&0));
        assert_eq!(edges.all().last(), Some(&50_000_000));
        assert_eq!(edges.selected(), edges.all());
    }

    #[test]
    fn added_edges_stay_sorted() {
        let mut edges = SegmentEdges::new(vec![100, 10, 1000]);
        edges.add_edge(500);
        edges.add_edge(1);
        edges.add_edge(500);
        assert_eq!(edges.all(), &[1, 10, 100, 500, 1000]);
        assert!(edges.is_selected(500));
    }

    #[test]
    fn selection_is_a_sorted_subset() {
        let mut edges = SegmentEdges::new(vec![0, 10, 100, 1000]);
        edges.select(&[1000, 7, 0, 100]);
        assert_eq!(edges.selected(), &[0, 100, 1000]);
        edges.toggle(100);
        edges.toggle(10);
        edges.toggle(42);
        assert_eq!(edges.selected(), &[0, 10, 1000]);
        assert_eq!(edges.active(), vec![0.0, 10.0, 1000.0]);
    }

    #[test]
    fn legacy_keys_are_accepted() {
        let json = r##"{
            "segmentpos": [0, 100, 1000],
            "barColor": "#112233",
            "barWidth": 0.8,
            "drawTable": false
        }"##;
        let s = PlotSettings::from_json(json).unwrap();
        assert_eq!(s.segment_edges, vec![0, 100, 1000]);
        assert_eq!(s.bar_color, "#112233");
        assert_eq!(s.bar_width, 0.8);
        assert!(!s.draw_table);
        // Untouched keys keep their defaults.
        assert_eq!(s.mw_color, DEFAULT_MW_COLOR);
        assert_eq!(s.bar_rgb(), Srgb::new(0x11, 0x22, 0x33));
    }

    #[test]
    fn current_key_wins_over_legacy_spelling() {
        let json = r##"{"bar_color": "#112233", "barColor": "#445566", "drawMw": false}"##;
        let s = PlotSettings::from_json(json).unwrap();
        assert_eq!(s.bar_color, "#112233");
        assert!(!s.draw_mw);

        let json = r##"{"barColor": "#445566", "bar_color": "#112233"}"##;
        assert_eq!(PlotSettings::from_json(json).unwrap().bar_color, "#112233");
    }

    #[test]
    fn written_keys_are_snake_case() {
        let json = serde_json::to_string(&PlotSettings::default()).unwrap();
        assert!(json.contains("\"segmentpos\""));
        assert!(json.contains("\"bar_width\""));
        assert!(!json.contains("barWidth"));
    }

    #[test]
    fn bad_color_falls_back_to_default() {
        let s = PlotSettings {
            mw_color: "orange-ish".into(),
            ..Default::default()
        };
        assert_eq!(s.mw_rgb(), Srgb::new(0xFF, 0x6A, 0x07));
    }

    #[test]
    fn config_writes_selection_back() {
        let mut cfg = AnalysisConfig::default();
        cfg.edges.select(&[0, 5_000, 10_000]);
        assert_eq!(cfg.to_settings().segment_edges, vec![0, 5_000, 10_000]);
    }
}
