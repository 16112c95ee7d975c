use std::path::{Path, PathBuf};

use rusty_gpc::analysis::batch::{
    run_distribution, run_overlay, BatchControl, BatchOutcome, BatchProgress, FileDistribution,
};
use rusty_gpc::analysis::overlay::SampleAggregator;
use rusty_gpc::config::{AnalysisConfig, PlotSettings};
use rusty_gpc::export;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which analysis the viewer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One molecular-weight distribution per file.
    Distribution,
    /// All samples overlaid on one plot.
    Overlay,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Export files picked by the user.
    pub files: Vec<PathBuf>,

    pub mode: Mode,

    /// Edges, styling and palette handed to the analysis.
    pub config: AnalysisConfig,

    /// Mode A results of the last run.
    pub distributions: Vec<FileDistribution>,

    /// Index into `distributions` currently shown.
    pub selected: usize,

    /// Mode B result of the last run.
    pub overlay: Option<SampleAggregator>,

    /// Base name for overlay exports.
    pub output_name: String,

    /// Text of the "new edge" input.
    pub new_edge: String,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// One line per file that failed in the last run.
    pub failures: Vec<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            mode: Mode::Distribution,
            config: AnalysisConfig::default(),
            distributions: Vec::new(),
            selected: 0,
            overlay: None,
            output_name: "overlay".to_string(),
            new_edge: String::new(),
            status_message: None,
            failures: Vec::new(),
        }
    }
}

impl AppState {
    /// Replace the file list and forget previous results.
    pub fn set_files(&mut self, files: Vec<PathBuf>) {
        self.files = files;
        self.distributions.clear();
        self.selected = 0;
        self.overlay = None;
        self.status_message = Some(format!("{} file(s) selected", self.files.len()));
    }

    /// Run the current mode over the selected files.
    pub fn run(&mut self) {
        if self.files.is_empty() {
            self.status_message = Some("No files selected".to_string());
            return;
        }

        let mut last = String::new();
        let mut progress = |p: BatchProgress| {
            log::debug!("progress {p}");
            last = p.to_string();
        };
        let mut control = BatchControl::new(&mut progress);

        match self.mode {
            Mode::Distribution => {
                let outcome = run_distribution(&self.files, &self.config, &mut control);
                self.record_failures(&outcome);
                self.distributions = outcome.results;
                self.selected = 0;
            }
            Mode::Overlay => {
                let outcome = run_overlay(&self.files, &mut control);
                self.record_failures(&outcome);
                self.overlay = Some(outcome.results);
            }
        }
        drop(control);

        self.status_message = Some(if self.failures.is_empty() {
            format!("Done {last}")
        } else {
            format!("Done {last}, {} file(s) failed", self.failures.len())
        });
    }

    fn record_failures<T>(&mut self, outcome: &BatchOutcome<T>) {
        self.failures = outcome
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.path.display(), f.error))
            .collect();
    }

    /// Parse `new_edge` and add it to the segment edges.
    pub fn add_edge_from_input(&mut self) {
        match self.new_edge.trim().parse::<u64>() {
            Ok(edge) => {
                self.config.edges.add_edge(edge);
                self.new_edge.clear();
            }
            Err(_) => {
                self.status_message =
                    Some(format!("'{}' is not a whole number", self.new_edge.trim()));
            }
        }
    }

    pub fn load_settings(&mut self, path: &Path) {
        match PlotSettings::load(path) {
            Ok(settings) => {
                log::info!("loaded settings from {}", path.display());
                self.config = AnalysisConfig {
                    palette: self.config.palette.clone(),
                    ..AnalysisConfig::from_settings(settings)
                };
            }
            Err(e) => {
                log::error!("Failed to load settings: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    pub fn save_settings(&mut self, path: &Path) {
        if let Err(e) = self.config.to_settings().save(path) {
            log::error!("Failed to save settings: {e:#}");
            self.status_message = Some(format!("Error: {e:#}"));
        }
    }

    /// Write the results of the current mode as CSV into `dir`.
    pub fn export(&mut self, dir: &Path) {
        let result = match self.mode {
            Mode::Distribution => export::export_distributions(dir, &self.distributions),
            Mode::Overlay => match &self.overlay {
                Some(samples) => export::export_overlay(dir, &self.output_name, samples),
                None => Ok(Vec::new()),
            },
        };
        self.status_message = Some(match result {
            Ok(paths) => format!("Exported {} file(s) to {}", paths.len(), dir.display()),
            Err(e) => {
                log::error!("Export failed: {e:#}");
                format!("Error: {e:#}")
            }
        });
    }

    pub fn current_distribution(&self) -> Option<&FileDistribution> {
        self.distributions.get(self.selected)
    }
}
