use eframe::egui::{self, Color32, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};
use palette::Srgb;

use rusty_gpc::analysis::batch::FileDistribution;
use rusty_gpc::analysis::overlay::SampleAggregator;

use crate::state::{AppState, Mode};

fn to_color32(c: Srgb<u8>) -> Color32 {
    Color32::from_rgb(c.red, c.green, c.blue)
}

/// Format a log10 axis mark as the underlying molecular weight.
fn mw_axis_label(value: f64) -> String {
    format!("{:.0e}", 10f64.powf(value))
}

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the result of the current mode in the central panel.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    match state.mode {
        Mode::Distribution => distribution_view(ui, state),
        Mode::Overlay => match &state.overlay {
            Some(samples) => overlay_plot(ui, state, samples),
            None => placeholder(ui),
        },
    }
}

fn placeholder(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading("Open export files and press Run  (File → Open…)");
    });
}

fn distribution_view(ui: &mut Ui, state: &mut AppState) {
    if state.distributions.is_empty() {
        placeholder(ui);
        return;
    }

    let titles: Vec<String> = state.distributions.iter().map(|d| d.title.clone()).collect();
    let current = titles.get(state.selected).cloned().unwrap_or_default();
    egui::ComboBox::from_label("Sample file")
        .selected_text(current)
        .show_ui(ui, |ui: &mut Ui| {
            for (i, title) in titles.iter().enumerate() {
                ui.selectable_value(&mut state.selected, i, title);
            }
        });
    ui.separator();

    let Some(result) = state.current_distribution() else {
        return;
    };

    if state.config.settings.draw_table {
        ui.columns(2, |cols| {
            distribution_plot(&mut cols[0], state, result);
            segment_tables(&mut cols[1], result);
        });
    } else {
        distribution_plot(ui, state, result);
    }
}

// ---------------------------------------------------------------------------
// Distribution plot: bars + normalized curve on a log10 axis
// ---------------------------------------------------------------------------

fn distribution_plot(ui: &mut Ui, state: &AppState, result: &FileDistribution) {
    let settings = &state.config.settings;
    let dist = &result.distribution;

    Plot::new("distribution_plot")
        .legend(Legend::default())
        .x_axis_label("Mw (g/mol)")
        .y_axis_label("Cumulative%")
        .x_axis_formatter(|mark, _range| mw_axis_label(mark.value))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            if settings.draw_bar {
                // Bars are edge-aligned at `position` and `width` wide in
                // linear space; convert both ends to log10.
                let bars: Vec<Bar> = dist
                    .bars
                    .iter()
                    .filter(|b| b.position > 0.0 && b.width > 0.0)
                    .map(|b| {
                        let left = b.position.log10();
                        let right = (b.position + b.width).log10();
                        Bar::new((left + right) / 2.0, b.percent).width(right - left)
                    })
                    .collect();
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .name("Cumulative %")
                        .color(to_color32(settings.bar_rgb())),
                );
            }

            if settings.draw_mw {
                let points: PlotPoints = dist
                    .curve
                    .iter()
                    .filter(|p| p[0] > 0.0)
                    .map(|p| [p[0].log10(), p[1]])
                    .collect();
                plot_ui.line(
                    Line::new(points)
                        .name(&result.title)
                        .color(to_color32(settings.mw_rgb()))
                        .width(settings.line_width as f32),
                );
            }
        });
}

fn segment_tables(ui: &mut Ui, result: &FileDistribution) {
    let rows = result.distribution.table();
    ui.heading(&result.title);

    ui.push_id("segments", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto())
            .column(Column::remainder())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Mw");
                });
                header.col(|ui| {
                    ui.strong("Percent");
                });
            })
            .body(|mut body| {
                for row in &rows {
                    body.row(18.0, |mut r| {
                        r.col(|ui| {
                            ui.label(&row.range);
                        });
                        r.col(|ui| {
                            ui.label(&row.percent);
                        });
                    });
                }
            });
    });

    ui.separator();

    let summary = result.summary();
    ui.push_id("summary", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto())
            .column(Column::auto())
            .column(Column::remainder())
            .header(20.0, |mut header| {
                for title in ["Mn", "Mw", "PDI"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for values in &summary {
                    body.row(18.0, |mut r| {
                        for v in values {
                            r.col(|ui| {
                                ui.label(v);
                            });
                        }
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Overlay plot
// ---------------------------------------------------------------------------

fn overlay_plot(ui: &mut Ui, state: &AppState, samples: &SampleAggregator) {
    let curves = samples.overlay(&state.config.palette);
    let width = state.config.settings.line_width as f32;

    Plot::new("overlay_plot")
        .legend(Legend::default())
        .x_axis_label("log Mw")
        .y_axis_label("dw/dlogM")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for curve in &curves {
                let points: PlotPoints = curve.points.iter().copied().collect();
                plot_ui.line(
                    Line::new(points)
                        .name(&curve.sample)
                        .color(to_color32(curve.color))
                        .width(width),
                );
            }
        });
}
