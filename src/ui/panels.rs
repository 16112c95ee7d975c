use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use rusty_gpc::analysis::binning::order_label;
use rusty_gpc::config::DEFAULT_SETTING_NAME;

use crate::state::{AppState, Mode};

// ---------------------------------------------------------------------------
// Left side panel – segment edges and styling
// ---------------------------------------------------------------------------

/// Render the left settings panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Settings");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if state.mode == Mode::Distribution {
                segment_editor(ui, state);
                ui.separator();
            } else {
                ui.strong("Output name");
                ui.text_edit_singleline(&mut state.output_name);
                ui.separator();
            }

            style_editor(ui, state);
            ui.separator();

            egui::CollapsingHeader::new(
                RichText::new(format!("Files  ({})", state.files.len())).strong(),
            )
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                for path in &state.files {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    ui.label(name);
                }
            });

            if !state.failures.is_empty() {
                egui::CollapsingHeader::new(
                    RichText::new(format!("Failed  ({})", state.failures.len()))
                        .strong()
                        .color(Color32::RED),
                )
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    for msg in &state.failures {
                        ui.label(msg);
                    }
                });
            }
        });
}

fn segment_editor(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Segment edges");

    // Clone so the selection can change inside the loop.
    let edges = state.config.edges.all().to_vec();
    for edge in edges {
        let mut checked = state.config.edges.is_selected(edge);
        let text = format!("{edge}  ({})", order_label(edge as f64));
        if ui.checkbox(&mut checked, text).changed() {
            state.config.edges.toggle(edge);
        }
    }

    ui.horizontal(|ui: &mut Ui| {
        ui.add(egui::TextEdit::singleline(&mut state.new_edge).desired_width(100.0));
        if ui.button("Add").clicked() {
            state.add_edge_from_input();
        }
    });
}

fn style_editor(ui: &mut Ui, state: &mut AppState) {
    let settings = &mut state.config.settings;
    ui.strong("Style");
    if state.mode == Mode::Distribution {
        ui.add(
            egui::Slider::new(&mut settings.bar_width, 0.2..=2.0)
                .step_by(0.1)
                .text("Bar width"),
        );
        ui.checkbox(&mut settings.draw_bar, "Draw bars");
        ui.checkbox(&mut settings.draw_mw, "Draw Mw curve");
        ui.checkbox(&mut settings.draw_table, "Draw table");
    }
    ui.add(
        egui::Slider::new(&mut settings.line_width, 0.2..=2.0)
            .step_by(0.1)
            .text("Line width"),
    );
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_files_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export CSV…").clicked() {
                export_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Load settings…").clicked() {
                load_settings_dialog(state);
                ui.close_menu();
            }
            if ui.button("Save settings…").clicked() {
                save_settings_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if ui
            .selectable_label(state.mode == Mode::Distribution, "Mw distribution")
            .clicked()
        {
            state.mode = Mode::Distribution;
        }
        if ui
            .selectable_label(state.mode == Mode::Overlay, "GPC overlay")
            .clicked()
        {
            state.mode = Mode::Overlay;
        }

        ui.separator();

        if ui
            .add_enabled(!state.files.is_empty(), egui::Button::new("Run"))
            .clicked()
        {
            state.run();
        }

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                ui.visuals().text_color()
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_files_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Open GPC exports")
        .add_filter("GPC export", &["rst"])
        .add_filter("All files", &["*"])
        .pick_files();

    if let Some(files) = files {
        log::info!("Selected {} export file(s)", files.len());
        state.set_files(files);
    }
}

fn export_dialog(state: &mut AppState) {
    if let Some(dir) = rfd::FileDialog::new()
        .set_title("Export CSV into folder")
        .pick_folder()
    {
        state.export(&dir);
    }
}

fn load_settings_dialog(state: &mut AppState) {
    if let Some(path) = rfd::FileDialog::new()
        .set_title("Load settings")
        .add_filter("Settings", &["ini", "json"])
        .pick_file()
    {
        state.load_settings(&path);
    }
}

fn save_settings_dialog(state: &mut AppState) {
    if let Some(path) = rfd::FileDialog::new()
        .set_title("Save settings")
        .set_file_name(DEFAULT_SETTING_NAME)
        .save_file()
    {
        state.save_settings(&path);
    }
}
