#![windows_subsystem = "windows"]
//! Anomaly Workbench - Main entry point

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod app;
mod constants;
mod error;
mod settings;
mod theme;
mod types;
mod ui;
mod utils;

use app::App;
use constants::*;
use eframe::egui;
use std::path::PathBuf;
use tracing::info;
use types::ResultState;
use ui::components::{format_cell, icon_button, pill_button};
use utils::{format_bytes, get_data_dir};

/// Initialize file logging. Returns a guard that must be held for the app lifetime.
fn init_logging(data_dir: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let logs_dir = data_dir.join("logs");
    std::fs::create_dir_all(&logs_dir).ok();

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "anomaly-workbench.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,anomaly_workbench=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    guard
}

fn main() -> eframe::Result<()> {
    let data_dir = get_data_dir();
    std::fs::create_dir_all(&data_dir).ok();

    // Initialize logging - guard must live for entire app lifetime
    let _log_guard = init_logging(&data_dir);

    info!(version = APP_VERSION, "Anomaly Workbench starting");

    let settings = settings::Settings::load(&data_dir);
    let win_pos = match (settings.window_x, settings.window_y) {
        (Some(x), Some(y)) => Some(egui::pos2(x, y)),
        _ => None,
    };
    let win_size = match (settings.window_w, settings.window_h) {
        (Some(w), Some(h)) => Some(egui::vec2(w, h)),
        _ => None,
    };

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size(win_size.unwrap_or(egui::vec2(960.0, 680.0)))
        .with_min_inner_size([640.0, 480.0])
        .with_title("Anomaly Detection Tool");

    let needs_center = win_pos.is_none();

    if let Some(pos) = win_pos {
        viewport = viewport.with_position(pos);
    }

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Anomaly Workbench",
        options,
        Box::new(move |cc| {
            let mut app = App::new(cc, settings, data_dir);
            app.needs_center = needs_center;
            Ok(Box::new(app))
        }),
    )
}

// ============================================================================
// MAIN UPDATE LOOP & UI RENDERING
// ============================================================================

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Track window position/size for saving on exit
        ctx.input(|i| {
            if let Some(rect) = i.viewport().outer_rect {
                self.window_pos = Some(rect.min);
            }
            if let Some(rect) = i.viewport().inner_rect {
                self.window_size = Some(rect.size());
            }
        });

        // Center window on first launch
        if self.needs_center {
            self.needs_center = false;
            if let Some(cmd) = egui::ViewportCommand::center_on_screen(ctx) {
                ctx.send_viewport_cmd(cmd);
            }
        }

        // A finished export queues its path; drain it into the toast
        let saved = self.session.lock().unwrap().saved_artifact.take();
        if let Some(path) = saved {
            self.show_toast(format!(
                "Saved {}",
                path.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| EXPORT_FILE_NAME.to_string())
            ));
        }

        // Snapshot of the result slot; rendering below reads only this
        let (result, uploading, exporting) = {
            let s = self.session.lock().unwrap();
            (s.result.clone(), s.upload_in_flight, s.export_in_flight)
        };

        egui::CentralPanel::default()
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin::same(20)),
            )
            .show(ctx, |ui| {
                self.render_header(ui);
                ui.add_space(theme::SPACING_LG);
                self.render_controls(ui, ctx, uploading);
                ui.add_space(theme::SPACING_MD);

                match &result {
                    ResultState::Failed(msg) => render_error_banner(ui, msg),
                    ResultState::Loaded(_) => self.render_results(ui, ctx, &result, exporting),
                    ResultState::Idle => {}
                }
            });

        self.render_settings_modal(ctx);
        self.render_toast(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application shutting down");
        self.save_settings();
    }
}

impl App {
    fn render_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add(
                egui::Label::new(
                    egui::RichText::new("Anomaly Detection Tool")
                        .size(20.0)
                        .strong()
                        .color(theme::TEXT_PRIMARY),
                )
                .selectable(false),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if icon_button(ui, egui_phosphor::regular::GEAR).clicked() {
                    self.show_settings = true;
                }
                ui.add(
                    egui::Label::new(
                        egui::RichText::new(format!("v{}", APP_VERSION))
                            .size(11.0)
                            .color(theme::TEXT_DIM),
                    )
                    .selectable(false),
                );
            });
        });
    }

    fn render_controls(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, uploading: bool) {
        ui.horizontal(|ui| {
            if pill_button(
                ui,
                egui_phosphor::regular::FILE_CSV,
                "Choose CSV",
                theme::BTN_DEFAULT,
            )
            .clicked()
            {
                self.pick_file();
            }

            match &self.selected {
                Some(file) => {
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new(format!(
                                "{}  ({})",
                                file.name,
                                format_bytes(file.bytes.len() as u64)
                            ))
                            .size(12.5)
                            .color(theme::TEXT_SECONDARY),
                        )
                        .selectable(false),
                    );
                }
                None => {
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new("No file selected")
                                .size(12.5)
                                .color(theme::TEXT_DIM),
                        )
                        .selectable(false),
                    );
                }
            }
        });

        ui.add_space(theme::SPACING_SM);

        ui.horizontal(|ui| {
            let run = pill_button(
                ui,
                egui_phosphor::regular::PLAY,
                "Run Anomaly Detection",
                theme::BTN_ACCENT,
            );
            if run.clicked() && !uploading {
                self.submit(ctx);
            }
            if uploading {
                ui.spinner();
                ui.add(
                    egui::Label::new(
                        egui::RichText::new("Analyzing…")
                            .size(12.5)
                            .color(theme::TEXT_MUTED),
                    )
                    .selectable(false),
                );
            }
        });
    }

    fn render_results(
        &mut self,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
        result: &ResultState,
        exporting: bool,
    ) {
        use egui_extras::{Column, TableBuilder};

        let headers = result.headers();
        let visible = result.visible_rows();
        let total = result.rows().map(<[types::Record]>::len).unwrap_or(0);

        ui.add(
            egui::Label::new(
                egui::RichText::new("Data After Anomaly Detection")
                    .size(15.0)
                    .strong()
                    .color(theme::TEXT_PRIMARY),
            )
            .selectable(false),
        );
        let caption = if total > visible.len() {
            format!("Showing first {} of {} rows", visible.len(), total)
        } else {
            format!("{} rows", total)
        };
        ui.add(
            egui::Label::new(
                egui::RichText::new(caption)
                    .size(11.5)
                    .color(theme::TEXT_MUTED),
            )
            .selectable(false),
        );
        ui.add_space(theme::SPACING_SM);

        ui.push_id("results_table", |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(false)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .columns(Column::auto().at_least(90.0).clip(true), headers.len())
                .min_scrolled_height(0.0)
                .header(24.0, |mut header| {
                    for name in &headers {
                        header.col(|ui| {
                            ui.add(
                                egui::Label::new(
                                    egui::RichText::new(*name)
                                        .size(12.5)
                                        .strong()
                                        .color(theme::ACCENT),
                                )
                                .selectable(false),
                            );
                        });
                    }
                })
                .body(|mut body| {
                    for record in visible {
                        body.row(22.0, |mut row| {
                            for name in &headers {
                                row.col(|ui| {
                                    let text = record
                                        .get(*name)
                                        .map(format_cell)
                                        .unwrap_or_default();
                                    ui.add(
                                        egui::Label::new(
                                            egui::RichText::new(text)
                                                .size(12.0)
                                                .color(theme::TEXT_SECONDARY),
                                        )
                                        .selectable(false),
                                    );
                                });
                            }
                        });
                    }
                });
        });

        ui.add_space(theme::SPACING_MD);
        ui.horizontal(|ui| {
            let download = pill_button(
                ui,
                egui_phosphor::regular::DOWNLOAD_SIMPLE,
                "Download Processed File",
                theme::BTN_DEFAULT,
            );
            if download.clicked() && !exporting {
                self.export_results(ctx);
            }
            if icon_button(ui, egui_phosphor::regular::FOLDER_OPEN).clicked() {
                std::fs::create_dir_all(&self.download_path).ok();
                let _ = open::that(&self.download_path);
            }
            if exporting {
                ui.spinner();
            }
        });
    }

    fn render_settings_modal(&mut self, ctx: &egui::Context) {
        if !self.show_settings {
            return;
        }

        let modal_response = egui::Modal::new(egui::Id::new("settings_modal")).show(ctx, |ui| {
            ui.set_width(380.0);

            ui.add(
                egui::Label::new(
                    egui::RichText::new("Settings")
                        .size(15.0)
                        .strong()
                        .color(theme::TEXT_PRIMARY),
                )
                .selectable(false),
            );
            ui.add_space(theme::SPACING_MD);

            // — Analysis Server —
            ui.add(
                egui::Label::new(
                    egui::RichText::new("Analysis Server").size(13.0).color(theme::ACCENT),
                )
                .selectable(false),
            );
            ui.add_space(2.0);
            let url_resp = ui.add(
                egui::TextEdit::singleline(&mut self.server_url_str)
                    .desired_width(f32::INFINITY)
                    .font(egui::FontId::proportional(13.0)),
            );
            if url_resp.lost_focus() {
                self.save_settings();
            }

            ui.add_space(theme::SPACING_MD);
            ui.separator();
            ui.add_space(theme::SPACING_SM);

            // — Download Path —
            ui.add(
                egui::Label::new(
                    egui::RichText::new("Download Path").size(13.0).color(theme::ACCENT),
                )
                .selectable(false),
            );
            ui.add_space(2.0);
            let path_changed = ui
                .horizontal(|ui| {
                    let browse_width = 28.0 + 4.0;
                    let text_width = (ui.available_width() - browse_width).max(40.0);
                    let te = ui.add(
                        egui::TextEdit::singleline(&mut self.download_path_str)
                            .desired_width(text_width)
                            .font(egui::FontId::proportional(13.0)),
                    );
                    if icon_button(ui, egui_phosphor::regular::FOLDER_OPEN).clicked() {
                        std::fs::create_dir_all(&self.download_path).ok();
                        if let Some(path) = rfd::FileDialog::new()
                            .set_directory(&self.download_path)
                            .pick_folder()
                        {
                            self.download_path = path;
                            self.download_path_str =
                                self.download_path.to_string_lossy().to_string();
                            self.save_settings();
                        }
                    }
                    te.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter))
                })
                .inner;

            if path_changed {
                self.download_path = PathBuf::from(&self.download_path_str);
                self.save_settings();
            }
        });

        if modal_response.should_close() {
            self.show_settings = false;
        }
    }

    fn render_toast(&mut self, ctx: &egui::Context) {
        let Some(msg) = self.toast_message.clone() else {
            return;
        };
        let elapsed = self
            .toast_start
            .map(|t| t.elapsed().as_secs_f32())
            .unwrap_or(0.0);
        if elapsed > 3.0 {
            self.toast_message = None;
            self.toast_start = None;
            return;
        }

        let screen = ctx.screen_rect();
        egui::Area::new(egui::Id::new("save_toast"))
            .fixed_pos(egui::pos2(screen.right() - 16.0, screen.bottom() - 16.0))
            .pivot(egui::Align2::RIGHT_BOTTOM)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(theme::BG_ELEVATED)
                    .stroke(egui::Stroke::new(1.0, theme::BORDER_DEFAULT))
                    .corner_radius(6.0)
                    .inner_margin(egui::Margin::symmetric(12, 8))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.add(
                                egui::Label::new(
                                    egui::RichText::new(egui_phosphor::regular::CHECK_CIRCLE)
                                        .size(14.0)
                                        .color(theme::STATUS_SUCCESS),
                                )
                                .selectable(false),
                            );
                            ui.add(
                                egui::Label::new(
                                    egui::RichText::new(msg)
                                        .size(12.5)
                                        .color(theme::TEXT_SECONDARY),
                                )
                                .selectable(false),
                            );
                        });
                    });
            });
        ctx.request_repaint();
    }
}

fn render_error_banner(ui: &mut egui::Ui, msg: &str) {
    egui::Frame::new()
        .fill(theme::ERROR_BG)
        .stroke(egui::Stroke::new(1.0, theme::STATUS_ERROR))
        .corner_radius(theme::RADIUS_DEFAULT)
        .inner_margin(egui::Margin::symmetric(12, 8))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.add(
                    egui::Label::new(
                        egui::RichText::new(egui_phosphor::regular::WARNING)
                            .size(14.0)
                            .color(theme::STATUS_ERROR),
                    )
                    .selectable(false),
                );
                ui.add(
                    egui::Label::new(
                        egui::RichText::new(msg)
                            .size(12.5)
                            .color(theme::STATUS_ERROR),
                    )
                    .selectable(false),
                );
            });
        });
}
