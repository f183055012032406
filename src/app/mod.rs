//! App module - contains the main application state and logic

mod export;
mod selection;
mod transfer;

use crate::constants::{EXPORT_ROUTE, UPLOAD_ROUTE};
use crate::settings::Settings;
use crate::theme;
use crate::types::{SelectedFile, SessionState};
use eframe::egui;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    // Selection Tracker: the one file the user has chosen
    pub(crate) selected: Option<SelectedFile>,
    // Result Store, shared with the controllers' completion handlers
    pub(crate) session: Arc<Mutex<SessionState>>,
    pub(crate) runtime: tokio::runtime::Runtime,
    pub(crate) client: reqwest::Client,
    // Settings
    pub(crate) server_url_str: String,
    pub(crate) download_path: PathBuf,
    pub(crate) download_path_str: String,
    pub(crate) show_settings: bool,
    // Toast notification
    pub(crate) toast_message: Option<String>,
    pub(crate) toast_start: Option<std::time::Instant>,
    // Window state
    pub(crate) window_pos: Option<egui::Pos2>,
    pub(crate) window_size: Option<egui::Vec2>,
    pub(crate) needs_center: bool,
    pub(crate) data_dir: PathBuf,
}

// ============================================================================
// APP INITIALIZATION & HELPERS
// ============================================================================

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings, data_dir: PathBuf) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        // Add Phosphor icons font
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        theme::apply_visuals(&cc.egui_ctx);

        let download_path = settings.download_path_or_default();

        Self {
            selected: None,
            session: Arc::new(Mutex::new(SessionState::default())),
            runtime: tokio::runtime::Runtime::new().expect("failed to start tokio runtime"),
            client: reqwest::Client::new(),
            server_url_str: settings.server_url_or_default(),
            download_path: download_path.clone(),
            download_path_str: download_path.to_string_lossy().to_string(),
            show_settings: false,
            toast_message: None,
            toast_start: None,
            window_pos: None,
            window_size: None,
            needs_center: false,
            data_dir,
        }
    }

    pub fn save_settings(&self) {
        let settings = Settings {
            window_x: self.window_pos.map(|p| p.x),
            window_y: self.window_pos.map(|p| p.y),
            window_w: self.window_size.map(|s| s.x),
            window_h: self.window_size.map(|s| s.y),
            server_url: Some(self.server_url_str.clone()),
            download_path: Some(self.download_path_str.clone()),
        };
        settings.save(&self.data_dir);
    }

    fn server_url(&self) -> String {
        let trimmed = self.server_url_str.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            crate::constants::DEFAULT_SERVER_URL.to_string()
        } else {
            trimmed.to_string()
        }
    }

    pub(crate) fn upload_url(&self) -> String {
        format!("{}{}", self.server_url(), UPLOAD_ROUTE)
    }

    pub(crate) fn export_url(&self) -> String {
        format!("{}{}", self.server_url(), EXPORT_ROUTE)
    }

    pub(crate) fn show_toast(&mut self, message: impl Into<String>) {
        self.toast_message = Some(message.into());
        self.toast_start = Some(std::time::Instant::now());
    }
}
