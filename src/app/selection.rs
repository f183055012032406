//! File selection

use super::App;
use crate::error::AppError;
use crate::types::SelectedFile;
use tracing::{info, warn};

impl App {
    /// Open the picker and replace the current selection unconditionally.
    /// The `.csv` filter is an extension hint only; contents are not
    /// validated here.
    pub fn pick_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV files", &["csv"])
            .pick_file()
        else {
            return;
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.csv".to_string());

        match std::fs::read(&path) {
            Ok(bytes) => {
                info!(file = %name, size = bytes.len(), "File selected");
                self.selected = Some(SelectedFile {
                    name,
                    bytes,
                    mime: "text/csv".to_string(),
                });
            }
            Err(e) => {
                // Prior selection stays in place
                warn!(error = %e, path = %path.display(), "Failed to read selected file");
                self.session.lock().unwrap().fail(&AppError::Read {
                    path,
                    source: e,
                });
            }
        }
    }
}
