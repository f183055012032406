//! Export logic: fetch the processed artifact and save it locally

use super::App;
use crate::constants::EXPORT_FILE_NAME;
use crate::error::AppError;
use eframe::egui;
use futures::StreamExt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Write the artifact under its fixed name. The file handle is created,
/// written, flushed, and released inside this scope on every path.
pub(crate) fn write_artifact(dir: &Path, bytes: &[u8]) -> Result<PathBuf, AppError> {
    std::fs::create_dir_all(dir).map_err(|e| AppError::Write {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let path = dir.join(EXPORT_FILE_NAME);
    let mut file = File::create(&path).map_err(|e| AppError::Write {
        path: path.clone(),
        source: e,
    })?;
    file.write_all(bytes).map_err(|e| AppError::Write {
        path: path.clone(),
        source: e,
    })?;
    file.flush().map_err(|e| AppError::Write {
        path: path.clone(),
        source: e,
    })?;
    Ok(path)
}

async fn fetch_artifact(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, AppError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::Export(e.to_string()))?;

    if !response.status().is_success() {
        return Err(AppError::Export(format!("HTTP {}", response.status())));
    }

    let total = response.content_length().unwrap_or(0);
    let mut bytes = Vec::with_capacity(total as usize);
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let data = chunk.map_err(|e| AppError::Export(e.to_string()))?;
        bytes.extend_from_slice(&data);
    }
    Ok(bytes)
}

impl App {
    /// Fetch the processed artifact and save it to the download directory.
    /// Intentionally not gated on results being present: the service decides
    /// what it returns. A failure here replaces any rendered results with the
    /// export-failure message.
    pub fn export_results(&mut self, ctx: &egui::Context) {
        {
            let mut s = self.session.lock().unwrap();
            if s.export_in_flight {
                debug!("Export already in flight, ignoring");
                return;
            }
            s.export_in_flight = true;
        }

        let url = self.export_url();
        let dest_dir = self.download_path.clone();
        let client = self.client.clone();
        let session = self.session.clone();
        let ctx = ctx.clone();

        info!(url = %url, dir = %dest_dir.display(), "Fetching processed artifact");

        self.runtime.spawn(async move {
            let outcome = match fetch_artifact(&client, &url).await {
                Ok(bytes) => write_artifact(&dest_dir, &bytes),
                Err(e) => Err(e),
            };

            let mut s = session.lock().unwrap();
            s.export_in_flight = false;
            match outcome {
                Ok(path) => {
                    // Results stay rendered on success
                    info!(path = %path.display(), "Artifact saved");
                    s.saved_artifact = Some(path);
                }
                Err(e) => {
                    error!(error = %e, "Export failed");
                    s.fail(&e);
                }
            }
            drop(s);
            ctx.request_repaint();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "anomaly-workbench-{}-{}",
            tag,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn artifact_lands_under_the_fixed_filename() {
        let dir = scratch_dir("export");
        let payload = b"Account,Balance Difference,Predicted Anomaly\nA1,42.0,Yes\n";

        let path = write_artifact(&dir, payload).unwrap();

        assert_eq!(path.file_name().unwrap(), EXPORT_FILE_NAME);
        assert_eq!(std::fs::read(&path).unwrap(), payload);
        // Handle was released: the file can be replaced immediately
        let path2 = write_artifact(&dir, b"second").unwrap();
        assert_eq!(path2, path);
        assert_eq!(std::fs::read(&path).unwrap(), b"second");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_parent_directories_are_created() {
        let dir = scratch_dir("nested").join("a").join("b");
        let path = write_artifact(&dir, b"rows").unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(dir.parent().unwrap().parent().unwrap());
    }

    #[test]
    fn unwritable_destination_is_a_write_error() {
        let dir = scratch_dir("blocked");
        std::fs::create_dir_all(&dir).unwrap();
        // Occupy the artifact path with a directory so File::create fails
        std::fs::create_dir(dir.join(EXPORT_FILE_NAME)).unwrap();

        let err = write_artifact(&dir, b"rows").unwrap_err();
        assert!(matches!(err, AppError::Write { .. }));
        assert_eq!(err.user_message(), "Error downloading file.");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
