//! Workflow error taxonomy

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong across the upload/analyze/export workflow.
///
/// All variants are recovered locally: the user sees a single message in the
/// error banner and may retry immediately. Transport and I/O detail is kept
/// for the log only.
#[derive(Debug, Error)]
pub enum AppError {
    /// Run Analysis was clicked with no file chosen. Caught before any I/O.
    #[error("no file selected")]
    NoFileSelected,

    /// The service answered with a structured error field.
    #[error("analysis rejected: {0}")]
    Analysis(String),

    /// The chosen file could not be read off disk.
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport failure while uploading, or a response without a structured
    /// body.
    #[error("upload failed: {0}")]
    Transfer(String),

    /// Transport failure while fetching the processed artifact.
    #[error("export failed: {0}")]
    Export(String),

    /// The artifact arrived but could not be written locally.
    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    /// The one message shown in the error banner.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NoFileSelected => "Please select a CSV file first.".to_string(),
            AppError::Read { .. } => "Could not read the selected file.".to_string(),
            AppError::Analysis(msg) => msg.clone(),
            AppError::Transfer(_) => "Error uploading file.".to_string(),
            AppError::Export(_) | AppError::Write { .. } => "Error downloading file.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_message_is_shown_verbatim() {
        let err = AppError::Analysis("Uploaded CSV file is empty".to_string());
        assert_eq!(err.user_message(), "Uploaded CSV file is empty");
    }

    #[test]
    fn transport_detail_stays_out_of_the_user_message() {
        let err = AppError::Transfer("connection refused (os error 111)".to_string());
        assert_eq!(err.user_message(), "Error uploading file.");

        let err = AppError::Export("HTTP 502 Bad Gateway".to_string());
        assert_eq!(err.user_message(), "Error downloading file.");
    }

    #[test]
    fn local_write_failure_surfaces_as_download_failure() {
        let err = AppError::Write {
            path: PathBuf::from("/nope/anomaly_results.csv"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.user_message(), "Error downloading file.");
    }
}
