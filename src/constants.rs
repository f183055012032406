//! Application constants and configuration

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const UPLOAD_ROUTE: &str = "/upload_csv";
pub const EXPORT_ROUTE: &str = "/download_csv";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Field name the analysis service expects the file part under.
pub const UPLOAD_FIELD: &str = "file";

/// Filename the exported artifact is saved as.
pub const EXPORT_FILE_NAME: &str = "anomaly_results.csv";

/// The results table renders at most this many rows; the full result set is
/// kept in memory regardless.
pub const RESULT_DISPLAY_CAP: usize = 10;
