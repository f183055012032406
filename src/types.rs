//! Common types and data structures

use crate::constants::RESULT_DISPLAY_CAP;
use crate::error::AppError;
use std::path::PathBuf;

/// One row of tabular data: column name -> scalar value.
///
/// serde_json is built with `preserve_order`, so the key order of the first
/// record is the column order the service sent.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// The currently chosen input file. Replaced on every pick, never cleared.
#[derive(Clone)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub mime: String,
}

/// Response body from the analysis endpoint. The service sends one of the
/// two fields; `error` wins if both are present.
#[derive(serde::Deserialize)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<Record>>,
}

/// The result slot is in exactly one of three states: nothing yet, rows from
/// the last successful analysis, or the last failure message.
#[derive(Clone, Default, PartialEq)]
pub enum ResultState {
    #[default]
    Idle,
    Loaded(Vec<Record>),
    Failed(String),
}

impl ResultState {
    pub fn rows(&self) -> Option<&[Record]> {
        match self {
            ResultState::Loaded(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ResultState::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    /// Rows the table renders: the first [`RESULT_DISPLAY_CAP`], original
    /// order. A display cap only; [`Self::rows`] still holds everything.
    pub fn visible_rows(&self) -> &[Record] {
        match self {
            ResultState::Loaded(rows) => &rows[..rows.len().min(RESULT_DISPLAY_CAP)],
            _ => &[],
        }
    }

    /// Column headers, derived from the key set of the first record.
    pub fn headers(&self) -> Vec<&str> {
        self.rows()
            .and_then(|rows| rows.first())
            .map(|first| first.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Shared workflow state. Mutated only by the controllers' completion
/// handlers at task-resumption points; the UI reads a snapshot each frame.
#[derive(Default)]
pub struct SessionState {
    pub result: ResultState,
    /// One in-flight token per operation type; overlapping calls are
    /// rejected rather than racing on last-write-wins.
    pub upload_in_flight: bool,
    pub export_in_flight: bool,
    /// Where the last successful export landed. Drained by the UI to show
    /// the save toast.
    pub saved_artifact: Option<PathBuf>,
}

impl SessionState {
    pub fn load(&mut self, rows: Vec<Record>) {
        self.result = ResultState::Loaded(rows);
    }

    pub fn fail(&mut self, err: &AppError) {
        self.result = ResultState::Failed(err.user_message());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, i64)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::json!(v)))
            .collect()
    }

    fn rows(n: usize) -> Vec<Record> {
        (0..n as i64).map(|i| record(&[("a", i), ("b", i * 2)])).collect()
    }

    #[test]
    fn store_never_holds_rows_and_an_error_at_once() {
        let mut state = SessionState::default();
        assert!(state.result.rows().is_none());
        assert!(state.result.error().is_none());

        state.load(rows(3));
        assert!(state.result.rows().is_some());
        assert!(state.result.error().is_none());

        state.fail(&AppError::Transfer("timed out".to_string()));
        assert!(state.result.rows().is_none());
        assert_eq!(state.result.error(), Some("Error uploading file."));

        state.load(rows(1));
        assert!(state.result.error().is_none());
        assert_eq!(state.result.rows().map(<[Record]>::len), Some(1));
    }

    #[test]
    fn export_success_leaves_rows_untouched() {
        let mut state = SessionState::default();
        state.load(rows(4));
        state.saved_artifact = Some(std::path::PathBuf::from("anomaly_results.csv"));
        assert_eq!(state.result.rows().map(<[Record]>::len), Some(4));
        assert!(state.result.error().is_none());
    }

    #[test]
    fn export_failure_clears_displayed_rows() {
        let mut state = SessionState::default();
        state.load(rows(5));
        state.fail(&AppError::Export("HTTP 500".to_string()));
        assert!(state.result.rows().is_none());
        assert_eq!(state.result.error(), Some("Error downloading file."));
    }

    #[test]
    fn display_cap_is_min_of_len_and_ten() {
        for n in [1, 9, 10, 11, 250] {
            let state = ResultState::Loaded(rows(n));
            assert_eq!(state.visible_rows().len(), n.min(10));
        }
    }

    #[test]
    fn visible_rows_keep_original_order() {
        let state = ResultState::Loaded(rows(25));
        let firsts: Vec<i64> = state
            .visible_rows()
            .iter()
            .map(|r| r["a"].as_i64().unwrap())
            .collect();
        assert_eq!(firsts, (0..10).collect::<Vec<i64>>());
    }

    #[test]
    fn headers_follow_first_record_key_order() {
        let parsed: Vec<Record> =
            serde_json::from_str(r#"[{"z": 1, "a": 2, "m": 3}, {"z": 4, "a": 5, "m": 6}]"#)
                .unwrap();
        let state = ResultState::Loaded(parsed);
        assert_eq!(state.headers(), vec!["z", "a", "m"]);
    }

    #[test]
    fn idle_renders_neither_table_nor_message() {
        let state = ResultState::Idle;
        assert!(state.visible_rows().is_empty());
        assert!(state.headers().is_empty());
        assert!(state.error().is_none());
    }
}
