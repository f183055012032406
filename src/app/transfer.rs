//! Upload logic: submit the selected file and interpret the response

use super::App;
use crate::constants::UPLOAD_FIELD;
use crate::error::AppError;
use crate::types::{AnalysisResponse, Record};
use eframe::egui;
use reqwest::multipart::{Form, Part};
use tracing::{debug, info, warn};

/// Decide what a completed exchange means. A structured `error` field in the
/// body wins over everything else, including a co-present `results` field and
/// the HTTP status. Anything without a structured body is a transport fault.
pub(crate) fn interpret_response(status: u16, body: &str) -> Result<Vec<Record>, AppError> {
    if let Ok(parsed) = serde_json::from_str::<AnalysisResponse>(body) {
        if let Some(message) = parsed.error {
            return Err(AppError::Analysis(message));
        }
        if let Some(rows) = parsed.results {
            return Ok(rows);
        }
    }
    Err(AppError::Transfer(format!(
        "HTTP {} with no structured body",
        status
    )))
}

impl App {
    /// Send the selected file to the analysis endpoint. Single best-effort
    /// attempt; no retry, no cancellation. Overlapping calls are rejected by
    /// the in-flight token.
    pub fn submit(&mut self, ctx: &egui::Context) {
        let file = {
            let mut s = self.session.lock().unwrap();
            if s.upload_in_flight {
                debug!("Upload already in flight, ignoring submit");
                return;
            }
            // Precondition: fails synchronously, nothing is spawned
            let Some(file) = self.selected.clone() else {
                warn!("Submit with no file selected");
                s.fail(&AppError::NoFileSelected);
                return;
            };
            s.upload_in_flight = true;
            file
        };

        let url = self.upload_url();
        let client = self.client.clone();
        let session = self.session.clone();
        let ctx = ctx.clone();

        info!(file = %file.name, size = file.bytes.len(), url = %url, "Uploading file for analysis");

        self.runtime.spawn(async move {
            let outcome = send_for_analysis(&client, &url, file.name, file.bytes, &file.mime).await;

            let mut s = session.lock().unwrap();
            s.upload_in_flight = false;
            match outcome {
                Ok(rows) => {
                    info!(rows = rows.len(), "Analysis complete");
                    s.load(rows);
                }
                Err(e) => {
                    warn!(error = %e, "Analysis request failed");
                    s.fail(&e);
                }
            }
            drop(s);
            ctx.request_repaint();
        });
    }
}

async fn send_for_analysis(
    client: &reqwest::Client,
    url: &str,
    file_name: String,
    bytes: Vec<u8>,
    mime: &str,
) -> Result<Vec<Record>, AppError> {
    let part = Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime)
        .map_err(|e| AppError::Transfer(e.to_string()))?;
    let form = Form::new().part(UPLOAD_FIELD, part);

    let response = client
        .post(url)
        .multipart(form)
        .send()
        .await
        .map_err(|e| AppError::Transfer(e.to_string()))?;

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| AppError::Transfer(e.to_string()))?;

    interpret_response(status, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_field_becomes_loaded_rows() {
        let rows =
            interpret_response(200, r#"{"results": [{"a": 1, "b": 2}, {"a": 3, "b": 4}]}"#)
                .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["a"], serde_json::json!(1));
        let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn error_field_fails_with_its_message() {
        let err = interpret_response(200, r#"{"error": "Uploaded CSV file is empty"}"#)
            .unwrap_err();
        assert!(matches!(err, AppError::Analysis(ref m) if m == "Uploaded CSV file is empty"));
    }

    #[test]
    fn error_field_wins_over_a_co_present_results_field() {
        let err = interpret_response(
            200,
            r#"{"error": "model failed to converge", "results": [{"a": 1}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Analysis(ref m) if m == "model failed to converge"));
    }

    #[test]
    fn structured_error_wins_even_on_a_rejected_status() {
        let err = interpret_response(400, r#"{"error": "No file provided"}"#).unwrap_err();
        assert!(matches!(err, AppError::Analysis(ref m) if m == "No file provided"));
    }

    #[test]
    fn unstructured_failure_is_a_generic_transfer_error() {
        for (status, body) in [
            (502, "<html>Bad Gateway</html>"),
            (200, "not json at all"),
            (200, r#"{"unexpected": true}"#),
        ] {
            let err = interpret_response(status, body).unwrap_err();
            assert!(matches!(err, AppError::Transfer(_)), "body: {body}");
            assert_eq!(err.user_message(), "Error uploading file.");
        }
    }

    #[test]
    fn empty_results_are_a_valid_outcome() {
        let rows = interpret_response(200, r#"{"results": []}"#).unwrap();
        assert!(rows.is_empty());
    }
}
