//! HTTP calls to the funnel backend.

use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use web_sys::{File, FormData};

use crate::config::MAX_FILE_SIZE;
use crate::types::{AppError, AppResult, ErrorBody, Filters, SnapshotResponse, UploadResponse};

/// Reject files over [`MAX_FILE_SIZE`] before sending anything.
pub fn check_sizes<S: AsRef<str>>(files: impl IntoIterator<Item = (S, f64)>) -> AppResult<()> {
    for (name, size) in files {
        if size > MAX_FILE_SIZE as f64 {
            return Err(AppError::Upload(format!(
                "{} is larger than {} MB",
                name.as_ref(),
                MAX_FILE_SIZE / (1024 * 1024)
            )));
        }
    }
    Ok(())
}

/// Upload a batch of CSV files into `session_id`; every file goes in a
/// `file` field.
pub async fn upload_files(
    files: Vec<File>,
    session_id: &str,
    backend_url: &str,
) -> AppResult<UploadResponse> {
    check_sizes(files.iter().map(|f| (f.name(), f.size())))?;

    let form_data = FormData::new()
        .map_err(|e| AppError::Upload(format!("Failed to create FormData: {:?}", e)))?;
    form_data
        .append_with_str("session", session_id)
        .map_err(|e| AppError::Upload(format!("Failed to append session: {:?}", e)))?;

    for file in &files {
        form_data
            .append_with_blob_and_filename("file", file, &file.name())
            .map_err(|e| AppError::Upload(format!("Failed to append file: {:?}", e)))?;
    }

    let url = format!("{}/api/upload", backend_url);
    let request = Request::post(&url)
        .body(form_data)
        .map_err(|e| AppError::Network(format!("Failed to build request: {}", e)))?;

    let response = request
        .send()
        .await
        .map_err(|e| AppError::Network(format!("HTTP request failed: {}", e)))?;

    read_json(response).await
}

/// Fetch the current snapshot of a session, e.g. after a page reload.
pub async fn fetch_snapshot(session_id: &str, backend_url: &str) -> AppResult<SnapshotResponse> {
    let url = format!("{}/api/sessions/{}", backend_url, session_id);
    let response = Request::get(&url)
        .send()
        .await
        .map_err(|e| AppError::Network(format!("HTTP request failed: {}", e)))?;

    read_json(response).await
}

/// Send new filters and get the recomputed snapshot.
pub async fn apply_filters(
    session_id: &str,
    filters: &Filters,
    backend_url: &str,
) -> AppResult<SnapshotResponse> {
    let url = format!("{}/api/sessions/{}/filters", backend_url, session_id);
    let request = Request::post(&url)
        .json(filters)
        .map_err(|e| AppError::Network(format!("Failed to build request: {}", e)))?;

    let response = request
        .send()
        .await
        .map_err(|e| AppError::Network(format!("HTTP request failed: {}", e)))?;

    read_json(response).await
}

/// Drop a session on the backend.
pub async fn close_session(session_id: &str, backend_url: &str) -> AppResult<()> {
    let url = format!("{}/api/sessions/{}", backend_url, session_id);
    let response = Request::delete(&url)
        .send()
        .await
        .map_err(|e| AppError::Network(format!("HTTP request failed: {}", e)))?;

    if response.ok() {
        Ok(())
    } else {
        let text = response.text().await.unwrap_or_default();
        Err(server_error(response.status(), &text))
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    if !response.ok() {
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(server_error(response.status(), &text));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| AppError::Decode(e.to_string()))
}

/// Error from a non-2xx response, preferring the backend's `error` field.
pub fn server_error(status: u16, body: &str) -> AppError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string());
    AppError::Server { status, message }
}
