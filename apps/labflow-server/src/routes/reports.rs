//! Lab report extraction endpoint
//!
//! Accepts a multipart batch of PDFs and images and answers with the flat
//! list of exam records found in all of them.

use axum::{extract::Multipart, extract::State, Json};

use crate::document::RawDocument;
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::structuring::ExamRecord;

/// Multipart field carrying the uploads
pub const FILES_FIELD: &str = "files";

/// Process uploaded lab reports
pub async fn extract_reports(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Vec<ExamRecord>>> {
    let documents = read_uploads(multipart).await?;

    if documents.is_empty() {
        tracing::warn!("No files in multipart upload");
        return Err(AppError::BadRequest(format!(
            "No files provided. Use field name '{}'",
            FILES_FIELD
        )));
    }

    tracing::info!(files = documents.len(), "Received lab reports");
    let records = state.processor().process(documents).await;

    Ok(Json(records))
}

/// Collect every uploaded file, in arrival order
async fn read_uploads(mut multipart: Multipart) -> Result<Vec<RawDocument>> {
    let mut documents = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        let filename = field.file_name().map(|s| s.to_string());
        let content_type = field.content_type().map(|s| s.to_string());

        tracing::debug!(
            "Received field: name='{}', filename={:?}, content_type={:?}",
            name,
            filename,
            content_type
        );

        let filename = match filename {
            Some(filename) => filename,
            None if name == FILES_FIELD => format!("upload-{}", documents.len() + 1),
            None => continue,
        };

        let data = field.bytes().await?;
        tracing::debug!("Read {} bytes of '{}'", data.len(), filename);

        documents.push(RawDocument::new(
            filename,
            content_type.as_deref(),
            data.to_vec(),
        ));
    }

    Ok(documents)
}
