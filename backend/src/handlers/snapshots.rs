//! HTTP handlers for monthly snapshot submission and bulk import

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};

use crate::error::{AppError, AppResult};
use crate::services::import::ImportSummary;
use crate::services::item_master::{SnapshotReceipt, SubmitSnapshotInput};
use crate::AppState;

/// Record one end-of-month count
pub async fn submit_snapshot(
    State(state): State<AppState>,
    Json(input): Json<SubmitSnapshotInput>,
) -> AppResult<(StatusCode, Json<SnapshotReceipt>)> {
    let service = state.item_master();
    let receipt = service.submit_monthly_snapshot(input).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Import a CSV count sheet uploaded as the multipart field `file`
pub async fn import_snapshots(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ImportSummary>)> {
    let mut sheet = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ValidationError(format!("Invalid upload: {}", e)))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::ValidationError(format!("Invalid upload: {}", e)))?;
            sheet = Some(bytes);
            break;
        }
    }

    let sheet = sheet.ok_or_else(|| AppError::Validation {
        field: "file".to_string(),
        message: "Attach the count sheet as 'file'".to_string(),
    })?;

    let service = state.importer();
    let summary = service.import_count_sheet(sheet.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}
