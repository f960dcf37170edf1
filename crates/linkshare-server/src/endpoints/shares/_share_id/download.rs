//! `GET /api/shares/<share_id>/download`: the shared file as an attachment

use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use std::io::ErrorKind;

use crate::context::EndpointContext;
use crate::error::ApiError;
use crate::share::share_by_id;

pub async fn get(ctx: EndpointContext, share_id: String) -> Result<Response, ApiError> {
    let share = share_by_id(&ctx.store, &share_id).await?;

    if share.is_expired(Utc::now()) {
        return Err(ApiError::Gone(format!("share {} has expired", share.id)));
    }

    let bytes = tokio::fs::read(&share.path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => ApiError::NotFound(format!("shared file is gone: {}", share.path)),
        _ => ApiError::Io(e),
    })?;

    tracing::info!(share_id = %share.id, bytes = bytes.len(), "share downloaded");

    let disposition = format!(
        "attachment; filename=\"{}\"",
        share.download_name().replace('"', "")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
