//! `GET /api/shares/list`: ids of every share

use axum::Json;
use uuid::Uuid;

use crate::context::EndpointContext;
use crate::error::ApiError;

pub async fn get(ctx: EndpointContext) -> Result<Json<Vec<Uuid>>, ApiError> {
    Ok(Json(ctx.store.list_ids().await?))
}
