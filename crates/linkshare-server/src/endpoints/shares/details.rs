//! `GET /api/shares/details`: every share with its metadata

use axum::Json;

use crate::context::EndpointContext;
use crate::error::ApiError;
use crate::share::Share;

pub async fn get(ctx: EndpointContext) -> Result<Json<Vec<Share>>, ApiError> {
    Ok(Json(ctx.store.all().await?))
}
