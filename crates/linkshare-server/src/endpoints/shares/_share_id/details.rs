//! `GET /api/shares/<share_id>/details`

use axum::Json;

use crate::context::EndpointContext;
use crate::error::ApiError;
use crate::share::{share_by_id, Share};

pub async fn get(ctx: EndpointContext, share_id: String) -> Result<Json<Share>, ApiError> {
    Ok(Json(share_by_id(&ctx.store, &share_id).await?))
}
