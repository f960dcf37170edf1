//! `POST /api/shares/new`: share the file named by the `share_path` form field

use axum::response::Html;
use maud::{html, Markup, DOCTYPE};
use std::path::{Path, PathBuf};

use crate::context::EndpointContext;
use crate::db::Store;
use crate::error::ApiError;
use crate::share::Share;

pub async fn post(ctx: EndpointContext) -> Result<Html<String>, ApiError> {
    let share_path = ctx
        .form
        .get("share_path")
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("form field `share_path` is required".into()))?;

    let share = create_share(&ctx.store, Path::new(share_path)).await?;
    Ok(Html(success_page(&share).into_string()))
}

async fn create_share(store: &Store, path: &Path) -> Result<Share, ApiError> {
    let path = resolve(path).await?;
    let share = Share::new(&path, None, None);
    store.insert(&share).await?;

    tracing::info!(share_id = %share.id, path = %share.path, "share created");
    Ok(share)
}

/// Canonical path of an existing regular file
async fn resolve(path: &Path) -> Result<PathBuf, ApiError> {
    let not_a_file = || ApiError::BadRequest(format!("not an existing file: {}", path.display()));

    let metadata = tokio::fs::metadata(path).await.map_err(|_| not_a_file())?;
    if !metadata.is_file() {
        return Err(not_a_file());
    }
    Ok(tokio::fs::canonicalize(path).await?)
}

fn success_page(share: &Share) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                title { "Share created" }
            }
            body {
                h1 { "Success" }
                p { "Shared " code { (share.path) } }
                p { "Share id: " code { (share.id) } }
            }
        }
    }
}
