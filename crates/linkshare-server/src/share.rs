// File: src/share.rs
// Purpose: Share model and lookups shared by the endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::db::Store;
use crate::error::ApiError;

// ============================================================================
// DOMAIN MODEL
// ============================================================================

/// A file made available for download
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct Share {
    pub id: Uuid,
    pub created: DateTime<Utc>,
    pub path: String,
    pub name: Option<String>,
    pub expiry: Option<DateTime<Utc>>,
}

impl Share {
    /// New share of `path`, created now
    pub fn new(path: impl AsRef<Path>, name: Option<String>, expiry: Option<DateTime<Utc>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created: Utc::now(),
            path: path.as_ref().to_string_lossy().into_owned(),
            name,
            expiry,
        }
    }

    /// Whether the share expired at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|expiry| expiry <= now)
    }

    /// File name offered to the client: the share name or the target's file name
    pub fn download_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            Path::new(&self.path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.id.to_string())
        })
    }
}

// ============================================================================
// LOOKUPS
// ============================================================================

/// Parse a share id taken from a route
pub fn parse_share_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("invalid share id: {}", raw)))
}

/// Fetch a share by its route id; 400 when malformed, 404 when unknown
pub async fn share_by_id(store: &Store, raw: &str) -> Result<Share, ApiError> {
    let id = parse_share_id(raw)?;
    store
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no share with id {}", id)))
}
