use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A page a user's site reported as published or crawled.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrackedContent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    pub title: String,
    /// Extracted upstream; entries may be multi-word phrases. May be empty.
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
}
