use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An account owning zero or more tracked pages. Read-only to the matcher.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub niche: String,
    /// Canonical site URL; the link target when this user is the source.
    pub website: String,
    /// Informational only, never used in scoring.
    pub credits: i32,
    pub created_at: DateTime<Utc>,
}
