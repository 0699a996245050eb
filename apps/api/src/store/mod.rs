//! Storage seam for the matcher.
//!
//! The matcher only sees `MatchStore`; `PgMatchStore` backs it in production and
//! `memory::MemoryStore` backs the tests.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::content::TrackedContent;
use crate::models::opportunity::{NewOpportunity, OpportunityStatus, PlacementOpportunity};
use crate::models::user::User;

pub mod postgres;

#[cfg(test)]
pub mod memory;

pub use postgres::PgMatchStore;

#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn get_content(&self, content_id: Uuid) -> Result<Option<TrackedContent>>;

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>>;

    async fn list_users_except(&self, user_id: Uuid) -> Result<Vec<User>>;

    /// Most recent content first, at most `limit` rows.
    async fn list_content_for_user(&self, user_id: Uuid, limit: i64)
        -> Result<Vec<TrackedContent>>;

    /// Stored proximity for an unordered niche pair. `None` means "use the default".
    async fn get_niche_proximity(&self, niche_a: &str, niche_b: &str) -> Result<Option<f64>>;

    async fn count_opportunities(
        &self,
        source_content_id: Uuid,
        status: Option<OpportunityStatus>,
    ) -> Result<i64>;

    /// Highest overall score first.
    async fn list_opportunities(&self, source_content_id: Uuid)
        -> Result<Vec<PlacementOpportunity>>;

    /// Inserts or overwrites every row on `(source_content_id, target_content_id)`.
    /// All rows are written or none are.
    async fn upsert_opportunities(
        &self,
        opportunities: &[NewOpportunity],
    ) -> Result<Vec<PlacementOpportunity>>;
}
