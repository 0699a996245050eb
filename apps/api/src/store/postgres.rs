use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::content::TrackedContent;
use crate::models::opportunity::{
    NewOpportunity, NicheProximityEntry, OpportunityStatus, PlacementOpportunity,
};
use crate::models::user::User;
use crate::store::MatchStore;

const USER_COLUMNS: &str =
    "id, niche, COALESCE(website, '') AS website, COALESCE(credits, 0) AS credits, created_at";

const CONTENT_COLUMNS: &str = "id, user_id, url, COALESCE(title, '') AS title, \
     COALESCE(keywords, ARRAY[]::TEXT[]) AS keywords, created_at";

/// PostgreSQL-backed store. Nullable columns are defaulted here so the scoring
/// code only ever sees fully-populated rows.
#[derive(Clone)]
pub struct PgMatchStore {
    pool: PgPool,
}

impl PgMatchStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn get_content(&self, content_id: Uuid) -> Result<Option<TrackedContent>> {
        Ok(sqlx::query_as::<_, TrackedContent>(&format!(
            "SELECT {CONTENT_COLUMNS} FROM tracked_content WHERE id = $1"
        ))
        .bind(content_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_users_except(&self, user_id: Uuid) -> Result<Vec<User>> {
        Ok(sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id <> $1 ORDER BY created_at"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_content_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<TrackedContent>> {
        Ok(sqlx::query_as::<_, TrackedContent>(&format!(
            "SELECT {CONTENT_COLUMNS} FROM tracked_content \
             WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_niche_proximity(&self, niche_a: &str, niche_b: &str) -> Result<Option<f64>> {
        let entry = sqlx::query_as::<_, NicheProximityEntry>(
            r#"
            SELECT niche_a, niche_b, proximity FROM niche_proximity
            WHERE (LOWER(niche_a) = $1 AND LOWER(niche_b) = $2)
               OR (LOWER(niche_a) = $2 AND LOWER(niche_b) = $1)
            LIMIT 1
            "#,
        )
        .bind(niche_a)
        .bind(niche_b)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry.map(|e| e.proximity))
    }

    async fn count_opportunities(
        &self,
        source_content_id: Uuid,
        status: Option<OpportunityStatus>,
    ) -> Result<i64> {
        let count = match status {
            Some(status) => sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM placement_opportunities \
                 WHERE source_content_id = $1 AND status = $2",
            )
            .bind(source_content_id)
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?,
            None => sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM placement_opportunities WHERE source_content_id = $1",
            )
            .bind(source_content_id)
            .fetch_one(&self.pool)
            .await?,
        };
        Ok(count)
    }

    async fn list_opportunities(
        &self,
        source_content_id: Uuid,
    ) -> Result<Vec<PlacementOpportunity>> {
        Ok(sqlx::query_as::<_, PlacementOpportunity>(
            "SELECT * FROM placement_opportunities \
             WHERE source_content_id = $1 ORDER BY overall_match_score DESC",
        )
        .bind(source_content_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn upsert_opportunities(
        &self,
        opportunities: &[NewOpportunity],
    ) -> Result<Vec<PlacementOpportunity>> {
        let mut tx = self.pool.begin().await?;
        let mut rows = Vec::with_capacity(opportunities.len());

        for opp in opportunities {
            let row = sqlx::query_as::<_, PlacementOpportunity>(
                r#"
                INSERT INTO placement_opportunities
                    (source_content_id, target_content_id, source_user_id, target_user_id,
                     keyword_overlap_score, niche_proximity_score, domain_authority_score,
                     geographic_relevance_score, partner_quality_score, overall_match_score,
                     suggested_anchor_text, suggested_target_url, suggested_placement_context,
                     estimated_value, auto_approved, status)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
                ON CONFLICT (source_content_id, target_content_id) DO UPDATE SET
                    source_user_id = EXCLUDED.source_user_id,
                    target_user_id = EXCLUDED.target_user_id,
                    keyword_overlap_score = EXCLUDED.keyword_overlap_score,
                    niche_proximity_score = EXCLUDED.niche_proximity_score,
                    domain_authority_score = EXCLUDED.domain_authority_score,
                    geographic_relevance_score = EXCLUDED.geographic_relevance_score,
                    partner_quality_score = EXCLUDED.partner_quality_score,
                    overall_match_score = EXCLUDED.overall_match_score,
                    suggested_anchor_text = EXCLUDED.suggested_anchor_text,
                    suggested_target_url = EXCLUDED.suggested_target_url,
                    suggested_placement_context = EXCLUDED.suggested_placement_context,
                    estimated_value = EXCLUDED.estimated_value,
                    auto_approved = EXCLUDED.auto_approved,
                    status = EXCLUDED.status,
                    updated_at = NOW()
                RETURNING *
                "#,
            )
            .bind(opp.source_content_id)
            .bind(opp.target_content_id)
            .bind(opp.source_user_id)
            .bind(opp.target_user_id)
            .bind(opp.keyword_overlap_score)
            .bind(opp.niche_proximity_score)
            .bind(opp.domain_authority_score)
            .bind(opp.geographic_relevance_score)
            .bind(opp.partner_quality_score)
            .bind(opp.overall_match_score)
            .bind(&opp.suggested_anchor_text)
            .bind(&opp.suggested_target_url)
            .bind(&opp.suggested_placement_context)
            .bind(opp.estimated_value)
            .bind(opp.auto_approved)
            .bind(opp.status.as_str())
            .fetch_one(&mut *tx)
            .await
            .with_context(|| {
                format!(
                    "upsert failed for pair ({}, {})",
                    opp.source_content_id, opp.target_content_id
                )
            })?;
            rows.push(row);
        }

        tx.commit().await?;
        debug!("Upserted {} placement opportunities", rows.len());
        Ok(rows)
    }
}
