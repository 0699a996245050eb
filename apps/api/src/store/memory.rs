//! In-memory `MatchStore` for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::models::content::TrackedContent;
use crate::models::opportunity::{NewOpportunity, OpportunityStatus, PlacementOpportunity};
use crate::models::user::User;
use crate::store::MatchStore;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    content: Vec<TrackedContent>,
    niches: HashMap<(String, String), f64>,
    opportunities: Vec<PlacementOpportunity>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_upserts: AtomicBool,
}

fn niche_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, niche: &str, website: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            niche: niche.to_string(),
            website: website.to_string(),
            credits: 10,
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn add_content(&self, user_id: Uuid, title: &str, keywords: &[&str]) -> TrackedContent {
        let mut tables = self.tables.lock().unwrap();
        // Strictly increasing timestamps so "most recent" is deterministic.
        let created_at = Utc::now() + Duration::milliseconds(tables.content.len() as i64);
        let content = TrackedContent {
            id: Uuid::new_v4(),
            user_id,
            url: format!("https://example.com/{}", title.to_lowercase().replace(' ', "-")),
            title: title.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            created_at,
        };
        tables.content.push(content.clone());
        content
    }

    pub fn set_niche_proximity(&self, a: &str, b: &str, proximity: f64) {
        self.tables
            .lock()
            .unwrap()
            .niches
            .insert(niche_key(a, b), proximity);
    }

    pub fn fail_upserts(&self, fail: bool) {
        self.fail_upserts.store(fail, Ordering::SeqCst);
    }

    pub fn opportunities(&self) -> Vec<PlacementOpportunity> {
        self.tables.lock().unwrap().opportunities.clone()
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn get_content(&self, content_id: Uuid) -> Result<Option<TrackedContent>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.content.iter().find(|c| c.id == content_id).cloned())
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn list_users_except(&self, user_id: Uuid) -> Result<Vec<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .filter(|u| u.id != user_id)
            .cloned()
            .collect())
    }

    async fn list_content_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<TrackedContent>> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<_> = tables
            .content
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn get_niche_proximity(&self, niche_a: &str, niche_b: &str) -> Result<Option<f64>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.niches.get(&niche_key(niche_a, niche_b)).copied())
    }

    async fn count_opportunities(
        &self,
        source_content_id: Uuid,
        status: Option<OpportunityStatus>,
    ) -> Result<i64> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .opportunities
            .iter()
            .filter(|o| o.source_content_id == source_content_id)
            .filter(|o| status.map_or(true, |s| o.status == s.as_str()))
            .count() as i64)
    }

    async fn list_opportunities(
        &self,
        source_content_id: Uuid,
    ) -> Result<Vec<PlacementOpportunity>> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<_> = tables
            .opportunities
            .iter()
            .filter(|o| o.source_content_id == source_content_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.overall_match_score.total_cmp(&a.overall_match_score));
        Ok(rows)
    }

    async fn upsert_opportunities(
        &self,
        opportunities: &[NewOpportunity],
    ) -> Result<Vec<PlacementOpportunity>> {
        if self.fail_upserts.load(Ordering::SeqCst) {
            bail!("connection reset while upserting placement_opportunities");
        }

        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        let mut written = Vec::with_capacity(opportunities.len());

        for opp in opportunities {
            let existing = tables.opportunities.iter().position(|o| {
                o.source_content_id == opp.source_content_id
                    && o.target_content_id == opp.target_content_id
            });
            let (id, created_at) = match existing {
                Some(idx) => (
                    tables.opportunities[idx].id,
                    tables.opportunities[idx].created_at,
                ),
                None => (Uuid::new_v4(), now),
            };
            let row = PlacementOpportunity {
                id,
                source_content_id: opp.source_content_id,
                target_content_id: opp.target_content_id,
                source_user_id: opp.source_user_id,
                target_user_id: opp.target_user_id,
                keyword_overlap_score: opp.keyword_overlap_score,
                niche_proximity_score: opp.niche_proximity_score,
                domain_authority_score: opp.domain_authority_score,
                geographic_relevance_score: opp.geographic_relevance_score,
                partner_quality_score: opp.partner_quality_score,
                overall_match_score: opp.overall_match_score,
                suggested_anchor_text: opp.suggested_anchor_text.clone(),
                suggested_target_url: opp.suggested_target_url.clone(),
                suggested_placement_context: opp.suggested_placement_context.clone(),
                estimated_value: opp.estimated_value,
                auto_approved: opp.auto_approved,
                status: opp.status.as_str().to_string(),
                created_at,
                updated_at: now,
            };
            match existing {
                Some(idx) => tables.opportunities[idx] = row.clone(),
                None => tables.opportunities.push(row.clone()),
            }
            written.push(row);
        }

        Ok(written)
    }
}
