use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityStatus {
    Pending,
    Approved,
}

impl OpportunityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpportunityStatus::Pending => "pending",
            OpportunityStatus::Approved => "approved",
        }
    }

    pub fn from_auto_approved(auto_approved: bool) -> Self {
        if auto_approved {
            OpportunityStatus::Approved
        } else {
            OpportunityStatus::Pending
        }
    }
}

impl fmt::Display for OpportunityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Symmetric closeness between two niche tags, looked up by unordered pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NicheProximityEntry {
    pub niche_a: String,
    pub niche_b: String,
    pub proximity: f64,
}

/// A persisted placement opportunity. `(source_content_id, target_content_id)`
/// is the natural key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlacementOpportunity {
    pub id: Uuid,
    pub source_content_id: Uuid,
    pub target_content_id: Uuid,
    pub source_user_id: Uuid,
    pub target_user_id: Uuid,
    pub keyword_overlap_score: f64,
    pub niche_proximity_score: f64,
    pub domain_authority_score: f64,
    pub geographic_relevance_score: f64,
    pub partner_quality_score: f64,
    pub overall_match_score: f64,
    pub suggested_anchor_text: String,
    pub suggested_target_url: String,
    pub suggested_placement_context: String,
    pub estimated_value: i32,
    pub auto_approved: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An opportunity produced by one matcher run, ready to be upserted.
#[derive(Debug, Clone, Serialize)]
pub struct NewOpportunity {
    pub source_content_id: Uuid,
    pub target_content_id: Uuid,
    pub source_user_id: Uuid,
    pub target_user_id: Uuid,
    pub keyword_overlap_score: f64,
    pub niche_proximity_score: f64,
    pub domain_authority_score: f64,
    pub geographic_relevance_score: f64,
    pub partner_quality_score: f64,
    pub overall_match_score: f64,
    pub suggested_anchor_text: String,
    /// Alternates computed alongside the persisted first choice. Not stored.
    pub anchor_suggestions: Vec<String>,
    pub suggested_target_url: String,
    pub suggested_placement_context: String,
    pub estimated_value: i32,
    pub auto_approved: bool,
    pub status: OpportunityStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_follows_auto_approval() {
        assert_eq!(
            OpportunityStatus::from_auto_approved(true),
            OpportunityStatus::Approved
        );
        assert_eq!(
            OpportunityStatus::from_auto_approved(false),
            OpportunityStatus::Pending
        );
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(OpportunityStatus::Pending.as_str(), "pending");
        assert_eq!(OpportunityStatus::Approved.to_string(), "approved");
    }
}
