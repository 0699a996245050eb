//! Escalation of auto-approved opportunities to the automatic placement
//! service.
//!
//! Dispatch is fire-and-forget: each placement runs in its own task after the
//! upsert has committed, and its outcome is only logged. Nothing here can fail
//! a matcher run.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::opportunity::PlacementOpportunity;

const PLACEMENT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum EscalationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("placement service rejected request (status {status}): {message}")]
    Rejected { status: u16, message: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementRequest {
    pub opportunity_id: Uuid,
    pub user_id: Uuid,
    pub manual_override: bool,
}

/// Result of one escalation, tagged so the caller can log it without ever
/// turning it into an error.
#[derive(Debug, Clone, PartialEq)]
pub enum EscalationOutcome {
    Placed { opportunity_id: Uuid },
    Failed { opportunity_id: Uuid, reason: String },
}

#[async_trait]
pub trait PlacementService: Send + Sync {
    async fn place(&self, request: &PlacementRequest) -> Result<(), EscalationError>;
}

/// Calls the automatic placement endpoint over HTTP.
#[derive(Clone)]
pub struct HttpPlacementService {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpPlacementService {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(PLACEMENT_TIMEOUT_SECS))
            .build()
            .context("Failed to build placement HTTP client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/auto-placement", base_url.trim_end_matches('/')),
            token,
        })
    }
}

#[async_trait]
impl PlacementService for HttpPlacementService {
    async fn place(&self, request: &PlacementRequest) -> Result<(), EscalationError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EscalationError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

/// Whether an upserted opportunity should be placed immediately.
pub fn should_escalate(opportunity: &PlacementOpportunity) -> bool {
    opportunity.auto_approved
}

/// Spawns one placement task per eligible opportunity. The handles are only
/// returned for tests; the matcher drops them.
pub fn dispatch_escalations(
    service: Arc<dyn PlacementService>,
    opportunities: &[PlacementOpportunity],
) -> Vec<JoinHandle<EscalationOutcome>> {
    opportunities
        .iter()
        .filter(|o| should_escalate(o))
        .map(|o| {
            let service = Arc::clone(&service);
            let request = PlacementRequest {
                opportunity_id: o.id,
                user_id: o.source_user_id,
                manual_override: false,
            };
            tokio::spawn(async move { run_escalation(service.as_ref(), request).await })
        })
        .collect()
}

async fn run_escalation(
    service: &dyn PlacementService,
    request: PlacementRequest,
) -> EscalationOutcome {
    match service.place(&request).await {
        Ok(()) => {
            info!("Auto-placement triggered for opportunity {}", request.opportunity_id);
            EscalationOutcome::Placed {
                opportunity_id: request.opportunity_id,
            }
        }
        Err(e) => {
            warn!(
                "Auto-placement failed for opportunity {}: {e}",
                request.opportunity_id
            );
            EscalationOutcome::Failed {
                opportunity_id: request.opportunity_id,
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;

    /// Records requests and rejects the ones listed in `reject`.
    #[derive(Default)]
    struct RecordingService {
        seen: Mutex<Vec<Uuid>>,
        reject: Vec<Uuid>,
    }

    #[async_trait]
    impl PlacementService for RecordingService {
        async fn place(&self, request: &PlacementRequest) -> Result<(), EscalationError> {
            self.seen.lock().unwrap().push(request.opportunity_id);
            if self.reject.contains(&request.opportunity_id) {
                return Err(EscalationError::Rejected {
                    status: 503,
                    message: "target page locked".to_string(),
                });
            }
            Ok(())
        }
    }

    fn opportunity(auto_approved: bool) -> PlacementOpportunity {
        PlacementOpportunity {
            id: Uuid::new_v4(),
            source_content_id: Uuid::new_v4(),
            target_content_id: Uuid::new_v4(),
            source_user_id: Uuid::new_v4(),
            target_user_id: Uuid::new_v4(),
            keyword_overlap_score: 1.0,
            niche_proximity_score: 1.0,
            domain_authority_score: 0.5,
            geographic_relevance_score: 0.5,
            partner_quality_score: 0.5,
            overall_match_score: if auto_approved { 0.8 } else { 0.4 },
            suggested_anchor_text: "Acme".to_string(),
            suggested_target_url: "https://source.io".to_string(),
            suggested_placement_context: "ctx".to_string(),
            estimated_value: 3,
            auto_approved,
            status: if auto_approved { "approved" } else { "pending" }.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_only_auto_approved_are_escalated() {
        let service = Arc::new(RecordingService::default());
        let opps = vec![opportunity(true), opportunity(false)];

        let handles = dispatch_escalations(service.clone(), &opps);
        assert_eq!(handles.len(), 1);
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(*service.seen.lock().unwrap(), vec![opps[0].id]);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_others() {
        let opps = vec![opportunity(true), opportunity(true), opportunity(true)];
        let service = Arc::new(RecordingService {
            seen: Mutex::new(Vec::new()),
            reject: vec![opps[1].id],
        });

        let mut outcomes = Vec::new();
        for handle in dispatch_escalations(service.clone(), &opps) {
            outcomes.push(handle.await.unwrap());
        }

        assert_eq!(service.seen.lock().unwrap().len(), 3);
        let failed: Vec<_> = outcomes
            .iter()
            .filter(|o| matches!(o, EscalationOutcome::Failed { .. }))
            .collect();
        assert_eq!(failed.len(), 1);
        assert!(matches!(
            failed[0],
            EscalationOutcome::Failed { opportunity_id, .. } if *opportunity_id == opps[1].id
        ));
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let req = PlacementRequest {
            opportunity_id: Uuid::nil(),
            user_id: Uuid::nil(),
            manual_override: false,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("opportunityId").is_some());
        assert_eq!(value["manualOverride"], false);
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let service = HttpPlacementService::new("https://placement.internal/", None).unwrap();
        assert_eq!(service.endpoint, "https://placement.internal/auto-placement");
    }
}
