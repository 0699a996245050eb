//! Opportunity Matcher: scores a freshly tracked page against other users'
//! pages and persists the best pairings as placement opportunities.
//!
//! Flow: validate → short-circuit check → enumerate candidates → score →
//!       filter/rank → persist → escalate.
//!
//! Each phase is its own function so the pure ones (scoring, ranking,
//! summarising) are testable without a store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::anchor::{
    placement_context, primary_anchor_text, suggest_anchor_texts, CandidateScoringError,
};
use crate::matching::candidates::{enumerate_candidates, Candidate};
use crate::matching::escalation::{dispatch_escalations, PlacementService};
use crate::matching::scoring::{estimated_value, ComponentScores, MatcherConfig};
use crate::matching::signals::{PairContext, SignalSources};
use crate::matching::similarity::keyword_overlap;
use crate::models::content::TrackedContent;
use crate::models::opportunity::{NewOpportunity, OpportunityStatus, PlacementOpportunity};
use crate::models::user::User;
use crate::store::MatchStore;

pub const MISSING_IDS_MESSAGE: &str = "Missing contentId or userId";
const ALREADY_EXISTS_MESSAGE: &str = "Opportunities already exist";
const NONE_FOUND_MESSAGE: &str = "No suitable opportunities found";

// ────────────────────────────────────────────────────────────────────────────
// Request / result models
// ────────────────────────────────────────────────────────────────────────────

/// Raw invocation body. Ids stay optional strings so missing and blank values
/// both surface as `InvalidRequest` rather than a deserialisation failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub content_id: Option<String>,
    pub user_id: Option<String>,
    #[serde(default)]
    pub force_reprocess: Option<bool>,
}

/// Validated input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchInput {
    pub content_id: Uuid,
    pub user_id: Uuid,
    pub force_reprocess: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AlreadyProcessed {
    pub message: String,
    pub existing_opportunities: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopOpportunity {
    pub target_user_id: Uuid,
    pub score: f64,
    pub anchor_text: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MatchSummary {
    pub success: bool,
    pub opportunities_created: usize,
    pub auto_approved: usize,
    pub average_score: f64,
    pub top_opportunity: Option<TopOpportunity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum MatchOutcome {
    AlreadyProcessed(AlreadyProcessed),
    Completed(MatchSummary),
}

// ────────────────────────────────────────────────────────────────────────────
// Matcher
// ────────────────────────────────────────────────────────────────────────────

pub struct OpportunityMatcher {
    store: Arc<dyn MatchStore>,
    config: MatcherConfig,
    signals: SignalSources,
    /// `None` disables escalation entirely.
    placement: Option<Arc<dyn PlacementService>>,
}

impl OpportunityMatcher {
    pub fn new(
        store: Arc<dyn MatchStore>,
        config: MatcherConfig,
        signals: SignalSources,
        placement: Option<Arc<dyn PlacementService>>,
    ) -> Self {
        let total = config.weights.total();
        if (total - 1.0).abs() > 1e-9 {
            warn!("Match weights sum to {total}, not 1.0; overall scores will be clamped");
        }
        Self {
            store,
            config,
            signals,
            placement,
        }
    }

    /// Validates `request` and runs the full pipeline.
    pub async fn process(&self, request: &MatchRequest) -> Result<MatchOutcome, AppError> {
        let input = validate_request(request)?;
        self.run(input).await
    }

    pub async fn run(&self, input: MatchInput) -> Result<MatchOutcome, AppError> {
        let (source_content, source_user) = self.load_source(&input).await?;

        if !input.force_reprocess {
            if let Some(existing) = self.existing_opportunities(source_content.id).await? {
                info!(
                    "Content {} already has {existing} opportunities, skipping",
                    source_content.id
                );
                return Ok(MatchOutcome::AlreadyProcessed(AlreadyProcessed {
                    message: ALREADY_EXISTS_MESSAGE.to_string(),
                    existing_opportunities: existing,
                }));
            }
        }

        let candidates = enumerate_candidates(self.store.as_ref(), &source_user, &self.config)
            .await
            .map_err(AppError::Internal)?;
        info!(
            "Scoring content {} against {} candidate users",
            source_content.id,
            candidates.len()
        );

        let scored = score_candidates(
            &self.config,
            &self.signals,
            &source_user,
            &source_content,
            &candidates,
        );
        let ranked = filter_and_rank(scored, &self.config);

        if ranked.is_empty() {
            info!("No opportunities cleared the threshold for content {}", source_content.id);
            return Ok(MatchOutcome::Completed(MatchSummary::empty()));
        }

        let persisted = self.persist(&ranked).await?;
        self.escalate(&persisted);

        let summary = summarize(&persisted);
        info!(
            "Created {} opportunities ({} auto-approved, avg {:.3}) for content {}",
            summary.opportunities_created,
            summary.auto_approved,
            summary.average_score,
            source_content.id
        );
        Ok(MatchOutcome::Completed(summary))
    }

    async fn load_source(&self, input: &MatchInput) -> Result<(TrackedContent, User), AppError> {
        let content = self
            .store
            .get_content(input.content_id)
            .await
            .map_err(AppError::Internal)?
            .ok_or_else(|| AppError::NotFound(format!("source content {}", input.content_id)))?;

        if content.user_id != input.user_id {
            return Err(AppError::InvalidRequest(format!(
                "Content {} does not belong to user {}",
                input.content_id, input.user_id
            )));
        }

        let user = self
            .store
            .get_user(content.user_id)
            .await
            .map_err(AppError::Internal)?
            .ok_or_else(|| AppError::NotFound(format!("source user {}", content.user_id)))?;

        Ok((content, user))
    }

    /// `Some(total)` when a pending opportunity already references the content.
    /// Only pending rows block a re-run; approved ones do not.
    async fn existing_opportunities(&self, content_id: Uuid) -> Result<Option<i64>, AppError> {
        let pending = self
            .store
            .count_opportunities(content_id, Some(OpportunityStatus::Pending))
            .await
            .map_err(AppError::Internal)?;
        if pending == 0 {
            return Ok(None);
        }
        let total = self
            .store
            .count_opportunities(content_id, None)
            .await
            .map_err(AppError::Internal)?;
        Ok(Some(total))
    }

    async fn persist(
        &self,
        opportunities: &[NewOpportunity],
    ) -> Result<Vec<PlacementOpportunity>, AppError> {
        self.store
            .upsert_opportunities(opportunities)
            .await
            .map_err(|e| {
                error!("Failed to persist {} opportunities: {e:?}", opportunities.len());
                AppError::Persistence(e)
            })
    }

    fn escalate(&self, persisted: &[PlacementOpportunity]) {
        match &self.placement {
            Some(service) => {
                let dispatched = dispatch_escalations(Arc::clone(service), persisted);
                info!("Dispatched {} auto-placements", dispatched.len());
            }
            None => {
                let eligible = persisted.iter().filter(|o| o.auto_approved).count();
                if eligible > 0 {
                    info!("Auto-placement disabled; {eligible} approved opportunities left for review");
                }
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Phases
// ────────────────────────────────────────────────────────────────────────────

pub fn validate_request(request: &MatchRequest) -> Result<MatchInput, AppError> {
    let non_blank = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let (Some(content_id), Some(user_id)) =
        (non_blank(&request.content_id), non_blank(&request.user_id))
    else {
        return Err(AppError::InvalidRequest(MISSING_IDS_MESSAGE.to_string()));
    };

    let parse = |field: &str, value: &str| {
        Uuid::parse_str(value)
            .map_err(|_| AppError::InvalidRequest(format!("{field} must be a valid UUID")))
    };

    Ok(MatchInput {
        content_id: parse("contentId", &content_id)?,
        user_id: parse("userId", &user_id)?,
        force_reprocess: request.force_reprocess.unwrap_or(false),
    })
}

/// Scores every (source content, candidate content) pair. Pairs whose hints
/// cannot be derived are logged and skipped; nothing is filtered by score here.
pub fn score_candidates(
    config: &MatcherConfig,
    signals: &SignalSources,
    source_user: &User,
    source_content: &TrackedContent,
    candidates: &[Candidate],
) -> Vec<NewOpportunity> {
    let mut scored = Vec::new();
    for candidate in candidates.iter().take(config.max_candidate_users) {
        for candidate_content in &candidate.content {
            match score_pair(
                config,
                signals,
                source_user,
                source_content,
                candidate,
                candidate_content,
            ) {
                Ok(opportunity) => scored.push(opportunity),
                Err(e) => warn!(
                    "Skipping candidate content {} of user {}: {e}",
                    candidate_content.id, candidate.user.id
                ),
            }
        }
    }
    scored
}

pub fn score_pair(
    config: &MatcherConfig,
    signals: &SignalSources,
    source_user: &User,
    source_content: &TrackedContent,
    candidate: &Candidate,
    candidate_content: &TrackedContent,
) -> Result<NewOpportunity, CandidateScoringError> {
    let pair = PairContext {
        source_user,
        source_content,
        candidate_user: &candidate.user,
        candidate_content,
    };

    let scores = ComponentScores {
        keyword_overlap: keyword_overlap(&source_content.keywords, &candidate_content.keywords),
        niche_proximity: candidate.niche_proximity,
        domain_authority: signals.domain_authority.score(&pair),
        geographic: signals.geographic.score(&pair),
        partner_quality: signals.partner_quality.score(&pair),
    }
    .clamped();
    let overall = scores.overall(&config.weights);

    let brand_source = if candidate.user.website.trim().is_empty() {
        &candidate_content.url
    } else {
        &candidate.user.website
    };
    let anchor_suggestions = suggest_anchor_texts(brand_source, &candidate_content.keywords)?;
    let auto_approved = config.is_auto_approved(overall);

    Ok(NewOpportunity {
        source_content_id: source_content.id,
        target_content_id: candidate_content.id,
        source_user_id: source_user.id,
        target_user_id: candidate.user.id,
        keyword_overlap_score: scores.keyword_overlap,
        niche_proximity_score: scores.niche_proximity,
        domain_authority_score: scores.domain_authority,
        geographic_relevance_score: scores.geographic,
        partner_quality_score: scores.partner_quality,
        overall_match_score: overall,
        suggested_anchor_text: primary_anchor_text(&anchor_suggestions),
        anchor_suggestions,
        suggested_target_url: source_user.website.clone(),
        suggested_placement_context: placement_context(
            &candidate_content.title,
            &candidate_content.url,
        ),
        estimated_value: estimated_value(overall),
        auto_approved,
        status: OpportunityStatus::from_auto_approved(auto_approved),
    })
}

/// Drops pairs below the minimum score, sorts best first and keeps the top
/// `config.max_opportunities`.
pub fn filter_and_rank(
    mut scored: Vec<NewOpportunity>,
    config: &MatcherConfig,
) -> Vec<NewOpportunity> {
    scored.retain(|o| o.overall_match_score >= config.min_score);
    scored.sort_by(|a, b| b.overall_match_score.total_cmp(&a.overall_match_score));
    scored.truncate(config.max_opportunities);
    scored
}

pub fn summarize(persisted: &[PlacementOpportunity]) -> MatchSummary {
    if persisted.is_empty() {
        return MatchSummary::empty();
    }

    let total: f64 = persisted.iter().map(|o| o.overall_match_score).sum();
    let top = persisted
        .iter()
        .max_by(|a, b| a.overall_match_score.total_cmp(&b.overall_match_score))
        .map(|o| TopOpportunity {
            target_user_id: o.target_user_id,
            score: o.overall_match_score,
            anchor_text: o.suggested_anchor_text.clone(),
        });

    MatchSummary {
        success: true,
        opportunities_created: persisted.len(),
        auto_approved: persisted.iter().filter(|o| o.auto_approved).count(),
        average_score: total / persisted.len() as f64,
        top_opportunity: top,
        message: None,
    }
}

impl MatchSummary {
    pub fn empty() -> Self {
        Self {
            success: true,
            opportunities_created: 0,
            auto_approved: 0,
            average_score: 0.0,
            top_opportunity: None,
            message: Some(NONE_FOUND_MESSAGE.to_string()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
