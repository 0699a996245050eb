//! Weighted combination of the five match dimensions, and the thresholds the
//! matcher applies to the result.

use serde::{Deserialize, Serialize};

use crate::matching::niche::DEFAULT_NICHE_PROXIMITY;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchWeights {
    pub keyword_overlap: f64,
    pub niche_proximity: f64,
    pub domain_authority: f64,
    pub geographic: f64,
    pub partner_quality: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            keyword_overlap: 0.30,
            niche_proximity: 0.25,
            domain_authority: 0.20,
            geographic: 0.15,
            partner_quality: 0.10,
        }
    }
}

impl MatchWeights {
    pub fn total(&self) -> f64 {
        self.keyword_overlap
            + self.niche_proximity
            + self.domain_authority
            + self.geographic
            + self.partner_quality
    }
}

/// Per-dimension scores for one (source content, candidate content) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub keyword_overlap: f64,
    pub niche_proximity: f64,
    pub domain_authority: f64,
    pub geographic: f64,
    pub partner_quality: f64,
}

impl ComponentScores {
    /// Clamps every component into [0, 1].
    pub fn clamped(self) -> Self {
        Self {
            keyword_overlap: self.keyword_overlap.clamp(0.0, 1.0),
            niche_proximity: self.niche_proximity.clamp(0.0, 1.0),
            domain_authority: self.domain_authority.clamp(0.0, 1.0),
            geographic: self.geographic.clamp(0.0, 1.0),
            partner_quality: self.partner_quality.clamp(0.0, 1.0),
        }
    }

    pub fn overall(&self, weights: &MatchWeights) -> f64 {
        compute_overall_score(self, weights)
    }
}

/// Σ weight × component, clamped to [0, 1].
pub fn compute_overall_score(scores: &ComponentScores, weights: &MatchWeights) -> f64 {
    (weights.keyword_overlap * scores.keyword_overlap
        + weights.niche_proximity * scores.niche_proximity
        + weights.domain_authority * scores.domain_authority
        + weights.geographic * scores.geographic
        + weights.partner_quality * scores.partner_quality)
        .clamp(0.0, 1.0)
}

/// Small integer priority hint: ⌈score × 3⌉.
pub fn estimated_value(overall_score: f64) -> i32 {
    (overall_score * 3.0).ceil() as i32
}

/// Matcher tuning. Constructor-injected; never read from the environment here.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    pub weights: MatchWeights,
    /// Pairs below this overall score are discarded, never persisted.
    pub min_score: f64,
    /// Overall score at or above which an opportunity is auto-approved.
    pub auto_approve_score: f64,
    pub max_candidate_users: usize,
    pub content_per_candidate: i64,
    pub max_opportunities: usize,
    pub default_niche_proximity: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            weights: MatchWeights::default(),
            min_score: 0.1,
            auto_approve_score: 0.7,
            max_candidate_users: 50,
            content_per_candidate: 5,
            max_opportunities: 20,
            default_niche_proximity: DEFAULT_NICHE_PROXIMITY,
        }
    }
}

impl MatcherConfig {
    pub fn is_auto_approved(&self, overall_score: f64) -> bool {
        overall_score >= self.auto_approve_score
    }
}
