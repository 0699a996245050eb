//! Candidate enumeration: which other users (and which of their pages) a
//! source page is scored against.

use anyhow::Result;
use tracing::debug;

use crate::matching::niche::NicheResolver;
use crate::matching::scoring::MatcherConfig;
use crate::models::content::TrackedContent;
use crate::models::user::User;
use crate::store::MatchStore;

/// Another user eligible for matching, with their most recent content.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub user: User,
    pub content: Vec<TrackedContent>,
    /// Per user pair, so shared by every content row of this candidate.
    pub niche_proximity: f64,
}

/// Loads every user other than `source_user`, keeps those with tracked content
/// and non-zero niche proximity, and returns the closest
/// `config.max_candidate_users` by proximity.
pub async fn enumerate_candidates(
    store: &dyn MatchStore,
    source_user: &User,
    config: &MatcherConfig,
) -> Result<Vec<Candidate>> {
    let users = store.list_users_except(source_user.id).await?;
    let total_users = users.len();
    let mut resolver = NicheResolver::new(store, &source_user.niche, config.default_niche_proximity);
    let mut candidates = Vec::new();

    for user in users {
        let content = store
            .list_content_for_user(user.id, config.content_per_candidate)
            .await?;
        if content.is_empty() {
            continue;
        }

        let niche_proximity = resolver.proximity_to(&user.niche).await?;
        if niche_proximity == 0.0 {
            debug!("Skipping user {}: unrelated niche '{}'", user.id, user.niche);
            continue;
        }

        candidates.push(Candidate {
            user,
            content,
            niche_proximity,
        });
    }

    rank_and_cap(&mut candidates, config.max_candidate_users);

    debug!(
        "{} of {total_users} users kept as candidates for user {}",
        candidates.len(),
        source_user.id
    );
    Ok(candidates)
}

/// Stable sort by proximity, highest first, then truncate.
fn rank_and_cap(candidates: &mut Vec<Candidate>, max: usize) {
    candidates.sort_by(|a, b| b.niche_proximity.total_cmp(&a.niche_proximity));
    candidates.truncate(max);
}
