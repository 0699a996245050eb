//! Niche proximity between two users' niche tags.

use std::collections::HashMap;

use anyhow::Result;
use tracing::debug;

use crate::store::MatchStore;

pub const SAME_NICHE_PROXIMITY: f64 = 1.0;
pub const DEFAULT_NICHE_PROXIMITY: f64 = 0.1;

fn normalize(niche: &str) -> String {
    niche.trim().to_lowercase()
}

/// Resolves niche proximity for one source niche, caching lookups for the
/// lifetime of a single matcher run.
pub struct NicheResolver<'a> {
    store: &'a dyn MatchStore,
    source_niche: String,
    default_proximity: f64,
    cache: HashMap<String, f64>,
}

impl<'a> NicheResolver<'a> {
    pub fn new(store: &'a dyn MatchStore, source_niche: &str, default_proximity: f64) -> Self {
        Self {
            store,
            source_niche: normalize(source_niche),
            default_proximity,
            cache: HashMap::new(),
        }
    }

    /// Identical niches → 1.0; stored row → its value clamped to [0, 1];
    /// no row → the default.
    pub async fn proximity_to(&mut self, candidate_niche: &str) -> Result<f64> {
        let candidate = normalize(candidate_niche);
        if candidate == self.source_niche {
            return Ok(SAME_NICHE_PROXIMITY);
        }
        if let Some(&cached) = self.cache.get(&candidate) {
            return Ok(cached);
        }

        let stored = self
            .store
            .get_niche_proximity(&self.source_niche, &candidate)
            .await?;
        let proximity = resolve_proximity(stored, self.default_proximity);
        debug!(
            "Niche proximity {} <-> {} = {proximity:.2} (stored: {})",
            self.source_niche,
            candidate,
            stored.is_some()
        );

        self.cache.insert(candidate, proximity);
        Ok(proximity)
    }
}

fn resolve_proximity(stored: Option<f64>, default_proximity: f64) -> f64 {
    stored.unwrap_or(default_proximity).clamp(0.0, 1.0)
}
