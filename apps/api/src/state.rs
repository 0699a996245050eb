use std::sync::Arc;

use crate::matching::matcher::OpportunityMatcher;
use crate::store::MatchStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub matcher: Arc<OpportunityMatcher>,
    /// Read access for the listing endpoint. Same store the matcher writes to.
    pub store: Arc<dyn MatchStore>,
}
