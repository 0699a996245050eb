#![allow(dead_code)]

//! Pluggable score sources for the dimensions that have no live data yet:
//! domain authority, geographic relevance and partner quality.
//!
//! Each is a `SignalSource` held as `Arc<dyn SignalSource>`, so a real backend
//! can replace `NeutralSignal` without touching the weighting in `scoring`.

use std::sync::Arc;

use crate::models::content::TrackedContent;
use crate::models::user::User;

pub const NEUTRAL_SCORE: f64 = 0.5;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Everything a signal source may look at for one (source, candidate) pair.
#[derive(Debug, Clone, Copy)]
pub struct PairContext<'a> {
    pub source_user: &'a User,
    pub source_content: &'a TrackedContent,
    pub candidate_user: &'a User,
    pub candidate_content: &'a TrackedContent,
}

pub trait SignalSource: Send + Sync {
    /// Score in [0, 1]. Callers clamp anyway.
    fn score(&self, pair: &PairContext<'_>) -> f64;

    fn name(&self) -> &'static str;
}

/// Constant stand-in used until a data source exists.
#[derive(Debug, Clone, Copy)]
pub struct NeutralSignal;

impl SignalSource for NeutralSignal {
    fn score(&self, _pair: &PairContext<'_>) -> f64 {
        NEUTRAL_SCORE
    }

    fn name(&self) -> &'static str {
        "neutral"
    }
}

/// The three placeholder dimensions.
#[derive(Clone)]
pub struct SignalSources {
    pub domain_authority: Arc<dyn SignalSource>,
    pub geographic: Arc<dyn SignalSource>,
    pub partner_quality: Arc<dyn SignalSource>,
}

impl Default for SignalSources {
    fn default() -> Self {
        Self {
            domain_authority: Arc::new(NeutralSignal),
            geographic: Arc::new(NeutralSignal),
            partner_quality: Arc::new(NeutralSignal),
        }
    }
}

/// Great-circle distance in kilometres between two lat/lon points (degrees).
///
/// Not wired into scoring: there is no location data for users yet.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            niche: "technology".to_string(),
            website: "https://acme.io".to_string(),
            credits: 0,
            created_at: Utc::now(),
        }
    }

    fn content(user_id: Uuid) -> TrackedContent {
        TrackedContent {
            id: Uuid::new_v4(),
            user_id,
            url: "https://acme.io/blog".to_string(),
            title: "Blog".to_string(),
            keywords: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_default_sources_are_neutral() {
        let (su, cu) = (user(), user());
        let (sc, cc) = (content(su.id), content(cu.id));
        let pair = PairContext {
            source_user: &su,
            source_content: &sc,
            candidate_user: &cu,
            candidate_content: &cc,
        };
        let sources = SignalSources::default();
        assert_eq!(sources.domain_authority.score(&pair), 0.5);
        assert_eq!(sources.geographic.score(&pair), 0.5);
        assert_eq!(sources.partner_quality.score(&pair), 0.5);
        assert_eq!(sources.geographic.name(), "neutral");
    }

    #[test]
    fn test_haversine_same_point_is_zero() {
        assert!(haversine_km(51.5, -0.12, 51.5, -0.12).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_london_paris() {
        let d = haversine_km(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((d - 343.5).abs() < 2.0, "Distance was {d}");
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = haversine_km(40.7128, -74.0060, 34.0522, -118.2437);
        let b = haversine_km(34.0522, -118.2437, 40.7128, -74.0060);
        assert!((a - b).abs() < 1e-9);
    }
}
