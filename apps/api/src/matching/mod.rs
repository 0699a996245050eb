// Opportunity matching engine.
// Pure scoring lives in similarity/scoring/anchor/signals; everything that
// touches the store goes through `store::MatchStore`.

pub mod anchor;
pub mod candidates;
pub mod escalation;
pub mod handlers;
pub mod matcher;
pub mod niche;
pub mod scoring;
pub mod signals;
pub mod similarity;
