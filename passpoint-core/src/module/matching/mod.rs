///! Home/roaming matching engine and OSU offer correlation
pub mod engine;
pub mod osu;

// ============ Re-exports ============

pub use engine::{MatchList, MatchingEngine, PasspointMatch, ProviderMatcher};
pub use osu::{matching_osu_providers, matching_profiles_for_osu_providers};
