//! Agent discovery: card parsing, endpoint probing, ecosystem health.

pub mod card;
pub mod prober;

pub use card::AgentCard;
pub use prober::{AvailabilityProbe, DiscoveryProber, EcosystemHealth, HealthLevel};
