pub mod config;
pub mod coordination;
pub mod discovery;
pub mod error;
pub mod negotiation;
pub mod protocol;
pub mod providers;
pub mod registry;
pub mod search;

pub use config::AppConfig;
pub use coordination::{CoordinationPlan, CoordinationPlanner};
pub use discovery::{AgentCard, AvailabilityProbe, DiscoveryProber, EcosystemHealth, HealthLevel};
pub use error::{Result, WayfarerError};
pub use negotiation::{NegotiationOffer, NegotiationPolicy, NegotiationResult, NegotiationTerms};
pub use protocol::{CapabilityAgent, CoordinateRequest};
pub use providers::{
    Category, CategoryResult, FallbackProvider, Offer, OfferSource, ProviderAdapter,
    ProviderChain, RemoteProvider, RetryPolicy, SearchParams,
};
pub use registry::{AgentRecord, AgentRegistry, AgentStatus, RegistrySnapshot};
pub use search::{BudgetAllocation, OrchestratorConfig, SearchOrchestrator, TripPlan, TripRequest};
