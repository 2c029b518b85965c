//! Search orchestrator: concurrent, budget-aware multi-category search.
//!
//! One plan-trip request fans out an independent provider-chain search per
//! category, all racing a shared deadline. A category that misses the
//! deadline is abandoned and reported empty; nothing here fails the whole
//! request.

use futures::future::join_all;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::{timeout, Instant};
use tracing::{info, warn};

use super::budget::BudgetAllocation;
use crate::error::{Result, WayfarerError};
use crate::providers::{Category, CategoryResult, Offer, ProviderChain, SearchParams};

/// Offers summed into the estimated cost per list category.
const TOP_ACTIVITIES: usize = 3;
/// Restaurant meals counted per day when estimating food cost.
const MEALS_PER_DAY: usize = 2;

/// A complete trip-planning request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripRequest {
    pub destination: String,
    pub departure_location: String,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub travelers: u32,
    pub budget: Decimal,
    #[serde(default)]
    pub preferences: Vec<String>,
}

impl TripRequest {
    fn validate(&self) -> Result<()> {
        if self.destination.trim().is_empty() {
            return Err(WayfarerError::Validation(
                "destination must not be empty".to_string(),
            ));
        }
        if self.end_date < self.start_date {
            return Err(WayfarerError::Validation(
                "end_date must not precede start_date".to_string(),
            ));
        }
        if self.travelers == 0 {
            return Err(WayfarerError::Validation(
                "travelers must be at least 1".to_string(),
            ));
        }
        if self.budget <= Decimal::ZERO {
            return Err(WayfarerError::Validation(
                "budget must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn search_params(&self) -> SearchParams {
        SearchParams {
            destination: self.destination.clone(),
            departure_location: self.departure_location.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            travelers: self.travelers,
            preferences: self.preferences.clone(),
        }
    }
}

/// Aggregated trip plan across all categories. Per-category `source` tags
/// let consumers spot degraded categories without the plan failing.
#[derive(Debug, Clone, Serialize)]
pub struct TripPlan {
    pub request: TripRequest,
    pub flights: CategoryResult,
    pub hotels: CategoryResult,
    pub activities: CategoryResult,
    pub restaurants: CategoryResult,
    /// Cheapest flight + cheapest hotel stay + top activities + meals.
    pub total_cost: Decimal,
    /// Budget minus estimated cost; negative means overage.
    pub savings: Decimal,
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub allocation: BudgetAllocation,
    pub global_deadline: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            allocation: BudgetAllocation::default(),
            global_deadline: Duration::from_secs(10),
        }
    }
}

pub struct SearchOrchestrator {
    chains: BTreeMap<Category, ProviderChain>,
    cfg: OrchestratorConfig,
}

impl SearchOrchestrator {
    pub fn new(chains: BTreeMap<Category, ProviderChain>, cfg: OrchestratorConfig) -> Self {
        Self { chains, cfg }
    }

    /// Plan a trip within budget and time limits. Only malformed input
    /// errors; provider trouble degrades per category instead.
    pub async fn plan_trip(&self, request: &TripRequest) -> Result<TripPlan> {
        request.validate()?;
        let params = request.search_params();

        info!(
            "planning trip to {} for {} travelers, budget ${}",
            request.destination, request.travelers, request.budget
        );

        let deadline = Instant::now() + self.cfg.global_deadline;
        let searches = Category::ALL.map(|category| {
            let budget_slice = self.cfg.allocation.slice(category, request.budget);
            let params = &params;
            async move {
                match self.chains.get(&category) {
                    Some(chain) => {
                        // Race the shared deadline; an abandoned category is
                        // empty, not an error.
                        match timeout(deadline.saturating_duration_since(Instant::now()), chain.search(category, params, budget_slice)).await {
                            Ok(result) => result,
                            Err(_) => {
                                warn!("{category} search missed the global deadline, abandoning");
                                CategoryResult::empty(category)
                            }
                        }
                    }
                    None => {
                        warn!("no provider chain configured for {category}");
                        CategoryResult::empty(category)
                    }
                }
            }
        });

        let mut results: BTreeMap<Category, CategoryResult> = Category::ALL
            .into_iter()
            .zip(join_all(searches).await)
            .collect();

        let flights = results.remove(&Category::Flights).unwrap_or_else(|| CategoryResult::empty(Category::Flights));
        let hotels = results.remove(&Category::Hotels).unwrap_or_else(|| CategoryResult::empty(Category::Hotels));
        let activities = results.remove(&Category::Activities).unwrap_or_else(|| CategoryResult::empty(Category::Activities));
        let restaurants = results.remove(&Category::Restaurants).unwrap_or_else(|| CategoryResult::empty(Category::Restaurants));

        let nights = Decimal::from(params.nights());
        let total_cost = cheapest(&flights.offers)
            + cheapest(&hotels.offers) * nights
            + top_n_sum(&activities.offers, TOP_ACTIVITIES)
            + top_n_sum(&restaurants.offers, MEALS_PER_DAY) * nights;
        let savings = request.budget - total_cost;

        info!(
            "trip planned: {} flights / {} hotels / {} activities / {} restaurants, cost ${total_cost}, savings ${savings}",
            flights.offers.len(),
            hotels.offers.len(),
            activities.offers.len(),
            restaurants.offers.len()
        );

        Ok(TripPlan {
            request: request.clone(),
            flights,
            hotels,
            activities,
            restaurants,
            total_cost,
            savings,
        })
    }
}

fn cheapest(offers: &[Offer]) -> Decimal {
    offers
        .iter()
        .map(|o| o.price)
        .min()
        .unwrap_or(Decimal::ZERO)
}

fn top_n_sum(offers: &[Offer], n: usize) -> Decimal {
    offers.iter().take(n).map(|o| o.price).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{FallbackProvider, OfferSource, ProviderAdapter, RetryPolicy};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn request() -> TripRequest {
        TripRequest {
            destination: "New York".to_string(),
            departure_location: "Boston".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 11, 15).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 11, 20).unwrap(),
            travelers: 2,
            budget: dec!(3000),
            preferences: vec!["mid_range".to_string()],
        }
    }

    fn fallback_only_orchestrator() -> SearchOrchestrator {
        let chains = Category::ALL
            .into_iter()
            .map(|category| {
                (
                    category,
                    ProviderChain::new(
                        vec![Arc::new(FallbackProvider::new()) as Arc<dyn ProviderAdapter>],
                        RetryPolicy {
                            max_retries: 3,
                            base_backoff_ms: 1,
                            max_backoff_ms: 4,
                        },
                    ),
                )
            })
            .collect();
        SearchOrchestrator::new(chains, OrchestratorConfig::default())
    }

    #[tokio::test]
    async fn test_plan_trip_aggregates_all_categories() {
        let orchestrator = fallback_only_orchestrator();
        let plan = orchestrator.plan_trip(&request()).await.unwrap();

        assert_eq!(plan.flights.source, OfferSource::Fallback);
        assert_eq!(plan.hotels.source, OfferSource::Fallback);
        assert!(!plan.activities.offers.is_empty());
        assert!(!plan.restaurants.offers.is_empty());

        // Cheapest flight 425, cheapest hotel 185 x 5 nights, activities
        // 25 + 35 + 0, meals (85 + 15) x 5 nights.
        assert_eq!(plan.total_cost, dec!(1910));
        assert_eq!(plan.savings, dec!(1090));
    }

    #[tokio::test]
    async fn test_missing_chain_reports_source_none() {
        let orchestrator = SearchOrchestrator::new(BTreeMap::new(), OrchestratorConfig::default());
        let plan = orchestrator.plan_trip(&request()).await.unwrap();

        assert_eq!(plan.flights.source, OfferSource::None);
        assert!(plan.flights.offers.is_empty());
        assert_eq!(plan.total_cost, Decimal::ZERO);
        assert_eq!(plan.savings, dec!(3000));
    }

    #[tokio::test]
    async fn test_invalid_request_is_a_client_error() {
        let orchestrator = fallback_only_orchestrator();

        let mut bad = request();
        bad.budget = Decimal::ZERO;
        assert!(matches!(
            orchestrator.plan_trip(&bad).await,
            Err(WayfarerError::Validation(_))
        ));

        let mut bad = request();
        bad.end_date = NaiveDate::from_ymd_opt(2026, 11, 1).unwrap();
        assert!(orchestrator.plan_trip(&bad).await.is_err());

        let mut bad = request();
        bad.destination = "  ".to_string();
        assert!(orchestrator.plan_trip(&bad).await.is_err());
    }
}
