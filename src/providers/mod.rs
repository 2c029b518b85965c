//! Provider adapter boundary.
//!
//! Every external data source for one search category sits behind
//! `ProviderAdapter`; the orchestrator only ever talks to adapters, never to
//! a vendor API directly. Real vendors and the enhanced-mock fallback are
//! the same trait, distinguished by their `source()` tag.

pub mod chain;
pub mod fallback;
pub mod remote;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use chain::{CategoryResult, ProviderChain, RetryPolicy};
pub use fallback::FallbackProvider;
pub use remote::RemoteProvider;

/// One search category of a trip plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Flights,
    Hotels,
    Activities,
    Restaurants,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Flights,
        Category::Hotels,
        Category::Activities,
        Category::Restaurants,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Flights => "flights",
            Category::Hotels => "hotels",
            Category::Activities => "activities",
            Category::Restaurants => "restaurants",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a category's offers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferSource {
    /// A live vendor API answered.
    Real,
    /// The fallback adapter supplied the data.
    Fallback,
    /// Nothing answered before the deadline; the category is empty.
    None,
}

/// Trip parameters shared by every category search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    pub destination: String,
    pub departure_location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub travelers: u32,
    #[serde(default)]
    pub preferences: Vec<String>,
}

impl SearchParams {
    /// Stay length in nights, never less than one.
    pub fn nights(&self) -> u32 {
        let days = (self.end_date - self.start_date).num_days();
        days.max(1) as u32
    }
}

/// A category-agnostic offer. `price` is per unit for the category (per seat
/// for flights, per night for hotels, per person/meal otherwise); category
/// detail rides in `attributes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub provider_id: String,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub attributes: serde_json::Value,
}

/// Abstraction over one real or fallback data source for search categories.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable identifier for logging and offer attribution.
    fn id(&self) -> &str;

    /// Tag applied to offers served by this adapter.
    fn source(&self) -> OfferSource;

    /// Search one category within a budget slice. An empty result is not an
    /// error at this level; the chain decides whether to retry or fall back.
    async fn search(
        &self,
        category: Category,
        params: &SearchParams,
        budget: Decimal,
    ) -> Result<Vec<Offer>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nights_floor_is_one() {
        let params = SearchParams {
            destination: "Paris".to_string(),
            departure_location: "NYC".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(),
            travelers: 2,
            preferences: Vec::new(),
        };
        assert_eq!(params.nights(), 1);
    }

    #[test]
    fn test_nights_from_range() {
        let params = SearchParams {
            destination: "Paris".to_string(),
            departure_location: "NYC".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
            travelers: 2,
            preferences: Vec::new(),
        };
        assert_eq!(params.nights(), 5);
    }
}
