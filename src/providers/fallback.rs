//! Enhanced-mock fallback provider.
//!
//! Terminal link of every provider chain: serves curated offers with real
//! airline/hotel/restaurant names so a degraded plan still looks plausible.
//! It never fails and never returns empty.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

use super::{Category, Offer, OfferSource, ProviderAdapter, SearchParams};
use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct FallbackProvider;

impl FallbackProvider {
    pub fn new() -> Self {
        Self
    }

    fn flights(&self, params: &SearchParams) -> Vec<Offer> {
        vec![
            Offer {
                provider_id: "fallback-aa".to_string(),
                name: "American Airlines".to_string(),
                price: dec!(485),
                attributes: json!({
                    "departure_airport": params.departure_location,
                    "arrival_airport": params.destination,
                    "departure_time": format!("{}T08:00:00", params.start_date),
                    "arrival_time": format!("{}T14:30:00", params.start_date),
                    "booking_class": "Economy",
                    "available_seats": 23,
                }),
            },
            Offer {
                provider_id: "fallback-dl".to_string(),
                name: "Delta Air Lines".to_string(),
                price: dec!(425),
                attributes: json!({
                    "departure_airport": params.departure_location,
                    "arrival_airport": params.destination,
                    "departure_time": format!("{}T11:15:00", params.start_date),
                    "arrival_time": format!("{}T17:45:00", params.start_date),
                    "booking_class": "Economy",
                    "available_seats": 15,
                }),
            },
        ]
    }

    fn hotels(&self, params: &SearchParams) -> Vec<Offer> {
        let nights = params.nights();
        vec![
            Offer {
                provider_id: "fallback-marriott".to_string(),
                name: "Marriott Downtown".to_string(),
                price: dec!(220),
                attributes: json!({
                    "rating": 4.5,
                    "review_score": 8.8,
                    "location": "City Center",
                    "amenities": ["WiFi", "Pool", "Gym", "Restaurant"],
                    "nights": nights,
                }),
            },
            Offer {
                provider_id: "fallback-hilton".to_string(),
                name: "Hilton Garden Inn".to_string(),
                price: dec!(185),
                attributes: json!({
                    "rating": 4.2,
                    "review_score": 8.3,
                    "location": "Downtown",
                    "amenities": ["WiFi", "Breakfast", "Fitness Center"],
                    "nights": nights,
                }),
            },
        ]
    }

    fn activities(&self) -> Vec<Offer> {
        vec![
            Offer {
                provider_id: "fallback-museum".to_string(),
                name: "Metropolitan Museum of Art".to_string(),
                price: dec!(25),
                attributes: json!({
                    "category": "museum",
                    "rating": 4.8,
                    "duration": "3 hours",
                }),
            },
            Offer {
                provider_id: "fallback-tour".to_string(),
                name: "City Walking Tour".to_string(),
                price: dec!(35),
                attributes: json!({
                    "category": "tour",
                    "rating": 4.6,
                    "duration": "2.5 hours",
                }),
            },
            Offer {
                provider_id: "fallback-park".to_string(),
                name: "Central Park".to_string(),
                price: Decimal::ZERO,
                attributes: json!({
                    "category": "outdoor",
                    "rating": 4.7,
                    "duration": "2 hours",
                }),
            },
        ]
    }

    fn restaurants(&self) -> Vec<Offer> {
        vec![
            Offer {
                provider_id: "fallback-bernardin".to_string(),
                name: "Le Bernardin".to_string(),
                price: dec!(85),
                attributes: json!({
                    "rating": 4.9,
                    "cuisine_types": ["French", "Seafood"],
                    "price_level": 4,
                    "address": "Midtown West",
                }),
            },
            Offer {
                provider_id: "fallback-joes".to_string(),
                name: "Joe's Pizza".to_string(),
                price: dec!(15),
                attributes: json!({
                    "rating": 4.3,
                    "cuisine_types": ["Italian", "Pizza"],
                    "price_level": 1,
                    "address": "Greenwich Village",
                }),
            },
        ]
    }
}

#[async_trait]
impl ProviderAdapter for FallbackProvider {
    fn id(&self) -> &str {
        "fallback"
    }

    fn source(&self) -> OfferSource {
        OfferSource::Fallback
    }

    async fn search(
        &self,
        category: Category,
        params: &SearchParams,
        _budget: Decimal,
    ) -> Result<Vec<Offer>> {
        Ok(match category {
            Category::Flights => self.flights(params),
            Category::Hotels => self.hotels(params),
            Category::Activities => self.activities(),
            Category::Restaurants => self.restaurants(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn params() -> SearchParams {
        SearchParams {
            destination: "New York".to_string(),
            departure_location: "Boston".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 11, 15).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 11, 20).unwrap(),
            travelers: 2,
            preferences: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_fallback_never_empty() {
        let provider = FallbackProvider::new();
        for category in Category::ALL {
            let offers = provider
                .search(category, &params(), dec!(1000))
                .await
                .unwrap();
            assert!(!offers.is_empty(), "{category} fallback must not be empty");
        }
    }

    #[tokio::test]
    async fn test_fallback_is_tagged_fallback() {
        assert_eq!(FallbackProvider::new().source(), OfferSource::Fallback);
    }
}
