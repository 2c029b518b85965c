//! Generic HTTP provider adapter.
//!
//! Talks to any booking agent or vendor bridge that exposes a JSON search
//! endpoint. Vendor-specific shapes stay on the remote side; this adapter
//! only understands the generic offer envelope.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{Category, Offer, OfferSource, ProviderAdapter, SearchParams};
use crate::error::{Result, WayfarerError};

/// Request body posted to the remote search endpoint.
#[derive(Debug, Serialize)]
struct RemoteSearchRequest<'a> {
    category: Category,
    destination: &'a str,
    departure_location: &'a str,
    start_date: &'a chrono::NaiveDate,
    end_date: &'a chrono::NaiveDate,
    travelers: u32,
    budget: Decimal,
    preferences: &'a [String],
}

/// Offer row as returned by remote agents.
#[derive(Debug, Deserialize)]
struct RemoteOffer {
    id: String,
    name: String,
    price: Decimal,
    #[serde(default)]
    attributes: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RemoteSearchResponse {
    #[serde(default)]
    offers: Vec<RemoteOffer>,
}

/// Adapter for one remote search provider.
#[derive(Clone)]
pub struct RemoteProvider {
    id: String,
    http: Client,
    base_url: String,
    search_path: String,
}

impl RemoteProvider {
    pub fn new(id: impl Into<String>, base_url: &str, search_path: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent("wayfarer-provider/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| WayfarerError::Internal(format!("failed to build provider HTTP client: {e}")))?;

        Ok(Self {
            id: id.into(),
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            search_path: search_path.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ProviderAdapter for RemoteProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn source(&self) -> OfferSource {
        OfferSource::Real
    }

    async fn search(
        &self,
        category: Category,
        params: &SearchParams,
        budget: Decimal,
    ) -> Result<Vec<Offer>> {
        let url = format!("{}{}", self.base_url, self.search_path);
        let body = RemoteSearchRequest {
            category,
            destination: &params.destination,
            departure_location: &params.departure_location,
            start_date: &params.start_date,
            end_date: &params.end_date,
            travelers: params.travelers,
            budget,
            preferences: &params.preferences,
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| WayfarerError::ProviderSearch {
                provider: self.id.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(WayfarerError::ProviderSearch {
                provider: self.id.clone(),
                reason: format!("unexpected status {}", response.status()),
            });
        }

        let parsed: RemoteSearchResponse =
            response
                .json()
                .await
                .map_err(|e| WayfarerError::ProviderSearch {
                    provider: self.id.clone(),
                    reason: format!("malformed body: {e}"),
                })?;

        debug!(
            "provider {}: {} {} offers for {}",
            self.id,
            parsed.offers.len(),
            category,
            params.destination
        );

        Ok(parsed
            .offers
            .into_iter()
            .map(|o| Offer {
                provider_id: o.id,
                name: o.name,
                price: o.price,
                attributes: o.attributes,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let provider = RemoteProvider::new(
            "amadeus-bridge",
            "http://localhost:8001///",
            "/api/search",
            Duration::from_secs(3),
        )
        .unwrap();
        assert_eq!(provider.base_url(), "http://localhost:8001");
        assert_eq!(provider.id(), "amadeus-bridge");
        assert_eq!(provider.source(), OfferSource::Real);
    }

    #[test]
    fn test_remote_offer_envelope_parses() {
        let body = r#"{
            "offers": [
                {"id": "AF-123", "name": "Air France", "price": "612.40",
                 "attributes": {"booking_class": "Economy"}}
            ]
        }"#;
        let parsed: RemoteSearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.offers.len(), 1);
        assert_eq!(parsed.offers[0].id, "AF-123");
    }
}
