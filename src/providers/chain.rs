//! Provider chain: primary adapter plus ordered fallbacks.
//!
//! The chain replaces exception-driven "real API, else mock" branching with
//! an explicit, configuration-selected adapter order. Each link gets a retry
//! budget with exponential backoff; when a link exhausts it (errors or keeps
//! returning nothing), the chain advances to the next link.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::{Category, Offer, OfferSource, ProviderAdapter, SearchParams};

/// Retry budget applied per chain link.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts per link (3 = one call plus two retries)
    pub max_retries: u32,
    /// Base backoff delay, doubled each attempt
    pub base_backoff_ms: u64,
    /// Cap on a single backoff delay
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff_ms: 500,
            max_backoff_ms: 8_000,
        }
    }
}

impl RetryPolicy {
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        let delay = self
            .base_backoff_ms
            .saturating_mul(2u64.saturating_pow(attempt));
        Duration::from_millis(delay.min(self.max_backoff_ms))
    }
}

/// Offers for one category together with where they came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category: Category,
    pub offers: Vec<Offer>,
    pub source: OfferSource,
}

impl CategoryResult {
    /// The degraded result used when no link answered before the deadline.
    pub fn empty(category: Category) -> Self {
        Self {
            category,
            offers: Vec::new(),
            source: OfferSource::None,
        }
    }
}

/// Ordered adapter list for one category.
#[derive(Clone)]
pub struct ProviderChain {
    links: Vec<Arc<dyn ProviderAdapter>>,
    retry: RetryPolicy,
}

impl ProviderChain {
    pub fn new(links: Vec<Arc<dyn ProviderAdapter>>, retry: RetryPolicy) -> Self {
        Self { links, retry }
    }

    /// Search down the chain. Never errors: a fully exhausted chain yields an
    /// empty result tagged `OfferSource::None`.
    pub async fn search(
        &self,
        category: Category,
        params: &SearchParams,
        budget: Decimal,
    ) -> CategoryResult {
        for link in &self.links {
            for attempt in 0..self.retry.max_retries.max(1) {
                match link.search(category, params, budget).await {
                    Ok(offers) if !offers.is_empty() => {
                        debug!(
                            "provider {} answered {} with {} offers (attempt {})",
                            link.id(),
                            category,
                            offers.len(),
                            attempt + 1
                        );
                        return CategoryResult {
                            category,
                            offers,
                            source: link.source(),
                        };
                    }
                    Ok(_) => {
                        warn!(
                            "provider {} returned no {} offers (attempt {})",
                            link.id(),
                            category,
                            attempt + 1
                        );
                    }
                    Err(e) => {
                        warn!(
                            "provider {} failed for {} (attempt {}): {e}",
                            link.id(),
                            category,
                            attempt + 1
                        );
                    }
                }

                if attempt + 1 < self.retry.max_retries {
                    sleep(self.retry.backoff_duration(attempt)).await;
                }
            }

            debug!(
                "provider {} exhausted for {}, advancing down the chain",
                link.id(),
                category
            );
        }

        warn!("all providers exhausted for {category}, returning empty result");
        CategoryResult::empty(category)
    }
}
