//! Price/budget negotiation engine shared by the booking agents.
//!
//! A negotiation is a single synchronous exchange: the engine holds no state
//! between calls, so identical inputs always settle identically. A
//! counter-offer is a complete response; the caller may resubmit it as a
//! fresh offer with updated numbers.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// How the buyer side expresses its constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NegotiationTerms {
    /// A total budget covering all units (hotel stays: budget across nights).
    Budget { available_budget: Decimal },
    /// A single asked price for the item (flight fares).
    Requested { requested_price: Decimal },
}

/// One price settlement request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationOffer {
    pub item_id: String,
    /// Sticker price per unit (per night, per seat).
    pub current_unit_price: Decimal,
    /// Number of units the price applies to (nights, seats). Zero is
    /// normalized to one.
    pub units: u32,
    #[serde(flatten)]
    pub terms: NegotiationTerms,
}

impl NegotiationOffer {
    pub fn with_budget(item_id: impl Into<String>, unit_price: Decimal, units: u32, budget: Decimal) -> Self {
        Self {
            item_id: item_id.into(),
            current_unit_price: unit_price,
            units,
            terms: NegotiationTerms::Budget {
                available_budget: budget,
            },
        }
    }

    pub fn with_requested_price(item_id: impl Into<String>, current_price: Decimal, requested: Decimal) -> Self {
        Self {
            item_id: item_id.into(),
            current_unit_price: current_price,
            units: 1,
            terms: NegotiationTerms::Requested {
                requested_price: requested,
            },
        }
    }
}

/// Terminal outcome of one negotiation round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationResult {
    pub item_id: String,
    pub accepted: bool,
    pub final_unit_price: Decimal,
    pub total_price: Decimal,
    pub counter_offer_unit_price: Option<Decimal>,
    pub expires_in_minutes: Option<u32>,
    pub message: String,
}

/// Discount policy for one booking category. The defaults are the business
/// constants the booking agents ship with; both are overridable through
/// `NegotiationConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NegotiationPolicy {
    /// Largest discount the agent will grant, as a fraction of sticker price.
    pub max_discount: Decimal,
    /// How long a counter-offer stays valid.
    pub counter_expiry_minutes: u32,
}

impl NegotiationPolicy {
    /// Hotel policy: 15% maximum discount, counter-offers expire in 20 minutes.
    pub fn hotel() -> Self {
        Self {
            max_discount: dec!(0.15),
            counter_expiry_minutes: 20,
        }
    }

    /// Flight policy: 10% maximum discount, counter-offers expire in 15 minutes.
    pub fn flight() -> Self {
        Self {
            max_discount: dec!(0.10),
            counter_expiry_minutes: 15,
        }
    }

    /// Lowest unit price this policy will accept.
    pub fn floor_price(&self, current_unit_price: Decimal) -> Decimal {
        current_unit_price * (Decimal::ONE - self.max_discount)
    }

    /// Settle an offer. Never errors: malformed numeric inputs are clamped to
    /// zero/defaults and the call still resolves to accept or counter.
    pub fn negotiate(&self, offer: &NegotiationOffer) -> NegotiationResult {
        let units = offer.units.max(1);
        let unit_count = Decimal::from(units);
        let current = offer.current_unit_price.max(Decimal::ZERO);
        let sticker_total = current * unit_count;
        let floor = self.floor_price(current);

        match &offer.terms {
            NegotiationTerms::Budget { available_budget } => {
                let budget = (*available_budget).max(Decimal::ZERO);
                let budget_per_unit = budget / unit_count;

                if budget >= sticker_total {
                    // Budget exceeds sticker price: no discount offered.
                    self.accepted(offer, current, unit_count, "Standard price fits within budget")
                } else if budget_per_unit >= floor {
                    let final_unit = budget_per_unit.min(current);
                    self.accepted(
                        offer,
                        final_unit,
                        unit_count,
                        &format!("Negotiated rate: ${final_unit}/unit"),
                    )
                } else {
                    self.countered(offer, floor, unit_count)
                }
            }
            NegotiationTerms::Requested { requested_price } => {
                let requested = (*requested_price).max(Decimal::ZERO);

                if requested >= current {
                    self.accepted(offer, current, unit_count, "Standard price accepted")
                } else if requested >= floor {
                    self.accepted(
                        offer,
                        requested,
                        unit_count,
                        &format!("Negotiated price accepted: ${requested}"),
                    )
                } else {
                    self.countered(offer, floor, unit_count)
                }
            }
        }
    }

    fn accepted(
        &self,
        offer: &NegotiationOffer,
        final_unit: Decimal,
        unit_count: Decimal,
        message: &str,
    ) -> NegotiationResult {
        NegotiationResult {
            item_id: offer.item_id.clone(),
            accepted: true,
            final_unit_price: final_unit,
            total_price: final_unit * unit_count,
            counter_offer_unit_price: None,
            expires_in_minutes: None,
            message: message.to_string(),
        }
    }

    fn countered(&self, offer: &NegotiationOffer, floor: Decimal, unit_count: Decimal) -> NegotiationResult {
        NegotiationResult {
            item_id: offer.item_id.clone(),
            accepted: false,
            final_unit_price: floor,
            total_price: floor * unit_count,
            counter_offer_unit_price: Some(floor),
            expires_in_minutes: Some(self.counter_expiry_minutes),
            message: format!("Budget too low. Minimum rate: ${floor}/unit"),
        }
    }
}
