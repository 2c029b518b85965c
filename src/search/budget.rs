//! Fractional budget split across search categories.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::providers::Category;

/// How a trip's total budget is divided between categories. The defaults are
/// the gateway's business constants; the unallocated remainder (5% by
/// default) is an intentional reserve buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetAllocation {
    #[serde(default = "default_flights_fraction")]
    pub flights: Decimal,
    #[serde(default = "default_hotels_fraction")]
    pub hotels: Decimal,
    #[serde(default = "default_activities_fraction")]
    pub activities: Decimal,
    #[serde(default = "default_restaurants_fraction")]
    pub restaurants: Decimal,
}

fn default_flights_fraction() -> Decimal {
    dec!(0.35)
}

fn default_hotels_fraction() -> Decimal {
    dec!(0.35)
}

fn default_activities_fraction() -> Decimal {
    dec!(0.15)
}

fn default_restaurants_fraction() -> Decimal {
    dec!(0.10)
}

impl Default for BudgetAllocation {
    fn default() -> Self {
        Self {
            flights: default_flights_fraction(),
            hotels: default_hotels_fraction(),
            activities: default_activities_fraction(),
            restaurants: default_restaurants_fraction(),
        }
    }
}

impl BudgetAllocation {
    pub fn fraction(&self, category: Category) -> Decimal {
        match category {
            Category::Flights => self.flights,
            Category::Hotels => self.hotels,
            Category::Activities => self.activities,
            Category::Restaurants => self.restaurants,
        }
    }

    /// Budget slice for one category.
    pub fn slice(&self, category: Category, total_budget: Decimal) -> Decimal {
        total_budget * self.fraction(category)
    }

    pub fn total_fraction(&self) -> Decimal {
        self.flights + self.hotels + self.activities + self.restaurants
    }

    /// Unallocated remainder kept as a buffer.
    pub fn reserve_fraction(&self) -> Decimal {
        Decimal::ONE - self.total_fraction()
    }

    /// Fractions must each be non-negative and sum to at most 1.0.
    pub fn validate(&self) -> Result<(), String> {
        for (name, fraction) in [
            ("flights", self.flights),
            ("hotels", self.hotels),
            ("activities", self.activities),
            ("restaurants", self.restaurants),
        ] {
            if fraction < Decimal::ZERO {
                return Err(format!("allocation.{name} must be non-negative"));
            }
        }

        if self.total_fraction() > Decimal::ONE {
            return Err(format!(
                "allocation fractions sum to {}, must be <= 1.0",
                self.total_fraction()
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fractions_sum_below_one() {
        let allocation = BudgetAllocation::default();
        assert!(allocation.validate().is_ok());
        assert_eq!(allocation.total_fraction(), dec!(0.95));
        assert_eq!(allocation.reserve_fraction(), dec!(0.05));
    }

    #[test]
    fn test_slices() {
        let allocation = BudgetAllocation::default();
        let total = dec!(2000);
        assert_eq!(allocation.slice(Category::Flights, total), dec!(700));
        assert_eq!(allocation.slice(Category::Hotels, total), dec!(700));
        assert_eq!(allocation.slice(Category::Activities, total), dec!(300));
        assert_eq!(allocation.slice(Category::Restaurants, total), dec!(200));
    }

    #[test]
    fn test_oversubscribed_allocation_rejected() {
        let allocation = BudgetAllocation {
            flights: dec!(0.5),
            hotels: dec!(0.5),
            activities: dec!(0.2),
            restaurants: dec!(0.1),
        };
        assert!(allocation.validate().is_err());
    }

    #[test]
    fn test_negative_fraction_rejected() {
        let allocation = BudgetAllocation {
            flights: dec!(-0.1),
            ..BudgetAllocation::default()
        };
        assert!(allocation.validate().is_err());
    }
}
