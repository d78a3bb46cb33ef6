use serde::{Deserialize, Serialize};

/// Traveler category used for per-head pricing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TravelerType {
    Adult,
    Child,
    Infant,
}

/// Per-traveler unit prices for a tour, in minor currency units.
/// Frozen into a booking's pricing snapshot at creation; later edits to
/// the tour never reprice existing bookings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceTable {
    pub adult: i64,
    pub child: i64,
    pub infant: i64,
}

impl PriceTable {
    pub fn unit_price(&self, traveler_type: TravelerType) -> i64 {
        match traveler_type {
            TravelerType::Adult => self.adult,
            TravelerType::Child => self.child,
            TravelerType::Infant => self.infant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_price_by_traveler_type() {
        let table = PriceTable {
            adult: 1000,
            child: 600,
            infant: 0,
        };
        assert_eq!(table.unit_price(TravelerType::Adult), 1000);
        assert_eq!(table.unit_price(TravelerType::Child), 600);
        assert_eq!(table.unit_price(TravelerType::Infant), 0);
    }
}
