use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A (stock, date) -> closing price fact. Observations accumulate from an
/// external market-data feed and are never mutated once written.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PriceObservation {
    pub symbol: String,
    pub price_date: NaiveDate,
    pub close_price: f64,
}

/// The most recent observation per symbol, as of query time.
///
/// Ties are broken by date only; the data model assumes one observation per
/// stock per date.
#[derive(Debug, Clone, Default)]
pub struct PriceBook {
    latest: HashMap<String, PriceObservation>,
}

impl PriceBook {
    #[must_use]
    pub fn from_observations(observations: impl IntoIterator<Item = PriceObservation>) -> Self {
        let mut latest: HashMap<String, PriceObservation> = HashMap::new();
        for obs in observations {
            match latest.get(&obs.symbol) {
                Some(existing) if existing.price_date >= obs.price_date => {}
                _ => {
                    latest.insert(obs.symbol.clone(), obs);
                }
            }
        }
        Self { latest }
    }

    #[must_use]
    pub fn latest(&self, symbol: &str) -> Option<&PriceObservation> {
        self.latest.get(symbol)
    }

    /// Latest close for a symbol, if any observation exists.
    #[must_use]
    pub fn close(&self, symbol: &str) -> Option<f64> {
        self.latest.get(symbol).map(|obs| obs.close_price)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(symbol: &str, date: &str, close: f64) -> PriceObservation {
        PriceObservation {
            symbol: symbol.to_string(),
            price_date: date.parse().unwrap(),
            close_price: close,
        }
    }

    #[test]
    fn test_latest_observation_wins() {
        let book = PriceBook::from_observations(vec![
            obs("TCS", "2025-07-28", 4120.00),
            obs("TCS", "2025-07-30", 4165.30),
            obs("TCS", "2025-07-29", 4140.10),
        ]);
        assert_eq!(book.close("TCS"), Some(4165.30));
        assert_eq!(
            book.latest("TCS").unwrap().price_date,
            "2025-07-30".parse::<NaiveDate>().unwrap()
        );
    }

    #[test]
    fn test_unknown_symbol_has_no_price() {
        let book = PriceBook::from_observations(vec![obs("INFY", "2025-07-30", 1835.60)]);
        assert_eq!(book.close("TCS"), None);
    }
}
