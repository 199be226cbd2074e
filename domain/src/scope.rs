use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::portfolio::PortfolioId;

/// The filter applied to an aggregation request: the whole customer base,
/// one user's holdings, or one portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    All,
    User(String),
    Portfolio(PortfolioId),
}

impl Scope {
    /// Builds a scope from the optional request query parameters. The
    /// portfolio filter is the narrower one and takes precedence when both
    /// are supplied.
    #[must_use]
    pub fn from_query(username: Option<String>, portfolio_id: Option<PortfolioId>) -> Self {
        match (portfolio_id, username) {
            (Some(id), _) => Scope::Portfolio(id),
            (None, Some(username)) if !username.is_empty() => Scope::User(username),
            _ => Scope::All,
        }
    }
}

/// Trailing window for the performance series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum Period {
    #[serde(rename = "1M")]
    OneMonth,
    #[default]
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    OneYear,
}

impl Period {
    #[must_use]
    pub fn months(self) -> u32 {
        match self {
            Period::OneMonth => 1,
            Period::ThreeMonths => 3,
            Period::SixMonths => 6,
            Period::OneYear => 12,
        }
    }

    /// First date inside the trailing window ending at `today`.
    #[must_use]
    pub fn window_start(self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_months(Months::new(self.months()))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Parses the wire form (`1M`, `3M`, `6M`, `1Y`); anything else falls
    /// back to the default window rather than erroring.
    #[must_use]
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            Some("1M") => Period::OneMonth,
            Some("3M") => Period::ThreeMonths,
            Some("6M") => Period::SixMonths,
            Some("1Y") => Period::OneYear,
            _ => Period::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_scope_portfolio_takes_precedence() {
        let id = Uuid::new_v4();
        let scope = Scope::from_query(Some("raj_investor".to_string()), Some(id));
        assert_eq!(scope, Scope::Portfolio(id));
    }

    #[test]
    fn test_scope_empty_username_is_all() {
        assert_eq!(Scope::from_query(Some(String::new()), None), Scope::All);
        assert_eq!(Scope::from_query(None, None), Scope::All);
    }

    #[test]
    fn test_period_window_start() {
        let today: NaiveDate = "2025-07-31".parse().unwrap();
        assert_eq!(
            Period::SixMonths.window_start(today),
            "2025-01-31".parse::<NaiveDate>().unwrap()
        );
    }

    #[test]
    fn test_period_parse_fallback() {
        assert_eq!(Period::parse_or_default(Some("1Y")), Period::OneYear);
        assert_eq!(Period::parse_or_default(Some("2W")), Period::ThreeMonths);
        assert_eq!(Period::parse_or_default(None), Period::ThreeMonths);
    }
}
