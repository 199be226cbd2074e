use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Exchange the instrument trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Exchange {
    #[serde(rename = "NSE")]
    Nse,
    #[serde(rename = "BSE")]
    Bse,
}

impl Exchange {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Exchange::Nse => "NSE",
            Exchange::Bse => "BSE",
        }
    }
}

impl std::str::FromStr for Exchange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NSE" => Ok(Exchange::Nse),
            "BSE" => Ok(Exchange::Bse),
            other => Err(format!("Unknown exchange: {other}")),
        }
    }
}

/// Market capitalisation bucket, as labelled in the reference data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum MarketCap {
    #[serde(rename = "Large Cap")]
    Large,
    #[serde(rename = "Mid Cap")]
    Mid,
    #[serde(rename = "Small Cap")]
    Small,
}

impl MarketCap {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MarketCap::Large => "Large Cap",
            MarketCap::Mid => "Mid Cap",
            MarketCap::Small => "Small Cap",
        }
    }
}

impl std::str::FromStr for MarketCap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Large Cap" => Ok(MarketCap::Large),
            "Mid Cap" => Ok(MarketCap::Mid),
            "Small Cap" => Ok(MarketCap::Small),
            other => Err(format!("Unknown market cap category: {other}")),
        }
    }
}

/// A tradable instrument, identified by its symbol. Shared read-only
/// reference data; every holding must point at an existing stock.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Stock {
    pub symbol: String,
    pub company_name: String,
    pub sector: String,
    pub exchange: Exchange,
    pub market_cap_category: MarketCap,
}
