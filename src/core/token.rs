//! Token market data as returned by the price API

use anyhow::{Result, anyhow};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Decodes `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A tradable asset with its market statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub symbol: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(
        rename = "logoURI",
        default,
        deserialize_with = "null_as_default"
    )]
    pub logo_uri: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(rename = "mc", default, deserialize_with = "null_as_default")]
    pub market_cap: f64,
    #[serde(rename = "v24hUSD", default, deserialize_with = "null_as_default")]
    pub volume_24h_usd: f64,
    #[serde(rename = "v24hChangePercent", default)]
    pub change_24h_percent: Option<f64>,
    #[serde(rename = "v7dChangePercent", default)]
    pub change_7d_percent: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub liquidity: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub decimals: u8,
    #[serde(rename = "lastTradeUnixTime", default)]
    pub last_trade_unix_time: Option<i64>,
}

/// Query parameters for the token list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenListQuery {
    pub sort_by: String,
    pub sort_type: String,
    pub offset: u32,
    pub limit: u32,
    pub min_liquidity: f64,
}

impl Default for TokenListQuery {
    fn default() -> Self {
        Self {
            sort_by: "v24hUSD".to_string(),
            sort_type: "desc".to_string(),
            offset: 0,
            limit: 100,
            min_liquidity: 100.0,
        }
    }
}

impl TokenListQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("sort_by", self.sort_by.clone()),
            ("sort_type", self.sort_type.clone()),
            ("offset", self.offset.to_string()),
            ("limit", self.limit.to_string()),
            ("min_liquidity", self.min_liquidity.to_string()),
        ]
    }
}

/// A single sample of a token's price history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(rename = "unixTime")]
    pub unix_time: i64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HistoryRange {
    OneDay,
    #[default]
    SevenDays,
    ThirtyDays,
}

impl HistoryRange {
    /// Value sent as the `type` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            HistoryRange::OneDay => "1d",
            HistoryRange::SevenDays => "7d",
            HistoryRange::ThirtyDays => "30d",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            HistoryRange::OneDay => "1-Day Price History",
            HistoryRange::SevenDays => "7-Day Price History",
            HistoryRange::ThirtyDays => "30-Day Price History",
        }
    }
}

impl Display for HistoryRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_param())
    }
}

impl FromStr for HistoryRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1d" => Ok(HistoryRange::OneDay),
            "7d" => Ok(HistoryRange::SevenDays),
            "30d" => Ok(HistoryRange::ThirtyDays),
            _ => Err(anyhow!("Invalid history range: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_deserialization_with_nulls() {
        let json = r#"{
            "address": "So11111111111111111111111111111111111111112",
            "decimals": 9,
            "liquidity": null,
            "logoURI": null,
            "mc": 83855758354.3748,
            "name": "Wrapped SOL",
            "symbol": "SOL",
            "v24hChangePercent": -13.2,
            "v24hUSD": 1550049693.67
        }"#;

        let token: Token = serde_json::from_str(json).unwrap();
        assert_eq!(token.symbol, "SOL");
        assert_eq!(token.decimals, 9);
        assert_eq!(token.liquidity, 0.0);
        assert!(token.logo_uri.is_empty());
        assert!(token.price.is_none());
        assert!(token.change_7d_percent.is_none());
        assert_eq!(token.change_24h_percent, Some(-13.2));
    }

    #[test]
    fn test_token_serializes_with_api_field_names() {
        let token: Token = serde_json::from_str(
            r#"{"address": "abc", "symbol": "ABC", "name": "Abc", "v24hUSD": 10.0}"#,
        )
        .unwrap();
        let value = serde_json::to_value(&token).unwrap();
        assert_eq!(value["v24hUSD"], 10.0);
        assert!(value.get("logoURI").is_some());
        assert!(value.get("volume_24h_usd").is_none());
    }

    #[test]
    fn test_history_range_parse() {
        assert_eq!("7D".parse::<HistoryRange>().unwrap(), HistoryRange::SevenDays);
        assert_eq!("30d".parse::<HistoryRange>().unwrap(), HistoryRange::ThirtyDays);
        assert!("2w".parse::<HistoryRange>().is_err());
        assert_eq!(HistoryRange::default().to_string(), "7d");
    }

    #[test]
    fn test_default_query_params() {
        let params = TokenListQuery::default().to_params();
        assert_eq!(params[0], ("sort_by", "v24hUSD".to_string()));
        assert_eq!(params[1], ("sort_type", "desc".to_string()));
        assert_eq!(params[2], ("offset", "0".to_string()));
        assert_eq!(params[3], ("limit", "100".to_string()));
        assert_eq!(params[4], ("min_liquidity", "100".to_string()));
    }
}
