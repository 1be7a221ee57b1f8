//! Series shown by the dashboard's chart widgets.

use crate::core::token::{PricePoint, Token};

/// Number of bars in the volume chart.
pub const VOLUME_CHART_LEN: usize = 10;
/// Number of named slices in the market cap chart; the rest are grouped.
pub const MARKET_CAP_TOP_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartEntry {
    pub label: String,
    pub value: f64,
}

/// 24h volume of the first tokens of the list, in list order.
pub fn volume_series(tokens: &[Token]) -> Vec<ChartEntry> {
    tokens
        .iter()
        .take(VOLUME_CHART_LEN)
        .map(|t| ChartEntry {
            label: t.symbol.clone(),
            value: t.volume_24h_usd,
        })
        .collect()
}

/// Market cap of the first tokens plus an `Others` entry for the remainder.
pub fn market_cap_series(tokens: &[Token]) -> Vec<ChartEntry> {
    let (top, others) = tokens.split_at(tokens.len().min(MARKET_CAP_TOP_LEN));
    let mut series: Vec<ChartEntry> = top
        .iter()
        .map(|t| ChartEntry {
            label: t.symbol.clone(),
            value: t.market_cap,
        })
        .collect();
    series.push(ChartEntry {
        label: "Others".to_string(),
        value: others.iter().map(|t| t.market_cap).sum(),
    });
    series
}

/// Share of each entry in the series total, in percent.
pub fn shares(series: &[ChartEntry]) -> Vec<f64> {
    let total: f64 = series.iter().map(|e| e.value).sum();
    series
        .iter()
        .map(|e| if total > 0.0 { e.value / total * 100.0 } else { 0.0 })
        .collect()
}

/// Summary of a price history used as the detail chart caption.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSummary {
    pub first: PricePoint,
    pub last: PricePoint,
    pub min: f64,
    pub max: f64,
}

impl PriceSummary {
    pub fn from_points(points: &[PricePoint]) -> Option<Self> {
        let first = *points.first()?;
        let last = *points.last()?;
        let (min, max) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.value), hi.max(p.value))
            });
        Some(Self {
            first,
            last,
            min,
            max,
        })
    }

    pub fn change_percent(&self) -> Option<f64> {
        (self.first.value > 0.0)
            .then(|| (self.last.value - self.first.value) / self.first.value * 100.0)
    }
}
