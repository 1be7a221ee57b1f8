//! Single-token detail view and its price chart.

use crate::core::{HistoryRange, PriceHistoryProvider, PricePoint, Token};
use futures::future::join_all;
use tracing::debug;

/// State of the detail view's price chart.
///
/// A failed history fetch leaves the chart `Loading`; the error is only logged.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartState {
    Loading,
    Ready(Vec<PricePoint>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenDetail {
    pub token: Token,
    pub range: HistoryRange,
    pub chart: ChartState,
}

impl TokenDetail {
    pub fn new(token: Token, range: HistoryRange) -> Self {
        Self {
            token,
            range,
            chart: ChartState::Loading,
        }
    }

    /// Fetches the price history for this token and updates the chart.
    pub async fn load_chart(&mut self, provider: &dyn PriceHistoryProvider) {
        self.chart = fetch_chart(provider, &self.token.address, self.range).await;
    }
}

pub async fn fetch_chart(
    provider: &dyn PriceHistoryProvider,
    address: &str,
    range: HistoryRange,
) -> ChartState {
    match provider.fetch_price_history(address, range).await {
        Ok(points) => ChartState::Ready(points),
        Err(e) => {
            debug!(address, error = %e, "Error fetching price data");
            ChartState::Loading
        }
    }
}

/// Loads the charts of several detail views; each fetch runs independently.
pub async fn load_all(
    details: &mut [TokenDetail],
    provider: &dyn PriceHistoryProvider,
) {
    join_all(details.iter_mut().map(|d| d.load_chart(provider))).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FetchError;
    use async_trait::async_trait;

    struct MockHistoryProvider;

    #[async_trait]
    impl PriceHistoryProvider for MockHistoryProvider {
        async fn fetch_price_history(
            &self,
            address: &str,
            range: HistoryRange,
        ) -> Result<Vec<PricePoint>, FetchError> {
            assert_eq!(range, HistoryRange::SevenDays);
            if address == "good" {
                Ok(vec![PricePoint {
                    unix_time: 1,
                    value: 2.0,
                }])
            } else {
                Err(FetchError::Network("unreachable".to_string()))
            }
        }
    }

    fn token(address: &str) -> Token {
        serde_json::from_value(serde_json::json!({
            "address": address,
            "symbol": "TK",
            "name": "Token",
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_chart_ready_on_success() {
        let mut detail = TokenDetail::new(token("good"), HistoryRange::default());
        assert_eq!(detail.chart, ChartState::Loading);

        detail.load_chart(&MockHistoryProvider).await;
        assert_eq!(
            detail.chart,
            ChartState::Ready(vec![PricePoint {
                unix_time: 1,
                value: 2.0
            }])
        );
    }

    #[tokio::test]
    async fn test_failures_stay_loading_independently() {
        let mut details = vec![
            TokenDetail::new(token("bad"), HistoryRange::SevenDays),
            TokenDetail::new(token("good"), HistoryRange::SevenDays),
        ];

        load_all(&mut details, &MockHistoryProvider).await;

        assert_eq!(details[0].chart, ChartState::Loading);
        assert!(matches!(details[1].chart, ChartState::Ready(_)));
    }
}
