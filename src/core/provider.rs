//! Token data abstractions

use crate::core::error::FetchError;
use crate::core::token::{HistoryRange, PricePoint, Token, TokenListQuery};
use async_trait::async_trait;

#[async_trait]
pub trait TokenListProvider: Send + Sync {
    async fn fetch_token_list(&self, query: &TokenListQuery) -> Result<Vec<Token>, FetchError>;
}

#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    async fn fetch_price_history(
        &self,
        address: &str,
        range: HistoryRange,
    ) -> Result<Vec<PricePoint>, FetchError>;
}
