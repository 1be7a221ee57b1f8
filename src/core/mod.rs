//! Core business logic abstractions

pub mod cache;
pub mod charts;
pub mod config;
pub mod error;
pub mod fallback;
pub mod log;
pub mod provider;
pub mod table;
pub mod token;

// Re-export main types for cleaner imports
pub use error::FetchError;
pub use provider::{PriceHistoryProvider, TokenListProvider};
pub use token::{HistoryRange, PricePoint, Token, TokenListQuery};
