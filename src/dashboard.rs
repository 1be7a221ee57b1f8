//! Dashboard controller.
//!
//! Loads the token list cache-first on mount, forces a fresh fetch on every
//! refresh (manual or periodic) and substitutes the last cached or built-in
//! token list when the API fails. State changes are published on a `watch`
//! channel for the renderer.

use crate::core::cache::TokenCache;
use crate::core::fallback::fallback_tokens;
use crate::core::{Token, TokenListProvider, TokenListQuery};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
    /// The last fetch failed; the tokens are best-effort data.
    Error,
}

/// Where the currently displayed tokens came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DataSource {
    #[default]
    None,
    Network,
    Cache,
    Fallback,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub phase: Phase,
    pub tokens: Vec<Token>,
    pub source: DataSource,
    /// Human readable message of the last failed fetch.
    pub error: Option<String>,
    /// When the displayed tokens were fetched from the API.
    pub fetched_at: Option<DateTime<Utc>>,
    pub show_stablecoins: bool,
}

impl DashboardState {
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }
}

/// Tokens passed to the table and charts: `hidden_symbols` are dropped unless
/// `show_hidden` is set.
pub fn visible_tokens(tokens: &[Token], hidden_symbols: &[String], show_hidden: bool) -> Vec<Token> {
    tokens
        .iter()
        .filter(|t| show_hidden || !hidden_symbols.iter().any(|s| *s == t.symbol))
        .cloned()
        .collect()
}

pub struct Dashboard {
    provider: Arc<dyn TokenListProvider>,
    cache: TokenCache,
    query: TokenListQuery,
    hidden_symbols: Vec<String>,
    state: watch::Sender<DashboardState>,
}

impl Dashboard {
    pub fn new(
        provider: Arc<dyn TokenListProvider>,
        cache: TokenCache,
        query: TokenListQuery,
        hidden_symbols: Vec<String>,
    ) -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        Self {
            provider,
            cache,
            query,
            hidden_symbols,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    pub fn hidden_symbols(&self) -> &[String] {
        &self.hidden_symbols
    }

    /// Tokens of the current state after the stablecoin visibility filter.
    pub fn visible_tokens(&self) -> Vec<Token> {
        let state = self.state.borrow();
        visible_tokens(&state.tokens, &self.hidden_symbols, state.show_stablecoins)
    }

    pub fn set_show_stablecoins(&self, show: bool) {
        self.state.send_modify(|s| s.show_stablecoins = show);
    }

    pub fn toggle_show_stablecoins(&self) -> bool {
        let mut show = false;
        self.state.send_modify(|s| {
            s.show_stablecoins = !s.show_stablecoins;
            show = s.show_stablecoins;
        });
        show
    }

    /// Loads the token list, preferring a valid cache entry over the network.
    pub async fn load(&self) {
        self.fetch_tokens(false).await
    }

    /// Fetches a fresh token list regardless of the cache.
    pub async fn refresh(&self) {
        self.fetch_tokens(true).await
    }

    /// Performs the initial load and starts the periodic refresh, which runs
    /// until the returned timer is dropped.
    pub async fn mount(self: &Arc<Self>, refresh_interval: Duration) -> RefreshTimer {
        self.load().await;
        RefreshTimer::start(Arc::clone(self), refresh_interval)
    }

    async fn fetch_tokens(&self, force_refresh: bool) {
        self.state.send_modify(|s| {
            s.phase = Phase::Loading;
            s.error = None;
        });

        if !force_refresh {
            if let Some(entry) = self.cache.get().await {
                info!(count = entry.data.len(), "Using cached token data");
                let fetched_at = DateTime::from_timestamp_millis(entry.timestamp);
                self.apply(entry.data, DataSource::Cache, fetched_at, None);
                return;
            }
        }

        match self.provider.fetch_token_list(&self.query).await {
            Ok(tokens) => {
                info!(count = tokens.len(), "Fetched token data");
                self.cache.put(&tokens).await;
                self.apply(tokens, DataSource::Network, Some(Utc::now()), None);
            }
            Err(e) => {
                error!(error = ?e, "Error fetching token data: {}", e);
                let (tokens, source, fetched_at) = match self.cache.peek().await {
                    Some(entry) => (
                        entry.data,
                        DataSource::Cache,
                        DateTime::from_timestamp_millis(entry.timestamp),
                    ),
                    None => (fallback_tokens(), DataSource::Fallback, None),
                };
                warn!(?source, "Showing best-effort token data");
                self.apply(tokens, source, fetched_at, Some(e.to_string()));
            }
        }
    }

    fn apply(
        &self,
        tokens: Vec<Token>,
        source: DataSource,
        fetched_at: Option<DateTime<Utc>>,
        error: Option<String>,
    ) {
        self.state.send_modify(|s| {
            s.phase = if error.is_some() {
                Phase::Error
            } else {
                Phase::Ready
            };
            s.tokens = tokens;
            s.source = source;
            s.fetched_at = fetched_at;
            s.error = error;
        });
    }
}

/// Background task forcing a dashboard refresh every period.
///
/// The first refresh happens one full period after start. Dropping the timer
/// cancels the task.
pub struct RefreshTimer {
    handle: JoinHandle<()>,
}

impl RefreshTimer {
    pub fn start(dashboard: Arc<Dashboard>, period: Duration) -> Self {
        let period = period.max(Duration::from_secs(1));
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                debug!("Periodic refresh");
                dashboard.refresh().await;
            }
        });
        debug!("Refresh timer started ({}s)", period.as_secs());
        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.handle.abort();
        debug!("Refresh timer stopped");
    }
}
