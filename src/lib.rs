pub mod cli;
pub mod core;
pub mod dashboard;
pub mod detail;
pub mod providers;
pub mod store;

use crate::core::cache::{Store, TokenCache};
use crate::core::config::AppConfig;
use crate::core::table::{SortColumn, SortDirection, TableView};
use crate::core::HistoryRange;
use crate::dashboard::Dashboard;
use crate::providers::BirdeyeProvider;
use crate::store::KeyValueStore;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name of the store collection holding the token list cache.
const CACHE_COLLECTION: &str = "dashboard";

/// Initial table state and visibility requested on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewOptions {
    pub filter: Option<String>,
    pub sort: Option<SortColumn>,
    pub ascending: bool,
    pub page: usize,
    pub show_stablecoins: bool,
    pub force_refresh: bool,
}

impl ViewOptions {
    pub fn table_view(&self, page_size: usize) -> TableView {
        let mut view = TableView::new(page_size);
        if let Some(column) = self.sort {
            view.sort_column = column;
        }
        if self.ascending {
            view.sort_direction = SortDirection::Ascending;
        }
        if let Some(filter) = &self.filter {
            view.set_filter(filter);
        }
        view.go_to_page(self.page);
        view
    }
}

pub enum AppCommand {
    Show(ViewOptions),
    Watch(ViewOptions),
    Token {
        addresses: Vec<String>,
        range: HistoryRange,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("soldash starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        base_url = %config.api.base_url,
        refresh_interval_secs = config.refresh_interval_secs,
        "Loaded config"
    );
    if config.api.api_key.is_empty() {
        warn!("No API key configured, requests will likely be rejected");
    }

    let store = match config.default_data_path() {
        Ok(path) => KeyValueStore::open(&path),
        Err(e) => {
            warn!("No data directory available ({}), using in-memory cache", e);
            KeyValueStore::in_memory()
        }
    };
    let cache = TokenCache::new(
        store.get_collection(CACHE_COLLECTION, true),
        config.cache_ttl(),
    );

    let provider = Arc::new(BirdeyeProvider::new(
        &config.api.base_url,
        &config.api.api_key,
        config.api.timeout(),
    )?);
    let dashboard = Arc::new(Dashboard::new(
        provider.clone(),
        cache,
        config.token_list.clone(),
        config.hidden_symbols.clone(),
    ));

    let result = match command {
        AppCommand::Show(options) => {
            dashboard.set_show_stablecoins(options.show_stablecoins);
            let view = options.table_view(config.page_size);
            cli::show::run(&dashboard, &view, options.force_refresh).await
        }
        AppCommand::Watch(options) => {
            dashboard.set_show_stablecoins(options.show_stablecoins);
            let view = options.table_view(config.page_size);
            cli::watch::run(
                Arc::clone(&dashboard),
                provider,
                view,
                config.refresh_interval(),
                HistoryRange::default(),
            )
            .await
        }
        AppCommand::Token { addresses, range } => {
            cli::token::run(&dashboard, provider.as_ref(), &addresses, range).await
        }
    };

    store.flush();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_options_defaults() {
        let view = ViewOptions::default().table_view(10);
        assert_eq!(view, TableView::new(10));
    }

    #[test]
    fn test_view_options_applied() {
        let options = ViewOptions {
            filter: Some("bonk".to_string()),
            sort: Some(SortColumn::Price),
            ascending: true,
            page: 2,
            ..Default::default()
        };
        let view = options.table_view(5);

        assert_eq!(view.sort_column, SortColumn::Price);
        assert_eq!(view.sort_direction, SortDirection::Ascending);
        assert_eq!(view.filter, "bonk");
        assert_eq!(view.page(), 2);
        assert_eq!(view.page_size(), 5);
    }
}
