use super::{show, ui};
use crate::core::{HistoryRange, PriceHistoryProvider, Token};
use crate::dashboard::Dashboard;
use crate::detail::{self, TokenDetail};
use anyhow::{Result, bail};
use std::sync::Arc;
use tracing::warn;

/// Finds a token by exact address, or by symbol ignoring case.
pub fn find_token<'a>(tokens: &'a [Token], query: &str) -> Option<&'a Token> {
    tokens
        .iter()
        .find(|t| t.address == query)
        .or_else(|| tokens.iter().find(|t| t.symbol.eq_ignore_ascii_case(query)))
}

/// Shows the detail view of each requested token; price histories are
/// fetched concurrently.
pub async fn run(
    dashboard: &Arc<Dashboard>,
    history: &dyn PriceHistoryProvider,
    queries: &[String],
    range: HistoryRange,
) -> Result<()> {
    let spinner = ui::new_spinner("Loading token data...");
    dashboard.load().await;

    let state = dashboard.state();
    let mut details: Vec<TokenDetail> = Vec::new();
    for query in queries {
        match find_token(&state.tokens, query) {
            Some(token) => details.push(TokenDetail::new(token.clone(), range)),
            None => warn!("Token {} not found in the token list", query),
        }
    }
    if details.is_empty() {
        spinner.finish_and_clear();
        bail!("None of the requested tokens were found: {}", queries.join(", "));
    }

    spinner.set_message("Fetching price history...");
    detail::load_all(&mut details, history).await;
    spinner.finish_and_clear();

    if let Some(error) = &state.error {
        println!("{}", ui::style_text(&format!("Error: {error}"), ui::StyleType::Error));
    }
    let num_details = details.len();
    for (i, detail) in details.iter().enumerate() {
        println!("{}", show::render_detail(detail));
        if i < num_details - 1 {
            println!("{}", ui::separator());
        }
    }
    Ok(())
}
