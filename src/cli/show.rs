use super::ui;
use crate::core::charts::{self, PriceSummary};
use crate::core::table::{SortColumn, SortDirection, TablePage, TableView};
use crate::core::Token;
use crate::dashboard::{Dashboard, DashboardState, DataSource};
use crate::detail::{ChartState, TokenDetail};
use anyhow::Result;
use chrono::{DateTime, Local};
use comfy_table::{Cell, Table};
use std::sync::Arc;

const CHART_BAR_WIDTH: usize = 40;

fn header_label(view: &TableView, column: SortColumn) -> String {
    if view.sort_column != column {
        return column.label().to_string();
    }
    let arrow = match view.sort_direction {
        SortDirection::Ascending => "▲",
        SortDirection::Descending => "▼",
    };
    format!("{} {arrow}", column.label())
}

fn token_table(page: &TablePage, view: &TableView) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell(&header_label(view, SortColumn::Name)),
        ui::header_cell(&header_label(view, SortColumn::Symbol)),
        ui::header_cell(&header_label(view, SortColumn::Price)),
        ui::header_cell(&header_label(view, SortColumn::Volume24h)),
        ui::header_cell(&header_label(view, SortColumn::Change24h)),
        ui::header_cell(&header_label(view, SortColumn::Change7d)),
    ]);

    for (i, token) in page.rows.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&token.name),
            Cell::new(&token.symbol),
            ui::number_cell(ui::format_price(token.price)),
            ui::number_cell(ui::format_usd(token.volume_24h_usd)),
            ui::change_cell(token.change_24h_percent),
            ui::change_cell(token.change_7d_percent),
        ]);
    }
    table
}

fn pager(page: &TablePage) -> String {
    let previous = if page.has_previous() {
        ui::style_text("< Previous", ui::StyleType::Label)
    } else {
        ui::style_text("< Previous", ui::StyleType::Subtle)
    };
    let next = if page.has_next() {
        ui::style_text("Next >", ui::StyleType::Label)
    } else {
        ui::style_text("Next >", ui::StyleType::Subtle)
    };
    format!(
        "{previous}   Page {} of {}   {next}",
        page.page,
        page.total_pages.max(1)
    )
}

fn volume_chart(tokens: &[Token]) -> String {
    let series = charts::volume_series(tokens);
    let max = series.iter().map(|e| e.value).fold(0.0, f64::max);
    let label_width = series.iter().map(|e| e.label.chars().count()).max().unwrap_or(0);

    let mut output = ui::style_text("24h Volume Chart", ui::StyleType::Title);
    output.push('\n');
    for entry in &series {
        output.push_str(&format!(
            "\n{:<label_width$} {:<CHART_BAR_WIDTH$} {}",
            entry.label,
            ui::bar(entry.value, max, CHART_BAR_WIDTH),
            ui::format_usd(entry.value)
        ));
    }
    output
}

fn market_cap_chart(tokens: &[Token]) -> String {
    let series = charts::market_cap_series(tokens);
    let shares = charts::shares(&series);
    let label_width = series.iter().map(|e| e.label.chars().count()).max().unwrap_or(0);

    let mut output = ui::style_text("Market Cap Chart", ui::StyleType::Title);
    output.push('\n');
    for (entry, share) in series.iter().zip(shares) {
        output.push_str(&format!(
            "\n{:<label_width$} {:<CHART_BAR_WIDTH$} {:>6.2}%  {}",
            entry.label,
            ui::bar(share, 100.0, CHART_BAR_WIDTH),
            share,
            ui::format_usd(entry.value)
        ));
    }
    output
}

fn source_line(state: &DashboardState) -> Option<String> {
    let fetched = state
        .fetched_at
        .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string());
    let line = match (state.source, fetched) {
        (DataSource::Network, Some(at)) => format!("Updated at {at}"),
        (DataSource::Cache, Some(at)) => format!("Showing cached data from {at}"),
        (DataSource::Fallback, _) => "Showing built-in sample data".to_string(),
        _ => return None,
    };
    Some(ui::style_text(&line, ui::StyleType::Subtle))
}

/// Renders the dashboard: status, stablecoin toggle, token table and charts.
///
/// `visible` is the token list after the stablecoin filter.
pub fn render_dashboard(
    state: &DashboardState,
    visible: &[Token],
    view: &TableView,
    hidden_symbols: &[String],
) -> String {
    let mut output = ui::style_text("Solana Token Dashboard", ui::StyleType::Title);
    output.push('\n');

    if let Some(error) = &state.error {
        output.push_str(&format!(
            "\n{}",
            ui::style_text(&format!("Error: {error}"), ui::StyleType::Error)
        ));
    }
    if let Some(line) = source_line(state) {
        output.push_str(&format!("\n{line}"));
    }

    let checkbox = if state.show_stablecoins { "[x]" } else { "[ ]" };
    output.push_str(&format!(
        "\n{checkbox} Show {}\n",
        join_symbols(hidden_symbols)
    ));

    output.push_str(&format!(
        "\n{}\n",
        ui::style_text("Top Tokens", ui::StyleType::Title)
    ));
    if !view.filter.is_empty() {
        output.push_str(&format!(
            "{} {}\n",
            ui::style_text("Filter:", ui::StyleType::Label),
            view.filter
        ));
    }

    let page = view.project(visible);
    if page.rows.is_empty() {
        output.push_str(&format!(
            "\n{}\n",
            ui::style_text("No tokens match.", ui::StyleType::Subtle)
        ));
    } else {
        output.push_str(&format!("\n{}\n", token_table(&page, view)));
    }
    output.push_str(&format!("{}\n", pager(&page)));

    output.push_str(&format!("\n{}\n", volume_chart(visible)));
    output.push_str(&format!("\n{}\n", market_cap_chart(visible)));

    if state.is_loading() {
        output.push_str(&format!(
            "\n{}\n",
            ui::style_text("Refreshing data...", ui::StyleType::Highlight)
        ));
    }
    output
}

/// `USDT, USDC, and SOL`
fn join_symbols(symbols: &[String]) -> String {
    match symbols {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{a} and {b}"),
        [rest @ .., last] => format!("{}, and {last}", rest.join(", ")),
    }
}

fn price_chart(detail: &TokenDetail) -> String {
    let mut output = ui::style_text(detail.range.title(), ui::StyleType::Label);
    output.push('\n');

    let points = match &detail.chart {
        ChartState::Ready(points) => points,
        ChartState::Loading => {
            output.push_str(&ui::style_text("Loading chart data...", ui::StyleType::Subtle));
            return output;
        }
    };
    let Some(summary) = PriceSummary::from_points(points) else {
        output.push_str(&ui::style_text("No price data", ui::StyleType::Subtle));
        return output;
    };

    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    let date = |unix: i64| {
        DateTime::from_timestamp(unix, 0)
            .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| unix.to_string())
    };
    output.push_str(&ui::sparkline(&values));
    output.push_str(&format!(
        "\n{} → {}   Low {}   High {}   Last {}   ({})",
        date(summary.first.unix_time),
        date(summary.last.unix_time),
        ui::format_price(Some(summary.min)),
        ui::format_price(Some(summary.max)),
        ui::format_price(Some(summary.last.value)),
        ui::format_percentage(summary.change_percent())
    ));
    output
}

/// Renders a token detail view with its price chart.
pub fn render_detail(detail: &TokenDetail) -> String {
    let token = &detail.token;
    let mut output = ui::style_text(
        &format!("{} ({})", token.name, token.symbol),
        ui::StyleType::Title,
    );
    output.push_str(&format!(
        "\n{}\n",
        ui::style_text(&token.address, ui::StyleType::Subtle)
    ));

    let mut stats = ui::new_styled_table();
    stats.add_row(vec![
        Cell::new("Price"),
        ui::number_cell(ui::format_price(token.price)),
    ]);
    stats.add_row(vec![
        Cell::new("Market Cap"),
        ui::number_cell(ui::format_usd(token.market_cap)),
    ]);
    stats.add_row(vec![
        Cell::new("24h Volume"),
        ui::number_cell(ui::format_usd(token.volume_24h_usd)),
    ]);
    stats.add_row(vec![
        Cell::new("24h Change"),
        ui::change_cell(token.change_24h_percent),
    ]);
    stats.add_row(vec![
        Cell::new("7d Change"),
        ui::change_cell(token.change_7d_percent),
    ]);
    stats.add_row(vec![
        Cell::new("Liquidity"),
        ui::number_cell(ui::format_usd(token.liquidity)),
    ]);

    output.push_str(&format!("\n{}\n\n{}\n", stats, price_chart(detail)));
    output
}

/// Mounts the dashboard once and prints it.
pub async fn run(dashboard: &Arc<Dashboard>, view: &TableView, force_refresh: bool) -> Result<()> {
    let spinner = ui::new_spinner("Loading token data...");
    if force_refresh {
        dashboard.refresh().await;
    } else {
        dashboard.load().await;
    }
    spinner.finish_and_clear();

    println!(
        "{}",
        render_dashboard(
            &dashboard.state(),
            &dashboard.visible_tokens(),
            view,
            dashboard.hidden_symbols()
        )
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PricePoint;
    use crate::dashboard::{Phase, visible_tokens};

    fn token(symbol: &str, volume: f64) -> Token {
        serde_json::from_value(serde_json::json!({
            "address": format!("{symbol}-address"),
            "symbol": symbol,
            "name": format!("{symbol} Token"),
            "price": 1.0,
            "mc": volume * 10.0,
            "v24hUSD": volume,
            "v24hChangePercent": -2.5,
        }))
        .unwrap()
    }

    fn hidden() -> Vec<String> {
        vec!["USDT".to_string(), "USDC".to_string(), "SOL".to_string()]
    }

    #[test]
    fn test_join_symbols() {
        assert_eq!(join_symbols(&hidden()), "USDT, USDC, and SOL");
        assert_eq!(join_symbols(&["A".to_string(), "B".to_string()]), "A and B");
        assert_eq!(join_symbols(&[]), "");
    }

    #[test]
    fn test_render_dashboard_pages_and_error() {
        let tokens: Vec<Token> = (0..23).map(|i| token(&format!("TK{i}"), i as f64)).collect();
        let state = DashboardState {
            phase: Phase::Error,
            tokens: tokens.clone(),
            source: DataSource::Cache,
            error: Some("No response received from server.".to_string()),
            fetched_at: None,
            show_stablecoins: false,
        };
        let mut view = TableView::new(10);
        view.go_to_page(3);

        let output = render_dashboard(&state, &tokens, &view, &hidden());

        assert!(output.contains("Error: No response received from server."));
        assert!(output.contains("[ ] Show USDT, USDC, and SOL"));
        assert!(output.contains("Page 3 of 3"));
        // Volume descending, page 3 holds the three smallest
        assert!(output.contains("TK2 Token"));
        assert!(!output.contains("TK3 Token"));
        assert!(output.contains("24h Volume ▼"));
        assert!(output.contains("Others"));
        assert!(!output.contains("Refreshing data..."));
    }

    #[test]
    fn test_render_dashboard_hides_stablecoins() {
        let tokens = vec![token("SOL", 30.0), token("BONK", 20.0), token("USDC", 10.0)];
        let state = DashboardState {
            phase: Phase::Loading,
            tokens: tokens.clone(),
            ..Default::default()
        };
        let visible = visible_tokens(&tokens, &hidden(), false);
        let mut view = TableView::default();
        view.sort_by(SortColumn::Symbol);

        let output = render_dashboard(&state, &visible, &view, &hidden());

        assert!(output.contains("BONK"));
        assert!(!output.contains("SOL Token"));
        assert!(!output.contains("USDC"));
        assert!(output.contains("Symbol ▼"));
        assert!(output.contains("Refreshing data..."));
    }

    #[test]
    fn test_render_detail() {
        let mut detail = TokenDetail::new(token("BONK", 100.0), Default::default());
        let output = render_detail(&detail);
        assert!(output.contains("BONK Token (BONK)"));
        assert!(output.contains("$1.0000"));
        assert!(output.contains("7-Day Price History"));
        assert!(output.contains("Loading chart data..."));

        detail.chart = ChartState::Ready(vec![
            PricePoint {
                unix_time: 1_728_000_000,
                value: 1.0,
            },
            PricePoint {
                unix_time: 1_728_086_400,
                value: 1.5,
            },
        ]);
        let output = render_detail(&detail);
        assert!(!output.contains("Loading chart data..."));
        assert!(output.contains("▁█"));
        assert!(output.contains("50.00%"));
    }
}
