use super::{show, ui};
use crate::core::table::{SortColumn, TableView};
use crate::core::{HistoryRange, PriceHistoryProvider};
use crate::dashboard::Dashboard;
use crate::detail::TokenDetail;
use anyhow::{Result, anyhow, bail};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

const HELP: &str = "r refresh | n/p page | s stablecoins | /TEXT filter | sort COL | open N | close | q quit";

/// A command typed at the `watch` prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Refresh,
    NextPage,
    PreviousPage,
    ToggleStablecoins,
    /// An empty filter clears it.
    Filter(String),
    Sort(SortColumn),
    /// 1-based row on the current page.
    Open(usize),
    Close,
    Quit,
}

pub fn parse_input(line: &str) -> Result<Input> {
    let line = line.trim();
    if let Some(filter) = line.strip_prefix('/') {
        return Ok(Input::Filter(filter.trim().to_string()));
    }

    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let arg = parts.next();

    let input = match (command, arg) {
        ("r" | "refresh", None) => Input::Refresh,
        ("n" | "next", None) => Input::NextPage,
        ("p" | "prev", None) => Input::PreviousPage,
        ("s", None) => Input::ToggleStablecoins,
        ("sort", Some(column)) => Input::Sort(column.parse()?),
        ("open", Some(row)) => Input::Open(
            row.parse()
                .map_err(|_| anyhow!("Invalid row number: {}", row))?,
        ),
        ("close", None) => Input::Close,
        ("q" | "quit", None) => Input::Quit,
        ("", _) => bail!("Empty command"),
        _ => bail!("Unknown command: {}", line),
    };
    Ok(input)
}

struct Session {
    dashboard: Arc<Dashboard>,
    history: Arc<dyn PriceHistoryProvider>,
    range: HistoryRange,
    view: TableView,
    detail: Option<TokenDetail>,
    message: Option<String>,
    detail_tx: mpsc::UnboundedSender<TokenDetail>,
}

impl Session {
    fn new(
        dashboard: Arc<Dashboard>,
        history: Arc<dyn PriceHistoryProvider>,
        view: TableView,
        range: HistoryRange,
    ) -> (Self, mpsc::UnboundedReceiver<TokenDetail>) {
        let (detail_tx, detail_rx) = mpsc::unbounded_channel();
        let session = Self {
            dashboard,
            history,
            range,
            view,
            detail: None,
            message: None,
            detail_tx,
        };
        (session, detail_rx)
    }

    fn total_pages(&self) -> usize {
        self.view.project(&self.dashboard.visible_tokens()).total_pages
    }

    fn handle(&mut self, input: Input) {
        match input {
            Input::Refresh => {
                let dashboard = Arc::clone(&self.dashboard);
                tokio::spawn(async move { dashboard.refresh().await });
            }
            Input::NextPage => {
                let total_pages = self.total_pages();
                self.view.next_page(total_pages);
            }
            Input::PreviousPage => {
                let total_pages = self.total_pages();
                self.view.previous_page(total_pages);
            }
            Input::ToggleStablecoins => {
                self.dashboard.toggle_show_stablecoins();
            }
            Input::Filter(filter) => self.view.set_filter(&filter),
            Input::Sort(column) => self.view.sort_by(column),
            Input::Open(row) => self.open(row),
            Input::Close => {
                self.view.close_detail();
                self.detail = None;
            }
            Input::Quit => {}
        }
    }

    fn open(&mut self, row: usize) {
        let visible = self.dashboard.visible_tokens();
        let page = self.view.project(&visible);
        let Some(token) = row.checked_sub(1).and_then(|i| page.rows.get(i)) else {
            self.message = Some(format!("No row {row} on this page"));
            return;
        };

        let mut detail = TokenDetail::new((*token).clone(), self.range);
        self.view.select(&detail.token.address);
        self.detail = Some(detail.clone());

        let history = Arc::clone(&self.history);
        let tx = self.detail_tx.clone();
        tokio::spawn(async move {
            detail.load_chart(history.as_ref()).await;
            // The receiver is gone once the session ended
            let _ = tx.send(detail);
        });
    }

    fn apply_detail(&mut self, loaded: TokenDetail) {
        // Charts of closed or replaced detail views are dropped
        if self.view.selected() == Some(loaded.token.address.as_str()) {
            self.detail = Some(loaded);
        }
    }

    fn redraw(&self) {
        let term = console::Term::stdout();
        if let Err(e) = term.clear_screen() {
            debug!("Failed to clear screen: {}", e);
        }

        let state = self.dashboard.state();
        println!(
            "{}",
            show::render_dashboard(
                &state,
                &self.dashboard.visible_tokens(),
                &self.view,
                self.dashboard.hidden_symbols()
            )
        );
        if let Some(detail) = &self.detail {
            println!("{}\n{}", ui::separator(), show::render_detail(detail));
        }
        if let Some(message) = &self.message {
            println!("{}", ui::style_text(message, ui::StyleType::Error));
        }
        println!("{}", ui::style_text(HELP, ui::StyleType::Subtle));
    }
}

/// Runs the live dashboard until `q`, Ctrl-C or the end of input.
pub async fn run(
    dashboard: Arc<Dashboard>,
    history: Arc<dyn PriceHistoryProvider>,
    view: TableView,
    refresh_interval: Duration,
    range: HistoryRange,
) -> Result<()> {
    let mut state_rx = dashboard.subscribe();

    let spinner = ui::new_spinner("Loading token data...");
    let timer = dashboard.mount(refresh_interval).await;
    spinner.finish_and_clear();
    info!("Watching token data, refresh every {}s", refresh_interval.as_secs());

    let (mut session, mut detail_rx) = Session::new(dashboard, history, view, range);
    session.redraw();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                session.message = None;
                match line? {
                    Some(line) => match parse_input(&line) {
                        Ok(Input::Quit) => break,
                        Ok(input) => {
                            debug!(?input, "Handling input");
                            session.handle(input);
                        }
                        Err(e) => session.message = Some(e.to_string()),
                    },
                    None => {
                        debug!("Input closed, waiting for Ctrl-C");
                        stdin_open = false;
                    }
                }
            }
            Some(loaded) = detail_rx.recv() => session.apply_detail(loaded),
            _ = tokio::signal::ctrl_c() => break,
        }
        session.redraw();
    }

    drop(timer);
    info!("Stopped watching");
    Ok(())
}
