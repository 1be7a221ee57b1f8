//! Filter, sort and paginate state of the token table.
//!
//! The projection is recomputed from the full token list on every render:
//! filter by name or symbol, stable sort on the selected column, then slice
//! out the current page.

use crate::core::token::Token;
use anyhow::{Result, anyhow};
use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Name,
    Symbol,
    Price,
    Volume24h,
    Change24h,
    Change7d,
    MarketCap,
    Liquidity,
}

impl SortColumn {
    pub const ALL: [SortColumn; 8] = [
        SortColumn::Name,
        SortColumn::Symbol,
        SortColumn::Price,
        SortColumn::Volume24h,
        SortColumn::Change24h,
        SortColumn::Change7d,
        SortColumn::MarketCap,
        SortColumn::Liquidity,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::Name => "Name",
            SortColumn::Symbol => "Symbol",
            SortColumn::Price => "Price",
            SortColumn::Volume24h => "24h Volume",
            SortColumn::Change24h => "24h Change",
            SortColumn::Change7d => "7d Change",
            SortColumn::MarketCap => "Market Cap",
            SortColumn::Liquidity => "Liquidity",
        }
    }

    fn compare(&self, a: &Token, b: &Token, direction: SortDirection) -> Ordering {
        let numeric = |x: Option<f64>, y: Option<f64>| match (x, y) {
            (Some(x), Some(y)) => direction.apply(x.total_cmp(&y)),
            // Missing values go last in either direction
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };

        match self {
            SortColumn::Name => direction.apply(a.name.cmp(&b.name)),
            SortColumn::Symbol => direction.apply(a.symbol.cmp(&b.symbol)),
            SortColumn::Price => numeric(a.price, b.price),
            SortColumn::Volume24h => numeric(Some(a.volume_24h_usd), Some(b.volume_24h_usd)),
            SortColumn::Change24h => numeric(a.change_24h_percent, b.change_24h_percent),
            SortColumn::Change7d => numeric(a.change_7d_percent, b.change_7d_percent),
            SortColumn::MarketCap => numeric(Some(a.market_cap), Some(b.market_cap)),
            SortColumn::Liquidity => numeric(Some(a.liquidity), Some(b.liquidity)),
        }
    }
}

impl Display for SortColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SortColumn::Name => "name",
                SortColumn::Symbol => "symbol",
                SortColumn::Price => "price",
                SortColumn::Volume24h => "volume",
                SortColumn::Change24h => "change24h",
                SortColumn::Change7d => "change7d",
                SortColumn::MarketCap => "mc",
                SortColumn::Liquidity => "liquidity",
            }
        )
    }
}

impl FromStr for SortColumn {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(SortColumn::Name),
            "symbol" => Ok(SortColumn::Symbol),
            "price" => Ok(SortColumn::Price),
            "volume" | "v24husd" => Ok(SortColumn::Volume24h),
            "change24h" | "v24hchangepercent" => Ok(SortColumn::Change24h),
            "change7d" | "v7dchangepercent" => Ok(SortColumn::Change7d),
            "mc" | "marketcap" => Ok(SortColumn::MarketCap),
            "liquidity" => Ok(SortColumn::Liquidity),
            _ => Err(anyhow!(
                "Invalid sort column: {} (expected one of: {})",
                s,
                SortColumn::ALL.map(|c| c.to_string()).join(", ")
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// One page of the projected token list.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePage<'a> {
    pub rows: Vec<&'a Token>,
    /// Current page, clamped to the available range (1-based).
    pub page: usize,
    pub total_pages: usize,
    /// Number of tokens matching the filter.
    pub total_matches: usize,
}

impl TablePage<'_> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub sort_column: SortColumn,
    pub sort_direction: SortDirection,
    pub filter: String,
    page: usize,
    page_size: usize,
    selected: Option<String>,
}

impl Default for TableView {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl TableView {
    pub fn new(page_size: usize) -> Self {
        Self {
            sort_column: SortColumn::Volume24h,
            sort_direction: SortDirection::Descending,
            filter: String::new(),
            page: 1,
            page_size: page_size.max(1),
            selected: None,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Same column flips direction; a new column starts descending.
    pub fn sort_by(&mut self, column: SortColumn) {
        if column == self.sort_column {
            self.sort_direction = self.sort_direction.flip();
        } else {
            self.sort_column = column;
            self.sort_direction = SortDirection::Descending;
        }
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
    }

    /// Jumps to `page`; out of range values are clamped on the next projection.
    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Page shown for a list of `total_pages` pages.
    fn current_page(&self, total_pages: usize) -> usize {
        self.page.clamp(1, total_pages.max(1))
    }

    /// Advances one page unless already on the last one.
    pub fn next_page(&mut self, total_pages: usize) {
        let current = self.current_page(total_pages);
        self.page = if current < total_pages { current + 1 } else { current };
    }

    /// Goes back one page unless already on the first one.
    pub fn previous_page(&mut self, total_pages: usize) {
        let current = self.current_page(total_pages);
        self.page = current.saturating_sub(1).max(1);
    }

    pub fn select(&mut self, address: &str) {
        self.selected = Some(address.to_string());
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn matches(&self, token: &Token) -> bool {
        if self.filter.is_empty() {
            return true;
        }
        let needle = self.filter.to_lowercase();
        token.name.to_lowercase().contains(&needle) || token.symbol.to_lowercase().contains(&needle)
    }

    /// Filtered and sorted tokens, before pagination.
    pub fn sorted<'a>(&self, tokens: &'a [Token]) -> Vec<&'a Token> {
        let mut rows: Vec<&Token> = tokens.iter().filter(|t| self.matches(t)).collect();
        // `sort_by` is stable, ties keep the incoming order
        rows.sort_by(|a, b| self.sort_column.compare(a, b, self.sort_direction));
        rows
    }

    pub fn project<'a>(&self, tokens: &'a [Token]) -> TablePage<'a> {
        let sorted = self.sorted(tokens);
        let total_matches = sorted.len();
        let total_pages = total_matches.div_ceil(self.page_size);
        let page = self.current_page(total_pages);

        let rows = sorted
            .into_iter()
            .skip((page - 1) * self.page_size)
            .take(self.page_size)
            .collect();

        TablePage {
            rows,
            page,
            total_pages,
            total_matches,
        }
    }

    /// Looks up the selected token in `tokens`.
    pub fn selected_token<'a>(&self, tokens: &'a [Token]) -> Option<&'a Token> {
        let address = self.selected.as_deref()?;
        tokens.iter().find(|t| t.address == address)
    }
}
