//! Pagination types for paginated responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A page of results plus the bookkeeping the engine turns into
/// `meta` and navigation links.
///
/// The navigation URLs are optional: an absent URL produces a `null`
/// entry in the generated links block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedData {
    /// The items on this page.
    pub data: Value,
    /// Current page number (1-based).
    pub current_page: u64,
    /// Index of the first item on this page, absent when the page is empty.
    #[serde(default)]
    pub from: Option<u64>,
    /// Last page number.
    pub last_page: u64,
    /// Base path of the paginated endpoint.
    pub path: String,
    /// Number of items per page.
    pub per_page: u64,
    /// Index of the last item on this page, absent when the page is empty.
    #[serde(default)]
    pub to: Option<u64>,
    /// Total number of items across all pages.
    pub total: u64,
    /// URL of the first page, if known.
    #[serde(default)]
    pub first_page_url: Option<String>,
    /// URL of the last page, if known.
    #[serde(default)]
    pub last_page_url: Option<String>,
    /// URL of the previous page, absent on the first page.
    #[serde(default)]
    pub prev_page_url: Option<String>,
    /// URL of the next page, absent on the last page.
    #[serde(default)]
    pub next_page_url: Option<String>,
}

impl PaginatedData {
    /// Build a page from items plus totals, deriving the page window and
    /// navigation URLs from `path`.
    pub fn new(data: Value, current_page: u64, per_page: u64, total: u64, path: &str) -> Self {
        let current_page = current_page.max(1);
        let per_page = per_page.max(1);
        let last_page = if total == 0 { 1 } else { total.div_ceil(per_page) };
        let count = data.as_array().map(|items| items.len() as u64).unwrap_or(0);
        let from = (count > 0).then(|| (current_page - 1) * per_page + 1);
        let to = from.map(|start| start + count - 1);
        let page_url = |page: u64| format!("{path}?page={page}");

        Self {
            data,
            current_page,
            from,
            last_page,
            path: path.to_string(),
            per_page,
            to,
            total,
            first_page_url: Some(page_url(1)),
            last_page_url: Some(page_url(last_page)),
            prev_page_url: (current_page > 1).then(|| page_url(current_page - 1)),
            next_page_url: (current_page < last_page).then(|| page_url(current_page + 1)),
        }
    }
}
