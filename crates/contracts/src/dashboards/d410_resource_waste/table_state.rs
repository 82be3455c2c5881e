use serde::{Deserialize, Serialize};

pub const ROWS_PER_PAGE_OPTIONS: [usize; 4] = [10, 20, 50, 100];
pub const DEFAULT_ROWS_PER_PAGE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Paging, sorting and search of the per-resource table.
///
/// One instance exists per selected resource; it is replaced, never merged,
/// when the selection changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableViewState {
    pub page: usize,
    pub rows_per_page: usize,
    /// Empty when the table is unsorted
    pub sort_column: String,
    pub sort_direction: SortDirection,
    pub search_text: String,
}

impl Default for TableViewState {
    fn default() -> Self {
        Self {
            page: 0,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            sort_column: String::new(),
            sort_direction: SortDirection::Desc,
            search_text: String::new(),
        }
    }
}

impl TableViewState {
    pub fn is_valid_rows_per_page(rows: usize) -> bool {
        ROWS_PER_PAGE_OPTIONS.contains(&rows)
    }

    /// Number of pages for `row_count` rows; at least one page
    pub fn total_pages(&self, row_count: usize) -> usize {
        let per_page = self.rows_per_page.max(1);
        row_count.div_ceil(per_page).max(1)
    }

    pub fn last_page(&self, row_count: usize) -> usize {
        self.total_pages(row_count) - 1
    }

    /// Same state with `page` inside `[0, last_page(row_count)]`
    pub fn clamped(&self, row_count: usize) -> Self {
        let mut next = self.clone();
        next.page = self.page.min(self.last_page(row_count));
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let st = TableViewState::default();
        assert_eq!(st.page, 0);
        assert_eq!(st.rows_per_page, 20);
        assert_eq!(st.sort_direction, SortDirection::Desc);
    }

    #[test]
    fn test_clamp_to_last_page() {
        let st = TableViewState {
            page: 3,
            ..TableViewState::default()
        };
        assert_eq!(st.clamped(5).page, 0);
        assert_eq!(st.clamped(0).page, 0);
        assert_eq!(st.clamped(41).page, 2);
        assert_eq!(st.clamped(1000).page, 3);
    }

    #[test]
    fn test_total_pages() {
        let st = TableViewState {
            rows_per_page: 10,
            ..TableViewState::default()
        };
        assert_eq!(st.total_pages(0), 1);
        assert_eq!(st.total_pages(10), 1);
        assert_eq!(st.total_pages(11), 2);
    }

    #[test]
    fn test_sort_direction_parse() {
        assert_eq!(SortDirection::parse("asc"), Some(SortDirection::Asc));
        assert_eq!(SortDirection::parse("ASC"), None);
        assert_eq!(SortDirection::Asc.toggled(), SortDirection::Desc);
    }
}
