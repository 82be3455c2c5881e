//! Canonical view state of the waste dashboard.
//!
//! `FilterState` is a plain value; every transition returns a new state.
//! `FilterStore` owns the current value and notifies explicit subscribers
//! (chart, chips, table, URL sync) after each applied transition.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use contracts::dashboards::d410_resource_waste::filter::RESOURCE_FILTER_PREFIX;
use contracts::dashboards::d410_resource_waste::{Filter, FilterKind, SortDirection, TableViewState};

use crate::shared::filter_codec::ViewQuery;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub execution_id: Option<String>,
    /// Insertion order is chip order
    pub filters: Vec<Filter>,
    /// Resource type currently drilled into
    pub current_resource: Option<String>,
    pub table: TableViewState,
}

/// What kind of transition produced a new state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    Filters,
    Execution,
    Table,
    Search,
    Home,
    /// State re-read from the URL; must not be written back
    Restore,
}

impl FilterState {
    /// Rebuilds the state from the URL, enforcing the same invariants as the
    /// user transitions (one resource filter, unique ids).
    pub fn from_query(query: ViewQuery) -> Self {
        let mut state = Self {
            execution_id: query.execution_id,
            ..Self::default()
        };
        for filter in query.filters {
            state = state.add_filter(filter);
        }
        state.table = query.table;
        if !TableViewState::is_valid_rows_per_page(state.table.rows_per_page) {
            state.table.rows_per_page = TableViewState::default().rows_per_page;
        }
        state
    }

    pub fn to_query(&self) -> ViewQuery {
        ViewQuery {
            execution_id: self.execution_id.clone(),
            filters: self.filters.clone(),
            table: self.table.clone(),
        }
    }

    /// Inserts `filter` or replaces the one with the same id in place.
    ///
    /// A resource filter first evicts every `resource:` filter and becomes the
    /// current resource; switching resources starts a fresh table state. A
    /// column filter without values removes that column's filter.
    pub fn add_filter(&self, filter: Filter) -> Self {
        let mut next = self.clone();

        if let Some(name) = filter.resource_name() {
            let name = name.to_string();
            next.filters.retain(|f| !f.id.starts_with(RESOURCE_FILTER_PREFIX));
            next.filters.push(filter);
            if next.current_resource.as_deref() != Some(name.as_str()) {
                next.current_resource = Some(name);
                next.table = TableViewState::default();
            }
            return next;
        }

        if filter.kind == FilterKind::Column && filter.values.is_empty() {
            next.filters.retain(|f| f.id != filter.id);
            return next;
        }

        match next.filters.iter_mut().find(|f| f.id == filter.id) {
            Some(existing) => *existing = filter,
            None => next.filters.push(filter),
        }
        next
    }

    /// Adds `value` to the column's filter, or takes it out when already there;
    /// the last value out removes the filter.
    pub fn toggle_column_value(&self, column: &str, value: &str) -> Self {
        let id = Filter::column(column, Vec::new()).id;
        let mut values = self
            .filters
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.values.clone())
            .unwrap_or_default();
        match values.iter().position(|v| v == value) {
            Some(pos) => {
                values.remove(pos);
            }
            None => values.push(value.to_string()),
        }
        self.add_filter(Filter::column(column, values))
    }

    /// Removes every filter matching `predicate`. Dropping the resource filter
    /// leaves the drill-down and resets the table.
    pub fn remove_filter(&self, predicate: impl Fn(&Filter) -> bool) -> Self {
        let mut next = self.clone();
        let removes_resource = self
            .filters
            .iter()
            .any(|f| predicate(f) && f.resource_name().is_some());

        next.filters.retain(|f| !predicate(f));
        if removes_resource {
            next.current_resource = None;
            next.table = TableViewState::default();
        }
        next
    }

    pub fn set_search_text(&self, text: &str) -> Self {
        let mut next = self.clone();
        if next.table.search_text != text {
            next.table.search_text = text.to_string();
            next.table.page = 0;
        }
        next
    }

    pub fn set_sort(&self, column: &str, direction: SortDirection) -> Self {
        let mut next = self.clone();
        next.table.sort_column = column.to_string();
        next.table.sort_direction = direction;
        next
    }

    pub fn set_page(&self, page: usize) -> Self {
        let mut next = self.clone();
        next.table.page = page;
        next
    }

    /// Values outside {10, 20, 50, 100} are ignored
    pub fn set_rows_per_page(&self, rows: usize) -> Self {
        let mut next = self.clone();
        if TableViewState::is_valid_rows_per_page(rows) {
            next.table.rows_per_page = rows;
        }
        next
    }

    pub fn set_execution(&self, execution_id: Option<String>) -> Self {
        let mut next = self.clone();
        next.execution_id = execution_id.filter(|id| !id.is_empty());
        next
    }

    /// Back to the overview: no drill-down, no resource filters, fresh table
    pub fn goto_home(&self) -> Self {
        let mut next = self.clone();
        next.filters.retain(|f| !f.is_resource());
        next.current_resource = None;
        next.table = TableViewState::default();
        next
    }

    /// Keeps `page` valid after the visible row set shrank
    pub fn clamp_page(&self, row_count: usize) -> Self {
        let mut next = self.clone();
        next.table = self.table.clamped(row_count);
        next
    }
}

pub type SubscriptionId = usize;

type Subscriber = Rc<dyn Fn(&FilterState, StoreChange)>;

/// Single source of truth for chart, chips and table
pub struct FilterStore {
    state: RefCell<FilterState>,
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber)>>,
    next_id: Cell<SubscriptionId>,
    /// Applied but not yet announced states, oldest first
    pending: RefCell<VecDeque<(FilterState, StoreChange)>>,
    notifying: Cell<bool>,
}

impl FilterStore {
    pub fn new(initial: FilterState) -> Self {
        Self {
            state: RefCell::new(initial),
            subscribers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
            pending: RefCell::new(VecDeque::new()),
            notifying: Cell::new(false),
        }
    }

    pub fn snapshot(&self) -> FilterState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self, subscriber: impl Fn(&FilterState, StoreChange) + 'static) -> SubscriptionId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(subscriber)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    /// Applies a transition; subscribers only hear about real changes.
    ///
    /// A transition issued by a subscriber is applied at once but announced
    /// only after every subscriber has seen the current change, so all of
    /// them observe the states in the order they were applied.
    fn apply(&self, change: StoreChange, transition: impl FnOnce(&FilterState) -> FilterState) -> bool {
        let next = {
            let current = self.state.borrow();
            let next = transition(&*current);
            if next == *current {
                return false;
            }
            next
        };
        *self.state.borrow_mut() = next.clone();
        log::debug!(
            "filter_store: {:?} -> {} filters, resource={:?}, page={}",
            change,
            next.filters.len(),
            next.current_resource,
            next.table.page
        );

        self.pending.borrow_mut().push_back((next, change));
        if !self.notifying.replace(true) {
            self.drain();
            self.notifying.set(false);
        }
        true
    }

    fn drain(&self) {
        loop {
            let Some((state, change)) = self.pending.borrow_mut().pop_front() else {
                break;
            };
            let subscribers: Vec<Subscriber> = self
                .subscribers
                .borrow()
                .iter()
                .map(|(_, s)| Rc::clone(s))
                .collect();
            for subscriber in subscribers {
                subscriber(&state, change);
            }
        }
    }

    pub fn add_filter(&self, filter: Filter) -> bool {
        self.apply(StoreChange::Filters, |s| s.add_filter(filter))
    }

    pub fn remove_filter(&self, predicate: impl Fn(&Filter) -> bool) -> bool {
        self.apply(StoreChange::Filters, |s| s.remove_filter(predicate))
    }

    /// Clicking a cell value in the table
    pub fn toggle_column_value(&self, column: &str, value: &str) -> bool {
        self.apply(StoreChange::Filters, |s| s.toggle_column_value(column, value))
    }

    /// Closing a chip
    pub fn remove_filter_by_id(&self, id: &str) -> bool {
        self.remove_filter(|f| f.id == id)
    }

    /// Closing a table column's own filter chip
    pub fn remove_column_filter(&self, column: &str) -> bool {
        let column = Filter::column(column, Vec::new()).column;
        self.remove_filter(|f| f.kind == FilterKind::Column && f.column == column)
    }

    pub fn set_search_text(&self, text: &str) -> bool {
        self.apply(StoreChange::Search, |s| s.set_search_text(text))
    }

    pub fn set_sort(&self, column: &str, direction: SortDirection) -> bool {
        self.apply(StoreChange::Table, |s| s.set_sort(column, direction))
    }

    pub fn set_page(&self, page: usize) -> bool {
        self.apply(StoreChange::Table, |s| s.set_page(page))
    }

    pub fn set_rows_per_page(&self, rows: usize) -> bool {
        self.apply(StoreChange::Table, |s| s.set_rows_per_page(rows))
    }

    pub fn set_execution(&self, execution_id: Option<String>) -> bool {
        self.apply(StoreChange::Execution, |s| s.set_execution(execution_id))
    }

    pub fn goto_home(&self) -> bool {
        self.apply(StoreChange::Home, FilterState::goto_home)
    }

    pub fn clamp_page(&self, row_count: usize) -> bool {
        self.apply(StoreChange::Table, |s| s.clamp_page(row_count))
    }

    /// Replaces the whole state with what the URL says now
    pub fn restore(&self, query: ViewQuery) -> bool {
        self.apply(StoreChange::Restore, |_| FilterState::from_query(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource_filters(state: &FilterState) -> Vec<&Filter> {
        state.filters.iter().filter(|f| f.is_resource()).collect()
    }

    #[test]
    fn test_single_resource_filter() {
        let state = FilterState::default()
            .add_filter(Filter::resource("ec2-instances"))
            .add_filter(Filter::search("prod"))
            .add_filter(Filter::resource("ebs-volumes"));

        let resources = resource_filters(&state);
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].id, "resource:ebs-volumes");
        assert_eq!(state.current_resource.as_deref(), Some("ebs-volumes"));
        assert_eq!(state.filters.len(), 2);
    }

    #[test]
    fn test_resource_change_resets_table() {
        let state = FilterState::default()
            .add_filter(Filter::resource("ec2"))
            .set_page(4)
            .set_sort("PricePerMonth", SortDirection::Asc);

        let same = state.add_filter(Filter::resource("ec2"));
        assert_eq!(same.table.page, 4);

        let other = state.add_filter(Filter::resource("rds"));
        assert_eq!(other.table, TableViewState::default());
    }

    #[test]
    fn test_replace_by_id_keeps_position() {
        let state = FilterState::default()
            .add_filter(Filter::column("Region", vec!["us-east-1".into()]))
            .add_filter(Filter::search("db"))
            .add_filter(Filter::column("Region", vec!["eu-west-1".into()]));

        assert_eq!(state.filters.len(), 2);
        assert_eq!(state.filters[0].values, vec!["eu-west-1".to_string()]);
        assert_eq!(state.filters[1].id, "search:db");
    }

    #[test]
    fn test_empty_column_filter_removes_it() {
        let state = FilterState::default()
            .add_filter(Filter::column("Region", vec!["us-east-1".into()]))
            .add_filter(Filter::column("Region", vec![]));
        assert!(state.filters.is_empty());
    }

    #[test]
    fn test_toggle_column_value_accumulates() {
        let state = FilterState::default()
            .add_filter(Filter::search("db"))
            .toggle_column_value("Status", "Stopped")
            .toggle_column_value("Data.Status", "Error");
        assert_eq!(
            state.filters,
            vec![
                Filter::search("db"),
                Filter::column("Status", vec!["Stopped".into(), "Error".into()]),
            ]
        );
        assert_eq!(state.filters[1].title, "Status: Stopped, Error");

        let state = state.toggle_column_value("Status", "Stopped");
        assert_eq!(state.filters[1].values, vec!["Error".to_string()]);
        let state = state.toggle_column_value("Status", "Error");
        assert_eq!(state.filters, vec![Filter::search("db")]);
    }

    #[test]
    fn test_remove_resource_filter_clears_drilldown() {
        let state = FilterState::default()
            .add_filter(Filter::resource("ec2"))
            .add_filter(Filter::search("x"))
            .set_page(2);

        let next = state.remove_filter(|f| f.id == "resource:ec2");
        assert_eq!(next.current_resource, None);
        assert_eq!(next.table, TableViewState::default());
        assert_eq!(next.filters, vec![Filter::search("x")]);

        let untouched = state.remove_filter(|f| f.id == "search:x");
        assert_eq!(untouched.current_resource.as_deref(), Some("ec2"));
        assert_eq!(untouched.table.page, 2);
    }

    #[test]
    fn test_goto_home() {
        let state = FilterState::default()
            .add_filter(Filter::resource("ec2"))
            .add_filter(Filter::column("Status", vec!["Stopped".into()]))
            .add_filter(Filter::resource("ebs"))
            .set_search_text("vol")
            .goto_home();

        assert!(state.filters.iter().all(|f| !f.id.starts_with("resource")));
        assert_eq!(state.current_resource, None);
        assert_eq!(state.table, TableViewState::default());
        assert_eq!(state.filters.len(), 1);
    }

    #[test]
    fn test_search_resets_page_only_on_change() {
        let state = FilterState::default().set_page(3);
        assert_eq!(state.set_search_text("").table.page, 3);
        assert_eq!(state.set_search_text("abc").table.page, 0);
    }

    #[test]
    fn test_rows_per_page_validated() {
        let state = FilterState::default();
        assert_eq!(state.set_rows_per_page(50).table.rows_per_page, 50);
        assert_eq!(state.set_rows_per_page(33).table.rows_per_page, 20);
    }

    #[test]
    fn test_clamp_page_after_shrink() {
        let state = FilterState::default().set_page(3);
        assert_eq!(state.clamp_page(5).table.page, 0);
    }

    #[test]
    fn test_from_query_enforces_invariants() {
        let query = ViewQuery {
            execution_id: Some("e1".into()),
            filters: vec![
                Filter::resource("ec2"),
                Filter::search("x"),
                Filter::resource("ebs"),
            ],
            table: TableViewState {
                page: 2,
                ..TableViewState::default()
            },
        };
        let state = FilterState::from_query(query);
        assert_eq!(state.current_resource.as_deref(), Some("ebs"));
        assert_eq!(state.filters.len(), 2);
        assert_eq!(state.table.page, 2);
        assert_eq!(state.to_query().execution_id.as_deref(), Some("e1"));
    }

    #[test]
    fn test_store_notifies_subscribers_in_order() {
        let store = FilterStore::new(FilterState::default());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&seen);
        let id = store.subscribe(move |state, change| {
            log.borrow_mut().push((change, state.filters.len()));
        });

        assert!(store.add_filter(Filter::resource("ec2")));
        assert!(store.set_page(1));
        assert!(!store.set_page(1));
        assert!(store.set_search_text("vol"));
        assert!(store.goto_home());

        assert_eq!(
            *seen.borrow(),
            vec![
                (StoreChange::Filters, 1),
                (StoreChange::Table, 1),
                (StoreChange::Search, 1),
                (StoreChange::Home, 0),
            ]
        );

        assert!(store.unsubscribe(id));
        store.add_filter(Filter::resource("rds"));
        assert_eq!(seen.borrow().len(), 4);
    }

    #[test]
    fn test_subscriber_may_issue_transitions() {
        let store = Rc::new(FilterStore::new(FilterState::default()));
        let inner = Rc::downgrade(&store);
        store.subscribe(move |state, change| {
            if change == StoreChange::Table && state.table.page > 0 {
                if let Some(store) = inner.upgrade() {
                    store.clamp_page(0);
                }
            }
        });

        store.add_filter(Filter::resource("ec2"));
        store.set_page(5);
        assert_eq!(store.snapshot().table.page, 0);
    }

    #[test]
    fn test_later_subscribers_end_on_latest_state() {
        let store = Rc::new(FilterStore::new(FilterState::default()));
        let inner = Rc::downgrade(&store);
        store.subscribe(move |state, change| {
            if change == StoreChange::Table && state.table.page > 0 {
                if let Some(store) = inner.upgrade() {
                    store.clamp_page(0);
                }
            }
        });

        let pages = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&pages);
        store.subscribe(move |state, _| log.borrow_mut().push(state.table.page));

        store.set_page(5);
        assert_eq!(store.snapshot().table.page, 0);
        assert_eq!(*pages.borrow(), vec![5, 0]);
    }

    #[test]
    fn test_set_execution_ignores_empty_id() {
        let state = FilterState::default().set_execution(Some("exec-7".into()));
        assert_eq!(state.execution_id.as_deref(), Some("exec-7"));
        assert_eq!(state.set_execution(Some(String::new())).execution_id, None);
    }

    #[test]
    fn test_remove_column_filter() {
        let store = FilterStore::new(FilterState::default());
        store.add_filter(Filter::column("Data.Status", vec!["Stopped".into()]));
        store.add_filter(Filter::search("x"));
        assert!(store.remove_column_filter("Status"));
        assert_eq!(store.snapshot().filters, vec![Filter::search("x")]);
    }
}
