//! Address bar and cookie access.
//!
//! `HistoryStore` is the only writer of the URL. It keeps the last known
//! [`ViewQuery`], merges partial updates into it and re-encodes the result
//! with [`filter_codec`]. Browser APIs sit behind small traits so the rest of
//! the dashboard can run against in-memory backends.

use std::cell::{Cell, RefCell};

use chrono::{Duration, Utc};
use contracts::dashboards::d410_resource_waste::{Filter, TableViewState};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

use super::filter_codec::{self, ViewQuery};

/// Whether a URL write creates a back/forward entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    Push,
    Replace,
}

pub trait LocationBackend {
    /// Current query string, with or without the leading `?`
    fn query(&self) -> String;
    fn write_query(&self, query: &str, mode: HistoryMode);
}

pub trait CookieBackend {
    /// Everything visible in `document.cookie`
    fn cookie_string(&self) -> String;
    fn write_cookie(&self, cookie: &str);
}

/// Partial update of the URL state; `None` keeps the last known value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryPatch {
    pub execution_id: Option<Option<String>>,
    pub filters: Option<Vec<Filter>>,
    pub table: Option<TableViewState>,
}

impl HistoryPatch {
    pub fn filters(filters: Vec<Filter>) -> Self {
        Self {
            filters: Some(filters),
            ..Self::default()
        }
    }

    pub fn table(table: TableViewState) -> Self {
        Self {
            table: Some(table),
            ..Self::default()
        }
    }

    pub fn full(query: ViewQuery) -> Self {
        Self {
            execution_id: Some(query.execution_id),
            filters: Some(query.filters),
            table: Some(query.table),
        }
    }

    fn apply(self, query: &mut ViewQuery) {
        if let Some(execution_id) = self.execution_id {
            query.execution_id = execution_id;
        }
        if let Some(filters) = self.filters {
            query.filters = filters;
        }
        if let Some(table) = self.table {
            query.table = table;
        }
    }
}

pub struct HistoryStore<L: LocationBackend = BrowserLocation> {
    location: L,
    last: RefCell<ViewQuery>,
}

impl<L: LocationBackend> HistoryStore<L> {
    pub fn new(location: L) -> Self {
        Self {
            location,
            last: RefCell::new(ViewQuery::default()),
        }
    }

    /// Reads the URL once at startup
    pub fn load(&self) -> ViewQuery {
        let query = filter_codec::decode(&self.location.query());
        log::debug!("history: loaded {:?}", query);
        *self.last.borrow_mut() = query.clone();
        query
    }

    /// Re-reads the URL after back/forward navigation; never writes
    pub fn restore(&self) -> ViewQuery {
        let query = filter_codec::decode(&self.location.query());
        log::debug!("history: restored {:?}", query);
        *self.last.borrow_mut() = query.clone();
        query
    }

    /// Merges `patch` into the last known state and writes the URL.
    ///
    /// Returns `false` when the encoded query did not change.
    pub fn push(&self, patch: HistoryPatch, mode: HistoryMode) -> bool {
        let next = {
            let mut last = self.last.borrow_mut();
            patch.apply(&mut last);
            last.clone()
        };

        let encoded = filter_codec::encode(&next);
        // Hand-written URLs may spell the same state differently
        let current = filter_codec::encode(&filter_codec::decode(&self.location.query()));
        if current == encoded {
            return false;
        }

        log::debug!("history: {:?} `{}`", mode, encoded);
        self.location.write_query(&encoded, mode);
        true
    }

    pub fn last(&self) -> ViewQuery {
        self.last.borrow().clone()
    }
}

/// Cookie helpers; values are percent-encoded and scoped to `path=/`
pub struct CookieJar<C: CookieBackend = BrowserCookies> {
    backend: C,
}

impl<C: CookieBackend> CookieJar<C> {
    pub fn new(backend: C) -> Self {
        Self { backend }
    }

    pub fn set_cookie(&self, name: &str, value: &str, ttl_days: u32) {
        let expires = Utc::now() + Duration::days(i64::from(ttl_days));
        self.backend.write_cookie(&format!(
            "{}={};expires={};max-age={};path=/",
            name,
            urlencoding::encode(value),
            expires.format("%a, %d %b %Y %H:%M:%S GMT"),
            u64::from(ttl_days) * 24 * 60 * 60,
        ));
    }

    /// `None` when the cookie is missing or unreadable
    pub fn get_cookie(&self, name: &str) -> Option<String> {
        let all = self.backend.cookie_string();
        let raw = all
            .split(';')
            .filter_map(|part| part.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)?;

        match urlencoding::decode(raw) {
            Ok(value) => Some(value.into_owned()),
            Err(e) => {
                log::debug!("history: unreadable cookie `{}`: {}", name, e);
                None
            }
        }
    }

    pub fn delete_cookie(&self, name: &str) {
        self.backend.write_cookie(&format!(
            "{}=;expires=Thu, 01 Jan 1970 00:00:00 GMT;max-age=0;path=/",
            name
        ));
    }
}

/// Generation counter behind the free-text search debounce.
///
/// Each keystroke takes a ticket; after the quiet period only the newest
/// ticket is still current and gets pushed.
#[derive(Debug, Default)]
pub struct SearchDebounce {
    generation: Cell<u64>,
}

impl SearchDebounce {
    pub fn touch(&self) -> u64 {
        let next = self.generation.get().wrapping_add(1);
        self.generation.set(next);
        next
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.generation.get() == ticket
    }

    /// Waits `delay_ms` and tells whether `ticket` survived
    pub async fn settle(&self, ticket: u64, delay_ms: u32) -> bool {
        gloo_timers::future::TimeoutFuture::new(delay_ms).await;
        self.is_current(ticket)
    }
}

/// `window.location` + `window.history`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserLocation;

impl LocationBackend for BrowserLocation {
    fn query(&self) -> String {
        web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default()
    }

    fn write_query(&self, query: &str, mode: HistoryMode) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let new_url = if query.is_empty() {
            window.location().pathname().unwrap_or_else(|_| "/".to_string())
        } else {
            format!("?{}", query)
        };
        let Ok(history) = window.history() else {
            return;
        };
        let result = match mode {
            HistoryMode::Push => history.push_state_with_url(&JsValue::NULL, "", Some(&new_url)),
            HistoryMode::Replace => history.replace_state_with_url(&JsValue::NULL, "", Some(&new_url)),
        };
        if let Err(e) = result {
            log::warn!("history: failed to write url: {:?}", e);
        }
    }
}

/// `document.cookie`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserCookies;

impl BrowserCookies {
    fn document() -> Option<web_sys::HtmlDocument> {
        web_sys::window()?
            .document()?
            .dyn_into::<web_sys::HtmlDocument>()
            .ok()
    }
}

impl CookieBackend for BrowserCookies {
    fn cookie_string(&self) -> String {
        Self::document()
            .and_then(|d| d.cookie().ok())
            .unwrap_or_default()
    }

    fn write_cookie(&self, cookie: &str) {
        if let Some(document) = Self::document() {
            if let Err(e) = document.set_cookie(cookie) {
                log::warn!("history: failed to write cookie: {:?}", e);
            }
        }
    }
}

/// Calls `on_navigate` on every back/forward navigation
pub fn listen_popstate(on_navigate: impl Fn() + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let handler = Closure::wrap(Box::new(move |_: web_sys::Event| {
        on_navigate();
    }) as Box<dyn FnMut(_)>);

    let _ = window.add_event_listener_with_callback("popstate", handler.as_ref().unchecked_ref());
    handler.forget();
}

/// In-memory address bar
#[derive(Debug, Default)]
pub struct MemoryLocation {
    query: RefCell<String>,
    writes: RefCell<Vec<(HistoryMode, String)>>,
}

impl MemoryLocation {
    pub fn with_query(query: &str) -> Self {
        Self {
            query: RefCell::new(query.to_string()),
            writes: RefCell::new(Vec::new()),
        }
    }

    /// Simulates the user editing the address bar or navigating back
    pub fn set_query(&self, query: &str) {
        *self.query.borrow_mut() = query.to_string();
    }

    pub fn writes(&self) -> Vec<(HistoryMode, String)> {
        self.writes.borrow().clone()
    }
}

impl LocationBackend for MemoryLocation {
    fn query(&self) -> String {
        self.query.borrow().clone()
    }

    fn write_query(&self, query: &str, mode: HistoryMode) {
        *self.query.borrow_mut() = query.to_string();
        self.writes.borrow_mut().push((mode, query.to_string()));
    }
}

/// In-memory cookie store understanding `max-age=0` deletion
#[derive(Debug, Default)]
pub struct MemoryCookies {
    jar: RefCell<Vec<(String, String)>>,
}

impl CookieBackend for MemoryCookies {
    fn cookie_string(&self) -> String {
        self.jar
            .borrow()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn write_cookie(&self, cookie: &str) {
        let mut parts = cookie.split(';');
        let Some((name, value)) = parts.next().and_then(|p| p.split_once('=')) else {
            return;
        };
        let expired = parts.any(|attr| attr.trim() == "max-age=0");

        let mut jar = self.jar.borrow_mut();
        jar.retain(|(k, _)| k != name);
        if !expired {
            jar.push((name.to_string(), value.to_string()));
        }
    }
}

impl<L: LocationBackend> LocationBackend for std::rc::Rc<L> {
    fn query(&self) -> String {
        (**self).query()
    }

    fn write_query(&self, query: &str, mode: HistoryMode) {
        (**self).write_query(query, mode)
    }
}

impl<C: CookieBackend> CookieBackend for std::rc::Rc<C> {
    fn cookie_string(&self) -> String {
        (**self).cookie_string()
    }

    fn write_cookie(&self, cookie: &str) {
        (**self).write_cookie(cookie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_load_reads_url_once() {
        let location = Rc::new(MemoryLocation::with_query("?filters=resource:ebs&page=2"));
        let history = HistoryStore::new(location.clone());
        let q = history.load();
        assert_eq!(q.filters, vec![Filter::resource("ebs")]);
        assert_eq!(q.table.page, 2);
        assert!(location.writes().is_empty());
    }

    #[test]
    fn test_push_merges_into_last_known_state() {
        let location = Rc::new(MemoryLocation::with_query("executionId=e1&filters=resource:ebs"));
        let history = HistoryStore::new(location.clone());
        history.load();

        let table = TableViewState {
            page: 3,
            ..TableViewState::default()
        };
        assert!(history.push(HistoryPatch::table(table), HistoryMode::Replace));
        assert_eq!(
            location.writes(),
            vec![(
                HistoryMode::Replace,
                "executionId=e1&filters=resource%3Aebs&page=3".to_string()
            )]
        );

        assert!(history.push(HistoryPatch::filters(vec![]), HistoryMode::Push));
        assert_eq!(location.query(), "executionId=e1&page=3");
    }

    #[test]
    fn test_unchanged_query_is_not_written() {
        let location = Rc::new(MemoryLocation::with_query("?filters=resource:ebs"));
        let history = HistoryStore::new(location.clone());
        let q = history.load();
        assert!(!history.push(HistoryPatch::full(q), HistoryMode::Push));
        assert!(location.writes().is_empty());
    }

    #[test]
    fn test_restore_picks_up_navigation() {
        let location = Rc::new(MemoryLocation::with_query("filters=resource:ebs"));
        let history = HistoryStore::new(location.clone());
        history.load();
        location.set_query("filters=resource:rds");
        assert_eq!(history.restore().filters, vec![Filter::resource("rds")]);
        assert_eq!(history.last().filters, vec![Filter::resource("rds")]);
    }

    #[test]
    fn test_cookie_helpers() {
        let jar = CookieJar::new(MemoryCookies::default());
        assert_eq!(jar.get_cookie("toEmails"), None);

        jar.set_cookie("toEmails", "a@example.com, b@example.com", 7);
        jar.set_cookie("other", "1", 1);
        assert_eq!(
            jar.get_cookie("toEmails").as_deref(),
            Some("a@example.com, b@example.com")
        );

        jar.delete_cookie("toEmails");
        assert_eq!(jar.get_cookie("toEmails"), None);
        assert_eq!(jar.get_cookie("other").as_deref(), Some("1"));
    }

    #[test]
    fn test_cookie_name_must_match_exactly() {
        let backend = MemoryCookies::default();
        backend.write_cookie("xtoEmails=wrong;path=/");
        backend.write_cookie("bad=%E0%A4%A;path=/");
        let jar = CookieJar::new(backend);
        assert_eq!(jar.get_cookie("toEmails"), None);
        assert_eq!(jar.get_cookie("bad"), None);
    }

    #[test]
    fn test_search_debounce_keeps_newest_ticket() {
        let debounce = SearchDebounce::default();
        let first = debounce.touch();
        let second = debounce.touch();
        assert!(!debounce.is_current(first));
        assert!(debounce.is_current(second));
    }
}
