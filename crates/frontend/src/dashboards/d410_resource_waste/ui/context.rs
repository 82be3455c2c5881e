use std::cell::RefCell;
use std::rc::Rc;

use contracts::dashboards::d410_resource_waste::{ColumnSchema, Resource};
use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;

use crate::dashboards::d410_resource_waste::projector::TableView;
use crate::dashboards::d410_resource_waste::report::ReportSubmitter;
use crate::dashboards::d410_resource_waste::store::{FilterState, FilterStore};
use crate::shared::config::DashboardConfig;
use crate::shared::history::CookieJar;

/// Handles shared by every part of the waste dashboard.
///
/// Browser-bound objects live in local stored values; views only read the
/// `state` snapshot and the memos derived from it.
#[derive(Clone, Copy)]
pub struct DashboardContext {
    pub store: StoredValue<Rc<FilterStore>, LocalStorage>,
    /// Last snapshot published by the store
    pub state: RwSignal<FilterState>,
    pub resources: RwSignal<Vec<Resource>>,
    pub loading: RwSignal<bool>,
    pub load_error: RwSignal<Option<String>>,
    pub current: Memo<Option<Resource>>,
    pub schema: Memo<ColumnSchema>,
    /// Columns unchecked in the table; reset when the resource changes
    pub hidden_columns: RwSignal<Vec<String>>,
    /// `schema` minus `hidden_columns`; what the table shows and the report lists
    pub visible_schema: Memo<ColumnSchema>,
    /// `None` until a resource is selected
    pub table_view: Memo<Option<TableView>>,
    pub submitter: StoredValue<Rc<RefCell<ReportSubmitter>>, LocalStorage>,
    pub cookies: StoredValue<Rc<CookieJar>, LocalStorage>,
    pub config: StoredValue<DashboardConfig>,
}

impl DashboardContext {
    pub fn store(&self) -> Rc<FilterStore> {
        self.store.get_value()
    }
}

pub fn use_dashboard() -> DashboardContext {
    use_context::<DashboardContext>().expect("DashboardContext not found")
}
