use std::cell::RefCell;
use std::rc::Rc;

use contracts::dashboards::d410_resource_waste::{ColumnSchema, Resource};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::dashboards::d410_resource_waste::api;
use crate::dashboards::d410_resource_waste::history_sync::HistorySync;
use crate::dashboards::d410_resource_waste::projector::{project_table_columns, TableView};
use crate::dashboards::d410_resource_waste::report::ReportSubmitter;
use crate::dashboards::d410_resource_waste::store::{FilterState, FilterStore};
use crate::shared::config::load_config;
use crate::shared::history::{listen_popstate, BrowserCookies, BrowserLocation, CookieJar, HistoryStore};
use crate::shared::schema_inference::{DatasetIdentity, SchemaCache};

use super::context::DashboardContext;
use super::execution_picker::ExecutionPicker;
use super::filter_bar::FilterBar;
use super::report_toolbar::ReportToolbar;
use super::resource_table::ResourceTable;
use super::resources_chart::ResourcesChart;
use super::resources_list::ResourcesList;
use super::statistics_bar::StatisticsBar;

/// Resource waste dashboard: chart, chips and drill-down table over one scan
#[component]
pub fn ResourceWasteDashboard() -> impl IntoView {
    let config = load_config();

    // Initial view comes from the address bar
    let history = HistoryStore::new(BrowserLocation);
    let initial = FilterState::from_query(history.load());
    log::debug!(
        "d410: initial view execution={:?} filters={}",
        initial.execution_id,
        initial.filters.len()
    );

    let store = Rc::new(FilterStore::new(initial.clone()));
    let sync = Rc::new(HistorySync::new(history));
    let state = RwSignal::new(initial);

    store.subscribe(move |next, _| state.set(next.clone()));

    // Store -> URL; search text waits for the quiet period
    let debounce_ms = config.history.search_debounce_ms;
    {
        let sync = Rc::clone(&sync);
        let weak_store = Rc::downgrade(&store);
        store.subscribe(move |next, change| {
            let Some(ticket) = sync.on_change(next, change) else {
                return;
            };
            let sync = Rc::clone(&sync);
            let weak_store = weak_store.clone();
            spawn_local(async move {
                if !sync.debounce().settle(ticket, debounce_ms).await {
                    return;
                }
                if let Some(store) = weak_store.upgrade() {
                    sync.flush(ticket, &store.snapshot());
                }
            });
        });
    }

    // URL -> store on back/forward
    {
        let sync = Rc::clone(&sync);
        let weak_store = Rc::downgrade(&store);
        listen_popstate(move || {
            let query = sync.history().restore();
            if let Some(store) = weak_store.upgrade() {
                store.restore(query);
            }
        });
    }

    let cookies = Rc::new(CookieJar::new(BrowserCookies));
    let mut submitter = ReportSubmitter::new(&config.report, &config.notifications);
    submitter.prefill(&cookies);

    // Data state
    let resources = RwSignal::new(Vec::<Resource>::new());
    let loading = RwSignal::new(false);
    let load_error = RwSignal::new(None::<String>);
    let execution_id = Memo::new(move |_| state.with(|s| s.execution_id.clone()));

    let api_config = config.api.clone();
    Effect::new(move |_| {
        let execution_id = execution_id.get();
        let api_config = api_config.clone();
        loading.set(true);
        load_error.set(None);

        spawn_local(async move {
            match api::fetch_resources(&api_config, execution_id.as_deref()).await {
                Ok(data) => {
                    log::debug!("d410: loaded {} resources", data.len());
                    resources.set(data);
                }
                Err(e) => {
                    log::error!("d410: failed to load resources: {}", e);
                    resources.set(Vec::new());
                    load_error.set(Some(e));
                }
            }
            loading.set(false);
        });
    });

    let current = Memo::new(move |_| {
        let name = state.with(|s| s.current_resource.clone())?;
        resources.with(|rs| rs.iter().find(|r| r.resource_name == name).cloned())
    });

    let schema_cache = StoredValue::new(SchemaCache::default());
    let schema = Memo::new(move |_| {
        let execution_id = state.with(|s| s.execution_id.clone());
        current.with(|resource| {
            let Some(resource) = resource else {
                return ColumnSchema::default();
            };
            let identity = DatasetIdentity {
                execution_id,
                resource_name: resource.resource_name.clone(),
                record_count: resource.data.len(),
            };
            schema_cache
                .try_update_value(|cache| cache.get_or_infer(identity, &resource.data).clone())
                .unwrap_or_default()
        })
    });

    // Every column is checked again for a new dataset
    let hidden_columns = RwSignal::new(Vec::<String>::new());
    let current_name = Memo::new(move |_| state.with(|s| s.current_resource.clone()));
    Effect::new(move |_| {
        current_name.track();
        hidden_columns.set(Vec::new());
    });
    let visible_schema = Memo::new(move |_| {
        schema.with(|columns| hidden_columns.with(|hidden| columns.without(hidden)))
    });

    let table_view = Memo::new(move |_| {
        current.with(|resource| {
            resource.as_ref().map(|resource| {
                schema.with(|columns| {
                    visible_schema.with(|visible| {
                        state.with(|s| project_table_columns(resource, &s.filters, &s.table, columns, visible))
                    })
                })
            })
        })
    });

    let ctx = DashboardContext {
        store: StoredValue::new_local(store),
        state,
        resources,
        loading,
        load_error,
        current,
        schema,
        hidden_columns,
        visible_schema,
        table_view,
        submitter: StoredValue::new_local(Rc::new(RefCell::new(submitter))),
        cookies: StoredValue::new_local(cookies),
        config: StoredValue::new(config),
    };
    provide_context(ctx);

    // Keep the stored page inside the visible rows
    Effect::new(move |_| {
        let Some(info) = table_view.with(|view| view.as_ref().and_then(TableView::page_info)) else {
            return;
        };
        if info.page != state.with(|s| s.table.page) {
            ctx.store().clamp_page(info.total_rows);
        }
    });

    view! {
        <div id="d410_resource_waste--dashboard" class="d410-dashboard" style="padding: 16px; display: flex; flex-direction: column; gap: 12px;">
            <div style="display: flex; align-items: center; justify-content: space-between; gap: 12px; flex-wrap: wrap;">
                <h2 style="margin: 0; font-size: 1.25rem; font-weight: 600;">"Resource Waste"</h2>
                <div style="display: flex; align-items: center; gap: 8px;">
                    <ExecutionPicker />
                    <ReportToolbar />
                </div>
            </div>

            <StatisticsBar />
            <FilterBar />

            // The table shows its own loading state
            {move || {
                if loading.get() && state.with(|s| s.current_resource.is_none()) {
                    view! {
                        <div class="d410-loading">
                            <span>"Loading resources..."</span>
                        </div>
                    }.into_any()
                } else {
                    view! { <></> }.into_any()
                }
            }}

            {move || {
                if let Some(err) = load_error.get() {
                    view! {
                        <div class="d410-error">
                            <strong>"Error: "</strong>
                            {err}
                        </div>
                    }.into_any()
                } else {
                    view! { <></> }.into_any()
                }
            }}

            <ResourcesList />

            <Show
                when=move || state.with(|s| s.current_resource.is_some())
                fallback=|| view! { <ResourcesChart /> }
            >
                <ResourceTable />
            </Show>
        </div>
    }
}
