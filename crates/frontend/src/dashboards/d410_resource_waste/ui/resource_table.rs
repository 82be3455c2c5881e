use contracts::dashboards::d410_resource_waste::table_state::ROWS_PER_PAGE_OPTIONS;
use contracts::dashboards::d410_resource_waste::{ColumnSchema, Filter, FilterKind, RenderKind, SortDirection};
use leptos::prelude::*;
use thaw::*;

use crate::dashboards::d410_resource_waste::projector::{
    export_rows, PageInfo, StatusTone, TableCell as ProjectedCell, TableView,
};
use crate::shared::export::export_to_csv;

use super::context::{use_dashboard, DashboardContext};

/// Records of the selected resource with search, sort, column filters and paging
#[component]
pub fn ResourceTable() -> impl IntoView {
    let ctx = use_dashboard();

    let search = RwSignal::new(ctx.state.with_untracked(|s| s.table.search_text.clone()));
    let columns_open = RwSignal::new(false);

    // Store -> input (back/forward, resource switch)
    Effect::new(move |_| {
        let text = ctx.state.with(|s| s.table.search_text.clone());
        if search.with_untracked(|current| *current != text) {
            search.set(text);
        }
    });

    // Input -> store; unchanged text is a no-op there
    Effect::new(move |_| {
        let text = search.get();
        ctx.store().set_search_text(&text);
    });

    let nothing_to_save = Signal::derive(move || search.with(|s| s.trim().is_empty()));
    let handle_save_search = move |_| {
        let text = search.get_untracked().trim().to_string();
        let store = ctx.store();
        store.add_filter(Filter::search(&text));
        store.set_search_text("");
    };

    let title = move || {
        ctx.current
            .with(|r| r.as_ref().map(|r| r.title()))
            .or_else(|| ctx.state.with(|s| s.current_resource.clone()))
            .unwrap_or_default()
    };

    let no_rows = Signal::derive(move || {
        ctx.table_view
            .with(|view| !matches!(view, Some(TableView::Rows { page_info, .. }) if page_info.total_rows > 0))
    });

    view! {
        <div class="d410-table" style="background: #fff; padding: 12px; border-radius: 8px; box-shadow: 0 1px 3px rgba(0,0,0,0.1);">
            <div style="display: flex; align-items: center; justify-content: space-between; gap: 12px; margin-bottom: 8px; flex-wrap: wrap;">
                <h3 style="margin: 0; font-size: 1rem; font-weight: 600;">{title}</h3>
                <div style="display: flex; align-items: center; gap: 8px; position: relative;">
                    <Input value=search placeholder="Search..." />
                    <Button
                        appearance=ButtonAppearance::Subtle
                        on_click=handle_save_search
                        disabled=nothing_to_save
                    >
                        "Save search"
                    </Button>
                    <Button
                        appearance=ButtonAppearance::Subtle
                        on_click=move |_| columns_open.update(|o| *o = !*o)
                    >
                        "Columns"
                    </Button>
                    <Button
                        appearance=ButtonAppearance::Subtle
                        on_click=move |_| download_csv(ctx)
                        disabled=no_rows
                    >
                        "Download CSV"
                    </Button>
                    <Show when=move || columns_open.get()>
                        {column_picker(ctx)}
                    </Show>
                </div>
            </div>

            {move || {
                if ctx.loading.get() {
                    return view! {
                        <div class="d410-table__loading" style="padding: 24px; text-align: center; color: #6c757d;">
                            "Loading Resource Data"
                        </div>
                    }.into_any();
                }
                match ctx.table_view.get() {
                    None | Some(TableView::NoData) => view! {
                        <div class="d410-empty" style="padding: 24px; text-align: center; color: #6c757d;">
                            "No Data Available"
                        </div>
                    }.into_any(),
                    Some(TableView::Error { message }) => view! {
                        <div class="d410-table__error" style="padding: 24px; text-align: center; color: #dc3545;">
                            <strong>"Error Scanning Resource"</strong>
                            {message.map(|m| view! { <div style="margin-top: 4px; font-size: 0.85rem;">{m}</div> })}
                        </div>
                    }.into_any(),
                    Some(TableView::Rows { columns, rows, page_info }) => view! {
                        {rows_view(ctx, &columns, rows)}
                        {pager_view(ctx, page_info)}
                    }.into_any(),
                }
            }}
        </div>
    }
}

/// Every filtered row of the current resource, visible columns only
fn download_csv(ctx: DashboardContext) {
    let Some(resource) = ctx.current.get_untracked() else {
        return;
    };
    let snapshot = ctx.store().snapshot();
    let schema = ctx.schema.get_untracked();
    let visible = ctx.visible_schema.get_untracked();

    let rows = export_rows(&resource, &snapshot.filters, &snapshot.table, &schema, &visible);
    let headers: Vec<String> = visible.columns().iter().map(|c| c.label.clone()).collect();
    let filename = format!("{}.csv", resource.resource_name);
    match export_to_csv(&headers, &rows, &filename) {
        Ok(()) => log::info!("d410: exported {} rows to {}", rows.len(), filename),
        Err(e) => log::warn!("d410: csv export failed: {}", e),
    }
}

/// Show/hide checkboxes over the full schema
fn column_picker(ctx: DashboardContext) -> impl IntoView {
    view! {
        <div style="position: absolute; top: 40px; right: 0; z-index: 10; background: #fff; padding: 8px 12px; border-radius: 8px; box-shadow: 0 4px 12px rgba(0,0,0,0.15); display: flex; flex-direction: column; gap: 4px; min-width: 180px;">
            {move || {
                ctx.schema
                    .get()
                    .columns()
                    .iter()
                    .map(|col| {
                        let name = col.name.clone();
                        let name_for_check = col.name.clone();
                        let label = col.label.clone();
                        view! {
                            <label style="display: flex; align-items: center; gap: 6px; font-size: 0.875rem; cursor: pointer;">
                                <input
                                    type="checkbox"
                                    prop:checked=move || {
                                        ctx.hidden_columns.with(|hidden| !hidden.contains(&name_for_check))
                                    }
                                    on:change=move |_| {
                                        let name = name.clone();
                                        ctx.hidden_columns.update(|hidden| {
                                            match hidden.iter().position(|h| *h == name) {
                                                Some(pos) => {
                                                    hidden.remove(pos);
                                                }
                                                None => hidden.push(name),
                                            }
                                        });
                                    }
                                />
                                {label}
                            </label>
                        }
                    })
                    .collect_view()
            }}
        </div>
    }
}

fn sort_indicator(ctx: DashboardContext, column: &str) -> &'static str {
    ctx.state.with(|s| {
        if s.table.sort_column != column {
            return "";
        }
        match s.table.sort_direction {
            SortDirection::Asc => " ▲",
            SortDirection::Desc => " ▼",
        }
    })
}

/// First click sorts ascending, the next ones flip the direction
fn toggle_sort(ctx: DashboardContext, column: &str) {
    let (current, direction) =
        ctx.state.with_untracked(|s| (s.table.sort_column.clone(), s.table.sort_direction));
    let direction = if current == column {
        direction.toggled()
    } else {
        SortDirection::Asc
    };
    ctx.store().set_sort(column, direction);
}

fn has_column_filter(ctx: DashboardContext, column: &str) -> bool {
    ctx.state.with(|s| {
        s.filters
            .iter()
            .any(|f| f.kind == FilterKind::Column && f.field() == Some(column))
    })
}

fn rows_view(ctx: DashboardContext, columns: &ColumnSchema, rows: Vec<Vec<ProjectedCell>>) -> impl IntoView {
    let headers = columns
        .columns()
        .iter()
        .map(|col| {
            let name = col.name.clone();
            let name_for_indicator = col.name.clone();
            let name_for_filter = col.name.clone();
            let name_for_clear = col.name.clone();
            let label = col.label.clone();
            view! {
                <TableHeaderCell resizable=true min_width=100.0>
                    <div style="display: flex; align-items: center; gap: 4px;">
                        <div
                            class="table__sortable-header"
                            style="cursor: pointer;"
                            on:click=move |_| toggle_sort(ctx, &name)
                        >
                            {label}
                            <span>{move || sort_indicator(ctx, &name_for_indicator)}</span>
                        </div>
                        <Show when=move || has_column_filter(ctx, &name_for_filter)>
                            {
                                let name = name_for_clear.clone();
                                view! {
                                    <button
                                        style="border: none; background: transparent; cursor: pointer; color: #6c757d;"
                                        title="Clear column filter"
                                        on:click=move |_| {
                                            ctx.store().remove_column_filter(&name);
                                        }
                                    >
                                        "×"
                                    </button>
                                }
                            }
                        </Show>
                    </div>
                </TableHeaderCell>
            }
        })
        .collect_view();

    let meta: Vec<(String, RenderKind)> = columns
        .columns()
        .iter()
        .map(|c| (c.name.clone(), c.render_kind))
        .collect();

    let body = rows
        .into_iter()
        .map(|row| {
            let cells = row
                .into_iter()
                .zip(meta.iter().cloned())
                .map(|(cell, (field, kind))| cell_view(ctx, cell, field, kind))
                .collect_view();
            view! { <TableRow>{cells}</TableRow> }
        })
        .collect_view();

    view! {
        <Table>
            <TableHeader>
                <TableRow>{headers}</TableRow>
            </TableHeader>
            <TableBody>{body}</TableBody>
        </Table>
    }
}

fn cell_view(ctx: DashboardContext, cell: ProjectedCell, field: String, kind: RenderKind) -> impl IntoView {
    let content = match kind {
        RenderKind::Tag => tag_cell(ctx, cell).into_any(),
        _ => value_cell(ctx, cell, field, kind).into_any(),
    };
    view! {
        <TableCell>
            <TableCellLayout>{content}</TableCellLayout>
        </TableCell>
    }
}

/// Plain and status cells toggle their value in the column filter on click
fn value_cell(ctx: DashboardContext, cell: ProjectedCell, field: String, kind: RenderKind) -> impl IntoView {
    let filterable = matches!(kind, RenderKind::PlainText | RenderKind::Status) && !cell.raw.is_empty();
    let color = match cell.tone {
        Some(StatusTone::Positive) => "color: #198754; font-weight: 500;",
        Some(StatusTone::Negative) => "color: #dc3545; font-weight: 500;",
        Some(StatusTone::Neutral) | None => "",
    };
    let style = format!("{}{}", color, if filterable { " cursor: pointer;" } else { "" });
    let raw = cell.raw;

    view! {
        <span
            style=style
            title={if filterable { "Filter by this value" } else { "" }}
            on:click=move |_| {
                if filterable {
                    ctx.store().toggle_column_value(&field, &raw);
                }
            }
        >
            {cell.text}
        </span>
    }
}

/// One clickable badge per tag pair
fn tag_cell(ctx: DashboardContext, cell: ProjectedCell) -> impl IntoView {
    cell.tags
        .into_iter()
        .map(|(key, value)| {
            let text = format!("{}: {}", key, value);
            view! {
                <span
                    style="display: inline-block; margin: 0 4px 2px 0; padding: 0 6px; background: #e9ecef; border-radius: 10px; font-size: 0.8rem; cursor: pointer;"
                    title="Filter by this tag"
                    on:click=move |_| {
                        ctx.store().add_filter(Filter::tag(&key, &value));
                    }
                >
                    {text}
                </span>
            }
        })
        .collect_view()
}

fn pager_view(ctx: DashboardContext, info: PageInfo) -> impl IntoView {
    let first = if info.total_rows == 0 { 0 } else { info.page * info.rows_per_page + 1 };
    let last = ((info.page + 1) * info.rows_per_page).min(info.total_rows);
    let page = info.page;
    let has_next = page + 1 < info.total_pages;

    view! {
        <div class="d410-table__footer" style="display: flex; align-items: center; justify-content: flex-end; gap: 12px; margin-top: 8px; font-size: 0.875rem;">
            <span>"Rows per page:"</span>
            <select
                prop:value=info.rows_per_page.to_string()
                on:change=move |ev| {
                    if let Ok(rows) = event_target_value(&ev).parse::<usize>() {
                        ctx.store().set_rows_per_page(rows);
                    }
                }
                style="padding: 4px 8px; border: 1px solid #ced4da; border-radius: 4px;"
            >
                {ROWS_PER_PAGE_OPTIONS
                    .iter()
                    .map(|n| {
                        view! {
                            <option value=n.to_string() selected={*n == info.rows_per_page}>
                                {n.to_string()}
                            </option>
                        }
                    })
                    .collect_view()}
            </select>
            <span>{format!("{}-{} of {}", first, last, info.total_rows)}</span>
            <Button
                size=ButtonSize::Small
                appearance=ButtonAppearance::Subtle
                disabled={page == 0}
                on_click=move |_| {
                    ctx.store().set_page(page.saturating_sub(1));
                }
            >
                "‹ Prev"
            </Button>
            <Button
                size=ButtonSize::Small
                appearance=ButtonAppearance::Subtle
                disabled={!has_next}
                on_click=move |_| {
                    ctx.store().set_page(page + 1);
                }
            >
                "Next ›"
            </Button>
        </div>
    }
}
