use leptos::prelude::*;
use thaw::*;

use super::context::use_dashboard;

/// Active filter chips plus the way back to the overview
#[component]
pub fn FilterBar() -> impl IntoView {
    let ctx = use_dashboard();
    let filters = Memo::new(move |_| ctx.state.with(|s| s.filters.clone()));
    let at_home = Signal::derive(move || {
        ctx.state
            .with(|s| s.current_resource.is_none() && !s.filters.iter().any(|f| f.is_resource()))
    });

    view! {
        <div class="d410-filter-bar" style="display: flex; align-items: center; gap: 8px; flex-wrap: wrap;">
            <Button
                appearance=ButtonAppearance::Subtle
                on_click=move |_| {
                    ctx.store().goto_home();
                }
                disabled=at_home
            >
                "All resources"
            </Button>
            {move || {
                filters
                    .get()
                    .into_iter()
                    .map(|filter| {
                        let id = filter.id.clone();
                        view! {
                            <span
                                class="d410-filter-chip"
                                style="display: inline-flex; align-items: center; gap: 4px; background: #e9ecef; border-radius: 12px; padding: 2px 4px 2px 10px; font-size: 0.85rem;"
                            >
                                {filter.title.clone()}
                                <button
                                    style="border: none; background: transparent; cursor: pointer; font-size: 1rem; line-height: 1;"
                                    title="Remove filter"
                                    on:click=move |_| {
                                        ctx.store().remove_filter_by_id(&id);
                                    }
                                >
                                    "×"
                                </button>
                            </span>
                        }
                    })
                    .collect_view()
            }}
        </div>
    }
}
