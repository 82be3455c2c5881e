use leptos::prelude::*;

use crate::dashboards::d410_resource_waste::projector::project_chips;

use super::context::use_dashboard;

/// One chip per resource type, in chart order
#[component]
pub fn ResourcesList() -> impl IntoView {
    let ctx = use_dashboard();
    let chips = Memo::new(move |_| {
        ctx.resources
            .with(|rs| ctx.state.with(|s| project_chips(rs, &s.filters)))
    });

    view! {
        <div class="d410-chips" style="display: flex; flex-wrap: wrap; gap: 8px;">
            {move || {
                chips
                    .get()
                    .into_iter()
                    .map(|chip| {
                        let filter = chip.filter();
                        let style = format!(
                            "border: 2px solid {}; border-radius: 16px; padding: 4px 12px; cursor: pointer; background: {}; color: {};",
                            chip.color,
                            if chip.active { chip.color } else { "#fff" },
                            if chip.active { "#fff" } else { "#212529" },
                        );
                        view! {
                            <button
                                class="d410-chip"
                                style=style
                                title=chip.title.clone()
                                on:click=move |_| {
                                    ctx.store().add_filter(filter.clone());
                                }
                            >
                                {chip.title.clone()}
                                {chip.has_error.then(|| view! {
                                    <span style="margin-left: 6px; color: #dc3545;" title="Error scanning resource">"⚠"</span>
                                })}
                            </button>
                        }
                    })
                    .collect_view()
            }}
        </div>
    }
}
