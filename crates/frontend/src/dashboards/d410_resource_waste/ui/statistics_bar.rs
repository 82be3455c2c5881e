use contracts::shared::text_format::{camel_to_title, format_money};
use leptos::prelude::*;

use crate::dashboards::d410_resource_waste::projector::project_statistics;

use super::context::use_dashboard;

#[component]
pub fn StatisticsBar() -> impl IntoView {
    let ctx = use_dashboard();
    let stats = Memo::new(move |_| {
        ctx.resources.with(|rs| {
            ctx.state
                .with(|s| project_statistics(rs, s.current_resource.as_deref()))
        })
    });

    let item_style = "display: flex; flex-direction: column; padding: 8px 16px; background: #fff; border-radius: 6px; box-shadow: 0 1px 3px rgba(0,0,0,0.1); min-width: 160px;";
    let label_style = "font-size: 0.75rem; color: #6c757d;";
    let value_style = "font-size: 1.1rem; font-weight: 600;";

    view! {
        <div class="d410-stats" style="display: flex; gap: 12px; flex-wrap: wrap;">
            <div style=item_style>
                <span style=label_style>"Monthly waste"</span>
                <span style=value_style>{move || format_money(stats.get().monthly)}</span>
            </div>
            <div style=item_style>
                <span style=label_style>"Daily waste"</span>
                <span style=value_style>{move || format_money(stats.get().daily)}</span>
            </div>
            <div style=item_style>
                <span style=label_style>"Top resource"</span>
                <span style=value_style>
                    {move || {
                        stats
                            .get()
                            .top_resource
                            .map(|name| camel_to_title(&name))
                            .unwrap_or_else(|| "-".to_string())
                    }}
                </span>
            </div>
        </div>
    }
}
