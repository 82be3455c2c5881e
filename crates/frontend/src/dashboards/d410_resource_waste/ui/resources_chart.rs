use contracts::shared::text_format::format_money;
use leptos::prelude::*;

use crate::dashboards::d410_resource_waste::projector::project_chart;

use super::context::use_dashboard;

/// Horizontal spend bars, biggest first; clicking a bar drills into it
#[component]
pub fn ResourcesChart() -> impl IntoView {
    let ctx = use_dashboard();
    let chart = Memo::new(move |_| {
        ctx.resources
            .with(|rs| ctx.state.with(|s| project_chart(rs, &s.filters)))
    });

    let on_select = move |index: usize| {
        let Some(filter) = chart.with_untracked(|c| c.select(index)) else {
            return;
        };
        log::debug!("d410: chart click -> {}", filter.id);
        ctx.store().add_filter(filter);
    };

    view! {
        {move || {
            let chart = chart.get();
            if chart.is_empty() {
                return view! {
                    <div class="d410-empty" style="padding: 24px; text-align: center; color: #6c757d;">
                        "No Data Available"
                    </div>
                }.into_any();
            }

            let max = chart.series.iter().cloned().fold(0.0_f64, f64::max);
            let row_height = chart.height as f64 / chart.categories.len() as f64;
            let bars = chart
                .categories
                .iter()
                .zip(&chart.series)
                .zip(&chart.colors)
                .enumerate()
                .map(|(index, ((category, value), color))| {
                    let width = if max > 0.0 { value / max * 100.0 } else { 0.0 };
                    let active = chart.active_index == Some(index);
                    let row_style = format!(
                        "display: grid; grid-template-columns: 200px 1fr 120px; align-items: center; gap: 8px; cursor: pointer; max-height: {:.0}px; padding: 4px 0;{}",
                        row_height,
                        if active { " font-weight: 600;" } else { "" }
                    );
                    view! {
                        <div class="d410-chart__row" style=row_style on:click=move |_| on_select(index)>
                            <span class="d410-chart__label">{category.clone()}</span>
                            <div style="background: #f1f3f5; border-radius: 4px; height: 24px;">
                                <div style=format!(
                                    "width: {:.1}%; height: 100%; border-radius: 4px; background: {};",
                                    width,
                                    color
                                )></div>
                            </div>
                            <span class="d410-chart__value" style="text-align: right;">{format_money(*value)}</span>
                        </div>
                    }
                })
                .collect_view();

            view! {
                <div class="d410-chart" style="display: flex; flex-direction: column; gap: 4px;">
                    {bars}
                </div>
            }.into_any()
        }}
    }
}
