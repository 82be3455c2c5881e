use crate::dashboards::ResourceWasteDashboard;
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    view! {
        <ResourceWasteDashboard />
    }
}
