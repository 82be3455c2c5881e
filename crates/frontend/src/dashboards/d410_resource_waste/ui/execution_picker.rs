use leptos::prelude::*;
use thaw::*;

use super::context::use_dashboard;

/// Which scan the dashboard shows; empty means the latest one
#[component]
pub fn ExecutionPicker() -> impl IntoView {
    let ctx = use_dashboard();
    let draft = RwSignal::new(
        ctx.state
            .with_untracked(|s| s.execution_id.clone())
            .unwrap_or_default(),
    );

    // Back/forward may switch the scan under the field
    Effect::new(move |_| {
        let current = ctx.state.with(|s| s.execution_id.clone()).unwrap_or_default();
        draft.set(current);
    });

    let unchanged = Signal::derive(move || {
        let current = ctx.state.with(|s| s.execution_id.clone()).unwrap_or_default();
        draft.with(|d| d.trim() == current)
    });

    let handle_load = move |_| {
        let id = draft.get_untracked().trim().to_string();
        ctx.store().set_execution(Some(id));
    };

    view! {
        <div class="d410-execution" style="display: flex; align-items: center; gap: 4px;">
            <Input value=draft placeholder="Execution ID (latest)" />
            <Button
                appearance=ButtonAppearance::Secondary
                on_click=handle_load
                disabled=unchanged
            >
                "Load"
            </Button>
        </div>
    }
}
