use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;

use crate::dashboards::d410_resource_waste::report::{
    self, HttpReportTransport, Notification, NotificationKind, ToastSlot,
};

use super::context::use_dashboard;

/// "Email report" button, recipients form and the outcome toast
#[component]
pub fn ReportToolbar() -> impl IntoView {
    let ctx = use_dashboard();

    let open = RwSignal::new(false);
    let sending = RwSignal::new(false);
    let toast = RwSignal::new(ToastSlot::default());
    let emails = RwSignal::new(
        ctx.submitter
            .get_value()
            .borrow()
            .emails()
            .to_string(),
    );

    // Field -> submitter, so a completed send can clear what it remembers
    Effect::new(move |_| {
        let text = emails.get();
        ctx.submitter.get_value().borrow_mut().set_emails(&text);
    });

    let can_submit = Signal::derive(move || {
        sending.track();
        let submitter = ctx.submitter.get_value();
        let submitter = submitter.borrow();
        emails.with(|text| submitter.can_submit_with(text))
    });

    let show = move |note: Notification| {
        let ttl_ms = note.ttl_ms;
        let ticket = toast.try_update(|slot| slot.show(note)).unwrap_or_default();
        spawn_local(async move {
            gloo_timers::future::TimeoutFuture::new(ttl_ms).await;
            toast.update(|slot| {
                slot.expire(ticket);
            });
        });
    };

    let handle_send = move |_| {
        let submitter = ctx.submitter.get_value();
        let cookies = ctx.cookies.get_value();
        let snapshot = ctx.store().snapshot();
        let columns = ctx.visible_schema.get_untracked();
        let recipients = emails.get_untracked();
        let transport = HttpReportTransport::new(ctx.config.with_value(|c| c.api.clone()));

        sending.set(true);
        spawn_local(async move {
            match report::submit(&*submitter, &transport, &recipients, &snapshot, &columns, &*cookies).await {
                Ok(note) => {
                    if note.kind == NotificationKind::Success {
                        emails.set(String::new());
                        open.set(false);
                    }
                    show(note);
                }
                Err(e) => {
                    log::debug!("report: not submitted: {}", e);
                }
            }
            sending.set(false);
        });
    };

    view! {
        <div class="d410-report" style="position: relative; display: flex; align-items: center; gap: 8px;">
            <Button
                appearance=ButtonAppearance::Secondary
                on_click=move |_| open.update(|o| *o = !*o)
            >
                "Email report"
            </Button>

            <Show when=move || open.get()>
                <div style="position: absolute; top: 40px; right: 0; z-index: 10; width: 360px; background: #fff; padding: 12px; border-radius: 8px; box-shadow: 0 4px 12px rgba(0,0,0,0.15); display: flex; flex-direction: column; gap: 8px;">
                    <span style="font-size: 0.8rem; color: #6c757d;">
                        "You can enter multiple email addresses separated by commas."
                    </span>
                    <Textarea
                        value=emails
                        placeholder="example@domain.com, another@domain.com"
                        attr:rows=3
                    />
                    <div style="display: flex; justify-content: flex-end; gap: 8px;">
                        <Button
                            appearance=ButtonAppearance::Secondary
                            on_click=move |_| open.set(false)
                        >
                            "Cancel"
                        </Button>
                        <Button
                            appearance=ButtonAppearance::Primary
                            on_click=handle_send
                            disabled=Signal::derive(move || !can_submit.get())
                        >
                            {move || if sending.get() { "Sending..." } else { "Send report" }}
                        </Button>
                    </div>
                </div>
            </Show>

            {move || {
                toast.with(|slot| slot.current().cloned()).map(|note| {
                    let intent = match note.kind {
                        NotificationKind::Success => MessageBarIntent::Success,
                        NotificationKind::Error => MessageBarIntent::Error,
                    };
                    view! {
                        <div style="position: fixed; bottom: 16px; right: 16px; z-index: 20; min-width: 280px;">
                            <MessageBar intent=intent>
                                {note.message}
                            </MessageBar>
                        </div>
                    }
                })
            }}
        </div>
    }
}
