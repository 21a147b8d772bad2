use leptos::prelude::*;

use super::host::{local_time_string, Interval};
use crate::ui_model::Counter;

/// The client island of the hybrid page: a ticking clock and a counter.
#[component]
pub(super) fn ClientCounter() -> impl IntoView {
    let (client_time, set_client_time) = signal(local_time_string());
    let (counter, set_counter) = signal(Counter::default());

    let tick = StoredValue::new_local(Interval::start(1000, move || {
        set_client_time.set(local_time_string())
    }));
    on_cleanup(move || tick.set_value(None));

    view! {
        <div>
            <p>"This component is client-rendered and includes interactive elements:"</p>
            <p>"Current client time: " <strong>{move || client_time.get()}</strong></p>
            <div class="counter">
                <button class="btn red" on:click=move |_| set_counter.update(|c| c.decrement())>
                    "-"
                </button>
                <span class="count">{move || counter.get().value()}</span>
                <button class="btn green" on:click=move |_| set_counter.update(|c| c.increment())>
                    "+"
                </button>
            </div>
            <p class="muted">
                "While crawlers might see the server-rendered parts of this page, the interactive elements and dynamic updates in this client component might be missed or captured in an initial state only."
            </p>
        </div>
    }
}

/// Replaces the server fallback of the progressive enhancement block.
#[component]
pub(super) fn EnhancedContent() -> impl IntoView {
    let (clicks, set_clicks) = signal(0u32);
    view! {
        <div>
            <h3>"Enhanced Content (Requires JavaScript):"</h3>
            <p>"This content was enhanced by JavaScript and may not be visible to all crawlers."</p>
            <div class="row">
                <button class="btn blue" on:click=move |_| set_clicks.update(|n| *n += 1)>
                    "Interactive Button"
                </button>
                <span>
                    {move || match clicks.get() {
                        0 => "Client-side interactivity added".to_string(),
                        n => format!("Clicked {n} time(s)"),
                    }}
                </span>
            </div>
        </div>
    }
}
