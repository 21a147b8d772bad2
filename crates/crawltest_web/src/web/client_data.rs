use crawltest::catalog::fixtures::{
    dynamic_clock_text, CLIENT_DATA_DELAY_MS, CLIENT_ITEMS, DYNAMIC_CLOCK_PERIOD_MS,
};
use leptos::prelude::*;

use super::host::{local_time_string, schedule, Interval};

/// Skeleton first, client-rendered list after a simulated fetch.
#[component]
pub(super) fn ClientData() -> impl IntoView {
    let (loaded, set_loaded) = signal(false);
    let timer = StoredValue::new_local(schedule(CLIENT_DATA_DELAY_MS, move || {
        set_loaded.set(true)
    }));
    on_cleanup(move || timer.set_value(None));

    view! {
        <div>
            <Show
                when=move || loaded.get()
                fallback=|| view! {
                    <div class="skeleton" aria-busy="true">
                        <div class="skeleton-line w-3-4"></div>
                        <div class="skeleton-line w-1-2"></div>
                        <div class="skeleton-line w-5-6"></div>
                    </div>
                }
            >
                <p>"Client-side rendered data items:"</p>
                <ul>
                    {CLIENT_ITEMS.iter().map(|item| view! { <li>{*item}</li> }).collect_view()}
                </ul>
            </Show>
        </div>
    }
}

#[component]
pub(super) fn DynamicClock() -> impl IntoView {
    let (text, set_text) = signal(dynamic_clock_text(&local_time_string()));
    let interval = StoredValue::new_local(Interval::start(DYNAMIC_CLOCK_PERIOD_MS, move || {
        set_text.set(dynamic_clock_text(&local_time_string()))
    }));
    on_cleanup(move || interval.set_value(None));

    view! {
        <div class="panel blue">
            <p class="strong">{move || text.get()}</p>
            <p class="muted">"This content updates every 5 seconds without a page reload."</p>
        </div>
    }
}
