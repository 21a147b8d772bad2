use crawltest::catalog::fixtures::{
    CLIENT_REDIRECT_MS, DELAYED_LINK_MS, VIRTUAL_PAGE_TEXT, VIRTUAL_PAGE_TITLE,
};
use crawltest::catalog::Page;
use crawltest::host::TimerHandle;
use leptos::prelude::*;
use wasm_bindgen::JsValue;

use super::host::schedule;

/// Same-URL history entry, so the content swap leaves the address bar alone.
fn push_virtual_state() -> Result<(), String> {
    let window = web_sys::window().ok_or("no window")?;
    let path = window
        .location()
        .pathname()
        .map_err(|_| "location.pathname threw".to_string())?;
    let history = window
        .history()
        .map_err(|_| "history unavailable".to_string())?;
    let state = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&state, &"page".into(), &"virtual".into());
    history
        .push_state_with_url(&JsValue::from(state), "Virtual Page", Some(&path))
        .map_err(|_| "pushState threw".to_string())
}

fn go_home() {
    if let Some(w) = web_sys::window() {
        let _ = w.location().set_href(Page::Home.path());
    }
}

#[component]
pub(super) fn DynamicNavigation() -> impl IntoView {
    let (show_link, set_show_link) = signal(false);
    let (virtual_loaded, set_virtual_loaded) = signal(false);
    let (status, set_status) = signal(String::new());

    let link_timer = StoredValue::new_local(schedule(DELAYED_LINK_MS, move || {
        set_show_link.set(true)
    }));
    let redirect_timer = StoredValue::new_local(None::<TimerHandle>);
    on_cleanup(move || {
        link_timer.set_value(None);
        redirect_timer.set_value(None);
    });

    let load_virtual = move |_: web_sys::MouseEvent| match push_virtual_state() {
        Ok(()) => set_virtual_loaded.set(true),
        Err(e) => set_status.set(e),
    };

    let redirect = move |_: web_sys::MouseEvent| {
        if redirect_timer.with_value(|t| t.is_some()) {
            return;
        }
        set_status.set("Redirecting to Home...".to_string());
        redirect_timer.set_value(schedule(CLIENT_REDIRECT_MS, go_home));
    };

    view! {
        <div class="stack">
            <div class="box">
                <h3>"Delayed Navigation Links"</h3>
                <p>"Links that appear after a delay may be missed by crawlers that don't wait or execute JavaScript."</p>
                <Show
                    when=move || show_link.get()
                    fallback=|| view! {
                        <div class="panel gray row">
                            <span class="spinner"></span>
                            <p>"Loading navigation links..."</p>
                        </div>
                    }
                >
                    <div class="panel green">
                        <p>"This link appeared after a 3-second delay:"</p>
                        <a href=Page::ServerSide.path()>"Go to Server-Side Rendering Tests"</a>
                    </div>
                </Show>
            </div>

            <div class="box">
                <h3>"Push State Without URL Change"</h3>
                <p>"This demonstrates changing content without changing the URL, which can confuse crawlers."</p>
                <button class="btn blue" on:click=load_virtual>"Load Virtual Page"</button>
                <div id="pushstate-content">
                    <Show
                        when=move || virtual_loaded.get()
                        fallback=|| view! {
                            <p class="muted">"Click the button above to load content without changing the URL."</p>
                        }
                    >
                        <div class="panel purple">
                            <h3>{VIRTUAL_PAGE_TITLE}</h3>
                            <p>{VIRTUAL_PAGE_TEXT[0]}</p>
                            <p>{VIRTUAL_PAGE_TEXT[1]}</p>
                        </div>
                    </Show>
                </div>
            </div>

            <div class="box">
                <h3>"Client-Side Redirect"</h3>
                <p>"Client-side redirects using JavaScript can be problematic for crawlers."</p>
                <button class="btn red" on:click=redirect>"Redirect to Home (after 1s)"</button>
            </div>

            <p class="status">{move || status.get()}</p>
        </div>
    }
}
