use crawltest::catalog::IslandKind;
use crawltest::gate::{LoaderConfig, DEFAULT_DELAY_MS};
use leptos::prelude::*;
use wasm_bindgen::JsCast;

mod client_data;
mod feed;
mod hidden;
mod host;
mod hybrid;
mod lazy;
mod modal;
mod navigation;
mod technical;

/// Mount every `[data-island]` found in the server-rendered document.
pub fn start() {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let Ok(nodes) = document.query_selector_all("[data-island]") else {
        return;
    };

    for i in 0..nodes.length() {
        let Some(el) = nodes
            .item(i)
            .and_then(|n| n.dyn_into::<web_sys::HtmlElement>().ok())
        else {
            continue;
        };
        let attr = el.get_attribute("data-island").unwrap_or_default();
        match IslandKind::parse(&attr) {
            Some(kind) => mount_island(kind, el),
            None => web_sys::console::warn_1(&format!("unknown island: {attr}").into()),
        }
    }
}

fn mount_island(kind: IslandKind, el: web_sys::HtmlElement) {
    match kind {
        IslandKind::ClientData => mount(el, || view! { <client_data::ClientData /> }),
        IslandKind::DynamicClock => mount(el, || view! { <client_data::DynamicClock /> }),
        IslandKind::LazyContent => {
            let config = lazy_config(&el);
            mount(el, move || view! { <lazy::LazyContent config=config /> })
        }
        IslandKind::InfiniteScroll => mount(el, || view! { <feed::InfiniteScroll /> }),
        IslandKind::ClientCounter => mount(el, || view! { <hybrid::ClientCounter /> }),
        IslandKind::EnhancedContent => mount(el, || view! { <hybrid::EnhancedContent /> }),
        IslandKind::HiddenContent => mount(el, || view! { <hidden::HiddenContent /> }),
        IslandKind::ModalDialog => mount(el, || view! { <modal::ModalDialog /> }),
        IslandKind::DynamicNavigation => {
            mount(el, || view! { <navigation::DynamicNavigation /> })
        }
        IslandKind::CookieProbe => mount(el, || view! { <technical::CookieProbe /> }),
        IslandKind::Fingerprint => mount(el, || view! { <technical::Fingerprint /> }),
        IslandKind::CanvasText => mount(el, || view! { <technical::CanvasText /> }),
        IslandKind::IframeEmbed => mount(el, || view! { <technical::IframeEmbed /> }),
    }
}

/// Replace the server fallback inside `el` with a live island.
fn mount<V, F>(el: web_sys::HtmlElement, f: F)
where
    V: IntoView + 'static,
    F: FnOnce() -> V + 'static,
{
    el.set_inner_html("");
    leptos::mount::mount_to(el, f).forget();
}

/// `data-delay` (ms), `data-content` and `data-placeholder="off"`.
fn lazy_config(el: &web_sys::HtmlElement) -> LoaderConfig {
    let delay_ms = el
        .get_attribute("data-delay")
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(DEFAULT_DELAY_MS);
    let content = el.get_attribute("data-content").unwrap_or_default();
    let config = LoaderConfig::new(delay_ms, content);
    match el.get_attribute("data-placeholder").as_deref() {
        Some("off") => config.without_placeholder(),
        _ => config,
    }
}
