use crawltest::gate::{DelayedVisibilityLoader, LoaderConfig, LoaderView};
use leptos::html::Div;
use leptos::prelude::*;

use super::host::{BrowserTimers, BrowserViewport};

#[component]
pub(super) fn LazyContent(config: LoaderConfig) -> impl IntoView {
    let container = NodeRef::<Div>::new();
    let initial = if config.show_placeholder {
        LoaderView::Placeholder
    } else {
        LoaderView::Hidden
    };
    let (view_state, set_view_state) = signal(initial);
    let loader = StoredValue::new_local(None::<DelayedVisibilityLoader>);

    Effect::new(move |_| {
        let Some(div) = container.get() else {
            return;
        };
        if loader.with_value(|l| l.is_some()) {
            return;
        }
        let target: &web_sys::Element = div.as_ref();
        let mut mounted = DelayedVisibilityLoader::initialize(
            config.clone(),
            &BrowserTimers,
            &BrowserViewport,
            target,
        );
        // Fallbacks may already have made it ready.
        set_view_state.set(mounted.view());

        let content = config.content.clone();
        mounted.on_change(move |state| {
            if state.is_ready() {
                set_view_state.set(LoaderView::Content(content.clone()));
            }
        });
        loader.set_value(Some(mounted));
    });

    on_cleanup(move || {
        loader.update_value(|l| {
            if let Some(mut l) = l.take() {
                l.dispose();
            }
        });
    });

    view! {
        <div node_ref=container class="lazy-container">
            {move || match view_state.get() {
                LoaderView::Content(text) => view! {
                    <div class="lazy-loaded">
                        <p class="loaded-note">"Content is now loaded!"</p>
                        <div class="lazy-body">{text}</div>
                    </div>
                }
                .into_any(),
                LoaderView::Placeholder => view! {
                    <div class="skeleton" aria-busy="true">
                        <div class="skeleton-line w-3-4"></div>
                        <div class="skeleton-line"></div>
                        <div class="skeleton-line w-5-6"></div>
                    </div>
                }
                .into_any(),
                LoaderView::Hidden => ().into_any(),
            }}
        </div>
    }
}
