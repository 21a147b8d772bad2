use crawltest::feed::{FeedFooter, FeedItem, PaginatedFeedSimulator};
use leptos::prelude::*;

use super::host::{BrowserTimers, BrowserViewport};

fn item_dom_id(id: u32) -> String {
    format!("feed-item-{id}")
}

#[component]
pub(super) fn InfiniteScroll() -> impl IntoView {
    let feed = StoredValue::new_local(PaginatedFeedSimulator::initialize(
        BrowserTimers,
        BrowserViewport,
    ));
    let (snapshot, set_snapshot) = signal(feed.with_value(|f| f.snapshot()));
    feed.update_value(|f| f.on_change(move |snap| set_snapshot.set(snap.clone())));

    // Keep the load trigger on whatever item is currently last. Deferred a
    // frame so the list has been patched before the lookup.
    Effect::new(move |_| {
        let (last, exhausted) = snapshot.with(|s| (s.items.last().map(|i| i.id), s.exhausted));
        let Some(last) = last else {
            return;
        };
        if exhausted {
            return;
        }
        request_animation_frame(move || {
            let el = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id(&item_dom_id(last)));
            if let Some(el) = el {
                feed.with_value(|f| f.attach_sentinel(last, &el));
            }
        });
    });

    on_cleanup(move || feed.update_value(|f| f.dispose()));

    view! {
        <div class="feed">
            <For
                each=move || snapshot.get().items
                key=|item| item.id
                children=move |item: FeedItem| {
                    view! {
                        <div id=item_dom_id(item.id) class="feed-item">
                            <h3>{format!("Item {}", item.id)}</h3>
                            <p>{item.content}</p>
                        </div>
                    }
                }
            />
            {move || match snapshot.with(|s| s.footer()) {
                FeedFooter::Loading => view! {
                    <div class="feed-footer loading">
                        <span class="spinner"></span>
                        "Loading more items..."
                    </div>
                }
                .into_any(),
                FeedFooter::Exhausted => view! {
                    <div class="feed-footer done">"No more items to load"</div>
                }
                .into_any(),
                FeedFooter::None => ().into_any(),
            }}
        </div>
    }
}
