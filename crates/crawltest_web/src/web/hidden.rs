use crawltest::catalog::fixtures::{CLICK_REVEAL_TEXT, HOVER_REVEAL_TEXT};
use leptos::prelude::*;

use crate::ui_model::{AccordionSet, RevealToggle, TabStrip};

/// Click, hover, tab and accordion reveals.
#[component]
pub(super) fn HiddenContent() -> impl IntoView {
    let (click, set_click) = signal(RevealToggle::default());
    let (hover, set_hover) = signal(RevealToggle::default());
    let (tabs, set_tabs) = signal(TabStrip::default());
    let (accordion, set_accordion) = signal(AccordionSet::default());

    view! {
        <div class="stack">
            <div class="box">
                <h3>"Click to Reveal Content"</h3>
                <button class="btn blue" on:click=move |_| set_click.update(|r| r.toggle())>
                    {move || click.get().button_label()}
                </button>
                <Show when=move || click.get().is_shown()>
                    <div class="revealed">
                        <p>{CLICK_REVEAL_TEXT[0]}</p>
                        <p>{CLICK_REVEAL_TEXT[1]}</p>
                    </div>
                </Show>
            </div>

            <div class="box">
                <h3>"Hover to Reveal Content"</h3>
                <div
                    class="hover-area"
                    on:mouseenter=move |_| set_hover.update(|r| r.set(true))
                    on:mouseleave=move |_| set_hover.update(|r| r.set(false))
                >
                    <p>"Hover over this area to reveal hidden content"</p>
                    <Show when=move || hover.get().is_shown()>
                        <div class="hover-popup">
                            <p>{HOVER_REVEAL_TEXT}</p>
                        </div>
                    </Show>
                </div>
            </div>

            <div class="box tabs">
                <div class="tab-strip">
                    {tabs
                        .get_untracked()
                        .panels()
                        .iter()
                        .map(|panel| {
                            let id = panel.id;
                            view! {
                                <button
                                    class="tab"
                                    class:active=move || tabs.with(|t| t.is_active(id))
                                    on:click=move |_| {
                                        set_tabs.update(|t| {
                                            t.select(id);
                                        })
                                    }
                                >
                                    {panel.title}
                                </button>
                            }
                        })
                        .collect_view()}
                </div>
                <div class="tab-body">
                    {move || tabs.with(|t| t.active().map(|p| p.content).unwrap_or_default())}
                </div>
            </div>

            <div class="box accordion">
                {accordion
                    .get_untracked()
                    .panels()
                    .iter()
                    .map(|panel| {
                        let id = panel.id;
                        let content = panel.content;
                        view! {
                            <div class="accordion-section">
                                <button
                                    class="accordion-header"
                                    class:open=move || accordion.with(|a| a.is_open(id))
                                    on:click=move |_| {
                                        set_accordion.update(|a| {
                                            a.toggle(id);
                                        })
                                    }
                                >
                                    {panel.title}
                                </button>
                                <Show when=move || accordion.with(|a| a.is_open(id))>
                                    <div class="accordion-body">
                                        <p>{content}</p>
                                    </div>
                                </Show>
                            </div>
                        }
                    })
                    .collect_view()}
            </div>
        </div>
    }
}
