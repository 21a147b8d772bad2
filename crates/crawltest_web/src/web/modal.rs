use crawltest::catalog::fixtures::MODAL_BUTTON_LABELS;
use leptos::prelude::*;

use crate::ui_model::ModalState;

#[component]
pub(super) fn ModalDialog() -> impl IntoView {
    let (modal, set_modal) = signal(ModalState::default());
    let close = move |_: web_sys::MouseEvent| set_modal.update(|m| m.close());

    view! {
        <div class="stack">
            <div class="note yellow">
                <p>
                    "Modals present a significant challenge for web crawlers. The content within modals is typically not visible in the initial page load and requires user interaction to access."
                </p>
            </div>

            <div class="grid-3">
                {modal
                    .get_untracked()
                    .panels()
                    .iter()
                    .zip(MODAL_BUTTON_LABELS)
                    .map(|(panel, label)| {
                        let id = panel.id;
                        view! {
                            <button
                                class=format!("btn modal-{id}")
                                on:click=move |_| {
                                    set_modal.update(|m| {
                                        m.open(id);
                                    })
                                }
                            >
                                {label}
                            </button>
                        }
                    })
                    .collect_view()}
            </div>

            {move || {
                modal
                    .with(|m| m.visible())
                    .map(|panel| {
                        view! {
                            <div class="modal-root" role="dialog" aria-modal="true">
                                <div class="modal-backdrop" on:click=close></div>
                                <div class="modal">
                                    <div class="modal-head">
                                        <h3>{panel.title}</h3>
                                        <button class="modal-x" aria-label="Close" on:click=close>
                                            "×"
                                        </button>
                                    </div>
                                    <p>{panel.content}</p>
                                    <div class="modal-foot">
                                        <button class="btn blue" on:click=close>
                                            "Close"
                                        </button>
                                    </div>
                                </div>
                            </div>
                        }
                    })
            }}
        </div>
    }
}
