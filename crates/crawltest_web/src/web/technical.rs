use crawltest::catalog::fixtures::{
    find_cookie, CANVAS_LINES, COOKIE_MAX_AGE_SECS, COOKIE_MISSING, COOKIE_NAME, COOKIE_VALUE,
};
use crawltest::catalog::Route;
use leptos::html::Canvas;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

fn html_document() -> Option<web_sys::HtmlDocument> {
    web_sys::window()?
        .document()?
        .dyn_into::<web_sys::HtmlDocument>()
        .ok()
}

/// Write the test cookie, then read the jar back.
fn probe_cookie() -> String {
    let Some(doc) = html_document() else {
        return COOKIE_MISSING.to_string();
    };
    let _ = doc.set_cookie(&format!(
        "{COOKIE_NAME}={COOKIE_VALUE}; path=/; max-age={COOKIE_MAX_AGE_SECS}"
    ));
    let jar = doc.cookie().unwrap_or_default();
    find_cookie(&jar, COOKIE_NAME)
        .unwrap_or(COOKIE_MISSING)
        .to_string()
}

#[component]
pub(super) fn CookieProbe() -> impl IntoView {
    let value = probe_cookie();
    view! {
        <div class="panel blue">
            <p>"Cookie value: " <strong>{value}</strong></p>
            <p class="muted">
                "If you can see a valid cookie value, your browser is accepting and reading cookies. Crawlers with limited cookie support might not see this content correctly."
            </p>
        </div>
    }
}

fn has_global(window: &web_sys::Window, name: &str) -> bool {
    js_sys::Reflect::has(window, &JsValue::from_str(name)).unwrap_or(false)
}

fn fingerprint() -> (String, String) {
    let Some(window) = web_sys::window() else {
        return (String::new(), String::new());
    };
    let navigator = window.navigator();
    let user_agent = navigator.user_agent().unwrap_or_default();

    let mut parts = Vec::new();
    if let Ok(screen) = window.screen() {
        let w = screen.width().unwrap_or(0);
        let h = screen.height().unwrap_or(0);
        parts.push(format!("Screen: {w}x{h}"));
        parts.push(format!("Color depth: {}", screen.color_depth().unwrap_or(0)));
    }
    parts.push(format!(
        "Timezone: {}",
        js_sys::Date::new_0().get_timezone_offset()
    ));
    let languages: Vec<String> = navigator
        .languages()
        .iter()
        .filter_map(|v| v.as_string())
        .collect();
    parts.push(format!("Languages: {}", languages.join(",")));
    parts.push(format!(
        "Canvas supported: {}",
        has_global(&window, "HTMLCanvasElement")
    ));
    parts.push(format!(
        "WebGL supported: {}",
        has_global(&window, "WebGLRenderingContext")
    ));

    (user_agent, parts.join(" | "))
}

#[component]
pub(super) fn Fingerprint() -> impl IntoView {
    let (user_agent, print) = fingerprint();
    view! {
        <div class="panel gray">
            <p><strong>"User Agent:"</strong> " " {user_agent}</p>
            <p><strong>"Browser Fingerprint:"</strong></p>
            <pre class="code">{print}</pre>
            <p class="muted">
                "Browsers and crawlers have different fingerprints. Some sites serve different content to crawlers based on detected fingerprints, which can be considered \"cloaking.\""
            </p>
        </div>
    }
}

#[allow(deprecated)]
fn draw_canvas_text(canvas: &web_sys::HtmlCanvasElement) -> Result<(), String> {
    let ctx = canvas
        .get_context("2d")
        .map_err(|_| "canvas: get_context threw".to_string())?
        .ok_or("canvas: missing 2d context".to_string())?
        .dyn_into::<web_sys::CanvasRenderingContext2d>()
        .map_err(|_| "canvas: context is not 2d".to_string())?;

    ctx.set_fill_style(&JsValue::from_str("#f8f9fa"));
    ctx.fill_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);
    ctx.set_font("12px Arial");
    ctx.set_fill_style(&JsValue::from_str("black"));
    for (i, line) in CANVAS_LINES.iter().enumerate() {
        ctx.fill_text(line, 10.0, 30.0 + 20.0 * i as f64)
            .map_err(|_| "canvas: fill_text threw".to_string())?;
    }
    Ok(())
}

#[component]
pub(super) fn CanvasText() -> impl IntoView {
    let canvas = NodeRef::<Canvas>::new();
    let (error, set_error) = signal(None::<String>);

    Effect::new(move |_| {
        if let Some(c) = canvas.get() {
            if let Err(e) = draw_canvas_text(&c) {
                set_error.set(Some(e));
            }
        }
    });

    view! {
        <canvas node_ref=canvas id="testCanvas" width="300" height="100"></canvas>
        {move || error.get().map(|e| view! { <p class="status">{e}</p> })}
    }
}

/// The frame's `src` is only known once the page runs in a browser.
#[component]
pub(super) fn IframeEmbed() -> impl IntoView {
    let src = web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .map(|origin| format!("{origin}{}", Route::IframeContent.path()))
        .unwrap_or_default();

    view! {
        <iframe src=src title="Test iFrame" width="100%" height="200" class="frame"></iframe>
        <p class="muted">
            "The content above is loaded in an iframe. Crawlers handle iframes inconsistently, with some indexing the content and others ignoring it completely."
        </p>
    }
}
