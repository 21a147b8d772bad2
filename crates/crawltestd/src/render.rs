//! Server-rendered HTML.
//!
//! Pages are plain strings: the shared layout, one `TestCase` frame per
//! challenge, and empty `[data-island]` mount points the browser app fills in.

use std::fmt::Write as _;

use crawltest::catalog::fixtures::{self, Panel};
use crawltest::catalog::{
    deep_level_path, IslandKind, Page, Route, TestCaseInfo, DEEP_LINK_MAX_LEVEL,
    RATE_LIMITED_PAGES, SITE_TITLE,
};

const STYLE: &str = r#"
body{font-family:system-ui,sans-serif;margin:0;color:#1f2937}
header{background:#1e3a8a;color:#fff}header a{color:#fff;margin-right:1rem}
.container{max-width:960px;margin:0 auto;padding:1rem}
footer{background:#f3f4f6;border-top:1px solid #ddd;margin-top:2rem;text-align:center;color:#4b5563}
.cards{display:grid;grid-template-columns:repeat(auto-fill,minmax(260px,1fr));gap:1.5rem}
.card{border-radius:8px;padding:1.5rem;background:#eef2ff}
.test-case{border:1px solid #ddd;border-radius:6px;padding:1.5rem;margin-bottom:2rem}
.impl{margin-top:1.5rem;padding:1rem;border:1px solid #ddd;background:#f9fafb}
.box{border:1px solid #ddd;padding:1rem;border-radius:4px;margin-bottom:1rem}
.panel{padding:1rem;border-radius:4px}.blue{background:#eff6ff}.green{background:#dcfce7}
.yellow{background:#fef9c3}.gray{background:#f3f4f6}.purple{background:#f3e8ff}.red{background:#fee2e2}
.muted{color:#6b7280;font-size:.9em}
.skeleton-line{height:1rem;background:#e5e7eb;border-radius:4px;margin:.5rem 0}
.w-3-4{width:75%}.w-1-2{width:50%}.w-5-6{width:83%}
.feed{max-height:400px;overflow-y:auto;padding:.5rem}
.feed-item{border:1px solid #ddd;border-radius:4px;padding:1rem;margin-bottom:1rem;background:#fff}
.feed-footer{text-align:center;padding:1rem}
.lazy-container{min-height:100px;border:1px solid #ddd;padding:1rem;border-radius:4px}
.hover-area{position:relative;background:#e5e7eb;padding:.75rem}
.hover-popup{position:absolute;top:100%;left:0;right:0;background:#fef9c3;padding:.75rem;z-index:10}
.tab.active,.accordion-header.open{font-weight:600;border-bottom:2px solid #3b82f6}
.modal-root{position:fixed;inset:0;display:flex;align-items:center;justify-content:center;z-index:50}
.modal-backdrop{position:fixed;inset:0;background:#000;opacity:.5}
.modal{position:relative;background:#fff;border-radius:8px;padding:1.5rem;max-width:28rem;z-index:10}
.stream-section{padding:1rem;border-radius:4px;margin-bottom:1rem;background:#dcfce7}
"#;

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Shared `<head>`, header and the opening of `<main>`.
pub fn document_open(title: &str, description: &str, extra_head: &str, web_bundle: &str) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{}</title><meta name=\"description\" content=\"{}\">{extra_head}\
         <style>{STYLE}</style>\
         <script type=\"module\">import init from \"{}\"; init();</script></head><body>",
        escape(title),
        escape(description),
        escape(web_bundle),
    );
    let _ = write!(
        html,
        "<header><div class=\"container\"><h1>{}</h1><nav>",
        escape(SITE_TITLE)
    );
    for page in Page::all() {
        let _ = write!(html, "<a href=\"{}\">{}</a>", page.path(), page.nav_label());
    }
    html.push_str("</nav></div></header><main class=\"container\">");
    html
}

pub fn document_close() -> &'static str {
    "</main><footer><div class=\"container\"><p>Crawler Test Site - Created to challenge web crawlers</p></div></footer></body></html>"
}

fn document(title: &str, description: &str, extra_head: &str, web_bundle: &str, body: &str) -> String {
    let mut html = document_open(title, description, extra_head, web_bundle);
    html.push_str(body);
    html.push_str(document_close());
    html
}

fn page_document(page: Page, extra_head: &str, web_bundle: &str, body: &str) -> String {
    document(&page.title(), page.meta_description(), extra_head, web_bundle, body)
}

fn page_intro(page: Page) -> String {
    format!(
        "<h1>{}</h1><p>{}</p>",
        escape(page.heading()),
        escape(page.intro())
    )
}

fn test_case_open(info: &TestCaseInfo) -> String {
    let mut html = format!(
        "<div class=\"test-case\"><h2>{}</h2><p>{}</p>",
        escape(info.title),
        escape(info.description)
    );
    if let Some(expected) = info.expected_behavior {
        let _ = write!(html, "<div><h3>Expected Behavior:</h3><p>{}</p></div>", escape(expected));
    }
    if let Some(challenge) = info.crawler_challenge {
        let _ = write!(html, "<div><h3>Crawler Challenge:</h3><p>{}</p></div>", escape(challenge));
    }
    html.push_str("<div class=\"impl\"><h3>Test Implementation:</h3><div>");
    html
}

fn test_case_close() -> &'static str {
    "</div></div></div>"
}

fn test_case(info: &TestCaseInfo, inner: &str) -> String {
    let mut html = test_case_open(info);
    html.push_str(inner);
    html.push_str(test_case_close());
    html
}

/// Render each case of `page` in order, with `inner[i]` as its body.
fn cases(page: Page, inner: &[String]) -> String {
    page.test_cases()
        .iter()
        .zip(inner)
        .map(|(info, body)| test_case(info, body))
        .collect()
}

/// Mount point for a browser island. `fallback` is what non-JS clients see.
pub fn island(kind: IslandKind, attrs: &[(&str, &str)], fallback: &str) -> String {
    let mut html = format!("<div data-island=\"{}\"", kind.attr());
    for (name, value) in attrs {
        let _ = write!(html, " {name}=\"{}\"", escape(value));
    }
    let _ = write!(html, ">{fallback}</div>");
    html
}

const SKELETON: &str = "<div class=\"skeleton\" aria-busy=\"true\"><div class=\"skeleton-line w-3-4\"></div><div class=\"skeleton-line w-1-2\"></div><div class=\"skeleton-line w-5-6\"></div></div>";

fn list(items: &[&str]) -> String {
    let mut html = String::from("<ul>");
    for item in items {
        let _ = write!(html, "<li>{}</li>", escape(item));
    }
    html.push_str("</ul>");
    html
}

pub fn home(web_bundle: &str) -> String {
    let mut body = format!(
        "<section><h1>{}</h1><p>{}</p></section><div class=\"cards\">",
        escape(Page::Home.heading()),
        escape(Page::Home.intro())
    );
    for page in Page::all() {
        let Some(blurb) = page.card_blurb() else {
            continue;
        };
        let _ = write!(
            body,
            "<div class=\"card\"><h2>{}</h2><p>{}</p><a href=\"{}\">View Tests</a></div>",
            escape(page.nav_label()),
            escape(blurb),
            page.path()
        );
    }
    body.push_str("</div>");
    page_document(Page::Home, "", web_bundle, &body)
}

pub fn server_side_json_ld() -> serde_json::Value {
    serde_json::json!({
        "@context": "https://schema.org",
        "@type": "WebPage",
        "name": Page::ServerSide.heading(),
        "description": Page::ServerSide.meta_description(),
    })
}

pub fn server_side(server_time: &str, web_bundle: &str) -> String {
    let json_ld = server_side_json_ld();
    let pretty = serde_json::to_string_pretty(&json_ld).unwrap_or_default();
    // `</` cannot appear inside the script element.
    let head = format!(
        "<script type=\"application/ld+json\">{}</script>",
        json_ld.to_string().replace("</", "<\\/")
    );

    let inner = [
        format!(
            "<p>This page was server-rendered at: <strong>{}</strong></p>\
             <p>The content here should be immediately visible in the source code and accessible to all crawlers.</p>",
            escape(server_time)
        ),
        format!("<p>Server-rendered data items:</p>{}", list(&fixtures::SERVER_ITEMS)),
        format!(
            "<p>This page includes server-rendered metadata:</p><ul><li>Title: {}</li><li>Description: {}</li></ul>\
             <p>Example of JSON-LD structured data (rendered in page source):</p><pre>{}</pre>",
            escape(&Page::ServerSide.title()),
            escape(Page::ServerSide.meta_description()),
            escape(&pretty)
        ),
    ];
    let body = page_intro(Page::ServerSide) + &cases(Page::ServerSide, &inner);
    page_document(Page::ServerSide, &head, web_bundle, &body)
}

pub fn client_side(web_bundle: &str) -> String {
    let delay = fixtures::LAZY_DEMO_DELAY_MS.to_string();
    let inner = [
        island(IslandKind::ClientData, &[], SKELETON),
        island(IslandKind::DynamicClock, &[], SKELETON),
        island(
            IslandKind::LazyContent,
            &[("data-delay", &delay), ("data-content", fixtures::LAZY_DEMO_CONTENT)],
            SKELETON,
        ),
        format!(
            "<div class=\"panel yellow\"><p>This component demonstrates infinite scrolling. New content is loaded as you scroll down.</p>\
             <p class=\"muted\">Crawler challenge: Many crawlers will not scroll the page or wait for new content to load.</p></div>{}",
            island(IslandKind::InfiniteScroll, &[], "")
        ),
    ];
    let body = page_intro(Page::ClientSide) + &cases(Page::ClientSide, &inner);
    page_document(Page::ClientSide, "", web_bundle, &body)
}

/// The hybrid page split at its streaming slot.
#[derive(Debug, Clone)]
pub struct HybridStream {
    /// Everything up to and including the fallback.
    pub head: String,
    /// `(delay_units, html)` per streamed section, in order.
    pub sections: Vec<(u32, String)>,
    /// Fallback-hiding style, the rest of the page and the closing tags.
    pub tail: String,
}

pub fn hybrid(server_time: &str, web_bundle: &str) -> HybridStream {
    let cases = Page::Hybrid.test_cases();

    let mut head = document_open(
        &Page::Hybrid.title(),
        Page::Hybrid.meta_description(),
        "",
        web_bundle,
    );
    head.push_str(&page_intro(Page::Hybrid));

    if let Some(islands) = cases.first() {
        let inner = format!(
            "<div class=\"panel gray\"><h3>Server-Rendered Part:</h3><p>This was rendered on the server at: {}</p>{}</div>\
             <div class=\"panel blue\"><h3>Client-Rendered Island:</h3>{}</div>",
            escape(server_time),
            list(&fixtures::HYBRID_SERVER_ITEMS),
            island(IslandKind::ClientCounter, &[], "")
        );
        head.push_str(&test_case(islands, &inner));
    }

    if let Some(streaming) = cases.get(1) {
        head.push_str(&test_case_open(streaming));
    }
    let _ = write!(
        head,
        "<div id=\"stream-fallback\" class=\"panel\">{}</div>",
        escape(fixtures::STREAM_FALLBACK)
    );

    let sections = fixtures::stream_sections()
        .into_iter()
        .map(|s| {
            let html = format!(
                "<div class=\"stream-section\" id=\"stream-section-{}\"><h3>{}</h3><p>{}</p></div>",
                s.index,
                escape(&s.title),
                escape(&s.content)
            );
            (s.delay_units, html)
        })
        .collect();

    let mut tail = String::from("<style>#stream-fallback{display:none}</style>");
    if cases.get(1).is_some() {
        tail.push_str(test_case_close());
    }
    if let Some(progressive) = cases.get(2) {
        let inner = format!(
            "<div class=\"panel gray\"><h3>Base Content (No JavaScript Required):</h3>\
             <p>This static content is available to all crawlers regardless of JavaScript support.</p>{}</div>\
             <div class=\"panel yellow\"><noscript><p>Your browser has JavaScript disabled. Enhanced features are not available.</p></noscript>{}</div>",
            list(&fixtures::PROGRESSIVE_BASE_POINTS),
            island(IslandKind::EnhancedContent, &[("id", "enhanced-content")], "")
        );
        tail.push_str(&test_case(progressive, &inner));
    }
    tail.push_str(document_close());

    HybridStream {
        head,
        sections,
        tail,
    }
}

fn panels(items: &[Panel], heading: &str) -> String {
    let mut html = String::new();
    for p in items {
        let _ = write!(
            html,
            "<div id=\"{}\" class=\"panel gray\"><{heading}>{}</{heading}><p>{}</p></div>",
            p.id,
            escape(p.title),
            escape(p.content)
        );
    }
    html
}

pub fn navigation(web_bundle: &str) -> String {
    let mut hash = String::from(
        "<div class=\"panel yellow\"><p>This page demonstrates various navigation patterns that can challenge web crawlers.</p></div>\
         <div class=\"box\"><h3>Hash-Based Navigation</h3>\
         <p>Hash-based navigation often confuses crawlers as they may ignore everything after the # symbol.</p><p>",
    );
    for p in &fixtures::HASH_SECTIONS {
        let _ = write!(hash, "<a href=\"#{}\">Go to {}</a> ", p.id, escape(p.title));
    }
    hash.push_str("</p>");
    hash.push_str(&panels(&fixtures::HASH_SECTIONS, "h4"));
    hash.push_str("</div>");
    hash.push_str(&island(
        IslandKind::DynamicNavigation,
        &[],
        "<div class=\"box\"><h3>Delayed Navigation Links</h3><p>Loading navigation links...</p></div>",
    ));

    let redirect = format!(
        "<p>Navigate to a page with server-side redirect:</p><a class=\"btn\" href=\"{}\">Page with Redirect</a>",
        Route::Redirect.path()
    );

    let mut deep = format!(
        "<p>This test shows a deep linking structure that requires following multiple links:</p>\
         <div class=\"box\"><a href=\"{}\">Level 1 Page</a>",
        deep_level_path(1)
    );
    for level in 2..=DEEP_LINK_MAX_LEVEL {
        let _ = write!(
            deep,
            "<div style=\"margin-left:2rem\"><span class=\"muted\">↳ Level {level} (only accessible from Level {})</span>",
            level - 1
        );
    }
    for _ in 2..=DEEP_LINK_MAX_LEVEL {
        deep.push_str("</div>");
    }
    deep.push_str("</div>");

    let mut limited =
        String::from("<p>These links lead to pages that implement server-side rate limiting:</p><div class=\"cards\">");
    for n in 1..=RATE_LIMITED_PAGES {
        let _ = write!(
            limited,
            "<a class=\"panel yellow\" href=\"{}\">Rate Limited Page {n}</a>",
            Route::RateLimited(n).path()
        );
    }
    let _ = write!(
        limited,
        "</div><p class=\"muted\">{}</p>",
        escape(fixtures::RATE_LIMITED_NOTE)
    );

    let body = page_intro(Page::Navigation) + &cases(Page::Navigation, &[hash, redirect, deep, limited]);
    page_document(Page::Navigation, "", web_bundle, &body)
}

pub fn content_visibility(web_bundle: &str) -> String {
    let mut css = String::from("<div class=\"panel gray\"><h3>Various CSS Hiding Techniques:</h3>");
    for technique in &fixtures::CSS_HIDING {
        let _ = write!(
            css,
            "<div><p><strong>{}</strong></p><div class=\"box\"><p>This text is visible normally.</p><p style=\"{}\">{}</p></div></div>",
            escape(technique.label),
            technique.style,
            escape(technique.text)
        );
    }
    css.push_str("</div>");

    let inner = [
        island(IslandKind::HiddenContent, &[], ""),
        island(IslandKind::ModalDialog, &[], ""),
        css,
    ];
    let body = page_intro(Page::ContentVisibility) + &cases(Page::ContentVisibility, &inner);
    page_document(Page::ContentVisibility, "", web_bundle, &body)
}

pub fn technical(web_bundle: &str) -> String {
    let cookie = format!(
        "<p>This test demonstrates content that depends on cookies:</p>{}\
         <div class=\"panel yellow\"><p><strong>Cookie Experiment:</strong> Try opening this page in a private/incognito window or after clearing cookies. The content above will change.</p></div>",
        island(IslandKind::CookieProbe, &[], "<div class=\"panel blue\"><p>Cookie value: <strong></strong></p></div>")
    );
    let fingerprint = format!(
        "<p>This test shows browser fingerprinting data that might identify a crawler:</p>{}",
        island(IslandKind::Fingerprint, &[], "")
    );

    let mut svg = String::from(
        "<svg width=\"300\" height=\"100\" xmlns=\"http://www.w3.org/2000/svg\"><rect width=\"100%\" height=\"100%\" fill=\"#f8f9fa\"/>",
    );
    for (i, line) in fixtures::SVG_LINES.iter().enumerate() {
        let _ = write!(
            svg,
            "<text x=\"10\" y=\"{}\" font-family=\"Arial\" font-size=\"12\" fill=\"black\">{}</text>",
            30 + 20 * i,
            escape(line)
        );
    }
    svg.push_str("</svg>");
    let graphics = format!(
        "<div class=\"cards\"><div><h3>SVG Content:</h3><div class=\"box\">{svg}</div></div>\
         <div><h3>Canvas Content:</h3><div class=\"box\">{}</div></div></div>",
        island(IslandKind::CanvasText, &[], "")
    );
    let iframe = format!(
        "<p>This test shows content embedded in an iframe:</p><div class=\"box\">{}</div>",
        island(IslandKind::IframeEmbed, &[], "")
    );

    let body = page_intro(Page::Technical) + &cases(Page::Technical, &[cookie, fingerprint, graphics, iframe]);
    page_document(Page::Technical, "", web_bundle, &body)
}

pub fn deep_level(level: u8, web_bundle: &str) -> String {
    let mut body = format!(
        "<h1>Level {level} Page</h1><p>{}</p>",
        escape(&fixtures::deep_level_intro(level))
    );
    if level < DEEP_LINK_MAX_LEVEL {
        let _ = write!(
            body,
            "<div class=\"box\"><p>To test crawler depth, this link leads to an even deeper page:</p><a href=\"{}\">Go to Level {}</a></div>",
            deep_level_path(level + 1),
            level + 1
        );
    } else {
        let _ = write!(body, "<div class=\"box\"><p>{}</p></div>", escape(fixtures::DEEPEST_LEVEL_NOTE));
    }
    let _ = write!(
        body,
        "<div class=\"panel yellow\"><p><strong>Deep Linking Challenge:</strong> {}</p></div>",
        escape(fixtures::deep_level_challenge(level))
    );
    if level > 1 {
        let _ = write!(
            body,
            "<p><a href=\"{}\">← Back to Level {}</a></p>",
            deep_level_path(level - 1),
            level - 1
        );
    }
    document(
        &format!("Level {level} Page | {SITE_TITLE}"),
        Page::Navigation.meta_description(),
        "",
        web_bundle,
        &body,
    )
}

pub fn rate_limited(n: u8, remaining: u32, web_bundle: &str) -> String {
    let body = format!(
        "<h1>Rate Limited Page {n}</h1><p>{}</p><p class=\"muted\">Requests left in this window: {remaining}</p>\
         <p><a href=\"{}\">← Back to Navigation</a></p>",
        escape(&fixtures::rate_limited_body(n)),
        Page::Navigation.path()
    );
    document(
        &format!("Rate Limited Page {n} | {SITE_TITLE}"),
        Page::Navigation.meta_description(),
        "",
        web_bundle,
        &body,
    )
}

pub fn too_many_requests(retry_after_secs: u64, web_bundle: &str) -> String {
    let body = format!(
        "<h1>Too Many Requests</h1><p>You have made too many requests in a short period. Try again in {retry_after_secs} second(s).</p>"
    );
    document(
        &format!("Too Many Requests | {SITE_TITLE}"),
        Page::Navigation.meta_description(),
        "",
        web_bundle,
        &body,
    )
}

/// Framed document without the site chrome.
pub fn iframe_content() -> String {
    let mut html = format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\"><title>{}</title></head><body><div><h2>{}</h2>",
        escape(fixtures::IFRAME_TITLE),
        escape(fixtures::IFRAME_TITLE)
    );
    for p in &fixtures::IFRAME_PARAGRAPHS {
        let _ = write!(html, "<p>{}</p>", escape(p));
    }
    html.push_str("</div></body></html>");
    html
}

pub fn not_found(path: &str, web_bundle: &str) -> String {
    let body = format!(
        "<h1>404 - Page Not Found</h1><p>No page exists at <code>{}</code>.</p><p><a href=\"/\">Back to Home</a></p>",
        escape(path)
    );
    document(&format!("Not Found | {SITE_TITLE}"), crawltest::catalog::SITE_DESCRIPTION, "", web_bundle, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUNDLE: &str = "/pkg/crawltest_web.js";

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn layout_carries_title_nav_and_bundle() {
        let html = home(BUNDLE);
        assert!(html.contains("<title>Crawler Test Site</title>"));
        for page in Page::all() {
            assert!(html.contains(&format!("href=\"{}\"", page.path())), "{page:?}");
        }
        assert!(html.contains("import init from \"/pkg/crawltest_web.js\""));
        assert!(html.ends_with("</html>"));
    }

    #[test]
    fn server_side_embeds_time_items_and_json_ld() {
        let html = server_side("1/2/2026, 3:04:05 PM", BUNDLE);
        assert!(html.contains("1/2/2026, 3:04:05 PM"));
        assert!(html.contains("Server rendered item 3"));
        assert!(html.contains("application/ld+json"));
        assert!(html.contains("&quot;@type&quot;: &quot;WebPage&quot;"));
    }

    #[test]
    fn client_side_leaves_mount_points() {
        let html = client_side(BUNDLE);
        for kind in [
            IslandKind::ClientData,
            IslandKind::DynamicClock,
            IslandKind::LazyContent,
            IslandKind::InfiniteScroll,
        ] {
            assert!(html.contains(&format!("data-island=\"{}\"", kind.attr())));
        }
        assert!(html.contains("data-delay=\"3000\""));
        // Client-only content must not be server-rendered.
        assert!(!html.contains("Client-rendered item 1"));
    }

    #[test]
    fn hybrid_parts_reassemble_into_one_document() {
        let parts = hybrid("now", BUNDLE);
        assert!(parts.head.contains(fixtures::STREAM_FALLBACK));
        assert_eq!(parts.sections.len(), 3);
        let delays: Vec<u32> = parts.sections.iter().map(|(d, _)| *d).collect();
        assert_eq!(delays, vec![1, 2, 3]);
        assert!(parts.tail.starts_with("<style>#stream-fallback{display:none}</style>"));
        assert!(parts.tail.contains("data-island=\"enhanced-content\""));
        assert!(parts.tail.ends_with(document_close()));
    }

    #[test]
    fn deep_levels_link_forward_and_back() {
        let first = deep_level(1, BUNDLE);
        assert!(first.contains("href=\"/navigation/level1/level2\""));
        assert!(!first.contains("Back to Level"));

        let last = deep_level(DEEP_LINK_MAX_LEVEL, BUNDLE);
        assert!(last.contains(fixtures::DEEPEST_LEVEL_NOTE));
        assert!(last.contains("Back to Level 4"));
    }

    #[test]
    fn navigation_lists_every_rate_limited_page() {
        let html = navigation(BUNDLE);
        for n in 1..=RATE_LIMITED_PAGES {
            assert!(html.contains(&Route::RateLimited(n).path()));
        }
        assert!(html.contains("href=\"#section2\""));
        assert!(html.contains("href=\"/navigation/redirect\""));
    }

    #[test]
    fn css_hiding_text_stays_in_the_dom() {
        let html = content_visibility(BUNDLE);
        assert!(html.contains("style=\"display:none\""));
        assert!(html.contains("position:absolute;left:-9999px"));
    }

    #[test]
    fn not_found_escapes_the_path() {
        let html = not_found("/<script>", BUNDLE);
        assert!(html.contains("/&lt;script&gt;"));
    }
}
