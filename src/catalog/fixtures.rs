//! Copy rendered by the server and the browser islands.

use super::TestCaseInfo;

const fn case(
    title: &'static str,
    description: &'static str,
    expected_behavior: &'static str,
    crawler_challenge: &'static str,
) -> TestCaseInfo {
    TestCaseInfo {
        title,
        description,
        expected_behavior: Some(expected_behavior),
        crawler_challenge: Some(crawler_challenge),
    }
}

pub const SERVER_SIDE_CASES: &[TestCaseInfo] = &[
    case(
        "Basic Server-Side Rendered Content",
        "This content is rendered on the server before the response is sent.",
        "Crawlers should easily find and index this content as it's immediately available in the HTML response.",
        "None - this is the most crawler-friendly approach.",
    ),
    case(
        "Server-Side Rendered Data",
        "Data fetched during server-side rendering and included in the initial HTML.",
        "Crawlers should easily find and index this content as it's part of the initial HTML response.",
        "None - data fetching happens on the server before the HTML is sent to the client.",
    ),
    case(
        "Meta Tags and Structured Data",
        "Server-rendered meta tags and structured data for SEO.",
        "Crawlers should process this metadata to understand page content and context.",
        "None - metadata is delivered with the initial page load.",
    ),
];

pub const CLIENT_SIDE_CASES: &[TestCaseInfo] = &[
    case(
        "Basic Client-Side Rendered Content",
        "Content that's loaded after the initial page render using JavaScript.",
        "Crawlers that execute JavaScript should eventually see this content, but those that don't will miss it.",
        "Content isn't present in the initial HTML response, requiring JavaScript execution to become visible.",
    ),
    case(
        "Dynamic Content Updates",
        "Content that changes periodically using client-side JavaScript.",
        "Crawlers might capture only a single state of this dynamic content, missing its changing nature.",
        "Timing-dependent content that changes every few seconds might be missed or inconsistently captured.",
    ),
    case(
        "Lazy-Loaded Content",
        "Content that loads after a delay or when it comes into viewport.",
        "Crawlers with short timeouts or limited JavaScript execution may miss this delayed content.",
        "Content appears after a significant delay, testing crawler patience and resource allocation.",
    ),
    case(
        "Infinite Scroll Content",
        "Content that loads as the user scrolls down the page.",
        "Most crawlers will only see the initial content and miss items loaded during scrolling.",
        "Content beyond the initial viewport requires scroll events and additional JavaScript execution.",
    ),
];

pub const HYBRID_CASES: &[TestCaseInfo] = &[
    case(
        "Islands Architecture",
        "Static/server-rendered content with interactive client-rendered 'islands'.",
        "Crawlers should see the server-rendered content, but might miss client-side enhancements.",
        "Distinguishing between the baseline server content and enhanced client-side functionality.",
    ),
    case(
        "Streaming Server-Side Rendering",
        "Content that streams from the server progressively.",
        "Crawlers should eventually see all content, but might capture an incomplete state.",
        "Content appears in stages, testing if crawlers wait for the complete render.",
    ),
    case(
        "Progressive Enhancement",
        "Content that works without JavaScript but gets enhanced with it.",
        "All crawlers should see the base content, JavaScript-enabled ones will see enhancements.",
        "Determining which crawler capabilities match which version of the content.",
    ),
];

pub const NAVIGATION_CASES: &[TestCaseInfo] = &[
    case(
        "Navigation Patterns",
        "Various navigation patterns that can confuse crawlers.",
        "Crawlers should discover and follow all navigation paths to index all content.",
        "Different navigation mechanisms require different crawler capabilities and may be handled inconsistently.",
    ),
    case(
        "Page with Redirect",
        "This section contains a link to a page that will redirect.",
        "Crawlers should follow the redirect chain and index the final destination.",
        "Some crawlers may not follow all redirects or may have limits on redirect chains.",
    ),
    case(
        "Deep Link Structure",
        "Links nested deeply in the site structure.",
        "Crawlers should follow links several levels deep to discover all content.",
        "Some crawlers have depth limitations or may prioritize breadth over depth.",
    ),
    case(
        "Rate-Limited Navigation",
        "Pages that implement rate limiting for too frequent requests.",
        "Crawlers with appropriate rate limiting should be able to access all content.",
        "Aggressive crawlers may hit rate limits and miss content or be blocked temporarily.",
    ),
];

pub const CONTENT_VISIBILITY_CASES: &[TestCaseInfo] = &[
    case(
        "Hidden Content Elements",
        "Content that is hidden behind user interactions like clicks, hovers, or tabs.",
        "Crawlers should ideally discover content hidden in tabs, accordions, and behind interactions.",
        "Most crawlers don't trigger user interactions and may miss content that requires clicks or hovers.",
    ),
    case(
        "Modal Dialogs",
        "Content displayed in modal dialogs that overlay the page.",
        "Advanced crawlers might analyze the modal content in the page source.",
        "Modal content is typically not visible until triggered by user interaction.",
    ),
    case(
        "CSS-Hidden Content",
        "Content that is hidden using different CSS techniques.",
        "Crawlers' handling of CSS-hidden content varies widely.",
        "Different hiding techniques may be treated differently by crawlers.",
    ),
];

pub const TECHNICAL_CASES: &[TestCaseInfo] = &[
    case(
        "Cookie-Dependent Content",
        "Content that changes based on cookies set in the browser.",
        "Crawlers that maintain cookie state should see this content correctly.",
        "Many crawlers don't maintain cookie state between requests or have limited cookie support.",
    ),
    case(
        "Browser Fingerprinting",
        "Content that changes based on browser characteristics.",
        "Crawlers might see different content than regular browsers due to their technical fingerprint.",
        "Crawlers often have unique browser fingerprints that can be detected and served different content.",
    ),
    case(
        "SVG and Canvas Content",
        "Content rendered using SVG and Canvas elements.",
        "Advanced crawlers might extract text from SVG, but most will miss Canvas content.",
        "Content in SVG and especially Canvas is difficult for crawlers to parse and index.",
    ),
    case(
        "iFrame Content",
        "Content embedded within iframes from the same or different domains.",
        "Some crawlers follow iframes, others ignore them entirely.",
        "Content in iframes may be missed or treated separately from the main page content.",
    ),
];

// Server side.

pub const SERVER_ITEMS: [&str; 3] = [
    "Server rendered item 1",
    "Server rendered item 2",
    "Server rendered item 3",
];

pub const HYBRID_SERVER_ITEMS: [&str; 3] = [
    "Server data item 1",
    "Server data item 2",
    "Server data item 3",
];

pub const PROGRESSIVE_BASE_POINTS: [&str; 3] = [
    "Basic information point 1",
    "Basic information point 2",
    "Basic information point 3",
];

pub const STREAM_FALLBACK: &str = "Loading streaming content...";

/// One progressively streamed section of the hybrid page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSection {
    pub index: u32,
    /// Delay before this section, in stream units (seconds by default).
    pub delay_units: u32,
    pub title: String,
    pub content: String,
}

pub fn stream_sections() -> Vec<StreamSection> {
    (1..=3)
        .map(|i| StreamSection {
            index: i,
            delay_units: i,
            title: format!("Streamed Content Section {i}"),
            content: format!(
                "This content was streamed after a {i} second delay. Streaming content arrives progressively, challenging crawlers to wait for the full page to load."
            ),
        })
        .collect()
}

// Client side.

pub const CLIENT_DATA_DELAY_MS: u32 = 2000;
pub const DYNAMIC_CLOCK_PERIOD_MS: u32 = 5000;

pub const CLIENT_ITEMS: [&str; 3] = [
    "Client-rendered item 1",
    "Client-rendered item 2",
    "Client-rendered item 3",
];

pub const LAZY_DEMO_DELAY_MS: u32 = 3000;
pub const LAZY_DEMO_CONTENT: &str = "This content was lazy-loaded after a 3-second delay. Many crawlers might timeout before seeing this content.";

pub fn dynamic_clock_text(local_time: &str) -> String {
    format!("This content was dynamically generated on the client at {local_time}.")
}

// Content visibility.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panel {
    pub id: &'static str,
    pub title: &'static str,
    pub content: &'static str,
}

pub const TABS: [Panel; 3] = [
    Panel {
        id: "tab1",
        title: "Tab 1",
        content: "This is content in Tab 1. Many crawlers will miss this content because it requires a tab click to reveal.",
    },
    Panel {
        id: "tab2",
        title: "Tab 2",
        content: "This is content in Tab 2. This text is vital for indexing but hidden behind a tab interface.",
    },
    Panel {
        id: "tab3",
        title: "Tab 3",
        content: "This is content in Tab 3. Important information might be missed here by crawlers.",
    },
];

pub const ACCORDIONS: [Panel; 3] = [
    Panel {
        id: "acc1",
        title: "Accordion Section 1",
        content: "Hidden content in accordion section 1. Crawlers often miss accordion content.",
    },
    Panel {
        id: "acc2",
        title: "Accordion Section 2",
        content: "Hidden content in accordion section 2. This information is not immediately visible.",
    },
    Panel {
        id: "acc3",
        title: "Accordion Section 3",
        content: "Hidden content in accordion section 3. Important details might be placed here.",
    },
];

pub const MODALS: [Panel; 3] = [
    Panel {
        id: "basic",
        title: "Basic Modal",
        content: "This is content inside a basic modal. Web crawlers typically cannot access modal content because it requires user interaction to display and is often not in the initial DOM.",
    },
    Panel {
        id: "important",
        title: "Important Information",
        content: "This modal contains critical information that should be indexed but might be missed by crawlers. Modal content is a common SEO problem because important details are hidden from search engines.",
    },
    Panel {
        id: "terms",
        title: "Terms and Conditions",
        content: "Legal terms and conditions are often placed in modals, which might prevent search engines from properly indexing this information. This is particularly problematic for compliance and legal disclosures that should be discoverable.",
    },
];

pub const MODAL_BUTTON_LABELS: [&str; 3] = [
    "Open Basic Modal",
    "Open Important Info Modal",
    "Open Terms & Conditions",
];

pub const CLICK_REVEAL_TEXT: [&str; 2] = [
    "This content is only visible after clicking the button. Crawlers that don't interact with the page will miss this text entirely.",
    "Some important information might be hidden behind click interactions like this.",
];

pub const HOVER_REVEAL_TEXT: &str = "This content only appears on hover. Most crawlers will never see this text because they don't trigger hover events.";

/// A CSS technique that keeps text in the DOM but hides it from users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CssHiding {
    pub label: &'static str,
    pub style: &'static str,
    pub text: &'static str,
}

pub const CSS_HIDING: [CssHiding; 5] = [
    CssHiding {
        label: "1. Display: None",
        style: "display:none",
        text: "This text is hidden with display:none. Many crawlers will ignore this content completely. This could contain important information that won't be indexed.",
    },
    CssHiding {
        label: "2. Visibility: Hidden",
        style: "visibility:hidden;height:20px",
        text: "This text is hidden with visibility:hidden. Some crawlers may index this despite it being invisible.",
    },
    CssHiding {
        label: "3. Opacity: 0",
        style: "opacity:0;height:20px",
        text: "This text is hidden with opacity:0. Many crawlers will index this content as it's in the DOM.",
    },
    CssHiding {
        label: "4. Text Color Matching Background",
        style: "color:white;background:white",
        text: "This text is hidden by making it white on white background. This technique is considered \"cloaking\" and can lead to SEO penalties if detected.",
    },
    CssHiding {
        label: "5. Position Off-Screen",
        style: "position:absolute;left:-9999px",
        text: "This text is positioned off-screen. Many crawlers will still index this content despite it not being visible to users.",
    },
];

// Navigation.

pub const HASH_SECTIONS: [Panel; 3] = [
    Panel {
        id: "section1",
        title: "Section 1",
        content: "This content is accessed via hash navigation (#section1). Some crawlers might not properly index content that's targeted via hash navigation.",
    },
    Panel {
        id: "section2",
        title: "Section 2",
        content: "This is Section 2 content, accessed via #section2 hash. Hash navigation is commonly used for single-page applications and can cause indexing issues.",
    },
    Panel {
        id: "section3",
        title: "Section 3",
        content: "This is Section 3 content, accessed via #section3 hash. Crawlers that don't process JavaScript may not correctly handle hash-based navigation.",
    },
];

pub const DELAYED_LINK_MS: u32 = 3000;
pub const CLIENT_REDIRECT_MS: u32 = 1000;

pub const VIRTUAL_PAGE_TITLE: &str = "Virtual Page Content";
pub const VIRTUAL_PAGE_TEXT: [&str; 2] = [
    "This content was loaded without changing the URL. Many crawlers won't detect this content change.",
    "This technique is used in single-page applications and can cause crawlers to miss content.",
];

/// Body copy for `/navigation/level1/.../levelN`.
pub fn deep_level_intro(level: u8) -> String {
    if level <= 1 {
        "This is Level 1 of the deep link structure test. Crawlers need to navigate to this page to find deeper content.".to_string()
    } else {
        format!(
            "This is Level {level} of the deep link structure test. Crawlers that found Level {} need to follow links to discover this content.",
            level - 1
        )
    }
}

pub fn deep_level_challenge(level: u8) -> &'static str {
    if level <= 1 {
        "Some crawlers have depth limitations or may not prioritize following links that lead multiple levels deep into a site. Content at deeper levels might not be discovered."
    } else {
        "As we go deeper in the site structure, the likelihood of crawlers discovering and indexing this content decreases. Some crawlers have explicit depth limits or computational constraints that prevent them from exploring deeply nested pages."
    }
}

pub const DEEPEST_LEVEL_NOTE: &str = "You have reached the deepest level of the link structure. Crawlers that index this page followed every link in the chain.";

pub const RATE_LIMITED_NOTE: &str = "Note: Repeatedly accessing these pages in quick succession will trigger a rate limit response.";

pub fn rate_limited_body(n: u8) -> String {
    format!(
        "This is rate-limited page {n}. It is served only while the client stays under the request budget; crawlers that fetch too quickly receive HTTP 429 instead."
    )
}

// Technical.

pub const COOKIE_NAME: &str = "crawlerTestCookie";
pub const COOKIE_VALUE: &str = "this-is-a-test-value";
pub const COOKIE_MAX_AGE_SECS: u32 = 3600;
pub const COOKIE_MISSING: &str = "No cookie found";

pub const SVG_LINES: [&str; 3] = [
    "This text is inside an SVG element.",
    "Some crawlers might not extract this.",
    "Important SVG content might be missed.",
];

pub const CANVAS_LINES: [&str; 3] = [
    "This text is drawn on a Canvas element.",
    "Most crawlers cannot read this text at all.",
    "Critical content here would be invisible to search.",
];

pub const IFRAME_TITLE: &str = "iFrame Content";
pub const IFRAME_PARAGRAPHS: [&str; 3] = [
    "This content is loaded within an iframe.",
    "Crawlers handle iframe content differently, with some indexing this text and others ignoring it entirely.",
    "This critical information might be missed by crawlers that don't process iframes.",
];

/// Extract a cookie value from a `document.cookie` style string.
pub fn find_cookie<'a>(cookies: &'a str, name: &str) -> Option<&'a str> {
    cookies.split(';').map(str::trim).find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then_some(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_sections_arrive_one_two_three() {
        let sections = stream_sections();
        let delays: Vec<u32> = sections.iter().map(|s| s.delay_units).collect();
        assert_eq!(delays, vec![1, 2, 3]);
        assert!(sections[1].content.contains("2 second delay"));
    }

    #[test]
    fn panel_ids_are_unique_per_group() {
        for group in [&TABS, &ACCORDIONS, &MODALS, &HASH_SECTIONS] {
            let mut ids: Vec<&str> = group.iter().map(|p| p.id).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), group.len());
        }
    }

    #[test]
    fn find_cookie_matches_exact_names() {
        let jar = "other=1; crawlerTestCookie=this-is-a-test-value; x=y";
        assert_eq!(find_cookie(jar, COOKIE_NAME), Some(COOKIE_VALUE));
        assert_eq!(find_cookie(jar, "crawlerTest"), None);
        assert_eq!(find_cookie("", COOKIE_NAME), None);
    }

    #[test]
    fn deep_level_copy_refers_to_parent() {
        assert!(deep_level_intro(1).contains("Level 1"));
        assert!(deep_level_intro(4).contains("found Level 3"));
    }
}
