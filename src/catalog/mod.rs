//! Page, route and island inventory shared by the server and the browser app.
//!
//! Keeping these out of the wasm-only code lets both sides agree on paths and
//! mount points, and lets us unit-test the inventory on the host.

pub mod fixtures;

/// Deepest page of the deep-link chain.
pub const DEEP_LINK_MAX_LEVEL: u8 = 5;
/// Number of rate-limited pages linked from the navigation page.
pub const RATE_LIMITED_PAGES: u8 = 3;

pub const SITE_TITLE: &str = "Crawler Test Site";
pub const SITE_DESCRIPTION: &str = "A site for testing web crawlers against various edge cases";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    ServerSide,
    ClientSide,
    Hybrid,
    Navigation,
    ContentVisibility,
    Technical,
}

impl Page {
    pub fn path(self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::ServerSide => "/server-side",
            Page::ClientSide => "/client-side",
            Page::Hybrid => "/hybrid",
            Page::Navigation => "/navigation",
            Page::ContentVisibility => "/content-visibility",
            Page::Technical => "/technical",
        }
    }

    /// Label used in the header navigation.
    pub fn nav_label(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::ServerSide => "Server Side",
            Page::ClientSide => "Client Side",
            Page::Hybrid => "Hybrid",
            Page::Navigation => "Navigation",
            Page::ContentVisibility => "Content Visibility",
            Page::Technical => "Technical",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            Page::Home => "Web Crawler Test Site",
            Page::ServerSide => "Server-Side Rendering Tests",
            Page::ClientSide => "Client-Side Rendering Tests",
            Page::Hybrid => "Hybrid Rendering Tests",
            Page::Navigation => "Navigation Challenges",
            Page::ContentVisibility => "Content Visibility Challenges",
            Page::Technical => "Technical Challenges",
        }
    }

    /// Document `<title>`.
    pub fn title(self) -> String {
        match self {
            Page::Home => SITE_TITLE.to_string(),
            _ => format!("{} | {SITE_TITLE}", self.heading()),
        }
    }

    pub fn meta_description(self) -> &'static str {
        match self {
            Page::Home => SITE_DESCRIPTION,
            Page::ServerSide => "Tests for server-side rendered content that should be crawler-friendly",
            Page::ClientSide => "Tests for content rendered in the browser after the page loads",
            Page::Hybrid => "Tests for hybrid rendering approaches mixing server and client rendering",
            Page::Navigation => "Testing various navigation patterns that challenge web crawlers",
            Page::ContentVisibility => "Testing content that is conditionally visible or requires user interaction",
            Page::Technical => "Testing technical implementation details that can be problematic for crawlers",
        }
    }

    /// Short blurb for the home page card. Home itself has none.
    pub fn card_blurb(self) -> Option<&'static str> {
        match self {
            Page::Home => None,
            Page::ServerSide => Some("Tests for content rendered on the server before being sent to the browser."),
            Page::ClientSide => Some("Tests for content generated in the browser using JavaScript after the page loads."),
            Page::Hybrid => Some("Tests for content using a mix of server and client rendering techniques."),
            Page::Navigation => Some("Tests for different navigation patterns that might confuse crawlers."),
            Page::ContentVisibility => Some("Tests for content that's conditionally visible or hidden based on user interaction."),
            Page::Technical => Some("Tests for technical implementation details that can be problematic for crawlers."),
        }
    }

    /// Page introduction shown under the heading.
    pub fn intro(self) -> &'static str {
        match self {
            Page::Home => "This site contains various edge cases designed to challenge web crawlers. Each section tests different aspects that might cause crawlers to fail or miss content.",
            Page::ServerSide => "These tests demonstrate content that is rendered on the server before being sent to the browser. Server-side rendering (SSR) is generally crawler-friendly because the content is already in the HTML response.",
            Page::ClientSide => "These tests demonstrate content that is rendered in the browser using JavaScript after the page loads. Client-side rendering (CSR) can be challenging for crawlers that don't execute JavaScript or have time limitations.",
            Page::Hybrid => "These tests demonstrate content using a mix of server-side and client-side rendering techniques. Hybrid approaches can create challenges for crawlers that don't fully execute JavaScript or handle streaming content.",
            Page::Navigation => "These tests demonstrate different navigation patterns that can be challenging for web crawlers to handle correctly. Navigation is a critical aspect of crawling, and various techniques can cause crawlers to miss content or incorrectly process the site structure.",
            Page::ContentVisibility => "These tests demonstrate content that is conditionally visible or hidden based on user interaction. Many crawlers struggle with content that isn't immediately visible when the page loads.",
            Page::Technical => "These tests demonstrate technical implementation details that can be problematic for crawlers. They focus on browser-specific features, cookies, authentication, and other technical aspects.",
        }
    }

    /// Test cases in display order.
    pub fn test_cases(self) -> &'static [TestCaseInfo] {
        match self {
            Page::Home => &[],
            Page::ServerSide => fixtures::SERVER_SIDE_CASES,
            Page::ClientSide => fixtures::CLIENT_SIDE_CASES,
            Page::Hybrid => fixtures::HYBRID_CASES,
            Page::Navigation => fixtures::NAVIGATION_CASES,
            Page::ContentVisibility => fixtures::CONTENT_VISIBILITY_CASES,
            Page::Technical => fixtures::TECHNICAL_CASES,
        }
    }

    /// Header navigation order.
    pub fn all() -> &'static [Page] {
        &[
            Page::Home,
            Page::ServerSide,
            Page::ClientSide,
            Page::Hybrid,
            Page::Navigation,
            Page::ContentVisibility,
            Page::Technical,
        ]
    }
}

/// Descriptive frame around one challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestCaseInfo {
    pub title: &'static str,
    pub description: &'static str,
    pub expected_behavior: Option<&'static str>,
    pub crawler_challenge: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Page(Page),
    /// `/navigation/level1/.../levelN`, N in `1..=DEEP_LINK_MAX_LEVEL`.
    DeepLevel(u8),
    /// Server-side redirect to `/`.
    Redirect,
    /// `/navigation/rate-limited/{n}`, n in `1..=RATE_LIMITED_PAGES`.
    RateLimited(u8),
    IframeContent,
}

impl Route {
    /// Resolve a request path. A trailing slash is tolerated; query strings
    /// and fragments must already be stripped.
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        let trimmed = if trimmed.is_empty() { "/" } else { trimmed };

        if let Some(page) = Page::all().iter().copied().find(|p| p.path() == trimmed) {
            return Some(Route::Page(page));
        }

        let segments: Vec<&str> = trimmed.trim_start_matches('/').split('/').collect();
        match segments.as_slice() {
            ["navigation", "redirect"] => Some(Route::Redirect),
            ["technical", "iframe-content"] => Some(Route::IframeContent),
            ["navigation", "rate-limited", n] => n
                .parse::<u8>()
                .ok()
                .filter(|n| (1..=RATE_LIMITED_PAGES).contains(n))
                .map(Route::RateLimited),
            ["navigation", levels @ ..] if !levels.is_empty() => {
                let depth = levels.len();
                let chain_ok = levels
                    .iter()
                    .enumerate()
                    .all(|(i, seg)| *seg == format!("level{}", i + 1));
                if chain_ok && depth <= DEEP_LINK_MAX_LEVEL as usize {
                    Some(Route::DeepLevel(depth as u8))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub fn path(self) -> String {
        match self {
            Route::Page(page) => page.path().to_string(),
            Route::DeepLevel(level) => deep_level_path(level),
            Route::Redirect => "/navigation/redirect".to_string(),
            Route::RateLimited(n) => format!("/navigation/rate-limited/{n}"),
            Route::IframeContent => "/technical/iframe-content".to_string(),
        }
    }

    /// Every concrete route, for inventories and sitemaps.
    pub fn all() -> Vec<Route> {
        let mut routes: Vec<Route> = Page::all().iter().copied().map(Route::Page).collect();
        routes.extend((1..=DEEP_LINK_MAX_LEVEL).map(Route::DeepLevel));
        routes.push(Route::Redirect);
        routes.extend((1..=RATE_LIMITED_PAGES).map(Route::RateLimited));
        routes.push(Route::IframeContent);
        routes
    }
}

pub fn deep_level_path(level: u8) -> String {
    let mut path = String::from("/navigation");
    for i in 1..=level {
        path.push_str(&format!("/level{i}"));
    }
    path
}

/// Client-only regions the server leaves as empty mount points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IslandKind {
    ClientData,
    DynamicClock,
    LazyContent,
    InfiniteScroll,
    ClientCounter,
    EnhancedContent,
    HiddenContent,
    ModalDialog,
    DynamicNavigation,
    CookieProbe,
    Fingerprint,
    CanvasText,
    IframeEmbed,
}

impl IslandKind {
    /// Value of the `data-island` attribute.
    pub fn attr(self) -> &'static str {
        match self {
            IslandKind::ClientData => "client-data",
            IslandKind::DynamicClock => "dynamic-clock",
            IslandKind::LazyContent => "lazy-content",
            IslandKind::InfiniteScroll => "infinite-scroll",
            IslandKind::ClientCounter => "client-counter",
            IslandKind::EnhancedContent => "enhanced-content",
            IslandKind::HiddenContent => "hidden-content",
            IslandKind::ModalDialog => "modal-dialog",
            IslandKind::DynamicNavigation => "dynamic-navigation",
            IslandKind::CookieProbe => "cookie-probe",
            IslandKind::Fingerprint => "fingerprint",
            IslandKind::CanvasText => "canvas-text",
            IslandKind::IframeEmbed => "iframe-embed",
        }
    }

    pub fn parse(attr: &str) -> Option<IslandKind> {
        IslandKind::all().iter().copied().find(|k| k.attr() == attr)
    }

    pub fn all() -> &'static [IslandKind] {
        &[
            IslandKind::ClientData,
            IslandKind::DynamicClock,
            IslandKind::LazyContent,
            IslandKind::InfiniteScroll,
            IslandKind::ClientCounter,
            IslandKind::EnhancedContent,
            IslandKind::HiddenContent,
            IslandKind::ModalDialog,
            IslandKind::DynamicNavigation,
            IslandKind::CookieProbe,
            IslandKind::Fingerprint,
            IslandKind::CanvasText,
            IslandKind::IframeEmbed,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_inventory_is_stable() {
        let all = Page::all();
        assert_eq!(all.len(), 7);
        assert_eq!(all[0], Page::Home);

        let mut paths: Vec<&str> = all.iter().map(|p| p.path()).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), 7);

        for p in all {
            assert!(!p.nav_label().trim().is_empty());
            assert!(!p.meta_description().trim().is_empty());
            assert!(p.title().contains(SITE_TITLE));
            assert_eq!(p.card_blurb().is_none(), *p == Page::Home);
            assert_eq!(p.test_cases().is_empty(), *p == Page::Home);
        }
    }

    #[test]
    fn every_route_round_trips_through_its_path() {
        for route in Route::all() {
            assert_eq!(Route::parse(&route.path()), Some(route), "{route:?}");
        }
    }

    #[test]
    fn parse_tolerates_trailing_slash() {
        assert_eq!(Route::parse("/"), Some(Route::Page(Page::Home)));
        assert_eq!(Route::parse("/hybrid/"), Some(Route::Page(Page::Hybrid)));
        assert_eq!(
            Route::parse("/navigation/level1/level2/"),
            Some(Route::DeepLevel(2))
        );
    }

    #[test]
    fn parse_rejects_broken_chains_and_ranges() {
        assert_eq!(Route::parse("/navigation/level2"), None);
        assert_eq!(Route::parse("/navigation/level1/level3"), None);
        assert_eq!(Route::parse(&deep_level_path(DEEP_LINK_MAX_LEVEL + 1)), None);
        assert_eq!(Route::parse("/navigation/rate-limited/0"), None);
        assert_eq!(Route::parse("/navigation/rate-limited/4"), None);
        assert_eq!(Route::parse("/navigation/rate-limited/x"), None);
        assert_eq!(Route::parse("/nope"), None);
    }

    #[test]
    fn island_attrs_are_unique_and_parse_back() {
        let all = IslandKind::all();
        let mut attrs: Vec<&str> = all.iter().map(|k| k.attr()).collect();
        attrs.sort_unstable();
        attrs.dedup();
        assert_eq!(attrs.len(), all.len());
        for k in all {
            assert_eq!(IslandKind::parse(k.attr()), Some(*k));
        }
        assert_eq!(IslandKind::parse("unknown"), None);
    }
}
