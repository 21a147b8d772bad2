//! Scripted replays of both widgets on the virtual host.
//!
//! Each scenario drives a widget through a fixed sequence of clock advances
//! and scrolls, recording the observable state after every step. The binary
//! prints these; the tests pin them.

use std::cell::RefCell;
use std::rc::Rc;

use crate::feed::{FeedFooter, PaginatedFeedSimulator, FETCH_LATENCY_MS};
use crate::gate::{DelayedVisibilityLoader, GateState, LoaderConfig, LoaderView};
use crate::sim::VirtualHost;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ScenarioKind {
    Lazy,
    Feed,
}

impl ScenarioKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "lazy" => Some(Self::Lazy),
            "feed" => Some(Self::Feed),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Lazy => "lazy",
            Self::Feed => "feed",
        }
    }

    pub fn all() -> &'static [ScenarioKind] {
        &[Self::Lazy, Self::Feed]
    }
}

/// Observable state after one scripted step.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Step {
    pub at_ms: u64,
    pub action: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Report {
    pub scenario: ScenarioKind,
    pub steps: Vec<Step>,
    /// State-change notifications delivered to the widget listener.
    pub notifications: usize,
}

pub fn run(kind: ScenarioKind) -> Report {
    match kind {
        ScenarioKind::Lazy => lazy(),
        ScenarioKind::Feed => feed(),
    }
}

/// Delay 3000 ms; element scrolled into view at 500 ms; content at 3000 ms.
pub fn lazy() -> Report {
    let host = VirtualHost::new();
    let el = host.element();
    let config = LoaderConfig::new(3000, "lazy-loaded after a 3-second delay");
    let mut loader = DelayedVisibilityLoader::initialize(config, &host, &host, &el);

    let seen: Rc<RefCell<Vec<GateState>>> = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    loader.on_change(move |state| s.borrow_mut().push(state));

    let mut steps = Vec::new();
    let mut record = |host: &VirtualHost, action: &str, loader: &DelayedVisibilityLoader| {
        steps.push(Step {
            at_ms: host.now_ms(),
            action: action.to_string(),
            state: format!("{} / {}", loader.state().label(), view_label(&loader.view())),
        });
    };

    record(&host, "mount", &loader);
    host.advance(500);
    record(&host, "advance 500", &loader);
    host.scroll_into_view(el);
    record(&host, "scroll into view", &loader);
    host.advance(2000);
    record(&host, "advance 2000", &loader);
    host.advance(500);
    record(&host, "advance 500", &loader);

    loader.dispose();
    let notifications = seen.borrow().len();
    Report {
        scenario: ScenarioKind::Lazy,
        steps,
        notifications,
    }
}

/// Scroll the last item into view until the feed reports exhaustion.
pub fn feed() -> Report {
    let host = VirtualHost::new();
    let mut feed = PaginatedFeedSimulator::initialize(host.clone(), host.clone());

    let notifications = Rc::new(RefCell::new(0usize));
    let n = Rc::clone(&notifications);
    feed.on_change(move |_| *n.borrow_mut() += 1);

    let mut steps = Vec::new();
    let record = |steps: &mut Vec<Step>, action: String, feed: &PaginatedFeedSimulator<_, _>| {
        let snap = feed.snapshot();
        steps.push(Step {
            at_ms: host.now_ms(),
            action,
            state: format!(
                "{} items, cursor {}, {}",
                snap.items.len(),
                snap.page_cursor,
                footer_label(snap.footer())
            ),
        });
    };

    record(&mut steps, "mount".to_string(), &feed);
    // Bounded so a regression cannot loop forever.
    for _ in 0..16 {
        if feed.is_exhausted() {
            break;
        }
        let Some(last) = feed.snapshot().items.last().map(|i| i.id) else {
            break;
        };
        let el = host.element();
        feed.attach_sentinel(last, &el);
        host.scroll_into_view(el);
        record(&mut steps, format!("item {last} visible"), &feed);
        host.advance(u64::from(FETCH_LATENCY_MS));
        record(&mut steps, format!("advance {FETCH_LATENCY_MS}"), &feed);
    }

    feed.dispose();
    let notifications = *notifications.borrow();
    Report {
        scenario: ScenarioKind::Feed,
        steps,
        notifications,
    }
}

fn view_label(view: &LoaderView) -> &'static str {
    match view {
        LoaderView::Placeholder => "placeholder",
        LoaderView::Hidden => "hidden",
        LoaderView::Content(_) => "content",
    }
}

fn footer_label(footer: FeedFooter) -> &'static str {
    match footer {
        FeedFooter::None => "idle",
        FeedFooter::Loading => "loading",
        FeedFooter::Exhausted => "no more items",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lazy_scenario_reveals_only_after_delay() {
        let report = lazy();
        let states: Vec<&str> = report.steps.iter().map(|s| s.state.as_str()).collect();
        assert_eq!(
            states,
            vec![
                "waiting / placeholder",
                "waiting / placeholder",
                "view-only / placeholder",
                "view-only / placeholder",
                "ready / content",
            ]
        );
        assert_eq!(report.steps.last().map(|s| s.at_ms), Some(3000));
        assert_eq!(report.notifications, 2);
    }

    #[test]
    fn feed_scenario_ends_exhausted_at_fifty_items() {
        let report = feed();
        let last = report.steps.last().map(|s| s.state.as_str());
        assert_eq!(last, Some("50 items, cursor 6, no more items"));
        assert!(report
            .steps
            .iter()
            .any(|s| s.state == "10 items, cursor 2, loading"));
    }

    #[test]
    fn scenario_names_parse() {
        for kind in ScenarioKind::all() {
            assert_eq!(ScenarioKind::parse(kind.label()), Some(*kind));
        }
        assert_eq!(ScenarioKind::parse("all"), None);
    }
}
