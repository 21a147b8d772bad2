//! Simulated infinite-scroll feed.
//!
//! Pages of synthetic items are appended whenever the last rendered item
//! scrolls into view, until a fixed number of pages has been served.

use std::cell::RefCell;
use std::ops::RangeInclusive;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::host::{ObservationHandle, TimerHandle, TimerService, VisibilityService};

pub const PAGE_SIZE: u32 = 10;
/// Pages served before the feed reports exhaustion.
pub const MAX_PAGES: u32 = 5;
/// Simulated network latency of one page fetch.
pub const FETCH_LATENCY_MS: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeedItem {
    pub id: u32,
    pub content: String,
}

impl FeedItem {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            content: format!(
                "This is item {id} that was loaded dynamically. This content would be missed by \
                 crawlers that don't execute JavaScript or don't handle infinite scrolling properly."
            ),
        }
    }
}

/// Ids of `page` (1-based). Page 0 has no ids.
pub fn page_ids(page: u32) -> RangeInclusive<u32> {
    if page == 0 {
        #[allow(clippy::reversed_empty_ranges)]
        return 1..=0;
    }
    let start = (page - 1).saturating_mul(PAGE_SIZE).saturating_add(1);
    start..=page.saturating_mul(PAGE_SIZE)
}

pub fn generate_page(page: u32) -> Vec<FeedItem> {
    page_ids(page).map(FeedItem::new).collect()
}

/// Proof that a page fetch is in flight. Only the matching ticket can
/// complete it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    page: u32,
}

impl LoadTicket {
    pub fn page(self) -> u32 {
        self.page
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Appended(RangeInclusive<u32>),
    Exhausted,
    /// The ticket did not match the in-flight fetch.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeedFooter {
    #[default]
    None,
    Loading,
    Exhausted,
}

/// The feed's data, free of any host wiring.
#[derive(Debug, Clone)]
pub struct FeedState {
    items: Vec<FeedItem>,
    page_cursor: u32,
    loading: bool,
    exhausted: bool,
}

impl FeedState {
    /// Page 1 is populated synchronously.
    pub fn new() -> Self {
        Self {
            items: generate_page(1),
            page_cursor: 2,
            loading: false,
            exhausted: false,
        }
    }

    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    pub fn last_item_id(&self) -> Option<u32> {
        self.items.last().map(|item| item.id)
    }

    pub fn page_cursor(&self) -> u32 {
        self.page_cursor
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn footer(&self) -> FeedFooter {
        if self.loading {
            FeedFooter::Loading
        } else if self.exhausted {
            FeedFooter::Exhausted
        } else {
            FeedFooter::None
        }
    }

    /// Start a fetch. `None` while another fetch is in flight or once the
    /// feed is exhausted.
    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        if self.loading || self.exhausted {
            return None;
        }
        self.loading = true;
        Some(LoadTicket {
            page: self.page_cursor,
        })
    }

    pub fn complete_load(&mut self, ticket: LoadTicket) -> LoadOutcome {
        if !self.loading || ticket.page != self.page_cursor {
            return LoadOutcome::Stale;
        }
        self.loading = false;

        if self.page_cursor > MAX_PAGES {
            self.exhausted = true;
            return LoadOutcome::Exhausted;
        }

        let ids = page_ids(self.page_cursor);
        self.items.extend(ids.clone().map(FeedItem::new));
        self.page_cursor += 1;
        LoadOutcome::Appended(ids)
    }

    /// Abandon an in-flight fetch without touching the items.
    pub fn abort_load(&mut self, ticket: LoadTicket) {
        if self.loading && ticket.page == self.page_cursor {
            self.loading = false;
        }
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            items: self.items.clone(),
            page_cursor: self.page_cursor,
            loading: self.loading,
            exhausted: self.exhausted,
        }
    }
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new()
    }
}

/// Owned copy of the feed handed to listeners and renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeedSnapshot {
    pub items: Vec<FeedItem>,
    pub page_cursor: u32,
    pub loading: bool,
    pub exhausted: bool,
}

impl FeedSnapshot {
    pub fn footer(&self) -> FeedFooter {
        if self.loading {
            FeedFooter::Loading
        } else if self.exhausted {
            FeedFooter::Exhausted
        } else {
            FeedFooter::None
        }
    }
}

struct Sentinel {
    item_id: u32,
    observation: Option<ObservationHandle>,
}

type SnapshotListener = Box<dyn FnMut(&FeedSnapshot)>;

struct FeedCell {
    state: FeedState,
    in_flight: Option<(LoadTicket, Option<TimerHandle>)>,
    // Completed fetch timers are parked here rather than dropped from inside
    // their own callback.
    spent_timer: Option<TimerHandle>,
    sentinel: Option<Sentinel>,
    // Same for a sentinel replaced from inside its own observer callback.
    spent_sentinel: Option<Sentinel>,
    // Item whose observer callback is on the stack, if any.
    firing_sentinel: Option<u32>,
    listener: Option<SnapshotListener>,
    disposed: bool,
}

struct FeedInner<T, V> {
    timers: T,
    viewport: V,
    cell: RefCell<FeedCell>,
}

/// A mounted infinite-scroll widget.
pub struct PaginatedFeedSimulator<T, V>
where
    T: TimerService + 'static,
    V: VisibilityService + 'static,
{
    inner: Rc<FeedInner<T, V>>,
}

impl<T, V> PaginatedFeedSimulator<T, V>
where
    T: TimerService + 'static,
    V: VisibilityService + 'static,
{
    pub fn initialize(timers: T, viewport: V) -> Self {
        let state = FeedState::new();
        debug!(items = state.items().len(), "feed mounted");
        Self {
            inner: Rc::new(FeedInner {
                timers,
                viewport,
                cell: RefCell::new(FeedCell {
                    state,
                    in_flight: None,
                    spent_timer: None,
                    sentinel: None,
                    spent_sentinel: None,
                    firing_sentinel: None,
                    listener: None,
                    disposed: false,
                }),
            }),
        }
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.inner.cell.borrow().state.snapshot()
    }

    pub fn items(&self) -> Vec<FeedItem> {
        self.inner.cell.borrow().state.items().to_vec()
    }

    pub fn page_cursor(&self) -> u32 {
        self.inner.cell.borrow().state.page_cursor()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.cell.borrow().state.is_loading()
    }

    pub fn is_exhausted(&self) -> bool {
        self.inner.cell.borrow().state.is_exhausted()
    }

    /// Item currently carrying the load trigger, if any.
    pub fn sentinel_item(&self) -> Option<u32> {
        self.inner
            .cell
            .borrow()
            .sentinel
            .as_ref()
            .map(|s| s.item_id)
    }

    /// Register the callback run after every change. Replaces any previous
    /// listener.
    pub fn on_change(&mut self, listener: impl FnMut(&FeedSnapshot) + 'static) {
        self.inner.cell.borrow_mut().listener = Some(Box::new(listener));
    }

    /// Request the next page. Returns false when the call was a no-op.
    pub fn load_more(&self) -> bool {
        FeedInner::load_more(&self.inner)
    }

    /// Move the load trigger to `target`, the element rendering `item_id`.
    ///
    /// Only the current last item can be the trigger; anything else is
    /// rejected. Re-attaching to the item already observed keeps the
    /// existing observation.
    pub fn attach_sentinel(&self, item_id: u32, target: &V::Target) -> bool {
        FeedInner::attach_sentinel(&self.inner, item_id, target)
    }

    /// Cancel the in-flight fetch and the sentinel observation. Idempotent.
    pub fn dispose(&mut self) {
        let released = {
            let mut cell = self.inner.cell.borrow_mut();
            if cell.disposed {
                return;
            }
            cell.disposed = true;
            cell.listener = None;
            if let Some(ticket) = cell.in_flight.as_ref().map(|(ticket, _)| *ticket) {
                cell.state.abort_load(ticket);
            }
            (
                cell.in_flight.take(),
                cell.spent_timer.take(),
                cell.sentinel.take(),
                cell.spent_sentinel.take(),
            )
        };
        drop(released);
        debug!("feed disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.cell.borrow().disposed
    }
}

impl<T, V> Drop for PaginatedFeedSimulator<T, V>
where
    T: TimerService + 'static,
    V: VisibilityService + 'static,
{
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<T, V> FeedInner<T, V>
where
    T: TimerService + 'static,
    V: VisibilityService + 'static,
{
    fn load_more(this: &Rc<Self>) -> bool {
        let ticket = {
            let mut cell = this.cell.borrow_mut();
            if cell.disposed {
                return false;
            }
            match cell.state.begin_load() {
                Some(ticket) => ticket,
                None => return false,
            }
        };
        debug!(page = ticket.page(), "feed fetch started");
        Self::notify(this);

        let weak = Rc::downgrade(this);
        let scheduled = this.timers.schedule_once(
            FETCH_LATENCY_MS,
            Box::new(move || Self::finish_weak(&weak, ticket)),
        );
        match scheduled {
            Ok(handle) => {
                let previous = this.cell.borrow_mut().in_flight.replace((ticket, Some(handle)));
                drop(previous);
            }
            Err(e) => {
                warn!("feed: {e}; completing fetch without latency");
                this.cell.borrow_mut().in_flight = Some((ticket, None));
                Self::finish(this, ticket);
            }
        }
        true
    }

    fn finish_weak(weak: &Weak<Self>, ticket: LoadTicket) {
        if let Some(this) = weak.upgrade() {
            Self::finish(&this, ticket);
        }
    }

    fn finish(this: &Rc<Self>, ticket: LoadTicket) {
        let (outcome, released) = {
            let mut cell = this.cell.borrow_mut();
            if cell.disposed {
                return;
            }
            let timer = match cell.in_flight.take() {
                Some((t, timer)) if t == ticket => timer,
                other => {
                    cell.in_flight = other;
                    return;
                }
            };
            let parked = cell.spent_timer.take();
            cell.spent_timer = timer;

            let outcome = cell.state.complete_load(ticket);
            let stale_sentinel = match outcome {
                LoadOutcome::Appended(_) => cell.sentinel.take(),
                _ => None,
            };
            // Only a sentinel still running its own callback is parked; any
            // other is released with the borrow so its observer disconnects now.
            let stale_sentinel = match stale_sentinel {
                Some(sentinel) if cell.firing_sentinel == Some(sentinel.item_id) => {
                    cell.spent_sentinel.replace(sentinel)
                }
                other => other,
            };
            (outcome, (stale_sentinel, parked))
        };
        drop(released);

        match &outcome {
            LoadOutcome::Appended(ids) => {
                debug!(first = ids.start(), last = ids.end(), "feed page appended")
            }
            LoadOutcome::Exhausted => debug!("feed exhausted"),
            LoadOutcome::Stale => return,
        }
        Self::notify(this);
    }

    fn attach_sentinel(this: &Rc<Self>, item_id: u32, target: &V::Target) -> bool {
        let previous = {
            let mut cell = this.cell.borrow_mut();
            if cell.disposed || cell.state.last_item_id() != Some(item_id) {
                return false;
            }
            if cell.sentinel.as_ref().is_some_and(|s| s.item_id == item_id) {
                return true;
            }
            cell.sentinel.take()
        };
        // Tear the old observation down before observing the new target.
        drop(previous);

        let weak = Rc::downgrade(this);
        let observed = this.viewport.observe(
            target,
            Box::new(move || {
                if let Some(this) = weak.upgrade() {
                    Self::on_sentinel_visible(&this, item_id);
                }
            }),
        );

        match observed {
            Ok(handle) => {
                this.cell.borrow_mut().sentinel = Some(Sentinel {
                    item_id,
                    observation: Some(handle),
                });
            }
            Err(e) => {
                warn!("feed: {e}; treating item {item_id} as visible");
                this.cell.borrow_mut().sentinel = Some(Sentinel {
                    item_id,
                    observation: None,
                });
                Self::on_sentinel_visible(this, item_id);
            }
        }
        true
    }

    fn on_sentinel_visible(this: &Rc<Self>, item_id: u32) {
        let current = this
            .cell
            .borrow()
            .sentinel
            .as_ref()
            .map(|s| s.item_id);
        if current == Some(item_id) {
            this.cell.borrow_mut().firing_sentinel = Some(item_id);
            Self::load_more(this);
            this.cell.borrow_mut().firing_sentinel = None;
        }
    }

    fn notify(this: &Rc<Self>) {
        let (snapshot, mut listener) = {
            let mut cell = this.cell.borrow_mut();
            let Some(listener) = cell.listener.take() else {
                return;
            };
            (cell.state.snapshot(), listener)
        };

        listener(&snapshot);

        let mut cell = this.cell.borrow_mut();
        if cell.listener.is_none() && !cell.disposed {
            cell.listener = Some(listener);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::VirtualHost;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Sim = PaginatedFeedSimulator<VirtualHost, VirtualHost>;

    fn mount(host: &VirtualHost) -> Sim {
        PaginatedFeedSimulator::initialize(host.clone(), host.clone())
    }

    fn load_and_wait(host: &VirtualHost, feed: &Sim) -> bool {
        let started = feed.load_more();
        host.advance(FETCH_LATENCY_MS as u64);
        started
    }

    fn ids(items: &[FeedItem]) -> Vec<u32> {
        items.iter().map(|i| i.id).collect()
    }

    #[test]
    fn page_one_is_present_on_mount() {
        let state = FeedState::new();
        assert_eq!(ids(state.items()), (1..=10).collect::<Vec<_>>());
        assert_eq!(state.page_cursor(), 2);
        assert!(!state.is_loading());
        assert!(!state.is_exhausted());
        assert_eq!(state.footer(), FeedFooter::None);
    }

    #[test]
    fn page_ids_follow_cursor_formula() {
        assert_eq!(page_ids(1), 1..=10);
        assert_eq!(page_ids(3), 21..=30);
        assert!(FeedItem::new(7).content.starts_with("This is item 7 "));
        assert!(page_ids(0).is_empty());
        assert!(generate_page(0).is_empty());
    }

    #[test]
    fn begin_load_is_guarded_while_loading() {
        let mut state = FeedState::new();
        let ticket = state.begin_load().expect("first load starts");
        assert_eq!(state.footer(), FeedFooter::Loading);
        assert!(state.begin_load().is_none());
        assert_eq!(state.complete_load(ticket), LoadOutcome::Appended(11..=20));
        assert_eq!(state.complete_load(ticket), LoadOutcome::Stale);
    }

    #[test]
    fn load_more_while_loading_changes_nothing() {
        let host = VirtualHost::new();
        let feed = mount(&host);
        assert!(feed.load_more());
        let before = feed.snapshot();

        assert!(!feed.load_more());
        host.advance(500);
        assert!(!feed.load_more());
        assert_eq!(feed.snapshot(), before);
        assert_eq!(host.pending_timers(), 1);

        host.advance(500);
        assert_eq!(feed.items().len(), 20);
        assert_eq!(feed.page_cursor(), 3);
    }

    #[test]
    fn four_loads_fill_five_pages_then_exhaust() {
        let host = VirtualHost::new();
        let feed = mount(&host);

        for _ in 0..4 {
            assert!(load_and_wait(&host, &feed));
        }
        assert_eq!(feed.items().len(), 50);
        assert_eq!(feed.page_cursor(), 6);
        assert!(!feed.is_exhausted());

        assert!(load_and_wait(&host, &feed));
        assert!(feed.is_exhausted());
        assert!(!feed.is_loading());
        assert_eq!(feed.items().len(), 50);
        assert_eq!(feed.snapshot().footer(), FeedFooter::Exhausted);

        assert!(!feed.load_more());
        assert_eq!(host.pending_timers(), 0);
    }

    #[test]
    fn ids_are_a_gapless_ascending_run() {
        let host = VirtualHost::new();
        let feed = mount(&host);
        while load_and_wait(&host, &feed) {}
        assert_eq!(ids(&feed.items()), (1..=50).collect::<Vec<_>>());
    }

    #[test]
    fn sentinel_moves_to_the_new_last_item() {
        let host = VirtualHost::new();
        let feed = mount(&host);

        let first = host.element();
        assert!(!feed.attach_sentinel(3, &first));
        assert!(feed.attach_sentinel(10, &first));
        assert_eq!(feed.sentinel_item(), Some(10));
        assert_eq!(host.active_observations(), 1);

        host.scroll_into_view(first);
        assert!(feed.is_loading());
        host.advance(FETCH_LATENCY_MS as u64);
        assert_eq!(feed.items().len(), 20);
        // The old trigger is gone once the page lands.
        assert_eq!(feed.sentinel_item(), None);
        assert_eq!(host.active_observations(), 0);

        let second = host.element();
        assert!(!feed.attach_sentinel(10, &second));
        assert!(feed.attach_sentinel(20, &second));
        host.scroll_into_view(second);
        host.advance(FETCH_LATENCY_MS as u64);
        assert_eq!(feed.items().len(), 30);
    }

    #[test]
    fn direct_load_disconnects_the_unfired_sentinel() {
        let host = VirtualHost::new();
        let feed = mount(&host);
        let first = host.element();
        assert!(feed.attach_sentinel(10, &first));

        assert!(load_and_wait(&host, &feed));
        assert_eq!(feed.sentinel_item(), None);
        assert_eq!(host.active_observations(), 0);

        let second = host.element();
        assert!(feed.attach_sentinel(20, &second));
        assert_eq!(host.active_observations(), 1);

        // The old element coming into view must not trigger anything.
        host.scroll_into_view(first);
        host.advance(FETCH_LATENCY_MS as u64);
        assert_eq!(feed.items().len(), 20);
        assert!(!feed.is_loading());
    }

    #[test]
    fn sentinel_firing_without_timers_appends_in_its_own_callback() {
        let host = VirtualHost::without_timers();
        let feed = mount(&host);
        let first = host.element();
        assert!(feed.attach_sentinel(10, &first));
        host.scroll_into_view(first);
        assert_eq!(feed.items().len(), 20);
        assert_eq!(feed.sentinel_item(), None);

        let second = host.element();
        assert!(feed.attach_sentinel(20, &second));
        assert_eq!(host.active_observations(), 1);
        host.scroll_into_view(second);
        assert_eq!(feed.items().len(), 30);
    }

    #[test]
    fn reattaching_to_the_same_item_keeps_one_observation() {
        let host = VirtualHost::new();
        let feed = mount(&host);
        let a = host.element();
        let b = host.element();
        assert!(feed.attach_sentinel(10, &a));
        assert!(feed.attach_sentinel(10, &b));
        assert_eq!(host.active_observations(), 1);
    }

    #[test]
    fn listener_sees_loading_then_appended() {
        let host = VirtualHost::new();
        let mut feed = mount(&host);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        feed.on_change(move |snap| s.borrow_mut().push((snap.items.len(), snap.footer())));

        load_and_wait(&host, &feed);
        assert_eq!(
            *seen.borrow(),
            vec![(10, FeedFooter::Loading), (20, FeedFooter::None)]
        );
    }

    #[test]
    fn dispose_cancels_in_flight_fetch() {
        let host = VirtualHost::new();
        let mut feed = mount(&host);
        let target = host.element();
        feed.attach_sentinel(10, &target);
        feed.load_more();

        feed.dispose();
        assert_eq!(host.pending_timers(), 0);
        assert_eq!(host.active_observations(), 0);
        host.advance(5_000);
        assert_eq!(feed.items().len(), 10);
        assert!(!feed.is_loading());
        assert!(!feed.load_more());
    }

    #[test]
    fn stale_completion_after_drop_is_ignored() {
        let host = VirtualHost::new();
        let feed = mount(&host);
        feed.load_more();
        drop(feed);
        host.advance(5_000);
        assert_eq!(host.pending_timers(), 0);
    }

    #[test]
    fn missing_observer_loads_everything() {
        let host = VirtualHost::without_observer();
        let feed = mount(&host);
        let mut steps = 0;
        while !feed.is_exhausted() && steps < 10 {
            let last = feed.snapshot().items.last().map(|i| i.id).unwrap_or(0);
            feed.attach_sentinel(last, &host.element());
            host.advance(FETCH_LATENCY_MS as u64);
            steps += 1;
        }
        assert!(feed.is_exhausted());
        assert_eq!(feed.items().len(), 50);
    }

    #[test]
    fn missing_timers_complete_immediately() {
        let host = VirtualHost::without_timers();
        let feed = mount(&host);
        assert!(feed.load_more());
        assert!(!feed.is_loading());
        assert_eq!(feed.items().len(), 20);
    }
}
