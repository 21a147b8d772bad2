//! Crawler test fixtures.
//!
//! The core of the site is two widgets that hide content from crawlers:
//! a lazy-content gate that reveals once a delay has elapsed *and* the element
//! has been on screen, and an infinite-scroll feed that appends pages when its
//! last item becomes visible. Both run against host capability traits so the
//! browser app and the deterministic [`sim::VirtualHost`] share one state
//! machine.

#[path = "core/host.rs"]
pub mod host;

#[path = "core/gate.rs"]
pub mod gate;

#[path = "core/feed.rs"]
pub mod feed;

#[path = "core/sim.rs"]
pub mod sim;

pub mod catalog;

#[path = "experiments/scenario.rs"]
pub mod scenario;

pub use feed::{FeedItem, FeedSnapshot, PaginatedFeedSimulator};
pub use gate::{DelayedVisibilityLoader, GateState, LoaderConfig, LoaderView};
pub use host::{HostError, ObservationHandle, TimerHandle, TimerService, VisibilityService};
