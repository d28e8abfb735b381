//! Reinhardt Navigator - Client-side navigation for single-page apps
//!
//! Maps the browser address to one of a fixed set of named UI elements and
//! swaps the visible element inside a display region without reloading the
//! page.
//!
//! ## Features
//!
//! - **Two address modes**: fragment addresses (`#about`) or real paths below
//!   a mount prefix (`/examples/app/about`)
//! - **Link interception**: anchors carrying `data-router-name` get their
//!   `href` rewritten and their clicks turned into router navigations
//! - **History integration**: back/forward traversal re-renders the matching
//!   route; programmatic `visit`, `back` and `go`
//! - **Navigation observers**: listeners are told about every route swap
//! - **Host independent**: the router talks to the [`Dom`] and
//!   [`HistoryService`] traits; [`MemoryDom`] and [`MemoryHistory`] drive it
//!   off-browser
//!
//! ## Architecture
//!
//! - [`config`]: Router options (mode, root URL, fallback, link attribute)
//! - [`route`]: Route definitions and the validated route table
//! - [`address`]: Route path to address translation per mode
//! - [`history`]: Navigation service trait and in-memory history
//! - [`dom`]: UI tree trait and in-memory node arena
//! - [`router`]: The router itself
//! - `web`: `web-sys` implementations (WASM only)
//!
//! ## Example
//!
//! ```ignore
//! use reinhardt_navigator::{BrowserDom, RouteDefinition, RouterBuilder, RouterMode};
//!
//! let dom = BrowserDom::new()?;
//! let page = |id: &str| dom.element_by_id(id).expect("page element");
//!
//! let router = RouterBuilder::new()
//!     .route(RouteDefinition::new("home", "/", page("home")))
//!     .route(RouteDefinition::new("about", "/about", page("about")))
//!     .entry(page("app"))
//!     .mode(RouterMode::History)
//!     .root_url("examples/app")
//!     .mount()?;
//!
//! router.visit("about")?;
//! ```

#[macro_use]
pub mod logging;

pub mod address;
pub mod config;
pub mod dom;
pub mod error;
pub mod history;
pub mod route;
pub mod router;

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(not(target_arch = "wasm32"))]
#[doc(hidden)]
pub use tracing as __tracing;

pub use address::{AddressStrategy, HashAddress, HistoryAddress};
pub use config::{DEFAULT_LINK_ATTRIBUTE, DEFAULT_ROOT_URL, RouterMode, RouterOptions};
pub use dom::{ClickHandler, Dom, MemoryDom, NodeId};
pub use error::RouterError;
pub use history::{HistoryEntry, HistoryService, Location, MemoryHistory, PopStateListener};
pub use route::{RouteDefinition, RouteTable};
pub use router::{ContentResolver, NavigationEvent, NavigationKind, Router, RouterBuilder};

#[cfg(target_arch = "wasm32")]
pub use web::{BrowserDom, BrowserHistory, BrowserRouter};
