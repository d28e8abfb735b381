//! Core Router Implementation.
//!
//! The [`Router`] keeps the display region in sync with the current address.
//! Every transition goes through the same path:
//!
//! 1. A link click or [`Router::visit`] resolves a target route and calls
//!    push-navigate, which compares it against the live address, swaps the
//!    visible element, records the new current route and pushes a history
//!    entry.
//! 2. A popstate from the navigation service re-resolves the address and
//!    performs the same swap without pushing.
//!
//! The router's own handler swaps the visible element first (show the new
//! element, then hide the previous one). Listeners registered through
//! [`Router::on_navigate`] are called synchronously once the current route is
//! updated and the entry recorded, so a listener may navigate again. If the
//! navigation service rejects a push, the previous route is shown again and
//! the error is returned.
//!
//! ```
//! use reinhardt_navigator::{MemoryDom, MemoryHistory, RouteDefinition, RouterBuilder};
//!
//! let dom = MemoryDom::new();
//! let main = dom.create_element("main");
//! let home = dom.create_element("section");
//! let about = dom.create_element("section");
//! let history = MemoryHistory::new("http://localhost/#").unwrap();
//!
//! let router = RouterBuilder::new()
//!     .route(RouteDefinition::new("home", "/", home))
//!     .route(RouteDefinition::new("about", "/about", about))
//!     .entry(main)
//!     .build(dom.clone(), history.clone())
//!     .unwrap();
//!
//! router.visit("about").unwrap();
//! assert_eq!(dom.children(main), vec![about]);
//! assert_eq!(history.current_url(), "http://localhost/#about");
//! ```

use crate::address::{AddressStrategy, normalize_root, strategy_for};
use crate::config::{RouterMode, RouterOptions};
use crate::dom::Dom;
use crate::error::RouterError;
use crate::history::HistoryService;
use crate::route::{RouteDefinition, RouteTable};
use crate::{debug_log, error_log, info_log, warn_log};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// Resolves an `element_path` to displayable content.
pub type ContentResolver<E> = Box<dyn Fn(&str) -> Option<E> + 'static>;

type NavigationListener<E> = Rc<dyn Fn(&NavigationEvent<'_, E>) + 'static>;

/// What triggered a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
	/// Link click or `visit()`; a history entry is recorded.
	Push,
	/// Back/forward traversal reported by the navigation service.
	Pop,
}

/// Notification emitted for every route swap.
#[derive(Debug)]
pub struct NavigationEvent<'a, E> {
	/// Route that was displayed before the swap.
	pub previous: Option<&'a RouteDefinition<E>>,
	/// Route displayed after the swap.
	pub current: &'a RouteDefinition<E>,
	/// What triggered the swap.
	pub kind: NavigationKind,
}

/// Assembles the construction inputs of a [`Router`].
pub struct RouterBuilder<E> {
	routes: Vec<RouteDefinition<E>>,
	entry: Option<E>,
	options: RouterOptions,
	resolver: Option<ContentResolver<E>>,
}

impl<E> Default for RouterBuilder<E> {
	fn default() -> Self {
		Self {
			routes: Vec::new(),
			entry: None,
			options: RouterOptions::default(),
			resolver: None,
		}
	}
}

impl<E: fmt::Debug> fmt::Debug for RouterBuilder<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouterBuilder")
			.field("routes", &self.routes)
			.field("entry", &self.entry)
			.field("options", &self.options)
			.field("has_resolver", &self.resolver.is_some())
			.finish()
	}
}

impl<E: Clone + PartialEq + 'static> RouterBuilder<E> {
	/// Creates a builder with default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a builder from previously loaded options.
	pub fn from_options(options: RouterOptions) -> Self {
		Self {
			options,
			..Self::default()
		}
	}

	/// Adds a route.
	pub fn route(mut self, route: RouteDefinition<E>) -> Self {
		self.routes.push(route);
		self
	}

	/// Adds several routes in order.
	pub fn routes(mut self, routes: impl IntoIterator<Item = RouteDefinition<E>>) -> Self {
		self.routes.extend(routes);
		self
	}

	/// Sets the display region.
	pub fn entry(mut self, entry: E) -> Self {
		self.entry = Some(entry);
		self
	}

	/// Replaces all options.
	pub fn options(mut self, options: RouterOptions) -> Self {
		self.options = options;
		self
	}

	/// Sets the mode.
	pub fn mode(mut self, mode: RouterMode) -> Self {
		self.options.mode = mode;
		self
	}

	/// Sets the root mount path (history mode).
	pub fn root_url(mut self, root_url: impl Into<String>) -> Self {
		self.options.root_url = root_url.into();
		self
	}

	/// Names the route shown when the address matches nothing.
	pub fn fallback(mut self, name: impl Into<String>) -> Self {
		self.options.fallback = Some(name.into());
		self
	}

	/// Sets the attribute marking intercepted anchors.
	pub fn link_attribute(mut self, attribute: impl Into<String>) -> Self {
		self.options.link_attribute = attribute.into();
		self
	}

	/// Registers the resolver for deferred (`element_path`) routes.
	pub fn resolve_with<F>(mut self, resolver: F) -> Self
	where
		F: Fn(&str) -> Option<E> + 'static,
	{
		self.resolver = Some(Box::new(resolver));
		self
	}

	/// Validates the configuration, renders the current route, binds links
	/// and subscribes to popstate.
	///
	/// # Errors
	///
	/// - [`RouterError::Configuration`] for an empty or inconsistent route
	///   table, a missing or invalid display region, an undeclared fallback,
	///   or deferred routes without a resolver.
	/// - [`RouterError::NoMatchingRoute`] if the current address matches no
	///   route and no fallback is configured.
	/// - [`RouterError::UnknownRouteName`] if an anchor names an undeclared route.
	pub fn build<D, H>(self, dom: D, history: H) -> Result<Router<D, H>, RouterError>
	where
		D: Dom<Element = E> + 'static,
		H: HistoryService + 'static,
	{
		self.options.validate()?;
		let routes = RouteTable::new(self.routes)?;

		let entry = self
			.entry
			.filter(|entry| dom.is_valid_region(entry))
			.ok_or_else(|| {
				RouterError::configuration(
					"Invalid entry point for app. Entry point must be a valid HTML element",
				)
			})?;

		if self.resolver.is_none()
			&& let Some(route) = routes.iter().find(|r| r.is_deferred())
		{
			return Err(RouterError::configuration(format!(
				"Route '{}' declares an element path but no content resolver is configured",
				route.name()
			)));
		}

		let fallback = self
			.options
			.fallback
			.as_deref()
			.map(|name| {
				routes.index_of(name).ok_or_else(|| {
					RouterError::configuration(format!("Fallback route '{}' is not declared", name))
				})
			})
			.transpose()?;

		let mode = self.options.mode;
		if mode == RouterMode::Hash && !normalize_root(&self.options.root_url).is_empty() {
			warn_log!(
				"rootUrl '{}' is ignored in hash mode",
				self.options.root_url
			);
		}

		let location = history.location()?;
		let address = strategy_for(mode, &location.origin, &self.options.root_url);

		let inner = Rc::new(RouterInner {
			routes,
			entry,
			dom,
			history,
			mode,
			address,
			link_attribute: self.options.link_attribute,
			fallback,
			current: Cell::new(None),
			resolver: self.resolver,
			resolved: RefCell::new(HashMap::new()),
			listeners: RefCell::new(Vec::new()),
			bound_links: RefCell::new(Vec::new()),
		});

		inner.render_initial()?;
		inner.bind_links()?;

		let weak: Weak<RouterInner<D, H>> = Rc::downgrade(&inner);
		inner.history.on_pop_state(Box::new(move || {
			if let Some(inner) = weak.upgrade() {
				inner.handle_pop_state();
			}
		}))?;

		info_log!(
			"Router mounted in {} mode with {} routes",
			mode,
			inner.routes.len()
		);

		Ok(Router { inner })
	}
}

struct RouterInner<D: Dom, H: HistoryService> {
	routes: RouteTable<D::Element>,
	entry: D::Element,
	dom: D,
	history: H,
	mode: RouterMode,
	address: Box<dyn AddressStrategy>,
	link_attribute: String,
	fallback: Option<usize>,
	/// Index of the displayed route. Only navigation handling writes it.
	current: Cell<Option<usize>>,
	resolver: Option<ContentResolver<D::Element>>,
	resolved: RefCell<HashMap<usize, D::Element>>,
	listeners: RefCell<Vec<NavigationListener<D::Element>>>,
	bound_links: RefCell<Vec<D::Element>>,
}

impl<D, H> RouterInner<D, H>
where
	D: Dom + 'static,
	H: HistoryService + 'static,
{
	fn route_at(&self, index: usize) -> &RouteDefinition<D::Element> {
		// Indices only come from this table.
		&self.routes.as_slice()[index]
	}

	fn href(&self, index: usize) -> String {
		self.address.href(self.route_at(index).path())
	}

	/// Matches the live address exactly, without applying the fallback.
	fn match_location(&self) -> Result<(String, Option<usize>), RouterError> {
		let location = self.history.location()?;
		let path = self.address.route_path(&location);
		let index = self.routes.match_path(&path);
		Ok((path, index))
	}

	/// Resolves the live address to a route, applying the fallback.
	fn resolve_location(&self) -> Result<usize, RouterError> {
		let (path, index) = self.match_location()?;
		match (index, self.fallback) {
			(Some(index), _) => Ok(index),
			(None, Some(fallback)) => {
				warn_log!(
					"No route matches '{}', showing fallback route '{}'",
					path,
					self.route_at(fallback).name()
				);
				Ok(fallback)
			}
			(None, None) => Err(RouterError::NoMatchingRoute(path)),
		}
	}

	/// Returns the displayable content of a route, resolving deferred content once.
	fn content_for(&self, index: usize) -> Result<D::Element, RouterError> {
		if let Some(element) = self.loaded_content(index) {
			return Ok(element);
		}

		let route = self.route_at(index);
		let element_path = route.element_path().unwrap_or_default();
		let element = self
			.resolver
			.as_ref()
			.and_then(|resolve| resolve(element_path))
			.ok_or_else(|| {
				RouterError::NavigationFailed(format!(
					"Content for route '{}' could not be resolved from '{}'",
					route.name(),
					element_path
				))
			})?;

		self.resolved
			.borrow_mut()
			.insert(index, element.clone());
		Ok(element)
	}

	fn loaded_content(&self, index: usize) -> Option<D::Element> {
		self.route_at(index)
			.element()
			.cloned()
			.or_else(|| self.resolved.borrow().get(&index).cloned())
	}

	fn render_initial(&self) -> Result<(), RouterError> {
		let index = self.resolve_location()?;
		self.dom.clear_children(&self.entry)?;
		let element = self.content_for(index)?;
		self.dom.append_child(&self.entry, &element)?;
		self.current.set(Some(index));
		Ok(())
	}

	/// The router's own navigation handler: show first, then hide.
	fn swap(&self, previous: Option<usize>, current: usize) -> Result<(), RouterError> {
		let shown = self.content_for(current)?;
		self.dom.append_child(&self.entry, &shown)?;

		if let Some(previous) = previous.filter(|p| *p != current)
			&& let Some(hidden) = self.loaded_content(previous)
			&& self.dom.contains_child(&self.entry, &hidden)
		{
			self.dom.remove_child(&self.entry, &hidden)?;
		}
		Ok(())
	}

	/// Calls observers once the swap is complete and recorded.
	fn notify(&self, previous: Option<usize>, current: usize, kind: NavigationKind) {
		// Listeners may navigate again; do not hold the borrow while calling them.
		let listeners: Vec<NavigationListener<D::Element>> = self.listeners.borrow().clone();
		if listeners.is_empty() {
			return;
		}
		let event = NavigationEvent {
			previous: previous.map(|i| self.route_at(i)),
			current: self.route_at(current),
			kind,
		};
		for listener in listeners {
			listener(&event);
		}
	}

	fn push_navigate(&self, target: usize, href: &str) -> Result<(), RouterError> {
		let (_, active) = self.match_location()?;
		if active == Some(target) {
			debug_log!(
				"Already at route '{}', ignoring navigation",
				self.route_at(target).name()
			);
			return Ok(());
		}

		let previous = self.current.get();
		self.swap(previous, target)?;
		self.current.set(Some(target));

		if let Err(err) = self
			.history
			.push_state(self.route_at(target).name(), href)
		{
			// The address did not change; put the previous route back.
			self.current.set(previous);
			if let Some(previous) = previous
				&& let Err(restore) = self.swap(Some(target), previous)
			{
				error_log!("Failed to restore route after a rejected push: {}", restore);
			}
			return Err(err);
		}

		debug_log!(
			"Navigated to route '{}' at '{}'",
			self.route_at(target).name(),
			href
		);
		self.notify(previous, target, NavigationKind::Push);
		Ok(())
	}

	fn handle_pop_state(&self) {
		let current = match self.resolve_location() {
			Ok(index) => index,
			Err(err) => {
				warn_log!("Ignoring history traversal: {}", err);
				return;
			}
		};

		let previous = self.current.get();
		if previous == Some(current) {
			return;
		}

		if let Err(err) = self.swap(previous, current) {
			error_log!("Failed to restore route after history traversal: {}", err);
			return;
		}
		self.current.set(Some(current));
		self.notify(previous, current, NavigationKind::Pop);
	}

	fn bind_links(self: &Rc<Self>) -> Result<usize, RouterError> {
		let links = self.dom.query_links(&self.link_attribute)?;
		let mut newly_bound = 0;

		for link in links {
			if self.bound_links.borrow().contains(&link) {
				continue;
			}

			let name = self
				.dom
				.attribute(&link, &self.link_attribute)
				.unwrap_or_default();
			let index = self
				.routes
				.index_of(&name)
				.ok_or_else(|| RouterError::UnknownRouteName(name.clone()))?;
			let href = self.href(index);
			self.dom.set_attribute(&link, "href", &href)?;

			let weak = Rc::downgrade(self);
			self.dom.intercept_clicks(
				&link,
				Box::new(move || {
					if let Some(inner) = weak.upgrade()
						&& let Err(err) = inner.push_navigate(index, &href)
					{
						error_log!("Link navigation failed: {}", err);
					}
				}),
			)?;

			self.bound_links.borrow_mut().push(link);
			newly_bound += 1;
			debug_log!("Bound link to route '{}'", name);
		}

		Ok(newly_bound)
	}
}

/// Client-side navigation router.
///
/// Cloning a `Router` yields another handle to the same router.
pub struct Router<D: Dom, H: HistoryService> {
	inner: Rc<RouterInner<D, H>>,
}

impl<D: Dom, H: HistoryService> Clone for Router<D, H> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<D: Dom, H: HistoryService> fmt::Debug for Router<D, H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Router")
			.field("mode", &self.inner.mode)
			.field("routes_count", &self.inner.routes.len())
			.field(
				"current",
				&self
					.inner
					.current
					.get()
					.and_then(|i| self.inner.routes.get(i))
					.map(|r| r.name()),
			)
			.field("address", &self.inner.address)
			.finish()
	}
}

impl<D, H> Router<D, H>
where
	D: Dom + 'static,
	H: HistoryService + 'static,
{
	/// Navigates to the route named `name`.
	///
	/// Visiting the route the address already designates is a no-op.
	pub fn visit(&self, name: &str) -> Result<(), RouterError> {
		let index = self
			.inner
			.routes
			.index_of(name)
			.ok_or_else(|| RouterError::UnknownRouteName(name.to_string()))?;
		let href = self.inner.href(index);
		self.inner.push_navigate(index, &href)
	}

	/// Steps one entry back in history.
	pub fn back(&self) -> Result<(), RouterError> {
		self.inner.history.back()
	}

	/// Jumps `delta` entries relative to the current history position.
	pub fn go(&self, delta: i32) -> Result<(), RouterError> {
		self.inner.history.go(delta)
	}

	/// Like [`go`](Self::go), coercing `raw` to a number first.
	///
	/// Fails with [`RouterError::InvalidArgument`] without touching history
	/// when `raw` is not numeric.
	pub fn go_str(&self, raw: &str) -> Result<(), RouterError> {
		let delta = parse_delta(raw)?;
		self.go(delta)
	}

	/// Binds anchors added since the last scan. Returns how many were bound.
	pub fn bind_links(&self) -> Result<usize, RouterError> {
		self.inner.bind_links()
	}

	/// Registers a listener called after every route swap.
	///
	/// By the time a listener runs, [`current_route`](Self::current_route)
	/// and the history already reflect the swap.
	pub fn on_navigate<F>(&self, listener: F)
	where
		F: Fn(&NavigationEvent<'_, D::Element>) + 'static,
	{
		self.inner.listeners.borrow_mut().push(Rc::new(listener));
	}

	/// Returns the displayed route.
	pub fn current_route(&self) -> Option<&RouteDefinition<D::Element>> {
		self.inner
			.current
			.get()
			.and_then(|i| self.inner.routes.get(i))
	}

	/// Looks up a route by name.
	pub fn route(&self, name: &str) -> Option<&RouteDefinition<D::Element>> {
		self.inner.routes.by_name(name)
	}

	/// Returns the address of the route named `name`.
	pub fn href_for(&self, name: &str) -> Result<String, RouterError> {
		self.inner
			.routes
			.index_of(name)
			.map(|i| self.inner.href(i))
			.ok_or_else(|| RouterError::UnknownRouteName(name.to_string()))
	}

	/// Returns the route table.
	pub fn routes(&self) -> &RouteTable<D::Element> {
		&self.inner.routes
	}

	/// Returns the display region.
	pub fn entry(&self) -> &D::Element {
		&self.inner.entry
	}

	/// Returns the mode.
	pub fn mode(&self) -> RouterMode {
		self.inner.mode
	}

	/// Returns the origin-qualified mount URL (history mode only).
	pub fn root_url(&self) -> Option<&str> {
		self.inner.address.root_url()
	}
}

/// Coerces a history delta the way a numeric conversion would: surrounding
/// whitespace is ignored, empty input means 0 and fractions are truncated.
pub(crate) fn parse_delta(raw: &str) -> Result<i32, RouterError> {
	let trimmed = raw.trim();
	if trimmed.is_empty() {
		return Ok(0);
	}

	let invalid = || {
		RouterError::InvalidArgument(format!(
			"Parameter passed must be a number, '{}' received",
			raw
		))
	};
	let value: f64 = trimmed.parse().map_err(|_| invalid())?;
	if !value.is_finite() {
		return Err(invalid());
	}
	// `as` saturates at the i32 bounds.
	Ok(value.trunc() as i32)
}
