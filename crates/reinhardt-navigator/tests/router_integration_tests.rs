//! Integration tests for the navigation router
//!
//! These tests drive the router off-browser through `MemoryDom` and
//! `MemoryHistory`:
//! 1. Construction contract and configuration errors
//! 2. Push navigation and idempotence
//! 3. History traversal (back, go, popstate)
//! 4. Address modes (hash, history with mount prefix)
//! 5. Link interception and re-scanning
//! 6. Fallback routes, deferred content and navigation observers

use reinhardt_navigator::{
	DEFAULT_LINK_ATTRIBUTE, Dom, HistoryService, Location, MemoryDom, MemoryHistory,
	NavigationKind, NodeId, PopStateListener, RouteDefinition, Router, RouterBuilder, RouterError,
	RouterMode, RouterOptions,
};
use rstest::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type TestRouter = Router<MemoryDom, MemoryHistory>;

/// Host page with a display region and two route elements.
struct Page {
	dom: MemoryDom,
	main: NodeId,
	home: NodeId,
	second: NodeId,
}

impl Page {
	fn builder(&self) -> RouterBuilder<NodeId> {
		RouterBuilder::new()
			.route(RouteDefinition::new("home", "/", self.home))
			.route(RouteDefinition::new("second", "/second", self.second))
			.entry(self.main)
	}

	fn mount(&self, url: &str) -> (TestRouter, MemoryHistory) {
		let history = MemoryHistory::new(url).unwrap();
		let router = self
			.builder()
			.build(self.dom.clone(), history.clone())
			.unwrap();
		(router, history)
	}

	fn shown(&self) -> Vec<NodeId> {
		self.dom.children(self.main)
	}
}

#[fixture]
fn page() -> Page {
	let dom = MemoryDom::new();
	let main = dom.create_element("main");
	let home = dom.create_element("section");
	let second = dom.create_element("section");
	Page {
		dom,
		main,
		home,
		second,
	}
}

fn current_name(router: &TestRouter) -> Option<String> {
	router.current_route().map(|r| r.name().to_string())
}

/// Navigation service whose pushes can be made to fail.
#[derive(Clone)]
struct RejectingHistory {
	inner: MemoryHistory,
	reject_push: Rc<Cell<bool>>,
}

impl HistoryService for RejectingHistory {
	fn location(&self) -> Result<Location, RouterError> {
		self.inner.location()
	}

	fn push_state(&self, title: &str, url: &str) -> Result<(), RouterError> {
		if self.reject_push.get() {
			return Err(RouterError::NavigationFailed(
				"pushState rejected".to_string(),
			));
		}
		self.inner.push_state(title, url)
	}

	fn back(&self) -> Result<(), RouterError> {
		self.inner.back()
	}

	fn go(&self, delta: i32) -> Result<(), RouterError> {
		self.inner.go(delta)
	}

	fn on_pop_state(&self, listener: PopStateListener) -> Result<(), RouterError> {
		self.inner.on_pop_state(listener)
	}
}

// ============================================================================
// Construction
// ============================================================================

#[rstest]
fn test_initial_render_replaces_region_content(page: Page) {
	let placeholder = page.dom.create_element("p");
	page.dom.append_child(&page.main, &placeholder).unwrap();

	let (router, _history) = page.mount("http://localhost/");

	assert_eq!(page.shown(), vec![page.home]);
	assert_eq!(page.dom.parent(placeholder), None);
	assert_eq!(current_name(&router).as_deref(), Some("home"));
}

#[rstest]
fn test_initial_render_follows_current_address(page: Page) {
	let (router, history) = page.mount("http://localhost/#second");

	assert_eq!(page.shown(), vec![page.second]);
	assert_eq!(current_name(&router).as_deref(), Some("second"));
	// Construction never pushes.
	assert_eq!(history.len(), 1);
}

#[rstest]
fn test_empty_route_table_is_rejected(page: Page) {
	let history = MemoryHistory::new("http://localhost/").unwrap();
	let result = RouterBuilder::<NodeId>::new()
		.entry(page.main)
		.build(page.dom.clone(), history);

	assert!(
		matches!(result, Err(RouterError::Configuration(msg)) if msg == "Invalid routes array provided")
	);
}

#[rstest]
fn test_missing_entry_is_rejected(page: Page) {
	let history = MemoryHistory::new("http://localhost/").unwrap();
	let result = RouterBuilder::new()
		.route(RouteDefinition::new("home", "/", page.home))
		.build(page.dom.clone(), history);

	assert!(matches!(
		result,
		Err(RouterError::Configuration(msg))
			if msg == "Invalid entry point for app. Entry point must be a valid HTML element"
	));
}

#[rstest]
fn test_unmatched_address_without_fallback_is_rejected(page: Page) {
	let history = MemoryHistory::new("http://localhost/#nowhere").unwrap();
	let result = page.builder().build(page.dom.clone(), history);

	assert_eq!(
		result.err(),
		Some(RouterError::NoMatchingRoute("/nowhere".to_string()))
	);
}

#[rstest]
fn test_link_to_unknown_route_is_rejected(page: Page) {
	page.dom.create_link(DEFAULT_LINK_ATTRIBUTE, "missing");
	let history = MemoryHistory::new("http://localhost/").unwrap();
	let result = page.builder().build(page.dom.clone(), history);

	assert_eq!(
		result.err(),
		Some(RouterError::UnknownRouteName("missing".to_string()))
	);
}

#[rstest]
fn test_invalid_options_are_rejected(page: Page) {
	let history = MemoryHistory::new("http://localhost/").unwrap();
	let result = page
		.builder()
		.link_attribute("")
		.build(page.dom.clone(), history);

	assert!(matches!(result, Err(RouterError::Configuration(_))));
}

// ============================================================================
// Push navigation
// ============================================================================

#[rstest]
fn test_visit_swaps_element_and_pushes_entry(page: Page) {
	let (router, history) = page.mount("http://localhost/#");

	router.visit("second").unwrap();

	assert_eq!(page.shown(), vec![page.second]);
	assert_eq!(current_name(&router).as_deref(), Some("second"));
	assert_eq!(history.len(), 2);
	assert_eq!(history.current_url(), "http://localhost/#second");
	assert_eq!(history.current_entry().title, "second");
}

#[rstest]
fn test_visit_is_idempotent(page: Page) {
	let (router, history) = page.mount("http://localhost/#");

	router.visit("second").unwrap();
	router.visit("second").unwrap();

	assert_eq!(history.len(), 2);
	assert_eq!(page.shown(), vec![page.second]);
}

#[rstest]
fn test_visit_current_route_on_load_is_noop(page: Page) {
	let (router, history) = page.mount("http://localhost/");

	router.visit("home").unwrap();

	assert_eq!(history.len(), 1);
	assert_eq!(page.shown(), vec![page.home]);
}

#[rstest]
fn test_visit_unknown_route_changes_nothing(page: Page) {
	let (router, history) = page.mount("http://localhost/");

	let result = router.visit("missing");

	assert_eq!(
		result,
		Err(RouterError::UnknownRouteName("missing".to_string()))
	);
	assert_eq!(history.len(), 1);
	assert_eq!(page.shown(), vec![page.home]);
	assert_eq!(current_name(&router).as_deref(), Some("home"));
}

#[rstest]
fn test_region_always_shows_one_element(page: Page) {
	let (router, _history) = page.mount("http://localhost/");

	for name in ["second", "home", "second", "home"] {
		router.visit(name).unwrap();
		assert_eq!(page.shown().len(), 1);
	}
	assert_eq!(page.shown(), vec![page.home]);
}

// ============================================================================
// History traversal
// ============================================================================

#[rstest]
fn test_back_restores_previous_route(page: Page) {
	let (router, history) = page.mount("http://localhost/#");

	router.visit("second").unwrap();
	router.back().unwrap();

	assert_eq!(page.shown(), vec![page.home]);
	assert_eq!(current_name(&router).as_deref(), Some("home"));
	assert_eq!(history.position(), 0);
	// Traversal keeps forward entries.
	assert_eq!(history.len(), 2);
}

#[rstest]
fn test_go_forward_after_back(page: Page) {
	let (router, _history) = page.mount("http://localhost/#");

	router.visit("second").unwrap();
	router.back().unwrap();
	router.go(1).unwrap();

	assert_eq!(page.shown(), vec![page.second]);
	assert_eq!(current_name(&router).as_deref(), Some("second"));
}

#[rstest]
fn test_go_str_coerces_numbers(page: Page) {
	let (router, history) = page.mount("http://localhost/#");

	router.visit("second").unwrap();
	router.go_str(" -1 ").unwrap();

	assert_eq!(history.position(), 0);
	assert_eq!(page.shown(), vec![page.home]);
}

#[rstest]
#[case("x")]
#[case("1x")]
#[case("NaN")]
fn test_go_str_rejects_non_numeric_without_traversal(page: Page, #[case] raw: &str) {
	let (router, history) = page.mount("http://localhost/#");
	router.visit("second").unwrap();

	let result = router.go_str(raw);

	assert!(matches!(result, Err(RouterError::InvalidArgument(_))));
	assert_eq!(history.position(), 1);
	assert_eq!(page.shown(), vec![page.second]);
}

#[rstest]
fn test_go_zero_is_noop(page: Page) {
	let (router, history) = page.mount("http://localhost/#");
	router.visit("second").unwrap();

	router.go(0).unwrap();
	router.go_str("").unwrap();

	assert_eq!(history.position(), 1);
	assert_eq!(page.shown(), vec![page.second]);
}

#[rstest]
fn test_pop_to_unmatched_address_keeps_current_route(page: Page) {
	let (router, history) = page.mount("http://localhost/#");
	history.push_state("nowhere", "#nowhere").unwrap();
	history.push_state("second", "#second").unwrap();

	router.back().unwrap();

	assert_eq!(history.current_url(), "http://localhost/#nowhere");
	assert_eq!(page.shown(), vec![page.home]);
	assert_eq!(current_name(&router).as_deref(), Some("home"));
}

#[rstest]
fn test_pop_to_same_route_does_not_notify(page: Page) {
	let (router, history) = page.mount("http://localhost/#");
	let notified = Rc::new(Cell::new(0));
	let counter = Rc::clone(&notified);
	router.on_navigate(move |_| counter.set(counter.get() + 1));

	// Two entries designating the same route.
	history.push_state("home", "#").unwrap();
	router.back().unwrap();

	assert_eq!(notified.get(), 0);
	assert_eq!(page.shown(), vec![page.home]);
}

// ============================================================================
// Address modes
// ============================================================================

#[rstest]
fn test_hash_mode_ignores_root_url(page: Page) {
	let history = MemoryHistory::new("http://localhost/#").unwrap();
	let router = page
		.builder()
		.root_url("examples/app")
		.build(page.dom.clone(), history.clone())
		.unwrap();

	assert_eq!(router.mode(), RouterMode::Hash);
	assert_eq!(router.root_url(), None);
	router.visit("second").unwrap();
	assert_eq!(history.current_url(), "http://localhost/#second");
}

#[rstest]
fn test_history_mode_with_root_url(page: Page) {
	let history = MemoryHistory::new("http://localhost/examples/app/").unwrap();
	let router = page
		.builder()
		.mode(RouterMode::History)
		.root_url("examples/app")
		.build(page.dom.clone(), history.clone())
		.unwrap();

	assert_eq!(router.root_url(), Some("http://localhost/examples/app"));
	assert_eq!(page.shown(), vec![page.home]);

	router.visit("second").unwrap();
	assert_eq!(history.current_url(), "http://localhost/examples/app/second");
	assert_eq!(page.shown(), vec![page.second]);

	router.back().unwrap();
	assert_eq!(page.shown(), vec![page.home]);
}

#[rstest]
fn test_history_mode_initial_route_below_root(page: Page) {
	let history = MemoryHistory::new("http://localhost/examples/app/second").unwrap();
	let router = page
		.builder()
		.mode(RouterMode::History)
		.root_url("/examples/app/")
		.build(page.dom.clone(), history)
		.unwrap();

	assert_eq!(current_name(&router).as_deref(), Some("second"));
}

#[rstest]
fn test_history_mode_default_root(page: Page) {
	let history = MemoryHistory::new("http://localhost/").unwrap();
	let router = page
		.builder()
		.mode(RouterMode::History)
		.build(page.dom.clone(), history.clone())
		.unwrap();

	assert_eq!(router.href_for("second").unwrap(), "http://localhost/second");
	router.visit("second").unwrap();
	assert_eq!(history.current_url(), "http://localhost/second");
}

#[rstest]
fn test_options_loaded_from_json(page: Page) {
	let options =
		RouterOptions::from_json(r#"{"mode": "history", "rootUrl": "examples/app"}"#).unwrap();
	let history = MemoryHistory::new("http://localhost/examples/app").unwrap();
	let router = RouterBuilder::from_options(options)
		.route(RouteDefinition::new("home", "/", page.home))
		.route(RouteDefinition::new("second", "/second", page.second))
		.entry(page.main)
		.build(page.dom.clone(), history)
		.unwrap();

	assert_eq!(router.mode(), RouterMode::History);
	assert_eq!(
		router.href_for("second").unwrap(),
		"http://localhost/examples/app/second"
	);
}

// ============================================================================
// Link interception
// ============================================================================

#[rstest]
fn test_links_get_href_and_navigate_on_click(page: Page) {
	let link = page.dom.create_link(DEFAULT_LINK_ATTRIBUTE, "second");
	let (router, history) = page.mount("http://localhost/#");

	assert_eq!(
		page.dom.attribute(&link, "href").as_deref(),
		Some("#second")
	);

	assert!(page.dom.click(link));
	assert_eq!(page.shown(), vec![page.second]);
	assert_eq!(current_name(&router).as_deref(), Some("second"));
	assert_eq!(history.len(), 2);

	// Clicking the active link again pushes nothing.
	page.dom.click(link);
	assert_eq!(history.len(), 2);
}

#[rstest]
fn test_history_mode_link_href(page: Page) {
	let link = page.dom.create_link(DEFAULT_LINK_ATTRIBUTE, "second");
	let history = MemoryHistory::new("http://localhost/examples/app/").unwrap();
	let _router = page
		.builder()
		.mode(RouterMode::History)
		.root_url("examples/app")
		.build(page.dom.clone(), history)
		.unwrap();

	assert_eq!(
		page.dom.attribute(&link, "href").as_deref(),
		Some("http://localhost/examples/app/second")
	);
}

#[rstest]
fn test_custom_link_attribute(page: Page) {
	let ignored = page.dom.create_link(DEFAULT_LINK_ATTRIBUTE, "second");
	let link = page.dom.create_link("data-nav", "second");
	let history = MemoryHistory::new("http://localhost/").unwrap();
	let _router = page
		.builder()
		.link_attribute("data-nav")
		.build(page.dom.clone(), history)
		.unwrap();

	assert_eq!(page.dom.click_handler_count(link), 1);
	assert_eq!(page.dom.click_handler_count(ignored), 0);
}

#[rstest]
fn test_non_anchor_elements_are_not_bound(page: Page) {
	let button = page.dom.create_element("button");
	page.dom
		.set_attribute(&button, DEFAULT_LINK_ATTRIBUTE, "second")
		.unwrap();
	let (_router, _history) = page.mount("http://localhost/");

	assert!(!page.dom.click(button));
	assert_eq!(page.dom.attribute(&button, "href"), None);
}

#[rstest]
fn test_bind_links_only_binds_new_anchors(page: Page) {
	let first = page.dom.create_link(DEFAULT_LINK_ATTRIBUTE, "second");
	let (router, _history) = page.mount("http://localhost/");

	let added = page.dom.create_link(DEFAULT_LINK_ATTRIBUTE, "home");
	assert_eq!(router.bind_links().unwrap(), 1);
	assert_eq!(router.bind_links().unwrap(), 0);

	assert_eq!(page.dom.click_handler_count(first), 1);
	assert_eq!(page.dom.click_handler_count(added), 1);
	assert_eq!(page.dom.attribute(&added, "href").as_deref(), Some("#"));
}

#[rstest]
fn test_bind_links_reports_unknown_route(page: Page) {
	let (router, _history) = page.mount("http://localhost/");
	page.dom.create_link(DEFAULT_LINK_ATTRIBUTE, "missing");

	assert_eq!(
		router.bind_links(),
		Err(RouterError::UnknownRouteName("missing".to_string()))
	);
}

#[rstest]
fn test_link_click_after_router_dropped_is_ignored(page: Page) {
	let link = page.dom.create_link(DEFAULT_LINK_ATTRIBUTE, "second");
	let (router, history) = page.mount("http://localhost/");
	drop(router);

	// The handler is still attached but has nothing to drive.
	assert!(page.dom.click(link));
	assert_eq!(history.len(), 1);
	assert_eq!(page.shown(), vec![page.home]);
}

// ============================================================================
// Fallback and deferred content
// ============================================================================

#[rstest]
fn test_fallback_shown_for_unmatched_address(page: Page) {
	let history = MemoryHistory::new("http://localhost/#nowhere").unwrap();
	let router = page
		.builder()
		.fallback("home")
		.build(page.dom.clone(), history.clone())
		.unwrap();

	assert_eq!(page.shown(), vec![page.home]);
	assert_eq!(current_name(&router).as_deref(), Some("home"));

	// The address designates no route, so visiting the fallback still pushes.
	router.visit("home").unwrap();
	assert_eq!(history.len(), 2);
	assert_eq!(history.current_url(), "http://localhost/");
	assert_eq!(page.shown(), vec![page.home]);
}

#[rstest]
fn test_fallback_used_on_pop_state(page: Page) {
	let history = MemoryHistory::new("http://localhost/#nowhere").unwrap();
	let router = page
		.builder()
		.fallback("home")
		.build(page.dom.clone(), history)
		.unwrap();

	router.visit("second").unwrap();
	router.back().unwrap();

	assert_eq!(page.shown(), vec![page.home]);
}

#[rstest]
fn test_deferred_route_resolved_once(page: Page) {
	let help = page.dom.create_element("section");
	let calls = Rc::new(Cell::new(0));
	let counter = Rc::clone(&calls);
	let history = MemoryHistory::new("http://localhost/").unwrap();
	let router = page
		.builder()
		.route(RouteDefinition::deferred("help", "/help", "/pages/help.html"))
		.resolve_with(move |path| {
			counter.set(counter.get() + 1);
			(path == "/pages/help.html").then_some(help)
		})
		.build(page.dom.clone(), history)
		.unwrap();

	router.visit("help").unwrap();
	assert_eq!(page.shown(), vec![help]);

	router.visit("home").unwrap();
	router.visit("help").unwrap();
	assert_eq!(page.shown(), vec![help]);
	assert_eq!(calls.get(), 1);
}

#[rstest]
fn test_unresolvable_deferred_route_fails_navigation(page: Page) {
	let history = MemoryHistory::new("http://localhost/").unwrap();
	let router = page
		.builder()
		.route(RouteDefinition::deferred("help", "/help", "/pages/help.html"))
		.resolve_with(|_| None)
		.build(page.dom.clone(), history.clone())
		.unwrap();

	let result = router.visit("help");

	assert!(matches!(result, Err(RouterError::NavigationFailed(_))));
	assert_eq!(history.len(), 1);
	assert_eq!(page.shown(), vec![page.home]);
	assert_eq!(current_name(&router).as_deref(), Some("home"));
}

// ============================================================================
// Navigation observers
// ============================================================================

#[rstest]
fn test_observers_see_every_swap(page: Page) {
	let (router, _history) = page.mount("http://localhost/#");
	let events: Rc<RefCell<Vec<(Option<String>, String, NavigationKind)>>> =
		Rc::new(RefCell::new(Vec::new()));
	let sink = Rc::clone(&events);
	router.on_navigate(move |event| {
		sink.borrow_mut().push((
			event.previous.map(|r| r.name().to_string()),
			event.current.name().to_string(),
			event.kind,
		));
	});

	router.visit("second").unwrap();
	router.back().unwrap();

	assert_eq!(
		*events.borrow(),
		vec![
			(
				Some("home".to_string()),
				"second".to_string(),
				NavigationKind::Push
			),
			(
				Some("second".to_string()),
				"home".to_string(),
				NavigationKind::Pop
			),
		]
	);
}

#[rstest]
fn test_observers_run_after_the_swap(page: Page) {
	let (router, _history) = page.mount("http://localhost/#");
	let seen = Rc::new(RefCell::new(Vec::new()));
	let sink = Rc::clone(&seen);
	let dom = page.dom.clone();
	let main = page.main;
	router.on_navigate(move |_| {
		*sink.borrow_mut() = dom.children(main);
	});

	router.visit("second").unwrap();

	assert_eq!(*seen.borrow(), vec![page.second]);
}

#[rstest]
fn test_observer_may_navigate_again(page: Page) {
	let third = page.dom.create_element("section");
	let history = MemoryHistory::new("http://localhost/#").unwrap();
	let router = page
		.builder()
		.route(RouteDefinition::new("third", "/third", third))
		.build(page.dom.clone(), history.clone())
		.unwrap();
	let handle = router.clone();
	router.on_navigate(move |event| {
		if event.current.name() == "second" {
			handle.visit("third").unwrap();
		}
	});

	router.visit("second").unwrap();

	assert_eq!(page.shown(), vec![third]);
	assert_eq!(current_name(&router).as_deref(), Some("third"));
	assert_eq!(history.current_url(), "http://localhost/#third");
	let titles: Vec<String> = history.entries().into_iter().map(|e| e.title).collect();
	assert_eq!(titles, vec!["", "second", "third"]);
}

#[rstest]
fn test_observer_may_navigate_on_pop_state(page: Page) {
	let third = page.dom.create_element("section");
	let history = MemoryHistory::new("http://localhost/#").unwrap();
	let router = page
		.builder()
		.route(RouteDefinition::new("third", "/third", third))
		.build(page.dom.clone(), history.clone())
		.unwrap();
	router.visit("second").unwrap();

	let handle = router.clone();
	router.on_navigate(move |event| {
		if event.kind == NavigationKind::Pop {
			handle.visit("third").unwrap();
		}
	});
	router.back().unwrap();

	assert_eq!(page.shown(), vec![third]);
	assert_eq!(current_name(&router).as_deref(), Some("third"));
	assert_eq!(history.current_url(), "http://localhost/#third");
}

#[rstest]
fn test_rejected_push_restores_previous_route(page: Page) {
	let reject_push = Rc::new(Cell::new(false));
	let history = RejectingHistory {
		inner: MemoryHistory::new("http://localhost/#").unwrap(),
		reject_push: Rc::clone(&reject_push),
	};
	let router = page
		.builder()
		.build(page.dom.clone(), history.clone())
		.unwrap();
	let notified = Rc::new(Cell::new(0));
	let counter = Rc::clone(&notified);
	router.on_navigate(move |_| counter.set(counter.get() + 1));

	reject_push.set(true);
	let result = router.visit("second");

	assert!(matches!(result, Err(RouterError::NavigationFailed(_))));
	assert_eq!(page.shown(), vec![page.home]);
	assert_eq!(router.current_route().map(|r| r.name()), Some("home"));
	assert_eq!(history.inner.len(), 1);
	assert_eq!(notified.get(), 0);

	reject_push.set(false);
	router.visit("second").unwrap();
	assert_eq!(page.shown(), vec![page.second]);
	assert_eq!(notified.get(), 1);
}

#[rstest]
fn test_cloned_router_shares_state(page: Page) {
	let (router, history) = page.mount("http://localhost/#");
	let handle = router.clone();

	handle.visit("second").unwrap();

	assert_eq!(current_name(&router).as_deref(), Some("second"));
	assert_eq!(history.len(), 2);
}
