//! Browser Navigation WASM Tests
//!
//! Drives the router against the live document and `window.history`.
//!
//! **Run with**: `wasm-pack test --headless --chrome crates/reinhardt-navigator`

#![cfg(target_arch = "wasm32")]

use reinhardt_navigator::{
	BrowserDom, BrowserHistory, BrowserRouter, DEFAULT_LINK_ATTRIBUTE, Dom, HistoryService,
	RouteDefinition, RouterBuilder, RouterError,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Element, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

/// Builds `<main id="app">` with two sections and a link, detached from any previous test.
fn setup(prefix: &str) -> (BrowserDom, Element, Element, Element) {
	let document = web_sys::window().unwrap().document().unwrap();
	let body = document.body().unwrap();
	body.set_inner_html("");

	let main = document.create_element("main").unwrap();
	main.set_id(&format!("{}-app", prefix));
	let home = document.create_element("section").unwrap();
	home.set_id(&format!("{}-home", prefix));
	let second = document.create_element("section").unwrap();
	second.set_id(&format!("{}-second", prefix));
	body.append_child(&main).unwrap();

	(BrowserDom::new().unwrap(), main, home, second)
}

fn reset_address() {
	let history = BrowserHistory::new().unwrap();
	let pathname = history.location().unwrap().pathname;
	history.push_state("", &pathname).unwrap();
}

fn mount(main: &Element, home: &Element, second: &Element) -> BrowserRouter {
	RouterBuilder::new()
		.route(RouteDefinition::new("home", "/", home.clone()))
		.route(RouteDefinition::new("second", "/second", second.clone()))
		.entry(main.clone())
		.mount()
		.unwrap()
}

// ============================================================================
// Construction
// ============================================================================

/// Test the initial route is rendered into the region
#[wasm_bindgen_test]
fn test_initial_route_rendered() {
	reset_address();
	let (dom, main, home, second) = setup("initial");

	let router = mount(&main, &home, &second);

	assert_eq!(router.current_route().map(|r| r.name()), Some("home"));
	assert!(dom.contains_child(&main, &home));
	assert!(!dom.contains_child(&main, &second));
}

/// Test a non-HTML entry point is rejected
#[wasm_bindgen_test]
fn test_svg_entry_rejected() {
	reset_address();
	let (_dom, _main, home, _second) = setup("svg");
	let document = web_sys::window().unwrap().document().unwrap();
	let svg = document
		.create_element_ns(Some("http://www.w3.org/2000/svg"), "svg")
		.unwrap();

	let result = RouterBuilder::new()
		.route(RouteDefinition::new("home", "/", home))
		.entry(svg)
		.mount();

	assert!(matches!(result, Err(RouterError::Configuration(_))));
}

// ============================================================================
// Navigation
// ============================================================================

/// Test visit swaps elements and updates the hash
#[wasm_bindgen_test]
fn test_visit_updates_hash() {
	reset_address();
	let (dom, main, home, second) = setup("visit");
	let router = mount(&main, &home, &second);

	router.visit("second").unwrap();

	let location = BrowserHistory::new().unwrap().location().unwrap();
	assert_eq!(location.hash, "#second");
	assert!(dom.contains_child(&main, &second));
	assert!(!dom.contains_child(&main, &home));
}

/// Test clicking a bound link navigates without reloading
#[wasm_bindgen_test]
fn test_link_click_navigates() {
	reset_address();
	let (dom, main, home, second) = setup("link");
	let document = web_sys::window().unwrap().document().unwrap();
	let link = document.create_element("a").unwrap();
	link.set_attribute(DEFAULT_LINK_ATTRIBUTE, "second").unwrap();
	document.body().unwrap().append_child(&link).unwrap();

	let router = mount(&main, &home, &second);
	assert_eq!(link.get_attribute("href").as_deref(), Some("#second"));

	link.dyn_ref::<HtmlElement>().unwrap().click();

	assert_eq!(router.current_route().map(|r| r.name()), Some("second"));
	assert!(dom.contains_child(&main, &second));
}

/// Test non-numeric deltas are rejected before reaching the history
#[wasm_bindgen_test]
fn test_go_str_rejects_non_numeric() {
	reset_address();
	let (_dom, main, home, second) = setup("go");
	let router = mount(&main, &home, &second);

	assert!(matches!(
		router.go_str("forward"),
		Err(RouterError::InvalidArgument(_))
	));
}
