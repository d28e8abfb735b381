//! Browser bindings (WASM only).
//!
//! [`BrowserDom`] and [`BrowserHistory`] implement the router's service
//! traits on top of `web-sys`. Event closures are leaked with `.forget()`;
//! they live for as long as the page does.

use crate::dom::{ClickHandler, Dom};
use crate::error::RouterError;
use crate::history::{HistoryService, Location, PopStateListener};
use crate::router::{Router, RouterBuilder};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, HtmlElement, Window};

/// Router driving the live document and `window.history`.
pub type BrowserRouter = Router<BrowserDom, BrowserHistory>;

fn window() -> Result<Window, RouterError> {
	web_sys::window().ok_or_else(|| RouterError::NavigationFailed("No window object".to_string()))
}

/// [`Dom`] over the live document.
#[derive(Debug, Clone)]
pub struct BrowserDom {
	document: Document,
}

impl BrowserDom {
	/// Binds to `window.document`.
	pub fn new() -> Result<Self, RouterError> {
		let document = window()?
			.document()
			.ok_or_else(|| RouterError::NavigationFailed("No document object".to_string()))?;
		Ok(Self { document })
	}

	/// Looks up an element by id, typically the display region.
	pub fn element_by_id(&self, id: &str) -> Option<Element> {
		self.document.get_element_by_id(id)
	}

	/// Returns the first element matching `selector`.
	pub fn query_selector(&self, selector: &str) -> Result<Option<Element>, RouterError> {
		self.document
			.query_selector(selector)
			.map_err(|e| RouterError::from_js("querySelector", e))
	}
}

impl Dom for BrowserDom {
	type Element = Element;

	fn is_valid_region(&self, element: &Element) -> bool {
		element.dyn_ref::<HtmlElement>().is_some()
	}

	fn query_links(&self, attribute: &str) -> Result<Vec<Element>, RouterError> {
		let nodes = self
			.document
			.query_selector_all(&format!("a[{}]", attribute))
			.map_err(|e| RouterError::from_js("querySelectorAll", e))?;

		let mut links = Vec::with_capacity(nodes.length() as usize);
		for i in 0..nodes.length() {
			if let Some(node) = nodes.item(i)
				&& let Ok(element) = node.dyn_into::<Element>()
			{
				links.push(element);
			}
		}
		Ok(links)
	}

	fn attribute(&self, element: &Element, name: &str) -> Option<String> {
		element.get_attribute(name)
	}

	fn set_attribute(&self, element: &Element, name: &str, value: &str) -> Result<(), RouterError> {
		element
			.set_attribute(name, value)
			.map_err(|e| RouterError::from_js("setAttribute", e))
	}

	fn intercept_clicks(&self, element: &Element, handler: ClickHandler) -> Result<(), RouterError> {
		let closure = Closure::wrap(Box::new(move |event: Event| {
			// The router performs the navigation itself.
			event.prevent_default();
			handler();
		}) as Box<dyn FnMut(_)>);

		element
			.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
			.map_err(|e| RouterError::from_js("addEventListener(click)", e))?;
		closure.forget();
		Ok(())
	}

	fn clear_children(&self, region: &Element) -> Result<(), RouterError> {
		while let Some(child) = region.first_child() {
			region
				.remove_child(&child)
				.map_err(|e| RouterError::from_js("removeChild", e))?;
		}
		Ok(())
	}

	fn append_child(&self, region: &Element, child: &Element) -> Result<(), RouterError> {
		region
			.append_child(child)
			.map(|_| ())
			.map_err(|e| RouterError::from_js("appendChild", e))
	}

	fn remove_child(&self, region: &Element, child: &Element) -> Result<(), RouterError> {
		region
			.remove_child(child)
			.map(|_| ())
			.map_err(|e| RouterError::from_js("removeChild", e))
	}

	fn contains_child(&self, region: &Element, child: &Element) -> bool {
		child.parent_element().as_ref() == Some(region)
	}
}

/// [`HistoryService`] over `window.history` and `window.location`.
#[derive(Debug, Clone)]
pub struct BrowserHistory {
	window: Window,
}

impl BrowserHistory {
	/// Binds to the global window.
	pub fn new() -> Result<Self, RouterError> {
		Ok(Self { window: window()? })
	}

	fn history(&self) -> Result<web_sys::History, RouterError> {
		self.window
			.history()
			.map_err(|e| RouterError::from_js("window.history", e))
	}
}

impl HistoryService for BrowserHistory {
	fn location(&self) -> Result<Location, RouterError> {
		let location = self.window.location();
		let origin = location
			.origin()
			.map_err(|e| RouterError::from_js("location.origin", e))?;
		let pathname = location
			.pathname()
			.map_err(|e| RouterError::from_js("location.pathname", e))?;
		let hash = location
			.hash()
			.map_err(|e| RouterError::from_js("location.hash", e))?;
		Ok(Location::new(origin, pathname, hash))
	}

	fn push_state(&self, title: &str, url: &str) -> Result<(), RouterError> {
		self.history()?
			.push_state_with_url(&JsValue::NULL, title, Some(url))
			.map_err(|e| RouterError::from_js("history.pushState", e))
	}

	fn back(&self) -> Result<(), RouterError> {
		self.history()?
			.back()
			.map_err(|e| RouterError::from_js("history.back", e))
	}

	fn go(&self, delta: i32) -> Result<(), RouterError> {
		self.history()?
			.go_with_delta(delta)
			.map_err(|e| RouterError::from_js("history.go", e))
	}

	fn on_pop_state(&self, listener: PopStateListener) -> Result<(), RouterError> {
		let closure = Closure::wrap(Box::new(move |_event: Event| {
			listener();
		}) as Box<dyn FnMut(_)>);

		self.window
			.add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())
			.map_err(|e| RouterError::from_js("addEventListener(popstate)", e))?;
		// Keep the closure alive for the lifetime of the page
		closure.forget();
		Ok(())
	}
}

impl RouterBuilder<Element> {
	/// Builds the router against the live document and `window.history`.
	pub fn mount(self) -> Result<BrowserRouter, RouterError> {
		self.build(BrowserDom::new()?, BrowserHistory::new()?)
	}
}
