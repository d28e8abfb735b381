//! Route definitions and the route table.
//!
//! A route maps an exact root-relative path to a named UI element. The table
//! is validated once and is immutable afterwards.

use crate::error::RouterError;
use std::collections::HashMap;

/// A single route definition.
///
/// `E` is the UI element handle of the [`Dom`](crate::dom::Dom) the router
/// drives (`web_sys::Element` in the browser, [`NodeId`](crate::dom::NodeId)
/// in memory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition<E> {
	/// Root-relative path, matched exactly.
	path: String,
	/// Unique route name.
	name: String,
	/// Already-attached UI content.
	element: Option<E>,
	/// Location of deferred content, resolved by the router's content resolver.
	element_path: Option<String>,
}

impl<E> RouteDefinition<E> {
	/// Creates a route whose content is an existing UI element.
	pub fn new(name: impl Into<String>, path: impl Into<String>, element: E) -> Self {
		Self {
			path: path.into(),
			name: name.into(),
			element: Some(element),
			element_path: None,
		}
	}

	/// Creates a route whose content is resolved from `element_path` on first display.
	pub fn deferred(
		name: impl Into<String>,
		path: impl Into<String>,
		element_path: impl Into<String>,
	) -> Self {
		Self {
			path: path.into(),
			name: name.into(),
			element: None,
			element_path: Some(element_path.into()),
		}
	}

	/// Returns the route path.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Returns the route name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the attached element, if any.
	pub fn element(&self) -> Option<&E> {
		self.element.as_ref()
	}

	/// Returns the deferred content location, if any.
	pub fn element_path(&self) -> Option<&str> {
		self.element_path.as_deref()
	}

	/// Returns true if content must come from the content resolver.
	pub fn is_deferred(&self) -> bool {
		self.element.is_none() && self.element_path.is_some()
	}
}

/// The ordered, non-empty set of routes owned by a router.
#[derive(Debug, Clone)]
pub struct RouteTable<E> {
	routes: Vec<RouteDefinition<E>>,
	named_routes: HashMap<String, usize>,
	paths: HashMap<String, usize>,
}

impl<E> RouteTable<E> {
	/// Validates and builds a route table.
	///
	/// Fails with [`RouterError::Configuration`] when the table is empty, a
	/// name or path is repeated, a path is not root-relative, or a route does
	/// not carry exactly one of an element and an element path.
	pub fn new(routes: Vec<RouteDefinition<E>>) -> Result<Self, RouterError> {
		if routes.is_empty() {
			return Err(RouterError::configuration("Invalid routes array provided"));
		}

		let mut named_routes = HashMap::with_capacity(routes.len());
		let mut paths = HashMap::with_capacity(routes.len());

		for (index, route) in routes.iter().enumerate() {
			if route.name.is_empty() {
				return Err(RouterError::configuration(format!(
					"Route at index {} has an empty name",
					index
				)));
			}
			if !route.path.starts_with('/') {
				return Err(RouterError::configuration(format!(
					"Route '{}' path must start with '/': '{}'",
					route.name, route.path
				)));
			}
			match (&route.element, &route.element_path) {
				(None, None) => {
					return Err(RouterError::configuration(format!(
						"Route '{}' needs an element or an element path",
						route.name
					)));
				}
				(Some(_), Some(_)) => {
					return Err(RouterError::configuration(format!(
						"Route '{}' must not declare both an element and an element path",
						route.name
					)));
				}
				_ => {}
			}
			if named_routes.insert(route.name.clone(), index).is_some() {
				return Err(RouterError::configuration(format!(
					"Duplicate route name: '{}'",
					route.name
				)));
			}
			if paths.insert(route.path.clone(), index).is_some() {
				return Err(RouterError::configuration(format!(
					"Duplicate route path: '{}'",
					route.path
				)));
			}
		}

		Ok(Self {
			routes,
			named_routes,
			paths,
		})
	}

	/// Returns the number of routes.
	pub fn len(&self) -> usize {
		self.routes.len()
	}

	/// Always false; an empty table cannot be constructed.
	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}

	/// Returns the route at `index`.
	pub fn get(&self, index: usize) -> Option<&RouteDefinition<E>> {
		self.routes.get(index)
	}

	/// Returns the index of the route named `name`.
	pub fn index_of(&self, name: &str) -> Option<usize> {
		self.named_routes.get(name).copied()
	}

	/// Returns the index of the route whose path is exactly `path`.
	pub fn match_path(&self, path: &str) -> Option<usize> {
		self.paths.get(path).copied()
	}

	/// Looks up a route by name.
	pub fn by_name(&self, name: &str) -> Option<&RouteDefinition<E>> {
		self.index_of(name).map(|i| &self.routes[i])
	}

	/// Checks if a route name exists.
	pub fn has_route(&self, name: &str) -> bool {
		self.named_routes.contains_key(name)
	}

	/// Iterates routes in declaration order.
	pub fn iter(&self) -> impl Iterator<Item = &RouteDefinition<E>> {
		self.routes.iter()
	}

	/// Returns the routes in declaration order.
	pub fn as_slice(&self) -> &[RouteDefinition<E>] {
		&self.routes
	}
}
