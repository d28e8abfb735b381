//! UI tree abstraction.
//!
//! The router needs very little from the host page: find anchors carrying the
//! link attribute, rewrite their `href`, intercept their clicks, and attach or
//! detach route elements under the display region. [`Dom`] captures exactly
//! that. The browser implementation lives in [`crate::web`]; [`MemoryDom`] is
//! a small node arena used on native targets and in tests.

use crate::error::RouterError;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Callback run in place of an anchor's default navigation.
pub type ClickHandler = Box<dyn Fn() + 'static>;

/// UI-tree capability consumed by the router.
pub trait Dom {
	/// Handle to a UI element. Handles compare equal when they refer to the same node.
	type Element: Clone + PartialEq + 'static;

	/// Returns true if `element` can host route content.
	fn is_valid_region(&self, element: &Self::Element) -> bool;

	/// Returns every anchor carrying `attribute`, in document order.
	fn query_links(&self, attribute: &str) -> Result<Vec<Self::Element>, RouterError>;

	/// Reads an attribute value.
	fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

	/// Writes an attribute value.
	fn set_attribute(
		&self,
		element: &Self::Element,
		name: &str,
		value: &str,
	) -> Result<(), RouterError>;

	/// Suppresses the default activation of `element` and runs `handler` instead.
	fn intercept_clicks(
		&self,
		element: &Self::Element,
		handler: ClickHandler,
	) -> Result<(), RouterError>;

	/// Removes every child of `region`.
	fn clear_children(&self, region: &Self::Element) -> Result<(), RouterError>;

	/// Attaches `child` as the last child of `region`.
	fn append_child(
		&self,
		region: &Self::Element,
		child: &Self::Element,
	) -> Result<(), RouterError>;

	/// Detaches `child` from `region`.
	fn remove_child(
		&self,
		region: &Self::Element,
		child: &Self::Element,
	) -> Result<(), RouterError>;

	/// Returns true if `child` is currently a direct child of `region`.
	fn contains_child(&self, region: &Self::Element, child: &Self::Element) -> bool;
}

/// Handle to a node in a [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
	/// Returns the arena index of this node.
	pub fn index(&self) -> usize {
		self.0
	}
}

struct MemoryNode {
	tag: String,
	attributes: BTreeMap<String, String>,
	children: Vec<NodeId>,
	parent: Option<NodeId>,
	click_handlers: Vec<Rc<dyn Fn()>>,
}

#[derive(Default)]
struct MemoryDomState {
	nodes: Vec<MemoryNode>,
}

impl MemoryDomState {
	fn node(&self, id: NodeId) -> Result<&MemoryNode, RouterError> {
		self.nodes
			.get(id.0)
			.ok_or_else(|| RouterError::NavigationFailed(format!("Unknown node: {:?}", id)))
	}

	fn node_mut(&mut self, id: NodeId) -> Result<&mut MemoryNode, RouterError> {
		self.nodes
			.get_mut(id.0)
			.ok_or_else(|| RouterError::NavigationFailed(format!("Unknown node: {:?}", id)))
	}

	fn detach(&mut self, child: NodeId) -> Result<(), RouterError> {
		if let Some(parent) = self.node(child)?.parent {
			self.node_mut(parent)?.children.retain(|c| *c != child);
			self.node_mut(child)?.parent = None;
		}
		Ok(())
	}
}

/// In-memory UI tree.
///
/// Clones share the same nodes. Nodes are never freed; a detached node keeps
/// its attributes and handlers and can be attached again.
///
/// ```
/// use reinhardt_navigator::{Dom, MemoryDom};
///
/// let dom = MemoryDom::new();
/// let main = dom.create_element("main");
/// let page = dom.create_element("section");
/// dom.append_child(&main, &page).unwrap();
/// assert_eq!(dom.children(main), vec![page]);
/// ```
#[derive(Clone, Default)]
pub struct MemoryDom {
	state: Rc<RefCell<MemoryDomState>>,
}

impl fmt::Debug for MemoryDom {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemoryDom")
			.field("nodes", &self.state.borrow().nodes.len())
			.finish()
	}
}

impl MemoryDom {
	/// Creates an empty tree.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a detached element.
	pub fn create_element(&self, tag: &str) -> NodeId {
		let mut state = self.state.borrow_mut();
		let id = NodeId(state.nodes.len());
		state.nodes.push(MemoryNode {
			tag: tag.to_ascii_lowercase(),
			attributes: BTreeMap::new(),
			children: Vec::new(),
			parent: None,
			click_handlers: Vec::new(),
		});
		id
	}

	/// Creates an anchor linking to the route named `route_name` via `attribute`.
	pub fn create_link(&self, attribute: &str, route_name: &str) -> NodeId {
		let id = self.create_element("a");
		if let Some(node) = self.state.borrow_mut().nodes.get_mut(id.0) {
			node.attributes
				.insert(attribute.to_string(), route_name.to_string());
		}
		id
	}

	/// Returns the tag name of a node.
	pub fn tag_name(&self, id: NodeId) -> Option<String> {
		self.state.borrow().node(id).ok().map(|n| n.tag.clone())
	}

	/// Returns the children of a node.
	pub fn children(&self, id: NodeId) -> Vec<NodeId> {
		self.state
			.borrow()
			.node(id)
			.map(|n| n.children.clone())
			.unwrap_or_default()
	}

	/// Returns the parent of a node.
	pub fn parent(&self, id: NodeId) -> Option<NodeId> {
		self.state.borrow().node(id).ok().and_then(|n| n.parent)
	}

	/// Returns the number of click handlers attached to a node.
	pub fn click_handler_count(&self, id: NodeId) -> usize {
		self.state
			.borrow()
			.node(id)
			.map(|n| n.click_handlers.len())
			.unwrap_or(0)
	}

	/// Simulates a click.
	///
	/// Returns `true` if an interceptor handled the click, i.e. the default
	/// navigation was prevented.
	pub fn click(&self, id: NodeId) -> bool {
		let handlers: Vec<Rc<dyn Fn()>> = self
			.state
			.borrow()
			.node(id)
			.map(|n| n.click_handlers.clone())
			.unwrap_or_default();
		for handler in &handlers {
			handler();
		}
		!handlers.is_empty()
	}
}

impl Dom for MemoryDom {
	type Element = NodeId;

	fn is_valid_region(&self, element: &NodeId) -> bool {
		self.state.borrow().node(*element).is_ok()
	}

	fn query_links(&self, attribute: &str) -> Result<Vec<NodeId>, RouterError> {
		Ok(self
			.state
			.borrow()
			.nodes
			.iter()
			.enumerate()
			.filter(|(_, n)| n.tag == "a" && n.attributes.contains_key(attribute))
			.map(|(i, _)| NodeId(i))
			.collect())
	}

	fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
		self.state
			.borrow()
			.node(*element)
			.ok()
			.and_then(|n| n.attributes.get(name).cloned())
	}

	fn set_attribute(&self, element: &NodeId, name: &str, value: &str) -> Result<(), RouterError> {
		self.state
			.borrow_mut()
			.node_mut(*element)?
			.attributes
			.insert(name.to_string(), value.to_string());
		Ok(())
	}

	fn intercept_clicks(&self, element: &NodeId, handler: ClickHandler) -> Result<(), RouterError> {
		self.state
			.borrow_mut()
			.node_mut(*element)?
			.click_handlers
			.push(Rc::from(handler));
		Ok(())
	}

	fn clear_children(&self, region: &NodeId) -> Result<(), RouterError> {
		let mut state = self.state.borrow_mut();
		let children = std::mem::take(&mut state.node_mut(*region)?.children);
		for child in children {
			state.node_mut(child)?.parent = None;
		}
		Ok(())
	}

	fn append_child(&self, region: &NodeId, child: &NodeId) -> Result<(), RouterError> {
		if region == child {
			return Err(RouterError::NavigationFailed(
				"Cannot append a node to itself".to_string(),
			));
		}
		let mut state = self.state.borrow_mut();
		state.node(*region)?;
		state.detach(*child)?;
		state.node_mut(*region)?.children.push(*child);
		state.node_mut(*child)?.parent = Some(*region);
		Ok(())
	}

	fn remove_child(&self, region: &NodeId, child: &NodeId) -> Result<(), RouterError> {
		let mut state = self.state.borrow_mut();
		if state.node(*child)?.parent != Some(*region) {
			return Err(RouterError::NavigationFailed(format!(
				"{:?} is not a child of {:?}",
				child, region
			)));
		}
		state.detach(*child)
	}

	fn contains_child(&self, region: &NodeId, child: &NodeId) -> bool {
		self.parent(*child) == Some(*region)
	}
}
