//! Navigation service abstraction.
//!
//! The router never touches `window.history` directly. It talks to a
//! [`HistoryService`], which offers push/back/go, a readable [`Location`]
//! and a "position changed" (popstate) subscription. The browser binding
//! lives in [`crate::web`]; [`MemoryHistory`] keeps an in-process entry stack
//! for native targets and tests.

use crate::error::RouterError;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Callback invoked when the history position changes through traversal.
pub type PopStateListener = Box<dyn Fn() + 'static>;

/// Snapshot of the current address.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
	/// Scheme, host and port (`https://example.com`).
	pub origin: String,
	/// Path component, always starting with `/`.
	pub pathname: String,
	/// Fragment including the leading `#`, or empty when there is none.
	pub hash: String,
}

impl Location {
	/// Creates a location from its parts.
	pub fn new(
		origin: impl Into<String>,
		pathname: impl Into<String>,
		hash: impl Into<String>,
	) -> Self {
		Self {
			origin: origin.into(),
			pathname: pathname.into(),
			hash: hash.into(),
		}
	}

	/// Parses an absolute URL such as `http://localhost/app/#about`.
	///
	/// The query string is dropped; routing never looks at it.
	pub fn parse(url: &str) -> Result<Self, RouterError> {
		let scheme_end = url.find("://").ok_or_else(|| {
			RouterError::InvalidArgument(format!("Not an absolute URL: '{}'", url))
		})?;
		let authority_start = scheme_end + 3;
		let path_start = url[authority_start..]
			.find(['/', '#', '?'])
			.map(|i| authority_start + i)
			.unwrap_or(url.len());

		let origin = &url[..path_start];
		let (pathname, hash) = split_path_and_hash(&url[path_start..]);
		Ok(Self::new(origin, pathname, hash))
	}

	/// Returns the full URL.
	pub fn href(&self) -> String {
		format!("{}{}{}", self.origin, self.pathname, self.hash)
	}
}

impl fmt::Display for Location {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.href())
	}
}

/// Splits `/path?query#frag` into a normalized pathname and hash.
fn split_path_and_hash(rest: &str) -> (String, String) {
	let (before_hash, hash) = match rest.find('#') {
		Some(i) => (&rest[..i], &rest[i..]),
		None => (rest, ""),
	};
	let path = before_hash.split('?').next().unwrap_or_default();
	let pathname = if path.is_empty() {
		"/".to_string()
	} else {
		path.to_string()
	};
	// A bare `#` reads back as an empty fragment, as in browsers.
	let hash = if hash == "#" { "" } else { hash };
	(pathname, hash.to_string())
}

/// The external navigation service driven by the router.
pub trait HistoryService {
	/// Reads the current address.
	fn location(&self) -> Result<Location, RouterError>;

	/// Records a new entry for `url` under `title` without reloading.
	fn push_state(&self, title: &str, url: &str) -> Result<(), RouterError>;

	/// Steps one entry back.
	fn back(&self) -> Result<(), RouterError>;

	/// Jumps `delta` entries relative to the current position.
	fn go(&self, delta: i32) -> Result<(), RouterError>;

	/// Subscribes to position changes caused by back/forward traversal.
	fn on_pop_state(&self, listener: PopStateListener) -> Result<(), RouterError>;
}

/// A recorded history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
	/// Title passed to `push_state` (the route name).
	pub title: String,
	/// Address of the entry.
	pub location: Location,
}

#[derive(Default)]
struct MemoryHistoryState {
	entries: Vec<HistoryEntry>,
	position: usize,
	listeners: Vec<Rc<dyn Fn()>>,
}

/// In-memory navigation service.
///
/// Clones share the same entry stack, so a test can keep one handle while the
/// router owns another. Unlike a browser, traversal delivers popstate
/// listeners synchronously before `back`/`go` return.
///
/// ```
/// use reinhardt_navigator::{HistoryService, MemoryHistory};
///
/// let history = MemoryHistory::new("http://localhost/#").unwrap();
/// history.push_state("about", "#about").unwrap();
/// assert_eq!(history.current_url(), "http://localhost/#about");
/// history.back().unwrap();
/// assert_eq!(history.current_url(), "http://localhost/");
/// ```
#[derive(Clone)]
pub struct MemoryHistory {
	state: Rc<RefCell<MemoryHistoryState>>,
}

impl fmt::Debug for MemoryHistory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.state.borrow();
		f.debug_struct("MemoryHistory")
			.field("entries", &state.entries)
			.field("position", &state.position)
			.field("listeners", &state.listeners.len())
			.finish()
	}
}

impl MemoryHistory {
	/// Creates a history whose single entry is `url`.
	pub fn new(url: &str) -> Result<Self, RouterError> {
		let location = Location::parse(url)?;
		Ok(Self {
			state: Rc::new(RefCell::new(MemoryHistoryState {
				entries: vec![HistoryEntry {
					title: String::new(),
					location,
				}],
				position: 0,
				listeners: Vec::new(),
			})),
		})
	}

	/// Returns the number of entries.
	pub fn len(&self) -> usize {
		self.state.borrow().entries.len()
	}

	/// Always false; the initial entry is never removed.
	pub fn is_empty(&self) -> bool {
		self.state.borrow().entries.is_empty()
	}

	/// Returns the index of the current entry.
	pub fn position(&self) -> usize {
		self.state.borrow().position
	}

	/// Returns a copy of every entry.
	pub fn entries(&self) -> Vec<HistoryEntry> {
		self.state.borrow().entries.clone()
	}

	/// Returns the current entry.
	pub fn current_entry(&self) -> HistoryEntry {
		let state = self.state.borrow();
		state.entries[state.position].clone()
	}

	/// Returns the full URL of the current entry.
	pub fn current_url(&self) -> String {
		self.current_entry().location.href()
	}

	/// Returns the number of popstate subscribers.
	pub fn listener_count(&self) -> usize {
		self.state.borrow().listeners.len()
	}

	/// Resolves `url` against the current entry, like `pushState` does.
	fn resolve(&self, url: &str) -> Location {
		let current = self.current_entry().location;
		let origin = current.origin.clone();

		let rest = if let Some(stripped) = url
			.strip_prefix(origin.as_str())
			.filter(|_| !origin.is_empty())
		{
			stripped.to_string()
		} else if url.starts_with('#') {
			format!("{}{}", current.pathname, url)
		} else if url.starts_with('/') {
			url.to_string()
		} else {
			let base = match current.pathname.rfind('/') {
				Some(i) => &current.pathname[..=i],
				None => "/",
			};
			format!("{}{}", base, url)
		};

		let (pathname, hash) = split_path_and_hash(&rest);
		Location::new(origin, pathname, hash)
	}

	fn notify(&self) {
		// Listeners may call back into this history; release the borrow first.
		let listeners: Vec<Rc<dyn Fn()>> = self.state.borrow().listeners.clone();
		for listener in listeners {
			listener();
		}
	}
}

impl HistoryService for MemoryHistory {
	fn location(&self) -> Result<Location, RouterError> {
		Ok(self.current_entry().location)
	}

	fn push_state(&self, title: &str, url: &str) -> Result<(), RouterError> {
		let location = self.resolve(url);
		let mut state = self.state.borrow_mut();
		let next = state.position + 1;
		state.entries.truncate(next);
		state.entries.push(HistoryEntry {
			title: title.to_string(),
			location,
		});
		state.position = next;
		Ok(())
	}

	fn back(&self) -> Result<(), RouterError> {
		self.go(-1)
	}

	fn go(&self, delta: i32) -> Result<(), RouterError> {
		{
			let mut state = self.state.borrow_mut();
			let target = state.position as i64 + i64::from(delta);
			if delta == 0 || target < 0 || target >= state.entries.len() as i64 {
				return Ok(());
			}
			state.position = target as usize;
		}
		self.notify();
		Ok(())
	}

	fn on_pop_state(&self, listener: PopStateListener) -> Result<(), RouterError> {
		self.state.borrow_mut().listeners.push(Rc::from(listener));
		Ok(())
	}
}
