//! Address encoding strategies.
//!
//! A route path (`/about`) and the address the browser shows are related
//! differently per [`RouterMode`]:
//!
//! | mode | route path | href | location read back |
//! |------|------------|------|--------------------|
//! | hash | `/about` | `#about` | `location.hash` = `#about` |
//! | history (root `examples/app`) | `/about` | `<origin>/examples/app/about` | `location.pathname` = `/examples/app/about` |
//!
//! The router only talks to [`AddressStrategy`], so navigation logic is the
//! same for both modes.

use crate::config::RouterMode;
use crate::history::Location;
use std::fmt;

/// Translates between route paths and addresses.
pub trait AddressStrategy: fmt::Debug {
	/// Returns the address an anchor or history entry should carry for `path`.
	fn href(&self, path: &str) -> String;

	/// Returns the route path the current `location` designates.
	fn route_path(&self, location: &Location) -> String;

	/// Returns the origin-qualified mount URL, if this strategy uses one.
	fn root_url(&self) -> Option<&str> {
		None
	}
}

/// Fragment-based addressing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HashAddress;

impl AddressStrategy for HashAddress {
	fn href(&self, path: &str) -> String {
		format!("#{}", path.strip_prefix('/').unwrap_or(path))
	}

	fn route_path(&self, location: &Location) -> String {
		let fragment = if location.hash.is_empty() {
			"#"
		} else {
			location.hash.as_str()
		};
		match fragment.strip_prefix('#') {
			Some(rest) => format!("/{}", rest),
			None => fragment.to_string(),
		}
	}
}

/// Path-based addressing below a mount prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryAddress {
	/// Normalized mount prefix (`/examples/app`, or empty for `/`).
	prefix: String,
	/// `origin` + `prefix`.
	root_url: String,
}

impl HistoryAddress {
	/// Creates a strategy for `root` mounted under `origin`.
	pub fn new(origin: &str, root: &str) -> Self {
		let prefix = normalize_root(root);
		let root_url = format!("{}{}", origin.trim_end_matches('/'), prefix);
		Self { prefix, root_url }
	}

	/// Returns the normalized mount prefix.
	pub fn prefix(&self) -> &str {
		&self.prefix
	}
}

impl AddressStrategy for HistoryAddress {
	fn href(&self, path: &str) -> String {
		format!("{}{}", self.root_url, path)
	}

	fn route_path(&self, location: &Location) -> String {
		let pathname = location.pathname.as_str();
		match pathname.strip_prefix(self.prefix.as_str()) {
			// Only strip at a segment boundary: `/app` must not eat `/apple`.
			Some("") => "/".to_string(),
			Some(rest) if rest.starts_with('/') => rest.to_string(),
			_ => pathname.to_string(),
		}
	}

	fn root_url(&self) -> Option<&str> {
		Some(&self.root_url)
	}
}

/// Normalizes a mount path: forces a leading `/` and strips trailing ones.
///
/// The root mount `/` normalizes to the empty prefix.
///
/// ```
/// use reinhardt_navigator::address::normalize_root;
///
/// assert_eq!(normalize_root("examples/app/"), "/examples/app");
/// assert_eq!(normalize_root("/"), "");
/// ```
pub fn normalize_root(root: &str) -> String {
	let trimmed = root.trim();
	let with_leading = if trimmed.starts_with('/') {
		trimmed.to_string()
	} else {
		format!("/{}", trimmed)
	};
	with_leading.trim_end_matches('/').to_string()
}

/// Builds the strategy for `mode`.
pub fn strategy_for(mode: RouterMode, origin: &str, root: &str) -> Box<dyn AddressStrategy> {
	match mode {
		RouterMode::Hash => Box::new(HashAddress),
		RouterMode::History => Box::new(HistoryAddress::new(origin, root)),
	}
}
