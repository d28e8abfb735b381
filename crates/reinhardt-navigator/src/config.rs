//! Router configuration.
//!
//! [`RouterOptions`] carries everything except the route table and the display
//! region. It deserializes from JSON (camelCase keys), so an application can
//! ship its routing options alongside its markup:
//!
//! ```
//! use reinhardt_navigator::{RouterMode, RouterOptions};
//!
//! let options = RouterOptions::from_json(r#"{"mode": "history", "rootUrl": "examples/app"}"#)
//!     .unwrap();
//! assert_eq!(options.mode, RouterMode::History);
//! assert_eq!(options.root_url, "examples/app");
//! ```

use crate::error::RouterError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Attribute marking anchors that the router should intercept.
pub const DEFAULT_LINK_ATTRIBUTE: &str = "data-router-name";

/// Default mount path for history mode.
pub const DEFAULT_ROOT_URL: &str = "/";

/// Address-encoding strategy, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouterMode {
	/// Routes live in the location fragment (`#about`).
	#[default]
	Hash,
	/// Routes live in the location path, below the root mount path.
	History,
}

impl RouterMode {
	/// Returns the configuration name of this mode.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Hash => "hash",
			Self::History => "history",
		}
	}
}

impl fmt::Display for RouterMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for RouterMode {
	type Err = RouterError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"hash" => Ok(Self::Hash),
			"history" => Ok(Self::History),
			other => Err(RouterError::configuration(format!(
				"Unknown router mode: '{}' (expected 'hash' or 'history')",
				other
			))),
		}
	}
}

/// Options recognized at router construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct RouterOptions {
	/// Address-encoding strategy.
	pub mode: RouterMode,
	/// Mount path prefix, only used in history mode.
	pub root_url: String,
	/// Route shown when the current address matches nothing.
	pub fallback: Option<String>,
	/// Attribute whose value names the route an anchor links to.
	pub link_attribute: String,
}

impl Default for RouterOptions {
	fn default() -> Self {
		Self {
			mode: RouterMode::default(),
			root_url: DEFAULT_ROOT_URL.to_string(),
			fallback: None,
			link_attribute: DEFAULT_LINK_ATTRIBUTE.to_string(),
		}
	}
}

impl RouterOptions {
	/// Creates options with default values.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses options from a JSON object.
	pub fn from_json(json: &str) -> Result<Self, RouterError> {
		let options: Self = serde_json::from_str(json)
			.map_err(|e| RouterError::configuration(format!("Invalid router options: {}", e)))?;
		options.validate()?;
		Ok(options)
	}

	/// Sets the mode.
	pub fn mode(mut self, mode: RouterMode) -> Self {
		self.mode = mode;
		self
	}

	/// Sets the root mount path.
	pub fn root_url(mut self, root_url: impl Into<String>) -> Self {
		self.root_url = root_url.into();
		self
	}

	/// Sets the fallback route name.
	pub fn fallback(mut self, name: impl Into<String>) -> Self {
		self.fallback = Some(name.into());
		self
	}

	/// Sets the link attribute name.
	pub fn link_attribute(mut self, attribute: impl Into<String>) -> Self {
		self.link_attribute = attribute.into();
		self
	}

	/// Checks values that serde cannot reject on its own.
	pub fn validate(&self) -> Result<(), RouterError> {
		if self.link_attribute.trim().is_empty() {
			return Err(RouterError::configuration(
				"Link attribute name must not be empty",
			));
		}
		if self
			.link_attribute
			.chars()
			.any(|c| c.is_whitespace() || matches!(c, '[' | ']' | '"' | '\'' | '='))
		{
			return Err(RouterError::configuration(format!(
				"Link attribute name is not a valid attribute: '{}'",
				self.link_attribute
			)));
		}
		Ok(())
	}
}
