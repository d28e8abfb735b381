//! Error types for client-side navigation.

/// Error type for router construction and navigation.
///
/// Every variant reflects a caller or configuration mistake (or a rejection
/// from the browser), so none of them are retried internally.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
	/// The route table, display region or options are invalid.
	#[error("Invalid router configuration: {0}")]
	Configuration(String),

	/// A link attribute or `visit()` argument names an undeclared route.
	#[error("No route found with name: '{0}'")]
	UnknownRouteName(String),

	/// A navigation argument could not be interpreted.
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	/// The current address matches no route and no fallback is configured.
	#[error("No route matches address: '{0}'")]
	NoMatchingRoute(String),

	/// The navigation service or UI tree rejected an operation.
	#[error("Navigation failed: {0}")]
	NavigationFailed(String),
}

impl RouterError {
	/// Shorthand for a [`RouterError::Configuration`] error.
	pub(crate) fn configuration(msg: impl Into<String>) -> Self {
		Self::Configuration(msg.into())
	}

	/// Converts a JavaScript exception into a [`RouterError::NavigationFailed`].
	#[cfg(target_arch = "wasm32")]
	pub(crate) fn from_js(context: &str, err: wasm_bindgen::JsValue) -> Self {
		Self::NavigationFailed(format!("{}: {:?}", context, err))
	}
}
