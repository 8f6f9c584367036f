//! The in-flight request as seen by visibility decisions.
//!
//! Visibility checks receive the request explicitly instead of reading an
//! ambient thread-local; `None` means no request is being served.

use serde::{Deserialize, Serialize};

/// Operation name of a capabilities-listing request.
pub const GET_CAPABILITIES: &str = "GetCapabilities";

/// Operation being served plus its optional virtual-service context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Service name, e.g. `"WMS"`.
    #[serde(default)]
    pub service: Option<String>,
    /// Operation name, e.g. `"GetCapabilities"` or `"GetMap"`.
    #[serde(default)]
    pub operation: Option<String>,
    /// Virtual-service context, e.g. `"topp"` for a workspace endpoint or
    /// `"topp/states"` for a layer-specific endpoint.
    #[serde(default)]
    pub context: Option<String>,
}

impl Request {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Self::default()
        }
    }

    /// Shorthand for a `GetCapabilities` request.
    pub fn capabilities() -> Self {
        Self::new(GET_CAPABILITIES)
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Whether this request lists capabilities (case-insensitive match on the
    /// operation name).
    pub fn is_capabilities(&self) -> bool {
        self.operation
            .as_deref()
            .is_some_and(|op| eq_ignore_case(op, GET_CAPABILITIES))
    }
}

/// Case-insensitive string equality using full Unicode lowercase folding.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}
