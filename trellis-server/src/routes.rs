//! Named routes and URL reversal.

use std::collections::BTreeMap;
use std::fmt;

/// Route name to path pattern, in axum syntax (`/form/{parameter}`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: BTreeMap<String, String>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `path` under `name`, replacing any earlier registration.
    pub fn add(&mut self, name: impl Into<String>, path: impl Into<String>) -> &mut Self {
        self.routes.insert(name.into(), path.into());
        self
    }

    pub fn path(&self, name: &str) -> Option<&str> {
        self.routes.get(name).map(String::as_str)
    }

    /// Build the URL for `name`, substituting `params` into placeholder
    /// segments in order.
    ///
    /// Placeholders without a matching param stay literal. Unknown names
    /// reverse to an empty string.
    pub fn reverse<P: fmt::Display>(&self, name: &str, params: &[P]) -> String {
        let Some(pattern) = self.routes.get(name) else {
            tracing::debug!(name, "reverse for unknown route");
            return String::new();
        };

        let mut params = params.iter();
        pattern
            .split('/')
            .map(|segment| {
                if segment.starts_with('{') && segment.ends_with('}') {
                    if let Some(param) = params.next() {
                        return param.to_string();
                    }
                }
                segment.to_string()
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}
