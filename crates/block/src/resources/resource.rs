//! Named resource whose acquisition can fail logically.

use crate::error::BoxError;
use crate::manager::{Emplace, Holder, Managed};

/// A named resource with a success flag fixed at construction.
///
/// Construction always produces a value; `successful` decides whether the
/// acquisition counts. Deliberately not `Clone`.
#[derive(Debug)]
pub struct Resource {
    name: String,
    successful: bool,
}

impl Resource {
    /// Create a resource.
    pub fn new(name: impl Into<String>, succeed: bool) -> Self {
        Self {
            name: name.into(),
            successful: succeed,
        }
    }

    /// Resource name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether acquisition succeeded.
    #[must_use]
    pub fn successful(&self) -> bool {
        self.successful
    }

    /// Emit a line attributed to this resource and return it.
    pub fn say(&self, text: &str) -> String {
        let line = format!("Resource({}) says: {text}", self.name);
        tracing::info!(resource = %self.name, "{line}");
        line
    }
}

/// Construction arguments for [`Resource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSpec {
    /// Resource name.
    pub name: String,
    /// Whether acquisition should succeed.
    pub succeed: bool,
}

impl From<&str> for ResourceSpec {
    fn from(name: &str) -> Self {
        Self {
            name: name.to_string(),
            succeed: true,
        }
    }
}

impl From<(&str, bool)> for ResourceSpec {
    fn from((name, succeed): (&str, bool)) -> Self {
        Self {
            name: name.to_string(),
            succeed,
        }
    }
}

impl Emplace for Resource {
    type Args = ResourceSpec;

    fn emplace(spec: ResourceSpec) -> Result<Self, BoxError> {
        Ok(Self::new(spec.name, spec.succeed))
    }

    fn is_acquired(&self) -> bool {
        self.successful
    }
}

impl Managed for Resource {
    type Manager = Holder<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::ContextManager;

    #[test]
    fn spec_defaults_to_success() {
        let spec = ResourceSpec::from("foo");
        assert!(spec.succeed);
        assert!(!ResourceSpec::from(("bar", false)).succeed);
    }

    #[test]
    fn enter_reports_logical_outcome() {
        let mut ok = Holder::<Resource>::default();
        assert!(ok.enter("foo".into()));

        let mut failed = Holder::<Resource>::default();
        assert!(!failed.enter(("bar", false).into()));
        assert!(failed.is_occupied(), "value is built even when acquisition fails");
    }

    #[test]
    fn say_formats_line() {
        let resource = Resource::new("foo", true);
        assert_eq!(resource.say("hi"), "Resource(foo) says: hi");
    }
}
