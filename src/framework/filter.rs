//! Service Filter
//!
//! The only supported filter is a single equality test on the interface name:
//! `(objectClass=<name>)`. No composition, no wildcards, no other attributes.

use crate::framework::constants::OBJECT_CLASS;
use crate::framework::error::{FrameworkError, FrameworkResult};
use crate::framework::service::ServiceReference;
use std::fmt;
use std::str::FromStr;

/// Compiled `(objectClass=<name>)` predicate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Filter {
    interface_name: String,
}

impl Filter {
    /// Parse a filter string
    ///
    /// The string must be exactly `(objectClass=<value>)` with a non-empty
    /// value that contains no parentheses. Whitespace is significant.
    pub fn compile(filter: &str) -> FrameworkResult<Self> {
        let syntax_error = |reason: &str| FrameworkError::InvalidSyntax {
            filter: filter.to_string(),
            reason: reason.to_string(),
        };

        let body = filter
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| syntax_error("filter must be enclosed in parentheses"))?;

        let (attribute, value) = body
            .split_once('=')
            .ok_or_else(|| syntax_error("expected an attribute=value pair"))?;

        if attribute != OBJECT_CLASS {
            return Err(syntax_error(&format!(
                "unsupported attribute '{}', only '{}' is supported",
                attribute, OBJECT_CLASS
            )));
        }
        if value.is_empty() {
            return Err(syntax_error("missing value"));
        }
        if value.contains(['(', ')']) {
            return Err(syntax_error("composite filters are not supported"));
        }

        Ok(Self {
            interface_name: value.to_string(),
        })
    }

    /// Canonical filter for an interface name, without parsing
    pub fn for_interface(interface_name: &str) -> Self {
        Self {
            interface_name: interface_name.to_string(),
        }
    }

    /// The interface name this filter selects
    pub fn interface_name(&self) -> &str {
        &self.interface_name
    }

    /// True iff the reference was registered under exactly this interface name
    pub fn matches(&self, reference: &ServiceReference) -> bool {
        reference.interface_name() == self.interface_name
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}={})", OBJECT_CLASS, self.interface_name)
    }
}

impl FromStr for Filter {
    type Err = FrameworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}
