//! Public API for the module framework
//!
//! External modules should import from here rather than directly from
//! internal modules.

// Registry and lifecycle
pub use crate::framework::bundle::{Bundle, BundleActivator, BundleState};
pub use crate::framework::context::BundleContext;
pub use crate::framework::registry::Registry;
pub use crate::framework::settings::FrameworkSettings;

// Services and events
pub use crate::framework::filter::Filter;
pub use crate::framework::service::{
    ServiceEvent, ServiceEventKind, ServiceListener, ServiceObject, ServiceProperties,
    ServiceReference, ServiceRegistration,
};

// Error handling
pub use crate::framework::error::{ActivatorError, FrameworkError, FrameworkResult};

// Header and attribute names
pub use crate::framework::constants::{
    BUNDLE_NAME, BUNDLE_VENDOR, BUNDLE_VERSION, DEFAULT_VENDOR, OBJECT_CLASS, UNVERSIONED,
};
