//! Service Tracker Customizer
//!
//! Hooks a [`ServiceTracker`](crate::tracker::api::ServiceTracker) calls as
//! matching services come and go.

use crate::framework::api::{BundleContext, ServiceObject, ServiceReference};

/// Callbacks invoked by a service tracker
///
/// All three run while the tracker's lock is held. A customizer must not call
/// back into the tracker that invokes it.
pub trait ServiceTrackerCustomizer: Send + Sync {
    /// Called before a matching service becomes visible through the tracker
    ///
    /// Returns the object to track for `reference`, or `None` to leave the
    /// service untracked.
    fn adding_service(&self, reference: &ServiceReference) -> Option<ServiceObject>;

    /// Called after the tracked service's properties changed
    fn modified_service(&self, reference: &ServiceReference, service: &ServiceObject);

    /// Called once the service is no longer visible through the tracker;
    /// `service` is the object `adding_service` returned
    fn removed_service(&self, reference: &ServiceReference, service: &ServiceObject);
}

/// Behaviour used when a tracker is created without a customizer
pub(crate) struct DefaultCustomizer {
    context: BundleContext,
}

impl DefaultCustomizer {
    pub(crate) fn new(context: BundleContext) -> Self {
        Self { context }
    }
}

impl ServiceTrackerCustomizer for DefaultCustomizer {
    fn adding_service(&self, reference: &ServiceReference) -> Option<ServiceObject> {
        Some(self.context.get_service(reference))
    }

    fn modified_service(&self, _reference: &ServiceReference, _service: &ServiceObject) {}

    fn removed_service(&self, reference: &ServiceReference, _service: &ServiceObject) {
        self.context.unget_service(reference);
    }
}
