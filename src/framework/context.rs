//! Bundle Context
//!
//! The capability object an activator receives. Every operation forwards to
//! the owning bundle or the registry. The context holds only weak references,
//! so a context kept past its registry's lifetime fails with
//! [`FrameworkError::ContextInvalid`] instead of keeping the registry alive.
//! The same error is returned when a kept context tries to publish services or
//! add listeners after its bundle went back to RESOLVED.

use crate::core::error_handling::log_error_with_context;
use crate::core::sync::recover_write;
use crate::framework::bundle::{Bundle, BundleInner};
use crate::framework::error::{FrameworkError, FrameworkResult};
use crate::framework::filter::Filter;
use crate::framework::registry::{Registry, RegistryInner};
use crate::framework::service::{
    ServiceEvent, ServiceEventKind, ServiceListener, ServiceObject, ServiceProperties,
    ServiceReference, ServiceRegistration,
};
use std::fmt;
use std::sync::{Arc, Weak};

#[derive(Clone)]
pub struct BundleContext {
    registry: Weak<RegistryInner>,
    bundle: Weak<BundleInner>,
    bundle_name: String,
}

impl BundleContext {
    pub(crate) fn new(
        registry: Weak<RegistryInner>,
        bundle: Weak<BundleInner>,
        bundle_name: &str,
    ) -> Self {
        Self {
            registry,
            bundle,
            bundle_name: bundle_name.to_string(),
        }
    }

    fn invalid(&self) -> FrameworkError {
        FrameworkError::ContextInvalid {
            bundle: self.bundle_name.clone(),
        }
    }

    fn registry(&self) -> FrameworkResult<Registry> {
        self.registry
            .upgrade()
            .map(Registry::from_inner)
            .ok_or_else(|| self.invalid())
    }

    fn bundle(&self) -> FrameworkResult<Bundle> {
        self.bundle
            .upgrade()
            .map(Bundle::from_inner)
            .ok_or_else(|| self.invalid())
    }

    /// The bundle this context belongs to
    pub fn get_bundle(&self) -> Option<Bundle> {
        self.bundle().ok()
    }

    /// Publish `service` under `interface_name` and fire REGISTERED
    pub fn register_service(
        &self,
        interface_name: &str,
        service: ServiceObject,
        properties: ServiceProperties,
    ) -> FrameworkResult<ServiceRegistration> {
        let bundle = self.bundle()?;
        let reference =
            ServiceReference::new(bundle.downgrade(), interface_name, service, properties);
        if !bundle.add_service_reference(reference.clone()) {
            return Err(self.invalid());
        }
        log::debug!(
            "Bundle '{}' registered service '{}'",
            self.bundle_name,
            interface_name
        );

        bundle.fire_service_event(&ServiceEvent::new(
            ServiceEventKind::Registered,
            reference.clone(),
        ));
        Ok(ServiceRegistration::new(reference))
    }

    /// All services registered under `interface_name` that also match `filter`
    ///
    /// Returns `Ok(None)` rather than an empty vector when nothing matches.
    /// A malformed filter is an error.
    pub fn get_service_references(
        &self,
        interface_name: &str,
        filter: Option<&str>,
    ) -> FrameworkResult<Option<Vec<ServiceReference>>> {
        let filter = filter.map(Filter::compile).transpose()?;
        let registry = self.registry()?;

        let references: Vec<ServiceReference> = registry
            .bundles()
            .iter()
            .flat_map(Bundle::registered_services)
            .filter(|reference| reference.interface_name() == interface_name)
            .filter(|reference| filter.as_ref().map_or(true, |f| f.matches(reference)))
            .collect();

        if references.is_empty() {
            Ok(None)
        } else {
            Ok(Some(references))
        }
    }

    /// First service registered under `interface_name`
    ///
    /// Lookup errors are logged and reported as no match.
    pub fn get_service_reference(&self, interface_name: &str) -> Option<ServiceReference> {
        match self.get_service_references(interface_name, None) {
            Ok(references) => references.and_then(|refs| refs.into_iter().next()),
            Err(e) => {
                log_error_with_context(
                    &e,
                    &format!("Looking up service '{}'", interface_name),
                );
                None
            }
        }
    }

    pub fn get_service(&self, reference: &ServiceReference) -> ServiceObject {
        reference.service()
    }

    /// Release a service obtained with `get_service`; usage is not counted
    pub fn unget_service(&self, _reference: &ServiceReference) -> bool {
        false
    }

    /// Subscribe `listener` to events whose canonical filter equals `filter`
    ///
    /// Adding the same listener twice creates two subscriptions.
    pub fn add_service_listener(
        &self,
        listener: Arc<dyn ServiceListener>,
        filter: &str,
    ) -> FrameworkResult<()> {
        let bundle = self.bundle()?;
        if !bundle.add_listener(listener, filter) {
            return Err(self.invalid());
        }
        log::trace!("Bundle '{}' listening on {}", self.bundle_name, filter);
        Ok(())
    }

    /// Remove the first subscription of `listener`
    pub fn remove_service_listener(
        &self,
        listener: &Arc<dyn ServiceListener>,
    ) -> FrameworkResult<()> {
        let bundle = self.bundle()?;
        if !recover_write(bundle.listener_table()).remove(listener) {
            log::debug!(
                "Bundle '{}': listener to remove was not subscribed",
                self.bundle_name
            );
        }
        Ok(())
    }

    pub fn create_filter(&self, filter: &str) -> FrameworkResult<Filter> {
        Filter::compile(filter)
    }

    /// Snapshot of every bundle in the registry
    pub fn get_bundles(&self) -> FrameworkResult<Vec<Bundle>> {
        Ok(self.registry()?.bundles())
    }
}

impl fmt::Debug for BundleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleContext")
            .field("bundle", &self.bundle_name)
            .field("valid", &(self.registry.strong_count() > 0))
            .finish()
    }
}
