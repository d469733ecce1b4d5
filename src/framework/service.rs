//! Service References, Registrations and Events
//!
//! A [`ServiceReference`] is a shared handle: every holder sees the same
//! allocation, and equality/hashing follow that identity. Unregistering a
//! service clears the reference's link to its bundle; holders detect staleness
//! through [`ServiceReference::is_registered`].

use crate::core::sync::{recover_read, recover_write};
use crate::framework::bundle::{Bundle, BundleInner};
use crate::framework::error::{FrameworkError, FrameworkResult};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, Weak};
use strum_macros::{Display, EnumIter};

/// Type-erased service object as published by a bundle
pub type ServiceObject = Arc<dyn Any + Send + Sync>;

/// Properties supplied at registration time
pub type ServiceProperties = HashMap<String, String>;

/// Handle describing one published service
#[derive(Clone)]
pub struct ServiceReference {
    inner: Arc<ReferenceInner>,
}

struct ReferenceInner {
    interface_name: String,
    service: ServiceObject,
    properties: RwLock<ServiceProperties>,
    /// Cleared when the service is unregistered
    bundle: RwLock<Option<Weak<BundleInner>>>,
    unregistering: AtomicBool,
}

impl ServiceReference {
    pub(crate) fn new(
        bundle: Weak<BundleInner>,
        interface_name: &str,
        service: ServiceObject,
        properties: ServiceProperties,
    ) -> Self {
        Self {
            inner: Arc::new(ReferenceInner {
                interface_name: interface_name.to_string(),
                service,
                properties: RwLock::new(properties),
                bundle: RwLock::new(Some(bundle)),
                unregistering: AtomicBool::new(false),
            }),
        }
    }

    /// Reference that was never published by a bundle
    #[cfg(test)]
    pub(crate) fn detached(interface_name: &str, service: ServiceObject) -> Self {
        let reference = Self::new(Weak::new(), interface_name, service, ServiceProperties::new());
        *recover_write(&reference.inner.bundle) = None;
        reference
    }

    /// Interface name the service was registered under
    pub fn interface_name(&self) -> &str {
        &self.inner.interface_name
    }

    /// The service object, whether or not the service is still registered
    pub fn service(&self) -> ServiceObject {
        Arc::clone(&self.inner.service)
    }

    /// The service object downcast to its concrete type
    pub fn service_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.service().downcast::<T>().ok()
    }

    /// Snapshot of the service properties
    pub fn properties(&self) -> ServiceProperties {
        recover_read(&self.inner.properties).clone()
    }

    pub fn property(&self, key: &str) -> Option<String> {
        recover_read(&self.inner.properties).get(key).cloned()
    }

    /// Owning bundle, or `None` once the service has been unregistered
    pub fn bundle(&self) -> Option<Bundle> {
        recover_read(&self.inner.bundle)
            .as_ref()
            .and_then(Weak::upgrade)
            .map(Bundle::from_inner)
    }

    pub fn is_registered(&self) -> bool {
        self.bundle().is_some()
    }

    /// Marks the reference as being unregistered; true only for the first caller
    pub(crate) fn begin_unregister(&self) -> bool {
        !self.inner.unregistering.swap(true, Ordering::SeqCst)
    }

    pub(crate) fn clear_bundle(&self) {
        *recover_write(&self.inner.bundle) = None;
    }

    pub(crate) fn replace_properties(&self, properties: ServiceProperties) {
        *recover_write(&self.inner.properties) = properties;
    }
}

impl PartialEq for ServiceReference {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ServiceReference {}

impl Hash for ServiceReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.inner), state);
    }
}

impl fmt::Debug for ServiceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceReference")
            .field("interface_name", &self.inner.interface_name)
            .field(
                "bundle",
                &self.bundle().map(|b| b.symbolic_name().to_string()),
            )
            .finish()
    }
}

/// Capability returned by `register_service`, used to update or withdraw the service
#[derive(Debug, Clone)]
pub struct ServiceRegistration {
    reference: ServiceReference,
}

impl ServiceRegistration {
    pub(crate) fn new(reference: ServiceReference) -> Self {
        Self { reference }
    }

    pub fn reference(&self) -> &ServiceReference {
        &self.reference
    }

    /// Withdraw the service
    ///
    /// Fires UNREGISTERING to every matching listener while the service is
    /// still visible, then removes it from its bundle and clears the
    /// reference's bundle link. Calling it again, or after the owning bundle
    /// has stopped, does nothing.
    pub fn unregister(&self) {
        match self.reference.bundle() {
            Some(bundle) => bundle.unregister_service(&self.reference),
            None => log::debug!(
                "Service '{}' already unregistered",
                self.reference.interface_name()
            ),
        }
    }

    /// Replace the service properties and fire MODIFIED
    pub fn set_properties(&self, properties: ServiceProperties) -> FrameworkResult<()> {
        let bundle = self
            .reference
            .bundle()
            .ok_or_else(|| FrameworkError::ServiceUnregistered {
                interface_name: self.reference.interface_name().to_string(),
            })?;

        self.reference.replace_properties(properties);
        bundle.fire_service_event(&ServiceEvent::new(
            ServiceEventKind::Modified,
            self.reference.clone(),
        ));
        Ok(())
    }
}

#[derive(Display, EnumIter, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceEventKind {
    Registered,
    Modified,
    /// Fired before the service disappears
    Unregistering,
}

/// Notification delivered to service listeners
#[derive(Debug, Clone)]
pub struct ServiceEvent {
    kind: ServiceEventKind,
    reference: ServiceReference,
}

impl ServiceEvent {
    pub fn new(kind: ServiceEventKind, reference: ServiceReference) -> Self {
        Self { kind, reference }
    }

    pub fn kind(&self) -> ServiceEventKind {
        self.kind
    }

    pub fn reference(&self) -> &ServiceReference {
        &self.reference
    }
}

/// Receives service events whose interface name matches the listener's filter
///
/// Delivery is synchronous on the thread that caused the change. Closures of
/// type `Fn(&ServiceEvent)` are listeners too.
pub trait ServiceListener: Send + Sync {
    fn service_changed(&self, event: &ServiceEvent);
}

impl<F> ServiceListener for F
where
    F: Fn(&ServiceEvent) + Send + Sync,
{
    fn service_changed(&self, event: &ServiceEvent) {
        self(event)
    }
}
