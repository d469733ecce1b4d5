
use crate::framework::api::{
    ActivatorError, BundleActivator, BundleContext, Registry, ServiceObject, ServiceProperties,
    ServiceReference, ServiceRegistration,
};
use crate::tracker::api::ServiceTrackerCustomizer;
use std::sync::{Arc, Mutex};

/// Activator that registers `interface` with a string service and keeps the registration
pub(super) struct Provider {
    interface: &'static str,
    service: &'static str,
    pub(super) registration: Arc<Mutex<Option<ServiceRegistration>>>,
}

impl Provider {
    pub(super) fn new(interface: &'static str, service: &'static str) -> Self {
        Self {
            interface,
            service,
            registration: Arc::new(Mutex::new(None)),
        }
    }
}

impl BundleActivator for Provider {
    fn start(&mut self, context: &BundleContext) -> Result<(), ActivatorError> {
        let registration = context.register_service(
            self.interface,
            Arc::new(self.service),
            ServiceProperties::new(),
        )?;
        *self.registration.lock().unwrap() = Some(registration);
        Ok(())
    }

    fn stop(&mut self, _context: &BundleContext) -> Result<(), ActivatorError> {
        Ok(())
    }
}

/// Activator that does nothing; used for bundles that only need a context
pub(super) struct Idle;

impl BundleActivator for Idle {
    fn start(&mut self, _context: &BundleContext) -> Result<(), ActivatorError> {
        Ok(())
    }

    fn stop(&mut self, _context: &BundleContext) -> Result<(), ActivatorError> {
        Ok(())
    }
}

/// Context of a freshly started idle bundle named `name`
pub(super) fn idle_context(registry: &Registry, name: &str) -> BundleContext {
    registry.start(name, Box::new(Idle));
    registry
        .get_bundle(name)
        .and_then(|bundle| bundle.bundle_context())
        .unwrap()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Call {
    Adding(String),
    Modified(String),
    /// Service name and whether the reference was still registered
    Removed(String, bool),
}

fn service_text(service: &ServiceObject) -> String {
    service
        .clone()
        .downcast::<&str>()
        .map(|s| s.to_string())
        .unwrap_or_else(|_| "<other>".to_string())
}

/// Customizer recording every call; wraps the service in a `String` so tests
/// can tell the customized object from the published one
#[derive(Default)]
pub(super) struct Recorder {
    calls: Mutex<Vec<Call>>,
    reject: bool,
}

impl Recorder {
    pub(super) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(super) fn rejecting() -> Arc<Self> {
        Arc::new(Self {
            reject: true,
            ..Self::default()
        })
    }

    pub(super) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl ServiceTrackerCustomizer for Recorder {
    fn adding_service(&self, reference: &ServiceReference) -> Option<ServiceObject> {
        let name = service_text(&reference.service());
        self.calls.lock().unwrap().push(Call::Adding(name.clone()));
        if self.reject {
            return None;
        }
        Some(Arc::new(format!("customized:{}", name)))
    }

    fn modified_service(&self, reference: &ServiceReference, _service: &ServiceObject) {
        let name = service_text(&reference.service());
        self.calls.lock().unwrap().push(Call::Modified(name));
    }

    fn removed_service(&self, reference: &ServiceReference, service: &ServiceObject) {
        let tracked = service
            .clone()
            .downcast::<String>()
            .map(|s| s.to_string())
            .unwrap_or_default();
        self.calls
            .lock()
            .unwrap()
            .push(Call::Removed(tracked, reference.is_registered()));
    }
}
