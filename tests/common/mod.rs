//! Shared activators and listeners for integration tests

#![allow(dead_code)]

use bundlekit::framework::api::{
    ActivatorError, BundleActivator, BundleContext, ServiceEvent, ServiceEventKind,
    ServiceListener, ServiceProperties, ServiceRegistration,
};
use std::sync::{Arc, Mutex};

/// Publishes one string service and keeps its registration
pub struct Publisher {
    pub interface: &'static str,
    pub service: &'static str,
    pub registration: Arc<Mutex<Option<ServiceRegistration>>>,
    pub fail_after_register: bool,
}

impl Publisher {
    pub fn new(interface: &'static str, service: &'static str) -> Self {
        Self {
            interface,
            service,
            registration: Arc::new(Mutex::new(None)),
            fail_after_register: false,
        }
    }

    pub fn failing(interface: &'static str, service: &'static str) -> Self {
        Self {
            fail_after_register: true,
            ..Self::new(interface, service)
        }
    }
}

impl BundleActivator for Publisher {
    fn start(&mut self, context: &BundleContext) -> Result<(), ActivatorError> {
        let registration = context.register_service(
            self.interface,
            Arc::new(self.service),
            ServiceProperties::new(),
        )?;
        *self.registration.lock().unwrap() = Some(registration);
        if self.fail_after_register {
            return Err(format!("{} refused to start", self.service).into());
        }
        Ok(())
    }

    fn stop(&mut self, _context: &BundleContext) -> Result<(), ActivatorError> {
        Ok(())
    }
}

/// Activator that only runs the supplied start hook
pub struct OnStart<F>(pub F);

impl<F> BundleActivator for OnStart<F>
where
    F: FnMut(&BundleContext) -> Result<(), ActivatorError> + Send,
{
    fn start(&mut self, context: &BundleContext) -> Result<(), ActivatorError> {
        (self.0)(context)
    }

    fn stop(&mut self, _context: &BundleContext) -> Result<(), ActivatorError> {
        Ok(())
    }
}

/// Box an activator whose start hook is `hook`
pub fn on_start<F>(hook: F) -> Box<dyn BundleActivator>
where
    F: FnMut(&BundleContext) -> Result<(), ActivatorError> + Send + 'static,
{
    Box::new(OnStart(hook))
}

/// Listener recording event kinds
#[derive(Default)]
pub struct Recorder {
    pub kinds: Mutex<Vec<ServiceEventKind>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn kinds(&self) -> Vec<ServiceEventKind> {
        self.kinds.lock().unwrap().clone()
    }
}

impl ServiceListener for Recorder {
    fn service_changed(&self, event: &ServiceEvent) {
        self.kinds.lock().unwrap().push(event.kind());
    }
}
