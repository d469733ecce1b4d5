//! Shared helpers for framework tests

use crate::framework::bundle::BundleActivator;
use crate::framework::context::BundleContext;
use crate::framework::error::ActivatorError;
use crate::framework::service::{
    ServiceEvent, ServiceEventKind, ServiceListener, ServiceProperties, ServiceRegistration,
};
use std::sync::{Arc, Mutex};

type Hook = Box<dyn FnMut(&BundleContext) -> Result<(), ActivatorError> + Send>;

/// Activator driven by closures
pub(super) struct TestActivator {
    on_start: Hook,
    on_stop: Hook,
}

impl TestActivator {
    pub(super) fn new() -> Self {
        Self {
            on_start: Box::new(|_| Ok(())),
            on_stop: Box::new(|_| Ok(())),
        }
    }

    pub(super) fn on_start(
        mut self,
        hook: impl FnMut(&BundleContext) -> Result<(), ActivatorError> + Send + 'static,
    ) -> Self {
        self.on_start = Box::new(hook);
        self
    }

    pub(super) fn on_stop(
        mut self,
        hook: impl FnMut(&BundleContext) -> Result<(), ActivatorError> + Send + 'static,
    ) -> Self {
        self.on_stop = Box::new(hook);
        self
    }

    /// Activator that publishes `interface` with a string service object
    pub(super) fn publishing(interface: &'static str, service: &'static str) -> Self {
        Self::new().on_start(move |context| {
            context.register_service(interface, Arc::new(service), ServiceProperties::new())?;
            Ok(())
        })
    }

    pub(super) fn boxed(self) -> Box<dyn BundleActivator> {
        Box::new(self)
    }
}

impl BundleActivator for TestActivator {
    fn start(&mut self, context: &BundleContext) -> Result<(), ActivatorError> {
        (self.on_start)(context)
    }

    fn stop(&mut self, context: &BundleContext) -> Result<(), ActivatorError> {
        (self.on_stop)(context)
    }
}

/// Listener recording (kind, interface, still registered) for every event
#[derive(Default)]
pub(super) struct EventLog {
    events: Mutex<Vec<(ServiceEventKind, String, bool)>>,
}

impl EventLog {
    pub(super) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(super) fn events(&self) -> Vec<(ServiceEventKind, String, bool)> {
        self.events.lock().unwrap().clone()
    }

    pub(super) fn kinds(&self) -> Vec<ServiceEventKind> {
        self.events().into_iter().map(|(kind, _, _)| kind).collect()
    }
}

impl ServiceListener for EventLog {
    fn service_changed(&self, event: &ServiceEvent) {
        self.events.lock().unwrap().push((
            event.kind(),
            event.reference().interface_name().to_string(),
            event.reference().is_registered(),
        ));
    }
}

/// Shared slot an activator can stash its registration in
pub(super) type RegistrationSlot = Arc<Mutex<Option<ServiceRegistration>>>;

pub(super) fn failure(message: &str) -> ActivatorError {
    message.to_string().into()
}
