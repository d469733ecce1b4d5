//! Greeter bundle

use crate::framework::api::{
    ActivatorError, BundleActivator, BundleContext, ServiceProperties, ServiceRegistration,
};
use std::sync::Arc;

/// Interface name the greeter service is published under
pub const GREETER_INTERFACE: &str = "bundlekit.Greeter";

/// Service published by the greeter bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeter {
    salutation: String,
}

impl Greeter {
    pub fn new(salutation: &str) -> Self {
        Self {
            salutation: salutation.to_string(),
        }
    }

    pub fn greet(&self, name: &str) -> String {
        format!("{}, {}!", self.salutation, name)
    }
}

/// Publishes a [`Greeter`] on start and withdraws it on stop
pub struct GreeterActivator {
    salutation: String,
    registration: Option<ServiceRegistration>,
}

impl GreeterActivator {
    pub fn new(salutation: &str) -> Self {
        Self {
            salutation: salutation.to_string(),
            registration: None,
        }
    }
}

impl Default for GreeterActivator {
    fn default() -> Self {
        Self::new("Hello")
    }
}

impl BundleActivator for GreeterActivator {
    fn start(&mut self, context: &BundleContext) -> Result<(), ActivatorError> {
        let properties =
            ServiceProperties::from([("salutation".to_string(), self.salutation.clone())]);
        let registration = context.register_service(
            GREETER_INTERFACE,
            Arc::new(Greeter::new(&self.salutation)),
            properties,
        )?;
        self.registration = Some(registration);
        Ok(())
    }

    fn stop(&mut self, _context: &BundleContext) -> Result<(), ActivatorError> {
        if let Some(registration) = self.registration.take() {
            registration.unregister();
        }
        Ok(())
    }
}
