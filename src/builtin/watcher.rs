//! Watcher bundle
//!
//! Tracks every [`Greeter`] in the registry and records what it sees.

use crate::builtin::greeter::{Greeter, GREETER_INTERFACE};
use crate::core::sync::recover_lock;
use crate::framework::api::{
    ActivatorError, BundleActivator, BundleContext, FrameworkResult, ServiceObject,
    ServiceReference,
};
use crate::tracker::api::{ServiceTracker, ServiceTrackerCustomizer};
use std::sync::{Arc, Mutex};

/// Shared view of what the watcher bundle is tracking
///
/// Cloned into the activator; the embedding application keeps its own clone.
#[derive(Clone, Default)]
pub struct WatcherView {
    tracker: Arc<Mutex<Option<ServiceTracker>>>,
    journal: Arc<Mutex<Vec<String>>>,
}

impl WatcherView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker of the running watcher bundle
    pub fn tracker(&self) -> Option<ServiceTracker> {
        recover_lock(&self.tracker).clone()
    }

    /// Entries like `added Hello`, in the order the tracker reported them
    pub fn journal(&self) -> Vec<String> {
        recover_lock(&self.journal).clone()
    }

    /// Greet `name` with every tracked greeter
    pub fn greetings(&self, name: &str) -> FrameworkResult<Vec<String>> {
        let Some(tracker) = self.tracker() else {
            return Ok(Vec::new());
        };
        let mut greetings: Vec<String> = tracker
            .get_services()?
            .unwrap_or_default()
            .into_iter()
            .filter_map(|service| service.downcast::<Greeter>().ok())
            .map(|greeter| greeter.greet(name))
            .collect();
        greetings.sort();
        Ok(greetings)
    }

    fn record(&self, entry: String) {
        log::info!("Watcher: {}", entry);
        recover_lock(&self.journal).push(entry);
    }
}

/// Only greeters are tracked; anything else published under the greeter
/// interface is declined
struct GreeterCustomizer {
    view: WatcherView,
}

fn salutation(reference: &ServiceReference) -> String {
    reference
        .property("salutation")
        .unwrap_or_else(|| "?".to_string())
}

impl ServiceTrackerCustomizer for GreeterCustomizer {
    fn adding_service(&self, reference: &ServiceReference) -> Option<ServiceObject> {
        let service = reference.service();
        if !service.is::<Greeter>() {
            log::warn!(
                "Watcher: ignoring non-greeter service under '{}'",
                reference.interface_name()
            );
            return None;
        }
        self.view.record(format!("added {}", salutation(reference)));
        Some(service)
    }

    fn modified_service(&self, reference: &ServiceReference, _service: &ServiceObject) {
        self.view.record(format!("modified {}", salutation(reference)));
    }

    fn removed_service(&self, reference: &ServiceReference, _service: &ServiceObject) {
        self.view.record(format!("removed {}", salutation(reference)));
    }
}

/// Opens a greeter tracker on start and closes it on stop
pub struct WatcherActivator {
    view: WatcherView,
}

impl WatcherActivator {
    pub fn new(view: WatcherView) -> Self {
        Self { view }
    }
}

impl BundleActivator for WatcherActivator {
    fn start(&mut self, context: &BundleContext) -> Result<(), ActivatorError> {
        let customizer: Arc<dyn ServiceTrackerCustomizer> = Arc::new(GreeterCustomizer {
            view: self.view.clone(),
        });
        let tracker = ServiceTracker::new(context, GREETER_INTERFACE, Some(customizer));
        tracker.open()?;
        *recover_lock(&self.view.tracker) = Some(tracker);
        Ok(())
    }

    fn stop(&mut self, _context: &BundleContext) -> Result<(), ActivatorError> {
        let tracker = recover_lock(&self.view.tracker).take();
        if let Some(tracker) = tracker {
            tracker.close()?;
        }
        Ok(())
    }
}
