//! Service Tracker
//!
//! Keeps a live map of every service registered under one interface name.
//! The tracker subscribes itself as a service listener on `open` and keeps
//! the map current from service events until `close`.
//!
//! Ordering contract:
//! - REGISTERED: `adding_service` runs before the service is visible here.
//! - UNREGISTERING: the service disappears from the map before
//!   `removed_service` runs.
//! - `close`: each entry is taken out of the map before its `removed_service`.

use crate::core::sync::{handle_mutex_poison, recover_lock};
use crate::framework::api::{
    BundleContext, Filter, FrameworkError, FrameworkResult, ServiceEvent, ServiceEventKind,
    ServiceListener, ServiceObject, ServiceReference,
};
use crate::tracker::customizer::{DefaultCustomizer, ServiceTrackerCustomizer};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Tracking count of a tracker that is not open
const CLOSED: i64 = -1;

/// Tracks the services registered under one interface name
///
/// Clones share the same tracked state.
#[derive(Clone)]
pub struct ServiceTracker {
    inner: Arc<TrackerInner>,
}

struct TrackerInner {
    context: BundleContext,
    service_name: String,
    filter: String,
    customizer: Arc<dyn ServiceTrackerCustomizer>,
    state: Mutex<TrackedState>,
    /// Held across `open` and `close`; set exactly while the tracker is open
    listener: Mutex<Option<Arc<dyn ServiceListener>>>,
}

struct TrackedState {
    services: HashMap<ServiceReference, ServiceObject>,
    /// Representative service returned by `get_service`
    cached: Option<ServiceObject>,
    /// Bumped on every change to the tracked set; `CLOSED` when not open
    tracking_count: i64,
}

/// Listener the tracker registers with its context
///
/// Holds the tracker weakly so a dropped tracker does not linger through the
/// bundle's listener table.
struct TrackerListener {
    tracker: Weak<TrackerInner>,
}

impl ServiceListener for TrackerListener {
    fn service_changed(&self, event: &ServiceEvent) {
        match self.tracker.upgrade() {
            Some(tracker) => tracker.service_changed(event),
            None => log::trace!(
                "Tracker dropped, ignoring {} for '{}'",
                event.kind(),
                event.reference().interface_name()
            ),
        }
    }
}

impl ServiceTracker {
    /// Create a closed tracker for services registered under `service_name`
    ///
    /// Without a customizer the tracker stores the service object obtained
    /// from `context` and releases it on removal.
    pub fn new(
        context: &BundleContext,
        service_name: &str,
        customizer: Option<Arc<dyn ServiceTrackerCustomizer>>,
    ) -> Self {
        let customizer: Arc<dyn ServiceTrackerCustomizer> = match customizer {
            Some(customizer) => customizer,
            None => Arc::new(DefaultCustomizer::new(context.clone())),
        };

        Self {
            inner: Arc::new(TrackerInner {
                context: context.clone(),
                service_name: service_name.to_string(),
                filter: Filter::for_interface(service_name).to_string(),
                customizer,
                state: Mutex::new(TrackedState {
                    services: HashMap::new(),
                    cached: None,
                    tracking_count: CLOSED,
                }),
                listener: Mutex::new(None),
            }),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.inner.service_name
    }

    /// Start tracking
    ///
    /// Subscribes to service events, then adds every service already
    /// registered under the tracked name. Does nothing if already open.
    /// Concurrent calls to `open` and `close` are serialised.
    pub fn open(&self) -> FrameworkResult<()> {
        let mut subscription = recover_lock(&self.inner.listener);
        if subscription.is_some() {
            log::debug!("Tracker for '{}' already open", self.inner.service_name);
            return Ok(());
        }

        let listener: Arc<dyn ServiceListener> = Arc::new(TrackerListener {
            tracker: Arc::downgrade(&self.inner),
        });
        self.inner
            .context
            .add_service_listener(Arc::clone(&listener), &self.inner.filter)?;

        if let Err(e) = self.inner.track_existing() {
            self.inner.unsubscribe(&listener);
            return Err(e);
        }
        *subscription = Some(listener);

        log::debug!(
            "Tracker for '{}' opened with {} service(s)",
            self.inner.service_name,
            self.size()?
        );
        Ok(())
    }

    /// Stop tracking
    ///
    /// Unsubscribes, then hands every tracked service to `removed_service`
    /// and resets the tracking count to -1.
    pub fn close(&self) -> FrameworkResult<()> {
        let mut subscription = recover_lock(&self.inner.listener);
        if let Some(listener) = subscription.take() {
            self.inner.unsubscribe(&listener);
        }

        let mut state = self.inner.lock_state()?;
        let references: Vec<ServiceReference> = state.services.keys().cloned().collect();
        for reference in references {
            if let Some(service) = state.services.remove(&reference) {
                self.inner.customizer.removed_service(&reference, &service);
            }
        }
        state.services.clear();
        state.cached = None;
        state.tracking_count = CLOSED;

        log::debug!("Tracker for '{}' closed", self.inner.service_name);
        Ok(())
    }

    /// One of the tracked services, cached until the tracked set changes
    pub fn get_service(&self) -> FrameworkResult<Option<ServiceObject>> {
        let mut state = self.inner.lock_state()?;
        if state.cached.is_none() {
            state.cached = state.services.values().next().cloned();
        }
        Ok(state.cached.clone())
    }

    /// The tracked object for `reference`, if that service is tracked
    pub fn get_service_for(
        &self,
        reference: &ServiceReference,
    ) -> FrameworkResult<Option<ServiceObject>> {
        Ok(self.inner.lock_state()?.services.get(reference).cloned())
    }

    /// One of the tracked references
    pub fn get_service_reference(&self) -> FrameworkResult<Option<ServiceReference>> {
        Ok(self.inner.lock_state()?.services.keys().next().cloned())
    }

    /// All tracked references, `None` when nothing is tracked
    pub fn get_service_references(&self) -> FrameworkResult<Option<Vec<ServiceReference>>> {
        let state = self.inner.lock_state()?;
        if state.services.is_empty() {
            return Ok(None);
        }
        Ok(Some(state.services.keys().cloned().collect()))
    }

    /// All tracked service objects, `None` when nothing is tracked
    pub fn get_services(&self) -> FrameworkResult<Option<Vec<ServiceObject>>> {
        let state = self.inner.lock_state()?;
        if state.services.is_empty() {
            return Ok(None);
        }
        Ok(Some(state.services.values().cloned().collect()))
    }

    pub fn size(&self) -> FrameworkResult<usize> {
        Ok(self.inner.lock_state()?.services.len())
    }

    /// Number of changes to the tracked set since `open`, -1 when closed
    pub fn get_tracking_count(&self) -> FrameworkResult<i64> {
        Ok(self.inner.lock_state()?.tracking_count)
    }

    pub fn is_open(&self) -> FrameworkResult<bool> {
        Ok(self.inner.lock_state()?.tracking_count != CLOSED)
    }
}

impl TrackerInner {
    fn lock_state(&self) -> FrameworkResult<MutexGuard<'_, TrackedState>> {
        handle_mutex_poison(self.state.lock(), |message| {
            FrameworkError::Synchronisation { message }
        })
    }

    fn track_existing(&self) -> FrameworkResult<()> {
        let references = self
            .context
            .get_service_references(&self.service_name, None)?
            .unwrap_or_default();

        let mut state = self.lock_state()?;
        for reference in references {
            if state.services.contains_key(&reference) {
                continue;
            }
            if let Some(service) = self.customizer.adding_service(&reference) {
                state.services.insert(reference, service);
            }
        }
        state.cached = None;
        state.tracking_count = 0;
        Ok(())
    }

    fn unsubscribe(&self, listener: &Arc<dyn ServiceListener>) {
        if let Err(e) = self.context.remove_service_listener(listener) {
            log::warn!(
                "Tracker for '{}' could not remove its listener: {}",
                self.service_name,
                e
            );
        }
    }

    fn service_changed(&self, event: &ServiceEvent) {
        let mut state = match self.lock_state() {
            Ok(state) => state,
            Err(e) => {
                log::error!(
                    "Tracker for '{}' dropped {} event: {}",
                    self.service_name,
                    event.kind(),
                    e
                );
                return;
            }
        };
        if state.tracking_count == CLOSED {
            log::trace!(
                "Tracker for '{}' closed, ignoring {}",
                self.service_name,
                event.kind()
            );
            return;
        }

        let reference = event.reference();
        match event.kind() {
            ServiceEventKind::Registered => {
                if state.services.contains_key(reference) {
                    return;
                }
                match self.customizer.adding_service(reference) {
                    Some(service) => {
                        state.services.insert(reference.clone(), service);
                        state.cached = None;
                        state.tracking_count += 1;
                    }
                    None => log::debug!(
                        "Customizer declined service '{}'",
                        reference.interface_name()
                    ),
                }
            }
            ServiceEventKind::Modified => {
                if let Some(service) = state.services.get(reference).cloned() {
                    state.cached = None;
                    state.tracking_count += 1;
                    self.customizer.modified_service(reference, &service);
                }
            }
            ServiceEventKind::Unregistering => {
                if let Some(previous) = state.services.remove(reference) {
                    state.cached = None;
                    state.tracking_count += 1;
                    self.customizer.removed_service(reference, &previous);
                }
            }
        }
    }
}

impl fmt::Debug for ServiceTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceTracker")
            .field("service_name", &self.inner.service_name)
            .field("filter", &self.inner.filter)
            .finish()
    }
}
