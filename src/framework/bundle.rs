//! Bundle Lifecycle
//!
//! A bundle owns the services it registered and the listeners it added, and
//! drives its activator through the RESOLVED → STARTING → ACTIVE → STOPPING →
//! RESOLVED cycle. Whatever the activator does, a bundle that leaves `start`
//! or `stop` is either ACTIVE or RESOLVED with no services and no listeners.

use crate::core::sync::{recover_lock, recover_read, recover_write};
use crate::framework::constants::{
    BUNDLE_NAME, BUNDLE_VENDOR, BUNDLE_VERSION, DEFAULT_VENDOR, UNVERSIONED,
};
use crate::framework::context::BundleContext;
use crate::framework::error::{ActivatorError, FrameworkError, FrameworkResult};
use crate::framework::registry::{Registry, RegistryInner};
use crate::framework::service::{
    ServiceEvent, ServiceEventKind, ServiceListener, ServiceReference,
};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock, Weak};
use strum_macros::{Display, EnumIter};

#[derive(Display, EnumIter, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BundleState {
    /// Defined for completeness; no transition reaches it
    Uninstalled,
    /// Defined for completeness; no transition reaches it
    Installed,
    Resolved,
    Starting,
    Stopping,
    Active,
}

impl BundleState {
    /// States in which the bundle has a context and may publish services
    pub fn has_context(self) -> bool {
        matches!(self, Self::Starting | Self::Active | Self::Stopping)
    }
}

/// Entry point of a bundle
///
/// `start` may register services and listeners through the context. If it
/// fails, everything it registered is withdrawn again before the error
/// reaches the caller.
pub trait BundleActivator: Send {
    fn start(&mut self, context: &BundleContext) -> Result<(), ActivatorError>;

    fn stop(&mut self, context: &BundleContext) -> Result<(), ActivatorError>;
}

/// Listener subscriptions of one bundle
///
/// `listeners[i]` is subscribed with `filters[i]`; both vectors always have
/// the same length.
#[derive(Default)]
pub(crate) struct ListenerTable {
    listeners: Vec<Arc<dyn ServiceListener>>,
    filters: Vec<String>,
}

impl ListenerTable {
    pub(crate) fn push(&mut self, listener: Arc<dyn ServiceListener>, filter: String) {
        self.listeners.push(listener);
        self.filters.push(filter);
    }

    /// Remove the first subscription of `listener`
    pub(crate) fn remove(&mut self, listener: &Arc<dyn ServiceListener>) -> bool {
        match self
            .listeners
            .iter()
            .position(|candidate| Arc::ptr_eq(candidate, listener))
        {
            Some(index) => {
                self.listeners.remove(index);
                self.filters.remove(index);
                true
            }
            None => false,
        }
    }

    /// Listeners whose filter string is exactly `filter`, in subscription order
    pub(crate) fn matching(&self, filter: &str) -> Vec<Arc<dyn ServiceListener>> {
        self.listeners
            .iter()
            .zip(&self.filters)
            .filter(|(_, candidate)| candidate.as_str() == filter)
            .map(|(listener, _)| Arc::clone(listener))
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.listeners.clear();
        self.filters.clear();
    }

    pub(crate) fn len(&self) -> usize {
        debug_assert_eq!(self.listeners.len(), self.filters.len());
        self.listeners.len()
    }
}

/// Shared handle to a bundle
///
/// Clones refer to the same bundle; compare with [`Bundle::ptr_eq`].
#[derive(Clone)]
pub struct Bundle {
    inner: Arc<BundleInner>,
}

pub(crate) struct BundleInner {
    symbolic_name: String,
    registry: Weak<RegistryInner>,
    activator: Mutex<Box<dyn BundleActivator>>,
    state: RwLock<BundleState>,
    service_references: RwLock<Vec<ServiceReference>>,
    listeners: RwLock<ListenerTable>,
    /// Present only while STARTING, ACTIVE or STOPPING
    context: RwLock<Option<BundleContext>>,
}

impl Bundle {
    pub(crate) fn new(
        registry: Weak<RegistryInner>,
        symbolic_name: &str,
        activator: Box<dyn BundleActivator>,
    ) -> Self {
        Self {
            inner: Arc::new(BundleInner {
                symbolic_name: symbolic_name.to_string(),
                registry,
                activator: Mutex::new(activator),
                state: RwLock::new(BundleState::Resolved),
                service_references: RwLock::new(Vec::new()),
                listeners: RwLock::new(ListenerTable::default()),
                context: RwLock::new(None),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<BundleInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<BundleInner> {
        Arc::downgrade(&self.inner)
    }

    pub fn symbolic_name(&self) -> &str {
        &self.inner.symbolic_name
    }

    pub fn state(&self) -> BundleState {
        *recover_read(&self.inner.state)
    }

    /// Context handed to the activator, while the bundle is active
    pub fn bundle_context(&self) -> Option<BundleContext> {
        recover_read(&self.inner.context).clone()
    }

    /// Services currently published by this bundle, in registration order
    pub fn registered_services(&self) -> Vec<ServiceReference> {
        recover_read(&self.inner.service_references).clone()
    }

    /// Number of listener subscriptions held by this bundle
    pub fn listener_count(&self) -> usize {
        recover_read(&self.inner.listeners).len()
    }

    pub fn ptr_eq(a: &Bundle, b: &Bundle) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Manifest headers: name, vendor and version
    pub fn headers(&self) -> BTreeMap<String, String> {
        let vendor = self
            .registry()
            .map(|registry| registry.settings().vendor.clone())
            .unwrap_or_else(|| DEFAULT_VENDOR.to_string());

        BTreeMap::from([
            (BUNDLE_NAME.to_string(), self.symbolic_name().to_string()),
            (BUNDLE_VENDOR.to_string(), vendor),
            (BUNDLE_VERSION.to_string(), UNVERSIONED.to_string()),
        ])
    }

    /// Start the bundle
    ///
    /// Fails with [`FrameworkError::IllegalState`] unless the bundle is
    /// RESOLVED. If the activator fails, the bundle is rolled back to RESOLVED
    /// with its services unregistered and listeners removed, and
    /// [`FrameworkError::StartFailed`] is returned.
    pub fn start(&self) -> FrameworkResult<()> {
        {
            let mut state = recover_write(&self.inner.state);
            if *state != BundleState::Resolved {
                return Err(FrameworkError::IllegalState {
                    bundle: self.symbolic_name().to_string(),
                    state: *state,
                });
            }
            *state = BundleState::Starting;
        }
        log::debug!("Bundle '{}' starting", self.symbolic_name());

        let context = BundleContext::new(
            self.inner.registry.clone(),
            self.downgrade(),
            self.symbolic_name(),
        );
        *recover_write(&self.inner.context) = Some(context.clone());

        let result = recover_lock(&self.inner.activator).start(&context);
        match result {
            Ok(()) => {
                self.set_state(BundleState::Active);
                log::info!("Bundle '{}' started", self.symbolic_name());
                Ok(())
            }
            Err(source) => {
                log::warn!(
                    "Activator of bundle '{}' failed to start: {}",
                    self.symbolic_name(),
                    source
                );
                self.set_state(BundleState::Stopping);
                self.withdraw_and_resolve();
                self.clear_context();
                Err(FrameworkError::StartFailed {
                    bundle: self.symbolic_name().to_string(),
                    source,
                })
            }
        }
    }

    /// Stop the bundle
    ///
    /// Does nothing unless the bundle is ACTIVE. Services and listeners are
    /// always withdrawn; an activator failure is returned as
    /// [`FrameworkError::StopFailed`] after that cleanup.
    pub fn stop(&self) -> FrameworkResult<()> {
        {
            let mut state = recover_write(&self.inner.state);
            if *state != BundleState::Active {
                log::debug!(
                    "Bundle '{}' not active ({}), stop ignored",
                    self.symbolic_name(),
                    *state
                );
                return Ok(());
            }
            *state = BundleState::Stopping;
        }
        log::debug!("Bundle '{}' stopping", self.symbolic_name());

        let context = self.bundle_context().unwrap_or_else(|| {
            BundleContext::new(
                self.inner.registry.clone(),
                self.downgrade(),
                self.symbolic_name(),
            )
        });
        let result = recover_lock(&self.inner.activator).stop(&context);

        self.withdraw_and_resolve();
        self.clear_context();

        match result {
            Ok(()) => {
                log::info!("Bundle '{}' stopped", self.symbolic_name());
                Ok(())
            }
            Err(source) => Err(FrameworkError::StopFailed {
                bundle: self.symbolic_name().to_string(),
                source,
            }),
        }
    }

    /// Installing new content is not supported
    pub fn update(&self) -> FrameworkResult<()> {
        Err(FrameworkError::Unsupported {
            operation: format!("update of bundle '{}'", self.symbolic_name()),
        })
    }

    /// Bundles stay in the registry for its whole lifetime
    pub fn uninstall(&self) -> FrameworkResult<()> {
        Err(FrameworkError::Unsupported {
            operation: format!("uninstall of bundle '{}'", self.symbolic_name()),
        })
    }

    pub(crate) fn clear_context(&self) {
        *recover_write(&self.inner.context) = None;
    }

    pub(crate) fn registry(&self) -> Option<Registry> {
        self.inner.registry.upgrade().map(Registry::from_inner)
    }

    pub(crate) fn listener_table(&self) -> &RwLock<ListenerTable> {
        &self.inner.listeners
    }

    /// Listeners subscribed with exactly `filter`, snapshotted so delivery can re-enter
    pub(crate) fn listeners_for(&self, filter: &str) -> Vec<Arc<dyn ServiceListener>> {
        recover_read(&self.inner.listeners).matching(filter)
    }

    /// Record a new service; refused once the bundle has left STOPPING
    pub(crate) fn add_service_reference(&self, reference: ServiceReference) -> bool {
        let state = recover_read(&self.inner.state);
        if !state.has_context() {
            return false;
        }
        recover_write(&self.inner.service_references).push(reference);
        true
    }

    /// Subscribe a listener; refused once the bundle has left STOPPING
    pub(crate) fn add_listener(&self, listener: Arc<dyn ServiceListener>, filter: &str) -> bool {
        let state = recover_read(&self.inner.state);
        if !state.has_context() {
            return false;
        }
        recover_write(&self.inner.listeners).push(listener, filter.to_string());
        true
    }

    pub(crate) fn fire_service_event(&self, event: &ServiceEvent) {
        match self.registry() {
            Some(registry) => registry.fire_service_event(event),
            None => log::debug!(
                "Registry of bundle '{}' dropped, {} event not delivered",
                self.symbolic_name(),
                event.kind()
            ),
        }
    }

    /// Withdraw one service: UNREGISTERING first, then removal
    pub(crate) fn unregister_service(&self, reference: &ServiceReference) {
        if !reference.begin_unregister() {
            log::debug!(
                "Service '{}' already being unregistered",
                reference.interface_name()
            );
            return;
        }

        self.fire_service_event(&ServiceEvent::new(
            ServiceEventKind::Unregistering,
            reference.clone(),
        ));
        recover_write(&self.inner.service_references).retain(|r| r != reference);
        reference.clear_bundle();
        log::debug!(
            "Bundle '{}' unregistered service '{}'",
            self.symbolic_name(),
            reference.interface_name()
        );
    }

    /// Withdraw every service, including any registered by listeners while
    /// the withdrawal runs, then drop all listeners and move to RESOLVED
    ///
    /// The final emptiness check and the state change happen under the state
    /// lock, so no registration can slip in between them.
    fn withdraw_and_resolve(&self) {
        loop {
            self.unregister_services();

            let mut state = recover_write(&self.inner.state);
            if recover_read(&self.inner.service_references).is_empty() {
                recover_write(&self.inner.listeners).clear();
                *state = BundleState::Resolved;
                return;
            }
        }
    }

    fn unregister_services(&self) {
        loop {
            let next = recover_read(&self.inner.service_references).first().cloned();
            let Some(reference) = next else {
                break;
            };
            self.unregister_service(&reference);
            // Drop it even when someone else is already unregistering it
            recover_write(&self.inner.service_references).retain(|r| r != &reference);
        }
    }

    fn set_state(&self, state: BundleState) {
        *recover_write(&self.inner.state) = state;
    }
}

impl PartialEq for Bundle {
    fn eq(&self, other: &Self) -> bool {
        Bundle::ptr_eq(self, other)
    }
}

impl Eq for Bundle {}

impl fmt::Debug for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bundle")
            .field("symbolic_name", &self.inner.symbolic_name)
            .field("state", &self.state())
            .field("services", &self.registered_services().len())
            .field("listeners", &self.listener_count())
            .finish()
    }
}
