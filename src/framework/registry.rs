//! Bundle Registry
//!
//! Owns every bundle started through it and fans service events out to the
//! listeners of all bundles. `start` and `stop` are best-effort entry points:
//! their failures are logged, never returned. Use [`Bundle::start`] and
//! [`Bundle::stop`] directly to observe errors.

use crate::core::error_handling::log_error_with_context;
use crate::core::sync::{recover_read, recover_write};
use crate::framework::bundle::{Bundle, BundleActivator, BundleState};
use crate::framework::error::FrameworkError;
use crate::framework::filter::Filter;
use crate::framework::service::ServiceEvent;
use crate::framework::settings::FrameworkSettings;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Shared handle to a registry; clones refer to the same registry
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

pub(crate) struct RegistryInner {
    bundles: RwLock<Vec<Bundle>>,
    settings: FrameworkSettings,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_settings(FrameworkSettings::default())
    }

    pub fn with_settings(settings: FrameworkSettings) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                bundles: RwLock::new(Vec::new()),
                settings,
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<RegistryInner>) -> Self {
        Self { inner }
    }

    pub fn settings(&self) -> &FrameworkSettings {
        &self.inner.settings
    }

    /// Start the bundle named `symbolic_name`
    ///
    /// The bundle is created on first use. A bundle that already exists keeps
    /// its original activator and `activator` is dropped. Failures are logged.
    pub fn start(&self, symbolic_name: &str, activator: Box<dyn BundleActivator>) {
        let bundle = self.get_or_create_bundle(symbolic_name, activator);
        if let Err(e) = bundle.start() {
            log_error_with_context(&e, &format!("Starting bundle '{}'", symbolic_name));
        }
    }

    /// Stop the bundle named `symbolic_name`; failures, including an unknown
    /// name, are logged
    pub fn stop(&self, symbolic_name: &str) {
        let result = match self.get_bundle(symbolic_name) {
            Some(bundle) => {
                let result = bundle.stop();
                bundle.clear_context();
                result
            }
            None => Err(FrameworkError::BundleNotFound {
                bundle: symbolic_name.to_string(),
            }),
        };

        if let Err(e) = result {
            log_error_with_context(&e, &format!("Stopping bundle '{}'", symbolic_name));
        }
    }

    /// Stop every active bundle, most recently created first
    pub fn stop_all(&self) {
        for bundle in self.bundles().iter().rev() {
            if bundle.state() == BundleState::Active {
                self.stop(bundle.symbolic_name());
            }
        }
    }

    /// First bundle whose symbolic name is exactly `symbolic_name`
    pub fn get_bundle(&self, symbolic_name: &str) -> Option<Bundle> {
        recover_read(&self.inner.bundles)
            .iter()
            .find(|bundle| bundle.symbolic_name() == symbolic_name)
            .cloned()
    }

    /// Snapshot of all bundles in creation order
    pub fn bundles(&self) -> Vec<Bundle> {
        recover_read(&self.inner.bundles).clone()
    }

    /// Deliver `event` to every listener subscribed with the canonical
    /// `(objectClass=<interface>)` filter of the event's service
    ///
    /// Bundles are visited in registry order and listeners in subscription
    /// order. Listeners may re-enter the framework; subscriptions added during
    /// delivery do not see the event being delivered.
    pub fn fire_service_event(&self, event: &ServiceEvent) {
        let filter = Filter::for_interface(event.reference().interface_name()).to_string();
        log::trace!("Firing {} for {}", event.kind(), filter);

        for bundle in self.bundles() {
            for listener in bundle.listeners_for(&filter) {
                listener.service_changed(event);
            }
        }
    }

    fn get_or_create_bundle(
        &self,
        symbolic_name: &str,
        activator: Box<dyn BundleActivator>,
    ) -> Bundle {
        let mut bundles = recover_write(&self.inner.bundles);
        if let Some(existing) = bundles
            .iter()
            .find(|bundle| bundle.symbolic_name() == symbolic_name)
        {
            log::debug!(
                "Reusing bundle '{}'; supplied activator ignored",
                symbolic_name
            );
            return existing.clone();
        }

        let bundle = Bundle::new(Arc::downgrade(&self.inner), symbolic_name, activator);
        bundles.push(bundle.clone());
        log::debug!("Created bundle '{}'", symbolic_name);
        bundle
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field(
                "bundles",
                &self
                    .bundles()
                    .iter()
                    .map(|b| b.symbolic_name().to_string())
                    .collect::<Vec<_>>(),
            )
            .field("settings", &self.inner.settings)
            .finish()
    }
}
