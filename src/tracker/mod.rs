//! Service Tracking
//!
//! A [`ServiceTracker`](api::ServiceTracker) maintains a live, callback-driven
//! view of every service registered under one interface name. It is built
//! entirely on the public framework API: it subscribes a listener through a
//! [`BundleContext`](crate::framework::api::BundleContext) and reacts to the
//! service events that listener receives.
//!
//! ```text
//!  provider bundle                 registry                    tracker
//!  ───────────────                 ────────                    ───────
//!  register_service ──REGISTERED──► fan-out ──► listener ──► adding_service
//!                                                                 │
//!                                                          insert, count+1
//!  unregister ───────UNREGISTERING─► fan-out ──► listener ──► remove, count+1
//!                                                                 │
//!                                                          removed_service
//! ```
//!
//! # Example
//!
//! ```rust
//! use bundlekit::framework::api::{BundleActivator, BundleContext, ActivatorError, Registry};
//! use bundlekit::tracker::api::ServiceTracker;
//! use std::sync::{Arc, Mutex};
//!
//! struct Watcher(Arc<Mutex<Option<ServiceTracker>>>);
//!
//! impl BundleActivator for Watcher {
//!     fn start(&mut self, context: &BundleContext) -> Result<(), ActivatorError> {
//!         let tracker = ServiceTracker::new(context, "Clock", None);
//!         tracker.open()?;
//!         *self.0.lock().unwrap() = Some(tracker);
//!         Ok(())
//!     }
//!
//!     fn stop(&mut self, _context: &BundleContext) -> Result<(), ActivatorError> {
//!         if let Some(tracker) = self.0.lock().unwrap().take() {
//!             tracker.close()?;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let slot = Arc::new(Mutex::new(None));
//! let registry = Registry::new();
//! registry.start("watcher", Box::new(Watcher(Arc::clone(&slot))));
//!
//! let tracker = slot.lock().unwrap().clone().unwrap();
//! assert_eq!(tracker.size().unwrap(), 0);
//! assert_eq!(tracker.get_tracking_count().unwrap(), 0);
//! ```

pub(crate) mod customizer;
pub(crate) mod service_tracker;

pub mod api;

#[cfg(test)]
mod tests;
