use crate::common::{on_start, Publisher};
use bundlekit::framework::api::{BundleState, Registry};
use bundlekit::tracker::api::ServiceTracker;
use std::sync::{Arc, Mutex};

/// Start bundle `name` with a tracker on `interface`, returning the tracker
fn start_tracking(registry: &Registry, name: &str, interface: &'static str) -> ServiceTracker {
    let slot: Arc<Mutex<Option<ServiceTracker>>> = Arc::new(Mutex::new(None));
    let stash = Arc::clone(&slot);
    registry.start(
        name,
        on_start(move |context| {
            let tracker = ServiceTracker::new(context, interface, None);
            tracker.open()?;
            *stash.lock().unwrap() = Some(tracker);
            Ok(())
        }),
    );
    let tracker = slot.lock().unwrap().take();
    tracker.expect("tracking bundle started")
}

#[test]
fn test_provider_lifecycle_seen_by_tracker() {
    let registry = Registry::new();
    let tracker = start_tracking(&registry, "B", "X");
    assert_eq!(tracker.get_tracking_count().unwrap(), 0);
    assert!(tracker.get_service().unwrap().is_none());

    registry.start("A", Box::new(Publisher::new("X", "S1")));

    let a = registry.get_bundle("A").unwrap();
    assert_eq!(a.state(), BundleState::Active);
    let service = tracker.get_service().unwrap().unwrap();
    assert_eq!(*service.downcast::<&str>().unwrap(), "S1");
    assert_eq!(tracker.size().unwrap(), 1);

    let reference = tracker.get_service_reference().unwrap().unwrap();
    assert!(reference.is_registered());

    registry.stop("A");

    assert_eq!(a.state(), BundleState::Resolved);
    assert!(tracker.get_service().unwrap().is_none());
    assert_eq!(tracker.size().unwrap(), 0);
    assert_eq!(tracker.get_tracking_count().unwrap(), 2);
    assert!(!reference.is_registered());
    assert!(reference.bundle().is_none());
}

#[test]
fn test_restarted_provider_is_tracked_again() {
    let registry = Registry::new();
    let tracker = start_tracking(&registry, "B", "X");

    registry.start("A", Box::new(Publisher::new("X", "S1")));
    registry.stop("A");
    // The bundle keeps its first activator
    registry.start("A", Box::new(Publisher::new("X", "ignored")));

    let service = tracker.get_service().unwrap().unwrap();
    assert_eq!(*service.downcast::<&str>().unwrap(), "S1");
    assert_eq!(tracker.get_tracking_count().unwrap(), 3);
    assert_eq!(registry.bundles().len(), 2);
}

#[test]
fn test_trackers_are_independent_per_interface() {
    let registry = Registry::new();
    let x = start_tracking(&registry, "BX", "X");
    let y = start_tracking(&registry, "BY", "Y");

    registry.start("A", Box::new(Publisher::new("X", "S1")));

    assert_eq!(x.size().unwrap(), 1);
    assert_eq!(y.size().unwrap(), 0);
    assert_eq!(y.get_tracking_count().unwrap(), 0);
}

#[test]
fn test_stop_all_leaves_every_bundle_resolved() {
    let registry = Registry::new();
    let tracker = start_tracking(&registry, "B", "X");
    registry.start("A", Box::new(Publisher::new("X", "S1")));

    registry.stop_all();

    assert!(registry
        .bundles()
        .iter()
        .all(|bundle| bundle.state() == BundleState::Resolved
            && bundle.registered_services().is_empty()
            && bundle.listener_count() == 0));
    // A stopped first, so the tracker saw its service go
    assert_eq!(tracker.size().unwrap(), 0);
}
