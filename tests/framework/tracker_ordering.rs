use crate::common::{on_start, Publisher};
use bundlekit::framework::api::{Registry, ServiceObject, ServiceReference};
use bundlekit::tracker::api::{ServiceTracker, ServiceTrackerCustomizer};
use std::sync::{Arc, Mutex};

/// Customizer logging every hook together with what a second tracker on the
/// same interface could see at that moment
struct Witness {
    log: Arc<Mutex<Vec<String>>>,
    other: ServiceTracker,
}

impl Witness {
    fn note(&self, hook: &str, reference: &ServiceReference) {
        let visible = self.other.size().unwrap_or(usize::MAX);
        self.log.lock().unwrap().push(format!(
            "{} {} registered={} other={}",
            hook,
            reference.service_as::<&str>().map(|s| *s).unwrap_or("?"),
            reference.is_registered(),
            visible
        ));
    }
}

impl ServiceTrackerCustomizer for Witness {
    fn adding_service(&self, reference: &ServiceReference) -> Option<ServiceObject> {
        self.note("adding", reference);
        Some(reference.service())
    }

    fn modified_service(&self, reference: &ServiceReference, _service: &ServiceObject) {
        self.note("modified", reference);
    }

    fn removed_service(&self, reference: &ServiceReference, _service: &ServiceObject) {
        self.note("removed", reference);
    }
}

#[test]
fn test_hooks_see_consistent_registry_state() {
    let registry = Registry::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let slot: Arc<Mutex<Option<(ServiceTracker, ServiceTracker)>>> = Arc::new(Mutex::new(None));

    let stash = Arc::clone(&slot);
    let witness_log = Arc::clone(&log);
    registry.start(
        "consumer",
        on_start(move |context| {
            // Opened first, so it sees each event before the witnessing tracker
            let plain = ServiceTracker::new(context, "X", None);
            plain.open()?;
            let customizer: Arc<dyn ServiceTrackerCustomizer> = Arc::new(Witness {
                log: Arc::clone(&witness_log),
                other: plain.clone(),
            });
            let witnessed = ServiceTracker::new(context, "X", Some(customizer));
            witnessed.open()?;
            *stash.lock().unwrap() = Some((plain, witnessed));
            Ok(())
        }),
    );

    registry.start("provider", Box::new(Publisher::new("X", "S1")));
    registry.stop("provider");

    let (_plain, witnessed) = slot.lock().unwrap().take().unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "adding S1 registered=true other=1",
            "removed S1 registered=true other=0",
        ]
    );
    assert_eq!(witnessed.get_tracking_count().unwrap(), 2);
}

#[test]
fn test_close_reports_each_tracked_service_once() {
    let registry = Registry::new();
    registry.start("one", Box::new(Publisher::new("X", "S1")));
    registry.start("two", Box::new(Publisher::new("X", "S2")));
    let log = Arc::new(Mutex::new(Vec::new()));
    let slot: Arc<Mutex<Option<ServiceTracker>>> = Arc::new(Mutex::new(None));

    let stash = Arc::clone(&slot);
    let witness_log = Arc::clone(&log);
    registry.start(
        "consumer",
        on_start(move |context| {
            let other = ServiceTracker::new(context, "Unused", None);
            let customizer: Arc<dyn ServiceTrackerCustomizer> = Arc::new(Witness {
                log: Arc::clone(&witness_log),
                other,
            });
            let tracker = ServiceTracker::new(context, "X", Some(customizer));
            tracker.open()?;
            *stash.lock().unwrap() = Some(tracker);
            Ok(())
        }),
    );
    let tracker = slot.lock().unwrap().take().unwrap();
    log.lock().unwrap().clear();

    tracker.close().unwrap();

    let mut removed = log.lock().unwrap().clone();
    removed.sort();
    assert_eq!(
        removed,
        vec![
            "removed S1 registered=true other=0",
            "removed S2 registered=true other=0",
        ]
    );
    assert_eq!(tracker.get_tracking_count().unwrap(), -1);
}
