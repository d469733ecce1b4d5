use crate::common::{on_start, Publisher, Recorder};
use bundlekit::framework::api::{
    BundleActivator, BundleState, FrameworkError, Registry, ServiceEvent, ServiceEventKind,
    ServiceListener, ServiceProperties,
};
use std::error::Error;
use std::sync::Arc;

/// Activator that publishes X and, on X's UNREGISTERING, publishes Y from a
/// listener; `fail` makes the start fail after X is published
fn republishing(fail: bool) -> Box<dyn BundleActivator> {
    on_start(move |context| {
        let publisher = context.clone();
        let listener: Arc<dyn ServiceListener> = Arc::new(move |event: &ServiceEvent| {
            if event.kind() == ServiceEventKind::Unregistering {
                publisher
                    .register_service("Y", Arc::new("late"), ServiceProperties::new())
                    .unwrap();
            }
        });
        context.add_service_listener(listener, "(objectClass=X)")?;
        context.register_service("X", Arc::new("S1"), ServiceProperties::new())?;
        if fail {
            return Err("refused after publishing".into());
        }
        Ok(())
    })
}

#[test]
fn test_failed_activation_withdraws_its_service() {
    let registry = Registry::new();
    let recorder = Recorder::new();
    let listener = Arc::clone(&recorder);
    registry.start(
        "observer",
        on_start(move |context| {
            context.add_service_listener(listener.clone(), "(objectClass=X)")?;
            Ok(())
        }),
    );

    let publisher = Publisher::failing("X", "S1");
    let registration = Arc::clone(&publisher.registration);
    registry.start("broken", Box::new(publisher));

    let broken = registry.get_bundle("broken").unwrap();
    assert_eq!(broken.state(), BundleState::Resolved);
    assert!(broken.registered_services().is_empty());
    assert_eq!(broken.listener_count(), 0);
    assert!(broken.bundle_context().is_none());
    assert_eq!(
        recorder.kinds(),
        vec![ServiceEventKind::Registered, ServiceEventKind::Unregistering]
    );

    // The registration handed out before the failure is now stale and inert
    let registration = registration.lock().unwrap().clone().unwrap();
    assert!(!registration.reference().is_registered());
    registration.unregister();
    assert_eq!(recorder.kinds().len(), 2);

    let observer = registry.get_bundle("observer").unwrap();
    let context = observer.bundle_context().unwrap();
    assert!(context.get_service_reference("X").is_none());
}

#[test]
fn test_direct_start_reports_wrapped_error() {
    let registry = Registry::new();
    registry.start("broken", Box::new(Publisher::failing("X", "S1")));
    let bundle = registry.get_bundle("broken").unwrap();

    let error = bundle.start().unwrap_err();

    assert!(matches!(error, FrameworkError::StartFailed { .. }));
    assert_eq!(error.bundle_name(), Some("broken"));
    assert_eq!(error.source().unwrap().to_string(), "S1 refused to start");
    assert_eq!(bundle.state(), BundleState::Resolved);
}

#[test]
fn test_failing_bundle_does_not_disturb_others() {
    let registry = Registry::new();
    registry.start("good", Box::new(Publisher::new("X", "S1")));
    registry.start("bad", Box::new(Publisher::failing("X", "S2")));

    let context = registry
        .get_bundle("good")
        .and_then(|bundle| bundle.bundle_context())
        .unwrap();
    let references = context.get_service_references("X", None).unwrap().unwrap();

    assert_eq!(references.len(), 1);
    assert_eq!(*references[0].service_as::<&str>().unwrap(), "S1");
}

#[test]
fn test_rollback_withdraws_services_registered_during_cleanup() {
    let registry = Registry::new();
    let recorder = Recorder::new();
    let listener = Arc::clone(&recorder);
    registry.start(
        "observer",
        on_start(move |context| {
            context.add_service_listener(listener.clone(), "(objectClass=Y)")?;
            Ok(())
        }),
    );

    registry.start("p", republishing(true));

    let bundle = registry.get_bundle("p").unwrap();
    assert_eq!(bundle.state(), BundleState::Resolved);
    assert!(bundle.registered_services().is_empty());
    assert_eq!(bundle.listener_count(), 0);
    assert_eq!(
        recorder.kinds(),
        vec![ServiceEventKind::Registered, ServiceEventKind::Unregistering]
    );
}

#[test]
fn test_stop_withdraws_services_registered_during_cleanup() {
    let registry = Registry::new();
    registry.start("p", republishing(false));
    let bundle = registry.get_bundle("p").unwrap();
    assert_eq!(bundle.state(), BundleState::Active);

    registry.stop("p");

    assert_eq!(bundle.state(), BundleState::Resolved);
    assert!(bundle.registered_services().is_empty());
    assert_eq!(bundle.listener_count(), 0);
}
