use super::*;
use crate::types::Extent;

#[test]
fn test_events_drain_in_post_order() {
    let queue = EventQueue::new();
    let proxy = queue.proxy();
    proxy.post(PlatformEvent::Resized(Extent::new(800, 600)));
    proxy.post(PlatformEvent::SurfaceInvalidated);

    let drained = queue.drain();
    assert_eq!(
        drained,
        vec![
            PlatformEvent::Resized(Extent::new(800, 600)),
            PlatformEvent::SurfaceInvalidated,
        ]
    );
    assert!(queue.drain().is_empty());
}

#[test]
fn test_close_request_latches_teardown() {
    let queue = EventQueue::new();
    let proxy = queue.proxy();
    assert!(!queue.teardown_requested());
    proxy.post(PlatformEvent::CloseRequested);
    assert!(queue.teardown_requested());
    // The flag survives the drain.
    queue.drain();
    assert!(queue.teardown_requested());
}

#[test]
fn test_explicit_teardown_request() {
    let queue = EventQueue::new();
    queue.proxy().request_teardown();
    assert!(queue.teardown_requested());
    assert!(queue.drain().is_empty());
}

#[test]
fn test_proxy_works_from_another_thread() {
    let queue = EventQueue::new();
    let proxy = queue.proxy();
    let handle = std::thread::spawn(move || {
        proxy.post(PlatformEvent::Resized(Extent::new(640, 480)));
    });
    handle.join().expect("event thread panicked");
    assert_eq!(queue.drain().len(), 1);
}
