use super::*;

#[test]
fn test_present_id_strictly_increases_on_genuine_presents() {
    let mut controller = LatencyController::new();
    assert_eq!(controller.register_present(), Some(1));
    assert_eq!(controller.register_present(), Some(2));
    assert_eq!(controller.register_present(), Some(3));
    assert_eq!(controller.next_present_id(), 3);
}

#[test]
fn test_duplicate_present_does_not_advance_id() {
    let mut controller = LatencyController::new();
    controller.register_present();
    let before = controller.next_present_id();

    controller.mark_next_duplicate();
    assert_eq!(controller.register_present(), None);
    assert_eq!(controller.next_present_id(), before);
    assert_eq!(controller.frames_duplicated(), 1);
    assert_eq!(controller.total_duplicated(), 1);
}

#[test]
fn test_duplicates_widen_effective_wait_depth() {
    let mut controller = LatencyController::new();
    assert_eq!(controller.effective_wait_depth(), DEFAULT_FRAME_LATENCY);

    controller.mark_next_duplicate();
    controller.register_present();
    controller.mark_next_duplicate();
    controller.register_present();
    assert_eq!(controller.effective_wait_depth(), DEFAULT_FRAME_LATENCY + 2);

    // A genuine present resets the duplicate window.
    controller.register_present();
    assert_eq!(controller.effective_wait_depth(), DEFAULT_FRAME_LATENCY);
}

#[test]
fn test_low_latency_runs_at_depth_zero() {
    let mut controller = LatencyController::new();
    controller.set_low_latency_present(true);
    assert_eq!(controller.effective_wait_depth(), 0);
}

#[test]
fn test_wait_target_respects_depth_and_confirmations() {
    let mut controller = LatencyController::new();
    assert_eq!(controller.wait_target(), None);

    controller.register_present();
    // Depth 1: a single outstanding present needs no wait.
    assert_eq!(controller.wait_target(), None);

    controller.register_present();
    controller.register_present();
    assert_eq!(controller.wait_target(), Some(2));

    controller.confirm(2);
    assert_eq!(controller.wait_target(), None);

    // Stale confirmations never move the watermark backwards.
    controller.confirm(1);
    assert_eq!(controller.last_confirmed_present_id(), 2);
}

#[test]
fn test_unmarked_present_after_duplicate_is_genuine() {
    let mut controller = LatencyController::new();
    controller.mark_next_duplicate();
    assert_eq!(controller.register_present(), None);
    assert_eq!(controller.register_present(), Some(1));
}

#[test]
fn test_rebuild_clears_duplicate_window() {
    let mut controller = LatencyController::new();
    controller.mark_next_duplicate();
    controller.register_present();
    controller.mark_next_duplicate();
    controller.on_chain_rebuilt();
    assert_eq!(controller.effective_wait_depth(), DEFAULT_FRAME_LATENCY);
    // The pending duplicate mark was dropped with the chain.
    assert_eq!(controller.register_present(), Some(1));
}

#[test]
fn test_estimated_video_latency() {
    let controller = LatencyController::new();
    let latency = controller.estimated_video_latency(3, 1.0 / 60.0);
    assert!((latency - 2.0 / 60.0).abs() < 1e-9);
    assert_eq!(controller.estimated_video_latency(0, 1.0 / 60.0), 0.0);
}
