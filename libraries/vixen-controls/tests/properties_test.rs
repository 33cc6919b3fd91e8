//! Integration tests for the controller's observable guarantees
//!
//! Each test drives a controller over headless collaborators and checks
//! one property end to end: reconciliation is idempotent, volume input is
//! validated, track selection is exclusive, a resolution switch resumes
//! where it left off, the errored state is entered exactly once, skips are
//! clamped and drags are normalized.

mod common;

use common::{multi_resolution_media, Harness};
use std::cell::Cell;
use std::rc::Rc;
use vixen_controls::{ControlError, LifecycleState, FATAL_ERROR};
use vixen_core::headless::HeadlessTrack;
use vixen_core::{
    Geometry, MediaSourceCandidate, PointerButton, TrackInfo, TrackKind, TrackMode, UiEvent,
};

// ===== Reconciliation =====

#[test]
fn test_update_ui_twice_leaves_tree_unchanged() {
    let mut harness = Harness::loaded(125.0);
    harness.controller.jump_to(42.0).unwrap();
    harness.pump();

    harness.controller.update_ui();
    let once = harness.dom.dump(harness.body);
    harness.controller.update_ui();
    let twice = harness.dom.dump(harness.body);

    assert_eq!(once, twice);
    assert_eq!(harness.controller.ui_state().elapsed, "0:42");
    assert_eq!(harness.controller.ui_state().remaining, "1:23");
}

#[test]
fn test_container_classes_track_state() {
    let mut harness = Harness::loaded(10.0);
    let container = harness.controller.surface().container;

    assert!(harness.has_class(container, "vixen-seekable"));
    assert!(harness.has_class(container, "vixen-network-idle"));
    assert!(!harness.has_class(container, "vixen-playing"));

    harness.controller.play().unwrap();
    harness.pump();
    assert!(harness.has_class(container, "vixen-playing"));
    assert_eq!(harness.dom.text(harness.controller.surface().play_button), "Pause");

    let classes = harness.dom.classes(container);
    let playing = classes.iter().filter(|c| *c == "vixen-playing").count();
    assert_eq!(playing, 1);
}

// ===== Volume =====

#[test]
fn test_volume_setter_rejects_out_of_range() {
    let mut harness = Harness::loaded(10.0);

    for bad in [-0.1, 1.1, f64::NAN] {
        let err = harness.controller.set_volume(bad).unwrap_err();
        assert!(matches!(err, ControlError::InvalidVolume(_)), "{bad} accepted");
    }
    assert_eq!(harness.controller.volume(), 1.0);

    let parsed = "x".parse::<vixen_controls::VolumeLevel>();
    assert!(matches!(parsed, Err(ControlError::InvalidVolume(_))));
}

#[test]
fn test_volume_setter_accepts_bounds() {
    let mut harness = Harness::loaded(10.0);

    for good in [0.0, 0.5, 1.0] {
        harness.controller.set_volume(good).unwrap();
        assert_eq!(harness.controller.volume(), good);
    }
    harness.controller.set_volume(0.5).unwrap();
    assert_eq!(harness.controller.ui_state().volume_percent, 50.0);
}

// ===== Tracks =====

#[test]
fn test_selecting_second_track_hides_first() {
    let media = vixen_core::headless::HeadlessMedia::new();
    media.add_track(
        TrackKind::Captions,
        HeadlessTrack::new(TrackInfo::new("en", "English")),
    );
    media.add_track(
        TrackKind::Captions,
        HeadlessTrack::new(TrackInfo::new("de", "Deutsch")),
    );
    let mut harness = Harness::builder().media(media).build();

    harness
        .controller
        .select_track(TrackKind::Captions, Some(0))
        .unwrap();
    harness
        .controller
        .select_track(TrackKind::Captions, Some(1))
        .unwrap();

    assert_eq!(
        harness.media.track_mode(TrackKind::Captions, 0),
        Some(TrackMode::Off)
    );
    assert_eq!(
        harness.media.track_mode(TrackKind::Captions, 1),
        Some(TrackMode::Showing)
    );
    let group = harness.controller.track_group(TrackKind::Captions).unwrap();
    assert_eq!(group.showing(), Some(1));
}

// ===== Resolution switching =====

#[test]
fn test_resolution_switch_resumes_playing_at_position() {
    let mut harness = Harness::builder().media(multi_resolution_media()).build();
    harness.media.finish_loading(60.0);
    harness.pump();
    harness.controller.play().unwrap();
    harness.pump();
    harness.media.advance(12.5);
    harness.pump();

    harness.controller.select_resolution(360).unwrap();
    harness.pump();
    assert!(harness.controller.session().pending_resume.is_some());
    assert_eq!(harness.media.load_count(), 1);

    harness.media.finish_loading(60.0);
    harness.pump();

    let session = harness.controller.session();
    assert_eq!(session.current_time, 12.5);
    assert!(!session.paused);
    assert!(session.pending_resume.is_none());
    assert_eq!(
        vixen_core::MediaHost::current_src(&harness.media).as_deref(),
        Some("clip-360.webm")
    );
}

#[test]
fn test_resolution_switch_while_paused_stays_paused() {
    let mut harness = Harness::builder().media(multi_resolution_media()).build();
    harness.media.finish_loading(60.0);
    harness.pump();
    harness.controller.jump_to(20.0).unwrap();
    harness.pump();

    harness.controller.select_resolution(1080).unwrap();
    harness.pump();
    harness.media.finish_loading(60.0);
    harness.pump();

    assert_eq!(harness.controller.session().current_time, 20.0);
    assert!(harness.controller.session().paused);
}

#[test]
fn test_unknown_resolution_is_rejected() {
    let mut harness = Harness::builder().media(multi_resolution_media()).build();
    let err = harness.controller.select_resolution(480).unwrap_err();
    assert!(matches!(err, ControlError::UnknownResolution(480)));
    assert_eq!(harness.media.load_count(), 0);
}

// ===== Errored state =====

#[test]
fn test_all_sources_failing_errors_exactly_once() {
    let mut harness = Harness::builder().media(multi_resolution_media()).build();
    let fatal = Rc::new(Cell::new(0));
    let seen = Rc::clone(&fatal);
    harness
        .controller
        .on(FATAL_ERROR, move |_, args| {
            assert_eq!(args[0].as_array().map(Vec::len), Some(4));
            seen.set(seen.get() + 1);
            Ok(())
        })
        .unwrap();

    for index in 0..3 {
        harness.media.fail_source(index);
    }
    harness.pump();
    assert_eq!(fatal.get(), 0);
    assert_eq!(harness.controller.lifecycle(), LifecycleState::Uninitialized);

    harness.media.fail_source(3);
    harness.pump();
    assert_eq!(fatal.get(), 1);
    assert_eq!(harness.controller.lifecycle(), LifecycleState::Errored);

    let links = harness.controller.fallback_links();
    assert_eq!(links.len(), 4);
    assert_eq!(
        harness.dom.attribute(links[0], "href").as_deref(),
        Some("clip-1080.webm")
    );
    assert_eq!(harness.dom.text(links[3]), "Download video/webm (360p)");

    harness.media.fail_source(3);
    harness.pump();
    assert_eq!(fatal.get(), 1);
    assert_eq!(harness.dom.find_by_class("vixen-fallbacklink").len(), 4);
    assert!(harness.has_class(harness.controller.surface().container, "vixen-errored"));
}

#[test]
fn test_errored_controller_refuses_transport() {
    let media = vixen_core::headless::HeadlessMedia::new();
    media.add_source(MediaSourceCandidate::new("video/mp4", None, "clip.mp4"));
    let mut harness = Harness::builder().media(media).build();
    harness.media.fail_source(0);
    harness.pump();

    harness.controller.play().unwrap();
    harness.pump();
    assert!(harness.controller.session().paused);
    assert!(!harness.controller.ui_state().playing);
}

// ===== Skipping =====

#[test]
fn test_skip_forward_uses_minimum_amount() {
    let mut harness = Harness::loaded(10.0);

    harness.controller.skip_forward().unwrap();
    harness.pump();
    assert_eq!(harness.controller.session().current_time, 5.0);
}

#[test]
fn test_skip_forward_clamps_at_duration() {
    let mut harness = Harness::loaded(10.0);
    harness.controller.jump_to(9.0).unwrap();
    harness.pump();

    harness.controller.skip_forward().unwrap();
    harness.pump();
    assert_eq!(harness.controller.session().current_time, 10.0);

    harness.controller.skip_backward().unwrap();
    harness.controller.skip_backward().unwrap();
    harness.controller.skip_backward().unwrap();
    harness.pump();
    assert_eq!(harness.controller.session().current_time, 0.0);
}

#[test]
fn test_skip_scales_with_long_resources() {
    let mut harness = Harness::loaded(1000.0);
    harness.controller.skip_forward().unwrap();
    assert_eq!(harness.controller.session().current_time, 30.0);
}

#[test]
fn test_jump_to_rejects_non_finite() {
    let mut harness = Harness::loaded(10.0);
    let err = harness.controller.jump_to(f64::INFINITY).unwrap_err();
    assert!(matches!(err, ControlError::InvalidTime(_)));
}

// ===== Dragging =====

#[test]
fn test_volume_drag_corners() {
    let mut harness = Harness::loaded(10.0);
    let volume = harness.controller.surface().volume;
    harness.place(volume, Geometry::new(300.0, 40.0, 100.0, 10.0));

    harness
        .controller
        .handle_ui_event(
            volume,
            UiEvent::PointerDown {
                button: PointerButton::Primary,
                x: 300.0,
                y: 40.0,
            },
        )
        .unwrap();
    assert_eq!(harness.controller.volume(), 0.0);

    harness.controller.handle_pointer_move(400.0, 50.0);
    assert_eq!(harness.controller.volume(), 1.0);

    harness.controller.handle_pointer_move(900.0, -500.0);
    assert_eq!(harness.controller.volume(), 1.0);
    harness.controller.handle_pointer_up();
}

#[test]
fn test_vertical_volume_drag_uses_inverted_y() {
    let mut harness = Harness::loaded(10.0);
    let volume = harness.controller.surface().volume;
    harness.place(volume, Geometry::new(0.0, 100.0, 10.0, 100.0));
    harness.controller.handle_media_event(vixen_core::MediaEvent::Resize);

    // top edge is the loudest
    harness
        .controller
        .handle_ui_event(
            volume,
            UiEvent::PointerDown {
                button: PointerButton::Primary,
                x: 5.0,
                y: 100.0,
            },
        )
        .unwrap();
    assert_eq!(harness.controller.volume(), 1.0);

    harness.controller.handle_pointer_move(5.0, 175.0);
    assert_eq!(harness.controller.volume(), 0.25);
    harness.controller.handle_pointer_up();
    assert_eq!(
        harness
            .dom
            .style(harness.controller.surface().volume_fill, "height")
            .as_deref(),
        Some("25.00%")
    );
}
