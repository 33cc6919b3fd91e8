//! Integration tests for controller workflows
//!
//! Covers scrubbing, chapter discovery, fullscreen, remembered volume,
//! subscriptions, surface events, reloads and the controller registry.

mod common;

use common::{multi_resolution_media, Harness};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use vixen_controls::{
    ControlError, ControllerConfig, ControllerRegistry, HandlerError, LifecycleState,
    SelectorKind, FATAL_ERROR, UPDATE_UI,
};
use vixen_core::headless::{FullscreenFlavor, HeadlessMedia, HeadlessTrack, MemoryStore};
use vixen_core::{
    Cue, Geometry, MediaHost, MediaSourceCandidate, PointerButton, PreferenceStore, ResourceId,
    TimerId, TrackInfo, TrackKind, TrackMode, UiEvent,
};

// ===== Test Helpers =====

fn pointer_down(x: f64, y: f64) -> UiEvent {
    UiEvent::PointerDown {
        button: PointerButton::Primary,
        x,
        y,
    }
}

fn chapter_media() -> HeadlessMedia {
    let media = HeadlessMedia::new();
    media.add_track(
        TrackKind::Chapters,
        HeadlessTrack::new(TrackInfo::new("en", "Main"))
            .with_cues(vec![
                Cue::new(30.0, 60.0, "Finale"),
                Cue::new(0.0, 10.0, "Intro"),
            ])
            .loads_after(Some(1)),
    );
    media.add_track(
        TrackKind::Chapters,
        HeadlessTrack::new(TrackInfo::new("en", "Extras"))
            .with_cues(vec![Cue::new(10.0, 30.0, "Setup")])
            .drops_mode_once(),
    );
    media.add_track(
        TrackKind::Chapters,
        HeadlessTrack::new(TrackInfo::new("fr", "Broken")).loads_after(None),
    );
    media
}

// ===== Scrubbing =====

#[test]
fn test_scrub_batches_seek_until_idle() {
    let mut harness = Harness::loaded(10.0);
    let scrubber = harness.controller.surface().scrubber;
    harness.place(scrubber, Geometry::new(100.0, 50.0, 200.0, 20.0));

    harness
        .controller
        .handle_ui_event(scrubber, pointer_down(200.0, 60.0))
        .unwrap();
    assert!(harness.has_class(scrubber, "vixen-dragging"));
    assert!(harness.controller.surface().scrubber_state.dragging);
    assert_eq!(
        harness.dom.text(harness.controller.surface().elapsed),
        "0:05"
    );
    assert_eq!(harness.controller.session().current_time, 0.0);

    harness.controller.handle_pointer_move(250.0, 60.0);
    let fired = harness.fire_timers();
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].timer, TimerId::Idle);
    assert_eq!(fired[0].delay, Duration::ZERO);
    assert_eq!(harness.controller.session().current_time, 7.5);

    harness.controller.handle_pointer_up();
    assert!(!harness.has_class(scrubber, "vixen-dragging"));
    assert!(!harness.controller.surface().scrubber_state.dragging);
    assert_eq!(harness.controller.ui_state().played_percent, 75.0);
}

#[test]
fn test_release_flushes_pending_seek() {
    let mut harness = Harness::loaded(10.0);
    let scrubber = harness.controller.surface().scrubber;
    harness.place(scrubber, Geometry::new(0.0, 0.0, 100.0, 10.0));

    harness
        .controller
        .handle_ui_event(scrubber, pointer_down(20.0, 5.0))
        .unwrap();
    harness.controller.handle_pointer_up();
    harness.pump();
    assert_eq!(harness.controller.session().current_time, 2.0);

    // the idle tick finds nothing left to flush
    harness.fire_timers();
    assert_eq!(harness.controller.session().current_time, 2.0);
}

#[test]
fn test_secondary_button_does_not_drag() {
    let mut harness = Harness::loaded(10.0);
    let scrubber = harness.controller.surface().scrubber;
    harness.place(scrubber, Geometry::new(0.0, 0.0, 100.0, 10.0));

    harness
        .controller
        .handle_ui_event(
            scrubber,
            UiEvent::PointerDown {
                button: PointerButton::Secondary,
                x: 50.0,
                y: 5.0,
            },
        )
        .unwrap();
    assert!(!harness.has_class(scrubber, "vixen-dragging"));
    assert!(harness.platform.take_scheduled().is_empty());
}

#[test]
fn test_scrubbing_refused_when_errored() {
    let media = HeadlessMedia::new();
    media.add_source(MediaSourceCandidate::new("video/mp4", None, "clip.mp4"));
    let mut harness = Harness::builder().media(media).build();
    harness.media.fail_source(0);
    harness.pump();
    let scrubber = harness.controller.surface().scrubber;
    harness.place(scrubber, Geometry::new(0.0, 0.0, 100.0, 10.0));

    harness
        .controller
        .handle_ui_event(scrubber, pointer_down(50.0, 5.0))
        .unwrap();
    assert!(!harness.controller.surface().scrubber_state.dragging);
}

#[test]
fn test_new_drag_ends_unreleased_drag() {
    let mut harness = Harness::loaded(100.0);
    let scrubber = harness.controller.surface().scrubber;
    let volume = harness.controller.surface().volume;
    harness.place(scrubber, Geometry::new(0.0, 0.0, 200.0, 10.0));
    harness.place(volume, Geometry::new(300.0, 0.0, 100.0, 10.0));

    harness
        .controller
        .handle_ui_event(scrubber, pointer_down(100.0, 5.0))
        .unwrap();
    // the release of the scrub is lost
    harness
        .controller
        .handle_ui_event(volume, pointer_down(350.0, 5.0))
        .unwrap();
    assert!(!harness.controller.surface().scrubber_state.dragging);
    assert!(!harness.has_class(scrubber, "vixen-dragging"));
    assert_eq!(harness.controller.session().current_time, 50.0);

    harness.controller.handle_pointer_up();
    assert!(!harness.controller.surface().volume_state.dragging);

    harness.controller.jump_to(10.0).unwrap();
    let playback = harness.controller.surface().scrubber_playback;
    assert_eq!(harness.controller.ui_state().played_percent, 10.0);
    assert_eq!(harness.dom.style(playback, "width").as_deref(), Some("10.00%"));
}

// ===== Chapters =====

#[test]
fn test_chapters_merge_after_polling() {
    let config = ControllerConfig {
        chapter_poll_max_attempts: 5,
        ..ControllerConfig::default()
    };
    let mut harness = Harness::builder()
        .media(chapter_media())
        .config(config)
        .build();
    assert!(harness.controller.chapters().is_empty());

    let fired = harness.run_timers(50);
    assert_eq!(fired, 5);

    let titles: Vec<&str> = harness
        .controller
        .chapters()
        .iter()
        .map(|cue| cue.text.as_str())
        .collect();
    assert_eq!(titles, ["Intro", "Setup", "Finale"]);
    assert_eq!(
        harness.media.track_mode(TrackKind::Chapters, 1),
        Some(TrackMode::Hidden)
    );

    let selector = harness
        .controller
        .surface()
        .selector(SelectorKind::Chapters)
        .unwrap();
    assert_eq!(selector.len(), 3);
    assert_eq!(harness.dom.text(selector.value), "0:00 Intro");
}

#[test]
fn test_jump_to_chapter() {
    let mut harness = Harness::builder().media(chapter_media()).build();
    harness.media.finish_loading(90.0);
    harness.pump();
    harness.run_timers(500);

    harness.controller.jump_to_chapter(2).unwrap();
    assert_eq!(harness.controller.session().current_time, 30.0);

    let err = harness.controller.jump_to_chapter(9).unwrap_err();
    assert!(matches!(err, ControlError::UnknownChapter(9)));
}

#[test]
fn test_no_chapter_tracks_schedules_nothing() {
    let harness = Harness::loaded(10.0);
    assert!(harness.platform.take_scheduled().is_empty());
    assert!(harness
        .controller
        .surface()
        .selector(SelectorKind::Chapters)
        .is_none());
}

// ===== Fullscreen =====

#[test]
fn test_fullscreen_toggle_with_vendor_api() {
    let mut harness = Harness::builder().flavor(FullscreenFlavor::Webkit).build();
    let surface = harness.controller.surface();
    let (container, button) = (surface.container, surface.fullscreen_button);

    harness
        .controller
        .handle_ui_event(button, UiEvent::Click)
        .unwrap();
    assert!(harness.platform.is_fullscreen());
    assert!(harness.controller.is_fullscreen());
    assert!(harness.has_class(container, "vixen-fullscreen"));
    assert_eq!(harness.dom.text(button), "Exit fullscreen");

    harness.controller.toggle_fullscreen().unwrap();
    assert!(!harness.platform.is_fullscreen());
    assert_eq!(
        harness.platform.invocations(),
        ["webkitRequestFullscreen", "webkitExitFullscreen"]
    );
}

#[test]
fn test_fullscreen_drift_trusts_platform() {
    let mut harness = Harness::builder().build();
    harness.controller.toggle_fullscreen().unwrap();

    harness.platform.force_fullscreen(false);
    harness.controller.update_ui();
    assert!(!harness.controller.is_fullscreen());
    assert!(!harness.has_class(harness.controller.surface().container, "vixen-fullscreen"));

    harness.controller.toggle_fullscreen().unwrap();
    assert!(harness.platform.is_fullscreen());
}

#[test]
fn test_fullscreen_unsupported() {
    let mut harness = Harness::builder().flavor(FullscreenFlavor::None).build();
    let err = harness.controller.toggle_fullscreen().unwrap_err();
    assert!(matches!(err, ControlError::Unsupported(_)));
    assert!(!harness.controller.is_fullscreen());
}

// ===== Remembered volume =====

#[test]
fn test_volume_survives_new_controller() {
    let store = MemoryStore::new();
    let mut first = Harness::builder().store(store.clone()).build();
    first.controller.set_volume(0.3).unwrap();
    assert_eq!(store.get("vixen-volume").as_deref(), Some("0.3"));

    let second = Harness::builder().store(store).id(2).build();
    assert_eq!(second.controller.volume(), 0.3);
    assert_eq!(second.controller.ui_state().volume_percent, 30.0);
}

#[test]
fn test_corrupt_remembered_volume_is_ignored() {
    let mut store = MemoryStore::new();
    store.set("vixen-volume", "loud");
    let harness = Harness::builder().store(store).build();
    assert_eq!(harness.controller.volume(), 1.0);
}

#[test]
fn test_volume_not_persisted_when_disabled() {
    let store = MemoryStore::new();
    let config = ControllerConfig {
        remember_volume: false,
        ..ControllerConfig::default()
    };
    let mut harness = Harness::builder()
        .store(store.clone())
        .config(config)
        .build();
    harness.controller.set_volume(0.4).unwrap();
    assert_eq!(store.get("vixen-volume"), None);

    let mut detached = Harness::builder().without_store().build();
    detached.controller.set_volume(0.4).unwrap();
    assert_eq!(detached.controller.volume(), 0.4);
}

// ===== Subscriptions =====

#[test]
fn test_failing_handlers_do_not_block_others() {
    let mut harness = Harness::loaded(10.0);
    let calls = Rc::new(Cell::new(0));

    harness
        .controller
        .on(UPDATE_UI, |_, _| Err(HandlerError::new("boom")))
        .unwrap();
    harness
        .controller
        .on(UPDATE_UI, |_, _| panic!("handler panicked"))
        .unwrap();
    let counter = Rc::clone(&calls);
    harness
        .controller
        .on(UPDATE_UI, move |_, _| {
            counter.set(counter.get() + 1);
            Ok(())
        })
        .unwrap();

    harness.controller.update_ui();
    harness.controller.update_ui();
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_invalid_subscription_name() {
    let mut harness = Harness::loaded(10.0);
    let err = harness.controller.on("time update", |_, _| Ok(())).unwrap_err();
    assert!(matches!(err, ControlError::InvalidSubscription { .. }));
    assert!(harness.controller.on("", |_, _| Ok(())).is_err());
}

#[test]
fn test_handlers_see_reconciled_controller() {
    let mut harness = Harness::loaded(10.0);
    let seen = Rc::new(RefCell::new(Vec::new()));

    let log = Rc::clone(&seen);
    harness
        .controller
        .on("playing", move |controller, _| {
            log.borrow_mut().push(controller.ui_state().playing);
            Ok(())
        })
        .unwrap();
    let errors = Rc::new(RefCell::new(Vec::new()));
    let indices = Rc::clone(&errors);
    harness
        .controller
        .on("sourceerror", move |_, args| {
            indices.borrow_mut().push(args[0].as_u64());
            Ok(())
        })
        .unwrap();

    harness.controller.play().unwrap();
    harness.pump();
    harness.media.fail_source(2);
    harness.pump();

    assert_eq!(*seen.borrow(), [true]);
    assert_eq!(*errors.borrow(), [Some(2)]);
}

#[test]
fn test_fatalerror_handlers_see_errored_surface() {
    let media = HeadlessMedia::new();
    media.add_source(MediaSourceCandidate::new("video/mp4", None, "clip.mp4"));
    let mut harness = Harness::builder().media(media).build();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let log = Rc::clone(&seen);
    harness
        .controller
        .on(FATAL_ERROR, move |controller, _| {
            log.borrow_mut()
                .push((controller.ui_state().errored, controller.fallback_links().len()));
            Ok(())
        })
        .unwrap();

    harness.media.fail_source(0);
    harness.pump();
    assert_eq!(*seen.borrow(), [(true, 1)]);
}

// ===== Surface events =====

#[test]
fn test_buttons_drive_transport() {
    let mut harness = Harness::loaded(10.0);
    let surface = harness.controller.surface();
    let (play, mute, container) = (surface.play_button, surface.mute_button, surface.container);

    harness.controller.handle_ui_event(play, UiEvent::Click).unwrap();
    harness.pump();
    assert_eq!(harness.controller.lifecycle(), LifecycleState::Playing);

    harness.controller.handle_ui_event(mute, UiEvent::Click).unwrap();
    assert!(harness.has_class(container, "vixen-muted"));
    assert_eq!(harness.dom.text(mute), "Unmute");

    harness.media.external_mute(false);
    harness.pump();
    assert!(!harness.has_class(container, "vixen-muted"));

    harness.controller.handle_ui_event(play, UiEvent::Click).unwrap();
    harness.pump();
    assert_eq!(harness.controller.lifecycle(), LifecycleState::Paused);
}

#[test]
fn test_ended_then_replay() {
    let mut harness = Harness::loaded(10.0);
    harness.controller.play().unwrap();
    harness.pump();
    harness.media.advance(11.0);
    harness.pump();

    assert_eq!(harness.controller.lifecycle(), LifecycleState::Ended);
    assert!(harness.has_class(harness.controller.surface().container, "vixen-ended"));
    assert_eq!(harness.controller.ui_state().remaining, "0:00");

    harness.controller.playpause().unwrap();
    harness.pump();
    assert_eq!(harness.controller.session().current_time, 0.0);
    assert_eq!(harness.controller.lifecycle(), LifecycleState::Playing);
}

#[test]
fn test_resolution_selector_lists_tiers_descending() {
    let mut harness = Harness::builder().media(multi_resolution_media()).build();
    assert_eq!(harness.controller.resolutions(), [360, 720, 1080]);

    let selector = harness
        .controller
        .surface()
        .selector(SelectorKind::Resolution)
        .unwrap();
    let (select, value, wrapper) = (selector.select, selector.value, selector.wrapper);
    assert_eq!(selector.len(), 3);
    assert_eq!(harness.dom.text(value), "1080p");
    assert_eq!(
        harness.dom.attribute(select, "id").as_deref(),
        Some(selector.id())
    );

    harness
        .controller
        .handle_ui_event(select, UiEvent::Change { index: 2 })
        .unwrap();
    assert_eq!(harness.dom.text(value), "360p");
    assert_eq!(harness.media.current_src().as_deref(), Some("clip-360.webm"));
    assert_eq!(harness.media.load_count(), 1);

    harness.controller.handle_ui_event(select, UiEvent::Focus).unwrap();
    assert!(harness.has_class(wrapper, "vixen-focus"));
    harness.controller.handle_ui_event(select, UiEvent::Blur).unwrap();
    assert!(!harness.has_class(wrapper, "vixen-focus"));
}

#[test]
fn test_single_tier_gets_no_resolution_selector() {
    let media = HeadlessMedia::new();
    media.support_type("video/mp4");
    media.add_source(MediaSourceCandidate::new("video/mp4", Some(720), "a.mp4"));
    let harness = Harness::builder().media(media).build();
    assert!(harness
        .controller
        .surface()
        .selector(SelectorKind::Resolution)
        .is_none());
}

#[test]
fn test_captions_selector_offers_off() {
    let media = HeadlessMedia::new();
    let mut info = TrackInfo::new("en", "English");
    info.mode = TrackMode::Showing;
    media.add_track(TrackKind::Captions, HeadlessTrack::new(info));
    let mut harness = Harness::builder().media(media).build();

    let selector = harness
        .controller
        .surface()
        .selector(SelectorKind::Captions)
        .unwrap();
    let (select, value) = (selector.select, selector.value);
    assert_eq!(selector.len(), 2);
    assert_eq!(harness.dom.text(value), "English");

    harness
        .controller
        .handle_ui_event(select, UiEvent::Change { index: 0 })
        .unwrap();
    assert_eq!(
        harness.media.track_mode(TrackKind::Captions, 0),
        Some(TrackMode::Off)
    );
    assert_eq!(harness.dom.text(value), "Off");
}

// ===== Reload =====

#[test]
fn test_load_opens_new_session_after_failure() {
    let mut harness = Harness::builder().media(multi_resolution_media()).build();
    let fatal = Rc::new(Cell::new(0));
    let counter = Rc::clone(&fatal);
    harness
        .controller
        .on(FATAL_ERROR, move |_, _| {
            counter.set(counter.get() + 1);
            Ok(())
        })
        .unwrap();

    for index in 0..4 {
        harness.media.fail_source(index);
    }
    harness.pump();
    assert_eq!(harness.controller.lifecycle(), LifecycleState::Errored);

    harness.controller.load();
    harness.pump();
    assert_eq!(harness.controller.lifecycle(), LifecycleState::Uninitialized);
    assert_eq!(harness.media.load_count(), 1);

    harness.media.finish_loading(30.0);
    harness.pump();
    assert_eq!(harness.controller.lifecycle(), LifecycleState::Ready);

    for index in 0..4 {
        harness.media.fail_source(index);
    }
    harness.pump();
    assert_eq!(fatal.get(), 2);
    assert_eq!(harness.controller.fallback_links().len(), 4);
}

#[test]
fn test_load_keeps_declared_sources() {
    let mut harness = Harness::builder().media(multi_resolution_media()).build();
    harness
        .media
        .add_source(MediaSourceCandidate::new("video/webm", Some(480), "clip-480.webm"));

    harness.controller.load();
    harness.pump();
    assert_eq!(harness.controller.resolutions(), [360, 720, 1080]);
    assert!(matches!(
        harness.controller.select_resolution(480),
        Err(ControlError::UnknownResolution(480))
    ));

    for index in 0..4 {
        harness.media.fail_source(index);
    }
    harness.pump();
    assert_eq!(harness.controller.lifecycle(), LifecycleState::Errored);
    assert_eq!(harness.controller.fallback_links().len(), 4);
}

// ===== Configuration =====

#[test]
fn test_inverted_skip_bounds_rejected_at_construction() {
    let config = ControllerConfig {
        skip_min_secs: 30.0,
        skip_max_secs: 5.0,
        ..ControllerConfig::default()
    };
    let result = Harness::builder().config(config).try_build();
    assert!(matches!(result, Err(ControlError::InvalidConfig(_))));
}

// ===== Registry =====

#[test]
fn test_registry_rejects_second_controller_for_resource() {
    let mut registry = ControllerRegistry::new();
    let first = Harness::builder().id(7).build();
    let second = Harness::builder().id(7).build();
    let other = Harness::builder().id(8).build();

    registry.attach(first.controller).unwrap();
    let err = registry.attach(second.controller).unwrap_err();
    assert!(matches!(err, ControlError::AlreadyAttached(ResourceId(7))));
    registry.attach(other.controller).unwrap();
    assert_eq!(registry.len(), 2);

    registry
        .get_mut(ResourceId(8))
        .unwrap()
        .set_volume(0.2)
        .unwrap();
    let detached = registry.detach(ResourceId(8)).unwrap();
    assert_eq!(detached.volume(), 0.2);
    assert!(!registry.contains(ResourceId(8)));
}
