//! Shared fixture for the integration tests
//!
//! Wires a controller to headless collaborators and keeps clones of them
//! so tests can drive the simulated resource and inspect the tree.

#![allow(dead_code)]

use vixen_controls::{Collaborators, ControllerConfig, MediaController, MediaResource};
use vixen_core::headless::{
    FullscreenFlavor, HeadlessDom, HeadlessMedia, HeadlessPlatform, MemoryStore,
};
use vixen_core::{ElementHandle, Geometry, MediaSourceCandidate, ResourceId, Scheduled};

pub struct Harness {
    pub controller: MediaController,
    pub media: HeadlessMedia,
    pub dom: HeadlessDom,
    pub platform: HeadlessPlatform,
    pub store: MemoryStore,
    pub body: ElementHandle,
}

pub struct HarnessBuilder {
    media: HeadlessMedia,
    flavor: FullscreenFlavor,
    config: ControllerConfig,
    store: MemoryStore,
    persist: bool,
    id: ResourceId,
}

impl HarnessBuilder {
    pub fn media(mut self, media: HeadlessMedia) -> Self {
        self.media = media;
        self
    }

    pub fn flavor(mut self, flavor: FullscreenFlavor) -> Self {
        self.flavor = flavor;
        self
    }

    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(mut self, store: MemoryStore) -> Self {
        self.store = store;
        self
    }

    pub fn without_store(mut self) -> Self {
        self.persist = false;
        self
    }

    pub fn id(mut self, id: u64) -> Self {
        self.id = ResourceId(id);
        self
    }

    pub fn build(self) -> Harness {
        self.try_build().expect("controller should build")
    }

    pub fn try_build(self) -> vixen_controls::Result<Harness> {
        let (dom, body, element) = HeadlessDom::with_media_element("video");
        let platform = HeadlessPlatform::new(self.flavor);
        let store = self.store;

        let controller = MediaController::new(
            MediaResource {
                id: self.id,
                element,
                host: Box::new(self.media.clone()),
            },
            Collaborators {
                dom: Box::new(dom.clone()),
                platform: Box::new(platform.clone()),
                store: if self.persist {
                    Some(Box::new(store.clone()))
                } else {
                    None
                },
            },
            self.config,
        )?;

        Ok(Harness {
            controller,
            media: self.media,
            dom,
            platform,
            store,
            body,
        })
    }
}

impl Harness {
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            media: HeadlessMedia::new(),
            flavor: FullscreenFlavor::Standard,
            config: ControllerConfig::default(),
            store: MemoryStore::new(),
            persist: true,
            id: ResourceId(1),
        }
    }

    /// A controller over a resource that loaded `duration` seconds of media
    pub fn loaded(duration: f64) -> Self {
        let mut harness = Self::builder().build();
        harness.media.finish_loading(duration);
        harness.pump();
        harness
    }

    /// Forward queued media events until the resource is quiet
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        for _ in 0..100 {
            let events = self.media.take_events();
            if events.is_empty() {
                break;
            }
            delivered += events.len();
            for event in events {
                self.controller.handle_media_event(event);
            }
        }
        delivered
    }

    /// Fire every timer scheduled so far, pumping events after each
    pub fn fire_timers(&mut self) -> Vec<Scheduled> {
        let scheduled = self.platform.take_scheduled();
        for timer in &scheduled {
            self.controller.on_timer(timer.timer);
            self.pump();
        }
        scheduled
    }

    /// Keep firing timers until none are scheduled
    pub fn run_timers(&mut self, limit: usize) -> usize {
        let mut fired = 0;
        while fired < limit {
            let batch = self.fire_timers();
            if batch.is_empty() {
                break;
            }
            fired += batch.len();
        }
        fired
    }

    /// Give a control a size and screen position
    pub fn place(&self, handle: ElementHandle, geometry: Geometry) {
        self.dom.set_geometry(handle, geometry);
        self.dom.set_offset_parent(handle, None);
    }

    pub fn has_class(&self, handle: ElementHandle, class: &str) -> bool {
        self.dom.classes(handle).iter().any(|c| c == class)
    }
}

/// A resource with three playable resolutions and one unplayable source
pub fn multi_resolution_media() -> HeadlessMedia {
    let media = HeadlessMedia::new();
    media.support_type("video/webm");
    media.add_source(MediaSourceCandidate::new("video/webm", Some(1080), "clip-1080.webm"));
    media.add_source(MediaSourceCandidate::new("video/webm", Some(720), "clip-720.webm"));
    media.add_source(MediaSourceCandidate::new("video/ogg", Some(720), "clip-720.ogv"));
    media.add_source(MediaSourceCandidate::new("video/webm", Some(360), "clip-360.webm"));
    media
}
