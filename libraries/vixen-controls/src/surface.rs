//! Control surface construction
//!
//! The surface is built once through the [`Dom`] collaborator: a container
//! that takes the media element's place in the tree, the media element
//! itself, and a toolbar holding the controls. Every named control is
//! recorded in a registry and carries the namespaced class of its name.

use crate::error::{ControlError, Result};
use rand::{thread_rng, Rng};
use serde::Serialize;
use std::collections::BTreeMap;
use vixen_core::{ClassOp, Dom, ElementHandle, TrackKind};

/// Builder over one element
///
/// Class names are namespaced (`<namespace>-<name>`) and added only when
/// missing.
pub struct Element<'a> {
    dom: &'a mut dyn Dom,
    namespace: &'a str,
    handle: ElementHandle,
}

impl<'a> Element<'a> {
    /// Create a new element of `kind`
    pub fn create(dom: &'a mut dyn Dom, namespace: &'a str, kind: &str) -> Self {
        let handle = dom.create(kind);
        Self {
            dom,
            namespace,
            handle,
        }
    }

    /// Build on an existing element
    pub fn wrap(dom: &'a mut dyn Dom, namespace: &'a str, handle: ElementHandle) -> Self {
        Self {
            dom,
            namespace,
            handle,
        }
    }

    pub fn handle(&self) -> ElementHandle {
        self.handle
    }

    #[must_use]
    pub fn append(self, child: ElementHandle) -> Self {
        self.dom.append(self.handle, child);
        self
    }

    /// Add the namespaced class `name`
    #[must_use]
    pub fn class(self, name: &str) -> Self {
        self.toggle_class(name, true)
    }

    /// Remove the namespaced class `name`
    #[must_use]
    pub fn remove_class(self, name: &str) -> Self {
        self.toggle_class(name, false)
    }

    /// Add or remove the namespaced class `name`
    #[must_use]
    pub fn toggle_class(self, name: &str, on: bool) -> Self {
        let class = namespaced(self.namespace, name);
        if self.dom.has_class(self.handle, &class) != on {
            self.dom.set_class(self.handle, &class, ClassOp::when(on));
        }
        self
    }

    #[must_use]
    pub fn text(self, text: &str) -> Self {
        self.dom.set_text(self.handle, text);
        self
    }

    /// Forward `event` of this element to the controller
    #[must_use]
    pub fn on(self, event: &str) -> Self {
        self.dom.listen(self.handle, event);
        self
    }

    #[must_use]
    pub fn style(self, property: &str, value: &str) -> Self {
        self.dom.set_style(self.handle, property, value);
        self
    }

    #[must_use]
    pub fn attr(self, name: &str, value: &str) -> Self {
        self.dom.set_attribute(self.handle, name, value);
        self
    }

    /// ARIA role
    #[must_use]
    pub fn role(self, role: &str) -> Self {
        self.attr("role", role)
    }

    /// Make a custom element behave like a native control for assistive tech
    #[must_use]
    pub fn ctrl(self, role: &str, tab_index: i32) -> Self {
        self.attr("tabindex", &tab_index.to_string()).role(role)
    }

    /// Finish building
    pub fn build(self) -> ElementHandle {
        self.handle
    }
}

/// `<namespace>-<name>`
pub fn namespaced(namespace: &str, name: &str) -> String {
    format!("{}-{}", namespace, name)
}

/// Named controls of a surface
#[derive(Debug, Clone, Default, Serialize)]
pub struct ControlRegistry {
    namespace: String,
    controls: BTreeMap<String, ElementHandle>,
}

impl ControlRegistry {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            controls: BTreeMap::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Create an element and record it under `place`
    pub fn create(&mut self, dom: &mut dyn Dom, kind: &str, place: &str) -> Result<ElementHandle> {
        let handle = dom.create(kind);
        self.adopt(dom, handle, place)?;
        Ok(handle)
    }

    /// Record an existing element under `place`
    pub fn adopt(&mut self, dom: &mut dyn Dom, handle: ElementHandle, place: &str) -> Result<()> {
        if self.controls.contains_key(place) {
            return Err(ControlError::DuplicateControl(place.to_string()));
        }
        Element::wrap(dom, &self.namespace, handle).class(place).build();
        self.controls.insert(place.to_string(), handle);
        Ok(())
    }

    /// Element recorded under `place`
    pub fn get(&self, place: &str) -> Option<ElementHandle> {
        self.controls.get(place).copied()
    }

    /// Place name of an element
    pub fn place_of(&self, handle: ElementHandle) -> Option<&str> {
        self.controls
            .iter()
            .find(|(_, &h)| h == handle)
            .map(|(place, _)| place.as_str())
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}

/// Orientation and manipulation flags of a slider control
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ControlState {
    pub vertical: bool,
    pub dragging: bool,
}

/// Which selector a widget drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorKind {
    Resolution,
    Captions,
    Audio,
    Video,
    Chapters,
}

impl SelectorKind {
    /// Registry place name of the selector's wrapper
    pub fn place(self) -> &'static str {
        match self {
            Self::Resolution => "resolutionselector",
            Self::Captions => "captionselector",
            Self::Audio => "audioselector",
            Self::Video => "videoselector",
            Self::Chapters => "chapterselector",
        }
    }

    /// Visible label text
    pub fn label(self) -> &'static str {
        match self {
            Self::Resolution => "Quality",
            Self::Captions => "Captions",
            Self::Audio => "Audio",
            Self::Video => "Video",
            Self::Chapters => "Chapters",
        }
    }

    /// Selector of a selectable track group
    pub fn for_track(kind: TrackKind) -> Option<Self> {
        match kind {
            TrackKind::Captions => Some(Self::Captions),
            TrackKind::Audio => Some(Self::Audio),
            TrackKind::Video => Some(Self::Video),
            TrackKind::Chapters => None,
        }
    }
}

/// What picking a selector option does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorAction {
    Resolution(u32),
    Track(TrackKind, Option<usize>),
    Chapter(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct SelectorOption {
    text: String,
    action: SelectorAction,
}

/// Labelled drop-down: wrapper, label with a value span, and a `select`
#[derive(Debug, Clone, Serialize)]
pub struct Selector {
    pub wrapper: ElementHandle,
    pub label: ElementHandle,
    pub value: ElementHandle,
    pub select: ElementHandle,
    id: String,
    options: Vec<SelectorOption>,
    current: Option<usize>,
}

impl Selector {
    fn build(dom: &mut dyn Dom, namespace: &str, wrapper: ElementHandle, label_text: &str) -> Self {
        let id = namespaced(namespace, &format!("rs-{}", thread_rng().gen::<u32>()));

        let value = Element::create(dom, namespace, "span")
            .class("currentselectorvalue")
            .attr("aria-hidden", "true")
            .build();
        let label = Element::create(dom, namespace, "label")
            .class("selectorlabel")
            .text(label_text)
            .attr("for", &id)
            .append(value)
            .build();
        let select = Element::create(dom, namespace, "select")
            .attr("id", &id)
            .on("change")
            .on("focus")
            .on("blur")
            .build();
        Element::wrap(dom, namespace, wrapper)
            .class("dropdownwrapper")
            .append(label)
            .append(select)
            .build();

        Self {
            wrapper,
            label,
            value,
            select,
            id,
            options: Vec::new(),
            current: None,
        }
    }

    /// Id shared by the `select` and the label's `for`
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Index of the displayed option
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Append an option; the first one seeds the displayed value
    pub fn add_item(&mut self, dom: &mut dyn Dom, text: &str, action: SelectorAction) {
        let position = self.options.len();
        let option = dom.create("option");
        dom.set_attribute(option, "value", &position.to_string());
        dom.set_text(option, text);
        dom.append(self.select, option);

        self.options.push(SelectorOption {
            text: text.to_string(),
            action,
        });
        if position == 0 {
            self.show(dom, 0);
        }
    }

    /// Display option `index` without running its action
    pub fn show(&mut self, dom: &mut dyn Dom, index: usize) {
        if let Some(option) = self.options.get(index) {
            dom.set_text(self.value, &option.text);
            self.current = Some(index);
        }
    }

    /// Display the option bound to `action`, if any
    pub fn show_action(&mut self, dom: &mut dyn Dom, action: SelectorAction) {
        if let Some(index) = self.options.iter().position(|o| o.action == action) {
            self.show(dom, index);
        }
    }

    /// User picked option `index`; returns the action to run
    pub fn choose(&mut self, dom: &mut dyn Dom, index: usize) -> Option<SelectorAction> {
        let action = self.options.get(index)?.action;
        self.show(dom, index);
        Some(action)
    }

    /// Reflect keyboard focus on the wrapper
    pub fn set_focus(&self, dom: &mut dyn Dom, namespace: &str, focused: bool) {
        Element::wrap(dom, namespace, self.wrapper)
            .toggle_class("focus", focused)
            .build();
    }
}

/// Handles and per-control flags of a built surface
#[derive(Debug, Clone, Serialize)]
pub struct ControlSurface {
    pub media: ElementHandle,
    pub container: ElementHandle,
    pub toolbar: ElementHandle,
    pub play_button: ElementHandle,
    pub elapsed: ElementHandle,
    pub remaining: ElementHandle,
    pub scrubber: ElementHandle,
    pub scrubber_buffer: ElementHandle,
    pub scrubber_playback: ElementHandle,
    pub mute_button: ElementHandle,
    pub volume: ElementHandle,
    pub volume_fill: ElementHandle,
    pub fullscreen_button: ElementHandle,
    pub scrubber_state: ControlState,
    pub volume_state: ControlState,
    registry: ControlRegistry,
    toolbar_items: Vec<ElementHandle>,
    selectors: BTreeMap<SelectorKind, Selector>,
    fallback: Option<ElementHandle>,
}

impl ControlSurface {
    /// Build the surface around `media` and put it in the media element's place
    pub fn build(dom: &mut dyn Dom, media: ElementHandle, namespace: &str) -> Result<Self> {
        let mut registry = ControlRegistry::new(namespace);
        let ns = namespace;

        let container = registry.create(dom, "div", "container")?;
        let toolbar = registry.create(dom, "div", "toolbar")?;

        let play_button = registry.create(dom, "button", "playbutton")?;
        Element::wrap(dom, ns, play_button).text("Play").on("click").build();

        let elapsed = registry.create(dom, "label", "elapsed")?;
        Element::wrap(dom, ns, elapsed).text("0:00").build();

        let scrubber_buffer = registry.create(dom, "div", "scrubberbuffer")?;
        let scrubber_playback = registry.create(dom, "div", "scrubberplayback")?;
        let scrubber = registry.create(dom, "div", "scrubber")?;
        Element::wrap(dom, ns, scrubber)
            .ctrl("slider", 0)
            .attr("aria-label", "Seek")
            .on("pointerdown")
            .append(scrubber_buffer)
            .append(scrubber_playback)
            .build();

        let remaining = registry.create(dom, "label", "remaining")?;
        Element::wrap(dom, ns, remaining).text("0:00").build();

        let mute_button = registry.create(dom, "button", "mutebutton")?;
        Element::wrap(dom, ns, mute_button).text("Mute").on("click").build();

        let volume_fill = registry.create(dom, "div", "volumefill")?;
        let volume = registry.create(dom, "div", "volume")?;
        Element::wrap(dom, ns, volume)
            .ctrl("slider", 0)
            .attr("aria-label", "Volume")
            .on("pointerdown")
            .append(volume_fill)
            .build();

        let fullscreen_button = registry.create(dom, "button", "fullscreenbutton")?;
        Element::wrap(dom, ns, fullscreen_button)
            .text("Fullscreen")
            .on("click")
            .build();

        let toolbar_items = vec![
            play_button,
            elapsed,
            scrubber,
            remaining,
            mute_button,
            volume,
            fullscreen_button,
        ];
        for &item in &toolbar_items {
            dom.append(toolbar, item);
        }

        dom.replace(media, container);
        Element::wrap(dom, ns, container)
            .append(media)
            .append(toolbar)
            .build();
        registry.adopt(dom, media, "media")?;

        tracing::debug!(controls = registry.len(), "control surface built");
        Ok(Self {
            media,
            container,
            toolbar,
            play_button,
            elapsed,
            remaining,
            scrubber,
            scrubber_buffer,
            scrubber_playback,
            mute_button,
            volume,
            volume_fill,
            fullscreen_button,
            scrubber_state: ControlState::default(),
            volume_state: ControlState::default(),
            registry,
            toolbar_items,
            selectors: BTreeMap::new(),
            fallback: None,
        })
    }

    pub fn namespace(&self) -> &str {
        self.registry.namespace()
    }

    pub fn registry(&self) -> &ControlRegistry {
        &self.registry
    }

    /// Toolbar children other than the scrubber
    pub fn scrubber_siblings(&self) -> impl Iterator<Item = ElementHandle> + '_ {
        self.toolbar_items
            .iter()
            .copied()
            .filter(move |&item| item != self.scrubber)
    }

    /// Recompute slider orientation from their current geometry
    pub fn refresh_orientation(&mut self, dom: &dyn Dom) {
        self.scrubber_state.vertical = dom.geometry(self.scrubber).is_vertical();
        self.volume_state.vertical = dom.geometry(self.volume).is_vertical();
    }

    /// Add a selector to the toolbar
    pub fn add_selector(&mut self, dom: &mut dyn Dom, kind: SelectorKind) -> Result<&mut Selector> {
        let wrapper = self.registry.create(dom, "div", kind.place())?;
        let selector = Selector::build(dom, self.registry.namespace(), wrapper, kind.label());
        dom.append(self.toolbar, wrapper);
        self.toolbar_items.push(wrapper);
        Ok(self.selectors.entry(kind).or_insert(selector))
    }

    pub fn selector(&self, kind: SelectorKind) -> Option<&Selector> {
        self.selectors.get(&kind)
    }

    pub fn selector_mut(&mut self, kind: SelectorKind) -> Option<&mut Selector> {
        self.selectors.get_mut(&kind)
    }

    /// Selector whose `select` element is `handle`
    pub fn selector_for(&self, handle: ElementHandle) -> Option<SelectorKind> {
        self.selectors
            .iter()
            .find(|(_, selector)| selector.select == handle)
            .map(|(kind, _)| *kind)
    }

    /// Container of the fallback download list, creating it on first use
    pub fn fallback_list(&mut self, dom: &mut dyn Dom) -> Result<ElementHandle> {
        if let Some(list) = self.fallback {
            return Ok(list);
        }
        let list = self.registry.create(dom, "div", "fallback")?;
        dom.append(self.container, list);
        self.fallback = Some(list);
        Ok(list)
    }

    /// Set or clear the `dragging` flag and class of a slider
    pub fn set_dragging(&mut self, dom: &mut dyn Dom, scrubber: bool, dragging: bool) {
        let handle = if scrubber {
            self.scrubber_state.dragging = dragging;
            self.scrubber
        } else {
            self.volume_state.dragging = dragging;
            self.volume
        };
        Element::wrap(dom, self.registry.namespace(), handle)
            .toggle_class("dragging", dragging)
            .build();
    }
}
