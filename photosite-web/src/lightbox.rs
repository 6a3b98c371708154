//! Lightbox controller
//!
//! Two states, closed and open, driving a full-resolution overlay. Clicks are
//! routed through one `EventRouter` registered at the document root: the
//! router walks the activated element's ancestor path and dispatches on the
//! first element carrying a registered marker class. Galleries rendered after
//! the router was built need no re-binding because nothing is bound to them.
//!
//! The marker and attribute names here are the same ones the renderer emits.

use std::collections::BTreeMap;

pub const TRIGGER_CLASS: &str = "js-lightbox-trigger";
pub const CLOSE_CLASS: &str = "lightbox-close";
pub const BACKDROP_CLASS: &str = "lightbox-backdrop";
pub const DATA_FULL: &str = "data-full";
pub const DATA_TITLE: &str = "data-title";
pub const OVERLAY_ID: &str = "lightbox";
pub const OVERLAY_IMAGE_ID: &str = "lightbox-image";
pub const OVERLAY_CAPTION_ID: &str = "lightbox-caption";

/// Document element as seen by the event router
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Attribute naming the element's own resource: `href` for links,
    /// `src` otherwise
    pub fn source_attr(&self) -> &'static str {
        if self.tag().eq_ignore_ascii_case("a") {
            "href"
        } else {
            "src"
        }
    }

    /// Attribute value; empty values count as absent
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Keyboard key relevant to the overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other(String),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` name
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Key::Escape,
            other => Key::Other(other.to_string()),
        }
    }
}

/// Input event
#[derive(Debug, Clone, Copy)]
pub enum UiEvent<'a> {
    /// Click; `path` runs from the activated element up to the document root
    Click { path: &'a [Element] },
    KeyDown(&'a Key),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LightboxState {
    #[default]
    Closed,
    Open,
}

/// Overlay content and page effects
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    state: LightboxState,
    pub image_src: String,
    pub image_alt: String,
    pub caption: String,
    /// `aria-hidden` on the overlay element
    pub aria_hidden: bool,
    /// Page scroll suppressed while open
    pub scroll_locked: bool,
}

impl Default for Overlay {
    fn default() -> Self {
        Self {
            state: LightboxState::Closed,
            image_src: String::new(),
            image_alt: String::new(),
            caption: String::new(),
            aria_hidden: true,
            scroll_locked: false,
        }
    }
}

impl Overlay {
    pub fn state(&self) -> LightboxState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == LightboxState::Open
    }

    /// Show the trigger's full-resolution image; replaces content if open
    pub fn show(&mut self, trigger: &Element) {
        let alt = trigger.attr("alt").unwrap_or_default();
        self.image_src = trigger
            .attr(DATA_FULL)
            .or_else(|| trigger.attr(trigger.source_attr()))
            .unwrap_or_default()
            .to_string();
        self.image_alt = alt.to_string();
        self.caption = trigger.attr(DATA_TITLE).unwrap_or(alt).to_string();
        self.aria_hidden = false;
        self.scroll_locked = true;
        self.state = LightboxState::Open;
    }

    pub fn hide(&mut self) {
        self.state = LightboxState::Closed;
        self.aria_hidden = true;
        self.image_src.clear();
        self.scroll_locked = false;
    }
}

type ClickHandler<S> = Box<dyn Fn(&mut S, &Element) + Send + Sync>;

/// Delegated click routing keyed by marker class
pub struct EventRouter<S> {
    routes: Vec<(String, ClickHandler<S>)>,
}

impl<S> Default for EventRouter<S> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<S> EventRouter<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for clicks on (or inside) elements with `marker`
    pub fn on<F>(&mut self, marker: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&mut S, &Element) + Send + Sync + 'static,
    {
        self.routes.push((marker.into(), Box::new(handler)));
        self
    }

    /// Dispatch to the closest marked element on `path`
    ///
    /// Returns `true` when a handler ran.
    pub fn dispatch_click(&self, state: &mut S, path: &[Element]) -> bool {
        for element in path {
            if let Some((_, handler)) = self
                .routes
                .iter()
                .find(|(marker, _)| element.has_class(marker))
            {
                handler(state, element);
                return true;
            }
        }
        false
    }
}

/// Lightbox controller: overlay state plus its delegated click routes
pub struct Lightbox {
    overlay: Overlay,
    router: EventRouter<Overlay>,
}

impl Default for Lightbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lightbox {
    pub fn new() -> Self {
        let mut router = EventRouter::new();
        router
            .on(TRIGGER_CLASS, |overlay: &mut Overlay, el| overlay.show(el))
            .on(CLOSE_CLASS, |overlay: &mut Overlay, _| overlay.hide())
            .on(BACKDROP_CLASS, |overlay: &mut Overlay, _| overlay.hide());

        Self {
            overlay: Overlay::default(),
            router,
        }
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn is_open(&self) -> bool {
        self.overlay.is_open()
    }

    /// Handle one event; returns `true` when it was consumed
    pub fn handle(&mut self, event: UiEvent<'_>) -> bool {
        match event {
            UiEvent::Click { path } => self.router.dispatch_click(&mut self.overlay, path),
            UiEvent::KeyDown(Key::Escape) if self.overlay.is_open() => {
                self.overlay.hide();
                true
            }
            UiEvent::KeyDown(_) => false,
        }
    }
}
