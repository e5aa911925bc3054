//! Scroll coordination
//!
//! Picks the page's [`ViewportSource`] at initialization and bridges scroll
//! and resize updates to whoever needs them.
//!
//! # State Machine
//!
//! ```text
//! Uninitialized ──backend ok──▶ Smooth ──destroy──▶ Destroyed
//!       │
//!       ├──missing container / backend error──▶ Fallback
//!       └──reduced motion / disabled───────────▶ Native
//! ```
//!
//! Smooth scrolling keeps the document itself still and reports positions
//! through the proxy. Both non-smooth states restore normal document
//! scrolling; only `Fallback` marks the page with `smooth-scroll-failed`.

use tracing::{debug, info, warn};
use unveil_platform::{
    Document, NodeId, ScrollTarget, ScrollToOptions, SharedDocument, SmoothScroll,
    SmoothScrollBackend, SmoothScrollConfig,
};

use crate::viewport::ViewportSource;

/// Selector for the element the smooth-scroll engine drives
pub const SCROLL_CONTAINER_SELECTOR: &str = "[data-scroll-container]";
/// Body class after smooth scrolling started
pub const INITIALIZED_CLASS: &str = "smooth-scroll-initialized";
/// Body class after smooth scrolling failed to start
pub const FAILED_CLASS: &str = "smooth-scroll-failed";

/// Coordinator lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScrollState {
    #[default]
    Uninitialized,
    Smooth,
    /// Smooth scrolling was not attempted
    Native,
    /// Smooth scrolling was attempted and failed
    Fallback,
    Destroyed,
}

/// Inputs to the scroll state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollEvent {
    Started,
    Skipped,
    Failed,
    Destroy,
}

impl ScrollState {
    pub fn on_event(&self, event: ScrollEvent) -> Option<Self> {
        match (self, event) {
            (ScrollState::Uninitialized, ScrollEvent::Started) => Some(ScrollState::Smooth),
            (ScrollState::Uninitialized, ScrollEvent::Skipped) => Some(ScrollState::Native),
            (ScrollState::Uninitialized, ScrollEvent::Failed) => Some(ScrollState::Fallback),
            (ScrollState::Destroyed, _) => None,
            (_, ScrollEvent::Destroy) => Some(ScrollState::Destroyed),
            _ => None,
        }
    }
}

/// Why smooth scrolling is not used
#[derive(Clone, Debug, PartialEq)]
pub enum ScrollFallback {
    ReducedMotion,
    Disabled,
    MissingContainer,
    BackendFailed(String),
}

/// Owns the smooth-scroll instance and the active viewport source
pub struct ScrollCoordinator {
    document: SharedDocument,
    state: ScrollState,
    source: ViewportSource,
    scroll: Option<Box<dyn SmoothScroll>>,
    fallback: Option<ScrollFallback>,
}

impl ScrollCoordinator {
    /// Start smooth scrolling, falling back to native intersection
    ///
    /// Smooth scrolling is skipped under reduced motion or when `config`
    /// disables it. A missing `[data-scroll-container]` or a backend error
    /// falls back with normal scrolling restored.
    pub fn init(
        document: SharedDocument,
        backend: &mut dyn SmoothScrollBackend,
        config: &SmoothScrollConfig,
        reduced_motion: bool,
    ) -> Self {
        let mut coordinator = Self::uninitialized(document);
        if reduced_motion {
            coordinator.skip(ScrollFallback::ReducedMotion);
            return coordinator;
        }
        if !config.smooth {
            coordinator.skip(ScrollFallback::Disabled);
            return coordinator;
        }

        let container = coordinator.document.borrow().query(SCROLL_CONTAINER_SELECTOR);
        let Some(container) = container else {
            warn!("Smooth scroll container not found, using native scrolling");
            coordinator.fail(ScrollFallback::MissingContainer);
            return coordinator;
        };

        match backend.create(container, config) {
            Ok(scroll) => {
                let scroll_y = scroll.scroll_y();
                coordinator.scroll = Some(scroll);
                coordinator.source = ViewportSource::SmoothScrollProxy { scroll_y };
                coordinator.transition(ScrollEvent::Started);
                coordinator.add_body_class(INITIALIZED_CLASS);
                info!("Smooth scroll initialized");
            }
            Err(err) => {
                warn!("Smooth scroll failed to start: {}", err);
                coordinator.fail(ScrollFallback::BackendFailed(err.to_string()));
            }
        }
        coordinator
    }

    /// Native scrolling without attempting smooth scroll
    pub fn native(document: SharedDocument) -> Self {
        let mut coordinator = Self::uninitialized(document);
        coordinator.skip(ScrollFallback::Disabled);
        coordinator
    }

    fn uninitialized(document: SharedDocument) -> Self {
        Self {
            document,
            state: ScrollState::Uninitialized,
            source: ViewportSource::NativeIntersection,
            scroll: None,
            fallback: None,
        }
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    pub fn source(&self) -> &ViewportSource {
        &self.source
    }

    pub fn is_smooth(&self) -> bool {
        self.scroll.is_some()
    }

    pub fn fallback(&self) -> Option<&ScrollFallback> {
        self.fallback.as_ref()
    }

    /// Current scroll offset from the active source
    pub fn scroll_y(&self) -> f32 {
        match &self.scroll {
            Some(scroll) => scroll.scroll_y(),
            None => self.document.borrow().scroll_y(),
        }
    }

    /// A scroll update arrived
    pub fn on_scroll(&mut self, y: f32) {
        self.source.set_scroll(y);
    }

    /// The viewport was resized
    ///
    /// The smooth proxy recomputes its limits; native observers are
    /// recomputed by the document itself.
    pub fn on_resize(&mut self) {
        if let Some(scroll) = self.scroll.as_mut() {
            scroll.update();
            debug!("Smooth scroll updated after resize");
        }
    }

    /// Scroll to an element with the active mechanism
    pub fn scroll_to_node(&mut self, node: NodeId) {
        match self.scroll.as_mut() {
            Some(scroll) => {
                scroll.scroll_to(ScrollTarget::Node(node), &ScrollToOptions::default());
                let y = scroll.scroll_y();
                self.source.set_scroll(y);
            }
            None => {
                let top = self.document.borrow().document_rect(node).map(|r| r.top());
                if let Some(top) = top {
                    self.document.borrow_mut().scroll_to(top);
                }
            }
        }
    }

    /// Tear down the smooth-scroll instance
    pub fn destroy(&mut self) {
        if let Some(mut scroll) = self.scroll.take() {
            scroll.destroy();
            debug!("Smooth scroll destroyed");
        }
        self.transition(ScrollEvent::Destroy);
    }

    fn skip(&mut self, reason: ScrollFallback) {
        debug!("Smooth scroll skipped: {:?}", reason);
        self.fallback = Some(reason);
        self.restore_native_scrolling();
        self.transition(ScrollEvent::Skipped);
    }

    fn fail(&mut self, reason: ScrollFallback) {
        self.fallback = Some(reason);
        self.restore_native_scrolling();
        self.add_body_class(FAILED_CLASS);
        self.transition(ScrollEvent::Failed);
    }

    fn transition(&mut self, event: ScrollEvent) {
        if let Some(next) = self.state.on_event(event) {
            self.state = next;
        }
    }

    fn add_body_class(&self, class: &str) {
        let mut doc = self.document.borrow_mut();
        if let Some(body) = doc.body() {
            doc.add_class(body, class);
        }
    }

    fn restore_native_scrolling(&self) {
        let mut doc = self.document.borrow_mut();
        restore_native_scrolling(&mut *doc);
    }
}

/// Undo the styling a smooth-scroll engine relies on
pub fn restore_native_scrolling(doc: &mut dyn Document) {
    if let Some(body) = doc.body() {
        doc.set_style(body, "overflow", "auto");
    }
    if let Some(container) = doc.query(SCROLL_CONTAINER_SELECTOR) {
        doc.set_style(container, "height", "auto");
        doc.set_style(container, "overflow", "visible");
    }
}
