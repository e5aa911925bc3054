//! Page animator
//!
//! Owns every per-page component and routes [`PageEvent`]s to them. One
//! animator per page load: [`PageAnimator::init`] scans the document for the
//! configured profile, [`PageAnimator::handle_event`] drives it from then on,
//! and [`PageEvent::Unload`] tears everything down.
//!
//! # Example
//!
//! ```ignore
//! use unveil_app::prelude::*;
//!
//! let mut animator = PageAnimator::new(config, document, engine, Box::new(backend));
//! let report = animator.init()?;
//! animator.handle_event(PageEvent::Scroll { y: 640.0 });
//! ```

use rustc_hash::FxHashMap;
use tracing::{debug, error, info, warn};
use unveil_animation::{
    AnimationContext, AnimationError, AnimationProfile, DeviceProfile, Easing, ParamMap,
    PlaybackMode, PlaybackState, SharedEngine, Tween,
};
use unveil_layout::{
    InteractionEffects, ParallaxLayer, ScrollCoordinator, ScrollFallback, TriggerRegistry,
    ViewportSource,
};
use unveil_platform::{Document, NodeId, PageEvent, SharedDocument, SmoothScrollBackend};

use crate::config::UnveilConfig;
use crate::error::{Result, UnveilError};

/// Body class on handheld devices
pub const MOBILE_CLASS: &str = "mobile-device";
/// Body class when the user prefers reduced motion
pub const REDUCED_MOTION_CLASS: &str = "reduced-motion";
/// Body class while playback is reduced for a low frame rate
pub const LOW_PERFORMANCE_CLASS: &str = "low-performance";

/// Lifecycle of a [`PageAnimator`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimatorState {
    Created,
    Running,
    Unloaded,
}

/// Where a wired link leads
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavLink {
    /// In-page anchor; scrolls to the element with this id
    Anchor(String),
    /// Same-site page; plays the exit transition, then navigates
    Page(String),
}

/// What a page scan wired up
#[derive(Debug, Default)]
pub struct InitReport {
    pub profile: AnimationProfile,
    /// Scroll-triggered elements registered
    pub registered: usize,
    /// Elements already revealed by the initial viewport
    pub revealed: usize,
    /// Tweens played at load without waiting for scroll
    pub immediate: usize,
    pub parallax: usize,
    pub effects: usize,
    pub links: usize,
    pub smooth_scroll: bool,
    pub fallback: Option<ScrollFallback>,
    /// Elements that could not be wired; the rest of the page still is
    pub errors: Vec<AnimationError>,
}

impl InitReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Animation state for one page
pub struct PageAnimator {
    pub(crate) config: UnveilConfig,
    pub(crate) document: SharedDocument,
    pub(crate) engine: SharedEngine,
    backend: Box<dyn SmoothScrollBackend>,
    pub(crate) ctx: AnimationContext,
    scroll: Option<ScrollCoordinator>,
    pub(crate) triggers: TriggerRegistry,
    pub(crate) parallax: ParallaxLayer,
    pub(crate) interactions: InteractionEffects,
    pub(crate) links: FxHashMap<NodeId, NavLink>,
    state: AnimatorState,
}

impl PageAnimator {
    /// Create an animator; the device profile is detected right away
    pub fn new(
        config: UnveilConfig,
        document: SharedDocument,
        engine: SharedEngine,
        backend: Box<dyn SmoothScrollBackend>,
    ) -> Self {
        let device = {
            let doc = document.borrow();
            DeviceProfile::detect(&doc.user_agent(), doc.viewport().width)
        };
        let ctx = AnimationContext::new(config.settings, device);
        Self {
            triggers: TriggerRegistry::new(document.clone(), engine.clone()),
            parallax: ParallaxLayer::new(document.clone(), engine.clone()),
            interactions: InteractionEffects::new(document.clone(), engine.clone()),
            links: FxHashMap::default(),
            config,
            document,
            engine,
            backend,
            ctx,
            scroll: None,
            state: AnimatorState::Created,
        }
    }

    /// Set up scrolling, scan the page and reveal what is already in view
    pub fn init(&mut self) -> Result<InitReport> {
        match self.state {
            AnimatorState::Created => {}
            AnimatorState::Running => return Err(UnveilError::AlreadyInitialized),
            AnimatorState::Unloaded => return Err(UnveilError::Unloaded),
        }

        let profile = self.config.profile;
        let mut report = InitReport {
            profile,
            ..InitReport::default()
        };
        let reduced_motion = self.document.borrow().prefers_reduced_motion();

        self.apply_device();
        if reduced_motion {
            self.ctx
                .playback_mut()
                .apply_reduced_motion(&mut *self.engine.borrow_mut());
            self.set_body_class(REDUCED_MOTION_CLASS, true);
        }

        let scroll = match profile {
            AnimationProfile::Full => ScrollCoordinator::init(
                self.document.clone(),
                self.backend.as_mut(),
                &self.config.smooth_scroll,
                reduced_motion,
            ),
            AnimationProfile::Simple => ScrollCoordinator::native(self.document.clone()),
        };
        report.smooth_scroll = scroll.is_smooth();
        report.fallback = scroll.fallback().cloned();
        self.scroll = Some(scroll);

        match profile {
            AnimationProfile::Full => self.scan_full(&mut report),
            AnimationProfile::Simple => self.scan_simple(&mut report),
        }
        self.state = AnimatorState::Running;

        report.registered = self.triggers.len();
        report.parallax = self.parallax.len();
        report.effects = self.interactions.len();
        report.links = self.links.len();
        report.revealed = self.refresh_triggers();
        self.parallax.update(&self.source());

        info!(
            "Animations initialized ({} profile): {} elements, {} parallax, {} effects, smooth scroll {}",
            profile.name(),
            report.registered,
            report.parallax,
            report.effects,
            if report.smooth_scroll { "on" } else { "off" }
        );
        if !report.is_clean() {
            warn!("{} elements could not be wired", report.errors.len());
        }
        Ok(report)
    }

    /// React to one page event
    ///
    /// Events before [`init`](Self::init) or after unload are ignored.
    pub fn handle_event(&mut self, event: PageEvent) {
        if self.state != AnimatorState::Running {
            debug!("Ignoring {:?} while {:?}", event, self.state);
            return;
        }
        match event {
            PageEvent::Scroll { y } => self.on_scroll(y),
            PageEvent::Resize { width, height } => self.on_resize(width, height),
            PageEvent::Frame { timestamp_ms } => {
                let changed = self
                    .ctx
                    .playback_mut()
                    .on_frame(timestamp_ms, &mut *self.engine.borrow_mut());
                if changed.is_some() {
                    self.sync_playback_class();
                }
            }
            PageEvent::Pointer(pointer) => {
                let source = self.source();
                self.interactions.handle_pointer(pointer, &source);
            }
            PageEvent::Click { node } => self.on_click(node),
            PageEvent::Intersection(record) => {
                self.triggers.handle_records(&[record]);
            }
            PageEvent::Unload => self.unload(),
        }
    }

    /// Feed a frame-rate sample measured outside the animator
    pub fn record_fps(&mut self, fps: u32) -> Option<PlaybackMode> {
        if self.state != AnimatorState::Running {
            return None;
        }
        let changed = self
            .ctx
            .playback_mut()
            .record_fps(fps, &mut *self.engine.borrow_mut());
        if changed.is_some() {
            self.sync_playback_class();
        }
        changed
    }

    /// Reveal every element matching `selector` with a named preset
    ///
    /// An unknown preset fails before anything is wired. One-shot presets
    /// are registered for triggering and fire immediately when already in
    /// view; `parallax` joins the parallax layer instead. Returns the number
    /// of elements wired.
    pub fn reveal(&mut self, selector: &str, preset: &str, overrides: ParamMap) -> Result<usize> {
        if self.state == AnimatorState::Unloaded {
            return Err(UnveilError::Unloaded);
        }
        self.ctx.motion(preset, &overrides)?;

        let nodes = self.document.borrow().query_all(selector);
        let mut wired = 0;
        for node in nodes {
            self.wire_preset(node, preset, &overrides, None)?;
            wired += 1;
        }
        if self.state == AnimatorState::Running {
            self.refresh_triggers();
            self.parallax.update(&self.source());
        }
        Ok(wired)
    }

    pub fn state(&self) -> AnimatorState {
        self.state
    }

    pub fn config(&self) -> &UnveilConfig {
        &self.config
    }

    pub fn context(&self) -> &AnimationContext {
        &self.ctx
    }

    pub fn playback(&self) -> &PlaybackState {
        self.ctx.playback().state()
    }

    pub fn scroll(&self) -> Option<&ScrollCoordinator> {
        self.scroll.as_ref()
    }

    pub fn triggers(&self) -> &TriggerRegistry {
        &self.triggers
    }

    pub fn parallax(&self) -> &ParallaxLayer {
        &self.parallax
    }

    pub fn interactions(&self) -> &InteractionEffects {
        &self.interactions
    }

    pub fn link(&self, node: NodeId) -> Option<&NavLink> {
        self.links.get(&node)
    }

    /// The active viewport source; native until scrolling is set up
    pub fn source(&self) -> ViewportSource {
        self.scroll
            .as_ref()
            .map(|scroll| *scroll.source())
            .unwrap_or(ViewportSource::NativeIntersection)
    }

    fn apply_device(&mut self) {
        let device = *self.ctx.device();
        if device.is_mobile {
            self.ctx.apply_engine_defaults(&mut *self.engine.borrow_mut());
            self.set_body_class(MOBILE_CLASS, true);
            info!("Mobile device detected, animations tuned");
        } else if device.is_tablet {
            debug!("Tablet detected");
        }
    }

    /// Fire whatever the active source reports as eligible
    ///
    /// In native mode the observer only reports elements intersecting its
    /// root, so elements a jump carried past the top edge are caught up from
    /// geometry. Both modes then fire the same elements for the same offset.
    fn refresh_triggers(&mut self) -> usize {
        let source = self.source();
        if source.is_smooth() {
            self.triggers.evaluate(&source)
        } else {
            let records = self.document.borrow_mut().take_intersection_records();
            let reported = self.triggers.handle_records(&records);
            reported + self.triggers.evaluate(&source)
        }
    }

    fn on_scroll(&mut self, y: f32) {
        if let Some(scroll) = self.scroll.as_mut() {
            scroll.on_scroll(y);
        }
        self.interactions.invalidate_geometry();
        let fired = self.refresh_triggers();
        let moved = self.parallax.update(&self.source());
        if fired > 0 {
            debug!("Scroll to {}: {} fired, {} parallax", y, fired, moved);
        }
    }

    fn on_resize(&mut self, width: f32, height: f32) {
        debug!("Resize to {}x{}", width, height);
        if let Some(scroll) = self.scroll.as_mut() {
            scroll.on_resize();
        }
        self.interactions.invalidate_geometry();
        self.refresh_triggers();
        self.parallax.update(&self.source());
    }

    fn on_click(&mut self, node: NodeId) {
        let Some(link) = self.links.get(&node).cloned() else {
            return;
        };
        match link {
            NavLink::Anchor(id) => {
                let target = self.document.borrow().element_by_id(&id);
                let Some(target) = target else {
                    debug!("Anchor target #{} not found", id);
                    return;
                };
                let Some(scroll) = self.scroll.as_mut() else {
                    return;
                };
                scroll.scroll_to_node(target);
                let y = scroll.scroll_y();
                self.on_scroll(y);
            }
            NavLink::Page(href) => self.transition_out(href),
        }
    }

    /// Fade the page out, then navigate
    fn transition_out(&mut self, href: String) {
        let main = self.document.borrow().query("main");
        let Some(main) = main else {
            self.document.borrow_mut().navigate(&href);
            return;
        };
        debug!("Page transition to {}", href);
        let document = self.document.clone();
        let tween = Tween::to(
            [main],
            ParamMap::new().with("opacity", 0.0).with("y", -50.0),
        )
        .duration(0.5)
        .ease(Easing::Power3In)
        .on_complete(move |_| document.borrow_mut().navigate(&href));
        self.engine.borrow_mut().play(tween);
    }

    fn unload(&mut self) {
        self.engine.borrow_mut().kill_all();
        if let Some(scroll) = self.scroll.as_mut() {
            scroll.destroy();
        }
        self.document.borrow_mut().disconnect_observers();
        self.triggers.clear();
        self.parallax.clear();
        self.interactions.clear();
        self.links.clear();
        self.state = AnimatorState::Unloaded;
        info!("Page animations torn down");
    }

    fn sync_playback_class(&self) {
        let low = self.ctx.playback().state().low_performance;
        self.set_body_class(LOW_PERFORMANCE_CLASS, low);
    }

    pub(crate) fn set_body_class(&self, class: &str, on: bool) {
        let mut doc = self.document.borrow_mut();
        if let Some(body) = doc.body() {
            if on {
                doc.add_class(body, class);
            } else {
                doc.remove_class(body, class);
            }
        }
    }

    pub(crate) fn report_error(&self, report: &mut InitReport, err: AnimationError) {
        error!("Failed to wire animation: {}", err);
        report.errors.push(err);
    }
}
