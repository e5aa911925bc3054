//! Page-level behavior tests against the headless platform

use std::cell::RefCell;
use std::rc::Rc;

use unveil_animation::{
    AnimationError, AnimationProfile, Easing, ParamMap, PlaybackMode, SplitMode, TweenEngine,
};
use unveil_layout::{ScrollFallback, FAILED_CLASS, INITIALIZED_CLASS};
use unveil_platform::{Document, NodeId, PageEvent, PointerEvent, Size};
use unveil_platform_headless::{
    HeadlessSmoothScrollBackend, MemoryDocument, NodeSpec, RecordingEngine, SharedScrollLog,
};

use crate::prelude::*;
use crate::{AnimatorState, NavLink, LOW_PERFORMANCE_CLASS, MOBILE_CLASS, REDUCED_MOTION_CLASS};

const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148";

struct Harness {
    doc: Rc<RefCell<MemoryDocument>>,
    engine: Rc<RefCell<RecordingEngine>>,
    log: SharedScrollLog,
    animator: PageAnimator,
}

impl Harness {
    fn new(doc: MemoryDocument, config: UnveilConfig, smooth_fails: bool) -> Self {
        let doc = Rc::new(RefCell::new(doc));
        let engine = Rc::new(RefCell::new(RecordingEngine::new()));
        let mut backend = HeadlessSmoothScrollBackend::new(doc.clone());
        if smooth_fails {
            backend = backend.failing("scroll engine unavailable");
        }
        let log = backend.log();
        let animator = PageAnimator::new(config, doc.clone(), engine.clone(), Box::new(backend));
        Self {
            doc,
            engine,
            log,
            animator,
        }
    }

    fn full(doc: MemoryDocument) -> Self {
        Self::new(doc, UnveilConfig::default(), false)
    }

    fn scroll(&mut self, y: f32) {
        self.doc.borrow_mut().scroll_to(y);
        self.animator.handle_event(PageEvent::Scroll { y });
    }

    fn node(&self, selector: &str) -> NodeId {
        self.doc.borrow().query(selector).unwrap()
    }

    fn body_has(&self, class: &str) -> bool {
        let doc = self.doc.borrow();
        doc.has_class(doc.body_id(), class)
    }

    fn tweens_on(&self, selector: &str) -> usize {
        let node = self.node(selector);
        self.engine.borrow().records_for(node).len()
    }

    fn triggered(&self) -> Vec<NodeId> {
        self.animator
            .triggers()
            .iter()
            .filter(|(_, e)| e.is_triggered())
            .map(|(_, e)| e.trigger())
            .collect()
    }
}

fn landing_page(with_container: bool) -> MemoryDocument {
    let mut doc = MemoryDocument::new(Size::new(1280.0, 800.0));
    let hero = NodeSpec::new("section").class("hero").at(0.0, 800.0).children([
        NodeSpec::new("h1").text("Reveal every section").at(100.0, 80.0),
        NodeSpec::new("p")
            .class("sub-headline")
            .text("Scroll driven")
            .at(200.0, 40.0),
        NodeSpec::new("a")
            .class("button-primary")
            .attr("href", "#features")
            .text("See features")
            .at(300.0, 50.0),
    ]);
    let problem = NodeSpec::new("section")
        .class("problem-section")
        .at(1000.0, 600.0)
        .children([
            NodeSpec::new("div").class("stat-number").text("1500+").at(1100.0, 60.0),
            NodeSpec::new("div").class("stat-label").text("teams").at(1170.0, 30.0),
            NodeSpec::new("div").class("text-column").at(1100.0, 400.0),
        ]);
    let solution = NodeSpec::new("section")
        .id("features")
        .class("solution-section")
        .at(2000.0, 1000.0)
        .children([
            NodeSpec::new("h2").text("Features").at(2000.0, 60.0),
            NodeSpec::new("div").class("solution-card").at(2100.0, 300.0),
            NodeSpec::new("div").class("solution-card").at(2100.0, 300.0),
            NodeSpec::new("div").class("solution-card").at(2100.0, 300.0),
        ]);
    let mut main = NodeSpec::new("main").at(0.0, 4000.0).children([
        hero,
        problem,
        solution,
        NodeSpec::new("img").class("bg-element").at(3200.0, 400.0),
        NodeSpec::new("a")
            .attr("href", "/pricing")
            .text("Pricing")
            .at(3700.0, 20.0),
    ]);
    if with_container {
        main = main.attr("data-scroll-container", "");
    }
    doc.append_to_body(&main);
    doc
}

#[test]
fn test_full_profile_smooth_init() {
    let mut page = Harness::full(landing_page(true));
    let report = page.animator.init().unwrap();

    assert!(report.is_clean());
    assert!(report.smooth_scroll);
    assert_eq!(report.profile, AnimationProfile::Full);
    assert!(page.body_has(INITIALIZED_CLASS));
    assert_eq!(page.log.borrow().created, 1);
    assert_eq!(page.animator.state(), AnimatorState::Running);
    assert_eq!(report.parallax, 1);
    assert_eq!(report.links, 2);

    // hero is in view at load, the problem section is not
    assert!(report.revealed > 0);
    assert_eq!(page.tweens_on(".sub-headline"), 2);
    assert_eq!(page.tweens_on(".stat-number"), 0);
    let main = page.node("main");
    let entrance = page.engine.borrow().records_for(main)[0].clone();
    assert_eq!(entrance.duration, 0.8);
    assert_eq!(entrance.from.unwrap().number("y"), Some(30.0));
}

#[test]
fn test_each_element_fires_exactly_once() {
    let mut page = Harness::full(landing_page(true));
    page.animator.init().unwrap();

    // slide-left and counter both trigger on the stat
    page.scroll(500.0);
    assert_eq!(page.tweens_on(".stat-number"), 2);
    assert_eq!(page.tweens_on(".text-column"), 1);

    let issued = page.engine.borrow().records().len();
    page.scroll(500.0);
    page.scroll(0.0);
    page.scroll(500.0);
    assert_eq!(page.engine.borrow().records().len(), issued);
}

#[test]
fn test_stat_counter_renders_final_text() {
    let mut page = Harness::full(landing_page(true));
    page.animator.init().unwrap();
    page.scroll(500.0);
    page.engine.borrow_mut().run_to_completion(16.0);

    let stat = page.node(".stat-number");
    assert_eq!(page.doc.borrow().text_content(stat).unwrap(), "1500+");
}

#[test]
fn test_solution_cards_stagger_in_order() {
    let mut page = Harness::full(landing_page(true));
    page.animator.init().unwrap();
    page.scroll(1500.0);

    let cards = page.doc.borrow().query_all(".solution-card");
    let engine = page.engine.borrow();
    let group = engine
        .records()
        .iter()
        .find(|r| r.targets.as_slice() == cards.as_slice())
        .unwrap();
    assert_eq!(group.stagger, Some(0.2));
    assert_eq!(group.from.as_ref().unwrap().number("y"), Some(60.0));
    for index in 0..3 {
        let expected = group.delay + index as f32 * 0.2;
        assert!((group.start_for(index) - expected).abs() < 1e-6);
    }
}

#[test]
fn test_missing_container_restores_native_scrolling() {
    let mut page = Harness::full(landing_page(false));
    let report = page.animator.init().unwrap();

    assert!(!report.smooth_scroll);
    assert_eq!(report.fallback, Some(ScrollFallback::MissingContainer));
    assert!(page.body_has(FAILED_CLASS));
    assert!(!page.body_has(INITIALIZED_CLASS));
    let doc = page.doc.borrow();
    assert_eq!(doc.style(doc.body_id(), "overflow").as_deref(), Some("auto"));
}

#[test]
fn test_native_and_smooth_reveal_the_same_elements() {
    let mut smooth = Harness::full(landing_page(true));
    let mut native = Harness::new(landing_page(true), UnveilConfig::default(), true);
    smooth.animator.init().unwrap();
    let report = native.animator.init().unwrap();
    assert!(matches!(report.fallback, Some(ScrollFallback::BackendFailed(_))));
    assert_eq!(smooth.triggered(), native.triggered());

    for y in [500.0, 700.0, 1500.0, 2700.0] {
        smooth.scroll(y);
        native.scroll(y);
        assert_eq!(smooth.triggered(), native.triggered(), "after scrolling to {}", y);
    }
    assert_eq!(smooth.animator.triggers().pending_count(), 0);
}

#[test]
fn test_native_catches_up_elements_a_jump_skipped() {
    let mut smooth = Harness::full(landing_page(true));
    let mut native = Harness::new(landing_page(true), UnveilConfig::default(), true);
    smooth.animator.init().unwrap();
    native.animator.init().unwrap();

    // the problem section ends up entirely above the viewport
    smooth.scroll(2700.0);
    native.scroll(2700.0);
    assert_eq!(smooth.triggered(), native.triggered());
    assert_eq!(native.animator.triggers().pending_count(), 0);
    assert_eq!(native.tweens_on(".stat-label"), 1);
    assert_eq!(native.tweens_on(".text-column"), 1);
    assert!(!native.doc.borrow().is_observed(native.node(".stat-label")));

    // nothing fires twice afterwards
    let issued = native.engine.borrow().records().len();
    native.scroll(0.0);
    native.scroll(2700.0);
    assert_eq!(native.engine.borrow().records().len(), issued);
}

#[test]
fn test_reduced_motion_is_near_static_for_the_session() {
    let doc = landing_page(true).with_reduced_motion(true);
    let mut page = Harness::full(doc);
    let report = page.animator.init().unwrap();

    assert_eq!(report.fallback, Some(ScrollFallback::ReducedMotion));
    assert_eq!(page.log.borrow().created, 0);
    assert!(page.body_has(REDUCED_MOTION_CLASS));
    assert!(!page.body_has(FAILED_CLASS));
    assert_eq!(page.engine.borrow().time_scale(), 0.01);

    assert_eq!(page.animator.record_fps(10), None);
    assert_eq!(page.animator.record_fps(60), None);
    for frame in 0..200 {
        page.animator.handle_event(PageEvent::Frame {
            timestamp_ms: frame as f64 * 100.0,
        });
    }
    assert_eq!(page.engine.borrow().time_scale(), 0.01);
    assert_eq!(page.animator.playback().mode, PlaybackMode::NearStatic);
    assert!(!page.body_has(LOW_PERFORMANCE_CLASS));
}

#[test]
fn test_fps_samples_drive_playback_mode() {
    let mut page = Harness::full(landing_page(true));
    page.animator.init().unwrap();

    let mut modes = Vec::new();
    let mut low = Vec::new();
    for fps in [45, 25, 25, 55] {
        page.animator.record_fps(fps);
        modes.push(page.animator.playback().mode);
        low.push(page.body_has(LOW_PERFORMANCE_CLASS));
    }
    assert_eq!(
        modes,
        [
            PlaybackMode::Full,
            PlaybackMode::Reduced,
            PlaybackMode::Reduced,
            PlaybackMode::Full
        ]
    );
    assert_eq!(low, [false, true, true, false]);
    assert_eq!(page.engine.borrow().time_scale(), 1.0);
}

#[test]
fn test_slow_frames_reduce_playback() {
    let mut page = Harness::full(landing_page(true));
    page.animator.init().unwrap();

    // 20 frames a second
    for frame in 0..=20 {
        page.animator.handle_event(PageEvent::Frame {
            timestamp_ms: frame as f64 * 50.0,
        });
    }
    assert_eq!(page.animator.playback().mode, PlaybackMode::Reduced);
    assert_eq!(page.engine.borrow().time_scale(), 0.8);
    assert!(page.body_has(LOW_PERFORMANCE_CLASS));
}

#[test]
fn test_simple_profile() {
    let config = UnveilConfig {
        profile: AnimationProfile::Simple,
        ..UnveilConfig::default()
    };
    let mut doc = landing_page(true);
    doc.append_to_body(
        &NodeSpec::new("section").class("steps").at(5000.0, 400.0).children([
            NodeSpec::new("div").class("step-card").at(5100.0, 200.0),
            NodeSpec::new("div").class("step-card").at(5100.0, 200.0),
        ]),
    );
    let mut page = Harness::new(doc, config, false);
    let report = page.animator.init().unwrap();

    assert!(!report.smooth_scroll);
    assert_eq!(report.fallback, Some(ScrollFallback::Disabled));
    assert_eq!(page.log.borrow().created, 0);
    assert_eq!(report.immediate, 4);
    assert_eq!(report.parallax, 0);
    assert_eq!(report.links, 0);

    let h1 = page.node(".hero h1");
    {
        let engine = page.engine.borrow();
        let title = engine.records_for(h1)[0];
        assert_eq!(title.duration, 1.2);
        assert_eq!(title.delay, 0.2);
        assert_eq!(title.from.as_ref().unwrap().number("scale"), Some(0.9));
        assert_eq!(title.from.as_ref().unwrap().number("y"), Some(50.0));
    }
    // the title is not split in the simple profile
    assert!(page.doc.borrow().query_all(".hero h1 .word").is_empty());

    let button = page.node(".hero .button-primary");
    assert_eq!(page.animator.interactions().effects(button).len(), 1);

    // cards trigger at 85% of the viewport, 680px
    page.scroll(4000.0);
    assert_eq!(page.tweens_on(".step-card"), 0);
    page.scroll(4450.0);
    let cards = page.doc.borrow().query_all(".step-card");
    let engine = page.engine.borrow();
    let delays: Vec<f32> = cards
        .iter()
        .map(|&card| engine.records_for(card)[0].delay)
        .collect();
    assert_eq!(delays.len(), 2);
    assert!((delays[0] - 0.3).abs() < 1e-6);
    assert!((delays[1] - 0.4).abs() < 1e-6);
}

#[test]
fn test_anchor_click_scrolls_with_active_mechanism() {
    let mut page = Harness::full(landing_page(true));
    page.animator.init().unwrap();
    let button = page.node(".hero .button-primary");
    assert_eq!(
        page.animator.link(button),
        Some(&NavLink::Anchor("features".to_string()))
    );

    page.animator.handle_event(PageEvent::Click { node: button });
    assert_eq!(page.log.borrow().scroll_tos.len(), 1);
    assert_eq!(page.animator.scroll().unwrap().scroll_y(), 2000.0);
    assert_eq!(page.tweens_on("#features h2"), 2);

    let mut native = Harness::new(landing_page(true), UnveilConfig::default(), true);
    native.animator.init().unwrap();
    let button = native.node(".hero .button-primary");
    native.animator.handle_event(PageEvent::Click { node: button });
    assert_eq!(native.doc.borrow().scroll_y(), 2000.0);
    assert_eq!(native.tweens_on("#features h2"), 2);
}

#[test]
fn test_page_link_plays_exit_then_navigates() {
    let mut page = Harness::full(landing_page(true));
    page.animator.init().unwrap();
    let link = page.node("a[href=\"/pricing\"]");

    page.animator.handle_event(PageEvent::Click { node: link });
    assert!(page.doc.borrow().navigations().is_empty());
    {
        let engine = page.engine.borrow();
        let exit = engine.records().last().unwrap();
        assert_eq!(exit.to.number("opacity"), Some(0.0));
        assert_eq!(exit.to.number("y"), Some(-50.0));
        assert_eq!(exit.duration, 0.5);
        assert_eq!(exit.ease, Easing::Power3In);
    }

    page.engine.borrow_mut().run_to_completion(16.0);
    assert_eq!(page.doc.borrow().navigations(), ["/pricing".to_string()]);
}

#[test]
fn test_lazy_animation_errors_do_not_stop_wiring() {
    let mut doc = landing_page(true);
    doc.append_to_body(&NodeSpec::new("div").attr("data-lazy-animation", "spin").at(100.0, 50.0));
    doc.append_to_body(&NodeSpec::new("div").attr("data-lazy-animation", "scale").at(150.0, 50.0));
    doc.append_to_body(&NodeSpec::new("div").class("fade-in").at(200.0, 50.0));
    let mut page = Harness::full(doc);
    let report = page.animator.init().unwrap();

    assert_eq!(
        report.errors,
        vec![AnimationError::UnknownPreset("spin".to_string())]
    );
    assert_eq!(page.tweens_on(".fade-in"), 1);
    let scaled = page.node("[data-lazy-animation=\"scale\"]");
    assert!(page.doc.borrow().has_class(scaled, "animate-scale"));
}

#[test]
fn test_lazy_special_presets_use_their_own_wiring() {
    let mut doc = landing_page(true);
    let drifting = doc.append_to_body(
        &NodeSpec::new("div")
            .attr("data-lazy-animation", "parallax")
            .attr("data-scroll-speed", "0.4")
            .at(3000.0, 200.0),
    );
    let heading = doc.append_to_body(
        &NodeSpec::new("div")
            .attr("data-lazy-animation", "text-reveal")
            .text("Built for speed")
            .at(1300.0, 50.0),
    );
    let stat = doc.append_to_body(
        &NodeSpec::new("div")
            .attr("data-lazy-animation", "counter")
            .text("250")
            .at(1400.0, 40.0),
    );
    let mut page = Harness::full(doc);
    let report = page.animator.init().unwrap();
    assert!(report.is_clean());

    let items = page.animator.parallax().items();
    let item = items.iter().find(|item| item.node == drifting).unwrap();
    assert!((item.speed - 0.4).abs() < 1e-6);
    assert!(page.animator.triggers().iter().all(|(_, e)| e.trigger() != drifting));

    let words = page
        .doc
        .borrow()
        .query_within(heading, SplitMode::Words.target_selector());
    assert_eq!(words.len(), 3);

    page.scroll(1000.0);
    assert!(page.engine.borrow().records_for(drifting).is_empty());
    assert_eq!(page.engine.borrow().records_for(words[0]).len(), 1);
    assert!(page.doc.borrow().has_class(heading, "animate-text-reveal"));
    assert!(page.doc.borrow().has_class(stat, "animate-counter"));

    page.engine.borrow_mut().run_to_completion(16.0);
    assert_eq!(page.doc.borrow().text_content(stat).as_deref(), Some("250"));
    let counted = page.engine.borrow().records_for(stat)[0].to.number("value");
    assert_eq!(counted, Some(250.0));

    page.scroll(2700.0);
    let y = page
        .engine
        .borrow()
        .values(drifting)
        .and_then(|v| v.number("yPercent"))
        .unwrap();
    assert!(y < 0.0);
}

#[test]
fn test_lazy_counter_without_number_is_reported() {
    let mut doc = landing_page(true);
    doc.append_to_body(
        &NodeSpec::new("div")
            .attr("data-lazy-animation", "counter")
            .text("soon")
            .at(1400.0, 40.0),
    );
    let mut page = Harness::full(doc);
    let report = page.animator.init().unwrap();
    assert!(matches!(
        report.errors.as_slice(),
        [AnimationError::InvalidParameter { key, .. }] if key == "target"
    ));
}

#[test]
fn test_image_reveal_uses_its_own_threshold() {
    let mut doc = landing_page(true);
    doc.append_to_body(&NodeSpec::new("img").class("image-reveal").at(1400.0, 300.0));
    let mut page = Harness::full(doc);
    page.animator.init().unwrap();
    let image = page.node(".image-reveal");

    // top at 700: below the default line, above the 90% one
    page.scroll(700.0);
    assert!(page.doc.borrow().has_class(image, "revealed"));
    let engine = page.engine.borrow();
    let reveal = engine.records_for(image)[0];
    assert_eq!(reveal.duration, 0.1);
    assert_eq!(reveal.to.number("opacity"), Some(1.0));
}

#[test]
fn test_parallax_follows_scroll() {
    let mut page = Harness::full(landing_page(true));
    page.animator.init().unwrap();
    let bg = page.node(".bg-element");
    assert!(page.engine.borrow().values(bg).is_none());

    // top 500 of 800 with height 400: a quarter through
    page.scroll(2700.0);
    let y = page
        .engine
        .borrow()
        .values(bg)
        .and_then(|v| v.number("yPercent"))
        .unwrap();
    assert!((y + 6.25).abs() < 1e-4);
}

#[test]
fn test_mobile_device_tuning() {
    let doc = landing_page(true).with_user_agent(IPHONE);
    let mut page = Harness::full(doc);
    page.animator.init().unwrap();

    assert!(page.body_has(MOBILE_CLASS));
    assert_eq!(page.engine.borrow().defaults(), (0.6, Easing::Power2Out));
    let item = page.animator.parallax().items()[0];
    assert!((item.speed - 0.25).abs() < 1e-6);
}

#[test]
fn test_hover_effects_respond_to_pointer() {
    let mut page = Harness::full(landing_page(true));
    page.animator.init().unwrap();
    let card = page.doc.borrow().query_all(".solution-card")[0];
    let before = page.engine.borrow().records().len();

    page.animator
        .handle_event(PageEvent::Pointer(PointerEvent::Entered { node: card }));
    let engine = page.engine.borrow();
    assert_eq!(engine.records().len(), before + 1);
    assert_eq!(engine.records().last().unwrap().to.number("scale"), Some(1.03));
}

#[test]
fn test_reveal_by_selector() {
    let mut doc = landing_page(true);
    doc.append_to_body(&NodeSpec::new("div").class("late").at(300.0, 50.0));
    let mut page = Harness::full(doc);
    page.animator.init().unwrap();

    let err = page
        .animator
        .reveal(".late", "bogus", ParamMap::new())
        .unwrap_err();
    assert!(matches!(
        err,
        UnveilError::Animation(AnimationError::UnknownPreset(ref name)) if name == "bogus"
    ));

    let registered = page
        .animator
        .reveal(".late", "scale", ParamMap::new().with("duration", 0.4))
        .unwrap();
    assert_eq!(registered, 1);
    assert_eq!(page.tweens_on(".late"), 1);
    assert_eq!(page.animator.reveal(".missing", "fade", ParamMap::new()).unwrap(), 0);
}

#[test]
fn test_reveal_parallax_joins_the_parallax_layer() {
    let mut doc = landing_page(true);
    let late = doc.append_to_body(&NodeSpec::new("div").class("late-bg").at(2500.0, 300.0));
    let mut page = Harness::full(doc);
    page.animator.init().unwrap();
    let layers = page.animator.parallax().len();
    let registered = page.animator.triggers().len();

    let wired = page
        .animator
        .reveal(".late-bg", "parallax", ParamMap::new().with("speed", 0.2))
        .unwrap();
    assert_eq!(wired, 1);
    assert_eq!(page.animator.parallax().len(), layers + 1);
    assert_eq!(page.animator.triggers().len(), registered);

    page.scroll(2500.0);
    assert!(page.engine.borrow().records_for(late).is_empty());
    let y = page
        .engine
        .borrow()
        .values(late)
        .and_then(|v| v.number("yPercent"))
        .unwrap();
    // top at 0 of 800 with height 300: 8/11 through
    assert!((y + 10.0 * 8.0 / 11.0).abs() < 1e-3);
}

#[test]
fn test_unload_tears_everything_down() {
    let mut page = Harness::new(landing_page(true), UnveilConfig::default(), true);
    page.animator.init().unwrap();
    assert!(page.doc.borrow().observed_count() > 0);

    page.animator.handle_event(PageEvent::Unload);
    assert_eq!(page.animator.state(), AnimatorState::Unloaded);
    assert_eq!(page.engine.borrow().kill_count(), 1);
    assert_eq!(page.doc.borrow().observed_count(), 0);
    assert!(page.animator.triggers().is_empty());
    assert!(page.animator.parallax().is_empty());
    assert!(page.animator.interactions().is_empty());

    let issued = page.engine.borrow().records().len();
    page.scroll(2000.0);
    assert_eq!(page.engine.borrow().records().len(), issued);
    assert!(matches!(page.animator.init(), Err(UnveilError::Unloaded)));
}

#[test]
fn test_smooth_unload_destroys_backend() {
    let mut page = Harness::full(landing_page(true));
    page.animator.init().unwrap();
    page.animator.handle_event(PageEvent::Unload);
    assert!(page.log.borrow().destroyed);
}

#[test]
fn test_events_before_init_are_ignored() {
    let mut page = Harness::full(landing_page(true));
    page.scroll(1500.0);
    assert!(page.engine.borrow().records().is_empty());
    page.animator.init().unwrap();
    assert!(matches!(
        page.animator.init(),
        Err(UnveilError::AlreadyInitialized)
    ));
}
