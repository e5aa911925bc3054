//! Page scan
//!
//! Finds the animatable parts of a page and wires them up. The full profile
//! reveals almost everything on scroll and adds parallax, counters, text
//! splitting and pointer effects. The simple profile plays the hero at load,
//! fades sections and cards on scroll and scales the primary buttons.

use tracing::{debug, warn};
use unveil_animation::{AnimationError, Counter, Easing, ParamMap, PresetKind, SplitMode, Tween};
use unveil_layout::{AnimatableElement, Effect, HoverScale};
use unveil_platform::{Document, NodeId};

use crate::animator::{InitReport, NavLink, PageAnimator};

const IMAGE_REVEAL_THRESHOLD: f32 = 0.9;
const SIMPLE_CARD_THRESHOLD: f32 = 0.85;

impl PageAnimator {
    pub(crate) fn scan_full(&mut self, report: &mut InitReport) {
        if let Some(main) = self.first("main") {
            let tween = Tween::from_to(
                [main],
                ParamMap::new().with("opacity", 0.0).with("y", 30.0),
                ParamMap::new().with("opacity", 1.0).with("y", 0.0),
            )
            .duration(0.8)
            .ease(Easing::Power3Out);
            self.engine.borrow_mut().play(tween);
            report.immediate += 1;
        }

        self.scan_hero(report);
        self.scan_sections(report);
        self.scan_text(report);
        self.scan_counters(report);
        self.scan_parallax(report);
        self.scan_enhanced(report);
        self.scan_lazy(report);
        self.scan_hover();
        self.scan_links();
    }

    pub(crate) fn scan_simple(&mut self, report: &mut InitReport) {
        let ease = Easing::Power3Out.to_string();

        if let Some(main) = self.first("main") {
            let tween = Tween::from_to(
                [main],
                ParamMap::new().with("opacity", 0.0).with("scale", 0.95),
                ParamMap::new().with("opacity", 1.0).with("scale", 1.0),
            )
            .duration(1.2)
            .ease(Easing::Power3Out);
            self.engine.borrow_mut().play(tween);
            report.immediate += 1;
        }

        let hero = [
            (
                ".hero h1",
                ParamMap::new()
                    .with("y", 50.0)
                    .with("scale", 0.9)
                    .with("duration", 1.2)
                    .with("delay", 0.2),
            ),
            (
                ".hero .sub-headline",
                ParamMap::new().with("y", 30.0).with("duration", 1.0).with("delay", 0.5),
            ),
            (
                ".hero .button-primary",
                ParamMap::new().with("y", 20.0).with("duration", 1.0).with("delay", 0.8),
            ),
        ];
        for (selector, overrides) in hero {
            let targets: Vec<NodeId> = self.first(selector).into_iter().collect();
            self.play_now(targets, "fade", overrides.with("ease", ease.as_str()), report);
        }

        let section = ParamMap::new()
            .with("y", 50.0)
            .with("duration", 1.0)
            .with("ease", ease.as_str());
        self.register_each("section:not(.hero)", "fade", &section, report);

        let cards = self.all(".solution-card, .step-card");
        for (index, node) in cards.into_iter().enumerate() {
            let element = self.element([node]).map(|e| {
                e.preset("fade")
                    .overrides(
                        ParamMap::new()
                            .with("y", 30.0)
                            .with("duration", 0.8)
                            .with("delay", index as f32 * 0.1)
                            .with("ease", ease.as_str()),
                    )
                    .threshold(SIMPLE_CARD_THRESHOLD)
            });
            self.register(element, report);
        }

        self.add_effect(".button-primary", Effect::HoverScale(HoverScale::glow_button()));
    }

    fn scan_hero(&mut self, report: &mut InitReport) {
        let title = self.first(".hero h1");
        let element = self.element(title).map(|e| {
            e.split_text(SplitMode::Words)
                .overrides(ParamMap::new().with("delay", 0.2))
        });
        self.register(element, report);

        let steps = [
            (".hero .sub-headline", "fade", ParamMap::new().with("y", 30.0).with("delay", 0.5)),
            (".hero .button-primary", "fade", ParamMap::new().with("y", 20.0).with("delay", 0.8)),
            (".hero-visual img", "scale", ParamMap::new().with("scale", 0.9).with("delay", 1.0)),
        ];
        for (selector, preset, overrides) in steps {
            let node = self.first(selector);
            let element = self.element(node).map(|e| e.preset(preset).overrides(overrides));
            self.register(element, report);
        }
    }

    fn scan_sections(&mut self, report: &mut InitReport) {
        if let Some(section) = self.first(".problem-section") {
            let steps = [
                (".stat-number", "slide-left", ParamMap::new()),
                (".stat-label", "slide-left", ParamMap::new().with("delay", 0.2)),
                (".text-column", "slide-right", ParamMap::new()),
            ];
            for (selector, preset, overrides) in steps {
                let node = self.first_within(section, selector);
                let element = self.element(node).map(|e| e.preset(preset).overrides(overrides));
                self.register(element, report);
            }
        }

        if let Some(section) = self.first(".solution-section") {
            let heading = self.first_within(section, "h2");
            let element = self.element(heading).map(|e| e.preset("fade"));
            self.register(element, report);

            let cards = self.document.borrow().query_within(section, ".solution-card");
            let element = self.element(cards).map(|e| {
                e.preset("stagger")
                    .overrides(ParamMap::new().with("y", 60.0).with("stagger", 0.2))
            });
            self.register(element, report);
        }
    }

    fn scan_text(&mut self, report: &mut InitReport) {
        self.register_each(".fade-in", "fade", &ParamMap::new(), report);
        self.register_each("h2, h3", "fade", &ParamMap::new().with("y", 30.0), report);
        let paragraph = ParamMap::new().with("y", 20.0).with("delay", 0.2);
        self.register_each("p", "fade", &paragraph, report);
    }

    fn scan_counters(&mut self, report: &mut InitReport) {
        for node in self.all(".stat-number") {
            let text = self.document.borrow().text_content(node).unwrap_or_default();
            let Some(counter) = Counter::from_stat_text(&text) else {
                debug!("Stat {:?} has no number: {:?}", node, text);
                continue;
            };
            let element = self.element([node]).map(|e| e.counter(counter));
            self.register(element, report);
        }

        for node in self.all("[data-counter]") {
            let value = self.document.borrow().attribute(node, "data-counter");
            let Some(counter) = value.as_deref().and_then(Counter::from_attribute) else {
                warn!("Ignoring data-counter on {:?}: {:?}", node, value);
                continue;
            };
            let element = self.element([node]).map(|e| e.counter(counter));
            self.register(element, report);
        }
    }

    fn scan_parallax(&mut self, report: &mut InitReport) {
        self.add_parallax("[data-scroll-speed]", None, report);
        self.add_parallax(".hero-visual img, .hero-image", Some(0.3), report);
        self.add_parallax(".bg-element, .background-image", Some(0.5), report);
    }

    fn scan_enhanced(&mut self, report: &mut InitReport) {
        self.add_effect(".button-magnetic", Effect::Magnetic);
        self.add_effect(".card-tilt", Effect::Tilt);

        for node in self.all(".image-reveal") {
            let element = self.element([node]).map(|e| {
                e.preset("fade")
                    .overrides(ParamMap::new().with("y", 0.0).with("duration", 0.1))
                    .threshold(IMAGE_REVEAL_THRESHOLD)
                    .class_on_trigger("revealed")
            });
            self.register(element, report);
        }

        for node in self.all(".text-split") {
            let element = self.element([node]).map(|e| {
                e.split_text(SplitMode::Chars).overrides(
                    ParamMap::new()
                        .with("duration", 0.8)
                        .with("stagger", 0.02)
                        .with("ease", Easing::Power3Out.to_string()),
                )
            });
            self.register(element, report);
        }
    }

    fn scan_lazy(&mut self, report: &mut InitReport) {
        for node in self.all("[data-lazy-animation]") {
            let name = self
                .document
                .borrow()
                .attribute(node, "data-lazy-animation")
                .unwrap_or_default();
            let class = format!("animate-{}", name);
            if let Err(err) = self.wire_preset(node, &name, &ParamMap::new(), Some(&class)) {
                self.report_error(report, err);
            }
        }
    }

    fn scan_hover(&mut self) {
        self.add_effect(
            ".solution-card, .card, .feature-card",
            Effect::HoverScale(HoverScale::card()),
        );
        self.add_effect(
            ".button-primary, .button-secondary, .btn",
            Effect::HoverScale(HoverScale::button()),
        );
        self.add_effect(
            "a:not(.button-primary):not(.button-secondary)",
            Effect::HoverScale(HoverScale::link()),
        );
    }

    fn scan_links(&mut self) {
        for node in self.all("a[href^=\"#\"], a[href^=\"/\"]") {
            let Some(href) = self.document.borrow().attribute(node, "href") else {
                continue;
            };
            let link = match href.strip_prefix('#') {
                Some("") => continue,
                Some(id) => NavLink::Anchor(id.to_string()),
                None => NavLink::Page(href),
            };
            self.links.insert(node, link);
        }
    }

    /// A new element at the configured default threshold
    pub(crate) fn element(
        &self,
        targets: impl IntoIterator<Item = NodeId>,
    ) -> Option<AnimatableElement> {
        AnimatableElement::new(targets).map(|e| e.threshold(self.config.threshold))
    }

    /// Wire one node with a preset named at runtime
    ///
    /// Text reveals split into words, counters read their target from
    /// `data-counter` or the node text, and parallax joins the parallax layer
    /// at the `data-scroll-speed` speed (or the preset default). Everything
    /// else plays its motion once on trigger, adding `class` when given.
    pub(crate) fn wire_preset(
        &mut self,
        node: NodeId,
        name: &str,
        overrides: &ParamMap,
        class: Option<&str>,
    ) -> Result<(), AnimationError> {
        let definition = self.ctx.catalog().resolve(name)?;
        let kind = definition.kind();
        let default_speed = definition.defaults().number("speed");

        if kind.is_continuous() {
            let speed = overrides
                .number("speed")
                .or_else(|| self.scroll_speed(node))
                .or(default_speed)
                .unwrap_or_default();
            return self.parallax.add(node, speed, &self.ctx);
        }

        let Some(element) = self.element([node]) else {
            return Ok(());
        };
        let element = match kind {
            PresetKind::TextReveal => element.split_text(SplitMode::Words),
            PresetKind::Counter => element.counter(self.counter_for(node)?),
            _ => element.preset(name),
        };
        let mut element = element.overrides(overrides.clone());
        if let Some(class) = class {
            element = element.class_on_trigger(class);
        }
        let source = self.source();
        self.triggers.register(element, &self.ctx, &source)?;
        Ok(())
    }

    fn counter_for(&self, node: NodeId) -> Result<Counter, AnimationError> {
        let (attribute, text) = {
            let doc = self.document.borrow();
            (doc.attribute(node, "data-counter"), doc.text_content(node))
        };
        attribute
            .as_deref()
            .and_then(Counter::from_attribute)
            .or_else(|| text.as_deref().and_then(Counter::from_stat_text))
            .ok_or_else(|| AnimationError::InvalidParameter {
                key: "target".to_string(),
                reason: format!("no number to count to on {:?}", node),
            })
    }

    fn scroll_speed(&self, node: NodeId) -> Option<f32> {
        self.document
            .borrow()
            .attribute(node, "data-scroll-speed")
            .and_then(|value| value.trim().parse().ok())
    }

    fn register(&mut self, element: Option<AnimatableElement>, report: &mut InitReport) {
        let Some(element) = element else {
            return;
        };
        let source = self.source();
        if let Err(err) = self.triggers.register(element, &self.ctx, &source) {
            self.report_error(report, err);
        }
    }

    /// One element per match, each with the same preset
    fn register_each(
        &mut self,
        selector: &str,
        preset: &str,
        overrides: &ParamMap,
        report: &mut InitReport,
    ) {
        for node in self.all(selector) {
            let element = self
                .element([node])
                .map(|e| e.preset(preset).overrides(overrides.clone()));
            self.register(element, report);
        }
    }

    /// Play a preset at load, ignoring scroll position
    fn play_now(
        &mut self,
        targets: Vec<NodeId>,
        preset: &str,
        overrides: ParamMap,
        report: &mut InitReport,
    ) {
        if targets.is_empty() {
            return;
        }
        match self.ctx.motion(preset, &overrides) {
            Ok(motion) => {
                self.engine.borrow_mut().play(Tween::from_motion(targets, &motion));
                report.immediate += 1;
            }
            Err(err) => self.report_error(report, err),
        }
    }

    /// Parallax for every match; `None` reads `data-scroll-speed`
    fn add_parallax(&mut self, selector: &str, speed: Option<f32>, report: &mut InitReport) {
        for node in self.all(selector) {
            let speed = speed.or_else(|| self.scroll_speed(node));
            let Some(speed) = speed else {
                warn!("Ignoring unparsable data-scroll-speed on {:?}", node);
                continue;
            };
            if let Err(err) = self.parallax.add(node, speed, &self.ctx) {
                self.report_error(report, err);
            }
        }
    }

    fn add_effect(&mut self, selector: &str, effect: Effect) {
        for node in self.all(selector) {
            self.interactions.add(node, effect.clone());
        }
    }

    fn all(&self, selector: &str) -> Vec<NodeId> {
        self.document.borrow().query_all(selector)
    }

    fn first(&self, selector: &str) -> Option<NodeId> {
        self.document.borrow().query(selector)
    }

    fn first_within(&self, scope: NodeId, selector: &str) -> Option<NodeId> {
        self.document
            .borrow()
            .query_within(scope, selector)
            .into_iter()
            .next()
    }
}
