//! Trigger policy
//!
//! Elements are registered once at page scan and fire at most once per page
//! lifetime. An element becomes eligible when its top edge reaches the
//! trigger line (80% of the viewport height unless overridden). On first
//! eligibility the preset defaults are merged with the element's overrides,
//! exactly one tween is issued and the element stops being observed.
//!
//! Eligibility arrives two ways, depending on the active
//! [`ViewportSource`]:
//!
//! - native: the document pushes [`IntersectionRecord`]s from an observer
//!   whose root ends at the trigger line ([`TriggerRegistry::handle_records`])
//! - smooth-scroll proxy: every scroll update re-evaluates the pending
//!   elements against the proxy offset ([`TriggerRegistry::evaluate`])

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use tracing::{debug, trace};
use unveil_animation::{
    AnimationContext, Counter, CounterDisplay, Motion, ParamMap, Result, SharedEngine, SplitMode,
    Tween,
};
use unveil_platform::{IntersectionRecord, NodeId, ObserverOptions, SharedDocument};

use crate::viewport::{ViewportSource, DEFAULT_THRESHOLD};

new_key_type! {
    /// Handle to a registered element
    pub struct ElementKey;
}

/// What happens to the targets when an element fires
#[derive(Clone, Debug, PartialEq)]
pub enum RevealAction {
    /// Play the preset motion on the targets
    Motion,
    /// Split the trigger node's text and play the preset on the pieces
    SplitText(SplitMode),
    /// Count up and render into the trigger node's text
    Counter(Counter),
}

/// One element (or stagger group) waiting to be revealed
#[derive(Clone, Debug)]
pub struct AnimatableElement {
    trigger: NodeId,
    targets: SmallVec<[NodeId; 4]>,
    preset: Option<String>,
    overrides: ParamMap,
    threshold: Option<f32>,
    action: RevealAction,
    class_on_trigger: Option<String>,
    triggered: bool,
}

impl AnimatableElement {
    /// Element over `targets`; the first target is the trigger node
    ///
    /// Returns `None` for an empty target list, so a selector that matched
    /// nothing registers nothing.
    pub fn new(targets: impl IntoIterator<Item = NodeId>) -> Option<Self> {
        let targets: SmallVec<[NodeId; 4]> = targets.into_iter().collect();
        let trigger = *targets.first()?;
        Some(Self {
            trigger,
            targets,
            preset: None,
            overrides: ParamMap::new(),
            threshold: None,
            action: RevealAction::Motion,
            class_on_trigger: None,
            triggered: false,
        })
    }

    pub fn preset(mut self, name: &str) -> Self {
        self.preset = Some(name.to_string());
        self
    }

    /// Per-call parameters; they win over the preset defaults per key
    pub fn overrides(mut self, overrides: ParamMap) -> Self {
        self.overrides = self.overrides.merged(&overrides);
        self
    }

    /// Trigger line as a fraction of the viewport height
    pub fn threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Class added to the trigger node when the element fires
    pub fn class_on_trigger(mut self, class: &str) -> Self {
        self.class_on_trigger = Some(class.to_string());
        self
    }

    /// Split the trigger node's text; defaults the preset to `text-reveal`
    pub fn split_text(mut self, mode: SplitMode) -> Self {
        self.action = RevealAction::SplitText(mode);
        self.preset.get_or_insert_with(|| "text-reveal".to_string());
        self
    }

    /// Count up to `counter`'s target in the trigger node
    pub fn counter(mut self, counter: Counter) -> Self {
        self.overrides.insert("target", counter.target());
        self.overrides.insert("suffix", counter.suffix());
        self.action = RevealAction::Counter(counter);
        self.preset = Some("counter".to_string());
        self
    }

    pub fn trigger(&self) -> NodeId {
        self.trigger
    }

    pub fn targets(&self) -> &[NodeId] {
        &self.targets
    }

    /// Preset name, `fade` when none was given
    pub fn preset_name(&self) -> &str {
        self.preset.as_deref().unwrap_or("fade")
    }

    pub fn effective_threshold(&self) -> f32 {
        self.threshold.unwrap_or(DEFAULT_THRESHOLD)
    }

    pub fn action(&self) -> &RevealAction {
        &self.action
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    fn observer_options(&self) -> ObserverOptions {
        ObserverOptions::for_threshold(self.effective_threshold())
    }
}

struct Entry {
    element: AnimatableElement,
    motion: Motion,
}

/// Registered elements in registration order
pub struct TriggerRegistry {
    entries: SlotMap<ElementKey, Entry>,
    order: Vec<ElementKey>,
    document: SharedDocument,
    engine: SharedEngine,
}

impl TriggerRegistry {
    pub fn new(document: SharedDocument, engine: SharedEngine) -> Self {
        Self {
            entries: SlotMap::with_key(),
            order: Vec::new(),
            document,
            engine,
        }
    }

    /// Register an element
    ///
    /// Resolves the preset up front, so an unknown name fails here and the
    /// element is not registered. Text splitting happens immediately and
    /// entry presets render their start state right away; with a native
    /// source the trigger node starts being observed.
    pub fn register(
        &mut self,
        mut element: AnimatableElement,
        ctx: &AnimationContext,
        source: &ViewportSource,
    ) -> Result<ElementKey> {
        let motion = ctx.motion(element.preset_name(), &element.overrides)?;

        if let RevealAction::SplitText(mode) = element.action {
            let trigger = element.trigger;
            let mut doc = self.document.borrow_mut();
            let text = doc.text_content(trigger).unwrap_or_default();
            doc.replace_children(trigger, &mode.fragments(&text));
            element.targets = doc
                .query_within(trigger, mode.target_selector())
                .into_iter()
                .collect();
        }

        if !matches!(element.action, RevealAction::Counter(_)) {
            if let Some(from) = &motion.from {
                self.engine.borrow_mut().set(&element.targets, from);
            }
        }

        if !source.is_smooth() {
            self.document
                .borrow_mut()
                .observe(element.trigger, element.observer_options());
        }

        debug!(
            "Registered {} on {:?} ({} targets, threshold {})",
            element.preset_name(),
            element.trigger,
            element.targets.len(),
            element.effective_threshold()
        );
        let key = self.entries.insert(Entry { element, motion });
        self.order.push(key);
        Ok(key)
    }

    pub fn get(&self, key: ElementKey) -> Option<&AnimatableElement> {
        self.entries.get(key).map(|e| &e.element)
    }

    /// Elements in registration order
    pub fn iter(&self) -> impl Iterator<Item = (ElementKey, &AnimatableElement)> {
        self.order
            .iter()
            .filter_map(|&key| self.entries.get(key).map(|e| (key, &e.element)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of elements that have not fired yet
    pub fn pending_count(&self) -> usize {
        self.entries.values().filter(|e| !e.element.triggered).count()
    }

    /// Fire pending elements whose observer reported an intersection
    ///
    /// Returns the number of elements fired.
    pub fn handle_records(&mut self, records: &[IntersectionRecord]) -> usize {
        let mut fired = 0;
        for record in records.iter().filter(|r| r.is_intersecting) {
            let keys: Vec<ElementKey> = self
                .pending()
                .filter(|(_, e)| {
                    e.trigger == record.node && e.observer_options() == record.options
                })
                .map(|(key, _)| key)
                .collect();
            for key in keys {
                if self.fire(key) {
                    fired += 1;
                }
            }
        }
        fired
    }

    /// Fire every pending element that has crossed its trigger line
    ///
    /// Returns the number of elements fired.
    pub fn evaluate(&mut self, source: &ViewportSource) -> usize {
        let eligible: Vec<ElementKey> = {
            let doc = self.document.borrow();
            self.pending()
                .filter(|(_, e)| {
                    source.is_within_threshold(&*doc, e.trigger, e.effective_threshold())
                })
                .map(|(key, _)| key)
                .collect()
        };
        eligible.into_iter().filter(|&key| self.fire(key)).count()
    }

    /// Fire an element regardless of geometry; false if it already fired
    pub fn fire(&mut self, key: ElementKey) -> bool {
        let Some(entry) = self.entries.get_mut(key) else {
            return false;
        };
        if entry.element.triggered {
            return false;
        }
        entry.element.triggered = true;

        let element = &entry.element;
        let tween = match &element.action {
            RevealAction::Motion | RevealAction::SplitText(_) => {
                Tween::from_motion(element.targets.iter().copied(), &entry.motion)
            }
            RevealAction::Counter(counter) => {
                counter_tween(element.trigger, counter, &entry.motion, &self.document)
            }
        };
        let trigger = element.trigger;
        let options = element.observer_options();
        let class = element.class_on_trigger.clone();
        trace!("Firing {} on {:?}", element.preset_name(), trigger);

        let id = self.engine.borrow_mut().play(tween);
        debug!("Element {:?} triggered, tween {:?}", trigger, id);

        let still_observed = self
            .pending()
            .any(|(_, e)| e.trigger == trigger && e.observer_options() == options);
        let mut doc = self.document.borrow_mut();
        if let Some(class) = class {
            doc.add_class(trigger, &class);
        }
        if !still_observed {
            doc.unobserve(trigger, options);
        }
        true
    }

    /// Drop every element
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn pending(&self) -> impl Iterator<Item = (ElementKey, &AnimatableElement)> {
        self.iter().filter(|(_, e)| !e.triggered)
    }
}

fn counter_tween(
    node: NodeId,
    counter: &Counter,
    motion: &Motion,
    document: &SharedDocument,
) -> Tween {
    let display = Rc::new(RefCell::new(CounterDisplay::new(counter.clone())));
    let update_display = display.clone();
    let update_doc = document.clone();
    let complete_doc = document.clone();

    Tween::from_motion([node], motion)
        .on_update(move |frame| {
            let Some(value) = frame.values.number("value") else {
                return;
            };
            if let Some(text) = update_display.borrow_mut().update(value) {
                update_doc.borrow_mut().set_text_content(node, &text);
            }
        })
        .on_complete(move |_| {
            let text = display.borrow_mut().complete();
            complete_doc.borrow_mut().set_text_content(node, &text);
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use unveil_animation::{AnimationError, ParamValue};
    use unveil_platform::{Document, Size};
    use unveil_platform_headless::{MemoryDocument, NodeSpec, RecordingEngine};

    struct Page {
        doc: Rc<RefCell<MemoryDocument>>,
        engine: Rc<RefCell<RecordingEngine>>,
        registry: TriggerRegistry,
        ctx: AnimationContext,
    }

    fn page(specs: &[NodeSpec]) -> (Page, Vec<NodeId>) {
        let mut doc = MemoryDocument::new(Size::new(1280.0, 1000.0));
        let nodes = specs.iter().map(|s| doc.append_to_body(s)).collect();
        let doc = Rc::new(RefCell::new(doc));
        let engine = Rc::new(RefCell::new(RecordingEngine::new()));
        let registry = TriggerRegistry::new(doc.clone(), engine.clone());
        (
            Page {
                doc,
                engine,
                registry,
                ctx: AnimationContext::default(),
            },
            nodes,
        )
    }

    impl Page {
        fn scroll_native(&mut self, y: f32) -> usize {
            self.doc.borrow_mut().scroll_to(y);
            let records = self.doc.borrow_mut().take_intersection_records();
            self.registry.handle_records(&records)
        }
    }

    #[test]
    fn test_smooth_fires_once() {
        let (mut page, nodes) = page(&[NodeSpec::new("h2").at(1500.0, 60.0)]);
        let mut source = ViewportSource::SmoothScrollProxy { scroll_y: 0.0 };
        let element = AnimatableElement::new([nodes[0]]).unwrap();
        let key = page.registry.register(element, &page.ctx, &source).unwrap();

        assert_eq!(page.registry.evaluate(&source), 0);
        source.set_scroll(700.0);
        assert_eq!(page.registry.evaluate(&source), 1);
        source.set_scroll(900.0);
        assert_eq!(page.registry.evaluate(&source), 0);
        source.set_scroll(0.0);
        assert_eq!(page.registry.evaluate(&source), 0);

        assert!(page.registry.get(key).unwrap().is_triggered());
        assert_eq!(page.engine.borrow().records_for(nodes[0]).len(), 1);
        assert_eq!(page.registry.pending_count(), 0);
    }

    #[test]
    fn test_native_records_fire_and_unobserve() {
        let (mut page, nodes) = page(&[
            NodeSpec::new("h1").at(100.0, 80.0),
            NodeSpec::new("p").at(1200.0, 40.0),
        ]);
        let source = ViewportSource::NativeIntersection;
        for &node in &nodes {
            let element = AnimatableElement::new([node]).unwrap();
            page.registry.register(element, &page.ctx, &source).unwrap();
        }
        assert_eq!(page.doc.borrow().observed_count(), 2);

        // initial records: only the in-view heading fires
        assert_eq!(page.scroll_native(0.0), 1);
        assert!(!page.doc.borrow().is_observed(nodes[0]));
        assert!(page.doc.borrow().is_observed(nodes[1]));

        assert_eq!(page.scroll_native(300.0), 0);
        assert_eq!(page.scroll_native(450.0), 1);
        assert_eq!(page.doc.borrow().observed_count(), 0);
        assert_eq!(page.engine.borrow().records().len(), 2);
    }

    #[test]
    fn test_overrides_win_and_start_state_applied() {
        let (mut page, nodes) = page(&[NodeSpec::new("p").at(100.0, 40.0)]);
        let source = ViewportSource::SmoothScrollProxy { scroll_y: 0.0 };
        let element = AnimatableElement::new([nodes[0]])
            .unwrap()
            .overrides(ParamMap::new().with("y", 20.0).with("delay", 0.2));
        page.registry.register(element, &page.ctx, &source).unwrap();

        let start = page.engine.borrow().values(nodes[0]).cloned().unwrap();
        assert_eq!(start.number("opacity"), Some(0.0));
        assert_eq!(start.number("y"), Some(20.0));

        page.registry.evaluate(&source);
        let engine = page.engine.borrow();
        let record = &engine.records()[0];
        assert_eq!(record.from.as_ref().unwrap().number("y"), Some(20.0));
        assert_eq!(record.delay, 0.2);
        assert_eq!(record.duration, 1.2);
    }

    #[test]
    fn test_unknown_preset_not_registered() {
        let (mut page, nodes) = page(&[NodeSpec::new("div").at(100.0, 40.0)]);
        let element = AnimatableElement::new([nodes[0]]).unwrap().preset("zoom");
        let err = page
            .registry
            .register(element, &page.ctx, &ViewportSource::NativeIntersection)
            .unwrap_err();
        assert_eq!(err, AnimationError::UnknownPreset("zoom".to_string()));
        assert!(page.registry.is_empty());
        assert_eq!(page.doc.borrow().observed_count(), 0);
    }

    #[test]
    fn test_empty_targets() {
        assert!(AnimatableElement::new(Vec::<NodeId>::new()).is_none());
    }

    #[test]
    fn test_per_threshold_observers() {
        let (mut page, nodes) = page(&[NodeSpec::new("img").at(1850.0, 300.0)]);
        let source = ViewportSource::NativeIntersection;
        let early = AnimatableElement::new([nodes[0]]).unwrap().threshold(0.9);
        let late = AnimatableElement::new([nodes[0]]).unwrap();
        page.registry.register(early, &page.ctx, &source).unwrap();
        page.registry.register(late, &page.ctx, &source).unwrap();

        page.scroll_native(0.0);
        // top at 850: inside the 90% root, outside the 80% one
        assert_eq!(page.scroll_native(1000.0), 1);
        assert!(page.doc.borrow().is_observed(nodes[0]));
        assert_eq!(page.scroll_native(1100.0), 1);
        assert!(!page.doc.borrow().is_observed(nodes[0]));
    }

    #[test]
    fn test_class_on_trigger() {
        let (mut page, nodes) = page(&[NodeSpec::new("div").at(100.0, 40.0)]);
        let source = ViewportSource::SmoothScrollProxy { scroll_y: 0.0 };
        let element = AnimatableElement::new([nodes[0]])
            .unwrap()
            .preset("scale")
            .class_on_trigger("animate-scale");
        page.registry.register(element, &page.ctx, &source).unwrap();
        assert!(!page.doc.borrow().has_class(nodes[0], "animate-scale"));
        page.registry.evaluate(&source);
        assert!(page.doc.borrow().has_class(nodes[0], "animate-scale"));
    }

    #[test]
    fn test_counter_renders_to_final_text() {
        let (mut page, nodes) =
            page(&[NodeSpec::new("div").class("stat-number").text("1500+").at(100.0, 80.0)]);
        let source = ViewportSource::SmoothScrollProxy { scroll_y: 0.0 };
        let text = page.doc.borrow().text_content(nodes[0]).unwrap();
        let counter = Counter::from_stat_text(&text).unwrap();
        let element = AnimatableElement::new([nodes[0]]).unwrap().counter(counter);
        page.registry.register(element, &page.ctx, &source).unwrap();
        page.registry.evaluate(&source);
        assert_eq!(page.engine.borrow().records()[0].duration, 2.0);

        let mut seen = Vec::new();
        while !page.engine.borrow().is_idle() {
            page.engine.borrow_mut().advance(16.0);
            let text = page.doc.borrow().text_content(nodes[0]).unwrap();
            let value: i64 = text.trim_end_matches('+').parse().unwrap();
            seen.push(value);
        }
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(
            page.doc.borrow().text_content(nodes[0]).as_deref(),
            Some("1500+")
        );
    }

    #[test]
    fn test_text_reveal_targets_inner_spans() {
        let (mut page, nodes) =
            page(&[NodeSpec::new("h1").text("Unleash your power").at(100.0, 80.0)]);
        let source = ViewportSource::SmoothScrollProxy { scroll_y: 0.0 };
        let element = AnimatableElement::new([nodes[0]])
            .unwrap()
            .split_text(SplitMode::Words)
            .overrides(ParamMap::new().with("delay", 0.2));
        let key = page.registry.register(element, &page.ctx, &source).unwrap();

        let targets = page.registry.get(key).unwrap().targets().to_vec();
        assert_eq!(targets.len(), 3);
        assert_eq!(page.registry.get(key).unwrap().trigger(), nodes[0]);
        assert_eq!(
            page.engine.borrow().values(targets[0]).unwrap().get("y"),
            Some(&ParamValue::Percent(100.0))
        );
        assert_eq!(
            page.doc.borrow().text_content(nodes[0]).as_deref(),
            Some("Unleash your power")
        );

        page.registry.evaluate(&source);
        let engine = page.engine.borrow();
        let record = &engine.records()[0];
        assert_eq!(record.targets.as_slice(), targets.as_slice());
        assert_eq!(record.stagger, Some(0.05));
        assert_eq!(record.duration, 1.5);
    }

    #[test]
    fn test_stagger_group_triggers_on_first() {
        let (mut page, nodes) = page(&[
            NodeSpec::new("div").class("solution-card").at(1500.0, 300.0),
            NodeSpec::new("div").class("solution-card").at(100.0, 300.0),
            NodeSpec::new("div").class("solution-card").at(100.0, 300.0),
        ]);
        let mut source = ViewportSource::SmoothScrollProxy { scroll_y: 0.0 };
        let element = AnimatableElement::new(nodes.clone())
            .unwrap()
            .preset("stagger")
            .overrides(ParamMap::new().with("stagger", 0.2));
        page.registry.register(element, &page.ctx, &source).unwrap();

        assert_eq!(page.registry.evaluate(&source), 0);
        source.set_scroll(800.0);
        assert_eq!(page.registry.evaluate(&source), 1);
        let engine = page.engine.borrow();
        let record = &engine.records()[0];
        assert_eq!(record.targets.as_slice(), nodes.as_slice());
        assert!((record.start_for(2) - 0.4).abs() < 1e-5);
    }

    #[test]
    fn test_clear() {
        let (mut page, nodes) = page(&[NodeSpec::new("p").at(100.0, 40.0)]);
        let element = AnimatableElement::new([nodes[0]]).unwrap();
        page.registry
            .register(element, &page.ctx, &ViewportSource::NativeIntersection)
            .unwrap();
        page.registry.clear();
        assert!(page.registry.is_empty());
        assert_eq!(page.registry.iter().count(), 0);
    }
}
