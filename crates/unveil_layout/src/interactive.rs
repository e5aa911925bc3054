//! Pointer-driven interaction effects
//!
//! Magnetic buttons, 3-D card tilt and hover scaling. Effects are purely
//! reactive: each pointer event issues a tween computed from the current
//! pointer coordinates and the last one wins.
//!
//! Element rects are cached per node and dropped on every scroll or resize
//! via [`InteractionEffects::invalidate_geometry`].

use std::mem;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::trace;
use unveil_animation::{Easing, ParamMap, SharedEngine, Tween};
use unveil_platform::{NodeId, PointerEvent, Rect, SharedDocument};

use crate::viewport::ViewportSource;

/// Fraction of the pointer offset a magnetic element follows
pub const MAGNETIC_STRENGTH: f32 = 0.3;
/// Pixels of pointer offset per degree of tilt
pub const TILT_DIVISOR: f32 = 10.0;
pub const TILT_PERSPECTIVE: f32 = 1000.0;

const FOLLOW_DURATION: f32 = 0.3;
const RELEASE_DURATION: f32 = 0.5;

/// Hover state of one element
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HoverState {
    #[default]
    Idle,
    Hovered,
}

impl HoverState {
    pub fn on_event(&self, event: &PointerEvent) -> Option<Self> {
        match (self, event) {
            (HoverState::Idle, PointerEvent::Entered { .. })
            | (HoverState::Idle, PointerEvent::Moved { .. }) => Some(HoverState::Hovered),
            (HoverState::Hovered, PointerEvent::Left { .. }) => Some(HoverState::Idle),
            _ => None,
        }
    }
}

/// Scale-on-hover parameters
#[derive(Clone, Debug, PartialEq)]
pub struct HoverScale {
    pub scale: f32,
    pub duration: f32,
    /// `None` uses the engine default
    pub ease: Option<Easing>,
    /// Box shadow while hovered and at rest
    pub shadow: Option<(String, String)>,
}

impl HoverScale {
    /// Cards: gentle lift
    pub fn card() -> Self {
        Self {
            scale: 1.03,
            duration: 0.3,
            ease: Some(Easing::Power2Out),
            shadow: None,
        }
    }

    /// Buttons: scale with a deeper shadow
    pub fn button() -> Self {
        Self {
            scale: 1.05,
            duration: 0.3,
            ease: Some(Easing::Power2Out),
            shadow: Some((
                "0 10px 30px rgba(0,0,0,0.2)".to_string(),
                "0 4px 15px rgba(0,0,0,0.1)".to_string(),
            )),
        }
    }

    /// Plain links
    pub fn link() -> Self {
        Self {
            scale: 1.05,
            duration: 0.2,
            ease: None,
            shadow: None,
        }
    }

    /// Primary buttons on the lightweight profile
    pub fn glow_button() -> Self {
        Self {
            scale: 1.05,
            duration: 0.3,
            ease: None,
            shadow: Some((
                "0 8px 25px rgba(44, 165, 141, 0.4), 0 0 20px rgba(44, 165, 141, 0.2)".to_string(),
                "0 4px 15px rgba(0, 0, 0, 0.1)".to_string(),
            )),
        }
    }

    fn tween(&self, node: NodeId, hovered: bool) -> Tween {
        let mut params = ParamMap::new().with("scale", if hovered { self.scale } else { 1.0 });
        if let Some((hover, rest)) = &self.shadow {
            params.insert("boxShadow", if hovered { hover.as_str() } else { rest.as_str() });
        }
        let mut tween = Tween::to([node], params).duration(self.duration);
        tween.options.ease = self.ease;
        tween
    }
}

/// An interaction effect attached to an element
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Follow the pointer, spring back on leave
    Magnetic,
    /// Rotate toward the pointer in 3-D
    Tilt,
    HoverScale(HoverScale),
}

struct Interactive {
    state: HoverState,
    effects: SmallVec<[Effect; 2]>,
}

/// Interaction effects for every wired element
pub struct InteractionEffects {
    nodes: FxHashMap<NodeId, Interactive>,
    rects: FxHashMap<NodeId, Rect>,
    document: SharedDocument,
    engine: SharedEngine,
}

impl InteractionEffects {
    pub fn new(document: SharedDocument, engine: SharedEngine) -> Self {
        Self {
            nodes: FxHashMap::default(),
            rects: FxHashMap::default(),
            document,
            engine,
        }
    }

    /// Attach an effect; a second effect of the same kind is ignored
    pub fn add(&mut self, node: NodeId, effect: Effect) -> bool {
        let entry = self.nodes.entry(node).or_insert_with(|| Interactive {
            state: HoverState::Idle,
            effects: SmallVec::new(),
        });
        if entry
            .effects
            .iter()
            .any(|e| mem::discriminant(e) == mem::discriminant(&effect))
        {
            return false;
        }
        entry.effects.push(effect);
        true
    }

    pub fn effects(&self, node: NodeId) -> &[Effect] {
        self.nodes
            .get(&node)
            .map(|i| i.effects.as_slice())
            .unwrap_or(&[])
    }

    pub fn state(&self, node: NodeId) -> HoverState {
        self.nodes.get(&node).map(|i| i.state).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop cached element rects
    pub fn invalidate_geometry(&mut self) {
        self.rects.clear();
    }

    /// React to a pointer event; returns the number of tweens issued
    pub fn handle_pointer(&mut self, event: PointerEvent, source: &ViewportSource) -> usize {
        let node = event.node();
        let Some(interactive) = self.nodes.get_mut(&node) else {
            return 0;
        };
        let transition = interactive.state.on_event(&event);
        if let Some(next) = transition {
            interactive.state = next;
        }

        let mut tweens = Vec::new();
        for effect in &interactive.effects {
            match (effect, event) {
                (Effect::HoverScale(hover), _) => {
                    if let Some(state) = transition {
                        tweens.push(hover.tween(node, state == HoverState::Hovered));
                    }
                }
                (Effect::Magnetic, PointerEvent::Moved { x, y, .. }) => {
                    let Some(rect) = cached_rect(&mut self.rects, &self.document, source, node)
                    else {
                        continue;
                    };
                    let center = rect.center();
                    let params = ParamMap::new()
                        .with("x", (x - center.x) * MAGNETIC_STRENGTH)
                        .with("y", (y - center.y) * MAGNETIC_STRENGTH);
                    tweens.push(
                        Tween::to([node], params)
                            .duration(FOLLOW_DURATION)
                            .ease(Easing::Power2Out),
                    );
                }
                (Effect::Magnetic, PointerEvent::Left { .. }) => {
                    let params = ParamMap::new().with("x", 0.0).with("y", 0.0);
                    tweens.push(
                        Tween::to([node], params)
                            .duration(RELEASE_DURATION)
                            .ease(Easing::ELASTIC_OUT),
                    );
                }
                (Effect::Tilt, PointerEvent::Moved { x, y, .. }) => {
                    let Some(rect) = cached_rect(&mut self.rects, &self.document, source, node)
                    else {
                        continue;
                    };
                    let local_x = x - rect.x();
                    let local_y = y - rect.y();
                    let params = ParamMap::new()
                        .with("rotationX", (local_y - rect.height() / 2.0) / TILT_DIVISOR)
                        .with("rotationY", (rect.width() / 2.0 - local_x) / TILT_DIVISOR)
                        .with("transformPerspective", TILT_PERSPECTIVE);
                    tweens.push(
                        Tween::to([node], params)
                            .duration(FOLLOW_DURATION)
                            .ease(Easing::Power2Out),
                    );
                }
                (Effect::Tilt, PointerEvent::Left { .. }) => {
                    let params = ParamMap::new().with("rotationX", 0.0).with("rotationY", 0.0);
                    tweens.push(
                        Tween::to([node], params)
                            .duration(RELEASE_DURATION)
                            .ease(Easing::Power2Out),
                    );
                }
                _ => {}
            }
        }

        let issued = tweens.len();
        if issued > 0 {
            trace!("{:?} issued {} tweens", event, issued);
            let mut engine = self.engine.borrow_mut();
            for tween in tweens {
                engine.play(tween);
            }
        }
        issued
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.rects.clear();
    }
}

fn cached_rect(
    rects: &mut FxHashMap<NodeId, Rect>,
    document: &SharedDocument,
    source: &ViewportSource,
    node: NodeId,
) -> Option<Rect> {
    if let Some(rect) = rects.get(&node) {
        return Some(*rect);
    }
    let rect = source.viewport_rect(&*document.borrow(), node)?;
    rects.insert(node, rect);
    Some(rect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use unveil_platform::Size;
    use unveil_platform_headless::{MemoryDocument, NodeSpec, RecordingEngine};

    fn effects() -> (InteractionEffects, Rc<RefCell<RecordingEngine>>, NodeId) {
        let mut doc = MemoryDocument::new(Size::new(1280.0, 800.0));
        let node = doc.append_to_body(
            &NodeSpec::new("button")
                .class("button-magnetic")
                .at(300.0, 100.0)
                .horizontal(100.0, 200.0),
        );
        let engine = Rc::new(RefCell::new(RecordingEngine::new()));
        let effects = InteractionEffects::new(Rc::new(RefCell::new(doc)), engine.clone());
        (effects, engine, node)
    }

    #[test]
    fn test_magnetic_follow_and_release() {
        let (mut effects, engine, node) = effects();
        effects.add(node, Effect::Magnetic);
        let source = ViewportSource::NativeIntersection;

        // center is (200, 350)
        let moved = PointerEvent::Moved { node, x: 250.0, y: 330.0 };
        assert_eq!(effects.handle_pointer(moved, &source), 1);
        {
            let engine = engine.borrow();
            let record = &engine.records()[0];
            assert!((record.to.number("x").unwrap() - 15.0).abs() < 1e-4);
            assert!((record.to.number("y").unwrap() + 6.0).abs() < 1e-4);
            assert_eq!(record.duration, 0.3);
            assert_eq!(record.ease, Easing::Power2Out);
        }

        assert_eq!(effects.handle_pointer(PointerEvent::Left { node }, &source), 1);
        let engine = engine.borrow();
        let record = &engine.records()[1];
        assert_eq!(record.to.number("x"), Some(0.0));
        assert_eq!(record.ease, Easing::ELASTIC_OUT);
        assert_eq!(record.duration, 0.5);
    }

    #[test]
    fn test_tilt_angles() {
        let (mut effects, engine, node) = effects();
        effects.add(node, Effect::Tilt);
        let source = ViewportSource::NativeIntersection;

        // local (20, 90) within a 200x100 card
        let moved = PointerEvent::Moved { node, x: 120.0, y: 390.0 };
        effects.handle_pointer(moved, &source);
        let engine = engine.borrow();
        let to = &engine.records()[0].to;
        assert!((to.number("rotationX").unwrap() - 4.0).abs() < 1e-4);
        assert!((to.number("rotationY").unwrap() - 8.0).abs() < 1e-4);
        assert_eq!(to.number("transformPerspective"), Some(1000.0));
    }

    #[test]
    fn test_hover_scale_follows_state() {
        let (mut effects, engine, node) = effects();
        effects.add(node, Effect::HoverScale(HoverScale::button()));
        let source = ViewportSource::NativeIntersection;

        assert_eq!(effects.handle_pointer(PointerEvent::Entered { node }, &source), 1);
        assert_eq!(effects.state(node), HoverState::Hovered);
        // moving while hovered does not re-scale
        let moved = PointerEvent::Moved { node, x: 150.0, y: 320.0 };
        assert_eq!(effects.handle_pointer(moved, &source), 0);
        assert_eq!(effects.handle_pointer(PointerEvent::Left { node }, &source), 1);
        assert_eq!(effects.state(node), HoverState::Idle);

        let engine = engine.borrow();
        assert_eq!(engine.records()[0].to.number("scale"), Some(1.05));
        assert_eq!(
            engine.records()[0].to.text("boxShadow"),
            Some("0 10px 30px rgba(0,0,0,0.2)")
        );
        assert_eq!(engine.records()[1].to.number("scale"), Some(1.0));
    }

    #[test]
    fn test_link_uses_engine_default_ease() {
        let (mut effects, engine, node) = effects();
        effects.add(node, Effect::HoverScale(HoverScale::link()));
        effects.handle_pointer(PointerEvent::Entered { node }, &ViewportSource::NativeIntersection);
        let engine = engine.borrow();
        assert_eq!(engine.records()[0].duration, 0.2);
        assert_eq!(engine.records()[0].ease, engine.defaults().1);
    }

    #[test]
    fn test_duplicate_kind_ignored() {
        let (mut effects, _, node) = effects();
        assert!(effects.add(node, Effect::HoverScale(HoverScale::card())));
        assert!(!effects.add(node, Effect::HoverScale(HoverScale::button())));
        assert!(effects.add(node, Effect::Tilt));
        assert_eq!(effects.effects(node).len(), 2);
        assert!(effects.effects(NodeId::from_raw(u64::MAX)).is_empty());
    }

    #[test]
    fn test_geometry_cache_invalidation() {
        let (mut effects, engine, node) = effects();
        effects.add(node, Effect::Magnetic);
        let mut source = ViewportSource::SmoothScrollProxy { scroll_y: 0.0 };
        let moved = PointerEvent::Moved { node, x: 200.0, y: 350.0 };
        effects.handle_pointer(moved, &source);

        // stale rect until invalidated
        source.set_scroll(100.0);
        effects.handle_pointer(moved, &source);
        effects.invalidate_geometry();
        effects.handle_pointer(moved, &source);

        let engine = engine.borrow();
        let ys: Vec<f32> = engine
            .records()
            .iter()
            .map(|r| r.to.number("y").unwrap())
            .collect();
        assert!(ys[0].abs() < 1e-4);
        assert!(ys[1].abs() < 1e-4);
        assert!((ys[2] - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_unknown_node_ignored() {
        let (mut effects, engine, _) = effects();
        let stray = PointerEvent::Entered {
            node: NodeId::from_raw(u64::MAX),
        };
        assert_eq!(effects.handle_pointer(stray, &ViewportSource::NativeIntersection), 0);
        assert!(engine.borrow().records().is_empty());
    }
}
