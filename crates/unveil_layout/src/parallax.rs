//! Scroll-linked parallax
//!
//! A parallax layer is continuous rather than one-shot: while it intersects
//! the viewport its vertical translation follows the scroll position.
//! Progress runs from 0 when the element's top enters at the bottom edge to
//! 1 when its bottom leaves at the top edge, and the translation is the
//! parallax preset's `yPercent` scaled by that progress.

use tracing::debug;
use unveil_animation::{AnimationContext, ParamMap, Result, SharedEngine};
use unveil_platform::{Document, NodeId, SharedDocument};

use crate::viewport::ViewportSource;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParallaxItem {
    pub node: NodeId,
    /// Effective speed, device factor applied
    pub speed: f32,
    /// Translation at full progress, in percent of the element height
    pub max_y_percent: f32,
}

/// Scroll progress of a viewport-relative rect, in `[0, 1]`
pub fn scroll_progress(top: f32, height: f32, viewport_height: f32) -> f32 {
    let span = viewport_height + height;
    if span <= 0.0 {
        return 0.0;
    }
    ((viewport_height - top) / span).clamp(0.0, 1.0)
}

/// Every parallax element on the page
pub struct ParallaxLayer {
    items: Vec<ParallaxItem>,
    document: SharedDocument,
    engine: SharedEngine,
}

impl ParallaxLayer {
    pub fn new(document: SharedDocument, engine: SharedEngine) -> Self {
        Self {
            items: Vec::new(),
            document,
            engine,
        }
    }

    /// Add a parallax element moving at `speed`
    ///
    /// The device's parallax factor is applied here, so handheld devices
    /// move at half speed.
    pub fn add(&mut self, node: NodeId, speed: f32, ctx: &AnimationContext) -> Result<()> {
        if self.items.iter().any(|item| item.node == node) {
            return Ok(());
        }
        let speed = speed * ctx.device().parallax_factor();
        let motion = ctx.motion("parallax", &ParamMap::new().with("speed", speed))?;
        let max_y_percent = motion.to.number("yPercent").unwrap_or(0.0);
        debug!("Parallax on {:?} at speed {}", node, speed);
        self.items.push(ParallaxItem {
            node,
            speed,
            max_y_percent,
        });
        Ok(())
    }

    pub fn items(&self) -> &[ParallaxItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Apply translations for the current scroll position
    ///
    /// Returns the number of elements updated.
    pub fn update(&self, source: &ViewportSource) -> usize {
        let updates: Vec<(NodeId, f32)> = {
            let doc = self.document.borrow();
            let viewport_height = doc.viewport().height;
            self.items
                .iter()
                .filter(|item| source.intersects_viewport(&*doc, item.node))
                .filter_map(|item| {
                    let rect = source.viewport_rect(&*doc, item.node)?;
                    let progress = scroll_progress(rect.top(), rect.height(), viewport_height);
                    Some((item.node, item.max_y_percent * progress))
                })
                .collect()
        };

        let mut engine = self.engine.borrow_mut();
        for &(node, y_percent) in &updates {
            engine.set(&[node], &ParamMap::new().with("yPercent", y_percent));
        }
        updates.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use unveil_animation::{AnimationSettings, DeviceProfile};
    use unveil_platform::Size;
    use unveil_platform_headless::{MemoryDocument, NodeSpec, RecordingEngine};

    fn layer() -> (ParallaxLayer, Rc<RefCell<RecordingEngine>>, NodeId) {
        let mut doc = MemoryDocument::new(Size::new(1280.0, 800.0));
        let node = doc.append_to_body(&NodeSpec::new("img").class("bg-element").at(1000.0, 200.0));
        let engine = Rc::new(RefCell::new(RecordingEngine::new()));
        let layer = ParallaxLayer::new(Rc::new(RefCell::new(doc)), engine.clone());
        (layer, engine, node)
    }

    fn y_percent(engine: &Rc<RefCell<RecordingEngine>>, node: NodeId) -> Option<f32> {
        engine.borrow().values(node).and_then(|v| v.number("yPercent"))
    }

    #[test]
    fn test_progress_bounds() {
        assert_eq!(scroll_progress(800.0, 200.0, 800.0), 0.0);
        assert_eq!(scroll_progress(-200.0, 200.0, 800.0), 1.0);
        assert!((scroll_progress(300.0, 200.0, 800.0) - 0.5).abs() < 1e-6);
        assert_eq!(scroll_progress(2000.0, 200.0, 800.0), 0.0);
    }

    #[test]
    fn test_updates_only_while_visible() {
        let (mut layer, engine, node) = layer();
        layer.add(node, 0.5, &AnimationContext::default()).unwrap();
        let mut source = ViewportSource::SmoothScrollProxy { scroll_y: 0.0 };

        assert_eq!(layer.update(&source), 0);
        assert!(y_percent(&engine, node).is_none());

        // top at 300 of 800 with height 200: halfway
        source.set_scroll(700.0);
        assert_eq!(layer.update(&source), 1);
        let y = y_percent(&engine, node).unwrap();
        assert!((y + 12.5).abs() < 1e-4);

        source.set_scroll(5000.0);
        assert_eq!(layer.update(&source), 0);
    }

    #[test]
    fn test_mobile_halves_speed() {
        let (mut layer, _, node) = layer();
        let device = DeviceProfile {
            is_mobile: true,
            ..DeviceProfile::default()
        };
        let ctx = AnimationContext::new(AnimationSettings::default(), device);
        layer.add(node, 0.3, &ctx).unwrap();
        layer.add(node, 0.3, &ctx).unwrap();
        assert_eq!(layer.len(), 1);
        let item = layer.items()[0];
        assert!((item.speed - 0.15).abs() < 1e-6);
        assert!((item.max_y_percent + 7.5).abs() < 1e-4);
    }
}
