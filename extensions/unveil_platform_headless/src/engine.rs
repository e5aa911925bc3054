//! Recording tween engine
//!
//! Records every tween and `set` call, and simulates playback on demand:
//! [`RecordingEngine::advance`] moves each tween's local clock by the
//! elapsed time multiplied by the global time scale, evaluates the ease and
//! fires the tween's callbacks.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::trace;
use unveil_animation::{
    Easing, ParamMap, Stagger, Tween, TweenCallback, TweenEngine, TweenFrame, TweenId,
};
use unveil_platform::NodeId;

/// What was asked of the engine for one tween
#[derive(Clone, Debug, PartialEq)]
pub struct TweenRecord {
    pub id: TweenId,
    pub targets: SmallVec<[NodeId; 4]>,
    pub from: Option<ParamMap>,
    pub to: ParamMap,
    /// Effective duration in seconds (engine default applied)
    pub duration: f32,
    pub ease: Easing,
    pub delay: f32,
    pub stagger: Option<f32>,
    /// Simulated wall-clock time at `play`, in milliseconds
    pub issued_at_ms: f64,
    pub completed: bool,
    pub killed: bool,
}

impl TweenRecord {
    /// Start offset of the target at `index`, in seconds
    pub fn start_for(&self, index: usize) -> f32 {
        self.schedule().start_for(index)
    }

    /// Total local time until every target finishes, in seconds
    pub fn total_duration(&self) -> f32 {
        self.schedule().last_start(self.targets.len()) + self.duration
    }

    fn schedule(&self) -> Stagger {
        Stagger::new(self.delay, self.stagger)
    }
}

struct Active {
    record: usize,
    /// Local clock in milliseconds, already scaled
    elapsed_ms: f64,
    /// Start state per target, captured when the target starts
    from: Vec<Option<ParamMap>>,
    started: bool,
    on_start: Option<TweenCallback>,
    on_update: Option<TweenCallback>,
    on_complete: Option<TweenCallback>,
}

/// In-memory [`TweenEngine`] with simulated time
pub struct RecordingEngine {
    records: Vec<TweenRecord>,
    active: Vec<Active>,
    sets: Vec<(Vec<NodeId>, ParamMap)>,
    values: FxHashMap<NodeId, ParamMap>,
    time_scale: f32,
    default_duration: f32,
    default_ease: Easing,
    now_ms: f64,
    kill_count: usize,
}

impl Default for RecordingEngine {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            active: Vec::new(),
            sets: Vec::new(),
            values: FxHashMap::default(),
            time_scale: 1.0,
            default_duration: 0.5,
            default_ease: Easing::Power2Out,
            now_ms: 0.0,
            kill_count: 0,
        }
    }
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every tween issued so far, in order
    pub fn records(&self) -> &[TweenRecord] {
        &self.records
    }

    /// Tweens targeting `node`
    pub fn records_for(&self, node: NodeId) -> Vec<&TweenRecord> {
        self.records
            .iter()
            .filter(|r| r.targets.contains(&node))
            .collect()
    }

    /// Every `set` call so far
    pub fn sets(&self) -> &[(Vec<NodeId>, ParamMap)] {
        &self.sets
    }

    /// Last known values applied to `node`
    pub fn values(&self, node: NodeId) -> Option<&ParamMap> {
        self.values.get(&node)
    }

    pub fn defaults(&self) -> (f32, Easing) {
        (self.default_duration, self.default_ease)
    }

    pub fn kill_count(&self) -> usize {
        self.kill_count
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    /// Advance simulated time and fire callbacks
    pub fn advance(&mut self, ms: f64) {
        self.now_ms += ms;
        let step = ms * self.time_scale as f64;

        let mut finished = Vec::new();
        for (slot, active) in self.active.iter_mut().enumerate() {
            active.elapsed_ms += step;
            let record = &mut self.records[active.record];
            let local_s = (active.elapsed_ms / 1000.0) as f32;

            let mut all_done = true;
            for index in 0..record.targets.len() {
                let start = record.start_for(index);
                if local_s < start {
                    all_done = false;
                    continue;
                }
                let node = record.targets[index];
                let linear = if record.duration <= 0.0 {
                    1.0
                } else {
                    ((local_s - start) / record.duration).min(1.0)
                };
                if linear < 1.0 {
                    all_done = false;
                }

                let from = active.from[index].get_or_insert_with(|| {
                    record.from.clone().unwrap_or_else(|| {
                        self.values.get(&node).cloned().unwrap_or_default()
                    })
                });
                let progress = record.ease.apply(linear);
                let values = from.lerp(&record.to, progress);
                let merged = match self.values.get(&node) {
                    Some(current) => current.merged(&values),
                    None => values.clone(),
                };
                self.values.insert(node, merged);

                let frame = TweenFrame {
                    target_index: index,
                    progress,
                    values,
                };
                if !active.started {
                    active.started = true;
                    if let Some(callback) = active.on_start.as_mut() {
                        callback(&frame);
                    }
                }
                if let Some(callback) = active.on_update.as_mut() {
                    callback(&frame);
                }
            }

            if all_done {
                record.completed = true;
                if let Some(callback) = active.on_complete.as_mut() {
                    let last = record.targets.len().saturating_sub(1);
                    callback(&TweenFrame {
                        target_index: last,
                        progress: 1.0,
                        values: record.to.clone(),
                    });
                }
                finished.push(slot);
            }
        }
        for slot in finished.into_iter().rev() {
            self.active.remove(slot);
        }
    }

    /// Advance until every running tween has completed
    pub fn run_to_completion(&mut self, step_ms: f64) {
        // Near-static playback can take minutes of simulated time
        let mut guard = 0;
        while !self.active.is_empty() && guard < 1_000_000 {
            self.advance(step_ms);
            guard += 1;
        }
    }

    fn values_merged(&self, node: NodeId, update: &ParamMap) -> ParamMap {
        match self.values.get(&node) {
            Some(current) => current.merged(update),
            None => update.clone(),
        }
    }
}

impl TweenEngine for RecordingEngine {
    fn play(&mut self, tween: Tween) -> TweenId {
        let id = TweenId::from_raw(self.records.len() as u64 + 1);
        let options = tween.options;
        let record = TweenRecord {
            id,
            targets: tween.targets,
            from: tween.from,
            to: tween.to,
            duration: options.duration.unwrap_or(self.default_duration),
            ease: options.ease.unwrap_or(self.default_ease),
            delay: options.delay,
            stagger: options.stagger,
            issued_at_ms: self.now_ms,
            completed: false,
            killed: false,
        };
        trace!(
            "play {:?}: {} targets -> {}",
            id,
            record.targets.len(),
            record.to
        );

        let from = vec![None; record.targets.len()];
        self.records.push(record);
        self.active.push(Active {
            record: self.records.len() - 1,
            elapsed_ms: 0.0,
            from,
            started: false,
            on_start: options.on_start,
            on_update: options.on_update,
            on_complete: options.on_complete,
        });
        id
    }

    fn set(&mut self, targets: &[NodeId], values: &ParamMap) {
        for &node in targets {
            let merged = self.values_merged(node, values);
            self.values.insert(node, merged);
        }
        self.sets.push((targets.to_vec(), values.clone()));
    }

    fn time_scale(&self) -> f32 {
        self.time_scale
    }

    fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale;
    }

    fn set_defaults(&mut self, duration: f32, ease: Easing) {
        self.default_duration = duration;
        self.default_ease = ease;
    }

    fn kill_all(&mut self) {
        for active in self.active.drain(..) {
            self.records[active.record].killed = true;
        }
        self.kill_count += 1;
    }
}
