//! Headless page simulation
//!
//! Loads a page fixture into the in-memory document, runs the page animator
//! over it, replays scroll positions and fps samples, then lets every tween
//! run to completion.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};
use unveil_animation::{AnimationProfile, ParamMap};
use unveil_app::{PageAnimator, UnveilConfig};
use unveil_platform::{Document, PageEvent};
use unveil_platform_headless::{
    HeadlessSmoothScrollBackend, MemoryDocument, PageFixture, RecordingEngine, TweenRecord,
};

/// Simulated time between replayed scroll positions
const SCROLL_STEP_MS: f64 = 250.0;
/// Step used to run the remaining tweens out
const FRAME_MS: f64 = 16.0;

/// What to replay against the page
#[derive(Clone, Debug, Default)]
pub struct Plan {
    pub scroll: Vec<f32>,
    pub fps: Vec<u32>,
    pub reduced_motion: bool,
    pub no_smooth: bool,
    pub simple: bool,
}

#[derive(Debug, Serialize)]
pub struct ScrollStep {
    pub scroll_y: f32,
    pub fired: usize,
    pub pending: usize,
}

#[derive(Debug, Serialize)]
pub struct TweenSummary {
    pub id: u64,
    pub targets: Vec<String>,
    pub from: Option<ParamMap>,
    pub to: ParamMap,
    pub duration: f32,
    pub ease: String,
    pub delay: f32,
    pub stagger: Option<f32>,
    pub issued_at_ms: f64,
    pub completed: bool,
    pub killed: bool,
}

#[derive(Debug, Serialize)]
pub struct PlaybackSummary {
    pub mode: String,
    pub fps: Option<u32>,
    pub time_scale: f32,
    pub low_performance: bool,
    pub reduced_motion: bool,
}

/// Everything a simulation run produced
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub profile: String,
    pub smooth_scroll: bool,
    pub fallback: Option<String>,
    pub registered: usize,
    pub revealed_at_load: usize,
    pub immediate: usize,
    pub parallax: usize,
    pub effects: usize,
    pub errors: Vec<String>,
    pub steps: Vec<ScrollStep>,
    pub tweens: Vec<TweenSummary>,
    pub playback: PlaybackSummary,
    pub navigations: Vec<String>,
}

/// Load a fixture and config from disk and simulate
pub fn run(page: &Path, config_dir: &Path, plan: &Plan) -> Result<SimulationReport> {
    let fixture = PageFixture::load(page)
        .with_context(|| format!("Failed to load page fixture {}", page.display()))?;
    let config = UnveilConfig::load_from_dir(config_dir)
        .with_context(|| format!("Failed to load config from {}", config_dir.display()))?;
    info!("Simulating {}", page.display());
    simulate(&fixture, config, plan)
}

/// Simulate one page load
pub fn simulate(
    fixture: &PageFixture,
    mut config: UnveilConfig,
    plan: &Plan,
) -> Result<SimulationReport> {
    if plan.simple {
        config.profile = AnimationProfile::Simple;
    }
    if plan.no_smooth {
        config.smooth_scroll.smooth = false;
    }

    let mut doc = fixture.build_document();
    if plan.reduced_motion {
        doc = doc.with_reduced_motion(true);
    }
    let document = Rc::new(RefCell::new(doc));
    let engine = Rc::new(RefCell::new(RecordingEngine::new()));
    let mut backend = HeadlessSmoothScrollBackend::new(document.clone());
    if fixture.smooth_scroll_fails {
        backend = backend.failing("smooth scroll unavailable in fixture");
    }

    let mut animator =
        PageAnimator::new(config, document.clone(), engine.clone(), Box::new(backend));
    let init = animator.init().context("Failed to initialize page animations")?;

    let mut steps = Vec::with_capacity(plan.scroll.len());
    for &y in &plan.scroll {
        let before = triggered(&animator);
        document.borrow_mut().scroll_to(y);
        animator.handle_event(PageEvent::Scroll { y });
        engine.borrow_mut().advance(SCROLL_STEP_MS);
        let fired = triggered(&animator) - before;
        debug!("Scrolled to {}: {} fired", y, fired);
        steps.push(ScrollStep {
            scroll_y: y,
            fired,
            pending: animator.triggers().pending_count(),
        });
    }
    for &fps in &plan.fps {
        animator.record_fps(fps);
    }
    engine.borrow_mut().run_to_completion(FRAME_MS);

    let doc = document.borrow();
    let recorded = engine.borrow();
    let playback = animator.playback();
    Ok(SimulationReport {
        profile: init.profile.name().to_string(),
        smooth_scroll: init.smooth_scroll,
        fallback: init.fallback.as_ref().map(|f| format!("{:?}", f)),
        registered: init.registered,
        revealed_at_load: init.revealed,
        immediate: init.immediate,
        parallax: init.parallax,
        effects: init.effects,
        errors: init.errors.iter().map(ToString::to_string).collect(),
        steps,
        tweens: recorded
            .records()
            .iter()
            .map(|record| summarize(&doc, record))
            .collect(),
        playback: PlaybackSummary {
            mode: format!("{:?}", playback.mode),
            fps: playback.fps,
            time_scale: playback.time_scale,
            low_performance: playback.low_performance,
            reduced_motion: playback.reduced_motion,
        },
        navigations: doc.navigations().to_vec(),
    })
}

fn triggered(animator: &PageAnimator) -> usize {
    let triggers = animator.triggers();
    triggers.len() - triggers.pending_count()
}

fn summarize(doc: &MemoryDocument, record: &TweenRecord) -> TweenSummary {
    TweenSummary {
        id: record.id.to_raw(),
        targets: record
            .targets
            .iter()
            .map(|&node| doc.describe(node).unwrap_or_else(|| format!("{:?}", node)))
            .collect(),
        from: record.from.clone(),
        to: record.to.clone(),
        duration: record.duration,
        ease: record.ease.to_string(),
        delay: record.delay,
        stagger: record.stagger,
        issued_at_ms: record.issued_at_ms,
        completed: record.completed,
        killed: record.killed,
    }
}

impl SimulationReport {
    /// Print a human-readable summary
    pub fn print(&self) {
        println!(
            "Profile: {} (smooth scroll {})",
            self.profile,
            if self.smooth_scroll { "on" } else { "off" }
        );
        if let Some(fallback) = &self.fallback {
            println!("Native scrolling: {}", fallback);
        }
        println!(
            "Wired: {} elements ({} revealed at load), {} immediate, {} parallax, {} effects",
            self.registered, self.revealed_at_load, self.immediate, self.parallax, self.effects
        );
        for err in &self.errors {
            println!("  error: {}", err);
        }

        if !self.steps.is_empty() {
            println!();
            println!("Scroll:");
            for step in &self.steps {
                println!(
                    "  y={:<8} {} fired, {} pending",
                    step.scroll_y, step.fired, step.pending
                );
            }
        }

        println!();
        println!("Tweens:");
        for tween in &self.tweens {
            let from = tween
                .from
                .as_ref()
                .map(|from| format!("{} -> ", from))
                .unwrap_or_default();
            let stagger = tween
                .stagger
                .map(|s| format!(" stagger {}s", s))
                .unwrap_or_default();
            let status = if tween.killed {
                "killed"
            } else if tween.completed {
                "done"
            } else {
                "running"
            };
            println!(
                "  #{:<3} @{:>6}ms {} {}{} {}s {} delay {}s{} [{}]",
                tween.id,
                tween.issued_at_ms,
                tween.targets.join(", "),
                from,
                tween.to,
                tween.duration,
                tween.ease,
                tween.delay,
                stagger,
                status
            );
        }

        println!();
        let fps = self
            .playback
            .fps
            .map(|fps| fps.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "Playback: {} (time scale {}, fps {}{}{})",
            self.playback.mode,
            self.playback.time_scale,
            fps,
            if self.playback.low_performance { ", low performance" } else { "" },
            if self.playback.reduced_motion { ", reduced motion" } else { "" }
        );
        for href in &self.navigations {
            println!("Navigated to {}", href);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        [[body]]
        tag = "main"
        attributes = { "data-scroll-container" = "" }
        top = 0
        height = 3000

        [[body.children]]
        tag = "h2"
        text = "Solutions"
        top = 1200
        height = 60

        [[body.children]]
        tag = "div"
        classes = ["stat-number"]
        text = "250+"
        top = 200
        height = 40

        [[body.children]]
        tag = "div"
        attributes = { "data-lazy-animation" = "wobble" }
        top = 300
        height = 40
    "#;

    #[test]
    fn test_simulation_reports_tweens_and_steps() {
        let fixture = PageFixture::parse(PAGE).unwrap();
        let plan = Plan {
            scroll: vec![200.0, 800.0],
            fps: vec![25],
            ..Plan::default()
        };
        let report = simulate(&fixture, UnveilConfig::default(), &plan).unwrap();

        assert_eq!(report.profile, "full");
        assert!(report.smooth_scroll);
        assert_eq!(report.errors, vec!["Unknown preset: 'wobble'".to_string()]);
        assert_eq!(report.steps.len(), 2);
        assert_eq!(report.steps[0].fired, 0);
        assert_eq!(report.steps[1].fired, 1);
        assert_eq!(report.steps[1].pending, 0);
        assert!(report.tweens.iter().any(|t| t.targets == ["h2"]));
        assert!(report.tweens.iter().all(|t| t.completed));
        assert_eq!(report.playback.mode, "Reduced");
        assert!(report.playback.low_performance);

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"profile\":\"full\""));
    }

    #[test]
    fn test_plan_overrides() {
        let fixture = PageFixture::parse(PAGE).unwrap();
        let plan = Plan {
            reduced_motion: true,
            simple: true,
            ..Plan::default()
        };
        let report = simulate(&fixture, UnveilConfig::default(), &plan).unwrap();
        assert_eq!(report.profile, "simple");
        assert!(!report.smooth_scroll);
        assert_eq!(report.playback.mode, "NearStatic");
        assert_eq!(report.playback.time_scale, 0.01);
        assert!(report.errors.is_empty());
    }
}
