//! Unveil CLI
//!
//! Simulate page animations headlessly, list presets and check page fixtures.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use unveil_animation::{AnimationContext, Counter, DeviceProfile, ParamMap};
use unveil_app::UnveilConfig;
use unveil_platform::Document;
use unveil_platform_headless::PageFixture;

mod simulate;

use simulate::Plan;

#[derive(Parser)]
#[command(name = "unveil")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scroll-driven page animation simulator", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a page fixture through the animator and print every tween
    Simulate {
        /// Page fixture (TOML)
        page: PathBuf,

        /// Directory holding unveil.toml
        #[arg(short, long, default_value = ".")]
        config: PathBuf,

        /// Scroll positions to replay, comma separated
        #[arg(long, value_delimiter = ',')]
        scroll: Vec<f32>,

        /// Frame-rate samples to feed after scrolling, comma separated
        #[arg(long, value_delimiter = ',')]
        fps: Vec<u32>,

        /// Pretend the user prefers reduced motion
        #[arg(long)]
        reduced_motion: bool,

        /// Do not attempt smooth scrolling
        #[arg(long)]
        no_smooth: bool,

        /// Use the simple profile
        #[arg(long)]
        simple: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the animation presets and their defaults
    Presets {
        /// Directory holding unveil.toml
        #[arg(short, long, default_value = ".")]
        config: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a page fixture for unknown presets and bad attributes
    Check {
        /// Page fixture (TOML)
        page: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Simulate {
            page,
            config,
            scroll,
            fps,
            reduced_motion,
            no_smooth,
            simple,
            json,
        } => {
            let plan = Plan {
                scroll,
                fps,
                reduced_motion,
                no_smooth,
                simple,
            };
            cmd_simulate(&page, &config, &plan, json)
        }

        Commands::Presets { config, json } => cmd_presets(&config, json),

        Commands::Check { page } => cmd_check(&page),
    }
}

fn cmd_simulate(page: &Path, config_dir: &Path, plan: &Plan, json: bool) -> Result<()> {
    let report = simulate::run(page, config_dir, plan)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print();
    }
    Ok(())
}

#[derive(Serialize)]
struct PresetEntry<'a> {
    name: &'a str,
    continuous: bool,
    defaults: &'a ParamMap,
}

fn cmd_presets(config_dir: &Path, json: bool) -> Result<()> {
    let config = UnveilConfig::load_from_dir(config_dir)
        .with_context(|| format!("Failed to load config from {}", config_dir.display()))?;
    let ctx = AnimationContext::new(config.settings, DeviceProfile::default());

    let entries: Vec<PresetEntry> = ctx
        .catalog()
        .iter()
        .map(|definition| PresetEntry {
            name: definition.name(),
            continuous: definition.kind().is_continuous(),
            defaults: definition.defaults(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Presets");
    println!("=======");
    for entry in &entries {
        let marker = if entry.continuous { " (continuous)" } else { "" };
        println!("  {:<12} {}{}", entry.name, entry.defaults, marker);
    }
    Ok(())
}

fn cmd_check(page: &Path) -> Result<()> {
    let fixture = PageFixture::load(page)
        .with_context(|| format!("Failed to load page fixture {}", page.display()))?;
    let doc = fixture.build_document();
    let ctx = AnimationContext::default();

    let mut unknown = Vec::new();
    for node in doc.query_all("[data-lazy-animation]") {
        let name = doc.attribute(node, "data-lazy-animation").unwrap_or_default();
        if let Err(err) = ctx.catalog().resolve(&name) {
            warn!("{}: {}", describe(&doc, node), err);
            unknown.push(name);
        }
    }

    let mut warnings = 0;
    for node in doc.query_all("[data-counter]") {
        let value = doc.attribute(node, "data-counter").unwrap_or_default();
        if Counter::from_attribute(&value).is_none() {
            warn!("{}: data-counter {:?} is not an integer", describe(&doc, node), value);
            warnings += 1;
        }
    }
    for node in doc.query_all("[data-scroll-speed]") {
        let value = doc.attribute(node, "data-scroll-speed").unwrap_or_default();
        if value.trim().parse::<f32>().is_err() {
            warn!("{}: data-scroll-speed {:?} is not a number", describe(&doc, node), value);
            warnings += 1;
        }
    }

    if !unknown.is_empty() {
        anyhow::bail!(
            "{} names {} unknown preset(s): {}",
            page.display(),
            unknown.len(),
            unknown.join(", ")
        );
    }
    info!("{} is valid ({} warnings)", page.display(), warnings);
    Ok(())
}

fn describe(doc: &unveil_platform_headless::MemoryDocument, node: unveil_platform::NodeId) -> String {
    doc.describe(node).unwrap_or_else(|| format!("{:?}", node))
}
