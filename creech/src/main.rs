//! Creech is a tiny deterministic simulation of creatures on a torus.
//!
//! ## Creeches
//! A creech is a small creature with a position, a facing and some energy.
//! It can only see what is in front of it, inside a trapezoid that widens with distance.
//! Every tick it picks the closest thing it can see and reacts to it:
//! food gets approached and eaten (unless it is already full),
//! other creeches get avoided by turning away and running.
//! If there is nothing in view it wanders around aimlessly.
//!
//! Everything costs energy, even wandering. A creech that runs out of energy starves and
//! stays where it fell.
//!
//! ## Food
//! Food lies around with a value, which is how much energy there is left in it,
//! and gets smaller the more it is eaten from. Once it is gone it is removed from the world.
//!
//! ## Deterministic
//! When re-executed with the same seed the simulation leads to the same results,
//! even though the creeches make their plans in parallel.
//!
//! ## Watching
//! There are two ways of looking at a running simulation:
//! a character grid in the terminal, or a stream of json frames made of polygons that
//! something with actual graphics can draw.

// The interesting part is World::update() in the world module.
// It works in two phases: first every creech looks at the world and makes a plan
// (Creech::make_plan(), in parallel, nothing changes during this phase),
// then all plans get executed one after the other (Creech::do_plan()).
// Splitting it like this means every creech sees the same world,
// no matter how far the others are with their turn.
//
// Geometry lives in its own crate, planar.
// Parameters live in the config module.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::time::{Duration, Instant};
use tracing::info;

mod config;

mod entity;

mod plan;

mod food;

mod creech;

mod world;
use world::World;

mod renderer;
use renderer::Renderer;

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
enum RenderMode {
    /// character grid on stdout
    Screen,
    /// one json frame per line on stdout
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "creech", version, about = "Watch a few creeches try to eat and not bump into each other")]
struct Options {
    #[arg(long, value_enum, default_value_t = RenderMode::Screen)]
    render: RenderMode,
    /// Milliseconds per tick.
    #[arg(long, default_value_t = 1000)]
    tick_ms: u64,
    #[arg(long, default_value_t = 1234)]
    seed: u64,
    /// Stop after this many ticks instead of running forever.
    #[arg(long)]
    ticks: Option<u64>,
    /// How much food to scatter around at the start.
    #[arg(long, default_value_t = config::INITIAL_FOOD)]
    food: usize,
}

fn init_tracing() {
    // stdout belongs to the renderer
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let options = Options::parse();

    let mut world = World::new(options.seed, options.food).context("failed to set up the world")?;
    info!(seed = options.seed, mode = ?options.render, "starting");

    match options.render {
        RenderMode::Screen => {
            let mut screen = renderer::screen::Screen::new(std::io::stdout());
            run(&mut world, &mut screen, &options)?;
        }
        RenderMode::Json => {
            let (mut json, frames) = renderer::channel::channel();
            let consumer = std::thread::spawn(move || {
                for frame in frames {
                    println!("{}", frame);
                }
            });
            run(&mut world, &mut json, &options)?;
            info!(dropped = json.dropped(), "frames the consumer did not keep up with");
            // hang up so the consumer runs out of frames, then let it print the rest
            drop(json);
            consumer
                .join()
                .map_err(|_| anyhow::anyhow!("frame consumer panicked"))?;
        }
    }
    world.report();
    Ok(())
}

/// draw, update, wait for the rest of the tick. forever, or until the limit
fn run(world: &mut World, renderer: &mut dyn Renderer, options: &Options) -> anyhow::Result<()> {
    world.init(renderer).context("failed to initialise the renderer")?;
    let tick = Duration::from_millis(options.tick_ms);
    let mut ticks = 0;
    while options.ticks.is_none_or(|limit| ticks < limit) {
        let start = Instant::now();
        world
            .draw(renderer)
            .with_context(|| format!("failed to draw tick {}", world.tick()))?;
        world.update();
        ticks += 1;
        if let Some(rest) = tick.checked_sub(start.elapsed()) {
            std::thread::sleep(rest);
        }
    }
    Ok(())
}
