use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn};

use sim::{
    build_app,
    config::init_tracing,
    constants::{DEFAULT_TICK_RATE, MAX_TICK_RATE, MIN_TICK_RATE},
    resources::SimStats,
    run_ticks,
    scenario::Scenario,
    tick_count, tick_step,
};
use stealth::{PenaltySink, StarRating};

// ============================================================================
// CLI Argument Parsing
// ============================================================================

#[derive(Parser)]
#[command(author, version, about = "Stealth detection scenario runner", long_about = None)]
struct Args {
    /// Scenario file (JSON)
    scenario: PathBuf,

    /// Simulation ticks per second
    #[arg(short, long, default_value_t = DEFAULT_TICK_RATE)]
    tick_rate: u32,

    /// Override the scenario duration in seconds
    #[arg(short, long)]
    duration: Option<f32>,

    /// Pace ticks in wall-clock time instead of running flat out
    #[arg(long, default_value_t = false)]
    realtime: bool,

    /// Print the detection state of every tick
    #[arg(long, default_value_t = false)]
    trace: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long)]
    log: Option<String>,
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log.as_deref());

    let scenario = Scenario::load(&args.scenario)?;
    let tick_rate = args.tick_rate.clamp(MIN_TICK_RATE, MAX_TICK_RATE);
    if tick_rate != args.tick_rate {
        warn!("tick rate {} out of range, using {}", args.tick_rate, tick_rate);
    }

    let duration = args.duration.unwrap_or(scenario.duration);
    let ticks = tick_count(duration, tick_rate);
    let mut app = build_app(&scenario, tick_rate);
    info!("running {} for {:.1}s ({} ticks at {} Hz)", args.scenario.display(), duration, ticks, tick_rate);

    if args.realtime {
        let tick_duration = tick_step(tick_rate);
        let mut interval = time::interval(tick_duration);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        for frame in 0..ticks {
            interval.tick().await;

            let update_start = Instant::now();
            app.update();
            let update_elapsed = update_start.elapsed();

            if update_elapsed > tick_duration {
                warn!(
                    "tick {} took {:.2}ms (exceeded {:.2}ms budget)",
                    frame,
                    update_elapsed.as_secs_f64() * 1000.0,
                    tick_duration.as_secs_f64() * 1000.0
                );
            }
        }
    } else {
        run_ticks(&mut app, ticks);
    }

    let world = app.world();
    let stats = world.resource::<SimStats>();
    let rating = world.resource::<StarRating>();

    if args.trace {
        for record in &stats.history {
            println!(
                "{:>5} {:>7.3}s armed={:<5} progress={:.2} rating={:.1} {:?}",
                record.tick, record.time, record.armed, record.progress, record.rating, record.state
            );
        }
    }

    println!(
        "{} ticks: {} warnings, {} catches, {} escapes, {} blocked sightings, peak progress {:.2}, rating {:.1}/{:.1}",
        stats.ticks,
        stats.warnings,
        stats.catches,
        stats.escapes,
        stats.blocked,
        stats.peak_progress,
        rating.rating(),
        rating.max()
    );

    Ok(())
}
