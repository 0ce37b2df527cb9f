use clap::Parser;
use ring_traffic::{drive_for, Frame, FrameSink, RingAttributes, WorldState};
use rand::SeedableRng;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "ring-traffic")]
#[command(about = "Headless ring road car-following simulation")]
#[command(version)]
struct Cli {
    /// Number of ticks to simulate
    #[arg(long, default_value = "2000")]
    ticks: usize,

    /// Overrides the number of vehicles on the ring
    #[arg(long)]
    vehicles: Option<usize>,

    /// Seed for the initial placement jitter
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file of ring attributes; missing fields take reference values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print statistics every this many ticks
    #[arg(long, default_value = "100")]
    report_every: usize,
}

/// Prints a summary line every `every` frames.
struct Reporter {
    every: usize,
}

impl FrameSink for Reporter {
    fn frame(&mut self, frame: &Frame<'_>) -> ControlFlow<()> {
        if self.every > 0 && frame.index() % self.every == 0 {
            let (sum, stopped) = frame.iter().fold((0.0, 0), |(sum, stopped), v| {
                (sum + v.speed, stopped + (frame.speed_fraction(&v) < 0.02) as usize)
            });
            println!(
                "frame {:>6}: mean speed {:.3}, {} of {} vehicles stopped",
                frame.index(),
                sum / frame.len() as f64,
                stopped,
                frame.len()
            );
        }
        ControlFlow::Continue(())
    }
}

/// Mean wall-clock seconds per tick.
fn mean_tick_secs(elapsed: Duration, ticks: usize) -> f64 {
    elapsed.as_secs_f64() / ticks as f64
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut attribs = match &cli.config {
        Some(path) => RingAttributes::from_json(&std::fs::read_to_string(path)?)?,
        None => RingAttributes::default(),
    };
    if let Some(n) = cli.vehicles {
        attribs.num_vehicles = n;
    }
    log::info!("ring attributes: {:?}", attribs);

    let mut world = match cli.seed {
        Some(seed) => {
            WorldState::with_rng(attribs, &mut rand::rngs::StdRng::seed_from_u64(seed))?
        }
        None => WorldState::new(attribs)?,
    };

    println!("Simulating...");
    let mut reporter = Reporter {
        every: cli.report_every,
    };
    let start = Instant::now();
    let ticks = drive_for(&mut world, &mut reporter, cli.ticks);
    let elapsed = start.elapsed();

    if ticks > 0 {
        let per_tick = mean_tick_secs(elapsed, ticks);
        println!(
            "Avg. tick: {:?} --> {:.0}x real time ({} vehs, {} stopped, mean speed {:.3}, min gap {:.3})",
            Duration::from_secs_f64(per_tick),
            attribs.dt / per_tick.max(f64::EPSILON),
            world.len(),
            world.stopped_count(),
            world.mean_speed(),
            world.min_gap(),
        );
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn mean_tick_handles_long_runs() {
        assert_approx_eq!(mean_tick_secs(Duration::from_secs(3), 1000), 0.003);
        // More ticks than fit in a u32
        let ticks = (u32::MAX as usize).saturating_mul(4);
        let secs = mean_tick_secs(Duration::from_secs(4), ticks);
        assert!(secs > 0.0);
        assert_approx_eq!(secs * ticks as f64, 4.0, 1e-6);
    }
}
