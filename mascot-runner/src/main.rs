mod effects;
mod script;

use clap::Parser;
use effects::LogEffects;
use env_logger::{Builder, Env};
use hdrhistogram::Histogram;
use log::{error, info, warn, LevelFilter};
use mascot_config::{load_config, Config, ConfigError};
use mascot_persistence::{open_repository, BackgroundWriter};
use mascot_simulation::{Frame, Manager, Viewport};
use rand::rngs::StdRng;
use rand::SeedableRng;
use script::DemoScript;
use spin_sleep::SpinSleeper;
use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless mascot simulation runner", long_about = None)]
struct Args {
    /// Path to the configuration file (JSON, or TOML by extension)
    #[arg(short, long, default_value = "mascot.json")]
    config: PathBuf,

    /// Stop after this many frames
    #[arg(short, long)]
    frames: Option<u64>,

    /// Seed for reproducible runs; overrides the configured seed
    #[arg(long)]
    seed: Option<u64>,

    /// Log debug output, including every effect notification
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let env = Env::default().default_filter_or(level.to_string());
    let _ = Builder::from_env(env).try_init();
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    match load_config(path) {
        Ok(config) => {
            info!("Using configuration from {}", path.display());
            Ok(config)
        }
        Err(ConfigError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
            info!("No configuration at {}; using defaults", path.display());
            Ok(Config::default())
        }
        Err(err) => Err(err),
    }
}

fn log_stats(frames: u64, histogram: &Histogram<u64>, effects: &LogEffects, manager: &Manager) {
    info!(
        "{} frames | frame time us p50={} p99={} max={} | mascots={} projectiles={} | impacts={} explosions={} sounds={}",
        frames,
        histogram.value_at_quantile(0.5),
        histogram.value_at_quantile(0.99),
        histogram.max(),
        manager.mascots().len(),
        manager.projectile_count(),
        effects.impacts,
        effects.explosions,
        effects.sounds,
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = match read_config(&args.config) {
        Ok(config) => config,
        Err(err) => {
            error!("Failed to load config: {}", err);
            return Err(err.into());
        }
    };
    if let Some(seed) = args.seed {
        config.simulation.rng_seed = Some(seed);
    }

    let mut writer = BackgroundWriter::spawn(open_repository(&config.persistence)?)?;
    let mut manager = Manager::new(config.simulation.clone(), Viewport::from(&config.viewport))
        .with_persistence(Box::new(writer.handle()));
    manager.restore(&config.initial_state);

    let script_rng = match config.simulation.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_entropy(),
    };
    let mut script = DemoScript::new(&config, script_rng);
    let mut effects = LogEffects::default();

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))?;
    }

    let frame_duration = Duration::from_secs_f64(1.0 / f64::from(config.framerate));
    let sleeper = SpinSleeper::default();
    let mut histogram = Histogram::<u64>::new_with_bounds(1, 10_000_000, 3)?;
    let stats_every = u64::from(config.runner.stats_every_frames);
    let started = Instant::now();
    let mut frames: u64 = 0;

    info!("Running simulation at {} FPS", config.framerate);
    while running.load(Ordering::SeqCst) && args.frames.map_or(true, |limit| frames < limit) {
        let frame_start = Instant::now();
        let now_ms = started.elapsed().as_secs_f64() * 1000.0;

        script.drive(&mut manager, now_ms);
        manager.tick(&Frame::visible(now_ms, script.pointer(now_ms)), &mut effects);
        frames += 1;

        let elapsed = frame_start.elapsed();
        histogram.saturating_record(elapsed.as_micros().max(1) as u64);
        if stats_every > 0 && frames % stats_every == 0 {
            log_stats(frames, &histogram, &effects, &manager);
        }

        if elapsed < frame_duration {
            sleeper.sleep(frame_duration - elapsed);
        } else if config.framerate > 10 {
            warn!("Frame time exceeded budget: {:?} > {:?}", elapsed, frame_duration);
        }
    }

    info!("Shutting down");
    manager.cancel_firing();
    manager.flush_save();
    log_stats(frames, &histogram, &effects, &manager);
    writer.shutdown();
    Ok(())
}
