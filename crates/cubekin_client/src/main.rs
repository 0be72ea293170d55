mod app;
mod camera;
mod input;
mod persistence;
mod scene;
mod settings;

use std::env;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use cubekin_core::jobs::JobSystem;
use cubekin_shared::player::GameMode;
use tracing::{debug, info, warn};

use app::{Game, DEFAULT_WORLD_NAME};
use input::{shared_input, snapshot, SharedInput};
use persistence::{find_world, HttpWorldApi, WorldApi, WorldType};
use settings::{load_or_create_settings, GameSettings, SETTINGS_FILE};

const SHUTDOWN_SAVE_TIMEOUT: Duration = Duration::from_secs(10);
const PERSISTENCE_THREADS: usize = 1;

struct LaunchOptions {
    seed: Option<String>,
    name: String,
    mode: GameMode,
    frames: Option<u64>,
    settings_path: PathBuf,
    load: bool,
    offline: bool,
}

fn main() {
    let _ = tracing_subscriber::fmt().with_target(false).try_init();

    let options = parse_args();
    let settings = load_or_create_settings(&options.settings_path);
    let api = if options.offline {
        None
    } else {
        connect(&settings)
    };

    let mut name = options.name.clone();
    let mut seed = options.seed.clone();
    if options.load {
        match api.as_deref().map(|api| find_world(api, &name, WorldType::Singleplayer)) {
            Some(Ok(Some(record))) => {
                info!("Loading world '{}' (id {})", record.name, record.id);
                name = record.name;
                seed = Some(record.seed).filter(|seed| !seed.is_empty()).or(seed);
            }
            Some(Ok(None)) => warn!("No saved world named '{name}', starting a new one"),
            Some(Err(err)) => warn!("Failed to list worlds: {err}"),
            None => warn!("--load needs the world service, starting a new world"),
        }
    }
    let seed = seed.unwrap_or_else(fresh_seed);

    let mut game = Game::new(settings.clone(), &name, &seed, options.mode);
    if let Some(api) = api {
        match JobSystem::new(Some(PERSISTENCE_THREADS)) {
            Ok(jobs) => game.attach_persistence(api, Arc::new(jobs)),
            Err(err) => warn!("Failed to start persistence jobs, saving disabled: {err}"),
        }
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        eprintln!("\nShutdown signal received, saving world...");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl+C handler: {err}");
    }

    let input = shared_input();
    spawn_stdin_reader(input.clone());

    info!(
        "Playing '{name}' (seed {seed}) in {} mode at {} fps",
        options.mode, settings.frame_rate
    );
    run_frames(&mut game, &input, &running, settings.frame_rate, options.frames);

    game.request_save();
    if !game.wait_for_saves(SHUTDOWN_SAVE_TIMEOUT) {
        warn!("Gave up waiting for {} world save(s)", game.pending_saves());
    }

    let position = game.player().state.position;
    info!(
        "Session over: {} blocks, {} mobs, player at ({:.1}, {:.1}, {:.1}), time of day {:.3}",
        game.world().len(),
        game.mobs().len(),
        position.x,
        position.y,
        position.z,
        game.lighting().time_of_day
    );
    if let Some(record) = game.last_saved() {
        info!("Last save: '{}' as world {}", record.name, record.id);
    }
}

fn run_frames(
    game: &mut Game,
    input: &SharedInput,
    running: &AtomicBool,
    frame_rate: u32,
    max_frames: Option<u64>,
) {
    let frame_time = Duration::from_secs_f32(1.0 / frame_rate.max(1) as f32);
    let mut last = Instant::now();
    let mut frame: u64 = 0;

    while running.load(Ordering::SeqCst) && max_frames.map_or(true, |max| frame < max) {
        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32();
        last = now;

        let scene = game.frame(dt, &snapshot(input));
        frame += 1;
        if frame % u64::from(frame_rate.max(1)) == 0 {
            debug!(
                "frame {frame}: {} blocks, {} mobs, time of day {:.3}, phase {:?}",
                scene.blocks.len(),
                scene.entities.len(),
                scene.lighting.time_of_day,
                scene.lighting.phase
            );
        }

        let elapsed = now.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

/// Stands in for window callbacks: each stdin line is one host event.
fn spawn_stdin_reader(input: SharedInput) {
    let spawned = thread::Builder::new()
        .name("cubekin-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                let result = input
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .apply_command(&line);
                if let Err(err) = result {
                    warn!("Ignoring input: {err}");
                }
            }
        });
    if let Err(err) = spawned {
        warn!("Failed to start input reader: {err}");
    }
}

fn connect(settings: &GameSettings) -> Option<Arc<dyn WorldApi>> {
    let Some(user_id) = settings.user_id else {
        info!("No user_id configured, world saving disabled");
        return None;
    };
    match HttpWorldApi::new(&settings.api_base_url, user_id) {
        Ok(api) => Some(Arc::new(api)),
        Err(err) => {
            warn!("Failed to create world service client: {err}");
            None
        }
    }
}

fn fresh_seed() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
        .to_string()
}

fn parse_args() -> LaunchOptions {
    let mut options = LaunchOptions {
        seed: None,
        name: DEFAULT_WORLD_NAME.to_string(),
        mode: GameMode::Survival,
        frames: None,
        settings_path: PathBuf::from(SETTINGS_FILE),
        load: false,
        offline: false,
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => options.seed = Some(expect_value(&mut args, "--seed", "a seed")),
            "--name" => options.name = expect_value(&mut args, "--name", "a world name"),
            "--mode" => {
                let value = expect_value(&mut args, "--mode", "survival, creative or adventure");
                match value.parse::<GameMode>() {
                    Ok(mode) => options.mode = mode,
                    Err(err) => {
                        eprintln!("{err}");
                        std::process::exit(2);
                    }
                }
            }
            "--frames" => {
                let value = expect_value(&mut args, "--frames", "a numeric argument");
                match value.parse::<u64>() {
                    Ok(parsed) => options.frames = Some(parsed),
                    Err(err) => {
                        eprintln!("invalid frame count '{value}': {err}");
                        std::process::exit(2);
                    }
                }
            }
            "--settings" => {
                let value = expect_value(&mut args, "--settings", "a path");
                options.settings_path = PathBuf::from(value);
            }
            "--load" => options.load = true,
            "--offline" => options.offline = true,
            "--help" | "-h" => {
                println!(
                    "Usage: cubekin_client [--seed <text>] [--name <world>] \
                     [--mode survival|creative|adventure] [--frames <n>] \
                     [--settings <path>] [--load] [--offline]"
                );
                std::process::exit(0);
            }
            other => {
                eprintln!("unknown argument: {other}");
                std::process::exit(2);
            }
        }
    }
    options
}

fn expect_value(args: &mut impl Iterator<Item = String>, flag: &str, what: &str) -> String {
    let Some(value) = args.next() else {
        eprintln!("{flag} expects {what}");
        std::process::exit(2);
    };
    value
}
