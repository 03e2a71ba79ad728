//! tileanim command line entry point.
//!
//! Loads a Tiled tileset definition and answers questions about its tile
//! animations:
//! - summary of the tileset geometry and animated tiles (`--list` for detail)
//! - the tile shown for a base tile at a given time (`--tile` / `--at`)
//! - the tile shown over a span of time (`--timeline`)
//! - a short `bevy_ecs` playback of every animated tile (`--simulate`)
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- assets/tilesets/Overworld.tsx --tile 16 --at 270
//! ```

use bevy_ecs::prelude::*;
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use tileanim::components::animatedtile::AnimatedTile;
use tileanim::resources::animconfig::AnimConfig;
use tileanim::resources::tileset::Tileset;
use tileanim::resources::tilesetstore::TilesetStore;
use tileanim::resources::worldtime::WorldTime;
use tileanim::systems::tileanimation::tile_animation_system;
use tileanim::systems::time::update_world_time;

/// Inspect tile animations of a Tiled tileset.
#[derive(Parser)]
#[command(version, about = "Resolve animated tiles of a Tiled tileset (.tsx / .tsj)")]
struct Cli {
    /// Tileset file. Overrides the path from the config file.
    path: Option<PathBuf>,

    /// INI configuration file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// List every animation clip.
    #[arg(long)]
    list: bool,

    /// Base tile to resolve.
    #[arg(long, value_name = "ID")]
    tile: Option<u32>,

    /// Milliseconds since the animation epoch for --tile.
    #[arg(long, value_name = "MS", default_value_t = 0, allow_hyphen_values = true)]
    at: i64,

    /// Base tile to print a timeline for.
    #[arg(long, value_name = "ID")]
    timeline: Option<u32>,

    /// Timeline step in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 45)]
    step: u32,

    /// Timeline length in milliseconds. Defaults to one cycle.
    #[arg(long, value_name = "MS")]
    span: Option<u64>,

    /// Play every animated tile for this many frames in an ECS world.
    #[arg(long, value_name = "FRAMES")]
    simulate: Option<u32>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AnimConfig::with_path(path),
        None => AnimConfig::new(),
    };
    if let Err(e) = config.load_from_file() {
        if cli.config.is_some() {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        info!("No config file, using defaults: {}", e);
    }
    if let Some(path) = cli.path.clone() {
        config.tileset_path = path;
    }

    let mut store = TilesetStore::new();
    let tileset = match store.load(config.tileset_key.clone(), config.tileset_path.clone()) {
        Ok(tileset) => tileset,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    print_summary(&tileset);

    if cli.list {
        print_clips(&tileset);
    }

    if let Some(base) = cli.tile {
        if !tileset.contains(base) {
            eprintln!("Error: tile {base} is outside [0, {})", tileset.tile_count());
            std::process::exit(1);
        }
        println!(
            "tile {} at {}ms -> {}",
            base,
            cli.at,
            tileset.resolve(base, cli.at)
        );
    }

    if let Some(base) = cli.timeline {
        print_timeline(&tileset, base, cli.step.max(1), cli.span);
    }

    if let Some(frames) = cli.simulate {
        simulate(store, &config, frames);
    }
}

fn print_summary(tileset: &Tileset) {
    println!(
        "{}: {} tiles of {}x{}px ({} columns x {} rows) from {} ({}x{}), {} animated",
        tileset.name(),
        tileset.tile_count(),
        tileset.tile_width(),
        tileset.tile_height(),
        tileset.columns(),
        tileset.rows(),
        tileset.image().source,
        tileset.image().width,
        tileset.image().height,
        tileset.clip_count()
    );
}

fn print_clips(tileset: &Tileset) {
    for base in tileset.animated_tiles() {
        let Some(clip) = tileset.clip(base) else {
            continue;
        };
        let frames: Vec<String> = clip
            .frames()
            .iter()
            .map(|f| format!("{}@{}ms", f.tile, f.duration_ms))
            .collect();
        println!(
            "{:>6}: [{}] cycle {}ms",
            base,
            frames.join(", "),
            clip.cycle_length()
        );
    }
}

fn print_timeline(tileset: &Tileset, base: u32, step: u32, span: Option<u64>) {
    let span = span
        .or_else(|| tileset.clip(base).map(|c| c.cycle_length()))
        .unwrap_or(u64::from(step));
    if tileset.clip(base).is_none() {
        warn!("Tile {} has no animation, it always shows itself", base);
    }
    let mut t: u64 = 0;
    while t < span {
        let at = i64::try_from(t).unwrap_or(i64::MAX);
        println!("{:>8}ms {}", t, tileset.resolve(base, at));
        t += u64::from(step);
    }
}

fn simulate(store: TilesetStore, config: &AnimConfig, frames: u32) {
    let Some(tileset) = store.get(&config.tileset_key).map(Arc::clone) else {
        return;
    };

    let mut world = World::new();
    world.insert_resource(WorldTime {
        time_scale: config.time_scale,
        epoch_ms: config.epoch_ms,
        ..Default::default()
    });
    world.insert_resource(store);
    world.insert_resource(config.clone());
    for base in tileset.animated_tiles() {
        world.spawn(AnimatedTile::new(config.tileset_key.clone(), base));
    }

    let mut schedule = Schedule::default();
    schedule.add_systems(tile_animation_system);

    let dt = world.resource::<AnimConfig>().frame_delta();
    let mut changes = 0usize;
    let mut query = world.query::<&AnimatedTile>();
    for _ in 0..frames {
        let before: Vec<u32> = query.iter(&world).map(|t| t.visible).collect();
        update_world_time(&mut world, dt);
        schedule.run(&mut world);
        changes += query
            .iter(&world)
            .zip(before)
            .filter(|(tile, prev)| tile.visible != *prev)
            .count();
    }

    let time = world.resource::<WorldTime>();
    println!(
        "simulated {} frames ({}ms) of {} animated tiles: {} tile changes",
        time.frame_count,
        time.elapsed_ms,
        tileset.clip_count(),
        changes
    );
}
