use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use env_logger::{Builder, Env};
use log::info;

use nexus_core::component::BonesComponent;
use nexus_core::ecs::{Query, World};
use nexus_core::glam::{Vec2, Vec3};
use nexus_core::scene::resolve_animation_name;
use nexus_core::system::animation::AnimationSystem;
use nexus_core::system::System;
use nexus_core::{EngineConfig, Placement, Registry, SceneBuilder};

use crate::fps::FpsCounter;

mod fps;

type Result<T> = std::result::Result<T, Box<dyn Error>>;

const DANCER_MODEL: &str = "core:models:Jazz Dancing";
const DANCER_IMAGE: &str = "core:images:lola_diffuse";
const DANCER_ANIMATION: &str = "core:animations:Jazz Dancing";

/// Loads the demo domains, builds the dancing scene and steps it headlessly.
#[derive(Parser)]
#[command(name = "nexus_runtime")]
struct Cli {
    /// Engine config, defaults are used if the file does not exist
    #[arg(long, default_value = "demos/config.json")]
    config: PathBuf,

    /// Number of frames to simulate, overrides the config
    #[arg(long)]
    frames: Option<u32>,

    /// Print the final world as JSON
    #[arg(long)]
    dump: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded_config = EngineConfig::load_if_present(&cli.config)?;
    let config_found = loaded_config.is_some();
    let config = loaded_config.unwrap_or_default();

    Builder::from_env(Env::default().default_filter_or(config.log_filter.as_str())).init();

    if config_found {
        info!("config loaded from {}", cli.config.display());
    } else {
        info!("no config at {}, using defaults", cli.config.display());
    }

    let mut registry = Registry::discover(&config.domains_root)?;
    let loaded = registry.load_all(&[]);
    info!("{} assets loaded from {}", loaded, config.domains_root.display());

    let mut world = World::default();
    build_scene(&registry, &mut world)?;

    let frames = cli.frames.unwrap_or(config.frames);
    let mut system = AnimationSystem;
    let mut fps = FpsCounter::default();

    for _ in 0..frames {
        system.run(&mut world, config.frame_delta);

        if let Some(stats) = fps.on_frame(config.frame_delta) {
            info!("{} frames in the last second, {:?} per frame", stats.frames, stats.time_per_frame);
        }
    }

    for (entity, (bones,)) in <(BonesComponent,)>::query(&world) {
        info!("entity {} ends with {} joints after {} frames", entity, bones.joints.len(), frames);
    }

    if cli.dump {
        println!("{}", serde_json::to_string_pretty(&world)?);
    }

    Ok(())
}

fn build_scene(registry: &Registry, world: &mut World) -> Result<()> {
    let mut builder = SceneBuilder::new(registry, world);

    let dancer = builder.add_animated_entity(
        Placement::at(Vec3::ZERO, 0.5)?,
        DANCER_MODEL,
        DANCER_IMAGE,
        DANCER_ANIMATION,
    )?;
    builder.play_animation(dancer, resolve_animation_name(DANCER_ANIMATION))?;

    builder.add_billboard(dancer, Vec3::new(0.0, 2.2, 0.0), Vec3::new(1.0, 0.8, 0.2), Vec2::new(1.0, 0.25))?;

    info!("scene ready, {} entities", builder.world().len());
    Ok(())
}
