use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec3;
use lantern_render::{DeviceCall, Engine, RecordingDevice};
use lantern_scene::{Camera, Light, cube_source};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lantern-cli", about = "Headless inspection tool for lantern scenes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and crate info
    Info,
    /// Inspect a mesh file and report its geometry
    Inspect {
        /// Path to a Wavefront OBJ file
        path: PathBuf,
    },
    /// Render one frame of a demo scene on the recording device and
    /// summarize the draw stream
    Frame {
        /// Number of directional lights to register
        #[arg(short, long, default_value = "1")]
        lights: u32,
        /// Reported uniform-vector capacity of the simulated hardware
        #[arg(short, long, default_value = "224")]
        capacity: u32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("lantern-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", lantern_common::crate_info());
            println!("assets: {}", lantern_assets::crate_info());
            println!("scene: {}", lantern_scene::crate_info());
            println!("render: {}", lantern_render::crate_info());
        }
        Commands::Inspect { path } => {
            let data = lantern_assets::load_obj_file(&path)
                .with_context(|| format!("loading {}", path.display()))?;
            println!("{}", path.display());
            println!("  vertices:  {}", data.vertex_count());
            println!("  triangles: {}", data.triangle_count());
            println!("  colors:    {}", if data.has_colors() { "yes" } else { "no" });
        }
        Commands::Frame { lights, capacity } => {
            let mut engine = Engine::new(RecordingDevice::with_capacity(capacity))?;
            println!(
                "Device capacity: {capacity} uniform vectors, light budget: {}",
                engine.max_lights()
            );

            let mut camera = Camera::default();
            camera.position = Vec3::new(0.0, 0.0, 5.0);
            engine.add_camera(camera);
            engine.create_object(cube_source())?;
            for _ in 0..lights {
                engine.add_light(Light::directional(Vec3::ONE, 1.0));
            }
            engine.device_mut().clear_calls();

            engine.update(1.0 / 60.0);

            let device = engine.device_mut();
            println!("Registered lights: {lights}");
            println!(
                "Uploaded light count: {:?}",
                device.i32_uniform_values("u_lightCount")
            );
            println!("Draw calls: {}", device.draw_count());
            for call in device.calls() {
                match call {
                    DeviceCall::Clear { color } => println!("  clear {color:?}"),
                    DeviceCall::DrawTriangles { vertex_count } => {
                        println!("  draw {vertex_count} vertices")
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(())
}
