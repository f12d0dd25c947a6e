use anyhow::Result;
use clap::Parser;
use glam::{Quat, Vec2, Vec3};
use lantern_assets::MeshSource;
use lantern_render::Engine;
use lantern_render_wgpu::WgpuDevice;
use lantern_scene::{Camera, GravityBody, Light, cube_source};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "lantern-viewer", about = "Windowed model viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Window width in pixels
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Window height in pixels
    #[arg(long, default_value = "720")]
    height: u32,

    /// Wavefront OBJ model to display instead of the demo cube
    #[arg(long)]
    model: Option<PathBuf>,

    /// Attach a gravity body to the displayed object
    #[arg(long)]
    gravity: bool,
}

struct ViewerApp {
    cli: Cli,
    window: Option<Arc<Window>>,
    engine: Option<Engine<WgpuDevice>>,
    last_frame: Instant,
}

impl ViewerApp {
    fn new(cli: Cli) -> Self {
        Self {
            cli,
            window: None,
            engine: None,
            last_frame: Instant::now(),
        }
    }

    fn build_scene(&self, mut engine: Engine<WgpuDevice>) -> Result<Engine<WgpuDevice>> {
        let mut camera = Camera::default();
        camera.position = Vec3::new(0.0, 0.0, 5.0);
        camera.set_viewport(self.cli.width, self.cli.height);
        engine.add_camera(camera);

        let source = match &self.cli.model {
            Some(path) => {
                MeshSource::Obj(std::fs::read_to_string(path)?)
            }
            None => cube_source(),
        };
        let id = engine.create_object(source)?;
        if let Some(object) = engine.objects_mut().iter_mut().find(|o| o.id == id) {
            if self.cli.gravity {
                object.body = Some(GravityBody::default());
            }
        }

        let mut key = Light::directional(Vec3::new(1.0, 1.0, 1.0), 1.0);
        key.transform.rotation = Quat::from_rotation_x(-0.6) * Quat::from_rotation_y(0.4);
        engine.add_light(key);
        engine.add_light(Light::area(
            Vec3::new(0.6, 0.7, 1.0),
            0.3,
            Vec3::new(0.0, 4.0, 0.0),
            Vec2::new(2.0, 2.0),
        ));

        Ok(engine)
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Lantern Viewer")
            .with_inner_size(PhysicalSize::new(self.cli.width, self.cli.height));
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                tracing::error!("window creation failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let engine = WgpuDevice::new(window.clone())
            .and_then(Engine::new)
            .map_err(anyhow::Error::from)
            .and_then(|engine| self.build_scene(engine));
        match engine {
            Ok(engine) => {
                tracing::info!(max_lights = engine.max_lights(), "viewer ready");
                self.engine = Some(engine);
                self.window = Some(window);
                self.last_frame = Instant::now();
            }
            Err(e) => {
                tracing::error!("initialization failed: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(engine) = &mut self.engine {
                    engine.device_mut().resize(new_size.width, new_size.height);
                    for camera in engine.cameras_mut() {
                        camera.set_viewport(new_size.width.max(1), new_size.height.max(1));
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                let Some(engine) = &mut self.engine else {
                    return;
                };
                let now = Instant::now();
                let dt = (now - self.last_frame).as_secs_f32().min(0.1);
                self.last_frame = now;

                if let Err(e) = engine.device_mut().begin_frame() {
                    tracing::error!("frame acquisition failed: {e}");
                    return;
                }
                engine.update(dt);
                engine.device_mut().end_frame();

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("lantern-viewer starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(cli);
    event_loop.run_app(&mut app)?;

    Ok(())
}
