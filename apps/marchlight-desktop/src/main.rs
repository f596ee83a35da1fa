use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use marchlight_assets::{LoadedScene, SceneManifest};
use marchlight_camera::FlyCamera;
use marchlight_common::{DemoConfig, Resolution};
use marchlight_input::{Action, FrameClock, InputMapper, Key, PointerButton};
use marchlight_render::RenderView;
use marchlight_render_wgpu::{QuadRenderer, default_scene};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

mod keymap;

#[derive(Parser)]
#[command(name = "marchlight-desktop", about = "Fly-camera ray-march demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Everything the frame loop owns apart from GPU objects.
struct AppState {
    config: DemoConfig,
    camera: FlyCamera,
    input: InputMapper,
    clock: FrameClock,
    resolution: Resolution,
    show_overlay: bool,
    quit_requested: bool,
    last_dt: f32,
}

impl AppState {
    fn new(config: DemoConfig) -> Self {
        Self {
            camera: FlyCamera::from_config(&config.camera),
            input: InputMapper::from_config(&config.controls),
            clock: FrameClock::monotonic(),
            resolution: config.window.resolution(),
            show_overlay: false,
            quit_requested: false,
            last_dt: 0.0,
            config,
        }
    }

    /// Advance the clock and apply held movement keys for this frame.
    fn update(&mut self) {
        let dt = self.clock.tick();
        self.input.apply_movement(&mut self.camera, dt);
        self.last_dt = dt;
    }

    fn handle_key(&mut self, key: Key, pressed: bool) {
        match self.input.key_event(key, pressed) {
            Some(Action::Quit) => self.quit_requested = true,
            Some(Action::ToggleOverlay) => self.show_overlay = !self.show_overlay,
            None => {}
        }
    }

    // Events egui claimed (`ui_consumed`) still release keys and buttons,
    // otherwise a release over the overlay would leave them held.

    fn key_input(&mut self, key: Key, pressed: bool, ui_consumed: bool) {
        if pressed && ui_consumed {
            return;
        }
        self.handle_key(key, pressed);
    }

    /// Returns the new look state when the button changed it.
    fn button_input(
        &mut self,
        button: PointerButton,
        pressed: bool,
        ui_consumed: bool,
    ) -> Option<bool> {
        if pressed && ui_consumed {
            return None;
        }
        let was_looking = self.input.look_active();
        self.input.pointer_button(button, pressed);
        let looking = self.input.look_active();
        (looking != was_looking).then_some(looking)
    }

    /// Cursor motion is never dropped so the next look sample starts from
    /// where the pointer really is.
    fn cursor_input(&mut self, x: f64, y: f64) {
        self.input.pointer_moved(&mut self.camera, x, y);
    }

    fn scroll_input(&mut self, lines: f32, ui_consumed: bool) {
        if !ui_consumed {
            self.input.scrolled(&mut self.camera, lines);
        }
    }

    fn render_view(&self) -> RenderView {
        RenderView::capture(&self.camera, self.resolution, self.clock.total())
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_overlay {
            return;
        }

        egui::Window::new("Camera")
            .default_width(240.0)
            .show(ctx, |ui| {
                let p = self.camera.position();
                ui.label(format!("Position: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
                ui.label(format!(
                    "Yaw: {:.1}  Pitch: {:.1}",
                    self.camera.yaw(),
                    self.camera.pitch()
                ));
                ui.label(format!("FOV: {:.1}", self.camera.fov()));
                ui.label(format!(
                    "Frame: {:.2} ms ({} frames)",
                    self.last_dt * 1000.0,
                    self.clock.frame_count()
                ));
                ui.separator();
                ui.add(
                    egui::Slider::new(&mut self.camera.movement_speed, 1.0..=200.0)
                        .text("speed"),
                );
                ui.add(
                    egui::Slider::new(&mut self.camera.mouse_sensitivity, 0.01..=1.0)
                        .text("sensitivity"),
                );
                if ui.button("Reset camera").clicked() {
                    self.camera = FlyCamera::from_config(&self.config.camera);
                }
                ui.separator();
                ui.small("F1: Overlay | RMB: Look | WASD: Move | Space/Ctrl: Up/Down");
            });
    }
}

/// Load the configured scene, falling back to the built-in one on any
/// error so the demo still starts.
fn load_scene(manifest: Option<&Path>) -> LoadedScene {
    let Some(path) = manifest else {
        return default_scene();
    };
    match SceneManifest::load(path).and_then(|m| LoadedScene::load(&m)) {
        Ok(scene) => scene,
        Err(e) => {
            tracing::error!("failed to load scene {}: {e}", path.display());
            tracing::warn!("falling back to the built-in scene");
            default_scene()
        }
    }
}

struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: QuadRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(config: DemoConfig) -> Self {
        Self {
            state: AppState::new(config),
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let window_config = &self.state.config.window;
        let attrs = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(PhysicalSize::new(window_config.width, window_config.height));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("marchlight_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if window_config.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        self.state.resolution = Resolution::new(config.width, config.height);

        let scene = load_scene(self.state.config.scene.manifest.as_deref());
        let renderer = match QuadRenderer::new(&device, &queue, surface_format, &scene) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("{e}");
                tracing::warn!("falling back to the built-in scene");
                QuadRenderer::new(&device, &queue, surface_format, &default_scene())?
            }
        };

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Gpu {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn redraw(&mut self) {
        self.state.update();

        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.renderer
            .render(&gpu.device, &gpu.queue, &view, &self.state.render_view());

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.init_gpu(event_loop) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!("failed to initialize: {e:#}");
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
        let ui_consumed = match &mut self.gpu {
            Some(gpu) => gpu.egui_winit.on_window_event(&gpu.window, &event).consumed,
            None => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.config.width = new_size.width.max(1);
                    gpu.config.height = new_size.height.max(1);
                    gpu.surface.configure(&gpu.device, &gpu.config);
                    self.state.resolution = Resolution::new(gpu.config.width, gpu.config.height);
                }
            }
            WindowEvent::Focused(false) => {
                self.state.input.release_all();
                if let Some(gpu) = &self.gpu {
                    gpu.window.set_cursor_visible(true);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                self.state.key_input(
                    keymap::key(code),
                    key_state == ElementState::Pressed,
                    ui_consumed,
                );
            }
            WindowEvent::MouseInput {
                button,
                state: btn_state,
                ..
            } => {
                let changed = self.state.button_input(
                    keymap::pointer_button(button),
                    btn_state == ElementState::Pressed,
                    ui_consumed,
                );
                if let (Some(looking), Some(gpu)) = (changed, &self.gpu) {
                    gpu.window.set_cursor_visible(!looking);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state.cursor_input(position.x, position.y);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.state.scroll_input(keymap::scroll(delta), ui_consumed);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }

        if self.state.quit_requested {
            tracing::info!("shutting down");
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = DemoConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;

    tracing::info!("marchlight-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
