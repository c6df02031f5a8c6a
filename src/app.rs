use crate::core::geometry::{MeshData, MeshId};
use crate::io::config::Config;
use crate::io::image::{save_depth_map, timestamped_output_name};
use crate::pipeline::passes::plan_frame;
use crate::pipeline::reference::render_depth_pass;
use crate::pipeline::renderer::{SceneRenderer, Viewport};
use crate::pipeline::shadow::ShadowSettings;
use crate::scene::context::SceneState;
use crate::scene::loader::load_scene_mesh;
use crate::ui::input::FrameInput;
use eframe::{egui_glow, glow};
use egui::mutex::Mutex;
use egui::viewport::CursorGrab;
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

const FPS_REPORT_INTERVAL: Duration = Duration::from_secs(2);

/// The interactive demo: one egui central panel painted by the shadow renderer.
pub struct ShadowDemoApp {
    state: SceneState,
    settings: ShadowSettings,
    renderer: Arc<Mutex<Option<SceneRenderer>>>,
    pointer_captured: bool,
}

impl ShadowDemoApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: &Config,
        mesh: MeshData,
    ) -> Result<Self, String> {
        let gl = cc
            .gl
            .as_ref()
            .ok_or_else(|| "eframe was not started with the glow renderer".to_string())?;
        let settings = ShadowSettings::from_config(&config.shadow);
        let renderer = SceneRenderer::new(gl, vec![mesh], &settings).map_err(|e| {
            error!("GPU setup failed: {}", e);
            e.to_string()
        })?;

        info!(
            "Controls: WASD=Move, Q/E=Down/Up, Drag or Tab=Look, Scroll=Zoom, \
             I/K J/L O/P=Move light, M=Depth map, Space=Print positions, Esc=Quit"
        );
        Ok(Self {
            state: SceneState::new(config, MeshId(0)),
            settings,
            renderer: Arc::new(Mutex::new(Some(renderer))),
            pointer_captured: false,
        })
    }

    fn set_pointer_capture(&mut self, ctx: &egui::Context, captured: bool) {
        self.pointer_captured = captured;
        let grab = if captured {
            CursorGrab::Confined
        } else {
            CursorGrab::None
        };
        ctx.send_viewport_cmd(egui::ViewportCommand::CursorGrab(grab));
        ctx.send_viewport_cmd(egui::ViewportCommand::CursorVisible(!captured));
    }
}

impl eframe::App for ShadowDemoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let frame_time = self.state.clock.tick();
        if let Some(fps) = self
            .state
            .clock
            .fps_report(frame_time.now, FPS_REPORT_INTERVAL)
        {
            info!("Average FPS: {:.1}", fps);
        }

        let input = FrameInput::collect(ctx, self.pointer_captured);
        if input.quit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
        if input.toggle_capture {
            self.set_pointer_capture(ctx, !self.pointer_captured);
        }
        self.state.apply_input(&input, frame_time.dt);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let ppp = ctx.pixels_per_point();
                self.state.viewport = (
                    (rect.width() * ppp).round() as u32,
                    (rect.height() * ppp).round() as u32,
                );

                let plan = plan_frame(&self.state, &self.settings);
                let renderer = Arc::clone(&self.renderer);
                let callback = egui_glow::CallbackFn::new(move |info, painter| {
                    let vp = info.viewport_in_pixels();
                    let viewport = Viewport {
                        x: vp.left_px,
                        y: vp.from_bottom_px,
                        width: vp.width_px,
                        height: vp.height_px,
                    };
                    if let Some(renderer) = renderer.lock().as_ref() {
                        renderer.render(painter.gl(), &plan, viewport, painter.intermediate_fbo());
                    }
                });
                ui.painter().add(egui::PaintCallback {
                    rect,
                    callback: Arc::new(callback),
                });
            });

        ctx.request_repaint();
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        let renderer = self.renderer.lock().take();
        match (gl, renderer) {
            (Some(gl), Some(renderer)) => renderer.destroy(gl),
            (None, Some(_)) => error!("No GL context on exit; GPU resources leak with the context"),
            _ => {}
        }
    }
}

/// Runs the interactive window until it is closed.
pub fn run_gui(config: Config) -> Result<(), String> {
    let mesh = load_scene_mesh(&config).map_err(|e| e.to_string())?;
    let title = config.window.title.clone();
    info!(
        "Starting GUI mode ({}x{})...",
        config.window.width, config.window.height
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width as f32, config.window.height as f32])
            .with_title(&title),
        depth_buffer: config.window.depth_bits,
        renderer: eframe::Renderer::Glow,
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            let app = ShadowDemoApp::new(cc, &config, mesh)?;
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| format!("GUI failed: {}", e))
}

/// Renders the shadow map of the initial scene on the CPU and saves it as a PNG.
pub fn run_headless(config: &Config, output: Option<PathBuf>) -> Result<(), String> {
    info!("Starting headless mode...");
    let mesh = load_scene_mesh(config).map_err(|e| e.to_string())?;
    let state = SceneState::new(config, MeshId(0));
    let settings = ShadowSettings::from_config(&config.shadow);
    let plan = plan_frame(&state, &settings);

    let start_time = Instant::now();
    let depth = render_depth_pass(&plan.depth, std::slice::from_ref(&mesh));
    info!(
        "Depth pass completed in {:.2?}: {} of {} texels covered",
        start_time.elapsed(),
        depth.covered(),
        depth.width * depth.height
    );

    let path = output.unwrap_or_else(|| PathBuf::from(timestamped_output_name()));
    save_depth_map(&depth, &path)
}
