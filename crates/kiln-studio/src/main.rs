mod scene;

use std::path::PathBuf;

use anyhow::Result;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowId;

use kiln_engine::coords::ColorRgba;
use kiln_engine::core::{App, AppControl, FrameCtx};
use kiln_engine::device::GpuInit;
use kiln_engine::logging::{LoggingConfig, init_logging};
use kiln_engine::render::WgpuBackend;
use kiln_engine::window::{Runtime, RuntimeConfig};

use scene::Scene;

const CLEAR: ColorRgba = ColorRgba::new(0.06, 0.07, 0.09, 1.0);

enum SceneState {
    Pending,
    Ready(Scene),
    Failed,
}

struct StudioApp {
    backend: WgpuBackend,
    scene: SceneState,
    texture_path: Option<PathBuf>,
    closing: bool,

    fps_frames: u32,
    fps_window: f32,
}

impl StudioApp {
    fn new(texture_path: Option<PathBuf>) -> Self {
        Self {
            backend: WgpuBackend::new(),
            scene: SceneState::Pending,
            texture_path,
            closing: false,
            fps_frames: 0,
            fps_window: 0.0,
        }
    }
}

impl App for StudioApp {
    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        if let WindowEvent::KeyboardInput { event, .. } = event {
            if event.state == ElementState::Pressed
                && event.logical_key == Key::Named(NamedKey::Escape)
            {
                // Released on the next frame, while a sink is available.
                self.closing = true;
            }
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let time = ctx.time;
        let (width, height) = ctx.window.physical_size();

        self.fps_frames += 1;
        self.fps_window += time.dt;
        if self.fps_window >= 1.0 {
            let fps = self.fps_frames as f32 / self.fps_window;
            ctx.runtime.set_title(format!("kiln studio ({fps:.0} fps)"));
            self.fps_frames = 0;
            self.fps_window = 0.0;
        }

        let backend = &mut self.backend;
        let scene = &mut self.scene;
        let texture_path = self.texture_path.as_deref();
        let closing = self.closing;

        let control = ctx.render(CLEAR, |rctx, target| {
            let mut sink = backend.sink(rctx, target);

            if closing {
                if let SceneState::Ready(ready) = std::mem::replace(scene, SceneState::Failed) {
                    ready.dispose(&mut sink);
                }
                return;
            }

            if matches!(scene, SceneState::Pending) {
                *scene = match Scene::new(&mut sink, texture_path) {
                    Some(ready) => SceneState::Ready(ready),
                    None => {
                        log::error!("scene setup failed; drawing background only");
                        SceneState::Failed
                    }
                };
            }

            if let SceneState::Ready(ready) = scene {
                if let Err(e) = ready.draw(&mut sink, time, width as f32, height as f32) {
                    log::warn!("frame {}: {e}", time.frame_index);
                }
            }
        });

        if closing {
            return AppControl::Exit;
        }
        control
    }

    fn on_exit(&mut self) {
        log::info!("exiting with {} GPU objects alive", self.backend.object_count());
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let texture_path = std::env::args_os().nth(1).map(PathBuf::from);
    if let Some(path) = &texture_path {
        log::info!("quad texture: {}", path.display());
    }

    Runtime::run(
        RuntimeConfig {
            title: "kiln studio".to_string(),
            ..RuntimeConfig::default()
        },
        GpuInit::default(),
        StudioApp::new(texture_path),
    )
}
