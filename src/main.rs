use std::error::Error;
use std::ffi::c_void;
use std::fmt::Display;
use std::path::Path;

use anyhow::anyhow;
use sdl2::event::{Event, WindowEvent};
use sdl2::video::{GLContext, GLProfile, SwapInterval, Window};
use sdl2::VideoSubsystem;

use gltf_sample_renderer::renderer::gl::GlDevice;
use gltf_sample_renderer::{
    AssetDir, AssetSource, ContextProvider, EmbeddedAssets, RenderError, RenderEvent, RenderLoop,
    RendererConfig,
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = RendererConfig::default();
    let assets: Box<dyn AssetSource> = match std::env::args_os().nth(1) {
        Some(path) => {
            let path = Path::new(&path);
            let name = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| anyhow!("not a scene file: {}", path.display()))?;
            config.scene_asset = name.to_string();
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            log::info!("loading {name} from {}", dir.display());
            Box::new(AssetDir::new(dir))
        }
        None => Box::new(EmbeddedAssets::builtin()),
    };

    let sdl_context = sdl2::init().map_err(SdlErr)?;
    let video_subsystem = sdl_context.video().map_err(SdlErr)?;
    {
        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(GLProfile::GLES);
        gl_attr.set_context_version(3, 0);
    }
    let window = video_subsystem
        .window(env!("CARGO_PKG_NAME"), 948, 533)
        .resizable()
        .opengl()
        .build()?;
    let (width, height) = window.drawable_size();
    let mut event_pump = sdl_context.event_pump().map_err(SdlErr)?;

    let context = SdlContext::new(video_subsystem);
    let (mut render_loop, events) = RenderLoop::new(context, assets, config);
    let send = |event| events.send(event).map_err(|_| anyhow!("render loop hung up"));

    send(RenderEvent::SurfaceAvailable {
        surface: window,
        width,
        height,
    })?;
    render_loop.pump()?;

    'running: loop {
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => break 'running,
                Event::Window {
                    win_event: WindowEvent::SizeChanged(..),
                    ..
                } => {
                    // Pixels, not window coordinates.
                    if let Some((width, height)) = render_loop.context().drawable_size() {
                        send(RenderEvent::SurfaceResized { width, height })?;
                    }
                }
                _ => {}
            }
        }
        // Paced by vsync in swap_buffers.
        send(RenderEvent::FrameTick)?;
        render_loop.pump()?;
    }

    send(RenderEvent::SurfaceDestroyed)?;
    render_loop.pump()?;
    Ok(())
}

/// GL contexts created by SDL2 on the window handed over as the surface.
struct SdlContext {
    video: VideoSubsystem,
    // Dropped before the window it was created on.
    gl_context: Option<GLContext>,
    window: Option<Window>,
}

impl SdlContext {
    fn new(video: VideoSubsystem) -> SdlContext {
        SdlContext {
            video,
            gl_context: None,
            window: None,
        }
    }

    fn drawable_size(&self) -> Option<(u32, u32)> {
        self.window.as_ref().map(Window::drawable_size)
    }
}

impl ContextProvider for SdlContext {
    type Surface = Window;
    type Device = GlDevice;

    fn create_surface(&mut self, window: Window) -> Result<GlDevice, RenderError> {
        self.release();
        let gl_context = window.gl_create_context().map_err(RenderError::Context)?;
        window
            .gl_make_current(&gl_context)
            .map_err(RenderError::Context)?;
        if let Err(err) = self.video.gl_set_swap_interval(SwapInterval::VSync) {
            log::warn!("could not enable vsync: {err}");
        }
        let video = &self.video;
        let device = GlDevice::new(|name| video.gl_get_proc_address(name) as *const c_void);
        self.gl_context = Some(gl_context);
        self.window = Some(window);
        Ok(device)
    }

    fn make_current(&mut self) -> Result<(), RenderError> {
        match (&self.window, &self.gl_context) {
            (Some(window), Some(gl_context)) => {
                window.gl_make_current(gl_context).map_err(RenderError::Context)
            }
            _ => Err(RenderError::Context("no surface".to_string())),
        }
    }

    fn swap_buffers(&mut self) -> Result<(), RenderError> {
        match &self.window {
            Some(window) => {
                window.gl_swap_window();
                Ok(())
            }
            None => Err(RenderError::Context("no surface".to_string())),
        }
    }

    fn has_valid_context(&self) -> bool {
        self.gl_context.is_some() && self.window.is_some()
    }

    fn release(&mut self) {
        if self.gl_context.take().is_some() {
            log::debug!("released GL context");
        }
        self.window = None;
    }
}

#[derive(Debug)]
pub struct SdlErr(String);
impl Display for SdlErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sdl error: {}", self.0)
    }
}
impl Error for SdlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}
